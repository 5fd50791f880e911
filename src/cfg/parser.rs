// Copyright (c) 2016-2020 Fabian Schuiki

//! A parser for the line-oriented rule DSL.
//!
//! Each rule occupies one line of the form `Head -> A B | C | ...`. Tokens are
//! separated by whitespace, `|` separates alternatives, and `ε` denotes an
//! empty alternative. Blank lines and lines starting with `#` are ignored.
//!
//! Body tokens are classified in this order:
//!
//! 1. a token in the `TerminalTable` is a terminal;
//! 2. a token that heads some rule is a nonterminal;
//! 3. a word starting with an uppercase letter or `_` is a nonterminal, even if
//!    no rule defines it (this is reported once the grammar is frozen);
//! 4. any other word, i.e. one starting with a lowercase letter or a digit, is
//!    a terminal literal;
//! 5. anything else is rejected.

use crate::grammar::Grammar;
use crate::symbol::{is_word, Nonterm, Production, Symbol, Term, EPSILON};
use normgram_common::errors::{GrammarError, Malformation, Result};
use std::collections::HashSet;

/// Operator and punctuation spellings recognized as terminals.
pub const OPERATORS: &[&str] = &[
    "(", ")", "[", "]", "{", "}", ",", ":", ";", ".", "...", "->", "=", ":=", "+=", "-=",
    "*=", "/=", "//=", "%=", "@=", "&=", "|=", "^=", ">>=", "<<=", "**=", "==", "!=", "<", ">",
    "<=", ">=", "<>", "+", "-", "*", "/", "//", "%", "**", "@", "&", "^", "~", "<<", ">>",
    "!", "?", "$", "`",
];

/// Reserved keyword spellings recognized as terminals. Lowercase words are
/// terminals anyway; this list matters for the capitalized ones.
pub const KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

/// Lexical category markers recognized as terminals.
pub const LEXICAL_CLASSES: &[&str] = &[
    "NAME", "NUMBER", "STRING", "NEWLINE", "INDENT", "DEDENT", "ENDMARKER", "BOS", "EOS",
];

/// The finite table of token spellings that are always terminals.
#[derive(Clone, Debug)]
pub struct TerminalTable {
    literals: HashSet<String>,
}

impl Default for TerminalTable {
    fn default() -> TerminalTable {
        TerminalTable {
            literals: OPERATORS
                .iter()
                .chain(KEYWORDS.iter())
                .chain(LEXICAL_CLASSES.iter())
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl TerminalTable {
    /// Extend the table with additional literal spellings. Spellings that
    /// contain whitespace, `'`, or `|`, or that equal `->` or `ε`, cannot
    /// appear as terminals and are skipped.
    pub fn with_literals<I, S>(mut self, literals: I) -> TerminalTable
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for lit in literals {
            let lit = lit.into();
            if lit.is_empty()
                || lit == EPSILON
                || lit == "|"
                || lit.contains('\'')
                || lit.chars().any(char::is_whitespace)
            {
                warn!("Ignoring invalid terminal literal `{}`", lit);
                continue;
            }
            self.literals.insert(lit);
        }
        self
    }

    /// Check whether `token` is a terminal spelling.
    pub fn contains(&self, token: &str) -> bool {
        self.literals.contains(token)
    }
}

/// A rule line split into its head and alternatives.
struct RawRule<'a> {
    index: usize,
    line: &'a str,
    head: &'a str,
    alts: Vec<Vec<&'a str>>,
}

/// Parse grammar text with the default terminal table.
pub fn parse_grammar(input: &str) -> Result<Grammar> {
    parse_grammar_with(input, &TerminalTable::default())
}

/// Parse grammar text, classifying tokens with the given terminal table.
pub fn parse_grammar_with(input: &str, table: &TerminalTable) -> Result<Grammar> {
    // Split every rule line first, so that forward references to later rule
    // heads classify as nonterminals.
    let mut rules = vec![];
    for (index, line) in input.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        rules.push(split_rule(index, line, table)?);
    }
    let heads: HashSet<&str> = rules.iter().map(|r| r.head).collect();

    let start = match rules.first() {
        Some(rule) => Nonterm::new(rule.head),
        None => return Err(GrammarError::EmptyGrammar),
    };
    let mut grammar = Grammar::new(start);
    for rule in &rules {
        let head = Nonterm::new(rule.head);
        for alt in &rule.alts {
            let body = classify_alternative(rule, alt, &heads, table)?;
            let prod = Production::new(head.clone(), body);
            trace!("Parsed production {}", prod);
            grammar.add(prod);
        }
    }
    debug!(
        "Parsed {} rules into {} productions",
        rules.len(),
        grammar.len()
    );
    Ok(grammar)
}

fn split_rule<'a>(index: usize, line: &'a str, table: &TerminalTable) -> Result<RawRule<'a>> {
    let err = |reason| GrammarError::malformed(index, line, reason);
    let mut tokens = line.split_whitespace();

    let head = tokens.next().ok_or_else(|| err(Malformation::MissingArrow))?;
    if head == "->" {
        return Err(err(Malformation::InvalidHead(head.to_string())));
    }
    if table.contains(head) {
        return Err(err(Malformation::TerminalHead(head.to_string())));
    }
    if tokens.next() != Some("->") {
        return Err(err(Malformation::MissingArrow));
    }
    let head_ok = is_word(head)
        && head
            .chars()
            .next()
            .map_or(false, |c| c.is_ascii_alphabetic() || c == '_');
    if !head_ok {
        return Err(err(Malformation::InvalidHead(head.to_string())));
    }

    let mut alts = vec![vec![]];
    for tok in tokens {
        if tok == "|" {
            alts.push(vec![]);
        } else if let Some(alt) = alts.last_mut() {
            alt.push(tok);
        }
    }
    if alts.iter().any(|alt| alt.is_empty()) {
        return Err(err(Malformation::EmptyAlternative));
    }

    Ok(RawRule {
        index,
        line,
        head,
        alts,
    })
}

fn classify_alternative(
    rule: &RawRule,
    alt: &[&str],
    heads: &HashSet<&str>,
    table: &TerminalTable,
) -> Result<Vec<Symbol>> {
    if alt.contains(&EPSILON) {
        if alt.len() == 1 {
            return Ok(vec![]);
        }
        return Err(GrammarError::malformed(
            rule.index,
            rule.line,
            Malformation::MisplacedEpsilon,
        ));
    }
    alt.iter()
        .map(|&tok| {
            classify(tok, heads, table).ok_or_else(|| {
                GrammarError::malformed(
                    rule.index,
                    rule.line,
                    Malformation::UnknownToken(tok.to_string()),
                )
            })
        })
        .collect()
}

/// Classify a single body token.
fn classify(tok: &str, heads: &HashSet<&str>, table: &TerminalTable) -> Option<Symbol> {
    if table.contains(tok) {
        return Some(Term::new(tok).into());
    }
    if heads.contains(tok) {
        return Some(Nonterm::new(tok).into());
    }
    if !is_word(tok) {
        return None;
    }
    match tok.chars().next() {
        Some(c) if c.is_ascii_uppercase() || c == '_' => Some(Nonterm::new(tok).into()),
        Some(_) => Some(Term::new(tok).into()),
        None => None,
    }
}
