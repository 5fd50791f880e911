// Copyright (c) 2016-2020 Fabian Schuiki

//! Terminals, nonterminals, and productions.
//!
//! Symbols are plain values: two symbols with the same tag and text are
//! interchangeable everywhere. Synthetic nonterminals minted by the
//! normalization passes use names that cannot be spelled by a user rule head,
//! see `Nonterm::lexical` and `Nonterm::tail`.

use itertools::Itertools;
use normgram_common::name::Name;
use std::fmt;

/// The epsilon marker accepted in grammar text and used when printing empty
/// production bodies.
pub const EPSILON: &str = "ε";

/// Separator used to join the parts of synthetic nonterminal names.
pub const SEPARATOR: char = '.';

/// A terminal.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Term(pub Name);

impl Term {
    pub fn new(name: &str) -> Term {
        Term(Name::new(name))
    }

    pub fn name(&self) -> &Name {
        &self.0
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Term {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Term({})", self.0)
    }
}

/// A nonterminal.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Nonterm(pub Name);

impl Nonterm {
    pub fn new(name: &str) -> Nonterm {
        Nonterm(Name::new(name))
    }

    pub fn name(&self) -> &Name {
        &self.0
    }

    /// The nonterminal that stands in for terminal `t` inside binary bodies.
    /// Its name is the terminal quoted in `'`, which no rule head can spell.
    pub fn lexical(t: &Term) -> Nonterm {
        Nonterm(Name::from(format!("'{}'", t)))
    }

    /// The glue nonterminal deriving the symbol sequence `parts`. Its name
    /// joins the part names with `SEPARATOR`.
    pub fn tail(parts: &[Symbol]) -> Nonterm {
        Nonterm(Name::from(
            parts.iter().map(|s| s.name().as_str()).join(&SEPARATOR.to_string()),
        ))
    }

    /// A fresh start symbol placed on top of `start`, used to carry the
    /// top-level epsilon production.
    pub fn top(start: &Nonterm) -> Nonterm {
        Nonterm(Name::from(format!("{}{}{}", start, SEPARATOR, EPSILON)))
    }

    /// Check whether this nonterminal was minted by a normalization pass.
    pub fn is_synthetic(&self) -> bool {
        !is_word(&self.0) || self.0.contains(SEPARATOR)
    }
}

impl fmt::Display for Nonterm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Nonterm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Nonterm({})", self.0)
    }
}

/// A symbol in a production.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbol {
    Term(Term),
    Nonterm(Nonterm),
}

impl Symbol {
    pub fn name(&self) -> &Name {
        match self {
            Symbol::Term(t) => t.name(),
            Symbol::Nonterm(nt) => nt.name(),
        }
    }

    pub fn is_term(&self) -> bool {
        matches!(self, Symbol::Term(_))
    }

    pub fn as_nonterm(&self) -> Option<&Nonterm> {
        match self {
            Symbol::Nonterm(nt) => Some(nt),
            Symbol::Term(_) => None,
        }
    }
}

impl From<Term> for Symbol {
    fn from(x: Term) -> Self {
        Symbol::Term(x)
    }
}

impl From<Nonterm> for Symbol {
    fn from(x: Nonterm) -> Self {
        Symbol::Nonterm(x)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Symbol::Term(x) => write!(f, "{}", x),
            Symbol::Nonterm(x) => write!(f, "{}", x),
        }
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Symbol::Term(x) => fmt::Debug::fmt(x, f),
            Symbol::Nonterm(x) => fmt::Debug::fmt(x, f),
        }
    }
}

/// A production in the grammar.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Production {
    pub head: Nonterm,
    pub body: Vec<Symbol>,
}

impl Production {
    pub fn new(head: Nonterm, body: Vec<Symbol>) -> Production {
        Production { head, body }
    }

    /// Check if the body is empty.
    pub fn is_epsilon(&self) -> bool {
        self.body.is_empty()
    }

    /// Return the target of a unit production `A -> B`.
    pub fn unit_target(&self) -> Option<&Nonterm> {
        match self.body.as_slice() {
            [Symbol::Nonterm(nt)] => Some(nt),
            _ => None,
        }
    }

    /// Check if this is a lexical production `A -> t`.
    pub fn is_lexical(&self) -> bool {
        matches!(self.body.as_slice(), [Symbol::Term(_)])
    }

    /// Check if this is a binary production `A -> B C`.
    pub fn is_binary(&self) -> bool {
        matches!(self.body.as_slice(), [Symbol::Nonterm(_), Symbol::Nonterm(_)])
    }

    /// Iterate over the nonterminals referenced in the body.
    pub fn nonterms(&self) -> impl Iterator<Item = &Nonterm> {
        self.body.iter().filter_map(Symbol::as_nonterm)
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.body.is_empty() {
            write!(f, "{} -> {}", self.head, EPSILON)
        } else {
            write!(f, "{} -> {}", self.head, self.body.iter().format(" "))
        }
    }
}

/// Format a sequence of symbols separated by spaces.
pub fn format_symbols(syms: &[Symbol]) -> String {
    if syms.is_empty() {
        EPSILON.to_string()
    } else {
        format!("{}", syms.iter().format(" "))
    }
}

/// Check whether `s` is a word made of ASCII letters, digits, and `_`.
pub fn is_word(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
