// Copyright (c) 2016-2020 Fabian Schuiki

//! Errors raised while building a grammar.
//!
//! Every error is fatal for the grammar under construction. The variants carry
//! enough information to point a human at the offending rule: the line number
//! and text for syntax problems, and the rendered production for problems
//! discovered during normalization.

use std::error;
use std::fmt;

/// A result type carrying a `GrammarError` in the Err variant.
pub type Result<T> = std::result::Result<T, GrammarError>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GrammarError {
    /// A line of grammar text could not be parsed into a rule.
    MalformedRule {
        /// The 1-based line number within the grammar text.
        line: usize,
        /// The text of the offending line.
        text: String,
        reason: Malformation,
    },
    /// The grammar text contains no rules.
    EmptyGrammar,
    /// A production body references a nonterminal without productions.
    DanglingSymbol { symbol: String, production: String },
    /// An empty production body survived to a stage that cannot represent it.
    UnexpectedEpsilon { production: String },
    /// The unit-production closure did not converge within its bound.
    CycleOverflow { rounds: usize },
    /// A production has too many nullable occurrences to expand all their
    /// subsets.
    NullableOverflow {
        production: String,
        occurrences: usize,
        limit: usize,
    },
}

/// The reason a rule line was rejected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Malformation {
    /// The line has no `->` after the head.
    MissingArrow,
    /// The head is not a valid nonterminal name.
    InvalidHead(String),
    /// The head is spelled like a terminal.
    TerminalHead(String),
    /// An alternative between `|` separators has no symbols.
    EmptyAlternative,
    /// A token is neither a known terminal nor a nonterminal name.
    UnknownToken(String),
    /// The epsilon marker appears next to other symbols.
    MisplacedEpsilon,
}

impl GrammarError {
    /// Create a malformed rule error for a 0-based line index.
    pub fn malformed(index: usize, text: &str, reason: Malformation) -> GrammarError {
        GrammarError::MalformedRule {
            line: index + 1,
            text: text.trim().to_string(),
            reason,
        }
    }
}

impl fmt::Display for Malformation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Malformation::MissingArrow => write!(f, "expected `->` after the rule head"),
            Malformation::InvalidHead(head) => write!(f, "`{}` is not a valid rule head", head),
            Malformation::TerminalHead(head) => {
                write!(f, "`{}` is a terminal and cannot head a rule", head)
            }
            Malformation::EmptyAlternative => write!(f, "empty alternative"),
            Malformation::UnknownToken(tok) => write!(f, "unknown token `{}`", tok),
            Malformation::MisplacedEpsilon => {
                write!(f, "`ε` must be the only symbol of its alternative")
            }
        }
    }
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GrammarError::MalformedRule { line, text, reason } => {
                write!(f, "line {}: malformed rule `{}`: {}", line, text, reason)
            }
            GrammarError::EmptyGrammar => write!(f, "grammar contains no rules"),
            GrammarError::DanglingSymbol { symbol, production } => write!(
                f,
                "nonterminal `{}` has no productions but is used in `{}`",
                symbol, production
            ),
            GrammarError::UnexpectedEpsilon { production } => {
                write!(f, "unexpected epsilon production `{}`", production)
            }
            GrammarError::CycleOverflow { rounds } => write!(
                f,
                "unit production closure did not converge after {} rounds",
                rounds
            ),
            GrammarError::NullableOverflow {
                production,
                occurrences,
                limit,
            } => write!(
                f,
                "`{}` has {} nullable occurrences, at most {} can be expanded",
                production, occurrences, limit
            ),
        }
    }
}

impl error::Error for GrammarError {}
