// Copyright (c) 2016-2020 Fabian Schuiki

//! Context-free grammar ingestion and normalization.
//!
//! Grammar text is parsed into a `Grammar`, which is then threaded through a
//! sequence of passes:
//!
//! 1. unit productions and stubs are eliminated (`stubs`),
//! 2. epsilon productions are eliminated (`epsilon`),
//! 3. units introduced by the previous step are eliminated again,
//! 4. useless productions are pruned (`Grammar::prune`),
//! 5. the productions are binarized toward Chomsky Normal Form (`cnf`).
//!
//! The result is frozen into an immutable, interned `FrozenGrammar` which can
//! be shared freely across threads.

#[macro_use]
extern crate log;

pub mod cnf;
pub mod epsilon;
pub mod freeze;
pub mod grammar;
pub mod lazy;
pub mod parser;
pub mod stubs;
pub mod symbol;

pub use crate::cnf::{binarize, is_cnf};
pub use crate::epsilon::{eliminate_epsilon, nullable_set, EpsilonMode};
pub use crate::freeze::{Freeze, FrozenGrammar, Interner};
pub use crate::grammar::Grammar;
pub use crate::lazy::LazyGrammar;
pub use crate::parser::{parse_grammar, parse_grammar_with, TerminalTable};
pub use crate::stubs::eliminate_stubs;
pub use crate::symbol::{Nonterm, Production, Symbol, Term};

use normgram_common::errors::Result;
use std::sync::Arc;

/// Run all normalization passes over a grammar. The result is in Chomsky
/// Normal Form, apart from the top-level epsilon production in
/// `EpsilonMode::Preserve`.
///
/// References to nonterminals without productions are rejected before any
/// pass runs.
pub fn normalize(grammar: &Grammar, mode: EpsilonMode) -> Result<Grammar> {
    info!(
        "Normalizing grammar with {} productions, start {}",
        grammar.len(),
        grammar.start()
    );
    grammar.check_defined()?;
    let grammar = eliminate_stubs(grammar)?;
    let grammar = eliminate_epsilon(&grammar, mode)?;
    let grammar = eliminate_stubs(&grammar)?;
    let grammar = grammar.prune();
    let grammar = binarize(&grammar)?;
    info!("Normalized grammar has {} productions", grammar.len());
    Ok(grammar)
}

/// Parse, normalize, and freeze grammar text into the global interner.
pub fn compile(text: &str, mode: EpsilonMode) -> Result<Arc<FrozenGrammar>> {
    compile_in(text, mode, Interner::global())
}

/// Parse, normalize, and freeze grammar text into the given interner.
pub fn compile_in(
    text: &str,
    mode: EpsilonMode,
    interner: &Interner,
) -> Result<Arc<FrozenGrammar>> {
    let grammar = parse_grammar(text)?;
    normalize(&grammar, mode)?.freeze_in(interner)
}
