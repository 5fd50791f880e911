// Copyright (c) 2016-2020 Fabian Schuiki

//! A toolkit for ingesting context-free grammars and normalizing them to
//! Chomsky Normal Form.

// Re-export everything from the common crate.
pub extern crate normgram_common as common;
pub use crate::common::*;

// Pull in subcrates.
pub extern crate normgram_cfg as cfg;
pub use crate::cfg::{compile, compile_in, normalize, EpsilonMode, FrozenGrammar, Interner};
