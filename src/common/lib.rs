// Copyright (c) 2016-2020 Fabian Schuiki

//! This crate contains the fundamental utilities used by the rest of the
//! normgram grammar toolkit.

pub mod errors;
pub mod name;

pub use self::errors::{GrammarError, Malformation, Result};
pub use self::name::{get_name_table, Name, NameTable};
