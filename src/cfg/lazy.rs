// Copyright (c) 2016-2020 Fabian Schuiki

//! Grammar constants compiled on first use.

use crate::epsilon::EpsilonMode;
use crate::freeze::FrozenGrammar;
use normgram_common::errors::GrammarError;
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// A grammar that is compiled from its text the first time it is accessed.
///
/// The compiled grammar, or the error it failed with, is cached and handed
/// out on every subsequent access. Suitable for `static` items:
///
/// ```
/// use normgram_cfg::{EpsilonMode, LazyGrammar};
///
/// static PARENS: LazyGrammar = LazyGrammar::new("S -> ( S ) | ( )", EpsilonMode::Eliminate);
///
/// assert_eq!(PARENS.get().unwrap().start().to_string(), "S");
/// ```
pub struct LazyGrammar {
    text: &'static str,
    mode: EpsilonMode,
    cell: OnceCell<Result<Arc<FrozenGrammar>, GrammarError>>,
}

impl LazyGrammar {
    pub const fn new(text: &'static str, mode: EpsilonMode) -> LazyGrammar {
        LazyGrammar {
            text,
            mode,
            cell: OnceCell::new(),
        }
    }

    /// Compile the grammar if this has not happened yet, and return it.
    pub fn get(&self) -> Result<&Arc<FrozenGrammar>, &GrammarError> {
        self.cell
            .get_or_init(|| {
                debug!("Compiling lazy grammar");
                crate::compile(self.text, self.mode)
            })
            .as_ref()
    }

    /// The text the grammar is compiled from.
    pub fn text(&self) -> &'static str {
        self.text
    }

    pub fn mode(&self) -> EpsilonMode {
        self.mode
    }

    /// Whether the grammar has been compiled already.
    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }
}
