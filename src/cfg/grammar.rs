// Copyright (c) 2016-2020 Fabian Schuiki

//! The mutable grammar representation threaded through the normalization
//! passes.

use crate::symbol::{Nonterm, Production, Symbol, Term};
use indexmap::{IndexMap, IndexSet};
use normgram_common::errors::{GrammarError, Result};
use std::fmt;

/// A set of productions plus a designated start nonterminal.
///
/// Productions are kept in insertion order so that every pass produces its
/// output deterministically. Equality ignores the order.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Grammar {
    start: Nonterm,
    prods: IndexSet<Production>,
}

impl Grammar {
    /// Create an empty grammar with the given start symbol.
    pub fn new(start: Nonterm) -> Grammar {
        Grammar {
            start,
            prods: Default::default(),
        }
    }

    /// Create a grammar from a list of productions. Duplicates are dropped.
    pub fn from_productions(
        start: Nonterm,
        prods: impl IntoIterator<Item = Production>,
    ) -> Grammar {
        Grammar {
            start,
            prods: prods.into_iter().collect(),
        }
    }

    pub fn start(&self) -> &Nonterm {
        &self.start
    }

    /// Add a production. Returns false if it was already present.
    pub fn add(&mut self, prod: Production) -> bool {
        self.prods.insert(prod)
    }

    pub fn productions(&self) -> impl Iterator<Item = &Production> {
        self.prods.iter()
    }

    pub fn len(&self) -> usize {
        self.prods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prods.is_empty()
    }

    pub fn contains(&self, prod: &Production) -> bool {
        self.prods.contains(prod)
    }

    /// Iterate over the productions of a nonterminal.
    pub fn productions_of<'a>(
        &'a self,
        nt: &'a Nonterm,
    ) -> impl Iterator<Item = &'a Production> + 'a {
        self.prods.iter().filter(move |p| &p.head == nt)
    }

    /// Group the productions by their head, in order of first appearance.
    pub fn by_head(&self) -> IndexMap<&Nonterm, Vec<&Production>> {
        let mut map: IndexMap<&Nonterm, Vec<&Production>> = IndexMap::new();
        for p in &self.prods {
            map.entry(&p.head).or_default().push(p);
        }
        map
    }

    /// The nonterminals that have at least one production.
    pub fn nonterminals(&self) -> IndexSet<&Nonterm> {
        self.prods.iter().map(|p| &p.head).collect()
    }

    /// The terminals used anywhere in the grammar.
    pub fn terminals(&self) -> IndexSet<&Term> {
        self.prods
            .iter()
            .flat_map(|p| p.body.iter())
            .filter_map(|s| match s {
                Symbol::Term(t) => Some(t),
                Symbol::Nonterm(_) => None,
            })
            .collect()
    }

    /// The nonterminals referenced in some body that have no productions.
    pub fn undefined(&self) -> IndexSet<&Nonterm> {
        let defined = self.nonterminals();
        self.prods
            .iter()
            .flat_map(|p| p.nonterms())
            .filter(|nt| !defined.contains(nt))
            .collect()
    }

    /// Fail with `DanglingSymbol` if some body references a nonterminal that
    /// has no productions. The error names the first such production.
    pub fn check_defined(&self) -> Result<()> {
        let undefined = self.undefined();
        let symbol = match undefined.get_index(0) {
            Some(&nt) => nt,
            None => return Ok(()),
        };
        let production = self
            .prods
            .iter()
            .find(|p| p.nonterms().any(|nt| nt == symbol))
            .map(|p| p.to_string())
            .unwrap_or_default();
        Err(GrammarError::DanglingSymbol {
            symbol: symbol.to_string(),
            production,
        })
    }

    /// Check whether any body references `nt`.
    pub fn is_referenced(&self, nt: &Nonterm) -> bool {
        self.prods.iter().any(|p| p.nonterms().any(|x| x == nt))
    }

    /// Remove every production that references a nonterminal which had
    /// productions in `before` but has none left here. Repeats until no such
    /// nonterminal remains, since each removal may empty another nonterminal.
    pub(crate) fn drop_vanished(mut self, before: &IndexSet<Nonterm>) -> Grammar {
        loop {
            let vanished: IndexSet<Nonterm> = {
                let defined = self.nonterminals();
                before
                    .iter()
                    .filter(|nt| !defined.contains(*nt))
                    .cloned()
                    .collect()
            };
            let count = self.prods.len();
            self.prods
                .retain(|p| !p.nonterms().any(|nt| vanished.contains(nt)));
            if self.prods.len() == count {
                return self;
            }
            debug!(
                "Dropped {} productions referencing vanished nonterminals",
                count - self.prods.len()
            );
        }
    }

    /// Restrict the grammar to the sentences built from `allowed` terminals.
    ///
    /// Productions using any other terminal are removed. Nonterminals left
    /// without productions vanish together with their users, and the result
    /// is pruned.
    pub fn restrict(&self, allowed: &[&str]) -> Grammar {
        let before: IndexSet<Nonterm> = self.nonterminals().into_iter().cloned().collect();
        let prods = self.prods.iter().filter(|p| {
            p.body.iter().all(|sym| match sym {
                Symbol::Term(t) => allowed.contains(&t.name().as_str()),
                Symbol::Nonterm(_) => true,
            })
        });
        let restricted = Grammar::from_productions(self.start.clone(), prods.cloned());
        debug!(
            "Restriction to {} terminals kept {} of {} productions",
            allowed.len(),
            restricted.len(),
            self.len()
        );
        restricted.drop_vanished(&before).prune()
    }

    /// Remove useless productions: those involving nonterminals that cannot
    /// derive any terminal string, and those unreachable from the start symbol.
    ///
    /// Nonterminals without any productions are treated as opaque and kept, so
    /// that dangling references are reported when the grammar is frozen rather
    /// than silently dropped here.
    pub fn prune(&self) -> Grammar {
        let defined = self.nonterminals();

        // Find the generating nonterminals.
        let mut generating: IndexSet<&Nonterm> = IndexSet::new();
        loop {
            let before = generating.len();
            for p in &self.prods {
                if generating.contains(&p.head) {
                    continue;
                }
                if p
                    .nonterms()
                    .all(|nt| generating.contains(nt) || !defined.contains(nt))
                {
                    generating.insert(&p.head);
                }
            }
            if generating.len() == before {
                break;
            }
        }
        let is_generating = |nt: &Nonterm| generating.contains(nt) || !defined.contains(nt);
        let productive: Vec<&Production> = self
            .prods
            .iter()
            .filter(|p| is_generating(&p.head) && p.nonterms().all(|nt| is_generating(nt)))
            .collect();

        // Find the reachable nonterminals among the productive productions.
        let mut reachable: IndexSet<&Nonterm> = IndexSet::new();
        reachable.insert(&self.start);
        let mut i = 0;
        while let Some(&nt) = reachable.get_index(i) {
            i += 1;
            for p in productive.iter().filter(|p| &p.head == nt) {
                reachable.extend(p.nonterms());
            }
        }

        let prods: IndexSet<Production> = productive
            .into_iter()
            .filter(|p| reachable.contains(&p.head))
            .cloned()
            .collect();
        if prods.len() != self.prods.len() {
            debug!(
                "Pruned {} useless productions",
                self.prods.len() - prods.len()
            );
        }
        Grammar {
            start: self.start.clone(),
            prods,
        }
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for p in &self.prods {
            writeln!(f, "{}", p)?;
        }
        Ok(())
    }
}
