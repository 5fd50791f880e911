// Copyright (c) 2016-2020 Fabian Schuiki

//! Unit production and stub elimination.

use crate::grammar::Grammar;
use crate::symbol::{Nonterm, Production};
use indexmap::{IndexMap, IndexSet};
use normgram_common::errors::{GrammarError, Result};

/// Eliminate unit productions `A -> B` from the grammar.
///
/// Every nonterminal receives copies of the non-unit productions of all
/// nonterminals it reaches through a chain of unit productions. Stubs, i.e.
/// nonterminals that were defined purely by unit productions, are dropped
/// once nothing references them anymore. Units to nonterminals without any
/// productions are left in place so that freezing reports them.
pub fn eliminate_stubs(grammar: &Grammar) -> Result<Grammar> {
    debug!("Eliminating unit productions");
    let defined = grammar.nonterminals();
    let is_unit = |p: &Production| p.unit_target().map_or(false, |nt| defined.contains(nt));

    // Build the unit graph.
    let mut reach: IndexMap<&Nonterm, IndexSet<&Nonterm>> =
        defined.iter().map(|&nt| (nt, IndexSet::new())).collect();
    for p in grammar.productions() {
        if let Some(target) = p.unit_target() {
            if target == &p.head || !defined.contains(target) {
                continue;
            }
            if let Some(set) = reach.get_mut(&p.head) {
                set.insert(target);
            }
        }
    }

    // Close it transitively. Each round at least doubles the length of the
    // unit chains covered, so the bound is never reached on a finite graph.
    let bound = defined.len() + 1;
    let mut rounds = 0;
    loop {
        let mut changed = false;
        for i in 0..reach.len() {
            let additions: Vec<&Nonterm> = match reach.get_index(i) {
                Some((_, direct)) => direct
                    .iter()
                    .filter_map(|nt| reach.get(*nt))
                    .flat_map(|set| set.iter().copied())
                    .filter(|nt| !direct.contains(nt))
                    .collect(),
                None => continue,
            };
            if additions.is_empty() {
                continue;
            }
            changed = true;
            if let Some((_, set)) = reach.get_index_mut(i) {
                set.extend(additions);
            }
        }
        rounds += 1;
        if !changed {
            break;
        }
        if rounds > bound {
            return Err(GrammarError::CycleOverflow { rounds });
        }
    }
    trace!("Unit closure converged after {} rounds", rounds);

    // Emit each nonterminal's own productions followed by the ones it inherits.
    let by_head = grammar.by_head();
    let mut prods: IndexSet<Production> = IndexSet::new();
    for (&head, own) in &by_head {
        prods.extend(own.iter().filter(|p| !is_unit(p)).map(|&p| p.clone()));
        let reached = match reach.get(head) {
            Some(reached) => reached,
            None => continue,
        };
        for &target in reached {
            if target == head {
                continue;
            }
            for p in by_head.get(target).into_iter().flatten() {
                if is_unit(p) {
                    continue;
                }
                let copy = Production::new(head.clone(), p.body.clone());
                trace!("Inlining {} as {}", p, copy);
                prods.insert(copy);
            }
        }
    }
    let mut result =
        Grammar::from_productions(grammar.start().clone(), prods).drop_vanished(&owned(&defined));

    // Drop stubs that are no longer referenced.
    let stubs: Vec<&Nonterm> = by_head
        .iter()
        .filter(|(head, own)| **head != grammar.start() && own.iter().all(|p| is_unit(p)))
        .map(|(&head, _)| head)
        .collect();
    loop {
        let unused: Vec<Nonterm> = stubs
            .iter()
            .filter(|&&nt| result.productions_of(nt).next().is_some() && !result.is_referenced(nt))
            .map(|&nt| nt.clone())
            .collect();
        if unused.is_empty() {
            break;
        }
        for nt in &unused {
            trace!("Dropping stub {}", nt);
        }
        result = Grammar::from_productions(
            grammar.start().clone(),
            result
                .productions()
                .filter(|p| !unused.contains(&p.head))
                .cloned()
                .collect::<Vec<_>>(),
        );
    }

    debug!(
        "Unit elimination turned {} into {} productions",
        grammar.len(),
        result.len()
    );
    Ok(result)
}

fn owned(set: &IndexSet<&Nonterm>) -> IndexSet<Nonterm> {
    set.iter().map(|&nt| nt.clone()).collect()
}
