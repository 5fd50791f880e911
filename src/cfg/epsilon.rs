// Copyright (c) 2016-2020 Fabian Schuiki

//! Epsilon production elimination.

use crate::grammar::Grammar;
use crate::symbol::{Nonterm, Production, Symbol};
use indexmap::IndexSet;
use normgram_common::errors::{GrammarError, Result};

/// The most nullable occurrences a single body may contain. Each occurrence
/// doubles the number of variants the body expands to.
pub const MAX_NULLABLE_OCCURRENCES: usize = 24;

/// How to treat the empty string during normalization.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum EpsilonMode {
    /// Remove all epsilon productions. If the start symbol derived the empty
    /// string, the normalized grammar no longer does.
    Eliminate,
    /// Remove all epsilon productions except one top-level production that
    /// keeps the empty string in the language.
    Preserve,
}

impl Default for EpsilonMode {
    fn default() -> EpsilonMode {
        EpsilonMode::Eliminate
    }
}

/// Compute the nonterminals that can derive the empty string.
pub fn nullable_set(grammar: &Grammar) -> IndexSet<Nonterm> {
    let mut nullable: IndexSet<Nonterm> = IndexSet::new();
    loop {
        let mut changed = false;
        for p in grammar.productions() {
            if nullable.contains(&p.head) {
                continue;
            }
            let all_nullable = p.body.iter().all(|sym| match sym {
                Symbol::Nonterm(nt) => nullable.contains(nt),
                Symbol::Term(_) => false,
            });
            if all_nullable {
                trace!("{} is nullable", p.head);
                nullable.insert(p.head.clone());
                changed = true;
            }
        }
        if !changed {
            return nullable;
        }
    }
}

/// Eliminate epsilon productions from the grammar.
///
/// Every production is replaced by all the variants obtained by omitting any
/// subset of its nullable nonterminal occurrences. Nonterminals that could
/// only derive the empty string disappear, together with every production
/// that references them. Fails with `NullableOverflow` if a body has more
/// than `MAX_NULLABLE_OCCURRENCES` nullable occurrences.
pub fn eliminate_epsilon(grammar: &Grammar, mode: EpsilonMode) -> Result<Grammar> {
    debug!("Removing ε-derivation ({:?})", mode);
    let nullable = nullable_set(grammar);
    let defined: IndexSet<Nonterm> = grammar.nonterminals().into_iter().cloned().collect();

    let mut result = Grammar::new(grammar.start().clone());
    for p in grammar.productions() {
        if p.is_epsilon() {
            trace!("Discarding {}", p);
            continue;
        }
        let variants = expand_nullable(p, &nullable)?;
        if variants.len() > 1 {
            trace!("Expanding {} to {} productions", p, variants.len());
        }
        for body in variants {
            result.add(Production::new(p.head.clone(), body));
        }
    }
    let mut result = result.drop_vanished(&defined);

    if mode == EpsilonMode::Preserve && nullable.contains(grammar.start()) {
        result = preserve_epsilon(result);
    }
    debug!(
        "Epsilon elimination turned {} into {} productions",
        grammar.len(),
        result.len()
    );
    Ok(result)
}

/// Enumerate the non-empty bodies obtained by deleting subsets of the nullable
/// occurrences in `prod`. The unmodified body comes first.
fn expand_nullable(
    prod: &Production,
    nullable: &IndexSet<Nonterm>,
) -> Result<Vec<Vec<Symbol>>> {
    let positions: Vec<usize> = prod
        .body
        .iter()
        .enumerate()
        .filter(|(_, sym)| sym.as_nonterm().map_or(false, |nt| nullable.contains(nt)))
        .map(|(i, _)| i)
        .collect();
    if positions.len() > MAX_NULLABLE_OCCURRENCES {
        return Err(GrammarError::NullableOverflow {
            production: prod.to_string(),
            occurrences: positions.len(),
            limit: MAX_NULLABLE_OCCURRENCES,
        });
    }
    if positions.len() > 16 {
        warn!(
            "{} has {} nullable occurrences; expansion will be large",
            prod,
            positions.len()
        );
    }

    let mut variants = vec![];
    for mask in 0u32..(1 << positions.len()) {
        let body: Vec<Symbol> = prod
            .body
            .iter()
            .enumerate()
            .filter(|(i, _)| match positions.iter().position(|p| p == i) {
                Some(bit) => mask & (1 << bit) == 0,
                None => true,
            })
            .map(|(_, sym)| sym.clone())
            .collect();
        if !body.is_empty() {
            variants.push(body);
        }
    }
    Ok(variants)
}

/// Add a single top-level epsilon production to a grammar whose start symbol
/// was nullable. If the start symbol is referenced by some body, a fresh start
/// symbol is placed on top of it so the epsilon production cannot leak into
/// other derivations.
fn preserve_epsilon(grammar: Grammar) -> Grammar {
    let start = grammar.start().clone();
    if !grammar.is_referenced(&start) {
        let mut grammar = grammar;
        grammar.add(Production::new(start, vec![]));
        return grammar;
    }
    let top = Nonterm::top(&start);
    debug!("Introducing {} to carry the empty string", top);
    let lifted: Vec<Production> = grammar
        .productions_of(&start)
        .map(|p| Production::new(top.clone(), p.body.clone()))
        .collect();
    let mut result = Grammar::new(top.clone());
    for p in lifted {
        result.add(p);
    }
    result.add(Production::new(top, vec![]));
    for p in grammar.productions() {
        result.add(p.clone());
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_grammar;
    use pretty_assertions::assert_eq;

    fn eps(input: &str, mode: EpsilonMode) -> String {
        eliminate_epsilon(&parse_grammar(input).unwrap(), mode)
            .unwrap()
            .to_string()
    }

    #[test]
    fn nullable_fixpoint() {
        let g = parse_grammar("S -> A B c\nA -> B B\nB -> ε | b\nC -> c").unwrap();
        let nullable: Vec<_> = nullable_set(&g).into_iter().map(|nt| nt.to_string()).collect();
        assert_eq!(nullable, vec!["B", "A"]);
    }

    #[test]
    fn subsets_in_order() {
        assert_eq!(
            eps("S -> A x A\nA -> a | ε", EpsilonMode::Eliminate),
            "S -> A x A\nS -> x A\nS -> A x\nS -> x\nA -> a\n"
        );
    }

    #[test]
    fn epsilon_only_nonterminal_disappears() {
        assert_eq!(
            eps("START -> a X | b\nX -> ε", EpsilonMode::Eliminate),
            "START -> a\nSTART -> b\n"
        );
    }

    #[test]
    fn eliminate_drops_empty_string() {
        assert_eq!(eps("S -> a | ε", EpsilonMode::Eliminate), "S -> a\n");
    }

    #[test]
    fn preserve_on_unreferenced_start() {
        assert_eq!(eps("S -> a | ε", EpsilonMode::Preserve), "S -> a\nS -> ε\n");
    }

    #[test]
    fn preserve_on_referenced_start() {
        assert_eq!(
            eps("S -> a S b | ε", EpsilonMode::Preserve),
            "S.ε -> a S b\nS.ε -> a b\nS.ε -> ε\nS -> a S b\nS -> a b\n"
        );
        let g = eliminate_epsilon(
            &parse_grammar("S -> a S b | ε").unwrap(),
            EpsilonMode::Preserve,
        )
        .unwrap();
        assert_eq!(g.start().to_string(), "S.ε");
    }

    #[test]
    fn preserve_without_nullable_start_is_eliminate() {
        let g = parse_grammar("S -> a A\nA -> a | ε").unwrap();
        assert_eq!(
            eliminate_epsilon(&g, EpsilonMode::Preserve).unwrap(),
            eliminate_epsilon(&g, EpsilonMode::Eliminate).unwrap()
        );
    }

    #[test]
    fn no_empty_bodies_remain() {
        let g = parse_grammar("S -> A B\nA -> B | ε\nB -> A | b | ε").unwrap();
        let out = eliminate_epsilon(&g, EpsilonMode::Eliminate).unwrap();
        assert!(out.productions().all(|p| !p.is_epsilon()));
    }

    #[test]
    fn too_many_nullable_occurrences() {
        let body = vec!["X"; 64].join(" ");
        let g = parse_grammar(&format!("S -> {}\nX -> x | ε", body)).unwrap();
        match eliminate_epsilon(&g, EpsilonMode::Eliminate) {
            Err(GrammarError::NullableOverflow {
                occurrences, limit, ..
            }) => {
                assert_eq!(occurrences, 64);
                assert_eq!(limit, MAX_NULLABLE_OCCURRENCES);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn many_nullable_occurrences_expand() {
        let body = vec!["X"; 10].join(" ");
        let g = parse_grammar(&format!("S -> {}\nX -> x | ε", body)).unwrap();
        let out = eliminate_epsilon(&g, EpsilonMode::Eliminate).unwrap();
        // Every non-empty subset of the body, plus `X -> x`.
        assert_eq!(out.len(), 1 << 10);
    }
}
