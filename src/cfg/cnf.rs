// Copyright (c) 2016-2020 Fabian Schuiki

//! Binarization toward Chomsky Normal Form.

use crate::grammar::Grammar;
use crate::symbol::{Nonterm, Production, Symbol};
use normgram_common::errors::{GrammarError, Result};

/// Rewrite every production into CNF shape.
///
/// Terminals in bodies of two or more symbols are replaced by lexical
/// nonterminals `'t'` with a single production `'t' -> t`. Bodies of three or
/// more symbols are split right-branching, `A -> X Y Z` becoming
/// `A -> X Y.Z` and `Y.Z -> Y Z`. Since the glue nonterminals are named after
/// the symbols they derive, equal tails share one nonterminal. Bodies of
/// length one pass through unchanged.
///
/// The only empty body accepted is one on the start symbol when no production
/// references it.
pub fn binarize(grammar: &Grammar) -> Result<Grammar> {
    debug!("Binarizing {} productions", grammar.len());
    let start = grammar.start();
    let start_referenced = grammar.is_referenced(start);
    let mut result = Grammar::new(start.clone());

    for p in grammar.productions() {
        if p.is_epsilon() {
            if &p.head != start || start_referenced {
                return Err(GrammarError::UnexpectedEpsilon {
                    production: p.to_string(),
                });
            }
            result.add(p.clone());
            continue;
        }
        if p.body.len() == 1 {
            result.add(p.clone());
            continue;
        }

        let body: Vec<Symbol> = p
            .body
            .iter()
            .map(|sym| match sym {
                Symbol::Term(t) => {
                    let lex = Nonterm::lexical(t);
                    result.add(Production::new(lex.clone(), vec![sym.clone()]));
                    Symbol::Nonterm(lex)
                }
                Symbol::Nonterm(_) => sym.clone(),
            })
            .collect();

        let mut head = p.head.clone();
        let mut rest = body.as_slice();
        while rest.len() > 2 {
            let tail = Nonterm::tail(&rest[1..]);
            let prod = Production::new(head, vec![rest[0].clone(), tail.clone().into()]);
            trace!("Splitting off {}", prod);
            result.add(prod);
            head = tail;
            rest = &rest[1..];
        }
        result.add(Production::new(head, rest.to_vec()));
    }

    debug!(
        "Binarization turned {} into {} productions",
        grammar.len(),
        result.len()
    );
    Ok(result)
}

/// Check whether every production is in CNF shape: a single terminal, two
/// nonterminals, or the top-level epsilon production on an unreferenced start.
pub fn is_cnf(grammar: &Grammar) -> bool {
    let start_referenced = grammar.is_referenced(grammar.start());
    grammar.productions().all(|p| {
        p.is_lexical()
            || p.is_binary()
            || (p.is_epsilon() && &p.head == grammar.start() && !start_referenced)
    })
}
