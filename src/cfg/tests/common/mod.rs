// Copyright (c) 2016-2020 Fabian Schuiki
#![allow(dead_code)]

//! Reference recognizers for grammar tests.

pub extern crate normgram_cfg as cfg;
pub extern crate normgram_common;
pub use crate::cfg::*;

use std::collections::HashSet;

/// Check whether a raw grammar derives `word`.
///
/// Computes the set of `(nonterminal, from, to)` spans by fixpoint iteration,
/// which copes with epsilon productions and unit cycles alike.
pub fn accepts(grammar: &Grammar, word: &[&str]) -> bool {
    let n = word.len();
    let mut spans: HashSet<(Nonterm, usize, usize)> = HashSet::new();
    loop {
        let mut changed = false;
        for p in grammar.productions() {
            for i in 0..=n {
                for j in i..=n {
                    let key = (p.head.clone(), i, j);
                    if !spans.contains(&key) && derives(&p.body, i, j, word, &spans) {
                        spans.insert(key);
                        changed = true;
                    }
                }
            }
        }
        if !changed {
            break;
        }
    }
    spans.contains(&(grammar.start().clone(), 0, n))
}

fn derives(
    body: &[Symbol],
    i: usize,
    j: usize,
    word: &[&str],
    spans: &HashSet<(Nonterm, usize, usize)>,
) -> bool {
    match body.split_first() {
        None => i == j,
        Some((Symbol::Term(t), rest)) => {
            i < j && word[i] == t.name().as_str() && derives(rest, i + 1, j, word, spans)
        }
        Some((Symbol::Nonterm(nt), rest)) => (i..=j)
            .any(|k| spans.contains(&(nt.clone(), i, k)) && derives(rest, k, j, word, spans)),
    }
}

/// Check whether a frozen CNF grammar derives `word`, using CYK.
pub fn cyk(grammar: &FrozenGrammar, word: &[&str]) -> bool {
    if word.is_empty() {
        return grammar.derives_epsilon();
    }
    let n = word.len();
    let mut table = vec![vec![HashSet::<Nonterm>::new(); n + 1]; n + 1];
    for (i, w) in word.iter().enumerate() {
        let lexical = [Symbol::from(Term::new(w))];
        table[i][i + 1].extend(grammar.heads_of(&lexical).iter().cloned());
    }
    for len in 2..=n {
        for i in 0..=n - len {
            let j = i + len;
            let mut found = vec![];
            for k in i + 1..j {
                for b in &table[i][k] {
                    for c in &table[k][j] {
                        let body = [Symbol::from(b.clone()), Symbol::from(c.clone())];
                        found.extend(grammar.heads_of(&body).iter().cloned());
                    }
                }
            }
            table[i][j].extend(found);
        }
    }
    table[0][n].contains(grammar.start())
}

/// All words over `alphabet` of length up to `max_len`.
pub fn words<'a>(alphabet: &[&'a str], max_len: usize) -> Vec<Vec<&'a str>> {
    let mut all = vec![vec![]];
    let mut layer: Vec<Vec<&str>> = vec![vec![]];
    for _ in 0..max_len {
        layer = layer
            .iter()
            .flat_map(|w| {
                alphabet.iter().map(move |a| {
                    let mut w = w.clone();
                    w.push(*a);
                    w
                })
            })
            .collect();
        all.extend(layer.iter().cloned());
    }
    all
}

/// Compile `text` and check that the normalized grammar accepts exactly the
/// words the raw grammar accepts, up to length `max_len`. The empty word is
/// only expected in `EpsilonMode::Preserve`.
pub fn assert_same_language(text: &str, mode: EpsilonMode, max_len: usize) {
    let raw = parse_grammar(text).unwrap();
    let frozen = compile_in(text, mode, &Interner::new()).unwrap();
    assert!(frozen.is_cnf(), "not in CNF:\n{}", frozen);
    let names: Vec<String> = raw.terminals().into_iter().map(|t| t.to_string()).collect();
    let alphabet: Vec<&str> = names.iter().map(String::as_str).collect();
    for word in words(&alphabet, max_len) {
        let expected = accepts(&raw, &word) && (mode == EpsilonMode::Preserve || !word.is_empty());
        assert_eq!(
            cyk(&frozen, &word),
            expected,
            "word {:?} with normalized grammar:\n{}",
            word,
            frozen
        );
    }
}
