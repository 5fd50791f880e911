// Copyright (c) 2016-2020 Fabian Schuiki

//! Immutable, interned grammars.
//!
//! Freezing validates a grammar, sorts its productions into a canonical order,
//! interns all symbol names, builds lookup indices, and finally deduplicates
//! the result through an `Interner`. Equal grammars frozen in the same
//! interner yield the very same `Arc<FrozenGrammar>`.

use crate::grammar::Grammar;
use crate::symbol::{Nonterm, Production, Symbol, Term};
use itertools::Itertools;
use normgram_common::errors::{GrammarError, Result};
use normgram_common::name::{get_name_table, NameTable};
use once_cell::sync::Lazy;
use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Range;
use std::sync::{Arc, Mutex};

/// An immutable grammar in canonical form.
///
/// Productions are sorted by head, then by body. The grammar carries a
/// fingerprint computed from its start symbol and productions, which serves as
/// its hash and short-circuits most inequality checks.
pub struct FrozenGrammar {
    start: Nonterm,
    prods: Vec<Production>,
    index: HashMap<Nonterm, Range<usize>>,
    reverse: HashMap<Vec<Symbol>, Vec<Nonterm>>,
    fingerprint: u64,
}

impl FrozenGrammar {
    fn new(start: Nonterm, mut prods: Vec<Production>) -> FrozenGrammar {
        prods.sort();
        prods.dedup();

        // Productions of one head are contiguous after sorting.
        let mut index: HashMap<Nonterm, Range<usize>> = HashMap::new();
        for (i, p) in prods.iter().enumerate() {
            index.entry(p.head.clone()).or_insert(i..i).end = i + 1;
        }

        let mut reverse: HashMap<Vec<Symbol>, Vec<Nonterm>> = HashMap::new();
        for p in &prods {
            reverse
                .entry(p.body.clone())
                .or_default()
                .push(p.head.clone());
        }

        let mut hasher = DefaultHasher::new();
        start.hash(&mut hasher);
        prods.hash(&mut hasher);

        FrozenGrammar {
            start,
            prods,
            index,
            reverse,
            fingerprint: hasher.finish(),
        }
    }

    /// The start symbol.
    pub fn start(&self) -> &Nonterm {
        &self.start
    }

    /// All productions, in canonical order.
    pub fn productions(&self) -> &[Production] {
        &self.prods
    }

    /// The productions of a nonterminal. Empty if `nt` has none.
    pub fn productions_of(&self, nt: &Nonterm) -> &[Production] {
        match self.index.get(nt) {
            Some(range) => &self.prods[range.clone()],
            None => &[],
        }
    }

    /// The nonterminals that have a production with exactly this body, in
    /// canonical order.
    pub fn heads_of(&self, body: &[Symbol]) -> &[Nonterm] {
        match self.reverse.get(body) {
            Some(heads) => heads,
            None => &[],
        }
    }

    /// The nonterminals with at least one production, in canonical order.
    pub fn nonterminals(&self) -> impl Iterator<Item = &Nonterm> {
        self.prods.iter().map(|p| &p.head).dedup()
    }

    /// The terminals used by the grammar, sorted.
    pub fn terminals(&self) -> BTreeSet<&Term> {
        self.prods
            .iter()
            .flat_map(|p| p.body.iter())
            .filter_map(|sym| match sym {
                Symbol::Term(t) => Some(t),
                Symbol::Nonterm(_) => None,
            })
            .collect()
    }

    /// Whether the language of the grammar contains the empty string.
    pub fn derives_epsilon(&self) -> bool {
        self.productions_of(&self.start)
            .iter()
            .any(Production::is_epsilon)
    }

    /// Whether every production is in Chomsky Normal Form.
    pub fn is_cnf(&self) -> bool {
        self.prods.iter().all(|p| {
            p.is_lexical() || p.is_binary() || (p.is_epsilon() && p.head == self.start)
        })
    }

    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    /// Number of productions.
    pub fn len(&self) -> usize {
        self.prods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prods.is_empty()
    }

    /// Create a mutable copy of this grammar.
    pub fn thaw(&self) -> Grammar {
        Grammar::from_productions(self.start.clone(), self.prods.iter().cloned())
    }

    /// Restrict the grammar to the given terminals and freeze the result into
    /// `interner`. See `Grammar::restrict`.
    pub fn restrict_in(
        &self,
        allowed: &[&str],
        interner: &Interner,
    ) -> Result<Arc<FrozenGrammar>> {
        self.thaw().restrict(allowed).freeze_in(interner)
    }

    /// Restrict the grammar to the given terminals, using the global interner.
    pub fn restrict(&self, allowed: &[&str]) -> Result<Arc<FrozenGrammar>> {
        self.restrict_in(allowed, Interner::global())
    }

    fn same_content(&self, other: &FrozenGrammar) -> bool {
        self.fingerprint == other.fingerprint
            && self.start == other.start
            && self.prods == other.prods
    }
}

impl PartialEq for FrozenGrammar {
    fn eq(&self, other: &FrozenGrammar) -> bool {
        std::ptr::eq(self, other) || self.same_content(other)
    }
}

impl Eq for FrozenGrammar {}

impl Hash for FrozenGrammar {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.fingerprint.hash(state)
    }
}

impl fmt::Display for FrozenGrammar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for p in &self.prods {
            writeln!(f, "{}", p)?;
        }
        Ok(())
    }
}

impl fmt::Debug for FrozenGrammar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("FrozenGrammar")
            .field("start", &self.start)
            .field("productions", &self.prods.len())
            .field("fingerprint", &format_args!("{:016x}", self.fingerprint))
            .finish()
    }
}

/// A table of frozen grammars and the names they use.
///
/// The name table is guarded by a read-write lock, the grammar table by a
/// mutex. Both only ever grow.
pub struct Interner {
    names: Arc<NameTable>,
    grammars: Mutex<HashMap<u64, Vec<Arc<FrozenGrammar>>>>,
}

impl Interner {
    /// Create an interner with its own name table.
    pub fn new() -> Interner {
        Interner::with_name_table(Arc::new(NameTable::new()))
    }

    /// Create an interner that shares an existing name table.
    pub fn with_name_table(names: Arc<NameTable>) -> Interner {
        Interner {
            names,
            grammars: Default::default(),
        }
    }

    /// The process-wide interner, backed by the global name table.
    pub fn global() -> &'static Interner {
        static GLOBAL: Lazy<Interner> = Lazy::new(|| Interner::with_name_table(get_name_table()));
        &GLOBAL
    }

    pub fn names(&self) -> &NameTable {
        &self.names
    }

    /// Number of distinct grammars in the table.
    pub fn len(&self) -> usize {
        let grammars = self.grammars.lock().unwrap_or_else(|e| e.into_inner());
        grammars.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn intern_nonterm(&self, nt: &Nonterm) -> Nonterm {
        Nonterm(self.names.intern_name(nt.name()))
    }

    fn intern_symbol(&self, sym: &Symbol) -> Symbol {
        match sym {
            Symbol::Term(t) => Symbol::Term(Term(self.names.intern_name(t.name()))),
            Symbol::Nonterm(nt) => Symbol::Nonterm(self.intern_nonterm(nt)),
        }
    }

    /// Return the table's instance of `grammar`, adding it if necessary.
    fn intern(&self, grammar: FrozenGrammar) -> Arc<FrozenGrammar> {
        let mut grammars = self.grammars.lock().unwrap_or_else(|e| e.into_inner());
        let bucket = grammars.entry(grammar.fingerprint).or_default();
        if let Some(existing) = bucket.iter().find(|g| g.same_content(&grammar)) {
            trace!("Reusing frozen grammar {:016x}", grammar.fingerprint);
            return existing.clone();
        }
        let grammar = Arc::new(grammar);
        bucket.push(grammar.clone());
        grammar
    }

    /// Look up an already frozen grammar.
    fn find(&self, grammar: &FrozenGrammar) -> Option<Arc<FrozenGrammar>> {
        let grammars = self.grammars.lock().unwrap_or_else(|e| e.into_inner());
        grammars
            .get(&grammar.fingerprint)?
            .iter()
            .find(|g| g.same_content(grammar))
            .cloned()
    }
}

impl Default for Interner {
    fn default() -> Interner {
        Interner::new()
    }
}

/// Conversion into an interned, immutable grammar.
pub trait Freeze {
    /// Freeze into the given interner.
    fn freeze_in(&self, interner: &Interner) -> Result<Arc<FrozenGrammar>>;

    /// Freeze into the global interner.
    fn freeze(&self) -> Result<Arc<FrozenGrammar>> {
        self.freeze_in(Interner::global())
    }
}

impl Freeze for Grammar {
    fn freeze_in(&self, interner: &Interner) -> Result<Arc<FrozenGrammar>> {
        validate(self)?;
        let prods = self
            .productions()
            .map(|p| {
                Production::new(
                    interner.intern_nonterm(&p.head),
                    p.body.iter().map(|s| interner.intern_symbol(s)).collect(),
                )
            })
            .collect();
        let frozen = FrozenGrammar::new(interner.intern_nonterm(self.start()), prods);
        debug!(
            "Froze grammar with {} productions as {:016x}",
            frozen.len(),
            frozen.fingerprint
        );
        Ok(interner.intern(frozen))
    }
}

impl Freeze for Arc<FrozenGrammar> {
    fn freeze_in(&self, interner: &Interner) -> Result<Arc<FrozenGrammar>> {
        match interner.find(self) {
            Some(found) => Ok(found),
            None => self.thaw().freeze_in(interner),
        }
    }
}

/// Check the invariants every frozen grammar upholds.
fn validate(grammar: &Grammar) -> Result<()> {
    grammar.check_defined()?;
    let start_referenced = grammar.is_referenced(grammar.start());
    for p in grammar.productions() {
        if p.is_epsilon() && (&p.head != grammar.start() || start_referenced) {
            return Err(GrammarError::UnexpectedEpsilon {
                production: p.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_grammar;
    use normgram_common::name::Name;
    use pretty_assertions::assert_eq;

    fn freeze(input: &str, interner: &Interner) -> Result<Arc<FrozenGrammar>> {
        parse_grammar(input).unwrap().freeze_in(interner)
    }

    #[test]
    fn canonical_order() {
        let interner = Interner::new();
        let g = freeze("S -> b A\nS -> a\nA -> x", &interner).unwrap();
        assert_eq!(g.to_string(), "A -> x\nS -> a\nS -> b A\n");
        assert_eq!(g.start(), &Nonterm::new("S"));
        assert_eq!(g.productions_of(&Nonterm::new("S")).len(), 2);
        assert!(g.productions_of(&Nonterm::new("B")).is_empty());
    }

    #[test]
    fn equal_grammars_share_instance() {
        let interner = Interner::new();
        let a = freeze("S -> a | b", &interner).unwrap();
        let b = freeze("S -> b\nS -> a | a", &interner).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(interner.len(), 1);
        let c = freeze("S -> a", &interner).unwrap();
        assert!(!Arc::ptr_eq(&a, &c));
        assert_ne!(a, c);
    }

    #[test]
    fn start_symbol_distinguishes() {
        let interner = Interner::new();
        let a = freeze("S -> a\nT -> a", &interner).unwrap();
        let b = freeze("T -> a\nS -> a", &interner).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn refreezing_is_identity() {
        let interner = Interner::new();
        let a = freeze("S -> a S | a", &interner).unwrap();
        let b = a.freeze_in(&interner).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        let c = a.thaw().freeze_in(&interner).unwrap();
        assert!(Arc::ptr_eq(&a, &c));
    }

    #[test]
    fn names_are_interned() {
        let interner = Interner::new();
        let g = freeze("S -> a S | a", &interner).unwrap();
        let heads: Vec<&Name> = g.productions().iter().map(|p| p.head.name()).collect();
        assert!(Name::ptr_eq(heads[0], heads[1]));
        let in_body = g.productions()[1].body[1].name();
        assert!(Name::ptr_eq(heads[0], in_body));
        assert_eq!(interner.names().len(), 2);
    }

    #[test]
    fn reverse_lookup() {
        let interner = Interner::new();
        let g = freeze("S -> A B | a\nA -> a\nB -> b | A B", &interner).unwrap();
        let a = Symbol::from(Term::new("a"));
        let heads: Vec<_> = g.heads_of(&[a]).iter().map(|nt| nt.to_string()).collect();
        assert_eq!(heads, vec!["A", "S"]);
        let ab = [
            Symbol::from(Nonterm::new("A")),
            Symbol::from(Nonterm::new("B")),
        ];
        let heads: Vec<_> = g.heads_of(&ab).iter().map(|nt| nt.to_string()).collect();
        assert_eq!(heads, vec!["B", "S"]);
        assert!(g.heads_of(&[Symbol::from(Term::new("z"))]).is_empty());
    }

    #[test]
    fn inventories() {
        let interner = Interner::new();
        let g = freeze("S -> A B | ε\nA -> a\nB -> b", &interner).unwrap();
        let nts: Vec<_> = g.nonterminals().map(|nt| nt.to_string()).collect();
        assert_eq!(nts, vec!["A", "B", "S"]);
        let ts: Vec<_> = g.terminals().into_iter().map(|t| t.to_string()).collect();
        assert_eq!(ts, vec!["a", "b"]);
        assert!(g.derives_epsilon());
        assert!(g.is_cnf());
    }

    #[test]
    fn dangling_symbol() {
        let interner = Interner::new();
        assert_eq!(
            freeze("S -> a B", &interner),
            Err(GrammarError::DanglingSymbol {
                symbol: "B".into(),
                production: "S -> a B".into(),
            })
        );
    }

    #[test]
    fn misplaced_epsilon() {
        let interner = Interner::new();
        assert_eq!(
            freeze("S -> a A\nA -> a | ε", &interner),
            Err(GrammarError::UnexpectedEpsilon {
                production: "A -> ε".into(),
            })
        );
        assert!(freeze("S -> a S | ε", &interner).is_err());
    }

    #[test]
    fn restriction_stays_in_normal_form() {
        let interner = Interner::new();
        let g = freeze("S -> A B | A C\nA -> a\nB -> b\nC -> c", &interner).unwrap();
        let r = g.restrict_in(&["a", "b"], &interner).unwrap();
        assert!(r.is_cnf());
        let ts: Vec<_> = r.terminals().into_iter().map(|t| t.to_string()).collect();
        assert_eq!(ts, vec!["a", "b"]);
        assert!(r.productions_of(&Nonterm::new("C")).is_empty());
        let ab = [
            Symbol::from(Nonterm::new("A")),
            Symbol::from(Nonterm::new("B")),
        ];
        assert_eq!(r.heads_of(&ab), &[Nonterm::new("S")]);
        let same = freeze("S -> A B\nA -> a\nB -> b", &interner).unwrap();
        assert!(Arc::ptr_eq(&r, &same));
    }

    #[test]
    fn restriction_to_all_terminals_is_identity() {
        let interner = Interner::new();
        let g = freeze("S -> a S | b", &interner).unwrap();
        let r = g.restrict_in(&["a", "b", "z"], &interner).unwrap();
        assert!(Arc::ptr_eq(&g, &r));
    }

    #[test]
    fn debug_is_compact() {
        let interner = Interner::new();
        let g = freeze("S -> a", &interner).unwrap();
        let text = format!("{:?}", g);
        assert!(text.starts_with("FrozenGrammar { start: Nonterm(S), productions: 1"));
    }
}
