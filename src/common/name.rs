// Copyright (c) 2016-2020 Fabian Schuiki

//! A name table that internalizes all names presented to it and hands out
//! shared, reference-counted strings. Equal text interned in the same table
//! shares one backing allocation, which keeps large grammars lean and makes
//! most comparisons a pointer check.

use once_cell::sync::Lazy;
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::{Arc, RwLock};

/// A shared string that acts like a regular str slice, hiding the fact that it
/// is wrapped in an `Arc`.
///
/// Names compare by their text. Names obtained from the same `NameTable` share
/// their allocation, in which case equality short-circuits on the pointer.
#[derive(Clone)]
pub struct Name(Arc<str>);

impl Name {
    /// Create a new name which is a copy of `value`. The name is not interned.
    pub fn new(value: &str) -> Name {
        Name(Arc::from(value))
    }

    /// Return the string representation of this name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check whether two names share the same backing allocation.
    pub fn ptr_eq(a: &Name, b: &Name) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }
}

impl PartialEq for Name {
    fn eq(&self, other: &Name) -> bool {
        Name::ptr_eq(self, other) || self.0 == other.0
    }
}

impl Eq for Name {}

impl PartialOrd for Name {
    fn partial_cmp(&self, other: &Name) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Name {
    fn cmp(&self, other: &Name) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl Hash for Name {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state)
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self.as_str(), f)
    }
}

impl Borrow<str> for Name {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl Deref for Name {
    type Target = str;
    fn deref(&self) -> &str {
        self.as_str()
    }
}

impl From<&str> for Name {
    fn from(value: &str) -> Name {
        Name::new(value)
    }
}

impl From<String> for Name {
    fn from(value: String) -> Name {
        Name(Arc::from(value))
    }
}

/// A lookup table of names. The table only ever grows; interned names live for
/// as long as the table or any name handed out by it.
#[derive(Default)]
pub struct NameTable {
    set: RwLock<HashSet<Name>>,
}

impl NameTable {
    /// Create a new empty name table.
    pub fn new() -> NameTable {
        Default::default()
    }

    /// Obtain the interned name for a string. This either inserts the string
    /// into the table, or returns the existing name if the string already
    /// exists in the table.
    pub fn intern(&self, value: &str) -> Name {
        if let Some(name) = self.find(value) {
            return name;
        }

        // Another thread may have inserted the same string between dropping the
        // read lock and acquiring the write lock, so check again.
        let mut set = self.set.write().unwrap_or_else(|e| e.into_inner());
        if let Some(name) = set.get(value) {
            return name.clone();
        }
        let name = Name::new(value);
        set.insert(name.clone());
        name
    }

    /// Re-intern an existing name. Returns the table's copy of the name, which
    /// is `name` itself if it was not yet present.
    pub fn intern_name(&self, name: &Name) -> Name {
        if let Some(found) = self.find(name.as_str()) {
            return found;
        }
        let mut set = self.set.write().unwrap_or_else(|e| e.into_inner());
        if let Some(found) = set.get(name.as_str()) {
            return found.clone();
        }
        set.insert(name.clone());
        name.clone()
    }

    /// Try to find a string.
    pub fn find(&self, value: &str) -> Option<Name> {
        let set = self.set.read().unwrap_or_else(|e| e.into_inner());
        set.get(value).cloned()
    }

    /// Number of distinct names in the table.
    pub fn len(&self) -> usize {
        self.set.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Check whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Get the process-wide name table.
pub fn get_name_table() -> Arc<NameTable> {
    static TBL: Lazy<Arc<NameTable>> = Lazy::new(|| Arc::new(NameTable::new()));
    TBL.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn interned_names_share_storage() {
        let tbl = NameTable::new();
        let a = tbl.intern("expr");
        let b = tbl.intern("expr");
        assert!(Name::ptr_eq(&a, &b));
        assert_eq!(tbl.len(), 1);
    }

    #[test]
    fn uninterned_names_compare_by_text() {
        let a = Name::new("expr");
        let b = Name::from(String::from("expr"));
        assert!(!Name::ptr_eq(&a, &b));
        assert_eq!(a, b);
        assert!(Name::new("a") < Name::new("b"));
    }

    #[test]
    fn intern_name_adopts_first_copy() {
        let tbl = NameTable::new();
        let a = Name::new("stmt");
        let b = Name::new("stmt");
        let ia = tbl.intern_name(&a);
        let ib = tbl.intern_name(&b);
        assert!(Name::ptr_eq(&ia, &a));
        assert!(Name::ptr_eq(&ib, &a));
    }

    #[test]
    fn concurrent_interning() {
        let tbl = Arc::new(NameTable::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let tbl = tbl.clone();
                thread::spawn(move || {
                    (0..100)
                        .map(|i| tbl.intern(&format!("n{}", i)))
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(tbl.len(), 100);
        for names in &results[1..] {
            for (a, b) in names.iter().zip(results[0].iter()) {
                assert!(Name::ptr_eq(a, b));
            }
        }
    }

    #[test]
    fn global_table_is_shared() {
        let a = get_name_table().intern("__global_table_test");
        let b = get_name_table().intern("__global_table_test");
        assert!(Name::ptr_eq(&a, &b));
    }
}
