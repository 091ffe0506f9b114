//! String interner for type and parameter names.
//!
//! Type names are interned once into a pool and passed around as `u32`
//! handles (Atoms). Display names of instantiations such as
//! `IEnumerable<string>` are built once when the instantiation is interned
//! and then shared by every query that reports on it.

use rustc_hash::FxHashMap;
use serde::Serialize;
use std::sync::Arc;

/// An interned string identifier.
///
/// Atoms are cheap to copy (just a u32) and can be compared with == in O(1).
/// To get the actual string, use `Interner::resolve(atom)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Default, PartialOrd, Ord)]
pub struct Atom(pub u32);

impl Atom {
    /// The empty string.
    pub const NONE: Atom = Atom(0);
}

/// Names of the well-known library types most catalogs declare.
const COMMON_NAMES: &[&str] = &[
    "object",
    "ValueType",
    "Array",
    "Enum",
    "string",
    "bool",
    "char",
    "int",
    "long",
    "double",
    "Nullable",
    "IEnumerable",
    "IReadOnlyCollection",
    "IReadOnlyList",
    "ICollection",
    "IList",
    "List",
    "Action",
    "Func",
    "T",
    "TKey",
    "TValue",
    "TResult",
];

/// String interner that deduplicates strings and returns Atom handles.
///
/// # Example
/// ```
/// use genbind_common::interner::Interner;
/// let mut interner = Interner::new();
/// let a1 = interner.intern("List");
/// let a2 = interner.intern("List");
/// assert_eq!(a1, a2);
/// assert_eq!(interner.resolve(a1), "List");
/// ```
#[derive(Clone)]
pub struct Interner {
    /// Map from string to atom index
    map: FxHashMap<Arc<str>, Atom>,
    /// Vector of all interned strings (index 0 is empty string)
    strings: Vec<Arc<str>>,
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

impl Interner {
    /// Create a new interner with the empty string pre-interned at index 0.
    pub fn new() -> Self {
        let mut interner = Interner {
            map: FxHashMap::default(),
            strings: Vec::with_capacity(256),
        };
        // Index 0 is reserved for empty/none
        let empty: Arc<str> = Arc::from("");
        interner.strings.push(empty.clone());
        interner.map.insert(empty, Atom::NONE);
        interner
    }

    /// Intern a string, returning its Atom handle.
    /// If the string was already interned, returns the existing Atom.
    #[inline]
    pub fn intern(&mut self, s: &str) -> Atom {
        if let Some(&atom) = self.map.get(s) {
            return atom;
        }
        let atom = Atom(self.strings.len() as u32);
        let owned: Arc<str> = Arc::from(s);
        self.strings.push(owned.clone());
        self.map.insert(owned, atom);
        atom
    }

    /// Intern an owned String, avoiding a second allocation when it is new.
    #[inline]
    pub fn intern_owned(&mut self, s: String) -> Atom {
        if let Some(&atom) = self.map.get(s.as_str()) {
            return atom;
        }
        let atom = Atom(self.strings.len() as u32);
        let owned: Arc<str> = Arc::from(s.into_boxed_str());
        self.strings.push(owned.clone());
        self.map.insert(owned, atom);
        atom
    }

    /// Look up a string without interning it.
    #[inline]
    pub fn get(&self, s: &str) -> Option<Atom> {
        self.map.get(s).copied()
    }

    /// Resolve an Atom back to its string value.
    /// Returns empty string if atom is out of bounds.
    #[inline]
    pub fn resolve(&self, atom: Atom) -> &str {
        self.strings
            .get(atom.0 as usize)
            .map(|s| s.as_ref())
            .unwrap_or("")
    }

    /// Get the number of interned strings.
    #[inline]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Check if the interner is empty (only has the empty string).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.strings.len() <= 1
    }

    /// Pre-intern the names of well-known library types.
    pub fn intern_common(&mut self) {
        for s in COMMON_NAMES {
            self.intern(s);
        }
    }
}

#[cfg(test)]
#[path = "../tests/interner_tests.rs"]
mod tests;
