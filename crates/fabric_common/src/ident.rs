//! Interned identifiers for cheap cloning and O(1) equality comparison.
//!
//! Every name stored in the device database (wire names, bel names, intents,
//! port names, tile-type names) is an [`Ident`] into one [`Interner`]. The
//! database's identifier table is registered in order at load time, so the
//! raw index stored in the database and the interner key always agree.

use lasso::ThreadedRodeo;
use serde::{Deserialize, Serialize};

/// A unique identifier for any named entity in the device or netlist.
///
/// Identifiers are interned strings represented as a `u32` index into a
/// string interner. This provides O(1) equality comparison and O(1) cloning.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct Ident(u32);

impl Ident {
    /// Creates an `Ident` from a raw `u32` index.
    ///
    /// Used by the device database, whose records store identifiers as raw
    /// indices. In normal use, identifiers are created through
    /// [`Interner::get_or_intern`].
    pub const fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw `u32` index of this identifier.
    pub const fn as_raw(self) -> u32 {
        self.0
    }
}

// SAFETY: `Ident` wraps a `u32` which is always a valid `usize` on 32-bit and
// 64-bit platforms. `try_from_usize` rejects values that don't fit in `u32`.
unsafe impl lasso::Key for Ident {
    fn into_usize(self) -> usize {
        self.0 as usize
    }

    fn try_from_usize(int: usize) -> Option<Self> {
        u32::try_from(int).ok().map(Ident)
    }
}

/// Thread-safe string interner backed by [`lasso::ThreadedRodeo`].
///
/// Keys are handed out densely in insertion order, which is what lets the
/// device loader register the database's identifier table and have each
/// string land on the index the database expects.
pub struct Interner {
    rodeo: ThreadedRodeo<Ident>,
}

impl Interner {
    /// Creates a new empty interner.
    pub fn new() -> Self {
        Self {
            rodeo: ThreadedRodeo::new(),
        }
    }

    /// Interns a string, returning its [`Ident`]. If the string was already
    /// interned, returns the existing identifier without allocating.
    pub fn get_or_intern(&self, s: &str) -> Ident {
        self.rodeo.get_or_intern(s)
    }

    /// Returns the identifier of an already-interned string, without interning it.
    ///
    /// Name lookups use this so that querying an unknown name never grows the table.
    pub fn get(&self, s: &str) -> Option<Ident> {
        self.rodeo.get(s)
    }

    /// Resolves an [`Ident`] back to its string value.
    ///
    /// # Panics
    ///
    /// Panics if the `Ident` was not created by this interner.
    pub fn resolve(&self, ident: Ident) -> &str {
        self.rodeo.resolve(&ident)
    }

    /// Resolves an [`Ident`], returning `None` if it is out of range.
    pub fn try_resolve(&self, ident: Ident) -> Option<&str> {
        self.rodeo.try_resolve(&ident)
    }

    /// Returns the number of interned strings.
    pub fn len(&self) -> usize {
        self.rodeo.len()
    }

    /// Returns `true` if nothing has been interned yet.
    pub fn is_empty(&self) -> bool {
        self.rodeo.is_empty()
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Interner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interner").field("len", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_resolve_roundtrip() {
        let interner = Interner::new();
        let id = interner.get_or_intern("CLBLL_L");
        assert_eq!(interner.resolve(id), "CLBLL_L");
    }

    #[test]
    fn same_string_same_ident() {
        let interner = Interner::new();
        let a = interner.get_or_intern("NODE_PINFEED");
        let b = interner.get_or_intern("NODE_PINFEED");
        assert_eq!(a, b);
    }

    #[test]
    fn keys_are_dense_in_insertion_order() {
        let interner = Interner::new();
        let a = interner.get_or_intern("");
        let b = interner.get_or_intern("A1");
        let c = interner.get_or_intern("A2");
        assert_eq!(a.as_raw(), 0);
        assert_eq!(b.as_raw(), 1);
        assert_eq!(c.as_raw(), 2);
        assert_eq!(interner.len(), 3);
    }

    #[test]
    fn get_does_not_intern() {
        let interner = Interner::new();
        assert!(interner.get("missing").is_none());
        assert!(interner.is_empty());
        let id = interner.get_or_intern("present");
        assert_eq!(interner.get("present"), Some(id));
    }

    #[test]
    fn try_resolve_out_of_range() {
        let interner = Interner::new();
        interner.get_or_intern("only");
        assert!(interner.try_resolve(Ident::from_raw(7)).is_none());
    }

    #[test]
    fn serde_roundtrip() {
        let id = Ident(42);
        let json = serde_json::to_string(&id).unwrap();
        let back: Ident = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
