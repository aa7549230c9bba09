//! Interned identifiers.
//!
//! Identifiers (variable names, function names, keywords) are compared and
//! hashed constantly throughout the pipeline — once per token, once per
//! scope lookup, once per IR name. Interning turns all of that into `u32`
//! equality instead of string comparison. The compiler is single-threaded
//! (see the concurrency model), so the table is a plain `RefCell`, not a
//! lock.

use std::cell::RefCell;
use std::fmt;

use crate::FxHashMap;

thread_local! {
    static TABLE: RefCell<StringTable> = RefCell::new(StringTable::new());
}

struct StringTable {
    strings: Vec<String>,
    lookup: FxHashMap<String, u32>,
}

impl StringTable {
    fn new() -> Self {
        Self {
            strings: Vec::new(),
            lookup: FxHashMap::default(),
        }
    }

    fn intern(&mut self, s: &str) -> u32 {
        if let Some(&idx) = self.lookup.get(s) {
            return idx;
        }
        let idx = self.strings.len() as u32;
        self.strings.push(s.to_owned());
        self.lookup.insert(s.to_owned(), idx);
        idx
    }

    fn resolve(&self, idx: u32) -> &str {
        &self.strings[idx as usize]
    }
}

/// An interned string. Cheap to copy, compare, and hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(u32);

impl Symbol {
    /// Interns `s`, returning the `Symbol` for it (reusing an existing
    /// entry if `s` was interned before).
    pub fn intern(s: &str) -> Self {
        TABLE.with(|t| Symbol(t.borrow_mut().intern(s)))
    }

    /// Returns the interned string as an owned `String`.
    ///
    /// Borrowing the underlying `&str` directly is not exposed because the
    /// backing table lives behind a `RefCell`; callers that need a `&str`
    /// should use [`Symbol::with_str`].
    pub fn as_string(self) -> String {
        TABLE.with(|t| t.borrow().resolve(self.0).to_owned())
    }

    /// Runs `f` with a borrowed view of the interned string, avoiding an
    /// allocation for the common case of a comparison or a formatted print.
    pub fn with_str<R>(self, f: impl FnOnce(&str) -> R) -> R {
        TABLE.with(|t| f(t.borrow().resolve(self.0)))
    }

    pub fn eq_str(self, s: &str) -> bool {
        self.with_str(|interned| interned == s)
    }

    pub fn len(self) -> usize {
        self.with_str(|s| s.len())
    }

    pub fn is_empty(self) -> bool {
        self.len() == 0
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with_str(|s| write!(f, "Symbol({:?})", s))
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with_str(|s| f.write_str(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_same_string_yields_equal_symbols() {
        let a = Symbol::intern("hello");
        let b = Symbol::intern("hello");
        assert_eq!(a, b);
    }

    #[test]
    fn interning_different_strings_yields_different_symbols() {
        let a = Symbol::intern("foo");
        let b = Symbol::intern("bar");
        assert_ne!(a, b);
    }

    #[test]
    fn round_trips_through_as_string() {
        let sym = Symbol::intern("factorial");
        assert_eq!(sym.as_string(), "factorial");
    }

    #[test]
    fn eq_str_avoids_allocation_but_matches_as_string() {
        let sym = Symbol::intern("n");
        assert!(sym.eq_str("n"));
        assert!(!sym.eq_str("m"));
    }

    #[test]
    fn display_matches_source_text() {
        let sym = Symbol::intern("x");
        assert_eq!(format!("{}", sym), "x");
    }
}
