//! Identifier management using string interning for efficient storage and comparison.
//!
//! This module provides the [`Name`] type used for item names and connection
//! endpoints throughout the statement model.

use std::{
    fmt,
    sync::{Mutex, OnceLock},
};

use string_interner::{DefaultStringInterner, DefaultSymbol, Symbol as _};

/// Global string interner for item names.
///
/// # Thread Safety
///
/// This uses `Mutex` for thread-safe access to the string interner.
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

fn interner() -> &'static Mutex<DefaultStringInterner> {
    INTERNER.get_or_init(|| Mutex::new(DefaultStringInterner::new()))
}

/// An interned item name.
///
/// Names are cheap to copy and compare; the string payload lives in a global
/// interner. Two `Name`s created from the same text are equal.
///
/// # Examples
///
/// ```
/// use dfd_core::identifier::Name;
///
/// let a = Name::new("DB");
/// let b = Name::new("DB");
/// assert_eq!(a, b);
/// assert_eq!(a, "DB");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Name(DefaultSymbol);

impl Name {
    /// Creates a `Name` from a string slice, interning it if necessary.
    pub fn new(name: &str) -> Self {
        let mut interner = interner().lock().expect("Failed to acquire interner lock");
        Self(interner.get_or_intern(name))
    }

    /// Resolves the name back to its string form.
    pub fn resolve(&self) -> String {
        let interner = interner().lock().expect("Failed to acquire interner lock");
        interner
            .resolve(self.0)
            .expect("Symbol should exist in interner")
            .to_string()
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let interner = interner().lock().expect("Failed to acquire interner lock");
        let str_value = interner
            .resolve(self.0)
            .expect("Symbol should exist in interner");
        write!(f, "{}", str_value)
    }
}

impl From<&str> for Name {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Name {
    /// Allows direct comparison with string slices: `name == "string"`
    fn eq(&self, other: &str) -> bool {
        let interner = interner().lock().expect("Failed to acquire interner lock");
        let self_str = interner
            .resolve(self.0)
            .expect("Symbol should exist in interner");
        self_str == other
    }
}

impl PartialEq<&str> for Name {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

// Ordering by interner symbol index. Consistent with Eq, and sufficient for
// ordered containers (the filter engine's graph node sets); not lexicographic.
impl PartialOrd for Name {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Name {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.to_usize().cmp(&other.0.to_usize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let id1 = Name::new("Store");
        let id2 = Name::new("Store");
        let id3 = Name::new("Channel");

        assert_eq!(id1, id2);
        assert_ne!(id1, id3);
        assert_eq!(id1, "Store");
    }

    #[test]
    fn test_display() {
        let id = Name::new("display_test");
        assert_eq!(format!("{}", id), "display_test");
    }

    #[test]
    fn test_resolve() {
        let id = Name::new("some item");
        assert_eq!(id.resolve(), "some item");
    }

    #[test]
    fn test_hash_and_eq() {
        use std::collections::HashMap;

        let id1 = Name::new("key1");
        let id2 = Name::new("key1");
        let id3 = Name::new("key2");

        let mut map = HashMap::new();
        map.insert(id1, "value1");
        map.insert(id3, "value2");

        assert_eq!(map.get(&id2), Some(&"value1"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_ord_consistent_with_eq() {
        let a = Name::new("ord_a");
        let b = Name::new("ord_b");
        assert_eq!(a.cmp(&a), std::cmp::Ordering::Equal);
        assert_ne!(a.cmp(&b), std::cmp::Ordering::Equal);
    }
}
