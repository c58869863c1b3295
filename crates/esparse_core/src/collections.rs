//! Hash collections used throughout the parser.
//!
//! Label sets, parameter name sets and export name sets are small and keyed
//! by short strings, so the fast non-cryptographic Fx hasher is used.

pub use rustc_hash::{FxHashMap, FxHashSet};

/// A set of names borrowed from the source text or the arena.
pub type NameSet<'a> = FxHashSet<&'a str>;

/// Create an empty name set.
#[inline]
pub fn name_set<'a>() -> NameSet<'a> {
    FxHashSet::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_set_detects_duplicates() {
        let mut names = name_set();
        assert!(names.insert("a"));
        assert!(names.insert("b"));
        assert!(!names.insert("a"));
        assert_eq!(names.len(), 2);
    }
}
