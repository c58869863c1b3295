//! Arena allocation helpers.
//!
//! Every AST node, node list, token list and decoded string produced by a
//! parse lives in a caller-owned bump arena. The whole tree is freed at once
//! when the arena is dropped.

use bumpalo::Bump;

/// Move the contents of a `Vec` into the arena and return them as a slice.
#[inline]
pub fn alloc_vec_in<T>(arena: &Bump, vec: Vec<T>) -> &[T] {
    if vec.is_empty() {
        return &[];
    }
    arena.alloc_slice_fill_iter(vec)
}

/// Copy a string into the arena unless it is empty.
#[inline]
pub fn alloc_str_in<'a>(arena: &'a Bump, s: &str) -> &'a str {
    if s.is_empty() {
        return "";
    }
    arena.alloc_str(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_vec_in() {
        let arena = Bump::new();
        let slice = alloc_vec_in(&arena, vec![1, 2, 3]);
        assert_eq!(slice, &[1, 2, 3]);
        let empty: &[u8] = alloc_vec_in(&arena, Vec::new());
        assert!(empty.is_empty());
    }

    #[test]
    fn test_alloc_str_in() {
        let arena = Bump::new();
        let owned = String::from("hello");
        let s = alloc_str_in(&arena, &owned);
        drop(owned);
        assert_eq!(s, "hello");
        assert_eq!(alloc_str_in(&arena, ""), "");
    }
}
