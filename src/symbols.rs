// ABOUTME: Global intern pool mapping byte strings to canonical symbol identity

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// A symbol's identity. Two `Symbol`s are the same symbol iff `Rc::ptr_eq`
/// holds; comparing the underlying bytes should never be necessary outside
/// of `intern` itself.
pub type Symbol = Rc<[u8]>;

thread_local! {
    // Keyed by owned bytes so lookups don't need an existing Rc to compare against.
    // Entries are never removed: the intern pool is process-lifetime, per spec.
    static POOL: RefCell<HashMap<Vec<u8>, Symbol>> = RefCell::new(HashMap::new());
}

/// Interns `bytes`, returning the canonical `Symbol` for that byte sequence.
/// Byte-equal inputs always return the same `Rc` allocation.
pub fn intern(bytes: &[u8]) -> Symbol {
    POOL.with(|pool| {
        let mut pool = pool.borrow_mut();
        if let Some(existing) = pool.get(bytes) {
            return Rc::clone(existing);
        }
        let sym: Symbol = Rc::from(bytes);
        pool.insert(bytes.to_vec(), Rc::clone(&sym));
        sym
    })
}

/// Convenience wrapper for interning a `&str`.
pub fn intern_str(s: &str) -> Symbol {
    intern(s.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_equal_inputs_share_identity() {
        let a = intern_str("hello");
        let b = intern_str("hello");
        assert!(Rc::ptr_eq(&a, &b));
    }

    #[test]
    fn distinct_text_is_distinct_identity() {
        let a = intern_str("foo");
        let b = intern_str("bar");
        assert!(!Rc::ptr_eq(&a, &b));
    }

    #[test]
    fn interning_from_owned_bytes_matches_pool_entry() {
        let built: Vec<u8> = vec![b'x', b'y', b'z'];
        let a = intern(&built);
        let b = intern_str("xyz");
        assert!(Rc::ptr_eq(&a, &b));
    }
}
