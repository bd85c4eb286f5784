//! Fast hash set alias.
//!
//! Keys in this workspace are short paths that never come from untrusted
//! hash-flooding sources, so the faster non-DoS-resistant hasher is fine.

/// A [`HashSet`](std::collections::HashSet) using the Fx hash algorithm.
pub type FxHashSet<V> = rustc_hash::FxHashSet<V>;

/// Creates a new empty [`FxHashSet`].
#[inline]
#[must_use]
pub fn fx_hash_set<V>() -> FxHashSet<V> {
    FxHashSet::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fx_hash_set_dedup() {
        let mut set: FxHashSet<&str> = fx_hash_set();
        assert!(set.insert("web"));
        assert!(!set.insert("web"));
    }
}
