//! In-memory Last-Writer-Wins key-value storage.
//!
//! Each key maps to the single write with the greatest `(ts, origin)` pair the
//! node has observed. Because that choice depends only on the set of writes and
//! never on their arrival order, `apply` is commutative and idempotent, and
//! nodes that observe the same writes converge.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The surviving write for one key.
///
/// Serializes as `{value, ts, origin}`, the shape used by `/status` and `/sync`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub value: Value,
    pub ts: u64,
    pub origin: String,
}

impl Entry {
    pub fn new(value: Value, ts: u64, origin: impl Into<String>) -> Self {
        Self {
            value,
            ts,
            origin: origin.into(),
        }
    }

    /// Returns true if `self` strictly beats `other` under LWW ordering.
    ///
    /// Higher timestamp wins; on equal timestamps the lexicographically
    /// greater origin id wins.
    pub fn wins_over(&self, other: &Entry) -> bool {
        (self.ts, self.origin.as_str()) > (other.ts, other.origin.as_str())
    }
}

/// LWW map from key to [`Entry`].
///
/// Not synchronized on its own; [`crate::state::NodeState`] owns it together
/// with the clock. BTreeMap keeps `/status` output in key order.
#[derive(Debug, Default)]
pub struct KvStore {
    entries: BTreeMap<String, Entry>,
}

impl KvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges a write into the store. Returns whether it replaced the current
    /// entry (or created one).
    ///
    /// Re-applying a write that is already stored returns `false`.
    pub fn apply(&mut self, key: &str, value: Value, ts: u64, origin: &str) -> bool {
        let incoming = Entry::new(value, ts, origin);
        match self.entries.get_mut(key) {
            None => {
                self.entries.insert(key.to_string(), incoming);
                true
            }
            Some(current) if incoming.wins_over(current) => {
                *current = incoming;
                true
            }
            Some(_) => false,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.entries.get(key)
    }

    /// Copies every entry out of the store.
    pub fn snapshot(&self) -> BTreeMap<String, Entry> {
        self.entries.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn first_write_to_key_is_inserted() {
        let mut store = KvStore::new();
        assert!(store.apply("x", json!("1"), 1, "A"));
        assert_eq!(store.get("x"), Some(&Entry::new(json!("1"), 1, "A")));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn higher_timestamp_replaces_entry() {
        let mut store = KvStore::new();
        store.apply("x", json!("old"), 3, "Z");
        assert!(store.apply("x", json!("new"), 4, "A"));
        assert_eq!(store.get("x").map(|e| &e.value), Some(&json!("new")));
    }

    #[test]
    fn lower_timestamp_is_rejected() {
        let mut store = KvStore::new();
        store.apply("x", json!("new"), 5, "A");
        assert!(!store.apply("x", json!("old"), 4, "Z"));
        assert_eq!(store.get("x"), Some(&Entry::new(json!("new"), 5, "A")));
    }

    #[test]
    fn equal_timestamp_breaks_tie_on_origin() {
        let mut store = KvStore::new();
        store.apply("x", json!("from-b"), 2, "B");
        assert!(!store.apply("x", json!("from-a"), 2, "A"));
        assert!(store.apply("x", json!("from-c"), 2, "C"));
        assert_eq!(store.get("x").map(|e| e.origin.as_str()), Some("C"));
    }

    #[test]
    fn reapplying_same_write_is_a_no_op() {
        let mut store = KvStore::new();
        assert!(store.apply("x", json!({"n": 1}), 7, "A"));
        assert!(!store.apply("x", json!({"n": 1}), 7, "A"));
        assert_eq!(store.get("x"), Some(&Entry::new(json!({"n": 1}), 7, "A")));
    }

    #[test]
    fn same_version_with_different_value_does_not_replace() {
        let mut store = KvStore::new();
        store.apply("x", json!("first"), 7, "A");
        assert!(!store.apply("x", json!("second"), 7, "A"));
        assert_eq!(store.get("x").map(|e| &e.value), Some(&json!("first")));
    }

    #[test]
    fn snapshot_is_detached_copy() {
        let mut store = KvStore::new();
        store.apply("b", json!(2), 1, "A");
        store.apply("a", json!(1), 2, "A");
        let snapshot = store.snapshot();
        store.apply("c", json!(3), 3, "A");

        assert_eq!(snapshot.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn origin_comparison_is_bytewise() {
        let upper = Entry::new(json!(null), 1, "Node");
        let lower = Entry::new(json!(null), 1, "node");
        assert!(lower.wins_over(&upper));
        assert!(!upper.wins_over(&lower));
        assert!(!upper.wins_over(&upper));
    }
}
