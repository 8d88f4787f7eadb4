//! Clock and store guarded by a single lock.
//!
//! Handlers never see the lock. Each method below is one critical section, so a
//! clock advance and the store write it stamps are observed together by any
//! concurrent `/status` or `/sync` reader.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::Value;

use crate::clock::LamportClock;
use crate::store::{Entry, KvStore};

/// Outcome of a locally originated write.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalWrite {
    pub key: String,
    pub entry: Entry,
    /// Clock value right after the write, as reported back to the client.
    pub lamport: u64,
}

#[derive(Debug, Default)]
struct Inner {
    clock: LamportClock,
    store: KvStore,
}

/// Shared logical time and data of one node.
#[derive(Debug)]
pub struct NodeState {
    node_id: String,
    inner: Mutex<Inner>,
}

impl NodeState {
    pub fn new(node_id: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    // Every critical section leaves clock and store consistent, so a
    // poisoned lock is safe to keep using.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Ticks the clock and stores the write under this node's id.
    ///
    /// The fresh timestamp is the highest this node has produced, so the write
    /// only loses if a remote write with a larger timestamp is already stored.
    pub fn local_write(&self, key: &str, value: Value) -> LocalWrite {
        let mut inner = self.lock();
        let ts = inner.clock.tick_local();
        inner.store.apply(key, value.clone(), ts, &self.node_id);
        LocalWrite {
            key: key.to_string(),
            entry: Entry::new(value, ts, self.node_id.clone()),
            lamport: inner.clock.peek(),
        }
    }

    /// Folds a replicated write into local time and merges it.
    pub fn receive_write(&self, key: &str, value: Value, ts: u64, origin: &str) -> bool {
        let mut inner = self.lock();
        inner.clock.tick_receive(ts);
        inner.store.apply(key, value, ts, origin)
    }

    /// Merges a peer's full snapshot. Returns how many entries were applied.
    pub fn merge_snapshot(&self, lamport: u64, entries: BTreeMap<String, Entry>) -> usize {
        let mut inner = self.lock();
        inner.clock.tick_receive(lamport);
        let mut applied = 0;
        for (key, entry) in entries {
            if inner.store.apply(&key, entry.value, entry.ts, &entry.origin) {
                applied += 1;
            }
        }
        applied
    }

    /// Returns the entry for `key` along with the current clock value.
    pub fn lookup(&self, key: &str) -> Option<(Entry, u64)> {
        let inner = self.lock();
        inner
            .store
            .get(key)
            .map(|entry| (entry.clone(), inner.clock.peek()))
    }

    /// Returns the clock value and a copy of the whole store, read atomically.
    pub fn status(&self) -> (u64, BTreeMap<String, Entry>) {
        let inner = self.lock();
        (inner.clock.peek(), inner.store.snapshot())
    }

    pub fn lamport(&self) -> u64 {
        self.lock().clock.peek()
    }
}
