//! Property tests for LWW merge: convergence under reordering and idempotence.

use lamport_kv::clock::LamportClock;
use lamport_kv::state::NodeState;
use lamport_kv::store::{Entry, KvStore};
use proptest::prelude::*;
use rand::seq::SliceRandom;
use rand::{rngs::StdRng, SeedableRng};
use serde_json::json;

const KEYS: [&str; 3] = ["x", "y", "z"];
const ORIGINS: [&str; 4] = ["A", "B", "C", "D"];

#[derive(Debug, Clone)]
struct Write {
    key: &'static str,
    entry: Entry,
}

fn arb_write() -> impl Strategy<Value = Write> {
    (0..KEYS.len(), 0u64..20, 0..ORIGINS.len(), any::<u16>()).prop_map(
        |(key, ts, origin, payload)| Write {
            key: KEYS[key],
            entry: Entry::new(json!(payload), ts, ORIGINS[origin]),
        },
    )
}

/// Greatest `(ts, origin)` among the writes to `key`.
fn expected_winner(writes: &[Write], key: &str) -> Option<(u64, String)> {
    writes
        .iter()
        .filter(|w| w.key == key)
        .map(|w| (w.entry.ts, w.entry.origin.clone()))
        .max()
}

proptest! {
    #[test]
    fn replicas_converge_regardless_of_delivery_order(
        writes in prop::collection::vec(arb_write(), 1..40),
        seed in any::<u64>(),
        replicas in 2usize..5,
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut stores: Vec<KvStore> = (0..replicas).map(|_| KvStore::new()).collect();

        for store in &mut stores {
            let mut order = writes.clone();
            order.shuffle(&mut rng);
            for w in order {
                store.apply(w.key, w.entry.value, w.entry.ts, &w.entry.origin);
            }
        }

        for key in KEYS {
            let versions: Vec<Option<(u64, String)>> = stores
                .iter()
                .map(|s| s.get(key).map(|e| (e.ts, e.origin.clone())))
                .collect();
            for version in &versions {
                prop_assert_eq!(version, &expected_winner(&writes, key));
            }
        }
    }

    #[test]
    fn redelivery_never_changes_state(
        writes in prop::collection::vec(arb_write(), 1..30),
        seed in any::<u64>(),
    ) {
        let state = NodeState::new("R");
        for w in &writes {
            state.receive_write(w.key, w.entry.value.clone(), w.entry.ts, &w.entry.origin);
        }
        let (_, before) = state.status();

        let mut rng = StdRng::seed_from_u64(seed);
        let mut again = writes.clone();
        again.shuffle(&mut rng);
        for w in again {
            let applied = state.receive_write(w.key, w.entry.value, w.entry.ts, &w.entry.origin);
            prop_assert!(!applied);
        }

        let (_, after) = state.status();
        prop_assert_eq!(before, after);
    }

    #[test]
    fn tick_receive_is_max_plus_one(start in 0u64..1_000_000, remote in 0u64..2_000_000) {
        let mut clock = LamportClock::new();
        clock.tick_receive(start);
        let counter = clock.peek();
        prop_assert_eq!(clock.tick_receive(remote), counter.max(remote) + 1);
        prop_assert!(clock.peek() > counter);
    }
}
