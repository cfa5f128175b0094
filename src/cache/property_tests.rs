//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the eviction invariants over random operation
//! sequences, with time driven by a manual clock. Every property runs over
//! both expiry structures, with deadlines arriving out of append order.

use proptest::prelude::*;
use proptest::test_runner::TestCaseError;

use crate::cache::{
    CacheStore, ChunkedExpiryList, ExpiryItem, ExpiryStructure, MAX_PRIORITY, MIN_PRIORITY,
};
use crate::clock::ManualClock;

// == Test Configuration ==
const TEST_MAX_ITEMS: usize = 8;

/// Small blocks so a handful of entries spans several of them
const TEST_BLOCK_SIZE: usize = 2;

// == Strategies ==
/// Small key space so shadowing happens often
fn key_strategy() -> impl Strategy<Value = String> {
    "[A-F]".prop_map(|s| s)
}

fn priority_strategy() -> impl Strategy<Value = u8> {
    MIN_PRIORITY..=MAX_PRIORITY
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set {
        key: String,
        value: i32,
        priority: u8,
        ttl: i64,
    },
    Get {
        key: String,
    },
    SetMaxItems {
        max_items: usize,
    },
    Advance {
        secs: i64,
    },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        4 => (key_strategy(), any::<i32>(), priority_strategy(), -1i64..20)
            .prop_map(|(key, value, priority, ttl)| CacheOp::Set { key, value, priority, ttl }),
        2 => key_strategy().prop_map(|key| CacheOp::Get { key }),
        1 => (0usize..12).prop_map(|max_items| CacheOp::SetMaxItems { max_items }),
        1 => (0i64..5).prop_map(|secs| CacheOp::Advance { secs }),
    ]
}

type HeapStore = CacheStore<i32, ManualClock>;
type ChunkedStore = CacheStore<i32, ManualClock, ChunkedExpiryList<ExpiryItem>>;

fn heap_store() -> (HeapStore, ManualClock) {
    let clock = ManualClock::new();
    (CacheStore::with_clock(TEST_MAX_ITEMS, clock.clone()), clock)
}

fn chunked_store() -> (ChunkedStore, ManualClock) {
    let clock = ManualClock::new();
    (
        CacheStore::with_chunked_list(TEST_MAX_ITEMS, TEST_BLOCK_SIZE, clock.clone()),
        clock,
    )
}

// == Checks ==
// Each check drives one store; the proptest bodies run it on both backends.

fn check_capacity_invariant<S: ExpiryStructure<ExpiryItem>>(
    mut store: CacheStore<i32, ManualClock, S>,
    clock: ManualClock,
    ops: &[CacheOp],
) -> Result<(), TestCaseError> {
    for op in ops {
        match op {
            CacheOp::Set { key, value, priority, ttl } => {
                store.set(key, *value, *priority, *ttl).unwrap();
            }
            CacheOp::Get { key } => {
                let _ = store.get(key);
            }
            CacheOp::SetMaxItems { max_items } => store.set_max_items(*max_items),
            CacheOp::Advance { secs } => clock.advance_secs(*secs),
        }

        prop_assert!(
            store.len() <= store.max_items(),
            "Cache size {} exceeds max {}",
            store.len(),
            store.max_items()
        );
        prop_assert!(store.expiry_len() <= store.expiry_limit());
        prop_assert!(store.keys().len() <= store.len());
    }
    Ok(())
}

fn check_priority_precedence<S: ExpiryStructure<ExpiryItem>>(
    mut store: CacheStore<i32, ManualClock, S>,
    entries: &[(u8, i64)],
) -> Result<(), TestCaseError> {
    let capacity = entries.len() - 1;
    store.set_max_items(capacity + 1);

    for (i, (priority, ttl)) in entries.iter().enumerate() {
        store.set(&format!("k{:02}", i), i as i32, *priority, *ttl).unwrap();
    }
    store.set_max_items(capacity);

    let remaining: Vec<u8> = store.snapshot().iter().map(|view| view.priority).collect();
    let lowest = entries.iter().map(|(p, _)| *p).min().unwrap();
    let lowest_count = entries.iter().filter(|(p, _)| *p == lowest).count();
    let lowest_left = remaining.iter().filter(|p| **p == lowest).count();

    prop_assert_eq!(remaining.len(), capacity);
    prop_assert_eq!(lowest_left, lowest_count - 1);
    Ok(())
}

fn check_expiry_precedence<S: ExpiryStructure<ExpiryItem>>(
    mut store: CacheStore<i32, ManualClock, S>,
    clock: ManualClock,
    entries: &[(u8, bool)],
) -> Result<(), TestCaseError> {
    store.set_max_items(entries.len());

    // Short and long lifetimes interleave, so deadlines are out of order.
    for (i, (priority, short_lived)) in entries.iter().enumerate() {
        let (prefix, ttl) = if *short_lived { ("short", 1) } else { ("long", 60) };
        store.set(&format!("{}{:02}", prefix, i), 0, *priority, ttl).unwrap();
    }
    let long_count = entries.iter().filter(|(_, short)| !short).count();

    clock.advance_secs(2);
    // One more entry forces the sweep through `set`.
    store.set_max_items(long_count + 1);
    store.set("zz", 1, MIN_PRIORITY, 60).unwrap();

    let keys = store.keys();
    prop_assert_eq!(keys.len(), long_count + 1);
    prop_assert!(keys.iter().all(|key| !key.starts_with("short")));
    Ok(())
}

fn check_lru_refresh<S: ExpiryStructure<ExpiryItem>>(
    mut store: CacheStore<i32, ManualClock, S>,
    ttls: &[i64],
    touched: usize,
) -> Result<(), TestCaseError> {
    store.set_max_items(ttls.len() + 1);

    for (i, ttl) in ttls.iter().enumerate() {
        store.set(&format!("k{}", i), i as i32, 1, *ttl).unwrap();
    }
    prop_assert_eq!(store.get(&format!("k{}", touched)), Some(touched as i32));

    store.set_max_items(1);
    prop_assert_eq!(store.keys(), vec![format!("k{}", touched)]);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // After every mutating call the item count stays within capacity and the
    // expiry structure stays within its slack.
    #[test]
    fn prop_capacity_invariant(ops in prop::collection::vec(cache_op_strategy(), 1..100)) {
        let (store, clock) = heap_store();
        check_capacity_invariant(store, clock, &ops)?;

        let (store, clock) = chunked_store();
        check_capacity_invariant(store, clock, &ops)?;
    }

    // Under capacity pressure with nothing expired, the evicted entry has the
    // lowest priority present.
    #[test]
    fn prop_priority_precedence(
        entries in prop::collection::vec((priority_strategy(), 10i64..100), 2..20)
    ) {
        check_priority_precedence(heap_store().0, &entries)?;
        check_priority_precedence(chunked_store().0, &entries)?;
    }

    // Expired entries go before any live entry, whatever their priority.
    #[test]
    fn prop_expiry_precedence(
        entries in prop::collection::vec((priority_strategy(), any::<bool>()), 1..12)
    ) {
        let (store, clock) = heap_store();
        check_expiry_precedence(store, clock, &entries)?;

        let (store, clock) = chunked_store();
        check_expiry_precedence(store, clock, &entries)?;
    }

    // Reading a key protects it from same-priority peers.
    #[test]
    fn prop_lru_refresh(
        ttls in prop::collection::vec(10i64..100, 2..10),
        touched in 0usize..10,
    ) {
        let touched = touched % ttls.len();
        check_lru_refresh(heap_store().0, &ttls, touched)?;
        check_lru_refresh(chunked_store().0, &ttls, touched)?;
    }
}
