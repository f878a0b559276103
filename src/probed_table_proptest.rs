#![cfg(test)]

// Property tests for ProbedTable kept inside the crate so they can check
// slot-level invariants that the public API does not expose.

use crate::config::{StridePolicy, TableConfig};
use crate::error::TableError;
use crate::probed_table::ProbedTable;
use hashbrown::HashMap;
use proptest::prelude::*;

// Pool-indexed operations: indices shrink to earlier keys, the pool shrinks,
// and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, String),
    Remove(usize),
    Get(usize),
    GetForeign(String),
}

fn arb_scenario() -> impl Strategy<Value = (usize, Vec<String>, Vec<OpI>)> {
    let capacity = prop_oneof![Just(2usize), Just(4), Just(8), Just(16)];
    let pool = proptest::collection::vec("[a-z0-9]{0,6}", 1..=48);
    (capacity, pool).prop_flat_map(|(capacity, pool)| {
        let idx = 0..pool.len();
        let op = prop_oneof![
            4 => (idx.clone(), "[a-z]{0,4}").prop_map(|(i, v)| OpI::Insert(i, v)),
            2 => idx.clone().prop_map(OpI::Remove),
            1 => idx.clone().prop_map(OpI::Get),
            1 => "[A-Z]{1,4}".prop_map(OpI::GetForeign),
        ];
        proptest::collection::vec(op, 1..200).prop_map(move |ops| (capacity, pool.clone(), ops))
    })
}

fn check_load_bounds(t: &ProbedTable) -> Result<(), TestCaseError> {
    let cfg = t.config();
    let cap = t.capacity() as f64;
    prop_assert!(t.len() <= t.capacity());
    // An insert checks the load before placing, so it may end one entry over.
    prop_assert!((t.len() as f64 - 1.0) / cap <= cfg.max_load_factor());
    prop_assert!(
        t.capacity() == cfg.initial_capacity() || t.load_factor() >= cfg.min_load_factor(),
        "load {} below minimum at capacity {}",
        t.load_factor(),
        t.capacity()
    );
    Ok(())
}

// Property: state-machine equivalence against hashbrown::HashMap.
// Invariants exercised after every operation:
// - `get` returns the latest inserted value; removed keys are absent.
// - `insert` returns the previous value; `remove` returns the removed one.
// - `len` equals the model size; slots hold unique, reachable keys.
// - Load stays within bounds and capacity never drops below the floor.
proptest! {
    #![proptest_config(ProptestConfig { cases: 96, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((capacity, pool, ops) in arb_scenario()) {
        let cfg = TableConfig::new().with_initial_capacity(capacity);
        let mut sut = ProbedTable::with_config(cfg).unwrap();
        let mut model: HashMap<String, String> = HashMap::new();

        for op in ops {
            match op {
                OpI::Insert(i, v) => {
                    let k = &pool[i];
                    let prev = sut.insert(k, &v).unwrap();
                    prop_assert_eq!(prev, model.insert(k.clone(), v));
                }
                OpI::Remove(i) => {
                    let k = &pool[i];
                    let removed = sut.remove(k).unwrap();
                    prop_assert_eq!(removed, model.remove(k));
                    prop_assert_eq!(sut.get(k), None);
                }
                OpI::Get(i) => {
                    let k = &pool[i];
                    prop_assert_eq!(sut.get(k), model.get(k).map(String::as_str));
                }
                OpI::GetForeign(k) => {
                    prop_assert_eq!(sut.get(&k), None);
                }
            }

            sut.assert_invariants();
            prop_assert_eq!(sut.len(), model.len());
            check_load_bounds(&sut)?;
            for (k, v) in &model {
                prop_assert_eq!(sut.get(k), Some(v.as_str()));
            }
        }
    }
}

// Property: growing and shrinking preserve the mapping exactly.
proptest! {
    #![proptest_config(ProptestConfig { cases: 48, .. ProptestConfig::default() })]
    #[test]
    fn prop_resize_preserves_mapping(keys in proptest::collection::hash_set("[a-z]{1,8}", 1..120)) {
        let mut sut = ProbedTable::with_config(TableConfig::new().with_initial_capacity(2)).unwrap();
        let keys: Vec<String> = keys.into_iter().collect();
        for k in &keys {
            sut.insert(k, &k.to_uppercase()).unwrap();
        }
        let grown = sut.capacity();
        for k in &keys {
            let upper = k.to_uppercase();
            prop_assert_eq!(sut.get(k), Some(upper.as_str()));
        }

        let (gone, kept) = keys.split_at(keys.len() * 7 / 8);
        for k in gone {
            sut.remove(k).unwrap();
        }
        prop_assert!(sut.capacity() <= grown);
        sut.assert_invariants();
        for k in kept {
            let upper = k.to_uppercase();
            prop_assert_eq!(sut.get(k), Some(upper.as_str()));
        }
        for k in gone {
            prop_assert!(!sut.contains_key(k));
        }
    }
}

// Property: with the raw stride a probe may stop short, but a failed insert
// never changes the mapping, and a failed resize keeps the old capacity.
// Removals always succeed; a shrink that cannot place every entry is skipped.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_unadjusted_failures_are_atomic(keys in proptest::collection::vec("[a-z]{1,4}", 1..60)) {
        let cfg = TableConfig::new()
            .with_initial_capacity(4)
            .with_stride_policy(StridePolicy::Unadjusted);
        let mut sut = ProbedTable::with_config(cfg).unwrap();
        let mut model: HashMap<String, String> = HashMap::new();

        for (n, k) in keys.iter().enumerate() {
            let v = n.to_string();
            let before = sut.capacity();
            match sut.insert(k, &v) {
                Ok(prev) => {
                    prop_assert_eq!(prev, model.insert(k.clone(), v));
                }
                // A resize that fails reports its target capacity.
                Err(TableError::TableFull { capacity, .. }) if capacity != sut.capacity() => {
                    prop_assert_eq!(sut.capacity(), before);
                }
                Err(TableError::TableFull { .. }) => {
                    prop_assert!(!model.contains_key(k));
                }
                Err(other) => {
                    prop_assert!(false, "unexpected error: {}", other);
                }
            }
            sut.assert_invariants();
            prop_assert_eq!(sut.len(), model.len());
            for (mk, mv) in &model {
                prop_assert_eq!(sut.get(mk), Some(mv.as_str()));
            }
        }

        for k in &keys {
            let removed = sut.remove(k);
            prop_assert_eq!(removed, Ok(model.remove(k)));
            prop_assert!(!sut.contains_key(k));
            sut.assert_invariants();
            prop_assert_eq!(sut.len(), model.len());
            for (mk, mv) in &model {
                prop_assert_eq!(sut.get(mk), Some(mv.as_str()));
            }
        }
        prop_assert!(sut.is_empty());
    }
}
