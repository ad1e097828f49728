use std::collections::{BTreeMap, BTreeSet, HashSet};

use datasync_core::DriverOp;
use datasync_test::{test_reconciler, CallLog, RecordingDriver, TestEntity};
use proptest::prelude::*;

type Pass = Vec<Option<(u8, i32)>>;

fn pass_strategy() -> impl Strategy<Value = Pass> {
    prop::collection::vec(prop::option::of((0u8..8, -3i32..3)), 0..12)
}

/// Blanks out repeated keys so each key occurs at most once per pass
fn dedupe(pass: &Pass) -> Pass {
    let mut seen = HashSet::new();
    pass.iter()
        .map(|slot| match slot {
            Some((key, value)) if seen.insert(*key) => Some((*key, *value)),
            _ => None,
        })
        .collect()
}

fn to_entities(pass: &Pass) -> Vec<Option<TestEntity>> {
    pass.iter()
        .map(|slot| slot.map(|(key, value)| TestEntity::new(&format!("k{}", key)).with_value(value)))
        .collect()
}

fn present_keys(pass: &Pass) -> BTreeSet<String> {
    pass.iter()
        .flatten()
        .map(|(key, _)| format!("k{}", key))
        .collect()
}

fn table_keys<'a>(keys: impl Iterator<Item = &'a String>) -> BTreeSet<String> {
    keys.cloned().collect()
}

proptest! {
    #[test]
    fn driver_tables_match_keys_accepted_at_entry(passes in prop::collection::vec(pass_strategy(), 1..8)) {
        let log = CallLog::new();
        let mut reconciler = test_reconciler();
        let all = reconciler.add_driver(RecordingDriver::new("all", &log)).unwrap();
        let positive = reconciler
            .add_driver(RecordingDriver::new("positive", &log).accepting(|e| e.value >= 0))
            .unwrap();
        let mut picky = RecordingDriver::new("picky", &log);
        for key in ["k0", "k3", "k6"] {
            picky = picky.opting_out_of(key);
        }
        let picky = reconciler.add_driver(picky).unwrap();

        // key -> accepted by "positive" when it entered
        let mut locked_in: BTreeMap<String, bool> = BTreeMap::new();

        for pass in passes.iter().map(dedupe) {
            let present = present_keys(&pass);
            for (key, value) in pass.iter().flatten() {
                let key = format!("k{}", key);
                locked_in.entry(key).or_insert(*value >= 0);
            }
            locked_in.retain(|key, _| present.contains(key));

            reconciler.reconcile(to_entities(&pass)).unwrap();

            let snapshot: BTreeSet<String> = reconciler.snapshot().keys().cloned().collect();
            prop_assert_eq!(&snapshot, &present);

            let all_keys = table_keys(reconciler.components(&all).unwrap().keys());
            prop_assert_eq!(&all_keys, &present);

            let expected_positive: BTreeSet<String> = locked_in
                .iter()
                .filter(|(_, accepted)| **accepted)
                .map(|(key, _)| key.clone())
                .collect();
            let positive_keys = table_keys(reconciler.components(&positive).unwrap().keys());
            prop_assert_eq!(positive_keys, expected_positive);

            let expected_picky: BTreeSet<String> = present
                .iter()
                .filter(|key| !["k0", "k3", "k6"].contains(&key.as_str()))
                .cloned()
                .collect();
            let picky_keys = table_keys(reconciler.components(&picky).unwrap().keys());
            prop_assert_eq!(picky_keys, expected_picky);
        }

        // every component "all" created was either released or is still held
        let held = reconciler.components(&all).unwrap().len();
        prop_assert_eq!(log.count("all", DriverOp::Enter), log.count("all", DriverOp::Exit) + held);
    }

    #[test]
    fn repeating_a_pass_only_updates(first in pass_strategy(), values in prop::collection::vec(-3i32..3, 12)) {
        let first = dedupe(&first);
        let log = CallLog::new();
        let mut reconciler = test_reconciler();
        reconciler.add_driver(RecordingDriver::new("d", &log)).unwrap();

        reconciler.reconcile(to_entities(&first)).unwrap();
        log.take();

        // same keys, new values
        let second: Pass = first
            .iter()
            .zip(values.iter())
            .map(|(slot, value)| slot.map(|(key, _)| (key, *value)))
            .collect();
        let summary = reconciler.reconcile(to_entities(&second)).unwrap();

        prop_assert!(summary.is_stable());
        prop_assert_eq!(log.count("d", DriverOp::Enter), 0);
        prop_assert_eq!(log.count("d", DriverOp::Exit), 0);
        prop_assert_eq!(log.count("d", DriverOp::Update), present_keys(&first).len());
    }
}
