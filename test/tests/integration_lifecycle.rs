use datasync_core::{DriverOp, PassSummary};
use datasync_test::{
    assert_component_keys, assert_ops, entities, test_reconciler, CallLog, RecordingDriver,
    TestEntity,
};

#[test]
fn first_pass_enters_then_updates_in_order() {
    let log = CallLog::new();
    let mut reconciler = test_reconciler();
    let handle = reconciler
        .add_driver(RecordingDriver::new("d", &log))
        .unwrap();

    let summary = reconciler.reconcile(entities(&["a", "b"])).unwrap();

    assert_ops!(log, ["d.enter(a)", "d.enter(b)", "d.update(a)", "d.update(b)"]);
    assert_eq!(
        summary,
        PassSummary {
            entered: 2,
            persisted: 0,
            exited: 0,
            skipped: 0,
        }
    );
    assert_component_keys!(reconciler, handle, ["a", "b"]);
}

#[test]
fn second_pass_exits_enters_and_updates() {
    let log = CallLog::new();
    let mut reconciler = test_reconciler();
    let handle = reconciler
        .add_driver(RecordingDriver::new("d", &log))
        .unwrap();

    reconciler.reconcile(entities(&["a", "b"])).unwrap();
    log.take();

    reconciler.reconcile(entities(&["b", "c"])).unwrap();

    assert_ops!(log, ["d.exit(a)", "d.enter(c)", "d.update(b)", "d.update(c)"]);
    assert_component_keys!(reconciler, handle, ["b", "c"]);
    assert!(!reconciler.snapshot().contains_key("a"));
}

#[test]
fn empty_pass_exits_everything_in_snapshot_order() {
    let log = CallLog::new();
    let mut reconciler = test_reconciler();
    let handle = reconciler
        .add_driver(RecordingDriver::new("d", &log))
        .unwrap();

    reconciler.reconcile(entities(&["a", "b"])).unwrap();
    reconciler.reconcile(entities(&["b", "c"])).unwrap();
    log.take();

    let summary = reconciler.reconcile(Vec::new()).unwrap();

    assert_ops!(log, ["d.exit(b)", "d.exit(c)"]);
    assert_eq!(summary.exited, 2);
    assert_component_keys!(reconciler, handle, []);
    assert!(reconciler.snapshot().is_empty());
}

#[test]
fn rejected_entity_produces_no_calls_in_any_phase() {
    let log = CallLog::new();
    let mut reconciler = test_reconciler();
    let handle = reconciler
        .add_driver(RecordingDriver::new("d", &log).accepting(|e| e.id != "x"))
        .unwrap();

    reconciler.reconcile(entities(&["x"])).unwrap();
    reconciler.reconcile(entities(&["x"])).unwrap();
    reconciler.reconcile(entities(&[])).unwrap();

    assert!(log.is_empty());
    assert_component_keys!(reconciler, handle, []);
}

#[test]
fn same_keys_twice_only_updates() {
    let log = CallLog::new();
    let mut reconciler = test_reconciler();
    reconciler
        .add_driver(RecordingDriver::new("d", &log))
        .unwrap();

    reconciler
        .reconcile(vec![
            Some(TestEntity::new("a").with_value(1)),
            Some(TestEntity::new("b").with_value(1)),
        ])
        .unwrap();
    log.take();

    let summary = reconciler
        .reconcile(vec![
            Some(TestEntity::new("b").with_value(2)),
            Some(TestEntity::new("a").with_value(2)),
        ])
        .unwrap();

    assert!(summary.is_stable());
    assert_eq!(log.count("d", DriverOp::Enter), 0);
    assert_eq!(log.count("d", DriverOp::Exit), 0);
    assert_ops!(log, ["d.update(b)", "d.update(a)"]);
}

#[test]
fn update_sees_latest_entity_and_stored_component() {
    let log = CallLog::new();
    let mut reconciler = test_reconciler();
    let handle = reconciler
        .add_driver(RecordingDriver::new("d", &log))
        .unwrap();

    reconciler
        .reconcile(vec![Some(TestEntity::new("a").with_value(1))])
        .unwrap();
    reconciler
        .reconcile(vec![Some(TestEntity::new("a").with_value(5))])
        .unwrap();

    let component = reconciler.component_ref(&handle, "a").unwrap();
    assert_eq!(component.updates, 2);
    assert_eq!(component.last_value, 5);
    assert_eq!(reconciler.snapshot().get("a").map(|e| e.value), Some(5));

    let calls = log.take();
    assert!(calls
        .iter()
        .filter(|call| call.op == DriverOp::Update)
        .all(|call| call.component == Some(component.id)));
}

#[test]
fn reentering_key_exits_old_component_before_entering_new_one() {
    let log = CallLog::new();
    let mut reconciler = test_reconciler();
    let handle = reconciler
        .add_driver(RecordingDriver::new("d", &log))
        .unwrap();

    reconciler.reconcile(entities(&["a"])).unwrap();
    let first = reconciler.component_ref(&handle, "a").unwrap().id;

    reconciler.reconcile(entities(&[])).unwrap();
    assert!(reconciler.component_ref(&handle, "a").is_none());

    reconciler.reconcile(entities(&["a"])).unwrap();
    let second = reconciler.component_ref(&handle, "a").unwrap().id;

    let calls: Vec<String> = log.take().iter().map(|call| call.to_string()).collect();
    assert_eq!(
        calls,
        vec![
            format!("d.enter(a, #{})", first),
            format!("d.update(a, #{})", first),
            format!("d.exit(a, #{})", first),
            format!("d.enter(a, #{})", second),
            format!("d.update(a, #{})", second),
        ]
    );
    assert_ne!(first, second);
    assert_eq!(reconciler.driver(&handle).unwrap().released(), &[first]);
}

#[test]
fn opted_out_key_gets_updates_without_component_and_no_exit() {
    let log = CallLog::new();
    let mut reconciler = test_reconciler();
    let handle = reconciler
        .add_driver(RecordingDriver::new("d", &log).opting_out_of("a"))
        .unwrap();

    reconciler.reconcile(entities(&["a"])).unwrap();
    reconciler.reconcile(entities(&["a"])).unwrap();
    assert!(reconciler.component_ref(&handle, "a").is_none());

    reconciler.reconcile(entities(&[])).unwrap();

    let calls: Vec<String> = log.take().iter().map(|call| call.to_string()).collect();
    assert_eq!(
        calls,
        vec![
            "d.enter(a, -)",
            "d.update(a, -)",
            "d.update(a, -)",
            "d.exit(a, -)",
        ]
    );
    assert!(reconciler.driver(&handle).unwrap().released().is_empty());
}

#[test]
fn drivers_dispatch_in_registration_order_within_each_phase() {
    let log = CallLog::new();
    let mut reconciler = test_reconciler();
    reconciler
        .add_driver(RecordingDriver::new("first", &log))
        .unwrap();
    reconciler
        .add_driver(RecordingDriver::new("second", &log))
        .unwrap();

    reconciler.reconcile(entities(&["a"])).unwrap();
    log.take();
    reconciler.reconcile(entities(&["b"])).unwrap();

    assert_ops!(
        log,
        [
            "first.exit(a)",
            "second.exit(a)",
            "first.enter(b)",
            "second.enter(b)",
            "first.update(b)",
            "second.update(b)",
        ]
    );
}

#[test]
fn absent_slots_are_ignored() {
    let log = CallLog::new();
    let mut reconciler = test_reconciler();
    reconciler
        .add_driver(RecordingDriver::new("d", &log))
        .unwrap();

    reconciler.reconcile(entities(&["a", "b"])).unwrap();
    log.take();

    let summary = reconciler
        .reconcile(vec![None, Some(TestEntity::new("a")), None, Some(TestEntity::new("b"))])
        .unwrap();

    assert_eq!(summary.skipped, 2);
    assert!(summary.is_stable());
    assert_ops!(log, ["d.update(a)", "d.update(b)"]);
}

#[test]
fn exit_is_gated_by_current_filter_but_table_is_always_erased() {
    let log = CallLog::new();
    let mut reconciler = test_reconciler();
    let handle = reconciler
        .add_driver(RecordingDriver::new("d", &log).accepting(|e| e.visible))
        .unwrap();

    reconciler.reconcile(entities(&["a"])).unwrap();
    reconciler
        .reconcile(vec![Some(TestEntity::new("a").hidden())])
        .unwrap();
    assert!(reconciler.component_ref(&handle, "a").is_some());
    log.take();

    reconciler.reconcile(entities(&[])).unwrap();

    // the last entity seen under "a" is hidden, so exit is skipped
    assert!(log.is_empty());
    assert_component_keys!(reconciler, handle, []);
}
