//! Comparator Tests
//!
//! Audit ordering, predicate gating and the verdict recorded on inputs.

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::{entries, named, record};
use structure_audit::audit::{AlwaysFalse, AlwaysTrue, AuditExt, ConfiguredAudit, TriggerEvent};
use structure_audit::predicate;
use structure_audit::report::Reports;
use structure_audit::statistics::counters;
use structure_audit::{Audit, Context, Engine, Event, EventName, InputStructure, Node, Statistics, Structure};

fn compare(engine: &mut Engine, input: &mut Node<i32>, expected: &Node<i32>) -> bool {
    let mut reports = Reports::new();
    let mut statistics = Statistics::new();
    engine.compare(input, expected, &mut reports, &mut statistics).unwrap()
}

fn failed_names(input: &Node<i32>) -> Vec<String> {
    input.failed_audits().iter().map(|a| a.name().to_string()).collect()
}

// =============================================================================
// Ordering
// =============================================================================

#[test]
fn test_local_then_global_then_deferred() {
    let mut engine = Engine::new();
    engine.add_global_audits([
        named("global", true),
        ConfiguredAudit::new(named("global_deferred", true)).defer().shared(),
    ]);
    let log = record(engine.bus_mut(), &[EventName::AuditRunning]);

    let expected = Node::new(0).with_audits([
        ConfiguredAudit::new(named("local_deferred", true)).defer().shared(),
        named("local", true),
    ]);
    let mut input = Node::new(1);

    assert!(compare(&mut engine, &mut input, &expected));
    assert_eq!(
        entries(&log),
        vec![
            "audit_running:local",
            "audit_running:global",
            "audit_running:local_deferred",
            "audit_running:global_deferred",
        ]
    );
}

#[test]
fn test_global_audits_skipped_when_disabled() {
    let mut engine = Engine::new();
    engine.add_global_audit(AlwaysFalse);
    let log = record(engine.bus_mut(), &[EventName::AuditRunning]);

    let expected = Node::new(0).with_audit(AlwaysTrue).without_global_audits();
    let mut input = Node::new(1);

    assert!(compare(&mut engine, &mut input, &expected));
    assert_eq!(entries(&log), vec!["audit_running:always_true"]);
}

#[test]
fn test_lifecycle_event_sequence() {
    let mut engine = Engine::new();
    let log = record(
        engine.bus_mut(),
        &[
            EventName::AuditsStart,
            EventName::AuditPredicatesStart,
            EventName::AuditPredicatesComplete,
            EventName::AuditRunning,
            EventName::AuditPassed,
            EventName::AuditFailed,
            EventName::AuditsDeferredStart,
            EventName::AuditsDeferredEnd,
            EventName::AuditsComplete,
        ],
    );

    let expected = Node::new(0).with_audit(AlwaysTrue).with_audit(AlwaysFalse.defer());
    let mut input = Node::new(1);
    assert!(!compare(&mut engine, &mut input, &expected));

    assert_eq!(
        entries(&log),
        vec![
            "audits_start",
            "audit_predicates_start",
            "audit_predicates_complete",
            "audit_running:always_true",
            "audit_passed:always_true",
            "audits_deferred_start",
            "audit_predicates_start",
            "audit_predicates_complete",
            "audit_running:always_false",
            "audit_failed:always_false",
            "audits_deferred_end",
            "audits_complete",
        ]
    );
}

// =============================================================================
// Verdicts
// =============================================================================

#[test]
fn test_true_then_false_fails_with_one_failure() {
    let mut engine = Engine::new();
    let expected = Node::new(0).with_audit(AlwaysTrue).with_audit(AlwaysFalse);
    let mut input = Node::new(1);

    assert_eq!(input.passed(), None);
    assert!(!compare(&mut engine, &mut input, &expected));
    assert_eq!(input.passed(), Some(false));
    assert_eq!(failed_names(&input), vec!["always_false"]);
}

#[test]
fn test_failed_order_puts_deferred_last() {
    let mut engine = Engine::new();
    let expected = Node::new(0)
        .with_audit(AlwaysFalse.defer())
        .with_audits([named("immediate", false)]);
    let mut input = Node::new(1);

    assert!(!compare(&mut engine, &mut input, &expected));
    assert_eq!(failed_names(&input), vec!["immediate", "always_false"]);
}

#[test]
fn test_failures_recorded_on_input_only() {
    let mut engine = Engine::new();
    let mut expected = Node::new(0).with_audit(AlwaysFalse);
    let mut input = Node::new(1);

    assert!(!compare(&mut engine, &mut input, &expected));
    assert!(expected.failed_audits().is_empty());
    assert_eq!(expected.passed(), None);

    expected.audits_mut().set([AlwaysTrue.shared()]);
    assert!(compare(&mut engine, &mut input, &expected));
}

#[test]
fn test_compare_is_repeatable() {
    let mut engine = Engine::new();
    let expected = Node::new(0).with_audit(AlwaysTrue).with_audit(AlwaysFalse);

    let mut first = Node::new(1);
    let mut second = Node::new(1);
    assert_eq!(
        compare(&mut engine, &mut first, &expected),
        compare(&mut engine, &mut second, &expected)
    );
    assert_eq!(failed_names(&first), failed_names(&second));

    // Same input again: failures are not accumulated
    assert!(!compare(&mut engine, &mut first, &expected));
    assert_eq!(failed_names(&first), vec!["always_false"]);
}

// =============================================================================
// Predicates
// =============================================================================

#[test]
fn test_failing_predicate_hides_audit() {
    let mut engine = Engine::new();
    let log = record(
        engine.bus_mut(),
        &[
            EventName::AuditPredicatesComplete,
            EventName::AuditRunning,
            EventName::AuditPassed,
            EventName::AuditFailed,
        ],
    );

    let expected = Node::new(0).with_audit(AlwaysFalse.add_predicate(predicate::AlwaysFalse));
    let mut input = Node::new(1);
    let mut reports = Reports::new();
    let mut statistics = Statistics::new();

    let passed = engine.compare(&mut input, &expected, &mut reports, &mut statistics).unwrap();
    assert!(passed);
    assert_eq!(input.passed(), Some(true));
    assert!(input.failed_audits().is_empty());
    assert_eq!(entries(&log), vec!["audit_predicates_complete"]);
    assert_eq!(statistics.get(counters::AUDITS_SKIPPED), 1);
    assert_eq!(statistics.get(counters::AUDITS_RUN), 0);
}

#[test]
fn test_passing_predicates_let_audit_run() {
    let mut engine = Engine::new();
    let is_positive = predicate::FnPredicate::new("is_positive", |input| {
        input
            .as_any()
            .downcast_ref::<Node<i32>>()
            .is_some_and(|node| *node.value() > 0)
    });
    let expected = Node::new(0).with_audit(AlwaysFalse.add_predicate(predicate::AlwaysTrue).add_predicate(is_positive));

    let mut positive = Node::new(5);
    assert!(!compare(&mut engine, &mut positive, &expected));

    let mut negative = Node::new(-5);
    assert!(compare(&mut engine, &mut negative, &expected));
}

// =============================================================================
// Trees and custom events
// =============================================================================

#[test]
fn test_children_compared_by_label() {
    let mut engine = Engine::new();
    let expected = Node::labelled("doc", 0)
        .with_audit(AlwaysTrue)
        .with_child(Node::labelled("name", 0).with_audit(AlwaysFalse))
        .with_child(Node::labelled("age", 0).with_audit(AlwaysTrue));
    let mut input = Node::labelled("doc", 1)
        .with_child(Node::labelled("age", 30))
        .with_child(Node::labelled("name", 7));

    let mut reports = Reports::new();
    let mut statistics = Statistics::new();
    let passed = engine.compare(&mut input, &expected, &mut reports, &mut statistics).unwrap();

    assert!(!passed);
    assert_eq!(input.passed(), Some(true));
    let name = input.child("name").unwrap();
    assert_eq!(name.passed(), Some(false));
    assert_eq!(input.child("age").unwrap().passed(), Some(true));
    assert_eq!(statistics.get(counters::STRUCTURES_COMPARED), 3);
    assert_eq!(statistics.get(counters::NODES), 3);
}

#[test]
fn test_trigger_event_fires_after_checks() {
    let mut engine = Engine::new();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    engine
        .bus_mut()
        .add_listener(EventName::custom("found_name"), move |event| {
            if let Event::Custom { name, subject } = event {
                sink.borrow_mut().push(format!("{}@{}", name, subject.input.context_to_string(None)));
            }
        });
    let log = record(engine.bus_mut(), &[EventName::AuditRunning]);

    let expected = Node::labelled("name", 0)
        .with_audit(TriggerEvent::new("found_name"))
        .with_audit(AlwaysTrue);
    let mut input = Node::labelled("name", 42);

    assert!(compare(&mut engine, &mut input, &expected));
    assert_eq!(*seen.borrow(), vec!["found_name@name: 42"]);
    assert_eq!(
        entries(&log),
        vec!["audit_running:always_true", "audit_running:trigger_event"]
    );
}
