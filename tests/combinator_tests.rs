//! Combinator Tests
//!
//! Which branch diagnostics stay visible for OR / XOR / NOT, alone and nested.

mod common;

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use common::{entries, record, runs, speaker, Log};
use structure_audit::report::Reports;
use structure_audit::{Audit, Combinator, Engine, Event, EventName, InputStructure, Node, Statistics};

fn watched() -> (Engine, Log) {
    let mut engine = Engine::new();
    let log = record(
        engine.bus_mut(),
        &[
            EventName::Diagnostic,
            EventName::OrFailed,
            EventName::XorMultiplePass,
            EventName::XorFailed,
            EventName::NotFailed,
        ],
    );
    (engine, log)
}

fn run(engine: &mut Engine, combinator: Combinator) -> (bool, Node<i32>) {
    let expected = Node::new(0).with_audit(combinator);
    let mut input = Node::new(1);
    let mut reports = Reports::new();
    let mut statistics = Statistics::new();
    let passed = engine.compare(&mut input, &expected, &mut reports, &mut statistics).unwrap();
    assert!(!engine.bus().is_capturing());
    (passed, input)
}

// =============================================================================
// OR
// =============================================================================

#[test]
fn test_or_first_pass_short_circuits() {
    let (mut engine, log) = watched();
    let (a, _) = speaker("A", true);
    let (b, b_runs) = speaker("B", true);

    let (passed, input) = run(&mut engine, Combinator::or([a, b]));
    assert!(passed);
    assert_eq!(input.passed(), Some(true));
    assert_eq!(runs(&b_runs), 0);
    assert_eq!(entries(&log), vec!["diagnostic:A"]);
}

#[test]
fn test_or_later_pass_hides_earlier_failures() {
    let (mut engine, log) = watched();
    let (a, _) = speaker("A", false);
    let (b, _) = speaker("B", true);

    let (passed, _) = run(&mut engine, Combinator::or([a, b]));
    assert!(passed);
    assert_eq!(entries(&log), vec!["diagnostic:B"]);
}

#[test]
fn test_or_all_fail_replays_everything() {
    let (mut engine, log) = watched();
    let payload = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&payload);
    engine.bus_mut().add_listener(EventName::OrFailed, move |event| {
        if let Event::OrFailed { events, subject } = event {
            *sink.borrow_mut() = events.len();
            assert_eq!(subject.audits.len(), 2);
        }
    });

    let (a, _) = speaker("A", false);
    let (b, _) = speaker("B", false);
    let (passed, input) = run(&mut engine, Combinator::or([a, b]));

    assert!(!passed);
    assert_eq!(input.failed_audits()[0].name(), "or");
    assert_eq!(entries(&log), vec!["diagnostic:A", "diagnostic:B", "or_failed"]);
    assert_eq!(*payload.borrow(), 2);
}

// =============================================================================
// XOR
// =============================================================================

#[test]
fn test_xor_two_passes_fails_without_leaking() {
    let (mut engine, log) = watched();
    let sizes = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&sizes);
    engine.bus_mut().add_listener(EventName::XorMultiplePass, move |event| {
        if let Event::XorMultiplePass {
            first,
            first_events,
            second,
            second_events,
            ..
        } = event
        {
            sink.borrow_mut().push(format!("{}:{}", first.name(), first_events.len()));
            sink.borrow_mut().push(format!("{}:{}", second.name(), second_events.len()));
        }
    });

    let (a, _) = speaker("A", true);
    let (b, _) = speaker("B", true);
    let (c, c_runs) = speaker("C", false);
    let (passed, _) = run(&mut engine, Combinator::xor([a, b, c]));

    assert!(!passed);
    assert_eq!(runs(&c_runs), 0);
    assert_eq!(entries(&log), vec!["xor_multiple_pass"]);
    assert_eq!(*sizes.borrow(), vec!["A:1", "B:1"]);
}

#[test]
fn test_xor_single_pass_shows_only_winner() {
    let (mut engine, log) = watched();
    let (a, _) = speaker("A", false);
    let (b, _) = speaker("B", true);
    let (c, c_runs) = speaker("C", false);

    let (passed, _) = run(&mut engine, Combinator::xor([a, b, c]));
    assert!(passed);
    assert_eq!(runs(&c_runs), 1);
    assert_eq!(entries(&log), vec!["diagnostic:B"]);
}

#[test]
fn test_xor_no_pass_replays_failures() {
    let (mut engine, log) = watched();
    let (a, _) = speaker("A", false);
    let (b, _) = speaker("B", false);

    let (passed, _) = run(&mut engine, Combinator::xor([a, b]));
    assert!(!passed);
    assert_eq!(entries(&log), vec!["diagnostic:A", "diagnostic:B", "xor_failed"]);
}

// =============================================================================
// NOT
// =============================================================================

#[test]
fn test_not_with_passing_branch_fails() {
    let (mut engine, log) = watched();
    let carried = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&carried);
    engine.bus_mut().add_listener(EventName::NotFailed, move |event| {
        if let Event::NotFailed { passed, events, .. } = event {
            sink.borrow_mut().push(passed.name().to_string());
            for captured in events {
                if let Some(message) = captured.event().as_diagnostic() {
                    sink.borrow_mut().push(message.build_message());
                }
            }
        }
    });

    let (a, _) = speaker("A", true);
    let (passed, _) = run(&mut engine, Combinator::not([a]));

    assert!(!passed);
    assert_eq!(entries(&log), vec!["not_failed"]);
    assert_eq!(*carried.borrow(), vec!["A", "A"]);
}

#[test]
fn test_not_with_failing_branches_passes_silently() {
    let (mut engine, log) = watched();
    let (a, a_runs) = speaker("A", false);
    let (b, b_runs) = speaker("B", false);

    let (passed, _) = run(&mut engine, Combinator::not([a, b]));
    assert!(passed);
    assert_eq!((runs(&a_runs), runs(&b_runs)), (1, 1));
    assert!(entries(&log).is_empty());
}

// =============================================================================
// Nesting
// =============================================================================

#[test]
fn test_nested_failure_is_hidden_by_outer_success() {
    let (mut engine, log) = watched();
    let (a, _) = speaker("A", true);
    let (b, _) = speaker("B", true);
    let (c, _) = speaker("C", true);
    let inner: Arc<dyn Audit> = Arc::new(Combinator::xor([a, b]));

    let (passed, _) = run(&mut engine, Combinator::or([inner, c]));
    assert!(passed);
    assert_eq!(entries(&log), vec!["diagnostic:C"]);
}

#[test]
fn test_nested_events_replayed_when_outer_fails() {
    let (mut engine, log) = watched();
    let (a, _) = speaker("A", true);
    let inner: Arc<dyn Audit> = Arc::new(Combinator::not([a]));

    let (passed, _) = run(&mut engine, Combinator::or([inner]));
    assert!(!passed);
    assert_eq!(entries(&log), vec!["not_failed", "or_failed"]);
}

#[test]
fn test_nested_success_released_through_outer() {
    let (mut engine, log) = watched();
    let (a, _) = speaker("A", false);
    let (b, _) = speaker("B", true);
    let inner: Arc<dyn Audit> = Arc::new(Combinator::or([a, b]));
    let (c, _) = speaker("C", false);

    let (passed, _) = run(&mut engine, Combinator::xor([c, inner]));
    assert!(passed);
    assert_eq!(entries(&log), vec!["diagnostic:B"]);
}
