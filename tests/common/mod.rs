//! Shared helpers for integration tests

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use structure_audit::{Audit, AuditRef, Event, EventBus, EventName, FnAudit, Message, Structure};

/// Everything a recording listener saw, in order
pub type Log = Rc<RefCell<Vec<String>>>;

/// Record every listed event; diagnostics are logged with their text
pub fn record(bus: &mut EventBus, names: &[EventName]) -> Log {
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    for name in names {
        let sink = Rc::clone(&log);
        bus.add_listener(name.clone(), move |event| {
            let entry = match event {
                Event::Diagnostic(message) => format!("diagnostic:{}", message.build_message()),
                Event::AuditRunning(subject) | Event::AuditPassed(subject) | Event::AuditFailed(subject) => {
                    format!("{}:{}", event.name(), subject.audit.name())
                }
                other => other.name().to_string(),
            };
            sink.borrow_mut().push(entry);
        });
    }
    log
}

pub fn entries(log: &Log) -> Vec<String> {
    log.borrow().clone()
}

/// An audit that says `name` as a diagnostic, counts its runs and returns
/// `passes`
pub fn speaker(name: &str, passes: bool) -> (AuditRef, Arc<AtomicUsize>) {
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&runs);
    let text = name.to_string();
    let audit = FnAudit::new(name, move |session, input, _| {
        counter.fetch_add(1, Ordering::SeqCst);
        session.diagnostic(Message::info(input.context(), "%s", [text.clone()]));
        Ok(passes)
    });
    (Arc::new(audit), runs)
}

pub fn runs(counter: &Arc<AtomicUsize>) -> usize {
    counter.load(Ordering::SeqCst)
}

/// A silent audit with a chosen name
pub fn named(name: &str, passes: bool) -> AuditRef {
    Arc::new(FnAudit::new(name, move |_, _, _| Ok(passes)))
}
