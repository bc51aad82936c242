//! Lifecycle listeners that log through `tracing`

use tracing::{debug, trace};

use super::{Event, EventBus, EventName};
use crate::audit::{Audit, AuditRef};
use crate::report::Context;

const TARGET: &str = "structure_audit::events";

fn names(audits: &[AuditRef]) -> String {
    audits.iter().map(|a| a.name()).collect::<Vec<_>>().join(", ")
}

/// Log comparison and audit lifecycle events
pub fn install(bus: &mut EventBus) {
    bus.add_listener(EventName::AuditsStart, |event| {
        if let Event::AuditsStart { input, audits, .. } = event {
            debug!(target: TARGET, input = %input.context_to_string(None), audits = %names(audits), "starting audits");
        }
    });
    bus.add_listener(EventName::AuditRunning, |event| {
        if let Event::AuditRunning(subject) = event {
            trace!(target: TARGET, audit = subject.audit.name(), input = %subject.input.context_to_string(None), "running audit");
        }
    });
    bus.add_listener(EventName::AuditPassed, |event| {
        if let Event::AuditPassed(subject) = event {
            trace!(target: TARGET, audit = subject.audit.name(), "audit passed");
        }
    });
    bus.add_listener(EventName::AuditFailed, |event| {
        if let Event::AuditFailed(subject) = event {
            debug!(target: TARGET, audit = subject.audit.name(), input = %subject.input.context_to_string(None), "audit failed");
        }
    });
    bus.add_listener(EventName::AuditPredicatesComplete, |event| {
        if let Event::AuditPredicatesComplete { subject, passed: false } = event {
            trace!(target: TARGET, audit = subject.audit.name(), "audit skipped by predicates");
        }
    });
    bus.add_listener(EventName::AuditsComplete, |event| {
        if let Event::AuditsComplete { failed, input, .. } = event {
            debug!(target: TARGET, input = %input.context_to_string(None), failed = failed.len(), "audits complete");
        }
    });
    bus.add_listener(EventName::Diagnostic, |event| {
        if let Event::Diagnostic(message) = event {
            debug!(target: TARGET, "{}", message);
        }
    });
}

/// Log capture sessions as combinators open and close them
pub fn install_capture_tracing(bus: &mut EventBus) {
    bus.add_listener(EventName::Captured, |event| {
        if let Event::Captured(captured) = event {
            trace!(target: TARGET, event = %captured.name(), "event captured");
        }
    });
    bus.add_listener(EventName::CapturedReleased, |event| {
        if let Event::CapturedReleased { events } = event {
            trace!(target: TARGET, count = events.len(), "captured events released");
        }
    });
    bus.add_listener(EventName::CapturedCleared, |event| {
        if let Event::CapturedCleared { events } = event {
            trace!(target: TARGET, count = events.len(), "captured events cleared");
        }
    });
}
