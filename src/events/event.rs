//! Event names and typed payloads

use std::fmt;
use std::rc::Rc;

use crate::audit::{AuditRef, Operator};
use crate::report::{ContextRef, Message};

/// A listener invoked with the payload of the event it is registered for
pub type Listener = Rc<dyn Fn(&Event)>;

/// Names listeners register under
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventName {
    AuditsStart,
    AuditPredicatesStart,
    AuditPredicatesComplete,
    AuditRunning,
    AuditPassed,
    AuditFailed,
    AuditsDeferredStart,
    AuditsDeferredEnd,
    AuditsComplete,
    OrFailed,
    XorMultiplePass,
    XorFailed,
    NotFailed,
    /// Reserved: a listener call was captured instead of run
    Captured,
    /// Reserved: a capture session was released
    CapturedReleased,
    /// Reserved: a capture session was cleared
    CapturedCleared,
    /// A report message emitted by an audit
    Diagnostic,
    /// Application-defined event
    Custom(String),
}

impl EventName {
    /// Names the bus delivers straight to observers, bypassing capture
    pub fn is_reserved(&self) -> bool {
        matches!(self, Self::Captured | Self::CapturedReleased | Self::CapturedCleared)
    }

    pub fn custom(name: impl Into<String>) -> Self {
        Self::Custom(name.into())
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AuditsStart => "audits_start",
            Self::AuditPredicatesStart => "audit_predicates_start",
            Self::AuditPredicatesComplete => "audit_predicates_complete",
            Self::AuditRunning => "audit_running",
            Self::AuditPassed => "audit_passed",
            Self::AuditFailed => "audit_failed",
            Self::AuditsDeferredStart => "audits_deferred_start",
            Self::AuditsDeferredEnd => "audits_deferred_end",
            Self::AuditsComplete => "audits_complete",
            Self::OrFailed => "or_failed",
            Self::XorMultiplePass => "xor_multiple_pass",
            Self::XorFailed => "xor_failed",
            Self::NotFailed => "not_failed",
            Self::Captured => "captured",
            Self::CapturedReleased => "captured_released",
            Self::CapturedCleared => "captured_cleared",
            Self::Diagnostic => "diagnostic",
            Self::Custom(name) => return write!(f, "custom:{}", name),
        };
        f.write_str(name)
    }
}

/// One audit evaluated against an input in the context of an expected node
#[derive(Debug, Clone)]
pub struct AuditSubject {
    pub audit: AuditRef,
    pub input: ContextRef,
    pub expected: ContextRef,
}

/// A combinator together with the pair it was evaluated against
#[derive(Debug, Clone)]
pub struct CombinatorSubject {
    pub operator: Operator,
    pub audits: Vec<AuditRef>,
    pub input: ContextRef,
    pub expected: ContextRef,
}

/// Typed event payloads, one variant per [`EventName`]
#[derive(Debug, Clone)]
pub enum Event {
    AuditsStart {
        input: ContextRef,
        expected: ContextRef,
        audits: Vec<AuditRef>,
    },
    AuditPredicatesStart(AuditSubject),
    AuditPredicatesComplete {
        subject: AuditSubject,
        passed: bool,
    },
    AuditRunning(AuditSubject),
    AuditPassed(AuditSubject),
    AuditFailed(AuditSubject),
    AuditsDeferredStart {
        input: ContextRef,
        expected: ContextRef,
        audits: Vec<AuditRef>,
    },
    AuditsDeferredEnd {
        input: ContextRef,
        expected: ContextRef,
        audits: Vec<AuditRef>,
    },
    AuditsComplete {
        failed: Vec<AuditRef>,
        input: ContextRef,
        expected: ContextRef,
        audits: Vec<AuditRef>,
    },
    /// No branch of an OR passed; `events` are the replayed branch events
    OrFailed {
        events: Vec<CapturedEvent>,
        subject: CombinatorSubject,
    },
    /// A second branch of an XOR passed
    XorMultiplePass {
        first: AuditRef,
        first_events: Vec<CapturedEvent>,
        second: AuditRef,
        second_events: Vec<CapturedEvent>,
        subject: CombinatorSubject,
    },
    /// No branch of an XOR passed; `events` are the replayed branch events
    XorFailed {
        events: Vec<CapturedEvent>,
        subject: CombinatorSubject,
    },
    /// A branch of a NOT passed; its events travel here as data only
    NotFailed {
        passed: AuditRef,
        events: Vec<CapturedEvent>,
        subject: CombinatorSubject,
    },
    Captured(Box<CapturedEvent>),
    CapturedReleased {
        events: Vec<CapturedEvent>,
    },
    CapturedCleared {
        events: Vec<CapturedEvent>,
    },
    Diagnostic(Message),
    Custom {
        name: String,
        subject: AuditSubject,
    },
}

impl Event {
    pub fn name(&self) -> EventName {
        match self {
            Self::AuditsStart { .. } => EventName::AuditsStart,
            Self::AuditPredicatesStart(_) => EventName::AuditPredicatesStart,
            Self::AuditPredicatesComplete { .. } => EventName::AuditPredicatesComplete,
            Self::AuditRunning(_) => EventName::AuditRunning,
            Self::AuditPassed(_) => EventName::AuditPassed,
            Self::AuditFailed(_) => EventName::AuditFailed,
            Self::AuditsDeferredStart { .. } => EventName::AuditsDeferredStart,
            Self::AuditsDeferredEnd { .. } => EventName::AuditsDeferredEnd,
            Self::AuditsComplete { .. } => EventName::AuditsComplete,
            Self::OrFailed { .. } => EventName::OrFailed,
            Self::XorMultiplePass { .. } => EventName::XorMultiplePass,
            Self::XorFailed { .. } => EventName::XorFailed,
            Self::NotFailed { .. } => EventName::NotFailed,
            Self::Captured(_) => EventName::Captured,
            Self::CapturedReleased { .. } => EventName::CapturedReleased,
            Self::CapturedCleared { .. } => EventName::CapturedCleared,
            Self::Diagnostic(_) => EventName::Diagnostic,
            Self::Custom { name, .. } => EventName::Custom(name.clone()),
        }
    }

    /// The message of a diagnostic event
    pub fn as_diagnostic(&self) -> Option<&Message> {
        match self {
            Self::Diagnostic(message) => Some(message),
            _ => None,
        }
    }
}

/// A listener call held back while the bus was capturing
#[derive(Clone)]
pub struct CapturedEvent {
    name: EventName,
    listener: Listener,
    event: Event,
}

impl CapturedEvent {
    pub fn new(name: EventName, listener: Listener, event: Event) -> Self {
        Self { name, listener, event }
    }

    pub fn name(&self) -> &EventName {
        &self.name
    }

    pub fn listener(&self) -> &Listener {
        &self.listener
    }

    pub fn event(&self) -> &Event {
        &self.event
    }
}

impl fmt::Debug for CapturedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapturedEvent")
            .field("name", &self.name)
            .field("event", &self.event)
            .finish_non_exhaustive()
    }
}
