//! Structures and the comparator
//!
//! A structure plays one of two roles. The *expected* side carries the audits
//! that describe what valid data looks like; the *input* side is the data
//! being checked and collects the audits it failed. [`Node`] plays both and
//! is enough for tests and simple trees. Format libraries implement the traits
//! on their own types.

pub mod node;

pub use node::{Node, NodeContext};

use std::any::Any;

use tracing::{debug, trace};

use crate::audit::{run_predicates, Audit, AuditRef};
use crate::engine::Session;
use crate::error::Result;
use crate::events::{AuditSubject, Event};
use crate::report::{Context, ContextRef, Message, Reports};
use crate::statistics::counters;

/// Anything that can be compared
pub trait Structure {
    /// What messages about this structure point at
    fn context(&self) -> ContextRef;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Data side of a comparison
pub trait InputStructure: Structure {
    /// Context of the enclosing structure, if it is still alive
    fn parent(&self) -> Option<ContextRef> {
        None
    }

    fn audit_state(&self) -> &AuditState;

    fn audit_state_mut(&mut self) -> &mut AuditState;

    fn failed_audits(&self) -> &[AuditRef] {
        self.audit_state().failed_audits()
    }

    /// `None` until compared
    fn passed(&self) -> Option<bool> {
        self.audit_state().passed()
    }

    fn add_failed_audit(&mut self, audit: AuditRef) {
        self.audit_state_mut().failed_audits.push(audit);
    }

    fn set_passed(&mut self, passed: bool) {
        self.audit_state_mut().passed = Some(passed);
    }

    /// Messages filed against this structure only
    fn structure_reports(&self) -> &Reports {
        &self.audit_state().reports
    }

    /// File a message on this structure and in the run-wide collection
    fn add_structure_report(&mut self, message: Message, reports: &mut Reports) {
        self.audit_state_mut().reports.add_report(message.clone());
        reports.add_report(message);
    }
}

/// View any sized expected structure as a trait object
pub trait AsExpected {
    fn as_expected(&self) -> &dyn ExpectedStructure;
}

impl<T: ExpectedStructure> AsExpected for T {
    fn as_expected(&self) -> &dyn ExpectedStructure {
        self
    }
}

/// Schema side of a comparison
pub trait ExpectedStructure: Structure + AsExpected {
    fn audits(&self) -> &AuditList;

    /// Whether the engine's global audits also apply here
    fn use_global_audits(&self) -> bool {
        true
    }

    /// Compare `input` against this structure
    ///
    /// Override to walk into children; call [`compare_structure`] for the
    /// audits of this level.
    fn compare(&self, session: &mut Session<'_>, input: &mut dyn InputStructure) -> Result<bool> {
        compare_structure(session, input, self.as_expected())
    }
}

// =============================================================================
// State
// =============================================================================

/// Outcome of comparing one input structure
#[derive(Debug, Clone, Default)]
pub struct AuditState {
    failed_audits: Vec<AuditRef>,
    passed: Option<bool>,
    reports: Reports,
}

impl AuditState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failed_audits(&self) -> &[AuditRef] {
        &self.failed_audits
    }

    pub fn passed(&self) -> Option<bool> {
        self.passed
    }

    pub fn reports(&self) -> &Reports {
        &self.reports
    }

    /// Forget the failures and verdict of an earlier comparison
    ///
    /// Structure reports are kept.
    pub fn reset(&mut self) {
        self.failed_audits.clear();
        self.passed = None;
    }
}

/// Ordered audits declared on an expected structure
#[derive(Debug, Clone, Default)]
pub struct AuditList {
    audits: Vec<AuditRef>,
}

impl AuditList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every audit
    pub fn set(&mut self, audits: impl IntoIterator<Item = AuditRef>) -> &mut Self {
        self.audits = audits.into_iter().collect();
        self
    }

    pub fn add(&mut self, audit: AuditRef) -> &mut Self {
        self.audits.push(audit);
        self
    }

    pub fn extend(&mut self, audits: impl IntoIterator<Item = AuditRef>) -> &mut Self {
        self.audits.extend(audits);
        self
    }

    pub fn get(&self, index: usize) -> Option<&AuditRef> {
        self.audits.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AuditRef> {
        self.audits.iter()
    }

    pub fn as_slice(&self) -> &[AuditRef] {
        &self.audits
    }

    pub fn len(&self) -> usize {
        self.audits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.audits.is_empty()
    }
}

impl FromIterator<AuditRef> for AuditList {
    fn from_iter<I: IntoIterator<Item = AuditRef>>(iter: I) -> Self {
        Self {
            audits: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a AuditList {
    type Item = &'a AuditRef;
    type IntoIter = std::slice::Iter<'a, AuditRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.audits.iter()
    }
}

// =============================================================================
// Comparator
// =============================================================================

/// Run every audit that applies to one input/expected pair
///
/// Local audits run first, then global ones if the expected structure allows
/// them. Deferred audits from either list run after all the others. The
/// input's verdict is set once at the end from its failed audits.
pub fn compare_structure(
    session: &mut Session<'_>,
    input: &mut dyn InputStructure,
    expected: &dyn ExpectedStructure,
) -> Result<bool> {
    input.audit_state_mut().reset();

    let mut audits: Vec<AuditRef> = expected.audits().iter().cloned().collect();
    if expected.use_global_audits() {
        audits.extend(session.global_audits.iter().cloned());
    }

    let input_context = input.context();
    let expected_context = expected.context();

    session.statistics.increment(counters::STRUCTURES_COMPARED);
    input_context.add_context_to_stats(session.statistics);
    debug!(
        input = %input_context.context_to_string(None),
        audits = audits.len(),
        "comparing structure"
    );

    session.bus.trigger(Event::AuditsStart {
        input: input_context.clone(),
        expected: expected_context.clone(),
        audits: audits.clone(),
    });

    let (deferred, immediate): (Vec<AuditRef>, Vec<AuditRef>) =
        audits.iter().cloned().partition(|audit| audit.is_deferred());

    for audit in &immediate {
        if !run_audit(session, audit, input, expected)? {
            input.add_failed_audit(audit.clone());
        }
    }

    session.bus.trigger(Event::AuditsDeferredStart {
        input: input_context.clone(),
        expected: expected_context.clone(),
        audits: deferred.clone(),
    });
    for audit in &deferred {
        if !run_audit(session, audit, input, expected)? {
            input.add_failed_audit(audit.clone());
        }
    }
    session.bus.trigger(Event::AuditsDeferredEnd {
        input: input_context.clone(),
        expected: expected_context.clone(),
        audits: deferred,
    });

    let failed = input.failed_audits().to_vec();
    let passed = failed.is_empty();
    debug!(
        input = %input_context.context_to_string(None),
        failed = failed.len(),
        passed,
        "structure compared"
    );

    session.bus.trigger(Event::AuditsComplete {
        failed,
        input: input_context,
        expected: expected_context,
        audits,
    });
    input.set_passed(passed);

    Ok(passed)
}

/// Run a single audit, honouring its predicates
///
/// An audit whose predicates fail counts as passed and never runs.
pub fn run_audit(
    session: &mut Session<'_>,
    audit: &AuditRef,
    input: &mut dyn InputStructure,
    expected: &dyn ExpectedStructure,
) -> Result<bool> {
    let subject = AuditSubject {
        audit: audit.clone(),
        input: input.context(),
        expected: expected.context(),
    };

    session.bus.trigger(Event::AuditPredicatesStart(subject.clone()));
    let applies = run_predicates(&**audit, session.bus, input);
    session.bus.trigger(Event::AuditPredicatesComplete {
        subject: subject.clone(),
        passed: applies,
    });

    if !applies {
        session.statistics.increment(counters::AUDITS_SKIPPED);
        trace!(audit = audit.name(), "predicates failed, audit skipped");
        return Ok(true);
    }

    session.statistics.increment(counters::AUDITS_RUN);
    session.bus.trigger(Event::AuditRunning(subject.clone()));

    let passed = audit.audit(session, input, expected)?;
    trace!(audit = audit.name(), passed, "audit finished");

    if passed {
        session.bus.trigger(Event::AuditPassed(subject));
    } else {
        session.statistics.increment(counters::AUDITS_FAILED);
        session.bus.trigger(Event::AuditFailed(subject));
    }

    Ok(passed)
}
