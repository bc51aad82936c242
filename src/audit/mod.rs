//! Audits
//!
//! An audit takes an input structure and the expected structure it should
//! follow and performs one check. A failing check returns `Ok(false)`; an
//! `Err` aborts the whole validation.
//!
//! Audits are usually stateless and are shared as [`AuditRef`] handles across
//! every structure that uses them.

pub mod builtin;
pub mod combinator;

pub use builtin::{AlwaysFalse, AlwaysTrue, TriggerEvent};
pub use combinator::{Combinator, Operator};

use std::fmt;
use std::sync::Arc;

use crate::engine::Session;
use crate::error::Result;
use crate::events::EventBus;
use crate::predicate::{Predicate, PredicateRef};
use crate::structure::{ExpectedStructure, InputStructure};

/// Shared handle to an audit
pub type AuditRef = Arc<dyn Audit>;

/// A named check of an input against an expected structure
pub trait Audit: fmt::Debug + Send + Sync {
    /// Stable, user-facing name
    fn name(&self) -> &str;

    /// Perform the check
    fn audit(
        &self,
        session: &mut Session<'_>,
        input: &mut dyn InputStructure,
        expected: &dyn ExpectedStructure,
    ) -> Result<bool>;

    /// Deferred audits run after every non-deferred audit of the same
    /// comparison
    fn is_deferred(&self) -> bool {
        false
    }

    /// Predicates that must all pass for this audit to apply
    fn predicates(&self) -> &[PredicateRef] {
        &[]
    }

    /// Display form; defaults to the name
    fn describe(&self) -> String {
        self.name().to_string()
    }
}

/// Run an audit's predicates with the bus muted
///
/// Returns true when there are none or all of them pass. Stops at the first
/// failure.
pub fn run_predicates(audit: &dyn Audit, bus: &mut EventBus, input: &dyn InputStructure) -> bool {
    let predicates = audit.predicates();
    if predicates.is_empty() {
        return true;
    }

    bus.mute();
    let passed = predicates.iter().all(|predicate| predicate.test(input));
    bus.unmute();

    passed
}

// =============================================================================
// Configuration
// =============================================================================

/// Builder methods available on every audit
pub trait AuditExt: Audit + Sized + 'static {
    /// Wrap into a shared handle
    fn shared(self) -> AuditRef {
        Arc::new(self)
    }

    /// Run after all non-deferred audits
    fn defer(self) -> ConfiguredAudit {
        ConfiguredAudit::new(Arc::new(self)).defer()
    }

    /// Only apply when `predicate` passes
    fn add_predicate(self, predicate: impl Predicate + 'static) -> ConfiguredAudit {
        ConfiguredAudit::new(Arc::new(self)).add_predicate(predicate)
    }

    /// Only apply when every predicate passes
    fn add_predicates(self, predicates: impl IntoIterator<Item = PredicateRef>) -> ConfiguredAudit {
        ConfiguredAudit::new(Arc::new(self)).add_predicates(predicates)
    }
}

impl<A: Audit + 'static> AuditExt for A {}

/// An audit with its own deferral flag and predicates
///
/// Starts from the wrapped audit's settings; the check itself is delegated.
#[derive(Debug, Clone)]
pub struct ConfiguredAudit {
    inner: AuditRef,
    deferred: bool,
    predicates: Vec<PredicateRef>,
}

impl ConfiguredAudit {
    pub fn new(inner: AuditRef) -> Self {
        Self {
            deferred: inner.is_deferred(),
            predicates: inner.predicates().to_vec(),
            inner,
        }
    }

    pub fn defer(self) -> Self {
        self.with_deferred(true)
    }

    pub fn with_deferred(mut self, deferred: bool) -> Self {
        self.deferred = deferred;
        self
    }

    pub fn add_predicate(mut self, predicate: impl Predicate + 'static) -> Self {
        self.predicates.push(Arc::new(predicate));
        self
    }

    pub fn add_predicates(mut self, predicates: impl IntoIterator<Item = PredicateRef>) -> Self {
        self.predicates.extend(predicates);
        self
    }

    pub fn inner(&self) -> &AuditRef {
        &self.inner
    }
}

impl Audit for ConfiguredAudit {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn audit(
        &self,
        session: &mut Session<'_>,
        input: &mut dyn InputStructure,
        expected: &dyn ExpectedStructure,
    ) -> Result<bool> {
        self.inner.audit(session, input, expected)
    }

    fn is_deferred(&self) -> bool {
        self.deferred
    }

    fn predicates(&self) -> &[PredicateRef] {
        &self.predicates
    }

    fn describe(&self) -> String {
        self.inner.describe()
    }
}

// =============================================================================
// Closure audits
// =============================================================================

type AuditFn = dyn Fn(&mut Session<'_>, &mut dyn InputStructure, &dyn ExpectedStructure) -> Result<bool>
    + Send
    + Sync;

/// Audit backed by a closure
pub struct FnAudit {
    name: String,
    check: Box<AuditFn>,
}

impl FnAudit {
    pub fn new<F>(name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&mut Session<'_>, &mut dyn InputStructure, &dyn ExpectedStructure) -> Result<bool>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name: name.into(),
            check: Box::new(check),
        }
    }
}

impl Audit for FnAudit {
    fn name(&self) -> &str {
        &self.name
    }

    fn audit(
        &self,
        session: &mut Session<'_>,
        input: &mut dyn InputStructure,
        expected: &dyn ExpectedStructure,
    ) -> Result<bool> {
        (self.check)(session, input, expected)
    }
}

impl fmt::Debug for FnAudit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnAudit").field("name", &self.name).finish_non_exhaustive()
    }
}
