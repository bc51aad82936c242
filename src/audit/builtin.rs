//! Audits that ship with the engine

use std::sync::Arc;

use super::Audit;
use crate::engine::Session;
use crate::error::Result;
use crate::events::{AuditSubject, Event};
use crate::structure::{ExpectedStructure, InputStructure, Structure};

/// Always passes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlwaysTrue;

impl Audit for AlwaysTrue {
    fn name(&self) -> &str {
        "always_true"
    }

    fn audit(
        &self,
        _session: &mut Session<'_>,
        _input: &mut dyn InputStructure,
        _expected: &dyn ExpectedStructure,
    ) -> Result<bool> {
        Ok(true)
    }
}

/// Always fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlwaysFalse;

impl Audit for AlwaysFalse {
    fn name(&self) -> &str {
        "always_false"
    }

    fn audit(
        &self,
        _session: &mut Session<'_>,
        _input: &mut dyn InputStructure,
        _expected: &dyn ExpectedStructure,
    ) -> Result<bool> {
        Ok(false)
    }
}

/// Fires a custom event for every structure it is run against
///
/// Always passes and always runs deferred, after the real checks of the same
/// comparison. Pair it with predicates to pull data out of particular parts
/// of a structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerEvent {
    event_name: String,
}

impl TriggerEvent {
    pub fn new(event_name: impl Into<String>) -> Self {
        Self {
            event_name: event_name.into(),
        }
    }

    pub fn event_name(&self) -> &str {
        &self.event_name
    }
}

impl Audit for TriggerEvent {
    fn name(&self) -> &str {
        "trigger_event"
    }

    fn audit(
        &self,
        session: &mut Session<'_>,
        input: &mut dyn InputStructure,
        expected: &dyn ExpectedStructure,
    ) -> Result<bool> {
        session.bus.trigger(Event::Custom {
            name: self.event_name.clone(),
            subject: AuditSubject {
                audit: Arc::new(self.clone()),
                input: input.context(),
                expected: expected.context(),
            },
        });
        Ok(true)
    }

    fn is_deferred(&self) -> bool {
        true
    }

    fn describe(&self) -> String {
        format!("trigger_event({})", self.event_name)
    }
}
