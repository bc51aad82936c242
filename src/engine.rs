//! Validation engine
//!
//! The engine owns the event bus and the global audits. [`Engine::validate`]
//! is the top-level entry point: it compares an input structure against an
//! expected one and turns any fault into a fatal report instead of an error.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::audit::{Audit, AuditRef};
use crate::config::{EngineConfig, ReportsConfig};
use crate::error::{AuditError, Result};
use crate::events::{self, Event, EventBus};
use crate::report::{Message, Reports, Severity};
use crate::statistics::Statistics;
use crate::structure::{ExpectedStructure, InputStructure, Structure};

/// Everything an audit can touch while it runs
pub struct Session<'a> {
    pub bus: &'a mut EventBus,
    pub reports: &'a mut Reports,
    pub statistics: &'a mut Statistics,
    pub global_audits: &'a [AuditRef],
}

impl<'a> Session<'a> {
    pub fn new(
        bus: &'a mut EventBus,
        reports: &'a mut Reports,
        statistics: &'a mut Statistics,
        global_audits: &'a [AuditRef],
    ) -> Self {
        Self {
            bus,
            reports,
            statistics,
            global_audits,
        }
    }

    /// Fire a diagnostic event for `message`
    pub fn diagnostic(&mut self, message: Message) {
        self.bus.trigger(Event::Diagnostic(message));
    }

    /// File `message` in the run-wide report collection
    pub fn report(&mut self, message: Message) {
        self.reports.add_report(message);
    }
}

/// Event bus, global audits and configuration for validation runs
#[derive(Debug, Default)]
pub struct Engine {
    bus: EventBus,
    global_audits: Vec<AuditRef>,
    config: EngineConfig,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an engine and install the trace listeners `config` asks for
    pub fn from_config(config: EngineConfig) -> Self {
        let mut bus = EventBus::new();
        if config.events.trace_lifecycle {
            events::trace::install(&mut bus);
        }
        if config.events.trace_captures {
            events::trace::install_capture_tracing(&mut bus);
        }
        Self {
            bus,
            global_audits: Vec::new(),
            config,
        }
    }

    /// Add an audit that applies to every expected structure that allows it
    pub fn add_global_audit(&mut self, audit: impl Audit + 'static) -> &mut Self {
        self.global_audits.push(Arc::new(audit));
        self
    }

    pub fn add_global_audits(&mut self, audits: impl IntoIterator<Item = AuditRef>) -> &mut Self {
        self.global_audits.extend(audits);
        self
    }

    pub fn global_audits(&self) -> &[AuditRef] {
        &self.global_audits
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Compare without fault handling; faults come back as `Err`
    pub fn compare(
        &mut self,
        input: &mut dyn InputStructure,
        expected: &dyn ExpectedStructure,
        reports: &mut Reports,
        statistics: &mut Statistics,
    ) -> Result<bool> {
        let mut session = Session::new(&mut self.bus, reports, statistics, &self.global_audits);
        expected.compare(&mut session, input)
    }

    /// Validate `input` against `expected`
    ///
    /// Missing report and statistics collections are created. A fault aborts
    /// the run: its message (or a synthesized one for internal faults) is
    /// filed as fatal and the run does not succeed.
    pub fn validate(
        &mut self,
        input: &mut dyn InputStructure,
        expected: &dyn ExpectedStructure,
        reports: Option<Reports>,
        statistics: Option<Statistics>,
    ) -> Results {
        let started_at = Utc::now();
        let mut reports = reports.unwrap_or_default();
        let mut statistics = statistics.unwrap_or_default();

        let succeeded = match self.compare(input, expected, &mut reports, &mut statistics) {
            Ok(passed) => passed,
            Err(err) => {
                let message = match err {
                    AuditError::Report(message) => (*message).with_severity(Severity::Fatal),
                    other => Message::fatal(input.context(), "%s", [other.to_string()]),
                };
                error!(error = %message.build_message(), "validation aborted");
                reports.add_report(message);
                self.bus.reset();
                false
            }
        };

        let finished_at = Utc::now();
        debug!(
            succeeded,
            reports = reports.len(),
            elapsed_ms = (finished_at - started_at).num_milliseconds(),
            "validation finished"
        );

        Results {
            succeeded,
            reports,
            statistics,
            started_at,
            finished_at,
        }
    }
}

/// Outcome of one [`Engine::validate`] call
#[derive(Debug, Clone)]
pub struct Results {
    pub succeeded: bool,
    pub reports: Reports,
    pub statistics: Statistics,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl Results {
    /// Serializable digest, rendering messages at or above the configured
    /// threshold
    pub fn summary(&self, config: &ReportsConfig) -> ResultsSummary {
        let counts = Severity::ALL
            .iter()
            .map(|severity| (*severity, self.reports.count(Some(*severity))))
            .filter(|(_, count)| *count > 0)
            .collect();

        let mut messages = Vec::new();
        if config.include_unclassified {
            messages.extend(self.reports.get_reports(&[None]).iter().map(ToString::to_string));
        }
        messages.extend(
            self.reports
                .at_least(config.summary_min_severity)
                .iter()
                .map(ToString::to_string),
        );

        ResultsSummary {
            succeeded: self.succeeded,
            counts,
            unclassified: self.reports.count(None),
            highest_severity: self.reports.highest_severity(),
            messages,
            statistics: self.statistics.clone(),
            started_at: self.started_at,
            duration_ms: (self.finished_at - self.started_at).num_milliseconds(),
        }
    }
}

/// JSON-friendly digest of [`Results`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsSummary {
    pub succeeded: bool,
    pub counts: BTreeMap<Severity, usize>,
    pub unclassified: usize,
    pub highest_severity: Option<Severity>,
    pub messages: Vec<String>,
    pub statistics: Statistics,
    pub started_at: DateTime<Utc>,
    pub duration_ms: i64,
}

impl ResultsSummary {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
