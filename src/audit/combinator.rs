//! OR / XOR / NOT over a list of audits
//!
//! Each branch runs inside its own capture session so that the events of a
//! branch only become visible once the combinator knows whether they matter.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Audit, AuditRef};
use crate::engine::Session;
use crate::error::Result;
use crate::events::{CapturedEvent, CombinatorSubject, Event};
use crate::structure::{ExpectedStructure, InputStructure, Structure};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    /// At least one branch passes
    Or,
    /// Exactly one branch passes
    Xor,
    /// No branch passes
    Not,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Or => "or",
            Self::Xor => "xor",
            Self::Not => "not",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Combines sub-audits with a boolean operator
///
/// Branches are evaluated in declared order by calling their check directly;
/// their predicates and deferral flags are not consulted here.
#[derive(Debug, Clone)]
pub struct Combinator {
    operator: Operator,
    audits: Vec<AuditRef>,
}

impl Combinator {
    pub fn new(operator: Operator, audits: impl IntoIterator<Item = AuditRef>) -> Self {
        Self {
            operator,
            audits: audits.into_iter().collect(),
        }
    }

    pub fn or(audits: impl IntoIterator<Item = AuditRef>) -> Self {
        Self::new(Operator::Or, audits)
    }

    pub fn xor(audits: impl IntoIterator<Item = AuditRef>) -> Self {
        Self::new(Operator::Xor, audits)
    }

    pub fn not(audits: impl IntoIterator<Item = AuditRef>) -> Self {
        Self::new(Operator::Not, audits)
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn audits(&self) -> &[AuditRef] {
        &self.audits
    }

    fn subject(&self, input: &dyn InputStructure, expected: &dyn ExpectedStructure) -> CombinatorSubject {
        CombinatorSubject {
            operator: self.operator,
            audits: self.audits.clone(),
            input: input.context(),
            expected: expected.context(),
        }
    }

    fn any_passes(
        &self,
        session: &mut Session<'_>,
        input: &mut dyn InputStructure,
        expected: &dyn ExpectedStructure,
    ) -> Result<bool> {
        let mut failed_events: Vec<CapturedEvent> = Vec::new();

        for audit in &self.audits {
            session.bus.capture();
            if audit.audit(session, input, expected)? {
                session.bus.release();
                return Ok(true);
            }
            failed_events.extend(session.bus.clear());
        }

        session.bus.replay(failed_events.clone());
        let subject = self.subject(input, expected);
        session.bus.trigger(Event::OrFailed {
            events: failed_events,
            subject,
        });
        Ok(false)
    }

    fn one_passes(
        &self,
        session: &mut Session<'_>,
        input: &mut dyn InputStructure,
        expected: &dyn ExpectedStructure,
    ) -> Result<bool> {
        let mut success: Option<(AuditRef, Vec<CapturedEvent>)> = None;
        let mut failed_events: Vec<CapturedEvent> = Vec::new();

        for audit in &self.audits {
            session.bus.capture();
            let passed = audit.audit(session, input, expected)?;
            let events = session.bus.clear();

            if !passed {
                failed_events.extend(events);
                continue;
            }

            match success.take() {
                None => success = Some((audit.clone(), events)),
                Some((first, first_events)) => {
                    let subject = self.subject(input, expected);
                    session.bus.trigger(Event::XorMultiplePass {
                        first,
                        first_events,
                        second: audit.clone(),
                        second_events: events,
                        subject,
                    });
                    return Ok(false);
                }
            }
        }

        match success {
            Some((_, events)) => {
                session.bus.replay(events);
                Ok(true)
            }
            None => {
                session.bus.replay(failed_events.clone());
                let subject = self.subject(input, expected);
                session.bus.trigger(Event::XorFailed {
                    events: failed_events,
                    subject,
                });
                Ok(false)
            }
        }
    }

    fn none_passes(
        &self,
        session: &mut Session<'_>,
        input: &mut dyn InputStructure,
        expected: &dyn ExpectedStructure,
    ) -> Result<bool> {
        for audit in &self.audits {
            session.bus.capture();
            let passed = audit.audit(session, input, expected)?;
            let events = session.bus.clear();

            if passed {
                let subject = self.subject(input, expected);
                session.bus.trigger(Event::NotFailed {
                    passed: audit.clone(),
                    events,
                    subject,
                });
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl Audit for Combinator {
    fn name(&self) -> &str {
        self.operator.as_str()
    }

    fn audit(
        &self,
        session: &mut Session<'_>,
        input: &mut dyn InputStructure,
        expected: &dyn ExpectedStructure,
    ) -> Result<bool> {
        match self.operator {
            Operator::Or => self.any_passes(session, input, expected),
            Operator::Xor => self.one_passes(session, input, expected),
            Operator::Not => self.none_passes(session, input, expected),
        }
    }

    fn describe(&self) -> String {
        let inner: Vec<String> = self.audits.iter().map(|audit| audit.describe()).collect();
        format!("{}{{{}}}", self.operator, inner.join(", "))
    }
}
