//! Statistics accumulated during validation
//!
//! The engine treats this as an opaque bag of named counters. Structures,
//! contexts and audits decide which counters they touch.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Counter names the comparator maintains
pub mod counters {
    pub const STRUCTURES_COMPARED: &str = "structures_compared";
    pub const AUDITS_RUN: &str = "audits_run";
    pub const AUDITS_FAILED: &str = "audits_failed";
    pub const AUDITS_SKIPPED: &str = "audits_skipped";
    pub const NODES: &str = "nodes";
}

/// Named counters, mutated in place as validation walks the input
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Statistics {
    counters: BTreeMap<String, u64>,
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bump a counter by one
    pub fn increment(&mut self, name: &str) {
        self.add(name, 1);
    }

    /// Bump a counter by `amount`
    pub fn add(&mut self, name: &str, amount: u64) {
        let counter = self.counters.entry(name.to_string()).or_insert(0);
        *counter = counter.saturating_add(amount);
    }

    /// Current value of a counter (zero if never touched)
    pub fn get(&self, name: &str) -> u64 {
        self.counters.get(name).copied().unwrap_or(0)
    }

    /// Fold another set of statistics into this one
    pub fn merge(&mut self, other: &Statistics) {
        for (name, amount) in &other.counters {
            self.add(name, *amount);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counters.iter().map(|(name, value)| (name.as_str(), *value))
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }
}
