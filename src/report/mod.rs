//! Reports
//!
//! Messages produced while validating, partitioned by severity. Messages
//! without a severity live in a separate "unclassified" bucket that is only
//! returned when asked for explicitly (a `None` filter) or when no filter is
//! given at all.

pub mod context;
pub mod message;
pub mod severity;

pub use context::{keys, values, Context, ContextRef, Prettifier, TextContext};
pub use message::Message;
pub use severity::{ParseSeverityError, Severity};

use std::collections::BTreeMap;

// =============================================================================
// Report Collection
// =============================================================================

/// An ordered, counted list of messages
#[derive(Debug, Clone, Default)]
pub struct ReportCollection {
    reports: Vec<Message>,
}

impl ReportCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.reports.push(message);
    }

    pub fn extend(&mut self, messages: impl IntoIterator<Item = Message>) {
        self.reports.extend(messages);
    }

    pub fn reports(&self) -> &[Message] {
        &self.reports
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.reports.iter()
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }
}

impl FromIterator<Message> for ReportCollection {
    fn from_iter<I: IntoIterator<Item = Message>>(iter: I) -> Self {
        Self {
            reports: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for ReportCollection {
    type Item = Message;
    type IntoIter = std::vec::IntoIter<Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.reports.into_iter()
    }
}

impl<'a> IntoIterator for &'a ReportCollection {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.reports.iter()
    }
}

// =============================================================================
// Reports
// =============================================================================

/// All messages gathered during a validation, bucketed by severity
#[derive(Debug, Clone, Default)]
pub struct Reports {
    classified: BTreeMap<Severity, Vec<Message>>,
    unclassified: Vec<Message>,
}

impl Reports {
    pub fn new() -> Self {
        Self::default()
    }

    /// File a message under its severity, or as unclassified if it has none
    pub fn add_report(&mut self, message: Message) {
        match message.severity() {
            Some(severity) => self.classified.entry(severity).or_default().push(message),
            None => self.unclassified.push(message),
        }
    }

    pub fn add_reports(&mut self, messages: impl IntoIterator<Item = Message>) {
        for message in messages {
            self.add_report(message);
        }
    }

    /// Fetch messages by severity
    ///
    /// An empty filter returns everything, unclassified messages first and
    /// then by ascending severity. Otherwise the named severities are
    /// returned in filter order, with `None` selecting unclassified messages.
    /// Repeated filters are ignored and unseen severities yield nothing.
    pub fn get_reports(&self, severities: &[Option<Severity>]) -> ReportCollection {
        if severities.is_empty() {
            return self.all();
        }

        let mut seen: Vec<Option<Severity>> = Vec::with_capacity(severities.len());
        let mut collection = ReportCollection::new();

        for filter in severities {
            if seen.contains(filter) {
                continue;
            }
            seen.push(*filter);

            match filter {
                None => collection.extend(self.unclassified.iter().cloned()),
                Some(severity) => {
                    if let Some(messages) = self.classified.get(severity) {
                        collection.extend(messages.iter().cloned());
                    }
                }
            }
        }

        collection
    }

    /// Every message, unclassified first
    pub fn all(&self) -> ReportCollection {
        self.unclassified
            .iter()
            .chain(self.classified.values().flatten())
            .cloned()
            .collect()
    }

    /// Messages whose severity is at least `min`; unclassified messages are
    /// not included
    pub fn at_least(&self, min: Severity) -> ReportCollection {
        self.classified
            .range(min..)
            .flat_map(|(_, messages)| messages.iter().cloned())
            .collect()
    }

    /// Number of messages filed under `severity` (`None` for unclassified)
    pub fn count(&self, severity: Option<Severity>) -> usize {
        match severity {
            None => self.unclassified.len(),
            Some(severity) => self.classified.get(&severity).map_or(0, Vec::len),
        }
    }

    /// Most severe classified message, if any
    pub fn highest_severity(&self) -> Option<Severity> {
        self.classified
            .iter()
            .rev()
            .find(|(_, messages)| !messages.is_empty())
            .map(|(severity, _)| *severity)
    }

    pub fn len(&self) -> usize {
        self.unclassified.len() + self.classified.values().map(Vec::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
