//! Report severities

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How severe a report message is
///
/// Variants are declared in weight order, so the derived ordering matches
/// [`Severity::weight`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Non-issues the developer should know about
    Debug,
    /// Non-issues the user should know about
    Info,
    /// Issues that do not prevent structural validation
    Warn,
    /// Issues that let validation continue to some degree
    Error,
    /// A severity outside the standard scale
    Unclassified,
    /// Issues that prevent further validation
    Fatal,
}

impl Severity {
    pub const ALL: [Severity; 6] = [
        Severity::Debug,
        Severity::Info,
        Severity::Warn,
        Severity::Error,
        Severity::Unclassified,
        Severity::Fatal,
    ];

    /// Fixed weight between 0.0 (debug) and 1.0 (fatal)
    pub fn weight(&self) -> f32 {
        match self {
            Self::Debug => 0.0,
            Self::Info => 0.1,
            Self::Warn => 0.25,
            Self::Error => 0.5,
            Self::Unclassified => 0.75,
            Self::Fatal => 1.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Unclassified => "unclassified",
            Self::Fatal => "fatal",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown severity name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown severity: {0}")]
pub struct ParseSeverityError(pub String);

impl FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            "unclassified" => Ok(Self::Unclassified),
            "fatal" => Ok(Self::Fatal),
            _ => Err(ParseSeverityError(s.to_string())),
        }
    }
}
