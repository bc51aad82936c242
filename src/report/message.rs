//! Report messages

use regex::{Captures, Regex};
use std::fmt;
use std::sync::OnceLock;

use super::context::ContextRef;
use super::severity::Severity;

/// Matches `%s`, `%N$s` and `%%`
fn placeholder_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"%(?:(\d+)\$)?s|%%").ok())
        .as_ref()
}

/// A report message: printf-style format, arguments, context, and an
/// optional severity
#[derive(Debug, Clone)]
pub struct Message {
    context: ContextRef,
    format: String,
    args: Vec<String>,
    severity: Option<Severity>,
}

impl Message {
    /// Create a message without a severity
    pub fn new<I, S>(context: ContextRef, format: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            context,
            format: format.into(),
            args: args.into_iter().map(Into::into).collect(),
            severity: None,
        }
    }

    fn leveled<I, S>(severity: Severity, context: ContextRef, format: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(context, format, args).with_severity(severity)
    }

    /// Non-issues the developer should be aware of, such as successfully
    /// acting on a field's value
    pub fn debug<I, S>(context: ContextRef, format: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::leveled(Severity::Debug, context, format, args)
    }

    /// Non-issues the user should be aware of, such as an accepted custom
    /// value outside the usual list
    pub fn info<I, S>(context: ContextRef, format: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::leveled(Severity::Info, context, format, args)
    }

    /// Issues that do not prevent validation, such as unexpected keys
    pub fn warn<I, S>(context: ContextRef, format: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::leveled(Severity::Warn, context, format, args)
    }

    /// Issues that let validation continue to some degree, such as a field of
    /// the wrong type
    pub fn error<I, S>(context: ContextRef, format: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::leveled(Severity::Error, context, format, args)
    }

    /// Issues that stop validation outright
    pub fn fatal<I, S>(context: ContextRef, format: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::leveled(Severity::Fatal, context, format, args)
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn set_severity(&mut self, severity: Severity) {
        self.severity = Some(severity);
    }

    pub fn context(&self) -> &ContextRef {
        &self.context
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn severity(&self) -> Option<Severity> {
        self.severity
    }

    /// Render the format against the arguments
    ///
    /// `%s` takes the next argument, `%2$s` takes the second, `%%` is a
    /// literal percent sign. Placeholders without a matching argument are
    /// left as written.
    pub fn build_message(&self) -> String {
        let Some(pattern) = placeholder_pattern() else {
            return self.format.clone();
        };

        let mut next = 0usize;
        pattern
            .replace_all(&self.format, |caps: &Captures<'_>| {
                let whole = &caps[0];
                if whole == "%%" {
                    return "%".to_string();
                }
                let index = match caps.get(1) {
                    Some(position) => match position.as_str().parse::<usize>() {
                        Ok(n) if n > 0 => n - 1,
                        _ => return whole.to_string(),
                    },
                    None => {
                        let index = next;
                        next += 1;
                        index
                    }
                };
                self.args
                    .get(index)
                    .cloned()
                    .unwrap_or_else(|| whole.to_string())
            })
            .into_owned()
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.severity {
            Some(severity) => write!(f, "[{}] {}", severity, self.build_message()),
            None => write!(f, "{}", self.build_message()),
        }
    }
}
