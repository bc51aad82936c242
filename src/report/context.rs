//! Structural context attached to report messages
//!
//! A context is the piece of the input a message talks about. For
//! `{"first":{"second":true}}` a deep audit would point at `"second":true`
//! rather than the whole document.

use std::fmt;
use std::sync::Arc;

use crate::statistics::Statistics;

/// Shared handle to a context
pub type ContextRef = Arc<dyn Context>;

/// Describes the part of a structure a message refers to
pub trait Context: fmt::Debug + Send + Sync {
    /// Render the context for display, optionally prettified
    fn context_to_string(&self, prettifier: Option<&dyn Prettifier>) -> String;

    /// Fold this context into the running statistics
    fn add_context_to_stats(&self, _statistics: &mut Statistics) {}
}

/// Turns raw rendered text into something nicer to read
pub trait Prettifier {
    fn prettify(&self, raw: &str) -> String;

    fn prettify_key(&self, key: &str) -> String {
        self.prettify(key)
    }

    fn prettify_value(&self, value: &str) -> String {
        self.prettify(value)
    }

    /// Prettify with an ad-hoc closure instead of the built-in rules
    fn prettify_with(&self, raw: &str, f: &dyn Fn(&str) -> String) -> String {
        f(raw)
    }
}

/// Context with nothing but a fixed label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextContext(pub String);

impl TextContext {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn shared(text: impl Into<String>) -> ContextRef {
        Arc::new(Self::new(text))
    }
}

impl Context for TextContext {
    fn context_to_string(&self, prettifier: Option<&dyn Prettifier>) -> String {
        match prettifier {
            Some(p) => p.prettify(&self.0),
            None => self.0.clone(),
        }
    }
}

/// Quote and HTML-escape keys: `"a", "b"`
pub fn keys<S: AsRef<str>>(keys: &[S]) -> String {
    keys.iter()
        .map(|k| format!("\"{}\"", escape_html(k.as_ref())))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Wrap HTML-escaped values in `<code>` tags: `<code>1</code>, <code>2</code>`
pub fn values<S: AsRef<str>>(values: &[S]) -> String {
    values
        .iter()
        .map(|v| format!("<code>{}</code>", escape_html(v.as_ref())))
        .collect::<Vec<_>>()
        .join(", ")
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
