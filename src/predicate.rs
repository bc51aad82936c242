//! Predicates
//!
//! A predicate is a quiet yes/no test against an input. Attached to an audit
//! it decides whether that audit applies at all: when any predicate fails,
//! the audit is treated as if it was never there.

use std::fmt;
use std::sync::Arc;

use crate::structure::InputStructure;

/// Shared handle to a predicate
pub type PredicateRef = Arc<dyn Predicate>;

/// A silent test against an input
pub trait Predicate: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    fn test(&self, input: &dyn InputStructure) -> bool;
}

/// Always passes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlwaysTrue;

impl Predicate for AlwaysTrue {
    fn name(&self) -> &str {
        "always_true"
    }

    fn test(&self, _input: &dyn InputStructure) -> bool {
        true
    }
}

/// Always fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlwaysFalse;

impl Predicate for AlwaysFalse {
    fn name(&self) -> &str {
        "always_false"
    }

    fn test(&self, _input: &dyn InputStructure) -> bool {
        false
    }
}

type TestFn = dyn Fn(&dyn InputStructure) -> bool + Send + Sync;

/// Predicate backed by a closure
pub struct FnPredicate {
    name: String,
    test: Box<TestFn>,
}

impl FnPredicate {
    pub fn new<F>(name: impl Into<String>, test: F) -> Self
    where
        F: Fn(&dyn InputStructure) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            test: Box::new(test),
        }
    }
}

impl Predicate for FnPredicate {
    fn name(&self) -> &str {
        &self.name
    }

    fn test(&self, input: &dyn InputStructure) -> bool {
        (self.test)(input)
    }
}

impl fmt::Debug for FnPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnPredicate").field("name", &self.name).finish_non_exhaustive()
    }
}
