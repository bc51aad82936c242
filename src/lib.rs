//! Structure Audit
//!
//! An audit orchestration engine for validating tree-shaped input (JSON
//! documents, config files, parsed markup) against an expected structure.
//! Format libraries supply the structures; this crate decides which audits
//! run, in what order, and which diagnostics anyone gets to see.
//!
//! ## Features
//!
//! - **Ordered audits**: local audits, then global audits, then deferred ones
//! - **Predicate gating**: an audit only applies when all its predicates pass
//! - **Combinators**: OR / XOR / NOT with speculative, capturable events
//! - **Severity reports**: messages bucketed by severity, faults become fatal
//!
//! ## Architecture
//!
//! ```text
//! Engine::validate
//! └── ExpectedStructure::compare
//!     └── compare_structure
//!         ├── run_audit (local, global)
//!         │   ├── run_predicates   (bus muted)
//!         │   └── Audit::audit     (Combinator: capture / release / clear)
//!         └── run_audit (deferred)
//! ```

pub mod audit;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod predicate;
pub mod report;
pub mod statistics;
pub mod structure;

pub use audit::{Audit, AuditExt, AuditRef, Combinator, ConfiguredAudit, FnAudit, Operator, TriggerEvent};
pub use config::EngineConfig;
pub use engine::{Engine, Results, ResultsSummary, Session};
pub use error::{AuditError, Result};
pub use events::{CapturedEvent, Event, EventBus, EventName};
pub use predicate::{FnPredicate, Predicate, PredicateRef};
pub use report::{Context, ContextRef, Message, Reports, Severity};
pub use statistics::Statistics;
pub use structure::{ExpectedStructure, InputStructure, Node, Structure};
