//! Lodestar Scheduler - Predicate and priority evaluation for the extender
//!
//! This crate provides:
//! - Predicate and priority function registries
//! - Filter evaluation (fail-closed, reasons accumulated per node)
//! - Priority evaluation (clamped, combined, partial-failure tolerant)
//! - Built-in deterministic plugins
//! - Policy loading

pub mod error;
pub mod types;
pub mod predicate;
pub mod priority;
pub mod filter;
pub mod score;
pub mod plugins;
pub mod policy;
pub mod extender;

// Re-export commonly used types
pub use error::{SchedulerError, Result};
pub use extender::Extender;
pub use policy::Policy;
pub use predicate::{FilterPredicate, PredicateRegistry};
pub use priority::{Combiner, ScoreFunction, PriorityRegistry};
pub use types::{FilterOutcome, NodeScore, PredicateResult, SchedulingContext};
