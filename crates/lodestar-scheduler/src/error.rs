// Allow unused assignments for diagnostic fields - they're used by the macros
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

/// Scheduler error type
#[derive(Error, Debug, Diagnostic)]
pub enum SchedulerError {
    /// A fitness predicate could not reach a verdict
    #[error("Predicate {predicate} failed on node {node}: {message}")]
    #[diagnostic(
        code(scheduler::predicate_failed),
        help("The filter request is rejected as a whole rather than returning a partial verdict")
    )]
    PredicateFailed {
        predicate: String,
        node: String,
        message: String,
    },

    /// A priority function could not score a node
    #[error("Priority function {function} failed on node {node}: {message}")]
    #[diagnostic(
        code(scheduler::priority_failed),
        help("The node keeps the scores of the remaining functions")
    )]
    PriorityFailed {
        function: String,
        node: String,
        message: String,
    },

    /// Two plugins were registered under the same name
    #[error("Duplicate {kind} registration: {name}")]
    #[diagnostic(
        code(scheduler::duplicate_registration),
        help("Every predicate and priority function must have a unique name")
    )]
    DuplicateRegistration { kind: String, name: String },

    /// The policy names a plugin that does not exist
    #[error("Unknown {kind}: {name}")]
    #[diagnostic(
        code(scheduler::unknown_plugin),
        help("Run `lodestar check-policy` to list the available plugins")
    )]
    UnknownPlugin { kind: String, name: String },

    /// The policy document is invalid
    #[error("Invalid policy: {message}")]
    #[diagnostic(
        code(scheduler::invalid_policy),
        help("{suggestion}")
    )]
    InvalidPolicy { message: String, suggestion: String },

    /// Evaluation stopped because the caller went away
    #[error("Evaluation cancelled")]
    #[diagnostic(
        code(scheduler::cancelled),
        help("The orchestrator dropped the request before a verdict was reached")
    )]
    Cancelled,

    /// Core error
    #[error("Core error: {0}")]
    #[diagnostic(
        code(scheduler::core_error),
        help("This is an internal error")
    )]
    CoreError(#[from] lodestar_core::LodestarError),

    /// Internal error
    #[error("Internal error: {message}")]
    #[diagnostic(
        code(scheduler::internal_error),
        help("This is likely a bug. Please report it")
    )]
    InternalError { message: String },
}

/// Result type for scheduler operations
pub type Result<T> = std::result::Result<T, SchedulerError>;

impl SchedulerError {
    /// Create a PredicateFailed error
    pub fn predicate_failed(
        predicate: impl Into<String>,
        node: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::PredicateFailed {
            predicate: predicate.into(),
            node: node.into(),
            message: message.into(),
        }
    }

    /// Create a PriorityFailed error
    pub fn priority_failed(
        function: impl Into<String>,
        node: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::PriorityFailed {
            function: function.into(),
            node: node.into(),
            message: message.into(),
        }
    }

    /// Create a DuplicateRegistration error
    pub fn duplicate_registration(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::DuplicateRegistration {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Create an UnknownPlugin error
    pub fn unknown_plugin(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::UnknownPlugin {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Create an InvalidPolicy error
    pub fn invalid_policy(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::InvalidPolicy {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Create an InternalError
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }
}
