// Allow unused assignments for diagnostic fields - they're used by the macros
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

/// Core error type for Lodestar operations
#[derive(Error, Debug, Diagnostic)]
pub enum LodestarError {
    /// Extender request could not be turned into a scheduling request
    #[error("Invalid extender request: {reason}")]
    #[diagnostic(
        code(lodestar::invalid_request),
        help("{suggestion}")
    )]
    InvalidRequest {
        #[allow(unused)]
        reason: String,
        #[allow(unused)]
        suggestion: String,
    },

    /// Resource quantity could not be parsed
    #[error("Invalid quantity '{value}': {reason}")]
    #[diagnostic(
        code(lodestar::invalid_quantity),
        help("Use a Kubernetes quantity such as '500m', '2', '128Mi' or '1Gi'")
    )]
    InvalidQuantity {
        #[allow(unused)]
        value: String,
        #[allow(unused)]
        reason: String,
    },

    /// Serialization error
    #[error("Serialization error: {message}")]
    #[diagnostic(
        code(lodestar::serialization_error),
        help("Ensure the document is valid JSON or YAML")
    )]
    SerializationError {
        #[allow(unused)]
        message: String,
        #[source]
        #[allow(unused)]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal error
    #[error("Internal error: {message}")]
    #[diagnostic(
        code(lodestar::internal_error),
        help("This is likely a bug. Please report it with the full error details")
    )]
    InternalError {
        #[allow(unused)]
        message: String,
    },
}

/// Result type alias for Lodestar operations
pub type Result<T> = std::result::Result<T, LodestarError>;

impl LodestarError {
    /// Create an InvalidRequest error
    pub fn invalid_request(reason: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::InvalidRequest {
            reason: reason.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Create an InvalidQuantity error
    pub fn invalid_quantity(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidQuantity {
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a SerializationError
    pub fn serialization_error(
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::SerializationError {
            message: message.into(),
            source,
        }
    }

    /// Create an InternalError
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }
}
