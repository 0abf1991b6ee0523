//! Lodestar API Server - HTTP surface of the scheduler extender
//!
//! This crate provides:
//! - Axum-based HTTP server with optional TLS
//! - `filter` and `prioritize` extender endpoints
//! - Translation between the extender wire protocol and the evaluator
//! - Health endpoints

pub mod error;
pub mod handlers;
pub mod protocol;
pub mod response;
pub mod server;
pub mod state;
pub mod tls;

// Re-export commonly used types
pub use error::{ApiError, Result};
pub use server::{ApiServer, Config};
pub use state::{AppState, DEFAULT_MAX_BODY_BYTES};
pub use tls::TlsMode;
