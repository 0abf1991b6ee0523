pub mod common;
pub mod extender;

// Re-export handler functions
pub use common::*;
pub use extender::*;
