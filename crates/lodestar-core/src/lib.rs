//! Lodestar Core - Shared types for the Lodestar scheduler extender
//!
//! This crate provides:
//! - Extender protocol wire types (filter and prioritize)
//! - Pod and node identity helpers
//! - Resource quantity parsing
//! - Error types with miette diagnostics
//! - Serialization helpers

pub mod error;
pub mod extender;
pub mod resources;
pub mod types;

// Re-export commonly used types
pub use error::{LodestarError, Result};
pub use extender::{
    ExtenderArgs, ExtenderFilterResult, FailedNodesMap, HostPriority, HostPriorityList, NodeList,
    MAX_EXTENDER_PRIORITY,
};
pub use resources::ResourceQuantities;
pub use types::{named_node, node_name, PodRef};

// Re-export k8s-openapi types for convenience
pub use k8s_openapi;
pub use k8s_openapi::api::core::v1::{Node, Pod};
pub use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

/// Serialize a value to JSON bytes
pub fn to_json_vec<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| {
        LodestarError::serialization_error(
            format!("Failed to serialize to JSON: {}", e),
            Some(Box::new(e)),
        )
    })
}

/// Deserialize a value from JSON bytes
pub fn from_json_slice<T: for<'de> serde::Deserialize<'de>>(data: &[u8]) -> Result<T> {
    serde_json::from_slice(data).map_err(|e| {
        LodestarError::serialization_error(
            format!("Failed to deserialize from JSON: {}", e),
            Some(Box::new(e)),
        )
    })
}

/// Deserialize a value from YAML
pub fn from_yaml<T: for<'de> serde::Deserialize<'de>>(data: &str) -> Result<T> {
    serde_yaml::from_str(data).map_err(|e| {
        LodestarError::serialization_error(
            format!("Failed to deserialize from YAML: {}", e),
            Some(Box::new(e)),
        )
    })
}
