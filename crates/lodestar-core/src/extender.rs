//! Wire types of the scheduler extender protocol.
//!
//! Field names follow the orchestrator's extender API verbatim: the Go types
//! carry no JSON tags, so every top-level field is serialized in PascalCase,
//! while the embedded `NodeList` keeps its `items` tag.

use k8s_openapi::api::core::v1::{Node, Pod};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Highest score an extender may assign to a node
pub const MAX_EXTENDER_PRIORITY: i64 = 10;

/// List of full node objects
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeList {
    #[serde(rename = "items", alias = "Items", default)]
    pub items: Vec<Node>,
}

impl NodeList {
    pub fn new(items: Vec<Node>) -> Self {
        Self { items }
    }
}

/// Arguments sent by the orchestrator to `/filter` and `/prioritize`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtenderArgs {
    /// Pod being scheduled
    #[serde(rename = "Pod", alias = "pod")]
    pub pod: Option<Pod>,

    /// Candidate nodes, sent when the extender is not node-cache capable
    #[serde(rename = "Nodes", alias = "nodes")]
    pub nodes: Option<NodeList>,

    /// Candidate node names, sent when the extender is node-cache capable
    #[serde(rename = "NodeNames", alias = "nodeNames", alias = "nodenames")]
    pub node_names: Option<Vec<String>>,
}

/// Map of node name to the reasons it was rejected
pub type FailedNodesMap = BTreeMap<String, String>;

/// Response body of `/filter`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtenderFilterResult {
    /// Nodes that fit, when the request carried full node objects
    #[serde(rename = "Nodes")]
    pub nodes: Option<NodeList>,

    /// Names of nodes that fit, when the request carried node names only
    #[serde(rename = "NodeNames")]
    pub node_names: Option<Vec<String>>,

    /// Nodes rejected for reasons preemption might resolve
    #[serde(rename = "FailedNodes", default)]
    pub failed_nodes: FailedNodesMap,

    /// Nodes rejected for reasons preemption cannot resolve
    #[serde(rename = "FailedAndUnresolvableNodes", default)]
    pub failed_and_unresolvable_nodes: FailedNodesMap,

    /// Non-empty when the whole request failed; other fields are then empty
    #[serde(rename = "Error", default)]
    pub error: String,
}

impl ExtenderFilterResult {
    /// Build a result that carries nothing but an error
    pub fn from_error(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            ..Default::default()
        }
    }

    /// Whether the result reports a request-level failure
    pub fn is_error(&self) -> bool {
        !self.error.is_empty()
    }
}

/// Score assigned to one host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostPriority {
    #[serde(rename = "Host")]
    pub host: String,
    #[serde(rename = "Score")]
    pub score: i64,
}

impl HostPriority {
    pub fn new(host: impl Into<String>, score: i64) -> Self {
        Self {
            host: host.into(),
            score,
        }
    }
}

/// Response body of `/prioritize`
pub type HostPriorityList = Vec<HostPriority>;
