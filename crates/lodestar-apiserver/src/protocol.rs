//! Translation between extender wire payloads and evaluator calls.
//!
//! The two endpoints report failures differently: a filter result has an
//! `Error` field, a priority list has nowhere to put one and comes back empty.
//! Both shapes are part of the orchestrator's contract and are kept as is.

use lodestar_core::{
    named_node, ExtenderArgs, ExtenderFilterResult, HostPriority, HostPriorityList, LodestarError,
    NodeList,
};
use lodestar_scheduler::{FilterOutcome, NodeScore, SchedulingContext};

/// How the orchestrator described the candidate nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeSource {
    /// Full node objects in `Nodes`
    Objects,
    /// Node names only in `NodeNames` (node-cache-capable extenders)
    Names,
}

/// A decoded and validated extender request
#[derive(Debug, Clone)]
pub struct ExtensionRequest {
    pub context: SchedulingContext,
    pub source: NodeSource,
}

/// Decode a request body.
///
/// Besides malformed JSON, a request without a pod, without any nodes, or
/// with unnamed or duplicate nodes is rejected.
pub fn decode_request(body: &[u8]) -> lodestar_core::Result<ExtensionRequest> {
    let args: ExtenderArgs = lodestar_core::from_json_slice(body)?;

    let pod = args.pod.ok_or_else(|| {
        LodestarError::invalid_request(
            "extender args carry no Pod",
            "Send ExtenderArgs with the Pod being scheduled",
        )
    })?;

    let (nodes, source) = match (args.nodes, args.node_names) {
        (Some(list), _) => (list.items, NodeSource::Objects),
        (None, Some(names)) => (
            names.into_iter().map(named_node).collect(),
            NodeSource::Names,
        ),
        (None, None) => {
            return Err(LodestarError::invalid_request(
                "extender args carry neither Nodes nor NodeNames",
                "Send the candidate nodes in Nodes.items or NodeNames",
            ))
        }
    };

    let context = SchedulingContext::new(pod, nodes)?;

    Ok(ExtensionRequest { context, source })
}

/// Shape a filter outcome for the wire, answering in the form the nodes came in
pub fn filter_result(outcome: FilterOutcome, source: NodeSource) -> ExtenderFilterResult {
    let (nodes, node_names) = match source {
        NodeSource::Objects => (Some(NodeList::new(outcome.eligible)), None),
        NodeSource::Names => (None, Some(outcome.eligible_names())),
    };

    ExtenderFilterResult {
        nodes,
        node_names,
        failed_nodes: outcome.failed,
        failed_and_unresolvable_nodes: outcome.unresolvable,
        error: String::new(),
    }
}

/// Filter response for a request that could not be decoded or evaluated
pub fn filter_error(error: impl ToString) -> ExtenderFilterResult {
    ExtenderFilterResult::from_error(error.to_string())
}

/// Reduce node scores to the wire list, keeping their order
pub fn host_priorities(scores: &[NodeScore]) -> HostPriorityList {
    scores
        .iter()
        .map(|s| HostPriority::new(s.node_name.clone(), s.score))
        .collect()
}

/// Prioritize response for a request that could not be decoded
pub fn prioritize_error() -> HostPriorityList {
    HostPriorityList::new()
}
