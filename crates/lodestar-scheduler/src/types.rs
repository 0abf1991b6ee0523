use lodestar_core::{node_name, FailedNodesMap, LodestarError, Node, Pod, PodRef};
use std::collections::HashSet;

/// Scheduling context: the pod to place and the candidate nodes the
/// orchestrator offered for it.
///
/// Construction validates identity, so every node is known to carry a
/// unique, non-empty name.
#[derive(Debug, Clone)]
pub struct SchedulingContext {
    /// Pod to be scheduled
    pub pod: Pod,
    /// Identity of the pod
    pub pod_ref: PodRef,
    /// Candidate nodes, in request order
    pub nodes: Vec<Node>,
}

impl SchedulingContext {
    /// Create a new scheduling context
    pub fn new(pod: Pod, nodes: Vec<Node>) -> lodestar_core::Result<Self> {
        let pod_ref = PodRef::from_pod(&pod).ok_or_else(|| {
            LodestarError::invalid_request(
                "pod has no metadata.name",
                "Send the full Pod object the orchestrator is scheduling",
            )
        })?;

        {
            let mut seen = HashSet::with_capacity(nodes.len());
            for (index, node) in nodes.iter().enumerate() {
                let name = node_name(node).ok_or_else(|| {
                    LodestarError::invalid_request(
                        format!("node at index {} has no metadata.name", index),
                        "Every candidate node must carry its name",
                    )
                })?;
                if !seen.insert(name) {
                    return Err(LodestarError::invalid_request(
                        format!("node {} appears more than once", name),
                        "Candidate node names must be unique within a request",
                    ));
                }
            }
        }

        Ok(Self {
            pod,
            pod_ref,
            nodes,
        })
    }

    /// Candidate nodes paired with their names, in request order
    pub fn candidates(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.nodes
            .iter()
            .map(|node| (node_name(node).unwrap_or_default(), node))
    }
}

/// Verdict of one predicate for one (pod, node) pair
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PredicateResult {
    /// Whether the node can host the pod
    pub fits: bool,
    /// Human-readable reasons, reported in order
    pub reasons: Vec<String>,
    /// Whether the failure is one preemption cannot resolve
    pub unresolvable: bool,
}

impl PredicateResult {
    /// Create a passing result
    pub fn fit() -> Self {
        Self {
            fits: true,
            ..Default::default()
        }
    }

    /// Create a failing result that preemption may resolve
    pub fn unfit(reasons: Vec<String>) -> Self {
        Self {
            fits: false,
            reasons,
            unresolvable: false,
        }
    }

    /// Create a failing result that preemption cannot resolve
    pub fn unresolvable(reasons: Vec<String>) -> Self {
        Self {
            fits: false,
            reasons,
            unresolvable: true,
        }
    }
}

/// Partition of the candidate nodes produced by the filter evaluator
#[derive(Debug, Clone, Default)]
pub struct FilterOutcome {
    /// Nodes every predicate accepted, in request order
    pub eligible: Vec<Node>,
    /// Rejected nodes and their joined reasons
    pub failed: FailedNodesMap,
    /// Rejected nodes whose failure preemption cannot resolve
    pub unresolvable: FailedNodesMap,
}

impl FilterOutcome {
    /// Names of the eligible nodes, in request order
    pub fn eligible_names(&self) -> Vec<String> {
        self.eligible
            .iter()
            .filter_map(|n| node_name(n).map(str::to_string))
            .collect()
    }

    /// Number of rejected nodes across both failure maps
    pub fn rejected_count(&self) -> usize {
        self.failed.len() + self.unresolvable.len()
    }
}

/// What one priority function produced for one node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoreOutcome {
    /// The function scored the node; `raw` is what it returned, `clamped`
    /// what the combiner used
    Scored { raw: i64, clamped: i64 },
    /// The function could not score the node
    Failed(String),
}

/// Contribution of a single priority function to a node score
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionScore {
    pub function: String,
    pub weight: i64,
    pub outcome: ScoreOutcome,
}

/// Final score of one node, with the per-function breakdown kept as context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeScore {
    /// Node name
    pub node_name: String,
    /// Combined score in [0, MAX_EXTENDER_PRIORITY]
    pub score: i64,
    /// Per-function results, in registry order
    pub breakdown: Vec<FunctionScore>,
}

impl NodeScore {
    /// Whether any function failed for this node
    pub fn is_degraded(&self) -> bool {
        self.breakdown
            .iter()
            .any(|f| matches!(f.outcome, ScoreOutcome::Failed(_)))
    }
}
