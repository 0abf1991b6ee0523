use crate::priority::{clamp_score, PriorityRegistry};
use crate::types::{FunctionScore, NodeScore, SchedulingContext, ScoreOutcome};
use crate::{Result, SchedulerError};
use lodestar_core::{Node, Pod, MAX_EXTENDER_PRIORITY};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Score one node with every registered function and combine the results.
///
/// Never fails: a function error is recorded in the breakdown and the node
/// keeps whatever the other functions produced (0 if none succeeded).
pub fn score_node(registry: &PriorityRegistry, pod: &Pod, node_name: &str, node: &Node) -> NodeScore {
    let mut breakdown = Vec::with_capacity(registry.len());
    let mut usable = Vec::with_capacity(registry.len());

    for entry in registry.entries() {
        let function = entry.function.name();

        let outcome = match entry.function.score(pod, node) {
            Ok(raw) => {
                let clamped = clamp_score(raw);
                if clamped != raw {
                    warn!(
                        "Priority function {} returned {} for node {}, clamped to {} (range 0..={})",
                        function, raw, node_name, clamped, MAX_EXTENDER_PRIORITY
                    );
                }
                usable.push((entry.weight, clamped));
                ScoreOutcome::Scored { raw, clamped }
            }
            Err(e) => {
                let err = SchedulerError::priority_failed(function, node_name, e.to_string());
                warn!("{}", err);
                ScoreOutcome::Failed(e.to_string())
            }
        };

        breakdown.push(FunctionScore {
            function: function.to_string(),
            weight: entry.weight,
            outcome,
        });
    }

    let score = registry.combiner().combine(&usable);

    debug!(
        "Node {} scored {} ({} of {} functions contributed)",
        node_name,
        score,
        usable.len(),
        breakdown.len()
    );

    NodeScore {
        node_name: node_name.to_string(),
        score,
        breakdown,
    }
}

/// Score every candidate node, one entry per node in request order.
///
/// Never removes a node; removal is the filter's job.
pub fn prioritize_nodes(
    registry: &PriorityRegistry,
    context: &SchedulingContext,
    cancel: &CancellationToken,
) -> Result<Vec<NodeScore>> {
    let mut scores = Vec::with_capacity(context.nodes.len());

    for (node_name, node) in context.candidates() {
        if cancel.is_cancelled() {
            return Err(SchedulerError::Cancelled);
        }

        scores.push(score_node(registry, &context.pod, node_name, node));
    }

    Ok(scores)
}
