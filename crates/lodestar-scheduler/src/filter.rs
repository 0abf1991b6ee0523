use crate::predicate::PredicateRegistry;
use crate::types::{FilterOutcome, PredicateResult, SchedulingContext};
use crate::{Result, SchedulerError};
use lodestar_core::{Node, Pod};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Run every registered predicate against one node.
///
/// Reasons of all failing predicates are accumulated in registry order. The
/// first predicate error stops evaluation for the node and is returned as
/// [`SchedulerError::PredicateFailed`].
pub fn pod_fits_on_node(
    registry: &PredicateRegistry,
    pod: &Pod,
    node_name: &str,
    node: &Node,
) -> Result<PredicateResult> {
    let mut verdict = PredicateResult::fit();

    for predicate in registry.iter() {
        let result = predicate
            .filter(pod, node)
            .map_err(|e| SchedulerError::predicate_failed(predicate.name(), node_name, e.to_string()))?;

        if result.fits {
            continue;
        }

        debug!(
            "Node {} rejected by {}: {}",
            node_name,
            predicate.name(),
            result.reasons.join(",")
        );

        verdict.fits = false;
        verdict.unresolvable |= result.unresolvable;
        if result.reasons.is_empty() {
            verdict
                .reasons
                .push(format!("{} predicate not satisfied", predicate.name()));
        } else {
            verdict.reasons.extend(result.reasons);
        }
    }

    Ok(verdict)
}

/// Partition the candidate nodes of a request into eligible and rejected.
///
/// Fails closed: a predicate error on any node aborts the whole request and
/// no partial outcome is returned.
pub fn filter_nodes(
    registry: &PredicateRegistry,
    context: &SchedulingContext,
    cancel: &CancellationToken,
) -> Result<FilterOutcome> {
    let mut outcome = FilterOutcome::default();

    for (node_name, node) in context.candidates() {
        if cancel.is_cancelled() {
            return Err(SchedulerError::Cancelled);
        }

        let verdict = pod_fits_on_node(registry, &context.pod, node_name, node)?;

        if verdict.fits {
            debug!("Pod {} fits on node {}", context.pod_ref, node_name);
            outcome.eligible.push(node.clone());
        } else if verdict.unresolvable {
            outcome
                .unresolvable
                .insert(node_name.to_string(), verdict.reasons.join(","));
        } else {
            outcome
                .failed
                .insert(node_name.to_string(), verdict.reasons.join(","));
        }
    }

    Ok(outcome)
}
