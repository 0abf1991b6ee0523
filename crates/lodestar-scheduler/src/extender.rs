use crate::filter::filter_nodes;
use crate::policy::Policy;
use crate::predicate::PredicateRegistry;
use crate::priority::PriorityRegistry;
use crate::score::prioritize_nodes;
use crate::types::{FilterOutcome, NodeScore, SchedulingContext};
use crate::Result;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// The extender's evaluation engine: the frozen registries plus the two
/// entry points the orchestrator calls.
///
/// Holds no per-request state, so one instance serves every request
/// concurrently. Cloning is cheap.
#[derive(Debug, Clone, Default)]
pub struct Extender {
    predicates: PredicateRegistry,
    priorities: PriorityRegistry,
}

impl Extender {
    /// Create an extender from already built registries
    pub fn new(predicates: PredicateRegistry, priorities: PriorityRegistry) -> Self {
        Self {
            predicates,
            priorities,
        }
    }

    /// Create an extender from a policy
    pub fn from_policy(policy: &Policy) -> Result<Self> {
        let (predicates, priorities) = policy.build()?;
        info!(
            "Extender policy: predicates {:?}, priorities {:?}",
            predicates.names(),
            priorities
        );
        Ok(Self::new(predicates, priorities))
    }

    pub fn predicates(&self) -> &PredicateRegistry {
        &self.predicates
    }

    pub fn priorities(&self) -> &PriorityRegistry {
        &self.priorities
    }

    /// Decide which candidate nodes can host the pod
    pub fn filter(
        &self,
        context: &SchedulingContext,
        cancel: &CancellationToken,
    ) -> Result<FilterOutcome> {
        let outcome = filter_nodes(&self.predicates, context, cancel)?;

        info!(
            "Pod {}: {} of {} nodes eligible",
            context.pod_ref,
            outcome.eligible.len(),
            context.nodes.len()
        );

        Ok(outcome)
    }

    /// Score every candidate node for the pod
    pub fn prioritize(
        &self,
        context: &SchedulingContext,
        cancel: &CancellationToken,
    ) -> Result<Vec<NodeScore>> {
        let scores = prioritize_nodes(&self.priorities, context, cancel)?;

        for degraded in scores.iter().filter(|s| s.is_degraded()) {
            warn!(
                "Pod {}: node {} scored {} with failing functions: {:?}",
                context.pod_ref, degraded.node_name, degraded.score, degraded.breakdown
            );
        }

        info!(
            "Pod {}: scored {} nodes",
            context.pod_ref,
            scores.len()
        );

        Ok(scores)
    }
}
