use crate::priority::ScoreFunction;
use crate::Result;
use lodestar_core::{Node, Pod, ResourceQuantities, MAX_EXTENDER_PRIORITY};
use tracing::debug;

/// Score given to nodes whose allocatable resources are unknown, so they
/// neither win nor lose against each other
pub const NEUTRAL_SCORE: i64 = MAX_EXTENDER_PRIORITY / 2;

fn scale(fraction: f64) -> i64 {
    (fraction.clamp(0.0, 1.0) * MAX_EXTENDER_PRIORITY as f64).round() as i64
}

/// Prefer nodes on which the pod would use the smallest share of allocatable
/// CPU and memory
pub struct LeastAllocated;

impl ScoreFunction for LeastAllocated {
    fn score(&self, pod: &Pod, node: &Node) -> Result<i64> {
        let Some(available) = ResourceQuantities::node_allocatable(node)? else {
            debug!("Node reports no allocatable resources, neutral score {}", NEUTRAL_SCORE);
            return Ok(NEUTRAL_SCORE);
        };

        // If node has no resources, score 0
        if available.cpu_millicores == 0 || available.memory_bytes == 0 {
            return Ok(0);
        }

        let requested = ResourceQuantities::pod_requests(pod)?;

        let cpu_utilization = requested.cpu_millicores as f64 / available.cpu_millicores as f64;
        let memory_utilization = requested.memory_bytes as f64 / available.memory_bytes as f64;

        // Lower utilization = higher score
        let avg_utilization = (cpu_utilization + memory_utilization) / 2.0;
        let score = scale(1.0 - avg_utilization);

        debug!(
            "Node least-allocated score: {} (CPU util: {:.1}%, Memory util: {:.1}%)",
            score,
            cpu_utilization * 100.0,
            memory_utilization * 100.0
        );

        Ok(score)
    }

    fn name(&self) -> &str {
        "LeastAllocated"
    }
}

/// Prefer nodes on which the pod's CPU and memory shares are similar
pub struct BalancedAllocation;

impl ScoreFunction for BalancedAllocation {
    fn score(&self, pod: &Pod, node: &Node) -> Result<i64> {
        let Some(available) = ResourceQuantities::node_allocatable(node)? else {
            debug!("Node reports no allocatable resources, neutral score {}", NEUTRAL_SCORE);
            return Ok(NEUTRAL_SCORE);
        };

        if available.cpu_millicores == 0 || available.memory_bytes == 0 {
            return Ok(0);
        }

        let requested = ResourceQuantities::pod_requests(pod)?;

        let cpu_fraction = requested.cpu_millicores as f64 / available.cpu_millicores as f64;
        let memory_fraction = requested.memory_bytes as f64 / available.memory_bytes as f64;

        let variance = (cpu_fraction - memory_fraction).abs();
        let score = scale(1.0 - variance);

        debug!(
            "Node balanced allocation score: {} (variance: {:.3})",
            score, variance
        );

        Ok(score)
    }

    fn name(&self) -> &str {
        "BalancedAllocation"
    }
}

/// Give every node the same score
pub struct Constant {
    pub score: i64,
}

impl ScoreFunction for Constant {
    fn score(&self, _pod: &Pod, _node: &Node) -> Result<i64> {
        Ok(self.score)
    }

    fn name(&self) -> &str {
        "Constant"
    }
}
