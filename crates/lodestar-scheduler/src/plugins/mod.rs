//! Built-in predicates and priority functions, and the catalog that builds
//! them from policy entries.

pub mod predicates;
pub mod priorities;

pub use predicates::{AlwaysFit, NodeSelectorMatch, PodFitsResources, TaintToleration};
pub use priorities::{BalancedAllocation, Constant, LeastAllocated};

use crate::predicate::FilterPredicate;
use crate::priority::ScoreFunction;
use crate::{Result, SchedulerError};
use lodestar_core::MAX_EXTENDER_PRIORITY;
use serde::Deserialize;
use std::sync::Arc;

/// Names accepted in the `predicates` section of a policy
pub const PREDICATE_NAMES: [&str; 4] = [
    "PodFitsResources",
    "NodeSelectorMatch",
    "TaintToleration",
    "AlwaysFit",
];

/// Names accepted in the `priorities` section of a policy
pub const PRIORITY_NAMES: [&str; 3] = ["LeastAllocated", "BalancedAllocation", "Constant"];

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ConstantArgs {
    score: i64,
}

fn no_args(kind: &str, name: &str, args: &serde_json::Value) -> Result<()> {
    if args.is_null() {
        return Ok(());
    }
    Err(SchedulerError::invalid_policy(
        format!("{} {} takes no args", kind, name),
        format!("Remove the args block from {}", name),
    ))
}

/// Instantiate a built-in predicate by name
pub fn predicate_by_name(name: &str, args: &serde_json::Value) -> Result<Arc<dyn FilterPredicate>> {
    let predicate: Arc<dyn FilterPredicate> = match name {
        "PodFitsResources" => Arc::new(PodFitsResources),
        "NodeSelectorMatch" => Arc::new(NodeSelectorMatch),
        "TaintToleration" => Arc::new(TaintToleration),
        "AlwaysFit" => Arc::new(AlwaysFit),
        _ => return Err(SchedulerError::unknown_plugin("predicate", name)),
    };
    no_args("predicate", name, args)?;
    Ok(predicate)
}

/// Instantiate a built-in priority function by name
pub fn priority_by_name(name: &str, args: &serde_json::Value) -> Result<Arc<dyn ScoreFunction>> {
    match name {
        "LeastAllocated" => {
            no_args("priority function", name, args)?;
            Ok(Arc::new(LeastAllocated))
        }
        "BalancedAllocation" => {
            no_args("priority function", name, args)?;
            Ok(Arc::new(BalancedAllocation))
        }
        "Constant" => {
            let parsed: ConstantArgs = serde_json::from_value(args.clone()).map_err(|e| {
                SchedulerError::invalid_policy(
                    format!("invalid args for Constant: {}", e),
                    "Constant expects `args: { score: <0..=10> }`",
                )
            })?;
            if !(0..=MAX_EXTENDER_PRIORITY).contains(&parsed.score) {
                return Err(SchedulerError::invalid_policy(
                    format!("Constant score {} is out of range", parsed.score),
                    format!("Use a score between 0 and {}", MAX_EXTENDER_PRIORITY),
                ));
            }
            Ok(Arc::new(Constant {
                score: parsed.score,
            }))
        }
        _ => Err(SchedulerError::unknown_plugin("priority function", name)),
    }
}
