use crate::predicate::FilterPredicate;
use crate::types::PredicateResult;
use crate::Result;
use k8s_openapi::api::core::v1::{Taint, Toleration};
use lodestar_core::{Node, Pod, ResourceQuantities};
use tracing::debug;

/// Taint effects that keep pods off a node unless tolerated
const BLOCKING_EFFECTS: [&str; 2] = ["NoSchedule", "NoExecute"];

/// Compare the pod's summed container requests with the node's allocatable
/// resources.
///
/// The extender never sees the pods already bound to a node, so this only
/// rejects nodes that could not host the pod even when empty. Unparsable
/// quantities are errors, not rejections. A node that reports no allocatable
/// resources (name-only nodes) is not judged and passes.
pub struct PodFitsResources;

impl FilterPredicate for PodFitsResources {
    fn filter(&self, pod: &Pod, node: &Node) -> Result<PredicateResult> {
        if pod.spec.is_none() {
            return Ok(PredicateResult::unfit(vec!["Pod has no spec".to_string()]));
        }

        let Some(available) = ResourceQuantities::node_allocatable(node)? else {
            debug!("Node reports no allocatable resources, skipping resource check");
            return Ok(PredicateResult::fit());
        };
        let requested = ResourceQuantities::pod_requests(pod)?;

        debug!(
            "Pod requests CPU: {} milli, Memory: {} bytes; node has CPU: {} milli, Memory: {} bytes",
            requested.cpu_millicores,
            requested.memory_bytes,
            available.cpu_millicores,
            available.memory_bytes
        );

        let mut reasons = Vec::new();
        if requested.cpu_millicores > available.cpu_millicores {
            reasons.push(format!(
                "Insufficient CPU: requested {} milli, available {} milli",
                requested.cpu_millicores, available.cpu_millicores
            ));
        }
        if requested.memory_bytes > available.memory_bytes {
            reasons.push(format!(
                "Insufficient memory: requested {} bytes, available {} bytes",
                requested.memory_bytes, available.memory_bytes
            ));
        }

        if reasons.is_empty() {
            Ok(PredicateResult::fit())
        } else {
            Ok(PredicateResult::unfit(reasons))
        }
    }

    fn name(&self) -> &str {
        "PodFitsResources"
    }
}

/// Require every `nodeSelector` entry of the pod to be present on the node
pub struct NodeSelectorMatch;

impl FilterPredicate for NodeSelectorMatch {
    fn filter(&self, pod: &Pod, node: &Node) -> Result<PredicateResult> {
        let Some(selector) = pod.spec.as_ref().and_then(|s| s.node_selector.as_ref()) else {
            return Ok(PredicateResult::fit());
        };

        let labels = node.metadata.labels.as_ref();
        let reasons: Vec<String> = selector
            .iter()
            .filter(|(key, value)| labels.and_then(|l| l.get(*key)) != Some(*value))
            .map(|(key, value)| format!("Node selector mismatch: {}={}", key, value))
            .collect();

        if reasons.is_empty() {
            Ok(PredicateResult::fit())
        } else {
            // Preempting other pods never changes a node's labels
            Ok(PredicateResult::unresolvable(reasons))
        }
    }

    fn name(&self) -> &str {
        "NodeSelectorMatch"
    }
}

/// Keep pods off nodes whose `NoSchedule`/`NoExecute` taints they do not tolerate
pub struct TaintToleration;

impl TaintToleration {
    fn tolerates(toleration: &Toleration, taint: &Taint) -> bool {
        if let Some(effect) = toleration.effect.as_deref().filter(|e| !e.is_empty()) {
            if effect != taint.effect {
                return false;
            }
        }

        let operator = toleration.operator.as_deref().unwrap_or("Equal");
        match toleration.key.as_deref().filter(|k| !k.is_empty()) {
            // An empty key with Exists tolerates everything
            None => operator == "Exists",
            Some(key) if key != taint.key => false,
            Some(_) => match operator {
                "Exists" => true,
                _ => {
                    toleration.value.as_deref().unwrap_or_default()
                        == taint.value.as_deref().unwrap_or_default()
                }
            },
        }
    }
}

impl FilterPredicate for TaintToleration {
    fn filter(&self, pod: &Pod, node: &Node) -> Result<PredicateResult> {
        let Some(taints) = node.spec.as_ref().and_then(|s| s.taints.as_ref()) else {
            return Ok(PredicateResult::fit());
        };

        let tolerations: &[Toleration] = pod
            .spec
            .as_ref()
            .and_then(|s| s.tolerations.as_deref())
            .unwrap_or_default();

        let reasons: Vec<String> = taints
            .iter()
            .filter(|taint| BLOCKING_EFFECTS.iter().any(|e| *e == taint.effect))
            .filter(|taint| !tolerations.iter().any(|t| Self::tolerates(t, taint)))
            .map(|taint| {
                format!(
                    "Pod does not tolerate taint: {}={}:{}",
                    taint.key,
                    taint.value.as_deref().unwrap_or_default(),
                    taint.effect
                )
            })
            .collect();

        if reasons.is_empty() {
            Ok(PredicateResult::fit())
        } else {
            Ok(PredicateResult::unresolvable(reasons))
        }
    }

    fn name(&self) -> &str {
        "TaintToleration"
    }
}

/// Admit every node
pub struct AlwaysFit;

impl FilterPredicate for AlwaysFit {
    fn filter(&self, _pod: &Pod, _node: &Node) -> Result<PredicateResult> {
        Ok(PredicateResult::fit())
    }

    fn name(&self) -> &str {
        "AlwaysFit"
    }
}
