use k8s_openapi::api::core::v1::{Node, Pod};
use std::fmt;

/// Namespace assumed for pods that do not carry one
pub const DEFAULT_NAMESPACE: &str = "default";

/// PodRef identifies the pod a placement request is made for
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PodRef {
    /// Pod namespace
    pub namespace: String,
    /// Pod name
    pub name: String,
}

impl PodRef {
    /// Create a new PodRef
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Extract the identity of a pod, if it has a name
    pub fn from_pod(pod: &Pod) -> Option<Self> {
        let name = pod.metadata.name.as_deref().filter(|n| !n.is_empty())?;
        let namespace = pod
            .metadata
            .namespace
            .as_deref()
            .filter(|ns| !ns.is_empty())
            .unwrap_or(DEFAULT_NAMESPACE);

        Some(Self::new(namespace, name))
    }
}

impl fmt::Display for PodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Name of a node, if it carries a non-empty one
pub fn node_name(node: &Node) -> Option<&str> {
    node.metadata.name.as_deref().filter(|n| !n.is_empty())
}

/// Build a node object that carries nothing but its name.
///
/// Used when the orchestrator only sends node names.
pub fn named_node(name: impl Into<String>) -> Node {
    let mut node = Node::default();
    node.metadata.name = Some(name.into());
    node
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pod_ref_from_pod() {
        let mut pod = Pod::default();
        assert!(PodRef::from_pod(&pod).is_none());

        pod.metadata.name = Some("nginx".to_string());
        let pod_ref = PodRef::from_pod(&pod).unwrap();
        assert_eq!(pod_ref.to_string(), "default/nginx");

        pod.metadata.namespace = Some("web".to_string());
        let pod_ref = PodRef::from_pod(&pod).unwrap();
        assert_eq!(pod_ref, PodRef::new("web", "nginx"));
    }

    #[test]
    fn test_node_name() {
        let mut node = Node::default();
        assert!(node_name(&node).is_none());

        node.metadata.name = Some(String::new());
        assert!(node_name(&node).is_none());

        let node = named_node("node1");
        assert_eq!(node_name(&node), Some("node1"));
    }
}
