use crate::types::PredicateResult;
use crate::{Result, SchedulerError};
use lodestar_core::{Node, Pod};
use std::fmt;
use std::sync::Arc;

/// Filter predicate trait
///
/// A predicate sees one pod and one node at a time. Returning `Err` means the
/// predicate could not reach a verdict, which is different from `fits: false`.
pub trait FilterPredicate: Send + Sync {
    /// Decide whether the node can host the pod
    fn filter(&self, pod: &Pod, node: &Node) -> Result<PredicateResult>;

    /// Name of the predicate, unique within a registry
    fn name(&self) -> &str;
}

/// Ordered set of named predicates.
///
/// Built once at startup and read-only afterwards; clones share the
/// underlying predicates.
#[derive(Clone, Default)]
pub struct PredicateRegistry {
    predicates: Arc<[Arc<dyn FilterPredicate>]>,
}

impl PredicateRegistry {
    /// Start building a registry
    pub fn builder() -> PredicateRegistryBuilder {
        PredicateRegistryBuilder::default()
    }

    /// Registered predicates, in evaluation order
    pub fn iter(&self) -> impl Iterator<Item = &dyn FilterPredicate> {
        self.predicates.iter().map(|p| p.as_ref())
    }

    /// Names of the registered predicates, in evaluation order
    pub fn names(&self) -> Vec<&str> {
        self.iter().map(|p| p.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

impl fmt::Debug for PredicateRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Builder for [`PredicateRegistry`]
#[derive(Default)]
pub struct PredicateRegistryBuilder {
    predicates: Vec<Arc<dyn FilterPredicate>>,
}

impl PredicateRegistryBuilder {
    /// Append a predicate; its position is its evaluation order
    pub fn register(self, predicate: impl FilterPredicate + 'static) -> Result<Self> {
        self.register_arc(Arc::new(predicate))
    }

    /// Append an already shared predicate
    pub fn register_arc(mut self, predicate: Arc<dyn FilterPredicate>) -> Result<Self> {
        if self
            .predicates
            .iter()
            .any(|p| p.name() == predicate.name())
        {
            return Err(SchedulerError::duplicate_registration(
                "predicate",
                predicate.name(),
            ));
        }
        self.predicates.push(predicate);
        Ok(self)
    }

    /// Freeze the registry
    pub fn build(self) -> PredicateRegistry {
        PredicateRegistry {
            predicates: self.predicates.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str);

    impl FilterPredicate for Named {
        fn filter(&self, _pod: &Pod, _node: &Node) -> Result<PredicateResult> {
            Ok(PredicateResult::fit())
        }

        fn name(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn test_registry_keeps_order() {
        let registry = PredicateRegistry::builder()
            .register(Named("b"))
            .unwrap()
            .register(Named("a"))
            .unwrap()
            .build();

        assert_eq!(registry.names(), vec!["b", "a"]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let result = PredicateRegistry::builder()
            .register(Named("a"))
            .unwrap()
            .register(Named("a"));

        assert!(matches!(
            result,
            Err(SchedulerError::DuplicateRegistration { .. })
        ));
    }

    #[test]
    fn test_empty_registry() {
        let registry = PredicateRegistry::default();
        assert!(registry.is_empty());
        assert_eq!(format!("{:?}", registry), "[]");
    }
}
