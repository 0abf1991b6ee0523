use crate::plugins::{predicate_by_name, priority_by_name};
use crate::predicate::PredicateRegistry;
use crate::priority::{Combiner, PriorityRegistry};
use crate::{Result, SchedulerError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

fn default_weight() -> i64 {
    1
}

/// One entry of the `predicates` list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PredicateSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub args: serde_json::Value,
}

impl PredicateSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: serde_json::Value::Null,
        }
    }
}

/// One entry of the `priorities` list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PrioritySpec {
    pub name: String,
    #[serde(default = "default_weight")]
    pub weight: i64,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub args: serde_json::Value,
}

impl PrioritySpec {
    pub fn new(name: impl Into<String>, weight: i64) -> Self {
        Self {
            name: name.into(),
            weight,
            args: serde_json::Value::Null,
        }
    }
}

/// Extender policy: which predicates run, in which order, and how nodes are
/// scored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Policy {
    #[serde(default)]
    pub combiner: Combiner,
    #[serde(default)]
    pub predicates: Vec<PredicateSpec>,
    #[serde(default)]
    pub priorities: Vec<PrioritySpec>,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            combiner: Combiner::WeightedSum,
            predicates: vec![
                PredicateSpec::new("PodFitsResources"),
                PredicateSpec::new("NodeSelectorMatch"),
                PredicateSpec::new("TaintToleration"),
            ],
            priorities: vec![
                PrioritySpec::new("LeastAllocated", 1),
                PrioritySpec::new("BalancedAllocation", 1),
            ],
        }
    }
}

impl Policy {
    /// Parse a policy document
    pub fn from_yaml(data: &str) -> Result<Self> {
        lodestar_core::from_yaml(data).map_err(|e| {
            SchedulerError::invalid_policy(
                e.to_string(),
                "Check the policy for typos; allowed keys are combiner, predicates and priorities",
            )
        })
    }

    /// Read and parse a policy file
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path).map_err(|e| {
            SchedulerError::invalid_policy(
                format!("cannot read policy file {}: {}", path.display(), e),
                "Pass an existing, readable file to --policy",
            )
        })?;
        info!("Loading extender policy from {}", path.display());
        Self::from_yaml(&data)
    }

    /// Render the policy as YAML
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| SchedulerError::internal_error(format!("cannot render policy: {}", e)))
    }

    /// Instantiate every plugin the policy names and freeze the registries.
    ///
    /// Unknown names, duplicates, bad weights and bad args are all errors.
    pub fn build(&self) -> Result<(PredicateRegistry, PriorityRegistry)> {
        let mut predicates = PredicateRegistry::builder();
        for spec in &self.predicates {
            predicates = predicates.register_arc(predicate_by_name(&spec.name, &spec.args)?)?;
        }

        let mut priorities = PriorityRegistry::builder().combiner(self.combiner);
        for spec in &self.priorities {
            priorities =
                priorities.register_arc(priority_by_name(&spec.name, &spec.args)?, spec.weight)?;
        }

        Ok((predicates.build(), priorities.build()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_policy_builds() {
        let (predicates, priorities) = Policy::default().build().unwrap();
        assert_eq!(
            predicates.names(),
            vec!["PodFitsResources", "NodeSelectorMatch", "TaintToleration"]
        );
        assert_eq!(priorities.len(), 2);
        assert_eq!(priorities.combiner(), Combiner::WeightedSum);
    }

    #[test]
    fn test_parse_policy() {
        let policy = Policy::from_yaml(
            r#"
combiner: average
predicates:
  - name: NodeSelectorMatch
  - name: AlwaysFit
priorities:
  - name: LeastAllocated
    weight: 2
  - name: Constant
    args:
      score: 5
"#,
        )
        .unwrap();

        assert_eq!(policy.combiner, Combiner::Average);
        assert_eq!(policy.predicates[1].name, "AlwaysFit");
        assert_eq!(policy.priorities[0].weight, 2);
        assert_eq!(policy.priorities[1].weight, 1);

        let (predicates, priorities) = policy.build().unwrap();
        assert_eq!(predicates.names(), vec!["NodeSelectorMatch", "AlwaysFit"]);
        assert_eq!(priorities.entries()[0].weight, 2);
    }

    #[test]
    fn test_duplicate_predicate_is_config_error() {
        let policy = Policy::from_yaml(
            "predicates:\n  - name: AlwaysFit\n  - name: AlwaysFit\n",
        )
        .unwrap();

        assert!(matches!(
            policy.build(),
            Err(SchedulerError::DuplicateRegistration { .. })
        ));
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(Policy::from_yaml("predicate:\n  - name: AlwaysFit\n").is_err());
        assert!(Policy::from_yaml("priorities:\n  - name: Constant\n    wieght: 2\n").is_err());
    }

    #[test]
    fn test_zero_weight_rejected() {
        let policy = Policy::from_yaml("priorities:\n  - name: LeastAllocated\n    weight: 0\n")
            .unwrap();
        assert!(matches!(
            policy.build(),
            Err(SchedulerError::InvalidPolicy { .. })
        ));
    }

    #[test]
    fn test_from_file_round_trip() {
        let mut file = NamedTempFile::new().unwrap();
        let yaml = Policy::default().to_yaml().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let loaded = Policy::from_file(file.path()).unwrap();
        assert_eq!(loaded, Policy::default());
    }

    #[test]
    fn test_missing_file() {
        let result = Policy::from_file(Path::new("/nonexistent/policy.yaml"));
        assert!(matches!(result, Err(SchedulerError::InvalidPolicy { .. })));
    }
}
