use crate::{Result, SchedulerError};
use lodestar_core::{Node, Pod, MAX_EXTENDER_PRIORITY};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Scoring function trait
pub trait ScoreFunction: Send + Sync {
    /// Score a node for the given pod, in [0, MAX_EXTENDER_PRIORITY]
    fn score(&self, pod: &Pod, node: &Node) -> Result<i64>;

    /// Name of the scoring function, unique within a registry
    fn name(&self) -> &str;
}

/// How per-function scores fold into one node score
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Combiner {
    /// Sum of weight * score, clamped to the score range
    #[default]
    WeightedSum,
    /// Largest weight * score, clamped to the score range
    Max,
    /// Weighted mean of the scores
    Average,
}

impl Combiner {
    /// Combine `(weight, score)` pairs of the functions that succeeded.
    ///
    /// Scores are expected to be clamped already. No input yields 0.
    pub fn combine(&self, scores: &[(i64, i64)]) -> i64 {
        if scores.is_empty() {
            return 0;
        }

        let combined = match self {
            Combiner::WeightedSum => scores
                .iter()
                .fold(0i64, |acc, (w, s)| acc.saturating_add(w.saturating_mul(*s))),
            Combiner::Max => scores
                .iter()
                .map(|(w, s)| w.saturating_mul(*s))
                .max()
                .unwrap_or(0),
            Combiner::Average => {
                // Exact in i128; weights near i64::MAX must not wrap
                let total_weight: i128 = scores.iter().map(|(w, _)| i128::from(*w)).sum();
                if total_weight == 0 {
                    0
                } else {
                    let total: i128 = scores
                        .iter()
                        .map(|(w, s)| i128::from(*w) * i128::from(*s))
                        .sum();
                    (total / total_weight)
                        .clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
                }
            }
        };

        clamp_score(combined)
    }
}

impl fmt::Display for Combiner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Combiner::WeightedSum => write!(f, "weightedSum"),
            Combiner::Max => write!(f, "max"),
            Combiner::Average => write!(f, "average"),
        }
    }
}

/// Clamp a score into [0, MAX_EXTENDER_PRIORITY]
pub fn clamp_score(score: i64) -> i64 {
    score.clamp(0, MAX_EXTENDER_PRIORITY)
}

/// A registered scoring function and its weight
#[derive(Clone)]
pub struct PriorityEntry {
    pub function: Arc<dyn ScoreFunction>,
    pub weight: i64,
}

/// Named set of weighted scoring functions plus the rule that combines them.
///
/// Built once at startup and read-only afterwards.
#[derive(Clone, Default)]
pub struct PriorityRegistry {
    entries: Arc<[PriorityEntry]>,
    combiner: Combiner,
}

impl PriorityRegistry {
    /// Start building a registry
    pub fn builder() -> PriorityRegistryBuilder {
        PriorityRegistryBuilder::default()
    }

    /// Registered functions, in registration order
    pub fn entries(&self) -> &[PriorityEntry] {
        &self.entries
    }

    /// Combination rule
    pub fn combiner(&self) -> Combiner {
        self.combiner
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for PriorityRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PriorityRegistry")
            .field("combiner", &self.combiner)
            .field(
                "functions",
                &self
                    .entries
                    .iter()
                    .map(|e| (e.function.name(), e.weight))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Builder for [`PriorityRegistry`]
#[derive(Default)]
pub struct PriorityRegistryBuilder {
    entries: Vec<PriorityEntry>,
    combiner: Combiner,
}

impl PriorityRegistryBuilder {
    /// Set the combination rule (weighted sum by default)
    pub fn combiner(mut self, combiner: Combiner) -> Self {
        self.combiner = combiner;
        self
    }

    /// Register a scoring function with the given weight
    pub fn register(self, function: impl ScoreFunction + 'static, weight: i64) -> Result<Self> {
        self.register_arc(Arc::new(function), weight)
    }

    /// Register an already shared scoring function
    pub fn register_arc(mut self, function: Arc<dyn ScoreFunction>, weight: i64) -> Result<Self> {
        if weight < 1 {
            return Err(SchedulerError::invalid_policy(
                format!(
                    "priority function {} has weight {}",
                    function.name(),
                    weight
                ),
                "Weights must be positive integers",
            ));
        }
        if self
            .entries
            .iter()
            .any(|e| e.function.name() == function.name())
        {
            return Err(SchedulerError::duplicate_registration(
                "priority function",
                function.name(),
            ));
        }
        self.entries.push(PriorityEntry { function, weight });
        Ok(self)
    }

    /// Freeze the registry
    pub fn build(self) -> PriorityRegistry {
        PriorityRegistry {
            entries: self.entries.into(),
            combiner: self.combiner,
        }
    }
}
