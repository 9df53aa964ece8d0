use crate::classifiers::tree::split_criteria::{FriedmanMse, SplitCriterion, SquaredError};
use crate::errors::PipelineError;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

fn default_learning_rate() -> f64 {
    0.1
}
fn default_n_estimators() -> usize {
    100
}
fn default_max_depth() -> usize {
    8
}
fn default_min_samples_split() -> usize {
    3
}
fn default_min_samples_leaf() -> usize {
    4
}
/// The tuned value as exported, one ulp above `0.35`.
fn default_subsample() -> f64 {
    0.35000000000000003
}
fn default_max_features() -> MaxFeatures {
    MaxFeatures::Fraction(0.1)
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Criterion {
    #[default]
    FriedmanMse,
    SquaredError,
}

impl Criterion {
    pub fn build(self) -> Box<dyn SplitCriterion> {
        match self {
            Criterion::FriedmanMse => Box::new(FriedmanMse::new()),
            Criterion::SquaredError => Box::new(SquaredError::new()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MaxFeaturesRule {
    Sqrt,
    Log2,
    All,
}

/// How many features each tree node looks at.
///
/// Integers are absolute counts, floats are fractions of the feature count
/// and strings select a rule (`"sqrt"`, `"log2"`, `"all"`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MaxFeatures {
    Count(usize),
    Fraction(f64),
    Rule(MaxFeaturesRule),
}

impl MaxFeatures {
    /// Number of features to examine per node, clamped to `1..=n_features`.
    pub fn resolve(&self, n_features: usize) -> usize {
        let n = n_features.max(1);
        let raw = match *self {
            MaxFeatures::Count(c) => c,
            MaxFeatures::Fraction(f) => (f * n as f64).floor() as usize,
            MaxFeatures::Rule(MaxFeaturesRule::Sqrt) => (n as f64).sqrt().floor() as usize,
            MaxFeatures::Rule(MaxFeaturesRule::Log2) => (n as f64).log2().floor() as usize,
            MaxFeatures::Rule(MaxFeaturesRule::All) => n,
        };
        raw.clamp(1, n)
    }

    fn validate(&self) -> Result<(), PipelineError> {
        match *self {
            MaxFeatures::Count(0) => Err(PipelineError::InvalidParameter {
                name: "max_features",
                reason: "count must be at least 1".into(),
            }),
            MaxFeatures::Fraction(f) if !(f > 0.0 && f <= 1.0) => {
                Err(PipelineError::InvalidParameter {
                    name: "max_features",
                    reason: format!("fraction must be in (0, 1], got {f}"),
                })
            }
            _ => Ok(()),
        }
    }
}

/// Hyperparameters of [`GradientBoostingClassifier`](super::GradientBoostingClassifier).
/// Defaults are the tuned values of the exported pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoostingParams {
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    #[serde(default = "default_n_estimators")]
    pub n_estimators: usize,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    #[serde(default = "default_min_samples_split")]
    pub min_samples_split: usize,
    #[serde(default = "default_min_samples_leaf")]
    pub min_samples_leaf: usize,
    #[serde(default = "default_max_features")]
    pub max_features: MaxFeatures,
    /// Fraction of rows drawn without replacement for each stage.
    #[serde(default = "default_subsample")]
    pub subsample: f64,
    #[serde(default)]
    pub criterion: Criterion,
    /// `None` seeds from OS entropy on every fit.
    #[serde(default)]
    pub random_state: Option<u64>,
}

impl Default for GradientBoostingParams {
    fn default() -> Self {
        Self {
            learning_rate: default_learning_rate(),
            n_estimators: default_n_estimators(),
            max_depth: default_max_depth(),
            min_samples_split: default_min_samples_split(),
            min_samples_leaf: default_min_samples_leaf(),
            max_features: default_max_features(),
            subsample: default_subsample(),
            criterion: Criterion::default(),
            random_state: None,
        }
    }
}

impl GradientBoostingParams {
    pub fn validate(&self) -> Result<(), PipelineError> {
        fn invalid(name: &'static str, reason: String) -> Result<(), PipelineError> {
            Err(PipelineError::InvalidParameter { name, reason })
        }

        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return invalid("learning_rate", format!("must be > 0, got {}", self.learning_rate));
        }
        if self.n_estimators == 0 {
            return invalid("n_estimators", "must be at least 1".into());
        }
        if self.max_depth == 0 {
            return invalid("max_depth", "must be at least 1".into());
        }
        if self.min_samples_split < 2 {
            return invalid(
                "min_samples_split",
                format!("must be at least 2, got {}", self.min_samples_split),
            );
        }
        if self.min_samples_leaf == 0 {
            return invalid("min_samples_leaf", "must be at least 1".into());
        }
        if !(self.subsample > 0.0 && self.subsample <= 1.0) {
            return invalid("subsample", format!("must be in (0, 1], got {}", self.subsample));
        }
        self.max_features.validate()
    }
}
