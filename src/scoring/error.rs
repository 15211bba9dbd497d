use thiserror::Error;

use super::model::Component;

/// A defect in the scoring configuration. These are caught once, when the
/// model is built, and never reach the scoring arithmetic.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("scoring.ranges.{metric}: high ({high}) must be greater than low ({low}) and both finite")]
    InvalidRange { metric: String, low: f64, high: f64 },

    #[error("scoring.ranges.{metric}.weight: must be a non-negative number, got {value}")]
    NegativeMetricWeight { metric: String, value: f64 },

    #[error("scoring.ranges: {component} metric weights sum to {sum:.6}, expected 1.0")]
    IntraWeightSum { component: Component, sum: f64 },

    #[error("scoring.weights.{name}: must be a non-negative number, got {value}")]
    NegativeWeight { name: &'static str, value: f64 },

    #[error("scoring.weights: weights sum to {sum:.6}, expected 1.0")]
    WeightSum { sum: f64 },

    #[error("scoring.neutral_defaults.{component}: {value} is outside [0, 100]")]
    NeutralDefault { component: Component, value: f64 },

    #[error("scoring.ranges: unknown metric '{0}'")]
    UnknownMetric(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BacksolveError {
    #[error("cannot backsolve over an empty score set")]
    EmptyInput,

    #[error("no fixed target set, and only part of the score table was scored")]
    NoTarget,

    #[error("invalid backsolve input: {0}")]
    InvalidInput(String),
}
