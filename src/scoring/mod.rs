pub mod backsolve;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod tier;
pub mod validation;
pub mod weights;

pub use backsolve::{backsolve, median, percentile, BacksolveResult};
pub use config::*;
pub use engine::{
    resolve_metric_or_default, score, CompositeScore, EntityKey, FirmMetrics, MetricRecord,
    MetricValues,
};
pub use error::{BacksolveError, ConfigError};
pub use model::{Component, Direction, Metric, NormalizationRange, ScoringModel};
pub use tier::Tier;
pub use validation::validate_scoring;
pub use weights::{SubScores, WeightVector};
