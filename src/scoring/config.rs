use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::error::ConfigError;
use super::model::{Component, ComponentSpec, Direction, Metric, NormalizationRange, ScoringModel};
use super::weights::WeightVector;

/// Scoring section of the config file.
///
/// Every field is optional; anything left out falls back to the built-in model.
///
/// Example YAML:
/// ```yaml
/// scoring:
///   weights:
///     structural: 0.35
///     fundamentals: 0.30
///     behavior: 0.20
///     topdown: 0.15
///   neutral_defaults:
///     fundamentals: 55
///   ranges:
///     beta: { low: 0.5, high: 2.0 }
///     debt_to_equity: { high: 250, direction: lower_is_better }
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScoringConfig {
    /// Component weights (default: 0.35 / 0.30 / 0.20 / 0.15)
    #[serde(default)]
    pub weights: Option<WeightVector>,

    /// Value substituted when a metric has no data, per component (default: 50)
    #[serde(default)]
    pub neutral_defaults: Option<NeutralDefaults>,

    /// Per-metric overrides of the normalization range and intra-component weight
    #[serde(default)]
    pub ranges: Option<BTreeMap<String, RangeOverride>>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct NeutralDefaults {
    #[serde(default)]
    pub structural: Option<f64>,
    #[serde(default)]
    pub fundamentals: Option<f64>,
    #[serde(default)]
    pub behavior: Option<f64>,
    #[serde(default)]
    pub topdown: Option<f64>,
}

impl NeutralDefaults {
    fn get(&self, component: Component) -> Option<f64> {
        match component {
            Component::Structural => self.structural,
            Component::Fundamentals => self.fundamentals,
            Component::Behavior => self.behavior,
            Component::TopDown => self.topdown,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RangeOverride {
    #[serde(default)]
    pub low: Option<f64>,
    #[serde(default)]
    pub high: Option<f64>,
    #[serde(default)]
    pub direction: Option<Direction>,
    #[serde(default)]
    pub weight: Option<f64>,
}

impl ScoringConfig {
    pub fn effective_weights(&self) -> WeightVector {
        self.weights.unwrap_or_default()
    }
}

impl ScoringModel {
    /// Apply config overrides on top of the default model.
    /// Returns every defect found, not just the first.
    pub fn from_config(config: &ScoringConfig) -> Result<Self, Vec<ConfigError>> {
        let mut errors = Vec::new();
        let defaults = ScoringModel::default();

        if let Some(ref ranges) = config.ranges {
            for name in ranges.keys() {
                if Metric::from_name(name).is_none() {
                    errors.push(ConfigError::UnknownMetric(name.clone()));
                }
            }
        }

        let components = Component::ALL.map(|component| {
            let base = defaults.component(component);
            let mut spec = ComponentSpec {
                component,
                metrics: Vec::with_capacity(base.metrics.len()),
                neutral_default: config
                    .neutral_defaults
                    .as_ref()
                    .and_then(|n| n.get(component))
                    .unwrap_or(base.neutral_default),
            };

            for metric_spec in &base.metrics {
                let mut metric_spec = *metric_spec;
                let name = metric_spec.metric.name();
                if let Some(o) = config.ranges.as_ref().and_then(|r| r.get(name)) {
                    let low = o.low.unwrap_or(metric_spec.range.low());
                    let high = o.high.unwrap_or(metric_spec.range.high());
                    let direction = o.direction.unwrap_or(metric_spec.range.direction());
                    match NormalizationRange::new(low, high, direction) {
                        Some(range) => metric_spec.range = range,
                        None => errors.push(ConfigError::InvalidRange {
                            metric: name.to_string(),
                            low,
                            high,
                        }),
                    }
                    if let Some(weight) = o.weight {
                        if weight.is_finite() && weight >= 0.0 {
                            metric_spec.weight = weight;
                        } else {
                            errors.push(ConfigError::NegativeMetricWeight {
                                metric: name.to_string(),
                                value: weight,
                            });
                        }
                    }
                }
                spec.metrics.push(metric_spec);
            }
            spec
        });

        match ScoringModel::new(components) {
            Ok(model) if errors.is_empty() => Ok(model),
            Ok(_) => Err(errors),
            Err(model_errors) => {
                errors.extend(model_errors);
                Err(errors)
            }
        }
    }
}
