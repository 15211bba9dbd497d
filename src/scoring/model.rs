use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::ConfigError;

/// The four components feeding the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    Structural,
    Fundamentals,
    Behavior,
    #[serde(rename = "topdown")]
    TopDown,
}

impl Component {
    pub const ALL: [Component; 4] = [
        Component::Structural,
        Component::Fundamentals,
        Component::Behavior,
        Component::TopDown,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Component::Structural => "structural",
            Component::Fundamentals => "fundamentals",
            Component::Behavior => "behavior",
            Component::TopDown => "topdown",
        }
    }

    /// Human-readable label used in reports
    pub fn label(&self) -> &'static str {
        match self {
            Component::Structural => "Structural",
            Component::Fundamentals => "Fundamentals",
            Component::Behavior => "Market Behavior",
            Component::TopDown => "Top-Down",
        }
    }

    fn index(&self) -> usize {
        match self {
            Component::Structural => 0,
            Component::Fundamentals => 1,
            Component::Behavior => 2,
            Component::TopDown => 3,
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Every raw metric the scorer knows about. Each belongs to exactly one component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    // Structural
    PorterForces,
    Lifecycle,
    // Fundamentals (firm level)
    FcfYield,
    ReturnOnEquity,
    ProfitMargin,
    GrossMargin,
    RevenueGrowth,
    DebtToEquity,
    // Behavior
    #[serde(rename = "return_12m")]
    Return12m,
    #[serde(rename = "return_6m")]
    Return6m,
    Volatility,
    MaxDrawdown,
    Beta,
    // Top-down
    GdpPerCapita,
    GdpScale,
    GdpGrowth,
    SwotNet,
}

impl Metric {
    pub const ALL: [Metric; 17] = [
        Metric::PorterForces,
        Metric::Lifecycle,
        Metric::FcfYield,
        Metric::ReturnOnEquity,
        Metric::ProfitMargin,
        Metric::GrossMargin,
        Metric::RevenueGrowth,
        Metric::DebtToEquity,
        Metric::Return12m,
        Metric::Return6m,
        Metric::Volatility,
        Metric::MaxDrawdown,
        Metric::Beta,
        Metric::GdpPerCapita,
        Metric::GdpScale,
        Metric::GdpGrowth,
        Metric::SwotNet,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Metric::PorterForces => "porter_forces",
            Metric::Lifecycle => "lifecycle",
            Metric::FcfYield => "fcf_yield",
            Metric::ReturnOnEquity => "return_on_equity",
            Metric::ProfitMargin => "profit_margin",
            Metric::GrossMargin => "gross_margin",
            Metric::RevenueGrowth => "revenue_growth",
            Metric::DebtToEquity => "debt_to_equity",
            Metric::Return12m => "return_12m",
            Metric::Return6m => "return_6m",
            Metric::Volatility => "volatility",
            Metric::MaxDrawdown => "max_drawdown",
            Metric::Beta => "beta",
            Metric::GdpPerCapita => "gdp_per_capita",
            Metric::GdpScale => "gdp_scale",
            Metric::GdpGrowth => "gdp_growth",
            Metric::SwotNet => "swot_net",
        }
    }

    pub fn from_name(name: &str) -> Option<Metric> {
        Metric::ALL.into_iter().find(|m| m.name() == name)
    }

    pub fn component(&self) -> Component {
        match self {
            Metric::PorterForces | Metric::Lifecycle => Component::Structural,
            Metric::FcfYield
            | Metric::ReturnOnEquity
            | Metric::ProfitMargin
            | Metric::GrossMargin
            | Metric::RevenueGrowth
            | Metric::DebtToEquity => Component::Fundamentals,
            Metric::Return12m
            | Metric::Return6m
            | Metric::Volatility
            | Metric::MaxDrawdown
            | Metric::Beta => Component::Behavior,
            Metric::GdpPerCapita | Metric::GdpScale | Metric::GdpGrowth | Metric::SwotNet => {
                Component::TopDown
            }
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    HigherIsBetter,
    LowerIsBetter,
}

/// Clamped min-max range for one metric.
///
/// Only constructible with finite bounds and `high > low`, so `normalize`
/// never divides by zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizationRange {
    low: f64,
    high: f64,
    direction: Direction,
}

impl NormalizationRange {
    pub fn new(low: f64, high: f64, direction: Direction) -> Option<Self> {
        if low.is_finite() && high.is_finite() && high > low {
            Some(Self {
                low,
                high,
                direction,
            })
        } else {
            None
        }
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Scale `value` into [0, 100], inverting for lower-is-better metrics.
    pub fn normalize(&self, value: f64) -> f64 {
        let scaled = ((value - self.low) / (self.high - self.low)).clamp(0.0, 1.0) * 100.0;
        match self.direction {
            Direction::HigherIsBetter => scaled,
            Direction::LowerIsBetter => 100.0 - scaled,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricSpec {
    pub metric: Metric,
    pub range: NormalizationRange,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComponentSpec {
    pub component: Component,
    pub metrics: Vec<MetricSpec>,
    pub neutral_default: f64,
}

impl ComponentSpec {
    pub fn weight_sum(&self) -> f64 {
        self.metrics.iter().map(|m| m.weight).sum()
    }
}

pub const DEFAULT_NEUTRAL: f64 = 50.0;

/// (metric, low, high, direction, intra-component weight)
const DEFAULT_TABLE: [(Metric, f64, f64, Direction, f64); 17] = [
    (Metric::PorterForces, 1.0, 5.0, Direction::HigherIsBetter, 0.70),
    (Metric::Lifecycle, 1.0, 5.0, Direction::HigherIsBetter, 0.30),
    (Metric::FcfYield, -5.0, 15.0, Direction::HigherIsBetter, 0.25),
    (Metric::ReturnOnEquity, -10.0, 40.0, Direction::HigherIsBetter, 0.25),
    (Metric::ProfitMargin, -10.0, 50.0, Direction::HigherIsBetter, 0.20),
    (Metric::GrossMargin, 0.0, 80.0, Direction::HigherIsBetter, 0.15),
    (Metric::RevenueGrowth, -20.0, 50.0, Direction::HigherIsBetter, 0.10),
    (Metric::DebtToEquity, 0.0, 300.0, Direction::LowerIsBetter, 0.05),
    (Metric::Return12m, -0.5, 1.0, Direction::HigherIsBetter, 0.25),
    (Metric::Return6m, -0.5, 1.0, Direction::HigherIsBetter, 0.25),
    (Metric::Volatility, 0.1, 1.0, Direction::LowerIsBetter, 0.20),
    (Metric::MaxDrawdown, 0.0, 0.6, Direction::LowerIsBetter, 0.20),
    (Metric::Beta, 0.5, 2.5, Direction::LowerIsBetter, 0.10),
    (Metric::GdpPerCapita, 1000.0, 100_000.0, Direction::HigherIsBetter, 0.40),
    (Metric::GdpScale, 100.0, 30_000.0, Direction::HigherIsBetter, 0.40),
    (Metric::GdpGrowth, -2.0, 8.0, Direction::HigherIsBetter, 0.15),
    (Metric::SwotNet, -8.0, 8.0, Direction::HigherIsBetter, 0.05),
];

/// Per-metric ranges and weights for all four components.
///
/// Built either from the default table or through [`ScoringModel::from_config`],
/// which validates every range and weight sum first.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringModel {
    components: [ComponentSpec; 4],
}

impl Default for ScoringModel {
    fn default() -> Self {
        let components = Component::ALL.map(|component| ComponentSpec {
            component,
            metrics: DEFAULT_TABLE
                .iter()
                .filter(|(metric, ..)| metric.component() == component)
                .map(|&(metric, low, high, direction, weight)| MetricSpec {
                    metric,
                    range: NormalizationRange {
                        low,
                        high,
                        direction,
                    },
                    weight,
                })
                .collect(),
            neutral_default: DEFAULT_NEUTRAL,
        });
        Self { components }
    }
}

impl ScoringModel {
    /// Build a model from already-constructed component specs, checking the
    /// intra-component weight sums and neutral defaults.
    pub fn new(components: [ComponentSpec; 4]) -> Result<Self, Vec<ConfigError>> {
        let mut errors = Vec::new();
        for spec in &components {
            let sum = spec.weight_sum();
            if !sum.is_finite() || (sum - 1.0).abs() > 1e-6 {
                errors.push(ConfigError::IntraWeightSum {
                    component: spec.component,
                    sum,
                });
            }
            if !(0.0..=100.0).contains(&spec.neutral_default) {
                errors.push(ConfigError::NeutralDefault {
                    component: spec.component,
                    value: spec.neutral_default,
                });
            }
        }
        if errors.is_empty() {
            Ok(Self { components })
        } else {
            Err(errors)
        }
    }

    pub fn component(&self, component: Component) -> &ComponentSpec {
        &self.components[component.index()]
    }

    pub fn components(&self) -> &[ComponentSpec] {
        &self.components
    }

    pub fn metric(&self, metric: Metric) -> Option<&MetricSpec> {
        self.component(metric.component())
            .metrics
            .iter()
            .find(|m| m.metric == metric)
    }
}
