use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::model::{Component, ComponentSpec, Metric, MetricSpec, ScoringModel};
use super::weights::{SubScores, WeightVector};

/// A country-sector pair, e.g. `US / Information Technology`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityKey {
    pub country: String,
    pub sector: String,
}

impl EntityKey {
    pub fn new(country: impl Into<String>, sector: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            sector: sector.into(),
        }
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.country, self.sector)
    }
}

/// Raw metric values. A metric that is missing (or non-finite) means "no data".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricValues(BTreeMap<Metric, f64>);

impl MetricValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value; non-finite values clear the slot instead.
    pub fn insert(&mut self, metric: Metric, value: f64) {
        if value.is_finite() {
            self.0.insert(metric, value);
        } else {
            self.0.remove(&metric);
        }
    }

    pub fn set(&mut self, metric: Metric, value: Option<f64>) {
        match value {
            Some(v) => self.insert(metric, v),
            None => {
                self.0.remove(&metric);
            }
        }
    }

    pub fn get(&self, metric: Metric) -> Option<f64> {
        self.0.get(&metric).copied().filter(|v| v.is_finite())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Metric, f64)> + '_ {
        self.0
            .iter()
            .filter(|(_, v)| v.is_finite())
            .map(|(m, v)| (*m, *v))
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Merge `other` into self, overwriting on conflict.
    pub fn extend(&mut self, other: &MetricValues) {
        for (metric, value) in other.iter() {
            self.insert(metric, value);
        }
    }
}

impl FromIterator<(Metric, f64)> for MetricValues {
    fn from_iter<I: IntoIterator<Item = (Metric, f64)>>(iter: I) -> Self {
        let mut values = MetricValues::new();
        for (metric, value) in iter {
            values.insert(metric, value);
        }
        values
    }
}

/// Fundamentals for one constituent firm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirmMetrics {
    pub ticker: String,
    pub market_cap: Option<f64>,
    pub values: MetricValues,
}

/// Everything the scorer needs for one country-sector pair.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRecord {
    pub key: EntityKey,
    pub country_name: String,
    /// Structural, behavior and top-down metrics
    pub values: MetricValues,
    /// Firms feeding the fundamentals component
    pub firms: Vec<FirmMetrics>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeScore {
    pub key: EntityKey,
    pub country_name: String,
    pub sub_scores: SubScores,
    pub composite: f64,
    pub num_firms: usize,
    pub top_firms: Vec<String>,
    /// Raw entity-level metrics, kept for transparency in reports
    pub metrics: MetricValues,
}

/// Normalized value of one metric, or `neutral` when the metric has no data.
pub fn resolve_metric_or_default(values: &MetricValues, spec: &MetricSpec, neutral: f64) -> f64 {
    match values.get(spec.metric) {
        Some(value) => spec.range.normalize(value),
        None => neutral,
    }
}

/// Weighted average of the resolved metrics of one component.
/// With no data at all this is exactly the neutral default.
pub fn component_score(values: &MetricValues, spec: &ComponentSpec) -> f64 {
    if spec.metrics.iter().all(|m| values.get(m.metric).is_none()) {
        return spec.neutral_default;
    }
    spec.metrics
        .iter()
        .map(|m| m.weight * resolve_metric_or_default(values, m, spec.neutral_default))
        .sum()
}

/// Market-cap weighted mean of firm scores.
///
/// Firms without a positive market cap carry no weight; if none has one, all
/// firms count equally. No firms at all gives the neutral default.
pub fn fundamentals_score(firms: &[FirmMetrics], spec: &ComponentSpec) -> f64 {
    if firms.is_empty() {
        return spec.neutral_default;
    }

    let scored: Vec<(f64, Option<f64>)> = firms
        .iter()
        .map(|firm| {
            let cap = firm.market_cap.filter(|c| c.is_finite() && *c > 0.0);
            (component_score(&firm.values, spec), cap)
        })
        .collect();

    let total_cap: f64 = scored.iter().filter_map(|(_, cap)| *cap).sum();
    if total_cap > 0.0 {
        scored
            .iter()
            .filter_map(|(score, cap)| cap.map(|c| score * c / total_cap))
            .sum()
    } else {
        scored.iter().map(|(score, _)| score).sum::<f64>() / scored.len() as f64
    }
}

/// Score one country-sector pair.
///
/// `model` and `weights` are expected to have been validated; every range then
/// has `high > low`, so the result is always finite.
pub fn score(record: &MetricRecord, model: &ScoringModel, weights: &WeightVector) -> CompositeScore {
    let sub = |component: Component| {
        let spec = model.component(component);
        match component {
            Component::Fundamentals => fundamentals_score(&record.firms, spec),
            _ => component_score(&record.values, spec),
        }
    };

    let sub_scores = SubScores {
        structural: sub(Component::Structural),
        fundamentals: sub(Component::Fundamentals),
        behavior: sub(Component::Behavior),
        topdown: sub(Component::TopDown),
    };

    CompositeScore {
        key: record.key.clone(),
        country_name: record.country_name.clone(),
        composite: weights.composite(&sub_scores),
        sub_scores,
        num_firms: record.firms.len(),
        top_firms: record.firms.iter().map(|f| f.ticker.clone()).collect(),
        metrics: record.values.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(values: MetricValues, firms: Vec<FirmMetrics>) -> MetricRecord {
        MetricRecord {
            key: EntityKey::new("US", "Information Technology"),
            country_name: "United States".to_string(),
            values,
            firms,
        }
    }

    fn firm(ticker: &str, market_cap: Option<f64>, values: &[(Metric, f64)]) -> FirmMetrics {
        FirmMetrics {
            ticker: ticker.to_string(),
            market_cap,
            values: values.iter().copied().collect(),
        }
    }

    #[test]
    fn test_metric_values_drop_non_finite() {
        let mut values = MetricValues::new();
        values.insert(Metric::Beta, 1.2);
        values.insert(Metric::Volatility, f64::NAN);
        values.insert(Metric::Beta, f64::INFINITY);
        assert!(values.is_empty());
        assert_eq!(values.get(Metric::Volatility), None);
    }

    #[test]
    fn test_empty_record_is_neutral_everywhere() {
        let model = ScoringModel::default();
        let result = score(
            &record(MetricValues::new(), vec![]),
            &model,
            &WeightVector::default(),
        );
        assert_eq!(result.sub_scores.as_array(), [50.0; 4]);
        assert_eq!(result.composite, 50.0);
        assert_eq!(result.num_firms, 0);
    }

    #[test]
    fn test_absent_component_equals_custom_neutral() {
        let mut components: Vec<ComponentSpec> = ScoringModel::default().components().to_vec();
        components[2].neutral_default = 37.5;
        let model = ScoringModel::new([
            components[0].clone(),
            components[1].clone(),
            components[2].clone(),
            components[3].clone(),
        ])
        .unwrap();
        let values: MetricValues = [(Metric::PorterForces, 3.0)].into_iter().collect();
        let result = score(&record(values, vec![]), &model, &WeightVector::default());
        assert_eq!(result.sub_scores.behavior, 37.5);
    }

    #[test]
    fn test_partial_component_fills_gaps_with_neutral() {
        let model = ScoringModel::default();
        // porter 5.0 -> 100, lifecycle missing -> 50
        let values: MetricValues = [(Metric::PorterForces, 5.0)].into_iter().collect();
        let result = score(&record(values, vec![]), &model, &WeightVector::default());
        assert!((result.sub_scores.structural - (0.7 * 100.0 + 0.3 * 50.0)).abs() < 1e-9);
    }

    #[test]
    fn test_structural_from_porter_and_lifecycle() {
        let model = ScoringModel::default();
        // porter 3.0 -> 50, lifecycle Growth 4.0 -> 75
        let values: MetricValues = [(Metric::PorterForces, 3.0), (Metric::Lifecycle, 4.0)]
            .into_iter()
            .collect();
        let s = component_score(&values, model.component(Component::Structural));
        assert!((s - (0.7 * 50.0 + 0.3 * 75.0)).abs() < 1e-9);
    }

    #[test]
    fn test_fundamentals_market_cap_weighting() {
        let model = ScoringModel::default();
        let spec = model.component(Component::Fundamentals);
        let all_best = [
            (Metric::FcfYield, 15.0),
            (Metric::ReturnOnEquity, 40.0),
            (Metric::ProfitMargin, 50.0),
            (Metric::GrossMargin, 80.0),
            (Metric::RevenueGrowth, 50.0),
            (Metric::DebtToEquity, 0.0),
        ];
        let all_worst = [
            (Metric::FcfYield, -5.0),
            (Metric::ReturnOnEquity, -10.0),
            (Metric::ProfitMargin, -10.0),
            (Metric::GrossMargin, 0.0),
            (Metric::RevenueGrowth, -20.0),
            (Metric::DebtToEquity, 300.0),
        ];
        let firms = vec![
            firm("BIG", Some(300.0), &all_best),
            firm("SMALL", Some(100.0), &all_worst),
            // no market cap: no weight
            firm("NOCAP", None, &all_worst),
        ];
        // (100 * 300 + 0 * 100) / 400
        let s = fundamentals_score(&firms, spec);
        assert!((s - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_fundamentals_equal_weight_without_caps() {
        let model = ScoringModel::default();
        let spec = model.component(Component::Fundamentals);
        let firms = vec![
            firm("A", None, &[(Metric::ReturnOnEquity, 40.0)]),
            firm("B", Some(0.0), &[]),
        ];
        // A: 0.25 * 100 + 0.75 * 50 = 62.5, B: 50
        let s = fundamentals_score(&firms, spec);
        assert!((s - 56.25).abs() < 1e-9);
    }

    #[test]
    fn test_composite_uses_given_weights() {
        let model = ScoringModel::default();
        let values: MetricValues = [(Metric::PorterForces, 5.0), (Metric::Lifecycle, 5.0)]
            .into_iter()
            .collect();
        let weights = WeightVector::from_array([1.0, 0.0, 0.0, 0.0]);
        let result = score(&record(values, vec![]), &model, &weights);
        assert_eq!(result.composite, 100.0);
    }

    #[test]
    fn test_score_is_always_bounded() {
        let model = ScoringModel::default();
        let values: MetricValues = Metric::ALL
            .iter()
            .map(|m| (*m, if m.name().len() % 2 == 0 { 1e12 } else { -1e12 }))
            .collect();
        let firms = vec![firm("X", Some(1.0), &[(Metric::DebtToEquity, -1e9)])];
        let result = score(&record(values, firms), &model, &WeightVector::default());
        for s in result.sub_scores.as_array() {
            assert!((0.0..=100.0).contains(&s));
        }
        assert!((0.0..=100.0).contains(&result.composite));
        assert_eq!(result.top_firms, vec!["X".to_string()]);
    }
}
