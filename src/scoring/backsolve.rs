use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashSet;

use super::error::BacksolveError;
use super::weights::{SubScores, WeightVector};

/// Grid resolution: each weight moves in steps of `max_perturbation / GRID_STEPS`.
pub const GRID_STEPS: i32 = 10;

pub const DEFAULT_MAX_PERTURBATION: f64 = 0.10;
pub const DEFAULT_TARGET_PERCENTILE: f64 = 0.70;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacksolveResult {
    pub adjustments_needed: bool,
    pub target_reached: bool,
    pub current_median: f64,
    pub achieved_median: f64,
    pub target_score: f64,
    pub gap: f64,
    pub suggested_weights: WeightVector,
    #[serde(skip)]
    pub evaluations: usize,
    pub message: String,
}

/// Median with the even-count rule (mean of the two middle values).
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Percentile `q` in [0, 1], linearly interpolated between closest ranks.
pub fn percentile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64))
}

fn median_under(subjects: &[SubScores], weights: &WeightVector) -> f64 {
    let composites: Vec<f64> = subjects.iter().map(|s| weights.composite(s)).collect();
    // subjects is never empty here
    median(&composites).unwrap_or(0.0)
}

/// Offsets are compared in whole units of this size, so equal moves reached
/// by different float sums count as one candidate.
const OFFSET_UNIT: f64 = 1e-9;

fn offset_key(delta: f64) -> i64 {
    (delta / OFFSET_UNIT).round() as i64
}

/// Allowed offsets for one weight: grid multiples of `step` that keep it
/// non-negative, plus the move to exactly zero when that falls between
/// grid points.
fn axis(base: f64, step: f64, max_perturbation: f64) -> Vec<f64> {
    let mut deltas: Vec<f64> = (-GRID_STEPS..=GRID_STEPS)
        .map(|k| k as f64 * step)
        .filter(|d| base + d >= -1e-12)
        .collect();
    let to_zero = -base;
    if base <= max_perturbation + 1e-12
        && !deltas.iter().any(|d| offset_key(*d) == offset_key(to_zero))
    {
        deltas.push(to_zero);
    }
    deltas.sort_by(f64::total_cmp);
    deltas
}

struct Candidate {
    offsets: [i64; 4],
    weights: WeightVector,
    median: f64,
    reached: bool,
}

impl Candidate {
    fn cost(&self) -> i64 {
        self.offsets.iter().map(|k| k.abs()).sum()
    }

    /// `Less` means `self` is preferred.
    fn preference(&self, other: &Candidate) -> Ordering {
        match (self.reached, other.reached) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (true, true) => self
                .cost()
                .cmp(&other.cost())
                .then_with(|| self.offsets.cmp(&other.offsets)),
            (false, false) => other
                .median
                .total_cmp(&self.median)
                .then_with(|| self.cost().cmp(&other.cost()))
                .then_with(|| self.offsets.cmp(&other.offsets)),
        }
    }
}

/// Search for component weights, each within `max_perturbation` of the
/// defaults, that lift the median composite of `subjects` to `target`.
///
/// The search is a deterministic grid; see [`GRID_STEPS`]. Three weights take
/// their grid offsets and the fourth balances the sum, in turn for each weight.
/// An unreachable target is not an error: the best candidate found is returned
/// with `target_reached = false`.
pub fn backsolve(
    subjects: &[SubScores],
    target: f64,
    default_weights: &WeightVector,
    max_perturbation: f64,
) -> Result<BacksolveResult, BacksolveError> {
    if subjects.is_empty() {
        return Err(BacksolveError::EmptyInput);
    }
    if !target.is_finite() {
        return Err(BacksolveError::InvalidInput(format!(
            "target must be finite, got {}",
            target
        )));
    }
    if !max_perturbation.is_finite() || max_perturbation < 0.0 {
        return Err(BacksolveError::InvalidInput(format!(
            "max_perturbation must be a non-negative number, got {}",
            max_perturbation
        )));
    }
    default_weights
        .validate()
        .map_err(|e| BacksolveError::InvalidInput(e.to_string()))?;

    let current_median = median_under(subjects, default_weights);
    let gap = target - current_median;

    if current_median >= target {
        return Ok(BacksolveResult {
            adjustments_needed: false,
            target_reached: true,
            current_median,
            achieved_median: current_median,
            target_score: target,
            gap,
            suggested_weights: *default_weights,
            evaluations: 0,
            message: "Allocations are well-aligned with PRISM rankings. No parameter adjustments needed."
                .to_string(),
        });
    }

    let step = max_perturbation / GRID_STEPS as f64;
    let base = default_weights.as_array();
    let axes: Vec<Vec<f64>> = base
        .iter()
        .map(|b| axis(*b, step, max_perturbation))
        .collect();
    let mut seen: HashSet<[i64; 4]> = HashSet::new();
    let mut best: Option<Candidate> = None;
    let mut evaluations = 0;

    for balance in 0..4 {
        let free: Vec<usize> = (0..4).filter(|i| *i != balance).collect();
        for &x in &axes[free[0]] {
            for &y in &axes[free[1]] {
                for &z in &axes[free[2]] {
                    let mut deltas = [0.0; 4];
                    deltas[free[0]] = x;
                    deltas[free[1]] = y;
                    deltas[free[2]] = z;
                    deltas[balance] = -(x + y + z);
                    if deltas[balance].abs() > max_perturbation + 1e-12
                        || base[balance] + deltas[balance] < -1e-12
                    {
                        continue;
                    }

                    let offsets = deltas.map(offset_key);
                    if !seen.insert(offsets) {
                        continue;
                    }

                    let mut w = [0.0; 4];
                    for i in 0..4 {
                        w[i] = (base[i] + deltas[i]).max(0.0);
                    }
                    let weights = WeightVector::from_array(w);
                    let median = median_under(subjects, &weights);
                    evaluations += 1;

                    let candidate = Candidate {
                        offsets,
                        weights,
                        median,
                        reached: median >= target,
                    };
                    let better = match best {
                        None => true,
                        Some(ref current) => candidate.preference(current) == Ordering::Less,
                    };
                    if better {
                        best = Some(candidate);
                    }
                }
            }
        }
    }

    // the zero-offset candidate is always feasible
    let best = best.ok_or_else(|| {
        BacksolveError::InvalidInput("no feasible weight candidate".to_string())
    })?;

    let message = if best.reached {
        format!(
            "Median PRISM score of allocated holdings is {:.1}, below the target of {:.1}. \
             Adjusting weights to {} lifts the median to {:.1}.",
            current_median,
            target,
            describe_changes(default_weights, &best.weights),
            best.median
        )
    } else {
        format!(
            "Target of {:.1} is not reachable within ±{:.2} per component. \
             Best achievable median is {:.1} (from {:.1}) with weights {}.",
            target,
            max_perturbation,
            best.median,
            current_median,
            describe_changes(default_weights, &best.weights)
        )
    };

    Ok(BacksolveResult {
        adjustments_needed: true,
        target_reached: best.reached,
        current_median,
        achieved_median: best.median,
        target_score: target,
        gap,
        suggested_weights: best.weights,
        evaluations,
        message,
    })
}

fn describe_changes(from: &WeightVector, to: &WeightVector) -> String {
    use super::model::Component;

    let changes: Vec<String> = Component::ALL
        .iter()
        .filter(|c| (from.get(**c) - to.get(**c)).abs() > 1e-9)
        .map(|c| format!("{} {:.1}% -> {:.1}%", c, from.get(*c) * 100.0, to.get(*c) * 100.0))
        .collect();
    if changes.is_empty() {
        "unchanged".to_string()
    } else {
        changes.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subs(structural: f64, fundamentals: f64, behavior: f64, topdown: f64) -> SubScores {
        SubScores {
            structural,
            fundamentals,
            behavior,
            topdown,
        }
    }

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn test_percentile_linear_interpolation() {
        let values = [10.0, 20.0, 30.0, 40.0, 50.0];
        assert_eq!(percentile(&values, 0.0), Some(10.0));
        assert_eq!(percentile(&values, 1.0), Some(50.0));
        // pos = 0.7 * 4 = 2.8 -> 30 + 0.8 * 10
        assert!((percentile(&values, 0.7).unwrap() - 38.0).abs() < 1e-9);
        assert_eq!(percentile(&[42.0], 0.7), Some(42.0));
        assert_eq!(percentile(&values, 1.5), None);
    }

    #[test]
    fn test_short_circuit_when_already_aligned() {
        let subjects = vec![subs(60.0, 60.0, 60.0, 60.0); 3];
        let result = backsolve(&subjects, 55.0, &WeightVector::default(), 0.05).unwrap();
        assert!(!result.adjustments_needed);
        assert!(result.target_reached);
        assert_eq!(result.suggested_weights, WeightVector::default());
        assert_eq!(result.evaluations, 0);
        assert!((result.current_median - 60.0).abs() < 1e-9);
        assert!((result.gap + 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_search_stays_within_bounds_and_reaches_target() {
        // composites under defaults: 49, 47, 45
        let subjects = vec![
            subs(40.0, 70.0, 40.0, 40.0),
            subs(38.0, 68.0, 38.0, 38.0),
            subs(36.0, 66.0, 36.0, 36.0),
        ];
        let defaults = WeightVector::default();
        let current = median_under(&subjects, &defaults);
        assert!((current - 47.0).abs() < 1e-9);

        let result = backsolve(&subjects, 49.5, &defaults, 0.10).unwrap();
        assert!(result.adjustments_needed);
        assert!(result.target_reached);
        assert!(result.achieved_median >= 49.5);
        assert!(result.evaluations > 0);
        assert!((result.suggested_weights.sum() - 1.0).abs() < 1e-6);
        for (new, old) in result
            .suggested_weights
            .as_array()
            .iter()
            .zip(defaults.as_array())
        {
            assert!((new - old).abs() <= 0.10 + 1e-9);
            assert!(*new >= 0.0);
        }
        // each 0.01 moved into fundamentals lifts every composite by 0.3
        assert!(result.suggested_weights.fundamentals > defaults.fundamentals);
    }

    #[test]
    fn test_search_median_48_target_55() {
        let subjects = vec![
            subs(30.0, 90.0, 30.0, 30.0),
            subs(31.0, 88.0, 31.0, 31.0),
            subs(29.0, 92.0, 29.0, 29.0),
        ];
        let defaults = WeightVector::default();
        // 0.70 * 30 + 0.30 * 90 = 48
        assert!((median_under(&subjects, &defaults) - 48.0).abs() < 1e-9);

        let result = backsolve(&subjects, 55.0, &defaults, 0.05).unwrap();
        assert!(result.adjustments_needed);
        for (new, old) in result
            .suggested_weights
            .as_array()
            .iter()
            .zip(defaults.as_array())
        {
            assert!((new - old).abs() <= 0.05 + 1e-9);
        }
        assert!((result.suggested_weights.sum() - 1.0).abs() < 1e-6);
        // +0.05 fundamentals at most: 48 + 0.05 * 60 = 51
        assert!(!result.target_reached);
        assert!((result.achieved_median - 51.0).abs() < 1e-6);
        assert!((result.gap - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_minimal_perturbation_chosen() {
        let subjects = vec![subs(30.0, 90.0, 30.0, 30.0)];
        let defaults = WeightVector::default();
        // one grid step (0.01) moved from structural to fundamentals gives +0.6
        let result = backsolve(&subjects, 48.5, &defaults, 0.10).unwrap();
        assert!(result.target_reached);
        let moved: f64 = result
            .suggested_weights
            .as_array()
            .iter()
            .zip(defaults.as_array())
            .map(|(n, o)| (n - o).abs())
            .sum();
        assert!((moved - 0.02).abs() < 1e-9);
        assert!((result.suggested_weights.fundamentals - 0.31).abs() < 1e-9);
    }

    #[test]
    fn test_weight_can_reach_zero_between_grid_points() {
        // topdown 0.15 with steps of 0.02: zero sits between grid points
        let subjects = vec![subs(50.0, 50.0, 50.0, 0.0)];
        let defaults = WeightVector::default();
        assert!((median_under(&subjects, &defaults) - 42.5).abs() < 1e-9);

        // the lowest on-grid topdown is 0.01, giving 49.5
        let result = backsolve(&subjects, 49.9, &defaults, 0.20).unwrap();
        assert!(result.target_reached);
        assert!(result.suggested_weights.topdown.abs() < 1e-9);
        assert!((result.achieved_median - 50.0).abs() < 1e-6);
        assert!((result.suggested_weights.sum() - 1.0).abs() < 1e-6);
        for (new, old) in result
            .suggested_weights
            .as_array()
            .iter()
            .zip(defaults.as_array())
        {
            assert!((new - old).abs() <= 0.20 + 1e-9);
            assert!(*new >= 0.0);
        }
    }

    #[test]
    fn test_axis_adds_zero_bound() {
        let deltas = axis(0.15, 0.02, 0.20);
        assert!(deltas.iter().any(|d| (d + 0.15).abs() < 1e-12));
        assert!(deltas.iter().all(|d| 0.15 + d >= -1e-12));
        // on-grid bound is not duplicated
        let deltas = axis(0.20, 0.02, 0.20);
        assert_eq!(deltas.len(), 21);
        assert_eq!(axis(0.35, 0.01, 0.10).len(), 21);
    }

    #[test]
    fn test_infeasible_target_is_not_an_error() {
        let subjects = vec![subs(50.0, 50.0, 50.0, 50.0), subs(40.0, 60.0, 45.0, 55.0)];
        let result = backsolve(&subjects, 95.0, &WeightVector::default(), 0.02).unwrap();
        assert!(result.adjustments_needed);
        assert!(!result.target_reached);
        assert!(result.achieved_median < 95.0);
        assert!(result.message.contains("not reachable"));
    }

    #[test]
    fn test_search_is_deterministic() {
        let subjects = vec![
            subs(20.0, 80.0, 60.0, 10.0),
            subs(25.0, 70.0, 65.0, 15.0),
            subs(35.0, 60.0, 55.0, 20.0),
            subs(30.0, 75.0, 50.0, 25.0),
        ];
        let a = backsolve(&subjects, 60.0, &WeightVector::default(), 0.10).unwrap();
        let b = backsolve(&subjects, 60.0, &WeightVector::default(), 0.10).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_input() {
        let err = backsolve(&[], 55.0, &WeightVector::default(), 0.05).unwrap_err();
        assert_eq!(err, BacksolveError::EmptyInput);
    }

    #[test]
    fn test_invalid_inputs() {
        let subjects = vec![subs(50.0, 50.0, 50.0, 50.0)];
        let w = WeightVector::default();
        assert!(matches!(
            backsolve(&subjects, f64::NAN, &w, 0.05),
            Err(BacksolveError::InvalidInput(_))
        ));
        assert!(matches!(
            backsolve(&subjects, 55.0, &w, -0.01),
            Err(BacksolveError::InvalidInput(_))
        ));
        assert!(matches!(
            backsolve(&subjects, 55.0, &WeightVector::from_array([0.4; 4]), 0.05),
            Err(BacksolveError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_result_json_shape() {
        let subjects = vec![subs(60.0, 60.0, 60.0, 60.0)];
        let result = backsolve(&subjects, 55.0, &WeightVector::default(), 0.05).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["adjustments_needed"], false);
        assert!(json["suggested_weights"]["topdown"].is_number());
        assert!(json.get("evaluations").is_none());
    }
}
