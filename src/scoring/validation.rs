use super::config::ScoringConfig;
use super::model::ScoringModel;

/// Validate scoring configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_scoring(config: &ScoringConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    // Component weights
    if let Some(ref weights) = config.weights {
        if let Err(e) = weights.validate() {
            errors.push(e.to_string());
        }
    }

    // Ranges, intra-component sums, neutral defaults
    if let Err(model_errors) = ScoringModel::from_config(config) {
        errors.extend(model_errors.iter().map(|e| e.to_string()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{NeutralDefaults, RangeOverride, WeightVector};
    use std::collections::BTreeMap;

    #[test]
    fn test_valid_config() {
        let config = ScoringConfig {
            weights: Some(WeightVector::from_array([0.25, 0.25, 0.25, 0.25])),
            neutral_defaults: Some(NeutralDefaults {
                fundamentals: Some(55.0),
                ..Default::default()
            }),
            ranges: None,
        };
        assert!(validate_scoring(&config).is_ok());
    }

    #[test]
    fn test_empty_config_valid() {
        assert!(validate_scoring(&ScoringConfig::default()).is_ok());
    }

    #[test]
    fn test_bad_weight_sum() {
        let config = ScoringConfig {
            weights: Some(WeightVector::from_array([0.4, 0.4, 0.4, 0.4])),
            ..Default::default()
        };
        let errors = validate_scoring(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("scoring.weights"));
        assert!(errors[0].contains("1.6"));
    }

    #[test]
    fn test_multiple_errors_collected() {
        let mut ranges = BTreeMap::new();
        ranges.insert(
            "beta".to_string(),
            RangeOverride {
                low: Some(3.0),
                high: Some(1.0),
                ..Default::default()
            },
        );
        ranges.insert("pe_ratio".to_string(), RangeOverride::default());
        let config = ScoringConfig {
            weights: Some(WeightVector::from_array([0.5, 0.5, 0.5, -0.5])),
            neutral_defaults: Some(NeutralDefaults {
                behavior: Some(-1.0),
                ..Default::default()
            }),
            ranges: Some(ranges),
        };
        let errors = validate_scoring(&config).unwrap_err();
        // negative weight, unknown metric, inverted range, neutral default
        assert_eq!(errors.len(), 4, "{errors:?}");
        assert!(errors.iter().any(|e| e.contains("scoring.weights.topdown")));
        assert!(errors.iter().any(|e| e.contains("unknown metric 'pe_ratio'")));
        assert!(errors.iter().any(|e| e.contains("scoring.ranges.beta")));
        assert!(errors.iter().any(|e| e.contains("scoring.neutral_defaults.behavior")));
    }
}
