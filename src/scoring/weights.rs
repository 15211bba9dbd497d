use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use super::model::Component;

const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Component weights for the composite score.
///
/// Invariant (checked by [`WeightVector::validate`]): every weight is finite and
/// non-negative, and the four sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WeightVector {
    pub structural: f64,
    pub fundamentals: f64,
    pub behavior: f64,
    pub topdown: f64,
}

impl Default for WeightVector {
    fn default() -> Self {
        Self {
            structural: 0.35,
            fundamentals: 0.30,
            behavior: 0.20,
            topdown: 0.15,
        }
    }
}

impl WeightVector {
    pub fn from_array(w: [f64; 4]) -> Self {
        Self {
            structural: w[0],
            fundamentals: w[1],
            behavior: w[2],
            topdown: w[3],
        }
    }

    /// Weights in component order: structural, fundamentals, behavior, topdown.
    pub fn as_array(&self) -> [f64; 4] {
        [self.structural, self.fundamentals, self.behavior, self.topdown]
    }

    pub fn get(&self, component: Component) -> f64 {
        match component {
            Component::Structural => self.structural,
            Component::Fundamentals => self.fundamentals,
            Component::Behavior => self.behavior,
            Component::TopDown => self.topdown,
        }
    }

    pub fn sum(&self) -> f64 {
        self.as_array().iter().sum()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for component in Component::ALL {
            let value = self.get(component);
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::NegativeWeight {
                    name: component.name(),
                    value,
                });
            }
        }
        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(ConfigError::WeightSum { sum });
        }
        Ok(())
    }

    /// Weighted sum of the four sub-scores.
    pub fn composite(&self, sub: &SubScores) -> f64 {
        self.structural * sub.structural
            + self.fundamentals * sub.fundamentals
            + self.behavior * sub.behavior
            + self.topdown * sub.topdown
    }
}

/// The four component scores, each in [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize, Serialize)]
pub struct SubScores {
    pub structural: f64,
    pub fundamentals: f64,
    pub behavior: f64,
    pub topdown: f64,
}

impl SubScores {
    pub fn get(&self, component: Component) -> f64 {
        match component {
            Component::Structural => self.structural,
            Component::Fundamentals => self.fundamentals,
            Component::Behavior => self.behavior,
            Component::TopDown => self.topdown,
        }
    }

    pub fn as_array(&self) -> [f64; 4] {
        [self.structural, self.fundamentals, self.behavior, self.topdown]
    }
}
