//! Structural and top-down inputs: Porter's five forces, industry life cycle, SWOT.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LifecycleStage {
    Intro,
    Growth,
    Shakeout,
    #[default]
    Mature,
    Decline,
}

impl LifecycleStage {
    /// Position on the 1-5 attractiveness scale.
    pub fn value(&self) -> f64 {
        match self {
            LifecycleStage::Intro => 2.0,
            LifecycleStage::Growth => 4.0,
            LifecycleStage::Shakeout => 3.0,
            LifecycleStage::Mature => 3.5,
            LifecycleStage::Decline => 2.5,
        }
    }
}

/// Industry characteristics behind the Porter heuristics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StructuralInputs {
    /// R&D spend, % of revenue
    pub rd_intensity: f64,
    /// Herfindahl-Hirschman index, 0-10000
    pub hhi: f64,
    pub regulated: bool,
    pub stage: LifecycleStage,
}

impl Default for StructuralInputs {
    fn default() -> Self {
        Self {
            rd_intensity: 5.0,
            hhi: 2000.0,
            regulated: false,
            stage: LifecycleStage::Mature,
        }
    }
}

/// Each force on a 1-5 scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PorterForces {
    pub barriers: f64,
    pub substitutes: f64,
    pub supplier_power: f64,
    pub buyer_power: f64,
    pub rivalry: f64,
}

impl PorterForces {
    pub fn derive(sector: &str, inputs: &StructuralInputs) -> Self {
        let mut barriers: f64 = if inputs.rd_intensity > 10.0 {
            4.5
        } else if inputs.rd_intensity > 5.0 {
            3.5
        } else {
            2.5
        };
        if inputs.regulated {
            barriers += 0.5;
        }

        let substitutes = match sector {
            "Information Technology" | "Communication Services" => 4.0,
            "Utilities" | "Real Estate" => 2.0,
            _ => 3.0,
        };

        let buyer_power = match sector {
            "Consumer Discretionary" | "Consumer Staples" => 3.5,
            _ => 3.0,
        };

        // concentration on [0, 5000] mapped to [0, 5]
        let concentration = (inputs.hhi / 5000.0).clamp(0.0, 1.0) * 5.0;

        Self {
            barriers: barriers.min(5.0),
            substitutes,
            supplier_power: concentration.clamp(1.0, 5.0),
            buyer_power,
            rivalry: (5.0 - concentration).clamp(1.0, 5.0),
        }
    }

    pub fn average(&self) -> f64 {
        (self.barriers + self.substitutes + self.supplier_power + self.buyer_power + self.rivalry)
            / 5.0
    }
}

/// SWOT tallies on 1-5 scales.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Swot {
    pub strengths: f64,
    pub weaknesses: f64,
    pub opportunities: f64,
    pub threats: f64,
}

impl Default for Swot {
    fn default() -> Self {
        Self {
            strengths: 3.0,
            weaknesses: 3.0,
            opportunities: 3.0,
            threats: 3.0,
        }
    }
}

impl Swot {
    /// (S - W) + (O - T), in [-8, 8]
    pub fn net(&self) -> f64 {
        (self.strengths - self.weaknesses) + (self.opportunities - self.threats)
    }
}
