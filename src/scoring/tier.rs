use serde::{Deserialize, Serialize};
use std::fmt;

pub const OVERWEIGHT_THRESHOLD: f64 = 70.0;
pub const NEUTRAL_THRESHOLD: f64 = 55.0;

/// Recommendation bucket for a holding. Boundary values belong to the higher tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    Overweight,
    Neutral,
    Underweight,
    #[serde(rename = "Not Scored")]
    NotScored,
}

impl Tier {
    /// Order used when grouping report sections.
    pub const ALL: [Tier; 4] = [Tier::Overweight, Tier::Neutral, Tier::Underweight, Tier::NotScored];

    pub fn from_score(score: f64) -> Tier {
        if score >= OVERWEIGHT_THRESHOLD {
            Tier::Overweight
        } else if score >= NEUTRAL_THRESHOLD {
            Tier::Neutral
        } else {
            Tier::Underweight
        }
    }

    pub fn from_optional(score: Option<f64>) -> Tier {
        score.map(Tier::from_score).unwrap_or(Tier::NotScored)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tier::Overweight => "Overweight",
            Tier::Neutral => "Neutral",
            Tier::Underweight => "Underweight",
            Tier::NotScored => "Not Scored",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
