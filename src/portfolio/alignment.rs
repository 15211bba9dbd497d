use serde::Serialize;
use std::collections::HashMap;

use super::holdings::Holding;
use crate::scoring::{median, percentile, CompositeScore, EntityKey, SubScores, Tier};

/// Alignment score given to holdings without a matching PRISM score.
pub const UNSCORED_ALIGNMENT: f64 = 50.0;

/// Sub-score level above which a component is called out as a strength.
const STRENGTH_THRESHOLD: f64 = 65.0;
/// Behavior sub-score below which risk is called out.
const RISK_THRESHOLD: f64 = 45.0;

/// The parts of a composite score the portfolio view needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredPair {
    pub composite: f64,
    pub sub_scores: SubScores,
}

/// Scores looked up by (country, sector).
#[derive(Debug, Clone, Default)]
pub struct ScoreIndex {
    by_key: HashMap<EntityKey, ScoredPair>,
}

impl ScoreIndex {
    pub fn from_scores(scores: &[CompositeScore]) -> Self {
        scores
            .iter()
            .map(|s| {
                (
                    s.key.clone(),
                    ScoredPair {
                        composite: s.composite,
                        sub_scores: s.sub_scores,
                    },
                )
            })
            .collect()
    }

    pub fn get(&self, country: &str, sector: &str) -> Option<&ScoredPair> {
        self.by_key.get(&EntityKey::new(country, sector))
    }

    pub fn composites(&self) -> Vec<f64> {
        self.by_key.values().map(|p| p.composite).collect()
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

impl FromIterator<(EntityKey, ScoredPair)> for ScoreIndex {
    fn from_iter<I: IntoIterator<Item = (EntityKey, ScoredPair)>>(iter: I) -> Self {
        Self {
            by_key: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignmentRow {
    pub ticker: String,
    pub country: String,
    pub sector: String,
    pub amount: f64,
    pub prism_score: Option<f64>,
    pub alignment_score: f64,
    pub tier: Tier,
    pub justification: String,
}

pub fn align(holdings: &[Holding], index: &ScoreIndex) -> Vec<AlignmentRow> {
    holdings
        .iter()
        .map(|holding| {
            let scored = index.get(holding.country, holding.sector);
            let prism_score = scored.map(|s| s.composite);
            let tier = Tier::from_optional(prism_score);
            AlignmentRow {
                ticker: holding.ticker.to_string(),
                country: holding.country.to_string(),
                sector: holding.sector.to_string(),
                amount: holding.amount,
                prism_score,
                alignment_score: prism_score.unwrap_or(UNSCORED_ALIGNMENT),
                tier,
                justification: justification(holding, tier, scored),
            }
        })
        .collect()
}

/// A few sentences explaining where a holding sits against its PRISM score.
pub fn justification(holding: &Holding, tier: Tier, scored: Option<&ScoredPair>) -> String {
    let ticker = holding.ticker;
    let label = format!("{} ({} - {})", ticker, holding.country, holding.sector);

    let Some(scored) = scored else {
        return format!(
            "{} is a diversified ETF providing broad exposure to {} markets. \
             ETFs reduce single-stock risk and provide liquidity. \
             Recommended for portfolio diversification.",
            ticker, holding.country
        );
    };
    let score = scored.composite;
    let sub = &scored.sub_scores;

    match tier {
        Tier::Overweight => {
            let mut text = format!(
                "{} receives a strong PRISM score of {:.1}/100, placing it in the 'Overweight' category. ",
                label, score
            );
            if sub.structural >= STRENGTH_THRESHOLD {
                text.push_str(&format!(
                    "Structural factors (Porter's 5 Forces + Lifecycle) are favorable ({:.1}). ",
                    sub.structural
                ));
            }
            if sub.fundamentals >= STRENGTH_THRESHOLD {
                text.push_str(&format!(
                    "Firm fundamentals are strong ({:.1}) with solid ROE and margins. ",
                    sub.fundamentals
                ));
            }
            text.push_str("This allocation is well-supported by our top-down and quantitative analysis.");
            text
        }
        Tier::Neutral => format!(
            "{} has a moderate PRISM score of {:.1}/100, placing it in the 'Neutral' category. \
             While not a top-tier opportunity, this allocation provides diversification and balances risk exposure. \
             Consider monitoring for rebalancing opportunities.",
            label, score
        ),
        Tier::Underweight | Tier::NotScored => {
            let mut text = format!(
                "{} has a lower PRISM score of {:.1}/100, suggesting caution. ",
                label, score
            );
            if sub.behavior < RISK_THRESHOLD {
                text.push_str(
                    "Market behavior metrics (volatility, drawdown) indicate elevated risk. ",
                );
            }
            text.push_str(
                "This allocation may be justified by strategic diversification or contrarian positioning, \
                 but warrants close monitoring.",
            );
            text
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierAmount {
    pub tier: Tier,
    pub amount: f64,
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioSummary {
    pub holdings: usize,
    pub total_amount: f64,
    pub by_tier: Vec<TierAmount>,
    /// Over scored holdings only
    pub average_score: Option<f64>,
    pub median_score: Option<f64>,
}

pub fn summarize(rows: &[AlignmentRow]) -> PortfolioSummary {
    let total_amount: f64 = rows.iter().map(|r| r.amount).sum();
    let by_tier = Tier::ALL
        .iter()
        .map(|tier| {
            let amount: f64 = rows.iter().filter(|r| r.tier == *tier).map(|r| r.amount).sum();
            TierAmount {
                tier: *tier,
                amount,
                share: if total_amount > 0.0 {
                    amount / total_amount
                } else {
                    0.0
                },
            }
        })
        .collect();

    let scores: Vec<f64> = rows.iter().filter_map(|r| r.prism_score).collect();
    let average_score = if scores.is_empty() {
        None
    } else {
        Some(scores.iter().sum::<f64>() / scores.len() as f64)
    };

    PortfolioSummary {
        holdings: rows.len(),
        total_amount,
        by_tier,
        average_score,
        median_score: median(&scores),
    }
}

/// Sub-scores of every scorable holding, one row per holding.
/// Diversified ETFs and holdings without a score are left out.
pub fn backsolve_subjects(holdings: &[Holding], index: &ScoreIndex) -> Vec<SubScores> {
    holdings
        .iter()
        .filter(|h| !h.is_diversified())
        .filter_map(|h| index.get(h.country, h.sector).map(|s| s.sub_scores))
        .collect()
}

/// A fixed target wins; otherwise the given percentile of `all_scores`.
///
/// `all_scores` must be the full country-sector table. A run that scored only
/// part of it passes `None`, and without a fixed target there is no target.
pub fn backsolve_target(
    fixed: Option<f64>,
    all_scores: Option<&ScoreIndex>,
    target_percentile: f64,
) -> Option<f64> {
    fixed.or_else(|| all_scores.and_then(|index| percentile(&index.composites(), target_percentile)))
}
