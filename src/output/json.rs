use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::portfolio::{AlignmentRow, PortfolioSummary, ScoreIndex, ScoredPair};
use crate::scoring::{BacksolveResult, CompositeScore, EntityKey, MetricValues, SubScores};

/// One country-sector entry of `prism_sector_scores.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRow {
    pub country: String,
    pub country_name: String,
    pub sector: String,
    pub prism_score: f64,
    pub structural_score: f64,
    pub fundamentals_score: f64,
    pub behavior_score: f64,
    pub topdown_score: f64,
    pub num_firms: usize,
    #[serde(default)]
    pub top_firms: Vec<String>,
    #[serde(default)]
    pub metrics: MetricValues,
}

impl From<&CompositeScore> for ScoreRow {
    fn from(s: &CompositeScore) -> Self {
        Self {
            country: s.key.country.clone(),
            country_name: s.country_name.clone(),
            sector: s.key.sector.clone(),
            prism_score: s.composite,
            structural_score: s.sub_scores.structural,
            fundamentals_score: s.sub_scores.fundamentals,
            behavior_score: s.sub_scores.behavior,
            topdown_score: s.sub_scores.topdown,
            num_firms: s.num_firms,
            top_firms: s.top_firms.clone(),
            metrics: s.metrics.clone(),
        }
    }
}

impl ScoreRow {
    fn scored_pair(&self) -> ScoredPair {
        ScoredPair {
            composite: self.prism_score,
            sub_scores: SubScores {
                structural: self.structural_score,
                fundamentals: self.fundamentals_score,
                behavior: self.behavior_score,
                topdown: self.topdown_score,
            },
        }
    }
}

/// `{country: {sector: row}}`
pub type ScoresDocument = BTreeMap<String, BTreeMap<String, ScoreRow>>;

pub fn scores_json(scores: &[CompositeScore]) -> Result<String> {
    let mut doc = ScoresDocument::new();
    for s in scores {
        doc.entry(s.key.country.clone())
            .or_default()
            .insert(s.key.sector.clone(), ScoreRow::from(s));
    }
    serde_json::to_string_pretty(&doc).context("Failed to serialize scores")
}

/// Rows whose scores are not finite are skipped.
pub fn parse_scores_json(content: &str) -> Result<ScoreIndex> {
    let doc: ScoresDocument =
        serde_json::from_str(content).context("Failed to parse scores JSON")?;

    Ok(doc
        .into_iter()
        .flat_map(|(country, sectors)| {
            sectors.into_iter().map(move |(sector, row)| {
                (EntityKey::new(country.clone(), sector), row.scored_pair())
            })
        })
        .filter(|(_, pair)| {
            pair.composite.is_finite() && pair.sub_scores.as_array().iter().all(|s| s.is_finite())
        })
        .collect())
}

pub fn load_scores_json(path: &Path) -> Result<ScoreIndex> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read scores file at {}", path.display()))?;
    parse_scores_json(&content)
        .with_context(|| format!("Invalid scores file at {}", path.display()))
}

#[derive(Serialize)]
struct AlignmentDocument<'a> {
    summary: &'a PortfolioSummary,
    holdings: &'a [AlignmentRow],
}

pub fn alignment_json(rows: &[AlignmentRow], summary: &PortfolioSummary) -> Result<String> {
    serde_json::to_string_pretty(&AlignmentDocument {
        summary,
        holdings: rows,
    })
    .context("Failed to serialize allocation alignment")
}

pub fn backsolve_json(result: &BacksolveResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("Failed to serialize backsolve result")
}

#[derive(Serialize)]
struct BacksolveSkipped<'a> {
    skipped: bool,
    reason: &'a str,
}

/// Written in place of a result so an older one is not left behind.
pub fn backsolve_skipped_json(reason: &str) -> Result<String> {
    serde_json::to_string_pretty(&BacksolveSkipped {
        skipped: true,
        reason,
    })
    .context("Failed to serialize backsolve result")
}
