use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use chrono::NaiveDateTime;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::{csv, json, markdown};
use crate::portfolio::{AlignmentRow, PortfolioSummary};
use crate::scoring::{BacksolveResult, CompositeScore, ScoringModel, WeightVector};

pub const SCORES_CSV: &str = "prism_country_sector_scores.csv";
pub const SCORES_JSON: &str = "prism_sector_scores.json";
pub const ALIGNMENT_CSV: &str = "allocation_alignment.csv";
pub const ALIGNMENT_JSON: &str = "allocation_alignment.json";
pub const JUSTIFICATION_REPORT: &str = "justification_report.md";
pub const METHODOLOGY: &str = "methodology.md";
pub const BACKSOLVE_JSON: &str = "backsolve_changes.json";

/// Everything one run writes to disk.
pub struct Report<'a> {
    pub scores: &'a [CompositeScore],
    pub alignment: &'a [AlignmentRow],
    pub summary: &'a PortfolioSummary,
    /// The result, or why the backsolve was skipped
    pub backsolve: Result<&'a BacksolveResult, String>,
    pub model: &'a ScoringModel,
    pub weights: &'a WeightVector,
    pub generated: NaiveDateTime,
}

/// Write `contents` to `path` atomically; readers never see a partial file.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
    file.write_all(contents.as_bytes())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    file.commit()
        .with_context(|| format!("Failed to save {}", path.display()))?;
    Ok(())
}

/// Write all report files into `dir`, creating it if needed.
/// Returns the paths written, in a stable order.
pub fn write_reports(dir: &Path, report: &Report) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let backsolve = match &report.backsolve {
        Ok(result) => json::backsolve_json(result)?,
        Err(reason) => json::backsolve_skipped_json(reason)?,
    };

    let files = vec![
        (SCORES_CSV, csv::scores_csv(report.scores)),
        (SCORES_JSON, json::scores_json(report.scores)?),
        (ALIGNMENT_CSV, csv::alignment_csv(report.alignment)),
        (
            ALIGNMENT_JSON,
            json::alignment_json(report.alignment, report.summary)?,
        ),
        (
            JUSTIFICATION_REPORT,
            markdown::justification_report(
                report.alignment,
                report.summary,
                report.scores,
                report.weights,
                report.generated,
            ),
        ),
        (
            METHODOLOGY,
            markdown::methodology(report.model, report.weights, report.generated),
        ),
        (BACKSOLVE_JSON, backsolve),
    ];

    let mut written = Vec::with_capacity(files.len());
    for (name, contents) in files {
        let path = dir.join(name);
        write_atomic(&path, &contents)?;
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::{align, summarize, ScoreIndex, HOLDINGS};
    use crate::scoring::backsolve;
    use chrono::NaiveDate;
    use std::env;

    #[test]
    fn test_write_atomic_replaces_contents() {
        let path = env::temp_dir().join(format!("prism_test_atomic_{}.txt", std::process::id()));
        write_atomic(&path, "first").unwrap();
        write_atomic(&path, "second").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_write_reports_all_files() {
        let dir = env::temp_dir().join(format!("prism_test_reports_{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);

        let model = ScoringModel::default();
        let weights = WeightVector::default();
        let scores: Vec<CompositeScore> = Vec::new();
        let index = ScoreIndex::from_scores(&scores);
        let alignment = align(&HOLDINGS, &index);
        let summary = summarize(&alignment);
        let result = backsolve(
            &[crate::scoring::SubScores {
                structural: 60.0,
                fundamentals: 60.0,
                behavior: 60.0,
                topdown: 60.0,
            }],
            55.0,
            &weights,
            0.1,
        )
        .unwrap();

        let report = Report {
            scores: &scores,
            alignment: &alignment,
            summary: &summary,
            backsolve: Ok(&result),
            model: &model,
            weights: &weights,
            generated: NaiveDate::from_ymd_opt(2024, 1, 2)
                .unwrap()
                .and_hms_opt(3, 4, 5)
                .unwrap(),
        };
        let written = write_reports(&dir, &report).unwrap();
        assert_eq!(written.len(), 7);
        for path in &written {
            assert!(path.exists(), "{}", path.display());
        }
        let csv = fs::read_to_string(dir.join(ALIGNMENT_CSV)).unwrap();
        assert_eq!(csv.lines().count(), HOLDINGS.len() + 1);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_skipped_backsolve_replaces_old_result() {
        let dir = env::temp_dir().join(format!("prism_test_skipped_{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(BACKSOLVE_JSON), "{\"adjustments_needed\": true}").unwrap();

        let model = ScoringModel::default();
        let weights = WeightVector::default();
        let scores: Vec<CompositeScore> = Vec::new();
        let alignment = align(&HOLDINGS, &ScoreIndex::from_scores(&scores));
        let summary = summarize(&alignment);
        let report = Report {
            scores: &scores,
            alignment: &alignment,
            summary: &summary,
            backsolve: Err("cannot backsolve over an empty score set".to_string()),
            model: &model,
            weights: &weights,
            generated: NaiveDate::from_ymd_opt(2024, 1, 2)
                .unwrap()
                .and_hms_opt(3, 4, 5)
                .unwrap(),
        };
        let written = write_reports(&dir, &report).unwrap();
        assert_eq!(written.len(), 7);

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.join(BACKSOLVE_JSON)).unwrap()).unwrap();
        assert_eq!(json["skipped"], true);
        assert!(json.get("adjustments_needed").is_none());

        let _ = fs::remove_dir_all(&dir);
    }
}
