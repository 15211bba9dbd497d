//! Hand-rolled CSV with RFC 4180 quoting.

use crate::portfolio::AlignmentRow;
use crate::scoring::CompositeScore;

pub const SCORES_HEADER: [&str; 10] = [
    "country",
    "country_name",
    "sector",
    "prism_score",
    "structural_score",
    "fundamentals_score",
    "behavior_score",
    "topdown_score",
    "num_firms",
    "top_firms",
];

pub const ALIGNMENT_HEADER: [&str; 7] = [
    "ticker",
    "country",
    "sector",
    "amount",
    "prism_score",
    "alignment_score",
    "tier",
];

/// Quote a field if it contains a comma, quote, CR or LF; inner quotes are doubled.
pub fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn write_line<S: AsRef<str>>(out: &mut String, fields: &[S]) {
    let line = fields
        .iter()
        .map(|f| escape_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",");
    out.push_str(&line);
    out.push_str("\r\n");
}

fn score_field(value: f64) -> String {
    format!("{:.2}", value)
}

pub fn scores_csv(scores: &[CompositeScore]) -> String {
    let mut out = String::new();
    write_line(&mut out, &SCORES_HEADER);
    for s in scores {
        write_line(
            &mut out,
            &[
                s.key.country.clone(),
                s.country_name.clone(),
                s.key.sector.clone(),
                score_field(s.composite),
                score_field(s.sub_scores.structural),
                score_field(s.sub_scores.fundamentals),
                score_field(s.sub_scores.behavior),
                score_field(s.sub_scores.topdown),
                s.num_firms.to_string(),
                s.top_firms.join(", "),
            ],
        );
    }
    out
}

pub fn alignment_csv(rows: &[AlignmentRow]) -> String {
    let mut out = String::new();
    write_line(&mut out, &ALIGNMENT_HEADER);
    for row in rows {
        write_line(
            &mut out,
            &[
                row.ticker.clone(),
                row.country.clone(),
                row.sector.clone(),
                format!("{:.2}", row.amount),
                row.prism_score.map(score_field).unwrap_or_default(),
                score_field(row.alignment_score),
                row.tier.label().to_string(),
            ],
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{EntityKey, MetricValues, SubScores, Tier};

    #[test]
    fn test_escape_plain_field() {
        assert_eq!(escape_field("Energy"), "Energy");
        assert_eq!(escape_field(""), "");
    }

    #[test]
    fn test_escape_comma_and_quotes() {
        assert_eq!(escape_field("MSFT, AAPL"), "\"MSFT, AAPL\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_field("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_scores_csv() {
        let scores = vec![CompositeScore {
            key: EntityKey::new("KR", "Information Technology"),
            country_name: "South Korea".to_string(),
            sub_scores: SubScores {
                structural: 58.0,
                fundamentals: 61.25,
                behavior: 40.0,
                topdown: 52.5,
            },
            composite: 54.9,
            num_firms: 2,
            top_firms: vec!["005930.KS".to_string(), "000660.KS".to_string()],
            metrics: MetricValues::new(),
        }];
        let csv = scores_csv(&scores);
        let lines: Vec<&str> = csv.split("\r\n").collect();
        assert_eq!(lines[0], SCORES_HEADER.join(","));
        assert_eq!(
            lines[1],
            "KR,South Korea,Information Technology,54.90,58.00,61.25,40.00,52.50,2,\"005930.KS, 000660.KS\""
        );
        assert_eq!(lines[2], "");
    }

    #[test]
    fn test_alignment_csv_unscored() {
        let rows = vec![AlignmentRow {
            ticker: "VTI".to_string(),
            country: "US".to_string(),
            sector: "Diversified".to_string(),
            amount: 20000.0,
            prism_score: None,
            alignment_score: 50.0,
            tier: Tier::NotScored,
            justification: "ignored, not written".to_string(),
        }];
        let csv = alignment_csv(&rows);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[1], "VTI,US,Diversified,20000.00,,50.00,Not Scored");
    }
}
