use std::io::IsTerminal;
use owo_colors::OwoColorize;
use terminal_size::{Width, terminal_size};

use crate::portfolio::{AlignmentRow, PortfolioSummary, ScoreIndex};
use crate::scoring::{CompositeScore, Tier};

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// One decimal, or "-" when there is no score
pub fn format_score(score: Option<f64>) -> String {
    match score {
        Some(s) => format!("{:.1}", s),
        None => "-".to_string(),
    }
}

/// Whole dollars with thousands separators: 20000.0 -> "$20,000"
pub fn format_amount(amount: f64) -> String {
    let rounded = amount.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if rounded < 0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate text to fit available width, accounting for Unicode
fn truncate_text(text: &str, max_width: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_width {
        text.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

fn color_tier(tier: Tier, text: &str, use_colors: bool) -> String {
    if !use_colors {
        return text.to_string();
    }
    match tier {
        Tier::Overweight => text.green().bold().to_string(),
        Tier::Neutral => text.yellow().to_string(),
        Tier::Underweight => text.red().to_string(),
        Tier::NotScored => text.dimmed().to_string(),
    }
}

/// Width left for the sector column once the fixed columns are laid out.
fn sector_width(fixed_width: usize) -> usize {
    match get_terminal_width() {
        Some(width) if width > fixed_width + 12 => (width - fixed_width).min(24),
        Some(_) => 12,
        None => 24,
    }
}

/// Holdings with tier, PRISM score and the four component scores.
/// Columns: Ticker, Ctry, Sector, Amount, Tier, Score, S/F/B/T
pub fn format_portfolio_table(rows: &[AlignmentRow], index: &ScoreIndex, use_colors: bool) -> String {
    if rows.is_empty() {
        return "No holdings.".to_string();
    }

    // ticker 11 + country 4 + amount 9 + tier 11 + score 5 + components 4*5 + separators
    let sector_w = sector_width(11 + 4 + 9 + 11 + 5 + 20 + 14);

    let header = format!(
        "{:<11} {:<4} {:<sw$} {:>9}  {:<11} {:>5}  {:>4} {:>4} {:>4} {:>4}",
        "Ticker", "Ctry", "Sector", "Amount", "Tier", "Score", "S", "F", "B", "T",
        sw = sector_w
    );
    let header = if use_colors {
        header.bold().to_string()
    } else {
        header
    };

    let lines = rows.iter().map(|row| {
        let components = match index.get(&row.country, &row.sector) {
            Some(scored) => scored
                .sub_scores
                .as_array()
                .iter()
                .map(|s| format!("{:>4.0}", s))
                .collect::<Vec<_>>()
                .join(" "),
            None => format!("{:>4} {:>4} {:>4} {:>4}", "-", "-", "-", "-"),
        };
        let tier = format!("{:<11}", row.tier.label());
        let score = format!("{:>5}", format_score(row.prism_score));
        let ticker = if use_colors {
            format!("{:<11}", row.ticker).bold().to_string()
        } else {
            format!("{:<11}", row.ticker)
        };

        format!(
            "{} {:<4} {:<sw$} {:>9}  {} {}  {}",
            ticker,
            row.country,
            truncate_text(&row.sector, sector_w),
            format_amount(row.amount),
            color_tier(row.tier, &tier, use_colors),
            color_tier(row.tier, &score, use_colors),
            components,
            sw = sector_w
        )
    });

    std::iter::once(header)
        .chain(lines)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_summary(summary: &PortfolioSummary, use_colors: bool) -> String {
    let mut lines = vec![format!(
        "Total: {} across {} holdings",
        format_amount(summary.total_amount),
        summary.holdings
    )];
    for entry in &summary.by_tier {
        let label = format!("{:<12}", entry.tier.label());
        lines.push(format!(
            "  {} {:>10}  {:>5.1}%",
            color_tier(entry.tier, &label, use_colors),
            format_amount(entry.amount),
            entry.share * 100.0
        ));
    }
    lines.push(format!(
        "Average PRISM score: {}",
        format_score(summary.average_score)
    ));
    lines.push(format!(
        "Median PRISM score:  {}",
        format_score(summary.median_score)
    ));
    lines.join("\n")
}

/// Top `limit` pairs, one per line: rank, score, tier, country, sector
pub fn format_top_scores(scores: &[CompositeScore], limit: usize, use_colors: bool) -> String {
    if scores.is_empty() {
        return "No scores.".to_string();
    }

    scores
        .iter()
        .take(limit)
        .enumerate()
        .map(|(idx, s)| {
            let index_str = format!("{:>2}.", idx + 1);
            let tier = Tier::from_score(s.composite);
            let score = format!("{:>5.1}", s.composite);
            let name = format!("{} - {}", s.country_name, s.key.sector);
            if use_colors {
                format!(
                    "{} {}  {}  {}",
                    index_str.dimmed(),
                    color_tier(tier, &score, true),
                    format!("{:<11}", tier.label()),
                    name
                )
            } else {
                format!("{} {}  {:<11}  {}", index_str, score, tier.label(), name)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::{align, summarize, Holding, ScoredPair};
    use crate::scoring::{EntityKey, MetricValues, SubScores};

    fn index() -> ScoreIndex {
        [(
            EntityKey::new("US", "Information Technology"),
            ScoredPair {
                composite: 72.4,
                sub_scores: SubScores {
                    structural: 80.0,
                    fundamentals: 70.0,
                    behavior: 60.0,
                    topdown: 75.0,
                },
            },
        )]
        .into_iter()
        .collect()
    }

    fn holdings() -> Vec<Holding> {
        vec![
            Holding {
                ticker: "MSFT",
                amount: 20000.0,
                country: "US",
                sector: "Information Technology",
            },
            Holding {
                ticker: "VTI",
                amount: 20000.0,
                country: "US",
                sector: "Diversified",
            },
        ]
    }

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(Some(72.44)), "72.4");
        assert_eq!(format_score(None), "-");
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0.0), "$0");
        assert_eq!(format_amount(875.0), "$875");
        assert_eq!(format_amount(3062.5), "$3,063");
        assert_eq!(format_amount(407_500.0), "$407,500");
        assert_eq!(format_amount(1_234_567.0), "$1,234,567");
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("Energy", 10), "Energy");
        assert_eq!(truncate_text("Information Technology", 12), "Informati...");
        assert_eq!(truncate_text("Utilities", 3), "Uti");
    }

    #[test]
    fn test_format_portfolio_table() {
        let index = index();
        let rows = align(&holdings(), &index);
        let result = format_portfolio_table(&rows, &index, false);
        let lines: Vec<&str> = result.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Ticker"));
        assert!(lines[1].starts_with("MSFT"));
        assert!(lines[1].contains("Overweight"));
        assert!(lines[1].contains("72.4"));
        assert!(lines[1].contains("$20,000"));
        assert!(lines[1].contains("  80   70   60   75"));
        assert!(lines[2].contains("Not Scored"));
        assert!(lines[2].ends_with("   -    -    -    -"));
    }

    #[test]
    fn test_format_portfolio_table_empty() {
        assert_eq!(format_portfolio_table(&[], &index(), false), "No holdings.");
    }

    #[test]
    fn test_format_summary() {
        let summary = summarize(&align(&holdings(), &index()));
        let result = format_summary(&summary, false);
        assert!(result.starts_with("Total: $40,000 across 2 holdings"));
        assert!(result.contains("Overweight"));
        assert!(result.contains("50.0%"));
        assert!(result.contains("Average PRISM score: 72.4"));
        assert!(result.contains("Median PRISM score:  72.4"));
    }

    #[test]
    fn test_format_top_scores() {
        let score = |country: &str, composite: f64| CompositeScore {
            key: EntityKey::new(country, "Energy"),
            country_name: country.to_string(),
            sub_scores: SubScores::default(),
            composite,
            num_firms: 0,
            top_firms: vec![],
            metrics: MetricValues::new(),
        };
        let scores = vec![score("US", 71.0), score("DE", 60.0), score("FR", 40.0)];
        let result = format_top_scores(&scores, 2, false);
        let lines: Vec<&str> = result.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with(" 1.  71.0  Overweight"));
        assert!(lines[1].contains("Neutral"));
        assert!(lines[1].ends_with("DE - Energy"));
        assert_eq!(format_top_scores(&[], 5, false), "No scores.");
    }
}
