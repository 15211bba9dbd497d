//! Markdown reports. Weights, ranges and thresholds are read from the active
//! model so the documents never drift from the scoring code.

use chrono::NaiveDateTime;
use std::fmt::Write;

use super::formatter::format_amount;
use crate::portfolio::{AlignmentRow, PortfolioSummary};
use crate::scoring::tier::{NEUTRAL_THRESHOLD, OVERWEIGHT_THRESHOLD};
use crate::scoring::{
    CompositeScore, Component, Direction, Metric, ScoringModel, Tier, WeightVector,
};

const TOP_OPPORTUNITIES: usize = 10;
const FIRMS_PER_ROW: usize = 3;

fn percent(weight: f64) -> String {
    format!("{:.0}%", weight * 100.0)
}

fn describe(metric: Metric) -> &'static str {
    match metric {
        Metric::PorterForces => "Porter's 5 Forces (average, 1-5)",
        Metric::Lifecycle => "Industry life cycle stage (1-5)",
        Metric::FcfYield => "FCF / market cap (%)",
        Metric::ReturnOnEquity => "ROE (%)",
        Metric::ProfitMargin => "Profit margin (%)",
        Metric::GrossMargin => "Gross margin (%)",
        Metric::RevenueGrowth => "Revenue growth YoY (%)",
        Metric::DebtToEquity => "Debt / equity",
        Metric::Return12m => "12-month return",
        Metric::Return6m => "6-month return",
        Metric::Volatility => "Annualized volatility",
        Metric::MaxDrawdown => "Max drawdown",
        Metric::Beta => "Beta vs SPY",
        Metric::GdpPerCapita => "GDP per capita (USD)",
        Metric::GdpScale => "GDP (USD billions)",
        Metric::GdpGrowth => "Real GDP growth (%)",
        Metric::SwotNet => "SWOT net, (S - W) + (O - T)",
    }
}

fn component_intro(component: Component) -> &'static str {
    match component {
        Component::Structural => {
            "Porter's 5 Forces and the industry life cycle. Barriers to entry follow R&D intensity \
             and regulation, substitutes and buyer power are sector heuristics, supplier power \
             tracks HHI concentration and rivalry is its inverse."
        }
        Component::Fundamentals => {
            "Market-cap weighted average of firm-level scores over the sector's largest constituents."
        }
        Component::Behavior => {
            "Price behavior of the largest constituent by market cap, used as the sector proxy."
        }
        Component::TopDown => "Country macro indicators plus the SWOT tally.",
    }
}

fn composite_formula(weights: &WeightVector) -> String {
    Component::ALL
        .iter()
        .map(|c| format!("{:.2} x {}", weights.get(*c), c.name()))
        .collect::<Vec<_>>()
        .join(" + ")
}

pub fn methodology(model: &ScoringModel, weights: &WeightVector, generated: NaiveDateTime) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# PRISM Methodology\n");
    let _ = writeln!(out, "**Last Updated:** {}\n", generated.format("%Y-%m-%d"));
    let _ = writeln!(out, "---\n");

    let _ = writeln!(out, "## Overview\n");
    let _ = writeln!(
        out,
        "PRISM (Portfolio Risk & Investment Scoring Model) scores country-sector pairs on a 0-100 \
         scale. It combines strategic frameworks (Porter's 5 Forces, industry life cycle, SWOT) with \
         firm fundamentals and market behavior.\n"
    );

    let _ = writeln!(out, "## Data Sources\n");
    let _ = writeln!(out, "1. **Country macro data**: top 40 economies by nominal GDP, optionally refreshed from the World Bank");
    let _ = writeln!(out, "2. **Company fundamentals**: Yahoo Finance quote summaries");
    let _ = writeln!(out, "3. **Prices**: Yahoo Finance daily closes (2-year lookback, SPY for beta)");
    let _ = writeln!(out, "4. **Sector constituents**: curated lists of the largest companies per country-sector\n");

    let _ = writeln!(out, "## PRISM Score Components\n");
    for (i, spec) in model.components().iter().enumerate() {
        let component = spec.component;
        let _ = writeln!(
            out,
            "### {}. {} ({} weight)\n",
            i + 1,
            component.label(),
            percent(weights.get(component))
        );
        let _ = writeln!(out, "{}\n", component_intro(component));
        for m in &spec.metrics {
            let direction = match m.range.direction() {
                Direction::HigherIsBetter => "higher = better",
                Direction::LowerIsBetter => "lower = better",
            };
            let _ = writeln!(
                out,
                "- {}: {} - normalized {} to {}, {}",
                describe(m.metric),
                percent(m.weight),
                m.range.low(),
                m.range.high(),
                direction
            );
        }
        let _ = writeln!(
            out,
            "\n*Missing data defaults to {} (neutral).*\n",
            spec.neutral_default
        );
    }

    let _ = writeln!(out, "## Final PRISM Score\n");
    let _ = writeln!(out, "```\nPRISM = {}\n```\n", composite_formula(weights));

    let _ = writeln!(out, "## Tier Definitions\n");
    let _ = writeln!(out, "- **Overweight**: PRISM >= {}", OVERWEIGHT_THRESHOLD);
    let _ = writeln!(out, "- **Neutral**: {} <= PRISM < {}", NEUTRAL_THRESHOLD, OVERWEIGHT_THRESHOLD);
    let _ = writeln!(out, "- **Underweight**: PRISM < {}\n", NEUTRAL_THRESHOLD);

    let _ = writeln!(out, "## Limitations & Caveats\n");
    let _ = writeln!(out, "1. **Data availability**: firms without complete data score neutral on the missing metrics.");
    let _ = writeln!(out, "2. **Proxy assumptions**: sector behavior is proxied by its largest firm.");
    let _ = writeln!(out, "3. **HHI proxies**: concentration is a heuristic, not measured market share.\n");

    let _ = writeln!(out, "## Backsolving & Parameter Tuning\n");
    let _ = writeln!(
        out,
        "When allocations trail the top PRISM picks, `prism backsolve` searches for the smallest \
         component weight changes, each bounded by the configured perturbation, that lift the \
         median score of the held pairs to the target."
    );
    out
}

pub fn justification_report(
    rows: &[AlignmentRow],
    summary: &PortfolioSummary,
    scores: &[CompositeScore],
    weights: &WeightVector,
    generated: NaiveDateTime,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# PRISM Portfolio Justification Report\n");
    let _ = writeln!(out, "**Generated:** {}\n", generated.format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(out, "---\n");

    let _ = writeln!(out, "## Executive Summary\n");
    let _ = writeln!(
        out,
        "This report compares portfolio allocations with PRISM recommendations. PRISM rates \
         country-sector pairs from 0 to 100 using structural factors, firm fundamentals, market \
         behavior and top-down macro analysis.\n"
    );
    let _ = writeln!(out, "**Portfolio Summary:**");
    let _ = writeln!(out, "- Total Allocation: {}", format_amount(summary.total_amount));
    for entry in &summary.by_tier {
        let _ = writeln!(
            out,
            "- {}: {} ({:.1}%)",
            entry.tier.label(),
            format_amount(entry.amount),
            entry.share * 100.0
        );
    }
    if let Some(avg) = summary.average_score {
        let _ = writeln!(out, "\n**Average PRISM Score (scored holdings):** {:.1}/100", avg);
    }
    let _ = writeln!(out, "\n---\n");

    let _ = writeln!(out, "## Top {} Country-Sector Opportunities\n", TOP_OPPORTUNITIES);
    let _ = writeln!(out, "| Rank | Country | Sector | PRISM Score | Top Firms |");
    let _ = writeln!(out, "|------|---------|--------|-------------|-----------|");
    let mut ranked: Vec<&CompositeScore> = scores.iter().collect();
    ranked.sort_by(|a, b| b.composite.total_cmp(&a.composite).then_with(|| a.key.cmp(&b.key)));
    for (i, s) in ranked.iter().take(TOP_OPPORTUNITIES).enumerate() {
        let firms = if s.top_firms.is_empty() {
            "N/A".to_string()
        } else {
            s.top_firms
                .iter()
                .take(FIRMS_PER_ROW)
                .cloned()
                .collect::<Vec<_>>()
                .join(", ")
        };
        let _ = writeln!(
            out,
            "| {} | {} | {} | {:.1} | {} |",
            i + 1,
            s.country_name,
            s.key.sector,
            s.composite,
            firms
        );
    }
    let _ = writeln!(out, "\n---\n");

    let _ = writeln!(out, "## Allocation-by-Allocation Justifications\n");
    for tier in Tier::ALL {
        let in_tier: Vec<&AlignmentRow> = rows.iter().filter(|r| r.tier == tier).collect();
        if in_tier.is_empty() {
            continue;
        }
        let _ = writeln!(out, "### {} Tier\n", tier.label());
        for row in in_tier {
            let _ = writeln!(
                out,
                "**{}** ({}) - {} / {}\n",
                row.ticker,
                format_amount(row.amount),
                row.country,
                row.sector
            );
            if let Some(score) = row.prism_score {
                let _ = writeln!(out, "*PRISM Score: {:.1}/100*\n", score);
            }
            let _ = writeln!(out, "{}\n", row.justification);
            let _ = writeln!(out, "---\n");
        }
    }

    let _ = writeln!(out, "## Methodology Notes\n");
    let _ = writeln!(out, "PRISM scores are computed as:");
    for component in Component::ALL {
        let _ = writeln!(
            out,
            "- **{} ({})**",
            component.label(),
            percent(weights.get(component))
        );
    }
    let _ = writeln!(out, "\nTier definitions:");
    let _ = writeln!(out, "- **Overweight**: PRISM >= {}", OVERWEIGHT_THRESHOLD);
    let _ = writeln!(out, "- **Neutral**: PRISM {} to below {}", NEUTRAL_THRESHOLD, OVERWEIGHT_THRESHOLD);
    let _ = writeln!(out, "- **Underweight**: PRISM < {}", NEUTRAL_THRESHOLD);
    let _ = writeln!(out, "- **Not Scored**: ETFs and holdings without a matching pair");
    out
}
