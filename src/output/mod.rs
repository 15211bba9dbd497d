pub mod csv;
pub mod files;
pub mod formatter;
pub mod json;
pub mod markdown;

pub use files::{write_atomic, write_reports, Report};
pub use formatter::{
    format_amount, format_portfolio_table, format_score, format_summary, format_top_scores,
    should_use_colors,
};
pub use json::{load_scores_json, ScoreRow};
