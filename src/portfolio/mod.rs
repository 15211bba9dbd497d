pub mod alignment;
pub mod holdings;

pub use alignment::{
    align, backsolve_subjects, backsolve_target, justification, summarize, AlignmentRow,
    PortfolioSummary, ScoreIndex, ScoredPair, TierAmount, UNSCORED_ALIGNMENT,
};
pub use holdings::{held_pairs, Holding, HOLDINGS};
