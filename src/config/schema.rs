use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::market::cache::DEFAULT_CACHE_TTL;
use crate::market::client::DEFAULT_TIMEOUT;
use crate::scoring::backsolve::{DEFAULT_MAX_PERTURBATION, DEFAULT_TARGET_PERCENTILE};
use crate::scoring::ScoringConfig;

pub const DEFAULT_TOP_N: usize = 5;
pub const DEFAULT_CONCURRENCY: usize = 8;
pub const DEFAULT_OUTPUT_DIR: &str = "output";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub scoring: Option<ScoringConfig>,

    #[serde(default)]
    pub backsolve: Option<BacksolveConfig>,

    #[serde(default)]
    pub fetch: Option<FetchConfig>,

    /// Where report files are written (default: ./output)
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BacksolveConfig {
    /// Percentile of all composites used as the target (default: 0.70)
    #[serde(default)]
    pub target_percentile: Option<f64>,

    /// Fixed target; overrides target_percentile
    #[serde(default)]
    pub target: Option<f64>,

    /// Largest move allowed per component weight (default: 0.10)
    #[serde(default)]
    pub max_perturbation: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FetchConfig {
    /// Constituents fetched per country-sector (default: 5)
    #[serde(default)]
    pub top_n: Option<usize>,

    /// Entities fetched at once (default: 8)
    #[serde(default)]
    pub concurrency: Option<usize>,

    /// Cache lifetime as a human duration, e.g. "24h" or "30m"
    #[serde(default)]
    pub cache_ttl: Option<String>,

    /// Per-request timeout, e.g. "10s"
    #[serde(default)]
    pub timeout: Option<String>,

    /// Refresh country GDP from the World Bank before scoring (default: false)
    #[serde(default)]
    pub refresh_macro: Option<bool>,
}

impl Config {
    pub fn scoring(&self) -> ScoringConfig {
        self.scoring.clone().unwrap_or_default()
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR))
    }

    pub fn target_percentile(&self) -> f64 {
        self.backsolve
            .as_ref()
            .and_then(|b| b.target_percentile)
            .unwrap_or(DEFAULT_TARGET_PERCENTILE)
    }

    pub fn backsolve_target(&self) -> Option<f64> {
        self.backsolve.as_ref().and_then(|b| b.target)
    }

    pub fn max_perturbation(&self) -> f64 {
        self.backsolve
            .as_ref()
            .and_then(|b| b.max_perturbation)
            .unwrap_or(DEFAULT_MAX_PERTURBATION)
    }

    pub fn top_n(&self) -> usize {
        self.fetch
            .as_ref()
            .and_then(|f| f.top_n)
            .unwrap_or(DEFAULT_TOP_N)
    }

    pub fn concurrency(&self) -> usize {
        self.fetch
            .as_ref()
            .and_then(|f| f.concurrency)
            .unwrap_or(DEFAULT_CONCURRENCY)
    }

    pub fn refresh_macro(&self) -> bool {
        self.fetch
            .as_ref()
            .and_then(|f| f.refresh_macro)
            .unwrap_or(false)
    }

    /// Falls back to the default when unset; unparsable values are caught by validation.
    pub fn cache_ttl(&self) -> Duration {
        self.fetch
            .as_ref()
            .and_then(|f| f.cache_ttl.as_deref())
            .and_then(|s| humantime::parse_duration(s).ok())
            .unwrap_or(DEFAULT_CACHE_TTL)
    }

    pub fn timeout(&self) -> Duration {
        self.fetch
            .as_ref()
            .and_then(|f| f.timeout.as_deref())
            .and_then(|s| humantime::parse_duration(s).ok())
            .unwrap_or(DEFAULT_TIMEOUT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_defaults() {
        let config: Config = serde_saphyr::from_str("{}").unwrap();
        assert_eq!(config.top_n(), 5);
        assert_eq!(config.concurrency(), 8);
        assert_eq!(config.cache_ttl(), Duration::from_secs(86400));
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(config.target_percentile(), 0.70);
        assert_eq!(config.max_perturbation(), 0.10);
        assert_eq!(config.backsolve_target(), None);
        assert_eq!(config.output_dir(), PathBuf::from("output"));
        assert!(!config.refresh_macro());
    }

    #[test]
    fn test_partial_config() {
        let yaml = r#"
backsolve:
  target: 62.5
fetch:
  cache_ttl: 30m
  concurrency: 4
"#;
        let config: Config = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(config.backsolve_target(), Some(62.5));
        assert_eq!(config.max_perturbation(), 0.10);
        assert_eq!(config.cache_ttl(), Duration::from_secs(1800));
        assert_eq!(config.concurrency(), 4);
        assert_eq!(config.top_n(), 5);
        assert!(config.scoring.is_none());
    }

    #[test]
    fn test_full_config() {
        let yaml = r#"
scoring:
  weights:
    structural: 0.30
    fundamentals: 0.30
    behavior: 0.20
    topdown: 0.20
  neutral_defaults:
    fundamentals: 55
  ranges:
    beta:
      high: 2.0
backsolve:
  target_percentile: 0.8
  max_perturbation: 0.05
fetch:
  top_n: 3
  concurrency: 2
  cache_ttl: 12h
  timeout: 5s
  refresh_macro: true
output_dir: reports
"#;
        let config: Config = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(config.scoring().effective_weights().topdown, 0.20);
        assert_eq!(config.target_percentile(), 0.8);
        assert_eq!(config.max_perturbation(), 0.05);
        assert_eq!(config.top_n(), 3);
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert!(config.refresh_macro());
        assert_eq!(config.output_dir(), PathBuf::from("reports"));
    }

    #[test]
    fn test_unknown_section_rejected() {
        assert!(serde_saphyr::from_str::<Config>("queries: []").is_err());
        assert!(serde_saphyr::from_str::<Config>("fetch:\n  retries: 3").is_err());
    }
}
