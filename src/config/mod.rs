mod schema;

pub use schema::{BacksolveConfig, Config, FetchConfig};

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use crate::scoring::validate_scoring;

/// Get the config directory path (~/.config/prism/)
pub fn get_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("prism"))
}

/// Get the default config file path (~/.config/prism/config.yaml)
pub fn get_config_path() -> Option<PathBuf> {
    get_config_dir().map(|dir| dir.join("config.yaml"))
}

/// Load configuration from a YAML file
///
/// # Arguments
///
/// * `path` - Optional path to config file. If None, uses default path (~/.config/prism/config.yaml)
///
/// # Errors
///
/// Returns an error if:
/// - An explicitly given config file does not exist
/// - The config file cannot be read
/// - The YAML cannot be parsed
///
/// A missing default config file is not an error; built-in defaults apply.
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                anyhow::bail!("Config file not found at {}", p.display());
            }
            p
        }
        None => match get_config_path() {
            Some(p) if p.exists() => p,
            _ => return Ok(Config::default()),
        },
    };

    let config_content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    let config: Config = serde_saphyr::from_str(&config_content)
        .with_context(|| format!("Failed to parse config: invalid YAML in {}", config_path.display()))?;

    Ok(config)
}

/// Validate the whole config at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if let Err(scoring_errors) = validate_scoring(&config.scoring()) {
        errors.extend(scoring_errors);
    }

    if let Some(ref backsolve) = config.backsolve {
        if let Some(p) = backsolve.target_percentile {
            if !(0.0..=1.0).contains(&p) {
                errors.push(format!(
                    "backsolve.target_percentile: must be between 0 and 1, got {}",
                    p
                ));
            }
        }
        if let Some(t) = backsolve.target {
            if !t.is_finite() {
                errors.push(format!("backsolve.target: must be a finite number, got {}", t));
            }
        }
        if let Some(m) = backsolve.max_perturbation {
            if !m.is_finite() || m < 0.0 {
                errors.push(format!(
                    "backsolve.max_perturbation: must be a non-negative number, got {}",
                    m
                ));
            }
        }
    }

    if let Some(ref fetch) = config.fetch {
        if fetch.top_n == Some(0) {
            errors.push("fetch.top_n: must be at least 1".to_string());
        }
        if fetch.concurrency == Some(0) {
            errors.push("fetch.concurrency: must be at least 1".to_string());
        }
        for (name, value) in [("cache_ttl", &fetch.cache_ttl), ("timeout", &fetch.timeout)] {
            if let Some(s) = value {
                if let Err(e) = humantime::parse_duration(s) {
                    errors.push(format!("fetch.{}: invalid duration '{}' - {}", name, s, e));
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_missing_explicit_config_is_error() {
        let path = env::temp_dir().join("prism_test_no_such_config.yaml");
        let _ = fs::remove_file(&path);
        assert!(load_config(Some(path)).is_err());
    }

    #[test]
    fn test_load_explicit_config() {
        let path = env::temp_dir().join(format!("prism_test_config_{}.yaml", std::process::id()));
        fs::write(&path, "fetch:\n  top_n: 2\n").unwrap();
        let config = load_config(Some(path.clone())).unwrap();
        assert_eq!(config.top_n(), 2);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_invalid_yaml_is_error() {
        let path = env::temp_dir().join(format!("prism_test_bad_config_{}.yaml", std::process::id()));
        fs::write(&path, "fetch: [unclosed\n").unwrap();
        assert!(load_config(Some(path.clone())).is_err());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let yaml = r#"
scoring:
  weights:
    structural: 0.4
    fundamentals: 0.4
    behavior: 0.4
    topdown: 0.4
backsolve:
  target_percentile: 1.5
  max_perturbation: -0.1
fetch:
  top_n: 0
  cache_ttl: forever
"#;
        let config: Config = serde_saphyr::from_str(yaml).unwrap();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5, "{errors:?}");
        assert!(errors[0].starts_with("scoring.weights"));
        assert!(errors.iter().any(|e| e.starts_with("fetch.cache_ttl")));
    }
}
