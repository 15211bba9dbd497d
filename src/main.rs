use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use prism::config::Config;
use prism::fetch::{all_pairs, fetch_records, score_records, FetchOptions};
use prism::market::{get_cache_path, CacheConfig, DiskCache, MarketClient};
use prism::output::{self, Report};
use prism::portfolio::{self, held_pairs, HOLDINGS};
use prism::scoring::{
    backsolve, BacksolveError, BacksolveResult, EntityKey, ScoringModel, WeightVector,
};

const EXIT_SUCCESS: i32 = 0;
const EXIT_NETWORK: i32 = 2;
const EXIT_CONFIG: i32 = 4;
const EXIT_IO: i32 = 5;

/// Pairs shown in the terminal after a full run
const TOP_SCORES_SHOWN: usize = 10;

#[derive(Args, Debug, Clone, Default)]
struct FetchArgs {
    /// Directory for report files (defaults to ./output or output_dir from config)
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Constituent firms fetched per country-sector (default: 5)
    #[arg(long, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    top_n: Option<usize>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score all country-sector pairs and write every report (default if no subcommand)
    Run {
        #[command(flatten)]
        fetch: FetchArgs,

        /// Refresh country GDP from the World Bank before scoring
        #[arg(long)]
        refresh_macro: bool,
    },
    /// Score only the pairs the portfolio holds and print the alignment table
    Portfolio {
        #[command(flatten)]
        fetch: FetchArgs,
    },
    /// Suggest component weights from a previous run's prism_sector_scores.json
    Backsolve {
        /// Path to prism_sector_scores.json
        #[arg(long)]
        scores: PathBuf,

        /// Target median score (default: configured target, else a percentile of all scores)
        #[arg(long)]
        target: Option<f64>,

        /// Largest change allowed per component weight (default: 0.10)
        #[arg(long)]
        max_perturbation: Option<f64>,
    },
    /// Remove the HTTP response cache
    ClearCache,
}

#[derive(Parser, Debug)]
#[command(name = "prism")]
#[command(about = "Country-sector investment scoring and portfolio alignment", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/prism/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Bypass the HTTP response cache
    #[arg(long, global = true)]
    no_cache: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "prism=debug" } else { "prism=info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Validated model and weights, or the config exit code.
fn scoring_setup(config: &Config) -> Result<(ScoringModel, WeightVector), i32> {
    if let Err(errors) = prism::config::validate_config(config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(EXIT_CONFIG);
    }

    let scoring = config.scoring();
    match ScoringModel::from_config(&scoring) {
        Ok(model) => Ok((model, scoring.effective_weights())),
        Err(errors) => {
            eprintln!("Scoring config errors:");
            for error in errors {
                eprintln!("  - {}", error);
            }
            Err(EXIT_CONFIG)
        }
    }
}

/// `full_table` is false when `index` holds only the held pairs; a
/// percentile target then needs a fixed target instead.
fn run_backsolve(
    index: &portfolio::ScoreIndex,
    full_table: bool,
    target: Option<f64>,
    config: &Config,
    weights: &WeightVector,
    max_perturbation: f64,
) -> Result<BacksolveResult, BacksolveError> {
    let subjects = portfolio::backsolve_subjects(&HOLDINGS, index);
    let all_scores = full_table.then_some(index);
    let target = match portfolio::backsolve_target(target, all_scores, config.target_percentile()) {
        Some(target) => target,
        None if full_table => return Err(BacksolveError::EmptyInput),
        None => return Err(BacksolveError::NoTarget),
    };
    backsolve(&subjects, target, weights, max_perturbation)
}

async fn score_and_report(
    cli_no_cache: bool,
    config: &Config,
    fetch: FetchArgs,
    refresh_macro: bool,
    portfolio_only: bool,
    verbose: bool,
) -> i32 {
    let start_time = Instant::now();

    let (model, weights) = match scoring_setup(config) {
        Ok(setup) => setup,
        Err(code) => return code,
    };

    let cache_config = CacheConfig {
        enabled: !cli_no_cache,
        ttl: config.cache_ttl(),
    };
    if verbose {
        let cache_status = if cache_config.enabled {
            "enabled"
        } else {
            "disabled (--no-cache)"
        };
        info!("Cache: {}", cache_status);
    }

    let client = match MarketClient::new(DiskCache::new(get_cache_path(), cache_config), config.timeout()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to create HTTP client: {:#}", e);
            return EXIT_NETWORK;
        }
    };

    let pairs: Vec<EntityKey> = if portfolio_only {
        held_pairs()
            .into_iter()
            .map(|(country, sector)| EntityKey::new(country, sector))
            .collect()
    } else {
        all_pairs()
    };

    let options = FetchOptions {
        top_n: fetch.top_n.unwrap_or_else(|| config.top_n()),
        concurrency: config.concurrency(),
        refresh_macro: refresh_macro || config.refresh_macro(),
    };

    let records = match fetch_records(&client, pairs, options).await {
        Ok(records) => records,
        Err(e) => {
            eprintln!("{:#}", e);
            return EXIT_NETWORK;
        }
    };

    let scores = score_records(&records, &model, &weights);
    let index = portfolio::ScoreIndex::from_scores(&scores);
    let alignment = portfolio::align(&HOLDINGS, &index);
    let summary = portfolio::summarize(&alignment);

    let backsolve_result = match run_backsolve(
        &index,
        !portfolio_only,
        config.backsolve_target(),
        config,
        &weights,
        config.max_perturbation(),
    ) {
        Ok(result) => {
            info!("{}", result.message);
            Ok(result)
        }
        Err(e) => {
            warn!(error = %e, "backsolve skipped");
            Err(e.to_string())
        }
    };

    let use_colors = output::should_use_colors();
    if portfolio_only {
        println!("{}", output::format_portfolio_table(&alignment, &index, use_colors));
        println!();
        println!("{}", output::format_summary(&summary, use_colors));
    } else {
        println!("{}", output::format_top_scores(&scores, TOP_SCORES_SHOWN, use_colors));
    }

    let output_dir = fetch.output_dir.unwrap_or_else(|| config.output_dir());
    let report = Report {
        scores: &scores,
        alignment: &alignment,
        summary: &summary,
        backsolve: backsolve_result.as_ref().map_err(Clone::clone),
        model: &model,
        weights: &weights,
        generated: chrono::Local::now().naive_local(),
    };
    match output::write_reports(&output_dir, &report) {
        Ok(written) => {
            info!(
                files = written.len(),
                dir = %output_dir.display(),
                elapsed = ?start_time.elapsed(),
                "reports written"
            );
            EXIT_SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to write reports: {:#}", e);
            EXIT_IO
        }
    }
}

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for rustls 0.23+); a second install is harmless
    let _ = rustls::crypto::ring::default_provider().install_default();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let command = cli.command.unwrap_or(Commands::Run {
        fetch: FetchArgs::default(),
        refresh_macro: false,
    });

    if let Commands::ClearCache = command {
        let code = match prism::market::clear_cache() {
            Ok(()) => {
                println!("Cache cleared: {}", get_cache_path().display());
                EXIT_SUCCESS
            }
            Err(e) => {
                eprintln!("Failed to clear cache: {:#}", e);
                EXIT_IO
            }
        };
        std::process::exit(code);
    }

    let config = match prism::config::load_config(cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    let code = match command {
        Commands::Run {
            fetch,
            refresh_macro,
        } => score_and_report(cli.no_cache, &config, fetch, refresh_macro, false, cli.verbose).await,
        Commands::Portfolio { fetch } => {
            score_and_report(cli.no_cache, &config, fetch, false, true, cli.verbose).await
        }
        Commands::Backsolve {
            scores,
            target,
            max_perturbation,
        } => {
            let (_, weights) = match scoring_setup(&config) {
                Ok(setup) => setup,
                Err(code) => std::process::exit(code),
            };
            let index = match output::load_scores_json(&scores) {
                Ok(index) => index,
                Err(e) => {
                    eprintln!("{:#}", e);
                    std::process::exit(EXIT_IO);
                }
            };
            let result = run_backsolve(
                &index,
                true,
                target.or(config.backsolve_target()),
                &config,
                &weights,
                max_perturbation.unwrap_or_else(|| config.max_perturbation()),
            );
            match result.map_err(anyhow::Error::from).and_then(|r| output::json::backsolve_json(&r)) {
                Ok(json) => {
                    println!("{}", json);
                    EXIT_SUCCESS
                }
                Err(e) => {
                    eprintln!("Backsolve failed: {:#}", e);
                    EXIT_CONFIG
                }
            }
        }
        Commands::ClearCache => EXIT_SUCCESS,
    };

    std::process::exit(code);
}
