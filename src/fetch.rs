use anyhow::Result;
use futures::future::join_all;
use futures::stream::{FuturesUnordered, StreamExt};
use std::cmp::Ordering;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::market::{
    constituents, country, BehaviorStats, CountryMeta, MarketClient, PorterForces, PriceSeries,
    StructuralInputs, Swot, BENCHMARK_TICKER, GICS_SECTORS, TOP_40,
};
use crate::scoring::{
    score, CompositeScore, EntityKey, FirmMetrics, Metric, MetricRecord, MetricValues,
    ScoringModel, WeightVector,
};

/// Price history window for the representative firm of each pair.
const FIRM_HISTORY_RANGE: &str = "2y";
const BENCHMARK_HISTORY_RANGE: &str = "1y";

/// Every request of a run failed; usually means no network.
#[derive(Debug, Error)]
#[error("All {attempted} market data requests failed. Check your network connection.")]
pub struct AllRequestsFailed {
    pub attempted: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct FetchOptions {
    pub top_n: usize,
    pub concurrency: usize,
    pub refresh_macro: bool,
}

/// All 440 pairs: top 40 economies by the 11 GICS sectors.
pub fn all_pairs() -> Vec<EntityKey> {
    TOP_40
        .iter()
        .flat_map(|c| GICS_SECTORS.iter().map(|s| EntityKey::new(c.code, *s)))
        .collect()
}

/// Request tallies, so a run can tell "offline" from "some data missing".
#[derive(Debug, Default, Clone, Copy)]
struct Tally {
    attempted: usize,
    failed: usize,
}

impl Tally {
    fn record<T>(&mut self, result: &Result<T>) {
        self.attempted += 1;
        if result.is_err() {
            self.failed += 1;
        }
    }

    fn merge(&mut self, other: Tally) {
        self.attempted += other.attempted;
        self.failed += other.failed;
    }
}

/// Structural and top-down metrics, which need no network.
pub fn base_values(sector: &str, meta: Option<&CountryMeta>) -> MetricValues {
    let inputs = StructuralInputs::default();
    let mut values = MetricValues::new();
    values.insert(
        Metric::PorterForces,
        PorterForces::derive(sector, &inputs).average(),
    );
    values.insert(Metric::Lifecycle, inputs.stage.value());

    if let Some(meta) = meta {
        values.insert(Metric::GdpPerCapita, meta.gdp_per_capita);
        values.insert(Metric::GdpScale, meta.gdp_billions);
        values.insert(Metric::GdpGrowth, meta.gdp_growth);
    }
    values.insert(Metric::SwotNet, Swot::default().net());
    values
}

/// Firm with the largest known market cap; the first firm when none has one.
fn representative(firms: &[FirmMetrics]) -> Option<&FirmMetrics> {
    firms
        .iter()
        .filter(|f| f.market_cap.is_some_and(|c| c.is_finite()))
        .max_by(|a, b| {
            a.market_cap
                .partial_cmp(&b.market_cap)
                .unwrap_or(Ordering::Equal)
        })
        .or_else(|| firms.first())
}

async fn fetch_entity(
    client: &MarketClient,
    key: EntityKey,
    meta: Option<CountryMeta>,
    top_n: usize,
    benchmark: Option<&PriceSeries>,
) -> (MetricRecord, Tally) {
    let mut tally = Tally::default();
    let mut values = base_values(&key.sector, meta.as_ref());

    let tickers = constituents(&key.country, &key.sector, top_n);
    let results = join_all(tickers.iter().map(|t| client.fundamentals(t))).await;

    let mut firms = Vec::new();
    for result in results {
        tally.record(&result);
        match result {
            Ok(fundamentals) => firms.push(fundamentals.to_firm_metrics()),
            Err(e) => warn!(entity = %key, error = %e, "skipping firm"),
        }
    }

    if let Some(firm) = representative(&firms) {
        let history = client.price_history(&firm.ticker, FIRM_HISTORY_RANGE).await;
        tally.record(&history);
        match history {
            Ok(series) => BehaviorStats::compute(&series, benchmark).write_to(&mut values),
            Err(e) => warn!(entity = %key, error = %e, "no price history; behavior metrics absent"),
        }
    }

    debug!(entity = %key, firms = firms.len(), metrics = values.len(), "fetched");

    let record = MetricRecord {
        country_name: meta
            .map(|m| m.name.to_string())
            .unwrap_or_else(|| key.country.clone()),
        key,
        values,
        firms,
    };
    (record, tally)
}

/// Country metadata for every country in `pairs`, GDP refreshed from the World
/// Bank when asked. A failed refresh keeps the static figure.
async fn country_table(
    client: &MarketClient,
    pairs: &[EntityKey],
    options: &FetchOptions,
) -> HashMap<String, CountryMeta> {
    let mut table: HashMap<String, CountryMeta> = HashMap::new();
    for key in pairs {
        if let Some(meta) = country(&key.country) {
            table.entry(key.country.clone()).or_insert(*meta);
        }
    }
    if !options.refresh_macro {
        return table;
    }

    let codes: Vec<String> = table.keys().cloned().collect();
    let mut codes_iter = codes.into_iter();
    let mut futures = FuturesUnordered::new();
    let refresh = move |code: String| async move {
        let gdp = client.worldbank_gdp(&code).await;
        (code, gdp)
    };

    // Fill initial batch
    for _ in 0..options.concurrency.max(1) {
        if let Some(code) = codes_iter.next() {
            futures.push(refresh(code));
        }
    }

    while let Some((code, gdp)) = futures.next().await {
        match gdp {
            Ok(billions) => {
                if let Some(meta) = table.get_mut(&code) {
                    *meta = meta.with_gdp_billions(billions);
                }
            }
            Err(e) => warn!(country = %code, error = %e, "GDP refresh failed; using static figure"),
        }
        if let Some(next) = codes_iter.next() {
            futures.push(refresh(next));
        }
    }

    info!(countries = table.len(), "refreshed GDP from World Bank");
    table
}

/// Fetch a `MetricRecord` for every pair.
///
/// Individual failures only leave metrics absent. If every request fails the
/// error is `AllRequestsFailed`.
pub async fn fetch_records(
    client: &MarketClient,
    pairs: Vec<EntityKey>,
    options: FetchOptions,
) -> Result<Vec<MetricRecord>> {
    let mut tally = Tally::default();

    let benchmark = client
        .price_history(BENCHMARK_TICKER, BENCHMARK_HISTORY_RANGE)
        .await;
    tally.record(&benchmark);
    let benchmark = match benchmark {
        Ok(series) => Some(series),
        Err(e) => {
            warn!(error = %e, "benchmark unavailable; beta will be absent");
            None
        }
    };

    let countries = country_table(client, &pairs, &options).await;

    info!(
        pairs = pairs.len(),
        concurrency = options.concurrency,
        "fetching market data"
    );

    let concurrency = options.concurrency.max(1);
    let mut pairs_iter = pairs.into_iter();
    let mut futures = FuturesUnordered::new();
    let mut records = Vec::new();

    let benchmark = benchmark.as_ref();
    let countries = &countries;
    let spawn = move |key: EntityKey| {
        let meta = countries.get(&key.country).copied();
        fetch_entity(client, key, meta, options.top_n, benchmark)
    };

    // Fill initial batch
    for _ in 0..concurrency {
        if let Some(key) = pairs_iter.next() {
            futures.push(spawn(key));
        }
    }

    // Process results and feed new tasks
    while let Some((record, entity_tally)) = futures.next().await {
        tally.merge(entity_tally);
        records.push(record);
        if let Some(key) = pairs_iter.next() {
            futures.push(spawn(key));
        }
    }

    info!(
        records = records.len(),
        requests = tally.attempted,
        failed = tally.failed,
        "fetch complete"
    );

    if tally.attempted > 0 && tally.failed == tally.attempted {
        return Err(AllRequestsFailed {
            attempted: tally.attempted,
        }
        .into());
    }

    Ok(records)
}

/// Score every record and order by score descending, then key ascending.
pub fn score_records(
    records: &[MetricRecord],
    model: &ScoringModel,
    weights: &WeightVector,
) -> Vec<CompositeScore> {
    let mut scores: Vec<CompositeScore> = records
        .iter()
        .map(|record| score(record, model, weights))
        .collect();

    scores.sort_by(|a, b| {
        b.composite
            .partial_cmp(&a.composite)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.key.cmp(&b.key))
    });
    scores
}
