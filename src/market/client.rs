use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use std::time::Duration;
use tokio_retry::{strategy::ExponentialBackoff, Retry};
use tracing::{debug, warn};

use super::cache::{cache_key, DiskCache};
use super::types::{FirmFundamentals, PriceSeries};

const QUOTE_SUMMARY_URL: &str = "https://query2.finance.yahoo.com/v10/finance/quoteSummary";
const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const WORLDBANK_URL: &str = "https://api.worldbank.org/v2/country";
const GDP_INDICATOR: &str = "NY.GDP.MKTP.CD";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for quote, chart and macro data, backed by the disk cache.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone, Debug)]
pub struct MarketClient {
    http: reqwest::Client,
    cache: DiskCache,
}

impl MarketClient {
    pub fn new(cache: DiskCache, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("prism/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { http, cache })
    }

    async fn get_json(&self, url: &str) -> Result<Value> {
        // Retry strategy: exponential backoff with 3 attempts
        let retry_strategy = ExponentialBackoff::from_millis(100)
            .max_delay(Duration::from_secs(5))
            .take(3);

        Retry::spawn(retry_strategy, || async {
            let response = self
                .http
                .get(url)
                .send()
                .await
                .with_context(|| format!("Request to {} failed", url))?;
            let response = response
                .error_for_status()
                .map_err(|e| anyhow!("HTTP error from {}: {}", url, e))?;
            response
                .json::<Value>()
                .await
                .with_context(|| format!("Invalid JSON from {}", url))
        })
        .await
    }

    /// Fetch through the cache: a fresh hit skips the network entirely.
    async fn cached<T, F>(&self, key: String, url: String, parse: F) -> Result<T>
    where
        T: serde::Serialize + serde::de::DeserializeOwned,
        F: FnOnce(&Value) -> Result<T>,
    {
        if let Some(hit) = self.cache.get::<T>(&key) {
            debug!(key = %key, "cache hit");
            return Ok(hit);
        }
        let json = self.get_json(&url).await?;
        let value = parse(&json)?;
        if let Err(e) = self.cache.put(&key, &value) {
            warn!(key = %key, error = %e, "failed to write cache entry");
        }
        Ok(value)
    }

    pub async fn fundamentals(&self, ticker: &str) -> Result<FirmFundamentals> {
        let url = format!(
            "{}/{}?modules=financialData,price",
            QUOTE_SUMMARY_URL, ticker
        );
        self.cached(cache_key("quote", ticker), url, |json| {
            parse_quote_summary(ticker, json)
        })
        .await
        .with_context(|| format!("Failed to fetch fundamentals for {}", ticker))
    }

    /// Daily closes over `range` (e.g. "1y", "2y").
    pub async fn price_history(&self, ticker: &str, range: &str) -> Result<PriceSeries> {
        let url = format!("{}/{}?range={}&interval=1d", CHART_URL, ticker, range);
        self.cached(cache_key(&format!("chart:{}", range), ticker), url, parse_chart)
            .await
            .with_context(|| format!("Failed to fetch {} price history for {}", range, ticker))
    }

    /// Most recent nominal GDP, USD billions.
    pub async fn worldbank_gdp(&self, country: &str) -> Result<f64> {
        let url = format!(
            "{}/{}/indicator/{}?format=json&mrv=5",
            WORLDBANK_URL,
            country.to_lowercase(),
            GDP_INDICATOR
        );
        self.cached(cache_key("worldbank:gdp", country), url, parse_worldbank_gdp)
            .await
            .with_context(|| format!("Failed to fetch World Bank GDP for {}", country))
    }
}

/// Yahoo wraps numbers as `{"raw": 0.35, "fmt": "35%"}`; an empty object means no data.
fn raw(value: &Value) -> Option<f64> {
    value["raw"]
        .as_f64()
        .or_else(|| value.as_f64())
        .filter(|v| v.is_finite())
}

pub fn parse_quote_summary(ticker: &str, json: &Value) -> Result<FirmFundamentals> {
    let result = json["quoteSummary"]["result"]
        .as_array()
        .and_then(|r| r.first())
        .ok_or_else(|| {
            let description = json["quoteSummary"]["error"]["description"]
                .as_str()
                .unwrap_or("empty result");
            anyhow!("quoteSummary for {}: {}", ticker, description)
        })?;

    let financial = &result["financialData"];
    Ok(FirmFundamentals {
        ticker: ticker.to_string(),
        market_cap: raw(&result["price"]["marketCap"]),
        return_on_equity: raw(&financial["returnOnEquity"]),
        profit_margin: raw(&financial["profitMargins"]),
        gross_margin: raw(&financial["grossMargins"]),
        revenue_growth: raw(&financial["revenueGrowth"]),
        debt_to_equity: raw(&financial["debtToEquity"]),
        free_cashflow: raw(&financial["freeCashflow"]),
    })
}

/// Extract (timestamp, close) pairs, skipping sessions without a close.
pub fn parse_chart(json: &Value) -> Result<PriceSeries> {
    let result = json["chart"]["result"]
        .as_array()
        .and_then(|r| r.first())
        .ok_or_else(|| anyhow!("chart response has no result"))?;
    let timestamps = result["timestamp"]
        .as_array()
        .ok_or_else(|| anyhow!("chart response has no timestamps"))?;
    let closes = result["indicators"]["quote"][0]["close"]
        .as_array()
        .ok_or_else(|| anyhow!("chart response has no closes"))?;

    let mut series = PriceSeries::default();
    for (ts, close) in timestamps.iter().zip(closes) {
        if let (Some(ts), Some(close)) = (ts.as_i64(), close.as_f64()) {
            if close.is_finite() && close > 0.0 {
                series.timestamps.push(ts);
                series.closes.push(close);
            }
        }
    }
    if series.is_empty() {
        return Err(anyhow!("chart response has no usable closes"));
    }
    Ok(series)
}

/// `[meta, [{date, value}, ...]]`, newest first; take the first non-null value.
pub fn parse_worldbank_gdp(json: &Value) -> Result<f64> {
    json[1]
        .as_array()
        .and_then(|rows| rows.iter().find_map(|row| row["value"].as_f64()))
        .filter(|v| v.is_finite() && *v > 0.0)
        .map(|usd| usd / 1e9)
        .ok_or_else(|| anyhow!("World Bank response has no GDP value"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_quote_summary() {
        let json = json!({
            "quoteSummary": {
                "result": [{
                    "price": { "marketCap": { "raw": 3.1e12, "fmt": "3.1T" } },
                    "financialData": {
                        "returnOnEquity": { "raw": 0.355, "fmt": "35.5%" },
                        "profitMargins": { "raw": 0.36 },
                        "grossMargins": { "raw": 0.69 },
                        "revenueGrowth": { "raw": 0.16 },
                        "debtToEquity": { "raw": 33.66 },
                        "freeCashflow": {}
                    }
                }],
                "error": null
            }
        });
        let f = parse_quote_summary("MSFT", &json).unwrap();
        assert_eq!(f.ticker, "MSFT");
        assert_eq!(f.market_cap, Some(3.1e12));
        assert_eq!(f.return_on_equity, Some(0.355));
        assert_eq!(f.debt_to_equity, Some(33.66));
        assert_eq!(f.free_cashflow, None);
    }

    #[test]
    fn test_parse_quote_summary_error() {
        let json = json!({
            "quoteSummary": {
                "result": null,
                "error": { "code": "Not Found", "description": "Quote not found for ticker symbol: XXXX" }
            }
        });
        let err = parse_quote_summary("XXXX", &json).unwrap_err();
        assert!(err.to_string().contains("Quote not found"));
    }

    #[test]
    fn test_parse_chart_skips_null_closes() {
        let json = json!({
            "chart": {
                "result": [{
                    "timestamp": [1700000000, 1700086400, 1700172800],
                    "indicators": { "quote": [{ "close": [100.5, null, 102.25] }] }
                }],
                "error": null
            }
        });
        let series = parse_chart(&json).unwrap();
        assert_eq!(series.timestamps, vec![1700000000, 1700172800]);
        assert_eq!(series.closes, vec![100.5, 102.25]);
    }

    #[test]
    fn test_parse_chart_empty() {
        let json = json!({ "chart": { "result": null, "error": { "code": "Not Found" } } });
        assert!(parse_chart(&json).is_err());
    }

    #[test]
    fn test_parse_worldbank_gdp() {
        let json = json!([
            { "page": 1, "pages": 1, "per_page": 5, "total": 2 },
            [
                { "date": "2024", "value": null },
                { "date": "2023", "value": 4.2e12 }
            ]
        ]);
        assert!((parse_worldbank_gdp(&json).unwrap() - 4200.0).abs() < 1e-9);
        assert!(parse_worldbank_gdp(&json!([{ "message": [] }])).is_err());
    }
}
