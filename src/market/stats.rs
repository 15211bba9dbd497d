use std::collections::HashMap;

use super::types::PriceSeries;
use crate::scoring::{Metric, MetricValues};

pub const SESSIONS_PER_YEAR: usize = 252;
pub const SESSIONS_PER_HALF_YEAR: usize = 126;
/// Minimum daily returns for a volatility estimate.
pub const MIN_RETURNS_FOR_VOLATILITY: usize = 21;
/// Aligned points needed before beta is trusted (strictly more than this).
pub const MIN_ALIGNED_FOR_BETA: usize = 20;

/// Behavior statistics of one price series. `None` means not computable.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BehaviorStats {
    pub return_12m: Option<f64>,
    pub return_6m: Option<f64>,
    pub volatility: Option<f64>,
    pub max_drawdown: Option<f64>,
    pub beta: Option<f64>,
}

impl BehaviorStats {
    pub fn compute(series: &PriceSeries, benchmark: Option<&PriceSeries>) -> Self {
        let closes = &series.closes;
        let return_12m = trailing_return(closes, SESSIONS_PER_YEAR);
        let return_6m = if closes.len() > SESSIONS_PER_HALF_YEAR {
            trailing_return(closes, SESSIONS_PER_HALF_YEAR)
        } else {
            return_12m
        };
        let returns = daily_returns(closes);

        Self {
            return_12m,
            return_6m,
            volatility: annualized_volatility(&returns),
            max_drawdown: max_drawdown(closes),
            beta: benchmark.and_then(|b| beta(series, b)),
        }
    }

    pub fn write_to(&self, values: &mut MetricValues) {
        values.set(Metric::Return12m, self.return_12m);
        values.set(Metric::Return6m, self.return_6m);
        values.set(Metric::Volatility, self.volatility);
        values.set(Metric::MaxDrawdown, self.max_drawdown);
        values.set(Metric::Beta, self.beta);
    }
}

/// Last close over the close `sessions` back, or over the first close when the
/// series is shorter.
pub fn trailing_return(closes: &[f64], sessions: usize) -> Option<f64> {
    let last = *closes.last()?;
    let base = if closes.len() > sessions {
        closes[closes.len() - sessions]
    } else {
        closes[0]
    };
    if base <= 0.0 {
        return None;
    }
    Some(last / base - 1.0)
}

pub fn daily_returns(closes: &[f64]) -> Vec<f64> {
    closes
        .windows(2)
        .filter(|w| w[0] > 0.0)
        .map(|w| w[1] / w[0] - 1.0)
        .collect()
}

fn mean(xs: &[f64]) -> f64 {
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Sample covariance (n - 1 denominator).
fn covariance(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let (mx, my) = (mean(xs), mean(ys));
    let sum: f64 = xs.iter().zip(ys).map(|(x, y)| (x - mx) * (y - my)).sum();
    Some(sum / (xs.len() - 1) as f64)
}

/// Sample standard deviation of daily returns, scaled by sqrt(252).
pub fn annualized_volatility(returns: &[f64]) -> Option<f64> {
    if returns.len() < MIN_RETURNS_FOR_VOLATILITY {
        return None;
    }
    let var = covariance(returns, returns)?;
    Some(var.sqrt() * (SESSIONS_PER_YEAR as f64).sqrt())
}

/// Largest peak-to-trough decline, as a positive fraction.
pub fn max_drawdown(closes: &[f64]) -> Option<f64> {
    if closes.len() < 2 {
        return None;
    }
    let mut peak = f64::MIN;
    let mut worst: f64 = 0.0;
    for &close in closes {
        peak = peak.max(close);
        if peak > 0.0 {
            worst = worst.max((peak - close) / peak);
        }
    }
    Some(worst)
}

const SECONDS_PER_DAY: i64 = 86_400;

/// cov(asset, benchmark) / var(benchmark) over the UTC days both series share.
pub fn beta(asset: &PriceSeries, benchmark: &PriceSeries) -> Option<f64> {
    let bench_by_day: HashMap<i64, f64> = benchmark
        .points()
        .map(|(ts, close)| (ts.div_euclid(SECONDS_PER_DAY), close))
        .collect();

    let (asset_closes, bench_closes): (Vec<f64>, Vec<f64>) = asset
        .points()
        .filter_map(|(ts, close)| {
            bench_by_day
                .get(&ts.div_euclid(SECONDS_PER_DAY))
                .map(|b| (close, *b))
        })
        .unzip();

    if asset_closes.len() <= MIN_ALIGNED_FOR_BETA {
        return None;
    }

    let asset_returns = daily_returns(&asset_closes);
    let bench_returns = daily_returns(&bench_closes);
    let var = covariance(&bench_returns, &bench_returns)?;
    if var <= 0.0 {
        return None;
    }
    Some(covariance(&asset_returns, &bench_returns)? / var)
}
