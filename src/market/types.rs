use serde::{Deserialize, Serialize};

use crate::scoring::{FirmMetrics, Metric, MetricValues};

/// Raw fundamentals as reported by the quote service (ratios as decimals).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FirmFundamentals {
    pub ticker: String,
    pub market_cap: Option<f64>,
    pub return_on_equity: Option<f64>,
    pub profit_margin: Option<f64>,
    pub gross_margin: Option<f64>,
    pub revenue_growth: Option<f64>,
    pub debt_to_equity: Option<f64>,
    pub free_cashflow: Option<f64>,
}

/// Ratios below 1 are taken to be decimals.
fn ratio_to_percent(x: f64) -> f64 {
    if x < 1.0 {
        x * 100.0
    } else {
        x
    }
}

/// Growth can legitimately exceed 100%, so only |x| < 5 counts as a decimal.
fn growth_to_percent(x: f64) -> f64 {
    if x.abs() < 5.0 {
        x * 100.0
    } else {
        x
    }
}

impl FirmFundamentals {
    /// FCF as % of market cap, when both are known and non-zero.
    pub fn fcf_yield(&self) -> Option<f64> {
        match (self.free_cashflow, self.market_cap) {
            (Some(fcf), Some(cap)) if fcf != 0.0 && cap != 0.0 => Some(fcf / cap * 100.0),
            _ => None,
        }
    }

    pub fn to_firm_metrics(&self) -> FirmMetrics {
        let mut values = MetricValues::new();
        values.set(Metric::FcfYield, self.fcf_yield());
        values.set(Metric::ReturnOnEquity, self.return_on_equity.map(ratio_to_percent));
        values.set(Metric::ProfitMargin, self.profit_margin.map(ratio_to_percent));
        values.set(Metric::GrossMargin, self.gross_margin.map(ratio_to_percent));
        values.set(Metric::RevenueGrowth, self.revenue_growth.map(growth_to_percent));
        values.set(Metric::DebtToEquity, self.debt_to_equity);

        FirmMetrics {
            ticker: self.ticker.clone(),
            market_cap: self.market_cap,
            values,
        }
    }
}

/// Daily closes with their unix timestamps (seconds). Both vectors have the same length.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub timestamps: Vec<i64>,
    pub closes: Vec<f64>,
}

impl PriceSeries {
    pub fn points(&self) -> impl Iterator<Item = (i64, f64)> + '_ {
        self.timestamps.iter().copied().zip(self.closes.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }
}
