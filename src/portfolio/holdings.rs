use serde::Serialize;

use crate::market::DIVERSIFIED;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Holding {
    pub ticker: &'static str,
    /// USD
    pub amount: f64,
    pub country: &'static str,
    pub sector: &'static str,
}

impl Holding {
    /// Broad ETFs carry the "Diversified" sector and are never scored.
    pub fn is_diversified(&self) -> bool {
        self.sector == DIVERSIFIED
    }
}

const fn h(ticker: &'static str, amount: f64, country: &'static str, sector: &'static str) -> Holding {
    Holding {
        ticker,
        amount,
        country,
        sector,
    }
}

const IT: &str = "Information Technology";
const COMM: &str = "Communication Services";
const DISC: &str = "Consumer Discretionary";
const STAPLES: &str = "Consumer Staples";
const HEALTH: &str = "Health Care";
const FIN: &str = "Financials";
const IND: &str = "Industrials";
const MAT: &str = "Materials";

pub const HOLDINGS: [Holding; 53] = [
    // US stocks
    h("MSFT", 20000.0, "US", IT),
    h("NVDA", 20000.0, "US", IT),
    h("AAPL", 15000.0, "US", IT),
    h("META", 10000.0, "US", COMM),
    h("GOOG", 10000.0, "US", COMM),
    h("AVGO", 10000.0, "US", IT),
    h("COST", 10000.0, "US", STAPLES),
    h("LLY", 10000.0, "US", HEALTH),
    h("JPM", 10000.0, "US", FIN),
    h("TSM", 10000.0, "TW", IT),
    h("PLTR", 20000.0, "US", IT),
    h("RGTI", 7500.0, "US", IT),
    // US ETFs
    h("QQQ", 30000.0, "US", IT),
    h("VTI", 20000.0, "US", DIVERSIFIED),
    h("VTV", 12500.0, "US", DIVERSIFIED),
    // Germany
    h("SAP", 5000.0, "DE", IT),
    h("ALV.DE", 4000.0, "DE", FIN),
    h("RHM.DE", 3750.0, "DE", IND),
    // France
    h("MC.PA", 4000.0, "FR", DISC),
    h("TTE.PA", 3000.0, "FR", "Energy"),
    h("AI.PA", 3625.0, "FR", MAT),
    // Japan
    h("8035.T", 8000.0, "JP", IT),
    h("6758.T", 6500.0, "JP", DISC),
    h("9983.T", 5000.0, "JP", DISC),
    h("8058.T", 4000.0, "JP", IND),
    h("5803.T", 3062.50, "JP", IT),
    // Australia
    h("GMG.AX", 3000.0, "AU", "Real Estate"),
    h("PME.AX", 2000.0, "AU", HEALTH),
    h("NWH.AX", 1750.0, "AU", IND),
    h("ASB.AX", 1750.0, "AU", IND),
    // Country and regional ETFs
    h("EWU", 21250.0, "GB", DIVERSIFIED),
    h("EWC", 10625.0, "CA", DIVERSIFIED),
    h("FEZ", 15937.50, "EU", DIVERSIFIED),
    // China
    h("TCEHY", 5000.0, "CN", COMM),
    h("BABA", 5000.0, "CN", DISC),
    h("JD", 4000.0, "CN", DISC),
    h("PDD", 5000.0, "CN", DISC),
    h("1211.HK", 3500.0, "CN", DISC),
    // Indonesia
    h("INCO.JK", 2000.0, "ID", MAT),
    h("TLKM.JK", 2000.0, "ID", COMM),
    h("ARTO.JK", 2000.0, "ID", FIN),
    h("KLBF.JK", 1500.0, "ID", HEALTH),
    h("JSMR.JK", 2062.50, "ID", IND),
    // South Korea
    h("005930.KS", 2000.0, "KR", IT),
    h("000660.KS", 1500.0, "KR", IT),
    h("005380.KS", 1000.0, "KR", DISC),
    h("035420.KS", 1000.0, "KR", COMM),
    h("035720.KS", 875.0, "KR", COMM),
    // Emerging market ETFs
    h("INDA", 19125.0, "IN", DIVERSIFIED),
    h("EWZ", 12750.0, "BR", DIVERSIFIED),
    h("EWW", 6375.0, "MX", DIVERSIFIED),
    h("EWT", 6375.0, "TW", DIVERSIFIED),
    h("EEM", 3187.50, "EM", DIVERSIFIED),
];

/// Distinct scorable (country, sector) pairs held, in first-seen order.
pub fn held_pairs() -> Vec<(&'static str, &'static str)> {
    let mut pairs: Vec<(&'static str, &'static str)> = Vec::new();
    for holding in HOLDINGS.iter().filter(|h| !h.is_diversified()) {
        let pair = (holding.country, holding.sector);
        if !pairs.contains(&pair) {
            pairs.push(pair);
        }
    }
    pairs
}

pub fn total_amount(holdings: &[Holding]) -> f64 {
    holdings.iter().map(|h| h.amount).sum()
}
