/// The 11 GICS sectors.
pub const GICS_SECTORS: [&str; 11] = [
    "Communication Services",
    "Consumer Discretionary",
    "Consumer Staples",
    "Energy",
    "Financials",
    "Health Care",
    "Industrials",
    "Information Technology",
    "Materials",
    "Real Estate",
    "Utilities",
];

/// Sector tag for broad ETFs that are not scored.
pub const DIVERSIFIED: &str = "Diversified";

/// Benchmark used for beta.
pub const BENCHMARK_TICKER: &str = "SPY";

/// Hand-picked largest constituents per (country, sector), largest first.
const CURATED: &[(&str, &str, &[&str])] = &[
    ("US", "Information Technology", &["MSFT", "AAPL", "NVDA", "AVGO", "PLTR"]),
    ("US", "Communication Services", &["META", "GOOG", "GOOGL", "NFLX", "DIS"]),
    ("US", "Financials", &["JPM", "BAC", "WFC", "GS", "MS"]),
    ("US", "Health Care", &["LLY", "UNH", "JNJ", "ABBV", "MRK"]),
    ("US", "Consumer Discretionary", &["AMZN", "TSLA", "HD", "MCD", "NKE"]),
    ("US", "Consumer Staples", &["COST", "WMT", "PG", "KO", "PEP"]),
    ("CN", "Information Technology", &["BABA", "TCEHY", "JD", "PDD", "BIDU"]),
    ("CN", "Consumer Discretionary", &["1211.HK", "NIO", "XPEV", "LI", "BABA"]),
    ("JP", "Information Technology", &["8035.T", "6758.T", "6861.T", "6503.T"]),
    ("JP", "Consumer Discretionary", &["9983.T", "7203.T"]),
    ("JP", "Industrials", &["8058.T", "5401.T"]),
    ("DE", "Information Technology", &["SAP"]),
    ("DE", "Financials", &["ALV.DE"]),
    ("DE", "Industrials", &["RHM.DE"]),
    ("FR", "Consumer Discretionary", &["MC.PA"]),
    ("FR", "Energy", &["TTE.PA"]),
    ("FR", "Materials", &["AI.PA"]),
    ("AU", "Real Estate", &["GMG.AX"]),
    ("AU", "Health Care", &["PME.AX"]),
    ("AU", "Industrials", &["NWH.AX", "ASB.AX"]),
    ("IN", "Energy", &["RELIANCE.NS"]),
    ("IN", "Information Technology", &["TCS.NS", "INFY.NS"]),
    ("IN", "Industrials", &["TATAMOTORS.NS", "ADANIENT.NS", "M&M.NS"]),
    ("IN", "Materials", &["TATASTEEL.NS"]),
    ("ID", "Materials", &["INCO.JK"]),
    ("ID", "Communication Services", &["TLKM.JK"]),
    ("ID", "Financials", &["ARTO.JK"]),
    ("ID", "Health Care", &["KLBF.JK"]),
    ("ID", "Industrials", &["JSMR.JK"]),
    ("KR", "Information Technology", &["005930.KS", "000660.KS", "035420.KS"]),
    ("KR", "Consumer Discretionary", &["005380.KS"]),
    ("KR", "Communication Services", &["035720.KS"]),
];

/// Up to `top_n` constituent tickers; empty when the pair has no curated list.
pub fn constituents(country: &str, sector: &str, top_n: usize) -> Vec<String> {
    CURATED
        .iter()
        .find(|(c, s, _)| *c == country && *s == sector)
        .map(|(_, _, tickers)| tickers.iter().take(top_n).map(|t| t.to_string()).collect())
        .unwrap_or_default()
}

pub fn is_gics_sector(sector: &str) -> bool {
    GICS_SECTORS.contains(&sector)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constituents_truncated() {
        assert_eq!(
            constituents("US", "Financials", 2),
            vec!["JPM".to_string(), "BAC".to_string()]
        );
        assert_eq!(constituents("US", "Financials", 10).len(), 5);
    }

    #[test]
    fn test_missing_pair_has_no_firms() {
        assert!(constituents("BR", "Energy", 5).is_empty());
        assert!(constituents("US", DIVERSIFIED, 5).is_empty());
    }

    #[test]
    fn test_curated_sectors_are_gics() {
        for (_, sector, tickers) in CURATED {
            assert!(is_gics_sector(sector), "{sector}");
            assert!(!tickers.is_empty());
        }
        assert!(!is_gics_sector(DIVERSIFIED));
    }
}
