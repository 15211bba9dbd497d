use serde::Serialize;

/// Macro snapshot for one economy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CountryMeta {
    pub code: &'static str,
    pub name: &'static str,
    /// Nominal GDP, USD billions
    pub gdp_billions: f64,
    /// USD
    pub gdp_per_capita: f64,
    /// Real GDP growth, %
    pub gdp_growth: f64,
}

const fn c(
    code: &'static str,
    name: &'static str,
    gdp_billions: f64,
    gdp_per_capita: f64,
    gdp_growth: f64,
) -> CountryMeta {
    CountryMeta {
        code,
        name,
        gdp_billions,
        gdp_per_capita,
        gdp_growth,
    }
}

/// Top 40 economies by nominal GDP (2023 estimates).
pub const TOP_40: [CountryMeta; 40] = [
    c("US", "United States", 27360.0, 81695.0, 2.5),
    c("CN", "China", 17963.0, 12720.0, 5.2),
    c("JP", "Japan", 4231.0, 33950.0, 1.9),
    c("DE", "Germany", 4430.0, 52820.0, -0.3),
    c("IN", "India", 3730.0, 2612.0, 7.2),
    c("GB", "United Kingdom", 3332.0, 48910.0, 0.5),
    c("FR", "France", 3050.0, 45540.0, 0.9),
    c("IT", "Italy", 2255.0, 38140.0, 0.7),
    c("BR", "Brazil", 2173.0, 10130.0, 2.9),
    c("CA", "Canada", 2140.0, 54870.0, 1.1),
    c("KR", "South Korea", 1713.0, 33190.0, 1.4),
    c("RU", "Russia", 2062.0, 14391.0, 2.1),
    c("ES", "Spain", 1583.0, 33470.0, 2.5),
    c("AU", "Australia", 1688.0, 64950.0, 2.0),
    c("MX", "Mexico", 1811.0, 13810.0, 3.2),
    c("ID", "Indonesia", 1391.0, 5070.0, 5.0),
    c("NL", "Netherlands", 1119.0, 63750.0, 0.1),
    c("SA", "Saudi Arabia", 1069.0, 29850.0, -0.8),
    c("TR", "Turkey", 1154.0, 13430.0, 4.5),
    c("CH", "Switzerland", 905.0, 103880.0, 0.7),
    c("PL", "Poland", 842.0, 22310.0, 0.2),
    c("TW", "Taiwan", 790.0, 33140.0, 1.4),
    c("BE", "Belgium", 632.0, 54350.0, 1.4),
    c("AR", "Argentina", 640.0, 13710.0, -1.6),
    c("SE", "Sweden", 593.0, 56490.0, -0.2),
    c("IE", "Ireland", 545.0, 106060.0, 0.9),
    c("AT", "Austria", 516.0, 57300.0, -0.7),
    c("TH", "Thailand", 514.0, 7310.0, 2.5),
    c("SG", "Singapore", 515.0, 87890.0, 1.1),
    c("IL", "Israel", 525.0, 55540.0, 2.0),
    c("NO", "Norway", 485.0, 88750.0, 0.5),
    c("AE", "UAE", 507.0, 49450.0, 3.6),
    c("PH", "Philippines", 475.0, 4130.0, 5.5),
    c("MY", "Malaysia", 447.0, 13230.0, 3.7),
    c("BD", "Bangladesh", 455.0, 2670.0, 6.0),
    c("VN", "Vietnam", 433.0, 4350.0, 5.0),
    c("DK", "Denmark", 404.0, 68830.0, 1.8),
    c("CL", "Chile", 344.0, 17340.0, 0.2),
    c("CO", "Colombia", 363.0, 7050.0, 0.6),
    c("ZA", "South Africa", 373.0, 6100.0, 0.6),
];

pub fn country(code: &str) -> Option<&'static CountryMeta> {
    TOP_40.iter().find(|c| c.code.eq_ignore_ascii_case(code))
}

impl CountryMeta {
    /// Copy with nominal GDP replaced (e.g. by a fresher World Bank figure).
    pub fn with_gdp_billions(mut self, gdp_billions: f64) -> Self {
        if gdp_billions.is_finite() && gdp_billions > 0.0 {
            self.gdp_billions = gdp_billions;
        }
        self
    }
}
