pub mod cache;
pub mod client;
pub mod countries;
pub mod industry;
pub mod sectors;
pub mod stats;
pub mod types;

pub use cache::{clear_cache, get_cache_path, CacheConfig, DiskCache};
pub use client::MarketClient;
pub use countries::{country, CountryMeta, TOP_40};
pub use industry::{LifecycleStage, PorterForces, StructuralInputs, Swot};
pub use sectors::{constituents, BENCHMARK_TICKER, DIVERSIFIED, GICS_SECTORS};
pub use stats::BehaviorStats;
pub use types::{FirmFundamentals, PriceSeries};
