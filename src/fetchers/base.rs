use crate::errors::Result;
use crate::models::kline::RawBar;
use crate::models::stock::{CanonicalCode, Quote};
use async_trait::async_trait;

/// Base trait for market data sources
#[async_trait]
pub trait MarketDataFetcher {
    /// Name of the upstream provider, used in logs
    fn provider_name(&self) -> &'static str;

    /// Fetch the latest trade snapshot for one code
    async fn fetch_quote(&self, code: &CanonicalCode) -> Result<Quote>;

    /// Fetch up to `count` most recent bars for the given kline type code
    async fn fetch_kline(&self, code: &CanonicalCode, type_code: u32, count: usize) -> Result<Vec<RawBar>>;
}
