// 公开导出的模块，供外部使用
pub mod models;
pub mod errors;
pub mod config;
pub mod symbol;
pub mod normalizer;
pub mod session;
pub mod chart;
pub mod fetchers;
pub mod services;

#[doc(hidden)]
pub mod util;

// 重新导出常用类型，方便使用
pub use models::kline::{Bar, RawBar, Series, SeriesPoint};
pub use models::stock::{CanonicalCode, Exchange, Quote, Region};
pub use models::timeframe::{Granularity, Timeframe};
pub use chart::ChartSpec;
pub use session::SessionGapSet;
pub use errors::{Result, KlineError};
