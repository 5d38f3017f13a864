pub mod kline;
pub mod stock;
pub mod timeframe;
