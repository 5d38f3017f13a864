use crate::errors::KlineError;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// 市场区域
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Region {
    /// A股（沪/深/北）
    Domestic,
    HongKong,
    Us,
}

impl Region {
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Domestic => "cn",
            Region::HongKong => "hk",
            Region::Us => "us",
        }
    }
}

impl FromStr for Region {
    type Err = KlineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cn" => Ok(Region::Domestic),
            "hk" => Ok(Region::HongKong),
            "us" => Ok(Region::Us),
            _ => Err(KlineError::UnknownRegion(s.to_string())),
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 交易所及其代码后缀
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Exchange {
    Shanghai,
    Shenzhen,
    Beijing,
    HongKong,
    Us,
}

impl Exchange {
    pub fn suffix(&self) -> &'static str {
        match self {
            Exchange::Shanghai => ".SH",
            Exchange::Shenzhen => ".SZ",
            Exchange::Beijing => ".BJ",
            Exchange::HongKong => ".HK",
            Exchange::Us => ".US",
        }
    }
}

/// 数据源可识别的带后缀代码，如 600519.SH
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CanonicalCode(String);

impl CanonicalCode {
    pub(crate) fn new(code: String) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 最新成交快照
#[derive(Debug, Clone, Serialize)]
pub struct Quote {
    pub code: String,
    /// 数据源缺失的字段显示为 N/A
    pub price: Option<f64>,
    pub volume: Option<f64>,
    pub turnover: Option<f64>,
    /// 数据源毫秒时间戳，0 表示未提供
    pub timestamp_ms: i64,
    /// 北京时间墙上时钟
    pub time: Option<NaiveDateTime>,
}

impl Quote {
    pub fn display_price(&self) -> String {
        display_value(self.price)
    }

    pub fn display_volume(&self) -> String {
        display_value(self.volume)
    }

    pub fn display_turnover(&self) -> String {
        display_value(self.turnover)
    }

    pub fn display_time(&self) -> String {
        match self.time {
            Some(t) => t.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => "N/A".to_string(),
        }
    }
}

fn display_value(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{}", v),
        None => "N/A".to_string(),
    }
}
