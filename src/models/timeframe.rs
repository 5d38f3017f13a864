use crate::errors::{KlineError, Result};
use serde::Serialize;
use std::str::FromStr;

/// K线周期
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Timeframe {
    M1,
    M5,
    M15,
    M30,
    H1,
    Daily,
    Weekly,
    Monthly,
}

/// 粒度类别，决定适用的交易时段断档
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Granularity {
    Intraday,
    Daily,
    Weekly,
    Monthly,
}

#[derive(Debug, PartialEq, Eq)]
pub struct TimeframeEntry {
    pub timeframe: Timeframe,
    /// 命令行使用的标签
    pub label: &'static str,
    /// 看板显示名称
    pub display: &'static str,
    pub aliases: &'static [&'static str],
    /// 数据源 kline type 代码
    pub provider_type_code: u32,
    pub granularity: Granularity,
}

impl TimeframeEntry {
    fn matches(&self, label: &str) -> bool {
        // 1m 与 1M 不能大小写折叠，月K使用 1mo
        label == self.label
            || label == self.display
            || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(label))
    }
}

pub static CATALOG: [TimeframeEntry; 8] = [
    TimeframeEntry { timeframe: Timeframe::M1, label: "1m", display: "1分钟", aliases: &[], provider_type_code: 1, granularity: Granularity::Intraday },
    TimeframeEntry { timeframe: Timeframe::M5, label: "5m", display: "5分钟", aliases: &[], provider_type_code: 2, granularity: Granularity::Intraday },
    TimeframeEntry { timeframe: Timeframe::M15, label: "15m", display: "15分钟", aliases: &[], provider_type_code: 3, granularity: Granularity::Intraday },
    TimeframeEntry { timeframe: Timeframe::M30, label: "30m", display: "30分钟", aliases: &[], provider_type_code: 4, granularity: Granularity::Intraday },
    TimeframeEntry { timeframe: Timeframe::H1, label: "1h", display: "1小时", aliases: &["60m"], provider_type_code: 5, granularity: Granularity::Intraday },
    TimeframeEntry { timeframe: Timeframe::Daily, label: "1d", display: "日K", aliases: &["daily", "day"], provider_type_code: 8, granularity: Granularity::Daily },
    TimeframeEntry { timeframe: Timeframe::Weekly, label: "1w", display: "周K", aliases: &["weekly", "week"], provider_type_code: 9, granularity: Granularity::Weekly },
    TimeframeEntry { timeframe: Timeframe::Monthly, label: "1mo", display: "月K", aliases: &["monthly", "month"], provider_type_code: 10, granularity: Granularity::Monthly },
];

/// 根据标签查找周期定义
pub fn resolve(label: &str) -> Result<&'static TimeframeEntry> {
    let label = label.trim();
    CATALOG
        .iter()
        .find(|entry| entry.matches(label))
        .ok_or_else(|| KlineError::UnknownTimeframe(label.to_string()))
}

impl Timeframe {
    pub fn entry(&self) -> &'static TimeframeEntry {
        // 表与枚举一一对应，顺序相同
        &CATALOG[*self as usize]
    }

    pub fn provider_type_code(&self) -> u32 {
        self.entry().provider_type_code
    }

    pub fn granularity(&self) -> Granularity {
        self.entry().granularity
    }

    pub fn label(&self) -> &'static str {
        self.entry().label
    }

    pub fn display_name(&self) -> &'static str {
        self.entry().display
    }
}

impl FromStr for Timeframe {
    type Err = KlineError;

    fn from_str(s: &str) -> Result<Self> {
        resolve(s).map(|entry| entry.timeframe)
    }
}
