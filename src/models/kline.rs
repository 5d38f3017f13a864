use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 数据源返回的原始K线，价格可能是字符串也可能是数字
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawBar {
    #[serde(default)]
    pub t: Value,
    #[serde(default)]
    pub o: Value,
    #[serde(default)]
    pub h: Value,
    #[serde(default)]
    pub l: Value,
    #[serde(default)]
    pub c: Value,
    #[serde(default)]
    pub v: Value,
}

/// 标准化后的K线
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    /// 北京时间墙上时钟，不带时区
    pub time: NaiveDateTime,
    /// 数据源原始 epoch 秒
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// 收盘不低于开盘视为上涨
    pub fn is_up(&self) -> bool {
        self.close >= self.open
    }

    /// high >= max(open, close) >= min(open, close) >= low
    pub fn is_consistent(&self) -> bool {
        self.high >= self.open.max(self.close) && self.open.min(self.close) >= self.low
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    #[serde(flatten)]
    pub bar: Bar,
    pub ma5: Option<f64>,
    pub ma10: Option<f64>,
    pub ma20: Option<f64>,
}

/// 按时间升序、时间戳唯一的K线序列
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Series {
    points: Vec<SeriesPoint>,
}

impl Series {
    pub(crate) fn from_points(points: Vec<SeriesPoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// 最近 n 根
    pub fn tail(&self, n: usize) -> &[SeriesPoint] {
        let start = self.points.len().saturating_sub(n);
        &self.points[start..]
    }
}
