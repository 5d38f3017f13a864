use chrono::{FixedOffset, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

use crate::errors::{KlineError, Result};

/// 北京时间，固定 UTC+8，不套用历史夏令时
const CST_OFFSET_SECS: i32 = 8 * 3600;

// 时间转换工具：数据源时间戳均为 UTC，图表需要北京时间墙上时钟
pub fn epoch_seconds_to_cst(secs: i64) -> Option<NaiveDateTime> {
    let cst = FixedOffset::east_opt(CST_OFFSET_SECS)?;
    Utc.timestamp_opt(secs, 0)
        .single()
        .map(|dt| dt.with_timezone(&cst).naive_local())
}

pub fn epoch_millis_to_cst(millis: i64) -> Option<NaiveDateTime> {
    let cst = FixedOffset::east_opt(CST_OFFSET_SECS)?;
    Utc.timestamp_millis_opt(millis)
        .single()
        .map(|dt| dt.with_timezone(&cst).naive_local())
}

/// 解析价格/数量字段，兼容数字与字符串
pub fn parse_decimal(value: &Value, field: &str) -> Result<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', "").parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(KlineError::ParseError(format!("Invalid {} value: {}", field, value))),
    }
}

/// 解析整数时间戳字段
pub fn parse_epoch(value: &Value, field: &str) -> Result<i64> {
    let parsed = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };

    parsed.ok_or_else(|| KlineError::ParseError(format!("Invalid {} value: {}", field, value)))
}
