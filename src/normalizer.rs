use std::collections::BTreeMap;

use log::{debug, warn};

use crate::errors::{KlineError, Result};
use crate::models::kline::{Bar, RawBar, Series, SeriesPoint};
use crate::util;

pub const MA_WINDOWS: [usize; 3] = [5, 10, 20];

/// 将原始K线转换为有序、去重并带均线的序列
///
/// 单根K线解析失败只丢弃该根；全部失败时返回空序列。
pub fn normalize(raw_bars: &[RawBar]) -> Series {
    // 以 epoch 秒为键，后出现的覆盖先出现的，BTreeMap 保证升序
    let mut by_timestamp: BTreeMap<i64, Bar> = BTreeMap::new();
    let mut dropped = 0usize;

    for (i, raw) in raw_bars.iter().enumerate() {
        match parse_bar(raw) {
            Ok(bar) => {
                if !bar.is_consistent() {
                    debug!("Bar {} at {} violates OHLC ordering, kept as is", i, bar.time);
                }
                if by_timestamp.insert(bar.timestamp, bar).is_some() {
                    debug!("Duplicate timestamp at index {}, later bar wins", i);
                }
            }
            Err(e) => {
                dropped += 1;
                warn!("跳过第 {} 根K线: {}", i, e);
            }
        }
    }

    if dropped > 0 {
        warn!("{} of {} bars dropped during normalization", dropped, raw_bars.len());
    }

    let bars: Vec<Bar> = by_timestamp.into_values().collect();
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let ma5 = simple_moving_average(&closes, MA_WINDOWS[0]);
    let ma10 = simple_moving_average(&closes, MA_WINDOWS[1]);
    let ma20 = simple_moving_average(&closes, MA_WINDOWS[2]);

    let points = bars
        .into_iter()
        .enumerate()
        .map(|(i, bar)| SeriesPoint {
            bar,
            ma5: ma5[i],
            ma10: ma10[i],
            ma20: ma20[i],
        })
        .collect();

    Series::from_points(points)
}

/// 解析单根K线
pub fn parse_bar(raw: &RawBar) -> Result<Bar> {
    let timestamp = util::parse_epoch(&raw.t, "t")?;
    let time = util::epoch_seconds_to_cst(timestamp)
        .ok_or_else(|| KlineError::ParseError(format!("Timestamp out of range: {}", timestamp)))?;

    let volume = util::parse_decimal(&raw.v, "v")?;
    if volume < 0.0 {
        return Err(KlineError::ParseError(format!("Negative volume: {}", volume)));
    }

    Ok(Bar {
        time,
        timestamp,
        open: util::parse_decimal(&raw.o, "o")?,
        high: util::parse_decimal(&raw.h, "h")?,
        low: util::parse_decimal(&raw.l, "l")?,
        close: util::parse_decimal(&raw.c, "c")?,
        volume,
    })
}

/// 简单移动平均，前 window-1 个位置没有值
pub fn simple_moving_average(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; values.len()];
    if window == 0 || values.len() < window {
        return result;
    }

    for (i, slice) in values.windows(window).enumerate() {
        result[i + window - 1] = Some(window_mean(slice));
    }

    result
}

/// 窗口内取值全相同时原样返回，否则用 Kahan 补偿求和
fn window_mean(window: &[f64]) -> f64 {
    let first = window[0];
    if window.iter().all(|&v| v == first) {
        return first;
    }

    let mut sum = 0.0;
    let mut compensation = 0.0;
    for &v in window {
        let y = v - compensation;
        let t = sum + y;
        compensation = (t - sum) - y;
        sum = t;
    }
    sum / window.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::{json, Value};

    fn raw(t: Value, o: Value, h: Value, l: Value, c: Value, v: Value) -> RawBar {
        RawBar { t, o, h, l, c, v }
    }

    fn flat(t: i64, close: f64) -> RawBar {
        raw(json!(t), json!(close), json!(close), json!(close), json!(close), json!(1))
    }

    fn approx(a: Option<f64>, b: f64) -> bool {
        a.map(|a| (a - b).abs() < 1e-9).unwrap_or(false)
    }

    #[test]
    fn test_empty_input() {
        assert!(normalize(&[]).is_empty());
    }

    #[test]
    fn test_single_bar() {
        let series = normalize(&[raw(json!(0), json!(10), json!(12), json!(9), json!(11), json!(100))]);
        assert_eq!(series.len(), 1);

        let point = &series.points()[0];
        assert_eq!(point.bar.close, 11.0);
        assert_eq!(point.bar.volume, 100.0);
        assert_eq!(
            point.bar.time,
            NaiveDate::from_ymd_opt(1970, 1, 1).unwrap().and_hms_opt(8, 0, 0).unwrap()
        );
        assert_eq!((point.ma5, point.ma10, point.ma20), (None, None, None));
    }

    #[test]
    fn test_string_fields_are_accepted() {
        let series = normalize(&[raw(
            json!("1704159000"),
            json!("1700.00"),
            json!("1712.5"),
            json!("1695"),
            json!("1710.01"),
            json!("2300"),
        )]);
        assert_eq!(series.len(), 1);
        assert_eq!(series.points()[0].bar.high, 1712.5);
    }

    #[test]
    fn test_duplicate_timestamp_keeps_later_values() {
        let series = normalize(&[
            raw(json!(60), json!(1), json!(2), json!(1), json!(2), json!(10)),
            raw(json!(60), json!(5), json!(6), json!(4), json!(5), json!(20)),
        ]);
        assert_eq!(series.len(), 1);
        assert_eq!(series.points()[0].bar.close, 5.0);
        assert_eq!(series.points()[0].bar.volume, 20.0);
    }

    #[test]
    fn test_output_sorted_and_unique() {
        let input: Vec<RawBar> = [300, 60, 180, 60, 120, 300, 0]
            .iter()
            .map(|&t| flat(t, t as f64))
            .collect();
        let series = normalize(&input);

        let stamps: Vec<i64> = series.points().iter().map(|p| p.bar.timestamp).collect();
        assert_eq!(stamps, vec![0, 60, 120, 180, 300]);
        assert!(series.points().windows(2).all(|w| w[0].bar.time < w[1].bar.time));
    }

    #[test]
    fn test_malformed_bar_is_dropped() {
        let series = normalize(&[
            flat(60, 10.0),
            raw(json!(120), json!("n/a"), json!(1), json!(1), json!(1), json!(1)),
            raw(json!(180), json!(1), json!(1), json!(1), json!(1), json!(-5)),
            raw(Value::Null, json!(1), json!(1), json!(1), json!(1), json!(1)),
            flat(240, 12.0),
        ]);
        let stamps: Vec<i64> = series.points().iter().map(|p| p.bar.timestamp).collect();
        assert_eq!(stamps, vec![60, 240]);
    }

    #[test]
    fn test_all_malformed_yields_empty() {
        let series = normalize(&[
            raw(json!("x"), json!(1), json!(1), json!(1), json!(1), json!(1)),
            RawBar::default(),
        ]);
        assert!(series.is_empty());
    }

    #[test]
    fn test_inconsistent_ohlc_is_tolerated() {
        let series = normalize(&[raw(json!(0), json!(10), json!(5), json!(20), json!(11), json!(1))]);
        assert_eq!(series.len(), 1);
        assert!(!series.points()[0].bar.is_consistent());
    }

    #[test]
    fn test_constant_close_moving_averages() {
        let input: Vec<RawBar> = (0..25).map(|i| flat(i * 60, 7.25)).collect();
        let series = normalize(&input);
        let points = series.points();

        assert!(points[3].ma5.is_none());
        assert_eq!(points[4].ma5, Some(7.25));
        assert!(points[8].ma10.is_none());
        assert_eq!(points[9].ma10, Some(7.25));
        assert!(points[18].ma20.is_none());
        assert_eq!(points[19].ma20, Some(7.25));
    }

    #[test]
    fn test_flat_prices_average_exactly() {
        for &p in &[0.1, 0.3, 0.7, 1.1, 3.3, 7.77, 12.34, 99.99, 1234.56, 1700.01] {
            let input: Vec<RawBar> = (0..40).map(|i| flat(i * 60, p)).collect();
            let series = normalize(&input);
            for point in series.points().iter().skip(19) {
                assert_eq!(point.ma5, Some(p), "MA5 of flat {}", p);
                assert_eq!(point.ma10, Some(p), "MA10 of flat {}", p);
                assert_eq!(point.ma20, Some(p), "MA20 of flat {}", p);
            }
        }
    }

    #[test]
    fn test_moving_average_recovers_after_price_change() {
        // 价格跳变后窗口重新变平，均线回到精确值
        let closes: Vec<f64> = (0..15).map(|i| if i < 5 { 100.0 } else { 0.1 }).collect();
        let result = simple_moving_average(&closes, 5);
        assert!(approx(result[6], (300.0 + 0.2) / 5.0));
        assert_eq!(result[9], Some(0.1));
        assert_eq!(result[14], Some(0.1));
    }

    #[test]
    fn test_cst_is_fixed_utc_plus_eight() {
        // 1988-09-10 16:30Z 与 17:30Z 相隔一小时，横轴时间也应相隔一小时
        let series = normalize(&[flat(589_912_200, 1.0), flat(589_915_800, 2.0)]);
        let times: Vec<_> = series.points().iter().map(|p| p.bar.time).collect();

        let day = NaiveDate::from_ymd_opt(1988, 9, 11).unwrap();
        assert_eq!(times, vec![day.and_hms_opt(0, 30, 0).unwrap(), day.and_hms_opt(1, 30, 0).unwrap()]);
    }

    #[test]
    fn test_moving_average_uses_sorted_order() {
        // 乱序输入，均线按时间升序计算
        let input = vec![flat(240, 5.0), flat(0, 1.0), flat(180, 4.0), flat(60, 2.0), flat(120, 3.0)];
        let series = normalize(&input);
        assert!(approx(series.points()[4].ma5, 3.0));
    }

    #[test]
    fn test_simple_moving_average_rolling() {
        let result = simple_moving_average(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);
        assert_eq!(result[0], None);
        assert_eq!(result[1], None);
        assert!(approx(result[2], 2.0));
        assert!(approx(result[3], 3.0));
        assert!(approx(result[4], 4.0));
        assert!(simple_moving_average(&[1.0, 2.0], 5).iter().all(Option::is_none));
        assert!(simple_moving_average(&[1.0], 0).iter().all(Option::is_none));
    }
}
