use chrono::{NaiveDateTime, Weekday};
use serde::Serialize;
use std::path::Path;

use crate::errors::{KlineError, Result};
use crate::models::kline::{Series, SeriesPoint};
use crate::session::{SessionGap, SessionGapSet};

// A股习惯：红涨绿跌
pub const UP_COLOR: &str = "red";
pub const DOWN_COLOR: &str = "green";

const MA_STYLES: [(&str, &str); 3] = [("MA5", "orange"), ("MA10", "blue"), ("MA20", "purple")];

/// 交给渲染端的图表描述
#[derive(Debug, Clone, Serialize)]
pub struct ChartSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub candles: CandleLayer,
    pub overlays: Vec<LineOverlay>,
    pub volume: VolumeLayer,
    pub x_axis: AxisSpec,
    pub layout: LayoutSpec,
}

#[derive(Debug, Clone, Serialize)]
pub struct CandleLayer {
    pub name: &'static str,
    pub increasing_color: &'static str,
    pub decreasing_color: &'static str,
    pub points: Vec<Candle>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candle {
    pub time: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LineOverlay {
    pub name: &'static str,
    pub color: &'static str,
    pub width: u32,
    pub points: Vec<LinePoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinePoint {
    pub time: NaiveDateTime,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct VolumeLayer {
    pub name: &'static str,
    pub bars: Vec<VolumeBar>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeBar {
    pub time: NaiveDateTime,
    pub volume: f64,
    pub color: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct AxisSpec {
    pub rangeslider_visible: bool,
    pub rangebreaks: Vec<RangeBreak>,
}

/// 时间轴压缩指令，环绕午夜的时段直接以 [15, 9.5] 这样的边界表示
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeBreak {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<&'static str>,
    pub bounds: RangeBounds,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RangeBounds {
    Hours([f64; 2]),
    Weekdays([&'static str; 2]),
}

/// 跨午夜断档的输出方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BreakStyle {
    /// 单个环绕区间，如 [15, 9.5]
    #[default]
    Wraparound,
    /// 拆成 [15, 24] 与 [0, 9.5] 两段同日区间
    SameDay,
}

#[derive(Debug, Clone, Serialize)]
pub struct LayoutSpec {
    pub height: u32,
    pub row_heights: [f64; 2],
    pub vertical_spacing: f64,
    pub show_legend: bool,
}

impl Default for LayoutSpec {
    fn default() -> Self {
        Self {
            height: 600,
            row_heights: [0.7, 0.3],
            vertical_spacing: 0.05,
            show_legend: true,
        }
    }
}

impl From<&SessionGap> for RangeBreak {
    fn from(gap: &SessionGap) -> Self {
        match gap {
            SessionGap::Daily { start, end, .. } => RangeBreak {
                pattern: Some("hour"),
                bounds: RangeBounds::Hours([start.as_hours(), end.as_hours()]),
            },
            SessionGap::Weekly { start, end, .. } => RangeBreak {
                pattern: None,
                bounds: RangeBounds::Weekdays([weekday_abbr(*start), weekday_abbr(*end)]),
            },
        }
    }
}

fn range_breaks(gaps: &SessionGapSet, style: BreakStyle) -> Vec<RangeBreak> {
    let mut breaks = Vec::with_capacity(gaps.len());
    for gap in gaps.iter() {
        match (style, gap) {
            (BreakStyle::SameDay, SessionGap::Daily { .. }) => {
                breaks.extend(gap.segments().into_iter().map(|(start, end)| RangeBreak {
                    pattern: Some("hour"),
                    bounds: RangeBounds::Hours([start.as_hours(), end.as_hours()]),
                }));
            }
            _ => breaks.push(RangeBreak::from(gap)),
        }
    }
    breaks
}

fn weekday_abbr(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "mon",
        Weekday::Tue => "tue",
        Weekday::Wed => "wed",
        Weekday::Thu => "thu",
        Weekday::Fri => "fri",
        Weekday::Sat => "sat",
        Weekday::Sun => "sun",
    }
}

/// 由序列和断档生成图表描述，不修改输入
pub fn assemble(series: &Series, gaps: &SessionGapSet) -> Result<ChartSpec> {
    assemble_with(series, gaps, BreakStyle::Wraparound)
}

pub fn assemble_with(series: &Series, gaps: &SessionGapSet, style: BreakStyle) -> Result<ChartSpec> {
    if series.is_empty() {
        return Err(KlineError::EmptySeries("series has no bars".to_string()));
    }

    let points = series.points();

    let candles = points
        .iter()
        .map(|p| Candle {
            time: p.bar.time,
            open: p.bar.open,
            high: p.bar.high,
            low: p.bar.low,
            close: p.bar.close,
        })
        .collect();

    let selectors: [fn(&SeriesPoint) -> Option<f64>; 3] =
        [|p: &SeriesPoint| p.ma5, |p: &SeriesPoint| p.ma10, |p: &SeriesPoint| p.ma20];
    let overlays = MA_STYLES
        .iter()
        .zip(selectors)
        .map(|(&(name, color), select)| LineOverlay {
            name,
            color,
            width: 1,
            points: points
                .iter()
                .filter_map(|p| select(p).map(|value| LinePoint { time: p.bar.time, value }))
                .collect(),
        })
        .collect();

    let bars = points
        .iter()
        .map(|p| VolumeBar {
            time: p.bar.time,
            volume: p.bar.volume,
            color: if p.bar.is_up() { UP_COLOR } else { DOWN_COLOR },
        })
        .collect();

    Ok(ChartSpec {
        title: None,
        candles: CandleLayer {
            name: "K线",
            increasing_color: UP_COLOR,
            decreasing_color: DOWN_COLOR,
            points: candles,
        },
        overlays,
        volume: VolumeLayer { name: "成交量", bars },
        x_axis: AxisSpec {
            rangeslider_visible: false,
            rangebreaks: range_breaks(gaps, style),
        },
        layout: LayoutSpec::default(),
    })
}

impl ChartSpec {
    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
