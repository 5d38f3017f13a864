//! 交易时段断档模型
//!
//! 断档只取决于市场区域与K线粒度，与抓取到的数据无关，
//! 因此全部以静态表给出，调用方可以任意复用。

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};

use crate::models::stock::Region;
use crate::models::timeframe::Granularity;

/// 一天中的时刻，精确到分钟
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ClockTime {
    minutes: u16,
}

impl ClockTime {
    pub const MIDNIGHT: ClockTime = ClockTime::hm(0, 0);
    const DAY_MINUTES: u16 = 24 * 60;

    pub const fn hm(hour: u16, minute: u16) -> Self {
        Self { minutes: hour * 60 + minute }
    }

    pub fn of(t: &NaiveDateTime) -> Self {
        Self::hm(t.hour() as u16, t.minute() as u16)
    }

    pub fn minutes(&self) -> u16 {
        self.minutes
    }

    /// 小时数形式，如 11:30 -> 11.5
    pub fn as_hours(&self) -> f64 {
        self.minutes as f64 / 60.0
    }
}

/// 半开区间 [start, end) 的非交易时段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionGap {
    /// 每日重复，end 早于 start 时跨越午夜
    Daily {
        name: &'static str,
        start: ClockTime,
        end: ClockTime,
    },
    /// 每周重复，从 start 当日 00:00 到 end 当日 00:00
    Weekly {
        name: &'static str,
        start: Weekday,
        end: Weekday,
    },
}

impl SessionGap {
    pub fn name(&self) -> &'static str {
        match self {
            SessionGap::Daily { name, .. } | SessionGap::Weekly { name, .. } => *name,
        }
    }

    pub fn wraps_midnight(&self) -> bool {
        matches!(self, SessionGap::Daily { start, end, .. } if end < start)
    }

    pub fn contains(&self, t: &NaiveDateTime) -> bool {
        match self {
            SessionGap::Daily { start, end, .. } => {
                in_cyclic_range(ClockTime::of(t).minutes, start.minutes, end.minutes)
            }
            SessionGap::Weekly { start, end, .. } => in_cyclic_range(
                t.weekday().num_days_from_monday(),
                start.num_days_from_monday(),
                end.num_days_from_monday(),
            ),
        }
    }

    /// 拆成不跨越午夜的同日区间，供不支持环绕区间的渲染端使用
    pub fn segments(&self) -> Vec<(ClockTime, ClockTime)> {
        match *self {
            SessionGap::Daily { start, end, .. } if end < start => {
                let day_end = ClockTime { minutes: ClockTime::DAY_MINUTES };
                let mut parts = vec![(start, day_end)];
                if end > ClockTime::MIDNIGHT {
                    parts.push((ClockTime::MIDNIGHT, end));
                }
                parts
            }
            SessionGap::Daily { start, end, .. } => vec![(start, end)],
            SessionGap::Weekly { .. } => Vec::new(),
        }
    }
}

/// 环形区间判断，start > end 表示跨越零点
fn in_cyclic_range<T: PartialOrd>(value: T, start: T, end: T) -> bool {
    if start <= end {
        start <= value && value < end
    } else {
        value >= start || value < end
    }
}

const LUNCH_BREAK: SessionGap = SessionGap::Daily {
    name: "lunch",
    start: ClockTime::hm(11, 30),
    end: ClockTime::hm(13, 0),
};

const OVERNIGHT: SessionGap = SessionGap::Daily {
    name: "overnight",
    start: ClockTime::hm(15, 0),
    end: ClockTime::hm(9, 30),
};

const WEEKEND: SessionGap = SessionGap::Weekly {
    name: "weekend",
    start: Weekday::Sat,
    end: Weekday::Mon,
};

static DOMESTIC_INTRADAY: [SessionGap; 3] = [LUNCH_BREAK, OVERNIGHT, WEEKEND];
static DOMESTIC_DAILY: [SessionGap; 1] = [WEEKEND];

/// 某一区域与粒度下的全部断档
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionGapSet {
    pub region: Region,
    pub granularity: Granularity,
    gaps: &'static [SessionGap],
}

impl SessionGapSet {
    pub fn as_slice(&self) -> &'static [SessionGap] {
        self.gaps
    }

    pub fn len(&self) -> usize {
        self.gaps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gaps.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static SessionGap> {
        self.gaps.iter()
    }

    /// 时刻是否落在任一断档内
    pub fn is_excluded(&self, t: &NaiveDateTime) -> bool {
        self.gaps.iter().any(|gap| gap.contains(t))
    }
}

/// 计算图表时间轴需要压缩掉的时段
///
/// 只有A股需要断档：分钟/小时线去掉午休、隔夜和周末，日线只去掉周末；
/// 周线、月线以及港股美股保持连续时间轴。
pub fn gaps(region: Region, granularity: Granularity) -> SessionGapSet {
    let gaps: &'static [SessionGap] = match (region, granularity) {
        (Region::Domestic, Granularity::Intraday) => &DOMESTIC_INTRADAY,
        (Region::Domestic, Granularity::Daily) => &DOMESTIC_DAILY,
        _ => &[],
    };

    SessionGapSet {
        region,
        granularity,
        gaps,
    }
}
