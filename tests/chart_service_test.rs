use async_trait::async_trait;
use egostrategy_kline::chart::{BreakStyle, RangeBounds};
use egostrategy_kline::config::Config;
use egostrategy_kline::fetchers::base::MarketDataFetcher;
use egostrategy_kline::services::chart_service::{ChartPanel, ChartRequest, ChartService};
use egostrategy_kline::{CanonicalCode, KlineError, Quote, RawBar, Region, Result, Timeframe};
use serde_json::json;
use std::sync::{Arc, Mutex};

/// 内存数据源，记录收到的请求
struct FakeFetcher {
    quote_ok: bool,
    bars: std::result::Result<Vec<RawBar>, String>,
    calls: Mutex<Vec<String>>,
}

impl FakeFetcher {
    fn new(bars: Vec<RawBar>) -> Self {
        Self {
            quote_ok: true,
            bars: Ok(bars),
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl MarketDataFetcher for FakeFetcher {
    fn provider_name(&self) -> &'static str {
        "fake"
    }

    async fn fetch_quote(&self, code: &CanonicalCode) -> Result<Quote> {
        self.calls.lock().unwrap().push(format!("quote {}", code));
        if !self.quote_ok {
            return Err(KlineError::FetchError("quote unavailable".to_string()));
        }
        Ok(Quote {
            code: code.to_string(),
            price: Some(1700.0),
            volume: Some(100.0),
            turnover: Some(170000.0),
            timestamp_ms: 1_704_159_000_000,
            time: None,
        })
    }

    async fn fetch_kline(&self, code: &CanonicalCode, type_code: u32, count: usize) -> Result<Vec<RawBar>> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("kline {} {} {}", code, type_code, count));
        self.bars.clone().map_err(KlineError::FetchError)
    }
}

fn raw(t: i64, o: f64, c: f64) -> RawBar {
    RawBar {
        t: json!(t),
        o: json!(o.to_string()),
        h: json!(o.max(c) + 0.5),
        l: json!(o.min(c) - 0.5),
        c: json!(c.to_string()),
        v: json!(1000),
    }
}

fn service(fetcher: Arc<FakeFetcher>) -> ChartService {
    ChartService::new(Config::new().with_api_token("test").with_kline_count(120), fetcher)
}

#[tokio::test]
async fn refresh_builds_domestic_intraday_chart() {
    // 2024-01-02 09:31 起的分钟线，倒序且含一条重复
    let base = 1_704_159_060;
    let mut bars: Vec<RawBar> = (0..30).rev().map(|i| raw(base + i * 60, 10.0, 10.0 + i as f64 * 0.1)).collect();
    bars.push(raw(base, 9.0, 8.0));

    let fetcher = Arc::new(FakeFetcher::new(bars));
    let dashboard = service(fetcher.clone())
        .refresh(&ChartRequest::new("600519", Region::Domestic, Timeframe::M5))
        .await
        .unwrap();

    assert_eq!(dashboard.code.as_str(), "600519.SH");
    assert!(dashboard.quote.is_ok());
    assert_eq!(dashboard.series.len(), 30);
    assert_eq!(dashboard.series.points()[0].bar.close, 8.0);

    let calls = fetcher.calls.lock().unwrap().clone();
    assert_eq!(calls, vec!["quote 600519.SH", "kline 600519.SH 2 120"]);

    match dashboard.chart {
        ChartPanel::Ready(spec) => {
            assert_eq!(spec.title.as_deref(), Some("600519.SH (5分钟)"));
            assert_eq!(spec.x_axis.rangebreaks.len(), 3);
            assert_eq!(spec.candles.points.len(), 30);
            assert_eq!(spec.overlays[2].points.len(), 11);
            assert_eq!(spec.volume.bars[0].color, "green");
        }
        other => panic!("expected chart, got {:?}", other),
    }
}

#[tokio::test]
async fn refresh_hong_kong_daily_has_continuous_axis() {
    let fetcher = Arc::new(FakeFetcher::new(vec![raw(1_704_153_600, 300.0, 305.0)]));
    let dashboard = service(fetcher.clone())
        .refresh(&ChartRequest::new("00700", Region::HongKong, Timeframe::Daily))
        .await
        .unwrap();

    assert_eq!(dashboard.code.as_str(), "00700.HK");
    match dashboard.chart {
        ChartPanel::Ready(spec) => assert!(spec.x_axis.rangebreaks.is_empty()),
        other => panic!("expected chart, got {:?}", other),
    }
    assert_eq!(fetcher.calls.lock().unwrap()[1], "kline 00700.HK 8 120");
}

#[tokio::test]
async fn refresh_can_split_overnight_break() {
    let fetcher = Arc::new(FakeFetcher::new(vec![raw(1_704_159_060, 10.0, 10.5)]));
    let request = ChartRequest::new("600519", Region::Domestic, Timeframe::M1).with_break_style(BreakStyle::SameDay);
    let dashboard = service(fetcher).refresh(&request).await.unwrap();

    match dashboard.chart {
        ChartPanel::Ready(spec) => {
            let breaks = &spec.x_axis.rangebreaks;
            assert_eq!(breaks.len(), 4);
            assert_eq!(breaks[1].bounds, RangeBounds::Hours([15.0, 24.0]));
            assert_eq!(breaks[2].bounds, RangeBounds::Hours([0.0, 9.5]));
        }
        other => panic!("expected chart, got {:?}", other),
    }
}

#[tokio::test]
async fn refresh_without_bars_reports_empty_state() {
    let fetcher = Arc::new(FakeFetcher::new(vec![RawBar::default()]));
    let dashboard = service(fetcher)
        .refresh(&ChartRequest::new("aapl", Region::Us, Timeframe::Weekly))
        .await
        .unwrap();

    assert!(dashboard.series.is_empty());
    assert!(matches!(dashboard.chart, ChartPanel::Empty));
}

#[tokio::test]
async fn quote_failure_does_not_block_chart() {
    let mut fetcher = FakeFetcher::new(vec![raw(1_704_153_600, 1.0, 2.0)]);
    fetcher.quote_ok = false;
    let dashboard = service(Arc::new(fetcher))
        .refresh(&ChartRequest::new("000001", Region::Domestic, Timeframe::Daily))
        .await
        .unwrap();

    let err = dashboard.quote.unwrap_err();
    assert!(err.is_retryable());
    assert!(matches!(dashboard.chart, ChartPanel::Ready(_)));
}

#[tokio::test]
async fn kline_failure_is_surfaced_on_panel() {
    let mut fetcher = FakeFetcher::new(Vec::new());
    fetcher.bars = Err("ret=500".to_string());
    let dashboard = service(Arc::new(fetcher))
        .refresh(&ChartRequest::new("300750", Region::Domestic, Timeframe::H1))
        .await
        .unwrap();

    match dashboard.chart {
        ChartPanel::Failed(e) => assert!(e.is_retryable()),
        other => panic!("expected failure, got {:?}", other),
    }
}

#[tokio::test]
async fn missing_token_aborts_refresh() {
    let fetcher = Arc::new(FakeFetcher::new(Vec::new()));
    let service = ChartService::new(Config::new(), fetcher.clone());

    let result = service
        .refresh(&ChartRequest::new("600519", Region::Domestic, Timeframe::Daily))
        .await;

    assert!(matches!(result, Err(KlineError::ConfigError(_))));
    assert!(fetcher.calls.lock().unwrap().is_empty());
}
