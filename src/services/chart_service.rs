use crate::chart::{self, BreakStyle, ChartSpec};
use crate::config::Config;
use crate::errors::{KlineError, Result};
use crate::fetchers::base::MarketDataFetcher;
use crate::models::kline::Series;
use crate::models::stock::{CanonicalCode, Quote, Region};
use crate::models::timeframe::Timeframe;
use crate::normalizer;
use crate::session;
use crate::symbol;
use log::{info, warn};
use std::sync::Arc;

/// 一次刷新的用户输入
#[derive(Debug, Clone)]
pub struct ChartRequest {
    pub raw_code: String,
    pub region: Region,
    pub timeframe: Timeframe,
    pub break_style: BreakStyle,
}

impl ChartRequest {
    pub fn new(raw_code: &str, region: Region, timeframe: Timeframe) -> Self {
        Self {
            raw_code: raw_code.to_string(),
            region,
            timeframe,
            break_style: BreakStyle::default(),
        }
    }

    pub fn with_break_style(mut self, break_style: BreakStyle) -> Self {
        self.break_style = break_style;
        self
    }
}

/// K线面板状态
#[derive(Debug)]
pub enum ChartPanel {
    Ready(ChartSpec),
    /// 暂无K线数据
    Empty,
    Failed(KlineError),
}

/// 一次刷新的结果：行情面板与K线面板互不影响
#[derive(Debug)]
pub struct Dashboard {
    pub code: CanonicalCode,
    pub timeframe: Timeframe,
    pub quote: Result<Quote>,
    pub series: Series,
    pub chart: ChartPanel,
}

/// 行情看板服务，串联代码规范化、抓取、标准化和图表组装
pub struct ChartService {
    config: Config,
    fetcher: Arc<dyn MarketDataFetcher + Send + Sync>,
}

impl ChartService {
    pub fn new(config: Config, fetcher: Arc<dyn MarketDataFetcher + Send + Sync>) -> Self {
        Self { config, fetcher }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 只抓取最新行情
    pub async fn fetch_quote(&self, raw_code: &str, region: Region) -> Result<Quote> {
        self.config.validate()?;
        let code = symbol::format_code(raw_code, region);
        self.fetcher.fetch_quote(&code).await
    }

    /// 刷新行情与K线；只有配置错误会中止整个刷新
    pub async fn refresh(&self, request: &ChartRequest) -> Result<Dashboard> {
        self.config.validate()?;

        let code = symbol::format_code(&request.raw_code, request.region);
        info!(
            "正在获取 {} 数据 ({}, {})",
            code,
            self.fetcher.provider_name(),
            request.timeframe.display_name()
        );

        let quote = self.fetcher.fetch_quote(&code).await;
        if let Err(e) = &quote {
            warn!("获取行情失败 {}: {}", code, e);
        }

        let entry = request.timeframe.entry();
        let (series, chart) = match self
            .fetcher
            .fetch_kline(&code, entry.provider_type_code, self.config.kline_count)
            .await
        {
            Ok(raw_bars) => {
                let series = normalizer::normalize(&raw_bars);
                let gaps = session::gaps(request.region, entry.granularity);
                let title = format!("{} ({})", code, entry.display);
                let chart = match chart::assemble_with(&series, &gaps, request.break_style) {
                    Ok(spec) => ChartPanel::Ready(spec.with_title(&title)),
                    Err(KlineError::EmptySeries(_)) => {
                        info!("暂无K线数据: {}", code);
                        ChartPanel::Empty
                    }
                    Err(e) => ChartPanel::Failed(e),
                };
                (series, chart)
            }
            Err(e) => {
                warn!("获取K线失败 {}: {}", code, e);
                (Series::default(), ChartPanel::Failed(e))
            }
        };

        Ok(Dashboard {
            code,
            timeframe: request.timeframe,
            quote,
            series,
            chart,
        })
    }
}
