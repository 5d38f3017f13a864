use crate::config::Config;
use crate::errors::{KlineError, Result};
use crate::fetchers::base::MarketDataFetcher;
use crate::models::kline::RawBar;
use crate::models::stock::{CanonicalCode, Quote};
use crate::util;
use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Mutex;
use std::time::Instant;

const RET_OK: i64 = 200;

/// 数据源统一响应外壳
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    ret: i64,
    msg: Option<String>,
    data: Option<Vec<T>>,
}

impl<T> Envelope<T> {
    /// 状态码只在这里检查，调用方只看到 Result
    fn into_data(self, what: &str, code: &CanonicalCode) -> Result<Vec<T>> {
        if self.ret != RET_OK {
            return Err(KlineError::FetchError(format!(
                "{} request for {} failed: ret={} msg={}",
                what,
                code,
                self.ret,
                self.msg.unwrap_or_default()
            )));
        }
        Ok(self.data.unwrap_or_default())
    }
}

#[derive(Debug, Deserialize)]
struct TradeItem {
    #[serde(default)]
    s: String,
    #[serde(default)]
    t: Value,
    #[serde(default)]
    p: Value,
    #[serde(default)]
    v: Value,
    #[serde(default)]
    vw: Value,
}

#[derive(Debug, Deserialize)]
struct KlineItem {
    #[serde(rename = "respList", default)]
    resp_list: Vec<RawBar>,
}

/// 解析最新成交响应
pub fn parse_quote_response(body: &str, code: &CanonicalCode) -> Result<Quote> {
    let envelope: Envelope<TradeItem> = serde_json::from_str(body)?;
    let item = envelope
        .into_data("quote", code)?
        .into_iter()
        .next()
        .ok_or_else(|| KlineError::FetchError(format!("No quote data for {}", code)))?;

    let timestamp_ms = util::parse_epoch(&item.t, "t").unwrap_or_default();
    let time = if timestamp_ms > 0 {
        util::epoch_millis_to_cst(timestamp_ms)
    } else {
        None
    };

    Ok(Quote {
        code: if item.s.is_empty() { code.to_string() } else { item.s },
        price: util::parse_decimal(&item.p, "p").ok(),
        volume: util::parse_decimal(&item.v, "v").ok(),
        turnover: util::parse_decimal(&item.vw, "vw").ok(),
        timestamp_ms,
        time,
    })
}

/// 解析K线响应，没有数据时返回空列表
pub fn parse_kline_response(body: &str, code: &CanonicalCode) -> Result<Vec<RawBar>> {
    let envelope: Envelope<KlineItem> = serde_json::from_str(body)?;
    let bars = envelope
        .into_data("kline", code)?
        .into_iter()
        .next()
        .map(|item| item.resp_list)
        .unwrap_or_default();
    Ok(bars)
}

/// infoway.io 行情数据抓取器
pub struct InfowayFetcher {
    client: Client,
    config: Config,
    last_request: Mutex<Option<Instant>>,
}

impl InfowayFetcher {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(KlineError::RequestError)?;

        Ok(Self {
            client,
            config,
            last_request: Mutex::new(None),
        })
    }

    /// 等待请求频率限制
    async fn wait_for_rate_limit(&self) {
        let min_interval = self.config.min_request_interval;

        let now = Instant::now();
        let should_wait = {
            // 锁中毒时沿用内部值，计时信息仍然有效
            let mut last = self.last_request.lock().unwrap_or_else(|e| e.into_inner());
            let should_wait = (*last)
                .map(|instant| instant.elapsed())
                .filter(|elapsed| *elapsed < min_interval)
                .map(|elapsed| min_interval - elapsed);
            *last = Some(now);
            should_wait
        };

        if let Some(wait_time) = should_wait {
            debug!("等待 {:?} 以遵守频率限制", wait_time);
            tokio::time::sleep(wait_time).await;
        }
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        self.wait_for_rate_limit().await;

        let response = self
            .client
            .get(url)
            .header("apikey", &self.config.api_token)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(KlineError::FetchError(format!("HTTP status {} from {}", status, url)));
        }
        Ok(text)
    }

    fn quote_url(&self, code: &CanonicalCode) -> String {
        format!("{}/batch_trade/{}", self.config.base_url, code)
    }

    fn kline_url(&self, code: &CanonicalCode, type_code: u32, count: usize) -> String {
        format!("{}/batch_kline/{}/{}/{}", self.config.base_url, type_code, count, code)
    }
}

#[async_trait]
impl MarketDataFetcher for InfowayFetcher {
    fn provider_name(&self) -> &'static str {
        "infoway"
    }

    async fn fetch_quote(&self, code: &CanonicalCode) -> Result<Quote> {
        debug!("获取 {} 的实时行情", code);
        let text = self.get_text(&self.quote_url(code)).await?;
        parse_quote_response(&text, code)
    }

    async fn fetch_kline(&self, code: &CanonicalCode, type_code: u32, count: usize) -> Result<Vec<RawBar>> {
        debug!("获取 {} 的K线数据, type={}, count={}", code, type_code, count);
        let text = self.get_text(&self.kline_url(code, type_code, count)).await?;
        let bars = parse_kline_response(&text, code)?;
        info!("获取到 {} 的 {} 条K线记录", code, bars.len());
        Ok(bars)
    }
}
