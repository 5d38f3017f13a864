use crate::errors::{KlineError, Result};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://data.infoway.io/stock";
pub const DEFAULT_KLINE_COUNT: usize = 500;

pub const ENV_API_TOKEN: &str = "INFOWAY_API_TOKEN";
pub const ENV_BASE_URL: &str = "INFOWAY_BASE_URL";

/// 行情数据源配置，显式传入抓取器，不使用全局变量
#[derive(Debug, Clone)]
pub struct Config {
    pub api_token: String,
    pub base_url: String,
    pub kline_count: usize,
    pub request_timeout: Duration,
    pub min_request_interval: Duration,
}

impl Config {
    pub fn new() -> Self {
        Self {
            api_token: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            // 500根足够覆盖约两年日线或约8小时分钟线
            kline_count: DEFAULT_KLINE_COUNT,
            request_timeout: Duration::from_secs(30),
            min_request_interval: Duration::from_millis(500),
        }
    }

    /// 从环境变量读取 token 与地址，未设置的保持默认值
    pub fn from_env() -> Self {
        let mut config = Self::new();
        if let Ok(token) = std::env::var(ENV_API_TOKEN) {
            config = config.with_api_token(&token);
        }
        if let Ok(url) = std::env::var(ENV_BASE_URL) {
            config = config.with_base_url(&url);
        }
        config
    }

    pub fn with_api_token(mut self, token: &str) -> Self {
        self.api_token = token.trim().to_string();
        self
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_kline_count(mut self, count: usize) -> Self {
        self.kline_count = count;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_min_request_interval(mut self, interval: Duration) -> Self {
        self.min_request_interval = interval;
        self
    }

    /// 发起请求前的检查
    pub fn validate(&self) -> Result<()> {
        if self.api_token.is_empty() {
            return Err(KlineError::ConfigError(format!(
                "API token is empty, pass --token or set {}",
                ENV_API_TOKEN
            )));
        }
        if self.kline_count == 0 {
            return Err(KlineError::ConfigError("kline_count must be positive".to_string()));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
