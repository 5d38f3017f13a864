use thiserror::Error;

#[derive(Error, Debug)]
pub enum KlineError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// 单根K线字段无法解析，由标准化流程就地吸收
    #[error("Bar parse error: {0}")]
    ParseError(String),

    #[error("Unknown timeframe: {0}")]
    UnknownTimeframe(String),

    #[error("Unknown region: {0}")]
    UnknownRegion(String),

    #[error("No kline data for {0}")]
    EmptySeries(String),

    #[error("Fetch error: {0}")]
    FetchError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl KlineError {
    /// 外部数据源失败可以由用户重试，其余错误重试无意义
    pub fn is_retryable(&self) -> bool {
        matches!(self, KlineError::RequestError(_) | KlineError::FetchError(_))
    }
}

pub type Result<T> = std::result::Result<T, KlineError>;

// 用于从字符串创建错误
impl From<String> for KlineError {
    fn from(s: String) -> Self {
        KlineError::Unknown(s)
    }
}

// 用于从&str创建错误
impl From<&str> for KlineError {
    fn from(s: &str) -> Self {
        KlineError::Unknown(s.to_string())
    }
}
