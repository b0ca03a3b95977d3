//! Error types.
//!
//! Acquisition-side errors ([`FetchError`], [`ApiError`]) are absorbed by the
//! pipeline's fallback chain. Summarization errors ([`SummarizeError`]) are
//! always surfaced to the caller together with a user-facing message.

use thiserror::Error;

/// The caller abandoned the operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("operation cancelled")]
pub struct Cancelled;

/// Failure to retrieve a page.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("upstream returned status {0}")]
    Status(u16),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("fetch cancelled")]
    Cancelled,
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if let Some(status) = e.status() {
            FetchError::Status(status.as_u16())
        } else if e.is_connect() {
            FetchError::Connect(e.to_string())
        } else {
            FetchError::Request(e.to_string())
        }
    }
}

impl From<Cancelled> for FetchError {
    fn from(_: Cancelled) -> Self {
        FetchError::Cancelled
    }
}

/// Failure of the structured search API strategy.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("search API credentials are not configured")]
    MissingCredential,

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("malformed search API payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Failure of one strategy in the search chain. Always absorbed by the
/// pipeline, which moves on to the next strategy.
#[derive(Debug, Error)]
pub enum StrategyError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Failure categories of the summarization call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SummarizeError {
    #[error("summarization API key is not set")]
    MissingCredential,

    #[error("summarization API key was rejected")]
    InvalidCredential,

    #[error("summarization rate limit exceeded")]
    RateLimited,

    #[error("summarization request timed out")]
    Timeout,

    #[error("summarization response contained no choices")]
    EmptyResponse,

    #[error("summarization failed: {0}")]
    Other(String),
}

impl SummarizeError {
    /// Message suitable for showing to an end user.
    pub fn user_message(&self) -> String {
        match self {
            SummarizeError::MissingCredential => {
                "API 키가 설정되지 않았습니다. OPENAI_API_KEY 환경 변수를 설정해주세요.".to_string()
            }
            SummarizeError::InvalidCredential => {
                "API 키가 유효하지 않습니다. OpenAI API 키를 확인해주세요.".to_string()
            }
            SummarizeError::RateLimited => {
                "API 요청 한도를 초과했습니다. 잠시 후 다시 시도해주세요.".to_string()
            }
            SummarizeError::Timeout => {
                "요청 시간이 초과되었습니다. 네트워크 연결을 확인해주세요.".to_string()
            }
            SummarizeError::EmptyResponse => "요약을 생성할 수 없습니다.".to_string(),
            SummarizeError::Other(detail) => format!("요약 생성 중 오류가 발생했습니다: {detail}"),
        }
    }
}

impl From<reqwest::Error> for SummarizeError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return SummarizeError::Timeout;
        }
        match e.status().map(|s| s.as_u16()) {
            Some(401) => SummarizeError::InvalidCredential,
            Some(429) => SummarizeError::RateLimited,
            _ => SummarizeError::Other(e.to_string()),
        }
    }
}

/// Failure of the article store collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("article {0} not found")]
    NotFound(u64),

    #[error("duplicate article id {0} in store file")]
    DuplicateId(u64),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failure to load configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid source URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}
