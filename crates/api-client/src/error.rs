#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("no API base URL configured")]
    MissingBaseUrl,
    #[error("invalid API base URL {url}: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("API base URL cannot have path segments: {0}")]
    CannotBeABase(String),
    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),
    /// Non-2xx response. `message` is the server's error body when it sent one.
    #[error("HTTP error! status: {status}")]
    Status { status: u16, message: String },
    #[error("failed to decode response: {0}")]
    Decode(#[source] reqwest::Error),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
