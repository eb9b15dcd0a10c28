use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("{upstream} timed out after {timeout:?}")]
    Timeout {
        upstream: &'static str,
        timeout: Duration,
    },
    #[error("{upstream} request failed: {source}")]
    Http {
        upstream: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{upstream} returned status {status}: {body}")]
    Status {
        upstream: &'static str,
        status: StatusCode,
        body: String,
    },
    #[error("{upstream} response could not be decoded: {message}")]
    Decode {
        upstream: &'static str,
        message: String,
    },
    #[error("invalid upstream url: {0}")]
    InvalidUrl(String),
}

impl UpstreamError {
    pub(crate) fn from_reqwest(upstream: &'static str, timeout: Duration, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UpstreamError::Timeout { upstream, timeout }
        } else {
            UpstreamError::Http {
                upstream,
                source: err,
            }
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, UpstreamError::Timeout { .. })
    }

    /// 网络错误、超时及 429/5xx 可以重试，其余直接失败
    pub fn is_retryable(&self) -> bool {
        match self {
            UpstreamError::Timeout { .. } | UpstreamError::Http { .. } => true,
            UpstreamError::Status { status, .. } => {
                matches!(status.as_u16(), 429 | 500 | 502 | 503 | 504)
            }
            UpstreamError::Decode { .. } | UpstreamError::InvalidUrl(_) => false,
        }
    }
}
