//! Failure taxonomy for backend calls.

use std::time::Duration;

use shared::error::ApiError;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestErrorKind {
    InvalidUrl,
    Encode,
    Network,
    Timeout,
    Http,
    Parse,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("invalid url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("failed to encode request body: {0}")]
    Encode(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("malformed response: {message}")]
    Parse { message: String, body: String },
    #[error("request cancelled")]
    Cancelled,
}

impl RequestError {
    pub(crate) fn from_transport(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout)
        } else {
            Self::Network(err.to_string())
        }
    }

    pub(crate) fn invalid_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> RequestErrorKind {
        match self {
            Self::InvalidUrl { .. } => RequestErrorKind::InvalidUrl,
            Self::Encode(_) => RequestErrorKind::Encode,
            Self::Network(_) => RequestErrorKind::Network,
            Self::Timeout(_) => RequestErrorKind::Timeout,
            Self::Http { .. } => RequestErrorKind::Http,
            Self::Parse { .. } => RequestErrorKind::Parse,
            Self::Cancelled => RequestErrorKind::Cancelled,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Http { body, .. } | Self::Parse { body, .. } => Some(body),
            _ => None,
        }
    }

    /// The backend's `detail` message when the body carries one.
    pub fn detail(&self) -> Option<String> {
        self.body().and_then(ApiError::parse).map(|err| err.message())
    }

    /// Transport failures and gateway-style statuses may succeed on a later attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout(_) => true,
            Self::Http { status, .. } => matches!(status, 502..=504),
            _ => false,
        }
    }
}
