//! URL resolution and the timeout/retry policy applied to every call.

use std::time::Duration;

use url::Url;

use crate::error::RequestError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Bounded exponential backoff for idempotent requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub const fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Delay before retry number `retry` (1-based): `base * 2^(retry - 1)`, capped.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(16);
        self.base_delay
            .saturating_mul(1u32 << exponent)
            .min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(2),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestPolicy {
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for RequestPolicy {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }
}

pub fn parse_base_url(raw: &str) -> Result<Url, RequestError> {
    let trimmed = raw.trim();
    let url = Url::parse(trimmed).map_err(|err| RequestError::invalid_url(trimmed, err.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(RequestError::invalid_url(
            trimmed,
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    if url.cannot_be_a_base() {
        return Err(RequestError::invalid_url(trimmed, "not a base url"));
    }
    Ok(url)
}

/// Appends a relative route to the base URL, keeping any path prefix the
/// base carries (`http://host/backend` + `/courses`).
pub fn resolve_url(base: &Url, path: &str) -> Result<Url, RequestError> {
    if !path.starts_with('/') {
        return Err(RequestError::invalid_url(path, "path must start with '/'"));
    }
    let route = path.split('?').next().unwrap_or(path);
    if route.starts_with("//") || route.contains("://") {
        return Err(RequestError::invalid_url(path, "path must be relative"));
    }

    let joined = format!("{}{}", base.as_str().trim_end_matches('/'), path);
    Url::parse(&joined).map_err(|err| RequestError::invalid_url(joined.clone(), err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_until_capped() {
        let policy = RetryPolicy {
            max_attempts: 5,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(350),
        };
        assert_eq!(policy.delay_for(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for(3), Duration::from_millis(350));
        assert_eq!(policy.delay_for(40), Duration::from_millis(350));
    }

    #[test]
    fn resolve_keeps_base_path_prefix() {
        let base = parse_base_url("http://localhost:8000/backend/").expect("base");
        let url = resolve_url(&base, "/api/v1/ai-grade").expect("url");
        assert_eq!(url.as_str(), "http://localhost:8000/backend/api/v1/ai-grade");
    }

    #[test]
    fn resolve_rejects_non_relative_paths() {
        let base = parse_base_url(DEFAULT_BASE_URL).expect("base");
        assert!(resolve_url(&base, "courses").is_err());
        assert!(resolve_url(&base, "//evil.example/courses").is_err());
        assert!(resolve_url(&base, "/api/http://evil.example").is_err());
        assert!(resolve_url(&base, "/next?to=http://x").is_ok());
    }

    #[test]
    fn base_url_requires_http_scheme() {
        assert!(parse_base_url("ftp://localhost").is_err());
        assert!(parse_base_url("not a url").is_err());
        assert!(parse_base_url(" https://api.example.com ").is_ok());
    }
}
