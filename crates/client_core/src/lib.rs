use std::time::Instant;

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::{Client, Method};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use shared::{
    domain::{Course, CurriculumStats, GradeRequest, GradeResult, StudentId},
    protocol::{
        CurriculumResponse, GreetRequest, HealthStatus, LoginRequest, ProgressRequest,
        RecommendationsQuery, TokenResponse, TutorReply, COURSES_PATH, CURRICULUM_PATH,
        GRADE_PATH, HEALTH_PATH, TOKEN_PATH, TUTOR_GREET_PATH, TUTOR_PROGRESS_PATH,
        TUTOR_RECOMMENDATIONS_PATH,
    },
};
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

pub mod auth;
pub mod error;
pub mod lifecycle;
pub mod transport;

pub use auth::{Session, SessionStore, SessionToken};
pub use error::{RequestError, RequestErrorKind};
pub use lifecycle::{Completion, LifecycleError, RequestSlot, RequestState, Ticket};
pub use tokio_util::sync::CancellationToken;
pub use transport::{RequestPolicy, RetryPolicy, DEFAULT_BASE_URL};

/// Everything the portal needs from the backend collaborator.
#[async_trait]
pub trait BackendApi: Send + Sync {
    async fn curriculum_stats(&self, cancel: &CancellationToken)
        -> Result<CurriculumStats, RequestError>;
    async fn health(&self, cancel: &CancellationToken) -> Result<HealthStatus, RequestError>;
    async fn grade_submission(
        &self,
        request: &GradeRequest,
        cancel: &CancellationToken,
    ) -> Result<GradeResult, RequestError>;
    async fn greet_student(
        &self,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<TutorReply, RequestError>;
    async fn recommendations(
        &self,
        student_id: Option<StudentId>,
        cancel: &CancellationToken,
    ) -> Result<TutorReply, RequestError>;
    async fn record_progress(
        &self,
        request: &ProgressRequest,
        cancel: &CancellationToken,
    ) -> Result<TutorReply, RequestError>;
    async fn list_courses(&self, cancel: &CancellationToken) -> Result<Vec<Course>, RequestError>;
    async fn login(
        &self,
        username: &str,
        password: &str,
        cancel: &CancellationToken,
    ) -> Result<Session, RequestError>;
    fn logout(&self);
    fn set_base_url(&self, raw: &str) -> Result<(), RequestError>;
    fn base_url(&self) -> Url;
}

/// JSON-over-HTTP client for the MetaLearn backend.
///
/// The base URL and session live behind locks so a running session can be
/// re-pointed at another backend or signed out without rebuilding the client.
pub struct ApiClient {
    http: Client,
    base_url: RwLock<Url>,
    policy: RequestPolicy,
    session: SessionStore,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, RequestError> {
        Self::with_policy(base_url, RequestPolicy::default())
    }

    pub fn with_policy(base_url: &str, policy: RequestPolicy) -> Result<Self, RequestError> {
        let base_url = transport::parse_base_url(base_url)?;
        let http = Client::builder()
            .build()
            .map_err(|err| RequestError::Network(format!("failed to build http client: {err}")))?;
        Ok(Self {
            http,
            base_url: RwLock::new(base_url),
            policy,
            session: SessionStore::default(),
        })
    }

    pub fn policy(&self) -> RequestPolicy {
        self.policy
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Generic call: `method path [body] -> JSON`.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        cancel: &CancellationToken,
    ) -> Result<Value, RequestError> {
        self.execute(method, path, &[], body, cancel).await
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        cancel: &CancellationToken,
    ) -> Result<T, RequestError> {
        let value = self.execute(Method::GET, path, &[], None, cancel).await?;
        decode(value)
    }

    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        cancel: &CancellationToken,
    ) -> Result<T, RequestError> {
        let body = serde_json::to_value(body).map_err(|err| RequestError::Encode(err.to_string()))?;
        let value = self
            .execute(Method::POST, path, &[], Some(&body), cancel)
            .await?;
        decode(value)
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
        cancel: &CancellationToken,
    ) -> Result<Value, RequestError> {
        let url = transport::resolve_url(&self.base_url.read(), path)?;
        // Only idempotent reads are replayed.
        let max_attempts = if method == Method::GET {
            self.policy.retry.max_attempts.max(1)
        } else {
            1
        };
        let request_id = Uuid::new_v4();
        let mut attempt = 1;

        loop {
            let started = Instant::now();
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(RequestError::Cancelled),
                outcome = self.attempt(&method, url.clone(), query, body) => outcome,
            };

            match outcome {
                Ok(value) => {
                    debug!(
                        %request_id,
                        %method,
                        path,
                        attempt,
                        duration_ms = started.elapsed().as_millis() as u64,
                        "backend request succeeded"
                    );
                    return Ok(value);
                }
                Err(err) if attempt < max_attempts && err.is_retryable() => {
                    let delay = self.policy.retry.delay_for(attempt);
                    warn!(
                        %request_id,
                        %method,
                        path,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "backend request failed; retrying"
                    );
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => {
                            debug!(%request_id, path, "backend request cancelled during backoff");
                            return Err(RequestError::Cancelled);
                        }
                        _ = tokio::time::sleep(delay) => {}
                    }
                    attempt += 1;
                }
                Err(RequestError::Cancelled) => {
                    debug!(%request_id, %method, path, "backend request cancelled");
                    return Err(RequestError::Cancelled);
                }
                Err(err) => {
                    warn!(
                        %request_id,
                        %method,
                        path,
                        attempt,
                        status = err.status(),
                        error = %err,
                        "backend request failed"
                    );
                    return Err(err);
                }
            }
        }
    }

    async fn attempt(
        &self,
        method: &Method,
        url: Url,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Value, RequestError> {
        let timeout = self.policy.timeout;
        let mut builder = self.http.request(method.clone(), url).timeout(timeout);
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }
        if let Some(token) = self.session.bearer() {
            builder = builder.bearer_auth(token);
        }

        let response = builder
            .send()
            .await
            .map_err(|err| RequestError::from_transport(err, timeout))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| RequestError::from_transport(err, timeout))?;

        if !status.is_success() {
            return Err(RequestError::Http {
                status: status.as_u16(),
                body: text,
            });
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|err| RequestError::Parse {
            message: err.to_string(),
            body: text,
        })
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, RequestError> {
    let body = value.to_string();
    serde_json::from_value(value).map_err(|err| RequestError::Parse {
        message: err.to_string(),
        body,
    })
}

#[async_trait]
impl BackendApi for ApiClient {
    async fn curriculum_stats(
        &self,
        cancel: &CancellationToken,
    ) -> Result<CurriculumStats, RequestError> {
        let response: CurriculumResponse = self.get_json(CURRICULUM_PATH, cancel).await?;
        Ok(response.curriculum_analysis)
    }

    async fn health(&self, cancel: &CancellationToken) -> Result<HealthStatus, RequestError> {
        self.get_json(HEALTH_PATH, cancel).await
    }

    async fn grade_submission(
        &self,
        request: &GradeRequest,
        cancel: &CancellationToken,
    ) -> Result<GradeResult, RequestError> {
        self.post_json(GRADE_PATH, request, cancel).await
    }

    async fn greet_student(
        &self,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<TutorReply, RequestError> {
        let request = GreetRequest {
            name: name.to_string(),
        };
        self.post_json(TUTOR_GREET_PATH, &request, cancel).await
    }

    async fn recommendations(
        &self,
        student_id: Option<StudentId>,
        cancel: &CancellationToken,
    ) -> Result<TutorReply, RequestError> {
        let query = RecommendationsQuery { student_id };
        let params: Vec<(&str, String)> = query
            .student_id
            .map(|id| vec![("student_id", id.0.to_string())])
            .unwrap_or_default();
        let value = self
            .execute(Method::POST, TUTOR_RECOMMENDATIONS_PATH, &params, None, cancel)
            .await?;
        Ok(TutorReply(value))
    }

    async fn record_progress(
        &self,
        request: &ProgressRequest,
        cancel: &CancellationToken,
    ) -> Result<TutorReply, RequestError> {
        self.post_json(TUTOR_PROGRESS_PATH, request, cancel).await
    }

    async fn list_courses(&self, cancel: &CancellationToken) -> Result<Vec<Course>, RequestError> {
        self.get_json(COURSES_PATH, cancel).await
    }

    async fn login(
        &self,
        username: &str,
        password: &str,
        cancel: &CancellationToken,
    ) -> Result<Session, RequestError> {
        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let token: TokenResponse = self.post_json(TOKEN_PATH, &request, cancel).await?;
        if cancel.is_cancelled() {
            return Err(RequestError::Cancelled);
        }
        let session = self.session.establish(token);
        info!(user = session.display_name(), "session established");
        Ok(session)
    }

    fn logout(&self) {
        self.session.clear();
        info!("session cleared");
    }

    fn set_base_url(&self, raw: &str) -> Result<(), RequestError> {
        let url = transport::parse_base_url(raw)?;
        info!(base_url = %url, "backend base url updated");
        *self.base_url.write() = url;
        Ok(())
    }

    fn base_url(&self) -> Url {
        self.base_url.read().clone()
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
