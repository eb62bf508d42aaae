use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Error document returned by the backend (`{"detail": ...}`).
///
/// `detail` is a plain string for handled errors and a list of field
/// errors for request validation failures.
#[derive(Debug, Clone, Serialize, Deserialize, Error)]
#[error("{}", self.message())]
pub struct ApiError {
    pub detail: Value,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            detail: Value::String(message.into()),
        }
    }

    pub fn parse(body: &str) -> Option<Self> {
        serde_json::from_str::<Self>(body).ok()
    }

    pub fn message(&self) -> String {
        match &self.detail {
            Value::String(message) => message.clone(),
            Value::Array(items) => items
                .iter()
                .map(|item| {
                    item.get("msg")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .unwrap_or_else(|| item.to_string())
                })
                .collect::<Vec<_>>()
                .join("; "),
            other => other.to_string(),
        }
    }
}
