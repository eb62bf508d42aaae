use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::domain::{CurriculumStats, StudentId, UserProfile};

pub const CURRICULUM_PATH: &str = "/api/v1/btec-resources";
pub const GRADE_PATH: &str = "/api/v1/ai-grade";
pub const TUTOR_GREET_PATH: &str = "/api/v1/virtual-tutor/greet";
pub const TUTOR_RECOMMENDATIONS_PATH: &str = "/api/v1/virtual-tutor/recommendations";
pub const TUTOR_PROGRESS_PATH: &str = "/api/v1/virtual-tutor/progress";
pub const COURSES_PATH: &str = "/courses";
pub const TOKEN_PATH: &str = "/token";
pub const HEALTH_PATH: &str = "/api/health";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurriculumResponse {
    #[serde(default)]
    pub curriculum_analysis: CurriculumStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GreetRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressRequest {
    pub student_id: StudentId,
    pub course: String,
    pub progress: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationsQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_id: Option<StudentId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub user: Option<UserProfile>,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default, deserialize_with = "utc_or_naive")]
    pub time: Option<DateTime<Utc>>,
}

/// Accepts RFC 3339 timestamps and offset-less ones, which are read as UTC.
/// An unreadable timestamp is dropped rather than failing the whole document.
fn utc_or_naive<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let parsed = DateTime::parse_from_rfc3339(&raw)
        .map(|time| time.with_timezone(&Utc))
        .ok()
        .or_else(|| raw.parse::<NaiveDateTime>().ok().map(|time| time.and_utc()));
    Ok(parsed)
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}

/// Virtual tutor responses have no fixed schema; the raw document is kept
/// and summarised for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TutorReply(pub Value);

impl TutorReply {
    pub fn summary(&self) -> String {
        match &self.0 {
            Value::Null => String::new(),
            Value::String(text) => text.clone(),
            Value::Object(map) => ["message", "greeting", "detail"]
                .iter()
                .find_map(|key| map.get(*key).and_then(Value::as_str))
                .map(str::to_string)
                .unwrap_or_else(|| self.0.to_string()),
            other => other.to_string(),
        }
    }

    /// Recommendation lists arrive either bare or under `recommendations`.
    pub fn items(&self) -> Vec<String> {
        let list = match &self.0 {
            Value::Array(items) => Some(items),
            Value::Object(map) => map.get("recommendations").and_then(Value::as_array),
            _ => None,
        };
        list.map(|items| {
            items
                .iter()
                .map(|item| match item {
                    Value::String(text) => text.clone(),
                    Value::Object(map) => map
                        .get("title")
                        .or_else(|| map.get("course"))
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .unwrap_or_else(|| item.to_string()),
                    other => other.to_string(),
                })
                .collect()
        })
        .unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
