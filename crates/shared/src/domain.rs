use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(CourseId);
id_newtype!(StudentId);

/// Level key the dashboard headline tile reads from `Levels`.
pub const HEADLINE_LEVEL: &str = "L3 Grade 12";
pub const TEXTBOOK_TYPE: &str = "PDF Books";
pub const SLIDES_TYPE: &str = "Presentations";

/// Curriculum analysis produced by the backend resource scanner.
///
/// Every field is optional on the wire; a missing map reads as empty so the
/// dashboard tiles fall back to zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurriculumStats {
    #[serde(rename = "Levels", default)]
    pub levels: BTreeMap<String, u64>,
    #[serde(rename = "Types", default)]
    pub types: BTreeMap<String, u64>,
    #[serde(rename = "Structure", default)]
    pub structure: Vec<serde_json::Value>,
}

impl CurriculumStats {
    pub fn level_count(&self, level: &str) -> u64 {
        self.levels.get(level).copied().unwrap_or(0)
    }

    pub fn type_count(&self, resource_type: &str) -> u64 {
        self.types.get(resource_type).copied().unwrap_or(0)
    }

    pub fn resource_count(&self) -> usize {
        self.structure.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeRequest {
    pub student_id: String,
    pub unit_name: String,
    pub submission_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeResult {
    pub grade: String,
    pub ai_feedback: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradeBand {
    Distinction,
    Merit,
    Other,
}

impl GradeResult {
    /// Distinction wins over Merit when a grade string mentions both.
    pub fn band(&self) -> GradeBand {
        if self.grade.contains("Distinction") {
            GradeBand::Distinction
        } else if self.grade.contains("Merit") {
            GradeBand::Merit
        } else {
            GradeBand::Other
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl UserProfile {
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or("student")
    }
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
