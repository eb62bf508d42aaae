use super::*;

#[test]
fn curriculum_stats_missing_fields_read_as_zero() {
    let stats: CurriculumStats = serde_json::from_str(r#"{"Types": {"PDF Books": 4}}"#)
        .expect("partial stats");
    assert_eq!(stats.level_count(HEADLINE_LEVEL), 0);
    assert_eq!(stats.type_count(TEXTBOOK_TYPE), 4);
    assert_eq!(stats.type_count(SLIDES_TYPE), 0);
    assert_eq!(stats.resource_count(), 0);
}

#[test]
fn grade_band_prefers_distinction() {
    let result = |grade: &str| GradeResult {
        grade: grade.to_string(),
        ai_feedback: String::new(),
    };
    assert_eq!(result("Merit").band(), GradeBand::Merit);
    assert_eq!(result("Distinction (Merit criteria met)").band(), GradeBand::Distinction);
    assert_eq!(result("Pass").band(), GradeBand::Other);
}

#[test]
fn course_id_decodes_from_plain_integer() {
    let courses: Vec<Course> =
        serde_json::from_str(r#"[{"id": 7, "title": "Unit 7"}]"#).expect("courses");
    assert_eq!(courses[0].id, CourseId(7));
}

#[test]
fn display_name_falls_back_to_email() {
    let profile = UserProfile {
        id: Some(1),
        email: Some("admin".into()),
        name: None,
        role: None,
    };
    assert_eq!(profile.display_name(), "admin");
}
