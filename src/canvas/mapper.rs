use tracing::warn;

use crate::canvas::dto::{CanvasAssignment, CanvasCourse};
use crate::canvas::term::{format_calendar_date, format_due_date, resolve_term};
use crate::models::{AssignmentKind, Instructor, NormalizedAssignment, NormalizedCourse};

/// Keywords that classify an assignment as an exam when they appear in its
/// name or description.
const EXAM_KEYWORDS: [&str; 5] = ["exam", "test", "midterm", "final", "quiz"];

const DEFAULT_POINTS: f64 = 0.0;
const DESCRIPTION_MAX_LENGTH: usize = 100;
const UNTITLED_COURSE: &str = "Untitled Course";
const UNTITLED_ASSIGNMENT: &str = "Untitled Assignment";
const UNKNOWN_COURSE_CODE: &str = "N/A";

/// Maps a raw Canvas course to its normalized form.
///
/// Canvas typically encodes "Course Title - COURSE-CODE" in the name field
/// (e.g. "Computer Networking I - CS-3251-A"); the split happens on the
/// first " - " only. Professor comes from the resolved instructor list,
/// falling back to the teachers embedded in the course payload.
pub fn map_course(course: &CanvasCourse, instructors: &[Instructor]) -> NormalizedCourse {
    let full_name = course
        .name
        .as_deref()
        .filter(|n| !n.is_empty())
        .unwrap_or(UNTITLED_COURSE);

    let (title, code_from_name) = match full_name.split_once(" - ") {
        Some((left, right)) => (left.trim().to_string(), Some(right.trim().to_string())),
        None => (full_name.trim().to_string(), None),
    };

    let course_code = code_from_name
        .filter(|c| !c.is_empty())
        .or_else(|| course.course_code.clone().filter(|c| !c.is_empty()))
        .unwrap_or_else(|| UNKNOWN_COURSE_CODE.to_string());

    let professor = instructors
        .first()
        .map(|i| i.display_name.clone())
        .or_else(|| course.teachers.first().map(|t| t.display_name.clone()))
        .unwrap_or_default();

    let start_at = course.start_at.as_deref().unwrap_or_default();

    NormalizedCourse {
        title,
        course_code,
        professor,
        term: resolve_term(start_at),
        start_date: format_calendar_date(start_at),
        canvas_course_id: course.id,
        canvas_url: course.html_url.clone().unwrap_or_default(),
    }
}

/// Maps a raw Canvas assignment to its normalized form.
pub fn map_assignment(assignment: &CanvasAssignment) -> NormalizedAssignment {
    let title = assignment
        .name
        .as_deref()
        .filter(|n| !n.is_empty())
        .unwrap_or(UNTITLED_ASSIGNMENT)
        .to_string();

    NormalizedAssignment {
        kind: classify_assignment(assignment),
        due_date: format_due_date(assignment.due_at.as_deref().unwrap_or_default()),
        points_possible: extract_points_possible(assignment),
        canvas_assignment_id: assignment.id,
        canvas_url: assignment.html_url.clone().unwrap_or_default(),
        description_snippet: truncate_description(assignment.description.as_deref()),
        title,
    }
}

fn classify_assignment(assignment: &CanvasAssignment) -> AssignmentKind {
    let name = assignment.name.as_deref().unwrap_or_default().to_lowercase();
    let description = assignment
        .description
        .as_deref()
        .unwrap_or_default()
        .to_lowercase();

    for keyword in EXAM_KEYWORDS {
        if name.contains(keyword) || description.contains(keyword) {
            return AssignmentKind::Exam;
        }
    }
    AssignmentKind::Assignment
}

/// Points come back as a JSON number, a numeric string, null, or garbage.
/// Anything that does not parse to a non-negative float defaults to 0.0
/// with a warning; this never fails the record.
fn extract_points_possible(assignment: &CanvasAssignment) -> f64 {
    let raw = match &assignment.points_possible {
        None | Some(serde_json::Value::Null) => return DEFAULT_POINTS,
        Some(value) => value,
    };

    let parsed = match raw {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(points) if points.is_finite() && points >= 0.0 => points,
        _ => {
            warn!(
                "Invalid points_possible value {:?} for assignment '{}', defaulting to {}",
                raw,
                assignment.name.as_deref().unwrap_or("unknown"),
                DEFAULT_POINTS
            );
            DEFAULT_POINTS
        }
    }
}

fn truncate_description(description: Option<&str>) -> String {
    let Some(description) = description else {
        return String::new();
    };

    if description.len() <= DESCRIPTION_MAX_LENGTH {
        return description.to_string();
    }

    let mut cut = DESCRIPTION_MAX_LENGTH;
    while !description.is_char_boundary(cut) {
        cut -= 1;
    }
    let mut truncated = &description[..cut];

    // Prefer a word boundary when one sits reasonably close to the limit.
    if let Some(last_space) = truncated.rfind(' ') {
        if last_space > DESCRIPTION_MAX_LENGTH * 4 / 5 {
            truncated = &truncated[..last_space];
        }
    }

    format!("{}...", truncated.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::dto::CanvasTeacher;
    use crate::models::InstructorRole;

    fn course(name: &str) -> CanvasCourse {
        CanvasCourse {
            id: 101,
            name: Some(name.to_string()),
            course_code: None,
            start_at: Some("2025-08-18T06:00:00Z".to_string()),
            end_at: None,
            html_url: Some("https://canvas.test/courses/101".to_string()),
            teachers: Vec::new(),
            total_students: None,
        }
    }

    fn assignment(name: &str) -> CanvasAssignment {
        CanvasAssignment {
            id: 555,
            name: Some(name.to_string()),
            description: None,
            due_at: None,
            points_possible: None,
            html_url: None,
            submission_types: vec!["online_upload".to_string()],
        }
    }

    fn instructor(name: &str) -> Instructor {
        Instructor {
            id: 7,
            display_name: name.to_string(),
            login_id: None,
            role: InstructorRole::Teacher,
            section_name: None,
            section_id: None,
        }
    }

    #[test]
    fn course_name_splits_on_first_separator() {
        let mapped = map_course(&course("Computer Networking I - CS-3251-A"), &[]);
        assert_eq!(mapped.title, "Computer Networking I");
        assert_eq!(mapped.course_code, "CS-3251-A");
    }

    #[test]
    fn course_name_without_separator_falls_back_to_code_field() {
        let mut raw = course("Intro to X");
        raw.course_code = Some("CS-100".to_string());
        let mapped = map_course(&raw, &[]);
        assert_eq!(mapped.title, "Intro to X");
        assert_eq!(mapped.course_code, "CS-100");
    }

    #[test]
    fn course_split_only_happens_once() {
        let mapped = map_course(&course("Systems - CS-2200 - Honors"), &[]);
        assert_eq!(mapped.title, "Systems");
        assert_eq!(mapped.course_code, "CS-2200 - Honors");
    }

    #[test]
    fn course_title_and_code_are_never_empty() {
        let mut raw = course("");
        raw.name = None;
        let mapped = map_course(&raw, &[]);
        assert_eq!(mapped.title, UNTITLED_COURSE);
        assert_eq!(mapped.course_code, UNKNOWN_COURSE_CODE);
    }

    #[test]
    fn professor_prefers_resolved_instructors() {
        let mut raw = course("Algorithms - CS-3510");
        raw.teachers = vec![CanvasTeacher {
            id: Some(1),
            display_name: "Embedded Teacher".to_string(),
        }];
        let mapped = map_course(&raw, &[instructor("Dr. Resolved")]);
        assert_eq!(mapped.professor, "Dr. Resolved");
    }

    #[test]
    fn professor_falls_back_to_embedded_teachers_then_empty() {
        let mut raw = course("Algorithms - CS-3510");
        raw.teachers = vec![CanvasTeacher {
            id: Some(1),
            display_name: "Embedded Teacher".to_string(),
        }];
        assert_eq!(map_course(&raw, &[]).professor, "Embedded Teacher");

        raw.teachers.clear();
        assert_eq!(map_course(&raw, &[]).professor, "");
    }

    #[test]
    fn term_is_derived_from_start_date() {
        let mapped = map_course(&course("Networks - CS-3251"), &[]);
        assert_eq!(mapped.term, "Fall 2025");
        assert_eq!(mapped.start_date, "2025-08-18");
    }

    #[test]
    fn exam_keywords_classify_case_insensitively() {
        assert_eq!(map_assignment(&assignment("Midterm 1")).kind, AssignmentKind::Exam);
        assert_eq!(map_assignment(&assignment("FINAL Project")).kind, AssignmentKind::Exam);
        assert_eq!(map_assignment(&assignment("Quiz 3")).kind, AssignmentKind::Exam);
        assert_eq!(
            map_assignment(&assignment("Homework 3")).kind,
            AssignmentKind::Assignment
        );
    }

    #[test]
    fn exam_keyword_in_description_counts() {
        let mut raw = assignment("Week 5 deliverable");
        raw.description = Some("This counts as your midterm grade.".to_string());
        assert_eq!(map_assignment(&raw).kind, AssignmentKind::Exam);
    }

    #[test]
    fn missing_points_default_to_zero() {
        let mapped = map_assignment(&assignment("Homework 1"));
        assert_eq!(mapped.points_possible, 0.0);
    }

    #[test]
    fn invalid_points_default_to_zero_without_failing() {
        let mut raw = assignment("Homework 2");
        raw.points_possible = Some(serde_json::json!("bad"));
        assert_eq!(map_assignment(&raw).points_possible, 0.0);

        raw.points_possible = Some(serde_json::json!(-5.0));
        assert_eq!(map_assignment(&raw).points_possible, 0.0);
    }

    #[test]
    fn numeric_points_pass_through() {
        let mut raw = assignment("Homework 4");
        raw.points_possible = Some(serde_json::json!(42.5));
        assert_eq!(map_assignment(&raw).points_possible, 42.5);

        raw.points_possible = Some(serde_json::json!("15"));
        assert_eq!(map_assignment(&raw).points_possible, 15.0);
    }

    #[test]
    fn due_date_does_not_shift_across_midnight() {
        let mut raw = assignment("Homework 5");
        raw.due_at = Some("2025-08-29T23:59:00Z".to_string());
        assert_eq!(map_assignment(&raw).due_date, "2025-08-29");
    }

    #[test]
    fn long_descriptions_truncate_at_a_word_boundary() {
        let mut raw = assignment("Essay");
        raw.description = Some(
            "This essay should cover the assigned reading in detail and include at least three \
             cited sources from the course bibliography"
                .to_string(),
        );
        let snippet = map_assignment(&raw).description_snippet;
        assert!(snippet.len() <= DESCRIPTION_MAX_LENGTH + 3);
        assert!(snippet.ends_with("..."));
        assert!(!snippet.contains("bibliography"));
    }
}
