use serde::{Deserialize, Serialize};

/// A course instructor resolved from Canvas enrollments. Lives only for the
/// duration of one sync call; attached to a course during mapping.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Instructor {
    pub id: i64,
    pub display_name: String,
    pub login_id: Option<String>,
    pub role: InstructorRole,
    pub section_name: Option<String>,
    pub section_id: Option<i64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum InstructorRole {
    Teacher,
    Ta,
}

/// Canvas course reduced to the shape we write into Notion.
///
/// `title` and `course_code` are never empty (placeholders are substituted
/// when Canvas omits them); `professor` may be empty when no instructor
/// could be resolved, which is a valid outcome rather than an error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NormalizedCourse {
    pub title: String,
    pub course_code: String,
    pub professor: String,
    pub term: String,
    pub start_date: String,
    pub canvas_course_id: i64,
    pub canvas_url: String,
}
