use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct CanvasUser {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub login_id: Option<String>,
}

/// Entry of the `teachers` include on the courses listing. Canvas uses
/// `display_name` here, not `name`.
#[derive(Debug, Clone, Deserialize)]
pub struct CanvasTeacher {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub display_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CanvasCourse {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub course_code: Option<String>,
    #[serde(default)]
    pub start_at: Option<String>,
    #[serde(default)]
    pub end_at: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub teachers: Vec<CanvasTeacher>,
    #[serde(default)]
    pub total_students: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CanvasSection {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CanvasEnrollment {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub user: Option<CanvasUser>,
}

/// Raw Canvas assignment. `points_possible` stays untyped because Canvas
/// occasionally hands back garbage there; the mapper sorts it out without
/// failing the whole record.
#[derive(Debug, Clone, Deserialize)]
pub struct CanvasAssignment {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub due_at: Option<String>,
    #[serde(default)]
    pub points_possible: Option<serde_json::Value>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub submission_types: Vec<String>,
}
