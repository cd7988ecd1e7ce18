use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AssignmentKind {
    Assignment,
    Exam,
}

impl AssignmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentKind::Assignment => "Assignment",
            AssignmentKind::Exam => "Exam",
        }
    }
}

/// Canvas assignment reduced to the shape we write into Notion.
///
/// `points_possible` is always finite and non-negative; missing or
/// unparsable upstream values default to 0.0.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NormalizedAssignment {
    pub title: String,
    pub kind: AssignmentKind,
    pub due_date: String,
    pub points_possible: f64,
    pub canvas_assignment_id: i64,
    pub canvas_url: String,
    pub description_snippet: String,
}
