use serde::Serialize;

/// One persisted sync run summary.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SyncLog {
    pub id: String,
    pub user_id: String,
    pub sync_type: String,
    pub status: String,
    pub found: i64,
    pub created: i64,
    pub failed: i64,
    pub skipped: i64,
    /// Full report JSON, for debugging failed items after the fact.
    pub detail: Option<String>,
    pub created_at: String,
}

pub const SYNC_TYPE_COURSES: &str = "courses";
pub const SYNC_TYPE_ASSIGNMENTS: &str = "assignments";

pub const SYNC_STATUS_SUCCESS: &str = "success";
pub const SYNC_STATUS_FAILED: &str = "failed";
