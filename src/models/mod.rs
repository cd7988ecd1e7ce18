mod assignment;
mod course;
mod settings;
mod sync_log;

pub use assignment::{AssignmentKind, NormalizedAssignment};
pub use course::{Instructor, InstructorRole, NormalizedCourse};
pub use settings::{SettingsResponse, UpdateSettingsRequest, UserSettings};
pub use sync_log::{
    SyncLog, SYNC_STATUS_FAILED, SYNC_STATUS_SUCCESS, SYNC_TYPE_ASSIGNMENTS, SYNC_TYPE_COURSES,
};
