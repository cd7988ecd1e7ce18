pub mod assignment_sync;
pub mod course_sync;
pub mod duplicate;
pub mod report;

pub use assignment_sync::AssignmentSyncService;
pub use course_sync::CourseSyncService;
pub use report::{AssignmentSyncReport, CourseSyncReport};
