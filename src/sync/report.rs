use serde::Serialize;

/// One successfully created target record.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedItem {
    pub source_id: i64,
    pub name: String,
}

/// One item that could not be synced. The batch keeps going; the error
/// string is what the caller sees.
#[derive(Debug, Clone, Serialize)]
pub struct FailedItem {
    pub source_id: i64,
    pub name: String,
    pub error: String,
}

/// Summary of one course sync run.
///
/// `found == created + failed + skipped` holds for every report this crate
/// produces, including partial-failure runs.
#[derive(Debug, Default, Serialize)]
pub struct CourseSyncReport {
    pub found: usize,
    pub created: usize,
    pub failed: usize,
    pub skipped: usize,
    pub created_items: Vec<CreatedItem>,
    pub failed_items: Vec<FailedItem>,
}

impl CourseSyncReport {
    pub fn record_created(&mut self, source_id: i64, name: &str) {
        self.created += 1;
        self.created_items.push(CreatedItem {
            source_id,
            name: name.to_string(),
        });
    }

    pub fn record_skipped(&mut self) {
        self.skipped += 1;
    }

    pub fn record_failed(&mut self, source_id: i64, name: &str, error: String) {
        self.failed += 1;
        self.failed_items.push(FailedItem {
            source_id,
            name: name.to_string(),
            error,
        });
    }
}

/// Summary of one assignment sync run across all processed courses.
///
/// The same conservation rule applies: `found == created + failed + skipped`.
/// A course whose assignment list could not be fetched contributes one unit
/// to both `found` and `failed` so the totals still balance.
#[derive(Debug, Default, Serialize)]
pub struct AssignmentSyncReport {
    pub courses_processed: usize,
    pub found: usize,
    pub created: usize,
    pub failed: usize,
    pub skipped: usize,
    pub created_items: Vec<CreatedItem>,
    pub failed_items: Vec<FailedItem>,
}

impl AssignmentSyncReport {
    pub fn merge_course(&mut self, outcome: CourseSyncReport) {
        self.courses_processed += 1;
        self.found += outcome.found;
        self.created += outcome.created;
        self.failed += outcome.failed;
        self.skipped += outcome.skipped;
        self.created_items.extend(outcome.created_items);
        self.failed_items.extend(outcome.failed_items);
    }
}
