use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::canvas::mapper::map_assignment;
use crate::canvas::CanvasApi;
use crate::error::AppError;
use crate::models::NormalizedAssignment;
use crate::notion::dto::{Page, Property};
use crate::notion::schema::{project, FieldValue, TargetSchema};
use crate::notion::{NotionApi, ASSIGNMENTS_DATABASE, COURSES_DATABASE};
use crate::sync::duplicate::{build_assignment_index, course_source_id, EmbeddedSourceId};
use crate::sync::report::{AssignmentSyncReport, CourseSyncReport};

/// Courses fanned out at once.
const COURSE_CONCURRENCY: usize = 3;
/// Assignment creations in flight across the whole run.
const ASSIGNMENT_CONCURRENCY: usize = 8;

/// A course page already present in Notion, the anchor for its assignments.
struct SyncedCourse {
    page_id: String,
    canvas_course_id: i64,
    title: String,
}

/// Pushes assignments for every synced course into the Notion
/// "Assignments/Exams" database. Courses must be synced first; assignments
/// only flow for courses that already have a page.
pub struct AssignmentSyncService {
    canvas: Arc<dyn CanvasApi>,
    notion: Arc<dyn NotionApi>,
}

impl AssignmentSyncService {
    pub fn new(canvas: Arc<dyn CanvasApi>, notion: Arc<dyn NotionApi>) -> Self {
        Self { canvas, notion }
    }

    pub async fn sync(&self) -> Result<AssignmentSyncReport, AppError> {
        let courses_db = self
            .notion
            .search_database_id(COURSES_DATABASE)
            .await?
            .ok_or(AppError::NotFound)?;
        let assignments_db = self
            .notion
            .search_database_id(ASSIGNMENTS_DATABASE)
            .await?
            .ok_or(AppError::NotFound)?;
        let schema = self.notion.get_database_schema(&assignments_db).await?;

        let course_pages = self.notion.query_database_pages(&courses_db).await?;
        let synced_courses = synced_courses_from_pages(&course_pages);
        info!("Syncing assignments for {} course(s)", synced_courses.len());

        let assignment_pages = self.notion.query_database_pages(&assignments_db).await?;
        let index = build_assignment_index(&assignment_pages);

        let course_semaphore = Semaphore::new(COURSE_CONCURRENCY);
        let assignment_semaphore = Semaphore::new(ASSIGNMENT_CONCURRENCY);

        let tasks = synced_courses.iter().map(|course| {
            self.sync_course_assignments(
                course,
                &assignments_db,
                &schema,
                &index,
                &course_semaphore,
                &assignment_semaphore,
            )
        });
        let sub_batches = join_all(tasks).await;

        let mut report = AssignmentSyncReport::default();
        for sub_batch in sub_batches {
            report.merge_course(sub_batch);
        }

        info!(
            "Assignment sync done: {} course(s), {} found, {} created, {} skipped, {} failed",
            report.courses_processed, report.found, report.created, report.skipped, report.failed
        );
        Ok(report)
    }

    /// Syncs one course's assignments. A failed assignment-list fetch is one
    /// failed unit; sibling courses are unaffected.
    async fn sync_course_assignments(
        &self,
        course: &SyncedCourse,
        database_id: &str,
        schema: &TargetSchema,
        index: &HashSet<i64>,
        course_semaphore: &Semaphore,
        assignment_semaphore: &Semaphore,
    ) -> CourseSyncReport {
        let _permit = course_semaphore.acquire().await.ok();

        let mut report = CourseSyncReport::default();

        let assignments = match self
            .canvas
            .get_course_assignments(course.canvas_course_id)
            .await
        {
            Ok(assignments) => assignments,
            Err(e) => {
                warn!(
                    "Failed to list assignments for course {}: {}",
                    course.canvas_course_id, e
                );
                report.found = 1;
                report.record_failed(course.canvas_course_id, &course.title, e.to_string());
                return report;
            }
        };

        report.found = assignments.len();

        let tasks = assignments.iter().map(|assignment| async move {
            if index.contains(&assignment.id) {
                return ItemOutcome::Skipped;
            }

            let _permit = assignment_semaphore.acquire().await.ok();

            let normalized = map_assignment(assignment);
            let properties = project(&assignment_fields(&normalized, &course.page_id), schema);

            match self.notion.create_page(database_id, properties).await {
                Ok(page_id) => {
                    info!(
                        "Created assignment page {} for '{}'",
                        page_id, normalized.title
                    );
                    ItemOutcome::Created {
                        source_id: assignment.id,
                        name: normalized.title,
                    }
                }
                Err(e) => ItemOutcome::Failed {
                    source_id: assignment.id,
                    name: normalized.title,
                    error: e.to_string(),
                },
            }
        });

        for outcome in join_all(tasks).await {
            match outcome {
                ItemOutcome::Created { source_id, name } => report.record_created(source_id, &name),
                ItemOutcome::Skipped => report.record_skipped(),
                ItemOutcome::Failed { source_id, name, error } => {
                    report.record_failed(source_id, &name, error)
                }
            }
        }

        report
    }
}

enum ItemOutcome {
    Created { source_id: i64, name: String },
    Skipped,
    Failed { source_id: i64, name: String, error: String },
}

fn synced_courses_from_pages(pages: &[Page]) -> Vec<SyncedCourse> {
    pages
        .iter()
        .filter(|p| !p.archived)
        .filter_map(|page| match course_source_id(page) {
            Some(canvas_course_id) => Some(SyncedCourse {
                page_id: page.id.clone(),
                canvas_course_id,
                title: page_title(page),
            }),
            None => {
                warn!("Course page {} has no Canvas id, not syncing assignments", page.id);
                None
            }
        })
        .collect()
}

fn page_title(page: &Page) -> String {
    page.properties
        .values()
        .find_map(|p| match p {
            Property::Title { .. } => p.plain_text(),
            _ => None,
        })
        .unwrap_or_default()
}

fn assignment_fields(
    assignment: &NormalizedAssignment,
    course_page_id: &str,
) -> BTreeMap<String, FieldValue> {
    BTreeMap::from([
        (
            "title".to_string(),
            FieldValue::Text(assignment.title.clone()),
        ),
        (
            "type".to_string(),
            FieldValue::Select(assignment.kind.as_str().to_string()),
        ),
        (
            "due_date".to_string(),
            FieldValue::Date(assignment.due_date.clone()),
        ),
        (
            "total_score".to_string(),
            FieldValue::Number(assignment.points_possible),
        ),
        // Canvas assignment id rides in the weighting number so later runs
        // can recognize the page.
        (
            "weighting".to_string(),
            FieldValue::Number(EmbeddedSourceId::encode(assignment.canvas_assignment_id)),
        ),
        (
            "canvas_url".to_string(),
            FieldValue::Url(assignment.canvas_url.clone()),
        ),
        (
            "description".to_string(),
            FieldValue::Text(assignment.description_snippet.clone()),
        ),
        (
            "course".to_string(),
            FieldValue::Relation(vec![course_page_id.to_string()]),
        ),
    ])
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::models::AssignmentKind;
    use crate::notion::dto::RichText;

    #[test]
    fn pages_without_a_canvas_id_are_not_course_anchors() {
        let anchored = Page {
            id: "p1".to_string(),
            properties: HashMap::from([(
                "Contact".to_string(),
                Property::RichText {
                    rich_text: vec![RichText {
                        plain_text: "Canvas ID: 4242".to_string(),
                    }],
                },
            )]),
            archived: false,
        };
        let hand_made = Page {
            id: "p2".to_string(),
            properties: HashMap::new(),
            archived: false,
        };

        let synced = synced_courses_from_pages(&[anchored, hand_made]);
        assert_eq!(synced.len(), 1);
        assert_eq!(synced[0].canvas_course_id, 4242);
    }

    #[test]
    fn assignment_fields_embed_the_source_id() {
        let normalized = NormalizedAssignment {
            title: "HW 1".to_string(),
            kind: AssignmentKind::Assignment,
            due_date: "2025-09-01".to_string(),
            points_possible: 100.0,
            canvas_assignment_id: 555_001,
            canvas_url: String::new(),
            description_snippet: String::new(),
        };
        let fields = assignment_fields(&normalized, "course-page");
        assert_eq!(
            fields.get("weighting"),
            Some(&FieldValue::Number(555_001.0))
        );
        assert_eq!(
            fields.get("course"),
            Some(&FieldValue::Relation(vec!["course-page".to_string()]))
        );
    }
}
