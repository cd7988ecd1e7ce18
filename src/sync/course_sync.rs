use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::canvas::dto::CanvasCourse;
use crate::canvas::instructor::InstructorResolver;
use crate::canvas::mapper::map_course;
use crate::canvas::term::{current_term, resolve_term};
use crate::canvas::CanvasApi;
use crate::error::AppError;
use crate::models::NormalizedCourse;
use crate::notion::schema::{project, FieldValue, TargetSchema};
use crate::notion::{NotionApi, COURSES_DATABASE};
use crate::sync::duplicate::{build_course_index, COURSE_ID_PREFIX};
use crate::sync::report::CourseSyncReport;

/// Simultaneous in-flight course creations. Small on purpose; both upstream
/// APIs throttle aggressively.
const COURSE_CONCURRENCY: usize = 3;

enum ItemOutcome {
    Created { source_id: i64, name: String },
    Skipped,
    Failed { source_id: i64, name: String, error: String },
}

/// Pushes the user's current-term Canvas courses into the Notion "Courses"
/// database. Credentials are fixed at construction; two coordinators for
/// different users can run side by side in one process.
pub struct CourseSyncService {
    canvas: Arc<dyn CanvasApi>,
    notion: Arc<dyn NotionApi>,
}

impl CourseSyncService {
    pub fn new(canvas: Arc<dyn CanvasApi>, notion: Arc<dyn NotionApi>) -> Self {
        Self { canvas, notion }
    }

    pub async fn sync(&self) -> Result<CourseSyncReport, AppError> {
        let database_id = self
            .notion
            .search_database_id(COURSES_DATABASE)
            .await?
            .ok_or(AppError::NotFound)?;
        let schema = self.notion.get_database_schema(&database_id).await?;

        let all_courses = self.canvas.get_enrolled_courses().await?;
        let term = current_term();
        let courses: Vec<CanvasCourse> = all_courses
            .into_iter()
            .filter(|c| is_in_term(c, &term))
            .collect();
        info!("Found {} course(s) in {}", courses.len(), term);

        let existing_pages = self.notion.query_database_pages(&database_id).await?;
        let index = build_course_index(&existing_pages);

        let semaphore = Semaphore::new(COURSE_CONCURRENCY);
        let tasks = courses
            .iter()
            .map(|course| self.sync_one(course, &database_id, &schema, &index, &semaphore));
        let outcomes = join_all(tasks).await;

        let mut report = CourseSyncReport {
            found: courses.len(),
            ..Default::default()
        };
        for outcome in outcomes {
            match outcome {
                ItemOutcome::Created { source_id, name } => report.record_created(source_id, &name),
                ItemOutcome::Skipped => report.record_skipped(),
                ItemOutcome::Failed { source_id, name, error } => {
                    report.record_failed(source_id, &name, error)
                }
            }
        }

        info!(
            "Course sync done: {} found, {} created, {} skipped, {} failed",
            report.found, report.created, report.skipped, report.failed
        );
        Ok(report)
    }

    async fn sync_one(
        &self,
        course: &CanvasCourse,
        database_id: &str,
        schema: &TargetSchema,
        index: &HashSet<i64>,
        semaphore: &Semaphore,
    ) -> ItemOutcome {
        // The index is read-only for the whole run; a never-seen course id
        // appearing twice in one batch would be created twice.
        if index.contains(&course.id) {
            return ItemOutcome::Skipped;
        }

        let _permit = semaphore.acquire().await.ok();

        let name = course.name.clone().unwrap_or_default();
        let instructors = match InstructorResolver::new(self.canvas.clone())
            .resolve(course.id)
            .await
        {
            Ok(instructors) => instructors,
            Err(e) => {
                warn!("Instructor lookup failed for course {}: {}", course.id, e);
                return ItemOutcome::Failed {
                    source_id: course.id,
                    name,
                    error: e.to_string(),
                };
            }
        };

        let normalized = map_course(course, &instructors);
        let properties = project(&course_fields(&normalized), schema);

        match self.notion.create_page(database_id, properties).await {
            Ok(page_id) => {
                info!("Created course page {} for '{}'", page_id, normalized.title);
                ItemOutcome::Created {
                    source_id: course.id,
                    name: normalized.title,
                }
            }
            Err(e) => ItemOutcome::Failed {
                source_id: course.id,
                name: normalized.title,
                error: e.to_string(),
            },
        }
    }
}

/// A course with no parsable start date is assumed to belong to the current
/// term rather than being dropped.
fn is_in_term(course: &CanvasCourse, term: &str) -> bool {
    match course.start_at.as_deref() {
        None | Some("") => true,
        Some(start) => resolve_term(start) == term,
    }
}

fn course_fields(course: &NormalizedCourse) -> BTreeMap<String, FieldValue> {
    BTreeMap::from([
        ("title".to_string(), FieldValue::Text(course.title.clone())),
        (
            "course_code".to_string(),
            FieldValue::Text(course.course_code.clone()),
        ),
        (
            "professor".to_string(),
            FieldValue::Text(course.professor.clone()),
        ),
        ("term".to_string(), FieldValue::Select(course.term.clone())),
        (
            "start_date".to_string(),
            FieldValue::Date(course.start_date.clone()),
        ),
        (
            "canvas_url".to_string(),
            FieldValue::Url(course.canvas_url.clone()),
        ),
        (
            "contact".to_string(),
            FieldValue::Text(format!("{}{}", COURSE_ID_PREFIX, course.canvas_course_id)),
        ),
        (
            "canvas_course_id".to_string(),
            FieldValue::Number(course.canvas_course_id as f64),
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course_starting(start_at: Option<&str>) -> CanvasCourse {
        CanvasCourse {
            id: 1,
            name: Some("Networks - CS-3251".to_string()),
            course_code: None,
            start_at: start_at.map(str::to_string),
            end_at: None,
            html_url: None,
            teachers: Vec::new(),
            total_students: None,
        }
    }

    #[test]
    fn course_without_start_date_counts_as_current() {
        assert!(is_in_term(&course_starting(None), "Fall 2025"));
        assert!(is_in_term(&course_starting(Some("")), "Fall 2025"));
    }

    #[test]
    fn course_from_another_term_is_filtered_out() {
        let old = course_starting(Some("2024-01-08T00:00:00Z"));
        assert!(!is_in_term(&old, "Fall 2025"));
        let current = course_starting(Some("2025-08-18T00:00:00Z"));
        assert!(is_in_term(&current, "Fall 2025"));
    }

    #[test]
    fn course_fields_carry_the_id_marker() {
        let normalized = NormalizedCourse {
            title: "Networks".to_string(),
            course_code: "CS-3251".to_string(),
            professor: String::new(),
            term: "Fall 2025".to_string(),
            start_date: "2025-08-18".to_string(),
            canvas_course_id: 4242,
            canvas_url: String::new(),
        };
        let fields = course_fields(&normalized);
        assert_eq!(
            fields.get("contact"),
            Some(&FieldValue::Text("Canvas ID: 4242".to_string()))
        );
        assert_eq!(
            fields.get("canvas_course_id"),
            Some(&FieldValue::Number(4242.0))
        );
    }
}
