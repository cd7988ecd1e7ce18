use std::collections::HashSet;
use std::sync::Arc;

use tracing::{info, warn};

use crate::canvas::dto::{CanvasEnrollment, CanvasSection};
use crate::canvas::{CanvasApi, TA_ENROLLMENT, TEACHER_ENROLLMENT};
use crate::error::AppError;
use crate::models::{Instructor, InstructorRole};

/// Resolves the authoritative instructors for a course.
///
/// Sections are checked first because section-level TeacherEnrollments name
/// the actual professor; the course-wide enrollment list also contains TAs
/// and is only consulted when the sections yield nothing. An empty result is
/// a valid outcome, not an error.
pub struct InstructorResolver {
    canvas: Arc<dyn CanvasApi>,
}

impl InstructorResolver {
    pub fn new(canvas: Arc<dyn CanvasApi>) -> Self {
        Self { canvas }
    }

    pub async fn resolve(&self, course_id: i64) -> Result<Vec<Instructor>, AppError> {
        let from_sections = self.resolve_from_sections(course_id).await?;
        if !from_sections.is_empty() {
            info!(
                "Resolved {} instructor(s) for course {} via sections",
                from_sections.len(),
                course_id
            );
            return Ok(from_sections);
        }

        let from_enrollments = self.resolve_from_course_enrollments(course_id).await?;
        if from_enrollments.is_empty() {
            warn!("No instructors found for course {}", course_id);
        } else {
            info!(
                "Resolved {} instructor(s) for course {} via course enrollments",
                from_enrollments.len(),
                course_id
            );
        }
        Ok(from_enrollments)
    }

    /// Tier 1: active TeacherEnrollments on each section, de-duplicated by
    /// user id so a professor teaching several sections appears once.
    async fn resolve_from_sections(&self, course_id: i64) -> Result<Vec<Instructor>, AppError> {
        let sections = self.canvas.get_course_sections(course_id).await?;
        if sections.is_empty() {
            return Ok(Vec::new());
        }

        let mut instructors = Vec::new();
        let mut seen_ids: HashSet<i64> = HashSet::new();

        for section in &sections {
            let enrollments = match self.canvas.get_section_enrollments(section.id).await {
                Ok(enrollments) => enrollments,
                Err(e) => {
                    warn!("Failed to get enrollments for section {}: {}", section.id, e);
                    continue;
                }
            };

            for enrollment in &enrollments {
                if enrollment.kind != TEACHER_ENROLLMENT {
                    continue;
                }
                if let Some(instructor) = instructor_from_section_enrollment(enrollment, section) {
                    if seen_ids.insert(instructor.id) {
                        instructors.push(instructor);
                    }
                }
            }
        }

        Ok(instructors)
    }

    /// Tier 2: course-wide enrollments filtered to teachers and TAs, with
    /// teachers ordered first so the displayed "primary" skews away from TAs.
    async fn resolve_from_course_enrollments(
        &self,
        course_id: i64,
    ) -> Result<Vec<Instructor>, AppError> {
        let enrollments = self.canvas.get_course_enrollments(course_id).await?;

        let mut teachers = Vec::new();
        let mut tas = Vec::new();

        for enrollment in &enrollments {
            let role = match enrollment.kind.as_str() {
                TEACHER_ENROLLMENT => InstructorRole::Teacher,
                TA_ENROLLMENT => InstructorRole::Ta,
                _ => continue,
            };

            let Some(user) = &enrollment.user else {
                continue;
            };

            let instructor = Instructor {
                id: user.id,
                display_name: user.name.clone(),
                login_id: user.login_id.clone(),
                role,
                section_name: None,
                section_id: None,
            };

            match role {
                InstructorRole::Teacher => teachers.push(instructor),
                InstructorRole::Ta => tas.push(instructor),
            }
        }

        teachers.extend(tas);
        Ok(teachers)
    }
}

fn instructor_from_section_enrollment(
    enrollment: &CanvasEnrollment,
    section: &CanvasSection,
) -> Option<Instructor> {
    let user = enrollment.user.as_ref()?;
    Some(Instructor {
        id: user.id,
        display_name: user.name.clone(),
        login_id: user.login_id.clone(),
        role: InstructorRole::Teacher,
        section_name: section.name.clone(),
        section_id: Some(section.id),
    })
}
