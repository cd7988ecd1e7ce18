pub mod dto;
pub mod instructor;
pub mod mapper;
pub mod term;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::AppError;

use dto::{CanvasAssignment, CanvasCourse, CanvasEnrollment, CanvasSection, CanvasUser};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const PER_PAGE: usize = 100;

pub const TEACHER_ENROLLMENT: &str = "TeacherEnrollment";
pub const TA_ENROLLMENT: &str = "TaEnrollment";

/// Read-side Canvas LMS API. Implemented over HTTP in production and by
/// in-memory fakes in tests.
#[async_trait]
pub trait CanvasApi: Send + Sync {
    async fn get_self_profile(&self) -> Result<CanvasUser, AppError>;
    async fn get_enrolled_courses(&self) -> Result<Vec<CanvasCourse>, AppError>;
    async fn get_course_sections(&self, course_id: i64) -> Result<Vec<CanvasSection>, AppError>;
    async fn get_section_enrollments(
        &self,
        section_id: i64,
    ) -> Result<Vec<CanvasEnrollment>, AppError>;
    async fn get_course_enrollments(
        &self,
        course_id: i64,
    ) -> Result<Vec<CanvasEnrollment>, AppError>;
    async fn get_course_assignments(
        &self,
        course_id: i64,
    ) -> Result<Vec<CanvasAssignment>, AppError>;
}

pub struct CanvasHttpClient {
    client: Client,
    api_base: String,
    access_token: String,
}

impl CanvasHttpClient {
    pub fn new(base_url: &str, access_token: &str) -> Result<Self, AppError> {
        if base_url.is_empty() || access_token.is_empty() {
            return Err(AppError::Configuration(
                "Canvas base URL and access token are required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| AppError::Http(format!("Failed to build http client: {}", e)))?;

        Ok(Self {
            client,
            api_base: format!("{}/api/v1", base_url.trim_end_matches('/')),
            access_token: access_token.to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<T, AppError> {
        let url = format!("{}/{}", self.api_base, endpoint);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(query)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::canvas(status, body));
        }

        Ok(response.json::<T>().await?)
    }

    /// Fetches every page of a list endpoint, advancing the `page` parameter
    /// until Canvas returns a short page. Callers always get the complete
    /// result set for a query.
    async fn get_paginated<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, AppError> {
        let mut all = Vec::new();
        let mut page = 1usize;

        loop {
            let mut params: Vec<(&str, String)> = query.to_vec();
            params.push(("per_page", PER_PAGE.to_string()));
            params.push(("page", page.to_string()));

            let batch: Vec<T> = self.get_json(endpoint, &params).await?;
            let batch_len = batch.len();
            all.extend(batch);

            debug!("canvas {}: page {} returned {} items", endpoint, page, batch_len);

            if batch_len < PER_PAGE {
                break;
            }
            page += 1;
        }

        Ok(all)
    }
}

#[async_trait]
impl CanvasApi for CanvasHttpClient {
    async fn get_self_profile(&self) -> Result<CanvasUser, AppError> {
        self.get_json("users/self", &[]).await
    }

    async fn get_enrolled_courses(&self) -> Result<Vec<CanvasCourse>, AppError> {
        self.get_paginated(
            "courses",
            &[
                ("enrollment_state", "active".to_string()),
                ("include[]", "teachers".to_string()),
                ("include[]", "term".to_string()),
                ("include[]", "total_students".to_string()),
            ],
        )
        .await
    }

    async fn get_course_sections(&self, course_id: i64) -> Result<Vec<CanvasSection>, AppError> {
        self.get_paginated(&format!("courses/{}/sections", course_id), &[])
            .await
    }

    async fn get_section_enrollments(
        &self,
        section_id: i64,
    ) -> Result<Vec<CanvasEnrollment>, AppError> {
        self.get_paginated(
            &format!("sections/{}/enrollments", section_id),
            &[
                ("type[]", TEACHER_ENROLLMENT.to_string()),
                ("state[]", "active".to_string()),
                ("include[]", "user".to_string()),
            ],
        )
        .await
    }

    async fn get_course_enrollments(
        &self,
        course_id: i64,
    ) -> Result<Vec<CanvasEnrollment>, AppError> {
        self.get_paginated(
            &format!("courses/{}/enrollments", course_id),
            &[
                ("type[]", TEACHER_ENROLLMENT.to_string()),
                ("type[]", TA_ENROLLMENT.to_string()),
                ("include[]", "user".to_string()),
            ],
        )
        .await
    }

    async fn get_course_assignments(
        &self,
        course_id: i64,
    ) -> Result<Vec<CanvasAssignment>, AppError> {
        self.get_paginated(&format!("courses/{}/assignments", course_id), &[])
            .await
    }
}
