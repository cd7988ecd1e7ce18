pub mod dto;
pub mod schema;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use crate::error::AppError;

use dto::{
    CreatePageResponse, DatabaseResponse, Page, QueryDatabaseRequest, QueryDatabaseResponse,
    SearchResponse,
};
use schema::TargetSchema;

const NOTION_API_BASE: &str = "https://api.notion.com/v1";
const NOTION_VERSION: &str = "2022-06-28";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const PAGE_SIZE: u32 = 100;

/// Databases the sync writes into, located by title in the user's workspace.
pub const COURSES_DATABASE: &str = "Courses";
pub const ASSIGNMENTS_DATABASE: &str = "Assignments/Exams";

/// Notion workspace operations the sync needs. Implemented over HTTP in
/// production and by in-memory fakes in tests.
#[async_trait]
pub trait NotionApi: Send + Sync {
    /// Finds a database shared with the integration by exact title match
    /// (case-insensitive). Returns None when the workspace has no such
    /// database.
    async fn search_database_id(&self, name: &str) -> Result<Option<String>, AppError>;

    async fn get_database_schema(&self, database_id: &str) -> Result<TargetSchema, AppError>;

    /// Fetches every page in a database, following cursors until Notion
    /// reports no more results.
    async fn query_database_pages(&self, database_id: &str) -> Result<Vec<Page>, AppError>;

    /// Creates a page in a database and returns its id. `properties` must
    /// already be shaped for the database's schema.
    async fn create_page(
        &self,
        database_id: &str,
        properties: serde_json::Value,
    ) -> Result<String, AppError>;
}

pub struct NotionHttpClient {
    client: Client,
    api_token: String,
}

impl NotionHttpClient {
    pub fn new(api_token: &str) -> Result<Self, AppError> {
        if api_token.is_empty() {
            return Err(AppError::Configuration(
                "Notion API token is required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| AppError::Http(format!("Failed to build http client: {}", e)))?;

        Ok(Self {
            client,
            api_token: api_token.to_string(),
        })
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &serde_json::Value,
    ) -> Result<T, AppError> {
        let url = format!("{}/{}", NOTION_API_BASE, endpoint);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_token)
            .header("Notion-Version", NOTION_VERSION)
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::notion(status, body));
        }

        Ok(response.json::<T>().await?)
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, AppError> {
        let url = format!("{}/{}", NOTION_API_BASE, endpoint);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_token)
            .header("Notion-Version", NOTION_VERSION)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::notion(status, body));
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl NotionApi for NotionHttpClient {
    async fn search_database_id(&self, name: &str) -> Result<Option<String>, AppError> {
        let body = json!({
            "query": name,
            "filter": { "property": "object", "value": "database" }
        });
        let response: SearchResponse = self.post_json("search", &body).await?;

        let wanted = name.to_lowercase();
        let found = response
            .results
            .into_iter()
            .filter(|r| r.object == "database")
            .find(|r| {
                let title: String = r.title.iter().map(|t| t.plain_text.as_str()).collect();
                title.trim().to_lowercase() == wanted
            })
            .map(|r| r.id);

        Ok(found)
    }

    async fn get_database_schema(&self, database_id: &str) -> Result<TargetSchema, AppError> {
        let response: DatabaseResponse =
            self.get_json(&format!("databases/{}", database_id)).await?;
        Ok(TargetSchema::from_response(response))
    }

    async fn query_database_pages(&self, database_id: &str) -> Result<Vec<Page>, AppError> {
        let endpoint = format!("databases/{}/query", database_id);
        let mut pages = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let request = QueryDatabaseRequest {
                filter: None,
                start_cursor: cursor.clone(),
                page_size: Some(PAGE_SIZE),
            };
            let body = serde_json::to_value(&request)
                .map_err(|e| AppError::Http(format!("Failed to encode query: {}", e)))?;

            let response: QueryDatabaseResponse = self.post_json(&endpoint, &body).await?;
            let batch_len = response.results.len();
            pages.extend(response.results);

            debug!(
                "notion database {}: batch of {} pages (has_more={})",
                database_id, batch_len, response.has_more
            );

            if !response.has_more {
                break;
            }
            cursor = response.next_cursor;
            if cursor.is_none() {
                break;
            }
        }

        Ok(pages)
    }

    async fn create_page(
        &self,
        database_id: &str,
        properties: serde_json::Value,
    ) -> Result<String, AppError> {
        let body = json!({
            "parent": { "database_id": database_id },
            "properties": properties
        });
        let response: CreatePageResponse = self.post_json("pages", &body).await?;
        Ok(response.id)
    }
}
