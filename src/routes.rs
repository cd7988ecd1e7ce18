use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::canvas::{CanvasApi, CanvasHttpClient};
use crate::db::repository;
use crate::error::AppError;
use crate::models::{
    SettingsResponse, SyncLog, UpdateSettingsRequest, UserSettings, SYNC_STATUS_FAILED,
    SYNC_STATUS_SUCCESS, SYNC_TYPE_ASSIGNMENTS, SYNC_TYPE_COURSES,
};
use crate::notion::{NotionApi, NotionHttpClient};
use crate::state::AppState;
use crate::sync::{AssignmentSyncService, CourseSyncService};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/settings/{user}", put(put_settings).get(get_settings))
        .route("/canvas/test", post(canvas_test))
        .route("/sync/courses/{user}", post(sync_courses))
        .route("/sync/assignments/{user}", post(sync_assignments))
        .route("/sync/status/{user}", get(sync_status))
        .route("/sync/logs/{user}", get(sync_logs))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("select 1").execute(&state.db).await {
        Ok(_) => StatusCode::OK,
        Err(err) => {
            error!("health check failed: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

async fn put_settings(
    Path(user): Path<String>,
    State(state): State<AppState>,
    Json(req): Json<UpdateSettingsRequest>,
) -> Result<Json<SettingsResponse>, AppError> {
    if req.canvas_base_url.is_empty() || req.canvas_pat.is_empty() || req.notion_token.is_empty() {
        return Err(AppError::Configuration(
            "canvas_base_url, canvas_pat and notion_token are required".to_string(),
        ));
    }

    let settings = repository::upsert_settings(&state.db, &user, req).await?;
    Ok(Json(settings.into()))
}

async fn get_settings(
    Path(user): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<SettingsResponse>, AppError> {
    let settings = load_settings(&state, &user).await?;
    Ok(Json(settings.into()))
}

#[derive(Deserialize)]
struct CanvasTestRequest {
    canvas_base_url: String,
    canvas_pat: String,
}

#[derive(Serialize)]
struct CanvasTestResponse {
    ok: bool,
    user_name: String,
}

/// Verifies Canvas credentials by fetching the token owner's profile, so the
/// client can validate before saving settings.
async fn canvas_test(
    Json(req): Json<CanvasTestRequest>,
) -> Result<Json<CanvasTestResponse>, AppError> {
    let canvas = CanvasHttpClient::new(&req.canvas_base_url, &req.canvas_pat)?;
    let profile = canvas.get_self_profile().await?;
    Ok(Json(CanvasTestResponse {
        ok: true,
        user_name: profile.name,
    }))
}

async fn sync_courses(
    Path(user): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<crate::sync::CourseSyncReport>, AppError> {
    let settings = load_settings(&state, &user).await?;
    let (canvas, notion) = build_clients(&settings)?;
    run_course_sync(&state.db, &user, canvas, notion)
        .await
        .map(Json)
}

async fn sync_assignments(
    Path(user): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<crate::sync::AssignmentSyncReport>, AppError> {
    let settings = load_settings(&state, &user).await?;
    let (canvas, notion) = build_clients(&settings)?;
    run_assignment_sync(&state.db, &user, canvas, notion)
        .await
        .map(Json)
}

/// Runs a course sync and writes exactly one log row for the invocation,
/// whether it produced a report or died on a hard error.
pub async fn run_course_sync(
    db: &sqlx::SqlitePool,
    user: &str,
    canvas: Arc<dyn CanvasApi>,
    notion: Arc<dyn NotionApi>,
) -> Result<crate::sync::CourseSyncReport, AppError> {
    let result = CourseSyncService::new(canvas, notion).sync().await;
    match &result {
        Ok(report) => {
            repository::record_sync_log(
                db,
                user,
                SYNC_TYPE_COURSES,
                SYNC_STATUS_SUCCESS,
                report.found as i64,
                report.created as i64,
                report.failed as i64,
                report.skipped as i64,
                serde_json::to_string(report).ok(),
            )
            .await;
        }
        Err(e) => {
            repository::record_sync_log(
                db,
                user,
                SYNC_TYPE_COURSES,
                SYNC_STATUS_FAILED,
                0,
                0,
                0,
                0,
                Some(e.to_string()),
            )
            .await;
        }
    }
    result
}

/// Assignment-sync counterpart of [`run_course_sync`].
pub async fn run_assignment_sync(
    db: &sqlx::SqlitePool,
    user: &str,
    canvas: Arc<dyn CanvasApi>,
    notion: Arc<dyn NotionApi>,
) -> Result<crate::sync::AssignmentSyncReport, AppError> {
    let result = AssignmentSyncService::new(canvas, notion).sync().await;
    match &result {
        Ok(report) => {
            repository::record_sync_log(
                db,
                user,
                SYNC_TYPE_ASSIGNMENTS,
                SYNC_STATUS_SUCCESS,
                report.found as i64,
                report.created as i64,
                report.failed as i64,
                report.skipped as i64,
                serde_json::to_string(report).ok(),
            )
            .await;
        }
        Err(e) => {
            repository::record_sync_log(
                db,
                user,
                SYNC_TYPE_ASSIGNMENTS,
                SYNC_STATUS_FAILED,
                0,
                0,
                0,
                0,
                Some(e.to_string()),
            )
            .await;
        }
    }
    result
}

#[derive(Serialize)]
struct SyncStatusResponse {
    last_course_sync: Option<SyncLog>,
    last_assignment_sync: Option<SyncLog>,
}

async fn sync_status(
    Path(user): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<SyncStatusResponse>, AppError> {
    let last_course_sync =
        repository::fetch_latest_sync_log(&state.db, &user, SYNC_TYPE_COURSES).await?;
    let last_assignment_sync =
        repository::fetch_latest_sync_log(&state.db, &user, SYNC_TYPE_ASSIGNMENTS).await?;
    Ok(Json(SyncStatusResponse {
        last_course_sync,
        last_assignment_sync,
    }))
}

#[derive(Deserialize)]
struct LogsQuery {
    #[serde(default = "default_log_limit")]
    limit: i64,
}

fn default_log_limit() -> i64 {
    20
}

async fn sync_logs(
    Path(user): Path<String>,
    State(state): State<AppState>,
    Query(query): Query<LogsQuery>,
) -> Result<Json<Vec<SyncLog>>, AppError> {
    let logs = repository::fetch_sync_logs(&state.db, &user, query.limit.clamp(1, 200)).await?;
    Ok(Json(logs))
}

async fn load_settings(state: &AppState, user: &str) -> Result<UserSettings, AppError> {
    repository::fetch_settings(&state.db, user)
        .await?
        .ok_or_else(|| AppError::Configuration(format!("No settings stored for user {}", user)))
}

fn build_clients(
    settings: &UserSettings,
) -> Result<(Arc<dyn CanvasApi>, Arc<dyn NotionApi>), AppError> {
    let canvas = CanvasHttpClient::new(&settings.canvas_base_url, &settings.canvas_pat)?;
    let notion = NotionHttpClient::new(&settings.notion_token)?;
    Ok((Arc::new(canvas), Arc::new(notion)))
}
