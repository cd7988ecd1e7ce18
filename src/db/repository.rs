use chrono::Utc;
use sqlx::SqlitePool;
use tracing::warn;
use uuid::Uuid;

use crate::models::{SyncLog, UpdateSettingsRequest, UserSettings};

pub async fn fetch_settings(
    db: &SqlitePool,
    user_id: &str,
) -> Result<Option<UserSettings>, sqlx::Error> {
    sqlx::query_as::<_, UserSettings>(
        r#"
        SELECT user_id, canvas_base_url, canvas_pat, notion_token,
               notion_parent_page_id, updated_at
        FROM user_settings
        WHERE user_id = ?1
        "#,
    )
    .bind(user_id)
    .fetch_optional(db)
    .await
}

pub async fn upsert_settings(
    db: &SqlitePool,
    user_id: &str,
    req: UpdateSettingsRequest,
) -> Result<UserSettings, sqlx::Error> {
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO user_settings
            (user_id, canvas_base_url, canvas_pat, notion_token,
            notion_parent_page_id, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        ON CONFLICT (user_id) DO UPDATE SET
            canvas_base_url = excluded.canvas_base_url,
            canvas_pat = excluded.canvas_pat,
            notion_token = excluded.notion_token,
            notion_parent_page_id = excluded.notion_parent_page_id,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(user_id)
    .bind(&req.canvas_base_url)
    .bind(&req.canvas_pat)
    .bind(&req.notion_token)
    .bind(&req.notion_parent_page_id)
    .bind(&now)
    .execute(db)
    .await?;

    Ok(UserSettings {
        user_id: user_id.to_string(),
        canvas_base_url: req.canvas_base_url,
        canvas_pat: req.canvas_pat,
        notion_token: req.notion_token,
        notion_parent_page_id: req.notion_parent_page_id,
        updated_at: now,
    })
}

#[allow(clippy::too_many_arguments)]
pub async fn insert_sync_log(
    db: &SqlitePool,
    user_id: &str,
    sync_type: &str,
    status: &str,
    found: i64,
    created: i64,
    failed: i64,
    skipped: i64,
    detail: Option<String>,
) -> Result<(), sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO sync_logs
            (id, user_id, sync_type, status, found, created, failed, skipped, detail, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(sync_type)
    .bind(status)
    .bind(found)
    .bind(created)
    .bind(failed)
    .bind(skipped)
    .bind(detail)
    .bind(now)
    .execute(db)
    .await?;

    Ok(())
}

/// Writes one sync log row. The sync outcome has already been decided by the
/// time this runs, so a sink failure only gets a warning; it never fails the
/// sync itself.
#[allow(clippy::too_many_arguments)]
pub async fn record_sync_log(
    db: &SqlitePool,
    user_id: &str,
    sync_type: &str,
    status: &str,
    found: i64,
    created: i64,
    failed: i64,
    skipped: i64,
    detail: Option<String>,
) {
    if let Err(e) = insert_sync_log(
        db, user_id, sync_type, status, found, created, failed, skipped, detail,
    )
    .await
    {
        warn!("Failed to record sync log for {}: {}", user_id, e);
    }
}

pub async fn fetch_sync_logs(
    db: &SqlitePool,
    user_id: &str,
    limit: i64,
) -> Result<Vec<SyncLog>, sqlx::Error> {
    sqlx::query_as::<_, SyncLog>(
        r#"
        SELECT id, user_id, sync_type, status, found, created, failed, skipped, detail, created_at
        FROM sync_logs
        WHERE user_id = ?1
        ORDER BY created_at DESC
        LIMIT ?2
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(db)
    .await
}

pub async fn fetch_latest_sync_log(
    db: &SqlitePool,
    user_id: &str,
    sync_type: &str,
) -> Result<Option<SyncLog>, sqlx::Error> {
    sqlx::query_as::<_, SyncLog>(
        r#"
        SELECT id, user_id, sync_type, status, found, created, failed, skipped, detail, created_at
        FROM sync_logs
        WHERE user_id = ?1 AND sync_type = ?2
        ORDER BY created_at DESC
        LIMIT 1
        "#,
    )
    .bind(user_id)
    .bind(sync_type)
    .fetch_optional(db)
    .await
}
