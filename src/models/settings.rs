use serde::{Deserialize, Serialize};

/// Per-user credentials for both upstream systems. Stored once, read at
/// coordinator construction time.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UserSettings {
    pub user_id: String,
    pub canvas_base_url: String,
    pub canvas_pat: String,
    pub notion_token: String,
    pub notion_parent_page_id: Option<String>,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSettingsRequest {
    pub canvas_base_url: String,
    pub canvas_pat: String,
    pub notion_token: String,
    #[serde(default)]
    pub notion_parent_page_id: Option<String>,
}

/// Settings echoed back to the client. Tokens stay server-side.
#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub user_id: String,
    pub canvas_base_url: String,
    pub has_canvas_pat: bool,
    pub has_notion_token: bool,
    pub notion_parent_page_id: Option<String>,
    pub updated_at: String,
}

impl From<UserSettings> for SettingsResponse {
    fn from(settings: UserSettings) -> Self {
        Self {
            user_id: settings.user_id,
            canvas_base_url: settings.canvas_base_url,
            has_canvas_pat: !settings.canvas_pat.is_empty(),
            has_notion_token: !settings.notion_token.is_empty(),
            notion_parent_page_id: settings.notion_parent_page_id,
            updated_at: settings.updated_at,
        }
    }
}
