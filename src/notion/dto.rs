use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Deserialize)]
pub struct QueryDatabaseResponse {
    pub results: Vec<Page>,
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Page {
    pub id: String,
    pub properties: HashMap<String, Property>,
    #[serde(default)]
    pub archived: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Property {
    Title { title: Vec<RichText> },
    RichText { rich_text: Vec<RichText> },
    Number { number: Option<f64> },
    Select { select: Option<SelectOption> },
    MultiSelect { multi_select: Vec<SelectOption> },
    Date { date: Option<DateValue> },
    Checkbox { checkbox: bool },
    Relation { relation: Vec<Relation> },
    Url { url: Option<String> },
    #[serde(other)]
    Unknown,
}

impl Property {
    /// Concatenated plain text for title and rich_text properties.
    pub fn plain_text(&self) -> Option<String> {
        match self {
            Property::Title { title } => Some(join_plain_text(title)),
            Property::RichText { rich_text } => Some(join_plain_text(rich_text)),
            _ => None,
        }
    }

    pub fn number(&self) -> Option<f64> {
        match self {
            Property::Number { number } => *number,
            _ => None,
        }
    }
}

fn join_plain_text(parts: &[RichText]) -> String {
    parts
        .iter()
        .map(|t| t.plain_text.as_str())
        .collect::<Vec<_>>()
        .join("")
}

#[derive(Debug, Clone, Deserialize)]
pub struct RichText {
    pub plain_text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelectOption {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DateValue {
    pub start: String,
    #[serde(default)]
    pub end: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Relation {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct QueryDatabaseRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_cursor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
pub struct SearchResult {
    pub id: String,
    pub object: String,
    #[serde(default)]
    pub title: Vec<RichText>,
}

#[derive(Debug, Deserialize)]
pub struct DatabaseResponse {
    pub id: String,
    pub properties: HashMap<String, SchemaPropertyDto>,
}

#[derive(Debug, Deserialize)]
pub struct SchemaPropertyDto {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub select: Option<OptionList>,
    #[serde(default)]
    pub multi_select: Option<OptionList>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OptionList {
    #[serde(default)]
    pub options: Vec<SelectOption>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePageResponse {
    pub id: String,
}
