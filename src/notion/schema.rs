use std::collections::BTreeMap;

use serde_json::json;
use tracing::debug;

use crate::notion::dto::DatabaseResponse;

/// Property types we know how to write. Everything Notion computes on its
/// own (formula, rollup, created_time, ...) is carried as `Unsupported` and
/// never written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyKind {
    Title,
    RichText,
    Number,
    Select,
    MultiSelect,
    Date,
    Checkbox,
    Url,
    Relation,
    Unsupported(String),
}

impl PropertyKind {
    fn from_type_name(name: &str) -> Self {
        match name {
            "title" => PropertyKind::Title,
            "rich_text" => PropertyKind::RichText,
            "number" => PropertyKind::Number,
            "select" => PropertyKind::Select,
            "multi_select" => PropertyKind::MultiSelect,
            "date" => PropertyKind::Date,
            "checkbox" => PropertyKind::Checkbox,
            "url" => PropertyKind::Url,
            "relation" => PropertyKind::Relation,
            other => PropertyKind::Unsupported(other.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SchemaProperty {
    pub kind: PropertyKind,
    pub options: Vec<String>,
}

/// The property layout of one Notion database, discovered at runtime. Every
/// user's workspace can differ, so nothing about this shape is assumed at
/// compile time.
#[derive(Debug, Clone, Default)]
pub struct TargetSchema {
    pub database_id: String,
    pub properties: BTreeMap<String, SchemaProperty>,
}

impl TargetSchema {
    pub fn from_response(response: DatabaseResponse) -> Self {
        let mut properties = BTreeMap::new();
        for (name, dto) in response.properties {
            let options = dto
                .select
                .or(dto.multi_select)
                .map(|list| list.options.into_iter().map(|o| o.name).collect())
                .unwrap_or_default();
            properties.insert(
                name,
                SchemaProperty {
                    kind: PropertyKind::from_type_name(&dto.kind),
                    options,
                },
            );
        }
        Self { database_id: response.id, properties }
    }

    #[cfg(test)]
    pub fn from_pairs(pairs: &[(&str, PropertyKind)]) -> Self {
        let properties = pairs
            .iter()
            .map(|(name, kind)| {
                (
                    name.to_string(),
                    SchemaProperty { kind: kind.clone(), options: Vec::new() },
                )
            })
            .collect();
        Self { database_id: "test-db".to_string(), properties }
    }
}

/// A value a normalized record offers for projection into the schema.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Select(String),
    MultiSelect(Vec<String>),
    Date(String),
    Checkbox(bool),
    Url(String),
    Relation(Vec<String>),
}

fn normalize_key(key: &str) -> String {
    key.to_lowercase().replace([' ', '-'], "_")
}

/// Projects a normalized record's fields onto a discovered database schema,
/// producing the `properties` payload for a page-create call.
///
/// Matching is by normalized name (case and spacing ignored). Only non-empty
/// values are emitted; properties the schema lacks are dropped; the single
/// title-typed property is always filled from the `title` field no matter
/// what it is called; computed property types are never written.
pub fn project(fields: &BTreeMap<String, FieldValue>, schema: &TargetSchema) -> serde_json::Value {
    let mut properties = serde_json::Map::new();

    for (prop_name, prop) in &schema.properties {
        if prop.kind == PropertyKind::Title {
            if let Some(FieldValue::Text(title)) = fields.get("title") {
                if !title.is_empty() {
                    properties.insert(
                        prop_name.clone(),
                        json!({ "title": [{ "text": { "content": title } }] }),
                    );
                }
            }
            continue;
        }

        if let PropertyKind::Unsupported(kind) = &prop.kind {
            debug!("Skipping unsupported property '{}' of type {}", prop_name, kind);
            continue;
        }

        let Some(value) = fields.get(&normalize_key(prop_name)) else {
            continue;
        };

        if let Some(rendered) = render_value(&prop.kind, value) {
            properties.insert(prop_name.clone(), rendered);
        }
    }

    serde_json::Value::Object(properties)
}

fn render_value(kind: &PropertyKind, value: &FieldValue) -> Option<serde_json::Value> {
    match (kind, value) {
        (PropertyKind::RichText, FieldValue::Text(text)) if !text.is_empty() => {
            Some(json!({ "rich_text": [{ "text": { "content": text } }] }))
        }
        (PropertyKind::Number, FieldValue::Number(number)) => {
            Some(json!({ "number": number }))
        }
        (PropertyKind::Select, FieldValue::Select(name) | FieldValue::Text(name))
            if !name.is_empty() =>
        {
            Some(json!({ "select": { "name": name } }))
        }
        (PropertyKind::MultiSelect, FieldValue::MultiSelect(names)) if !names.is_empty() => {
            let items: Vec<_> = names.iter().map(|n| json!({ "name": n })).collect();
            Some(json!({ "multi_select": items }))
        }
        (PropertyKind::MultiSelect, FieldValue::Select(name) | FieldValue::Text(name))
            if !name.is_empty() =>
        {
            Some(json!({ "multi_select": [{ "name": name }] }))
        }
        (PropertyKind::Date, FieldValue::Date(start)) if !start.is_empty() => {
            Some(json!({ "date": { "start": start } }))
        }
        (PropertyKind::Checkbox, FieldValue::Checkbox(checked)) => {
            Some(json!({ "checkbox": checked }))
        }
        (PropertyKind::Url, FieldValue::Url(url) | FieldValue::Text(url)) if !url.is_empty() => {
            Some(json!({ "url": url }))
        }
        (PropertyKind::Relation, FieldValue::Relation(ids)) if !ids.is_empty() => {
            let items: Vec<_> = ids.iter().map(|id| json!({ "id": id })).collect();
            Some(json!({ "relation": items }))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, FieldValue)]) -> BTreeMap<String, FieldValue> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn title_property_is_filled_regardless_of_its_name() {
        let schema = TargetSchema::from_pairs(&[("Name", PropertyKind::Title)]);
        let projected = project(
            &fields(&[("title", FieldValue::Text("Networks".to_string()))]),
            &schema,
        );
        assert_eq!(
            projected["Name"]["title"][0]["text"]["content"],
            "Networks"
        );
    }

    #[test]
    fn matching_ignores_case_and_spaces() {
        let schema = TargetSchema::from_pairs(&[
            ("Name", PropertyKind::Title),
            ("Course Code", PropertyKind::RichText),
        ]);
        let projected = project(
            &fields(&[
                ("title", FieldValue::Text("Networks".to_string())),
                ("course_code", FieldValue::Text("CS-3251".to_string())),
            ]),
            &schema,
        );
        assert_eq!(
            projected["Course Code"]["rich_text"][0]["text"]["content"],
            "CS-3251"
        );
    }

    #[test]
    fn properties_missing_from_the_schema_are_dropped() {
        let schema = TargetSchema::from_pairs(&[("Name", PropertyKind::Title)]);
        let projected = project(
            &fields(&[
                ("title", FieldValue::Text("Networks".to_string())),
                ("professor", FieldValue::Text("Dr. Who".to_string())),
            ]),
            &schema,
        );
        assert!(projected.get("professor").is_none());
        assert!(projected.get("Professor").is_none());
    }

    #[test]
    fn computed_properties_are_never_written() {
        let schema = TargetSchema::from_pairs(&[
            ("Name", PropertyKind::Title),
            ("Grade", PropertyKind::Unsupported("formula".to_string())),
        ]);
        let projected = project(
            &fields(&[
                ("title", FieldValue::Text("Networks".to_string())),
                ("grade", FieldValue::Number(95.0)),
            ]),
            &schema,
        );
        assert!(projected.get("Grade").is_none());
    }

    #[test]
    fn empty_values_are_not_emitted() {
        let schema = TargetSchema::from_pairs(&[
            ("Name", PropertyKind::Title),
            ("Professor", PropertyKind::RichText),
            ("Due Date", PropertyKind::Date),
        ]);
        let projected = project(
            &fields(&[
                ("title", FieldValue::Text("Networks".to_string())),
                ("professor", FieldValue::Text(String::new())),
                ("due_date", FieldValue::Date(String::new())),
            ]),
            &schema,
        );
        assert!(projected.get("Professor").is_none());
        assert!(projected.get("Due Date").is_none());
    }

    #[test]
    fn zero_is_a_legitimate_number() {
        let schema = TargetSchema::from_pairs(&[
            ("Name", PropertyKind::Title),
            ("Total Score", PropertyKind::Number),
        ]);
        let projected = project(
            &fields(&[
                ("title", FieldValue::Text("Quiz".to_string())),
                ("total_score", FieldValue::Number(0.0)),
            ]),
            &schema,
        );
        assert_eq!(projected["Total Score"]["number"], 0.0);
    }

    #[test]
    fn select_accepts_plain_text_values() {
        let schema = TargetSchema::from_pairs(&[
            ("Name", PropertyKind::Title),
            ("Term", PropertyKind::Select),
        ]);
        let projected = project(
            &fields(&[
                ("title", FieldValue::Text("Networks".to_string())),
                ("term", FieldValue::Text("Fall 2025".to_string())),
            ]),
            &schema,
        );
        assert_eq!(projected["Term"]["select"]["name"], "Fall 2025");
    }
}
