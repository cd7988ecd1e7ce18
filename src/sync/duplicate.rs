use std::collections::HashSet;

use tracing::warn;

use crate::notion::dto::{Page, Property};

/// Prefix written into a course page's rich text to carry its Canvas id.
pub const COURSE_ID_PREFIX: &str = "Canvas ID: ";

/// Assignment pages have no dedicated id property, so the Canvas assignment
/// id rides in the numeric weighting property. Real weighting percentages
/// stay far below this threshold while Canvas assignment ids sit far above
/// it, which is what makes the overload decodable.
pub const EMBEDDED_ID_THRESHOLD: f64 = 10_000.0;

/// Canvas assignment id embedded in a generic number property.
pub struct EmbeddedSourceId;

impl EmbeddedSourceId {
    pub fn encode(source_id: i64) -> f64 {
        source_id as f64
    }

    /// Reads a number property back as a source id. Values below the
    /// threshold are ordinary weights, not ids.
    pub fn decode(value: f64) -> Option<i64> {
        if value >= EMBEDDED_ID_THRESHOLD && value.fract() == 0.0 {
            Some(value as i64)
        } else {
            None
        }
    }
}

/// Builds the set of Canvas course ids already present in the courses
/// database. Built once per sync run, then read-only while the run fans out.
///
/// A course page carries its id either in a number property or in a rich
/// text property prefixed with [`COURSE_ID_PREFIX`]. Pages with neither are
/// not ours to dedupe and are skipped with a warning.
pub fn build_course_index(pages: &[Page]) -> HashSet<i64> {
    let mut index = HashSet::new();

    for page in pages {
        if page.archived {
            continue;
        }
        match course_source_id(page) {
            Some(id) => {
                index.insert(id);
            }
            None => {
                warn!("Course page {} has no recognizable Canvas id, skipping", page.id);
            }
        }
    }

    index
}

/// The Canvas course id recorded on a course page, if any.
pub fn course_source_id(page: &Page) -> Option<i64> {
    for property in page.properties.values() {
        if let Property::Number { number: Some(value) } = property {
            if let Some(id) = EmbeddedSourceId::decode(*value) {
                return Some(id);
            }
        }
        if let Some(text) = property.plain_text() {
            if let Some(rest) = text.strip_prefix(COURSE_ID_PREFIX) {
                if let Ok(id) = rest.trim().parse::<i64>() {
                    return Some(id);
                }
            }
        }
    }
    None
}

/// Builds the set of Canvas assignment ids already present in the
/// assignments database by decoding the embedded ids out of number
/// properties. Pages without a decodable id are skipped with a warning.
pub fn build_assignment_index(pages: &[Page]) -> HashSet<i64> {
    let mut index = HashSet::new();

    for page in pages {
        if page.archived {
            continue;
        }
        let id = page
            .properties
            .values()
            .filter_map(|p| p.number())
            .find_map(EmbeddedSourceId::decode);
        match id {
            Some(id) => {
                index.insert(id);
            }
            None => {
                warn!(
                    "Assignment page {} has no embedded Canvas id, skipping",
                    page.id
                );
            }
        }
    }

    index
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::notion::dto::RichText;

    fn page(id: &str, properties: HashMap<String, Property>) -> Page {
        Page {
            id: id.to_string(),
            properties,
            archived: false,
        }
    }

    fn rich_text(content: &str) -> Property {
        Property::RichText {
            rich_text: vec![RichText {
                plain_text: content.to_string(),
            }],
        }
    }

    #[test]
    fn embedded_ids_round_trip_above_the_threshold() {
        let encoded = EmbeddedSourceId::encode(987_654);
        assert_eq!(EmbeddedSourceId::decode(encoded), Some(987_654));
    }

    #[test]
    fn ordinary_weights_are_not_ids() {
        assert_eq!(EmbeddedSourceId::decode(25.0), None);
        assert_eq!(EmbeddedSourceId::decode(100.0), None);
        assert_eq!(EmbeddedSourceId::decode(9_999.9), None);
    }

    #[test]
    fn course_index_reads_prefixed_rich_text() {
        let pages = vec![
            page(
                "p1",
                HashMap::from([("Contact".to_string(), rich_text("Canvas ID: 101"))]),
            ),
            page(
                "p2",
                HashMap::from([("Contact".to_string(), rich_text("Canvas ID: 202"))]),
            ),
        ];
        let index = build_course_index(&pages);
        assert_eq!(index, HashSet::from([101, 202]));
    }

    #[test]
    fn malformed_course_pages_are_skipped_not_fatal() {
        let pages = vec![
            page(
                "p1",
                HashMap::from([("Contact".to_string(), rich_text("Canvas ID: 101"))]),
            ),
            page(
                "p2",
                HashMap::from([("Contact".to_string(), rich_text("hand-written note"))]),
            ),
            page("p3", HashMap::new()),
        ];
        let index = build_course_index(&pages);
        assert_eq!(index, HashSet::from([101]));
    }

    #[test]
    fn assignment_index_decodes_weighting_numbers() {
        let pages = vec![
            page(
                "p1",
                HashMap::from([
                    (
                        "Weighting".to_string(),
                        Property::Number {
                            number: Some(555_001.0),
                        },
                    ),
                    (
                        "Total Score".to_string(),
                        Property::Number { number: Some(50.0) },
                    ),
                ]),
            ),
            page(
                "p2",
                HashMap::from([(
                    "Weighting".to_string(),
                    Property::Number { number: Some(20.0) },
                )]),
            ),
        ];
        let index = build_assignment_index(&pages);
        assert_eq!(index, HashSet::from([555_001]));
    }

    #[test]
    fn archived_pages_never_enter_the_index() {
        let mut archived = page(
            "p1",
            HashMap::from([("Contact".to_string(), rich_text("Canvas ID: 101"))]),
        );
        archived.archived = true;
        assert!(build_course_index(&[archived]).is_empty());
    }
}
