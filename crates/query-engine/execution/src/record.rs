//! Documents built straight from an event's record, for events without a fetch query.

use query_engine_metadata::metadata::{MessageDocument, Row};
use serde_json::Value;
use uuid::Uuid;

use crate::values::{formatted_key, normalize};

/// A document holding every attribute of `record`, sorted by name, optionally followed
/// by its display text.
pub fn document_from_record(record: &Row, include_formatted: bool) -> MessageDocument {
    let mut attributes: Vec<_> = record.attributes.iter().collect();
    attributes.sort_by(|(left, _), (right, _)| left.cmp(right));

    let mut document = MessageDocument::new();
    for (key, value) in attributes {
        document.insert_if_absent(key.clone(), normalize(value).into());
    }

    if include_formatted {
        let mut formatted: Vec<_> = record.formatted_values.iter().collect();
        formatted.sort_by(|(left, _), (right, _)| left.cmp(right));
        for (key, text) in formatted {
            document.insert_if_absent(
                formatted_key(key, record.get(key)),
                Value::String(text.clone()).into(),
            );
        }
    }

    document
}

/// The document for a deleted record: only its id, under `{table}id`.
pub fn document_for_deleted(table_name: &str, id: Uuid) -> MessageDocument {
    let mut document = MessageDocument::new();
    document.insert_if_absent(format!("{table_name}id"), Value::String(id.to_string()).into());
    document
}
