//! The nested document produced for one root record.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Structured representation of one root record and its related records, ready to be
/// serialized and delivered.
///
/// Keys keep their insertion order, and an existing key is never overwritten by the
/// merge operations below.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageDocument {
    pub attributes: IndexMap<String, DocumentValue>,
}

/// A value inside a message document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocumentValue {
    /// The records of a one-to-many join.
    Collection(Vec<MessageDocument>),
    Scalar(serde_json::Value),
}

impl MessageDocument {
    pub fn new() -> Self {
        MessageDocument::default()
    }

    /// Insert unless the key is already present, ignoring ASCII case. Returns whether the
    /// value was inserted.
    pub fn insert_if_absent(&mut self, key: impl Into<String>, value: DocumentValue) -> bool {
        let key = key.into();
        let present = self.attributes.contains_key(&key)
            || self
                .attributes
                .keys()
                .any(|existing| existing.eq_ignore_ascii_case(&key));
        if present {
            return false;
        }
        self.attributes.insert(key, value);
        true
    }

    /// Move every entry of `other` into this document, keeping existing keys.
    pub fn merge(&mut self, other: MessageDocument) {
        for (key, value) in other.attributes {
            self.insert_if_absent(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&DocumentValue> {
        self.attributes.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.attributes
                .iter()
                .map(|(key, value)| (key.clone(), value.to_json()))
                .collect(),
        )
    }
}

impl DocumentValue {
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            DocumentValue::Collection(documents) => {
                serde_json::Value::Array(documents.iter().map(MessageDocument::to_json).collect())
            }
            DocumentValue::Scalar(value) => value.clone(),
        }
    }
}

impl From<serde_json::Value> for DocumentValue {
    fn from(value: serde_json::Value) -> Self {
        DocumentValue::Scalar(value)
    }
}

impl FromIterator<(String, DocumentValue)> for MessageDocument {
    fn from_iter<T: IntoIterator<Item = (String, DocumentValue)>>(iter: T) -> Self {
        let mut document = MessageDocument::new();
        for (key, value) in iter {
            document.insert_if_absent(key, value);
        }
        document
    }
}
