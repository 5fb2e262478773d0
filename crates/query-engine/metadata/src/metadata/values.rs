//! Rows returned by executing a fetch query, and the typed values they carry.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A typed attribute value as the platform hands it over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum AttributeValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Decimal(f64),
    String(String),
    Guid(Uuid),
    EntityReference(EntityReference),
    /// A choice (picklist) value.
    OptionSet(i32),
    Money(f64),
    /// A value of a link-entity attribute, tagged with where it came from.
    Aliased(AliasedValue),
}

/// A lookup onto another record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityReference {
    pub logical_name: String,
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Wrapper the platform puts around values of joined attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AliasedValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_logical_name: Option<String>,
    pub attribute_logical_name: String,
    pub value: Box<AttributeValue>,
}

impl AttributeValue {
    /// Strip any number of alias wrappers.
    pub fn unaliased(&self) -> &AttributeValue {
        match self {
            AttributeValue::Aliased(aliased) => aliased.value.unaliased(),
            value => value,
        }
    }

    /// The record id carried by this value, looking through alias wrappers.
    pub fn as_guid(&self) -> Option<Uuid> {
        match self.unaliased() {
            AttributeValue::Guid(id) => Some(*id),
            _ => None,
        }
    }

    /// Whether the display text of this value is a name (lookups and choices) rather
    /// than a formatted rendering of the value itself.
    pub fn has_display_name(&self) -> bool {
        matches!(
            self.unaliased(),
            AttributeValue::EntityReference(_) | AttributeValue::OptionSet(_)
        )
    }
}

/// One flat record of a fetch response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    /// Values keyed by attribute name, `alias.name` for link-entity attributes.
    pub attributes: IndexMap<String, AttributeValue>,
    /// Display text keyed the same way as `attributes`.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub formatted_values: IndexMap<String, String>,
}

impl Row {
    /// The value under `key`. Keys differing only in ASCII case match when there is no
    /// exact match.
    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes
            .get(key)
            .or_else(|| find_ignoring_case(&self.attributes, key))
    }

    /// The display text under `key`, matched the same way as [`Row::get`].
    pub fn formatted_value(&self, key: &str) -> Option<&str> {
        self.formatted_values
            .get(key)
            .or_else(|| find_ignoring_case(&self.formatted_values, key))
            .map(String::as_str)
    }

    /// The id stored under `key`, if it is present and a guid.
    pub fn id(&self, key: &str) -> Option<Uuid> {
        self.get(key).and_then(AttributeValue::as_guid)
    }
}

fn find_ignoring_case<'a, V>(map: &'a IndexMap<String, V>, key: &str) -> Option<&'a V> {
    map.iter()
        .find(|(candidate, _)| candidate.eq_ignore_ascii_case(key))
        .map(|(_, value)| value)
}

/// The rows of one fetch response, in the order they were returned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowSet(pub Vec<Row>);

impl RowSet {
    pub fn rows(&self) -> &[Row] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl From<Vec<Row>> for RowSet {
    fn from(rows: Vec<Row>) -> Self {
        RowSet(rows)
    }
}
