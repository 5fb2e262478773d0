//! Convert row values into plain JSON for documents.

use query_engine_metadata::metadata::AttributeValue;
use serde_json::Value;
use uuid::Uuid;

/// Plain JSON for a row value.
///
/// Alias wrappers are removed, lookups become the id they point at, choices their
/// integer value and money its amount. The nil guid means "no record" and becomes null.
pub fn normalize(value: &AttributeValue) -> Value {
    match value {
        AttributeValue::Null => Value::Null,
        AttributeValue::Boolean(b) => Value::Bool(*b),
        AttributeValue::Integer(i) => Value::from(*i),
        AttributeValue::Decimal(d) | AttributeValue::Money(d) => number(*d),
        AttributeValue::String(s) => Value::String(s.clone()),
        AttributeValue::Guid(id) => guid(*id),
        AttributeValue::EntityReference(reference) => guid(reference.id),
        AttributeValue::OptionSet(option) => Value::from(*option),
        AttributeValue::Aliased(aliased) => normalize(&aliased.value),
    }
}

/// The document key for the display text of `key`.
///
/// Lookups and choices get `{key}name`, everything else `{key}formatted`. The raw value
/// may be absent, in which case the text is treated as a formatted value.
pub fn formatted_key(key: &str, raw: Option<&AttributeValue>) -> String {
    if raw.is_some_and(AttributeValue::has_display_name) {
        format!("{key}name")
    } else {
        format!("{key}formatted")
    }
}

fn guid(id: Uuid) -> Value {
    if id.is_nil() {
        Value::Null
    } else {
        Value::String(id.to_string())
    }
}

// NaN and infinities have no JSON representation
fn number(value: f64) -> Value {
    serde_json::Number::from_f64(value).map_or(Value::Null, Value::Number)
}
