//! Custom attributes of Magento records
//!
//! Products, categories and customers carry extra attributes as a list:
//!
//! ```text
//! "custom_attributes": [{"attribute_code": "color", "value": "12"}, ...]
//! ```
//!
//! Magento stores every scalar as a string, so values are serialized on the
//! way in (`true` → `"1"`) and parsed back on request.

use crate::error::{Error, Result};
use crate::types::{Entity, JsonObject, JsonValue};
use serde_json::json;

const CUSTOM_ATTRIBUTES: &str = "custom_attributes";
const ATTRIBUTE_CODE: &str = "attribute_code";
const VALUE: &str = "value";

/// Types a custom attribute string can be parsed into
pub trait FromAttributeValue: Sized {
    fn from_attribute_value(value: &str) -> Option<Self>;
}

impl FromAttributeValue for String {
    fn from_attribute_value(value: &str) -> Option<Self> {
        Some(value.to_string())
    }
}

impl FromAttributeValue for i64 {
    fn from_attribute_value(value: &str) -> Option<Self> {
        value.trim().parse().ok()
    }
}

impl FromAttributeValue for u64 {
    fn from_attribute_value(value: &str) -> Option<Self> {
        value.trim().parse().ok()
    }
}

impl FromAttributeValue for f64 {
    fn from_attribute_value(value: &str) -> Option<Self> {
        value.trim().parse().ok()
    }
}

/// Integers are true when non-zero
impl FromAttributeValue for bool {
    fn from_attribute_value(value: &str) -> Option<Self> {
        match value.trim() {
            "true" => Some(true),
            "false" => Some(false),
            other => other.parse::<i64>().ok().map(|n| n != 0),
        }
    }
}

/// Serialize a value the way Magento stores it.
///
/// Booleans become `"1"`/`"0"` and numbers their text. `null` becomes `""`
/// unless `force_none` is set.
pub fn serialize_attribute_value(value: &JsonValue, force_none: bool) -> JsonValue {
    match value {
        JsonValue::Null if force_none => JsonValue::Null,
        JsonValue::Null => json!(""),
        JsonValue::Bool(b) => json!(if *b { "1" } else { "0" }),
        JsonValue::Number(n) => json!(n.to_string()),
        JsonValue::Array(items) => items
            .iter()
            .map(|item| serialize_attribute_value(item, force_none))
            .collect(),
        other => other.clone(),
    }
}

fn attributes(item: &Entity) -> impl Iterator<Item = &JsonValue> {
    item.get(CUSTOM_ATTRIBUTES)
        .and_then(JsonValue::as_array)
        .into_iter()
        .flatten()
}

fn code_of(attribute: &JsonValue) -> Option<&str> {
    attribute.get(ATTRIBUTE_CODE).and_then(JsonValue::as_str)
}

/// Raw value of a custom attribute
pub fn get_custom_attribute<'a>(item: &'a Entity, attribute_code: &str) -> Option<&'a JsonValue> {
    attributes(item)
        .find(|attribute| code_of(attribute) == Some(attribute_code))
        .and_then(|attribute| attribute.get(VALUE))
}

/// Custom attribute parsed from its string value
pub fn get_custom_attribute_as<T: FromAttributeValue>(item: &Entity, attribute_code: &str) -> Option<T> {
    get_custom_attribute(item, attribute_code)
        .and_then(JsonValue::as_str)
        .and_then(T::from_attribute_value)
}

/// Multi-valued custom attribute (list or comma-separated string), each value parsed.
///
/// `None` if the attribute is missing or any value fails to parse.
pub fn get_custom_attribute_list_as<T: FromAttributeValue>(
    item: &Entity,
    attribute_code: &str,
) -> Option<Vec<T>> {
    match get_custom_attribute(item, attribute_code)? {
        JsonValue::Array(values) => values
            .iter()
            .map(|value| value.as_str().and_then(T::from_attribute_value))
            .collect(),
        JsonValue::String(s) if s.is_empty() => Some(Vec::new()),
        JsonValue::String(s) => s.split(',').map(T::from_attribute_value).collect(),
        _ => None,
    }
}

pub fn get_boolean_custom_attribute(item: &Entity, attribute_code: &str) -> Option<bool> {
    get_custom_attribute_as(item, attribute_code)
}

/// Custom attributes as a code → value map; later duplicates win
pub fn get_custom_attributes_dict(item: &Entity) -> JsonObject {
    attributes(item)
        .filter_map(|attribute| {
            let code = code_of(attribute)?;
            let value = attribute.get(VALUE).cloned().unwrap_or(JsonValue::Null);
            Some((code.to_string(), value))
        })
        .collect()
}

/// The attribute list of `item`, created if missing
fn attributes_mut(item: &mut Entity) -> Result<&mut Vec<JsonValue>> {
    let fields = item
        .as_object_mut()
        .ok_or_else(|| Error::assertion("custom attributes can only be set on a JSON object"))?;

    let list = fields
        .entry(CUSTOM_ATTRIBUTES)
        .or_insert_with(|| JsonValue::Array(Vec::new()));
    if !list.is_array() {
        *list = JsonValue::Array(Vec::new());
    }
    match list {
        JsonValue::Array(items) => Ok(items),
        _ => Err(Error::assertion("custom_attributes is not a list")),
    }
}

/// Set an already-serialized value
fn put_custom_attribute(item: &mut Entity, attribute_code: &str, value: JsonValue) -> Result<()> {
    let list = attributes_mut(item)?;
    match list
        .iter_mut()
        .find(|attribute| code_of(attribute) == Some(attribute_code))
    {
        Some(attribute) => attribute[VALUE] = value,
        None => list.push(json!({ ATTRIBUTE_CODE: attribute_code, VALUE: value })),
    }
    Ok(())
}

/// Set a custom attribute, replacing any previous value
pub fn set_custom_attribute(
    item: &mut Entity,
    attribute_code: &str,
    value: impl Into<JsonValue>,
) -> Result<()> {
    put_custom_attribute(
        item,
        attribute_code,
        serialize_attribute_value(&value.into(), false),
    )
}

pub fn set_custom_attributes<I, K, V>(item: &mut Entity, attributes: I) -> Result<()>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<JsonValue>,
{
    for (code, value) in attributes {
        set_custom_attribute(item, code.as_ref(), value)?;
    }
    Ok(())
}

/// Delete a custom attribute.
///
/// Magento only removes a value when it is explicitly set to `null`, so the
/// attribute is kept with a `null` value.
pub fn delete_custom_attribute(item: &mut Entity, attribute_code: &str) -> Result<()> {
    put_custom_attribute(item, attribute_code, JsonValue::Null)
}

pub fn delete_custom_attributes<I, K>(item: &mut Entity, attribute_codes: I) -> Result<()>
where
    I: IntoIterator<Item = K>,
    K: AsRef<str>,
{
    attributes_mut(item)?;
    for code in attribute_codes {
        delete_custom_attribute(item, code.as_ref())?;
    }
    Ok(())
}
