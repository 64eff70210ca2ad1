//! Built values produced by the mapping engine.
//!
//! A [`Value`] is the dynamic object graph constructed from untyped input:
//! scalars, lists, keyed maps, enumeration cases and class instances. It can
//! be converted back to plain JSON with [`Value::to_json`], which is how typed
//! Rust structures are obtained through `serde`.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value as JsonValue};

use crate::types::EnumBacking;

/// A constructed value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(#[serde(with = "indexmap::map::serde_seq")] IndexMap<MapKey, Value>),
    Enum(EnumValue),
    Object(Object),
}

impl Value {
    /// Convert into plain JSON.
    ///
    /// Enumeration cases become their backing value (or their name for pure
    /// cases) and objects become JSON objects of their fields. Non-finite
    /// floats become `null`.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Null => JsonValue::Null,
            Value::Bool(value) => JsonValue::Bool(*value),
            Value::Int(value) => JsonValue::Number(Number::from(*value)),
            Value::Float(value) => Number::from_f64(*value)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Value::String(value) => JsonValue::String(value.clone()),
            Value::List(values) => JsonValue::Array(values.iter().map(Value::to_json).collect()),
            Value::Map(entries) => JsonValue::Object(
                entries
                    .iter()
                    .map(|(key, value)| (key.to_string(), value.to_json()))
                    .collect::<Map<_, _>>(),
            ),
            Value::Enum(case) => match case.backing() {
                Some(EnumBacking::Int(value)) => JsonValue::Number(Number::from(*value)),
                Some(EnumBacking::String(value)) => JsonValue::String(value.clone()),
                None => JsonValue::String(case.case().to_string()),
            },
            Value::Object(object) => JsonValue::Object(
                object
                    .fields()
                    .iter()
                    .map(|(name, value)| (name.clone(), value.to_json()))
                    .collect::<Map<_, _>>(),
            ),
        }
    }

    /// Convert plain JSON without any type information.
    ///
    /// Integers that fit in an `i64` become [`Value::Int`], every other
    /// number becomes [`Value::Float`].
    pub fn from_json(json: &JsonValue) -> Self {
        match json {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(value) => Value::Bool(*value),
            JsonValue::Number(number) => match number.as_i64() {
                Some(value) => Value::Int(value),
                None => Value::Float(number.as_f64().unwrap_or(f64::NAN)),
            },
            JsonValue::String(value) => Value::String(value.clone()),
            JsonValue::Array(values) => Value::List(values.iter().map(Value::from_json).collect()),
            JsonValue::Object(entries) => Value::Map(
                entries
                    .iter()
                    .map(|(key, value)| (MapKey::from_input(key), Value::from_json(value)))
                    .collect(),
            ),
        }
    }

    /// The object held by this value, if any.
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Object> for Value {
    fn from(object: Object) -> Self {
        Value::Object(object)
    }
}

/// The key of a map entry or shaped array element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MapKey {
    Int(i64),
    String(String),
}

impl MapKey {
    /// Key for an input mapping entry: integer-like keys become [`MapKey::Int`].
    pub fn from_input(key: &str) -> Self {
        match key.parse::<i64>() {
            Ok(index) if index.to_string() == key => MapKey::Int(index),
            _ => MapKey::String(key.to_string()),
        }
    }
}

impl fmt::Display for MapKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapKey::Int(key) => write!(f, "{key}"),
            MapKey::String(key) => write!(f, "{key}"),
        }
    }
}

impl From<&str> for MapKey {
    fn from(key: &str) -> Self {
        MapKey::String(key.to_string())
    }
}

impl From<i64> for MapKey {
    fn from(key: i64) -> Self {
        MapKey::Int(key)
    }
}

/// A selected enumeration case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumValue {
    name: String,
    case: String,
    backing: Option<EnumBacking>,
}

impl EnumValue {
    pub fn new(name: impl Into<String>, case: impl Into<String>, backing: Option<EnumBacking>) -> Self {
        Self {
            name: name.into(),
            case: case.into(),
            backing,
        }
    }

    /// Name of the enumeration.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the selected case.
    pub fn case(&self) -> &str {
        &self.case
    }

    pub fn backing(&self) -> Option<&EnumBacking> {
        self.backing.as_ref()
    }
}

/// An instance of a class: its name and field values in constructor order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Object {
    class: String,
    fields: IndexMap<String, Value>,
}

impl Object {
    pub fn new(class: impl Into<String>, fields: IndexMap<String, Value>) -> Self {
        Self {
            class: class.into(),
            fields,
        }
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn fields(&self) -> &IndexMap<String, Value> {
        &self.fields
    }

    /// Look up a single field.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_object_to_json() {
        let mut fields = IndexMap::new();
        fields.insert("x".to_string(), Value::Int(1));
        fields.insert("label".to_string(), Value::from("origin"));
        let value = Value::Object(Object::new("Point", fields));

        assert_eq!(value.to_json(), json!({"x": 1, "label": "origin"}));
    }

    #[test]
    fn test_from_json_keeps_key_order() {
        let value = Value::from_json(&json!({"b": 1, "a": [true, 1.5], "7": null}));

        let Value::Map(entries) = value else {
            panic!("Expected a map");
        };
        let keys: Vec<_> = entries.keys().cloned().collect();
        assert_eq!(
            keys,
            [MapKey::from("b"), MapKey::from("a"), MapKey::Int(7)]
        );
        assert_eq!(
            entries[&MapKey::from("a")],
            Value::List(vec![Value::Bool(true), Value::Float(1.5)])
        );
    }

    #[test]
    fn test_map_key_from_input() {
        assert_eq!(MapKey::from_input("12"), MapKey::Int(12));
        assert_eq!(MapKey::from_input("012"), MapKey::from("012"));
        assert_eq!(MapKey::from_input("-3"), MapKey::Int(-3));
        assert_eq!(MapKey::from_input("id"), MapKey::from("id"));
    }

    #[test]
    fn test_enum_to_json_uses_backing_value() {
        let backed = Value::Enum(EnumValue::new(
            "Suit",
            "Hearts",
            Some(EnumBacking::String("H".to_string())),
        ));
        let pure = Value::Enum(EnumValue::new("Color", "Red", None));

        assert_eq!(backed.to_json(), json!("H"));
        assert_eq!(pure.to_json(), json!("Red"));
    }

    #[test]
    fn test_map_to_json_stringifies_keys() {
        let mut entries = IndexMap::new();
        entries.insert(MapKey::Int(3), Value::Bool(true));
        entries.insert(MapKey::from("name"), Value::Null);

        assert_eq!(
            Value::Map(entries).to_json(),
            json!({"3": true, "name": null})
        );
    }

    #[test]
    fn test_non_finite_float_to_json_is_null() {
        assert_eq!(Value::Float(f64::NAN).to_json(), JsonValue::Null);
    }
}
