use std::collections::BTreeMap;

use serde_json::{Map, Value};

/// A coerced attribute value. Enum members are stored as [`AttrValue::String`].
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    String(String),
    Number(f64),
    Integer(i64),
    Boolean(bool),
    Structured(Map<String, Value>),
}

impl AttrValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            AttrValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            AttrValue::Number(n) => Some(*n),
            AttrValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_structured(&self) -> Option<&Map<String, Value>> {
        match self {
            AttrValue::Structured(m) => Some(m),
            _ => None,
        }
    }

    /// JSON form used in persisted metadata and context.
    pub fn to_json(&self) -> Value {
        match self {
            AttrValue::String(s) => Value::String(s.clone()),
            AttrValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            AttrValue::Integer(i) => Value::from(*i),
            AttrValue::Boolean(b) => Value::Bool(*b),
            AttrValue::Structured(m) => Value::Object(m.clone()),
        }
    }
}

/// A complete, validated set of attribute values.
///
/// Only schema validation produces one, so every field of the schema is
/// present and every value already satisfies its constraints. Accessors
/// fall back to an empty value for names the schema does not declare.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AttributeSet {
    values: BTreeMap<String, AttrValue>,
}

impl AttributeSet {
    pub(crate) fn from_values(values: BTreeMap<String, AttrValue>) -> Self {
        Self { values }
    }

    pub(crate) fn set(&mut self, name: String, value: AttrValue) {
        self.values.insert(name, value);
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.values.get(name)
    }

    pub fn string(&self, name: &str) -> &str {
        self.get(name).and_then(AttrValue::as_str).unwrap_or("")
    }

    pub fn integer(&self, name: &str) -> i64 {
        self.get(name).and_then(AttrValue::as_integer).unwrap_or(0)
    }

    pub fn number(&self, name: &str) -> f64 {
        self.get(name).and_then(AttrValue::as_number).unwrap_or(0.0)
    }

    pub fn boolean(&self, name: &str) -> bool {
        self.get(name).and_then(AttrValue::as_bool).unwrap_or(false)
    }

    pub fn structured(&self, name: &str) -> Option<&Map<String, Value>> {
        self.get(name).and_then(AttrValue::as_structured)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}
