//! Conversions between [`XmlValue`] and `serde_json::Value`.

use serde_json::{Map, Value};

use crate::error::XmlError;
use crate::value::{XmlField, XmlMap, XmlValue};

impl XmlValue {
    /// Render the tree as JSON: scalars become strings, repeated fields
    /// become arrays, nil becomes `null`.
    pub fn to_json(&self) -> Value {
        match self {
            XmlValue::Null => Value::Null,
            XmlValue::Scalar(text) => Value::String(text.clone()),
            XmlValue::Complex(map) => {
                let object: Map<String, Value> = map
                    .iter()
                    .map(|(key, field)| (key.to_string(), field.to_json()))
                    .collect();
                Value::Object(object)
            }
        }
    }
}

impl XmlField {
    /// Render the field as JSON, a repeated field as an array.
    pub fn to_json(&self) -> Value {
        match self {
            XmlField::One(value) => value.to_json(),
            XmlField::Many(values) => Value::Array(values.iter().map(XmlValue::to_json).collect()),
        }
    }
}

impl From<&XmlValue> for Value {
    fn from(value: &XmlValue) -> Self {
        value.to_json()
    }
}

impl TryFrom<&Value> for XmlValue {
    type Error = XmlError;

    /// Numbers and booleans are written in their JSON text form. Arrays are
    /// only accepted as object members, where they become repeated elements.
    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Null => Ok(XmlValue::Null),
            Value::Bool(b) => Ok(XmlValue::Scalar(b.to_string())),
            Value::Number(n) => Ok(XmlValue::Scalar(n.to_string())),
            Value::String(s) => Ok(XmlValue::Scalar(s.clone())),
            Value::Array(_) => Err(XmlError::UnsupportedJson(
                "an array has no element name outside an object".to_string(),
            )),
            Value::Object(object) => {
                let mut map = XmlMap::new();
                for (key, member) in object {
                    let field = match member {
                        Value::Array(items) => {
                            let values = items
                                .iter()
                                .map(|item| match item {
                                    Value::Array(_) => Err(XmlError::UnsupportedJson(format!(
                                        "nested array under '{key}'"
                                    ))),
                                    other => XmlValue::try_from(other),
                                })
                                .collect::<Result<Vec<_>, _>>()?;
                            XmlField::Many(values)
                        }
                        other => XmlField::One(XmlValue::try_from(other)?),
                    };
                    map.insert(key.clone(), field);
                }
                Ok(XmlValue::Complex(map))
            }
        }
    }
}

impl TryFrom<Value> for XmlValue {
    type Error = XmlError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        XmlValue::try_from(&value)
    }
}
