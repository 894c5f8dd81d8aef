// SPDX-License-Identifier: MIT OR Apache-2.0

//! Attribute values.
//!
//! The catalogue of value types and their validation rules is owned by the content layer. Here a
//! value is only a named value type together with a tree of leaves, which is all the engine needs
//! to compare, normalise and scan values.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Leaf or composite value of an attribute.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Boolean(bool),
    Integer(i64),
    String(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Returns a copy of the value with leading and trailing whitespace removed from every string
    /// leaf.
    pub fn trimmed(&self) -> Self {
        match self {
            Value::String(value) => Value::String(value.trim().to_owned()),
            Value::List(values) => Value::List(values.iter().map(Value::trimmed).collect()),
            Value::Map(fields) => Value::Map(
                fields
                    .iter()
                    .map(|(key, value)| (key.to_owned(), value.trimmed()))
                    .collect(),
            ),
            other => other.clone(),
        }
    }

    /// Visits every string leaf together with the name of the top-level field it belongs to, if
    /// any.
    pub fn visit_strings<'a>(&'a self, visitor: &mut impl FnMut(Option<&'a str>, &'a str)) {
        self.visit_strings_inner(None, visitor);
    }

    fn visit_strings_inner<'a>(
        &'a self,
        field: Option<&'a str>,
        visitor: &mut impl FnMut(Option<&'a str>, &'a str),
    ) {
        match self {
            Value::String(value) => visitor(field, value),
            Value::List(values) => values
                .iter()
                .for_each(|value| value.visit_strings_inner(field, visitor)),
            Value::Map(fields) => fields.iter().for_each(|(key, value)| {
                // Only the outermost field name is reported.
                let field = field.or(Some(key.as_str()));
                value.visit_strings_inner(field, visitor)
            }),
            Value::Boolean(_) | Value::Integer(_) => (),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

/// Typed value of an attribute, for example `GivenName` or `ProprietaryString`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeValue {
    value_type: String,
    value: Value,
}

impl AttributeValue {
    pub fn new(value_type: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            value_type: value_type.into(),
            value: value.into(),
        }
    }

    pub fn value_type(&self) -> &str {
        &self.value_type
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn trimmed(&self) -> Self {
        Self {
            value_type: self.value_type.clone(),
            value: self.value.trimmed(),
        }
    }
}
