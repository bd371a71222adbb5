//! Filter normalization.
//!
//! Frappe's query layer only understands the canonical form: an ordered list
//! of `[field, operator, value]` triples. Tool callers use shorthands:
//!
//! ```json
//! {"status": "Open"}                        // implied equality
//! {"first_name": ["like", "%George%"]}     // operator pair
//! [["status", "=", "Open"]]                 // already canonical
//! ```
//!
//! Shape is inspected once, at [`FilterExpression::parse`]; everything after
//! that works on [`FilterValue`].

use serde_json::{Map, Value, json};

use super::error::FrappeError;

/// Operator used when the caller gives a bare value.
pub const EQUALS: &str = "=";

/// One mapping value, classified by shape.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// Compared with `=`. Arrays whose length is not exactly two land here
    /// and are sent as opaque values.
    Literal(Value),
    /// `[operator, value]`; the operator token is forwarded verbatim.
    OperatorPair(Value, Value),
}

impl FilterValue {
    pub fn classify(value: Value) -> Self {
        match value {
            Value::Array(items) => match <[Value; 2]>::try_from(items) {
                Ok([operator, value]) => Self::OperatorPair(operator, value),
                Err(items) => Self::Literal(Value::Array(items)),
            },
            other => Self::Literal(other),
        }
    }

    fn into_triple(self, field: String) -> Value {
        match self {
            Self::Literal(value) => json!([field, EQUALS, value]),
            Self::OperatorPair(operator, value) => json!([field, operator, value]),
        }
    }
}

/// A filter as supplied by a tool caller.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpression {
    /// List input, passed through untouched.
    Canonical(Vec<Value>),
    /// Field-keyed shorthand, in the caller's key order.
    Mapping(Vec<(String, FilterValue)>),
}

impl FilterExpression {
    /// Classify raw JSON. A string is decoded as JSON first, since clients
    /// often send filters pre-serialized.
    pub fn parse(value: Value) -> Result<Self, FrappeError> {
        match value {
            Value::Array(items) => Ok(Self::Canonical(items)),
            Value::Object(map) => Ok(Self::from_map(map)),
            Value::String(text) => match serde_json::from_str::<Value>(&text) {
                Ok(decoded @ (Value::Array(_) | Value::Object(_))) => Self::parse(decoded),
                _ => Err(FrappeError::invalid_input(format!(
                    "Filters must be an object or a list of [field, operator, value] triples, got string '{}'",
                    text
                ))),
            },
            other => Err(FrappeError::invalid_input(format!(
                "Filters must be an object or a list of [field, operator, value] triples, got {}",
                other
            ))),
        }
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        Self::Mapping(
            map.into_iter()
                .map(|(field, value)| (field, FilterValue::classify(value)))
                .collect(),
        )
    }

    /// Canonical triple list.
    pub fn normalize(self) -> Vec<Value> {
        match self {
            Self::Canonical(items) => items,
            Self::Mapping(entries) => entries
                .into_iter()
                .map(|(field, value)| value.into_triple(field))
                .collect(),
        }
    }
}

/// Parse and normalize in one step, returning a JSON array.
pub fn normalize_filters(value: Value) -> Result<Value, FrappeError> {
    Ok(Value::Array(FilterExpression::parse(value)?.normalize()))
}

/// Normalize an optional filter argument; `null` counts as absent.
pub fn normalize_optional(value: Option<Value>) -> Result<Option<Value>, FrappeError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(value) => normalize_filters(value).map(Some),
    }
}
