//! Runtime values and JSON conversion helpers.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::fmt;

use super::EvalError;

// ──────────────────────────────────────────────
// Runtime values
// ──────────────────────────────────────────────

/// Result of evaluating an expression.
///
/// Numbers are `rust_decimal::Decimal` -- never `f64` -- so stored epochs
/// and offsets add up exactly. `Record` only appears for structured context
/// access (`getContext`, nested attributes).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(Decimal),
    Text(String),
    Record(BTreeMap<String, Value>),
}

impl Value {
    /// Returns a human-readable type name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Bool",
            Value::Number(_) => "Number",
            Value::Text(_) => "Text",
            Value::Record(_) => "Record",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Extracts a boolean or returns a type error attributed to `op`.
    pub fn as_bool(&self, op: &str) -> Result<bool, EvalError> {
        match self {
            Value::Bool(b) => Ok(*b),
            other => Err(EvalError::type_error(
                op,
                format!("expected Bool, got {}", other.type_name()),
            )),
        }
    }

    /// Extracts a number. Booleans count as 1/0 and numeric text is parsed.
    pub fn as_number(&self, op: &str) -> Result<Decimal, EvalError> {
        match self {
            Value::Number(d) => Ok(*d),
            Value::Bool(b) => Ok(if *b { Decimal::ONE } else { Decimal::ZERO }),
            Value::Text(s) => parse_decimal(s.trim()).ok_or_else(|| {
                EvalError::type_error(op, format!("text '{}' is not a number", s))
            }),
            other => Err(EvalError::type_error(
                op,
                format!("expected Number, got {}", other.type_name()),
            )),
        }
    }

    /// Extracts text or returns a type error attributed to `op`.
    pub fn as_text(&self, op: &str) -> Result<&str, EvalError> {
        match self {
            Value::Text(s) => Ok(s),
            other => Err(EvalError::type_error(
                op,
                format!("expected Text, got {}", other.type_name()),
            )),
        }
    }

    /// String form used by `eq` when either side is text. Numbers are
    /// normalized so `1.0` and `1` render the same.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Value::Text(s) => Some(s.clone()),
            Value::Number(d) => Some(d.normalize().to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null | Value::Record(_) => None,
        }
    }

    /// Boolean coercion applied to validation results.
    pub fn truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(d) => !d.is_zero(),
            Value::Text(s) => !s.is_empty(),
            Value::Record(_) => true,
        }
    }

    /// Parse a JSON value. Arrays have no counterpart and are rejected.
    pub fn from_json(v: &serde_json::Value) -> Result<Value, EvalError> {
        match v {
            serde_json::Value::Null => Ok(Value::Null),
            serde_json::Value::Bool(b) => Ok(Value::Bool(*b)),
            serde_json::Value::Number(n) => Ok(Value::Number(decimal_from_json(n)?)),
            serde_json::Value::String(s) => Ok(Value::Text(s.clone())),
            serde_json::Value::Object(map) => {
                let mut fields = BTreeMap::new();
                for (k, v) in map {
                    fields.insert(k.clone(), Value::from_json(v)?);
                }
                Ok(Value::Record(fields))
            }
            serde_json::Value::Array(_) => Err(EvalError::deserialize(
                "arrays are not supported as values",
            )),
        }
    }

    /// Serialize to JSON. Integral numbers become JSON integers.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(d) => {
                if d.fract().is_zero() {
                    if let Some(i) = d.to_i64() {
                        return serde_json::json!(i);
                    }
                }
                d.to_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map(serde_json::Value::Number)
                    .unwrap_or_else(|| serde_json::Value::String(d.to_string()))
            }
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::Record(fields) => serde_json::Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(d) => write!(f, "{}", d.normalize()),
            Value::Text(s) => write!(f, "{:?}", s),
            Value::Record(_) => write!(f, "{}", self.to_json()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Number(Decimal::from(i))
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Number(Decimal::from(i))
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Value::Number(d)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

// ──────────────────────────────────────────────
// Number parsing helpers
// ──────────────────────────────────────────────

/// Parse decimal text, accepting scientific notation.
pub(crate) fn parse_decimal(s: &str) -> Option<Decimal> {
    if s.is_empty() {
        return None;
    }
    s.parse::<Decimal>()
        .ok()
        .or_else(|| Decimal::from_scientific(s).ok())
}

pub(crate) fn decimal_from_json(n: &serde_json::Number) -> Result<Decimal, EvalError> {
    if let Some(i) = n.as_i64() {
        return Ok(Decimal::from(i));
    }
    if let Some(u) = n.as_u64() {
        return Ok(Decimal::from(u));
    }
    parse_decimal(&n.to_string())
        .ok_or_else(|| EvalError::deserialize(format!("number out of range: {}", n)))
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_round_trip_as_integers() {
        let v = Value::from_json(&json!(1700000000)).unwrap();
        assert_eq!(v, Value::from(1700000000));
        assert_eq!(v.to_json(), json!(1700000000));
    }

    #[test]
    fn fractional_numbers_parse_exactly() {
        let v = Value::from_json(&json!(2.5)).unwrap();
        assert_eq!(v, Value::Number(Decimal::new(25, 1)));
        assert_eq!(v.to_json(), json!(2.5));
    }

    #[test]
    fn text_form_normalizes_numbers() {
        assert_eq!(
            Value::Number(Decimal::new(10, 1)).to_text(),
            Some("1".to_string())
        );
        assert_eq!(Value::Null.to_text(), None);
    }

    #[test]
    fn truthiness() {
        assert!(!Value::Null.truthy());
        assert!(!Value::from(0).truthy());
        assert!(Value::from(3).truthy());
        assert!(!Value::from("").truthy());
        assert!(Value::from("x").truthy());
    }

    #[test]
    fn as_number_parses_text() {
        assert_eq!(Value::from(" 42 ").as_number("sum").unwrap(), Decimal::from(42));
        assert!(Value::from("abc").as_number("sum").is_err());
        assert!(Value::Null.as_number("sum").is_err());
    }

    #[test]
    fn arrays_rejected() {
        assert!(Value::from_json(&json!([1, 2])).is_err());
    }

    #[test]
    fn objects_become_records() {
        let v = Value::from_json(&json!({ "prev": "1" })).unwrap();
        let Value::Record(fields) = v else {
            panic!("expected record");
        };
        assert_eq!(fields.get("prev"), Some(&Value::from("1")));
    }
}
