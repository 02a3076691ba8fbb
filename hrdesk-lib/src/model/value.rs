//! Value enum for dynamic field values

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// A dynamic value held by a record field or a form input.
///
/// The variants map onto JSON scalars so records round-trip through the REST
/// backend without a per-resource type. Anything that is not a scalar is kept
/// as raw JSON.
///
/// # Example
///
/// ```
/// use hrdesk_lib::model::Value;
///
/// let name = Value::from("Engineering");
/// let active = Value::from(true);
/// let grace = Value::from(15i64);
/// assert_eq!(grace.to_string(), "15");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Null/empty value.
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// 64-bit integer.
    Int(i64),
    /// 64-bit floating point.
    Float(f64),
    /// String value.
    String(String),
    /// Fallback for arrays, objects and other unrecognized JSON.
    Json(serde_json::Value),
}

impl Value {
    /// Returns `true` if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns `true` if this is null or a string that is blank after trimming.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Returns the boolean if this is a `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the numeric value of an `Int` or `Float`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the string slice if this is a `String`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Parses a number out of this value.
    ///
    /// Numbers pass through; strings are trimmed and parsed. Returns `None`
    /// for anything that does not yield a finite number.
    pub fn parse_number(&self) -> Option<f64> {
        let n = match self {
            Value::Int(i) => *i as f64,
            Value::Float(f) => *f,
            Value::String(s) => s.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        n.is_finite().then_some(n)
    }

    /// Converts a parsed number into the narrowest variant.
    ///
    /// Whole numbers that fit in an `i64` become `Int`, everything else `Float`.
    pub fn number(n: f64) -> Value {
        if n.fract() == 0.0 && n >= i64::MIN as f64 && n <= i64::MAX as f64 {
            Value::Int(n as i64)
        } else {
            Value::Float(n)
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(n) => write!(f, "{}", n),
            Value::String(s) => f.write_str(s),
            Value::Json(v) => write!(f, "{}", v),
        }
    }
}

// =============================================================================
// From implementations
// =============================================================================

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_scalars() {
        let v: Value = serde_json::from_str("null").unwrap();
        assert_eq!(v, Value::Null);
        let v: Value = serde_json::from_str("true").unwrap();
        assert_eq!(v, Value::Bool(true));
        let v: Value = serde_json::from_str("42").unwrap();
        assert_eq!(v, Value::Int(42));
        let v: Value = serde_json::from_str("2.5").unwrap();
        assert_eq!(v, Value::Float(2.5));
        let v: Value = serde_json::from_str("\"09:00\"").unwrap();
        assert_eq!(v, Value::String("09:00".into()));
    }

    #[test]
    fn test_nested_json_falls_back() {
        let v: Value = serde_json::from_str("[1, 2]").unwrap();
        assert_eq!(v, Value::Json(serde_json::json!([1, 2])));
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(Value::from(" 12 ").parse_number(), Some(12.0));
        assert_eq!(Value::from("1e3").parse_number(), Some(1000.0));
        assert_eq!(Value::from("abc").parse_number(), None);
        assert_eq!(Value::from("").parse_number(), None);
        assert_eq!(Value::from("inf").parse_number(), None);
        assert_eq!(Value::Bool(true).parse_number(), None);
    }

    #[test]
    fn test_number_narrowing() {
        assert_eq!(Value::number(15.0), Value::Int(15));
        assert_eq!(Value::number(1.5), Value::Float(1.5));
    }

    #[test]
    fn test_blank() {
        assert!(Value::Null.is_blank());
        assert!(Value::from("   ").is_blank());
        assert!(!Value::from("x").is_blank());
        assert!(!Value::Bool(false).is_blank());
    }
}
