//! Cell values and row identities

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// A dynamic value held by a single grid cell.
///
/// Rows are schema-free, so every field is stored as a `Value`. The variants
/// mirror what a JSON-shaped record source produces.
///
/// # Type Mapping
///
/// | JSON | Rust Variant |
/// |------|--------------|
/// | null | `Null` |
/// | true / false | `Bool` |
/// | integer | `Int` |
/// | fractional number | `Float` |
/// | string | `String` |
///
/// # Example
///
/// ```
/// use datagrid_lib::model::Value;
///
/// let name = Value::from("Acme");
/// let employees = Value::from(250i64);
/// let active = Value::from(true);
/// let empty = Value::Null;
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    /// Whole numbers; tried before `Float` when decoding.
    Int(i64),
    Float(f64),
    String(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Kind name used in [`FieldError`](crate::error::FieldError) messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
        }
    }

    /// Returns `true` if the value counts as empty for sorting.
    ///
    /// Null, `false`, zero, NaN and the empty string are all falsy.
    pub fn is_falsy(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Bool(b) => !b,
            Value::Int(n) => *n == 0,
            Value::Float(f) => *f == 0.0 || f.is_nan(),
            Value::String(s) => s.is_empty(),
        }
    }

    /// Returns the string slice if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Returns the value as `f64` if it is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Converts the value into a row identity.
    ///
    /// Returns `None` for null, which can never identify a row.
    pub fn to_key(&self) -> Option<RowKey> {
        match self {
            Value::Null => None,
            Value::Bool(b) => Some(RowKey::Bool(*b)),
            Value::Int(n) => Some(RowKey::Int(*n)),
            Value::Float(f) => Some(RowKey::from_float(*f)),
            Value::String(s) => Some(RowKey::String(s.clone())),
        }
    }
}

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

impl From<RowKey> for Value {
    fn from(key: RowKey) -> Self {
        match key {
            RowKey::Bool(b) => Value::Bool(b),
            RowKey::Int(n) => Value::Int(n),
            RowKey::Float(bits) => Value::Float(f64::from_bits(bits)),
            RowKey::String(s) => Value::String(s),
        }
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Value::Null,
        }
    }
}

// =============================================================================
// RowKey
// =============================================================================

/// Hashable identity of a row, taken from its key-field value.
///
/// Keys compare strictly: `1` and `"1"` are different rows. Floats with an
/// integral value collapse onto `Int` so `1.0` and `1` match, the same way a
/// JSON source would treat them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RowKey {
    /// Boolean key.
    Bool(bool),
    /// Integer key.
    Int(i64),
    /// Non-integral float key, stored by bit pattern.
    Float(u64),
    /// String key (the common case for record ids).
    String(String),
}

impl RowKey {
    fn from_float(f: f64) -> Self {
        if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
            RowKey::Int(f as i64)
        } else {
            RowKey::Float(f.to_bits())
        }
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowKey::Bool(b) => write!(f, "{}", b),
            RowKey::Int(n) => write!(f, "{}", n),
            RowKey::Float(bits) => write!(f, "{}", f64::from_bits(*bits)),
            RowKey::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for RowKey {
    fn from(v: &str) -> Self {
        RowKey::String(v.to_string())
    }
}

impl From<String> for RowKey {
    fn from(v: String) -> Self {
        RowKey::String(v)
    }
}

impl From<i64> for RowKey {
    fn from(v: i64) -> Self {
        RowKey::Int(v)
    }
}

impl From<i32> for RowKey {
    fn from(v: i32) -> Self {
        RowKey::Int(v as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_falsy_values() {
        assert!(Value::Null.is_falsy());
        assert!(Value::from(false).is_falsy());
        assert!(Value::from(0i64).is_falsy());
        assert!(Value::from(f64::NAN).is_falsy());
        assert!(Value::from("").is_falsy());
        assert!(!Value::from("a").is_falsy());
        assert!(!Value::from(-1i64).is_falsy());
    }

    #[test]
    fn test_key_identity_is_strict() {
        assert_ne!(Value::from(1i64).to_key(), Value::from("1").to_key());
        assert_eq!(Value::from(1i64).to_key(), Value::from(1.0).to_key());
        assert_eq!(Value::Null.to_key(), None);
    }

    #[test]
    fn test_deserialize_untagged() {
        let values: Vec<Value> = serde_json::from_str(r#"[null, true, 3, 2.5, "x"]"#).unwrap();
        assert_eq!(
            values,
            vec![
                Value::Null,
                Value::Bool(true),
                Value::Int(3),
                Value::Float(2.5),
                Value::String("x".to_string()),
            ]
        );
    }
}
