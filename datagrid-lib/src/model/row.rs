//! Dynamic grid row

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use super::RowKey;
use super::Value;
use crate::error::FieldError;

/// A single record displayed in the grid.
///
/// Rows hold field values as an ordered `BTreeMap<String, Value>`, so
/// heterogeneous field sets across rows are fine. A draft edit is also a
/// `Row`: it just carries the key field plus the edited fields.
///
/// # Example
///
/// ```
/// use datagrid_lib::model::Row;
///
/// let row = Row::new()
///     .set("Id", "001")
///     .set("Name", "Contoso");
///
/// assert_eq!(row.get_string("Name").unwrap(), Some("Contoso"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    fields: BTreeMap<String, Value>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the raw value of a field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Returns `true` if the row contains the given field.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Returns all fields in name order.
    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }

    /// Returns the number of fields in the row.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the row has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the row identity stored under `key_field`.
    ///
    /// `None` when the field is missing or null.
    pub fn key(&self, key_field: &str) -> Option<RowKey> {
        self.fields.get(key_field).and_then(Value::to_key)
    }

    /// Sets a field, consuming and returning the row.
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Sets a field in place.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.remove(field)
    }

    /// Overlays every field of `other` onto this row.
    ///
    /// Fields present in both take the value from `other`; fields only
    /// present here are kept.
    pub fn merge(&mut self, other: &Row) {
        for (field, value) in &other.fields {
            self.fields.insert(field.clone(), value.clone());
        }
    }

    // Typed getters: a missing field or another kind of value is an error,
    // an explicit null is `Ok(None)`.

    fn typed<'a, T>(
        &'a self,
        field: &str,
        wanted: &'static str,
        convert: impl FnOnce(&'a Value) -> Option<T>,
    ) -> Result<Option<T>, FieldError> {
        match self.fields.get(field) {
            None => Err(FieldError::absent(field)),
            Some(Value::Null) => Ok(None),
            Some(value) => convert(value)
                .map(Some)
                .ok_or_else(|| FieldError::wrong_kind(field, wanted, value.type_name())),
        }
    }

    /// Gets a string field value.
    pub fn get_string(&self, field: &str) -> Result<Option<&str>, FieldError> {
        self.typed(field, "string", Value::as_str)
    }

    /// Gets a boolean field value.
    pub fn get_bool(&self, field: &str) -> Result<Option<bool>, FieldError> {
        self.typed(field, "bool", |value| match value {
            Value::Bool(b) => Some(*b),
            _ => None,
        })
    }

    pub fn get_int(&self, field: &str) -> Result<Option<i64>, FieldError> {
        self.typed(field, "int", |value| match value {
            Value::Int(n) => Some(*n),
            _ => None,
        })
    }

    /// Gets a float field value. Integers are widened.
    pub fn get_float(&self, field: &str) -> Result<Option<f64>, FieldError> {
        self.typed(field, "float", Value::as_f64)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_keeps_untouched_fields() {
        let mut row = Row::new().set("Id", "1").set("Name", "a").set("Phone", "555");
        row.merge(&Row::new().set("Id", "1").set("Name", "b"));

        assert_eq!(row.get_string("Name").unwrap(), Some("b"));
        assert_eq!(row.get_string("Phone").unwrap(), Some("555"));
    }

    #[test]
    fn test_typed_getters() {
        let row = Row::new().set("n", 3i64).set("f", 1.5).set("empty", Value::Null);

        assert_eq!(row.get_int("n").unwrap(), Some(3));
        assert_eq!(row.get_float("n").unwrap(), Some(3.0));
        assert_eq!(row.get_float("f").unwrap(), Some(1.5));
        assert_eq!(row.get_string("empty").unwrap(), None);
        assert_eq!(row.get_bool("missing"), Err(FieldError::absent("missing")));
        assert_eq!(
            row.get_string("n"),
            Err(FieldError::wrong_kind("n", "string", "int"))
        );
    }

    #[test]
    fn test_key_lookup() {
        let row = Row::new().set("Id", "001").set("Code", 7i64);
        assert_eq!(row.key("Id"), Some(RowKey::from("001")));
        assert_eq!(row.key("Code"), Some(RowKey::Int(7)));
        assert_eq!(row.key("Other"), None);
    }

    #[test]
    fn test_serde_transparent() {
        let row: Row = serde_json::from_str(r#"{"Id": 1, "Name": "x"}"#).unwrap();
        assert_eq!(row.key("Id"), Some(RowKey::Int(1)));
        assert_eq!(serde_json::to_string(&row).unwrap(), r#"{"Id":1,"Name":"x"}"#);
    }
}
