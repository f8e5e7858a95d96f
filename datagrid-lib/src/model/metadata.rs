//! Object metadata types

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

/// Schema information for the object a grid displays.
///
/// The controller stores this for hosts to read; it does not drive any grid
/// behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectInfo {
    /// API name of the object (e.g. "Account").
    pub api_name: String,

    /// Display label of the object.
    #[serde(default)]
    pub label: Option<String>,

    /// Plural display label.
    #[serde(default)]
    pub label_plural: Option<String>,

    /// Field metadata keyed by field API name.
    #[serde(default)]
    pub fields: BTreeMap<String, FieldInfo>,
}

impl ObjectInfo {
    /// Creates object info with no fields.
    pub fn new(api_name: impl Into<String>) -> Self {
        Self {
            api_name: api_name.into(),
            label: None,
            label_plural: None,
            fields: BTreeMap::new(),
        }
    }

    /// Adds a field (builder pattern).
    pub fn with_field(mut self, field: FieldInfo) -> Self {
        self.fields.insert(field.api_name.clone(), field);
        self
    }

    /// Returns metadata for a field.
    pub fn field(&self, api_name: &str) -> Option<&FieldInfo> {
        self.fields.get(api_name)
    }
}

/// Metadata for one field of an object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldInfo {
    /// API name of the field.
    pub api_name: String,

    /// Display label.
    #[serde(default)]
    pub label: Option<String>,

    /// Data type name (e.g. "String", "Currency").
    #[serde(default)]
    pub data_type: String,

    /// Whether the field can be updated.
    #[serde(default)]
    pub updateable: bool,

    /// Whether the field can be sorted on server-side.
    #[serde(default)]
    pub sortable: bool,
}

impl FieldInfo {
    /// Creates field metadata with a data type.
    pub fn new(api_name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            api_name: api_name.into(),
            label: None,
            data_type: data_type.into(),
            updateable: false,
            sortable: false,
        }
    }
}
