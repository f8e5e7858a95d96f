//! Save validation error structures

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

/// Validation errors returned by a save, shaped for inline display.
///
/// `rows` is keyed by the display form of the row key. The controller stores
/// this structure verbatim and hands it back to the widget.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveErrors {
    /// Per-row errors.
    #[serde(default)]
    pub rows: BTreeMap<String, RowError>,
    /// Table-level error summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<TableError>,
}

impl SaveErrors {
    /// Creates an empty error set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if any row failed.
    pub fn has_row_errors(&self) -> bool {
        !self.rows.is_empty()
    }

    /// Returns `true` if there are neither row nor table errors.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.table.is_none()
    }

    /// Adds an error for one row (builder pattern).
    pub fn with_row(mut self, key: impl Into<String>, error: RowError) -> Self {
        self.rows.insert(key.into(), error);
        self
    }

    /// Sets the table-level error (builder pattern).
    pub fn with_table(mut self, error: TableError) -> Self {
        self.table = Some(error);
        self
    }
}

/// Error information for one row that failed to save.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowError {
    /// Short heading shown on the row.
    pub title: String,
    /// Human-readable messages.
    #[serde(default)]
    pub messages: Vec<String>,
    /// Fields to highlight.
    #[serde(default)]
    pub field_names: Vec<String>,
}

impl RowError {
    /// Creates a new row error with a single message.
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            messages: vec![message.into()],
            field_names: Vec::new(),
        }
    }

    /// Marks a field as the cause of the error.
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field_names.push(field.into());
        self
    }
}

/// Table-level error summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableError {
    /// Heading of the summary.
    pub title: String,
    /// One message per failed row, typically prefixed with its position.
    #[serde(default)]
    pub messages: Vec<String>,
}

impl TableError {
    /// Creates a new table error.
    pub fn new(title: impl Into<String>, messages: Vec<String>) -> Self {
        Self {
            title: title.into(),
            messages,
        }
    }
}

impl std::fmt::Display for RowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.field_names.is_empty() {
            write!(f, "{}: {}", self.title, self.messages.join("; "))
        } else {
            write!(
                f,
                "{}: {} ({})",
                self.title,
                self.messages.join("; "),
                self.field_names.join(", ")
            )
        }
    }
}
