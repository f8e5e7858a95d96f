//! Scenario files driven by the demo binary.

use std::path::Path;

use datagrid_lib::config::GridConfig;
use datagrid_lib::error::RowError;
use datagrid_lib::model::Column;
use datagrid_lib::model::Row;
use datagrid_lib::sort::SortState;
use serde::Deserialize;

use crate::CliError;

/// A grid session described as JSON.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    /// Object whose rows are shown.
    pub object_name: String,
    #[serde(default)]
    pub config: GridConfig,
    #[serde(default)]
    pub columns: Vec<Column>,
    /// Rows held by the in-memory store and initially displayed.
    #[serde(default)]
    pub rows: Vec<Row>,
    /// Column sort applied after loading.
    #[serde(default)]
    pub sort: Option<SortState>,
    /// Cell edits, applied one batch at a time.
    #[serde(default)]
    pub edits: Vec<Vec<Row>>,
    /// Fields the store refuses to save as empty.
    #[serde(default)]
    pub required_fields: Vec<String>,
    /// Whether to save the drafts after editing.
    #[serde(default = "default_save")]
    pub save: bool,
}

fn default_save() -> bool {
    true
}

impl Scenario {
    /// Reads a scenario from a JSON file.
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let text = std::fs::read_to_string(path).map_err(|source| CliError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Builds the store validator for the required fields.
    pub fn validator(&self) -> impl Fn(&Row, &Row) -> Result<(), RowError> + Send + Sync + 'static {
        let required = self.required_fields.clone();
        move |_current: &Row, draft: &Row| {
            let mut error: Option<RowError> = None;
            for field in &required {
                let empty = draft
                    .get(field)
                    .is_some_and(|value| value.is_null() || value.as_str() == Some(""));
                if empty {
                    let next = error
                        .take()
                        .unwrap_or_else(|| RowError::new("Invalid", format!("{} is required", field)))
                        .with_field(field.clone());
                    error = Some(next);
                }
            }
            error.map_or(Ok(()), Err)
        }
    }
}
