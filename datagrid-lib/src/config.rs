//! Grid configuration

use serde::Deserialize;
use serde::Serialize;

use crate::model::FieldSet;
use crate::selection::SelectionMode;
use crate::sort::SortDirection;
use crate::sort::SortState;

/// Key field used when none is configured.
pub const DEFAULT_KEY_FIELD: &str = "Id";

/// Returns the name under which the persistence service reports a key field.
///
/// The default identity field comes back lowercased; any other key field is
/// reported as-is.
pub fn persisted_key_field(key_field: &str) -> &str {
    if key_field == DEFAULT_KEY_FIELD {
        "id"
    } else {
        key_field
    }
}

/// How the widget sizes its columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnWidthsMode {
    /// Widths follow the content.
    #[default]
    Auto,
    /// Widths are fixed and evenly distributed.
    Fixed,
}

/// Options recognised by the grid controller.
///
/// Loads from camelCase JSON; every field has a default.
///
/// # Example
///
/// ```
/// use datagrid_lib::config::GridConfig;
/// use datagrid_lib::selection::SelectionMode;
///
/// let config = GridConfig::default()
///     .with_selection_mode(SelectionMode::Multi)
///     .with_editable_fields("Name, Phone")
///     .with_sort("Name", Default::default());
///
/// assert_eq!(config.key_field, "Id");
/// assert!(config.editable_fields.contains("Phone"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GridConfig {
    /// Field whose value identifies a row.
    ///
    /// Default: `Id`
    pub key_field: String,

    /// Optional grid title.
    pub title: Option<String>,

    /// Checkbox selection mode.
    ///
    /// Default: none
    #[serde(alias = "checkboxType")]
    pub selection_mode: SelectionMode,

    /// Fields whose columns are sortable (comma-delimited in JSON).
    pub sortable_fields: FieldSet,

    /// Fields whose columns are inline editable (comma-delimited in JSON).
    pub editable_fields: FieldSet,

    /// Field of the initial sort, if any.
    pub sorted_by: Option<String>,

    /// Direction of the initial sort.
    ///
    /// Default: asc
    pub sorted_direction: SortDirection,

    /// Column sizing mode.
    ///
    /// Default: auto
    pub column_widths_mode: ColumnWidthsMode,

    /// Show the record count next to the title.
    pub show_record_count: bool,

    /// Show the refresh action.
    pub show_refresh_button: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            key_field: DEFAULT_KEY_FIELD.to_string(),
            title: None,
            selection_mode: SelectionMode::None,
            sortable_fields: FieldSet::new(),
            editable_fields: FieldSet::new(),
            sorted_by: None,
            sorted_direction: SortDirection::Asc,
            column_widths_mode: ColumnWidthsMode::Auto,
            show_record_count: false,
            show_refresh_button: false,
        }
    }
}

impl GridConfig {
    /// Creates a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the key field.
    pub fn with_key_field(mut self, key_field: impl Into<String>) -> Self {
        self.key_field = key_field.into();
        self
    }

    /// Sets the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the selection mode.
    pub fn with_selection_mode(mut self, mode: SelectionMode) -> Self {
        self.selection_mode = mode;
        self
    }

    /// Sets the sortable fields from a comma-delimited list.
    pub fn with_sortable_fields(mut self, fields: &str) -> Self {
        self.sortable_fields = FieldSet::from(fields);
        self
    }

    /// Sets the editable fields from a comma-delimited list.
    pub fn with_editable_fields(mut self, fields: &str) -> Self {
        self.editable_fields = FieldSet::from(fields);
        self
    }

    /// Sets the initial sort.
    pub fn with_sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sorted_by = Some(field.into());
        self.sorted_direction = direction;
        self
    }

    /// Sets the column sizing mode.
    pub fn with_column_widths_mode(mut self, mode: ColumnWidthsMode) -> Self {
        self.column_widths_mode = mode;
        self
    }

    /// Shows or hides the record count.
    pub fn with_record_count(mut self, show: bool) -> Self {
        self.show_record_count = show;
        self
    }

    /// Shows or hides the refresh action.
    pub fn with_refresh_button(mut self, show: bool) -> Self {
        self.show_refresh_button = show;
        self
    }

    /// Returns the initial sort, if one is configured.
    pub fn initial_sort(&self) -> Option<SortState> {
        self.sorted_by
            .as_ref()
            .filter(|field| !field.is_empty())
            .map(|field| SortState {
                field_name: field.clone(),
                direction: self.sorted_direction,
            })
    }

    /// Returns the key name the persistence service uses in success records.
    pub fn persisted_key_field(&self) -> &str {
        persisted_key_field(&self.key_field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json() {
        let json = r#"{
            "keyField": "AccountNumber",
            "checkboxType": "Single",
            "sortableFields": "Name, Industry",
            "editableFields": "Phone",
            "sortedBy": "Name",
            "sortedDirection": "desc",
            "columnWidthsMode": "fixed",
            "showRefreshButton": true
        }"#;
        let config: GridConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.key_field, "AccountNumber");
        assert_eq!(config.selection_mode, SelectionMode::Single);
        assert!(config.sortable_fields.contains("Industry"));
        assert!(config.editable_fields.contains("Phone"));
        assert_eq!(config.initial_sort(), Some(SortState::desc("Name")));
        assert_eq!(config.column_widths_mode, ColumnWidthsMode::Fixed);
        assert!(config.show_refresh_button);
        assert!(!config.show_record_count);
    }

    #[test]
    fn test_defaults() {
        let config: GridConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, GridConfig::default());
        assert_eq!(config.initial_sort(), None);
        assert_eq!(config.persisted_key_field(), "id");
    }

    #[test]
    fn test_custom_key_is_not_lowercased() {
        let config = GridConfig::new().with_key_field("ExternalId");
        assert_eq!(config.persisted_key_field(), "ExternalId");
    }

    #[test]
    fn test_empty_sort_field_is_no_sort() {
        let config = GridConfig::new().with_sort("", SortDirection::Desc);
        assert_eq!(config.initial_sort(), None);
    }
}
