//! Column descriptors and delimited field sets

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

/// A column descriptor as handed to the grid widget.
///
/// Only `field_name` is interpreted by the controller. The `sortable` and
/// `editable` flags are decorated at load time from the configured field
/// sets; every other attribute the host supplies is carried through in
/// `extra` untouched.
///
/// # Example
///
/// ```
/// use datagrid_lib::model::Column;
///
/// let column = Column::new("Name").with_label("Account Name");
/// assert_eq!(column.field_name, "Name");
/// assert_eq!(column.editable, None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    /// The row field this column displays.
    pub field_name: String,

    /// Header label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Widget data type (e.g. "text", "currency").
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub column_type: Option<String>,

    /// Whether the widget offers sorting on this column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sortable: Option<bool>,

    /// Whether the widget allows inline editing on this column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editable: Option<bool>,

    /// Any other descriptor attributes.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Column {
    /// Creates a bare column for a field.
    pub fn new(field_name: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            label: None,
            column_type: None,
            sortable: None,
            editable: None,
            extra: BTreeMap::new(),
        }
    }

    /// Sets the header label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets the widget data type.
    pub fn with_type(mut self, column_type: impl Into<String>) -> Self {
        self.column_type = Some(column_type.into());
        self
    }

    /// Applies the sortable and editable field sets to this column.
    ///
    /// The two flags are asymmetric:
    /// - `sortable` is only ever switched on, never reset.
    /// - `editable` is recomputed whenever the editable set is non-empty.
    pub fn apply_field_sets(&mut self, sortable: &FieldSet, editable: &FieldSet) {
        if !sortable.is_empty() && sortable.contains(&self.field_name) {
            self.sortable = Some(true);
        }
        if !editable.is_empty() {
            self.editable = Some(editable.contains(&self.field_name));
        }
    }

    /// Returns `true` if the column is flagged sortable.
    pub fn is_sortable(&self) -> bool {
        self.sortable.unwrap_or(false)
    }

    /// Returns `true` if the column is flagged editable.
    pub fn is_editable(&self) -> bool {
        self.editable.unwrap_or(false)
    }
}

// =============================================================================
// FieldSet
// =============================================================================

/// A set of field names parsed from a delimited string.
///
/// All whitespace is stripped before splitting, and empty segments are
/// dropped, so `""` and `" , "` both produce an empty set.
///
/// # Example
///
/// ```
/// use datagrid_lib::model::FieldSet;
///
/// let fields = FieldSet::parse("Name, Phone ,Website", ',');
/// assert!(fields.contains("Phone"));
/// assert_eq!(fields.len(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct FieldSet {
    fields: BTreeSet<String>,
}

impl FieldSet {
    /// Default delimiter for configured field lists.
    pub const DELIMITER: char = ',';

    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a delimited list of field names.
    pub fn parse(value: &str, delimiter: char) -> Self {
        let compact: String = value.chars().filter(|c| !c.is_whitespace()).collect();
        Self {
            fields: compact
                .split(delimiter)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// Returns `true` if the set contains the field.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains(field)
    }

    /// Returns the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates the fields in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(String::as_str)
    }
}

impl From<&str> for FieldSet {
    fn from(value: &str) -> Self {
        Self::parse(value, Self::DELIMITER)
    }
}

impl From<String> for FieldSet {
    fn from(value: String) -> Self {
        Self::parse(&value, Self::DELIMITER)
    }
}

impl From<FieldSet> for String {
    fn from(set: FieldSet) -> Self {
        set.fields.into_iter().collect::<Vec<_>>().join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strips_whitespace() {
        let set = FieldSet::parse(" Name ,\tPhone,\nWeb site ", ',');
        assert!(set.contains("Name"));
        assert!(set.contains("Phone"));
        assert!(set.contains("Website"));
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_parse_empty() {
        assert!(FieldSet::parse("", ',').is_empty());
        assert!(FieldSet::parse(" , ,", ',').is_empty());
    }

    #[test]
    fn test_editable_recomputed() {
        let sortable = FieldSet::new();
        let editable = FieldSet::from("name");

        let mut name = Column::new("name");
        let mut age = Column::new("age");
        age.editable = Some(true);

        name.apply_field_sets(&sortable, &editable);
        age.apply_field_sets(&sortable, &editable);

        assert_eq!(name.editable, Some(true));
        assert_eq!(age.editable, Some(false));
    }

    #[test]
    fn test_editable_untouched_when_set_empty() {
        let mut column = Column::new("name");
        column.apply_field_sets(&FieldSet::new(), &FieldSet::new());
        assert_eq!(column.editable, None);
    }

    #[test]
    fn test_sortable_is_monotonic() {
        let mut listed = Column::new("name");
        let mut preset = Column::new("age");
        preset.sortable = Some(true);

        let sortable = FieldSet::from("name");
        listed.apply_field_sets(&sortable, &FieldSet::new());
        preset.apply_field_sets(&sortable, &FieldSet::new());

        assert_eq!(listed.sortable, Some(true));
        // Not in the set, but an existing true flag is never reset.
        assert_eq!(preset.sortable, Some(true));
    }

    #[test]
    fn test_column_passthrough_attributes() {
        let json = r#"{"fieldName":"Amount","label":"Amount","type":"currency","typeAttributes":{"currencyCode":"EUR"}}"#;
        let column: Column = serde_json::from_str(json).unwrap();

        assert_eq!(column.column_type.as_deref(), Some("currency"));
        assert!(column.extra.contains_key("typeAttributes"));

        let back = serde_json::to_value(&column).unwrap();
        assert_eq!(back["typeAttributes"]["currencyCode"], "EUR");
        assert!(back.get("editable").is_none());
    }
}
