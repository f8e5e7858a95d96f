//! Row selection state.

use serde::Deserialize;
use serde::Serialize;

use crate::model::Row;
use crate::model::RowKey;

/// Largest number of rows a multi-select grid accepts.
pub const MAX_ROW_SELECTION: usize = 200;

/// Selection mode of the grid's checkbox column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// No selection allowed; the checkbox column is hidden.
    #[default]
    #[serde(alias = "None")]
    None,
    /// Exactly one row can be selected.
    #[serde(alias = "Single")]
    Single,
    /// Up to [`MAX_ROW_SELECTION`] rows can be selected.
    #[serde(alias = "Multi")]
    Multi,
}

impl SelectionMode {
    /// Returns the selection cap for this mode.
    pub fn max_rows(self) -> usize {
        match self {
            Self::None => 0,
            Self::Single => 1,
            Self::Multi => MAX_ROW_SELECTION,
        }
    }

    /// Returns `true` if the checkbox column should be hidden.
    pub fn hides_checkbox(self) -> bool {
        matches!(self, Self::None)
    }
}

/// Currently selected rows, in the order the widget reported them.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    mode: SelectionMode,
    rows: Vec<Row>,
}

impl Selection {
    /// Creates an empty selection for a mode.
    pub fn new(mode: SelectionMode) -> Self {
        Self {
            mode,
            rows: Vec::new(),
        }
    }

    /// Returns the selection mode.
    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Replaces the selection, keeping at most the mode's cap.
    ///
    /// Returns the number of rows dropped by the cap.
    pub fn replace(&mut self, mut rows: Vec<Row>) -> usize {
        let max = self.mode.max_rows();
        let dropped = rows.len().saturating_sub(max);
        rows.truncate(max);
        self.rows = rows;
        dropped
    }

    /// Clears the selection.
    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// Returns the selected rows.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Returns the keys of the selected rows.
    pub fn keys(&self, key_field: &str) -> Vec<RowKey> {
        self.rows.iter().filter_map(|r| r.key(key_field)).collect()
    }

    /// Returns `true` if a row with this key is selected.
    pub fn is_selected(&self, key_field: &str, key: &RowKey) -> bool {
        self.rows
            .iter()
            .any(|r| r.key(key_field).as_ref() == Some(key))
    }

    /// Returns the number of selected rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(n: i64) -> Vec<Row> {
        (1..=n).map(|i| Row::new().set("Id", i)).collect()
    }

    #[test]
    fn test_caps() {
        assert_eq!(SelectionMode::None.max_rows(), 0);
        assert_eq!(SelectionMode::Single.max_rows(), 1);
        assert_eq!(SelectionMode::Multi.max_rows(), 200);
        assert!(SelectionMode::None.hides_checkbox());
        assert!(!SelectionMode::Multi.hides_checkbox());
    }

    #[test]
    fn test_single_truncates() {
        let mut selection = Selection::new(SelectionMode::Single);
        assert_eq!(selection.replace(rows(3)), 2);
        assert_eq!(selection.keys("Id"), vec![RowKey::Int(1)]);
        assert!(selection.is_selected("Id", &RowKey::Int(1)));
        assert!(!selection.is_selected("Id", &RowKey::Int(2)));
    }

    #[test]
    fn test_none_keeps_nothing() {
        let mut selection = Selection::new(SelectionMode::None);
        selection.replace(rows(2));
        assert!(selection.is_empty());
    }

    #[test]
    fn test_multi_replaces() {
        let mut selection = Selection::new(SelectionMode::Multi);
        selection.replace(rows(3));
        selection.replace(rows(1));
        assert_eq!(selection.len(), 1);
    }

    #[test]
    fn test_mode_serde_accepts_both_cases() {
        let mode: SelectionMode = serde_json::from_str("\"Multi\"").unwrap();
        assert_eq!(mode, SelectionMode::Multi);
        let mode: SelectionMode = serde_json::from_str("\"single\"").unwrap();
        assert_eq!(mode, SelectionMode::Single);
    }
}
