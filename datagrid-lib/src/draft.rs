//! Inline-edit draft reconciliation.
//!
//! The widget reports edits cell by cell. A [`DraftMap`] folds them into one
//! draft per row so a save sends a single coherent record per key.

use std::collections::HashMap;

use crate::model::Row;
use crate::model::RowKey;

/// Merged drafts keyed by row identity.
///
/// Holds at most one draft per key. Iteration follows the order in which keys
/// were first edited.
///
/// # Example
///
/// ```
/// use datagrid_lib::draft::DraftMap;
/// use datagrid_lib::model::Row;
///
/// let mut drafts = DraftMap::new();
/// drafts.merge("Id", &[Row::new().set("Id", "1").set("Name", "a")]);
/// drafts.merge("Id", &[Row::new().set("Id", "1").set("Phone", "555")]);
///
/// let draft = drafts.get(&"1".into()).unwrap();
/// assert_eq!(draft.get_string("Name").unwrap(), Some("a"));
/// assert_eq!(draft.get_string("Phone").unwrap(), Some("555"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DraftMap {
    entries: HashMap<RowKey, Row>,
    order: Vec<RowKey>,
}

impl DraftMap {
    /// Creates an empty draft map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds a batch of edits into the map in place.
    ///
    /// A new key is inserted as-is. An existing key gets the field-wise union
    /// of its draft and the edit, with the edit winning on conflicts. Edits
    /// without a key value are skipped.
    ///
    /// Returns the number of edits applied.
    pub fn merge(&mut self, key_field: &str, edits: &[Row]) -> usize {
        let mut applied = 0;
        for edit in edits {
            let Some(key) = edit.key(key_field) else {
                log::warn!("Skipping draft without a '{}' value", key_field);
                continue;
            };
            match self.entries.get_mut(&key) {
                Some(existing) => existing.merge(edit),
                None => {
                    self.order.push(key.clone());
                    self.entries.insert(key, edit.clone());
                }
            }
            applied += 1;
        }
        applied
    }

    /// Returns a new map with the edits folded in, leaving `self` untouched.
    pub fn merged(&self, key_field: &str, edits: &[Row]) -> DraftMap {
        let mut next = self.clone();
        next.merge(key_field, edits);
        next
    }

    /// Returns the draft for a key.
    pub fn get(&self, key: &RowKey) -> Option<&Row> {
        self.entries.get(key)
    }

    /// Returns `true` if a draft exists for the key.
    pub fn contains(&self, key: &RowKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Removes the draft for a key.
    pub fn remove(&mut self, key: &RowKey) -> Option<Row> {
        let removed = self.entries.remove(key)?;
        self.order.retain(|k| k != key);
        Some(removed)
    }

    /// Drops from a draft every field that `persisted` saved with the same
    /// value.
    ///
    /// The draft is removed once only its key is left. Returns `true` if the
    /// draft still holds unsaved fields and was kept.
    pub fn settle(&mut self, key_field: &str, persisted: &Row) -> bool {
        let Some(key) = persisted.key(key_field) else {
            return false;
        };
        let Some(draft) = self.entries.get_mut(&key) else {
            return false;
        };

        let saved: Vec<String> = draft
            .fields()
            .iter()
            .filter(|(field, value)| *field != key_field && persisted.get(field) == Some(*value))
            .map(|(field, _)| field.clone())
            .collect();
        for field in &saved {
            draft.remove(field);
        }

        if draft.fields().keys().any(|field| field != key_field) {
            return true;
        }
        self.remove(&key);
        false
    }

    /// Returns the keys in first-edit order.
    pub fn keys(&self) -> &[RowKey] {
        &self.order
    }

    /// Iterates the drafts in first-edit order.
    pub fn values(&self) -> impl Iterator<Item = &Row> {
        self.order.iter().filter_map(|k| self.entries.get(k))
    }

    /// Returns the drafts as a flat list, as the widget expects them.
    pub fn to_vec(&self) -> Vec<Row> {
        self.values().cloned().collect()
    }

    /// Returns the number of drafts.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no drafts.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Value;

    fn edit(id: &str, field: &str, value: &str) -> Row {
        Row::new().set("Id", id).set(field, value)
    }

    #[test]
    fn test_disjoint_edits_union() {
        let mut drafts = DraftMap::new();
        drafts.merge("Id", &[edit("1", "Name", "Acme")]);
        drafts.merge("Id", &[edit("1", "Phone", "555")]);

        let draft = drafts.get(&RowKey::from("1")).unwrap();
        assert_eq!(draft.get_string("Name").unwrap(), Some("Acme"));
        assert_eq!(draft.get_string("Phone").unwrap(), Some("555"));
        assert_eq!(drafts.len(), 1);
    }

    #[test]
    fn test_overlapping_edits_last_wins() {
        let mut drafts = DraftMap::new();
        drafts.merge("Id", &[edit("1", "Name", "Acme").set("Phone", "555")]);
        drafts.merge("Id", &[edit("1", "Name", "Globex")]);

        let draft = drafts.get(&RowKey::from("1")).unwrap();
        assert_eq!(draft.get_string("Name").unwrap(), Some("Globex"));
        assert_eq!(draft.get_string("Phone").unwrap(), Some("555"));
    }

    #[test]
    fn test_batch_with_repeated_key_accumulates() {
        let mut drafts = DraftMap::new();
        let applied = drafts.merge(
            "Id",
            &[
                edit("1", "Name", "a"),
                edit("2", "Name", "b"),
                edit("1", "Phone", "c"),
            ],
        );

        assert_eq!(applied, 3);
        assert_eq!(drafts.keys(), &[RowKey::from("1"), RowKey::from("2")]);
        let first = drafts.get(&RowKey::from("1")).unwrap();
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn test_merged_is_pure() {
        let mut base = DraftMap::new();
        base.merge("Id", &[edit("1", "Name", "a")]);

        let next = base.merged("Id", &[edit("1", "Name", "b")]);

        assert_eq!(
            base.get(&RowKey::from("1")).unwrap().get_string("Name").unwrap(),
            Some("a")
        );
        assert_eq!(
            next.get(&RowKey::from("1")).unwrap().get_string("Name").unwrap(),
            Some("b")
        );
    }

    #[test]
    fn test_edit_without_key_is_skipped() {
        let mut drafts = DraftMap::new();
        let applied = drafts.merge(
            "Id",
            &[
                Row::new().set("Name", "orphan"),
                Row::new().set("Id", Value::Null).set("Name", "null key"),
            ],
        );
        assert_eq!(applied, 0);
        assert!(drafts.is_empty());
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut drafts = DraftMap::new();
        drafts.merge(
            "Id",
            &[edit("1", "a", "x"), edit("2", "a", "y"), edit("3", "a", "z")],
        );
        drafts.remove(&RowKey::from("2"));

        let ids: Vec<_> = drafts
            .values()
            .map(|r| r.get_string("Id").unwrap().unwrap().to_string())
            .collect();
        assert_eq!(ids, vec!["1", "3"]);
        assert!(drafts.remove(&RowKey::from("2")).is_none());
    }

    #[test]
    fn test_settle_removes_fully_saved_draft() {
        let mut drafts = DraftMap::new();
        drafts.merge("Id", &[edit("1", "Name", "a")]);

        assert!(!drafts.settle("Id", &edit("1", "Name", "a")));
        assert!(drafts.is_empty());
    }

    #[test]
    fn test_settle_keeps_fields_edited_after_snapshot() {
        let mut drafts = DraftMap::new();
        drafts.merge("Id", &[edit("1", "Name", "a")]);
        let persisted = drafts.get(&RowKey::from("1")).unwrap().clone();
        drafts.merge("Id", &[edit("1", "Phone", "999"), edit("1", "Name", "b")]);

        assert!(drafts.settle("Id", &persisted));
        assert_eq!(
            drafts.get(&RowKey::from("1")),
            Some(&Row::new().set("Id", "1").set("Name", "b").set("Phone", "999"))
        );
    }

    #[test]
    fn test_settle_drops_only_matching_fields() {
        let mut drafts = DraftMap::new();
        drafts.merge("Id", &[edit("1", "Name", "a").set("Phone", "1")]);

        assert!(drafts.settle("Id", &edit("1", "Name", "a")));
        assert_eq!(
            drafts.get(&RowKey::from("1")),
            Some(&edit("1", "Phone", "1"))
        );
        assert!(!drafts.settle("Id", &edit("2", "Name", "a")));
    }
}
