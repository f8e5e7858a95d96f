//! In-memory record store implementing the service traits.

use std::sync::RwLock;

use async_trait::async_trait;

use super::DataService;
use super::MetadataService;
use super::RowPositions;
use super::SaveResult;
use super::SaveService;
use crate::config::persisted_key_field;
use crate::error::RowError;
use crate::error::ServiceError;
use crate::error::TableError;
use crate::model::ObjectInfo;
use crate::model::Row;
use crate::model::RowKey;

/// Title of the table-level summary when some rows fail to save.
pub const SAVE_ERROR_TITLE: &str = "Your entry cannot be saved. Fix the errors and try again.";

type Validator = Box<dyn Fn(&Row, &Row) -> Result<(), RowError> + Send + Sync>;

/// A record store held in memory.
///
/// Serves rows for any object name, applies drafts field by field and reports
/// per-row errors for unknown keys or drafts rejected by the validator.
/// Success records carry the key under the persisted key name (`id` for the
/// default `Id` key field).
///
/// # Example
///
/// ```
/// use datagrid_lib::model::Row;
/// use datagrid_lib::service::InMemoryStore;
///
/// let store = InMemoryStore::new("Id", vec![Row::new().set("Id", "1")]);
/// assert_eq!(store.len(), 1);
/// ```
pub struct InMemoryStore {
    key_field: String,
    rows: RwLock<Vec<Row>>,
    object_info: Option<ObjectInfo>,
    validator: Option<Validator>,
}

impl InMemoryStore {
    /// Creates a store keyed by `key_field`.
    pub fn new(key_field: impl Into<String>, rows: Vec<Row>) -> Self {
        Self {
            key_field: key_field.into(),
            rows: RwLock::new(rows),
            object_info: None,
            validator: None,
        }
    }

    /// Serves this object info from [`MetadataService::object_info`].
    pub fn with_object_info(mut self, info: ObjectInfo) -> Self {
        self.object_info = Some(info);
        self
    }

    /// Rejects drafts for which `validator(current, draft)` returns an error.
    pub fn with_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&Row, &Row) -> Result<(), RowError> + Send + Sync + 'static,
    {
        self.validator = Some(Box::new(validator));
        self
    }

    /// Returns a snapshot of the stored rows.
    pub fn rows(&self) -> Vec<Row> {
        self.rows.read().map(|g| g.clone()).unwrap_or_default()
    }

    /// Replaces the stored rows.
    pub fn set_rows(&self, rows: Vec<Row>) {
        if let Ok(mut guard) = self.rows.write() {
            *guard = rows;
        }
    }

    /// Removes the row with this key. Returns `true` if it existed.
    pub fn delete(&self, key: &RowKey) -> bool {
        let Ok(mut guard) = self.rows.write() else {
            return false;
        };
        let before = guard.len();
        guard.retain(|r| r.key(&self.key_field).as_ref() != Some(key));
        guard.len() != before
    }

    /// Returns the number of stored rows.
    pub fn len(&self) -> usize {
        self.rows.read().map(|g| g.len()).unwrap_or(0)
    }

    /// Returns `true` if the store holds no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for InMemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryStore")
            .field("key_field", &self.key_field)
            .field("rows", &self.len())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl DataService for InMemoryStore {
    async fn fetch_rows(&self, _object_name: &str) -> Result<Vec<Row>, ServiceError> {
        self.rows
            .read()
            .map(|g| g.clone())
            .map_err(|_| ServiceError::message("record store is unavailable"))
    }
}

#[async_trait]
impl SaveService for InMemoryStore {
    async fn update_draft_values(
        &self,
        drafts: &[Row],
        positions: &RowPositions,
    ) -> Result<SaveResult, ServiceError> {
        let mut guard = self
            .rows
            .write()
            .map_err(|_| ServiceError::message("record store is unavailable"))?;

        let mut result = SaveResult::default();
        let mut summary = Vec::new();

        for draft in drafts {
            let Some(key) = draft.key(&self.key_field) else {
                log::warn!("Draft without '{}' cannot be saved", self.key_field);
                continue;
            };

            let outcome = match guard
                .iter_mut()
                .find(|r| r.key(&self.key_field).as_ref() == Some(&key))
            {
                None => Err(RowError::new("Record not found", "The record no longer exists.")),
                Some(current) => {
                    let checked = match &self.validator {
                        Some(validate) => validate(current, draft),
                        None => Ok(()),
                    };
                    checked.map(|()| {
                        current.merge(draft);
                        current.clone()
                    })
                }
            };

            match outcome {
                Ok(saved) => {
                    let mut record = saved;
                    if let Some(value) = record.remove(&self.key_field) {
                        record.insert(persisted_key_field(&self.key_field), value);
                    }
                    result.success.push(record);
                }
                Err(error) => {
                    let label = match positions.get(&key) {
                        Some(position) => format!("Row {}", position),
                        None => format!("Record {}", key),
                    };
                    summary.push(format!("{}: {}", label, error.messages.join(" ")));
                    result.errors.rows.insert(key.to_string(), error);
                }
            }
        }

        if !summary.is_empty() {
            result.errors.table = Some(TableError::new(SAVE_ERROR_TITLE, summary));
        }

        log::debug!(
            "Saved {} draft(s), {} failed",
            result.success.len(),
            result.errors.rows.len()
        );
        Ok(result)
    }
}

#[async_trait]
impl MetadataService for InMemoryStore {
    async fn object_info(&self, api_name: &str) -> Result<ObjectInfo, ServiceError> {
        match &self.object_info {
            Some(info) if info.api_name == api_name => Ok(info.clone()),
            _ => Err(ServiceError::Messages(vec![format!(
                "The requested resource does not exist: {}",
                api_name
            )])),
        }
    }
}
