//! External service seams.
//!
//! The controller never performs I/O itself. Fetching rows, persisting drafts
//! and looking up object metadata are delegated to these traits, which the
//! host implements on top of its own transport.

mod cached;
mod memory;

pub use cached::*;
pub use memory::*;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;

use crate::error::SaveErrors;
use crate::error::ServiceError;
use crate::model::ObjectInfo;
use crate::model::Row;
use crate::model::RowKey;

/// 1-based display position of each edited row, used to label errors.
///
/// Rows that are not currently displayed have no entry.
pub type RowPositions = HashMap<RowKey, usize>;

/// Result of persisting a batch of drafts.
///
/// Validation failures are reported here rather than as an `Err`, so a
/// partial save can succeed for some rows and fail for others.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SaveResult {
    /// Records that were saved.
    #[serde(default)]
    pub success: Vec<Row>,
    /// Row and table level validation errors.
    #[serde(default)]
    pub errors: SaveErrors,
}

/// Persists draft edits.
#[async_trait]
pub trait SaveService: Send + Sync {
    /// Saves the drafts. `positions` maps each draft key to its display row.
    ///
    /// Returns `Err` only for transport-level failures.
    async fn update_draft_values(
        &self,
        drafts: &[Row],
        positions: &RowPositions,
    ) -> Result<SaveResult, ServiceError>;
}

/// Supplies rows for an object.
#[async_trait]
pub trait DataService: Send + Sync {
    /// Fetches the current rows of an object.
    async fn fetch_rows(&self, object_name: &str) -> Result<Vec<Row>, ServiceError>;
}

/// Looks up object schema information.
#[async_trait]
pub trait MetadataService: Send + Sync {
    /// Returns schema information for an object API name.
    async fn object_info(&self, api_name: &str) -> Result<ObjectInfo, ServiceError>;
}

/// The collaborators a grid controller delegates to.
///
/// Cheap to clone; services are shared behind `Arc`.
#[derive(Clone)]
pub struct GridServices {
    /// Row source for refreshes.
    pub data: Arc<dyn DataService>,
    /// Draft persistence.
    pub save: Arc<dyn SaveService>,
    /// Optional metadata lookup.
    pub metadata: Option<Arc<dyn MetadataService>>,
}

impl GridServices {
    /// Creates services from a data source and a save target.
    pub fn new(data: Arc<dyn DataService>, save: Arc<dyn SaveService>) -> Self {
        Self {
            data,
            save,
            metadata: None,
        }
    }

    /// Uses one backend for both loading and saving.
    pub fn shared<S>(backend: Arc<S>) -> Self
    where
        S: DataService + SaveService + 'static,
    {
        Self::new(backend.clone(), backend)
    }

    /// Sets the metadata service.
    pub fn with_metadata(mut self, metadata: Arc<dyn MetadataService>) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

impl std::fmt::Debug for GridServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridServices")
            .field("metadata", &self.metadata.is_some())
            .finish_non_exhaustive()
    }
}
