//! Grid state controller.
//!
//! [`GridController`] owns everything the grid widget displays: columns,
//! rows, the active sort, the selection and pending inline edits. The host
//! feeds it widget events through the `handle_*` methods and drives loading
//! through [`initialize`](GridController::initialize),
//! [`refresh`](GridController::refresh) and [`save`](GridController::save).
//!
//! # Requests
//!
//! Saves and refreshes are split into a `begin_*` step, which snapshots the
//! request, and a `complete_*` step, which applies the response. Only one
//! request may be in flight; a second `begin_*` is rejected until the first
//! completes. Edits that arrive in between are merged into the drafts but do
//! not join the request already sent.
//!
//! # Example
//!
//! ```ignore
//! let store = Arc::new(InMemoryStore::new("Id", rows.clone()));
//! let mut grid = GridController::new(config, GridServices::shared(store));
//!
//! grid.subscribe(|event| println!("{}", event.name()));
//! grid.initialize("Account", columns, rows);
//! grid.handle_cell_change(&[Row::new().set("Id", "001").set("Name", "Acme")]);
//!
//! let edits = grid.draft_values().to_vec();
//! grid.save(edits).await;
//! ```

use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Arc;

use crate::config::GridConfig;
use crate::draft::DraftMap;
use crate::error::SaveErrors;
use crate::error::ServiceError;
use crate::error::reduce_errors;
use crate::event::EventBus;
use crate::event::GridEvent;
use crate::event::SubscriptionId;
use crate::event::Toast;
use crate::model::Column;
use crate::model::ObjectInfo;
use crate::model::Row;
use crate::model::RowKey;
use crate::selection::Selection;
use crate::service::GridServices;
use crate::service::RowPositions;
use crate::service::SaveResult;
use crate::sort::SortDirection;
use crate::sort::SortState;
use crate::sort::sort_rows;

/// The kind of request currently in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingRequest {
    /// Drafts are being persisted.
    Save,
    /// Fresh rows are being fetched.
    Refresh,
}

/// Snapshot handed to the save service by [`GridController::begin_save`].
#[derive(Debug, Clone, PartialEq)]
pub struct SaveRequest {
    /// Drafts to persist.
    pub drafts: Vec<Row>,
    /// 1-based display position of each draft's row.
    pub positions: RowPositions,
}

/// Snapshot handed to the data service by [`GridController::begin_refresh`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshRequest {
    /// Object whose rows are requested.
    pub object_name: String,
}

/// What a completed save did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SaveOutcome {
    /// Number of records reported as saved.
    pub saved: usize,
    /// Number of rows reported with errors.
    pub failed: usize,
    /// Whether a refresh should follow.
    pub refresh_requested: bool,
    /// Transport failure, if the service could not be reached.
    pub error: Option<ServiceError>,
}

/// What a completed refresh did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RefreshOutcome {
    /// Number of rows now displayed.
    pub rows: usize,
    /// Displayed rows that no longer exist server-side and were dropped.
    pub dropped: usize,
    /// Transport failure, if the service could not be reached.
    pub error: Option<ServiceError>,
}

/// Owns the state of one data grid.
#[derive(Debug)]
pub struct GridController {
    config: GridConfig,
    services: GridServices,
    events: EventBus,

    object_name: Option<String>,
    object_info: Option<ObjectInfo>,

    columns: Vec<Column>,
    rows: Vec<Row>,
    sort: Option<SortState>,
    selection: Selection,

    drafts: DraftMap,
    /// Flattened drafts as last handed to the widget.
    draft_values: Vec<Row>,
    /// Keys persisted by a save whose drafts are cleared on the next load.
    success_keys: HashSet<RowKey>,
    /// Drafts sent by the save in flight.
    in_flight: Vec<Row>,
    /// What each saved key was persisted with, for settling its draft.
    persisted: HashMap<RowKey, Row>,
    save_errors: Option<SaveErrors>,

    loading: bool,
    pending: Option<PendingRequest>,
}

impl GridController {
    /// Creates a controller with no data loaded.
    pub fn new(config: GridConfig, services: GridServices) -> Self {
        Self {
            sort: config.initial_sort(),
            selection: Selection::new(config.selection_mode),
            config,
            services,
            events: EventBus::new(),
            object_name: None,
            object_info: None,
            columns: Vec::new(),
            rows: Vec::new(),
            drafts: DraftMap::new(),
            draft_values: Vec::new(),
            success_keys: HashSet::new(),
            in_flight: Vec::new(),
            persisted: HashMap::new(),
            save_errors: None,
            loading: false,
            pending: None,
        }
    }

    // =========================================================================
    // Subscribers
    // =========================================================================

    /// Registers a listener for grid events.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: Fn(&GridEvent) + Send + Sync + 'static,
    {
        self.events.subscribe(listener)
    }

    /// Removes a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Loads columns and rows for an object.
    ///
    /// Empty `columns` or `data` leave the current columns or rows in place.
    /// Drafts already saved by a previous [`save`](Self::save) are cleared.
    ///
    /// Switching to another object drops its object info and the selection.
    /// Object info is not fetched here: call
    /// [`load_object_info`](Self::load_object_info) after each switch.
    pub fn initialize(&mut self, object_name: &str, columns: Vec<Column>, data: Vec<Row>) {
        self.set_loading(true);

        if self.object_name.as_deref() != Some(object_name) {
            self.object_name = Some(object_name.to_string());
            self.object_info = None;
            if !self.selection.is_empty() {
                self.selection.clear();
                self.events.publish(GridEvent::SelectionChanged {
                    selected_rows: Vec::new(),
                });
            }
        }
        self.load_columns(columns);
        self.load_rows(data);
        self.clear_saved_drafts();

        self.set_loading(false);
    }

    /// Fetches object info for the current object from the metadata service.
    ///
    /// A failure is reported as an error toast and leaves the grid usable.
    pub async fn load_object_info(&mut self) -> Option<&ObjectInfo> {
        let object_name = self.object_name.clone()?;
        let service = self.services.metadata.clone()?;

        match service.object_info(&object_name).await {
            Ok(info) => self.object_info = Some(info),
            Err(e) => {
                log::warn!("Object info lookup for {} failed: {}", object_name, e);
                let message = reduce_errors(&[e]).into_iter().next().unwrap_or_default();
                self.events
                    .publish(GridEvent::Toast(Toast::error("Object info error", message)));
            }
        }
        self.object_info.as_ref()
    }

    /// Starts a refresh. Returns `None` while another request is in flight or
    /// before the grid has been initialized.
    pub fn begin_refresh(&mut self) -> Option<RefreshRequest> {
        if let Some(pending) = self.pending {
            log::warn!("Refresh rejected: {:?} request already in flight", pending);
            return None;
        }
        let Some(object_name) = self.object_name.clone() else {
            log::warn!("Refresh rejected: grid has not been initialized");
            return None;
        };

        self.pending = Some(PendingRequest::Refresh);
        self.set_loading(true);
        self.events.publish(GridEvent::RefreshRequested);
        Some(RefreshRequest { object_name })
    }

    /// Applies the response to a refresh started with
    /// [`begin_refresh`](Self::begin_refresh).
    ///
    /// Displayed rows are replaced by their server counterpart in the current
    /// on-screen order. Rows that vanished server-side are dropped and rows
    /// that were not on screen are never added.
    pub fn complete_refresh(&mut self, result: Result<Vec<Row>, ServiceError>) -> RefreshOutcome {
        if self.pending == Some(PendingRequest::Refresh) {
            self.pending = None;
        }

        let outcome = match result {
            Ok(server_rows) => {
                let dropped = self.reconcile_rows(server_rows);
                self.clear_saved_drafts();
                RefreshOutcome {
                    rows: self.rows.len(),
                    dropped,
                    error: None,
                }
            }
            Err(e) => {
                log::error!("Refresh failed: {}", e);
                self.toast_error("Refresh failed", &e);
                RefreshOutcome {
                    rows: self.rows.len(),
                    dropped: 0,
                    error: Some(e),
                }
            }
        };

        self.set_loading(false);
        outcome
    }

    /// Fetches fresh rows from the data service and reconciles them.
    ///
    /// Returns `None` if the refresh was rejected.
    pub async fn refresh(&mut self) -> Option<RefreshOutcome> {
        let request = self.begin_refresh()?;
        let service = Arc::clone(&self.services.data);
        let result = service.fetch_rows(&request.object_name).await;
        Some(self.complete_refresh(result))
    }

    // =========================================================================
    // Widget events
    // =========================================================================

    /// Replaces the selection with the rows the widget reports.
    pub fn handle_row_selection(&mut self, selected_rows: Vec<Row>) {
        let dropped = self.selection.replace(selected_rows);
        if dropped > 0 {
            log::debug!(
                "Selection capped at {}, dropped {} row(s)",
                self.selection.mode().max_rows(),
                dropped
            );
        }
        self.events.publish(GridEvent::SelectionChanged {
            selected_rows: self.selection.rows().to_vec(),
        });
    }

    /// Sorts the rows currently in memory.
    pub fn handle_column_sort(&mut self, field_name: &str, direction: SortDirection) {
        let sort = SortState {
            field_name: field_name.to_string(),
            direction,
        };
        self.rows = sort_rows(&self.rows, field_name, direction);
        self.sort = Some(sort.clone());
        self.events.publish(GridEvent::SortChanged { sort });
    }

    /// Merges cell edits into the drafts.
    ///
    /// Returns the number of edits applied.
    pub fn handle_cell_change(&mut self, edits: &[Row]) -> usize {
        let applied = self.drafts.merge(&self.config.key_field, edits);
        if !self.drafts.is_empty() {
            self.draft_values = self.drafts.to_vec();
            self.events.publish(GridEvent::DraftsChanged {
                drafts: self.draft_values.clone(),
            });
        }
        applied
    }

    /// Discards every draft.
    pub fn handle_cancel_edits(&mut self) {
        let keys = self.drafts.keys().to_vec();
        self.clear_drafts(&keys);
    }

    /// Removes the drafts for the given keys.
    ///
    /// Once no drafts remain at all, stored save errors and saved keys are
    /// forgotten too.
    pub fn clear_drafts(&mut self, keys: &[RowKey]) {
        let key_field = &self.config.key_field;
        self.draft_values
            .retain(|draft| draft.key(key_field).is_none_or(|k| !keys.contains(&k)));
        for key in keys {
            self.drafts.remove(key);
        }

        if self.drafts.is_empty() && self.draft_values.is_empty() {
            self.save_errors = None;
            self.success_keys.clear();
            self.persisted.clear();
        }

        self.events.publish(GridEvent::DraftsChanged {
            drafts: self.draft_values.clone(),
        });
    }

    // =========================================================================
    // Saving
    // =========================================================================

    /// Starts a save of `edits`. Returns `None` while another request is in
    /// flight or when there is nothing to save.
    pub fn begin_save(&mut self, edits: Vec<Row>) -> Option<SaveRequest> {
        if let Some(pending) = self.pending {
            log::warn!("Save rejected: {:?} request already in flight", pending);
            return None;
        }
        if edits.is_empty() {
            log::debug!("Save skipped: no drafts");
            return None;
        }

        let positions = self.row_positions(&edits);
        self.in_flight = edits.clone();
        self.draft_values = edits.clone();
        self.events.publish(GridEvent::DraftsChanged {
            drafts: self.draft_values.clone(),
        });

        self.pending = Some(PendingRequest::Save);
        self.set_loading(true);
        Some(SaveRequest {
            drafts: edits,
            positions,
        })
    }

    /// Applies the response to a save started with
    /// [`begin_save`](Self::begin_save).
    ///
    /// Row errors are stored verbatim for display. Saved keys are remembered
    /// so their drafts are cleared by the next load, and a refresh is
    /// requested. Fields edited after the save began survive that clearing.
    pub fn complete_save(&mut self, result: Result<SaveResult, ServiceError>) -> SaveOutcome {
        if self.pending == Some(PendingRequest::Save) {
            self.pending = None;
        }
        let sent = std::mem::take(&mut self.in_flight);

        let outcome = match result {
            Ok(response) => self.apply_save_result(response, &sent),
            Err(e) => {
                log::error!("Save failed: {}", e);
                self.toast_error("Save failed", &e);
                SaveOutcome {
                    error: Some(e),
                    ..SaveOutcome::default()
                }
            }
        };

        self.set_loading(false);
        outcome
    }

    /// Persists `edits` through the save service, then refreshes if any row
    /// was saved.
    ///
    /// Returns `None` if the save was rejected.
    pub async fn save(&mut self, edits: Vec<Row>) -> Option<SaveOutcome> {
        let request = self.begin_save(edits)?;
        let service = Arc::clone(&self.services.save);
        let result = service
            .update_draft_values(&request.drafts, &request.positions)
            .await;

        let outcome = self.complete_save(result);
        if outcome.refresh_requested {
            self.refresh().await;
        }
        Some(outcome)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Returns the configuration.
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Returns the current object API name.
    pub fn object_name(&self) -> Option<&str> {
        self.object_name.as_deref()
    }

    /// Returns the loaded object info.
    pub fn object_info(&self) -> Option<&ObjectInfo> {
        self.object_info.as_ref()
    }

    /// Returns the decorated columns.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Returns the displayed rows.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Returns the number of displayed rows.
    pub fn record_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns the active sort.
    pub fn sort(&self) -> Option<&SortState> {
        self.sort.as_ref()
    }

    /// Returns the selected rows.
    pub fn selected_rows(&self) -> &[Row] {
        self.selection.rows()
    }

    /// Returns the selection state.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Returns the merged drafts.
    pub fn drafts(&self) -> &DraftMap {
        &self.drafts
    }

    /// Returns the draft list last handed to the widget.
    pub fn draft_values(&self) -> &[Row] {
        &self.draft_values
    }

    /// Returns keys saved but not yet cleared from the drafts.
    pub fn success_keys(&self) -> &HashSet<RowKey> {
        &self.success_keys
    }

    /// Returns stored save errors.
    pub fn save_errors(&self) -> Option<&SaveErrors> {
        self.save_errors.as_ref()
    }

    /// Returns `true` while the loading indicator is shown.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Returns the request in flight, if any.
    pub fn pending(&self) -> Option<PendingRequest> {
        self.pending
    }

    /// Returns `true` if the grid shows any header actions.
    pub fn has_actions(&self) -> bool {
        self.config.show_refresh_button
    }

    /// Returns `true` if the checkbox column is hidden.
    pub fn hide_checkbox(&self) -> bool {
        self.config.selection_mode.hides_checkbox()
    }

    /// Returns the selection cap handed to the widget.
    pub fn max_row_selection(&self) -> usize {
        self.config.selection_mode.max_rows()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn set_loading(&mut self, loading: bool) {
        if self.loading != loading {
            self.loading = loading;
            self.events.publish(GridEvent::LoadingChanged { loading });
        }
    }

    fn toast_error(&self, title: &str, error: &ServiceError) {
        let message = reduce_errors(std::slice::from_ref(error)).join(", ");
        self.events
            .publish(GridEvent::Toast(Toast::error(title, message)));
    }

    fn load_columns(&mut self, columns: Vec<Column>) {
        if columns.is_empty() {
            log::debug!("No columns supplied, keeping {} existing", self.columns.len());
            return;
        }
        self.columns = columns
            .into_iter()
            .map(|mut column| {
                column.apply_field_sets(&self.config.sortable_fields, &self.config.editable_fields);
                column
            })
            .collect();
        self.events.publish(GridEvent::ColumnsLoaded {
            columns: self.columns.clone(),
        });
    }

    fn load_rows(&mut self, data: Vec<Row>) {
        if data.is_empty() {
            log::debug!("No rows supplied, keeping {} existing", self.rows.len());
            return;
        }
        self.rows = match &self.sort {
            Some(sort) => sort_rows(&data, &sort.field_name, sort.direction),
            None => data,
        };
        self.events.publish(GridEvent::RowsLoaded {
            rows: self.rows.clone(),
        });
    }

    /// Swaps displayed rows for their server versions, keeping screen order.
    ///
    /// Returns the number of displayed rows that were dropped.
    fn reconcile_rows(&mut self, server_rows: Vec<Row>) -> usize {
        if self.rows.is_empty() {
            self.load_rows(server_rows);
            return 0;
        }
        if server_rows.is_empty() {
            log::debug!("Refresh returned no rows, keeping {} displayed", self.rows.len());
            return 0;
        }

        let key_field = &self.config.key_field;
        let mut by_key: HashMap<RowKey, Row> = HashMap::with_capacity(server_rows.len());
        for row in server_rows {
            if let Some(key) = row.key(key_field) {
                by_key.entry(key).or_insert(row);
            }
        }

        let before = self.rows.len();
        let rows: Vec<Row> = self
            .rows
            .iter()
            .filter_map(|displayed| {
                displayed
                    .key(key_field)
                    .and_then(|key| by_key.get(&key))
                    .cloned()
            })
            .collect();
        let dropped = before - rows.len();
        if dropped > 0 {
            log::debug!("Refresh dropped {} row(s) missing server-side", dropped);
        }

        self.rows = rows;
        self.events.publish(GridEvent::RowsLoaded {
            rows: self.rows.clone(),
        });
        dropped
    }

    fn row_positions(&self, edits: &[Row]) -> RowPositions {
        let key_field = &self.config.key_field;
        edits
            .iter()
            .filter_map(|edit| {
                let key = edit.key(key_field)?;
                let index = self
                    .rows
                    .iter()
                    .position(|row| row.key(key_field).as_ref() == Some(&key))?;
                Some((key, index + 1))
            })
            .collect()
    }

    fn apply_save_result(&mut self, response: SaveResult, sent: &[Row]) -> SaveOutcome {
        let failed = response.errors.rows.len();
        if response.errors.has_row_errors() {
            self.save_errors = Some(response.errors);
        }

        let key_field = &self.config.key_field;
        let persisted_key = self.config.persisted_key_field();
        let mut saved = 0;
        for record in &response.success {
            match record.key(persisted_key) {
                Some(key) => {
                    let draft = sent
                        .iter()
                        .find(|draft| draft.key(key_field).as_ref() == Some(&key));
                    if let Some(draft) = draft {
                        self.persisted.insert(key.clone(), draft.clone());
                    }
                    self.success_keys.insert(key);
                    saved += 1;
                }
                None => log::warn!("Saved record has no '{}' value", persisted_key),
            }
        }

        SaveOutcome {
            saved,
            failed,
            refresh_requested: !response.success.is_empty(),
            error: None,
        }
    }

    /// Clears drafts of rows persisted by an earlier save.
    ///
    /// A draft edited again while its save was in flight keeps the fields the
    /// save did not persist.
    fn clear_saved_drafts(&mut self) {
        if self.success_keys.is_empty() {
            return;
        }

        let key_field = self.config.key_field.clone();
        let mut settled = Vec::new();
        let mut kept = Vec::new();
        for key in std::mem::take(&mut self.success_keys) {
            let still_edited = match self.persisted.remove(&key) {
                Some(sent) => self.drafts.settle(&key_field, &sent),
                None => false,
            };
            if still_edited {
                kept.push(key);
            } else {
                settled.push(key);
            }
        }

        if !kept.is_empty() {
            log::debug!("Keeping {} draft(s) edited during save", kept.len());
            let drafts = &self.drafts;
            for value in &mut self.draft_values {
                let current = value
                    .key(&key_field)
                    .filter(|key| kept.contains(key))
                    .and_then(|key| drafts.get(&key));
                if let Some(current) = current {
                    *value = current.clone();
                }
            }
        }

        if settled.is_empty() {
            self.events.publish(GridEvent::DraftsChanged {
                drafts: self.draft_values.clone(),
            });
        } else {
            self.clear_drafts(&settled);
        }
    }
}
