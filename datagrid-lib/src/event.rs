//! Change notifications emitted by the grid controller.

use std::fmt;

use serde::Serialize;
use uuid::Uuid;

use crate::model::Column;
use crate::model::Row;
use crate::sort::SortState;

/// A notification published to every subscriber of a grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum GridEvent {
    /// Column configuration was (re)built.
    ColumnsLoaded { columns: Vec<Column> },
    /// The displayed rows were replaced.
    RowsLoaded { rows: Vec<Row> },
    /// The selection changed.
    SelectionChanged { selected_rows: Vec<Row> },
    /// The displayed rows were re-sorted.
    SortChanged { sort: SortState },
    /// The flattened draft list changed.
    DraftsChanged { drafts: Vec<Row> },
    /// The loading indicator was shown or hidden.
    LoadingChanged { loading: bool },
    /// Fresh data was requested from the data service.
    RefreshRequested,
    /// A transient message for the user.
    Toast(Toast),
}

impl GridEvent {
    /// Returns the notification name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ColumnsLoaded { .. } => "columns-loaded",
            Self::RowsLoaded { .. } => "rows-loaded",
            Self::SelectionChanged { .. } => "selection-changed",
            Self::SortChanged { .. } => "sort-changed",
            Self::DraftsChanged { .. } => "drafts-changed",
            Self::LoadingChanged { .. } => "loading-changed",
            Self::RefreshRequested => "refresh-requested",
            Self::Toast(_) => "toast",
        }
    }
}

// =============================================================================
// Toast
// =============================================================================

/// Visual weight of a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastVariant {
    Info,
    Success,
    Warning,
    Error,
}

/// A transient user-facing message.
///
/// # Example
///
/// ```
/// use datagrid_lib::event::{Toast, ToastVariant};
///
/// let toast = Toast::error("Save failed", "Connection reset");
/// assert_eq!(toast.variant, ToastVariant::Error);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Toast {
    /// Heading.
    pub title: String,
    /// Body text.
    pub message: String,
    /// Visual weight.
    pub variant: ToastVariant,
}

impl Toast {
    /// Creates a toast of any variant.
    pub fn new(title: impl Into<String>, message: impl Into<String>, variant: ToastVariant) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            variant,
        }
    }

    /// Creates an error toast.
    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(title, message, ToastVariant::Error)
    }
}

// =============================================================================
// Subscribers
// =============================================================================

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "__grid_sub_{}", self.0)
    }
}

type Listener = Box<dyn Fn(&GridEvent) + Send + Sync>;

/// Fan-out of grid events to registered listeners.
///
/// Listeners are called synchronously, in registration order.
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<(SubscriptionId, Listener)>,
}

impl EventBus {
    /// Creates a bus with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: Fn(&GridEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId::new();
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Removes a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    /// Delivers an event to every listener.
    pub fn publish(&self, event: GridEvent) {
        log::trace!(
            "Publishing {} to {} listener(s)",
            event.name(),
            self.listeners.len()
        );
        for (_, listener) in &self.listeners {
            listener(&event);
        }
    }

    /// Returns the number of listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Returns `true` if there are no listeners.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::Mutex;

    use super::*;

    #[test]
    fn test_subscribe_and_publish() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut bus = EventBus::new();

        let sink = Arc::clone(&seen);
        bus.subscribe(move |event| sink.lock().unwrap().push(event.name()));

        bus.publish(GridEvent::RefreshRequested);
        bus.publish(GridEvent::LoadingChanged { loading: true });

        assert_eq!(
            *seen.lock().unwrap(),
            vec!["refresh-requested", "loading-changed"]
        );
    }

    #[test]
    fn test_unsubscribe() {
        let seen = Arc::new(Mutex::new(0));
        let mut bus = EventBus::new();

        let sink = Arc::clone(&seen);
        let id = bus.subscribe(move |_| *sink.lock().unwrap() += 1);

        bus.publish(GridEvent::RefreshRequested);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.publish(GridEvent::RefreshRequested);

        assert_eq!(*seen.lock().unwrap(), 1);
        assert!(bus.is_empty());
    }

    #[test]
    fn test_event_serializes_with_tag() {
        let json = serde_json::to_value(GridEvent::LoadingChanged { loading: true }).unwrap();
        assert_eq!(json["type"], "loading-changed");
        assert_eq!(json["loading"], true);
    }

    #[test]
    fn test_event_fields_are_camel_case() {
        let json = serde_json::to_value(GridEvent::SelectionChanged {
            selected_rows: vec![Row::new().set("Id", "1")],
        })
        .unwrap();

        assert_eq!(
            json,
            serde_json::json!({"type": "selection-changed", "selectedRows": [{"Id": "1"}]})
        );
    }

    #[test]
    fn test_toast_event_is_flat() {
        let toast = Toast::new("Saved", "2 records updated", ToastVariant::Success);
        let json = serde_json::to_value(GridEvent::Toast(toast)).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "type": "toast",
                "title": "Saved",
                "message": "2 records updated",
                "variant": "success"
            })
        );
    }
}
