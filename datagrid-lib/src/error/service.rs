//! Errors reported by the external service collaborators

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

/// Record error code for missing access or a read-only record.
pub const INSUFFICIENT_ACCESS_OR_READONLY: &str = "INSUFFICIENT_ACCESS_OR_READONLY";
/// Record error code for a failed custom validation rule.
pub const FIELD_CUSTOM_VALIDATION_EXCEPTION: &str = "FIELD_CUSTOM_VALIDATION_EXCEPTION";
/// Record error code for a failing automation trigger.
pub const CANNOT_EXECUTE_FLOW_TRIGGER: &str = "CANNOT_EXECUTE_FLOW_TRIGGER";

/// Errors that a data, save or metadata service can return.
///
/// The variants follow the shapes a record service typically produces, so
/// [`reduce_errors`] can pull a user-facing message out of each one.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ServiceError {
    /// A read error carrying a list of messages.
    #[error("{}", .0.join("; "))]
    Messages(Vec<String>),

    /// A record-level failure (validation, access, triggers).
    #[error("Record error: {}", .0.first_message().unwrap_or("unknown"))]
    Record(RecordErrorOutput),

    /// A plain message (DML, server and client-side errors).
    #[error("{0}")]
    Message(String),

    /// Page-level errors.
    #[error("Page error: {}", .0.first().map(|e| e.message.as_str()).unwrap_or("unknown"))]
    PageErrors(Vec<RecordError>),

    /// Transport failure with only a status available.
    #[error("HTTP {status}: {status_text}")]
    Http {
        /// Status code.
        status: u16,
        /// Status text.
        status_text: String,
    },
}

impl ServiceError {
    /// Creates a plain message error.
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    /// Creates a transport error.
    pub fn http(status: u16, status_text: impl Into<String>) -> Self {
        Self::Http {
            status,
            status_text: status_text.into(),
        }
    }

    /// Returns the user-facing messages for this error.
    ///
    /// May contain empty strings; [`reduce_errors`] filters those out.
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::Messages(messages) => messages.clone(),
            Self::Record(output) => vec![output.first_message().unwrap_or_default().to_string()],
            Self::Message(message) => vec![message.clone()],
            Self::PageErrors(errors) => errors
                .first()
                .map(|e| vec![e.message.clone()])
                .unwrap_or_default(),
            Self::Http { status_text, .. } => vec![status_text.clone()],
        }
    }
}

/// A single coded error message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordError {
    /// Machine-readable code.
    #[serde(default)]
    pub error_code: String,
    /// Human-readable message.
    pub message: String,
}

impl RecordError {
    /// Creates a new coded error.
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
        }
    }
}

/// Output of a failed record operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordErrorOutput {
    /// Record-level errors.
    #[serde(default)]
    pub errors: Vec<RecordError>,
    /// Errors keyed by field name.
    #[serde(default)]
    pub field_errors: BTreeMap<String, Vec<RecordError>>,
}

impl RecordErrorOutput {
    /// Picks the message worth showing to a user.
    ///
    /// Only a few record-level codes are surfaced. Field errors are used when
    /// there are no record-level errors at all.
    pub fn first_message(&self) -> Option<&str> {
        match self.errors.first() {
            Some(first) => match first.error_code.as_str() {
                INSUFFICIENT_ACCESS_OR_READONLY
                | FIELD_CUSTOM_VALIDATION_EXCEPTION
                | CANNOT_EXECUTE_FLOW_TRIGGER => Some(first.message.as_str()),
                _ => None,
            },
            None => self
                .field_errors
                .values()
                .next()
                .and_then(|errors| errors.first())
                .map(|e| e.message.as_str()),
        }
    }
}

/// Reduces one or more service errors into a flat list of messages.
///
/// Empty messages are dropped.
///
/// # Example
///
/// ```
/// use datagrid_lib::error::{reduce_errors, ServiceError};
///
/// let errors = vec![
///     ServiceError::message("Network unreachable"),
///     ServiceError::Messages(vec!["a".into(), "".into(), "b".into()]),
/// ];
/// assert_eq!(reduce_errors(&errors), vec!["Network unreachable", "a", "b"]);
/// ```
pub fn reduce_errors(errors: &[ServiceError]) -> Vec<String> {
    errors
        .iter()
        .flat_map(ServiceError::messages)
        .filter(|message| !message.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_error_known_code() {
        let output = RecordErrorOutput {
            errors: vec![RecordError::new(
                FIELD_CUSTOM_VALIDATION_EXCEPTION,
                "Phone is required",
            )],
            field_errors: BTreeMap::new(),
        };
        assert_eq!(
            reduce_errors(&[ServiceError::Record(output)]),
            vec!["Phone is required"]
        );
    }

    #[test]
    fn test_record_error_unknown_code_is_dropped() {
        let output = RecordErrorOutput {
            errors: vec![RecordError::new("SOMETHING_ELSE", "ignored")],
            field_errors: BTreeMap::new(),
        };
        assert!(reduce_errors(&[ServiceError::Record(output)]).is_empty());
    }

    #[test]
    fn test_record_error_falls_back_to_field_errors() {
        let mut field_errors = BTreeMap::new();
        field_errors.insert(
            "Email".to_string(),
            vec![RecordError::new("INVALID_EMAIL", "Bad email")],
        );
        let output = RecordErrorOutput {
            errors: Vec::new(),
            field_errors,
        };
        assert_eq!(
            reduce_errors(&[ServiceError::Record(output)]),
            vec!["Bad email"]
        );
    }

    #[test]
    fn test_page_and_http_errors() {
        let errors = vec![
            ServiceError::PageErrors(vec![
                RecordError::new("", "first page error"),
                RecordError::new("", "second page error"),
            ]),
            ServiceError::http(503, "Service Unavailable"),
        ];
        assert_eq!(
            reduce_errors(&errors),
            vec!["first page error", "Service Unavailable"]
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(ServiceError::http(500, "Boom").to_string(), "HTTP 500: Boom");
        assert_eq!(ServiceError::message("plain").to_string(), "plain");
    }
}
