//! Typed row access errors

/// Returned by the typed getters on [`Row`](crate::model::Row).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    /// The row has no such field.
    #[error("row has no '{0}' field")]
    Absent(String),

    /// The field holds a value of another kind.
    #[error("field '{field}' holds {found}, not {wanted}")]
    WrongKind {
        field: String,
        wanted: &'static str,
        found: &'static str,
    },
}

impl FieldError {
    pub fn absent(field: impl Into<String>) -> Self {
        Self::Absent(field.into())
    }

    pub fn wrong_kind(field: impl Into<String>, wanted: &'static str, found: &'static str) -> Self {
        Self::WrongKind {
            field: field.into(),
            wanted,
            found,
        }
    }

    /// Name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            Self::Absent(field) | Self::WrongKind { field, .. } => field,
        }
    }
}
