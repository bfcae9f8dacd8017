use thiserror::Error;

/// Coarse classification of a [`NexusError`], used by callers that only care
/// about which family of failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Cycle,
    Internal,
}

#[derive(Debug, Error)]
pub enum NexusError {
    #[error("{field} cannot be blank")]
    BlankField { field: String },

    #[error("{field} allows at most {max} entries")]
    TooMany { field: String, max: usize },

    #[error("{field} is not valid: {value}")]
    InvalidFormat { field: String, value: String },

    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Moving group {group_id} under {parent_id} would create a cycle")]
    Cycle { group_id: String, parent_id: String },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl NexusError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            NexusError::BlankField { .. }
            | NexusError::TooMany { .. }
            | NexusError::InvalidFormat { .. } => ErrorKind::Validation,
            NexusError::NotFound { .. } => ErrorKind::NotFound,
            NexusError::Cycle { .. } => ErrorKind::Cycle,
            _ => ErrorKind::Internal,
        }
    }

    pub(crate) fn group_not_found(id: impl ToString) -> Self {
        NexusError::NotFound {
            entity_type: "Group".into(),
            id: id.to_string(),
        }
    }

    pub(crate) fn contact_not_found(id: impl ToString) -> Self {
        NexusError::NotFound {
            entity_type: "Contact".into(),
            id: id.to_string(),
        }
    }
}

pub type NexusResult<T> = Result<T, NexusError>;
