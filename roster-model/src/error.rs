use thiserror::Error;

/// Errors produced when parsing model values from user-supplied text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("invalid user status '{0}' (expected active or inactive)")]
    InvalidStatus(String),
    #[error("invalid permission '{0}' (expected read, write or delete)")]
    InvalidPermission(String),
    #[error("invalid sort key '{0}'")]
    InvalidSortKey(String),
    #[error("invalid date range '{0}' (expected all or recent)")]
    InvalidDateRange(String),
    #[error("invalid timestamp '{0}'")]
    InvalidTimestamp(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
