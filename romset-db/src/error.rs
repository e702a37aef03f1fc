use thiserror::Error;

/// Errors surfaced by the store layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store file absent, or a lookup resolved to no row.
    #[error("not found: {0}")]
    NotFound(String),

    /// Open failed or the connection is unusable.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Statement prepare/bind/step failed.
    #[error("SQLite error: {0}")]
    Query(#[from] rusqlite::Error),
}

impl StoreError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}
