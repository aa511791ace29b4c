//! Catalog fetch errors.

/// Error type for catalog fetch operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP error: {status}")]
    Http { status: u16 },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Query error: {}", .0.join("; "))]
    Query(Vec<String>),

    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::Deserialization(e.to_string())
    }
}
