use thiserror::Error;

/// Error taxonomy for store operations. The `Display` text of the first
/// three variants is the user-facing message returned in `{"error": ...}`
/// bodies, so it must stay byte-identical to the strings the UI matches on.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Duplicate(String),
    #[error("{0}")]
    NotFound(String),
    #[error("storage error: {0}")]
    Io(String),
}

impl ServiceError {
    /// Index out of bounds of the current read.
    pub fn invalid_index() -> Self {
        Self::NotFound("无效的索引".into())
    }
}

impl From<std::io::Error> for ServiceError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<csv::Error> for ServiceError {
    fn from(e: csv::Error) -> Self {
        Self::Io(e.to_string())
    }
}
