use thiserror::Error;

use eots_types::EotsError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("key name already in use: {0}")]
    AlreadyExists(String),

    #[error("randomness already committed at height {height}")]
    AlreadyCommitted { height: u64 },

    #[error("wrong passphrase")]
    WrongPassphrase,

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("database is corrupted: {0}")]
    Corruption(String),
}

impl From<StoreError> for EotsError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(what) => EotsError::NotFound(what),
            StoreError::AlreadyExists(name) => EotsError::AlreadyExists(name),
            StoreError::AlreadyCommitted { height } => EotsError::AlreadyCommitted { height },
            StoreError::WrongPassphrase => EotsError::WrongPassphrase,
            StoreError::Backend(msg) | StoreError::Serialization(msg) => EotsError::Storage(msg),
            StoreError::Corruption(msg) => EotsError::Storage(format!("corruption: {msg}")),
        }
    }
}

impl StoreError {
    /// Whether the fault is worth one internal retry (transient backend
    /// I/O, as opposed to a definitive answer like `NotFound`).
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Backend(_))
    }
}
