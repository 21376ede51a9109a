//! Error taxonomy shared across the manager, stores, and RPC surface.

use thiserror::Error;

/// The caller-facing error kinds of the EOTS manager.
///
/// Two of these are load-bearing for security and must never be papered
/// over with a fallback: a committed nonce is never regenerated
/// (`AlreadyCommitted`), and signing never proceeds without a committed
/// nonce (`MissingRandomness`).
#[derive(Debug, Error)]
pub enum EotsError {
    #[error("key name already in use: {0}")]
    AlreadyExists(String),

    #[error("randomness already committed at height {height}")]
    AlreadyCommitted { height: u64 },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("no committed randomness at height {height}")]
    MissingRandomness { height: u64 },

    #[error("wrong passphrase")]
    WrongPassphrase,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("storage fault: {0}")]
    Storage(String),

    #[error("transport error: {0}")]
    Transient(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrong_passphrase_distinct_from_not_found() {
        let wp = EotsError::WrongPassphrase;
        let nf = EotsError::NotFound("key 'alice'".into());
        assert!(matches!(wp, EotsError::WrongPassphrase));
        assert!(matches!(nf, EotsError::NotFound(_)));
    }

    #[test]
    fn messages_name_the_height() {
        let e = EotsError::MissingRandomness { height: 99 };
        assert!(e.to_string().contains("99"));
        let e = EotsError::AlreadyCommitted { height: 102 };
        assert!(e.to_string().contains("102"));
    }
}
