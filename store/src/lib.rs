//! Abstract storage traits for the EOTS manager.
//!
//! Every storage backend (LMDB today, an in-memory store for testing
//! tomorrow) implements these traits. The manager depends only on the
//! traits.

pub mod error;
pub mod keys;
pub mod randomness;

pub use error::StoreError;
pub use keys::KeyStore;
pub use randomness::RandomnessStore;
