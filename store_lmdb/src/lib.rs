//! LMDB storage backend for the EOTS manager.
//!
//! Implements the `eots-store` traits using the `heed` LMDB bindings. Both
//! logical stores share a single environment; every write commits (and
//! fsyncs) before the caller observes success.

pub mod environment;
pub mod error;
pub mod keys;
pub mod randomness;

pub use environment::EotsEnvironment;
pub use error::LmdbError;
pub use keys::LmdbKeyStore;
pub use randomness::LmdbRandomnessStore;
