//! Fundamental types for the EOTS manager.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: public-key and signature encodings, randomness pairs, the
//! fingerprint key that indexes committed randomness, and the error taxonomy.

pub mod error;
pub mod fingerprint;
pub mod keys;
pub mod randomness;

pub use error::EotsError;
pub use fingerprint::Fingerprint;
pub use keys::{Bip340PublicKey, EotsSignature, KeyRecord, SchnorrSignature, SecretKey};
pub use randomness::{PublicRandomness, RandomnessPair, SecretRandomness};
