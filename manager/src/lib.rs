//! The EOTS manager: key custody, nonce custody, and signing.
//!
//! [`EotsManager`] is the capability set every variant satisfies: the
//! in-process [`LocalEotsManager`] here and the RPC client in `eots-rpc`.
//! Callers hold a manager handle and stay agnostic of which one they got.

pub mod config;
pub mod local;

pub use config::EotsManagerConfig;
pub use local::LocalEotsManager;

use eots_types::{
    Bip340PublicKey, EotsError, EotsSignature, KeyRecord, PublicRandomness, SchnorrSignature,
};

/// The validator-facing contract of the EOTS manager.
pub trait EotsManager: Send + Sync {
    /// Generate a new passphrase-protected key under `name`. Returns the
    /// 33-byte compressed public key. Fails `AlreadyExists` when the name
    /// is taken.
    fn create_key(
        &self,
        name: &str,
        passphrase: &str,
        hd_path: &str,
    ) -> Result<[u8; 33], EotsError>;

    /// Pre-commit `num` fresh randomness pairs for heights
    /// `[start_height, start_height + num)` and return the public nonces in
    /// height order. Fails `AlreadyCommitted` (writing nothing) if any
    /// height in the range is already committed.
    fn create_randomness_batch(
        &self,
        pk: &Bip340PublicKey,
        chain_id: &[u8],
        start_height: u64,
        num: u32,
    ) -> Result<Vec<PublicRandomness>, EotsError>;

    /// Decrypt and return the key record for `pk`.
    fn key_record(&self, pk: &Bip340PublicKey, passphrase: &str)
        -> Result<KeyRecord, EotsError>;

    /// Sign `msg` with the nonce committed at `(pk, chain_id, height)`.
    /// Fails `MissingRandomness` when no nonce is committed there; never
    /// substitutes a fresh one.
    fn sign_eots(
        &self,
        pk: &Bip340PublicKey,
        chain_id: &[u8],
        msg: &[u8],
        height: u64,
        passphrase: &str,
    ) -> Result<EotsSignature, EotsError>;

    /// Produce a standard BIP-340 Schnorr signature over `msg`.
    fn sign_schnorr(
        &self,
        pk: &Bip340PublicKey,
        msg: &[u8],
        passphrase: &str,
    ) -> Result<SchnorrSignature, EotsError>;

    /// Flush storage and wipe cached key material.
    fn close(&self) -> Result<(), EotsError>;
}
