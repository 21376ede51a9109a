//! Committed-randomness storage trait.

use eots_types::{Bip340PublicKey, RandomnessPair};

use crate::StoreError;

/// Durable map from `(validator_pk, chain_id, height)` fingerprints to
/// randomness pairs.
///
/// A committed pair is immutable: `put_batch` refuses to touch any
/// fingerprint that already exists, and there is no delete. Signing reads
/// the same pair forever; that determinism is what makes nonce reuse
/// observable and the key extractable.
pub trait RandomnessStore {
    /// Whether a pair is committed for the fingerprint.
    fn exists(
        &self,
        pk: &Bip340PublicKey,
        chain_id: &[u8],
        height: u64,
    ) -> Result<bool, StoreError>;

    /// Atomically commit `pairs[i]` at `start_height + i` for every `i`.
    ///
    /// If any fingerprint in the range is already committed, fails with
    /// `AlreadyCommitted` and writes nothing. Readers never observe a
    /// partial batch.
    fn put_batch(
        &self,
        pk: &Bip340PublicKey,
        chain_id: &[u8],
        start_height: u64,
        pairs: &[RandomnessPair],
    ) -> Result<(), StoreError>;

    /// The committed pair for a fingerprint, or `NotFound`.
    fn get(
        &self,
        pk: &Bip340PublicKey,
        chain_id: &[u8],
        height: u64,
    ) -> Result<RandomnessPair, StoreError>;
}
