//! The composite key indexing committed randomness.

use crate::Bip340PublicKey;

/// Identifies one committed randomness pair: a validator key, an opaque
/// chain identifier, and a block height.
///
/// The canonical byte form is `pk(32) ‖ chain_id ‖ be64(height)`. With the
/// key fixed at 32 bytes and the height fixed at 8, a variable-length chain
/// id in the middle cannot collide across distinct fingerprints, and the
/// big-endian height makes consecutive heights adjacent under an ordered
/// storage engine.
pub struct Fingerprint<'a> {
    pub pk: &'a Bip340PublicKey,
    pub chain_id: &'a [u8],
    pub height: u64,
}

impl<'a> Fingerprint<'a> {
    pub fn new(pk: &'a Bip340PublicKey, chain_id: &'a [u8], height: u64) -> Self {
        Self {
            pk,
            chain_id,
            height,
        }
    }

    /// The canonical byte concatenation used as the storage key.
    pub fn key_bytes(&self) -> Vec<u8> {
        let mut key = Vec::with_capacity(32 + self.chain_id.len() + 8);
        key.extend_from_slice(self.pk.as_bytes());
        key.extend_from_slice(self.chain_id);
        key.extend_from_slice(&self.height.to_be_bytes());
        key
    }
}
