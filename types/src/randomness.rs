//! Per-height Schnorr randomness pairs.
//!
//! A pair is `(k, R_x)` where `k` is the secret nonce scalar and `R_x` the
//! x-only coordinate of `R = k·G`, both 32-byte big-endian per BIP-340.
//! Pairs are committed per `(validator, chain, height)` fingerprint and
//! deliberately never regenerated: reusing `k` across two messages is the
//! slashing mechanism that makes the key extractable.

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::EotsError;

/// Stored length of a serialized pair: `secret(32) ‖ public(32)`.
pub const RANDOMNESS_PAIR_LEN: usize = 64;

/// The secret half of a randomness pair. Zeroized on drop; no `Clone`,
/// `Debug`, or `Serialize`.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SecretRandomness(pub [u8; 32]);

/// The public half: the x-only commitment `R_x` published ahead of signing.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicRandomness(pub [u8; 32]);

/// A committed `(secret, public)` randomness pair.
pub struct RandomnessPair {
    pub secret: SecretRandomness,
    pub public: PublicRandomness,
}

impl SecretRandomness {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl PublicRandomness {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, EotsError> {
        let arr: [u8; 32] = bytes.try_into().map_err(|_| {
            EotsError::InvalidArgument(format!(
                "public randomness must be 32 bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(arr))
    }
}

impl std::fmt::Display for PublicRandomness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl RandomnessPair {
    pub fn new(secret: [u8; 32], public: [u8; 32]) -> Self {
        Self {
            secret: SecretRandomness(secret),
            public: PublicRandomness(public),
        }
    }

    /// Canonical stored encoding: `secret ‖ public`.
    pub fn to_bytes(&self) -> [u8; RANDOMNESS_PAIR_LEN] {
        let mut out = [0u8; RANDOMNESS_PAIR_LEN];
        out[..32].copy_from_slice(&self.secret.0);
        out[32..].copy_from_slice(&self.public.0);
        out
    }

    /// Parse the canonical stored encoding.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EotsError> {
        if bytes.len() != RANDOMNESS_PAIR_LEN {
            return Err(EotsError::InvalidArgument(format!(
                "randomness pair must be {} bytes, got {}",
                RANDOMNESS_PAIR_LEN,
                bytes.len()
            )));
        }
        let mut secret = [0u8; 32];
        let mut public = [0u8; 32];
        secret.copy_from_slice(&bytes[..32]);
        public.copy_from_slice(&bytes[32..]);
        Ok(Self::new(secret, public))
    }
}
