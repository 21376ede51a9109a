//! BIP-39 mnemonic generation and secp256k1 secret-key derivation.
//!
//! Key creation reads 256 bits of OS entropy, converts it to a 24-word
//! mnemonic, and derives the signing key from the BIP-39 seed. When an HD
//! path is given, the path string keys an HMAC-SHA512 over the seed;
//! otherwise the head of the raw seed is used directly. Either way the
//! candidate bytes are re-derived with a counter byte until they form a
//! canonical nonzero scalar, so derivation is total and deterministic.

use bip39::Mnemonic;
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha512;

use eots_types::{EotsError, SecretKey};

use crate::bip340::nonzero_scalar;

type HmacSha512 = Hmac<Sha512>;

/// Entropy for a 24-word mnemonic.
const MNEMONIC_ENTROPY_BYTES: usize = 32;

/// Generate a new 24-word BIP-39 mnemonic from OS entropy.
pub fn generate_mnemonic() -> Result<String, EotsError> {
    let mut entropy = [0u8; MNEMONIC_ENTROPY_BYTES];
    rand::rngs::OsRng.fill_bytes(&mut entropy);
    let mnemonic = Mnemonic::from_entropy(&entropy)
        .map_err(|e| EotsError::InvalidArgument(format!("mnemonic generation failed: {e}")))?;
    Ok(mnemonic.to_string())
}

/// Derive a secp256k1 secret key from a mnemonic phrase.
///
/// An empty `hd_path` uses the raw BIP-39 seed; a non-empty path keys an
/// HMAC-SHA512 derivation over the seed.
pub fn secret_from_mnemonic(mnemonic: &str, hd_path: &str) -> Result<SecretKey, EotsError> {
    let mnemonic = Mnemonic::parse_normalized(mnemonic)
        .map_err(|e| EotsError::InvalidArgument(format!("invalid mnemonic: {e}")))?;

    // BIP-39 seed derivation (PBKDF2-HMAC-SHA512, empty passphrase).
    let seed = mnemonic.to_seed_normalized("");

    for counter in 0u8..=255 {
        let candidate: [u8; 32] = if hd_path.is_empty() && counter == 0 {
            seed[..32].try_into().expect("seed is 64 bytes")
        } else {
            let mut mac = HmacSha512::new_from_slice(hd_path.as_bytes())
                .map_err(|e| EotsError::InvalidArgument(format!("hd path rejected: {e}")))?;
            mac.update(&seed);
            if counter > 0 {
                mac.update(&[counter]);
            }
            let digest = mac.finalize().into_bytes();
            digest[..32].try_into().expect("HMAC-SHA512 output is 64 bytes")
        };

        if nonzero_scalar(&candidate, "derived key").is_ok() {
            return Ok(SecretKey(candidate));
        }
    }

    // 256 consecutive out-of-range candidates is not reachable in practice.
    Err(EotsError::InvalidArgument(
        "mnemonic does not derive a valid scalar".into(),
    ))
}

/// Validate that a phrase is a well-formed BIP-39 mnemonic.
pub fn validate_mnemonic(mnemonic: &str) -> bool {
    Mnemonic::parse_normalized(mnemonic).is_ok()
}
