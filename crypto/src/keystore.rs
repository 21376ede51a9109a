//! Argon2id + AES-256-GCM keystore encryption for secp256k1 secret keys.
//!
//! Encrypts a 32-byte secret key under a user-chosen passphrase:
//! 1. Argon2id derives a 32-byte encryption key from the passphrase + random salt
//! 2. AES-256-GCM encrypts the secret key with a random nonce
//! 3. The result is a versioned blob carrying all parameters for decryption

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use eots_types::{EotsError, SecretKey};

/// Argon2id parameters: 64 MB memory, 3 iterations, 1 lane of parallelism.
const ARGON2_MEMORY_KIB: u32 = 65536;
const ARGON2_ITERATIONS: u32 = 3;
const ARGON2_PARALLELISM: u32 = 1;
const ARGON2_OUTPUT_LEN: usize = 32;

const SALT_LEN: usize = 32;
/// AES-GCM nonce length in bytes (96 bits).
const NONCE_LEN: usize = 12;

const KEYSTORE_VERSION: u32 = 1;

/// An encrypted secret key with all parameters needed for decryption.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KeystoreBlob {
    pub version: u32,
    pub kdf_params: KdfParams,
    pub salt: Vec<u8>,
    pub nonce: Vec<u8>,
    pub ciphertext: Vec<u8>,
}

/// KDF parameters for Argon2id.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KdfParams {
    pub memory: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

/// Encrypt a secret key under a passphrase.
pub fn encrypt_secret(secret: &SecretKey, passphrase: &str) -> Result<KeystoreBlob, EotsError> {
    let mut rng = rand::rngs::OsRng;

    let mut salt = [0u8; SALT_LEN];
    rng.fill_bytes(&mut salt);
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rng.fill_bytes(&mut nonce_bytes);

    let mut derived_key = derive_key(passphrase, &salt)?;

    let cipher = Aes256Gcm::new_from_slice(&derived_key)
        .map_err(|e| EotsError::InvalidArgument(format!("AES key init failed: {e}")))?;
    derived_key.zeroize();

    let nonce = Nonce::from_slice(&nonce_bytes);
    let ciphertext = cipher
        .encrypt(nonce, secret.as_bytes().as_slice())
        .map_err(|e| EotsError::InvalidArgument(format!("encryption failed: {e}")))?;

    Ok(KeystoreBlob {
        version: KEYSTORE_VERSION,
        kdf_params: KdfParams {
            memory: ARGON2_MEMORY_KIB,
            iterations: ARGON2_ITERATIONS,
            parallelism: ARGON2_PARALLELISM,
        },
        salt: salt.to_vec(),
        nonce: nonce_bytes.to_vec(),
        ciphertext,
    })
}

/// Decrypt a keystore blob with the given passphrase.
///
/// An AEAD authentication failure is reported as [`EotsError::WrongPassphrase`],
/// distinct from the `NotFound` a missing key produces.
pub fn decrypt_secret(blob: &KeystoreBlob, passphrase: &str) -> Result<SecretKey, EotsError> {
    if blob.version != KEYSTORE_VERSION {
        return Err(EotsError::InvalidArgument(format!(
            "unsupported keystore version: {}",
            blob.version
        )));
    }
    if blob.nonce.len() != NONCE_LEN {
        return Err(EotsError::InvalidArgument(format!(
            "invalid nonce length: expected {}, got {}",
            NONCE_LEN,
            blob.nonce.len()
        )));
    }

    let mut derived_key = derive_key_with(
        passphrase,
        &blob.salt,
        blob.kdf_params.memory,
        blob.kdf_params.iterations,
        blob.kdf_params.parallelism,
    )?;

    let cipher = Aes256Gcm::new_from_slice(&derived_key)
        .map_err(|e| EotsError::InvalidArgument(format!("AES key init failed: {e}")))?;
    derived_key.zeroize();

    let nonce = Nonce::from_slice(&blob.nonce);
    let mut plaintext = cipher
        .decrypt(nonce, blob.ciphertext.as_slice())
        .map_err(|_| EotsError::WrongPassphrase)?;

    if plaintext.len() != 32 {
        plaintext.zeroize();
        return Err(EotsError::InvalidArgument(format!(
            "decrypted key has wrong length: expected 32, got {}",
            plaintext.len()
        )));
    }

    let mut key = [0u8; 32];
    key.copy_from_slice(&plaintext);
    plaintext.zeroize();
    Ok(SecretKey(key))
}

/// Derive a 32-byte key with the default Argon2id parameters.
fn derive_key(passphrase: &str, salt: &[u8]) -> Result<[u8; 32], EotsError> {
    derive_key_with(
        passphrase,
        salt,
        ARGON2_MEMORY_KIB,
        ARGON2_ITERATIONS,
        ARGON2_PARALLELISM,
    )
}

fn derive_key_with(
    passphrase: &str,
    salt: &[u8],
    memory: u32,
    iterations: u32,
    parallelism: u32,
) -> Result<[u8; 32], EotsError> {
    let params = Params::new(memory, iterations, parallelism, Some(ARGON2_OUTPUT_LEN))
        .map_err(|e| EotsError::InvalidArgument(format!("Argon2 params error: {e}")))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut output = [0u8; 32];
    argon2
        .hash_password_into(passphrase.as_bytes(), salt, &mut output)
        .map_err(|e| EotsError::InvalidArgument(format!("Argon2 hashing failed: {e}")))?;
    Ok(output)
}
