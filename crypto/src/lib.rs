//! Cryptographic primitives for the EOTS manager.
//!
//! - **secp256k1** scalar and point arithmetic via `k256`
//! - **BIP-340 Schnorr** signing and verification
//! - **EOTS** signing: a Schnorr-like construction over a pre-committed
//!   nonce, where nonce reuse across two messages reveals the secret key
//! - **BIP-39** mnemonic generation and secret-key derivation
//! - Passphrase keystore encryption (Argon2id + AES-256-GCM)

pub mod bip340;
pub mod eots;
pub mod keystore;
pub mod mnemonic;
pub mod schnorr;

pub use bip340::{compressed_public_key, tagged_hash, xonly_public_key};
pub use eots::{eots_sign, eots_verify, extract_secret_key, rand_gen};
pub use keystore::{decrypt_secret, encrypt_secret, KeystoreBlob};
pub use mnemonic::{generate_mnemonic, secret_from_mnemonic, validate_mnemonic};
pub use schnorr::{schnorr_sign, schnorr_verify};
