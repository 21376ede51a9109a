//! Passphrase-gated key storage trait.

use eots_types::{Bip340PublicKey, KeyRecord};

use crate::StoreError;

/// Durable, passphrase-protected storage of named secp256k1 signing keys.
///
/// Both `name → pk` and `pk → name` are injective within one store: a
/// creation that would break either mapping fails with `AlreadyExists`.
/// Loads distinguish a missing key (`NotFound`) from a bad passphrase
/// (`WrongPassphrase`).
pub trait KeyStore {
    /// Generate and persist a new key under `name`, encrypted with
    /// `passphrase`. An empty `hd_path` keys straight off the seed.
    /// Returns the 33-byte compressed public key.
    fn create(&self, name: &str, passphrase: &str, hd_path: &str)
        -> Result<[u8; 33], StoreError>;

    /// Decrypt and return the key record for a public key.
    fn load_by_pk(
        &self,
        pk: &Bip340PublicKey,
        passphrase: &str,
    ) -> Result<KeyRecord, StoreError>;

    /// Decrypt and return the key record for a name.
    fn load_by_name(&self, name: &str, passphrase: &str) -> Result<KeyRecord, StoreError>;

    /// Reverse lookup: the name a public key was created under.
    fn name_for(&self, pk: &Bip340PublicKey) -> Result<String, StoreError>;
}
