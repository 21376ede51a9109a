//! LMDB implementation of the key store.
//!
//! Two databases: `keys` maps the human name to a serialized record
//! (compressed public key + encrypted keystore blob), `key_index` maps the
//! 32-byte x-only public key back to the name. Both entries for one key are
//! written in a single transaction so the bijection cannot be half-updated.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};
use serde::{Deserialize, Serialize};

use eots_crypto::keystore::KeystoreBlob;
use eots_crypto::{decrypt_secret, encrypt_secret, generate_mnemonic, secret_from_mnemonic};
use eots_store::{KeyStore, StoreError};
use eots_types::{Bip340PublicKey, EotsError, KeyRecord};

use crate::LmdbError;

/// The persisted form of one key: its public half in compressed SEC1 form
/// plus the passphrase-encrypted secret.
#[derive(Serialize, Deserialize)]
struct StoredKey {
    pk: Vec<u8>,
    keystore: KeystoreBlob,
}

pub struct LmdbKeyStore {
    pub(crate) env: Arc<Env>,
    pub(crate) keys_db: Database<Bytes, Bytes>,
    pub(crate) key_index_db: Database<Bytes, Bytes>,
}

/// Map a crypto-layer error into store vocabulary. A failed AEAD
/// authentication stays `WrongPassphrase`; malformed stored material is
/// corruption, not a caller mistake.
fn crypto_err(e: EotsError) -> StoreError {
    match e {
        EotsError::WrongPassphrase => StoreError::WrongPassphrase,
        EotsError::InvalidArgument(msg) => StoreError::Corruption(msg),
        other => StoreError::Backend(other.to_string()),
    }
}

impl LmdbKeyStore {
    fn load_stored(
        &self,
        rtxn: &heed::RoTxn,
        name: &str,
    ) -> Result<Option<StoredKey>, StoreError> {
        let Some(bytes) = self
            .keys_db
            .get(rtxn, name.as_bytes())
            .map_err(LmdbError::from)?
        else {
            return Ok(None);
        };
        let stored: StoredKey = bincode::deserialize(bytes).map_err(LmdbError::from)?;
        Ok(Some(stored))
    }
}

impl KeyStore for LmdbKeyStore {
    fn create(
        &self,
        name: &str,
        passphrase: &str,
        hd_path: &str,
    ) -> Result<[u8; 33], StoreError> {
        // Cheap pre-check before the deliberately slow KDF. The write
        // transaction below re-checks, so a racing create still loses.
        {
            let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
            if self
                .keys_db
                .get(&rtxn, name.as_bytes())
                .map_err(LmdbError::from)?
                .is_some()
            {
                return Err(StoreError::AlreadyExists(name.to_string()));
            }
        }

        let mnemonic = generate_mnemonic().map_err(crypto_err)?;
        let secret = secret_from_mnemonic(&mnemonic, hd_path).map_err(crypto_err)?;
        let compressed = eots_crypto::compressed_public_key(secret.as_bytes())
            .map_err(crypto_err)?;
        let xonly = eots_crypto::xonly_public_key(secret.as_bytes()).map_err(crypto_err)?;
        let blob = encrypt_secret(&secret, passphrase).map_err(crypto_err)?;

        let stored = StoredKey {
            pk: compressed.to_vec(),
            keystore: blob,
        };
        let bytes = bincode::serialize(&stored).map_err(LmdbError::from)?;

        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        if self
            .keys_db
            .get(&wtxn, name.as_bytes())
            .map_err(LmdbError::from)?
            .is_some()
        {
            return Err(StoreError::AlreadyExists(name.to_string()));
        }
        // A fresh key colliding on pk bytes would mean a broken RNG; refuse
        // to clobber the index either way.
        if self
            .key_index_db
            .get(&wtxn, xonly.as_bytes())
            .map_err(LmdbError::from)?
            .is_some()
        {
            return Err(StoreError::AlreadyExists(format!("public key {xonly}")));
        }
        self.keys_db
            .put(&mut wtxn, name.as_bytes(), &bytes)
            .map_err(LmdbError::from)?;
        self.key_index_db
            .put(&mut wtxn, xonly.as_bytes(), name.as_bytes())
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;

        tracing::info!(name, pk = %xonly, "created new signing key");
        Ok(compressed)
    }

    fn load_by_pk(
        &self,
        pk: &Bip340PublicKey,
        passphrase: &str,
    ) -> Result<KeyRecord, StoreError> {
        let name = self.name_for(pk)?;
        self.load_by_name(&name, passphrase)
    }

    fn load_by_name(&self, name: &str, passphrase: &str) -> Result<KeyRecord, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let stored = self
            .load_stored(&rtxn, name)?
            .ok_or_else(|| StoreError::NotFound(format!("key '{name}'")))?;
        drop(rtxn);

        let secret = decrypt_secret(&stored.keystore, passphrase).map_err(crypto_err)?;
        Ok(KeyRecord {
            name: name.to_string(),
            secret,
        })
    }

    fn name_for(&self, pk: &Bip340PublicKey) -> Result<String, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let bytes = self
            .key_index_db
            .get(&rtxn, pk.as_bytes())
            .map_err(LmdbError::from)?
            .ok_or_else(|| StoreError::NotFound(format!("key for public key {pk}")))?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| StoreError::Corruption("key name is not valid UTF-8".into()))
    }
}
