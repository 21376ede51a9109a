//! The in-process EOTS manager backed by LMDB stores.

use std::collections::HashMap;
use std::sync::RwLock;

use rand::rngs::OsRng;

use eots_crypto::{eots_sign, rand_gen, schnorr_sign};
use eots_store::{KeyStore, RandomnessStore, StoreError};
use eots_store_lmdb::{EotsEnvironment, LmdbKeyStore, LmdbRandomnessStore};
use eots_types::{
    Bip340PublicKey, EotsError, EotsSignature, KeyRecord, PublicRandomness, SchnorrSignature,
    SecretKey,
};

use crate::{EotsManager, EotsManagerConfig};

/// Run a storage operation, retrying once on a transient backend fault.
/// Definitive answers (`NotFound`, `AlreadyCommitted`, ...) pass through.
fn with_retry<T>(op: impl Fn() -> Result<T, StoreError>) -> Result<T, StoreError> {
    match op() {
        Err(e) if e.is_retryable() => {
            tracing::warn!(error = %e, "storage fault, retrying once");
            op()
        }
        other => other,
    }
}

/// The local EOTS manager: owns the LMDB environment, both stores, and a
/// cache of decrypted signing keys for the hot path.
///
/// The passphrase itself is only ever held for the duration of the call
/// that received it; the decrypted key is cached per public key after the
/// first successful load and wiped (zeroized) on [`EotsManager::close`].
pub struct LocalEotsManager {
    env: EotsEnvironment,
    key_store: LmdbKeyStore,
    rand_store: LmdbRandomnessStore,
    key_cache: RwLock<HashMap<[u8; 32], SecretKey>>,
}

impl LocalEotsManager {
    /// Open (or create) the manager's stores under the configured
    /// directory.
    pub fn open(config: &EotsManagerConfig) -> Result<Self, EotsError> {
        let env = EotsEnvironment::open(&config.db_path, config.db_map_size)
            .map_err(StoreError::from)?;
        let key_store = env.key_store();
        let rand_store = env.randomness_store();
        tracing::info!(path = %config.db_path.display(), "opened EOTS manager stores");
        Ok(Self {
            env,
            key_store,
            rand_store,
            key_cache: RwLock::new(HashMap::new()),
        })
    }

    /// Run `f` against the decrypted secret for `pk`, consulting the cache
    /// first and populating it after a successful load.
    fn with_secret<T>(
        &self,
        pk: &Bip340PublicKey,
        passphrase: &str,
        f: impl FnOnce(&SecretKey) -> Result<T, EotsError>,
    ) -> Result<T, EotsError> {
        {
            let cache = self
                .key_cache
                .read()
                .map_err(|_| EotsError::Storage("key cache lock poisoned".into()))?;
            if let Some(secret) = cache.get(pk.as_bytes()) {
                return f(secret);
            }
        }

        let record = with_retry(|| self.key_store.load_by_pk(pk, passphrase))?;
        let result = f(&record.secret);
        if result.is_ok() {
            let mut cache = self
                .key_cache
                .write()
                .map_err(|_| EotsError::Storage("key cache lock poisoned".into()))?;
            cache.insert(*pk.as_bytes(), record.secret);
        }
        result
    }
}

impl EotsManager for LocalEotsManager {
    fn create_key(
        &self,
        name: &str,
        passphrase: &str,
        hd_path: &str,
    ) -> Result<[u8; 33], EotsError> {
        if name.is_empty() {
            return Err(EotsError::InvalidArgument("key name is empty".into()));
        }
        let pk = with_retry(|| self.key_store.create(name, passphrase, hd_path))?;
        Ok(pk)
    }

    fn create_randomness_batch(
        &self,
        pk: &Bip340PublicKey,
        chain_id: &[u8],
        start_height: u64,
        num: u32,
    ) -> Result<Vec<PublicRandomness>, EotsError> {
        if num > 0 && start_height.checked_add(num as u64 - 1).is_none() {
            return Err(EotsError::InvalidArgument(
                "height range overflows u64".into(),
            ));
        }

        let mut rng = OsRng;
        let pairs: Vec<_> = (0..num).map(|_| rand_gen(&mut rng)).collect();
        let public_nonces: Vec<PublicRandomness> =
            pairs.iter().map(|p| p.public.clone()).collect();

        // put_batch is atomic, so a retried attempt after a backend fault
        // either finds its own first attempt committed (AlreadyCommitted)
        // or starts from a clean slate.
        with_retry(|| self.rand_store.put_batch(pk, chain_id, start_height, &pairs))?;

        tracing::info!(
            pk = %pk,
            start_height,
            num,
            "pre-committed randomness batch"
        );
        Ok(public_nonces)
    }

    fn key_record(
        &self,
        pk: &Bip340PublicKey,
        passphrase: &str,
    ) -> Result<KeyRecord, EotsError> {
        let record = with_retry(|| self.key_store.load_by_pk(pk, passphrase))?;
        Ok(record)
    }

    fn sign_eots(
        &self,
        pk: &Bip340PublicKey,
        chain_id: &[u8],
        msg: &[u8],
        height: u64,
        passphrase: &str,
    ) -> Result<EotsSignature, EotsError> {
        let pair = match with_retry(|| self.rand_store.get(pk, chain_id, height)) {
            Err(StoreError::NotFound(_)) => {
                return Err(EotsError::MissingRandomness { height })
            }
            other => other?,
        };

        let sig = self.with_secret(pk, passphrase, |secret| {
            eots_sign(secret, &pair.secret, msg)
        })?;
        tracing::debug!(pk = %pk, height, "served EOTS signature");
        Ok(sig)
    }

    fn sign_schnorr(
        &self,
        pk: &Bip340PublicKey,
        msg: &[u8],
        passphrase: &str,
    ) -> Result<SchnorrSignature, EotsError> {
        self.with_secret(pk, passphrase, |secret| {
            schnorr_sign(secret, msg, &mut OsRng)
        })
    }

    fn close(&self) -> Result<(), EotsError> {
        let mut cache = self
            .key_cache
            .write()
            .map_err(|_| EotsError::Storage("key cache lock poisoned".into()))?;
        // SecretKey zeroizes on drop.
        cache.clear();
        drop(cache);

        self.env.force_sync().map_err(StoreError::from)?;
        tracing::info!("EOTS manager closed");
        Ok(())
    }
}
