//! LMDB environment setup.

use std::path::Path;
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};

use crate::keys::LmdbKeyStore;
use crate::randomness::LmdbRandomnessStore;
use crate::LmdbError;

/// Named databases inside the environment.
const KEYS_DB: &str = "keys";
const KEY_INDEX_DB: &str = "key_index";
const RANDOMNESS_DB: &str = "randomness";

/// Default map size: 1 GiB, plenty for keys plus years of nonce batches.
pub const DEFAULT_MAP_SIZE: usize = 1024 * 1024 * 1024;

/// Wraps the LMDB environment and the database handles for both stores.
pub struct EotsEnvironment {
    env: Arc<Env>,

    /// `name` → bincode(stored key record).
    pub(crate) keys_db: Database<Bytes, Bytes>,
    /// `pk_x(32)` → `name` (reverse index).
    pub(crate) key_index_db: Database<Bytes, Bytes>,
    /// `pk_x(32) ‖ chain_id ‖ be64(height)` → `secret(32) ‖ public(32)`.
    pub(crate) randomness_db: Database<Bytes, Bytes>,
}

impl EotsEnvironment {
    /// Open or create an LMDB environment at the given path.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)
            .map_err(|e| LmdbError::Heed(format!("failed to create directory: {e}")))?;

        let env = unsafe {
            EnvOpenOptions::new()
                .max_dbs(3)
                .map_size(map_size)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let keys_db = env.create_database(&mut wtxn, Some(KEYS_DB))?;
        let key_index_db = env.create_database(&mut wtxn, Some(KEY_INDEX_DB))?;
        let randomness_db = env.create_database(&mut wtxn, Some(RANDOMNESS_DB))?;
        wtxn.commit()?;

        Ok(Self {
            env: Arc::new(env),
            keys_db,
            key_index_db,
            randomness_db,
        })
    }

    /// Get a shared reference to the underlying heed environment.
    pub fn env(&self) -> &Arc<Env> {
        &self.env
    }

    /// Create a key store backed by this environment.
    pub fn key_store(&self) -> LmdbKeyStore {
        LmdbKeyStore {
            env: Arc::clone(&self.env),
            keys_db: self.keys_db,
            key_index_db: self.key_index_db,
        }
    }

    /// Create a randomness store backed by this environment.
    pub fn randomness_store(&self) -> LmdbRandomnessStore {
        LmdbRandomnessStore {
            env: Arc::clone(&self.env),
            randomness_db: self.randomness_db,
        }
    }

    /// Force an `fsync` of the LMDB memory-mapped file to disk.
    ///
    /// LMDB ensures durability on every write-transaction commit; this is
    /// an extra safety measure for graceful shutdown.
    pub fn force_sync(&self) -> Result<(), LmdbError> {
        let wtxn = self.env.write_txn()?;
        wtxn.commit()?;
        Ok(())
    }
}
