//! LMDB implementation of the randomness store.
//!
//! Key format: `pk_x(32) ‖ chain_id ‖ be64(height)` (see
//! [`eots_types::Fingerprint`]); value: `secret(32) ‖ public(32)`. The
//! big-endian height keeps one validator/chain's heights adjacent, so a
//! batch insert walks the tree in order.
//!
//! `put_batch` performs the whole existence check and every insert inside a
//! single LMDB write transaction. LMDB has exactly one writer at a time, so
//! the check-then-write cannot interleave with another batch, and a failed
//! batch aborts the transaction with nothing visible.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use eots_store::{RandomnessStore, StoreError};
use eots_types::{Bip340PublicKey, Fingerprint, RandomnessPair};

use crate::LmdbError;

pub struct LmdbRandomnessStore {
    pub(crate) env: Arc<Env>,
    pub(crate) randomness_db: Database<Bytes, Bytes>,
}

impl RandomnessStore for LmdbRandomnessStore {
    fn exists(
        &self,
        pk: &Bip340PublicKey,
        chain_id: &[u8],
        height: u64,
    ) -> Result<bool, StoreError> {
        let key = Fingerprint::new(pk, chain_id, height).key_bytes();
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let found = self
            .randomness_db
            .get(&rtxn, &key)
            .map_err(LmdbError::from)?
            .is_some();
        Ok(found)
    }

    fn put_batch(
        &self,
        pk: &Bip340PublicKey,
        chain_id: &[u8],
        start_height: u64,
        pairs: &[RandomnessPair],
    ) -> Result<(), StoreError> {
        if pairs.is_empty() {
            return Ok(());
        }
        let last_height = start_height
            .checked_add(pairs.len() as u64 - 1)
            .ok_or_else(|| StoreError::Backend("height range overflows u64".into()))?;

        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;

        for height in start_height..=last_height {
            let key = Fingerprint::new(pk, chain_id, height).key_bytes();
            if self
                .randomness_db
                .get(&wtxn, &key)
                .map_err(LmdbError::from)?
                .is_some()
            {
                // Dropping the transaction aborts it; nothing is written.
                return Err(StoreError::AlreadyCommitted { height });
            }
        }

        for (i, pair) in pairs.iter().enumerate() {
            let height = start_height + i as u64;
            let key = Fingerprint::new(pk, chain_id, height).key_bytes();
            self.randomness_db
                .put(&mut wtxn, &key, &pair.to_bytes())
                .map_err(LmdbError::from)?;
        }

        wtxn.commit().map_err(LmdbError::from)?;
        tracing::debug!(
            pk = %pk,
            heights = pairs.len(),
            start_height,
            "committed randomness batch"
        );
        Ok(())
    }

    fn get(
        &self,
        pk: &Bip340PublicKey,
        chain_id: &[u8],
        height: u64,
    ) -> Result<RandomnessPair, StoreError> {
        let key = Fingerprint::new(pk, chain_id, height).key_bytes();
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let bytes = self
            .randomness_db
            .get(&rtxn, &key)
            .map_err(LmdbError::from)?
            .ok_or_else(|| {
                StoreError::NotFound(format!("randomness for {pk} at height {height}"))
            })?;
        RandomnessPair::from_bytes(bytes)
            .map_err(|e| StoreError::Corruption(format!("stored randomness pair: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EotsEnvironment;

    fn temp_store() -> (tempfile::TempDir, LmdbRandomnessStore) {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let env = EotsEnvironment::open(dir.path(), 10 * 1024 * 1024).expect("open env");
        let store = env.randomness_store();
        (dir, store)
    }

    fn pair(tag: u8) -> RandomnessPair {
        RandomnessPair::new([tag; 32], [tag.wrapping_add(1); 32])
    }

    #[test]
    fn put_get_exists() {
        let (_dir, store) = temp_store();
        let pk = Bip340PublicKey::new([0xAA; 32]);

        assert!(!store.exists(&pk, b"BTC", 100).unwrap());
        store
            .put_batch(&pk, b"BTC", 100, &[pair(1), pair(2), pair(3)])
            .expect("put_batch");

        for h in 100..103 {
            assert!(store.exists(&pk, b"BTC", h).unwrap());
        }
        assert!(!store.exists(&pk, b"BTC", 103).unwrap());

        let loaded = store.get(&pk, b"BTC", 101).expect("get");
        assert_eq!(loaded.secret.as_bytes(), &[2u8; 32]);
        assert_eq!(loaded.public.as_bytes(), &[3u8; 32]);
    }

    #[test]
    fn overlapping_batch_fails_and_writes_nothing() {
        let (_dir, store) = temp_store();
        let pk = Bip340PublicKey::new([0xAA; 32]);

        store
            .put_batch(&pk, b"BTC", 100, &[pair(1), pair(2), pair(3), pair(4), pair(5)])
            .expect("first batch");

        // Overlaps committed height 102; heights 98, 99 must not appear.
        let result = store.put_batch(
            &pk,
            b"BTC",
            98,
            &[pair(10), pair(11), pair(12), pair(13), pair(14)],
        );
        assert!(matches!(
            result,
            Err(StoreError::AlreadyCommitted { height: 100 })
        ));
        assert!(!store.exists(&pk, b"BTC", 98).unwrap());
        assert!(!store.exists(&pk, b"BTC", 99).unwrap());

        // The committed pair at 102 is unchanged.
        let original = store.get(&pk, b"BTC", 102).unwrap();
        assert_eq!(original.secret.as_bytes(), &[3u8; 32]);
    }

    #[test]
    fn committed_pair_is_never_overwritten() {
        let (_dir, store) = temp_store();
        let pk = Bip340PublicKey::new([0xBB; 32]);

        store.put_batch(&pk, b"BTC", 50, &[pair(7)]).unwrap();
        let result = store.put_batch(&pk, b"BTC", 50, &[pair(9)]);
        assert!(matches!(
            result,
            Err(StoreError::AlreadyCommitted { height: 50 })
        ));

        let stored = store.get(&pk, b"BTC", 50).unwrap();
        assert_eq!(stored.secret.as_bytes(), &[7u8; 32]);
    }

    #[test]
    fn distinct_validators_and_chains_are_independent() {
        let (_dir, store) = temp_store();
        let pk1 = Bip340PublicKey::new([0x01; 32]);
        let pk2 = Bip340PublicKey::new([0x02; 32]);

        store.put_batch(&pk1, b"BTC", 100, &[pair(1)]).unwrap();
        store.put_batch(&pk2, b"BTC", 100, &[pair(2)]).unwrap();
        store.put_batch(&pk1, b"testnet", 100, &[pair(3)]).unwrap();

        assert_eq!(store.get(&pk1, b"BTC", 100).unwrap().secret.as_bytes(), &[1u8; 32]);
        assert_eq!(store.get(&pk2, b"BTC", 100).unwrap().secret.as_bytes(), &[2u8; 32]);
        assert_eq!(
            store.get(&pk1, b"testnet", 100).unwrap().secret.as_bytes(),
            &[3u8; 32]
        );
    }

    #[test]
    fn get_missing_is_not_found() {
        let (_dir, store) = temp_store();
        let pk = Bip340PublicKey::new([0xCC; 32]);
        let result = store.get(&pk, b"BTC", 999);
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[test]
    fn empty_batch_is_a_noop() {
        let (_dir, store) = temp_store();
        let pk = Bip340PublicKey::new([0xDD; 32]);
        store.put_batch(&pk, b"BTC", 1, &[]).unwrap();
        assert!(!store.exists(&pk, b"BTC", 1).unwrap());
    }

    #[test]
    fn pairs_survive_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let pk = Bip340PublicKey::new([0xEE; 32]);
        {
            let env = EotsEnvironment::open(dir.path(), 10 * 1024 * 1024).expect("open");
            env.randomness_store()
                .put_batch(&pk, b"BTC", 100, &[pair(42)])
                .expect("put");
            env.force_sync().expect("sync");
        }

        let env = EotsEnvironment::open(dir.path(), 10 * 1024 * 1024).expect("reopen");
        let loaded = env
            .randomness_store()
            .get(&pk, b"BTC", 100)
            .expect("get after reopen");
        assert_eq!(loaded.secret.as_bytes(), &[42u8; 32]);
    }

    #[test]
    fn max_height_batch_rejected_on_overflow() {
        let (_dir, store) = temp_store();
        let pk = Bip340PublicKey::new([0xFF; 32]);
        let result = store.put_batch(&pk, b"BTC", u64::MAX, &[pair(1), pair(2)]);
        assert!(matches!(result, Err(StoreError::Backend(_))));
    }
}
