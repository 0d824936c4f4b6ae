//! Embedded, persistent store backend. One `sled` tree per collection,
//! values `bincode`-encoded, following the teacher's disk-store idiom
//! (`daemon/src/core/storage/rocksdb/providers/referral.rs`'s
//! load/insert-by-key pattern) adapted from RocksDB column families to
//! sled's native named trees.

use super::{BlacklistProvider, CheckpointProvider, MaintenanceProvider, P2shMapProvider, RegistryProvider};
use super::{SwapProvider, SwapResultProvider};
use crate::error::StoreError;
use crate::model::{ScanCheckpoint, SwapKey, SwapRegistration, SwapResult};
use crate::status::{SwapDirection, SwapStatus};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

const TREE_SWAPS: &str = "swaps";
const TREE_RESULTS: &str = "results";
const TREE_CHECKPOINTS: &str = "checkpoints";
const TREE_BLACKLIST: &str = "blacklist";
const TREE_REGISTRY: &str = "registry";
const TREE_P2SH_MAP: &str = "p2sh_map";
const TREE_MAINTENANCE: &str = "maintenance";

/// `sled`-backed store, the production counterpart to [`super::MemoryStore`].
pub struct SledStore {
    db: sled::Db,
}

impl SledStore {
    pub fn open(path: &str) -> Result<Self, StoreError> {
        let db = sled::open(path).map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(SledStore { db })
    }

    fn tree(&self, name: &str) -> Result<sled::Tree, StoreError> {
        self.db
            .open_tree(name)
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    fn load<T: DeserializeOwned>(tree: &sled::Tree, key: &[u8]) -> Result<Option<T>, StoreError> {
        match tree.get(key).map_err(|e| StoreError::Backend(e.to_string()))? {
            Some(bytes) => {
                let value = bincode::deserialize(&bytes)
                    .map_err(|e| StoreError::Backend(e.to_string()))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn store<T: Serialize>(tree: &sled::Tree, key: &[u8], value: &T) -> Result<(), StoreError> {
        let bytes = bincode::serialize(value).map_err(|e| StoreError::Backend(e.to_string()))?;
        tree.insert(key, bytes)
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(())
    }

    fn swap_key_bytes(key: &SwapKey) -> Vec<u8> {
        format!("{}|{}", key.tx_id, key.bind_addr).into_bytes()
    }
}

#[async_trait]
impl SwapProvider for SledStore {
    async fn insert_swap(&self, reg: SwapRegistration) -> Result<(), StoreError> {
        let tree = self.tree(TREE_SWAPS)?;
        let key = Self::swap_key_bytes(&reg.key());
        if tree.contains_key(&key).map_err(|e| StoreError::Backend(e.to_string()))? {
            return Err(StoreError::Duplicate);
        }
        Self::store(&tree, &key, &reg)
    }

    async fn get_swap(&self, key: &SwapKey) -> Result<Option<SwapRegistration>, StoreError> {
        let tree = self.tree(TREE_SWAPS)?;
        Self::load(&tree, &Self::swap_key_bytes(key))
    }

    async fn update_swap_status(
        &self,
        key: &SwapKey,
        status: SwapStatus,
        timestamp: i64,
        status_msg: &str,
    ) -> Result<(), StoreError> {
        let tree = self.tree(TREE_SWAPS)?;
        let bytes = Self::swap_key_bytes(key);
        let mut reg: SwapRegistration =
            Self::load(&tree, &bytes)?.ok_or(StoreError::NotFound)?;
        reg.status = status;
        reg.timestamp = timestamp;
        reg.status_msg = status_msg.to_owned();
        Self::store(&tree, &bytes, &reg)
    }

    async fn find_swaps_by_status(
        &self,
        direction: SwapDirection,
        status: SwapStatus,
        since_ts: i64,
        limit: usize,
    ) -> Result<Vec<SwapRegistration>, StoreError> {
        let tree = self.tree(TREE_SWAPS)?;
        let mut out = Vec::new();
        for item in tree.iter() {
            let (_, bytes) = item.map_err(|e| StoreError::Backend(e.to_string()))?;
            let reg: SwapRegistration =
                bincode::deserialize(&bytes).map_err(|e| StoreError::Backend(e.to_string()))?;
            if reg.direction == direction && reg.status == status && reg.timestamp >= since_ts {
                out.push(reg);
            }
        }
        out.sort_by_key(|r| r.timestamp);
        out.truncate(limit);
        Ok(out)
    }
}

#[async_trait]
impl SwapResultProvider for SledStore {
    async fn insert_result(&self, result: SwapResult) -> Result<(), StoreError> {
        let tree = self.tree(TREE_RESULTS)?;
        let key = Self::swap_key_bytes(&result.key());
        if tree.contains_key(&key).map_err(|e| StoreError::Backend(e.to_string()))? {
            return Err(StoreError::Duplicate);
        }
        Self::store(&tree, &key, &result)
    }

    async fn get_result(&self, key: &SwapKey) -> Result<Option<SwapResult>, StoreError> {
        let tree = self.tree(TREE_RESULTS)?;
        Self::load(&tree, &Self::swap_key_bytes(key))
    }

    async fn update_result_status(
        &self,
        key: &SwapKey,
        status: SwapStatus,
        status_msg: &str,
    ) -> Result<(), StoreError> {
        let tree = self.tree(TREE_RESULTS)?;
        let bytes = Self::swap_key_bytes(key);
        let mut r: SwapResult = Self::load(&tree, &bytes)?.ok_or(StoreError::NotFound)?;
        r.status = status;
        r.status_msg = status_msg.to_owned();
        Self::store(&tree, &bytes, &r)
    }

    async fn update_result_broadcast(
        &self,
        key: &SwapKey,
        swap_tx: &str,
        dest_value: u128,
        status: SwapStatus,
    ) -> Result<(), StoreError> {
        let tree = self.tree(TREE_RESULTS)?;
        let bytes = Self::swap_key_bytes(key);
        let mut r: SwapResult = Self::load(&tree, &bytes)?.ok_or(StoreError::NotFound)?;
        r.swap_tx = swap_tx.to_owned();
        r.dest_value = dest_value;
        r.status = status;
        Self::store(&tree, &bytes, &r)
    }

    async fn update_result_mined(
        &self,
        key: &SwapKey,
        swap_height: u64,
        swap_time: i64,
    ) -> Result<(), StoreError> {
        let tree = self.tree(TREE_RESULTS)?;
        let bytes = Self::swap_key_bytes(key);
        let mut r: SwapResult = Self::load(&tree, &bytes)?.ok_or(StoreError::NotFound)?;
        r.swap_height = swap_height;
        r.swap_time = swap_time;
        Self::store(&tree, &bytes, &r)
    }

    async fn increment_retry_count(&self, key: &SwapKey) -> Result<u32, StoreError> {
        let tree = self.tree(TREE_RESULTS)?;
        let bytes = Self::swap_key_bytes(key);
        let mut r: SwapResult = Self::load(&tree, &bytes)?.ok_or(StoreError::NotFound)?;
        r.retry_count += 1;
        let count = r.retry_count;
        Self::store(&tree, &bytes, &r)?;
        Ok(count)
    }

    async fn find_results_by_status(
        &self,
        direction: SwapDirection,
        status: SwapStatus,
        since_ts: i64,
        limit: usize,
    ) -> Result<Vec<SwapResult>, StoreError> {
        let tree = self.tree(TREE_RESULTS)?;
        let mut out = Vec::new();
        for item in tree.iter() {
            let (_, bytes) = item.map_err(|e| StoreError::Backend(e.to_string()))?;
            let r: SwapResult =
                bincode::deserialize(&bytes).map_err(|e| StoreError::Backend(e.to_string()))?;
            let in_window = r.swap_time >= since_ts || (r.swap_time == 0 && since_ts <= 0);
            if r.direction == direction && r.status == status && in_window {
                out.push(r);
            }
        }
        out.truncate(limit);
        Ok(out)
    }
}

#[async_trait]
impl CheckpointProvider for SledStore {
    async fn get_checkpoint(&self, chain: &str) -> Result<ScanCheckpoint, StoreError> {
        let tree = self.tree(TREE_CHECKPOINTS)?;
        Ok(Self::load(&tree, chain.as_bytes())?.unwrap_or_default())
    }

    async fn set_checkpoint(&self, chain: &str, height: u64) -> Result<(), StoreError> {
        let tree = self.tree(TREE_CHECKPOINTS)?;
        Self::store(&tree, chain.as_bytes(), &ScanCheckpoint { latest_scanned_block: height })
    }
}

#[async_trait]
impl BlacklistProvider for SledStore {
    async fn is_blacklisted(&self, addr: &str) -> Result<bool, StoreError> {
        let tree = self.tree(TREE_BLACKLIST)?;
        Ok(tree
            .contains_key(addr.as_bytes())
            .map_err(|e| StoreError::Backend(e.to_string()))?)
    }

    async fn add_to_blacklist(&self, addr: &str) -> Result<(), StoreError> {
        let tree = self.tree(TREE_BLACKLIST)?;
        tree.insert(addr.as_bytes(), &[])
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(())
    }

    async fn remove_from_blacklist(&self, addr: &str) -> Result<(), StoreError> {
        let tree = self.tree(TREE_BLACKLIST)?;
        tree.remove(addr.as_bytes())
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl RegistryProvider for SledStore {
    async fn is_registered(&self, addr: &str) -> Result<bool, StoreError> {
        let tree = self.tree(TREE_REGISTRY)?;
        Ok(tree
            .contains_key(addr.as_bytes())
            .map_err(|e| StoreError::Backend(e.to_string()))?)
    }

    async fn register(&self, addr: &str) -> Result<(), StoreError> {
        let tree = self.tree(TREE_REGISTRY)?;
        tree.insert(addr.as_bytes(), &[])
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(())
    }

    async fn unregister(&self, addr: &str) -> Result<(), StoreError> {
        let tree = self.tree(TREE_REGISTRY)?;
        tree.remove(addr.as_bytes())
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl P2shMapProvider for SledStore {
    async fn bind_addr_for_p2sh(&self, p2sh_addr: &str) -> Result<Option<String>, StoreError> {
        let tree = self.tree(TREE_P2SH_MAP)?;
        match tree
            .get(p2sh_addr.as_bytes())
            .map_err(|e| StoreError::Backend(e.to_string()))?
        {
            Some(bytes) => Ok(Some(
                String::from_utf8(bytes.to_vec()).map_err(|e| StoreError::Backend(e.to_string()))?,
            )),
            None => Ok(None),
        }
    }

    async fn set_p2sh_bind(&self, p2sh_addr: &str, bind_addr: &str) -> Result<(), StoreError> {
        let tree = self.tree(TREE_P2SH_MAP)?;
        tree.insert(p2sh_addr.as_bytes(), bind_addr.as_bytes())
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl MaintenanceProvider for SledStore {
    async fn is_direction_open(&self, direction: SwapDirection) -> Result<bool, StoreError> {
        let tree = self.tree(TREE_MAINTENANCE)?;
        let key = format!("{direction:?}");
        match tree.get(key.as_bytes()).map_err(|e| StoreError::Backend(e.to_string()))? {
            Some(bytes) => Ok(bytes.as_ref() != [0u8]),
            None => Ok(true),
        }
    }

    async fn set_direction_open(&self, direction: SwapDirection, open: bool) -> Result<(), StoreError> {
        let tree = self.tree(TREE_MAINTENANCE)?;
        let key = format!("{direction:?}");
        tree.insert(key.as_bytes(), &[if open { 1u8 } else { 0u8 }])
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::SwapTxType;

    #[tokio::test]
    async fn insert_then_duplicate_is_rejected() {
        let dir = tempdir::TempDir::new("swap-bridge-sled-test").unwrap();
        let store = SledStore::open(dir.path().to_str().unwrap()).unwrap();
        let reg = SwapRegistration {
            tx_id: "tx1".into(),
            direction: SwapDirection::In,
            tx_type: SwapTxType::Normal,
            bind_addr: "0xabc".into(),
            value: 100,
            memo: "m".into(),
            timestamp: 1,
            status: SwapStatus::TxNotStable,
            status_msg: String::new(),
        };
        store.insert_swap(reg.clone()).await.unwrap();
        assert_eq!(store.insert_swap(reg).await, Err(StoreError::Duplicate));
    }
}
