//! In-memory store backend used by the test suite so worker logic runs
//! without touching a filesystem.

use super::{BlacklistProvider, CheckpointProvider, MaintenanceProvider, P2shMapProvider, RegistryProvider};
use super::{SwapProvider, SwapResultProvider};
use crate::error::StoreError;
use crate::model::{ScanCheckpoint, SwapKey, SwapRegistration, SwapResult};
use crate::status::{SwapDirection, SwapStatus};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

#[derive(Default)]
struct Inner {
    swaps: HashMap<SwapKey, SwapRegistration>,
    results: HashMap<SwapKey, SwapResult>,
    checkpoints: HashMap<String, ScanCheckpoint>,
    blacklist: HashSet<String>,
    registry: HashSet<String>,
    p2sh_map: HashMap<String, String>,
    closed_directions: HashSet<SwapDirection>,
}

/// Thread-safe, single-process store. No persistence across restarts —
/// tests and local development only.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SwapProvider for MemoryStore {
    async fn insert_swap(&self, reg: SwapRegistration) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let key = reg.key();
        if inner.swaps.contains_key(&key) {
            return Err(StoreError::Duplicate);
        }
        inner.swaps.insert(key, reg);
        Ok(())
    }

    async fn get_swap(&self, key: &SwapKey) -> Result<Option<SwapRegistration>, StoreError> {
        Ok(self.inner.lock().unwrap().swaps.get(key).cloned())
    }

    async fn update_swap_status(
        &self,
        key: &SwapKey,
        status: SwapStatus,
        timestamp: i64,
        status_msg: &str,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let reg = inner.swaps.get_mut(key).ok_or(StoreError::NotFound)?;
        reg.status = status;
        reg.timestamp = timestamp;
        reg.status_msg = status_msg.to_owned();
        Ok(())
    }

    async fn find_swaps_by_status(
        &self,
        direction: SwapDirection,
        status: SwapStatus,
        since_ts: i64,
        limit: usize,
    ) -> Result<Vec<SwapRegistration>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut out: Vec<_> = inner
            .swaps
            .values()
            .filter(|r| r.direction == direction && r.status == status && r.timestamp >= since_ts)
            .cloned()
            .collect();
        out.sort_by_key(|r| r.timestamp);
        out.truncate(limit);
        Ok(out)
    }
}

#[async_trait]
impl SwapResultProvider for MemoryStore {
    async fn insert_result(&self, result: SwapResult) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let key = result.key();
        if inner.results.contains_key(&key) {
            return Err(StoreError::Duplicate);
        }
        inner.results.insert(key, result);
        Ok(())
    }

    async fn get_result(&self, key: &SwapKey) -> Result<Option<SwapResult>, StoreError> {
        Ok(self.inner.lock().unwrap().results.get(key).cloned())
    }

    async fn update_result_status(
        &self,
        key: &SwapKey,
        status: SwapStatus,
        status_msg: &str,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let r = inner.results.get_mut(key).ok_or(StoreError::NotFound)?;
        r.status = status;
        r.status_msg = status_msg.to_owned();
        Ok(())
    }

    async fn update_result_broadcast(
        &self,
        key: &SwapKey,
        swap_tx: &str,
        dest_value: u128,
        status: SwapStatus,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let r = inner.results.get_mut(key).ok_or(StoreError::NotFound)?;
        r.swap_tx = swap_tx.to_owned();
        r.dest_value = dest_value;
        r.status = status;
        Ok(())
    }

    async fn update_result_mined(
        &self,
        key: &SwapKey,
        swap_height: u64,
        swap_time: i64,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let r = inner.results.get_mut(key).ok_or(StoreError::NotFound)?;
        r.swap_height = swap_height;
        r.swap_time = swap_time;
        Ok(())
    }

    async fn increment_retry_count(&self, key: &SwapKey) -> Result<u32, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let r = inner.results.get_mut(key).ok_or(StoreError::NotFound)?;
        r.retry_count += 1;
        Ok(r.retry_count)
    }

    async fn find_results_by_status(
        &self,
        direction: SwapDirection,
        status: SwapStatus,
        since_ts: i64,
        limit: usize,
    ) -> Result<Vec<SwapResult>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut out: Vec<_> = inner
            .results
            .values()
            .filter(|r| {
                r.direction == direction && r.status == status && r.swap_time >= since_ts
                    || (r.swap_time == 0 && since_ts <= 0)
            })
            .cloned()
            .collect();
        out.truncate(limit);
        Ok(out)
    }
}

#[async_trait]
impl CheckpointProvider for MemoryStore {
    async fn get_checkpoint(&self, chain: &str) -> Result<ScanCheckpoint, StoreError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .checkpoints
            .get(chain)
            .copied()
            .unwrap_or_default())
    }

    async fn set_checkpoint(&self, chain: &str, height: u64) -> Result<(), StoreError> {
        self.inner
            .lock()
            .unwrap()
            .checkpoints
            .insert(chain.to_owned(), ScanCheckpoint { latest_scanned_block: height });
        Ok(())
    }
}

#[async_trait]
impl BlacklistProvider for MemoryStore {
    async fn is_blacklisted(&self, addr: &str) -> Result<bool, StoreError> {
        Ok(self.inner.lock().unwrap().blacklist.contains(addr))
    }

    async fn add_to_blacklist(&self, addr: &str) -> Result<(), StoreError> {
        self.inner.lock().unwrap().blacklist.insert(addr.to_owned());
        Ok(())
    }

    async fn remove_from_blacklist(&self, addr: &str) -> Result<(), StoreError> {
        self.inner.lock().unwrap().blacklist.remove(addr);
        Ok(())
    }
}

#[async_trait]
impl RegistryProvider for MemoryStore {
    async fn is_registered(&self, addr: &str) -> Result<bool, StoreError> {
        Ok(self.inner.lock().unwrap().registry.contains(addr))
    }

    async fn register(&self, addr: &str) -> Result<(), StoreError> {
        self.inner.lock().unwrap().registry.insert(addr.to_owned());
        Ok(())
    }

    async fn unregister(&self, addr: &str) -> Result<(), StoreError> {
        self.inner.lock().unwrap().registry.remove(addr);
        Ok(())
    }
}

#[async_trait]
impl P2shMapProvider for MemoryStore {
    async fn bind_addr_for_p2sh(&self, p2sh_addr: &str) -> Result<Option<String>, StoreError> {
        Ok(self.inner.lock().unwrap().p2sh_map.get(p2sh_addr).cloned())
    }

    async fn set_p2sh_bind(&self, p2sh_addr: &str, bind_addr: &str) -> Result<(), StoreError> {
        self.inner
            .lock()
            .unwrap()
            .p2sh_map
            .insert(p2sh_addr.to_owned(), bind_addr.to_owned());
        Ok(())
    }
}

#[async_trait]
impl MaintenanceProvider for MemoryStore {
    async fn is_direction_open(&self, direction: SwapDirection) -> Result<bool, StoreError> {
        Ok(!self.inner.lock().unwrap().closed_directions.contains(&direction))
    }

    async fn set_direction_open(&self, direction: SwapDirection, open: bool) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if open {
            inner.closed_directions.remove(&direction);
        } else {
            inner.closed_directions.insert(direction);
        }
        Ok(())
    }
}
