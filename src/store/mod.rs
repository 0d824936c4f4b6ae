//! Persistent store layer (spec.md §4.1), expressed as the teacher's
//! `*Provider` trait-per-entity idiom (see
//! `daemon/src/core/storage/providers/escrow.rs`) composed into one
//! `SwapStore` supertrait. Two backends are provided: [`memory`] for
//! tests, [`sled_store`] for production.

mod memory;
mod sled_store;

pub use memory::MemoryStore;
pub use sled_store::SledStore;

use crate::error::StoreError;
use crate::model::{ScanCheckpoint, SwapKey, SwapRegistration, SwapResult};
use crate::status::{SwapDirection, SwapStatus};
use async_trait::async_trait;

/// CRUD + status-scan operations over `SwapRegistration` rows
/// (spec.md's `Swapins`/`Swapouts` collections).
#[async_trait]
pub trait SwapProvider: Send + Sync {
    /// Idempotent append; a duplicate `tx_id`(+`bind_addr`) is reported
    /// as [`StoreError::Duplicate`] so the caller can swallow it
    /// (spec.md §4.3's at-least-once scan contract).
    async fn insert_swap(&self, reg: SwapRegistration) -> Result<(), StoreError>;

    async fn get_swap(&self, key: &SwapKey) -> Result<Option<SwapRegistration>, StoreError>;

    /// Unconditional overwrite — the state machine is enforced above
    /// this layer (spec.md §4.2).
    async fn update_swap_status(
        &self,
        key: &SwapKey,
        status: SwapStatus,
        timestamp: i64,
        status_msg: &str,
    ) -> Result<(), StoreError>;

    async fn find_swaps_by_status(
        &self,
        direction: SwapDirection,
        status: SwapStatus,
        since_ts: i64,
        limit: usize,
    ) -> Result<Vec<SwapRegistration>, StoreError>;
}

/// CRUD + status-scan operations over `SwapResult` rows (spec.md's
/// `SwapinResults`/`SwapoutResults` collections).
#[async_trait]
pub trait SwapResultProvider: Send + Sync {
    /// Created only from Verify's success branch (spec.md §4.4).
    async fn insert_result(&self, result: SwapResult) -> Result<(), StoreError>;

    async fn get_result(&self, key: &SwapKey) -> Result<Option<SwapResult>, StoreError>;

    async fn update_result_status(
        &self,
        key: &SwapKey,
        status: SwapStatus,
        status_msg: &str,
    ) -> Result<(), StoreError>;

    /// Populate `swap_tx`/destination value after Do-swap broadcasts
    /// (spec.md §4.5): `swap_height`/`swap_time` stay zero until Stable
    /// observes the first mined block (spec.md §4.6).
    async fn update_result_broadcast(
        &self,
        key: &SwapKey,
        swap_tx: &str,
        dest_value: u128,
        status: SwapStatus,
    ) -> Result<(), StoreError>;

    async fn update_result_mined(
        &self,
        key: &SwapKey,
        swap_height: u64,
        swap_time: i64,
    ) -> Result<(), StoreError>;

    async fn increment_retry_count(&self, key: &SwapKey) -> Result<u32, StoreError>;

    async fn find_results_by_status(
        &self,
        direction: SwapDirection,
        status: SwapStatus,
        since_ts: i64,
        limit: usize,
    ) -> Result<Vec<SwapResult>, StoreError>;
}

/// Per-chain scan checkpoint (spec.md §4.3).
#[async_trait]
pub trait CheckpointProvider: Send + Sync {
    async fn get_checkpoint(&self, chain: &str) -> Result<ScanCheckpoint, StoreError>;
    async fn set_checkpoint(&self, chain: &str, height: u64) -> Result<(), StoreError>;
}

/// Blacklist consulted by Verify (spec.md §4.4: both `from` and `bind`).
#[async_trait]
pub trait BlacklistProvider: Send + Sync {
    async fn is_blacklisted(&self, addr: &str) -> Result<bool, StoreError>;
    async fn add_to_blacklist(&self, addr: &str) -> Result<(), StoreError>;
    async fn remove_from_blacklist(&self, addr: &str) -> Result<(), StoreError>;
}

/// Registered-sender allowlist (spec.md §3's `Registry`), maintained by
/// admin operators and consulted by chain adapters that require it.
#[async_trait]
pub trait RegistryProvider: Send + Sync {
    async fn is_registered(&self, addr: &str) -> Result<bool, StoreError>;
    async fn register(&self, addr: &str) -> Result<(), StoreError>;
    async fn unregister(&self, addr: &str) -> Result<(), StoreError>;
}

/// P2SH script-hash → bind-address associations (spec.md §3's
/// `P2shMap`), populated when a P2SH deposit address is provisioned for
/// a user and consulted by Scan/Verify for the P2SH swapin variant.
#[async_trait]
pub trait P2shMapProvider: Send + Sync {
    async fn bind_addr_for_p2sh(&self, p2sh_addr: &str) -> Result<Option<String>, StoreError>;
    async fn set_p2sh_bind(&self, p2sh_addr: &str, bind_addr: &str) -> Result<(), StoreError>;
}

/// Open/closed switch per direction for the admin `maintain` command
/// (spec.md §6's `maintain <open|close> <deposit|withdraw|both>`).
/// Persisted so a daemon restart doesn't silently reopen a direction an
/// operator closed. Absent entries default to open.
#[async_trait]
pub trait MaintenanceProvider: Send + Sync {
    async fn is_direction_open(&self, direction: SwapDirection) -> Result<bool, StoreError>;
    async fn set_direction_open(&self, direction: SwapDirection, open: bool) -> Result<(), StoreError>;
}

/// Composite store handle every worker is constructed with.
pub trait SwapStore:
    SwapProvider
    + SwapResultProvider
    + CheckpointProvider
    + BlacklistProvider
    + RegistryProvider
    + P2shMapProvider
    + MaintenanceProvider
    + Send
    + Sync
    + 'static
{
}

impl<T> SwapStore for T where
    T: SwapProvider
        + SwapResultProvider
        + CheckpointProvider
        + BlacklistProvider
        + RegistryProvider
        + P2shMapProvider
        + MaintenanceProvider
        + Send
        + Sync
        + 'static
{
}
