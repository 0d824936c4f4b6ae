//! Persistent record shapes (spec.md §3).

use crate::status::{SwapDirection, SwapStatus, SwapTxType};
use serde::{Deserialize, Serialize};

/// One row per observed candidate deposit transaction.
///
/// Key is `tx_id` (plus `bind_addr` for the P2SH swapin variant, where
/// the same underlying script hash can receive more than one deposit).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapRegistration {
    pub tx_id: String,
    pub direction: SwapDirection,
    pub tx_type: SwapTxType,
    /// Destination-chain recipient, as encoded in the source tx's memo.
    pub bind_addr: String,
    pub value: u128,
    pub memo: String,
    /// Unix seconds of first observation.
    pub timestamp: i64,
    pub status: SwapStatus,
    pub status_msg: String,
}

impl SwapRegistration {
    pub fn key(&self) -> SwapKey {
        SwapKey {
            tx_id: self.tx_id.clone(),
            bind_addr: self.bind_addr.clone(),
        }
    }
}

/// Natural key for a registration/result pair. Most chains only ever
/// populate `tx_id`; `bind_addr` disambiguates the P2SH deposit variant
/// where several bind addresses can share one script-hash deposit tx.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SwapKey {
    pub tx_id: String,
    pub bind_addr: String,
}

/// One row per attempt to produce and broadcast the counter-transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapResult {
    pub tx_id: String,
    pub bind_addr: String,
    pub direction: SwapDirection,
    pub source_value: u128,
    /// Value credited on the destination chain. Currently a straight
    /// passthrough of `source_value`: the original's fee formula
    /// (`tokens.CalcSwappedValue`, called from
    /// `original_source/tokens/eth/buildtx.go` but defined outside the
    /// files this crate was distilled from) isn't available to port, so
    /// no fee is deducted here. A real fee schedule plugs in at
    /// `doswap.rs::process_one`, where this field is populated.
    pub dest_value: u128,
    /// Destination-chain transaction hash, once broadcast.
    pub swap_tx: String,
    pub swap_height: u64,
    pub swap_time: i64,
    pub status: SwapStatus,
    pub status_msg: String,
    pub retry_count: u32,
}

impl SwapResult {
    pub fn key(&self) -> SwapKey {
        SwapKey {
            tx_id: self.tx_id.clone(),
            bind_addr: self.bind_addr.clone(),
        }
    }

    pub fn new_empty(
        tx_id: impl Into<String>,
        bind_addr: impl Into<String>,
        direction: SwapDirection,
        source_value: u128,
        status: SwapStatus,
    ) -> Self {
        SwapResult {
            tx_id: tx_id.into(),
            bind_addr: bind_addr.into(),
            direction,
            source_value,
            dest_value: 0,
            swap_tx: String::new(),
            swap_height: 0,
            swap_time: 0,
            status,
            status_msg: String::new(),
            retry_count: 0,
        }
    }
}

/// Per-chain latest-scanned-block checkpoint, persisted so scans resume
/// after restart (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ScanCheckpoint {
    pub latest_scanned_block: u64,
}

/// Inputs used to build the destination-chain counter-transaction
/// (spec.md §4.5/§4.7). Also the value serialized into a signing
/// request's `msgContext`, so accept-sign can rebuild it independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildTxArgs {
    pub swap_id: String,
    pub bind_addr: String,
    pub direction: SwapDirection,
    pub tx_type: SwapTxType,
    pub value: u128,
    /// Bridge-wide identifier the signing service's `msgContext` is
    /// checked against (spec.md §4.7 step 3).
    pub identifier: String,
    pub from: String,
    pub to: String,
    pub gas_price: Option<u128>,
    pub nonce: Option<u64>,
    pub gas: Option<u64>,
    pub extra: Option<String>,
}
