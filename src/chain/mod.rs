//! The narrow capability set every chain adapter must implement
//! (spec.md §6), expressed as an `async_trait` following the teacher's
//! provider-trait idiom (`daemon/src/core/storage/providers/escrow.rs`).
//!
//! This crate ships no real RPC client — only the trait and a
//! deterministic [`fake::FakeChainAdapter`] used by tests, matching
//! spec.md's OUT OF SCOPE list ("concrete chain-specific RPC clients").

pub mod fake;

pub use fake::FakeChainAdapter;

use crate::error::AdapterError;
use crate::model::BuildTxArgs;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Result of a successful `VerifyTransaction` (spec.md §6).
#[derive(Debug, Clone, PartialEq)]
pub struct TxSwapInfo {
    pub tx_id: String,
    pub from: String,
    pub bind_addr: String,
    pub value: u128,
    pub memo: String,
    pub height: u64,
}

/// Destination-chain transaction status as reported by
/// `GetTransactionStatus` (spec.md §4.6/§6). `block_height == 0` means
/// not yet mined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TxStatus {
    pub block_height: u64,
    pub block_time: i64,
    pub confirmations: u64,
    pub receipt_success: bool,
    /// For contract-token transfers, whether the receipt carried the
    /// expected log entries; always `true` for a native-coin transfer
    /// (spec.md §4.6's "contract address configured and zero logs"
    /// case is the adapter's to classify, not the engine's).
    pub receipt_has_logs: bool,
}

/// An unsigned counter-transaction built from [`BuildTxArgs`]. Opaque
/// `payload` is whatever byte encoding the adapter's chain needs —
/// this crate never inspects it, only forwards it (spec.md's ABI
/// packing is explicitly chain-adapter territory).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTx {
    pub args: BuildTxArgs,
    pub payload: Vec<u8>,
}

/// A [`RawTx`] with an applied threshold signature, ready for broadcast.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedTx {
    pub raw: RawTx,
    pub signature: Vec<u8>,
    pub tx_hash: String,
}

/// The capability set of spec.md §6. One implementation per concrete
/// chain in a real deployment; this crate only defines the contract
/// and a fake.
#[async_trait]
pub trait ChainAdapter: Send + Sync {
    /// True if this adapter is wired to the source chain of its pair
    /// (spec.md §6's `IsSrc` capability flag) — selects swap direction.
    fn is_src(&self) -> bool;

    fn is_valid_address(&self, addr: &str) -> bool;

    /// Idempotent. `allow_unstable` lets the aggregate/accept-sign path
    /// re-verify a transaction that has not yet reached this adapter's
    /// stability depth without itself tripping `TxNotStable`.
    async fn verify_transaction(
        &self,
        tx_id: &str,
        allow_unstable: bool,
    ) -> Result<TxSwapInfo, AdapterError>;

    /// Pure given `args` and adapter state: fills gas price, nonce, gas
    /// limit and memo/ABI payload per spec.md §4.5, and enforces the
    /// balance guard (`balance >= value + reserveGasFee`).
    async fn build_raw_transaction(&self, args: BuildTxArgs) -> Result<RawTx, AdapterError>;

    /// The hash the threshold-signing service is asked to sign
    /// (spec.md §4.7's `msgHash`).
    fn message_hash(&self, raw: &RawTx) -> String;

    /// Apply a recovered `rsv` signature to `raw`, verifying the
    /// recovered sender equals `expected_sender` (the `DcrmAddress`) —
    /// spec.md §4.7's "recovered sender must equal DcrmAddress" check.
    fn apply_signature(
        &self,
        raw: RawTx,
        rsv: &str,
        expected_sender: &str,
    ) -> Result<SignedTx, AdapterError>;

    /// Compares the hash the federation was asked to sign against the
    /// hash this node would independently compute (spec.md §4.7 step 3).
    fn verify_msg_hash(&self, raw: &RawTx, msg_hash: &str) -> Result<(), AdapterError>;

    /// "Already known" is treated as success per spec.md §4.5.
    async fn send_transaction(&self, signed: &SignedTx) -> Result<String, AdapterError>;

    async fn get_transaction_status(&self, tx_hash: &str) -> Result<TxStatus, AdapterError>;

    async fn get_latest_block_number(&self) -> Result<u64, AdapterError>;

    /// Deposit-candidate transactions observed in `height`, already
    /// filtered to the configured deposit address/memo shape — the
    /// byte-level block/transaction decoding is adapter territory per
    /// spec.md's OUT OF SCOPE list; the engine only consumes the
    /// filtered candidate list (spec.md §4.3).
    async fn scan_block(&self, height: u64) -> Result<Vec<TxSwapInfo>, AdapterError>;

    async fn get_balance(&self, addr: &str) -> Result<u128, AdapterError>;

    /// `pending = true` mirrors `GetPoolNonce(addr, "pending")`.
    async fn get_pool_nonce(&self, addr: &str, pending: bool) -> Result<u64, AdapterError>;

    async fn suggest_gas_price(&self) -> Result<u128, AdapterError>;
}
