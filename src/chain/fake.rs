//! Deterministic in-memory [`ChainAdapter`] used by the test suite.
//! No real cryptography or RPC — every outcome is whatever the test
//! pre-registered, matching spec.md's "adapters are opaque, out of
//! scope" stance.

use super::{ChainAdapter, RawTx, SignedTx, TxStatus, TxSwapInfo};
use crate::error::AdapterError;
use crate::model::BuildTxArgs;
use crate::status::SwapTxType;
use async_trait::async_trait;
use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Mutex;

#[derive(Default)]
struct State {
    transactions: HashMap<String, TxSwapInfo>,
    unstable: std::collections::HashSet<String>,
    balances: HashMap<String, u128>,
    nonces: HashMap<String, u64>,
    latest_block: u64,
    gas_price: u128,
    tx_status: HashMap<String, TxStatus>,
    blocks: HashMap<u64, Vec<TxSwapInfo>>,
    sent: Vec<SignedTx>,
    /// rsv -> recovered sender, populated by test setup since the fake
    /// has no real signature-recovery math.
    signers: HashMap<String, String>,
}

pub struct FakeChainAdapter {
    is_src: bool,
    dcrm_address: String,
    reserve_gas_fee: u128,
    default_gas: u64,
    plus_gas_price_percent: u64,
    unlock_memo_prefix: String,
    state: Mutex<State>,
}

impl FakeChainAdapter {
    pub fn new(is_src: bool, dcrm_address: impl Into<String>) -> Self {
        FakeChainAdapter {
            is_src,
            dcrm_address: dcrm_address.into(),
            reserve_gas_fee: 10_000_000_000_000_000,
            default_gas: 90_000,
            plus_gas_price_percent: 15,
            unlock_memo_prefix: "SWAPTX:".to_owned(),
            state: Mutex::new(State {
                gas_price: 1_000_000_000,
                ..State::default()
            }),
        }
    }

    pub fn register_tx(&self, info: TxSwapInfo) {
        self.state.lock().unwrap().transactions.insert(info.tx_id.clone(), info);
    }

    pub fn mark_unstable(&self, tx_id: &str) {
        self.state.lock().unwrap().unstable.insert(tx_id.to_owned());
    }

    pub fn set_balance(&self, addr: &str, value: u128) {
        self.state.lock().unwrap().balances.insert(addr.to_owned(), value);
    }

    pub fn set_nonce(&self, addr: &str, nonce: u64) {
        self.state.lock().unwrap().nonces.insert(addr.to_owned(), nonce);
    }

    pub fn set_latest_block(&self, height: u64) {
        self.state.lock().unwrap().latest_block = height;
    }

    /// Registers the deposit candidates [`scan_block`] returns for
    /// `height`, and also makes them fetchable via `verify_transaction`.
    pub fn set_block_transactions(&self, height: u64, txs: Vec<TxSwapInfo>) {
        let mut state = self.state.lock().unwrap();
        for tx in &txs {
            state.transactions.insert(tx.tx_id.clone(), tx.clone());
        }
        state.blocks.insert(height, txs);
    }

    pub fn set_tx_status(&self, tx_hash: &str, status: TxStatus) {
        self.state.lock().unwrap().tx_status.insert(tx_hash.to_owned(), status);
    }

    pub fn register_signer(&self, rsv: &str, sender: &str) {
        self.state.lock().unwrap().signers.insert(rsv.to_owned(), sender.to_owned());
    }

    pub fn sent_transactions(&self) -> Vec<SignedTx> {
        self.state.lock().unwrap().sent.clone()
    }

    fn deterministic_hash(bytes: &[u8]) -> String {
        let mut hasher = DefaultHasher::new();
        bytes.hash(&mut hasher);
        format!("{:016x}", hasher.finish())
    }
}

#[async_trait]
impl ChainAdapter for FakeChainAdapter {
    fn is_src(&self) -> bool {
        self.is_src
    }

    fn is_valid_address(&self, addr: &str) -> bool {
        !addr.is_empty()
    }

    async fn verify_transaction(
        &self,
        tx_id: &str,
        allow_unstable: bool,
    ) -> Result<TxSwapInfo, AdapterError> {
        let state = self.state.lock().unwrap();
        if !allow_unstable && state.unstable.contains(tx_id) {
            return Err(AdapterError::TxNotStable);
        }
        state
            .transactions
            .get(tx_id)
            .cloned()
            .ok_or(AdapterError::TxNotFound)
    }

    async fn build_raw_transaction(&self, mut args: BuildTxArgs) -> Result<RawTx, AdapterError> {
        if args.gas_price.is_none() {
            let suggested = self.suggest_gas_price().await?;
            args.gas_price = Some(suggested * (100 + self.plus_gas_price_percent as u128) / 100);
        }
        if args.gas.is_none() {
            args.gas = Some(self.default_gas);
        }
        if args.nonce.is_none() {
            args.nonce = Some(self.get_pool_nonce(&args.from, true).await?);
        }

        let balance = self.get_balance(&args.from).await?;
        if balance < args.value + self.reserve_gas_fee {
            return Err(AdapterError::NotEnoughBalance);
        }

        let payload = match args.tx_type {
            SwapTxType::Normal if args.extra.is_none() => {
                format!("{}{}", self.unlock_memo_prefix, args.swap_id).into_bytes()
            }
            _ => format!(
                "swapin({},{},{})",
                args.swap_id, args.to, args.value
            )
            .into_bytes(),
        };

        Ok(RawTx { args, payload })
    }

    fn message_hash(&self, raw: &RawTx) -> String {
        Self::deterministic_hash(&raw.payload)
    }

    fn apply_signature(
        &self,
        raw: RawTx,
        rsv: &str,
        expected_sender: &str,
    ) -> Result<SignedTx, AdapterError> {
        let state = self.state.lock().unwrap();
        // A fake has no real recovery math: an unregistered rsv is treated
        // as correctly recovering `expected_sender`; tests register an
        // explicit (possibly mismatched) sender only to exercise the
        // rejection path.
        let default_sender = expected_sender.to_owned();
        let sender = state.signers.get(rsv).unwrap_or(&default_sender);
        if sender != expected_sender {
            return Err(AdapterError::Other(format!(
                "wrong sender: have {sender}, want {expected_sender}"
            )));
        }
        let tx_hash = Self::deterministic_hash(format!("{:?}{rsv}", raw).as_bytes());
        Ok(SignedTx {
            raw,
            signature: rsv.as_bytes().to_vec(),
            tx_hash,
        })
    }

    fn verify_msg_hash(&self, raw: &RawTx, msg_hash: &str) -> Result<(), AdapterError> {
        if self.message_hash(raw) == msg_hash {
            Ok(())
        } else {
            Err(AdapterError::Other("msg hash mismatch".into()))
        }
    }

    async fn send_transaction(&self, signed: &SignedTx) -> Result<String, AdapterError> {
        self.state.lock().unwrap().sent.push(signed.clone());
        Ok(signed.tx_hash.clone())
    }

    async fn get_transaction_status(&self, tx_hash: &str) -> Result<TxStatus, AdapterError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .tx_status
            .get(tx_hash)
            .copied()
            .unwrap_or_default())
    }

    async fn get_latest_block_number(&self) -> Result<u64, AdapterError> {
        Ok(self.state.lock().unwrap().latest_block)
    }

    async fn scan_block(&self, height: u64) -> Result<Vec<TxSwapInfo>, AdapterError> {
        Ok(self.state.lock().unwrap().blocks.get(&height).cloned().unwrap_or_default())
    }

    async fn get_balance(&self, addr: &str) -> Result<u128, AdapterError> {
        Ok(self.state.lock().unwrap().balances.get(addr).copied().unwrap_or(0))
    }

    async fn get_pool_nonce(&self, addr: &str, _pending: bool) -> Result<u64, AdapterError> {
        Ok(self.state.lock().unwrap().nonces.get(addr).copied().unwrap_or(0))
    }

    async fn suggest_gas_price(&self) -> Result<u128, AdapterError> {
        Ok(self.state.lock().unwrap().gas_price)
    }
}
