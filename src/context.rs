//! Explicit context handed to every worker at construction — replaces
//! the source's module-level globals (`SrcBridge`, `DstBridge`,
//! `BridgeInstance`) per spec.md §9's design note.

use crate::chain::ChainAdapter;
use crate::config::BridgeConfig;
use crate::latest_block::LatestBlockCache;
use crate::nonce::NonceAdjuster;
use crate::signing::{AcceptSignHistory, SigningService};
use crate::store::SwapStore;
use std::sync::Arc;
use tokio::sync::watch;

/// Everything a worker task needs: config, store handle, both chain
/// adapters, the signing service, and the three pieces of cross-worker
/// shared state (spec.md §5).
#[derive(Clone)]
pub struct BridgeContext {
    pub config: Arc<BridgeConfig>,
    pub store: Arc<dyn SwapStore>,
    pub src_adapter: Arc<dyn ChainAdapter>,
    pub dst_adapter: Arc<dyn ChainAdapter>,
    pub signing: Arc<dyn SigningService>,
    pub nonce_adjuster: Arc<NonceAdjuster>,
    pub accept_sign_history: Arc<AcceptSignHistory>,
    pub latest_block_cache: Arc<LatestBlockCache>,
    /// The federation address (`DcrmAddress`) this node signs as.
    pub dcrm_address: String,
    pub shutdown: watch::Receiver<bool>,
}

impl BridgeContext {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: Arc<BridgeConfig>,
        store: Arc<dyn SwapStore>,
        src_adapter: Arc<dyn ChainAdapter>,
        dst_adapter: Arc<dyn ChainAdapter>,
        signing: Arc<dyn SigningService>,
        dcrm_address: impl Into<String>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        let capacity = config.accept_sign_history_capacity;
        BridgeContext {
            config,
            store,
            src_adapter,
            dst_adapter,
            signing,
            nonce_adjuster: Arc::new(NonceAdjuster::new()),
            accept_sign_history: Arc::new(AcceptSignHistory::new(capacity)),
            latest_block_cache: Arc::new(LatestBlockCache::new()),
            dcrm_address: dcrm_address.into(),
            shutdown,
        }
    }

    /// Chain adapter a deposit of this direction is observed and
    /// verified on. `Out` reverses the pair, matching
    /// `original_source/worker/accept.go`'s `SwapoutType` branch.
    pub fn verify_adapter(&self, direction: crate::status::SwapDirection) -> &Arc<dyn ChainAdapter> {
        match direction {
            crate::status::SwapDirection::In => &self.src_adapter,
            crate::status::SwapDirection::Out => &self.dst_adapter,
        }
    }

    /// Chain adapter the counter-transaction is built and broadcast on.
    pub fn swap_adapter(&self, direction: crate::status::SwapDirection) -> &Arc<dyn ChainAdapter> {
        match direction {
            crate::status::SwapDirection::In => &self.dst_adapter,
            crate::status::SwapDirection::Out => &self.src_adapter,
        }
    }

    pub fn is_shutting_down(&self) -> bool {
        *self.shutdown.borrow()
    }
}
