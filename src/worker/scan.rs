//! Scan worker (spec.md §4.3): poll the chain adapter for new blocks,
//! register candidate deposits, advance the checkpoint only after a
//! whole block's transactions are enqueued.

use crate::chain::ChainAdapter;
use crate::context::BridgeContext;
use crate::error::StoreError;
use crate::model::SwapRegistration;
use crate::status::{SwapDirection, SwapStatus, SwapTxType};
use crate::store::{CheckpointProvider, MaintenanceProvider, SwapProvider};
use log::{error, info, warn};

pub async fn run(ctx: BridgeContext, direction: SwapDirection) {
    info!("[scan-{}] starting", direction.chain_label());
    loop {
        if ctx.is_shutting_down() {
            break;
        }
        if let Err(e) = scan_once(&ctx, direction).await {
            error!("[scan-{}] pass failed: {e}", direction.chain_label());
        }
        if super::rest_or_shutdown(&ctx, ctx.config.worker_interval_secs).await {
            break;
        }
    }
    info!("[scan-{}] stopped", direction.chain_label());
}

pub async fn scan_once(ctx: &BridgeContext, direction: SwapDirection) -> Result<(), StoreError> {
    let chain_label = direction.chain_label();
    if !ctx.store.is_direction_open(direction).await? {
        return Ok(());
    }
    let adapter = ctx.verify_adapter(direction);

    let checkpoint = ctx.store.get_checkpoint(chain_label).await?;
    let latest = match super::retry_adapter_read(|| adapter.get_latest_block_number()).await {
        Ok(h) => h,
        Err(e) => {
            warn!("[scan-{chain_label}] get_latest_block_number failed: {e}");
            return Ok(());
        }
    };
    let frontier = latest.saturating_sub(ctx.config.scan_safety_lag);
    if frontier <= checkpoint.latest_scanned_block {
        return Ok(());
    }

    for height in (checkpoint.latest_scanned_block + 1)..=frontier {
        let txs = match super::retry_adapter_read(|| adapter.scan_block(height)).await {
            Ok(txs) => txs,
            Err(e) => {
                warn!("[scan-{chain_label}] scan_block({height}) failed: {e}");
                return Ok(());
            }
        };
        for tx in txs {
            let reg = SwapRegistration {
                tx_id: tx.tx_id,
                direction,
                tx_type: SwapTxType::Normal,
                bind_addr: tx.bind_addr,
                value: tx.value,
                memo: tx.memo,
                timestamp: crate::time_util::now(),
                status: SwapStatus::TxNotStable,
                status_msg: String::new(),
            };
            match ctx.store.insert_swap(reg).await {
                Ok(()) | Err(StoreError::Duplicate) => {}
                Err(e) => return Err(e),
            }
        }
        ctx.store.set_checkpoint(chain_label, height).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::FakeChainAdapter;
    use crate::chain::TxSwapInfo;
    use crate::config::BridgeConfig;
    use crate::signing::FakeSigningService;
    use crate::store::{MemoryStore, SwapProvider};
    use std::sync::Arc;
    use tokio::sync::watch;

    fn test_ctx() -> (BridgeContext, Arc<FakeChainAdapter>) {
        let (_tx, rx) = watch::channel(false);
        let src = Arc::new(FakeChainAdapter::new(true, "0xDCRM"));
        let ctx = BridgeContext::new(
            Arc::new(BridgeConfig::default()),
            Arc::new(MemoryStore::new()),
            src.clone(),
            Arc::new(FakeChainAdapter::new(false, "0xDCRM")),
            Arc::new(FakeSigningService::new()),
            "0xDCRM",
            rx,
        );
        (ctx, src)
    }

    #[tokio::test]
    async fn rescanning_same_block_is_idempotent() {
        let (ctx, src) = test_ctx();
        src.set_block_transactions(1, vec![TxSwapInfo {
            tx_id: "T1".into(),
            from: "0xFROM".into(),
            bind_addr: "0xBIND".into(),
            value: 100,
            memo: "0xBIND".into(),
            height: 1,
        }]);
        src.set_latest_block(1);

        scan_once(&ctx, SwapDirection::In).await.unwrap();
        // Reset checkpoint to force a re-scan of the same block.
        ctx.store.set_checkpoint("src", 0).await.unwrap();
        scan_once(&ctx, SwapDirection::In).await.unwrap();

        let rows = ctx
            .store
            .find_swaps_by_status(SwapDirection::In, SwapStatus::TxNotStable, 0, 10)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn closed_direction_registers_nothing() {
        let (ctx, src) = test_ctx();
        src.set_block_transactions(1, vec![TxSwapInfo {
            tx_id: "T1".into(),
            from: "0xFROM".into(),
            bind_addr: "0xBIND".into(),
            value: 100,
            memo: "0xBIND".into(),
            height: 1,
        }]);
        src.set_latest_block(1);
        ctx.store.set_direction_open(SwapDirection::In, false).await.unwrap();

        scan_once(&ctx, SwapDirection::In).await.unwrap();

        let rows = ctx
            .store
            .find_swaps_by_status(SwapDirection::In, SwapStatus::TxNotStable, 0, 10)
            .await
            .unwrap();
        assert!(rows.is_empty());
    }
}
