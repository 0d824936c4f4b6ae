//! Retry worker (spec.md §4.8): drive retryable terminal statuses back
//! into the pipeline. One task covers both directions (spec.md §5's
//! scheduling list has a single `retry` entry, unlike the per-direction
//! scan/verify/swap/stable tasks).

use crate::context::BridgeContext;
use crate::error::StoreError;
use crate::status::{SwapDirection, SwapStatus};
use crate::store::SwapProvider;
use crate::time_util::{now, since_floor};
use log::{error, info, warn};

const FIND_BATCH_LIMIT: usize = 100;
const RETRYABLE: [SwapStatus; 2] = [SwapStatus::TxSenderNotRegistered, SwapStatus::RPCQueryError];
const DIRECTIONS: [SwapDirection; 2] = [SwapDirection::In, SwapDirection::Out];

pub async fn run(ctx: BridgeContext) {
    info!("[retry] starting");
    loop {
        if ctx.is_shutting_down() {
            break;
        }
        if let Err(e) = retry_pass(&ctx).await {
            error!("[retry] pass failed: {e}");
        }
        if super::rest_or_shutdown(&ctx, ctx.config.worker_interval_secs).await {
            break;
        }
    }
    info!("[retry] stopped");
}

pub async fn retry_pass(ctx: &BridgeContext) -> Result<(), StoreError> {
    let since_ts = since_floor(ctx.config.max_verify_lifetime_secs);
    for direction in DIRECTIONS {
        for status in RETRYABLE {
            let rows = ctx
                .store
                .find_swaps_by_status(direction, status, since_ts, FIND_BATCH_LIMIT)
                .await?;
            if rows.is_empty() {
                continue;
            }
            info!("[retry] {} row(s) with status {status:?} to requeue", rows.len());
            for reg in rows {
                let key = crate::model::SwapKey { tx_id: reg.tx_id.clone(), bind_addr: reg.bind_addr.clone() };
                if let Err(e) = ctx.store.update_swap_status(&key, SwapStatus::TxNotStable, now(), "").await {
                    warn!("[retry] requeue {} failed: {e}", reg.tx_id);
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::FakeChainAdapter;
    use crate::config::BridgeConfig;
    use crate::model::{SwapKey, SwapRegistration};
    use crate::signing::FakeSigningService;
    use crate::status::SwapTxType;
    use crate::store::MemoryStore;
    use std::sync::Arc;
    use tokio::sync::watch;

    fn test_ctx() -> BridgeContext {
        let (_tx, rx) = watch::channel(false);
        BridgeContext::new(
            Arc::new(BridgeConfig::default()),
            Arc::new(MemoryStore::new()),
            Arc::new(FakeChainAdapter::new(true, "0xDCRM")),
            Arc::new(FakeChainAdapter::new(false, "0xDCRM")),
            Arc::new(FakeSigningService::new()),
            "0xDCRM",
            rx,
        )
    }

    #[tokio::test]
    async fn sender_not_registered_row_is_requeued_to_not_stable() {
        let ctx = test_ctx();
        ctx.store
            .insert_swap(SwapRegistration {
                tx_id: "T1".into(),
                direction: SwapDirection::In,
                tx_type: SwapTxType::Normal,
                bind_addr: "0xBIND".into(),
                value: 100,
                memo: String::new(),
                timestamp: now(),
                status: SwapStatus::TxSenderNotRegistered,
                status_msg: String::new(),
            })
            .await
            .unwrap();

        retry_pass(&ctx).await.unwrap();

        let key = SwapKey { tx_id: "T1".into(), bind_addr: "0xBIND".into() };
        let reg = ctx.store.get_swap(&key).await.unwrap().unwrap();
        assert_eq!(reg.status, SwapStatus::TxNotStable);
    }

    #[tokio::test]
    async fn non_retryable_status_is_left_alone() {
        let ctx = test_ctx();
        ctx.store
            .insert_swap(SwapRegistration {
                tx_id: "T1".into(),
                direction: SwapDirection::In,
                tx_type: SwapTxType::Normal,
                bind_addr: "0xBIND".into(),
                value: 100,
                memo: String::new(),
                timestamp: now(),
                status: SwapStatus::TxProcessed,
                status_msg: String::new(),
            })
            .await
            .unwrap();

        retry_pass(&ctx).await.unwrap();

        let key = SwapKey { tx_id: "T1".into(), bind_addr: "0xBIND".into() };
        let reg = ctx.store.get_swap(&key).await.unwrap().unwrap();
        assert_eq!(reg.status, SwapStatus::TxProcessed);
    }
}
