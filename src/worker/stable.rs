//! Stable worker (spec.md §4.6): watch a broadcast counter-transaction
//! until it reaches the configured confirmation depth, then settle the
//! result as stable or failed.

use crate::chain::ChainAdapter;
use crate::context::BridgeContext;
use crate::error::StoreError;
use crate::model::SwapResult;
use crate::status::{SwapDirection, SwapStatus};
use crate::store::SwapResultProvider;
use crate::time_util::since_floor;
use log::{error, info, warn};

const FIND_BATCH_LIMIT: usize = 100;

pub async fn run(ctx: BridgeContext, direction: SwapDirection) {
    info!("[stable-{}] starting", direction.chain_label());
    loop {
        if ctx.is_shutting_down() {
            break;
        }
        if let Err(e) = stable_pass(&ctx, direction).await {
            error!("[stable-{}] pass failed: {e}", direction.chain_label());
        }
        if super::rest_or_shutdown(&ctx, ctx.config.worker_interval_secs).await {
            break;
        }
    }
    info!("[stable-{}] stopped", direction.chain_label());
}

pub async fn stable_pass(ctx: &BridgeContext, direction: SwapDirection) -> Result<(), StoreError> {
    let since_ts = since_floor(ctx.config.max_stable_lifetime_secs);
    let rows = ctx
        .store
        .find_results_by_status(direction, SwapStatus::MatchTxNotStable, since_ts, FIND_BATCH_LIMIT)
        .await?;
    if !rows.is_empty() {
        info!("[stable-{}] {} row(s) to check", direction.chain_label(), rows.len());
    }

    for result in rows {
        if let Err(e) = process_one(ctx, direction, &result).await {
            warn!(
                "[stable-{}] process {} failed: {e}",
                direction.chain_label(),
                result.tx_id
            );
        }
    }
    Ok(())
}

async fn process_one(
    ctx: &BridgeContext,
    direction: SwapDirection,
    result: &SwapResult,
) -> Result<(), StoreError> {
    let adapter = ctx.swap_adapter(direction);
    let key = result.key();

    let status = match super::retry_adapter_read(|| adapter.get_transaction_status(&result.swap_tx)).await {
        Ok(s) => s,
        Err(e) => {
            warn!(
                "[stable-{}] get_transaction_status({}) failed: {e}",
                direction.chain_label(),
                result.swap_tx
            );
            if let crate::error::AdapterError::Other(_) = e {
                match ctx.store.increment_retry_count(&key).await {
                    Ok(_) | Err(StoreError::NotFound) => {}
                    Err(e) => return Err(e),
                }
            }
            return Ok(());
        }
    };
    if status.block_height == 0 {
        return Ok(());
    }

    if result.swap_height != 0 {
        if status.confirmations < ctx.config.required_confirmations {
            return Ok(());
        }
        if !status.receipt_success || !status.receipt_has_logs {
            ctx.store
                .update_result_status(&key, SwapStatus::MatchTxFailed, "receipt indicates failure")
                .await?;
        } else {
            ctx.store.update_result_status(&key, SwapStatus::MatchTxStable, "").await?;
        }
        return Ok(());
    }

    // First observation with a nonzero height: persist unconditionally.
    // A later reorg resetting height back to zero must not erase this.
    ctx.store
        .update_result_mined(&key, status.block_height, status.block_time)
        .await?;
    Ok(())
}
