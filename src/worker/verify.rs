//! Verify worker (spec.md §4.4): re-check a candidate transaction on
//! chain and classify it into the next registration/result status per
//! the adapter-error mapping table.

use crate::chain::ChainAdapter;
use crate::context::BridgeContext;
use crate::error::{AdapterError, StoreError};
use crate::model::SwapResult;
use crate::status::{SwapDirection, SwapStatus};
use crate::store::{BlacklistProvider, SwapProvider, SwapResultProvider};
use crate::time_util::{now, since_floor};
use log::{error, info, warn};

const FIND_BATCH_LIMIT: usize = 100;

pub async fn run(ctx: BridgeContext, direction: SwapDirection) {
    info!("[verify-{}] starting", direction.chain_label());
    loop {
        if ctx.is_shutting_down() {
            break;
        }
        if let Err(e) = verify_pass(&ctx, direction).await {
            error!("[verify-{}] pass failed: {e}", direction.chain_label());
        }
        if super::rest_or_shutdown(&ctx, ctx.config.worker_interval_secs).await {
            break;
        }
    }
    info!("[verify-{}] stopped", direction.chain_label());
}

pub async fn verify_pass(ctx: &BridgeContext, direction: SwapDirection) -> Result<(), StoreError> {
    let since_ts = since_floor(ctx.config.max_verify_lifetime_secs);
    let rows = ctx
        .store
        .find_swaps_by_status(direction, SwapStatus::TxNotStable, since_ts, FIND_BATCH_LIMIT)
        .await?;
    if !rows.is_empty() {
        info!("[verify-{}] {} row(s) to verify", direction.chain_label(), rows.len());
    }

    for reg in rows {
        if let Err(e) = process_one(ctx, direction, &reg.tx_id, &reg.bind_addr).await {
            warn!(
                "[verify-{}] process {} failed: {e}",
                direction.chain_label(),
                reg.tx_id
            );
        }
    }
    Ok(())
}

async fn process_one(
    ctx: &BridgeContext,
    direction: SwapDirection,
    tx_id: &str,
    bind_addr: &str,
) -> Result<(), StoreError> {
    let adapter = ctx.verify_adapter(direction);
    let key = crate::model::SwapKey {
        tx_id: tx_id.to_owned(),
        bind_addr: bind_addr.to_owned(),
    };

    let verify_result = super::retry_adapter_read(|| adapter.verify_transaction(tx_id, false)).await;

    // Not-yet-ready outcomes leave the row untouched; next pass re-evaluates.
    if matches!(verify_result, Err(AdapterError::TxNotStable) | Err(AdapterError::TxNotFound)) {
        return Ok(());
    }

    // RPC-read retry budget exhausted: escalate to RPCQueryError, the
    // one registration status besides TxSenderNotRegistered retry.rs
    // requeues automatically (spec.md §5, mongodb/status.go's register
    // status graph).
    if let Err(AdapterError::Other(ref msg)) = verify_result {
        warn!("[verify-{}] verify_transaction({tx_id}) retry budget exhausted: {msg}", direction.chain_label());
        ctx.store
            .update_swap_status(&key, SwapStatus::RPCQueryError, now(), msg)
            .await?;
        return Ok(());
    }

    if let Ok(ref info) = verify_result {
        let floor = ctx.config.initial_height(direction);
        if info.height != 0 && info.height < floor {
            ctx.store
                .update_swap_status(&key, SwapStatus::TxVerifyFailed, now(), "height below initial height")
                .await?;
            return Ok(());
        }

        if ctx.store.is_blacklisted(&info.from).await?
            || (info.bind_addr != info.from && ctx.store.is_blacklisted(&info.bind_addr).await?)
        {
            ctx.store
                .update_swap_status(&key, SwapStatus::SwapInBlacklist, now(), "address is in blacklist")
                .await?;
            return Ok(());
        }
    }

    match verify_result {
        Ok(info) => {
            let big = info.value > ctx.config.big_value_threshold;
            let reg_status = if big { SwapStatus::TxWithBigValue } else { SwapStatus::TxNotSwapped };
            let result_status = if big { SwapStatus::TxWithBigValue } else { SwapStatus::MatchTxEmpty };

            ctx.store.update_swap_status(&key, reg_status, now(), "").await?;
            let result = SwapResult::new_empty(tx_id, bind_addr, direction, info.value, result_status);
            match ctx.store.insert_result(result).await {
                Ok(()) | Err(StoreError::Duplicate) => {}
                Err(e) => return Err(e),
            }
        }
        Err(AdapterError::TxWithWrongMemo) => {
            ctx.store
                .update_swap_status(&key, SwapStatus::TxCanRecall, now(), "tx with wrong memo")
                .await?;
            let result = SwapResult::new_empty(tx_id, bind_addr, direction, 0, SwapStatus::TxWithWrongMemo);
            match ctx.store.insert_result(result).await {
                Ok(()) | Err(StoreError::Duplicate) => {}
                Err(e) => return Err(e),
            }
        }
        Err(AdapterError::TxSenderNotRegistered) => {
            ctx.store
                .update_swap_status(&key, SwapStatus::TxSenderNotRegistered, now(), "tx sender not registered")
                .await?;
        }
        Err(AdapterError::AddressIsInBlacklist) => {
            ctx.store
                .update_swap_status(&key, SwapStatus::SwapInBlacklist, now(), "address is in blacklist")
                .await?;
        }
        Err(e) => {
            ctx.store
                .update_swap_status(&key, SwapStatus::TxVerifyFailed, now(), &e.to_string())
                .await?;
        }
    }
    Ok(())
}
