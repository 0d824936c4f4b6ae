//! Do-swap worker (spec.md §4.5): build the counter-transaction, drive
//! it through the threshold-signing protocol (§4.7's originator side),
//! broadcast it, and persist the result.

use crate::chain::ChainAdapter;
use crate::context::BridgeContext;
use crate::error::{AdapterError, StoreError};
use crate::model::{BuildTxArgs, SwapKey};
use crate::signing::{SignStatus, SigningError};
use crate::status::{SwapDirection, SwapStatus};
use crate::store::{MaintenanceProvider, SwapProvider, SwapResultProvider};
use crate::time_util::{now, since_floor};
use log::{error, info, warn};

const FIND_BATCH_LIMIT: usize = 100;

pub async fn run(ctx: BridgeContext, direction: SwapDirection) {
    info!("[swap-{}] starting", direction.chain_label());
    loop {
        if ctx.is_shutting_down() {
            break;
        }
        if let Err(e) = doswap_pass(&ctx, direction).await {
            error!("[swap-{}] pass failed: {e}", direction.chain_label());
        }
        if super::rest_or_shutdown(&ctx, ctx.config.worker_interval_secs).await {
            break;
        }
    }
    info!("[swap-{}] stopped", direction.chain_label());
}

pub async fn doswap_pass(ctx: &BridgeContext, direction: SwapDirection) -> Result<(), StoreError> {
    if !ctx.store.is_direction_open(direction).await? {
        return Ok(());
    }
    let since_ts = since_floor(ctx.config.max_verify_lifetime_secs);
    let rows = ctx
        .store
        .find_swaps_by_status(direction, SwapStatus::TxNotSwapped, since_ts, FIND_BATCH_LIMIT)
        .await?;
    if !rows.is_empty() {
        info!("[swap-{}] {} row(s) to swap", direction.chain_label(), rows.len());
    }

    for reg in rows {
        let key = SwapKey { tx_id: reg.tx_id.clone(), bind_addr: reg.bind_addr.clone() };
        if let Err(e) = process_one(ctx, direction, &key, reg.value, &reg.bind_addr).await {
            warn!("[swap-{}] process {} failed: {e}", direction.chain_label(), reg.tx_id);
            ctx.store
                .update_swap_status(&key, SwapStatus::TxSwapFailed, now(), &e.to_string())
                .await?;
        }
    }
    Ok(())
}

#[derive(Debug, thiserror::Error)]
enum DoSwapError {
    #[error("build tx failed: {0}")]
    Build(#[from] AdapterError),
    #[error("signing protocol error: {0}")]
    Signing(String),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl From<SigningError> for DoSwapError {
    fn from(e: SigningError) -> Self {
        DoSwapError::Signing(e.to_string())
    }
}

async fn process_one(
    ctx: &BridgeContext,
    direction: SwapDirection,
    key: &SwapKey,
    value: u128,
    bind_addr: &str,
) -> Result<(), DoSwapError> {
    let adapter = ctx.swap_adapter(direction);

    let args = BuildTxArgs {
        swap_id: key.tx_id.clone(),
        bind_addr: key.bind_addr.clone(),
        direction,
        tx_type: crate::status::SwapTxType::Normal,
        value,
        identifier: ctx.config.identifier.clone(),
        from: ctx.dcrm_address.clone(),
        to: bind_addr.to_owned(),
        gas_price: None,
        nonce: None,
        gas: None,
        extra: None,
    };

    let pool_nonce = match super::retry_adapter_read(|| adapter.get_pool_nonce(&args.from, true)).await {
        Ok(n) => n,
        Err(e) => {
            record_rpc_retry(ctx, key, "get_pool_nonce", &e).await?;
            return Err(DoSwapError::Build(e));
        }
    };
    let nonce = ctx.nonce_adjuster.adjust(&args.from, pool_nonce);
    let args = BuildTxArgs { nonce: Some(nonce), ..args };

    let raw = match super::retry_adapter_read(|| adapter.build_raw_transaction(args.clone())).await {
        Ok(r) => r,
        Err(e) => {
            record_rpc_retry(ctx, key, "build_raw_transaction", &e).await?;
            return Err(DoSwapError::Build(e));
        }
    };
    let signed = do_sign(ctx, adapter, &raw).await?;

    let tx_hash = match adapter.send_transaction(&signed).await {
        Ok(hash) => hash,
        Err(AdapterError::Other(ref msg)) if msg.contains("already known") => signed.tx_hash.clone(),
        Err(e) => return Err(DoSwapError::Build(e)),
    };

    // `value` passes straight through as dest_value — see model.rs's
    // SwapResult::dest_value doc comment for why no fee is deducted.
    ctx.store
        .update_result_broadcast(key, &tx_hash, value, SwapStatus::MatchTxNotStable)
        .await?;
    ctx.store.update_swap_status(key, SwapStatus::TxProcessed, now(), "").await?;
    Ok(())
}

/// Bumps the result row's retry counter once an RPC-read's retry
/// budget (spec.md §5) is exhausted. A no-op for any other
/// [`AdapterError`] variant, since those are classified business
/// outcomes rather than RPC flakiness.
async fn record_rpc_retry(ctx: &BridgeContext, key: &SwapKey, op: &str, e: &AdapterError) -> Result<(), DoSwapError> {
    if let AdapterError::Other(msg) = e {
        warn!("[swap] {op}({}) retry budget exhausted: {msg}", key.tx_id);
        match ctx.store.increment_retry_count(key).await {
            Ok(_) | Err(StoreError::NotFound) => {}
            Err(e) => return Err(DoSwapError::Store(e)),
        }
    }
    Ok(())
}

/// Originator side of the signing protocol (spec.md §4.7): submit,
/// poll up to `retry_get_sign_status_count` times, require exactly one
/// `rsv`, apply it and verify the recovered sender.
async fn do_sign(
    ctx: &BridgeContext,
    adapter: &std::sync::Arc<dyn crate::chain::ChainAdapter>,
    raw: &crate::chain::RawTx,
) -> Result<crate::chain::SignedTx, DoSwapError> {
    let msg_hash = adapter.message_hash(raw);
    let msg_context =
        serde_json::to_string(&raw.args).map_err(|e| DoSwapError::Signing(e.to_string()))?;
    let key_id = ctx.signing.do_sign_one(&msg_hash, &msg_context).await?;

    let mut rsv = None;
    for _ in 0..ctx.config.retry_get_sign_status_count {
        match ctx.signing.get_sign_status(&key_id).await {
            Ok(SignStatus::Completed { rsv: values }) => {
                if values.len() != 1 {
                    return Err(DoSwapError::Signing(format!(
                        "require one rsv but have {} (keyID = {key_id})",
                        values.len()
                    )));
                }
                rsv = Some(values.into_iter().next().unwrap());
                break;
            }
            Ok(SignStatus::Pending) => {
                tokio::time::sleep(std::time::Duration::from_secs(
                    ctx.config.retry_get_sign_status_interval_secs,
                ))
                .await;
            }
            Err(e @ (SigningError::GetSignStatusTimeout | SigningError::GetSignStatusFailed)) => {
                return Err(e.into());
            }
            Err(e) => {
                warn!("get_sign_status retry after error: {e}");
                tokio::time::sleep(std::time::Duration::from_secs(
                    ctx.config.retry_get_sign_status_interval_secs,
                ))
                .await;
            }
        }
    }
    let rsv = rsv.ok_or_else(|| DoSwapError::Signing("get sign status failed".into()))?;

    let signed = adapter
        .apply_signature(raw.clone(), &rsv, &ctx.dcrm_address)
        .map_err(DoSwapError::Build)?;
    Ok(signed)
}
