//! The worker set that advances swaps through the state machine
//! (spec.md §4.3–4.8), one task per role per direction (spec.md §5).

pub mod accept_sign;
pub mod doswap;
pub mod retry;
pub mod scan;
pub mod stable;
pub mod update_latest_block;
pub mod verify;

use crate::context::BridgeContext;
use crate::error::AdapterError;
use std::future::Future;
use std::time::Duration;

/// Sleep for `secs`, but wake early (and report "stop") if the
/// shutdown channel flips — spec.md §5's "signals every worker to stop
/// before its next sleep."
pub(crate) async fn rest_or_shutdown(ctx: &BridgeContext, secs: u64) -> bool {
    let mut shutdown = ctx.shutdown.clone();
    if *shutdown.borrow() {
        return true;
    }
    tokio::select! {
        _ = tokio::time::sleep(Duration::from_secs(secs)) => false,
        changed = shutdown.changed() => changed.is_ok(),
    }
}

/// RPC reads retry up to 3x at 1s (spec.md §5). Only
/// [`AdapterError::Other`] is retried — every other variant is a
/// classified business outcome (not found, blacklisted, insufficient
/// balance, ...) the caller should act on immediately rather than mask
/// behind a retry loop.
const RPC_RETRY_COUNT: u32 = 3;
const RPC_RETRY_INTERVAL_SECS: u64 = 1;

pub(crate) async fn retry_adapter_read<T, F, Fut>(mut f: F) -> Result<T, AdapterError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AdapterError>>,
{
    let mut attempt = 0;
    loop {
        match f().await {
            Ok(v) => return Ok(v),
            Err(AdapterError::Other(msg)) => {
                attempt += 1;
                if attempt >= RPC_RETRY_COUNT {
                    return Err(AdapterError::Other(msg));
                }
                tokio::time::sleep(Duration::from_secs(RPC_RETRY_INTERVAL_SECS)).await;
            }
            Err(e) => return Err(e),
        }
    }
}
