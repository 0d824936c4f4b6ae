//! Update-latest-block worker (spec.md §5): the single task that keeps
//! the per-chain latest-block-height cache fresh, rather than leaving
//! shared state no task ever writes.

use crate::chain::ChainAdapter;
use crate::context::BridgeContext;
use log::{info, warn};
use crate::status::SwapDirection;

const DIRECTIONS: [SwapDirection; 2] = [SwapDirection::In, SwapDirection::Out];

pub async fn run(ctx: BridgeContext) {
    info!("[update-latest-block] starting");
    loop {
        if ctx.is_shutting_down() {
            break;
        }
        update_once(&ctx).await;
        if super::rest_or_shutdown(&ctx, ctx.config.worker_interval_secs).await {
            break;
        }
    }
    info!("[update-latest-block] stopped");
}

async fn update_once(ctx: &BridgeContext) {
    for direction in DIRECTIONS {
        let adapter = ctx.verify_adapter(direction);
        match super::retry_adapter_read(|| adapter.get_latest_block_number()).await {
            Ok(height) => ctx.latest_block_cache.set(direction, height),
            Err(e) => warn!(
                "[update-latest-block] get_latest_block_number({}) failed: {e}",
                direction.chain_label()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::FakeChainAdapter;
    use crate::config::BridgeConfig;
    use crate::signing::FakeSigningService;
    use crate::store::MemoryStore;
    use std::sync::Arc;
    use tokio::sync::watch;

    #[tokio::test]
    async fn refreshes_both_chains_independently() {
        let (_tx, rx) = watch::channel(false);
        let src = Arc::new(FakeChainAdapter::new(true, "0xDCRM"));
        let dst = Arc::new(FakeChainAdapter::new(false, "0xDCRM"));
        src.set_latest_block(10);
        dst.set_latest_block(20);
        let ctx = BridgeContext::new(
            Arc::new(BridgeConfig::default()),
            Arc::new(MemoryStore::new()),
            src,
            dst,
            Arc::new(FakeSigningService::new()),
            "0xDCRM",
            rx,
        );

        update_once(&ctx).await;

        assert_eq!(ctx.latest_block_cache.get(SwapDirection::In), 10);
        assert_eq!(ctx.latest_block_cache.get(SwapDirection::Out), 20);
    }
}
