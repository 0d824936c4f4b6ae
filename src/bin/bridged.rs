//! `swap-bridged`: the long-running daemon that spawns the worker set
//! (spec.md §5) against a configured store and chain-adapter pair.
//!
//! This binary ships wired to [`swap_bridge::chain::FakeChainAdapter`]
//! and [`swap_bridge::signing::FakeSigningService`] — the crate's OUT
//! OF SCOPE list excludes concrete chain RPC clients and the
//! threshold-signing client, so a real deployment replaces the two
//! `Arc::new(FakeChainAdapter::new(...))` lines below (and the signing
//! service line) with adapters for its actual chains, built against the
//! same [`ChainAdapter`]/[`SigningService`] traits.

use log::info;
use std::sync::Arc;
use swap_bridge::chain::{ChainAdapter, FakeChainAdapter};
use swap_bridge::config::BridgeConfig;
use swap_bridge::context::BridgeContext;
use swap_bridge::signing::FakeSigningService;
use swap_bridge::status::SwapDirection;
use swap_bridge::store::{SledStore, SwapStore};
use swap_bridge::{logging, worker};
use tokio::sync::watch;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Arc::new(BridgeConfig::load()?);
    logging::init(&config.identifier);
    info!("starting swap-bridged, identifier={}", config.identifier);

    let store: Arc<dyn SwapStore> = Arc::new(SledStore::open(&config.store_path)?);

    let dcrm_address = "0xDCRM_PLACEHOLDER";
    let src_adapter: Arc<dyn ChainAdapter> = Arc::new(FakeChainAdapter::new(true, dcrm_address));
    let dst_adapter: Arc<dyn ChainAdapter> = Arc::new(FakeChainAdapter::new(false, dcrm_address));
    let signing = Arc::new(FakeSigningService::new());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let ctx = BridgeContext::new(
        config,
        store,
        src_adapter,
        dst_adapter,
        signing,
        dcrm_address,
        shutdown_rx,
    );

    let mut tasks = Vec::new();
    for direction in [SwapDirection::In, SwapDirection::Out] {
        tasks.push(tokio::spawn(worker::scan::run(ctx.clone(), direction)));
        tasks.push(tokio::spawn(worker::verify::run(ctx.clone(), direction)));
        tasks.push(tokio::spawn(worker::doswap::run(ctx.clone(), direction)));
        tasks.push(tokio::spawn(worker::stable::run(ctx.clone(), direction)));
    }
    tasks.push(tokio::spawn(worker::retry::run(ctx.clone())));
    tasks.push(tokio::spawn(worker::accept_sign::run(ctx.clone())));
    tasks.push(tokio::spawn(worker::update_latest_block::run(ctx.clone())));

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received, stopping workers");
    let _ = shutdown_tx.send(true);

    for task in tasks {
        let _ = task.await;
    }
    info!("swap-bridged stopped");
    Ok(())
}
