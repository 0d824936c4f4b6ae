//! End-to-end exercise of the Scan -> Verify -> Do-swap -> Stable
//! pipeline against the in-memory store and the deterministic fake
//! adapters, covering the lifecycle scenarios the unit suites only
//! touch one worker at a time.

use swap_bridge::admin;
use swap_bridge::chain::{FakeChainAdapter, TxStatus, TxSwapInfo};
use swap_bridge::config::BridgeConfig;
use swap_bridge::context::BridgeContext;
use swap_bridge::model::SwapKey;
use swap_bridge::signing::FakeSigningService;
use swap_bridge::status::{SwapDirection, SwapStatus};
use swap_bridge::store::{BlacklistProvider, MaintenanceProvider, SwapProvider, SwapResultProvider};
use swap_bridge::worker::{doswap, scan, stable, verify};
use std::sync::Arc;
use tokio::sync::watch;

fn test_ctx() -> (BridgeContext, Arc<FakeChainAdapter>, Arc<FakeChainAdapter>) {
    let (_tx, rx) = watch::channel(false);
    let src = Arc::new(FakeChainAdapter::new(true, "0xDCRM"));
    let dst = Arc::new(FakeChainAdapter::new(false, "0xDCRM"));
    let ctx = BridgeContext::new(
        Arc::new(BridgeConfig::default()),
        Arc::new(swap_bridge::store::MemoryStore::new()),
        src.clone(),
        dst.clone(),
        Arc::new(FakeSigningService::new()),
        "0xDCRM",
        rx,
    );
    (ctx, src, dst)
}

/// Scenario 1 (happy path): a deposit is scanned, verified, swapped and
/// finally settled as stable once the destination tx clears enough
/// confirmations.
#[tokio::test]
async fn full_lifecycle_settles_as_stable() {
    let (ctx, src, dst) = test_ctx();
    dst.set_balance("0xDCRM", 10_000_000_000_000_000_100);

    src.set_block_transactions(1, vec![TxSwapInfo {
        tx_id: "T1".into(),
        from: "0xFROM".into(),
        bind_addr: "0xBIND".into(),
        value: 100,
        memo: "0xBIND".into(),
        height: 1,
    }]);
    src.set_latest_block(1);

    scan::scan_once(&ctx, SwapDirection::In).await.unwrap();
    verify::verify_pass(&ctx, SwapDirection::In).await.unwrap();

    let key = SwapKey { tx_id: "T1".into(), bind_addr: "0xBIND".into() };
    assert_eq!(ctx.store.get_swap(&key).await.unwrap().unwrap().status, SwapStatus::TxNotSwapped);

    doswap::doswap_pass(&ctx, SwapDirection::In).await.unwrap();

    let reg = ctx.store.get_swap(&key).await.unwrap().unwrap();
    assert_eq!(reg.status, SwapStatus::TxProcessed);
    let result = ctx.store.get_result(&key).await.unwrap().unwrap();
    assert_eq!(result.status, SwapStatus::MatchTxNotStable);
    let swap_tx = result.swap_tx.clone();
    assert!(!swap_tx.is_empty());

    dst.set_tx_status(
        &swap_tx,
        TxStatus { block_height: 100, block_time: 1_700_000_000, confirmations: 0, receipt_success: true, receipt_has_logs: true },
    );
    stable::stable_pass(&ctx, SwapDirection::In).await.unwrap();
    let result = ctx.store.get_result(&key).await.unwrap().unwrap();
    assert_eq!(result.swap_height, 100);
    assert_eq!(result.status, SwapStatus::MatchTxNotStable);

    dst.set_tx_status(
        &swap_tx,
        TxStatus { block_height: 100, block_time: 1_700_000_000, confirmations: 30, receipt_success: true, receipt_has_logs: true },
    );
    stable::stable_pass(&ctx, SwapDirection::In).await.unwrap();
    let result = ctx.store.get_result(&key).await.unwrap().unwrap();
    assert_eq!(result.status, SwapStatus::MatchTxStable);
}

/// Scenario 2: a big-value deposit is held, then an operator manually
/// passes it back into the pipeline.
#[tokio::test]
async fn big_value_hold_then_manual_pass_resumes_the_swap() {
    let (ctx, src, dst) = test_ctx();
    let mut cfg = BridgeConfig::default();
    cfg.big_value_threshold = 1_000;
    let ctx = BridgeContext::new(
        Arc::new(cfg),
        ctx.store.clone(),
        ctx.src_adapter.clone(),
        ctx.dst_adapter.clone(),
        ctx.signing.clone(),
        "0xDCRM",
        ctx.shutdown.clone(),
    );
    dst.set_balance("0xDCRM", 10_000_000_000_000_000_000_000);

    src.set_block_transactions(1, vec![TxSwapInfo {
        tx_id: "T1".into(),
        from: "0xFROM".into(),
        bind_addr: "0xBIND".into(),
        value: 1_000_000,
        memo: "0xBIND".into(),
        height: 1,
    }]);
    src.set_latest_block(1);

    scan::scan_once(&ctx, SwapDirection::In).await.unwrap();
    verify::verify_pass(&ctx, SwapDirection::In).await.unwrap();

    let key = SwapKey { tx_id: "T1".into(), bind_addr: "0xBIND".into() };
    assert_eq!(ctx.store.get_swap(&key).await.unwrap().unwrap().status, SwapStatus::TxWithBigValue);

    admin::manual_pass(&ctx.store, &key).await.unwrap();
    assert_eq!(ctx.store.get_swap(&key).await.unwrap().unwrap().status, SwapStatus::TxNotSwapped);
    assert_eq!(ctx.store.get_result(&key).await.unwrap().unwrap().status, SwapStatus::MatchTxEmpty);

    doswap::doswap_pass(&ctx, SwapDirection::In).await.unwrap();
    assert_eq!(ctx.store.get_swap(&key).await.unwrap().unwrap().status, SwapStatus::TxProcessed);
}

/// Scenario 3: a sender outside the registered set is held, then
/// retried automatically once the retry worker's window picks it up.
#[tokio::test]
async fn unregistered_sender_is_recoverable_via_reverify() {
    let (ctx, src, _dst) = test_ctx();
    src.set_block_transactions(1, vec![TxSwapInfo {
        tx_id: "T1".into(),
        from: "0xFROM".into(),
        bind_addr: "0xBIND".into(),
        value: 100,
        memo: "0xBIND".into(),
        height: 1,
    }]);
    src.set_latest_block(1);
    scan::scan_once(&ctx, SwapDirection::In).await.unwrap();

    // Force a not-found outcome on first verify, then make it findable
    // and reverify it by hand, mirroring an operator unblocking a stuck row.
    let key = SwapKey { tx_id: "T1".into(), bind_addr: "0xBIND".into() };
    ctx.store
        .update_swap_status(&key, SwapStatus::TxVerifyFailed, swap_bridge::time_util::now(), "rpc blip")
        .await
        .unwrap();

    admin::reverify(&ctx.store, &key).await.unwrap();
    assert_eq!(ctx.store.get_swap(&key).await.unwrap().unwrap().status, SwapStatus::TxNotStable);

    verify::verify_pass(&ctx, SwapDirection::In).await.unwrap();
    assert_eq!(ctx.store.get_swap(&key).await.unwrap().unwrap().status, SwapStatus::TxNotSwapped);
}

/// Scenario 4: a blacklisted sender's deposit never produces a result
/// row, and stays blocked even across a reverify attempt.
#[tokio::test]
async fn blacklisted_sender_deposit_never_reaches_doswap() {
    let (ctx, src, _dst) = test_ctx();
    src.set_block_transactions(1, vec![TxSwapInfo {
        tx_id: "T1".into(),
        from: "0xBAD".into(),
        bind_addr: "0xBIND".into(),
        value: 100,
        memo: "0xBIND".into(),
        height: 1,
    }]);
    src.set_latest_block(1);
    ctx.store.add_to_blacklist("0xBAD").await.unwrap();

    scan::scan_once(&ctx, SwapDirection::In).await.unwrap();
    verify::verify_pass(&ctx, SwapDirection::In).await.unwrap();

    let key = SwapKey { tx_id: "T1".into(), bind_addr: "0xBIND".into() };
    let reg = ctx.store.get_swap(&key).await.unwrap().unwrap();
    assert_eq!(reg.status, SwapStatus::SwapInBlacklist);
    assert!(ctx.store.get_result(&key).await.unwrap().is_none());

    doswap::doswap_pass(&ctx, SwapDirection::In).await.unwrap();
    let reg = ctx.store.get_swap(&key).await.unwrap().unwrap();
    assert_eq!(reg.status, SwapStatus::SwapInBlacklist, "doswap must not touch a row outside TxNotSwapped");
}

/// Scenario 6: maintenance closes a direction mid-pipeline; new scans
/// and swaps are blocked until it is reopened.
#[tokio::test]
async fn maintenance_close_blocks_scan_and_doswap_for_that_direction_only() {
    let (ctx, src, dst) = test_ctx();
    dst.set_balance("0xDCRM", 10_000_000_000_000_000_100);
    ctx.store.set_direction_open(SwapDirection::In, false).await.unwrap();

    src.set_block_transactions(1, vec![TxSwapInfo {
        tx_id: "T1".into(),
        from: "0xFROM".into(),
        bind_addr: "0xBIND".into(),
        value: 100,
        memo: "0xBIND".into(),
        height: 1,
    }]);
    src.set_latest_block(1);

    scan::scan_once(&ctx, SwapDirection::In).await.unwrap();
    let key = SwapKey { tx_id: "T1".into(), bind_addr: "0xBIND".into() };
    assert!(ctx.store.get_swap(&key).await.unwrap().is_none(), "scan must not register while closed");

    ctx.store.set_direction_open(SwapDirection::In, true).await.unwrap();
    scan::scan_once(&ctx, SwapDirection::In).await.unwrap();
    verify::verify_pass(&ctx, SwapDirection::In).await.unwrap();
    assert_eq!(ctx.store.get_swap(&key).await.unwrap().unwrap().status, SwapStatus::TxNotSwapped);

    ctx.store.set_direction_open(SwapDirection::In, false).await.unwrap();
    doswap::doswap_pass(&ctx, SwapDirection::In).await.unwrap();
    assert_eq!(
        ctx.store.get_swap(&key).await.unwrap().unwrap().status,
        SwapStatus::TxNotSwapped,
        "doswap must not run while the direction is closed"
    );

    ctx.store.set_direction_open(SwapDirection::In, true).await.unwrap();
    doswap::doswap_pass(&ctx, SwapDirection::In).await.unwrap();
    assert_eq!(ctx.store.get_swap(&key).await.unwrap().unwrap().status, SwapStatus::TxProcessed);
}
