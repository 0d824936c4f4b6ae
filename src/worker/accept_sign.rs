//! Accept-sign worker (spec.md §4.7): vote on pending threshold-signing
//! requests raised by every federation node, including ones this node
//! didn't originate. Grounded in
//! `original_source/worker/accept.go`'s `acceptSign`/`verifySignInfo`/
//! `rebuildAndVerifyMsgHash`.

use crate::chain::ChainAdapter;
use crate::context::BridgeContext;
use crate::model::BuildTxArgs;
use crate::signing::{HistoryEntry, PendingSignRequest, SigningService, Vote};
use log::{error, info, warn};

enum Verdict {
    Agree,
    Disagree,
    /// Identifier mismatch, a foreign initiator, or the transaction not
    /// yet being observable — none of this node's business to vote on,
    /// so it neither agrees nor disagrees this round.
    Skip,
}

pub async fn run(ctx: BridgeContext) {
    info!("[accept-sign] starting");
    loop {
        if ctx.is_shutting_down() {
            break;
        }
        match ctx.signing.get_cur_node_sign_info().await {
            Ok(pending) => {
                if !pending.is_empty() {
                    info!("[accept-sign] {} pending request(s)", pending.len());
                }
                for req in &pending {
                    process_one(&ctx, req).await;
                }
                if super::rest_or_shutdown(&ctx, ctx.config.accept_sign_interval_secs).await {
                    break;
                }
            }
            Err(e) => {
                error!("[accept-sign] get_cur_node_sign_info failed: {e}");
                if super::rest_or_shutdown(&ctx, ctx.config.accept_sign_retry_secs).await {
                    break;
                }
            }
        }
    }
    info!("[accept-sign] stopped");
}

async fn process_one(ctx: &BridgeContext, req: &PendingSignRequest) {
    if let Some(entry) = ctx.accept_sign_history.get(&req.key_id) {
        info!("[accept-sign] replaying recorded vote for {}", req.key_id);
        if let Err(e) = ctx
            .signing
            .do_accept_sign(&req.key_id, entry.vote, &entry.msg_hash, &entry.msg_context)
            .await
        {
            warn!("[accept-sign] replay vote for {} failed: {e}", req.key_id);
        }
        return;
    }

    let verdict = verify_sign_info(ctx, req).await;
    let vote = match verdict {
        Verdict::Skip => return,
        Verdict::Agree => Vote::Agree,
        Verdict::Disagree => Vote::Disagree,
    };

    match ctx
        .signing
        .do_accept_sign(&req.key_id, vote, &req.msg_hash, &req.msg_context)
        .await
    {
        Ok(()) => {
            ctx.accept_sign_history.insert(
                &req.key_id,
                HistoryEntry {
                    vote,
                    msg_hash: req.msg_hash.clone(),
                    msg_context: req.msg_context.clone(),
                },
            );
        }
        Err(e) => warn!("[accept-sign] do_accept_sign({}) failed: {e}", req.key_id),
    }
}

async fn verify_sign_info(ctx: &BridgeContext, req: &PendingSignRequest) -> Verdict {
    if req.account != ctx.dcrm_address {
        return Verdict::Skip;
    }

    let args: BuildTxArgs = match serde_json::from_str(&req.msg_context) {
        Ok(a) => a,
        Err(_) => return Verdict::Skip,
    };
    if args.identifier != ctx.config.identifier {
        return Verdict::Skip;
    }

    match rebuild_and_verify(ctx, &args, &req.msg_hash).await {
        Ok(()) => Verdict::Agree,
        Err(AdapterSkip::Skip) => Verdict::Skip,
        Err(AdapterSkip::Disagree(e)) => {
            warn!("[accept-sign] disagree on {}: {e}", req.key_id);
            Verdict::Disagree
        }
    }
}

enum AdapterSkip {
    Skip,
    Disagree(crate::error::AdapterError),
}

async fn rebuild_and_verify(
    ctx: &BridgeContext,
    args: &BuildTxArgs,
    msg_hash: &str,
) -> Result<(), AdapterSkip> {
    use crate::error::AdapterError;

    let verify_adapter = ctx.verify_adapter(args.direction);
    let swap = match verify_adapter.verify_transaction(&args.swap_id, false).await {
        Ok(swap) => swap,
        Err(AdapterError::TxNotStable) | Err(AdapterError::TxNotFound) => return Err(AdapterSkip::Skip),
        Err(e) => return Err(AdapterSkip::Disagree(e)),
    };

    let rebuilt = BuildTxArgs {
        swap_id: args.swap_id.clone(),
        bind_addr: args.bind_addr.clone(),
        direction: args.direction,
        tx_type: args.tx_type,
        value: swap.value,
        identifier: args.identifier.clone(),
        from: ctx.dcrm_address.clone(),
        to: swap.bind_addr.clone(),
        gas_price: args.gas_price,
        nonce: args.nonce,
        gas: args.gas,
        extra: args.extra.clone(),
    };

    let swap_adapter = ctx.swap_adapter(args.direction);
    let raw = swap_adapter
        .build_raw_transaction(rebuilt)
        .await
        .map_err(AdapterSkip::Disagree)?;
    swap_adapter
        .verify_msg_hash(&raw, msg_hash)
        .map_err(AdapterSkip::Disagree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::FakeChainAdapter;
    use crate::chain::TxSwapInfo;
    use crate::config::BridgeConfig;
    use crate::signing::FakeSigningService;
    use crate::status::SwapDirection;
    use crate::status::SwapTxType;
    use crate::store::MemoryStore;
    use std::sync::Arc;
    use tokio::sync::watch;

    fn test_ctx() -> (BridgeContext, Arc<FakeChainAdapter>, Arc<FakeChainAdapter>, Arc<FakeSigningService>) {
        let (_tx, rx) = watch::channel(false);
        let src = Arc::new(FakeChainAdapter::new(true, "0xDCRM"));
        let dst = Arc::new(FakeChainAdapter::new(false, "0xDCRM"));
        let signing = Arc::new(FakeSigningService::new());
        let ctx = BridgeContext::new(
            Arc::new(BridgeConfig::default()),
            Arc::new(MemoryStore::new()),
            src.clone(),
            dst.clone(),
            signing.clone(),
            "0xDCRM",
            rx,
        );
        (ctx, src, dst, signing)
    }

    fn args_for(tx_id: &str, ctx: &BridgeContext) -> BuildTxArgs {
        BuildTxArgs {
            swap_id: tx_id.into(),
            bind_addr: "0xBIND".into(),
            direction: SwapDirection::In,
            tx_type: SwapTxType::Normal,
            value: 0,
            identifier: ctx.config.identifier.clone(),
            from: "0xDCRM".into(),
            to: "0xBIND".into(),
            gas_price: None,
            nonce: Some(0),
            gas: None,
            extra: None,
        }
    }

    #[tokio::test]
    async fn matching_rebuild_votes_agree() {
        let (ctx, src, dst, signing) = test_ctx();
        dst.set_balance("0xDCRM", 10_000_000_000_000_000_100);
        src.register_tx(TxSwapInfo {
            tx_id: "T1".into(),
            from: "0xFROM".into(),
            bind_addr: "0xBIND".into(),
            value: 100,
            memo: "0xBIND".into(),
            height: 10,
        });

        let args = args_for("T1", &ctx);
        let rebuilt_args = BuildTxArgs { value: 100, from: "0xDCRM".into(), to: "0xBIND".into(), ..args.clone() };
        let raw = dst.build_raw_transaction(rebuilt_args).await.unwrap();
        let msg_hash = dst.message_hash(&raw);

        let req = PendingSignRequest {
            key_id: "key-1".into(),
            account: "0xDCRM".into(),
            msg_hash: msg_hash.clone(),
            msg_context: serde_json::to_string(&args).unwrap(),
        };
        signing.push_pending(req.clone());

        process_one(&ctx, &req).await;

        let votes = signing.accepted_votes();
        assert_eq!(votes.len(), 1);
        assert_eq!(votes[0].1, Vote::Agree);
        assert!(ctx.accept_sign_history.get("key-1").is_some());
    }

    #[tokio::test]
    async fn unknown_identifier_is_skipped_without_voting() {
        let (ctx, _src, _dst, signing) = test_ctx();
        let mut args = args_for("T1", &ctx);
        args.identifier = "some-other-bridge".into();
        let req = PendingSignRequest {
            key_id: "key-2".into(),
            account: "0xDCRM".into(),
            msg_hash: "irrelevant".into(),
            msg_context: serde_json::to_string(&args).unwrap(),
        };

        process_one(&ctx, &req).await;

        assert!(signing.accepted_votes().is_empty());
    }

    #[tokio::test]
    async fn unstable_source_tx_is_skipped() {
        let (ctx, src, _dst, signing) = test_ctx();
        src.register_tx(TxSwapInfo {
            tx_id: "T1".into(),
            from: "0xFROM".into(),
            bind_addr: "0xBIND".into(),
            value: 100,
            memo: "0xBIND".into(),
            height: 10,
        });
        src.mark_unstable("T1");

        let args = args_for("T1", &ctx);
        let req = PendingSignRequest {
            key_id: "key-3".into(),
            account: "0xDCRM".into(),
            msg_hash: "irrelevant".into(),
            msg_context: serde_json::to_string(&args).unwrap(),
        };

        process_one(&ctx, &req).await;

        assert!(signing.accepted_votes().is_empty());
    }

    #[tokio::test]
    async fn mismatched_msg_hash_votes_disagree() {
        let (ctx, src, dst, signing) = test_ctx();
        dst.set_balance("0xDCRM", 10_000_000_000_000_000_100);
        src.register_tx(TxSwapInfo {
            tx_id: "T1".into(),
            from: "0xFROM".into(),
            bind_addr: "0xBIND".into(),
            value: 100,
            memo: "0xBIND".into(),
            height: 10,
        });

        let args = args_for("T1", &ctx);
        let req = PendingSignRequest {
            key_id: "key-4".into(),
            account: "0xDCRM".into(),
            msg_hash: "not-the-real-hash".into(),
            msg_context: serde_json::to_string(&args).unwrap(),
        };

        process_one(&ctx, &req).await;

        let votes = signing.accepted_votes();
        assert_eq!(votes.len(), 1);
        assert_eq!(votes[0].1, Vote::Disagree);
    }

    #[tokio::test]
    async fn replayed_key_id_reuses_recorded_vote_without_reverifying() {
        let (ctx, _src, _dst, signing) = test_ctx();
        ctx.accept_sign_history.insert(
            "key-5",
            HistoryEntry { vote: Vote::Agree, msg_hash: "h".into(), msg_context: "c".into() },
        );
        let req = PendingSignRequest {
            key_id: "key-5".into(),
            account: "0xDCRM".into(),
            msg_hash: "h".into(),
            msg_context: "c".into(),
        };

        process_one(&ctx, &req).await;

        let votes = signing.accepted_votes();
        assert_eq!(votes.len(), 1);
        assert_eq!(votes[0].1, Vote::Agree);
    }
}
