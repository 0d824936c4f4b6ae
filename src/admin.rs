//! Admin operations (spec.md §4.8/§6): capability-predicate-gated status
//! transitions plus the `maintain` open/close switch, shared by the
//! `swap-admin` CLI and anything else driving the store directly.

use crate::error::{BridgeError, StoreError};
use crate::model::SwapKey;
use crate::status::{SwapDirection, SwapStatus};
use crate::store::{MaintenanceProvider, SwapProvider, SwapResultProvider, SwapStore};
use crate::time_util::now;
use std::sync::Arc;

/// Send a row back through Verify (spec.md §4.2's `CanReverify`).
pub async fn reverify(store: &Arc<dyn SwapStore>, key: &SwapKey) -> Result<(), BridgeError> {
    let reg = store.get_swap(key).await?.ok_or(StoreError::NotFound)?;
    if !reg.status.can_reverify() {
        return Err(BridgeError::CapabilityDenied(reg.status.to_string()));
    }
    store.update_swap_status(key, SwapStatus::TxNotStable, now(), "admin reverify").await?;
    Ok(())
}

/// Send a row back through Do-swap (spec.md §4.2's `CanReswap`).
pub async fn reswap(store: &Arc<dyn SwapStore>, key: &SwapKey) -> Result<(), BridgeError> {
    let reg = store.get_swap(key).await?.ok_or(StoreError::NotFound)?;
    if !reg.status.can_reswap() {
        return Err(BridgeError::CapabilityDenied(reg.status.to_string()));
    }
    store.update_swap_status(key, SwapStatus::TxNotSwapped, now(), "admin reswap").await?;
    Ok(())
}

/// Force a big-value hold back into the pipeline (spec.md §8 scenario 2:
/// registration → `TxNotSwapped`, result → `MatchTxEmpty`).
pub async fn manual_pass(store: &Arc<dyn SwapStore>, key: &SwapKey) -> Result<(), BridgeError> {
    let reg = store.get_swap(key).await?.ok_or(StoreError::NotFound)?;
    if !reg.status.can_manual_make_pass() {
        return Err(BridgeError::CapabilityDenied(reg.status.to_string()));
    }
    store
        .update_swap_status(key, SwapStatus::TxNotSwapped, now(), "admin manual-pass")
        .await?;
    if store.get_result(key).await?.is_some() {
        store
            .update_result_status(key, SwapStatus::MatchTxEmpty, "admin manual-pass")
            .await?;
    }
    Ok(())
}

/// Force a row into the terminal-manual failed bucket (spec.md §4.2's
/// `CanManualMakeFail`).
pub async fn manual_fail(store: &Arc<dyn SwapStore>, key: &SwapKey) -> Result<(), BridgeError> {
    let reg = store.get_swap(key).await?.ok_or(StoreError::NotFound)?;
    if !reg.status.can_manual_make_fail() {
        return Err(BridgeError::CapabilityDenied(reg.status.to_string()));
    }
    store
        .update_swap_status(key, SwapStatus::ManualMakeFail, now(), "admin manual-fail")
        .await?;
    Ok(())
}

/// `maintain <open|close> <deposit|withdraw|both>` (spec.md §6).
/// `deposit` is the `In` (swapin) direction, `withdraw` is `Out`
/// (swapout), matching the glossary's Swapin/Swapout pairing.
pub async fn maintain(store: &Arc<dyn SwapStore>, open: bool, target: MaintainTarget) -> Result<(), BridgeError> {
    match target {
        MaintainTarget::Deposit => store.set_direction_open(SwapDirection::In, open).await?,
        MaintainTarget::Withdraw => store.set_direction_open(SwapDirection::Out, open).await?,
        MaintainTarget::Both => {
            store.set_direction_open(SwapDirection::In, open).await?;
            store.set_direction_open(SwapDirection::Out, open).await?;
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaintainTarget {
    Deposit,
    Withdraw,
    Both,
}

impl std::str::FromStr for MaintainTarget {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "deposit" => Ok(MaintainTarget::Deposit),
            "withdraw" => Ok(MaintainTarget::Withdraw),
            "both" => Ok(MaintainTarget::Both),
            other => Err(BridgeError::InvalidArgument(format!("unknown direction '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SwapRegistration;
    use crate::status::SwapTxType;
    use crate::store::MemoryStore;

    fn store() -> Arc<dyn SwapStore> {
        Arc::new(MemoryStore::new())
    }

    async fn seed(store: &Arc<dyn SwapStore>, key: &SwapKey, status: SwapStatus) {
        store
            .insert_swap(SwapRegistration {
                tx_id: key.tx_id.clone(),
                direction: SwapDirection::In,
                tx_type: SwapTxType::Normal,
                bind_addr: key.bind_addr.clone(),
                value: 100,
                memo: String::new(),
                timestamp: now(),
                status,
                status_msg: String::new(),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn reverify_rejects_a_status_without_the_capability() {
        let store = store();
        let key = SwapKey { tx_id: "T1".into(), bind_addr: "0xBIND".into() };
        seed(&store, &key, SwapStatus::TxProcessed).await;

        let err = reverify(&store, &key).await.unwrap_err();
        assert!(matches!(err, BridgeError::CapabilityDenied(_)));
    }

    #[tokio::test]
    async fn reverify_moves_eligible_status_to_tx_not_stable() {
        let store = store();
        let key = SwapKey { tx_id: "T1".into(), bind_addr: "0xBIND".into() };
        seed(&store, &key, SwapStatus::TxVerifyFailed).await;

        reverify(&store, &key).await.unwrap();

        let reg = store.get_swap(&key).await.unwrap().unwrap();
        assert_eq!(reg.status, SwapStatus::TxNotStable);
    }

    #[tokio::test]
    async fn manual_pass_clears_big_value_hold_on_both_rows() {
        let store = store();
        let key = SwapKey { tx_id: "T1".into(), bind_addr: "0xBIND".into() };
        seed(&store, &key, SwapStatus::TxWithBigValue).await;
        store
            .insert_result(crate::model::SwapResult::new_empty(
                &key.tx_id,
                &key.bind_addr,
                SwapDirection::In,
                100,
                SwapStatus::TxWithBigValue,
            ))
            .await
            .unwrap();

        manual_pass(&store, &key).await.unwrap();

        let reg = store.get_swap(&key).await.unwrap().unwrap();
        assert_eq!(reg.status, SwapStatus::TxNotSwapped);
        let result = store.get_result(&key).await.unwrap().unwrap();
        assert_eq!(result.status, SwapStatus::MatchTxEmpty);
    }

    #[tokio::test]
    async fn maintain_closes_and_reopens_a_direction() {
        let store = store();
        maintain(&store, false, MaintainTarget::Deposit).await.unwrap();
        assert!(!store.is_direction_open(SwapDirection::In).await.unwrap());
        assert!(store.is_direction_open(SwapDirection::Out).await.unwrap());

        maintain(&store, true, MaintainTarget::Both).await.unwrap();
        assert!(store.is_direction_open(SwapDirection::In).await.unwrap());
        assert!(store.is_direction_open(SwapDirection::Out).await.unwrap());
    }
}
