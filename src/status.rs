//! The swap status taxonomy (spec.md §3/§4.2).
//!
//! Mirrors `original_source/mongodb/status.go` value-for-value, including
//! `TxCanRecall` and the exact membership of each `Can*` predicate — see
//! DESIGN.md for the two Open Questions this resolves.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwapStatus {
    TxNotStable,
    TxVerifyFailed,
    TxWithWrongSender,
    TxWithWrongValue,
    TxIncompatible,
    TxNotSwapped,
    TxSwapFailed,
    TxProcessed,
    MatchTxEmpty,
    MatchTxNotStable,
    MatchTxStable,
    TxWithWrongMemo,
    TxWithBigValue,
    TxSenderNotRegistered,
    MatchTxFailed,
    SwapInBlacklist,
    ManualMakeFail,
    BindAddrIsContract,
    RPCQueryError,
    /// Registration-side counterpart of a `TxWithWrongMemo` result row.
    /// Absent from spec.md's status excerpt; restored from
    /// `original_source/worker/verify.go`'s `updateSwapinStatus`.
    TxCanRecall,
}

impl SwapStatus {
    /// Can an operator force this row from a big-value hold back into the pipeline?
    pub fn can_manual_make_pass(self) -> bool {
        matches!(self, SwapStatus::TxWithBigValue)
    }

    /// Can an operator force this row into a terminal failed state?
    pub fn can_manual_make_fail(self) -> bool {
        matches!(self, SwapStatus::TxNotStable | SwapStatus::TxNotSwapped)
    }

    /// Is this status retried automatically by the retry worker (§4.8)?
    pub fn can_retry(self) -> bool {
        matches!(
            self,
            SwapStatus::TxSenderNotRegistered | SwapStatus::RPCQueryError
        )
    }

    /// Can an operator send this row back through Verify?
    pub fn can_reverify(self) -> bool {
        matches!(
            self,
            SwapStatus::TxVerifyFailed
                | SwapStatus::TxWithWrongValue
                | SwapStatus::TxWithBigValue
                | SwapStatus::TxSenderNotRegistered
                | SwapStatus::SwapInBlacklist
                | SwapStatus::ManualMakeFail
                | SwapStatus::TxIncompatible
                | SwapStatus::BindAddrIsContract
                | SwapStatus::RPCQueryError
        )
    }

    /// Can an operator send this row back through Do-swap?
    pub fn can_reswap(self) -> bool {
        matches!(self, SwapStatus::TxSwapFailed | SwapStatus::TxProcessed)
    }

    /// True for registration statuses that still await a Verify pass.
    pub fn is_pending_verify(self) -> bool {
        matches!(self, SwapStatus::TxNotStable)
    }

    /// True for registration statuses ready for Do-swap.
    pub fn is_pending_swap(self) -> bool {
        matches!(self, SwapStatus::TxNotSwapped)
    }

    /// True for result statuses ready for Stable.
    pub fn is_pending_stable(self) -> bool {
        matches!(self, SwapStatus::MatchTxNotStable)
    }
}

impl fmt::Display for SwapStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Direction of a cross-chain transfer (spec.md Glossary).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwapDirection {
    In,
    Out,
}

impl SwapDirection {
    /// Label for the physical chain a deposit of this direction is
    /// observed on — `In` watches the source chain, `Out` watches the
    /// destination chain (the pair reverses, per
    /// `original_source/worker/accept.go`'s `SwapoutType` branch).
    pub fn chain_label(self) -> &'static str {
        match self {
            SwapDirection::In => "src",
            SwapDirection::Out => "dst",
        }
    }
}

/// Tx-type tag distinguishing the standard verify path from the
/// Bitcoin-style P2SH deposit variant (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwapTxType {
    Normal,
    P2shSwapin,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_big_value_can_manual_pass() {
        for s in all_statuses() {
            assert_eq!(s.can_manual_make_pass(), matches!(s, SwapStatus::TxWithBigValue));
        }
    }

    #[test]
    fn retry_set_is_exactly_sender_unregistered_and_rpc_error() {
        for s in all_statuses() {
            let expect = matches!(
                s,
                SwapStatus::TxSenderNotRegistered | SwapStatus::RPCQueryError
            );
            assert_eq!(s.can_retry(), expect, "status {:?}", s);
        }
    }

    #[test]
    fn wrong_memo_and_can_recall_are_terminal_with_no_predicate() {
        // Resolves Open Question 1/2: neither admits any Can* predicate.
        for s in [SwapStatus::TxWithWrongMemo, SwapStatus::TxCanRecall, SwapStatus::TxWithWrongSender, SwapStatus::TxSwapFailed] {
            assert!(!s.can_manual_make_pass());
            assert!(!s.can_manual_make_fail());
            assert!(!s.can_retry());
            assert!(!s.can_reverify());
            assert!(!s.can_reswap());
        }
    }

    #[test]
    fn reswap_set_is_exactly_failed_and_processed() {
        for s in all_statuses() {
            let expect = matches!(s, SwapStatus::TxSwapFailed | SwapStatus::TxProcessed);
            assert_eq!(s.can_reswap(), expect, "status {:?}", s);
        }
    }

    fn all_statuses() -> Vec<SwapStatus> {
        use SwapStatus::*;
        vec![
            TxNotStable,
            TxVerifyFailed,
            TxWithWrongSender,
            TxWithWrongValue,
            TxIncompatible,
            TxNotSwapped,
            TxSwapFailed,
            TxProcessed,
            MatchTxEmpty,
            MatchTxNotStable,
            MatchTxStable,
            TxWithWrongMemo,
            TxWithBigValue,
            TxSenderNotRegistered,
            MatchTxFailed,
            SwapInBlacklist,
            ManualMakeFail,
            BindAddrIsContract,
            RPCQueryError,
            TxCanRecall,
        ]
    }
}
