//! The threshold-signing service RPC (spec.md §6) — treated as an
//! opaque collaborator per spec.md's OUT OF SCOPE list. Only the trait,
//! the accept-sign vote history ([`history::AcceptSignHistory`]), and a
//! deterministic [`fake::FakeSigningService`] live here.

pub mod fake;
pub mod history;

pub use fake::FakeSigningService;
pub use history::{AcceptSignHistory, HistoryEntry};

use async_trait::async_trait;
use thiserror::Error;

/// Errors `GetSignStatus` may return (spec.md §6).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SigningError {
    #[error("get sign status timeout")]
    GetSignStatusTimeout,

    #[error("get sign status failed")]
    GetSignStatusFailed,

    #[error("signing service error: {0}")]
    Other(String),
}

/// A federation node's vote on a pending signature request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vote {
    Agree,
    Disagree,
}

impl Vote {
    pub fn as_str(self) -> &'static str {
        match self {
            Vote::Agree => "AGREE",
            Vote::Disagree => "DISAGREE",
        }
    }
}

/// `GetSignStatus` reply (spec.md §4.7/§6): pending until exactly one
/// `rsv` is available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignStatus {
    Pending,
    Completed { rsv: Vec<String> },
}

/// One entry of `GetCurNodeSignInfo` — a request awaiting this node's
/// vote (spec.md §6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSignRequest {
    pub key_id: String,
    pub account: String,
    pub msg_hash: String,
    pub msg_context: String,
}

#[async_trait]
pub trait SigningService: Send + Sync {
    /// Submit `msg_hash` with JSON-serialized `BuildTxArgs` as
    /// `msg_context`; returns the assigned `keyID`.
    async fn do_sign_one(&self, msg_hash: &str, msg_context: &str) -> Result<String, SigningError>;

    async fn get_sign_status(&self, key_id: &str) -> Result<SignStatus, SigningError>;

    async fn get_cur_node_sign_info(&self) -> Result<Vec<PendingSignRequest>, SigningError>;

    async fn do_accept_sign(
        &self,
        key_id: &str,
        vote: Vote,
        msg_hash: &str,
        msg_context: &str,
    ) -> Result<(), SigningError>;
}
