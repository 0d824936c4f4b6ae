//! Crate-wide error taxonomy.
//!
//! Three layers, from narrowest to broadest:
//! - [`StoreError`] distinguishes a store-level race from a logic bug.
//! - [`AdapterError`] is the vocabulary a [`crate::chain::ChainAdapter`]
//!   is allowed to return; workers pattern-match on it directly.
//! - [`BridgeError`] is the catch-all a worker or CLI command surfaces.

use thiserror::Error;

/// Errors raised by the persistent store layer (spec.md-4.1).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Insert raced with an existing row sharing the same natural key.
    #[error("duplicate key")]
    Duplicate,

    /// Update or lookup referenced a row that does not exist.
    #[error("not found")]
    NotFound,

    /// The underlying storage engine failed (I/O, corruption, encoding).
    #[error("backend error: {0}")]
    Backend(String),
}

/// Errors a chain adapter may return from `VerifyTransaction` and friends.
///
/// This is the contract §4.4's mapping table dispatches on: every
/// variant here must round-trip through the table unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdapterError {
    /// Transaction exists but has not yet reached the adapter's stability depth.
    #[error("tx not stable")]
    TxNotStable,

    /// Transaction could not be found at all (pruned, wrong chain, typo'd id).
    #[error("tx not found")]
    TxNotFound,

    /// Transaction memo does not match the expected bind-address encoding.
    #[error("tx with wrong memo")]
    TxWithWrongMemo,

    /// Transaction sender is not a member of the registered-sender set
    /// (only meaningful for chains that require sender registration).
    #[error("tx sender not registered")]
    TxSenderNotRegistered,

    /// From- or bind-address is on the blacklist.
    #[error("address is in blacklist")]
    AddressIsInBlacklist,

    /// Balance held by the signing account is insufficient for value + gas reserve.
    #[error("not enough balance")]
    NotEnoughBalance,

    /// Any other adapter failure (RPC timeout, malformed response, chain reorg noise).
    #[error("adapter error: {0}")]
    Other(String),
}

/// Top-level error type every worker and CLI command funnels into.
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("adapter error: {0}")]
    Adapter(#[from] AdapterError),

    #[error("signing protocol error: {0}")]
    Signing(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("operation not permitted from status {0}")]
    CapabilityDenied(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type BridgeResult<T> = Result<T, BridgeError>;
