//! Cross-chain swap lifecycle engine: the state machine, store layer,
//! chain-adapter/signing-service contracts, and the worker set that
//! drives a deposit from first observation through to a settled,
//! confirmed counter-transaction.
//!
//! This crate ships no concrete chain RPC client or threshold-signing
//! client — those are adapters plugged in by the binary that wires a
//! [`context::BridgeContext`] together (see `swap-bridged`).

pub mod admin;
pub mod chain;
pub mod config;
pub mod context;
pub mod error;
pub mod latest_block;
pub mod logging;
pub mod model;
pub mod nonce;
pub mod signing;
pub mod status;
pub mod store;
pub mod time_util;
pub mod worker;
