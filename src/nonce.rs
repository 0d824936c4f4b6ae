//! Per-`(chain, account)` nonce adjuster (spec.md §5): prevents two
//! in-flight Do-swap rows from reusing a nonce when the pending pool
//! reports stale.

use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
pub struct NonceAdjuster {
    last_issued: Mutex<HashMap<String, u64>>,
}

impl NonceAdjuster {
    pub fn new() -> Self {
        Self::default()
    }

    /// `adjust(poolNonce) = max(poolNonce, lastIssued + 1)`, then the
    /// result is stored back as the new `lastIssued`.
    pub fn adjust(&self, address: &str, pool_nonce: u64) -> u64 {
        let mut map = self.last_issued.lock().unwrap();
        let next = match map.get(address) {
            Some(&last) => pool_nonce.max(last + 1),
            None => pool_nonce,
        };
        map.insert(address.to_owned(), next);
        next
    }
}
