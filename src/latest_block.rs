//! Per-chain latest-block-height cache (spec.md §5): a single atomic
//! `u64` per chain, refreshed by the update-latest-block worker.

use crate::status::SwapDirection;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default)]
pub struct LatestBlockCache {
    src: AtomicU64,
    dst: AtomicU64,
}

impl LatestBlockCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, direction: SwapDirection) -> u64 {
        self.cell(direction).load(Ordering::Relaxed)
    }

    pub fn set(&self, direction: SwapDirection, height: u64) {
        self.cell(direction).store(height, Ordering::Relaxed);
    }

    fn cell(&self, direction: SwapDirection) -> &AtomicU64 {
        match direction {
            SwapDirection::In => &self.src,
            SwapDirection::Out => &self.dst,
        }
    }
}
