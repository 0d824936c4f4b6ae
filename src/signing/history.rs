//! Bounded accept-sign vote history (spec.md §4.7/§5).
//!
//! The source uses a 500-entry `container/ring` with a linear scan on
//! read (`original_source/worker/accept.go`); spec.md §9 flags that scan
//! as a straightforward place for a hash-map index, which this takes: a
//! `VecDeque` tracks insertion order for FIFO eviction, a `HashMap`
//! gives O(1) lookup. Both live behind one mutex, matching the source's
//! single-lock discipline.

use crate::signing::Vote;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub vote: Vote,
    pub msg_hash: String,
    pub msg_context: String,
}

struct Ring {
    capacity: usize,
    order: VecDeque<String>,
    entries: HashMap<String, HistoryEntry>,
}

/// Deduplicates accept-sign votes across re-presented requests
/// (spec.md §8 scenario 5: replay-identical votes).
pub struct AcceptSignHistory {
    ring: Mutex<Ring>,
}

impl AcceptSignHistory {
    pub fn new(capacity: usize) -> Self {
        AcceptSignHistory {
            ring: Mutex::new(Ring {
                capacity,
                order: VecDeque::with_capacity(capacity),
                entries: HashMap::with_capacity(capacity),
            }),
        }
    }

    pub fn get(&self, key_id: &str) -> Option<HistoryEntry> {
        self.ring.lock().unwrap().entries.get(key_id).cloned()
    }

    /// No-op if `key_id` is already recorded — the first recorded vote
    /// for a `keyID` is authoritative.
    pub fn insert(&self, key_id: &str, entry: HistoryEntry) {
        let mut ring = self.ring.lock().unwrap();
        if ring.entries.contains_key(key_id) {
            return;
        }
        if ring.order.len() >= ring.capacity {
            if let Some(oldest) = ring.order.pop_front() {
                ring.entries.remove(&oldest);
            }
        }
        ring.order.push_back(key_id.to_owned());
        ring.entries.insert(key_id.to_owned(), entry);
    }

    pub fn len(&self) -> usize {
        self.ring.lock().unwrap().order.len()
    }
}
