//! Identifier allocation for backends without native key generation.
//!
//! # Invariants
//! - Every call to `next_id` returns a value never returned before by the
//!   same allocator, also under concurrent callers.
//! - Allocators are plain values owned by a store instance; there is no
//!   process-wide counter.

use std::sync::atomic::{AtomicI64, Ordering};

const FIRST_ID: i64 = 1;

/// Monotonic id source injected into in-memory stores.
#[derive(Debug)]
pub struct IdAllocator {
    next: AtomicI64,
}

impl IdAllocator {
    /// Allocator whose first id is `1`.
    pub fn new() -> Self {
        Self::starting_at(FIRST_ID)
    }

    /// Allocator whose first id is `first`.
    pub fn starting_at(first: i64) -> Self {
        Self {
            next: AtomicI64::new(first),
        }
    }

    /// Issues the next unused id.
    pub fn next_id(&self) -> i64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}
