//! Single-assignment settlement cell shared by racing transport tasks.

use std::sync::atomic::{AtomicBool, Ordering};

/// One load or save attempt. Exactly one settlement may claim it; every
/// later claim fails and the caller must discard its result.
#[derive(Debug, Default)]
pub struct SyncAttempt {
    settled: AtomicBool,
}

impl SyncAttempt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to settle the attempt. Returns true for the first caller only.
    pub fn claim(&self) -> bool {
        !self.settled.swap(true, Ordering::SeqCst)
    }

    pub fn is_settled(&self) -> bool {
        self.settled.load(Ordering::SeqCst)
    }
}
