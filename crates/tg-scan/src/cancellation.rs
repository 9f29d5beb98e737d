//! External cancellation token (§5 "Cancellation": "the scan accepts an
//! external cancellation token propagated to workers; on cancel, workers
//! stop accepting new items and in-flight work is allowed to complete.
//! Loaders do not poll cancellation.").

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cheaply `Clone`-able flag shared between the orchestrator and every
/// worker thread it spawns.
#[derive(Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_uncancelled_and_latches_once_cancelled() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
    }
}
