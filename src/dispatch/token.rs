//! Cancellation token for scheduled deliveries.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared cancel flag.
///
/// Every task captures the token that was current when it was scheduled.
/// Once cancelled a token stays cancelled; the hub installs a fresh one.
#[derive(Clone, Debug, Default)]
pub struct DispatchToken {
    cancelled: Arc<AtomicBool>,
}

impl DispatchToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_is_shared_by_clones() {
        let token = DispatchToken::new();
        let scheduled = token.clone();
        assert!(!scheduled.is_cancelled());

        token.cancel();
        assert!(scheduled.is_cancelled());
        assert!(!DispatchToken::new().is_cancelled());
    }
}
