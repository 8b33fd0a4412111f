//! Cooperative cancellation — a shared flag checked between candidates,
//! between optimizer generations, and at solver call boundaries (spec §7
//! "Cancellation & timeout"). A solver call itself is never interrupted
//! mid-flight; it is treated as atomic.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cloneable, thread-safe cancel flag. Cloning shares the same
/// underlying flag: every clone observes a call to [`CancelToken::cancel`]
/// made through any other clone.
///
/// # Example
///
/// ```
/// use ti_guard::cancel::CancelToken;
///
/// let token = CancelToken::new();
/// let worker_copy = token.clone();
/// assert!(!worker_copy.is_cancelled());
///
/// token.cancel();
/// assert!(worker_copy.is_cancelled());
/// ```
#[derive(Debug, Clone)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        CancelToken { flag: Arc::new(AtomicBool::new(false)) }
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_token_is_not_cancelled() {
        assert!(!CancelToken::new().is_cancelled());
    }

    #[test]
    fn cancel_is_visible_through_clones() {
        let a = CancelToken::new();
        let b = a.clone();
        a.cancel();
        assert!(b.is_cancelled());
    }
}
