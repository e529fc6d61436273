//! Cooperative cancellation, polled at fine granularity between files,
//! chunks, and pipeline phases. Grounded in the teacher's ctrlc wiring.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Install a Ctrl-C handler that cancels this token. Best-effort: if a
    /// handler is already installed elsewhere in the process, this is a
    /// no-op and the token is simply never cancelled by SIGINT.
    pub fn install_ctrlc_handler(&self) {
        let token = self.clone();
        let _ = ctrlc::set_handler(move || token.cancel());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_uncancelled_and_latches_once_set() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        token.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn clones_share_state() {
        let token = CancelToken::new();
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
    }
}
