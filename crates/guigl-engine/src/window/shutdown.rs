use std::sync::atomic::{AtomicBool, Ordering};

/// One-shot flag shared by the render thread and the OS thread.
///
/// Only the first [`ShutdownLatch::trip`] reports `true`, so teardown is
/// started exactly once however many paths ask for it.
#[derive(Debug, Default)]
pub struct ShutdownLatch {
    tripped: AtomicBool,
}

impl ShutdownLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trips the latch. Returns `true` only for the call that tripped it.
    pub fn trip(&self) -> bool {
        self.tripped
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    #[inline]
    pub fn is_tripped(&self) -> bool {
        self.tripped.load(Ordering::Acquire)
    }
}
