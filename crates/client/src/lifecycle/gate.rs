use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared flag that turns interception off while stores are pruned.
///
/// The controller raises it through [`SuspensionGate::suspend`]; the
/// dispatcher reads it before every fetch.
#[derive(Debug, Clone, Default)]
pub struct SuspensionGate {
    flag: Arc<AtomicBool>,
}

impl SuspensionGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_suspended(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Suspend interception until the returned guard is dropped.
    pub fn suspend(&self) -> SuspensionGuard {
        self.flag.store(true, Ordering::SeqCst);
        tracing::debug!("interception suspended");
        SuspensionGuard { flag: self.flag.clone() }
    }
}

/// Clears the suspension flag on drop, including on early return.
#[must_use = "interception resumes as soon as the guard is dropped"]
pub struct SuspensionGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for SuspensionGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
        tracing::debug!("interception resumed");
    }
}
