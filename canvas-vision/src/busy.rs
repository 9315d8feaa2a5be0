//! Per-operation busy flags.
//!
//! A second request of the same kind while one is pending is rejected, not
//! queued. Different kinds run independently.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{VisionError, VisionResult};

/// Guards one kind of asynchronous operation against re-entry.
#[derive(Debug)]
pub struct BusyFlag {
    busy: AtomicBool,
    kind: &'static str,
}

impl BusyFlag {
    /// Create an idle flag. `kind` names the operation in rejections.
    #[must_use]
    pub const fn new(kind: &'static str) -> Self {
        Self {
            busy: AtomicBool::new(false),
            kind,
        }
    }

    /// Mark the operation as running until the guard drops.
    ///
    /// # Errors
    ///
    /// Returns [`VisionError::Busy`] if it is already running.
    pub fn try_acquire(&self) -> VisionResult<BusyGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| {
                tracing::debug!(kind = self.kind, "Rejected concurrent request");
                VisionError::Busy(self.kind)
            })?;
        Ok(BusyGuard { flag: &self.busy })
    }

    /// Whether the operation is running.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Operation name.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        self.kind
    }
}

/// Clears its flag on drop, including on early return or panic.
#[derive(Debug)]
pub struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
