//! Cooperative cancellation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{HarvxError, Result};

/// Shared cancellation flag. Every stage checks it at I/O boundaries and
/// pool workers check it between tasks; cancellation unwinds the pipeline
/// without leaving partial output at the final path.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// Checkpoint: error out when cancelled.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(HarvxError::Cancelled)
        } else {
            Ok(())
        }
    }
}
