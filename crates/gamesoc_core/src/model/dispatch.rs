//! Progress counters for one bulk dispatch.

use serde::{Deserialize, Serialize};

/// Sent/failed/total tally rendered by a progress indicator.
///
/// # Invariants
/// - `sent + failed <= total`.
/// - `total` is fixed when the dispatch starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchProgress {
    pub sent: u32,
    pub failed: u32,
    pub total: u32,
}

impl DispatchProgress {
    /// Progress published before the outbound request is issued.
    pub fn started(total: u32) -> Self {
        Self {
            sent: 0,
            failed: 0,
            total,
        }
    }

    /// Progress reported when the batch outcome is unknown.
    pub fn batch_failed(total: u32) -> Self {
        Self {
            sent: 0,
            failed: total,
            total,
        }
    }

    pub fn is_consistent(&self) -> bool {
        u64::from(self.sent) + u64::from(self.failed) <= u64::from(self.total)
    }

    /// Recipients with no reported outcome yet.
    pub fn pending(&self) -> u32 {
        self.total
            .saturating_sub(self.sent)
            .saturating_sub(self.failed)
    }
}
