//! Per-row progress reporting.

use serde::Serialize;

/// Snapshot passed to a [`RowObserver`] after a row is fully written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RowProgress {
    /// Absolute y coordinate of the finished row.
    pub row: i32,
    /// Rows finished so far in this pass, including this one.
    pub completed: u32,
    /// Rows in the pass.
    pub total: u32,
    /// Index of the worker that rendered the row.
    pub worker: usize,
}

impl RowProgress {
    /// Completion in `[0.0, 1.0]`.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }
}

/// Callback invoked from worker threads as rows complete.
///
/// Rows complete in no particular order. Each call within a pass carries a
/// distinct `completed` value, but calls from different workers may arrive
/// out of order.
pub trait RowObserver: Sync {
    fn row_completed(&self, progress: RowProgress);
}

impl<F> RowObserver for F
where
    F: Fn(RowProgress) + Sync,
{
    fn row_completed(&self, progress: RowProgress) {
        self(progress)
    }
}
