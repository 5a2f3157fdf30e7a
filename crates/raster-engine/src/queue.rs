//! Shared row queue feeding the worker pool.
//!
//! One producer publishes row offsets, many workers claim them. Every
//! published row is claimed by exactly one worker. Closing the queue lets the
//! workers drain what is left and then stop; aborting drops pending rows and
//! stops everyone at once.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard};

#[derive(Debug)]
struct QueueState {
    rows: VecDeque<u32>,
    closed: bool,
    aborted: bool,
}

/// FIFO of row offsets with an optional capacity.
#[derive(Debug)]
pub struct RowQueue {
    state: Mutex<QueueState>,
    /// Signalled when a row arrives or the queue closes.
    available: Condvar,
    /// Signalled when a row is claimed, so a blocked producer can continue.
    space: Condvar,
    capacity: Option<usize>,
}

impl RowQueue {
    /// Queue without a capacity limit. `publish` never blocks.
    pub fn unbounded() -> Self {
        Self::new(None)
    }

    /// Queue holding at most `capacity` pending rows (minimum 1).
    pub fn bounded(capacity: usize) -> Self {
        Self::new(Some(capacity.max(1)))
    }

    fn new(capacity: Option<usize>) -> Self {
        Self {
            state: Mutex::new(QueueState {
                rows: VecDeque::with_capacity(capacity.unwrap_or(0).min(1024)),
                closed: false,
                aborted: false,
            }),
            available: Condvar::new(),
            space: Condvar::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    // A panicking worker never leaves the state half-updated, so a poisoned
    // lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Publish a row, blocking while the queue is full.
    ///
    /// Returns `false` if the queue was aborted (or closed) and the row was
    /// dropped.
    pub fn publish(&self, row: u32) -> bool {
        let mut state = self.lock();
        loop {
            if state.aborted || state.closed {
                return false;
            }
            match self.capacity {
                Some(cap) if state.rows.len() >= cap => {
                    state = self
                        .space
                        .wait(state)
                        .unwrap_or_else(|poisoned| poisoned.into_inner());
                }
                _ => break,
            }
        }
        state.rows.push_back(row);
        drop(state);
        self.available.notify_one();
        true
    }

    /// No more rows will be published. Pending rows are still delivered.
    pub fn close(&self) {
        let mut state = self.lock();
        state.closed = true;
        drop(state);
        self.available.notify_all();
        self.space.notify_all();
    }

    /// Drop every pending row and wake all producers and consumers.
    pub fn abort(&self) {
        let mut state = self.lock();
        state.aborted = true;
        state.rows.clear();
        drop(state);
        self.available.notify_all();
        self.space.notify_all();
    }

    /// Claim the next row, blocking while the queue is empty and still open.
    ///
    /// Returns `None` once the queue is closed and drained, or aborted.
    pub fn claim_next(&self) -> Option<u32> {
        let mut state = self.lock();
        loop {
            if state.aborted {
                return None;
            }
            if let Some(row) = state.rows.pop_front() {
                drop(state);
                if self.capacity.is_some() {
                    self.space.notify_one();
                }
                return Some(row);
            }
            if state.closed {
                return None;
            }
            state = self
                .available
                .wait(state)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
    }

    /// Rows published but not yet claimed.
    pub fn pending(&self) -> usize {
        self.lock().rows.len()
    }
}
