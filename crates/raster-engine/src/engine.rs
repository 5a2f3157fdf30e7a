//! The render engine: worker pool, row feeding and completion barrier.
//!
//! ## Lifecycle
//!
//! ```text
//! Engine::new ──► set_workers / set_queue_capacity / with_observer ──► run
//!  (Configured)                                             (Running ──► Complete)
//! ```
//!
//! `run` takes the engine by value, so a finished engine cannot be run again.
//! The sink is only borrowed and outlives the engine.
//!
//! ## Scheduling
//!
//! - `run` spawns the worker pool on scoped threads sharing one [`RowQueue`]
//! - The calling thread publishes row offsets `0..height` in ascending order,
//!   then closes the queue
//! - Each worker claims a row, renders it left to right, and claims the next
//! - Joining every worker is the completion barrier; `run` returns after it
//!
//! Rows are the unit of work. Completion order across workers is not
//! deterministic, but each row is claimed by exactly one worker and every
//! pixel is written exactly once, so the final image is.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::thread;
use std::time::Instant;

use raster_common::{Bounds, RenderError, RenderResult};
use serde::Serialize;
use tracing::{debug, error, info, trace};

use crate::observer::{RowObserver, RowProgress};
use crate::queue::RowQueue;
use crate::source::{FalliblePixelSource, PixelSink};

/// Summary of a completed render pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderStats {
    pub width: u32,
    pub height: u32,
    /// Worker threads actually spawned.
    pub workers: usize,
    /// Rows rendered.
    pub rows: u32,
    /// Pixels written.
    pub pixels: u64,
    pub elapsed_ms: f64,
}

/// Parallel row renderer over a pixel source and a pixel sink.
pub struct Engine<'a, S: ?Sized, K: ?Sized> {
    source: &'a S,
    sink: &'a K,
    bounds: Bounds,
    width: u32,
    height: u32,
    workers: usize,
    queue_capacity: Option<usize>,
    observer: Option<&'a dyn RowObserver>,
}

impl<S: ?Sized, K: ?Sized> fmt::Debug for Engine<'_, S, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("bounds", &self.bounds)
            .field("workers", &self.workers)
            .field("queue_capacity", &self.queue_capacity)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

/// Default pool size: one worker per logical CPU.
pub fn default_workers() -> usize {
    num_cpus::get().max(1)
}

impl<'a, S, K> Engine<'a, S, K>
where
    S: ?Sized,
    K: PixelSink + ?Sized,
{
    /// Build an engine for one render pass.
    ///
    /// The sink's bounds are read once, here. Inverted bounds are rejected;
    /// empty bounds are accepted and make `run` a no-op.
    pub fn new(source: &'a S, sink: &'a K) -> RenderResult<Self> {
        let bounds = sink.bounds();
        if bounds.is_inverted() {
            return Err(RenderError::InvalidBounds { bounds });
        }

        // Extents of an i32 rectangle always fit in u32.
        let (width, height) = if bounds.is_empty() {
            (0, 0)
        } else {
            (bounds.width() as u32, bounds.height() as u32)
        };

        Ok(Self {
            source,
            sink,
            bounds,
            width,
            height,
            workers: default_workers(),
            queue_capacity: None,
            observer: None,
        })
    }

    /// Configured worker count.
    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn queue_capacity(&self) -> Option<usize> {
        self.queue_capacity
    }

    /// Set the number of concurrent workers for the run.
    ///
    /// Zero and negative counts are rejected and the previous value is kept.
    pub fn set_workers<N>(&mut self, workers: N) -> RenderResult<()>
    where
        N: TryInto<usize> + Copy + fmt::Display,
    {
        match workers.try_into() {
            Ok(n) if n >= 1 => {
                self.workers = n;
                Ok(())
            }
            _ => Err(RenderError::InvalidWorkerCount(workers.to_string())),
        }
    }

    /// Builder form of [`Engine::set_workers`].
    pub fn with_workers<N>(mut self, workers: N) -> RenderResult<Self>
    where
        N: TryInto<usize> + Copy + fmt::Display,
    {
        self.set_workers(workers)?;
        Ok(self)
    }

    /// Bound the row queue. `None` means unbounded.
    pub fn set_queue_capacity(&mut self, capacity: Option<usize>) -> RenderResult<()> {
        if capacity == Some(0) {
            return Err(RenderError::InvalidParameter {
                param: "queue_capacity".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        self.queue_capacity = capacity;
        Ok(())
    }

    /// Report each finished row to `observer`.
    pub fn with_observer(mut self, observer: &'a dyn RowObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Threads to spawn: never more than there are rows.
    fn pool_size(&self) -> usize {
        self.workers.min(self.height as usize)
    }
}

/// Shared bookkeeping for one pass.
struct PassState {
    completed: AtomicU32,
    failure: Mutex<Option<RenderError>>,
}

impl PassState {
    fn new() -> Self {
        Self {
            completed: AtomicU32::new(0),
            failure: Mutex::new(None),
        }
    }

    /// Keep the first failure; later ones are consequences of the abort.
    fn record_failure(&self, err: RenderError) {
        let mut slot = self.failure.lock().unwrap_or_else(|p| p.into_inner());
        if slot.is_none() {
            *slot = Some(err);
        }
    }

    fn take_failure(self) -> Option<RenderError> {
        self.failure.into_inner().unwrap_or_else(|p| p.into_inner())
    }
}

/// Aborts the queue if the owning worker unwinds, so the rest of the pool
/// stops instead of rendering into a compromised sink.
struct AbortOnPanic<'q>(&'q RowQueue);

impl Drop for AbortOnPanic<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.abort();
        }
    }
}

impl<'a, S, K> Engine<'a, S, K>
where
    S: FalliblePixelSource + ?Sized,
    K: PixelSink + ?Sized,
{
    /// Render every pixel of the sink's bounds, blocking until done.
    ///
    /// With an infallible source the only error is a failure to spawn a
    /// worker thread. With a fallible source the first compute error aborts
    /// the pass and is returned once every worker has stopped; the sink is
    /// then partially written. A panic on any worker aborts the pass and is
    /// resumed on the calling thread.
    pub fn run(self) -> RenderResult<RenderStats> {
        let started = Instant::now();
        let pool = self.pool_size();

        info!(
            workers = self.workers,
            pool,
            width = self.width,
            height = self.height,
            "Running with {} workers",
            pool
        );

        if self.bounds.is_empty() {
            info!(bounds = %self.bounds, "Empty bounds, nothing to render");
            return Ok(self.stats(0, 0, started));
        }

        let queue = match self.queue_capacity {
            Some(capacity) => RowQueue::bounded(capacity),
            None => RowQueue::unbounded(),
        };
        let pass = PassState::new();

        let panic = thread::scope(|scope| {
            let mut handles = Vec::with_capacity(pool);
            for id in 0..pool {
                let (queue, pass) = (&queue, &pass);
                let this = &self;
                let spawned = thread::Builder::new()
                    .name(format!("render-worker-{}", id))
                    .spawn_scoped(scope, move || this.work(id, queue, pass));
                match spawned {
                    Ok(handle) => handles.push(handle),
                    Err(e) => {
                        error!(worker = id, error = %e, "Failed to spawn render worker");
                        pass.record_failure(RenderError::WorkerSpawn(e));
                        queue.abort();
                        break;
                    }
                }
            }

            for offset in 0..self.height {
                if !queue.publish(offset) {
                    debug!(offset, "Queue aborted, stopped publishing rows");
                    break;
                }
            }
            queue.close();

            // Completion barrier.
            let mut panic = None;
            for handle in handles {
                if let Err(payload) = handle.join() {
                    panic.get_or_insert(payload);
                }
            }
            panic
        });

        if let Some(payload) = panic {
            std::panic::resume_unwind(payload);
        }
        let rows = pass.completed.load(Ordering::SeqCst);
        if let Some(err) = pass.take_failure() {
            return Err(err);
        }

        let stats = self.stats(pool, rows, started);
        info!(
            rows = stats.rows,
            pixels = stats.pixels,
            elapsed_ms = stats.elapsed_ms,
            "Rendering complete! ({} lines)",
            stats.rows
        );
        Ok(stats)
    }

    /// Worker loop: claim rows until the queue is drained or aborted.
    fn work(&self, id: usize, queue: &RowQueue, pass: &PassState) {
        let _guard = AbortOnPanic(queue);
        let mut rendered = 0u32;

        while let Some(offset) = queue.claim_next() {
            let y = (self.bounds.min_y as i64 + offset as i64) as i32;
            if let Err(err) = self.render_row(y) {
                error!(
                    worker = id,
                    row = y,
                    dropped_rows = queue.pending(),
                    error = %err,
                    "Pixel computation failed, aborting render"
                );
                pass.record_failure(err);
                queue.abort();
                break;
            }

            rendered += 1;
            let completed = pass.completed.fetch_add(1, Ordering::SeqCst) + 1;
            trace!(worker = id, row = y, completed, total = self.height, "Row rendered");

            if let Some(observer) = self.observer {
                observer.row_completed(RowProgress {
                    row: y,
                    completed,
                    total: self.height,
                    worker: id,
                });
            }
        }

        debug!(worker = id, rows = rendered, "Render worker exiting");
    }

    fn render_row(&self, y: i32) -> RenderResult<()> {
        for x in self.bounds.min_x..self.bounds.max_x {
            let color = self
                .source
                .try_color_at(x, y)
                .map_err(|e| RenderError::Compute {
                    x,
                    y,
                    source: Box::new(e),
                })?;
            self.sink.write(x, y, color);
        }
        Ok(())
    }

    fn stats(&self, workers: usize, rows: u32, started: Instant) -> RenderStats {
        RenderStats {
            width: self.width,
            height: self.height,
            workers,
            rows,
            pixels: rows as u64 * self.width as u64,
            elapsed_ms: started.elapsed().as_secs_f64() * 1000.0,
        }
    }
}
