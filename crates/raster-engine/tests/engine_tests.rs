//! Tests for the render engine.
//!
//! Covers:
//! - Completeness and exactly-once writes
//! - Determinism across worker counts
//! - Configuration validation (worker count, bounds, queue capacity)
//! - Compute failures and worker panics
//! - Progress observation

use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Mutex;

use raster_engine::{Bounds, Engine, Gradient, RenderError, RgbaBuffer, RowProgress};
use test_utils::{
    assert_written_once, CoordSource, CountingSink, FailingSource, NullSink, PanickingSource,
    WORKER_COUNTS,
};

// ============================================================================
// Completeness
// ============================================================================

#[test]
fn test_every_pixel_written_once_with_source_value() {
    let sink = CountingSink::new(37, 23);
    let stats = Engine::new(&CoordSource, &sink).unwrap().run().unwrap();

    assert_written_once!(sink);
    for y in 0..23 {
        for x in 0..37 {
            assert_eq!(sink.get(x, y), Some(CoordSource::expected(x, y)), "pixel ({}, {})", x, y);
        }
    }
    assert_eq!(stats.rows, 23);
    assert_eq!(stats.pixels, 37 * 23);
    assert_eq!(sink.total_writes(), 37 * 23);
}

#[test]
fn test_exactly_once_for_each_worker_count() {
    for &workers in &WORKER_COUNTS {
        let sink = CountingSink::new(19, 11);
        Engine::new(&CoordSource, &sink)
            .unwrap()
            .with_workers(workers)
            .unwrap()
            .run()
            .unwrap();
        assert_written_once!(sink);
    }
}

#[test]
fn test_offset_bounds_use_absolute_coordinates() {
    let bounds = Bounds::new(-3, 10, 5, 14);
    let sink = CountingSink::with_bounds(bounds);
    Engine::new(&CoordSource, &sink).unwrap().run().unwrap();

    assert_written_once!(sink);
    assert_eq!(sink.out_of_bounds_writes(), 0);
    for y in 10..14 {
        for x in -3..5 {
            assert_eq!(sink.get(x, y), Some(CoordSource::expected(x, y)));
        }
    }
}

#[test]
fn test_single_row_image() {
    let sink = CountingSink::new(500, 1);
    let stats = Engine::new(&CoordSource, &sink)
        .unwrap()
        .with_workers(8)
        .unwrap()
        .run()
        .unwrap();
    assert_written_once!(sink);
    assert_eq!(stats.workers, 1);
}

// ============================================================================
// Determinism
// ============================================================================

#[test]
fn test_output_identical_across_worker_counts() {
    let render = |workers: usize| {
        let buffer = RgbaBuffer::new(50, 20);
        let gradient = Gradient::new(50, 20);
        Engine::new(&gradient, &buffer)
            .unwrap()
            .with_workers(workers)
            .unwrap()
            .run()
            .unwrap();
        buffer.into_rgba_bytes()
    };

    let reference = render(1);
    for &workers in &WORKER_COUNTS[1..] {
        assert_eq!(render(workers), reference, "workers = {}", workers);
    }
}

#[test]
fn test_bounded_queue_renders_everything() {
    let sink = CountingSink::new(7, 100);
    let mut engine = Engine::new(&CoordSource, &sink).unwrap().with_workers(4).unwrap();
    engine.set_queue_capacity(Some(1)).unwrap();
    let stats = engine.run().unwrap();

    assert_written_once!(sink);
    assert_eq!(stats.rows, 100);
}

// ============================================================================
// Configuration errors
// ============================================================================

#[test]
fn test_zero_workers_rejected() {
    let sink = CountingSink::new(4, 4);
    let mut engine = Engine::new(&CoordSource, &sink).unwrap();
    let err = engine.set_workers(0).unwrap_err();
    assert!(matches!(err, RenderError::InvalidWorkerCount(ref v) if v == "0"));
    assert!(err.is_config_error());
}

#[test]
fn test_negative_workers_rejected() {
    let sink = CountingSink::new(4, 4);
    let mut engine = Engine::new(&CoordSource, &sink).unwrap();
    let err = engine.set_workers(-1).unwrap_err();
    assert!(matches!(err, RenderError::InvalidWorkerCount(ref v) if v == "-1"));

    // The engine is still usable with its previous count.
    engine.run().unwrap();
    assert_written_once!(sink);
}

#[test]
fn test_inverted_bounds_rejected_at_construction() {
    let sink = NullSink::new(Bounds::new(0, 0, -4, 4));
    let err = Engine::new(&CoordSource, &sink).unwrap_err();
    assert!(matches!(err, RenderError::InvalidBounds { .. }));
    assert!(err.is_config_error());
    assert_eq!(sink.writes(), 0);
}

// ============================================================================
// Degenerate geometry
// ============================================================================

#[test]
fn test_zero_width_is_a_noop() {
    let sink = NullSink::new(Bounds::new(0, 0, 0, 10));
    let stats = Engine::new(&CoordSource, &sink)
        .unwrap()
        .with_workers(4)
        .unwrap()
        .run()
        .unwrap();
    assert_eq!(sink.writes(), 0);
    assert_eq!(stats.rows, 0);
    assert_eq!(stats.workers, 0);
}

#[test]
fn test_zero_height_is_a_noop() {
    let sink = CountingSink::new(10, 0);
    let stats = Engine::new(&CoordSource, &sink).unwrap().run().unwrap();
    assert_eq!(sink.total_writes(), 0);
    assert_eq!(stats.pixels, 0);
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_compute_failure_stops_single_worker_at_failing_row() {
    let sink = CountingSink::new(4, 8);
    let source = FailingSource::at(0, 2);
    let err = Engine::new(&source, &sink)
        .unwrap()
        .with_workers(1)
        .unwrap()
        .run()
        .unwrap_err();

    match err {
        RenderError::Compute { x, y, ref source } => {
            assert_eq!((x, y), (0, 2));
            assert!(source.to_string().contains("(0, 2)"));
        }
        other => panic!("expected compute failure, got {:?}", other),
    }

    // Rows 0 and 1 finished; nothing at or after the failing row was written.
    assert_eq!(sink.complete_rows(), vec![0, 1]);
    assert_eq!(sink.total_writes(), 8);
}

#[test]
fn test_compute_failure_with_many_workers() {
    let sink = CountingSink::new(16, 64);
    let source = FailingSource::at(5, 10);
    let err = Engine::new(&source, &sink)
        .unwrap()
        .with_workers(4)
        .unwrap()
        .run()
        .unwrap_err();

    assert!(matches!(err, RenderError::Compute { x: 5, y: 10, .. }));
    assert_eq!(sink.count(5, 10), Some(0));
    // No pixel is ever written twice, even across an abort.
    for y in 0..64 {
        for x in 0..16 {
            assert!(sink.count(x, y).unwrap() <= 1);
        }
    }
}

#[test]
fn test_compute_failure_halts_the_pool_promptly() {
    let (width, height) = (64u32, 4096u32);
    let sink = CountingSink::new(width, height);
    let source = FailingSource::at(0, 3);
    let err = Engine::new(&source, &sink)
        .unwrap()
        .with_workers(4)
        .unwrap()
        .run()
        .unwrap_err();

    assert!(matches!(err, RenderError::Compute { x: 0, y: 3, .. }));

    // The pool stops soon after the failure; most rows are never claimed.
    let limit = height as usize / 4;
    let complete = sink.complete_rows().len();
    assert!(complete < limit, "{} of {} rows completed after failure", complete, height);
    assert!(sink.written_pixels() < limit * width as usize);
    assert!(!sink.complete_rows().contains(&3));
}

#[test]
fn test_worker_panic_reaches_caller() {
    let sink = CountingSink::new(8, 8);
    let source = PanickingSource {
        panic_x: 3,
        panic_y: 4,
    };
    let engine = Engine::new(&source, &sink).unwrap().with_workers(2).unwrap();

    let result = panic::catch_unwind(AssertUnwindSafe(|| engine.run()));
    let payload = result.unwrap_err();
    let message = payload
        .downcast_ref::<String>()
        .cloned()
        .unwrap_or_default();
    assert!(message.contains("synthetic panic"), "{}", message);
    assert_eq!(sink.count(3, 4), Some(0));
}

// ============================================================================
// Observer
// ============================================================================

#[test]
fn test_observer_sees_every_row_once() {
    let sink = CountingSink::new(9, 30);
    let seen: Mutex<Vec<RowProgress>> = Mutex::new(Vec::new());
    let observer = |p: RowProgress| seen.lock().unwrap().push(p);

    Engine::new(&CoordSource, &sink)
        .unwrap()
        .with_workers(3)
        .unwrap()
        .with_observer(&observer)
        .run()
        .unwrap();

    let seen = seen.into_inner().unwrap();
    assert_eq!(seen.len(), 30);

    let rows: HashSet<i32> = seen.iter().map(|p| p.row).collect();
    assert_eq!(rows, (0..30).collect());

    let completed: HashSet<u32> = seen.iter().map(|p| p.completed).collect();
    assert_eq!(completed, (1..=30).collect());

    assert!(seen.iter().all(|p| p.total == 30 && p.worker < 3));
}

#[test]
fn test_single_worker_completes_rows_in_publish_order() {
    let sink = CountingSink::with_bounds(Bounds::new(0, 5, 3, 15));
    let rows: Mutex<Vec<i32>> = Mutex::new(Vec::new());
    let observer = |p: RowProgress| rows.lock().unwrap().push(p.row);

    Engine::new(&CoordSource, &sink)
        .unwrap()
        .with_workers(1)
        .unwrap()
        .with_observer(&observer)
        .run()
        .unwrap();

    assert_eq!(rows.into_inner().unwrap(), (5..15).collect::<Vec<_>>());
}
