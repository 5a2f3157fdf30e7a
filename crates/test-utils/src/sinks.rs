//! Instrumented pixel sinks.

use std::sync::atomic::{AtomicU32, Ordering};

use raster_common::{Bounds, Rgba};
use raster_engine::{PixelSink, RgbaBuffer};

/// Sink that stores colors and counts how often each pixel was written.
///
/// Writes outside the bounds are counted separately instead of being
/// dropped silently.
pub struct CountingSink {
    buffer: RgbaBuffer,
    counts: Box<[AtomicU32]>,
    out_of_bounds: AtomicU32,
}

impl CountingSink {
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_bounds(Bounds::from_size(width, height))
    }

    pub fn with_bounds(bounds: Bounds) -> Self {
        let buffer = RgbaBuffer::with_bounds(bounds);
        let counts = (0..buffer.len()).map(|_| AtomicU32::new(0)).collect();
        Self {
            buffer,
            counts,
            out_of_bounds: AtomicU32::new(0),
        }
    }

    pub fn buffer(&self) -> &RgbaBuffer {
        &self.buffer
    }

    /// Times `(x, y)` was written, `None` outside the bounds.
    pub fn count(&self, x: i32, y: i32) -> Option<u32> {
        self.buffer
            .bounds()
            .index_of(x, y)
            .map(|idx| self.counts[idx].load(Ordering::SeqCst))
    }

    pub fn get(&self, x: i32, y: i32) -> Option<Rgba> {
        self.buffer.get(x, y)
    }

    /// Sum of all in-bounds writes.
    pub fn total_writes(&self) -> u64 {
        self.counts
            .iter()
            .map(|c| c.load(Ordering::SeqCst) as u64)
            .sum()
    }

    pub fn out_of_bounds_writes(&self) -> u32 {
        self.out_of_bounds.load(Ordering::SeqCst)
    }

    /// Pixels written at least once.
    pub fn written_pixels(&self) -> usize {
        self.counts
            .iter()
            .filter(|c| c.load(Ordering::SeqCst) > 0)
            .count()
    }

    /// Rows (relative offsets) in which every pixel was written.
    pub fn complete_rows(&self) -> Vec<usize> {
        let width = self.buffer.width();
        if width == 0 {
            return Vec::new();
        }
        self.counts
            .chunks(width)
            .enumerate()
            .filter(|(_, row)| row.iter().all(|c| c.load(Ordering::SeqCst) > 0))
            .map(|(offset, _)| offset)
            .collect()
    }

    /// First pixel whose write count differs from `expected`.
    pub fn first_miscount(&self, expected: u32) -> Option<(i32, i32, u32)> {
        let bounds = self.buffer.bounds();
        let width = self.buffer.width();
        if self.out_of_bounds_writes() > 0 {
            return Some((bounds.max_x, bounds.max_y, self.out_of_bounds_writes()));
        }
        self.counts.iter().enumerate().find_map(|(idx, c)| {
            let count = c.load(Ordering::SeqCst);
            (count != expected).then(|| {
                (
                    bounds.min_x + (idx % width) as i32,
                    bounds.min_y + (idx / width) as i32,
                    count,
                )
            })
        })
    }
}

impl PixelSink for CountingSink {
    fn bounds(&self) -> Bounds {
        self.buffer.bounds()
    }

    fn write(&self, x: i32, y: i32, color: Rgba) {
        match self.buffer.bounds().index_of(x, y) {
            Some(idx) => {
                self.counts[idx].fetch_add(1, Ordering::SeqCst);
                self.buffer.set(x, y, color);
            }
            None => {
                self.out_of_bounds.fetch_add(1, Ordering::SeqCst);
            }
        }
    }
}

/// Sink that reports fixed bounds and discards every write.
///
/// Useful for geometry edge cases where no buffer can be allocated.
pub struct NullSink {
    bounds: Bounds,
    writes: AtomicU32,
}

impl NullSink {
    pub fn new(bounds: Bounds) -> Self {
        Self {
            bounds,
            writes: AtomicU32::new(0),
        }
    }

    pub fn writes(&self) -> u32 {
        self.writes.load(Ordering::SeqCst)
    }
}

impl PixelSink for NullSink {
    fn bounds(&self) -> Bounds {
        self.bounds
    }

    fn write(&self, _x: i32, _y: i32, _color: Rgba) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_each_write() {
        let sink = CountingSink::new(2, 2);
        sink.write(0, 0, Rgba::WHITE);
        sink.write(0, 0, Rgba::BLACK);
        sink.write(1, 1, Rgba::WHITE);
        assert_eq!(sink.count(0, 0), Some(2));
        assert_eq!(sink.count(1, 1), Some(1));
        assert_eq!(sink.count(1, 0), Some(0));
        assert_eq!(sink.get(0, 0), Some(Rgba::BLACK));
        assert_eq!(sink.total_writes(), 3);
        assert_eq!(sink.written_pixels(), 2);
        assert_eq!(sink.first_miscount(1), Some((0, 0, 2)));
    }

    #[test]
    fn test_out_of_bounds_writes_are_tracked() {
        let sink = CountingSink::new(1, 1);
        sink.write(3, 3, Rgba::WHITE);
        assert_eq!(sink.out_of_bounds_writes(), 1);
        assert_eq!(sink.total_writes(), 0);
        assert!(sink.first_miscount(0).is_some());
    }

    #[test]
    fn test_complete_rows() {
        let sink = CountingSink::new(2, 3);
        sink.write(0, 1, Rgba::WHITE);
        sink.write(1, 1, Rgba::WHITE);
        sink.write(0, 2, Rgba::WHITE);
        assert_eq!(sink.complete_rows(), vec![1]);
    }
}
