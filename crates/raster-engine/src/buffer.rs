//! In-memory RGBA pixel buffer usable as a concurrent [`PixelSink`].
//!
//! Pixels are stored packed (`r | g << 8 | b << 16 | a << 24`) in atomic
//! words. Every write is a single relaxed store, so workers writing distinct
//! coordinates never interfere and no lock is taken on the hot path. The
//! engine's barrier (joining the workers) orders all writes before any read
//! made after `run` returns.

use std::sync::atomic::{AtomicU32, Ordering};

use raster_common::{Bounds, Rgba};
use tracing::warn;

use crate::source::PixelSink;

/// Fixed-size RGBA image, initially transparent black.
pub struct RgbaBuffer {
    bounds: Bounds,
    pixels: Box<[AtomicU32]>,
}

impl RgbaBuffer {
    /// Zero-origin buffer of `width x height` pixels.
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_bounds(Bounds::from_size(width, height))
    }

    /// Buffer covering `bounds`. Inverted bounds produce an empty buffer that
    /// still reports them, so the engine can reject it.
    pub fn with_bounds(bounds: Bounds) -> Self {
        let len = bounds.area() as usize;
        let pixels = (0..len).map(|_| AtomicU32::new(0)).collect();
        Self { bounds, pixels }
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Width in pixels (0 when empty).
    pub fn width(&self) -> usize {
        if self.bounds.is_empty() {
            0
        } else {
            self.bounds.width() as usize
        }
    }

    /// Height in pixels (0 when empty).
    pub fn height(&self) -> usize {
        if self.bounds.is_empty() {
            0
        } else {
            self.bounds.height() as usize
        }
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Color at `(x, y)`, or `None` outside the bounds.
    pub fn get(&self, x: i32, y: i32) -> Option<Rgba> {
        self.bounds
            .index_of(x, y)
            .map(|idx| Rgba::unpack(self.pixels[idx].load(Ordering::Relaxed)))
    }

    /// Store `color` at `(x, y)`. Returns `false` outside the bounds.
    pub fn set(&self, x: i32, y: i32, color: Rgba) -> bool {
        match self.bounds.index_of(x, y) {
            Some(idx) => {
                self.pixels[idx].store(color.pack(), Ordering::Relaxed);
                true
            }
            None => false,
        }
    }

    /// Fill every pixel with `color`.
    pub fn fill(&self, color: Rgba) {
        let packed = color.pack();
        for px in self.pixels.iter() {
            px.store(packed, Ordering::Relaxed);
        }
    }

    /// Row-major RGBA bytes (4 per pixel), ready for an encoder.
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 4);
        for px in self.pixels.iter() {
            out.extend_from_slice(&px.load(Ordering::Relaxed).to_le_bytes());
        }
        out
    }

    /// Consume the buffer into row-major RGBA bytes.
    pub fn into_rgba_bytes(self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 4);
        for px in self.pixels.into_vec() {
            out.extend_from_slice(&px.into_inner().to_le_bytes());
        }
        out
    }

    /// Copy of one row (relative offset from the top), or `None` past the end.
    pub fn row(&self, offset: usize) -> Option<Vec<Rgba>> {
        let width = self.width();
        if offset >= self.height() {
            return None;
        }
        let start = offset * width;
        Some(
            self.pixels[start..start + width]
                .iter()
                .map(|px| Rgba::unpack(px.load(Ordering::Relaxed)))
                .collect(),
        )
    }
}

impl std::fmt::Debug for RgbaBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RgbaBuffer")
            .field("bounds", &self.bounds)
            .field("pixels", &self.pixels.len())
            .finish()
    }
}

impl PixelSink for RgbaBuffer {
    fn bounds(&self) -> Bounds {
        self.bounds
    }

    fn write(&self, x: i32, y: i32, color: Rgba) {
        if !self.set(x, y, color) {
            warn!(x, y, bounds = %self.bounds, "Ignoring write outside buffer bounds");
        }
    }
}
