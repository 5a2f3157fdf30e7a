//! Linear RGB gradient source.

use raster_common::{Bounds, Rgba};

use crate::source::PixelSource;

/// Red ramps left to right, green top to bottom, blue is the inverse of red.
///
/// ```text
/// r = x * 255 / width
/// g = y * 255 / height
/// b = 255 - r
/// a = 255
/// ```
///
/// Integer arithmetic, truncating. Coordinates are taken relative to the
/// gradient's origin, so a gradient built with [`Gradient::for_bounds`]
/// covers the bounds exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gradient {
    origin_x: i32,
    origin_y: i32,
    width: u32,
    height: u32,
}

impl Gradient {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            origin_x: 0,
            origin_y: 0,
            width,
            height,
        }
    }

    /// Gradient spanning `bounds`. Empty bounds give a zero-sized gradient.
    pub fn for_bounds(bounds: Bounds) -> Self {
        let (width, height) = if bounds.is_empty() {
            (0, 0)
        } else {
            (bounds.width() as u32, bounds.height() as u32)
        };
        Self {
            origin_x: bounds.min_x,
            origin_y: bounds.min_y,
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

/// `offset * 255 / extent`, clamped to a channel value.
#[inline]
fn ramp(offset: i64, extent: u32) -> u8 {
    if extent == 0 {
        return 0;
    }
    (offset * 255 / extent as i64).clamp(0, 255) as u8
}

impl PixelSource for Gradient {
    fn color_at(&self, x: i32, y: i32) -> Rgba {
        let r = ramp(x as i64 - self.origin_x as i64, self.width);
        let g = ramp(y as i64 - self.origin_y as i64, self.height);
        Rgba::opaque(r, g, 255 - r)
    }
}
