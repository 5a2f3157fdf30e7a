//! Pixel sources for tests.
//!
//! These sources produce predictable, verifiable colors so a test can check
//! every pixel of a render against its coordinates.

use std::fmt;

use raster_common::Rgba;
use raster_engine::{FalliblePixelSource, PixelSource};

/// Encodes the coordinates into the color.
///
/// `r`/`g` hold the low bytes of `x`/`y`, `b` holds their high bytes mixed,
/// and `a` is always 255. Distinct coordinates inside a 256x256 area never
/// share a color.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoordSource;

impl CoordSource {
    pub fn expected(x: i32, y: i32) -> Rgba {
        let b = ((x >> 8) as u8).wrapping_mul(31) ^ ((y >> 8) as u8);
        Rgba::new(x as u8, y as u8, b, 255)
    }
}

impl PixelSource for CoordSource {
    fn color_at(&self, x: i32, y: i32) -> Rgba {
        Self::expected(x, y)
    }
}

/// Error returned by [`FailingSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFailure {
    pub x: i32,
    pub y: i32,
}

impl fmt::Display for SourceFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "synthetic failure at ({}, {})", self.x, self.y)
    }
}

impl std::error::Error for SourceFailure {}

/// Behaves like [`CoordSource`] except at one coordinate, where it fails.
#[derive(Debug, Clone, Copy)]
pub struct FailingSource {
    pub fail_x: i32,
    pub fail_y: i32,
}

impl FailingSource {
    pub fn at(fail_x: i32, fail_y: i32) -> Self {
        Self { fail_x, fail_y }
    }
}

impl FalliblePixelSource for FailingSource {
    type Error = SourceFailure;

    fn try_color_at(&self, x: i32, y: i32) -> Result<Rgba, SourceFailure> {
        if x == self.fail_x && y == self.fail_y {
            Err(SourceFailure { x, y })
        } else {
            Ok(CoordSource::expected(x, y))
        }
    }
}

/// Panics at one coordinate. Used to check that worker panics abort the
/// pass and reach the caller.
#[derive(Debug, Clone, Copy)]
pub struct PanickingSource {
    pub panic_x: i32,
    pub panic_y: i32,
}

impl PixelSource for PanickingSource {
    fn color_at(&self, x: i32, y: i32) -> Rgba {
        if x == self.panic_x && y == self.panic_y {
            panic!("synthetic panic at ({}, {})", x, y);
        }
        CoordSource::expected(x, y)
    }
}
