//! Capabilities consumed by the engine: where colors come from and where
//! they go.

use std::convert::Infallible;

use raster_common::{Bounds, Rgba};

/// Maps pixel coordinates to a color.
///
/// Must be a pure function of `(x, y)`. Workers call it concurrently for
/// different coordinates, exactly once per pixel.
pub trait PixelSource: Sync {
    fn color_at(&self, x: i32, y: i32) -> Rgba;
}

impl<F> PixelSource for F
where
    F: Fn(i32, i32) -> Rgba + Sync,
{
    fn color_at(&self, x: i32, y: i32) -> Rgba {
        self(x, y)
    }
}

/// A pixel source whose computation can fail.
///
/// A failure is fatal to the whole render pass; see [`crate::Engine::run`].
/// Every [`PixelSource`] is a fallible source that never fails.
pub trait FalliblePixelSource: Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn try_color_at(&self, x: i32, y: i32) -> Result<Rgba, Self::Error>;
}

impl<T> FalliblePixelSource for T
where
    T: PixelSource + ?Sized,
{
    type Error = Infallible;

    #[inline]
    fn try_color_at(&self, x: i32, y: i32) -> Result<Rgba, Infallible> {
        Ok(self.color_at(x, y))
    }
}

/// Receives rendered pixels.
///
/// `write` takes `&self` because every worker writes through the same sink.
/// Implementations must tolerate concurrent writes to distinct coordinates;
/// the engine never writes the same coordinate twice.
pub trait PixelSink: Sync {
    /// Drawable area. Queried once when the engine is built.
    fn bounds(&self) -> Bounds;

    fn write(&self, x: i32, y: i32, color: Rgba);
}
