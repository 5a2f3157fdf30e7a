//! Parallel row-based raster rendering.
//!
//! An [`Engine`] pulls colors from a [`PixelSource`] and pushes them into a
//! [`PixelSink`], one row at a time, on a fixed pool of worker threads:
//! - Rows are published in ascending order on a shared [`RowQueue`]
//! - Each worker claims a row, renders every pixel of it, then claims the next
//! - The calling thread blocks until every worker has exited
//!
//! The filled sink can then be handed to an encoder such as [`png::save_png`].

pub mod buffer;
pub mod engine;
pub mod gradient;
pub mod observer;
pub mod png;
pub mod queue;
pub mod source;

pub use buffer::RgbaBuffer;
pub use engine::{Engine, RenderStats};
pub use gradient::Gradient;
pub use observer::{RowObserver, RowProgress};
pub use png::{encode_png, encode_png_auto, save_png, PngMode};
pub use queue::RowQueue;
pub use source::{FalliblePixelSource, PixelSink, PixelSource};

pub use raster_common::{Bounds, RenderError, RenderResult, Rgba};
