//! Common types shared by the raster engine, its encoders and services.

pub mod bounds;
pub mod color;
pub mod error;

pub use bounds::Bounds;
pub use color::Rgba;
pub use error::{RenderError, RenderResult};
