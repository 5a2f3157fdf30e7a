//! Shared test utilities for the raster-engine workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Instrumented sinks that count writes per pixel
//! - Deterministic and failing pixel sources
//! - Fixtures for the reference gradient scenario
//! - Scratch directories for encoder output
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Only use it from integration tests (`tests/`): unit tests inside
//! `raster-engine` compile a separate copy of the crate whose traits do not
//! match the ones implemented here.

pub mod fixtures;
pub mod paths;
pub mod sinks;
pub mod sources;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use paths::*;
pub use sinks::*;
pub use sources::*;

/// Assert that every pixel of a [`CountingSink`] was written exactly once.
///
/// On failure, reports the first offending coordinate and its count.
#[macro_export]
macro_rules! assert_written_once {
    ($sink:expr) => {{
        let sink = &$sink;
        if let Some((x, y, count)) = sink.first_miscount(1) {
            panic!(
                "pixel ({}, {}) was written {} times, expected exactly once",
                x, y, count
            );
        }
    }};
}
