//! Error types for the raster engine and its collaborators.

use std::path::PathBuf;

use thiserror::Error;

use crate::Bounds;

/// Result type alias using RenderError.
pub type RenderResult<T> = Result<T, RenderError>;

/// Primary error type for render passes and encoding.
#[derive(Debug, Error)]
pub enum RenderError {
    // === Configuration Errors ===
    #[error("Invalid sink bounds {bounds}: width and height must not be negative")]
    InvalidBounds { bounds: Bounds },

    #[error("Invalid worker count: {0} (must be at least 1)")]
    InvalidWorkerCount(String),

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    // === Render Errors ===
    #[error("Pixel computation failed at ({x}, {y}): {source}")]
    Compute {
        x: i32,
        y: i32,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to spawn render worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    // === Encoder Errors ===
    #[error("Encoding failed: {0}")]
    Encode(String),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RenderError {
    /// True for errors detected before any work starts.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            RenderError::InvalidBounds { .. }
                | RenderError::InvalidWorkerCount(_)
                | RenderError::InvalidParameter { .. }
        )
    }

    /// Short machine-readable code, used in structured logs.
    pub fn code(&self) -> &'static str {
        match self {
            RenderError::InvalidBounds { .. } => "invalid_bounds",
            RenderError::InvalidWorkerCount(_) => "invalid_worker_count",
            RenderError::InvalidParameter { .. } => "invalid_parameter",
            RenderError::Compute { .. } => "compute_failure",
            RenderError::WorkerSpawn(_) => "worker_spawn",
            RenderError::Encode(_) => "encode_failure",
            RenderError::Io { .. } => "io_failure",
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RenderError::Io {
            path: path.into(),
            source,
        }
    }
}
