//! Error types for the simulation layer.

use std::path::PathBuf;

use thiserror::Error;
use urdfsim_physics::PhysicsError;

/// Errors raised by [`Simulation`](crate::Simulation) operations.
#[derive(Error, Debug)]
pub enum SimError {
    /// The physics world rejected an operation.
    #[error(transparent)]
    Physics(#[from] PhysicsError),

    /// No controllable joint has this name.
    #[error("Can't find joint {0}")]
    JointNotFound(String),

    /// No frame has this name.
    #[error("Can't find frame {0}")]
    FrameNotFound(String),

    /// A configuration file could not be read.
    #[error("Failed to read config {path}: {source}")]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A configuration file could not be parsed.
    #[error("Invalid config: {0}")]
    Config(#[from] toml::de::Error),
}

/// Result type for simulation operations.
pub type Result<T> = std::result::Result<T, SimError>;
