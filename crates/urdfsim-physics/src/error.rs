//! Error types for the physics world.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while building or querying the physics world.
#[derive(Error, Debug)]
pub enum PhysicsError {
    /// A file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// URDF parsing failed.
    #[error("Failed to parse URDF: {0}")]
    Urdf(#[from] urdf_rs::UrdfError),

    /// The robot description declares no links.
    #[error("Robot description has no links")]
    NoLinks,

    /// The description holds links that are not reachable from the base.
    #[error("Link '{link}' is not connected to base link '{base}'")]
    MultipleRoots {
        /// Base link that was picked.
        base: String,
        /// First link outside the base's tree.
        link: String,
    },

    /// A joint references a link that does not exist.
    #[error("Link not found: {0}")]
    MissingLink(String),

    /// Joint index out of range.
    #[error("Joint index {index} out of range ({count} joints)")]
    JointIndex {
        /// Requested index.
        index: usize,
        /// Number of joints in the robot.
        count: usize,
    },

    /// The world already holds a robot.
    #[error("A robot is already loaded")]
    RobotAlreadyLoaded,

    /// No robot has been loaded into the world.
    #[error("No robot loaded")]
    NoRobot,

    /// Failed to create collision shape.
    #[error("Failed to create collision shape for {name}: {reason}")]
    CollisionShape {
        /// Link name.
        name: String,
        /// Reason for failure.
        reason: String,
    },

    /// A mesh file could not be decoded.
    #[error("Invalid mesh {path}: {reason}")]
    Mesh {
        /// Mesh path.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },
}

/// Result type for physics operations.
pub type Result<T> = std::result::Result<T, PhysicsError>;
