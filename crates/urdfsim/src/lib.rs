#![warn(missing_docs)]

//! Scripting layer for URDF robots in a Rapier simulation.
//!
//! [`Simulation`] loads a robot, indexes its joints and frames by name,
//! and exposes pose queries, joint control, contact readout and a
//! fixed-step tick loop.
//!
//! Joint names carry meaning: names containing `_fixing` are welds and
//! are ignored, names containing `_frame` are reference frames, and every
//! other joint is a controllable DOF.
//!
//! # Example
//!
//! ```ignore
//! use std::collections::HashMap;
//! use urdfsim::{Simulation, SimulationConfig};
//!
//! let mut sim = Simulation::new("robot/robot.urdf", SimulationConfig::default())?;
//! sim.set_joints(&HashMap::from([("left_knee".to_string(), 0.5)]))?;
//! sim.run_for(200);
//!
//! let camera_to_trunk = sim.transformation("camera_frame", "origin")?;
//! ```

mod config;
mod debug_lines;
mod error;
mod registry;
mod simulation;
mod viewer;

pub use config::{FloorFriction, Orientation, SimulationConfig};
pub use debug_lines::{DebugLines, DrawnLine, DEFAULT_DURATION, PALETTE};
pub use error::{Result, SimError};
pub use registry::{JointRole, Registry};
pub use simulation::{Simulation, ORIGIN_FRAME};
pub use viewer::{Camera, LogViewer, Viewer, ViewerOptions};

pub use urdfsim_math::{matrix_to_pose, pose_to_matrix, Pose, Transform};
pub use urdfsim_physics::{
    ColliderStrategy, Contact, JointInfo, JointKind, JointState, MotorParams, PhysicsError,
};
