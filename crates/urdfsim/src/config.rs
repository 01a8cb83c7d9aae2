//! Simulation settings, loadable from TOML.
//!
//! Every field has a default, so a config file only needs to name what it
//! changes:
//!
//! ```toml
//! fixed = true
//! real_time = false
//!
//! [floor_friction]
//! lateral = 1.0
//!
//! [motor]
//! stiffness = 500.0
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use urdfsim_physics::{ColliderStrategy, MotorParams};

use crate::error::{Result, SimError};

/// Friction coefficients applied to the floor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloorFriction {
    /// Sliding friction.
    pub lateral: f64,
    /// Friction against spinning about the contact normal.
    pub spinning: f64,
    /// Friction against rolling.
    pub rolling: f64,
}

impl Default for FloorFriction {
    fn default() -> Self {
        Self {
            lateral: 0.8,
            spinning: 0.1,
            rolling: 0.1,
        }
    }
}

/// Base orientation used by [`Simulation::reset`](crate::Simulation::reset).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// Upright.
    #[default]
    Straight,
    /// Lying on the front (pitch `+pi/2`).
    Front,
    /// Lying on the back (pitch `-pi/2`).
    Back,
}

impl Orientation {
    /// Base pitch for this orientation (rad).
    pub fn pitch(&self) -> f64 {
        match self {
            Orientation::Straight => 0.0,
            Orientation::Front => std::f64::consts::FRAC_PI_2,
            Orientation::Back => -std::f64::consts::FRAC_PI_2,
        }
    }
}

/// Settings for a [`Simulation`](crate::Simulation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Add a ground plane.
    pub floor: bool,
    /// Pin the robot base in place.
    pub fixed: bool,
    /// Draw the robot translucent.
    pub transparent: bool,
    /// Sleep so simulated time keeps pace with wall-clock time.
    pub real_time: bool,
    /// Show the viewer's side panels.
    pub panels: bool,
    /// Fixed time step (s).
    pub dt: f64,
    /// Gravity vector (m/s^2).
    pub gravity: [f64; 3],
    /// Base height when the robot is loaded (m).
    pub start_height: f64,
    /// Floor friction coefficients.
    pub floor_friction: FloorFriction,
    /// Joint motor gains.
    pub motor: MotorParams,
    /// Collision shape strategy for mesh geometry.
    pub collider: ColliderStrategy,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            floor: true,
            fixed: false,
            transparent: false,
            real_time: true,
            panels: false,
            dt: 0.005,
            gravity: [0.0, 0.0, -9.81],
            start_height: 1.0,
            floor_friction: FloorFriction::default(),
            motor: MotorParams::default(),
            collider: ColliderStrategy::default(),
        }
    }
}

impl SimulationConfig {
    /// Parse a TOML document. Missing fields keep their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Read and parse a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let s = std::fs::read_to_string(path).map_err(|source| SimError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&s)
    }
}
