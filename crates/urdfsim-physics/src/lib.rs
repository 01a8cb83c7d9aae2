#![warn(missing_docs)]

//! Physics world for URDF robots using Rapier3d.
//!
//! This crate loads a URDF description into a Rapier world and exposes the
//! small set of index-based queries a scripting layer needs on top of it.
//!
//! # Features
//!
//! - URDF links become rigid bodies carrying their declared inertia
//! - Revolute, continuous, prismatic, fixed and spherical joints with motors
//! - Collision shapes from URDF primitives and STL meshes
//! - Floor contacts with normal forces, and self-collision detection
//!
//! # Example
//!
//! ```ignore
//! use urdfsim_math::Pose;
//! use urdfsim_physics::{LoadOptions, PhysicsWorld};
//!
//! let mut world = PhysicsWorld::new([0.0, 0.0, -9.81]);
//! world.add_floor(0.8);
//! world.load_robot(path, &Pose::identity(), &LoadOptions::default())?;
//!
//! world.set_joint_position_target(0, 0.5)?;
//! world.step(0.005);
//! ```

mod colliders;
mod convert;
mod error;
mod joints;
mod mesh;
mod world;

pub use colliders::ColliderStrategy;
pub use error::{PhysicsError, Result};
pub use joints::{JointKind, MotorParams};
pub use mesh::{load_stl, TriangleMesh};
pub use world::{Contact, JointInfo, JointState, LinkIndex, LoadOptions, PhysicsWorld};
