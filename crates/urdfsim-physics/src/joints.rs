//! Joint conversion from URDF to Rapier, and joint coordinates.
//!
//! Every actuated joint is built so that its degree of freedom is the
//! local X axis of both joint frames. The frames are the URDF joint
//! origin followed by a rotation taking X onto the URDF axis, so at rest
//! both frames coincide and the joint coordinate reads zero.

use std::f32::consts::PI;

use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};
use rapier3d::dynamics::{GenericJoint, GenericJointBuilder, JointAxesMask, JointAxis, MotorModel};
use serde::{Deserialize, Serialize};

use crate::convert::{origin_to_isometry, urdf_vec};

/// Motor gains used for position and velocity control.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotorParams {
    /// Position gain.
    pub stiffness: f32,
    /// Velocity gain.
    pub damping: f32,
    /// Force/torque cap for joints whose URDF `effort` limit is zero.
    pub max_force: f32,
}

impl Default for MotorParams {
    fn default() -> Self {
        Self {
            stiffness: 1000.0,
            damping: 100.0,
            max_force: 1000.0,
        }
    }
}

/// Kind of a robot joint, as far as the simulation cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JointKind {
    /// Hinge with limits.
    Revolute,
    /// Hinge without limits.
    Continuous,
    /// Slider.
    Prismatic,
    /// Rigid weld (also used for planar joints).
    Fixed,
    /// Ball joint.
    Spherical,
    /// No constraint: the child link is free.
    Floating,
}

impl JointKind {
    /// Map a URDF joint type.
    pub fn from_urdf(joint_type: &urdf_rs::JointType) -> Self {
        match joint_type {
            urdf_rs::JointType::Revolute => JointKind::Revolute,
            urdf_rs::JointType::Continuous => JointKind::Continuous,
            urdf_rs::JointType::Prismatic => JointKind::Prismatic,
            urdf_rs::JointType::Fixed | urdf_rs::JointType::Planar => JointKind::Fixed,
            urdf_rs::JointType::Spherical => JointKind::Spherical,
            urdf_rs::JointType::Floating => JointKind::Floating,
        }
    }

    /// The free axis driven by motors, if the joint has exactly one.
    pub fn motor_axis(&self) -> Option<JointAxis> {
        match self {
            JointKind::Revolute | JointKind::Continuous => Some(JointAxis::AngX),
            JointKind::Prismatic => Some(JointAxis::LinX),
            JointKind::Fixed | JointKind::Spherical | JointKind::Floating => None,
        }
    }
}

/// Rotation taking the X axis onto `axis`.
fn axis_alignment(axis: &Vector3<f32>) -> UnitQuaternion<f32> {
    let axis = if axis.norm() > 1e-9 {
        axis.normalize()
    } else {
        Vector3::x()
    };
    UnitQuaternion::rotation_between(&Vector3::x(), &axis)
        .unwrap_or_else(|| UnitQuaternion::from_axis_angle(&Vector3::z_axis(), PI))
}

/// Create a Rapier joint from a URDF joint.
///
/// Returns `None` for floating joints, which leave the child free.
pub fn urdf_joint_to_rapier(
    joint: &urdf_rs::Joint,
    kind: JointKind,
    motor: &MotorParams,
) -> Option<GenericJoint> {
    let align = Isometry3::from_parts(Translation3::identity(), axis_alignment(&urdf_vec(&joint.axis.xyz)));
    let frame1 = origin_to_isometry(&joint.origin) * align;
    let frame2 = align;

    let mask = match kind {
        JointKind::Revolute | JointKind::Continuous => JointAxesMask::LOCKED_REVOLUTE_AXES,
        JointKind::Prismatic => JointAxesMask::LOCKED_PRISMATIC_AXES,
        JointKind::Fixed => JointAxesMask::LOCKED_FIXED_AXES,
        JointKind::Spherical => JointAxesMask::LOCKED_SPHERICAL_AXES,
        JointKind::Floating => return None,
    };

    let mut builder = GenericJointBuilder::new(mask)
        .local_frame1(frame1)
        .local_frame2(frame2)
        .contacts_enabled(false);

    if let Some(axis) = kind.motor_axis() {
        let limit = &joint.limit;
        if kind != JointKind::Continuous && limit.lower < limit.upper {
            builder = builder.limits(axis, [limit.lower as f32, limit.upper as f32]);
        }

        let max_force = if limit.effort > 0.0 {
            limit.effort as f32
        } else {
            motor.max_force
        };
        builder = builder
            .motor_model(axis, MotorModel::AccelerationBased)
            .motor_max_force(axis, max_force);
    }

    Some(builder.build())
}

/// Relative motion of the child joint frame for coordinate `q`.
pub fn joint_motion(kind: JointKind, q: f32) -> Isometry3<f32> {
    match kind {
        JointKind::Revolute | JointKind::Continuous => Isometry3::from_parts(
            Translation3::identity(),
            UnitQuaternion::from_axis_angle(&Vector3::x_axis(), q),
        ),
        JointKind::Prismatic => Isometry3::translation(q, 0.0, 0.0),
        JointKind::Fixed | JointKind::Spherical | JointKind::Floating => Isometry3::identity(),
    }
}

/// Joint coordinate measured from the two joint frames in world space.
///
/// Revolute angles come back wrapped to `[-pi, pi]`.
pub fn joint_coordinate(kind: JointKind, frame1: &Isometry3<f32>, frame2: &Isometry3<f32>) -> f32 {
    let rel = frame1.inv_mul(frame2);
    match kind {
        JointKind::Revolute | JointKind::Continuous => {
            let q = rel.rotation;
            wrap_angle(2.0 * q.i.atan2(q.w))
        }
        JointKind::Prismatic => rel.translation.vector.x,
        JointKind::Fixed | JointKind::Spherical | JointKind::Floating => 0.0,
    }
}

/// Joint rate from the two bodies' velocities, projected on the joint axis
/// expressed in world space.
pub fn joint_rate(
    kind: JointKind,
    frame1: &Isometry3<f32>,
    (linvel1, angvel1): (Vector3<f32>, Vector3<f32>),
    (linvel2, angvel2): (Vector3<f32>, Vector3<f32>),
) -> f32 {
    let axis = frame1.rotation * Vector3::x();
    match kind {
        JointKind::Revolute | JointKind::Continuous => (angvel2 - angvel1).dot(&axis),
        JointKind::Prismatic => (linvel2 - linvel1).dot(&axis),
        JointKind::Fixed | JointKind::Spherical | JointKind::Floating => 0.0,
    }
}

fn wrap_angle(a: f32) -> f32 {
    let two_pi = 2.0 * PI;
    let mut a = a % two_pi;
    if a > PI {
        a -= two_pi;
    } else if a < -PI {
        a += two_pi;
    }
    a
}
