#![warn(missing_docs)]

//! Math types for urdfsim.
//!
//! Physics engines hand poses around as a position plus a quaternion
//! stored scalar-last (`[x, y, z, w]`), while nalgebra builds quaternions
//! scalar-first. Everything in this crate goes through [`Pose`] so the
//! reordering happens in exactly one place.

use nalgebra::{Isometry3, Matrix3, Matrix4, Quaternion, Rotation3, Translation3, UnitQuaternion};
use serde::{Deserialize, Serialize};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = nalgebra::Vector3<f64>;

/// Position plus orientation in the engine's convention.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Position in meters.
    pub position: [f64; 3],
    /// Unit quaternion, scalar last: `[x, y, z, w]`.
    pub orientation: [f64; 4],
}

impl Pose {
    /// The identity pose.
    pub fn identity() -> Self {
        Self {
            position: [0.0; 3],
            orientation: [0.0, 0.0, 0.0, 1.0],
        }
    }

    /// Build a pose from a position and an engine-order quaternion.
    ///
    /// The quaternion is normalized on the way in.
    pub fn from_xyzw(position: [f64; 3], orientation: [f64; 4]) -> Self {
        let q = xyzw_to_unit(orientation);
        Self {
            position,
            orientation: unit_to_xyzw(&q),
        }
    }

    /// Build a pose from a position and `[roll, pitch, yaw]` in radians.
    pub fn from_euler(position: [f64; 3], rpy: [f64; 3]) -> Self {
        Self {
            position,
            orientation: quaternion_from_euler(rpy),
        }
    }

    /// Position and engine-order quaternion.
    pub fn to_xyzw(&self) -> ([f64; 3], [f64; 4]) {
        (self.position, self.orientation)
    }

    /// Orientation as `[roll, pitch, yaw]` in radians.
    pub fn euler(&self) -> [f64; 3] {
        euler_from_quaternion(self.orientation)
    }

    /// Orientation as a nalgebra unit quaternion.
    pub fn rotation(&self) -> UnitQuaternion<f64> {
        xyzw_to_unit(self.orientation)
    }

    /// Position as a vector.
    pub fn translation(&self) -> Vec3 {
        Vec3::from(self.position)
    }

    /// Convert to a rigid isometry.
    pub fn to_isometry(&self) -> Isometry3<f64> {
        Isometry3::from_parts(Translation3::from(self.translation()), self.rotation())
    }

    /// Convert from a rigid isometry.
    pub fn from_isometry(iso: &Isometry3<f64>) -> Self {
        let t = iso.translation.vector;
        Self {
            position: [t.x, t.y, t.z],
            orientation: unit_to_xyzw(&iso.rotation),
        }
    }

    /// 4x4 homogeneous matrix: rotation block from the quaternion,
    /// translation in the last column.
    pub fn to_matrix(&self) -> Matrix4<f64> {
        let rotation = self.rotation().to_rotation_matrix();
        let mut m = Matrix4::identity();
        m.fixed_view_mut::<3, 3>(0, 0).copy_from(rotation.matrix());
        m[(0, 3)] = self.position[0];
        m[(1, 3)] = self.position[1];
        m[(2, 3)] = self.position[2];
        m
    }

    /// Inverse of [`Pose::to_matrix`].
    ///
    /// The rotation block is projected onto the nearest rotation, so a
    /// slightly drifted matrix still yields a unit quaternion. The
    /// returned quaternion has a non-negative scalar part.
    pub fn from_matrix(matrix: &Matrix4<f64>) -> Self {
        let block: Matrix3<f64> = matrix.fixed_view::<3, 3>(0, 0).into_owned();
        let rotation = Rotation3::from_matrix(&block);
        let q = UnitQuaternion::from_rotation_matrix(&rotation);
        Self {
            position: [matrix[(0, 3)], matrix[(1, 3)], matrix[(2, 3)]],
            orientation: unit_to_xyzw(&q),
        }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

/// Converts an engine pose to a 4x4 transformation matrix.
pub fn pose_to_matrix(pose: &Pose) -> Matrix4<f64> {
    pose.to_matrix()
}

/// Converts a 4x4 transformation matrix to an engine pose.
pub fn matrix_to_pose(matrix: &Matrix4<f64>) -> Pose {
    Pose::from_matrix(matrix)
}

/// Engine-order `[x, y, z, w]` to a nalgebra unit quaternion.
pub fn xyzw_to_unit(q: [f64; 4]) -> UnitQuaternion<f64> {
    // nalgebra's constructor is scalar-first
    UnitQuaternion::from_quaternion(Quaternion::new(q[3], q[0], q[1], q[2]))
}

/// Nalgebra unit quaternion to engine-order `[x, y, z, w]`, scalar part
/// kept non-negative.
pub fn unit_to_xyzw(q: &UnitQuaternion<f64>) -> [f64; 4] {
    let sign = if q.w < 0.0 { -1.0 } else { 1.0 };
    [sign * q.i, sign * q.j, sign * q.k, sign * q.w]
}

/// `[roll, pitch, yaw]` (extrinsic X, Y, Z) to an engine-order quaternion.
pub fn quaternion_from_euler(rpy: [f64; 3]) -> [f64; 4] {
    unit_to_xyzw(&UnitQuaternion::from_euler_angles(rpy[0], rpy[1], rpy[2]))
}

/// Engine-order quaternion to `[roll, pitch, yaw]`.
pub fn euler_from_quaternion(q: [f64; 4]) -> [f64; 3] {
    let (roll, pitch, yaw) = xyzw_to_unit(q).euler_angles();
    [roll, pitch, yaw]
}

/// A rigid 4x4 transformation matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// The underlying 4x4 matrix.
    pub matrix: Matrix4<f64>,
}

impl Transform {
    /// Identity transform.
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Transform equivalent to `pose`.
    pub fn from_pose(pose: &Pose) -> Self {
        Self {
            matrix: pose.to_matrix(),
        }
    }

    /// Back to an engine pose.
    pub fn to_pose(&self) -> Pose {
        Pose::from_matrix(&self.matrix)
    }

    /// Compose: `self` then `other` (self * other).
    pub fn then(&self, other: &Transform) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }

    /// Rigid inverse: transposed rotation, rotated negated translation.
    pub fn inverse(&self) -> Self {
        let r_t = self.rotation().transpose();
        let t = -(r_t * self.translation());
        let mut m = Matrix4::identity();
        m.fixed_view_mut::<3, 3>(0, 0).copy_from(&r_t);
        m[(0, 3)] = t.x;
        m[(1, 3)] = t.y;
        m[(2, 3)] = t.z;
        Self { matrix: m }
    }

    /// Transform a point.
    pub fn apply_point(&self, p: &Point3) -> Point3 {
        self.matrix.transform_point(p)
    }

    /// The 3x3 rotation block.
    pub fn rotation(&self) -> Matrix3<f64> {
        self.matrix.fixed_view::<3, 3>(0, 0).into_owned()
    }

    /// The translation column.
    pub fn translation(&self) -> Vec3 {
        Vec3::new(self.matrix[(0, 3)], self.matrix[(1, 3)], self.matrix[(2, 3)])
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Transformation from frame A to frame B given both frames' world
/// transforms: `inverse(b_to_world) * a_to_world`.
pub fn relative_transform(a_to_world: &Matrix4<f64>, b_to_world: &Matrix4<f64>) -> Matrix4<f64> {
    let b = Transform {
        matrix: *b_to_world,
    };
    b.inverse().matrix * a_to_world
}
