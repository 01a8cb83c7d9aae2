//! Conversions between URDF origins, Rapier isometries and engine poses.

use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};
use urdfsim_math::Pose;

/// URDF `<origin xyz rpy>` as an isometry. URDF rpy is fixed-axis X-Y-Z,
/// which is what nalgebra's Euler constructor expects.
pub fn origin_to_isometry(origin: &urdf_rs::Pose) -> Isometry3<f32> {
    Isometry3::from_parts(
        Translation3::new(
            origin.xyz[0] as f32,
            origin.xyz[1] as f32,
            origin.xyz[2] as f32,
        ),
        UnitQuaternion::from_euler_angles(
            origin.rpy[0] as f32,
            origin.rpy[1] as f32,
            origin.rpy[2] as f32,
        ),
    )
}

/// URDF vector as a Rapier vector.
pub fn urdf_vec(v: &urdf_rs::Vec3) -> Vector3<f32> {
    Vector3::new(v[0] as f32, v[1] as f32, v[2] as f32)
}

/// Rapier isometry to an engine pose.
pub fn isometry_to_pose(iso: &Isometry3<f32>) -> Pose {
    Pose::from_isometry(&iso.cast::<f64>())
}

/// Engine pose to a Rapier isometry.
pub fn pose_to_isometry(pose: &Pose) -> Isometry3<f32> {
    pose.to_isometry().cast::<f32>()
}
