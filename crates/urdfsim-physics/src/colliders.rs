//! Collision shape generation from URDF geometry.

use std::f32::consts::FRAC_PI_2;
use std::path::Path;

use nalgebra::{Isometry3, Point3, UnitQuaternion, Vector3};
use parry3d::shape::{ConvexPolyhedron, SharedShape, TriMesh};
use serde::{Deserialize, Serialize};
use tracing::warn;
use urdf_rs::Geometry;

use crate::convert::origin_to_isometry;
use crate::error::PhysicsError;
use crate::mesh::{load_stl, resolve_mesh_path, TriangleMesh};

/// Strategy for turning mesh geometry into collision shapes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColliderStrategy {
    /// Use convex hull (fast, approximate).
    #[default]
    ConvexHull,
    /// Use triangle mesh (accurate, slower).
    TriMesh,
    /// Use axis-aligned bounding box (fastest, rough).
    Aabb,
}

/// Build the collision shape for one URDF `<collision>` element.
///
/// Returns the shape and its pose relative to the link frame, or `None`
/// when the geometry is skipped (unreadable mesh).
pub fn geometry_to_shape(
    geometry: &Geometry,
    origin: &urdf_rs::Pose,
    base_dir: &Path,
    strategy: ColliderStrategy,
    link_name: &str,
) -> Result<Option<(SharedShape, Isometry3<f32>)>, PhysicsError> {
    let offset = origin_to_isometry(origin);

    // Rapier cylinders are Y-aligned, URDF cylinders are Z-aligned
    let y_to_z = Isometry3::from_parts(
        Vector3::zeros().into(),
        UnitQuaternion::from_axis_angle(&Vector3::x_axis(), FRAC_PI_2),
    );

    let shape = match geometry {
        Geometry::Box { size } => (
            SharedShape::cuboid(
                size[0] as f32 / 2.0,
                size[1] as f32 / 2.0,
                size[2] as f32 / 2.0,
            ),
            offset,
        ),
        Geometry::Cylinder { radius, length } => (
            SharedShape::cylinder(*length as f32 / 2.0, *radius as f32),
            offset * y_to_z,
        ),
        Geometry::Capsule { radius, length } => (
            SharedShape::capsule_z(*length as f32 / 2.0, *radius as f32),
            offset,
        ),
        Geometry::Sphere { radius } => (SharedShape::ball(*radius as f32), offset),
        Geometry::Mesh { filename, scale } => {
            let path = resolve_mesh_path(filename, base_dir);
            let mut mesh = match load_stl(&path) {
                Ok(mesh) => mesh,
                Err(e) => {
                    warn!("Skipping collision mesh for link '{}': {}", link_name, e);
                    return Ok(None);
                }
            };
            if let Some(s) = scale {
                mesh.scale([s[0] as f32, s[1] as f32, s[2] as f32]);
            }
            (mesh_to_collider(&mesh, strategy, link_name)?, offset)
        }
    };

    Ok(Some(shape))
}

/// Generate a collision shape from a triangle mesh.
///
/// # Arguments
///
/// * `mesh` - The triangle mesh to convert (meters)
/// * `strategy` - The collision shape strategy to use
/// * `name` - Name for error messages
pub fn mesh_to_collider(
    mesh: &TriangleMesh,
    strategy: ColliderStrategy,
    name: &str,
) -> Result<SharedShape, PhysicsError> {
    if mesh.vertices.is_empty() || mesh.indices.is_empty() {
        return Err(PhysicsError::CollisionShape {
            name: name.to_string(),
            reason: "Empty mesh".to_string(),
        });
    }

    match strategy {
        ColliderStrategy::ConvexHull => create_convex_hull(mesh, name),
        ColliderStrategy::TriMesh => create_trimesh(mesh, name),
        ColliderStrategy::Aabb => Ok(create_aabb(mesh)),
    }
}

fn mesh_points(mesh: &TriangleMesh) -> Vec<Point3<f32>> {
    mesh.vertices
        .chunks_exact(3)
        .map(|v| Point3::new(v[0], v[1], v[2]))
        .collect()
}

fn create_convex_hull(mesh: &TriangleMesh, name: &str) -> Result<SharedShape, PhysicsError> {
    let points = mesh_points(mesh);

    if points.len() < 4 {
        return Err(PhysicsError::CollisionShape {
            name: name.to_string(),
            reason: "Need at least 4 points for convex hull".to_string(),
        });
    }

    match ConvexPolyhedron::from_convex_hull(&points) {
        Some(hull) => Ok(SharedShape::new(hull)),
        // Degenerate (flat) geometry
        None => Ok(create_aabb(mesh)),
    }
}

fn create_trimesh(mesh: &TriangleMesh, name: &str) -> Result<SharedShape, PhysicsError> {
    let vertices = mesh_points(mesh);
    let indices: Vec<[u32; 3]> = mesh
        .indices
        .chunks_exact(3)
        .map(|i| [i[0], i[1], i[2]])
        .collect();

    if let Some(bad) = indices.iter().flatten().find(|i| **i as usize >= vertices.len()) {
        return Err(PhysicsError::CollisionShape {
            name: name.to_string(),
            reason: format!("Index {} out of range for {} vertices", bad, vertices.len()),
        });
    }

    match TriMesh::new(vertices, indices) {
        Ok(trimesh) => Ok(SharedShape::new(trimesh)),
        Err(e) => Err(PhysicsError::CollisionShape {
            name: name.to_string(),
            reason: format!("Failed to create trimesh: {:?}", e),
        }),
    }
}

/// Box around the mesh. The box is centered at the mesh's bounds center,
/// so it comes back as a compound with a single offset part.
fn create_aabb(mesh: &TriangleMesh) -> SharedShape {
    let mut min = Vector3::repeat(f32::INFINITY);
    let mut max = Vector3::repeat(f32::NEG_INFINITY);

    for v in mesh.vertices.chunks_exact(3) {
        let p = Vector3::new(v[0], v[1], v[2]);
        min = min.inf(&p);
        max = max.sup(&p);
    }

    let half_extents = (max - min) / 2.0;
    let center = (max + min) / 2.0;
    let cuboid = SharedShape::cuboid(
        half_extents.x.max(1e-4),
        half_extents.y.max(1e-4),
        half_extents.z.max(1e-4),
    );

    SharedShape::compound(vec![(Isometry3::translation(center.x, center.y, center.z), cuboid)])
}
