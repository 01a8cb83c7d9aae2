//! Physics world management using Rapier3d.
//!
//! The world holds at most one robot, an optional floor and an optional
//! ball. Robot queries are index-based: joint `k` moves link
//! [`LinkIndex::Child(k)`], and the root link is [`LinkIndex::Base`].

use std::collections::{HashMap, VecDeque};
use std::path::Path;

use nalgebra::{Isometry3, Matrix3, Point3, Vector3};
use parry3d::mass_properties::MassProperties;
use rapier3d::dynamics::{
    CCDSolver, ImpulseJointHandle, ImpulseJointSet, IntegrationParameters, IslandManager,
    MultibodyJointSet, RigidBodyBuilder, RigidBodyHandle, RigidBodySet, RigidBodyType,
};
use rapier3d::geometry::{
    BroadPhaseMultiSap, ColliderBuilder, ColliderHandle, ColliderSet, NarrowPhase,
};
use rapier3d::pipeline::{PhysicsPipeline, QueryPipeline};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use urdfsim_math::Pose;

use crate::colliders::{geometry_to_shape, ColliderStrategy};
use crate::convert::{isometry_to_pose, origin_to_isometry, pose_to_isometry, urdf_vec};
use crate::error::{PhysicsError, Result};
use crate::joints::{
    joint_coordinate, joint_motion, joint_rate, urdf_joint_to_rapier, JointKind, MotorParams,
};

/// Mass given to links that declare none, so the solver never sees a
/// massless dynamic body.
const MIN_LINK_MASS: f32 = 0.001;

/// Friction of robot link colliders.
const LINK_FRICTION: f32 = 0.5;

/// A link of the loaded robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkIndex {
    /// Root link.
    Base,
    /// Link moved by joint `k`.
    Child(usize),
}

/// Static description of one robot joint.
#[derive(Debug, Clone)]
pub struct JointInfo {
    /// Joint index.
    pub index: usize,
    /// Joint name from the URDF.
    pub name: String,
    /// Joint kind.
    pub kind: JointKind,
    /// Parent link.
    pub parent: LinkIndex,
    /// Parent link name.
    pub parent_link: String,
    /// Child link name (link `Child(index)`).
    pub child_link: String,
    /// Joint axis in the joint frame.
    pub axis: [f64; 3],
    /// Lower limit (rad or m), zero when unset.
    pub lower: f64,
    /// Upper limit (rad or m), zero when unset.
    pub upper: f64,
}

/// State of a single joint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct JointState {
    /// Joint position (rad for revolute, m for prismatic).
    pub position: f64,
    /// Joint velocity (rad/s for revolute, m/s for prismatic).
    pub velocity: f64,
}

/// A contact between the floor and a robot link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    /// Name of the touching link.
    pub link: String,
    /// World contact position (m).
    pub position: [f64; 3],
    /// Normal force (N).
    pub normal_force: f64,
}

/// How to build the robot bodies.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    /// Make the base link a fixed body.
    pub fixed_base: bool,
    /// Collision shape strategy for mesh geometry.
    pub collider: ColliderStrategy,
    /// Motor gains for joint control.
    pub motor: MotorParams,
}

#[derive(Debug, Clone)]
struct LinkBody {
    name: String,
    body: RigidBodyHandle,
    /// Mass declared in the URDF.
    mass: f64,
}

struct Robot {
    base: LinkBody,
    /// `links[k]` is the child link of joint `k`.
    links: Vec<LinkBody>,
    joints: Vec<JointInfo>,
    joint_handles: Vec<Option<ImpulseJointHandle>>,
    body_to_link: HashMap<RigidBodyHandle, LinkIndex>,
    motor: MotorParams,
}

impl Robot {
    fn link(&self, link: LinkIndex) -> Option<&LinkBody> {
        match link {
            LinkIndex::Base => Some(&self.base),
            LinkIndex::Child(k) => self.links.get(k),
        }
    }

    fn bodies(&self) -> impl Iterator<Item = RigidBodyHandle> + '_ {
        std::iter::once(self.base.body).chain(self.links.iter().map(|l| l.body))
    }

    /// `link` and every link below it.
    fn subtree(&self, link: LinkIndex) -> Vec<LinkIndex> {
        let mut out = vec![link];
        let mut i = 0;
        while i < out.len() {
            let current = out[i];
            out.extend(
                self.joints
                    .iter()
                    .filter(|j| j.parent == current)
                    .map(|j| LinkIndex::Child(j.index)),
            );
            i += 1;
        }
        out
    }
}

/// Physics simulation world.
pub struct PhysicsWorld {
    // Rapier components
    pipeline: PhysicsPipeline,
    gravity: Vector3<f32>,
    integration_params: IntegrationParameters,
    islands: IslandManager,
    broad_phase: BroadPhaseMultiSap,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,

    robot: Option<Robot>,
    floor: Option<ColliderHandle>,
    ball: Option<RigidBodyHandle>,
}

impl PhysicsWorld {
    /// Create an empty Z-up world.
    pub fn new(gravity: [f64; 3]) -> Self {
        Self {
            pipeline: PhysicsPipeline::new(),
            gravity: Vector3::new(gravity[0] as f32, gravity[1] as f32, gravity[2] as f32),
            integration_params: IntegrationParameters::default(),
            islands: IslandManager::new(),
            broad_phase: BroadPhaseMultiSap::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            robot: None,
            floor: None,
            ball: None,
        }
    }

    /// Set gravity vector.
    pub fn set_gravity(&mut self, gravity: [f64; 3]) {
        self.gravity = Vector3::new(gravity[0] as f32, gravity[1] as f32, gravity[2] as f32);
    }

    /// Add a fixed ground plane at `z = 0`.
    pub fn add_floor(&mut self, friction: f64) {
        let body = self.bodies.insert(RigidBodyBuilder::fixed().build());
        let collider = ColliderBuilder::halfspace(Vector3::z_axis())
            .friction(friction as f32)
            .build();
        let handle = self
            .colliders
            .insert_with_parent(collider, body, &mut self.bodies);
        self.floor = Some(handle);
    }

    /// Whether a floor was added.
    pub fn has_floor(&self) -> bool {
        self.floor.is_some()
    }

    /// Change the floor's lateral friction. No-op without a floor.
    pub fn set_floor_friction(&mut self, lateral: f64) {
        if let Some(collider) = self.floor.and_then(|h| self.colliders.get_mut(h)) {
            collider.set_friction(lateral as f32);
        }
    }

    /// Load a robot from a URDF file. Mesh paths resolve against the
    /// file's directory.
    pub fn load_robot(&mut self, path: &Path, base: &Pose, options: &LoadOptions) -> Result<()> {
        let xml = std::fs::read_to_string(path).map_err(|source| PhysicsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        self.load_robot_from_str(&xml, base_dir, base, options)
    }

    /// Load a robot from URDF text.
    pub fn load_robot_from_str(
        &mut self,
        xml: &str,
        base_dir: &Path,
        base: &Pose,
        options: &LoadOptions,
    ) -> Result<()> {
        let urdf = urdf_rs::read_from_string(xml)?;
        self.spawn_robot(&urdf, base_dir, base, options)
    }

    fn spawn_robot(
        &mut self,
        urdf: &urdf_rs::Robot,
        base_dir: &Path,
        base: &Pose,
        options: &LoadOptions,
    ) -> Result<()> {
        if self.robot.is_some() {
            return Err(PhysicsError::RobotAlreadyLoaded);
        }

        // Root of the kinematic tree: the link that is nobody's child
        let base_link = urdf
            .links
            .iter()
            .find(|link| !urdf.joints.iter().any(|j| j.child.link == link.name))
            .or_else(|| urdf.links.first())
            .ok_or(PhysicsError::NoLinks)?;

        // World pose of every link at zero joint positions
        let mut link_poses: HashMap<&str, Isometry3<f32>> = HashMap::new();
        link_poses.insert(base_link.name.as_str(), pose_to_isometry(base));
        let mut queue = VecDeque::from([base_link.name.as_str()]);
        while let Some(parent) = queue.pop_front() {
            let parent_pose = link_poses[parent];
            for joint in urdf.joints.iter().filter(|j| j.parent.link == parent) {
                let child = joint.child.link.as_str();
                if link_poses.contains_key(child) {
                    continue;
                }
                link_poses.insert(child, parent_pose * origin_to_isometry(&joint.origin));
                queue.push_back(child);
            }
        }

        // Only a single tree is supported
        if let Some(link) = urdf
            .links
            .iter()
            .find(|link| !link_poses.contains_key(link.name.as_str()))
        {
            return Err(PhysicsError::MultipleRoots {
                base: base_link.name.clone(),
                link: link.name.clone(),
            });
        }

        let links_by_name: HashMap<&str, &urdf_rs::Link> =
            urdf.links.iter().map(|l| (l.name.as_str(), l)).collect();

        let base_body = self.spawn_link(
            base_link,
            link_poses[base_link.name.as_str()],
            options.fixed_base,
            base_dir,
            options.collider,
        )?;

        let mut body_to_link = HashMap::new();
        body_to_link.insert(base_body.body, LinkIndex::Base);
        let mut body_by_name: HashMap<&str, RigidBodyHandle> = HashMap::new();
        body_by_name.insert(base_link.name.as_str(), base_body.body);

        // One body per joint child, in joint order
        let mut links = Vec::with_capacity(urdf.joints.len());
        for (k, joint) in urdf.joints.iter().enumerate() {
            let child = joint.child.link.as_str();
            let link = links_by_name
                .get(child)
                .ok_or_else(|| PhysicsError::MissingLink(child.to_string()))?;
            let pose = link_poses
                .get(child)
                .copied()
                .ok_or_else(|| PhysicsError::MissingLink(child.to_string()))?;
            let body = self.spawn_link(link, pose, false, base_dir, options.collider)?;
            body_to_link.insert(body.body, LinkIndex::Child(k));
            body_by_name.insert(child, body.body);
            links.push(body);
        }

        let mut joints = Vec::with_capacity(urdf.joints.len());
        let mut joint_handles = Vec::with_capacity(urdf.joints.len());
        for (k, joint) in urdf.joints.iter().enumerate() {
            let parent_name = joint.parent.link.as_str();
            let parent_body = *body_by_name
                .get(parent_name)
                .ok_or_else(|| PhysicsError::MissingLink(parent_name.to_string()))?;
            let parent = body_to_link[&parent_body];
            let kind = JointKind::from_urdf(&joint.joint_type);

            if matches!(joint.joint_type, urdf_rs::JointType::Planar) {
                warn!("Planar joint '{}' is simulated as fixed", joint.name);
            }

            let handle = match urdf_joint_to_rapier(joint, kind, &options.motor) {
                Some(rapier_joint) => Some(self.impulse_joints.insert(
                    parent_body,
                    links[k].body,
                    rapier_joint,
                    true,
                )),
                None => {
                    debug!("Floating joint '{}' leaves '{}' free", joint.name, joint.child.link);
                    None
                }
            };

            let axis = urdf_vec(&joint.axis.xyz);
            joints.push(JointInfo {
                index: k,
                name: joint.name.clone(),
                kind,
                parent,
                parent_link: parent_name.to_string(),
                child_link: joint.child.link.clone(),
                axis: [axis.x as f64, axis.y as f64, axis.z as f64],
                lower: joint.limit.lower,
                upper: joint.limit.upper,
            });
            joint_handles.push(handle);
        }

        info!(
            "Loaded robot '{}' with {} links and {} joints",
            urdf.name,
            links.len() + 1,
            joints.len()
        );

        self.robot = Some(Robot {
            base: base_body,
            links,
            joints,
            joint_handles,
            body_to_link,
            motor: options.motor,
        });
        Ok(())
    }

    fn spawn_link(
        &mut self,
        link: &urdf_rs::Link,
        pose: Isometry3<f32>,
        fixed: bool,
        base_dir: &Path,
        strategy: ColliderStrategy,
    ) -> Result<LinkBody> {
        let body_type = if fixed {
            RigidBodyType::Fixed
        } else {
            RigidBodyType::Dynamic
        };

        let rigid_body = RigidBodyBuilder::new(body_type)
            .position(pose)
            .additional_mass_properties(link_mass_properties(&link.inertial))
            .build();
        let body = self.bodies.insert(rigid_body);

        let mut num_colliders = 0;
        for collision in &link.collision {
            if let Some((shape, offset)) =
                geometry_to_shape(&collision.geometry, &collision.origin, base_dir, strategy, &link.name)?
            {
                // Mass comes from <inertial>, not from collider volume
                let collider = ColliderBuilder::new(shape)
                    .position(offset)
                    .density(0.0)
                    .friction(LINK_FRICTION)
                    .build();
                self.colliders
                    .insert_with_parent(collider, body, &mut self.bodies);
                num_colliders += 1;
            }
        }

        debug!(
            "Spawned link '{}' with mass={:.3}kg, {} colliders (fixed={})",
            link.name, link.inertial.mass.value, num_colliders, fixed
        );

        Ok(LinkBody {
            name: link.name.clone(),
            body,
            mass: link.inertial.mass.value.max(0.0),
        })
    }

    /// Add a dynamic ball to the world, resting at the origin until placed.
    pub fn spawn_ball(&mut self, radius: f64, mass: f64) {
        let body = self.bodies.insert(
            RigidBodyBuilder::dynamic()
                .translation(Vector3::new(0.0, 0.0, radius as f32))
                .build(),
        );
        let collider = ColliderBuilder::ball(radius as f32)
            .mass(mass as f32)
            .friction(LINK_FRICTION)
            .build();
        self.colliders
            .insert_with_parent(collider, body, &mut self.bodies);
        self.ball = Some(body);
    }

    /// Whether a ball was spawned.
    pub fn has_ball(&self) -> bool {
        self.ball.is_some()
    }

    /// Teleport the ball and stop it. No-op without a ball.
    pub fn reset_ball(&mut self, position: [f64; 3]) {
        if let Some(ball) = self.ball.and_then(|h| self.bodies.get_mut(h)) {
            ball.set_position(
                Isometry3::translation(position[0] as f32, position[1] as f32, position[2] as f32),
                true,
            );
            ball.set_linvel(Vector3::zeros(), true);
            ball.set_angvel(Vector3::zeros(), true);
            ball.set_linear_damping(0.0);
            ball.set_angular_damping(0.1);
        }
    }

    /// World pose of the ball.
    pub fn ball_pose(&self) -> Option<Pose> {
        let body = self.bodies.get(self.ball?)?;
        Some(isometry_to_pose(body.position()))
    }

    /// Step the physics simulation by dt seconds.
    pub fn step(&mut self, dt: f64) {
        self.integration_params.dt = dt as f32;

        self.pipeline.step(
            &self.gravity,
            &self.integration_params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }

    fn robot(&self) -> Result<&Robot> {
        self.robot.as_ref().ok_or(PhysicsError::NoRobot)
    }

    fn joint_index(&self, k: usize) -> Result<&JointInfo> {
        let robot = self.robot()?;
        robot.joints.get(k).ok_or(PhysicsError::JointIndex {
            index: k,
            count: robot.joints.len(),
        })
    }

    /// Number of joints (including fixed ones) of the loaded robot.
    pub fn num_joints(&self) -> usize {
        self.robot.as_ref().map_or(0, |r| r.joints.len())
    }

    /// Static description of joint `k`.
    pub fn joint_info(&self, k: usize) -> Result<&JointInfo> {
        self.joint_index(k)
    }

    /// Name of a link.
    pub fn link_name(&self, link: LinkIndex) -> Result<&str> {
        let robot = self.robot()?;
        robot
            .link(link)
            .map(|l| l.name.as_str())
            .ok_or_else(|| PhysicsError::MissingLink(format!("{:?}", link)))
    }

    /// World pose of a link frame.
    pub fn link_pose(&self, link: LinkIndex) -> Result<Pose> {
        let robot = self.robot()?;
        let body = robot
            .link(link)
            .and_then(|l| self.bodies.get(l.body))
            .ok_or_else(|| PhysicsError::MissingLink(format!("{:?}", link)))?;
        Ok(isometry_to_pose(body.position()))
    }

    /// World pose of the base link.
    pub fn base_pose(&self) -> Result<Pose> {
        self.link_pose(LinkIndex::Base)
    }

    /// Move the whole robot rigidly so the base sits at `pose`, keeping
    /// the joint configuration. Velocities are zeroed.
    pub fn set_base_pose(&mut self, pose: &Pose) -> Result<()> {
        let robot = self.robot.as_ref().ok_or(PhysicsError::NoRobot)?;
        let old = *self
            .bodies
            .get(robot.base.body)
            .ok_or(PhysicsError::NoRobot)?
            .position();
        let delta = pose_to_isometry(pose) * old.inverse();

        let handles: Vec<RigidBodyHandle> = robot.bodies().collect();
        self.teleport(&handles, &delta);
        Ok(())
    }

    fn teleport(&mut self, handles: &[RigidBodyHandle], delta: &Isometry3<f32>) {
        for &handle in handles {
            if let Some(body) = self.bodies.get_mut(handle) {
                let moved = delta * body.position();
                body.set_position(moved, true);
                body.set_linvel(Vector3::zeros(), true);
                body.set_angvel(Vector3::zeros(), true);
            }
        }
    }

    /// Mass of a link as declared in the URDF.
    pub fn link_mass(&self, link: LinkIndex) -> Result<f64> {
        let robot = self.robot()?;
        robot
            .link(link)
            .map(|l| l.mass)
            .ok_or_else(|| PhysicsError::MissingLink(format!("{:?}", link)))
    }

    /// Total robot mass: base plus every link.
    pub fn robot_mass(&self) -> Result<f64> {
        let robot = self.robot()?;
        Ok(robot.base.mass + robot.links.iter().map(|l| l.mass).sum::<f64>())
    }

    fn joint_frames(&self, k: usize) -> Option<(Isometry3<f32>, Isometry3<f32>)> {
        let robot = self.robot.as_ref()?;
        let joint = self.impulse_joints.get(robot.joint_handles.get(k).copied()??)?;
        let pos1 = self.bodies.get(joint.body1)?.position();
        let pos2 = self.bodies.get(joint.body2)?.position();
        Some((pos1 * joint.data.local_frame1, pos2 * joint.data.local_frame2))
    }

    /// Position and velocity of joint `k`, measured from the bodies.
    pub fn joint_state(&self, k: usize) -> Result<JointState> {
        let info = self.joint_index(k)?;
        let robot = self.robot()?;
        let Some((frame1, frame2)) = self.joint_frames(k) else {
            return Ok(JointState::default());
        };

        let velocities = |handle: RigidBodyHandle| {
            self.bodies
                .get(handle)
                .map(|b| (*b.linvel(), *b.angvel()))
                .unwrap_or((Vector3::zeros(), Vector3::zeros()))
        };
        let parent_body = robot.link(info.parent).map(|l| l.body);
        let parent_vel = parent_body
            .map(velocities)
            .unwrap_or((Vector3::zeros(), Vector3::zeros()));
        let child_vel = velocities(robot.links[k].body);

        Ok(JointState {
            position: joint_coordinate(info.kind, &frame1, &frame2) as f64,
            velocity: joint_rate(info.kind, &frame1, parent_vel, child_vel) as f64,
        })
    }

    /// Teleport the subtree below joint `k` so the joint reads `value`.
    /// Velocities of the moved links are zeroed. Joints without a single
    /// coordinate are left alone.
    pub fn reset_joint_state(&mut self, k: usize, value: f64) -> Result<()> {
        let info = self.joint_index(k)?.clone();
        if info.kind.motor_axis().is_none() {
            return Ok(());
        }
        let robot = self.robot()?;
        let Some(handle) = robot.joint_handles[k] else {
            return Ok(());
        };
        let Some(joint) = self.impulse_joints.get(handle) else {
            return Ok(());
        };
        let (frame1, frame2) = (joint.data.local_frame1, joint.data.local_frame2);

        let parent = robot.link(info.parent).map(|l| l.body);
        let parent_pose = parent
            .and_then(|h| self.bodies.get(h))
            .map(|b| *b.position())
            .ok_or_else(|| PhysicsError::MissingLink(info.parent_link.clone()))?;
        let child_old = self
            .bodies
            .get(robot.links[k].body)
            .map(|b| *b.position())
            .ok_or_else(|| PhysicsError::MissingLink(info.child_link.clone()))?;

        let child_new =
            parent_pose * frame1 * joint_motion(info.kind, value as f32) * frame2.inverse();
        let delta = child_new * child_old.inverse();

        let handles: Vec<RigidBodyHandle> = robot
            .subtree(LinkIndex::Child(k))
            .into_iter()
            .filter_map(|link| robot.link(link).map(|l| l.body))
            .collect();
        self.teleport(&handles, &delta);

        // Hold the new position rather than snapping back to an old target
        self.set_joint_position_target(k, value)
    }

    /// Drive joint `k` towards `target` with the position motor.
    pub fn set_joint_position_target(&mut self, k: usize, target: f64) -> Result<()> {
        let info = self.joint_index(k)?;
        let Some(axis) = info.kind.motor_axis() else {
            return Ok(());
        };
        let (motor, handle) = self.motor_handle(k)?;
        if let Some(joint) = handle.and_then(|h| self.impulse_joints.get_mut(h, true)) {
            joint
                .data
                .set_motor_position(axis, target as f32, motor.stiffness, motor.damping);
        }
        Ok(())
    }

    /// Drive joint `k` at `target` velocity.
    pub fn set_joint_velocity_target(&mut self, k: usize, target: f64) -> Result<()> {
        let info = self.joint_index(k)?;
        let Some(axis) = info.kind.motor_axis() else {
            return Ok(());
        };
        let (motor, handle) = self.motor_handle(k)?;
        if let Some(joint) = handle.and_then(|h| self.impulse_joints.get_mut(h, true)) {
            joint
                .data
                .set_motor_velocity(axis, target as f32, motor.damping);
        }
        Ok(())
    }

    fn motor_handle(&self, k: usize) -> Result<(MotorParams, Option<ImpulseJointHandle>)> {
        let robot = self.robot()?;
        Ok((robot.motor, robot.joint_handles.get(k).copied().flatten()))
    }

    fn collider_link(&self, collider: ColliderHandle) -> Option<LinkIndex> {
        let body = self.colliders.get(collider)?.parent()?;
        self.robot.as_ref()?.body_to_link.get(&body).copied()
    }

    fn normal_force(&self, impulse: f32) -> f64 {
        (impulse / self.integration_params.dt) as f64
    }

    /// Contacts between the floor and robot links from the last step.
    pub fn floor_contacts(&self) -> Vec<Contact> {
        let mut result = Vec::new();
        let (Some(floor), Some(robot)) = (self.floor, self.robot.as_ref()) else {
            return result;
        };

        for pair in self.narrow_phase.contact_pairs_with(floor) {
            if !pair.has_any_active_contact {
                continue;
            }
            let other = if pair.collider1 == floor {
                pair.collider2
            } else {
                pair.collider1
            };
            let Some(link) = self.collider_link(other).and_then(|l| robot.link(l)) else {
                continue;
            };
            let Some(collider1) = self.colliders.get(pair.collider1) else {
                continue;
            };

            for manifold in &pair.manifolds {
                for point in &manifold.points {
                    // Speculative points that carry no load
                    if point.dist > 0.0 && point.data.impulse <= 0.0 {
                        continue;
                    }
                    let p: Point3<f32> = collider1.position() * point.local_p1;
                    result.push(Contact {
                        link: link.name.clone(),
                        position: [p.x as f64, p.y as f64, p.z as f64],
                        normal_force: self.normal_force(point.data.impulse),
                    });
                }
            }
        }

        result
    }

    /// Total normal force (N) of contacts between two robot links.
    pub fn self_collision_force(&self) -> f64 {
        let mut total = 0.0;
        for pair in self.narrow_phase.contact_pairs() {
            if !pair.has_any_active_contact {
                continue;
            }
            if self.collider_link(pair.collider1).is_none()
                || self.collider_link(pair.collider2).is_none()
            {
                continue;
            }
            for manifold in &pair.manifolds {
                for point in &manifold.points {
                    total += self.normal_force(point.data.impulse);
                }
            }
        }
        total
    }
}

/// Mass properties from a URDF `<inertial>` block, expressed in the link
/// frame.
fn link_mass_properties(inertial: &urdf_rs::Inertial) -> MassProperties {
    let origin = origin_to_isometry(&inertial.origin);
    let i = &inertial.inertia;
    #[rustfmt::skip]
    let inertia = Matrix3::new(
        i.ixx as f32, i.ixy as f32, i.ixz as f32,
        i.ixy as f32, i.iyy as f32, i.iyz as f32,
        i.ixz as f32, i.iyz as f32, i.izz as f32,
    );

    let mass = inertial.mass.value as f32;
    if mass <= 0.0 || inertia.diagonal().iter().any(|d| *d <= 0.0) {
        let tiny = mass.max(MIN_LINK_MASS) * 1e-4;
        return MassProperties::new(
            Point3::from(origin.translation.vector),
            mass.max(MIN_LINK_MASS),
            Vector3::repeat(tiny),
        );
    }

    let r = origin.rotation.to_rotation_matrix();
    let rotated = r.matrix() * inertia * r.matrix().transpose();
    MassProperties::with_inertia_matrix(Point3::from(origin.translation.vector), mass, rotated)
}
