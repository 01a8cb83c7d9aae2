//! The scripting-level simulation object.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::time::{Duration, Instant};

use nalgebra::Matrix4;
use tracing::{debug, info};
use urdfsim_math::{relative_transform, Pose};
use urdfsim_physics::{Contact, JointInfo, JointState, LinkIndex, LoadOptions, PhysicsWorld};

use crate::config::{FloorFriction, Orientation, SimulationConfig};
use crate::debug_lines::DebugLines;
use crate::error::{Result, SimError};
use crate::registry::Registry;
use crate::viewer::{Viewer, ViewerOptions};

/// Frame name that stands for the robot base.
pub const ORIGIN_FRAME: &str = "origin";

/// Tint applied to every link of a transparent robot.
const TRANSPARENT_RGBA: [f64; 4] = [0.3, 0.3, 0.3, 0.3];

/// Height of the ball center when placed on the floor (m).
const BALL_HEIGHT: f64 = 0.06;

/// Ball radius (m).
const BALL_RADIUS: f64 = 0.06;

/// Ball mass (kg).
const BALL_MASS: f64 = 0.1;

/// A robot loaded into a physics world, addressed by joint and frame names.
pub struct Simulation {
    world: PhysicsWorld,
    config: SimulationConfig,
    registry: Registry,
    lines: DebugLines,
    viewer: Option<Box<dyn Viewer>>,
    floor_friction: FloorFriction,
    /// Simulated time (s).
    t: f64,
    /// Wall-clock reference for real-time pacing.
    start: Instant,
}

impl Simulation {
    /// Load a URDF file and run headless.
    pub fn new(robot_path: impl AsRef<Path>, config: SimulationConfig) -> Result<Self> {
        Self::build(config, None, |world, pose, options| {
            world.load_robot(robot_path.as_ref(), pose, options)
        })
    }

    /// Load a URDF file and render through `viewer`.
    pub fn with_viewer(
        robot_path: impl AsRef<Path>,
        config: SimulationConfig,
        viewer: Box<dyn Viewer>,
    ) -> Result<Self> {
        Self::build(config, Some(viewer), |world, pose, options| {
            world.load_robot(robot_path.as_ref(), pose, options)
        })
    }

    /// Load a robot from URDF text and run headless. Mesh paths resolve
    /// against the working directory.
    pub fn from_urdf_str(xml: &str, config: SimulationConfig) -> Result<Self> {
        Self::build(config, None, |world, pose, options| {
            world.load_robot_from_str(xml, Path::new("."), pose, options)
        })
    }

    fn build(
        config: SimulationConfig,
        mut viewer: Option<Box<dyn Viewer>>,
        load: impl FnOnce(&mut PhysicsWorld, &Pose, &LoadOptions) -> urdfsim_physics::Result<()>,
    ) -> Result<Self> {
        let mut world = PhysicsWorld::new(config.gravity);

        if let Some(viewer) = viewer.as_mut() {
            viewer.configure(ViewerOptions {
                panels: config.panels,
                mouse_picking: true,
            });
        }

        if config.floor {
            world.add_floor(config.floor_friction.lateral);
        }

        let start_pose = Pose::from_euler([0.0, 0.0, config.start_height], [0.0, 0.0, 0.0]);
        let options = LoadOptions {
            fixed_base: config.fixed,
            collider: config.collider,
            motor: config.motor,
        };
        load(&mut world, &start_pose, &options)?;

        let names: Vec<String> = (0..world.num_joints())
            .map(|k| world.joint_info(k).map(|info| info.name.clone()))
            .collect::<urdfsim_physics::Result<_>>()?;
        let registry = Registry::build(names.iter().map(String::as_str));

        let mut sim = Self {
            world,
            floor_friction: config.floor_friction,
            config,
            registry,
            lines: DebugLines::new(),
            viewer,
            t: 0.0,
            start: Instant::now(),
        };
        sim.set_floor_frictions(sim.config.floor_friction);

        if sim.config.transparent {
            sim.tint_links(TRANSPARENT_RGBA)?;
        }

        info!("Found {} DOFs", sim.registry.num_joints());
        info!("Found {} frames", sim.registry.num_frames());

        Ok(sim)
    }

    fn tint_links(&mut self, rgba: [f64; 4]) -> Result<()> {
        let Some(viewer) = self.viewer.as_mut() else {
            return Ok(());
        };
        let links = std::iter::once(LinkIndex::Base)
            .chain((0..self.world.num_joints()).map(LinkIndex::Child));
        for link in links {
            viewer.set_link_color(self.world.link_name(link)?, rgba);
        }
        Ok(())
    }

    /// Set the floor friction coefficients. No-op without a floor.
    ///
    /// Only lateral friction reaches the engine; spinning and rolling
    /// friction are kept for reference.
    pub fn set_floor_frictions(&mut self, friction: FloorFriction) {
        if !self.world.has_floor() {
            return;
        }
        self.world.set_floor_friction(friction.lateral);
        self.floor_friction = friction;
        debug!(
            "Floor friction lateral={} spinning={} rolling={}",
            friction.lateral, friction.spinning, friction.rolling
        );
    }

    /// Current floor friction coefficients.
    pub fn floor_frictions(&self) -> FloorFriction {
        self.floor_friction
    }

    /// Point the viewer camera at `target`, keeping its distance, yaw and
    /// pitch. No-op when headless.
    pub fn look_at(&mut self, target: [f64; 3]) {
        if let Some(viewer) = self.viewer.as_mut() {
            let mut camera = viewer.camera();
            camera.target = target;
            viewer.set_camera(&camera);
        }
    }

    /// Base position and `[roll, pitch, yaw]`.
    pub fn robot_pose(&self) -> Result<([f64; 3], [f64; 3])> {
        let pose = self.world.base_pose()?;
        Ok((pose.position, pose.euler()))
    }

    fn frame_pose(&self, frame: &str) -> Result<Pose> {
        if frame == ORIGIN_FRAME {
            return Ok(self.world.base_pose()?);
        }
        let k = self
            .registry
            .frame(frame)
            .ok_or_else(|| SimError::FrameNotFound(frame.to_string()))?;
        Ok(self.world.link_pose(LinkIndex::Child(k))?)
    }

    /// Frame-to-world transform of a frame, or of the base for `"origin"`.
    pub fn frame_to_world_matrix(&self, frame: &str) -> Result<Matrix4<f64>> {
        Ok(self.frame_pose(frame)?.to_matrix())
    }

    /// Transform taking coordinates in `frame_a` to coordinates in `frame_b`.
    pub fn transformation(&self, frame_a: &str, frame_b: &str) -> Result<Matrix4<f64>> {
        let a_to_world = self.frame_to_world_matrix(frame_a)?;
        let b_to_world = self.frame_to_world_matrix(frame_b)?;
        Ok(relative_transform(&a_to_world, &b_to_world))
    }

    /// Teleport the base to `position` with orientation `[x, y, z, w]`.
    pub fn set_robot_pose(&mut self, position: [f64; 3], orientation: [f64; 4]) -> Result<()> {
        self.world
            .set_base_pose(&Pose::from_xyzw(position, orientation))?;
        Ok(())
    }

    /// Add the ball to the world, on the floor at the origin.
    pub fn spawn_ball(&mut self) {
        if !self.world.has_ball() {
            self.world.spawn_ball(BALL_RADIUS, BALL_MASS);
        }
        self.set_ball_pos(0.0, 0.0);
    }

    /// Put the ball on the floor at `(x, y)` and stop it. No-op without
    /// a ball.
    pub fn set_ball_pos(&mut self, x: f64, y: f64) {
        self.world.reset_ball([x, y, BALL_HEIGHT]);
    }

    /// Ball center, if a ball was spawned.
    pub fn ball_position(&self) -> Option<[f64; 3]> {
        self.world.ball_pose().map(|pose| pose.position)
    }

    /// Restart an experiment: clear debug lines, rewind time, put the base
    /// at `(0, 0, height)` in the given orientation and zero every joint.
    pub fn reset(&mut self, height: f64, orientation: Orientation) -> Result<()> {
        self.lines.clear();
        self.t = 0.0;
        self.start = Instant::now();

        let pose = Pose::from_euler([0.0, 0.0, height], [0.0, orientation.pitch(), 0.0]);
        let (position, quaternion) = pose.to_xyzw();
        self.set_robot_pose(position, quaternion)?;

        let joints: Vec<usize> = self.registry.joints().map(|(_, k)| k).collect();
        for k in joints {
            self.world.reset_joint_state(k, 0.0)?;
        }
        Ok(())
    }

    /// World pose of a frame as `(position, [x, y, z, w])`.
    pub fn get_frame(&self, frame: &str) -> Result<([f64; 3], [f64; 4])> {
        Ok(self.frame_pose(frame)?.to_xyzw())
    }

    /// World pose of every frame as `(position, [roll, pitch, yaw])`.
    pub fn get_frames(&self) -> Result<BTreeMap<String, ([f64; 3], [f64; 3])>> {
        self.registry
            .frame_names()
            .iter()
            .map(|name| {
                let pose = self.frame_pose(name)?;
                Ok((name.clone(), (pose.position, pose.euler())))
            })
            .collect()
    }

    fn resolve_joints(&self, values: &HashMap<String, f64>) -> Result<Vec<(usize, f64)>> {
        values
            .iter()
            .map(|(name, &value)| {
                self.registry
                    .joint(name)
                    .map(|k| (k, value))
                    .ok_or_else(|| SimError::JointNotFound(name.clone()))
            })
            .collect()
    }

    /// Teleport joints to the given positions (rad or m).
    pub fn reset_joints(&mut self, positions: &HashMap<String, f64>) -> Result<()> {
        for (k, value) in self.resolve_joints(positions)? {
            self.world.reset_joint_state(k, value)?;
        }
        Ok(())
    }

    /// Set position-control targets. Fails without touching any motor if
    /// one of the names is unknown.
    pub fn set_joints(&mut self, targets: &HashMap<String, f64>) -> Result<()> {
        for (k, target) in self.resolve_joints(targets)? {
            self.world.set_joint_position_target(k, target)?;
        }
        Ok(())
    }

    /// Controllable joint names, in ordinal order.
    pub fn joints(&self) -> &[String] {
        self.registry.joint_names()
    }

    /// Frame names.
    pub fn frames(&self) -> &[String] {
        self.registry.frame_names()
    }

    /// Ordinal of a controllable joint.
    pub fn joint_ordinal(&self, name: &str) -> Option<usize> {
        self.registry.ordinal(name)
    }

    /// Axis, limits and links of a controllable joint.
    pub fn joint_info(&self, name: &str) -> Result<&JointInfo> {
        let k = self
            .registry
            .joint(name)
            .ok_or_else(|| SimError::JointNotFound(name.to_string()))?;
        Ok(self.world.joint_info(k)?)
    }

    /// Position and velocity of every controllable joint.
    pub fn joint_states(&self) -> Result<BTreeMap<String, JointState>> {
        self.registry
            .joints()
            .map(|(name, k)| Ok((name.to_string(), self.world.joint_state(k)?)))
            .collect()
    }

    /// Robot mass (kg): the base plus every link.
    pub fn robot_mass(&self) -> Result<f64> {
        Ok(self.world.robot_mass()?)
    }

    /// Track a position with a debug line. Call once per tracked point
    /// each frame, in the same order; `color` defaults to a palette colour
    /// picked by slot.
    pub fn add_debug_position(&mut self, position: [f64; 3], color: Option<[f64; 3]>, duration: f64) {
        self.lines.add_position(position, color, duration);
    }

    /// Send pending debug line segments to the viewer, at most every 50 ms.
    pub fn draw_debug_lines(&mut self) {
        let lines = self.lines.draw(Instant::now());
        if let Some(viewer) = self.viewer.as_mut() {
            for line in &lines {
                viewer.draw_line(line);
            }
        }
    }

    /// Floor contacts as `(link, position, normal force)`.
    pub fn contact_points(&self) -> Vec<Contact> {
        self.world.floor_contacts()
    }

    /// Total normal force (N) of the robot touching itself.
    pub fn auto_collisions(&self) -> f64 {
        self.world.self_collision_force()
    }

    /// Tick forever.
    pub fn execute(&mut self) -> ! {
        loop {
            self.tick();
        }
    }

    /// Tick `steps` times.
    pub fn run_for(&mut self, steps: usize) {
        for _ in 0..steps {
            self.tick();
        }
    }

    /// Advance one fixed step. In real-time mode, sleeps until the wall
    /// clock catches up with simulated time.
    pub fn tick(&mut self) {
        self.t += self.config.dt;
        self.draw_debug_lines();

        self.world.step(self.config.dt);

        let delay = self.t - self.start.elapsed().as_secs_f64();
        if delay > 0.0 && self.config.real_time {
            std::thread::sleep(Duration::from_secs_f64(delay));
        }
    }

    /// Simulated time since load or the last reset (s).
    pub fn time(&self) -> f64 {
        self.t
    }

    /// Settings in use.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// The underlying physics world.
    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    /// Mutable access to the underlying physics world.
    pub fn world_mut(&mut self) -> &mut PhysicsWorld {
        &mut self.world
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debug_lines::{DrawnLine, DEFAULT_DURATION};
    use crate::viewer::Camera;
    use approx::assert_relative_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Two-DOF leg with a welded plate and a camera frame.
    const LEG_URDF: &str = r#"<robot name="leg">
  <link name="trunk">
    <inertial>
      <origin xyz="0 0 0" rpy="0 0 0"/>
      <mass value="1.0"/>
      <inertia ixx="0.01" ixy="0" ixz="0" iyy="0.01" iyz="0" izz="0.01"/>
    </inertial>
    <collision>
      <origin xyz="0 0 0" rpy="0 0 0"/>
      <geometry><box size="0.2 0.2 0.1"/></geometry>
    </collision>
  </link>
  <link name="thigh">
    <inertial>
      <origin xyz="0 0 -0.1" rpy="0 0 0"/>
      <mass value="0.5"/>
      <inertia ixx="0.002" ixy="0" ixz="0" iyy="0.002" iyz="0" izz="0.001"/>
    </inertial>
    <collision>
      <origin xyz="0 0 -0.1" rpy="0 0 0"/>
      <geometry><box size="0.04 0.04 0.2"/></geometry>
    </collision>
  </link>
  <link name="shin">
    <inertial>
      <origin xyz="0 0 -0.1" rpy="0 0 0"/>
      <mass value="0.3"/>
      <inertia ixx="0.001" ixy="0" ixz="0" iyy="0.001" iyz="0" izz="0.0005"/>
    </inertial>
    <collision>
      <origin xyz="0 0 -0.1" rpy="0 0 0"/>
      <geometry><box size="0.04 0.04 0.2"/></geometry>
    </collision>
  </link>
  <link name="plate">
    <inertial>
      <origin xyz="0 0 0" rpy="0 0 0"/>
      <mass value="0.2"/>
      <inertia ixx="0.0001" ixy="0" ixz="0" iyy="0.0001" iyz="0" izz="0.0001"/>
    </inertial>
  </link>
  <link name="camera"/>
  <joint name="left_hip" type="revolute">
    <parent link="trunk"/>
    <child link="thigh"/>
    <origin xyz="0 0 -0.05" rpy="0 0 0"/>
    <axis xyz="0 1 0"/>
    <limit lower="-2" upper="2" effort="20" velocity="5"/>
  </joint>
  <joint name="trunk_fixing" type="fixed">
    <parent link="trunk"/>
    <child link="plate"/>
    <origin xyz="0 0 0.06" rpy="0 0 0"/>
  </joint>
  <joint name="left_knee" type="revolute">
    <parent link="thigh"/>
    <child link="shin"/>
    <origin xyz="0 0 -0.2" rpy="0 0 0"/>
    <axis xyz="0 1 0"/>
    <limit lower="-2" upper="2" effort="20" velocity="5"/>
  </joint>
  <joint name="camera_frame" type="fixed">
    <parent link="trunk"/>
    <child link="camera"/>
    <origin xyz="0.1 0 0.2" rpy="0 0 0"/>
  </joint>
</robot>"#;

    fn headless(fixed: bool) -> Simulation {
        let config = SimulationConfig {
            fixed,
            real_time: false,
            ..Default::default()
        };
        Simulation::from_urdf_str(LEG_URDF, config).unwrap()
    }

    #[derive(Default)]
    struct Recorded {
        options: Option<ViewerOptions>,
        camera: Camera,
        colors: Vec<(String, [f64; 4])>,
        lines: Vec<DrawnLine>,
    }

    struct RecordingViewer(Rc<RefCell<Recorded>>);

    impl Viewer for RecordingViewer {
        fn configure(&mut self, options: ViewerOptions) {
            self.0.borrow_mut().options = Some(options);
        }

        fn camera(&self) -> Camera {
            self.0.borrow().camera
        }

        fn set_camera(&mut self, camera: &Camera) {
            self.0.borrow_mut().camera = *camera;
        }

        fn set_link_color(&mut self, link: &str, rgba: [f64; 4]) {
            self.0.borrow_mut().colors.push((link.to_string(), rgba));
        }

        fn draw_line(&mut self, line: &DrawnLine) {
            self.0.borrow_mut().lines.push(line.clone());
        }
    }

    fn with_recorder(config: SimulationConfig) -> (Simulation, Rc<RefCell<Recorded>>) {
        let recorded = Rc::new(RefCell::new(Recorded::default()));
        let viewer = Box::new(RecordingViewer(recorded.clone()));
        let sim = Simulation::build(config, Some(viewer), |world, pose, options| {
            world.load_robot_from_str(LEG_URDF, Path::new("."), pose, options)
        })
        .unwrap();
        (sim, recorded)
    }

    #[test]
    fn test_registry_from_urdf() {
        let sim = headless(true);
        assert_eq!(sim.joints(), ["left_hip", "left_knee"]);
        assert_eq!(sim.frames(), ["camera_frame"]);
        assert_eq!(sim.joint_ordinal("left_knee"), Some(1));
        assert_eq!(sim.joint_ordinal("trunk_fixing"), None);
    }

    #[test]
    fn test_robot_starts_at_one_meter() {
        let sim = headless(true);
        let (position, rpy) = sim.robot_pose().unwrap();
        assert_relative_eq!(position[2], 1.0, epsilon = 1e-6);
        assert_relative_eq!(rpy[2], 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_transformation_between_frames() {
        let sim = headless(true);
        let m = sim.transformation("camera_frame", ORIGIN_FRAME).unwrap();
        assert_relative_eq!(m[(0, 3)], 0.1, epsilon = 1e-5);
        assert_relative_eq!(m[(2, 3)], 0.2, epsilon = 1e-5);
        assert_relative_eq!(m[(3, 3)], 1.0);

        let back = sim.transformation(ORIGIN_FRAME, "camera_frame").unwrap();
        assert_relative_eq!(back * m, Matrix4::identity(), epsilon = 1e-5);
    }

    #[test]
    fn test_unknown_frame() {
        let sim = headless(true);
        assert!(matches!(
            sim.frame_to_world_matrix("nope_frame"),
            Err(SimError::FrameNotFound(name)) if name == "nope_frame"
        ));
        // Joints are not frames
        assert!(sim.get_frame("left_hip").is_err());
    }

    #[test]
    fn test_get_frames() {
        let sim = headless(true);
        let frames = sim.get_frames().unwrap();
        assert_eq!(frames.len(), 1);
        let (position, _) = frames["camera_frame"];
        assert_relative_eq!(position[2], 1.2, epsilon = 1e-5);

        let (position, quaternion) = sim.get_frame("camera_frame").unwrap();
        assert_relative_eq!(position[0], 0.1, epsilon = 1e-5);
        assert_relative_eq!(quaternion[3], 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_set_joints_unknown_name() {
        let config = SimulationConfig {
            fixed: true,
            real_time: false,
            gravity: [0.0, 0.0, 0.0],
            ..Default::default()
        };
        let mut sim = Simulation::from_urdf_str(LEG_URDF, config).unwrap();
        let targets = HashMap::from([("left_hip".to_string(), 0.3), ("elbow".to_string(), 1.0)]);
        assert!(matches!(
            sim.set_joints(&targets),
            Err(SimError::JointNotFound(name)) if name == "elbow"
        ));
        let fixing = HashMap::from([("trunk_fixing".to_string(), 0.0)]);
        assert!(sim.reset_joints(&fixing).is_err());

        // The valid name in the rejected batch never got a target
        sim.run_for(200);
        let hip = sim.joint_states().unwrap()["left_hip"];
        assert_relative_eq!(hip.position, 0.0, epsilon = 1e-3);
    }

    #[test]
    fn test_joint_info() {
        let sim = headless(true);
        let hip = sim.joint_info("left_hip").unwrap();
        assert_eq!(hip.child_link, "thigh");
        assert_eq!(hip.axis, [0.0, 1.0, 0.0]);
        assert_relative_eq!(hip.lower, -2.0);
        assert_relative_eq!(hip.upper, 2.0);
        assert!(matches!(
            sim.joint_info("camera_frame"),
            Err(SimError::JointNotFound(name)) if name == "camera_frame"
        ));
    }

    #[test]
    fn test_position_control() {
        let config = SimulationConfig {
            fixed: true,
            real_time: false,
            gravity: [0.0, 0.0, 0.0],
            ..Default::default()
        };
        let mut sim = Simulation::from_urdf_str(LEG_URDF, config).unwrap();
        sim.set_joints(&HashMap::from([("left_hip".to_string(), 0.5)]))
            .unwrap();
        sim.run_for(400);
        let states = sim.joint_states().unwrap();
        assert!(states["left_hip"].position > 0.25, "{:?}", states["left_hip"]);
    }

    #[test]
    fn test_reset_joints() {
        let mut sim = headless(true);
        sim.reset_joints(&HashMap::from([("left_knee".to_string(), -0.7)]))
            .unwrap();
        let states = sim.joint_states().unwrap();
        assert_relative_eq!(states["left_knee"].position, -0.7, epsilon = 1e-4);
        assert_relative_eq!(states["left_hip"].position, 0.0, epsilon = 1e-4);
    }

    #[test]
    fn test_reset() {
        let mut sim = headless(false);
        sim.reset_joints(&HashMap::from([("left_hip".to_string(), 0.4)]))
            .unwrap();
        sim.add_debug_position([0.0; 3], None, DEFAULT_DURATION);
        sim.run_for(10);

        sim.reset(0.5, Orientation::Back).unwrap();
        assert_eq!(sim.time(), 0.0);
        assert!(sim.lines.is_empty());

        let m = sim.frame_to_world_matrix(ORIGIN_FRAME).unwrap();
        assert_relative_eq!(m[(2, 3)], 0.5, epsilon = 1e-5);
        // Pitch -pi/2 turns the base X axis up
        assert_relative_eq!(m[(2, 0)], 1.0, epsilon = 1e-4);

        let states = sim.joint_states().unwrap();
        assert_relative_eq!(states["left_hip"].position, 0.0, epsilon = 1e-4);
    }

    #[test]
    fn test_set_robot_pose() {
        let mut sim = headless(false);
        let half = std::f64::consts::FRAC_1_SQRT_2;
        sim.set_robot_pose([1.0, 2.0, 0.8], [0.0, 0.0, half, half])
            .unwrap();
        let (position, rpy) = sim.robot_pose().unwrap();
        assert_relative_eq!(position[1], 2.0, epsilon = 1e-5);
        assert_relative_eq!(rpy[2], std::f64::consts::FRAC_PI_2, epsilon = 1e-5);
    }

    #[test]
    fn test_tick_advances_time() {
        let mut sim = headless(true);
        sim.run_for(10);
        assert_relative_eq!(sim.time(), 0.05, epsilon = 1e-9);
    }

    #[test]
    fn test_robot_mass() {
        let sim = headless(true);
        assert_relative_eq!(sim.robot_mass().unwrap(), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_ball() {
        let mut sim = headless(true);
        sim.set_ball_pos(1.0, 1.0);
        assert!(sim.ball_position().is_none());

        sim.spawn_ball();
        sim.set_ball_pos(0.5, -0.5);
        let position = sim.ball_position().unwrap();
        assert_relative_eq!(position[0], 0.5, epsilon = 1e-6);
        assert_relative_eq!(position[2], BALL_HEIGHT, epsilon = 1e-6);
    }

    #[test]
    fn test_floor_frictions() {
        let mut sim = headless(true);
        assert_eq!(sim.floor_frictions(), FloorFriction::default());
        let friction = FloorFriction {
            lateral: 1.5,
            ..Default::default()
        };
        sim.set_floor_frictions(friction);
        assert_eq!(sim.floor_frictions().lateral, 1.5);

        let config = SimulationConfig {
            floor: false,
            real_time: false,
            ..Default::default()
        };
        let mut sim = Simulation::from_urdf_str(LEG_URDF, config).unwrap();
        sim.set_floor_frictions(friction);
        assert_eq!(sim.floor_frictions(), FloorFriction::default());
    }

    #[test]
    fn test_falls_onto_floor() {
        let mut sim = headless(false);
        sim.run_for(400);
        let contacts = sim.contact_points();
        assert!(!contacts.is_empty());
        for contact in &contacts {
            assert!(["trunk", "thigh", "shin"].contains(&contact.link.as_str()));
            assert!(contact.position[2].abs() < 0.05);
        }
        // Floor contacts are not self collisions
        assert_eq!(sim.auto_collisions(), 0.0);
    }

    #[test]
    fn test_hanging_leg_has_no_self_collisions() {
        let mut sim = headless(true);
        sim.run_for(200);
        assert_eq!(sim.auto_collisions(), 0.0);
    }

    #[test]
    fn test_auto_collisions_with_overlapping_links() {
        // "inner" hangs back down into the trunk through a welded post
        const FOLDED_URDF: &str = r#"<robot name="folded">
  <link name="trunk">
    <inertial>
      <mass value="1.0"/>
      <inertia ixx="0.01" ixy="0" ixz="0" iyy="0.01" iyz="0" izz="0.01"/>
    </inertial>
    <collision>
      <geometry><box size="0.2 0.2 0.2"/></geometry>
    </collision>
  </link>
  <link name="post">
    <inertial>
      <mass value="0.1"/>
      <inertia ixx="0.001" ixy="0" ixz="0" iyy="0.001" iyz="0" izz="0.001"/>
    </inertial>
  </link>
  <link name="inner">
    <inertial>
      <mass value="0.1"/>
      <inertia ixx="0.001" ixy="0" ixz="0" iyy="0.001" iyz="0" izz="0.001"/>
    </inertial>
    <collision>
      <geometry><box size="0.1 0.1 0.1"/></geometry>
    </collision>
  </link>
  <joint name="post_fixing" type="fixed">
    <parent link="trunk"/>
    <child link="post"/>
    <origin xyz="0 0 0.3" rpy="0 0 0"/>
  </joint>
  <joint name="inner_fixing" type="fixed">
    <parent link="post"/>
    <child link="inner"/>
    <origin xyz="0 0 -0.3" rpy="0 0 0"/>
  </joint>
</robot>"#;
        let config = SimulationConfig {
            fixed: true,
            real_time: false,
            gravity: [0.0, 0.0, 0.0],
            ..Default::default()
        };
        let mut sim = Simulation::from_urdf_str(FOLDED_URDF, config).unwrap();
        assert!(sim.joints().is_empty());

        let mut max_force: f64 = 0.0;
        for _ in 0..100 {
            sim.tick();
            max_force = max_force.max(sim.auto_collisions());
        }
        assert!(max_force > 0.0);
    }

    #[test]
    fn test_viewer_setup() {
        let config = SimulationConfig {
            transparent: true,
            panels: true,
            real_time: false,
            ..Default::default()
        };
        let (_sim, recorded) = with_recorder(config);
        let recorded = recorded.borrow();

        assert_eq!(
            recorded.options,
            Some(ViewerOptions {
                panels: true,
                mouse_picking: true
            })
        );
        assert_eq!(recorded.colors.len(), 5);
        assert!(recorded.colors.iter().all(|(_, rgba)| *rgba == TRANSPARENT_RGBA));
    }

    #[test]
    fn test_look_at_keeps_orbit() {
        let config = SimulationConfig {
            real_time: false,
            ..Default::default()
        };
        let (mut sim, recorded) = with_recorder(config);
        recorded.borrow_mut().camera.distance = 3.0;

        sim.look_at([1.0, 2.0, 0.0]);
        let camera = recorded.borrow().camera;
        assert_eq!(camera.target, [1.0, 2.0, 0.0]);
        assert_eq!(camera.distance, 3.0);
    }

    #[test]
    fn test_debug_lines_reach_viewer() {
        let config = SimulationConfig {
            real_time: false,
            fixed: true,
            ..Default::default()
        };
        let (mut sim, recorded) = with_recorder(config);

        sim.add_debug_position([0.0, 0.0, 0.0], None, DEFAULT_DURATION);
        sim.tick();
        std::thread::sleep(Duration::from_millis(60));
        sim.add_debug_position([0.0, 0.0, 1.0], None, DEFAULT_DURATION);
        sim.tick();

        let lines = &recorded.borrow().lines;
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].to, [0.0, 0.0, 1.0]);
        assert_eq!(lines[0].width, 2.0);
    }
}
