//! urdfsim CLI - run and inspect URDF robots in simulation
//!
//! Loads a robot into a headless Rapier world, logs through `tracing`
//! (filter with `RUST_LOG`).

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;
use urdfsim::{LogViewer, Orientation, Simulation, SimulationConfig, DEFAULT_DURATION};
use urdfsim_math::matrix_to_pose;

#[derive(Parser)]
#[command(name = "urdfsim")]
#[command(about = "Run URDF robots in a physics simulation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a robot and step the simulation
    Run {
        /// Path to the .urdf file
        urdf: PathBuf,
        /// TOML settings file
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Number of steps (default: run forever)
        #[arg(short, long)]
        steps: Option<usize>,
        /// Pin the robot base in place
        #[arg(long)]
        fixed: bool,
        /// Run without a ground plane
        #[arg(long)]
        no_floor: bool,
        /// Step as fast as possible instead of in real time
        #[arg(long)]
        no_real_time: bool,
        /// Trace the base and every frame with debug lines
        #[arg(long)]
        draw: bool,
    },
    /// List the DOFs (axis and limits), frames and mass of a robot
    Info {
        /// Path to the .urdf file
        urdf: PathBuf,
    },
    /// Print the transform from one frame to another
    Pose {
        /// Path to the .urdf file
        urdf: PathBuf,
        /// Source frame ("origin" for the base)
        frame_a: String,
        /// Target frame ("origin" for the base)
        frame_b: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            urdf,
            config,
            steps,
            fixed,
            no_floor,
            no_real_time,
            draw,
        } => {
            let mut config = load_config(config.as_deref())?;
            config.fixed |= fixed;
            config.floor &= !no_floor;
            config.real_time &= !no_real_time;
            run(&urdf, config, steps, draw)?;
        }
        Commands::Info { urdf } => {
            show_info(&urdf)?;
        }
        Commands::Pose {
            urdf,
            frame_a,
            frame_b,
        } => {
            show_pose(&urdf, &frame_a, &frame_b)?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<SimulationConfig> {
    match path {
        Some(path) => SimulationConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(SimulationConfig::default()),
    }
}

fn open(urdf: &Path, config: SimulationConfig) -> Result<Simulation> {
    Simulation::with_viewer(urdf, config, Box::new(LogViewer::new()))
        .with_context(|| format!("Failed to load robot {}", urdf.display()))
}

fn run(urdf: &Path, config: SimulationConfig, steps: Option<usize>, draw: bool) -> Result<()> {
    let height = config.start_height;
    let mut sim = open(urdf, config)?;
    sim.reset(height, Orientation::Straight)?;

    let Some(steps) = steps else {
        if !draw {
            sim.execute();
        }
        loop {
            trace_frames(&mut sim)?;
            sim.tick();
        }
    };

    for _ in 0..steps {
        if draw {
            trace_frames(&mut sim)?;
        }
        sim.tick();
    }

    let (position, rpy) = sim.robot_pose()?;
    info!(
        "t={:.3}s base at [{:.3}, {:.3}, {:.3}] rpy [{:.3}, {:.3}, {:.3}]",
        sim.time(),
        position[0],
        position[1],
        position[2],
        rpy[0],
        rpy[1],
        rpy[2]
    );
    for contact in sim.contact_points() {
        info!(
            "contact {} at [{:.3}, {:.3}, {:.3}] {:.2}N",
            contact.link,
            contact.position[0],
            contact.position[1],
            contact.position[2],
            contact.normal_force
        );
    }
    info!("self collisions: {:.2}N", sim.auto_collisions());

    Ok(())
}

fn trace_frames(sim: &mut Simulation) -> Result<()> {
    let (base, _) = sim.robot_pose()?;
    sim.add_debug_position(base, None, DEFAULT_DURATION);
    for (position, _) in sim.get_frames()?.into_values() {
        sim.add_debug_position(position, None, DEFAULT_DURATION);
    }
    Ok(())
}

fn show_info(urdf: &Path) -> Result<()> {
    let config = SimulationConfig {
        real_time: false,
        ..Default::default()
    };
    let sim = open(urdf, config)?;

    println!("Robot: {}", urdf.display());
    println!("  Mass: {:.3} kg", sim.robot_mass()?);
    println!("  DOFs: {}", sim.joints().len());
    for (i, name) in sim.joints().iter().enumerate() {
        let joint = sim.joint_info(name)?;
        println!(
            "    [{}] {} {:?} axis [{:.3}, {:.3}, {:.3}] limits [{:.4}, {:.4}]",
            i,
            name,
            joint.kind,
            joint.axis[0],
            joint.axis[1],
            joint.axis[2],
            joint.lower,
            joint.upper
        );
    }
    println!("  Frames: {}", sim.frames().len());
    for (name, (position, rpy)) in sim.get_frames()? {
        println!(
            "    {} xyz [{:.4}, {:.4}, {:.4}] rpy [{:.4}, {:.4}, {:.4}]",
            name, position[0], position[1], position[2], rpy[0], rpy[1], rpy[2]
        );
    }

    Ok(())
}

fn show_pose(urdf: &Path, frame_a: &str, frame_b: &str) -> Result<()> {
    let config = SimulationConfig {
        real_time: false,
        fixed: true,
        ..Default::default()
    };
    let sim = open(urdf, config)?;
    let m = sim.transformation(frame_a, frame_b)?;

    println!("{} -> {}:", frame_a, frame_b);
    for r in 0..4 {
        println!(
            "  [{:>9.5} {:>9.5} {:>9.5} {:>9.5}]",
            m[(r, 0)],
            m[(r, 1)],
            m[(r, 2)],
            m[(r, 3)]
        );
    }

    let (position, quaternion) = matrix_to_pose(&m).to_xyzw();
    println!(
        "  xyz [{:.5}, {:.5}, {:.5}] quat (x y z w) [{:.5}, {:.5}, {:.5}, {:.5}]",
        position[0], position[1], position[2], quaternion[0], quaternion[1], quaternion[2], quaternion[3]
    );

    Ok(())
}
