//! Interface to whatever renders the simulation.
//!
//! A [`Simulation`](crate::Simulation) built with a viewer forwards camera
//! moves, link colours and debug lines to it. Without one it runs headless.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::debug_lines::DrawnLine;

/// Viewer camera orbiting a target point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Distance from the target (m).
    pub distance: f64,
    /// Yaw (deg).
    pub yaw: f64,
    /// Pitch (deg).
    pub pitch: f64,
    /// Point looked at (m).
    pub target: [f64; 3],
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            distance: 1.5,
            yaw: 50.0,
            pitch: -35.0,
            target: [0.0, 0.0, 0.0],
        }
    }
}

/// Viewer display options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewerOptions {
    /// Show the interaction side panels.
    pub panels: bool,
    /// Let the user drag bodies with the mouse.
    pub mouse_picking: bool,
}

/// Trait for simulation front-ends.
///
/// Every method has a no-op default so an implementation only overrides
/// what it can display.
pub trait Viewer {
    /// Apply display options.
    fn configure(&mut self, _options: ViewerOptions) {}

    /// Current camera.
    fn camera(&self) -> Camera {
        Camera::default()
    }

    /// Move the camera.
    fn set_camera(&mut self, _camera: &Camera) {}

    /// Tint a robot link, RGBA in `[0, 1]`.
    fn set_link_color(&mut self, _link: &str, _rgba: [f64; 4]) {}

    /// Draw a debug line that fades after its duration.
    fn draw_line(&mut self, _line: &DrawnLine) {}
}

/// Viewer that reports everything through `tracing`.
#[derive(Debug, Clone, Default)]
pub struct LogViewer {
    camera: Camera,
}

impl LogViewer {
    /// Create a viewer with the default camera.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Viewer for LogViewer {
    fn configure(&mut self, options: ViewerOptions) {
        debug!(
            "Viewer panels={} mouse_picking={}",
            options.panels, options.mouse_picking
        );
    }

    fn camera(&self) -> Camera {
        self.camera
    }

    fn set_camera(&mut self, camera: &Camera) {
        debug!("Camera looking at {:?}", camera.target);
        self.camera = *camera;
    }

    fn set_link_color(&mut self, link: &str, rgba: [f64; 4]) {
        debug!("Link '{}' color {:?}", link, rgba);
    }

    fn draw_line(&mut self, line: &DrawnLine) {
        debug!(
            "Line {:?} -> {:?} color={:?} duration={}s",
            line.from, line.to, line.color, line.duration
        );
    }
}
