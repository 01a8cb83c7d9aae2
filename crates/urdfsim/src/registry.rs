//! Name-based lookup of controllable joints and reference frames.
//!
//! Joint names follow a naming convention: names containing `_fixing`
//! are rigid welds and are ignored, names containing `_frame` mark
//! reference frames, and everything else is a controllable DOF.

use std::collections::HashMap;

/// Marker for welds that are neither DOFs nor frames.
const FIXING_MARKER: &str = "_fixing";

/// Marker for reference frames.
const FRAME_MARKER: &str = "_frame";

/// What a joint name stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JointRole {
    /// Rigid weld, excluded from the registry.
    Fixing,
    /// Reference frame.
    Frame,
    /// Controllable DOF.
    Joint,
}

impl JointRole {
    /// Classify a joint by name. `_fixing` wins over `_frame`.
    pub fn classify(name: &str) -> Self {
        if name.contains(FIXING_MARKER) {
            JointRole::Fixing
        } else if name.contains(FRAME_MARKER) {
            JointRole::Frame
        } else {
            JointRole::Joint
        }
    }
}

/// Maps joint and frame names to engine joint indices.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    /// Controllable joint names, by ordinal.
    joint_names: Vec<String>,
    /// Engine joint index of each controllable joint, by ordinal.
    joint_indices: Vec<usize>,
    ordinals: HashMap<String, usize>,
    frame_names: Vec<String>,
    frames: HashMap<String, usize>,
}

impl Registry {
    /// Scan joint names in engine order.
    pub fn build<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut registry = Registry::default();
        for (k, name) in names.into_iter().enumerate() {
            match JointRole::classify(name) {
                JointRole::Fixing => {}
                JointRole::Frame => {
                    registry.frames.insert(name.to_string(), k);
                    registry.frame_names.push(name.to_string());
                }
                JointRole::Joint => {
                    registry
                        .ordinals
                        .insert(name.to_string(), registry.joint_names.len());
                    registry.joint_names.push(name.to_string());
                    registry.joint_indices.push(k);
                }
            }
        }
        registry
    }

    /// Number of controllable joints.
    pub fn num_joints(&self) -> usize {
        self.joint_names.len()
    }

    /// Number of frames.
    pub fn num_frames(&self) -> usize {
        self.frame_names.len()
    }

    /// Controllable joint names in ordinal order.
    pub fn joint_names(&self) -> &[String] {
        &self.joint_names
    }

    /// Frame names in scan order.
    pub fn frame_names(&self) -> &[String] {
        &self.frame_names
    }

    /// Engine joint index of a controllable joint.
    pub fn joint(&self, name: &str) -> Option<usize> {
        self.ordinal(name).map(|n| self.joint_indices[n])
    }

    /// Ordinal of a controllable joint among the DOFs.
    pub fn ordinal(&self, name: &str) -> Option<usize> {
        self.ordinals.get(name).copied()
    }

    /// Engine joint index of a frame (the frame link is that joint's child).
    pub fn frame(&self, name: &str) -> Option<usize> {
        self.frames.get(name).copied()
    }

    /// `(name, engine index)` of every controllable joint, by ordinal.
    pub fn joints(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.joint_names
            .iter()
            .map(String::as_str)
            .zip(self.joint_indices.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Registry {
        Registry::build([
            "left_hip",
            "trunk_fixing",
            "camera_frame",
            "left_knee",
            "foot_frame_fixing",
            "tip_frame",
            "right_hip",
        ])
    }

    #[test]
    fn test_classify() {
        assert_eq!(JointRole::classify("knee"), JointRole::Joint);
        assert_eq!(JointRole::classify("camera_frame"), JointRole::Frame);
        assert_eq!(JointRole::classify("a_fixing"), JointRole::Fixing);
        assert_eq!(JointRole::classify("a_frame_fixing"), JointRole::Fixing);
    }

    #[test]
    fn test_dense_ordinals() {
        let registry = registry();
        assert_eq!(registry.num_joints(), 3);
        assert_eq!(registry.joint_names(), ["left_hip", "left_knee", "right_hip"]);
        assert_eq!(registry.ordinal("left_hip"), Some(0));
        assert_eq!(registry.ordinal("left_knee"), Some(1));
        assert_eq!(registry.ordinal("right_hip"), Some(2));
    }

    #[test]
    fn test_engine_indices() {
        let registry = registry();
        assert_eq!(registry.joint("left_knee"), Some(3));
        assert_eq!(registry.joint("right_hip"), Some(6));
        assert_eq!(registry.frame("camera_frame"), Some(2));
        assert_eq!(registry.frame("tip_frame"), Some(5));
        assert_eq!(registry.num_frames(), 2);
    }

    #[test]
    fn test_fixing_joints_excluded() {
        let registry = registry();
        assert_eq!(registry.joint("trunk_fixing"), None);
        assert_eq!(registry.frame("foot_frame_fixing"), None);
        assert_eq!(registry.frame("left_hip"), None);
    }

    #[test]
    fn test_joints_iter() {
        let registry = registry();
        let pairs: Vec<_> = registry.joints().collect();
        assert_eq!(pairs, vec![("left_hip", 0), ("left_knee", 3), ("right_hip", 6)]);
    }
}
