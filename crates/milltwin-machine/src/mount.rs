//! Tool mount and the machine-with-tool assembly.

use milltwin_math::Pose;

use crate::kinematics::{IkSolution, MachineKinematics};
use crate::tool::ToolHolder;

/// The spindle-nose mount: an optional attached tool holder.
///
/// With nothing attached the mount is a pass-through: the tip pose is
/// the spindle pose itself, so kinematics callers never need to branch
/// on tool presence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolMount {
    holder: Option<ToolHolder>,
}

impl ToolMount {
    /// An empty mount.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a holder, replacing any current one.
    ///
    /// Invalid holders are rejected and the current attachment kept;
    /// returns whether the attach happened.
    pub fn attach(&mut self, holder: ToolHolder) -> bool {
        if !holder.is_valid() {
            return false;
        }
        self.holder = Some(holder);
        true
    }

    /// Remove and return the attached holder, if any.
    pub fn detach(&mut self) -> Option<ToolHolder> {
        self.holder.take()
    }

    /// Whether a tool is attached.
    pub fn has_tool(&self) -> bool {
        self.holder.is_some()
    }

    /// The attached holder, if any.
    pub fn holder(&self) -> Option<&ToolHolder> {
        self.holder.as_ref()
    }

    /// Tool-tip pose for a spindle pose; identity pass-through when empty.
    pub fn tip_pose(&self, spindle: &Pose) -> Pose {
        match &self.holder {
            Some(holder) => holder.tip_pose(spindle),
            None => *spindle,
        }
    }

    /// Spindle pose that puts the tool tip at `tip`; pass-through when empty.
    pub fn spindle_pose_for_tip(&self, tip: &Pose) -> Pose {
        match &self.holder {
            Some(holder) => holder.spindle_pose_for_tip(tip),
            None => *tip,
        }
    }
}

/// A kinematics model composed with its tool mount.
///
/// This is the full chain callers usually want: axis positions in,
/// tool-tip pose out, and the inverse of that chain for targeting.
#[derive(Clone)]
pub struct MachineAssembly {
    kinematics: Box<dyn MachineKinematics>,
    mount: ToolMount,
}

impl MachineAssembly {
    /// New assembly with an empty mount.
    pub fn new(kinematics: Box<dyn MachineKinematics>) -> Self {
        Self {
            kinematics,
            mount: ToolMount::new(),
        }
    }

    /// The kinematics model.
    pub fn kinematics(&self) -> &dyn MachineKinematics {
        self.kinematics.as_ref()
    }

    /// The tool mount.
    pub fn mount(&self) -> &ToolMount {
        &self.mount
    }

    /// Mutable access to the mount, for attach/detach.
    pub fn mount_mut(&mut self) -> &mut ToolMount {
        &mut self.mount
    }

    /// Tool-tip pose for the given axis positions.
    ///
    /// `None` when forward kinematics reports the positions invalid.
    pub fn tool_tip_pose(&self, axis_positions: &[f64; 6]) -> Option<Pose> {
        let fk = self.kinematics.forward(axis_positions);
        if !fk.valid {
            return None;
        }
        Some(self.mount.tip_pose(&fk.pose))
    }

    /// Inverse kinematics for a tool-tip target.
    ///
    /// Converts the tip target back to a spindle target through the
    /// mount, then solves the underlying kinematics.
    pub fn inverse_for_tip(&self, tip_target: &Pose) -> Vec<IkSolution> {
        let spindle_target = self.mount.spindle_pose_for_tip(tip_target);
        self.kinematics.inverse(&spindle_target)
    }

    /// Whether the tip target has at least one valid solution.
    pub fn is_tip_reachable(&self, tip_target: &Pose) -> bool {
        self.inverse_for_tip(tip_target)
            .first()
            .is_some_and(|s| s.valid)
    }

    /// Check kinematics and any attached holder.
    pub fn is_valid(&self) -> bool {
        self.kinematics.is_valid() && self.mount.holder().map_or(true, ToolHolder::is_valid)
    }
}

impl std::fmt::Debug for MachineAssembly {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MachineAssembly")
            .field("kinematics", &self.kinematics.kind())
            .field("mount", &self.mount)
            .finish()
    }
}
