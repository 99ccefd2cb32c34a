//! The machine kinematics contract.

use milltwin_math::{Aabb, Pose};

use crate::axis::AxisConfig;

/// Result of a forward kinematics evaluation.
///
/// Invalid results carry an identity pose; callers must check `valid`
/// before using the pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForwardKinematics {
    /// Tool pose in machine coordinates.
    pub pose: Pose,
    /// The axis positions the pose was computed from.
    pub axis_positions: [f64; 6],
    /// Whether the inputs were finite and inside axis limits.
    pub valid: bool,
}

impl ForwardKinematics {
    /// An invalid result for out-of-limits or malformed inputs.
    pub fn invalid(axis_positions: [f64; 6]) -> Self {
        Self {
            pose: Pose::identity(),
            axis_positions,
            valid: false,
        }
    }
}

/// One inverse kinematics solution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IkSolution {
    /// Axis positions achieving the target pose.
    pub axis_positions: [f64; 6],
    /// Pose recomputed from the solution via forward kinematics.
    pub pose: Pose,
    /// Whether the round-trip forward check succeeded.
    pub valid: bool,
}

/// Bidirectional mapping between axis space and tool pose.
///
/// Kinematics objects are stateless: all axis positions are passed
/// explicitly, so evaluations are deterministic and clone-friendly.
/// Malformed or NaN inputs yield invalid results, never a panic.
pub trait MachineKinematics: Send + Sync {
    /// Which of the six axes exist on this machine.
    fn axis_config(&self) -> AxisConfig;

    /// Travel limits per axis, `[(min, max); 6]` in [X, Y, Z, A, B, C]
    /// order. Absent axes report `(0.0, 0.0)`.
    fn axis_limits(&self) -> [(f64, f64); 6];

    /// Forward kinematics: axis positions to tool pose.
    fn forward(&self, axis_positions: &[f64; 6]) -> ForwardKinematics;

    /// Inverse kinematics: tool pose to axis positions.
    ///
    /// Returns zero or more solutions; an empty vector means the pose
    /// is unreachable. Each solution is verified by re-running forward
    /// kinematics on the computed axis values.
    fn inverse(&self, target: &Pose) -> Vec<IkSolution>;

    /// Whether the target pose has at least one valid solution.
    fn is_reachable(&self, target: &Pose) -> bool {
        self.inverse(target).first().is_some_and(|s| s.valid)
    }

    /// Conservative bounding box of all reachable tool positions.
    fn work_envelope(&self) -> Aabb;

    /// Deep copy behind the trait object.
    fn boxed_clone(&self) -> Box<dyn MachineKinematics>;

    /// Kinematics kind identifier.
    fn kind(&self) -> &'static str;

    /// Whether this kinematics object is well configured.
    fn is_valid(&self) -> bool;
}

impl Clone for Box<dyn MachineKinematics> {
    fn clone(&self) -> Self {
        self.boxed_clone()
    }
}
