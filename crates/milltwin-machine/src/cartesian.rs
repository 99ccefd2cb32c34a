//! Standard 3-axis Cartesian machine kinematics.

use milltwin_math::{Aabb, Point3, Pose};
use serde::{Deserialize, Serialize};

use crate::axis::AxisConfig;
use crate::kinematics::{ForwardKinematics, IkSolution, MachineKinematics};

/// 3-axis Cartesian machine: X, Y, Z linear axes, fixed tool orientation.
///
/// Axis positions map 1:1 onto the tool position, so inverse
/// kinematics is exact and unique inside limits and empty outside.
/// Rotary axes are absent; the rotation component of a target pose is
/// ignored (the tool always points down).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cartesian3Axis {
    x_limits: (f64, f64),
    y_limits: (f64, f64),
    z_limits: (f64, f64),
}

impl Cartesian3Axis {
    /// New machine with per-axis travel limits; malformed ranges are swapped.
    pub fn new(x_limits: (f64, f64), y_limits: (f64, f64), z_limits: (f64, f64)) -> Self {
        let fix = |(a, b): (f64, f64)| if a <= b { (a, b) } else { (b, a) };
        Self {
            x_limits: fix(x_limits),
            y_limits: fix(y_limits),
            z_limits: fix(z_limits),
        }
    }

    /// X travel limits.
    pub fn x_limits(&self) -> (f64, f64) {
        self.x_limits
    }

    /// Y travel limits.
    pub fn y_limits(&self) -> (f64, f64) {
        self.y_limits
    }

    /// Z travel limits.
    pub fn z_limits(&self) -> (f64, f64) {
        self.z_limits
    }

    fn in_limits(&self, x: f64, y: f64, z: f64) -> bool {
        x.is_finite()
            && y.is_finite()
            && z.is_finite()
            && x >= self.x_limits.0
            && x <= self.x_limits.1
            && y >= self.y_limits.0
            && y <= self.y_limits.1
            && z >= self.z_limits.0
            && z <= self.z_limits.1
    }
}

impl Default for Cartesian3Axis {
    /// A generous default envelope: +/-1000 mm in X/Y, +/-100 mm in Z.
    fn default() -> Self {
        Self::new((-1000.0, 1000.0), (-1000.0, 1000.0), (-100.0, 100.0))
    }
}

impl MachineKinematics for Cartesian3Axis {
    fn axis_config(&self) -> AxisConfig {
        AxisConfig::linear3()
    }

    fn axis_limits(&self) -> [(f64, f64); 6] {
        [
            self.x_limits,
            self.y_limits,
            self.z_limits,
            (0.0, 0.0),
            (0.0, 0.0),
            (0.0, 0.0),
        ]
    }

    fn forward(&self, axis_positions: &[f64; 6]) -> ForwardKinematics {
        let [x, y, z, ..] = *axis_positions;
        if !self.in_limits(x, y, z) {
            return ForwardKinematics::invalid(*axis_positions);
        }

        ForwardKinematics {
            pose: Pose::translation(x, y, z),
            axis_positions: *axis_positions,
            valid: true,
        }
    }

    fn inverse(&self, target: &Pose) -> Vec<IkSolution> {
        let p = target.position();
        if !self.in_limits(p.x, p.y, p.z) {
            return Vec::new();
        }

        let axis_positions = [p.x, p.y, p.z, 0.0, 0.0, 0.0];
        // Round-trip check: the solution is only as valid as its forward pass.
        let fk = self.forward(&axis_positions);
        vec![IkSolution {
            axis_positions,
            pose: fk.pose,
            valid: fk.valid,
        }]
    }

    fn work_envelope(&self) -> Aabb {
        Aabb::new(
            Point3::new(self.x_limits.0, self.y_limits.0, self.z_limits.0),
            Point3::new(self.x_limits.1, self.y_limits.1, self.z_limits.1),
        )
    }

    fn boxed_clone(&self) -> Box<dyn MachineKinematics> {
        Box::new(*self)
    }

    fn kind(&self) -> &'static str {
        "cartesian-3axis"
    }

    fn is_valid(&self) -> bool {
        self.x_limits.0 < self.x_limits.1
            && self.y_limits.0 < self.y_limits.1
            && self.z_limits.0 < self.z_limits.1
    }
}
