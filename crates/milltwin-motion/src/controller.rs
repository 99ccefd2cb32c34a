//! The motion controller.

use milltwin_machine::{AxisId, Machine, MachineKinematics};
use milltwin_math::Pose;
use tracing::debug;

use crate::axis::MachineAxis;
use crate::jog::JogCommand;

/// Post-update axis error below which a target is considered reached.
pub const TARGET_TOLERANCE: f64 = 1e-6;

/// Integrates jog and target-position commands into axis positions
/// under per-axis velocity limits.
///
/// All integration is explicit forward Euler over caller-supplied
/// `dt`; there is no implicit solver or sub-stepping. Callers drive
/// one tick at a time: [`apply_jog`](Self::apply_jog) or
/// [`apply_target_position`](Self::apply_target_position) for
/// commanded axes, then [`update`](Self::update) once per tick so
/// undriven axes decelerate toward zero.
pub struct MotionController {
    kinematics: Box<dyn MachineKinematics>,
    axes: [Option<MachineAxis>; 6],
    driven: [bool; 6],
}

impl MotionController {
    /// Controller over a kinematics model and a machine profile.
    ///
    /// Only axes the profile defines are driven; commands for other
    /// axes are rejected.
    pub fn new(kinematics: Box<dyn MachineKinematics>, machine: &Machine) -> Self {
        let axes = AxisId::ALL
            .map(|id| machine.axis(id).map(|def| MachineAxis::new(*def, 0.0)));
        Self {
            kinematics,
            axes,
            driven: [false; 6],
        }
    }

    /// The kinematics model.
    pub fn kinematics(&self) -> &dyn MachineKinematics {
        self.kinematics.as_ref()
    }

    /// Current positions in [X, Y, Z, A, B, C] order; undefined axes
    /// report 0.
    pub fn axis_positions(&self) -> [f64; 6] {
        let mut positions = [0.0; 6];
        for (slot, axis) in positions.iter_mut().zip(&self.axes) {
            if let Some(axis) = axis {
                *slot = axis.position();
            }
        }
        positions
    }

    /// One axis's runtime state, if the machine has it.
    pub fn axis(&self, id: AxisId) -> Option<&MachineAxis> {
        self.axes[id.index()].as_ref()
    }

    /// Tool pose at the current axis positions, when they are
    /// reachable.
    pub fn tool_pose(&self) -> Option<Pose> {
        let fk = self.kinematics.forward(&self.axis_positions());
        fk.valid.then_some(fk.pose)
    }

    /// Apply one jog command for one tick.
    ///
    /// Velocity commands clamp to the axis maximum. Distance-limited
    /// jogs recompute the velocity needed to land exactly on the
    /// remaining distance within this call, so a jog never overshoots
    /// and corrects. Returns false for commands on axes the machine
    /// lacks or with unusable numbers.
    pub fn apply_jog(&mut self, command: &JogCommand, dt: f64) -> bool {
        if !command.is_valid() || !dt.is_finite() || dt <= 0.0 {
            return false;
        }
        let index = command.axis().index();
        let Some(axis) = self.axes[index].as_mut() else {
            debug!(axis = ?command.axis(), "jog on undefined axis rejected");
            return false;
        };

        let commanded = match *command {
            JogCommand::Stop { .. } => 0.0,
            JogCommand::Velocity { velocity, .. } => velocity,
            JogCommand::Distance {
                speed, distance, ..
            } => {
                // Land exactly on the remaining distance if a full-speed
                // tick would pass it.
                let exact = distance / dt;
                if exact.abs() < speed {
                    exact
                } else {
                    speed.copysign(distance)
                }
            }
        };

        axis.update(commanded, dt);
        self.driven[index] = true;
        true
    }

    /// Drive every axis one tick toward the axis-space solution of a
    /// target tool pose.
    ///
    /// Each axis moves at signed max velocity toward its target,
    /// clamped so it cannot overshoot within `dt`. Returns true only
    /// if every axis's post-update error is below [`TARGET_TOLERANCE`]
    /// for this call; it is not a promise of eventual convergence.
    pub fn apply_target_position(&mut self, target: &Pose, dt: f64) -> bool {
        if !dt.is_finite() || dt <= 0.0 {
            return false;
        }
        let solution = match self.kinematics.inverse(target).into_iter().find(|s| s.valid) {
            Some(solution) => solution,
            None => {
                debug!("target pose unreachable");
                return false;
            }
        };

        let mut reached = true;
        for (index, axis) in self.axes.iter_mut().enumerate() {
            let Some(axis) = axis else { continue };
            let error = solution.axis_positions[index] - axis.position();
            let max_v = axis.definition().max_velocity();
            // Signed max velocity, clamped to land on the target.
            let commanded = if (error / dt).abs() < max_v {
                error / dt
            } else {
                max_v.copysign(error)
            };
            axis.update(commanded, dt);
            self.driven[index] = true;

            if (solution.axis_positions[index] - axis.position()).abs() > TARGET_TOLERANCE {
                reached = false;
            }
        }
        reached
    }

    /// Tick all axes not driven since the last `update`, decaying them
    /// toward zero commanded velocity, then clear the driven marks.
    ///
    /// Must be invoked once per tick even with no active command so
    /// idle axes can decelerate.
    pub fn update(&mut self, dt: f64) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        for (index, axis) in self.axes.iter_mut().enumerate() {
            if let Some(axis) = axis {
                if !self.driven[index] {
                    axis.update(0.0, dt);
                }
            }
        }
        self.driven = [false; 6];
    }

    /// Stop everything and move the axes to given positions, clamped
    /// into their travel limits.
    pub fn reset(&mut self, positions: [f64; 6]) {
        for (index, axis) in self.axes.iter_mut().enumerate() {
            if let Some(axis) = axis {
                axis.reset(positions[index]);
            }
        }
        self.driven = [false; 6];
    }

    /// Whether every defined axis sits inside its travel limits.
    pub fn is_within_limits(&self) -> bool {
        self.axes
            .iter()
            .flatten()
            .all(MachineAxis::is_within_limits)
    }
}

impl std::fmt::Debug for MotionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MotionController")
            .field("kinematics", &self.kinematics.kind())
            .field("positions", &self.axis_positions())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use milltwin_machine::{Cartesian3Axis, Spindle};
    use milltwin_math::Point3;
    use proptest::prelude::*;

    fn controller() -> MotionController {
        let machine = Machine::cartesian3(
            "test-mill",
            (-100.0, 100.0),
            (-100.0, 100.0),
            50.0,
            1000.0,
            Spindle::default(),
        );
        let kinematics = Cartesian3Axis::new((-100.0, 100.0), (-100.0, 100.0), (-100.0, 100.0));
        MotionController::new(Box::new(kinematics), &machine)
    }

    #[test]
    fn test_distance_jog_lands_exactly() {
        // 5-unit jog at speed 10 with dt = 1.0 must land at exactly +5,
        // not overshoot to +10.
        let mut ctrl = controller();
        assert!(ctrl.apply_jog(&JogCommand::distance(AxisId::X, 10.0, 5.0), 1.0));
        ctrl.update(1.0);
        assert!((ctrl.axis_positions()[0] - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_distance_jog_negative_direction() {
        let mut ctrl = controller();
        ctrl.apply_jog(&JogCommand::distance(AxisId::Y, 10.0, -5.0), 1.0);
        assert!((ctrl.axis_positions()[1] + 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_long_distance_jog_runs_at_speed() {
        // 100 units remaining at speed 10: a 1 s tick covers 10 units.
        let mut ctrl = controller();
        ctrl.apply_jog(&JogCommand::distance(AxisId::X, 10.0, 100.0), 1.0);
        assert!((ctrl.axis_positions()[0] - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_velocity_jog_clamps_to_axis_maximum() {
        let mut ctrl = controller();
        ctrl.apply_jog(&JogCommand::velocity(AxisId::X, 500.0), 1.0);
        // Axis max is 50.
        assert!((ctrl.axis_positions()[0] - 50.0).abs() < 1e-12);
    }

    #[test]
    fn test_stop_command_zeroes_velocity() {
        let mut ctrl = controller();
        ctrl.apply_jog(&JogCommand::velocity(AxisId::X, 20.0), 1.0);
        ctrl.update(1.0);
        ctrl.apply_jog(&JogCommand::stop(AxisId::X), 1.0);
        assert_eq!(ctrl.axis(AxisId::X).unwrap().velocity(), 0.0);
    }

    #[test]
    fn test_jog_on_undefined_axis_rejected() {
        let mut ctrl = controller();
        assert!(!ctrl.apply_jog(&JogCommand::velocity(AxisId::A, 10.0), 1.0));
    }

    #[test]
    fn test_update_decays_idle_axes() {
        let mut ctrl = controller();
        ctrl.apply_jog(&JogCommand::velocity(AxisId::X, 20.0), 1.0);
        ctrl.update(1.0);
        // No command this tick: the axis decelerates to rest.
        ctrl.update(1.0);
        assert_eq!(ctrl.axis(AxisId::X).unwrap().velocity(), 0.0);
    }

    #[test]
    fn test_update_does_not_double_step_driven_axes() {
        let mut ctrl = controller();
        ctrl.apply_jog(&JogCommand::distance(AxisId::X, 10.0, 5.0), 1.0);
        let after_jog = ctrl.axis_positions()[0];
        ctrl.update(1.0);
        assert_eq!(ctrl.axis_positions()[0], after_jog);
    }

    #[test]
    fn test_apply_target_position_reaches_close_target() {
        let mut ctrl = controller();
        let target = Pose::translation(1.0, -2.0, 0.5);
        // Within one tick's reach at max velocity 50.
        assert!(ctrl.apply_target_position(&target, 1.0));
        let positions = ctrl.axis_positions();
        assert!((positions[0] - 1.0).abs() < TARGET_TOLERANCE);
        assert!((positions[1] + 2.0).abs() < TARGET_TOLERANCE);
        assert!((positions[2] - 0.5).abs() < TARGET_TOLERANCE);
    }

    #[test]
    fn test_apply_target_position_far_target_reports_false() {
        let mut ctrl = controller();
        let target = Pose::translation(90.0, 0.0, 0.0);
        // One 0.1 s tick at 50 units/s covers 5 units; not there yet.
        assert!(!ctrl.apply_target_position(&target, 0.1));
        assert!((ctrl.axis_positions()[0] - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_apply_target_position_converges_over_ticks() {
        let mut ctrl = controller();
        let target = Pose::translation(30.0, -40.0, 10.0);
        let mut reached = false;
        for _ in 0..100 {
            reached = ctrl.apply_target_position(&target, 0.1);
            ctrl.update(0.1);
            if reached {
                break;
            }
        }
        assert!(reached);
        let pose = ctrl.tool_pose().unwrap();
        assert!((pose.position() - Point3::new(30.0, -40.0, 10.0)).norm() < 1e-5);
    }

    #[test]
    fn test_unreachable_target_rejected() {
        let mut ctrl = controller();
        assert!(!ctrl.apply_target_position(&Pose::translation(500.0, 0.0, 0.0), 1.0));
        assert_eq!(ctrl.axis_positions(), [0.0; 6]);
    }

    #[test]
    fn test_reset_stops_and_repositions() {
        let mut ctrl = controller();
        ctrl.apply_jog(&JogCommand::velocity(AxisId::X, 20.0), 1.0);
        ctrl.reset([10.0, -10.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(ctrl.axis_positions()[0], 10.0);
        assert_eq!(ctrl.axis(AxisId::X).unwrap().velocity(), 0.0);
        assert!(ctrl.is_within_limits());
    }

    #[test]
    fn test_tool_pose_follows_axes() {
        let mut ctrl = controller();
        ctrl.apply_jog(&JogCommand::distance(AxisId::Z, 10.0, 5.0), 1.0);
        let pose = ctrl.tool_pose().unwrap();
        assert!((pose.position() - Point3::new(0.0, 0.0, 5.0)).norm() < 1e-9);
    }

    proptest! {
        // A distance-limited jog from rest never travels past the
        // commanded distance and never moves against its sign.
        #[test]
        fn prop_distance_jog_never_overshoots(
            speed in 0.1f64..200.0,
            distance in -50.0f64..50.0,
            dt in 0.001f64..2.0,
        ) {
            let mut ctrl = controller();
            prop_assert!(ctrl.apply_jog(
                &JogCommand::distance(AxisId::X, speed, distance),
                dt,
            ));
            ctrl.update(dt);

            let traveled = ctrl.axis_positions()[0];
            prop_assert!(traveled.abs() <= distance.abs() + 1e-9);
            prop_assert!(traveled * distance >= 0.0);
        }
    }
}
