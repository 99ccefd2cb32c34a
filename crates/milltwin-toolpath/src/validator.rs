//! Toolpath invariant checking.

use milltwin_machine::{AxisId, Machine};
use milltwin_math::Point3;
use thiserror::Error;

use crate::moves::ToolpathMove;
use crate::path::Toolpath;
use crate::state::ToolpathState;

/// A violated toolpath invariant, indexed by the offending move.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A state contains NaN or infinite values.
    #[error("move {index}: endpoint state is not finite")]
    NonFiniteState {
        /// Offending move index.
        index: usize,
    },
    /// A cutting move has no feed rate on its end state.
    #[error("move {index}: cutting move has no feed rate")]
    MissingFeedRate {
        /// Offending move index.
        index: usize,
    },
    /// An arc move has no center.
    #[error("move {index}: arc move has no center")]
    MissingArcCenter {
        /// Offending move index.
        index: usize,
    },
    /// A motion move covers no distance.
    #[error("move {index}: motion move has zero length")]
    ZeroLengthMove {
        /// Offending move index.
        index: usize,
    },
    /// Arc endpoints lie at different distances from the center.
    #[error(
        "move {index}: arc radii disagree (start {start_radius:.6}, end {end_radius:.6})"
    )]
    ArcRadiusMismatch {
        /// Offending move index.
        index: usize,
        /// Distance from start to center.
        start_radius: f64,
        /// Distance from end to center.
        end_radius: f64,
    },
    /// Arc radius is below the representable minimum.
    #[error("move {index}: arc radius {radius:e} is degenerate")]
    DegenerateArcRadius {
        /// Offending move index.
        index: usize,
        /// The degenerate radius.
        radius: f64,
    },
    /// A move's end position does not meet the next move's start.
    #[error("move {index}: end position misses the next move's start by {gap:.6} mm")]
    Discontinuity {
        /// Index of the earlier move of the broken pair.
        index: usize,
        /// Junction gap in mm.
        gap: f64,
    },
    /// A commanded position lies outside the machine's axis limits.
    #[error("move {index}: axis {axis:?} position {position} outside machine limits")]
    AxisOutOfLimits {
        /// Offending move index.
        index: usize,
        /// Offending axis.
        axis: AxisId,
        /// Commanded position.
        position: f64,
    },
    /// A commanded spindle speed lies outside the spindle's range.
    #[error("move {index}: spindle speed {rpm} RPM outside machine range")]
    SpindleOutOfRange {
        /// Offending move index.
        index: usize,
        /// Commanded speed.
        rpm: f64,
    },
    /// A cutting move has no active tool.
    #[error("move {index}: cutting move has no active tool")]
    MissingTool {
        /// Offending move index.
        index: usize,
    },
    /// A tool change whose end tool equals its start tool.
    #[error("move {index}: tool change does not select a new tool")]
    ToolChangeNotNew {
        /// Offending move index.
        index: usize,
    },
    /// A rapid move over a span not cleared for rapid traversal.
    #[error("move {index}: rapid traversal is not allowed over this move")]
    RapidNotAllowed {
        /// Offending move index.
        index: usize,
    },
}

/// A pure, stateless toolpath checker.
///
/// Checks run in a fixed order over the whole path: move self-validity,
/// arc consistency, junction continuity, machine-limit containment
/// (only when a machine profile is supplied), tool consistency. The
/// first violated invariant is returned; an empty toolpath is
/// vacuously valid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolpathValidator {
    continuity_tolerance: f64,
    arc_tolerance: f64,
    min_arc_radius: f64,
}

impl Default for ToolpathValidator {
    fn default() -> Self {
        Self {
            continuity_tolerance: 1e-6,
            arc_tolerance: 1e-6,
            min_arc_radius: 1e-9,
        }
    }
}

impl ToolpathValidator {
    /// Validator with the standard tolerances.
    pub fn new() -> Self {
        Self::default()
    }

    /// Junction continuity tolerance in mm.
    pub fn continuity_tolerance(&self) -> f64 {
        self.continuity_tolerance
    }

    /// Validate a toolpath without machine limits.
    pub fn validate(&self, path: &Toolpath) -> Result<(), ValidationError> {
        self.run(path, None)
    }

    /// Validate a toolpath against a machine profile.
    pub fn validate_for_machine(
        &self,
        path: &Toolpath,
        machine: &Machine,
    ) -> Result<(), ValidationError> {
        self.run(path, Some(machine))
    }

    /// Non-failing predicate form of [`validate`](Self::validate).
    pub fn is_valid(&self, path: &Toolpath) -> bool {
        self.validate(path).is_ok()
    }

    /// Non-failing predicate form of
    /// [`validate_for_machine`](Self::validate_for_machine).
    pub fn is_valid_for_machine(&self, path: &Toolpath, machine: &Machine) -> bool {
        self.validate_for_machine(path, machine).is_ok()
    }

    fn run(&self, path: &Toolpath, machine: Option<&Machine>) -> Result<(), ValidationError> {
        let moves = path.moves();

        for (index, mv) in moves.iter().enumerate() {
            self.check_move(index, mv)?;
        }
        for (index, mv) in moves.iter().enumerate() {
            self.check_arc(index, mv)?;
        }
        for (index, pair) in moves.windows(2).enumerate() {
            self.check_continuity(index, &pair[0], &pair[1])?;
        }
        if let Some(machine) = machine {
            for (index, mv) in moves.iter().enumerate() {
                if index == 0 {
                    self.check_limits(index, mv.start(), machine)?;
                }
                self.check_limits(index, mv.end(), machine)?;
            }
        }
        for (index, mv) in moves.iter().enumerate() {
            self.check_tools(index, mv)?;
        }
        Ok(())
    }

    fn check_move(&self, index: usize, mv: &ToolpathMove) -> Result<(), ValidationError> {
        if !mv.states_valid() {
            return Err(ValidationError::NonFiniteState { index });
        }
        if mv.kind().is_cutting() && mv.end().feed_rate().is_none() {
            return Err(ValidationError::MissingFeedRate { index });
        }
        if mv.kind().is_arc() && mv.arc_center().is_none() {
            return Err(ValidationError::MissingArcCenter { index });
        }
        if !mv.kind().is_control() && mv.is_zero_length() {
            return Err(ValidationError::ZeroLengthMove { index });
        }
        if mv.kind() == crate::moves::MoveKind::Rapid && !mv.rapid_allowed() {
            return Err(ValidationError::RapidNotAllowed { index });
        }
        Ok(())
    }

    fn check_arc(&self, index: usize, mv: &ToolpathMove) -> Result<(), ValidationError> {
        if !mv.kind().is_arc() {
            return Ok(());
        }
        let Some(center) = mv.arc_center() else {
            return Ok(());
        };
        let start_radius = (mv.start().position() - center).norm();
        let end_radius = (mv.end().position() - center).norm();
        if start_radius <= self.min_arc_radius {
            return Err(ValidationError::DegenerateArcRadius {
                index,
                radius: start_radius,
            });
        }
        if (start_radius - end_radius).abs() > self.arc_tolerance {
            return Err(ValidationError::ArcRadiusMismatch {
                index,
                start_radius,
                end_radius,
            });
        }
        Ok(())
    }

    fn check_continuity(
        &self,
        index: usize,
        current: &ToolpathMove,
        next: &ToolpathMove,
    ) -> Result<(), ValidationError> {
        let gap: f64 = (next.start().position() - current.end().position()).norm();
        if gap > self.continuity_tolerance {
            return Err(ValidationError::Discontinuity { index, gap });
        }
        Ok(())
    }

    fn check_limits(
        &self,
        index: usize,
        state: &ToolpathState,
        machine: &Machine,
    ) -> Result<(), ValidationError> {
        let p: Point3 = state.position();
        let rotary = state.rotary();
        let values = [
            (AxisId::X, p.x),
            (AxisId::Y, p.y),
            (AxisId::Z, p.z),
            (AxisId::A, rotary[0]),
            (AxisId::B, rotary[1]),
            (AxisId::C, rotary[2]),
        ];
        for (axis, position) in values {
            match machine.axis(axis) {
                Some(def) => {
                    if !def.is_position_valid(position) {
                        return Err(ValidationError::AxisOutOfLimits {
                            index,
                            axis,
                            position,
                        });
                    }
                }
                // Commanding motion on a rotary axis the machine lacks.
                None => {
                    if axis.is_rotary() && position != 0.0 {
                        return Err(ValidationError::AxisOutOfLimits {
                            index,
                            axis,
                            position,
                        });
                    }
                }
            }
        }
        if state.spindle_rpm() > 0.0 && !machine.spindle().contains_rpm(state.spindle_rpm()) {
            return Err(ValidationError::SpindleOutOfRange {
                index,
                rpm: state.spindle_rpm(),
            });
        }
        Ok(())
    }

    fn check_tools(&self, index: usize, mv: &ToolpathMove) -> Result<(), ValidationError> {
        if mv.kind().is_cutting() && !mv.end().has_tool() {
            return Err(ValidationError::MissingTool { index });
        }
        if mv.kind() == crate::moves::MoveKind::ToolChange
            && (!mv.end().has_tool() || mv.end().tool_id() == mv.start().tool_id())
        {
            return Err(ValidationError::ToolChangeNotNew { index });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use milltwin_machine::Spindle;

    fn at(x: f64, y: f64, z: f64) -> ToolpathState {
        ToolpathState::at(Point3::new(x, y, z))
    }

    fn cut(from: ToolpathState, to: Point3) -> ToolpathMove {
        let end = from.clone().with_position(to).with_feed_rate(500.0).with_tool("T1");
        ToolpathMove::linear(from.with_tool("T1"), end)
    }

    fn chained_path() -> Toolpath {
        let mut path = Toolpath::new("chained");
        path.append(ToolpathMove::rapid(at(0.0, 0.0, 10.0), at(0.0, 0.0, 0.0)));
        path.append(cut(at(0.0, 0.0, 0.0), Point3::new(100.0, 0.0, 0.0)));
        path.append(cut(at(100.0, 0.0, 0.0), Point3::new(100.0, 50.0, 0.0)));
        path
    }

    #[test]
    fn test_empty_toolpath_is_vacuously_valid() {
        let validator = ToolpathValidator::new();
        assert!(validator.validate(&Toolpath::new("empty")).is_ok());
        assert!(validator.is_valid(&Toolpath::new("empty")));
    }

    #[test]
    fn test_chained_path_validates() {
        let validator = ToolpathValidator::new();
        assert!(validator.validate(&chained_path()).is_ok());
    }

    #[test]
    fn test_perturbed_junction_names_move_index() {
        // Shift the start of the third move by more than the tolerance.
        let mut path = Toolpath::new("broken");
        path.append(ToolpathMove::rapid(at(0.0, 0.0, 10.0), at(0.0, 0.0, 0.0)));
        path.append(cut(at(0.0, 0.0, 0.0), Point3::new(100.0, 0.0, 0.0)));
        path.append(cut(at(100.0, 1e-3, 0.0), Point3::new(100.0, 50.0, 0.0)));

        let err = ToolpathValidator::new().validate(&path).unwrap_err();
        assert!(matches!(err, ValidationError::Discontinuity { index: 1, .. }));
    }

    #[test]
    fn test_junction_within_tolerance_passes() {
        let mut path = Toolpath::new("almost");
        path.append(cut(at(0.0, 0.0, 0.0), Point3::new(100.0, 0.0, 0.0)));
        path.append(cut(at(100.0, 1e-7, 0.0), Point3::new(100.0, 50.0, 0.0)));
        assert!(ToolpathValidator::new().validate(&path).is_ok());
    }

    #[test]
    fn test_cutting_move_requires_feed() {
        let mut path = Toolpath::new("no-feed");
        let end = at(10.0, 0.0, 0.0).with_tool("T1");
        path.append(ToolpathMove::linear(at(0.0, 0.0, 0.0).with_tool("T1"), end));

        let err = ToolpathValidator::new().validate(&path).unwrap_err();
        assert_eq!(err, ValidationError::MissingFeedRate { index: 0 });
    }

    #[test]
    fn test_arc_radius_mismatch_fails() {
        let mut path = Toolpath::new("bad-arc");
        let start = at(10.0, 0.0, 0.0).with_feed_rate(300.0).with_tool("T1");
        // End sits at radius 11 while start sits at radius 10.
        let end = at(0.0, 11.0, 0.0).with_feed_rate(300.0).with_tool("T1");
        path.append(ToolpathMove::arc_ccw(start, end, Point3::origin()));

        let err = ToolpathValidator::new().validate(&path).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::ArcRadiusMismatch { index: 0, .. }
        ));
    }

    #[test]
    fn test_degenerate_arc_radius_fails() {
        let mut path = Toolpath::new("tiny-arc");
        let start = at(0.0, 0.0, 0.0).with_feed_rate(300.0).with_tool("T1");
        let end = at(1e-12, 0.0, 0.0).with_feed_rate(300.0).with_tool("T1");
        path.append(ToolpathMove::arc_cw(start, end, Point3::origin()));

        let err = ToolpathValidator::new().validate(&path).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::DegenerateArcRadius { index: 0, .. }
        ));
    }

    #[test]
    fn test_zero_length_motion_fails() {
        let mut path = Toolpath::new("zero");
        path.append(ToolpathMove::rapid(at(1.0, 2.0, 3.0), at(1.0, 2.0, 3.0)));
        let err = ToolpathValidator::new().validate(&path).unwrap_err();
        assert_eq!(err, ValidationError::ZeroLengthMove { index: 0 });
    }

    #[test]
    fn test_non_finite_state_fails_first() {
        let mut path = Toolpath::new("nan");
        path.append(ToolpathMove::rapid(
            at(0.0, 0.0, 0.0),
            at(f64::NAN, 0.0, 0.0),
        ));
        let err = ToolpathValidator::new().validate(&path).unwrap_err();
        assert_eq!(err, ValidationError::NonFiniteState { index: 0 });
    }

    #[test]
    fn test_machine_limits() {
        let machine = Machine::cartesian3(
            "router",
            (0.0, 400.0),
            (-85.0, 0.0),
            50.0,
            500.0,
            Spindle::new(0.0, 24000.0, 2.2),
        );
        let validator = ToolpathValidator::new();

        let mut inside = Toolpath::new("inside");
        inside.append(cut(at(0.0, 0.0, 0.0), Point3::new(100.0, 0.0, 0.0)));
        assert!(validator.validate_for_machine(&inside, &machine).is_ok());

        let mut outside = Toolpath::new("outside");
        outside.append(cut(at(0.0, 0.0, 0.0), Point3::new(500.0, 0.0, 0.0)));
        let err = validator
            .validate_for_machine(&outside, &machine)
            .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::AxisOutOfLimits {
                index: 0,
                axis: AxisId::X,
                ..
            }
        ));
    }

    #[test]
    fn test_rotary_motion_on_3axis_machine_fails() {
        let machine = Machine::cartesian3(
            "router",
            (0.0, 400.0),
            (-85.0, 0.0),
            50.0,
            500.0,
            Spindle::default(),
        );
        let mut path = Toolpath::new("rotary");
        let start = at(0.0, 0.0, 0.0).with_tool("T1");
        let end = at(10.0, 0.0, 0.0)
            .with_rotary(45.0, 0.0, 0.0)
            .with_feed_rate(300.0)
            .with_tool("T1");
        path.append(ToolpathMove::linear(start, end));

        let err = ToolpathValidator::new()
            .validate_for_machine(&path, &machine)
            .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::AxisOutOfLimits {
                axis: AxisId::A,
                ..
            }
        ));
    }

    #[test]
    fn test_spindle_out_of_range() {
        let machine = Machine::cartesian3(
            "router",
            (0.0, 400.0),
            (-85.0, 0.0),
            50.0,
            500.0,
            Spindle::new(8000.0, 24000.0, 2.2),
        );
        let mut path = Toolpath::new("slow-spindle");
        let start = at(0.0, 0.0, 0.0).with_spindle_rpm(500.0).with_tool("T1");
        let end = at(10.0, 0.0, 0.0)
            .with_spindle_rpm(500.0)
            .with_feed_rate(300.0)
            .with_tool("T1");
        path.append(ToolpathMove::linear(start, end));

        let err = ToolpathValidator::new()
            .validate_for_machine(&path, &machine)
            .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::SpindleOutOfRange { index: 0, rpm } if rpm == 500.0
        ));
    }

    #[test]
    fn test_cutting_without_tool_fails() {
        let mut path = Toolpath::new("no-tool");
        let end = at(10.0, 0.0, 0.0).with_feed_rate(300.0);
        path.append(ToolpathMove::linear(at(0.0, 0.0, 0.0), end));

        let err = ToolpathValidator::new().validate(&path).unwrap_err();
        assert_eq!(err, ValidationError::MissingTool { index: 0 });
    }

    #[test]
    fn test_tool_change_must_name_new_tool() {
        let mut path = Toolpath::new("same-tool");
        path.append(ToolpathMove::tool_change(
            at(0.0, 0.0, 50.0).with_tool("T1"),
            "T1",
        ));
        let err = ToolpathValidator::new().validate(&path).unwrap_err();
        assert_eq!(err, ValidationError::ToolChangeNotNew { index: 0 });

        let mut ok = Toolpath::new("new-tool");
        ok.append(ToolpathMove::tool_change(
            at(0.0, 0.0, 50.0).with_tool("T1"),
            "T2",
        ));
        assert!(ToolpathValidator::new().validate(&ok).is_ok());
    }

    #[test]
    fn test_rapid_over_uncleared_span_fails() {
        let mut path = Toolpath::new("unsafe-rapid");
        path.append(
            ToolpathMove::rapid(at(0.0, 0.0, 10.0), at(0.0, 0.0, 0.0)).with_rapid_allowed(false),
        );
        let err = ToolpathValidator::new().validate(&path).unwrap_err();
        assert_eq!(err, ValidationError::RapidNotAllowed { index: 0 });

        let mut ok = Toolpath::new("safe-rapid");
        ok.append(ToolpathMove::rapid(at(0.0, 0.0, 10.0), at(0.0, 0.0, 0.0)));
        assert!(ToolpathValidator::new().validate(&ok).is_ok());
    }

    #[test]
    fn test_error_display_carries_index() {
        let err = ValidationError::Discontinuity {
            index: 3,
            gap: 0.25,
        };
        let msg = err.to_string();
        assert!(msg.contains("move 3"));
        assert!(msg.contains("0.25"));
    }
}
