//! Structured machine and tooling validation.
//!
//! The value types clamp what they can at construction; these checks
//! report what clamping cannot repair, naming the failed check so a
//! front-end can surface it. Each `validate` returns the first violated
//! invariant; the matching `is_valid` methods are the predicate form.

use thiserror::Error;

use crate::axis::{AxisId, AxisKind};
use crate::machine::Machine;
use crate::tool::{Tool, ToolHolder};

/// A violated machine-profile invariant.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MachineValidationError {
    /// The machine has no name.
    #[error("machine has an empty name")]
    EmptyName,
    /// The machine defines no axes at all.
    #[error("machine defines no axes")]
    NoAxes,
    /// An axis definition is unusable (zero travel or zero rates).
    #[error("axis {axis:?}: definition is unusable")]
    InvalidAxis {
        /// Offending axis.
        axis: AxisId,
    },
    /// An axis definition's kind disagrees with its slot.
    #[error("axis {axis:?}: {kind:?} definition in a {expected:?} slot")]
    AxisKindMismatch {
        /// Offending axis.
        axis: AxisId,
        /// Kind the definition declares.
        kind: AxisKind,
        /// Kind the slot requires.
        expected: AxisKind,
    },
    /// A machine with rotary axes lacks one of the three linear axes.
    #[error("machine with rotary axes is missing linear axis {axis:?}")]
    MissingLinearAxis {
        /// The absent linear axis.
        axis: AxisId,
    },
    /// The spindle cannot turn at any positive speed.
    #[error("spindle maximum speed {max_rpm} RPM leaves no usable range")]
    SpindleWithoutRange {
        /// The unusable maximum speed.
        max_rpm: f64,
    },
}

/// A violated tool or holder invariant.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ToolValidationError {
    /// Tool diameter is zero, negative, or non-finite.
    #[error("tool diameter {diameter} mm is not a positive finite value")]
    BadDiameter {
        /// Offending diameter.
        diameter: f64,
    },
    /// Tool length is zero, negative, or non-finite.
    #[error("tool length {length} mm is not a positive finite value")]
    BadLength {
        /// Offending length.
        length: f64,
    },
    /// Flute length is non-positive or exceeds the overall length.
    #[error("flute length {flute_length} mm is inconsistent with tool length {length} mm")]
    BadFluteLength {
        /// Offending flute length.
        flute_length: f64,
        /// Overall tool length.
        length: f64,
    },
    /// Drill point angle falls outside the machinable (0, 180] degrees.
    #[error("drill point angle {point_angle} degrees is not machinable")]
    BadPointAngle {
        /// Offending point angle.
        point_angle: f64,
    },
    /// Holder gauge length is not positive.
    #[error("holder gauge length {length} mm is not positive")]
    BadHolderLength {
        /// Offending gauge length.
        length: f64,
    },
    /// Holder lateral offset contains NaN or infinite components.
    #[error("holder offset is not finite")]
    NonFiniteHolderOffset,
}

impl Machine {
    /// Check the profile, returning the first violated invariant.
    pub fn validate(&self) -> Result<(), MachineValidationError> {
        if self.name().is_empty() {
            return Err(MachineValidationError::EmptyName);
        }
        if self.axis_count() == 0 {
            return Err(MachineValidationError::NoAxes);
        }
        for axis in AxisId::ALL {
            let Some(def) = self.axis(axis) else {
                continue;
            };
            if !def.is_valid() {
                return Err(MachineValidationError::InvalidAxis { axis });
            }
            let expected = if axis.is_rotary() {
                AxisKind::Rotary
            } else {
                AxisKind::Linear
            };
            if def.kind() != expected {
                return Err(MachineValidationError::AxisKindMismatch {
                    axis,
                    kind: def.kind(),
                    expected,
                });
            }
        }
        if self.defined_axes().any(AxisId::is_rotary) {
            for axis in [AxisId::X, AxisId::Y, AxisId::Z] {
                if self.axis(axis).is_none() {
                    return Err(MachineValidationError::MissingLinearAxis { axis });
                }
            }
        }
        if self.spindle().max_rpm() <= 0.0 {
            return Err(MachineValidationError::SpindleWithoutRange {
                max_rpm: self.spindle().max_rpm(),
            });
        }
        Ok(())
    }
}

impl Tool {
    /// Check the tool geometry, returning the first violated invariant.
    pub fn validate(&self) -> Result<(), ToolValidationError> {
        let diameter = self.diameter();
        if !(diameter > 0.0 && diameter.is_finite()) {
            return Err(ToolValidationError::BadDiameter { diameter });
        }
        let length = self.length();
        if !(length > 0.0 && length.is_finite()) {
            return Err(ToolValidationError::BadLength { length });
        }
        if let Some(flute_length) = self.flute_length() {
            if !(flute_length > 0.0 && flute_length <= length) {
                return Err(ToolValidationError::BadFluteLength {
                    flute_length,
                    length,
                });
            }
        }
        if let Tool::Drill { point_angle, .. } = self {
            if !(*point_angle > 0.0 && *point_angle <= 180.0) {
                return Err(ToolValidationError::BadPointAngle {
                    point_angle: *point_angle,
                });
            }
        }
        Ok(())
    }
}

impl ToolHolder {
    /// Check the holder and its tool, returning the first violated
    /// invariant.
    pub fn validate(&self) -> Result<(), ToolValidationError> {
        self.tool().validate()?;
        if !(self.length() > 0.0 && self.length().is_finite()) {
            return Err(ToolValidationError::BadHolderLength {
                length: self.length(),
            });
        }
        if !self.offset().iter().all(|c| c.is_finite()) {
            return Err(ToolValidationError::NonFiniteHolderOffset);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::AxisDefinition;
    use crate::spindle::Spindle;
    use milltwin_math::Vec3;

    fn small_router() -> Machine {
        Machine::cartesian3(
            "router-3040",
            (0.0, 400.0),
            (-85.0, 0.0),
            50.0,
            500.0,
            Spindle::default(),
        )
    }

    #[test]
    fn test_valid_profile_passes() {
        assert!(small_router().validate().is_ok());
    }

    #[test]
    fn test_empty_name_fails() {
        let machine = Machine::cartesian3(
            "",
            (0.0, 400.0),
            (-85.0, 0.0),
            50.0,
            500.0,
            Spindle::default(),
        );
        assert_eq!(machine.validate(), Err(MachineValidationError::EmptyName));
    }

    #[test]
    fn test_axis_without_rates_is_named() {
        let dead = AxisDefinition::new(AxisKind::Linear, 0.0, 100.0, 0.0, 0.0);
        let machine = small_router().with_axis(AxisId::Y, dead);
        assert_eq!(
            machine.validate(),
            Err(MachineValidationError::InvalidAxis { axis: AxisId::Y })
        );
        assert!(!machine.is_valid());
    }

    #[test]
    fn test_rotary_definition_in_linear_slot_fails() {
        let rotary = AxisDefinition::new(AxisKind::Rotary, -360.0, 360.0, 90.0, 180.0);
        let machine = small_router().with_axis(AxisId::X, rotary);
        assert!(matches!(
            machine.validate(),
            Err(MachineValidationError::AxisKindMismatch {
                axis: AxisId::X,
                ..
            })
        ));
    }

    #[test]
    fn test_rotary_machine_requires_linear_triple() {
        let rotary = AxisDefinition::new(AxisKind::Rotary, -360.0, 360.0, 90.0, 180.0);
        let machine = Machine::new("trunnion", Spindle::default()).with_axis(AxisId::A, rotary);
        assert_eq!(
            machine.validate(),
            Err(MachineValidationError::MissingLinearAxis { axis: AxisId::X })
        );

        let full = small_router().with_axis(AxisId::A, rotary);
        assert!(full.validate().is_ok());
    }

    #[test]
    fn test_spindle_without_range_fails() {
        let machine = Machine::cartesian3(
            "no-spindle",
            (0.0, 400.0),
            (-85.0, 0.0),
            50.0,
            500.0,
            Spindle::new(0.0, 0.0, 0.0),
        );
        assert_eq!(
            machine.validate(),
            Err(MachineValidationError::SpindleWithoutRange { max_rpm: 0.0 })
        );
    }

    #[test]
    fn test_tool_checks_are_named() {
        let negative = Tool::Drill {
            diameter: -3.0,
            point_angle: 118.0,
            length: 60.0,
        };
        assert_eq!(
            negative.validate(),
            Err(ToolValidationError::BadDiameter { diameter: -3.0 })
        );

        let flat_point = Tool::Drill {
            diameter: 3.0,
            point_angle: 0.0,
            length: 60.0,
        };
        assert_eq!(
            flat_point.validate(),
            Err(ToolValidationError::BadPointAngle { point_angle: 0.0 })
        );

        let long_flutes = Tool::FlatEndMill {
            diameter: 6.0,
            flute_length: 80.0,
            length: 50.0,
            flutes: 2,
        };
        assert!(matches!(
            long_flutes.validate(),
            Err(ToolValidationError::BadFluteLength { .. })
        ));

        assert!(Tool::default_endmill().validate().is_ok());
    }

    #[test]
    fn test_holder_checks_are_named() {
        let zero_gauge = ToolHolder::new(Tool::default_endmill(), 0.0);
        assert_eq!(
            zero_gauge.validate(),
            Err(ToolValidationError::BadHolderLength { length: 0.0 })
        );

        let bad_offset = ToolHolder::new(Tool::default_endmill(), 80.0)
            .with_offset(Vec3::new(f64::NAN, 0.0, 0.0));
        assert_eq!(
            bad_offset.validate(),
            Err(ToolValidationError::NonFiniteHolderOffset)
        );

        let ok = ToolHolder::new(Tool::default_endmill(), 80.0);
        assert!(ok.validate().is_ok());
        assert!(ok.is_valid());
    }

    #[test]
    fn test_holder_reports_tool_failure_first() {
        let broken = Tool::FlatEndMill {
            diameter: 0.0,
            flute_length: 20.0,
            length: 50.0,
            flutes: 2,
        };
        let holder = ToolHolder::new(broken, 0.0);
        assert_eq!(
            holder.validate(),
            Err(ToolValidationError::BadDiameter { diameter: 0.0 })
        );
    }
}
