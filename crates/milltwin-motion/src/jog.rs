//! Jog commands.

use milltwin_machine::AxisId;
use serde::{Deserialize, Serialize};

/// One manual motion command for a single axis.
///
/// Velocities are signed and in axis units per second; the controller
/// clamps them to the axis's configured maximum. A distance-limited
/// jog carries the remaining signed distance; callers re-issue the
/// command with the updated remainder when a jog spans multiple ticks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum JogCommand {
    /// Stop the axis: commanded velocity goes to zero and the axis
    /// decelerates at its acceleration limit.
    Stop {
        /// Axis to stop.
        axis: AxisId,
    },
    /// Jog at a signed velocity until told otherwise.
    Velocity {
        /// Axis to jog.
        axis: AxisId,
        /// Signed velocity in units/s.
        velocity: f64,
    },
    /// Jog a bounded distance at up to a given speed.
    Distance {
        /// Axis to jog.
        axis: AxisId,
        /// Speed magnitude in units/s; the sign of `distance` sets
        /// direction.
        speed: f64,
        /// Signed distance remaining, in axis units.
        distance: f64,
    },
}

impl JogCommand {
    /// Stop command.
    pub fn stop(axis: AxisId) -> Self {
        JogCommand::Stop { axis }
    }

    /// Continuous velocity command.
    pub fn velocity(axis: AxisId, velocity: f64) -> Self {
        JogCommand::Velocity { axis, velocity }
    }

    /// Distance-limited command; speed is taken by magnitude.
    pub fn distance(axis: AxisId, speed: f64, distance: f64) -> Self {
        JogCommand::Distance {
            axis,
            speed: speed.abs(),
            distance,
        }
    }

    /// The axis this command drives.
    pub fn axis(&self) -> AxisId {
        match self {
            JogCommand::Stop { axis }
            | JogCommand::Velocity { axis, .. }
            | JogCommand::Distance { axis, .. } => *axis,
        }
    }

    /// Whether the command's numbers are usable.
    pub fn is_valid(&self) -> bool {
        match self {
            JogCommand::Stop { .. } => true,
            JogCommand::Velocity { velocity, .. } => velocity.is_finite(),
            JogCommand::Distance {
                speed, distance, ..
            } => speed.is_finite() && *speed >= 0.0 && distance.is_finite(),
        }
    }
}
