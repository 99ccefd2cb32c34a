//! Axis identifiers, configuration, and per-axis definitions.

use serde::{Deserialize, Serialize};

/// The six possible machine axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AxisId {
    /// X linear axis.
    X,
    /// Y linear axis.
    Y,
    /// Z linear axis.
    Z,
    /// A rotary axis (about X).
    A,
    /// B rotary axis (about Y).
    B,
    /// C rotary axis (about Z).
    C,
}

impl AxisId {
    /// All six axes in canonical [X, Y, Z, A, B, C] order.
    pub const ALL: [AxisId; 6] = [
        AxisId::X,
        AxisId::Y,
        AxisId::Z,
        AxisId::A,
        AxisId::B,
        AxisId::C,
    ];

    /// Index into a `[f64; 6]` axis-position array.
    pub fn index(self) -> usize {
        match self {
            AxisId::X => 0,
            AxisId::Y => 1,
            AxisId::Z => 2,
            AxisId::A => 3,
            AxisId::B => 4,
            AxisId::C => 5,
        }
    }

    /// Whether this is a rotary axis.
    pub fn is_rotary(self) -> bool {
        matches!(self, AxisId::A | AxisId::B | AxisId::C)
    }
}

/// Whether an axis travels linearly (mm) or rotates (degrees).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AxisKind {
    /// Linear travel in mm.
    Linear,
    /// Rotary travel in degrees.
    Rotary,
}

/// Which of the six axes exist on a machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AxisConfig {
    /// X axis present.
    pub has_x: bool,
    /// Y axis present.
    pub has_y: bool,
    /// Z axis present.
    pub has_z: bool,
    /// A axis present.
    pub has_a: bool,
    /// B axis present.
    pub has_b: bool,
    /// C axis present.
    pub has_c: bool,
}

impl AxisConfig {
    /// Configuration with only the three linear axes.
    pub fn linear3() -> Self {
        Self {
            has_x: true,
            has_y: true,
            has_z: true,
            has_a: false,
            has_b: false,
            has_c: false,
        }
    }

    /// Check presence of a specific axis.
    pub fn has(&self, axis: AxisId) -> bool {
        match axis {
            AxisId::X => self.has_x,
            AxisId::Y => self.has_y,
            AxisId::Z => self.has_z,
            AxisId::A => self.has_a,
            AxisId::B => self.has_b,
            AxisId::C => self.has_c,
        }
    }

    /// Number of axes present.
    pub fn count(&self) -> usize {
        AxisId::ALL.iter().filter(|a| self.has(**a)).count()
    }
}

/// Static definition of one machine axis.
///
/// This is machine configuration, not runtime state. Construction
/// enforces the value-type invariants: a malformed position range is
/// swapped, negative rates are floored to zero, and a non-positive
/// encoder resolution falls back to 0.001.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisDefinition {
    kind: AxisKind,
    min_position: f64,
    max_position: f64,
    max_velocity: f64,
    max_acceleration: f64,
    resolution: f64,
}

impl AxisDefinition {
    /// New axis definition.
    ///
    /// Positions are in mm (linear) or degrees (rotary); velocity and
    /// acceleration in units/s and units/s^2.
    pub fn new(
        kind: AxisKind,
        min_position: f64,
        max_position: f64,
        max_velocity: f64,
        max_acceleration: f64,
    ) -> Self {
        let (lo, hi) = if min_position <= max_position {
            (min_position, max_position)
        } else {
            (max_position, min_position)
        };
        Self {
            kind,
            min_position: lo,
            max_position: hi,
            max_velocity: max_velocity.max(0.0),
            max_acceleration: max_acceleration.max(0.0),
            resolution: 0.001,
        }
    }

    /// Same definition with an explicit encoder resolution.
    pub fn with_resolution(mut self, resolution: f64) -> Self {
        self.resolution = if resolution > 0.0 { resolution } else { 0.001 };
        self
    }

    /// Axis kind.
    pub fn kind(&self) -> AxisKind {
        self.kind
    }

    /// Minimum travel position.
    pub fn min_position(&self) -> f64 {
        self.min_position
    }

    /// Maximum travel position.
    pub fn max_position(&self) -> f64 {
        self.max_position
    }

    /// Total travel range.
    pub fn travel_range(&self) -> f64 {
        self.max_position - self.min_position
    }

    /// Maximum velocity (units/s).
    pub fn max_velocity(&self) -> f64 {
        self.max_velocity
    }

    /// Maximum acceleration (units/s^2).
    pub fn max_acceleration(&self) -> f64 {
        self.max_acceleration
    }

    /// Encoder resolution (smallest position increment).
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// Check a position against the travel limits.
    pub fn is_position_valid(&self, position: f64) -> bool {
        position.is_finite() && position >= self.min_position && position <= self.max_position
    }

    /// Clamp a position to the travel limits.
    pub fn clamp_position(&self, position: f64) -> f64 {
        position.clamp(self.min_position, self.max_position)
    }

    /// Check the definition itself.
    pub fn is_valid(&self) -> bool {
        self.min_position < self.max_position
            && self.max_velocity > 0.0
            && self.max_acceleration > 0.0
            && self.min_position.is_finite()
            && self.max_position.is_finite()
            && self.max_velocity.is_finite()
            && self.max_acceleration.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_id_index() {
        for (i, axis) in AxisId::ALL.iter().enumerate() {
            assert_eq!(axis.index(), i);
        }
        assert!(AxisId::A.is_rotary());
        assert!(!AxisId::Z.is_rotary());
    }

    #[test]
    fn test_axis_config_linear3() {
        let config = AxisConfig::linear3();
        assert_eq!(config.count(), 3);
        assert!(config.has(AxisId::X));
        assert!(!config.has(AxisId::A));
    }

    #[test]
    fn test_axis_definition_swaps_malformed_range() {
        let def = AxisDefinition::new(AxisKind::Linear, 100.0, -100.0, 500.0, 1000.0);
        assert_eq!(def.min_position(), -100.0);
        assert_eq!(def.max_position(), 100.0);
        assert!(def.is_valid());
    }

    #[test]
    fn test_axis_definition_floors_negative_rates() {
        let def = AxisDefinition::new(AxisKind::Linear, 0.0, 100.0, -5.0, -1.0);
        assert_eq!(def.max_velocity(), 0.0);
        assert_eq!(def.max_acceleration(), 0.0);
        assert!(!def.is_valid());
    }

    #[test]
    fn test_axis_definition_position_checks() {
        let def = AxisDefinition::new(AxisKind::Linear, -50.0, 50.0, 100.0, 200.0);
        assert!(def.is_position_valid(0.0));
        assert!(def.is_position_valid(50.0));
        assert!(!def.is_position_valid(50.1));
        assert!(!def.is_position_valid(f64::NAN));
        assert_eq!(def.clamp_position(80.0), 50.0);
        assert_eq!(def.clamp_position(-80.0), -50.0);
    }

    #[test]
    fn test_axis_definition_resolution_fallback() {
        let def =
            AxisDefinition::new(AxisKind::Linear, 0.0, 10.0, 1.0, 1.0).with_resolution(-1.0);
        assert_eq!(def.resolution(), 0.001);
    }
}
