//! Machine state snapshots along a toolpath.

use milltwin_math::Point3;
use serde::{Deserialize, Serialize};

/// Coolant delivery mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CoolantMode {
    /// Coolant off.
    #[default]
    Off,
    /// Flood coolant (M8).
    Flood,
    /// Mist coolant (M7).
    Mist,
    /// Through-spindle coolant.
    ThroughTool,
}

/// Coordinate interpretation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CoordinateMode {
    /// Absolute coordinates (G90).
    #[default]
    Absolute,
    /// Incremental coordinates (G91).
    Incremental,
}

/// Immutable snapshot of the commanded machine state at one point
/// along a toolpath.
///
/// States are value types with field-wise equality. Mutation happens
/// by deriving a new state through the `with_*` builders, so a state
/// embedded in a move can never change under it. A feed rate of `None`
/// means no feed has been commanded yet; present values are floored to
/// zero at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolpathState {
    position: Point3,
    rotary: [f64; 3],
    feed_rate: Option<f64>,
    spindle_rpm: f64,
    tool_id: String,
    coolant: CoolantMode,
    coordinate_mode: CoordinateMode,
}

impl ToolpathState {
    /// New state at a position with everything else defaulted: no
    /// rotary motion, no feed, spindle stopped, no tool, coolant off,
    /// absolute coordinates.
    pub fn at(position: Point3) -> Self {
        Self {
            position,
            rotary: [0.0; 3],
            feed_rate: None,
            spindle_rpm: 0.0,
            tool_id: String::new(),
            coolant: CoolantMode::Off,
            coordinate_mode: CoordinateMode::Absolute,
        }
    }

    /// Derived state at a new position.
    pub fn with_position(mut self, position: Point3) -> Self {
        self.position = position;
        self
    }

    /// Derived state with rotary axis positions (A, B, C in degrees).
    pub fn with_rotary(mut self, a: f64, b: f64, c: f64) -> Self {
        self.rotary = [a, b, c];
        self
    }

    /// Derived state with a commanded feed rate (mm/min, floored to 0).
    pub fn with_feed_rate(mut self, feed_rate: f64) -> Self {
        self.feed_rate = Some(feed_rate.max(0.0));
        self
    }

    /// Derived state with the feed rate cleared.
    pub fn without_feed_rate(mut self) -> Self {
        self.feed_rate = None;
        self
    }

    /// Derived state with a spindle speed (RPM, floored to 0).
    pub fn with_spindle_rpm(mut self, rpm: f64) -> Self {
        self.spindle_rpm = rpm.max(0.0);
        self
    }

    /// Derived state with an active tool id.
    pub fn with_tool(mut self, tool_id: impl Into<String>) -> Self {
        self.tool_id = tool_id.into();
        self
    }

    /// Derived state with a coolant mode.
    pub fn with_coolant(mut self, coolant: CoolantMode) -> Self {
        self.coolant = coolant;
        self
    }

    /// Derived state with a coordinate mode.
    pub fn with_coordinate_mode(mut self, mode: CoordinateMode) -> Self {
        self.coordinate_mode = mode;
        self
    }

    /// Cartesian position.
    pub fn position(&self) -> Point3 {
        self.position
    }

    /// Rotary axis positions [A, B, C] in degrees.
    pub fn rotary(&self) -> [f64; 3] {
        self.rotary
    }

    /// Commanded feed rate in mm/min, if one has been set.
    pub fn feed_rate(&self) -> Option<f64> {
        self.feed_rate
    }

    /// Spindle speed in RPM.
    pub fn spindle_rpm(&self) -> f64 {
        self.spindle_rpm
    }

    /// Active tool id; empty when no tool is active.
    pub fn tool_id(&self) -> &str {
        &self.tool_id
    }

    /// Whether a tool is active.
    pub fn has_tool(&self) -> bool {
        !self.tool_id.is_empty()
    }

    /// Coolant mode.
    pub fn coolant(&self) -> CoolantMode {
        self.coolant
    }

    /// Coordinate mode.
    pub fn coordinate_mode(&self) -> CoordinateMode {
        self.coordinate_mode
    }

    /// Whether every numeric field is finite and non-negative where
    /// required.
    pub fn is_valid(&self) -> bool {
        self.position.iter().all(|c| c.is_finite())
            && self.rotary.iter().all(|c| c.is_finite())
            && self.feed_rate.map_or(true, |f| f.is_finite() && f >= 0.0)
            && self.spindle_rpm.is_finite()
            && self.spindle_rpm >= 0.0
    }
}
