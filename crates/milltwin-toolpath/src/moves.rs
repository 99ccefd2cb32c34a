//! Atomic toolpath moves.

use milltwin_math::Point3;
use serde::{Deserialize, Serialize};

use crate::state::ToolpathState;

/// Below this length a motion move is considered degenerate.
pub const ZERO_LENGTH_EPSILON: f64 = 1e-9;

/// The kind of one atomic toolpath instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveKind {
    /// Rapid positioning (G0), no cutting.
    Rapid,
    /// Linear cutting move (G1).
    Linear,
    /// Clockwise arc (G2).
    ArcCw,
    /// Counter-clockwise arc (G3).
    ArcCcw,
    /// Timed pause (G4).
    Dwell,
    /// Tool change (M6).
    ToolChange,
    /// Spindle start (M3/M4).
    SpindleStart,
    /// Spindle stop (M5).
    SpindleStop,
}

impl MoveKind {
    /// Whether this kind removes material.
    pub fn is_cutting(self) -> bool {
        matches!(self, MoveKind::Linear | MoveKind::ArcCw | MoveKind::ArcCcw)
    }

    /// Whether this kind is an arc.
    pub fn is_arc(self) -> bool {
        matches!(self, MoveKind::ArcCw | MoveKind::ArcCcw)
    }

    /// Whether this kind is a control instruction with no motion.
    pub fn is_control(self) -> bool {
        matches!(
            self,
            MoveKind::Dwell | MoveKind::ToolChange | MoveKind::SpindleStart | MoveKind::SpindleStop
        )
    }
}

/// One atomic toolpath instruction with its start and end states.
///
/// Moves are built through the kind-specific constructors and are
/// immutable afterwards. Construction does not enforce the cross-field
/// invariants (feed on cutting moves, center on arcs, non-zero length);
/// that is the validator's job, so malformed moves can be built, carried,
/// and reported with an index instead of failing at the call site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolpathMove {
    kind: MoveKind,
    start: ToolpathState,
    end: ToolpathState,
    arc_center: Option<Point3>,
    dwell_seconds: f64,
    rapid_allowed: bool,
}

impl ToolpathMove {
    fn motion(kind: MoveKind, start: ToolpathState, end: ToolpathState) -> Self {
        Self {
            kind,
            start,
            end,
            arc_center: None,
            dwell_seconds: 0.0,
            rapid_allowed: kind == MoveKind::Rapid,
        }
    }

    fn control(kind: MoveKind, start: ToolpathState, end: ToolpathState) -> Self {
        Self {
            kind,
            start,
            end,
            arc_center: None,
            dwell_seconds: 0.0,
            rapid_allowed: false,
        }
    }

    /// Rapid positioning move.
    pub fn rapid(start: ToolpathState, end: ToolpathState) -> Self {
        Self::motion(MoveKind::Rapid, start, end)
    }

    /// Linear cutting move.
    pub fn linear(start: ToolpathState, end: ToolpathState) -> Self {
        Self::motion(MoveKind::Linear, start, end)
    }

    /// Clockwise arc about `center`.
    pub fn arc_cw(start: ToolpathState, end: ToolpathState, center: Point3) -> Self {
        let mut mv = Self::motion(MoveKind::ArcCw, start, end);
        mv.arc_center = Some(center);
        mv
    }

    /// Counter-clockwise arc about `center`.
    pub fn arc_ccw(start: ToolpathState, end: ToolpathState, center: Point3) -> Self {
        let mut mv = Self::motion(MoveKind::ArcCcw, start, end);
        mv.arc_center = Some(center);
        mv
    }

    /// Timed pause at the current state; negative durations floor to 0.
    pub fn dwell(state: ToolpathState, seconds: f64) -> Self {
        let mut mv = Self::control(MoveKind::Dwell, state.clone(), state);
        mv.dwell_seconds = seconds.max(0.0);
        mv
    }

    /// Tool change: the end state carries the new tool id.
    pub fn tool_change(state: ToolpathState, new_tool_id: impl Into<String>) -> Self {
        let end = state.clone().with_tool(new_tool_id);
        Self::control(MoveKind::ToolChange, state, end)
    }

    /// Spindle start: the end state carries the commanded RPM.
    pub fn spindle_start(state: ToolpathState, rpm: f64) -> Self {
        let end = state.clone().with_spindle_rpm(rpm);
        Self::control(MoveKind::SpindleStart, state, end)
    }

    /// Spindle stop: the end state carries zero RPM.
    pub fn spindle_stop(state: ToolpathState) -> Self {
        let end = state.clone().with_spindle_rpm(0.0);
        Self::control(MoveKind::SpindleStop, state, end)
    }

    /// Same move with the rapid-allowed safety flag set explicitly.
    pub fn with_rapid_allowed(mut self, allowed: bool) -> Self {
        self.rapid_allowed = allowed;
        self
    }

    /// Move kind.
    pub fn kind(&self) -> MoveKind {
        self.kind
    }

    /// State before the move.
    pub fn start(&self) -> &ToolpathState {
        &self.start
    }

    /// State after the move.
    pub fn end(&self) -> &ToolpathState {
        &self.end
    }

    /// Arc center, present on arc moves.
    pub fn arc_center(&self) -> Option<Point3> {
        self.arc_center
    }

    /// Dwell duration in seconds; 0 for non-dwell moves.
    pub fn dwell_seconds(&self) -> f64 {
        self.dwell_seconds
    }

    /// Whether rapid traversal is safe over this move.
    pub fn rapid_allowed(&self) -> bool {
        self.rapid_allowed
    }

    /// Path length of the move in mm.
    ///
    /// Straight distance for rapid/linear moves; arc length (radius
    /// times the subtended angle, minor arc) for arcs; 0 for control
    /// moves.
    pub fn length(&self) -> f64 {
        match self.kind {
            MoveKind::Rapid | MoveKind::Linear => {
                (self.end.position() - self.start.position()).norm()
            }
            MoveKind::ArcCw | MoveKind::ArcCcw => match self.arc_center {
                Some(center) => {
                    let to_start = self.start.position() - center;
                    let to_end = self.end.position() - center;
                    let radius = to_start.norm();
                    if radius < ZERO_LENGTH_EPSILON {
                        return 0.0;
                    }
                    let cos = (to_start.dot(&to_end) / (radius * to_end.norm())).clamp(-1.0, 1.0);
                    radius * cos.acos()
                }
                None => 0.0,
            },
            _ => 0.0,
        }
    }

    /// Whether the move covers no distance.
    pub fn is_zero_length(&self) -> bool {
        self.length() < ZERO_LENGTH_EPSILON
    }

    /// Estimated execution time in seconds.
    ///
    /// Rapids run at `rapid_rate` (mm/min); cutting moves at the end
    /// state's feed rate; dwells take their duration. Moves with no
    /// usable rate estimate as 0.
    pub fn estimated_time(&self, rapid_rate: f64) -> f64 {
        match self.kind {
            MoveKind::Rapid => {
                if rapid_rate > 0.0 {
                    self.length() / rapid_rate * 60.0
                } else {
                    0.0
                }
            }
            MoveKind::Linear | MoveKind::ArcCw | MoveKind::ArcCcw => {
                match self.end.feed_rate() {
                    Some(feed) if feed > 0.0 => self.length() / feed * 60.0,
                    _ => 0.0,
                }
            }
            MoveKind::Dwell => self.dwell_seconds,
            _ => 0.0,
        }
    }

    /// Whether both endpoint states are independently valid.
    pub fn states_valid(&self) -> bool {
        self.start.is_valid() && self.end.is_valid()
    }
}
