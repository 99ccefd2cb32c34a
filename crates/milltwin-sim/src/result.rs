//! Per-step outcome reporting.

use crate::error::SimError;

/// What one simulation step did.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StepResult {
    /// Failure, if the step did not complete cleanly.
    pub error: Option<SimError>,
    /// Material removed this step, in mm^3.
    pub removed_volume: f64,
    /// Whether a non-cutting part of the tool hit material.
    pub collision: bool,
    /// Whether the cutter touched material at all.
    pub tool_contact: bool,
    /// Simulated time this step covered, in seconds.
    pub elapsed: f64,
    /// Approximate grid cells affected.
    pub cells_processed: u64,
}

impl StepResult {
    /// A clean result with no effects yet; the engine fills fields in
    /// as the step proceeds.
    pub fn clean() -> Self {
        Self::default()
    }

    /// A failed result carrying an error and no effects.
    pub fn failed(error: SimError) -> Self {
        Self {
            error: Some(error),
            ..Self::default()
        }
    }

    /// Whether the step completed without error.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Whether stepping may continue after this result: success, or a
    /// recoverable error like a collision.
    pub fn can_continue(&self) -> bool {
        match &self.error {
            None => true,
            Some(err) => err.is_recoverable(),
        }
    }
}
