//! Simulation time stepping policies.

/// Fallback timestep in seconds when a caller supplies a bad delta.
pub const DEFAULT_TIME_STEP: f64 = 0.001;

/// A simulation clock: how time advances per engine step.
///
/// Engines are policy-agnostic; they call [`advance`](Self::advance)
/// once per step and add the returned delta to the state's time
/// accumulator. Fixed and variable stepping are interchangeable
/// implementations of this trait.
pub trait SimClock: Send {
    /// Delta the next `advance` will apply, in seconds.
    fn delta(&self) -> f64;

    /// Apply one step: accumulate the delta, bump the step count, and
    /// return the delta that was applied.
    fn advance(&mut self) -> f64;

    /// Rewind to zero elapsed time and zero steps.
    fn reset(&mut self);

    /// Accumulated time in seconds.
    fn elapsed(&self) -> f64;

    /// Number of `advance` calls since construction or reset.
    fn step_count(&self) -> u64;

    /// Whether the clock's delta is usable.
    fn is_valid(&self) -> bool {
        self.delta().is_finite() && self.delta() > 0.0
    }
}

fn sanitize(dt: f64) -> f64 {
    if dt.is_finite() && dt > 0.0 {
        dt
    } else {
        DEFAULT_TIME_STEP
    }
}

/// Constant-delta clock; the common choice for reproducible runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedStep {
    dt: f64,
    elapsed: f64,
    steps: u64,
}

impl FixedStep {
    /// New clock; non-positive or non-finite deltas fall back to
    /// [`DEFAULT_TIME_STEP`].
    pub fn new(dt: f64) -> Self {
        Self {
            dt: sanitize(dt),
            elapsed: 0.0,
            steps: 0,
        }
    }
}

impl Default for FixedStep {
    fn default() -> Self {
        Self::new(DEFAULT_TIME_STEP)
    }
}

impl SimClock for FixedStep {
    fn delta(&self) -> f64 {
        self.dt
    }

    fn advance(&mut self) -> f64 {
        self.elapsed += self.dt;
        self.steps += 1;
        self.dt
    }

    fn reset(&mut self) {
        self.elapsed = 0.0;
        self.steps = 0;
    }

    fn elapsed(&self) -> f64 {
        self.elapsed
    }

    fn step_count(&self) -> u64 {
        self.steps
    }
}

/// Caller-adjustable-delta clock.
///
/// Changing the delta between steps trades reproducibility for
/// responsiveness; runs are only comparable if the delta sequence is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariableStep {
    dt: f64,
    elapsed: f64,
    steps: u64,
}

impl VariableStep {
    /// New clock with an initial delta, sanitized like [`FixedStep`].
    pub fn new(dt: f64) -> Self {
        Self {
            dt: sanitize(dt),
            elapsed: 0.0,
            steps: 0,
        }
    }

    /// Change the delta applied by subsequent steps.
    pub fn set_delta(&mut self, dt: f64) {
        self.dt = sanitize(dt);
    }
}

impl Default for VariableStep {
    fn default() -> Self {
        Self::new(DEFAULT_TIME_STEP)
    }
}

impl SimClock for VariableStep {
    fn delta(&self) -> f64 {
        self.dt
    }

    fn advance(&mut self) -> f64 {
        self.elapsed += self.dt;
        self.steps += 1;
        self.dt
    }

    fn reset(&mut self) {
        self.elapsed = 0.0;
        self.steps = 0;
    }

    fn elapsed(&self) -> f64 {
        self.elapsed
    }

    fn step_count(&self) -> u64 {
        self.steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_step_accumulates() {
        let mut clock = FixedStep::new(0.01);
        for _ in 0..10 {
            assert_eq!(clock.advance(), 0.01);
        }
        assert!((clock.elapsed() - 0.1).abs() < 1e-12);
        assert_eq!(clock.step_count(), 10);
    }

    #[test]
    fn test_fixed_step_sanitizes_delta() {
        assert_eq!(FixedStep::new(-1.0).delta(), DEFAULT_TIME_STEP);
        assert_eq!(FixedStep::new(0.0).delta(), DEFAULT_TIME_STEP);
        assert_eq!(FixedStep::new(f64::NAN).delta(), DEFAULT_TIME_STEP);
        assert!(FixedStep::new(f64::NAN).is_valid());
    }

    #[test]
    fn test_reset_rewinds() {
        let mut clock = FixedStep::new(0.5);
        clock.advance();
        clock.advance();
        clock.reset();
        assert_eq!(clock.elapsed(), 0.0);
        assert_eq!(clock.step_count(), 0);
        assert_eq!(clock.delta(), 0.5);
    }

    #[test]
    fn test_variable_step_delta_changes() {
        let mut clock = VariableStep::new(0.1);
        clock.advance();
        clock.set_delta(0.2);
        clock.advance();
        assert!((clock.elapsed() - 0.3).abs() < 1e-12);
        clock.set_delta(-5.0);
        assert_eq!(clock.delta(), DEFAULT_TIME_STEP);
    }
}
