//! Orchestration facade over one engine.

use tracing::{debug, warn};

use crate::engine::SimulationEngine;
use crate::error::SimError;
use crate::result::StepResult;
use crate::state::SimulationState;
use crate::sweep::ToolSweep;

/// Binds one engine to caller-owned simulation states.
///
/// Every operation returns a bool and records the last [`StepResult`]
/// for inspection; the controller itself never panics. Batch stepping
/// halts at the first failing step and reports how many steps fully
/// succeeded, so partial batches are an expected outcome, not an
/// error path.
pub struct StepController {
    engine: Option<Box<dyn SimulationEngine>>,
    last_result: StepResult,
}

impl StepController {
    /// Controller over an engine.
    pub fn new(engine: Box<dyn SimulationEngine>) -> Self {
        Self {
            engine: Some(engine),
            last_result: StepResult::clean(),
        }
    }

    /// Controller with no engine attached; every operation fails with
    /// a recorded invalid-state result until one is attached.
    pub fn detached() -> Self {
        Self {
            engine: None,
            last_result: StepResult::clean(),
        }
    }

    /// Attach or replace the engine.
    pub fn attach(&mut self, engine: Box<dyn SimulationEngine>) {
        self.engine = Some(engine);
    }

    /// Whether an engine is attached and usable.
    pub fn has_engine(&self) -> bool {
        self.engine.as_ref().is_some_and(|e| e.is_valid())
    }

    /// Outcome of the most recent operation.
    pub fn last_result(&self) -> &StepResult {
        &self.last_result
    }

    fn record_missing_engine(&mut self) -> bool {
        warn!("step controller has no usable engine");
        self.last_result =
            StepResult::failed(SimError::invalid_state("no usable engine attached"));
        false
    }

    /// Initialize the engine over a state.
    pub fn initialize(&mut self, state: &mut SimulationState) -> bool {
        let Some(engine) = self.engine.as_mut().filter(|e| e.is_valid()) else {
            return self.record_missing_engine();
        };
        match engine.initialize(state) {
            Ok(()) => {
                self.last_result = StepResult::clean();
                true
            }
            Err(err) => {
                warn!(error = %err, "initialize failed");
                self.last_result = StepResult::failed(err);
                false
            }
        }
    }

    /// Apply one step; returns whether it fully succeeded.
    pub fn step_once(&mut self, state: &mut SimulationState, sweep: &ToolSweep) -> bool {
        let Some(engine) = self.engine.as_mut().filter(|e| e.is_valid()) else {
            return self.record_missing_engine();
        };
        let result = engine.step(state, sweep);
        let ok = result.is_success();
        if let Some(err) = &result.error {
            debug!(error = %err, step = state.step_count(), "step failed");
        }
        self.last_result = result;
        ok
    }

    /// Apply up to `n` steps of the same sweep; returns the number of
    /// fully successful steps. Halts at the first failure, leaving its
    /// result recorded.
    pub fn step_n(&mut self, state: &mut SimulationState, sweep: &ToolSweep, n: usize) -> usize {
        for completed in 0..n {
            if !self.step_once(state, sweep) {
                return completed;
            }
        }
        n
    }

    /// Apply one step per sweep, in order; returns the number of fully
    /// successful steps, halting at the first failure.
    pub fn step_each(&mut self, state: &mut SimulationState, sweeps: &[ToolSweep]) -> usize {
        for (completed, sweep) in sweeps.iter().enumerate() {
            if !self.step_once(state, sweep) {
                return completed;
            }
        }
        sweeps.len()
    }

    /// Reset the engine over a state.
    pub fn reset(&mut self, state: &mut SimulationState) -> bool {
        let Some(engine) = self.engine.as_mut().filter(|e| e.is_valid()) else {
            return self.record_missing_engine();
        };
        engine.reset(state);
        self.last_result = StepResult::clean();
        true
    }
}

impl std::fmt::Debug for StepController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepController")
            .field(
                "engine",
                &self.engine.as_ref().map(|e| e.kind()).unwrap_or("none"),
            )
            .field("last_result", &self.last_result)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SweepEngine;
    use crate::grid::testing::slab_100x100x20;
    use milltwin_machine::Tool;
    use milltwin_math::Pose;

    fn fresh_state() -> SimulationState {
        SimulationState::new(slab_100x100x20(), Pose::translation(50.0, 50.0, 30.0))
    }

    fn air_sweep() -> ToolSweep {
        ToolSweep::new(
            Tool::default_endmill(),
            Pose::translation(10.0, 50.0, 40.0),
            Pose::translation(90.0, 50.0, 40.0),
        )
        .with_resolution_hint(10.0)
    }

    fn colliding_sweep() -> ToolSweep {
        ToolSweep::new(
            Tool::default_endmill(),
            Pose::translation(10.0, 50.0, -5.0),
            Pose::translation(90.0, 50.0, -5.0),
        )
        .with_resolution_hint(10.0)
    }

    #[test]
    fn test_detached_controller_records_failure() {
        let mut controller = StepController::detached();
        let mut state = fresh_state();
        assert!(!controller.initialize(&mut state));
        assert!(!controller.step_once(&mut state, &air_sweep()));
        assert!(!controller.reset(&mut state));
        assert!(matches!(
            controller.last_result().error,
            Some(SimError::InvalidState { .. })
        ));
        // Nothing ever touched the state.
        assert_eq!(state.step_count(), 0);
    }

    #[test]
    fn test_step_n_full_batch() {
        let mut controller = StepController::new(Box::new(SweepEngine::fixed(0.001)));
        let mut state = fresh_state();
        assert!(controller.initialize(&mut state));

        let done = controller.step_n(&mut state, &air_sweep(), 5);
        assert_eq!(done, 5);
        assert_eq!(state.step_count(), 5);
        assert!(controller.last_result().is_success());
    }

    #[test]
    fn test_step_n_partial_batch_on_collision() {
        let mut controller = StepController::new(Box::new(SweepEngine::fixed(0.001)));
        let mut state = fresh_state();
        assert!(controller.initialize(&mut state));

        let done = controller.step_n(&mut state, &colliding_sweep(), 5);
        assert_eq!(done, 0);
        // The failing step still advanced the counter.
        assert_eq!(state.step_count(), 1);
        assert!(controller.last_result().collision);
    }

    #[test]
    fn test_step_each_halts_at_failure() {
        let mut controller = StepController::new(Box::new(SweepEngine::fixed(0.001)));
        let mut state = fresh_state();
        assert!(controller.initialize(&mut state));

        let sweeps = [air_sweep(), air_sweep(), colliding_sweep(), air_sweep()];
        let done = controller.step_each(&mut state, &sweeps);
        assert_eq!(done, 2);
        assert_eq!(state.step_count(), 3);
    }

    #[test]
    fn test_step_without_initialize_fails() {
        let mut controller = StepController::new(Box::new(SweepEngine::fixed(0.001)));
        let mut state = fresh_state();
        assert!(!controller.step_once(&mut state, &air_sweep()));
        assert_eq!(
            controller.last_result().error,
            Some(SimError::NotInitialized)
        );
    }

    #[test]
    fn test_reset_then_reinitialize() {
        let mut controller = StepController::new(Box::new(SweepEngine::fixed(0.001)));
        let mut state = fresh_state();
        assert!(controller.initialize(&mut state));
        controller.step_n(&mut state, &air_sweep(), 3);
        assert!(controller.reset(&mut state));
        assert!(controller.initialize(&mut state));
        assert!(controller.step_once(&mut state, &air_sweep()));
        assert_eq!(state.step_count(), 4);
    }

    #[test]
    fn test_attach_engine_later() {
        let mut controller = StepController::detached();
        let mut state = fresh_state();
        assert!(!controller.has_engine());

        controller.attach(Box::new(SweepEngine::fixed(0.001)));
        assert!(controller.has_engine());
        assert!(controller.initialize(&mut state));
    }
}
