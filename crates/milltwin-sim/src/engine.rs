//! The simulation stepping protocol.

use milltwin_machine::Tool;
use milltwin_math::{Aabb, Pose, Vec3};
use tracing::{debug, trace};

use crate::clock::{FixedStep, SimClock};
use crate::determinism::ReproducibilityGuard;
use crate::error::SimError;
use crate::grid::MaterialGrid;
use crate::result::StepResult;
use crate::state::SimulationState;
use crate::sweep::ToolSweep;

/// A material-removal simulation engine.
///
/// Lifecycle: Uninitialized, then `initialize` arms the engine, `step`
/// repeats, `reset` disarms and the cycle can start over. The whole
/// surface returns values, never panics, so it can run inside batch
/// and training loops without unwinding.
pub trait SimulationEngine: Send {
    /// Validate the state, run engine-specific setup, arm the engine,
    /// and reset its clock.
    fn initialize(&mut self, state: &mut SimulationState) -> Result<(), SimError>;

    /// Apply one step over the sweep.
    ///
    /// Requires the engine armed and the state valid; once those
    /// preconditions pass the state's step counter is advanced whether
    /// or not the step succeeds, so callers may treat it as monotonic.
    fn step(&mut self, state: &mut SimulationState, sweep: &ToolSweep) -> StepResult;

    /// Disarm the engine and clear its clock. Material is not
    /// restored; callers roll back by swapping in a cloned pristine
    /// state.
    fn reset(&mut self, state: &mut SimulationState);

    /// Whether `initialize` has succeeded since the last reset.
    fn is_armed(&self) -> bool;

    /// Whether the engine is usable at all.
    fn is_valid(&self) -> bool;

    /// Deep copy for independent rollouts.
    fn boxed_clone(&self) -> Box<dyn SimulationEngine>;

    /// Engine kind identifier.
    fn kind(&self) -> &'static str;
}

impl Clone for Box<dyn SimulationEngine> {
    fn clone(&self) -> Self {
        self.boxed_clone()
    }
}

/// Engine-specific half of the stepping protocol.
///
/// [`EngineBase`] owns the lifecycle bookkeeping; a behavior only
/// supplies what happens inside a step.
pub trait EngineBehavior: Clone + Send {
    /// Behavior kind identifier.
    fn kind(&self) -> &'static str;

    /// Setup before the engine arms; runs against a validated state.
    fn on_initialize(&mut self, state: &mut SimulationState) -> Result<(), SimError>;

    /// Compute one step's material removal and collisions. The step
    /// counter has already been advanced; `elapsed` is filled in by
    /// the base afterwards.
    fn do_step(&mut self, state: &mut SimulationState, sweep: &ToolSweep) -> StepResult;

    /// Cleanup when the engine disarms.
    fn on_reset(&mut self);

    /// Whether the behavior is usable.
    fn is_valid(&self) -> bool {
        true
    }
}

/// Generic stepping shell: armed flag, clock, and the strict step
/// ordering, shared by every engine.
///
/// The step order is load-bearing for determinism: counter increment,
/// behavior, clock advance, time accumulation. Clones replaying the
/// same sweep sequence hit the same counter and time values even
/// through failed steps.
#[derive(Debug, Clone)]
pub struct EngineBase<B: EngineBehavior, C: SimClock> {
    behavior: B,
    clock: C,
    armed: bool,
}

impl<B: EngineBehavior, C: SimClock> EngineBase<B, C> {
    /// New disarmed engine.
    pub fn new(behavior: B, clock: C) -> Self {
        Self {
            behavior,
            clock,
            armed: false,
        }
    }

    /// The wrapped behavior.
    pub fn behavior(&self) -> &B {
        &self.behavior
    }

    /// The engine's clock.
    pub fn clock(&self) -> &C {
        &self.clock
    }
}

impl<B, C> SimulationEngine for EngineBase<B, C>
where
    B: EngineBehavior + 'static,
    C: SimClock + Clone + 'static,
{
    fn initialize(&mut self, state: &mut SimulationState) -> Result<(), SimError> {
        if !state.is_valid() {
            return Err(SimError::invalid_state(
                "state failed validation at initialize",
            ));
        }
        self.behavior.on_initialize(state)?;
        self.armed = true;
        self.clock.reset();
        debug!(engine = self.kind(), seed = state.seed(), "engine armed");
        Ok(())
    }

    fn step(&mut self, state: &mut SimulationState, sweep: &ToolSweep) -> StepResult {
        if !self.armed {
            return StepResult::failed(SimError::NotInitialized);
        }
        if !state.is_valid() {
            return StepResult::failed(SimError::invalid_state(
                "state failed validation before step",
            ));
        }

        state.increment_step_count();
        let mut result = self.behavior.do_step(state, sweep);
        let dt = self.clock.advance();
        state.add_time(dt);
        result.elapsed = dt;

        trace!(
            step = state.step_count(),
            removed = result.removed_volume,
            collision = result.collision,
            "step applied"
        );
        result
    }

    fn reset(&mut self, state: &mut SimulationState) {
        self.armed = false;
        self.clock.reset();
        self.behavior.on_reset();
        debug!(
            engine = self.kind(),
            step = state.step_count(),
            "engine disarmed"
        );
    }

    fn is_armed(&self) -> bool {
        self.armed
    }

    fn is_valid(&self) -> bool {
        self.behavior.is_valid() && self.clock.is_valid()
    }

    fn boxed_clone(&self) -> Box<dyn SimulationEngine> {
        Box::new(self.clone())
    }

    fn kind(&self) -> &'static str {
        self.behavior.kind()
    }
}

/// Material removal by sampling a sweep against the grid contract.
///
/// At each sample the cutting band (tip up to the flute length) is
/// subtracted from the grid as a conservative box; the non-cutting
/// shank above the flutes is probed for contact. A shank hit stops
/// the sweep at that sample, leaving removal up to that point applied
/// (partial effect), and returns a recoverable collision result with
/// the collision flag set.
#[derive(Debug, Clone)]
pub struct SweepRemoval {
    guard: ReproducibilityGuard,
}

impl SweepRemoval {
    /// New behavior; the guard re-seeds from the state at initialize.
    pub fn new() -> Self {
        Self {
            guard: ReproducibilityGuard::new(1),
        }
    }

    /// The behavior's reproducibility guard.
    pub fn guard(&self) -> &ReproducibilityGuard {
        &self.guard
    }

    fn shank_touches(grid: &dyn MaterialGrid, pose: &Pose, tool: &Tool) -> bool {
        let Some(flutes) = tool.flute_length() else {
            return false;
        };
        if flutes >= tool.length() {
            return false;
        }
        let radius = tool.radius();
        let up = pose.local_z();
        let center = pose.position() + up * (flutes + grid.resolution());
        let local_x = pose.transform_vector(&Vec3::x()) * radius;
        let local_y = pose.transform_vector(&Vec3::y()) * radius;
        [
            Vec3::zeros(),
            local_x,
            -local_x,
            local_y,
            -local_y,
        ]
        .iter()
        .any(|offset| grid.is_occupied(&(center + *offset)))
    }
}

impl Default for SweepRemoval {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineBehavior for SweepRemoval {
    fn kind(&self) -> &'static str {
        "sweep-removal"
    }

    fn on_initialize(&mut self, state: &mut SimulationState) -> Result<(), SimError> {
        self.guard = ReproducibilityGuard::new(state.seed());
        Ok(())
    }

    fn do_step(&mut self, state: &mut SimulationState, sweep: &ToolSweep) -> StepResult {
        self.guard.step();
        if !sweep.is_valid() {
            return StepResult::failed(SimError::Geometry {
                reason: "sweep failed validation".into(),
            });
        }

        let tool = sweep.tool().clone();
        let radius = tool.radius();
        let cut_length = tool.flute_length().unwrap_or_else(|| tool.length());
        let samples = sweep.sample_count();
        let volume_before = state.grid().remaining_volume();
        let resolution = state.grid().resolution();

        let mut contact = false;
        let mut collided = false;
        for i in 0..samples {
            let t = i as f64 / (samples - 1) as f64;
            let pose = sweep.sample_at(t);

            if Self::shank_touches(state.grid(), &pose, &tool) {
                state.set_tool_pose(pose);
                collided = true;
                break;
            }

            let tip = pose.position();
            let band_top = tip + pose.local_z() * cut_length;
            if let Some(band) = Aabb::from_points([tip, band_top]) {
                if state.grid_mut().remove_region(&band.expanded(radius)) {
                    contact = true;
                }
            }
            state.set_tool_pose(pose);
        }

        let removed = (volume_before - state.grid().remaining_volume()).max(0.0);
        let mut result = StepResult::clean();
        result.removed_volume = removed;
        result.tool_contact = contact || collided;
        result.cells_processed = if resolution > 0.0 {
            (removed / resolution.powi(3)).round() as u64
        } else {
            0
        };
        if collided {
            result.collision = true;
            result.error = Some(SimError::ToolCollision {
                step: state.step_count(),
            });
        }
        result
    }

    fn on_reset(&mut self) {
        self.guard.reset();
    }
}

/// The standard fixed-timestep sweep engine.
pub type SweepEngine = EngineBase<SweepRemoval, FixedStep>;

impl SweepEngine {
    /// Sweep engine with a fixed timestep in seconds.
    pub fn fixed(dt: f64) -> Self {
        EngineBase::new(SweepRemoval::new(), FixedStep::new(dt))
    }
}
