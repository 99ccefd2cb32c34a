//! The mutable simulation state.

use milltwin_math::Pose;

use crate::determinism::StateHasher;
use crate::grid::MaterialGrid;

/// Everything a running simulation mutates, in one snapshot.
///
/// The material grid is exclusively owned; `clone` deep-copies it, so
/// a cloned state shares nothing with the original and serves as a
/// rollback point or an independent rollout. The step counter and
/// time accumulator only ever grow while the engine drives them.
pub struct SimulationState {
    grid: Box<dyn MaterialGrid>,
    tool_pose: Pose,
    axis_positions: [f64; 6],
    step_count: u64,
    elapsed_time: f64,
    seed: u64,
}

impl SimulationState {
    /// New state over a grid with the tool at an initial pose.
    ///
    /// Counters start at zero; the seed defaults to 1.
    pub fn new(grid: Box<dyn MaterialGrid>, tool_pose: Pose) -> Self {
        Self {
            grid,
            tool_pose,
            axis_positions: [0.0; 6],
            step_count: 0,
            elapsed_time: 0.0,
            seed: 1,
        }
    }

    /// Same state with a deterministic seed; 0 is coerced to 1.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = if seed == 0 { 1 } else { seed };
        self
    }

    /// The material grid.
    pub fn grid(&self) -> &dyn MaterialGrid {
        self.grid.as_ref()
    }

    /// Mutable access to the material grid.
    pub fn grid_mut(&mut self) -> &mut dyn MaterialGrid {
        self.grid.as_mut()
    }

    /// Current tool-tip pose.
    pub fn tool_pose(&self) -> &Pose {
        &self.tool_pose
    }

    /// Update the tool-tip pose.
    pub fn set_tool_pose(&mut self, pose: Pose) {
        self.tool_pose = pose;
    }

    /// Axis positions in [X, Y, Z, A, B, C] order.
    pub fn axis_positions(&self) -> [f64; 6] {
        self.axis_positions
    }

    /// Update the axis positions.
    pub fn set_axis_positions(&mut self, positions: [f64; 6]) {
        self.axis_positions = positions;
    }

    /// Number of steps applied to this state.
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Advance the step counter by one. Engine use only; callers treat
    /// the counter as monotonic.
    pub fn increment_step_count(&mut self) {
        self.step_count += 1;
    }

    /// Accumulated simulation time in seconds.
    pub fn elapsed_time(&self) -> f64 {
        self.elapsed_time
    }

    /// Add an elapsed delta; negative or non-finite deltas are ignored.
    pub fn add_time(&mut self, dt: f64) {
        if dt.is_finite() && dt > 0.0 {
            self.elapsed_time += dt;
        }
    }

    /// Deterministic seed for this simulation line.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Whether the state is steppable.
    pub fn is_valid(&self) -> bool {
        self.grid.is_valid()
            && self.tool_pose.is_finite()
            && self.axis_positions.iter().all(|p| p.is_finite())
            && self.elapsed_time.is_finite()
            && self.elapsed_time >= 0.0
    }

    /// Order-sensitive fingerprint of the state for reproducibility
    /// checks across runs and clones.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = StateHasher::new();
        hasher.write_u64(self.step_count);
        hasher.write_u64(self.seed);
        hasher.write_f64(self.elapsed_time);
        hasher.write_f64(self.grid.remaining_volume());
        let p = self.tool_pose.position();
        hasher.write_f64(p.x);
        hasher.write_f64(p.y);
        hasher.write_f64(p.z);
        for axis in self.axis_positions {
            hasher.write_f64(axis);
        }
        hasher.finish()
    }
}

impl Clone for SimulationState {
    fn clone(&self) -> Self {
        Self {
            grid: self.grid.boxed_clone(),
            tool_pose: self.tool_pose,
            axis_positions: self.axis_positions,
            step_count: self.step_count,
            elapsed_time: self.elapsed_time,
            seed: self.seed,
        }
    }
}

impl std::fmt::Debug for SimulationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationState")
            .field("grid", &self.grid.kind())
            .field("tool_pose", &self.tool_pose)
            .field("step_count", &self.step_count)
            .field("elapsed_time", &self.elapsed_time)
            .field("seed", &self.seed)
            .finish()
    }
}
