#![warn(missing_docs)]

//! Digital-twin engine for CNC machining.
//!
//! Given axis or tool-pose commands, milltwin computes reachable tool
//! trajectories, proves a toolpath safe and continuous, and
//! deterministically steps a material-removal simulation to evaluate
//! volumetric outcome and collisions.
//!
//! The member crates carry the subsystems: `milltwin_math` (geometry
//! algebra), `milltwin_machine` (kinematics and the tool chain),
//! `milltwin_toolpath` (the immutable motion model and validator),
//! `milltwin_sim` (the stepping engine), `milltwin_motion` (jog and
//! target-position control). [`TwinSession`] ties one machine, one
//! material grid, and one engine into a ready-to-run twin.

pub use milltwin_machine;
pub use milltwin_math;
pub use milltwin_motion;
pub use milltwin_sim;
pub use milltwin_toolpath;

use milltwin_machine::{Machine, MachineAssembly, MachineKinematics, ToolHolder};
use milltwin_math::Pose;
use milltwin_sim::{
    MaterialGrid, SimError, SimulationState, StepController, SweepEngine, ToolSweep,
};
use milltwin_toolpath::{Toolpath, ToolpathValidator, ValidationError};
use tracing::{debug, info};

/// Outcome of running a toolpath through a session.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunReport {
    /// Motion moves the toolpath contained.
    pub moves_total: usize,
    /// Motion moves fully simulated.
    pub moves_completed: usize,
    /// Material removed over the run, in mm^3.
    pub removed_volume: f64,
    /// Collisions encountered (each recoverable, each halts its move).
    pub collisions: usize,
    /// Simulated time covered, in seconds.
    pub elapsed: f64,
}

impl RunReport {
    /// Whether every move simulated cleanly.
    pub fn is_clean(&self) -> bool {
        self.moves_completed == self.moves_total && self.collisions == 0
    }
}

/// One machine, one material grid, one engine: a ready-to-run twin.
///
/// The session owns a pristine clone of its initial state, so a run
/// can always be rolled back without re-describing the stock. Runs
/// with the same seed and toolpath reproduce identical reports.
pub struct TwinSession {
    machine: Machine,
    assembly: MachineAssembly,
    validator: ToolpathValidator,
    controller: StepController,
    state: SimulationState,
    pristine: SimulationState,
}

impl TwinSession {
    /// New session over a machine, its kinematics, and a stock grid.
    ///
    /// The engine is armed immediately; fails if the assembled state
    /// does not validate.
    pub fn new(
        machine: Machine,
        kinematics: Box<dyn MachineKinematics>,
        grid: Box<dyn MaterialGrid>,
        start_pose: Pose,
        seed: u64,
    ) -> Result<Self, SimError> {
        let mut state = SimulationState::new(grid, start_pose).with_seed(seed);
        let pristine = state.clone();
        let mut controller = StepController::new(Box::new(SweepEngine::fixed(0.001)));
        if !controller.initialize(&mut state) {
            return Err(controller
                .last_result()
                .error
                .clone()
                .unwrap_or(SimError::NotInitialized));
        }
        info!(machine = machine.name(), seed, "twin session armed");
        Ok(Self {
            machine,
            assembly: MachineAssembly::new(kinematics),
            validator: ToolpathValidator::new(),
            controller,
            state,
            pristine,
        })
    }

    /// The machine profile.
    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    /// The kinematics-plus-mount assembly.
    pub fn assembly(&self) -> &MachineAssembly {
        &self.assembly
    }

    /// The live simulation state.
    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    /// Mount a tool holder; rejects invalid holders.
    pub fn attach_tool(&mut self, holder: ToolHolder) -> bool {
        self.assembly.mount_mut().attach(holder)
    }

    /// Validate a toolpath against this session's machine.
    pub fn validate(&self, path: &Toolpath) -> Result<(), ValidationError> {
        self.validator.validate_for_machine(path, &self.machine)
    }

    /// Simulate a toolpath's motion moves, one engine step per move.
    ///
    /// Each motion move becomes a [`ToolSweep`] between its endpoint
    /// tip positions using the mounted tool. A collision halts its
    /// move but the run continues with the next one; any other failure
    /// halts the run. Control moves (dwell, tool change, spindle) are
    /// skipped; tool changes do not swap the mounted holder, which
    /// stays the caller's job.
    ///
    /// Fails without stepping when no tool is mounted or the path does
    /// not validate.
    pub fn run(&mut self, path: &Toolpath) -> Result<RunReport, SimError> {
        let Some(holder) = self.assembly.mount().holder() else {
            return Err(SimError::Machine {
                reason: "no tool mounted".into(),
            });
        };
        if let Err(err) = self.validate(path) {
            return Err(SimError::invalid_state(format!(
                "toolpath failed validation: {err}"
            )));
        }
        let tool = holder.tool().clone();
        let resolution = self.state.grid().resolution();

        let mut report = RunReport {
            moves_total: path
                .moves()
                .iter()
                .filter(|mv| !mv.kind().is_control())
                .count(),
            ..RunReport::default()
        };

        for (index, mv) in path.moves().iter().enumerate() {
            if mv.kind().is_control() {
                continue;
            }
            let start = mv.start().position();
            let end = mv.end().position();
            let sweep = ToolSweep::new(
                tool.clone(),
                Pose::translation(start.x, start.y, start.z),
                Pose::translation(end.x, end.y, end.z),
            )
            .with_resolution_hint(resolution.max(0.1));

            let ok = self.controller.step_once(&mut self.state, &sweep);
            let result = self.controller.last_result();
            report.removed_volume += result.removed_volume;
            report.elapsed += result.elapsed;

            if ok {
                report.moves_completed += 1;
            } else if result.collision {
                debug!(move_index = index, "collision, continuing with next move");
                report.collisions += 1;
            } else {
                let error = result
                    .error
                    .clone()
                    .unwrap_or(SimError::NotInitialized);
                debug!(move_index = index, error = %error, "run halted");
                return Err(error);
            }
        }
        info!(
            completed = report.moves_completed,
            total = report.moves_total,
            removed = report.removed_volume,
            "run finished"
        );
        Ok(report)
    }

    /// Discard all material removal and rewind to the initial state,
    /// re-arming the engine.
    pub fn rollback(&mut self) -> Result<(), SimError> {
        self.controller.reset(&mut self.state);
        self.state = self.pristine.clone();
        if !self.controller.initialize(&mut self.state) {
            return Err(self
                .controller
                .last_result()
                .error
                .clone()
                .unwrap_or(SimError::NotInitialized));
        }
        Ok(())
    }
}

impl std::fmt::Debug for TwinSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwinSession")
            .field("machine", &self.machine.name())
            .field("state", &self.state)
            .finish()
    }
}
