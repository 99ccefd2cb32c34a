//! Deterministic material-removal simulation for milltwin.
//!
//! The engine steps a [`SimulationState`] over [`ToolSweep`]s: each
//! step samples the sweep, subtracts material through the
//! [`MaterialGrid`] contract, and reports a [`StepResult`]. State and
//! engine both deep-clone, so independent rollouts and snapshot/
//! rollback need no shared mutable state. Identical seeds and sweep
//! sequences reproduce identical outcomes.
//!
//! [`StepController`] is the entry point front-ends drive; the grid
//! itself is implemented externally against the [`MaterialGrid`]
//! trait.

#![warn(missing_docs)]

mod clock;
mod controller;
mod determinism;
mod engine;
mod error;
mod grid;
mod result;
mod state;
mod sweep;

pub use clock::{FixedStep, SimClock, VariableStep, DEFAULT_TIME_STEP};
pub use controller::StepController;
pub use determinism::{ReproducibilityGuard, SimRng, StateHasher};
pub use engine::{EngineBase, EngineBehavior, SimulationEngine, SweepEngine, SweepRemoval};
pub use error::{ErrorCategory, Severity, SimError};
pub use grid::MaterialGrid;
pub use result::StepResult;
pub use state::SimulationState;
pub use sweep::ToolSweep;
