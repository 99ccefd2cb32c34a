//! Simulation error taxonomy.

use thiserror::Error;

/// Logical area an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Stepping protocol and engine lifecycle.
    Simulation,
    /// Sweep/pose geometry.
    Geometry,
    /// Material grid operations.
    MaterialGrid,
    /// Machine configuration or limits.
    Machine,
    /// Tool and holder problems.
    Tool,
    /// Anything else.
    General,
}

/// How bad an error is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Informational only.
    Info,
    /// Recorded but execution may continue.
    Warning,
    /// The operation failed.
    Error,
    /// No further stepping is meaningful.
    Fatal,
}

/// A structured simulation failure.
///
/// The engine's initialize/step/reset surface returns these instead of
/// panicking so batch and training loops can branch on the category,
/// severity, and recoverability of each failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// The simulation state failed validation.
    #[error("simulation state is invalid: {reason}")]
    InvalidState {
        /// What failed validation.
        reason: String,
    },
    /// A step or reset was issued before a successful initialize.
    #[error("engine is not initialized")]
    NotInitialized,
    /// The non-cutting part of the tool touched material.
    #[error("tool collision at step {step}")]
    ToolCollision {
        /// Step counter value when the collision was detected.
        step: u64,
    },
    /// The material grid rejected an operation.
    #[error("material grid error: {reason}")]
    MaterialGrid {
        /// What the grid reported.
        reason: String,
    },
    /// A sweep or pose was geometrically unusable.
    #[error("geometry error: {reason}")]
    Geometry {
        /// What was unusable.
        reason: String,
    },
    /// The machine profile or limits blocked the operation.
    #[error("machine error: {reason}")]
    Machine {
        /// What was blocked.
        reason: String,
    },
}

impl SimError {
    /// Convenience constructor for invalid-state failures.
    pub fn invalid_state(reason: impl Into<String>) -> Self {
        SimError::InvalidState {
            reason: reason.into(),
        }
    }

    /// Logical category of the failure.
    pub fn category(&self) -> ErrorCategory {
        match self {
            SimError::InvalidState { .. } | SimError::NotInitialized => ErrorCategory::Simulation,
            SimError::ToolCollision { .. } => ErrorCategory::Tool,
            SimError::MaterialGrid { .. } => ErrorCategory::MaterialGrid,
            SimError::Geometry { .. } => ErrorCategory::Geometry,
            SimError::Machine { .. } => ErrorCategory::Machine,
        }
    }

    /// Severity of the failure.
    ///
    /// Invalid state is fatal to the call but not the engine instance;
    /// a collision is a warning because stepping may resume once the
    /// caller has reacted.
    pub fn severity(&self) -> Severity {
        match self {
            SimError::InvalidState { .. } => Severity::Fatal,
            SimError::NotInitialized => Severity::Error,
            SimError::ToolCollision { .. } => Severity::Warning,
            SimError::MaterialGrid { .. } => Severity::Error,
            SimError::Geometry { .. } => Severity::Error,
            SimError::Machine { .. } => Severity::Error,
        }
    }

    /// Whether the caller can meaningfully continue stepping.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SimError::ToolCollision { .. })
    }

    /// Whether no further stepping is meaningful.
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}
