#![warn(missing_docs)]

//! Machine kinematics and tooling chain for milltwin.
//!
//! This crate models the physical machine side of the digital twin:
//! axis definitions and limits, the spindle, forward/inverse kinematics
//! behind the [`MachineKinematics`] trait, and the tool/holder/mount
//! chain that turns a spindle pose into a tool-tip pose.
//!
//! # Example
//!
//! ```
//! use milltwin_machine::{Cartesian3Axis, MachineKinematics};
//! use milltwin_math::{Point3, Pose};
//!
//! let machine = Cartesian3Axis::default();
//! let fk = machine.forward(&[10.0, 20.0, -5.0, 0.0, 0.0, 0.0]);
//! assert!(fk.valid);
//! assert_eq!(fk.pose.position(), Point3::new(10.0, 20.0, -5.0));
//!
//! let solutions = machine.inverse(&Pose::translation(10.0, 20.0, -5.0));
//! assert!(solutions[0].valid);
//! ```

mod axis;
mod cartesian;
mod kinematics;
mod machine;
mod mount;
mod spindle;
mod tool;
mod validate;

pub use axis::{AxisConfig, AxisDefinition, AxisId, AxisKind};
pub use cartesian::Cartesian3Axis;
pub use kinematics::{ForwardKinematics, IkSolution, MachineKinematics};
pub use machine::Machine;
pub use mount::{MachineAssembly, ToolMount};
pub use spindle::{Spindle, SpindleDirection};
pub use tool::{Tool, ToolHolder};
pub use validate::{MachineValidationError, ToolValidationError};
