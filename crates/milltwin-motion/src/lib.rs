//! Motion control for milltwin.
//!
//! [`MotionController`] turns [`JogCommand`]s and target tool poses
//! into axis positions, integrating each [`MachineAxis`] under its
//! velocity and acceleration limits one explicit tick at a time.
//!
//! ```
//! use milltwin_machine::{AxisId, Cartesian3Axis, Machine, Spindle};
//! use milltwin_motion::{JogCommand, MotionController};
//!
//! let machine = Machine::cartesian3(
//!     "demo", (-100.0, 100.0), (-100.0, 100.0), 50.0, 1000.0, Spindle::default(),
//! );
//! let mut ctrl = MotionController::new(Box::new(Cartesian3Axis::default()), &machine);
//!
//! // A 5 mm jog at 10 mm/s lands exactly, never overshooting.
//! ctrl.apply_jog(&JogCommand::distance(AxisId::X, 10.0, 5.0), 1.0);
//! ctrl.update(1.0);
//! assert!((ctrl.axis_positions()[0] - 5.0).abs() < 1e-9);
//! ```

#![warn(missing_docs)]

mod axis;
mod controller;
mod jog;

pub use axis::MachineAxis;
pub use controller::{MotionController, TARGET_TOLERANCE};
pub use jog::JogCommand;
