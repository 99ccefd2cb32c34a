//! Toolpath model and validation for milltwin.
//!
//! A [`Toolpath`] is an append-only sequence of [`ToolpathMove`]s, each
//! carrying immutable [`ToolpathState`] snapshots at its endpoints. The
//! [`ToolpathValidator`] proves a path safe and continuous before it is
//! handed to simulation or execution.
//!
//! ```
//! use milltwin_math::Point3;
//! use milltwin_toolpath::{Toolpath, ToolpathMove, ToolpathState, ToolpathValidator};
//!
//! let down = ToolpathState::at(Point3::new(0.0, 0.0, 10.0));
//! let origin = ToolpathState::at(Point3::origin());
//! let cut_end = ToolpathState::at(Point3::new(100.0, 0.0, 0.0))
//!     .with_feed_rate(500.0)
//!     .with_tool("T1");
//!
//! let mut path = Toolpath::new("face-pass");
//! path.append(ToolpathMove::rapid(down, origin.clone()));
//! path.append(ToolpathMove::linear(origin.with_tool("T1"), cut_end));
//!
//! assert!((path.total_length() - 110.0).abs() < 1e-9);
//! assert!(ToolpathValidator::new().is_valid(&path));
//! ```

#![warn(missing_docs)]

mod moves;
mod path;
mod state;
mod validator;

pub use moves::{MoveKind, ToolpathMove, ZERO_LENGTH_EPSILON};
pub use path::Toolpath;
pub use state::{CoolantMode, CoordinateMode, ToolpathState};
pub use validator::{ToolpathValidator, ValidationError};
