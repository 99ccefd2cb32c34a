//! The machine profile: axis definitions plus spindle.

use serde::{Deserialize, Serialize};

use crate::axis::{AxisDefinition, AxisId, AxisKind};
use crate::spindle::Spindle;

/// Static machine profile used by validation and motion control.
///
/// Holds a definition for each axis the machine has and the spindle
/// specification. Kinematics live separately; this is the data sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Machine {
    name: String,
    axes: [Option<AxisDefinition>; 6],
    spindle: Spindle,
}

impl Machine {
    /// New machine profile with no axes defined yet.
    pub fn new(name: impl Into<String>, spindle: Spindle) -> Self {
        Self {
            name: name.into(),
            axes: [None; 6],
            spindle,
        }
    }

    /// Builder step: define one axis.
    pub fn with_axis(mut self, axis: AxisId, definition: AxisDefinition) -> Self {
        self.axes[axis.index()] = Some(definition);
        self
    }

    /// A symmetric 3-axis machine: X and Y share travel and rates, Z
    /// gets its own.
    pub fn cartesian3(
        name: impl Into<String>,
        xy_travel: (f64, f64),
        z_travel: (f64, f64),
        max_velocity: f64,
        max_acceleration: f64,
        spindle: Spindle,
    ) -> Self {
        let xy = AxisDefinition::new(
            AxisKind::Linear,
            xy_travel.0,
            xy_travel.1,
            max_velocity,
            max_acceleration,
        );
        let z = AxisDefinition::new(
            AxisKind::Linear,
            z_travel.0,
            z_travel.1,
            max_velocity,
            max_acceleration,
        );
        Self::new(name, spindle)
            .with_axis(AxisId::X, xy)
            .with_axis(AxisId::Y, xy)
            .with_axis(AxisId::Z, z)
    }

    /// Machine name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Definition for one axis, if the machine has it.
    pub fn axis(&self, axis: AxisId) -> Option<&AxisDefinition> {
        self.axes[axis.index()].as_ref()
    }

    /// Axes this machine has, in canonical order.
    pub fn defined_axes(&self) -> impl Iterator<Item = AxisId> + '_ {
        AxisId::ALL
            .into_iter()
            .filter(|a| self.axes[a.index()].is_some())
    }

    /// Number of defined axes.
    pub fn axis_count(&self) -> usize {
        self.axes.iter().filter(|a| a.is_some()).count()
    }

    /// The spindle specification.
    pub fn spindle(&self) -> &Spindle {
        &self.spindle
    }

    /// Check a full axis-position array against the defined axes.
    ///
    /// Undefined axes must sit at zero; defined axes must be inside
    /// their travel limits.
    pub fn positions_valid(&self, positions: &[f64; 6]) -> bool {
        AxisId::ALL.into_iter().all(|axis| {
            let p = positions[axis.index()];
            match self.axis(axis) {
                Some(def) => def.is_position_valid(p),
                None => p == 0.0,
            }
        })
    }

    /// Predicate form of [`validate`](Self::validate).
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}
