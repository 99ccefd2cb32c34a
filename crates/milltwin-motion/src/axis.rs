//! Runtime state of one driven axis.

use milltwin_machine::AxisDefinition;

/// One axis being driven: a position and velocity integrated under
/// the axis definition's limits.
///
/// Integration is explicit forward Euler over caller-supplied `dt`:
/// velocity ramps toward the clamped command at the acceleration
/// limit, position integrates the new velocity, and travel limits are
/// a hard stop (position clamps, velocity zeroes). Reproducibility
/// requires callers to use a fixed `dt`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MachineAxis {
    definition: AxisDefinition,
    position: f64,
    velocity: f64,
}

impl MachineAxis {
    /// New axis at a starting position, clamped into travel limits.
    pub fn new(definition: AxisDefinition, position: f64) -> Self {
        Self {
            definition,
            position: definition.clamp_position(if position.is_finite() {
                position
            } else {
                0.0
            }),
            velocity: 0.0,
        }
    }

    /// The static definition.
    pub fn definition(&self) -> &AxisDefinition {
        &self.definition
    }

    /// Current position.
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Current velocity.
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    /// Integrate one tick toward a commanded velocity.
    ///
    /// Returns the signed distance actually traveled.
    pub fn update(&mut self, commanded_velocity: f64, dt: f64) -> f64 {
        if !dt.is_finite() || dt <= 0.0 {
            return 0.0;
        }
        let max_v = self.definition.max_velocity();
        let target = if commanded_velocity.is_finite() {
            commanded_velocity.clamp(-max_v, max_v)
        } else {
            0.0
        };

        let max_dv = self.definition.max_acceleration() * dt;
        self.velocity += (target - self.velocity).clamp(-max_dv, max_dv);

        let before = self.position;
        self.position += self.velocity * dt;

        // Hard stop at the travel limits.
        if self.position < self.definition.min_position() {
            self.position = self.definition.min_position();
            self.velocity = 0.0;
        } else if self.position > self.definition.max_position() {
            self.position = self.definition.max_position();
            self.velocity = 0.0;
        }
        self.position - before
    }

    /// Stop and move to a position, clamped into travel limits.
    pub fn reset(&mut self, position: f64) {
        self.position = self
            .definition
            .clamp_position(if position.is_finite() { position } else { 0.0 });
        self.velocity = 0.0;
    }

    /// Whether the position sits inside the travel limits.
    pub fn is_within_limits(&self) -> bool {
        self.definition.is_position_valid(self.position)
    }

    /// Whether the axis and its definition are usable.
    pub fn is_valid(&self) -> bool {
        self.definition.is_valid() && self.position.is_finite() && self.velocity.is_finite()
    }
}
