//! Spindle speed range and power profile.

use serde::{Deserialize, Serialize};

/// Spindle rotation direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpindleDirection {
    /// Clockwise rotation (M3).
    Clockwise,
    /// Counter-clockwise rotation (M4).
    CounterClockwise,
}

/// Spindle specification: RPM range, power, default direction.
///
/// Construction floors negative values to zero and swaps a malformed
/// RPM range, so a `Spindle` is always usable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spindle {
    min_rpm: f64,
    max_rpm: f64,
    power_kw: f64,
    direction: SpindleDirection,
}

impl Spindle {
    /// New spindle with the given RPM range and power rating.
    pub fn new(min_rpm: f64, max_rpm: f64, power_kw: f64) -> Self {
        let min = min_rpm.max(0.0);
        let max = max_rpm.max(0.0);
        let (min_rpm, max_rpm) = if min <= max { (min, max) } else { (max, min) };
        Self {
            min_rpm,
            max_rpm,
            power_kw: power_kw.max(0.0),
            direction: SpindleDirection::Clockwise,
        }
    }

    /// Minimum speed (RPM).
    pub fn min_rpm(&self) -> f64 {
        self.min_rpm
    }

    /// Maximum speed (RPM).
    pub fn max_rpm(&self) -> f64 {
        self.max_rpm
    }

    /// Power rating (kW).
    pub fn power_kw(&self) -> f64 {
        self.power_kw
    }

    /// Default rotation direction.
    pub fn direction(&self) -> SpindleDirection {
        self.direction
    }

    /// Check an RPM value against the speed range.
    pub fn contains_rpm(&self, rpm: f64) -> bool {
        rpm.is_finite() && rpm >= self.min_rpm && rpm <= self.max_rpm
    }
}

impl Default for Spindle {
    /// A typical 24k RPM router spindle.
    fn default() -> Self {
        Self::new(0.0, 24000.0, 2.2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spindle_range() {
        let spindle = Spindle::new(1000.0, 18000.0, 5.0);
        assert!(spindle.contains_rpm(12000.0));
        assert!(spindle.contains_rpm(1000.0));
        assert!(!spindle.contains_rpm(500.0));
        assert!(!spindle.contains_rpm(f64::NAN));
    }

    #[test]
    fn test_spindle_swaps_malformed_range() {
        let spindle = Spindle::new(18000.0, 1000.0, -2.0);
        assert_eq!(spindle.min_rpm(), 1000.0);
        assert_eq!(spindle.max_rpm(), 18000.0);
        assert_eq!(spindle.power_kw(), 0.0);
    }
}
