//! The material grid contract.

use milltwin_math::{Aabb, Point3};

/// Material occupancy and removal, implemented externally.
///
/// The engine treats the grid as an opaque exclusively-owned resource:
/// it queries occupancy, subtracts tool-sized regions, and reads the
/// remaining volume, never assuming a concrete voxel or mesh
/// representation. Cloning must produce a fully independent deep copy
/// so snapshot and rollback never alias live state.
pub trait MaterialGrid: Send {
    /// Whether material is present at a point.
    fn is_occupied(&self, point: &Point3) -> bool;

    /// Subtract an axis-aligned region; returns whether any material
    /// was actually removed.
    fn remove_region(&mut self, region: &Aabb) -> bool;

    /// Bounding box of the material.
    fn bounding_box(&self) -> Aabb;

    /// Finest representable unit in mm.
    fn resolution(&self) -> f64;

    /// Volume of material still present, in mm^3.
    fn remaining_volume(&self) -> f64;

    /// Deep copy behind the trait object.
    fn boxed_clone(&self) -> Box<dyn MaterialGrid>;

    /// Whether the grid is in a usable state.
    fn is_valid(&self) -> bool;

    /// Grid kind identifier.
    fn kind(&self) -> &'static str;
}

impl Clone for Box<dyn MaterialGrid> {
    fn clone(&self) -> Self {
        self.boxed_clone()
    }
}
