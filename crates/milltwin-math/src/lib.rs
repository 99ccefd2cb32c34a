#![warn(missing_docs)]

//! Math types for the milltwin CNC digital-twin engine.
//!
//! Thin wrappers around nalgebra providing domain-specific types
//! for machine simulation: points, vectors, rigid poses, bounding
//! boxes, and tolerance constants.

use nalgebra::{Quaternion, Unit, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A unit (normalized) direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// A unit quaternion rotation.
pub type Rotation = UnitQuaternion<f64>;

/// A rigid transform: translation plus unit-quaternion rotation.
///
/// Composition is non-commutative and follows the matrix convention:
/// `a * b` applies `b` first, then `a`. The rotation component is
/// re-normalized whenever a raw quaternion enters, so a `Pose` always
/// carries a unit rotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    position: Point3,
    rotation: Rotation,
}

impl Pose {
    /// Identity pose (origin, no rotation).
    pub fn identity() -> Self {
        Self {
            position: Point3::origin(),
            rotation: Rotation::identity(),
        }
    }

    /// Pose from position and unit rotation.
    pub fn new(position: Point3, rotation: Rotation) -> Self {
        Self { position, rotation }
    }

    /// Pose from position and a raw quaternion, normalized on entry.
    ///
    /// A degenerate (zero) quaternion falls back to the identity rotation.
    pub fn from_quaternion(position: Point3, quaternion: Quaternion<f64>) -> Self {
        let rotation = if quaternion.norm() > 0.0 && quaternion.norm().is_finite() {
            Rotation::new_normalize(quaternion)
        } else {
            Rotation::identity()
        };
        Self { position, rotation }
    }

    /// Translation-only pose.
    pub fn translation(x: f64, y: f64, z: f64) -> Self {
        Self {
            position: Point3::new(x, y, z),
            rotation: Rotation::identity(),
        }
    }

    /// Pose from position and axis-angle rotation.
    pub fn from_axis_angle(position: Point3, axis: &Dir3, angle: f64) -> Self {
        Self {
            position,
            rotation: Rotation::from_axis_angle(axis, angle),
        }
    }

    /// Position component.
    pub fn position(&self) -> Point3 {
        self.position
    }

    /// Rotation component.
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Replace the position.
    pub fn set_position(&mut self, position: Point3) {
        self.position = position;
    }

    /// Replace the rotation with a raw quaternion, normalized on entry.
    pub fn set_rotation(&mut self, quaternion: Quaternion<f64>) {
        self.rotation = if quaternion.norm() > 0.0 && quaternion.norm().is_finite() {
            Rotation::new_normalize(quaternion)
        } else {
            Rotation::identity()
        };
    }

    /// Transform a point (rotate, then translate).
    pub fn transform_point(&self, p: &Point3) -> Point3 {
        self.position + self.rotation.transform_point(p).coords
    }

    /// Transform a direction vector (rotation only).
    pub fn transform_vector(&self, v: &Vec3) -> Vec3 {
        self.rotation.transform_vector(v)
    }

    /// The local +Z direction of this pose in world coordinates.
    pub fn local_z(&self) -> Vec3 {
        self.rotation.transform_vector(&Vec3::z())
    }

    /// Inverse pose: inverse rotation, then inverse translation.
    pub fn inverse(&self) -> Self {
        let inv_rot = self.rotation.inverse();
        let inv_pos = inv_rot.transform_vector(&(-self.position.coords));
        Self {
            position: Point3::from(inv_pos),
            rotation: inv_rot,
        }
    }

    /// Check that all components are finite.
    pub fn is_finite(&self) -> bool {
        self.position.coords.iter().all(|c| c.is_finite())
            && self.rotation.coords.iter().all(|c| c.is_finite())
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

impl std::ops::Mul for Pose {
    type Output = Pose;

    /// Compose: `self * other` applies `other` first, then `self`.
    fn mul(self, other: Pose) -> Pose {
        Pose {
            position: self.transform_point(&other.position),
            rotation: self.rotation * other.rotation,
        }
    }
}

/// An axis-aligned bounding box.
///
/// Construction swaps malformed per-component ranges so the box is
/// always min <= max.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Point3,
    /// Maximum corner.
    pub max: Point3,
}

impl Aabb {
    /// Box from two corners, swap-fixed per component.
    pub fn new(a: Point3, b: Point3) -> Self {
        Self {
            min: Point3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Point3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Degenerate box at the origin.
    pub fn empty() -> Self {
        Self {
            min: Point3::origin(),
            max: Point3::origin(),
        }
    }

    /// Smallest box containing all points. Returns `None` for an empty set.
    pub fn from_points<I: IntoIterator<Item = Point3>>(points: I) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut min = first;
        let mut max = first;
        for p in iter {
            min = Point3::new(min.x.min(p.x), min.y.min(p.y), min.z.min(p.z));
            max = Point3::new(max.x.max(p.x), max.y.max(p.y), max.z.max(p.z));
        }
        Some(Self { min, max })
    }

    /// Center of the box.
    pub fn center(&self) -> Point3 {
        Point3::from((self.min.coords + self.max.coords) * 0.5)
    }

    /// Extent along each axis.
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Enclosed volume.
    pub fn volume(&self) -> f64 {
        let s = self.size();
        s.x * s.y * s.z
    }

    /// Check containment (boundary inclusive).
    pub fn contains(&self, p: &Point3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// Check overlap with another box (boundary inclusive).
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Smallest box containing both boxes.
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: Point3::new(
                self.min.x.min(other.min.x),
                self.min.y.min(other.min.y),
                self.min.z.min(other.min.z),
            ),
            max: Point3::new(
                self.max.x.max(other.max.x),
                self.max.y.max(other.max.y),
                self.max.z.max(other.max.z),
            ),
        }
    }

    /// Box grown by `margin` on all sides.
    pub fn expanded(&self, margin: f64) -> Aabb {
        let m = Vec3::new(margin, margin, margin);
        Aabb::new(self.min - m, self.max + m)
    }

    /// Check that min <= max and all coordinates are finite.
    pub fn is_valid(&self) -> bool {
        self.min.coords.iter().all(|c| c.is_finite())
            && self.max.coords.iter().all(|c| c.is_finite())
            && self.min.x <= self.max.x
            && self.min.y <= self.max.y
            && self.min.z <= self.max.z
    }
}

/// Tolerance constants for geometric comparisons.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    /// Linear distance tolerance in mm.
    pub linear: f64,
    /// Angular tolerance in radians.
    pub angular: f64,
}

impl Tolerance {
    /// Default machining tolerances (1e-6 mm linear, 1e-9 rad angular).
    pub const DEFAULT: Self = Self {
        linear: 1e-6,
        angular: 1e-9,
    };

    /// Check if two points are coincident within tolerance.
    pub fn points_equal(&self, a: &Point3, b: &Point3) -> bool {
        (a - b).norm() < self.linear
    }

    /// Check if a scalar distance is effectively zero.
    pub fn is_zero(&self, d: f64) -> bool {
        d.abs() < self.linear
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_pose_identity() {
        let pose = Pose::identity();
        let p = Point3::new(1.0, 2.0, 3.0);
        assert!((pose.transform_point(&p) - p).norm() < 1e-12);
    }

    #[test]
    fn test_pose_translation() {
        let pose = Pose::translation(10.0, 20.0, 30.0);
        let p = Point3::new(1.0, 2.0, 3.0);
        let r = pose.transform_point(&p);
        assert!((r - Point3::new(11.0, 22.0, 33.0)).norm() < 1e-12);
    }

    #[test]
    fn test_pose_rotation_then_translation() {
        // 90 degrees about Z at offset (5, 0, 0): (1,0,0) -> (5,1,0)
        let axis = Dir3::new_normalize(Vec3::z());
        let pose = Pose::from_axis_angle(Point3::new(5.0, 0.0, 0.0), &axis, PI / 2.0);
        let r = pose.transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert!((r - Point3::new(5.0, 1.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_pose_compose_right_first() {
        let axis = Dir3::new_normalize(Vec3::z());
        let rot = Pose::from_axis_angle(Point3::origin(), &axis, PI / 2.0);
        let shift = Pose::translation(1.0, 0.0, 0.0);

        // rot * shift applies shift first: (0,0,0) -> (1,0,0) -> (0,1,0)
        let composed = rot * shift;
        let r = composed.transform_point(&Point3::origin());
        assert!((r - Point3::new(0.0, 1.0, 0.0)).norm() < 1e-12);

        // shift * rot applies rot first: (0,0,0) -> (0,0,0) -> (1,0,0)
        let composed = shift * rot;
        let r = composed.transform_point(&Point3::origin());
        assert!((r - Point3::new(1.0, 0.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_pose_inverse_roundtrip() {
        let axis = Dir3::new_normalize(Vec3::new(1.0, 1.0, 0.0));
        let pose = Pose::from_axis_angle(Point3::new(3.0, -2.0, 7.0), &axis, 0.7);
        let composed = pose * pose.inverse();
        let p = Point3::new(5.0, 6.0, 7.0);
        assert!((composed.transform_point(&p) - p).norm() < 1e-12);
    }

    #[test]
    fn test_pose_normalizes_raw_quaternion() {
        let q = Quaternion::new(2.0, 0.0, 0.0, 0.0);
        let pose = Pose::from_quaternion(Point3::origin(), q);
        assert!((pose.rotation().norm() - 1.0).abs() < 1e-12);

        let zero = Quaternion::new(0.0, 0.0, 0.0, 0.0);
        let pose = Pose::from_quaternion(Point3::origin(), zero);
        assert_eq!(pose.rotation(), Rotation::identity());
    }

    #[test]
    fn test_aabb_swap_fix() {
        let b = Aabb::new(Point3::new(10.0, 0.0, 5.0), Point3::new(0.0, 10.0, -5.0));
        assert!(b.is_valid());
        assert_eq!(b.min, Point3::new(0.0, 0.0, -5.0));
        assert_eq!(b.max, Point3::new(10.0, 10.0, 5.0));
    }

    #[test]
    fn test_aabb_contains_and_volume() {
        let b = Aabb::new(Point3::origin(), Point3::new(10.0, 20.0, 30.0));
        assert!(b.contains(&Point3::new(5.0, 5.0, 5.0)));
        assert!(b.contains(&Point3::origin()));
        assert!(!b.contains(&Point3::new(-0.1, 5.0, 5.0)));
        assert!((b.volume() - 6000.0).abs() < 1e-9);
    }

    #[test]
    fn test_aabb_union_and_intersects() {
        let a = Aabb::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        let b = Aabb::new(Point3::new(2.0, 2.0, 2.0), Point3::new(3.0, 3.0, 3.0));
        assert!(!a.intersects(&b));
        let u = a.union(&b);
        assert!(u.contains(&Point3::new(1.5, 1.5, 1.5)));

        let c = Aabb::new(Point3::new(0.5, 0.5, 0.5), Point3::new(2.5, 2.5, 2.5));
        assert!(a.intersects(&c));
        assert!(b.intersects(&c));
    }

    #[test]
    fn test_aabb_from_points() {
        assert!(Aabb::from_points(std::iter::empty()).is_none());
        let b = Aabb::from_points([
            Point3::new(1.0, 5.0, -2.0),
            Point3::new(-1.0, 2.0, 4.0),
            Point3::new(0.0, 7.0, 0.0),
        ])
        .unwrap();
        assert_eq!(b.min, Point3::new(-1.0, 2.0, -2.0));
        assert_eq!(b.max, Point3::new(1.0, 7.0, 4.0));
    }

    #[test]
    fn test_tolerance() {
        let tol = Tolerance::DEFAULT;
        let a = Point3::new(1.0, 2.0, 3.0);
        let b = Point3::new(1.0 + 1e-7, 2.0, 3.0);
        assert!(tol.points_equal(&a, &b));
        assert!(!tol.points_equal(&a, &Point3::new(1.001, 2.0, 3.0)));
        assert!(tol.is_zero(1e-9));
    }

    #[test]
    fn test_pose_serialization() {
        let axis = Dir3::new_normalize(Vec3::z());
        let pose = Pose::from_axis_angle(Point3::new(1.0, 2.0, 3.0), &axis, 0.5);
        let json = serde_json::to_string(&pose).unwrap();
        let parsed: Pose = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, pose);
    }
}
