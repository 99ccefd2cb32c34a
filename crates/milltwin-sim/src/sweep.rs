//! Tool sweeps: the volume a tool covers between two poses.

use milltwin_machine::Tool;
use milltwin_math::{Aabb, Point3, Pose, Tolerance};

/// A tool moving from one tip pose to another.
///
/// Poses are tool-tip poses. Intermediate poses come from
/// [`sample_at`](Self::sample_at): linear position interpolation with
/// spherical (slerp) rotation interpolation, so the sampled path is
/// the shortest rotational route between the endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSweep {
    tool: Tool,
    start: Pose,
    end: Pose,
    resolution_hint: Option<f64>,
}

impl ToolSweep {
    /// New sweep between two tip poses.
    pub fn new(tool: Tool, start: Pose, end: Pose) -> Self {
        Self {
            tool,
            start,
            end,
            resolution_hint: None,
        }
    }

    /// Same sweep with a sampling resolution hint in mm; non-positive
    /// hints are ignored.
    pub fn with_resolution_hint(mut self, hint: f64) -> Self {
        self.resolution_hint = (hint > 0.0 && hint.is_finite()).then_some(hint);
        self
    }

    /// The swept tool.
    pub fn tool(&self) -> &Tool {
        &self.tool
    }

    /// Starting tip pose.
    pub fn start(&self) -> &Pose {
        &self.start
    }

    /// Ending tip pose.
    pub fn end(&self) -> &Pose {
        &self.end
    }

    /// Straight-line distance between the tip positions.
    pub fn distance(&self) -> f64 {
        (self.end.position() - self.start.position()).norm()
    }

    /// Whether the sweep changes position only, not orientation.
    pub fn is_translation_only(&self) -> bool {
        self.start
            .rotation()
            .angle_to(&self.end.rotation())
            .abs()
            < Tolerance::DEFAULT.angular
    }

    /// Pose at parameter `t` in `[0, 1]`; out-of-range values clamp.
    ///
    /// Position interpolates linearly; rotation interpolates with
    /// slerp. Antipodal rotations, where slerp is undefined, fall back
    /// to the nearer endpoint.
    pub fn sample_at(&self, t: f64) -> Pose {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let position = self.start.position() + (self.end.position() - self.start.position()) * t;
        let rotation = self
            .start
            .rotation()
            .try_slerp(&self.end.rotation(), t, 1e-9)
            .unwrap_or_else(|| {
                if t < 0.5 {
                    self.start.rotation()
                } else {
                    self.end.rotation()
                }
            });
        Pose::new(position, rotation)
    }

    /// How many samples the engine should take over this sweep.
    ///
    /// Derived from the resolution hint (one sample per hint-length of
    /// travel, capped at 256) or a default of 16 for hintless sweeps;
    /// always at least 2 so both endpoints are visited.
    pub fn sample_count(&self) -> usize {
        match self.resolution_hint {
            Some(hint) => ((self.distance() / hint).ceil() as usize + 1).clamp(2, 256),
            None => {
                if self.distance() < f64::EPSILON && self.is_translation_only() {
                    2
                } else {
                    16
                }
            }
        }
    }

    /// Bounding box of the tool over the whole sweep.
    ///
    /// Union of the tool's world-space bounding box at every sample,
    /// conservative for the true swept volume.
    pub fn bounding_box(&self) -> Aabb {
        let local = self.tool.bounding_box();
        let corners = [
            Point3::new(local.min.x, local.min.y, local.min.z),
            Point3::new(local.max.x, local.min.y, local.min.z),
            Point3::new(local.min.x, local.max.y, local.min.z),
            Point3::new(local.max.x, local.max.y, local.min.z),
            Point3::new(local.min.x, local.min.y, local.max.z),
            Point3::new(local.max.x, local.min.y, local.max.z),
            Point3::new(local.min.x, local.max.y, local.max.z),
            Point3::new(local.max.x, local.max.y, local.max.z),
        ];

        let n = self.sample_count();
        let points = (0..n).flat_map(|i| {
            let pose = self.sample_at(i as f64 / (n - 1) as f64);
            corners.map(|c| pose.transform_point(&c))
        });
        Aabb::from_points(points).unwrap_or_else(Aabb::empty)
    }

    /// Whether both poses and the tool are usable.
    pub fn is_valid(&self) -> bool {
        self.tool.is_valid() && self.start.is_finite() && self.end.is_finite()
    }
}
