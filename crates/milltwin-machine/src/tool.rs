//! Cutting tool and tool holder definitions.

use milltwin_math::{Aabb, Point3, Pose, Vec3};
use serde::{Deserialize, Serialize};

/// A cutting tool definition.
///
/// The tool's local frame has the tip at the origin with +Z running up
/// the shank toward the holder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Tool {
    /// Flat end mill for general machining.
    FlatEndMill {
        /// Tool diameter in mm.
        diameter: f64,
        /// Flute length (cutting depth) in mm.
        flute_length: f64,
        /// Overall length from tip to holder face in mm.
        length: f64,
        /// Number of flutes.
        flutes: u8,
    },
    /// Ball end mill for 3D contouring.
    BallEndMill {
        /// Tool diameter in mm.
        diameter: f64,
        /// Flute length in mm.
        flute_length: f64,
        /// Overall length in mm.
        length: f64,
        /// Number of flutes.
        flutes: u8,
    },
    /// Twist drill for hole making.
    Drill {
        /// Drill diameter in mm.
        diameter: f64,
        /// Point angle in degrees (typically 118 or 135).
        point_angle: f64,
        /// Overall length in mm.
        length: f64,
    },
}

impl Tool {
    /// Cutting diameter of the tool.
    pub fn diameter(&self) -> f64 {
        match self {
            Tool::FlatEndMill { diameter, .. } => *diameter,
            Tool::BallEndMill { diameter, .. } => *diameter,
            Tool::Drill { diameter, .. } => *diameter,
        }
    }

    /// Tool radius.
    pub fn radius(&self) -> f64 {
        self.diameter() / 2.0
    }

    /// Overall length from tip to holder face.
    pub fn length(&self) -> f64 {
        match self {
            Tool::FlatEndMill { length, .. } => *length,
            Tool::BallEndMill { length, .. } => *length,
            Tool::Drill { length, .. } => *length,
        }
    }

    /// Flute (cutting) length, where the tool defines one.
    pub fn flute_length(&self) -> Option<f64> {
        match self {
            Tool::FlatEndMill { flute_length, .. } => Some(*flute_length),
            Tool::BallEndMill { flute_length, .. } => Some(*flute_length),
            Tool::Drill { .. } => None,
        }
    }

    /// Bounding box in the tool's local frame (tip at origin, +Z up).
    pub fn bounding_box(&self) -> Aabb {
        let r = self.radius();
        Aabb::new(Point3::new(-r, -r, 0.0), Point3::new(r, r, self.length()))
    }

    /// Predicate form of [`validate`](Self::validate).
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// A default 6 mm 2-flute flat end mill.
    pub fn default_endmill() -> Self {
        Tool::FlatEndMill {
            diameter: 6.0,
            flute_length: 20.0,
            length: 50.0,
            flutes: 2,
        }
    }
}

/// A rigid tool holder: the offset chain from spindle face to tool tip.
///
/// The holder is assumed rigid (no flex); tool-tip orientation is
/// always inherited from the spindle unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolHolder {
    tool: Tool,
    length: f64,
    offset: Vec3,
}

impl ToolHolder {
    /// New holder with the given gauge length; negative lengths floor to 0.
    pub fn new(tool: Tool, length: f64) -> Self {
        Self {
            tool,
            length: length.max(0.0),
            offset: Vec3::zeros(),
        }
    }

    /// Same holder with a lateral offset from the spindle centerline.
    ///
    /// Zero for collet holders; non-zero for offset heads.
    pub fn with_offset(mut self, offset: Vec3) -> Self {
        self.offset = offset;
        self
    }

    /// The held tool.
    pub fn tool(&self) -> &Tool {
        &self.tool
    }

    /// Holder gauge length (spindle face to tool seat).
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Lateral offset from the spindle centerline.
    pub fn offset(&self) -> Vec3 {
        self.offset
    }

    /// Total length from spindle face to tool tip.
    pub fn total_length(&self) -> f64 {
        self.length + self.tool.length()
    }

    /// Tool-tip pose for a given spindle pose.
    ///
    /// tip = spindle * translate(offset) * translate(-local Z * total length);
    /// orientation is inherited unchanged.
    pub fn tip_pose(&self, spindle: &Pose) -> Pose {
        let seated = spindle.transform_point(&Point3::from(self.offset));
        let down = -spindle.local_z();
        let tip = seated + down * self.total_length();
        Pose::new(tip, spindle.rotation())
    }

    /// Spindle pose that places the tool tip at `tip`.
    ///
    /// Exact inverse of [`tip_pose`](Self::tip_pose): walk back up the
    /// pose's local +Z by the total length, then undo the offset.
    pub fn spindle_pose_for_tip(&self, tip: &Pose) -> Pose {
        let up = tip.local_z();
        let offset_world = tip.transform_vector(&self.offset);
        let spindle = tip.position() + up * self.total_length() - offset_world;
        Pose::new(spindle, tip.rotation())
    }

    /// World-space bounding box of the held tool for a spindle pose.
    pub fn tool_bounding_box(&self, spindle: &Pose) -> Aabb {
        let local = self.tool.bounding_box();
        let tip = self.tip_pose(spindle);
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
        Aabb::from_points(corners.iter().map(|c| tip.transform_point(c)))
            .unwrap_or_else(Aabb::empty)
    }

    /// Predicate form of [`validate`](Self::validate).
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}
