//! The toolpath container.

use std::collections::HashMap;

use milltwin_math::Aabb;
use serde::{Deserialize, Serialize};

use crate::moves::{MoveKind, ToolpathMove};
use crate::state::ToolpathState;

/// An append-only ordered sequence of toolpath moves.
///
/// Moves can be appended but never reordered or removed, so indices
/// reported by the validator stay stable. Aggregates over the sequence
/// (total length, bounding box, estimated time) are recomputed on
/// demand; tool-usage counts are maintained incrementally at append
/// time since they only ever grow.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Toolpath {
    id: String,
    machine_id: String,
    moves: Vec<ToolpathMove>,
    tool_usage: HashMap<String, usize>,
}

impl Toolpath {
    /// New empty toolpath.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            machine_id: String::new(),
            moves: Vec::new(),
            tool_usage: HashMap::new(),
        }
    }

    /// Same toolpath labeled with the machine it targets.
    pub fn with_machine_id(mut self, machine_id: impl Into<String>) -> Self {
        self.machine_id = machine_id.into();
        self
    }

    /// Toolpath identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Target machine identifier; empty when unassigned.
    pub fn machine_id(&self) -> &str {
        &self.machine_id
    }

    /// Append one move to the end of the sequence.
    pub fn append(&mut self, mv: ToolpathMove) {
        if mv.kind().is_cutting() && mv.end().has_tool() {
            *self
                .tool_usage
                .entry(mv.end().tool_id().to_string())
                .or_insert(0) += 1;
        }
        self.moves.push(mv);
    }

    /// The move sequence.
    pub fn moves(&self) -> &[ToolpathMove] {
        &self.moves
    }

    /// Number of moves.
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    /// Whether the toolpath has no moves.
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// State before the first move, if any.
    pub fn first_state(&self) -> Option<&ToolpathState> {
        self.moves.first().map(ToolpathMove::start)
    }

    /// State after the last move, if any.
    pub fn last_state(&self) -> Option<&ToolpathState> {
        self.moves.last().map(ToolpathMove::end)
    }

    /// Total path length in mm, summed over all moves.
    pub fn total_length(&self) -> f64 {
        self.moves.iter().map(ToolpathMove::length).sum()
    }

    /// Estimated total execution time in seconds.
    pub fn estimated_time(&self, rapid_rate: f64) -> f64 {
        self.moves
            .iter()
            .map(|mv| mv.estimated_time(rapid_rate))
            .sum()
    }

    /// Number of cutting moves per tool id.
    pub fn tool_usage(&self) -> &HashMap<String, usize> {
        &self.tool_usage
    }

    /// Number of moves of a given kind.
    pub fn count_kind(&self, kind: MoveKind) -> usize {
        self.moves.iter().filter(|mv| mv.kind() == kind).count()
    }

    /// Bounding box of all move endpoints, `None` for an empty path.
    ///
    /// Arc bulges are approximated by including the arc center, which
    /// over-covers but never under-covers the swept region.
    pub fn bounding_box(&self) -> Option<Aabb> {
        let points = self.moves.iter().flat_map(|mv| {
            [mv.start().position(), mv.end().position()]
                .into_iter()
                .chain(mv.arc_center())
        });
        Aabb::from_points(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use milltwin_math::Point3;

    fn at(x: f64, y: f64, z: f64) -> ToolpathState {
        ToolpathState::at(Point3::new(x, y, z))
    }

    fn rapid_then_cut() -> Toolpath {
        // Rapid down from clearance, then a 100 mm cut.
        let mut path = Toolpath::new("demo");
        path.append(ToolpathMove::rapid(at(0.0, 0.0, 10.0), at(0.0, 0.0, 0.0)));
        path.append(ToolpathMove::linear(
            at(0.0, 0.0, 0.0),
            at(100.0, 0.0, 0.0).with_feed_rate(500.0).with_tool("T1"),
        ));
        path
    }

    #[test]
    fn test_total_length() {
        let path = rapid_then_cut();
        assert!((path.total_length() - 110.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_toolpath() {
        let path = Toolpath::new("empty");
        assert!(path.is_empty());
        assert_eq!(path.total_length(), 0.0);
        assert!(path.bounding_box().is_none());
        assert!(path.first_state().is_none());
    }

    #[test]
    fn test_aggregates_update_on_append() {
        let mut path = rapid_then_cut();
        let before = path.total_length();
        path.append(ToolpathMove::linear(
            path.last_state().unwrap().clone(),
            at(100.0, 50.0, 0.0).with_feed_rate(500.0).with_tool("T1"),
        ));
        assert!((path.total_length() - (before + 50.0)).abs() < 1e-12);
        assert_eq!(path.len(), 3);
    }

    #[test]
    fn test_tool_usage_counts_cutting_moves() {
        let mut path = rapid_then_cut();
        path.append(ToolpathMove::linear(
            path.last_state().unwrap().clone(),
            at(100.0, 50.0, 0.0).with_feed_rate(500.0).with_tool("T1"),
        ));
        path.append(ToolpathMove::linear(
            at(0.0, 0.0, 0.0).with_tool("T2"),
            at(10.0, 0.0, 0.0).with_feed_rate(200.0).with_tool("T2"),
        ));
        assert_eq!(path.tool_usage().get("T1"), Some(&2));
        assert_eq!(path.tool_usage().get("T2"), Some(&1));
        // Rapids do not count as usage.
        assert_eq!(path.count_kind(MoveKind::Rapid), 1);
    }

    #[test]
    fn test_bounding_box_covers_endpoints() {
        let path = rapid_then_cut();
        let bbox = path.bounding_box().unwrap();
        assert_eq!(bbox.min, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(bbox.max, Point3::new(100.0, 0.0, 10.0));
    }

    #[test]
    fn test_first_and_last_state() {
        let path = rapid_then_cut();
        assert_eq!(path.first_state().unwrap().position().z, 10.0);
        assert_eq!(path.last_state().unwrap().position().x, 100.0);
    }

    #[test]
    fn test_serialization_roundtrip() {
        let path = rapid_then_cut();
        let json = serde_json::to_string(&path).unwrap();
        let parsed: Toolpath = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, path);
    }
}
