//! Waypoint paths

use glam::Vec3;

use crate::world::{GameMap, NodeId};

/// Ordered waypoints plus the index of the next one to seek.
///
/// Paths are never edited in place; recalculation builds a new one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    nodes: Vec<NodeId>,
    points: Vec<Vec3>,
    segment: usize,
}

impl Path {
    /// Map each tile to its world-space centre
    #[must_use]
    pub fn from_nodes(map: &GameMap, nodes: Vec<NodeId>) -> Self {
        let points = nodes.iter().map(|&n| map.localize(n)).collect();
        Self {
            nodes,
            points,
            segment: 0,
        }
    }

    /// Build a path straight from world positions
    #[must_use]
    pub fn from_points(points: Vec<Vec3>) -> Self {
        Self {
            nodes: Vec::new(),
            points,
            segment: 0,
        }
    }

    /// Waypoints in world space
    #[must_use]
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// Tiles the path was built from (empty for point paths)
    #[must_use]
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Index of the waypoint currently sought
    #[must_use]
    pub fn segment(&self) -> usize {
        self.segment
    }

    /// The waypoint currently sought
    #[must_use]
    pub fn current(&self) -> Option<Vec3> {
        self.points.get(self.segment).copied()
    }

    /// Move on to the next waypoint. Stops at the last one.
    pub fn advance(&mut self) {
        if self.segment + 1 < self.points.len() {
            self.segment += 1;
        }
    }

    /// Whether the cursor sits on the final waypoint
    #[must_use]
    pub fn is_at_last(&self) -> bool {
        !self.points.is_empty() && self.segment == self.points.len() - 1
    }

    /// Empty, or already seeking the final waypoint
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.points.is_empty() || self.is_at_last()
    }

    /// Number of waypoints
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if there are no waypoints
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
