//! Flow field navigation
//!
//! A flow field is built in two passes over the tile graph:
//!
//! 1. **Integration**: a multi-source Dijkstra wavefront starting from every
//!    goal at cost `0` assigns each tile the cost of its cheapest route to the
//!    nearest goal. Edges are walked backwards so one-way links are honoured.
//! 2. **Flow**: each tile points at the neighbour that minimises
//!    `edge cost + neighbour cost`.
//!
//! ```text
//!  _______________________
//! |     |     |     |     |
//! |  →  |  →  |  G  |  ←  |
//! |_____|_____|_____|_____|
//! |     |     |     |     |
//! |  ↑  |  →  |  ↑  |  ↑  |
//! |_____|_____|_____|_____|
//! ```
//!
//! Tiles that cannot reach any goal get no entry. Many agents can share one
//! field; it only needs rebuilding when the goal set changes.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use glam::Vec3;
use rustc_hash::FxHashMap;

use crate::world::{NodeId, TileGraph};

#[derive(Debug, Clone, Copy)]
struct Frontier {
    node: NodeId,
    cost: f32,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .partial_cmp(&self.cost)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Per-tile desired directions toward a set of goal tiles.
#[derive(Debug, Clone, Default)]
pub struct FlowField {
    goals: Vec<NodeId>,
    costs: FxHashMap<NodeId, f32>,
    directions: FxHashMap<NodeId, Vec3>,
}

impl FlowField {
    /// Build a field toward the given goals.
    #[must_use]
    pub fn build(graph: &TileGraph, goals: &[NodeId]) -> Self {
        // Reverse adjacency: for each node, who can step onto it and at what cost
        let mut incoming: Vec<Vec<(NodeId, f32)>> = vec![Vec::new(); graph.len()];
        for node in graph.nodes() {
            for edge in node.edges() {
                incoming[edge.target.index()].push((node.id(), edge.cost));
            }
        }

        let mut costs: FxHashMap<NodeId, f32> = FxHashMap::default();
        let mut frontier = BinaryHeap::new();
        for &goal in goals {
            costs.insert(goal, 0.0);
            frontier.push(Frontier {
                node: goal,
                cost: 0.0,
            });
        }

        while let Some(Frontier { node, cost }) = frontier.pop() {
            if cost > *costs.get(&node).unwrap_or(&f32::MAX) {
                continue;
            }
            for &(from, edge_cost) in &incoming[node.index()] {
                let candidate = cost + edge_cost;
                if candidate < *costs.get(&from).unwrap_or(&f32::MAX) {
                    costs.insert(from, candidate);
                    frontier.push(Frontier {
                        node: from,
                        cost: candidate,
                    });
                }
            }
        }

        let mut directions = FxHashMap::default();
        for (&id, &cost) in &costs {
            if cost == 0.0 && goals.contains(&id) {
                directions.insert(id, Vec3::ZERO);
                continue;
            }

            let node = graph.node(id);
            let best = node
                .edges()
                .iter()
                .filter_map(|e| costs.get(&e.target).map(|c| (e, e.cost + c)))
                .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));

            if let Some((edge, _)) = best {
                let direction = Vec3::new(
                    (edge.target_x - node.x()) as f32,
                    0.0,
                    (edge.target_z - node.z()) as f32,
                );
                directions.insert(id, direction.normalize_or_zero());
            }
        }

        log::debug!(
            "Built flow field: {} goals, {} of {} tiles reachable",
            goals.len(),
            directions.len(),
            graph.len()
        );

        Self {
            goals: goals.to_vec(),
            costs,
            directions,
        }
    }

    /// Desired direction at a tile, `None` if it cannot reach a goal.
    ///
    /// Goal tiles map to `Vec3::ZERO`.
    #[must_use]
    pub fn get(&self, node: NodeId) -> Option<Vec3> {
        self.directions.get(&node).copied()
    }

    /// Integrated cost from a tile to its nearest goal
    #[must_use]
    pub fn cost(&self, node: NodeId) -> Option<f32> {
        self.costs.get(&node).copied()
    }

    /// Goals this field leads to
    #[must_use]
    pub fn goals(&self) -> &[NodeId] {
        &self.goals
    }

    /// Check if a tile is one of the goals
    #[must_use]
    pub fn is_goal(&self, node: NodeId) -> bool {
        self.goals.contains(&node)
    }

    /// Number of tiles with a direction
    #[must_use]
    pub fn len(&self) -> usize {
        self.directions.len()
    }

    /// Check if no tile has a direction
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.directions.is_empty()
    }
}
