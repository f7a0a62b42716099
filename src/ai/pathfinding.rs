//! A* pathfinding over a tile graph
//!
//! The search keeps all of its scratch data (`g` scores, parents, closed set)
//! in per-run maps keyed by [`NodeId`], so the graph itself is only read.
//!
//! Open-set ties on `f` are broken by insertion order: the entry pushed
//! first is expanded first.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::world::{NodeId, TileGraph};

/// Result of pathfinding
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathResult {
    /// Tiles from start to goal inclusive, empty when unreachable
    pub nodes: Vec<NodeId>,
    /// Sum of edge costs along `nodes`
    pub cost: f32,
}

impl PathResult {
    /// Check if no path was found
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// A* open-set entry
#[derive(Debug, Clone)]
struct OpenEntry {
    node: NodeId,
    g_cost: f32,
    f_cost: f32,
    seq: u64,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse for min-heap, then earliest insertion first
        other
            .f_cost
            .partial_cmp(&self.f_cost)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn manhattan(graph: &TileGraph, a: NodeId, b: NodeId) -> f32 {
    let (a, b) = (graph.node(a), graph.node(b));
    ((a.x() - b.x()).abs() + (a.z() - b.z()).abs()) as f32
}

/// Largest factor that keeps `scale * manhattan` below the true cost.
///
/// On a uniform grid this is the cheapest edge cost; edges that span more
/// than one tile lower it further.
fn heuristic_scale(graph: &TileGraph) -> f32 {
    graph
        .nodes()
        .flat_map(|n| {
            n.edges().iter().map(move |e| {
                let span = ((n.x() - e.target_x).abs() + (n.z() - e.target_z).abs()).max(1);
                e.cost / span as f32
            })
        })
        .reduce(f32::min)
        .unwrap_or(1.0)
        .max(0.0)
}

/// Find the cheapest path from `start` to `end`.
///
/// Returns an empty [`PathResult`] when `end` cannot be reached.
#[must_use]
pub fn find_path(graph: &TileGraph, start: NodeId, end: NodeId) -> PathResult {
    let scale = heuristic_scale(graph);
    let heuristic = |node: NodeId| manhattan(graph, node, end) * scale;

    let mut open_set = BinaryHeap::new();
    let mut closed_set: FxHashSet<NodeId> = FxHashSet::default();
    let mut came_from: FxHashMap<NodeId, NodeId> = FxHashMap::default();
    let mut g_score: FxHashMap<NodeId, f32> = FxHashMap::default();
    let mut seq = 0u64;

    g_score.insert(start, 0.0);
    open_set.push(OpenEntry {
        node: start,
        g_cost: 0.0,
        f_cost: heuristic(start),
        seq,
    });

    while let Some(current) = open_set.pop() {
        // Stale entry superseded by a cheaper relaxation
        if closed_set.contains(&current.node) {
            continue;
        }

        if current.node == end {
            let nodes = backtrack(&came_from, start, end);
            log::trace!(
                "A* found {} tile path (cost {}) after closing {} tiles",
                nodes.len(),
                current.g_cost,
                closed_set.len()
            );
            return PathResult {
                nodes,
                cost: current.g_cost,
            };
        }

        closed_set.insert(current.node);

        for edge in graph.edges(current.node) {
            if closed_set.contains(&edge.target) {
                continue;
            }

            let tentative_g = current.g_cost + edge.cost;
            if tentative_g < *g_score.get(&edge.target).unwrap_or(&f32::MAX) {
                came_from.insert(edge.target, current.node);
                g_score.insert(edge.target, tentative_g);

                seq += 1;
                open_set.push(OpenEntry {
                    node: edge.target,
                    g_cost: tentative_g,
                    f_cost: tentative_g + heuristic(edge.target),
                    seq,
                });
            }
        }
    }

    log::trace!("A* found no path from {start:?} to {end:?}");
    PathResult::default()
}

/// Walk parent links back from `end` and reverse.
fn backtrack(came_from: &FxHashMap<NodeId, NodeId>, start: NodeId, end: NodeId) -> Vec<NodeId> {
    let mut path = vec![end];
    let mut current = end;

    while current != start {
        match came_from.get(&current) {
            Some(&prev) => {
                path.push(prev);
                current = prev;
            }
            None => break,
        }
    }

    path.reverse();
    path
}

/// Total edge cost along a node sequence, `None` if two consecutive nodes
/// are not linked.
#[must_use]
pub fn path_cost(graph: &TileGraph, nodes: &[NodeId]) -> Option<f32> {
    nodes.windows(2).try_fold(0.0, |total, pair| {
        graph
            .edges(pair[0])
            .iter()
            .find(|e| e.target == pair[1])
            .map(|e| total + e.cost)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{MazeGenerator, TileType};
    use proptest::prelude::*;

    #[test]
    fn test_direct_path() {
        let graph = TileGraph::fully_connected(10, 10);
        let start = graph.id_at(0, 0).unwrap();
        let end = graph.id_at(3, 0).unwrap();

        let path = find_path(&graph, start, end);

        assert_eq!(path.nodes.len(), 4);
        assert!((path.cost - 3.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_path_around_wall() {
        let mut graph = TileGraph::fully_connected(10, 10);
        for z in 2..8 {
            graph.set_tile_type(graph.id_at(5, z).unwrap(), TileType::Obstacle);
        }

        let start = graph.id_at(2, 5).unwrap();
        let end = graph.id_at(8, 5).unwrap();
        let path = find_path(&graph, start, end);

        assert!(!path.is_empty());
        assert!(path.nodes.len() > 7);
        assert!(path.nodes.iter().all(|&n| graph.node(n).is_walkable()));
    }

    #[test]
    fn test_no_path() {
        let mut graph = TileGraph::fully_connected(5, 5);
        let goal = graph.id_at(3, 3).unwrap();
        for (x, z) in [(3, 2), (3, 4), (2, 3), (4, 3)] {
            graph.set_tile_type(graph.id_at(x, z).unwrap(), TileType::Obstacle);
        }

        let path = find_path(&graph, graph.id_at(0, 0).unwrap(), goal);
        assert!(path.is_empty());
    }

    #[test]
    fn test_start_equals_end() {
        let graph = TileGraph::fully_connected(3, 3);
        let node = graph.id_at(1, 1).unwrap();

        let path = find_path(&graph, node, node);
        assert_eq!(path.nodes, vec![node]);
        assert!(path.cost.abs() < f32::EPSILON);
    }

    #[test]
    fn test_prefers_cheaper_detour() {
        // 0 -(10)- 1, and 0 -(1)- 2 -(1)- 1 via a long edge
        let mut graph = TileGraph::new(3, 1);
        let a = graph.id_at(0, 0).unwrap();
        let b = graph.id_at(1, 0).unwrap();
        let c = graph.id_at(2, 0).unwrap();
        graph.connect(a, b, 10.0);
        graph.connect(a, c, 1.0);
        graph.connect(c, b, 1.0);

        let path = find_path(&graph, a, b);
        assert_eq!(path.nodes, vec![a, c, b]);
        assert!((path.cost - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_every_pair_in_maze() {
        let mut graph = TileGraph::new(6, 6);
        MazeGenerator::new(&mut graph).generate(&mut fastrand::Rng::with_seed(8));

        let ids: Vec<NodeId> = graph.nodes().map(|n| n.id()).collect();
        for &start in &ids {
            for &end in &ids {
                let path = find_path(&graph, start, end);
                assert_eq!(path.nodes.first(), Some(&start));
                assert_eq!(path.nodes.last(), Some(&end));
                assert!(path_cost(&graph, &path.nodes).is_some());
            }
        }
    }

    #[test]
    fn test_tie_break_is_deterministic() {
        let graph = TileGraph::fully_connected(4, 4);
        let start = graph.id_at(0, 0).unwrap();
        let end = graph.id_at(3, 3).unwrap();

        let first = find_path(&graph, start, end);
        for _ in 0..10 {
            assert_eq!(find_path(&graph, start, end), first);
        }
    }

    fn brute_force(
        graph: &TileGraph,
        current: NodeId,
        end: NodeId,
        visited: &mut Vec<NodeId>,
        cost: f32,
        best: &mut Option<f32>,
    ) {
        if current == end {
            *best = Some(best.map_or(cost, |b| b.min(cost)));
            return;
        }
        for edge in graph.edges(current) {
            if visited.contains(&edge.target) {
                continue;
            }
            visited.push(edge.target);
            brute_force(graph, edge.target, end, visited, cost + edge.cost, best);
            visited.pop();
        }
    }

    proptest! {
        #[test]
        fn prop_astar_matches_brute_force(
            links in proptest::collection::vec((any::<bool>(), 1u8..6), 12),
            start in 0usize..9,
            end in 0usize..9,
        ) {
            // 3x3 grid, 12 possible cardinal links with random presence and cost
            let mut graph = TileGraph::new(3, 3);
            let mut pairs = Vec::new();
            for z in 0..3 {
                for x in 0..3 {
                    let id = graph.id_at(x, z).unwrap();
                    if let Some(right) = graph.id_at(x + 1, z) {
                        pairs.push((id, right));
                    }
                    if let Some(down) = graph.id_at(x, z + 1) {
                        pairs.push((id, down));
                    }
                }
            }
            for (&(a, b), &(present, cost)) in pairs.iter().zip(links.iter()) {
                if present {
                    graph.connect(a, b, f32::from(cost));
                }
            }

            let ids: Vec<NodeId> = graph.nodes().map(|n| n.id()).collect();
            let (start, end) = (ids[start], ids[end]);

            let mut best = None;
            brute_force(&graph, start, end, &mut vec![start], 0.0, &mut best);
            let path = find_path(&graph, start, end);

            match best {
                None => prop_assert!(path.is_empty()),
                Some(best) => {
                    prop_assert_eq!(path.nodes.first(), Some(&start));
                    prop_assert_eq!(path.nodes.last(), Some(&end));
                    let cost = path_cost(&graph, &path.nodes).unwrap();
                    prop_assert!((cost - best).abs() < 1e-4);
                    prop_assert!((path.cost - best).abs() < 1e-4);
                }
            }
        }
    }
}
