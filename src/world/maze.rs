//! Randomized depth-first maze carving
//!
//! Starting from the full 4-connected grid, a backtracking walk picks an
//! unvisited neighbour at random, carves the passage to it and recurses.
//! Only carved passages survive, so the result is a perfect maze: a
//! spanning tree over every walkable tile with exactly `n - 1` connections.

use rustc_hash::FxHashSet;

use super::graph::{NodeId, TileGraph};

/// Carves a spanning-tree maze into a [`TileGraph`].
#[derive(Debug)]
pub struct MazeGenerator<'a> {
    graph: &'a mut TileGraph,
}

impl<'a> MazeGenerator<'a> {
    /// Wrap a graph for carving
    pub fn new(graph: &'a mut TileGraph) -> Self {
        Self { graph }
    }

    /// Carve the maze, starting from a random walkable tile.
    ///
    /// Returns the number of passages carved.
    pub fn generate(&mut self, rng: &mut fastrand::Rng) -> usize {
        self.graph.init_edges();

        let walkable: Vec<NodeId> = self
            .graph
            .nodes()
            .filter(|n| n.is_walkable())
            .map(|n| n.id())
            .collect();
        let Some(&start) = walkable.get(rng.usize(..walkable.len().max(1))) else {
            return 0;
        };

        // The full adjacency is what the walk may explore; passages are
        // what it actually keeps.
        let adjacency: Vec<Vec<NodeId>> = self
            .graph
            .nodes()
            .map(|n| n.edges().iter().map(|e| e.target).collect())
            .collect();

        let mut passages = Vec::with_capacity(walkable.len());
        let mut visited = FxHashSet::default();
        let mut stack = vec![start];
        visited.insert(start);

        while let Some(&current) = stack.last() {
            let unvisited: Vec<NodeId> = adjacency[current.index()]
                .iter()
                .copied()
                .filter(|n| !visited.contains(n))
                .collect();

            if unvisited.is_empty() {
                stack.pop();
                continue;
            }

            let next = unvisited[rng.usize(..unvisited.len())];
            visited.insert(next);
            passages.push((current, next));
            stack.push(next);
        }

        self.graph.clear_edges();
        for &(a, b) in &passages {
            self.graph.connect(a, b, 1.0);
        }

        log::debug!(
            "Carved maze: {} passages over {} walkable tiles",
            passages.len(),
            walkable.len()
        );
        passages.len()
    }
}
