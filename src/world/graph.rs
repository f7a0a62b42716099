//! Tile graph
//!
//! A `cols × rows` grid with exactly one [`TileNode`] per integer coordinate.
//! Walkability between neighbouring tiles is expressed purely through edges:
//! two tiles are connected when an [`Edge`] links them, otherwise a wall
//! separates them.
//!
//! Nodes are stored in an arena (`Vec<TileNode>`) and addressed by
//! [`NodeId`], so searches keep their scratch data in external maps instead
//! of on the nodes themselves.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Index of a node inside its owning [`TileGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(usize);

impl NodeId {
    /// Raw arena index
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// What occupies a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TileType {
    /// Plain walkable floor
    #[default]
    Ground,
    /// Impassable; the node keeps no edges
    Obstacle,
    /// Walkable floor flagged for the renderer (capture sites)
    Marked,
}

impl TileType {
    /// Whether agents may stand on this tile
    #[must_use]
    pub fn is_walkable(self) -> bool {
        !matches!(self, TileType::Obstacle)
    }
}

/// A walkable connection to a neighbouring tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    /// Node this edge leads to
    pub target: NodeId,
    /// Grid x of the target
    pub target_x: i32,
    /// Grid z of the target
    pub target_z: i32,
    /// Traversal cost
    pub cost: f32,
}

/// A single grid cell.
#[derive(Debug, Clone)]
pub struct TileNode {
    id: NodeId,
    x: i32,
    z: i32,
    tile_type: TileType,
    edges: SmallVec<[Edge; 4]>,
}

impl TileNode {
    /// Arena id of this node
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Grid column
    #[must_use]
    pub fn x(&self) -> i32 {
        self.x
    }

    /// Grid row
    #[must_use]
    pub fn z(&self) -> i32 {
        self.z
    }

    /// Current tile type
    #[must_use]
    pub fn tile_type(&self) -> TileType {
        self.tile_type
    }

    /// Outgoing edges
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Check whether a walkable connection exists to the tile at `(x, z)`.
    #[must_use]
    pub fn has_edge_to(&self, x: i32, z: i32) -> bool {
        self.edges.iter().any(|e| e.target_x == x && e.target_z == z)
    }

    /// Check whether a walkable connection exists to `target`.
    #[must_use]
    pub fn has_edge_to_node(&self, target: NodeId) -> bool {
        self.edges.iter().any(|e| e.target == target)
    }

    /// Whether agents may stand here
    #[must_use]
    pub fn is_walkable(&self) -> bool {
        self.tile_type.is_walkable()
    }
}

/// Offsets of the four cardinal neighbours
const CARDINALS: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// 2D grid of tile nodes and the edges between them.
#[derive(Debug, Clone)]
pub struct TileGraph {
    cols: usize,
    rows: usize,
    nodes: Vec<TileNode>,
}

impl TileGraph {
    /// Create a grid of ground tiles with no edges at all.
    #[must_use]
    pub fn new(cols: usize, rows: usize) -> Self {
        let mut nodes = Vec::with_capacity(cols * rows);
        for z in 0..rows {
            for x in 0..cols {
                nodes.push(TileNode {
                    id: NodeId(nodes.len()),
                    x: x as i32,
                    z: z as i32,
                    tile_type: TileType::Ground,
                    edges: SmallVec::new(),
                });
            }
        }
        Self { cols, rows, nodes }
    }

    /// Create a grid where every tile is linked to all four neighbours.
    #[must_use]
    pub fn fully_connected(cols: usize, rows: usize) -> Self {
        let mut graph = Self::new(cols, rows);
        graph.init_edges();
        graph
    }

    /// Reset adjacency to the full 4-connected grid (unit cost) between
    /// walkable tiles.
    pub fn init_edges(&mut self) {
        self.clear_edges();
        for index in 0..self.nodes.len() {
            let id = NodeId(index);
            if !self.nodes[index].is_walkable() {
                continue;
            }
            for neighbor in self.cardinal_neighbors(id) {
                if self.nodes[neighbor.0].is_walkable() {
                    self.add_edge(id, neighbor, 1.0);
                }
            }
        }
    }

    /// Number of columns
    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of rows
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Total node count
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the grid has no nodes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Id of the node at `(x, z)`, or `None` when out of bounds.
    #[must_use]
    pub fn id_at(&self, x: i32, z: i32) -> Option<NodeId> {
        if x < 0 || z < 0 || x as usize >= self.cols || z as usize >= self.rows {
            return None;
        }
        Some(NodeId(z as usize * self.cols + x as usize))
    }

    /// Node at `(x, z)`, or `None` when out of bounds.
    #[must_use]
    pub fn get_node(&self, x: i32, z: i32) -> Option<&TileNode> {
        self.id_at(x, z).map(|id| &self.nodes[id.0])
    }

    /// Node by id.
    ///
    /// Ids are only handed out by this graph, so an id from another graph of
    /// a different size may panic.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &TileNode {
        &self.nodes[id.0]
    }

    /// Iterate over every node in row-major order
    pub fn nodes(&self) -> impl Iterator<Item = &TileNode> {
        self.nodes.iter()
    }

    /// Outgoing edges of a node
    #[must_use]
    pub fn edges(&self, id: NodeId) -> &[Edge] {
        &self.nodes[id.0].edges
    }

    /// In-bounds cardinal neighbours of a node, regardless of edges.
    #[must_use]
    pub fn cardinal_neighbors(&self, id: NodeId) -> SmallVec<[NodeId; 4]> {
        let node = &self.nodes[id.0];
        CARDINALS
            .iter()
            .filter_map(|&(dx, dz)| self.id_at(node.x + dx, node.z + dz))
            .collect()
    }

    /// Add a directed edge. Duplicate edges are ignored.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, cost: f32) {
        let (target_x, target_z) = (self.nodes[to.0].x, self.nodes[to.0].z);
        let node = &mut self.nodes[from.0];
        if node.has_edge_to_node(to) {
            return;
        }
        node.edges.push(Edge {
            target: to,
            target_x,
            target_z,
            cost,
        });
    }

    /// Link two nodes in both directions.
    pub fn connect(&mut self, a: NodeId, b: NodeId, cost: f32) {
        self.add_edge(a, b, cost);
        self.add_edge(b, a, cost);
    }

    /// Remove the edges between two nodes in both directions.
    pub fn disconnect(&mut self, a: NodeId, b: NodeId) {
        self.nodes[a.0].edges.retain(|e| e.target != b);
        self.nodes[b.0].edges.retain(|e| e.target != a);
    }

    /// Remove every edge in the graph
    pub fn clear_edges(&mut self) {
        for node in &mut self.nodes {
            node.edges.clear();
        }
    }

    /// Number of undirected connections (directed edges / 2).
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.edges.len()).sum::<usize>() / 2
    }

    /// Change a tile's type, updating its connectivity.
    ///
    /// Turning a tile into an obstacle drops every edge touching it.
    /// Turning an obstacle back into floor reconnects it to each walkable
    /// cardinal neighbour at unit cost. Returns `true` if the type changed.
    pub fn set_tile_type(&mut self, id: NodeId, tile_type: TileType) -> bool {
        let previous = self.nodes[id.0].tile_type;
        if previous == tile_type {
            return false;
        }
        self.nodes[id.0].tile_type = tile_type;

        if !tile_type.is_walkable() {
            for neighbor in self.cardinal_neighbors(id) {
                self.disconnect(id, neighbor);
            }
        } else if !previous.is_walkable() {
            for neighbor in self.cardinal_neighbors(id) {
                if self.nodes[neighbor.0].is_walkable() {
                    self.connect(id, neighbor, 1.0);
                }
            }
        }
        true
    }

    /// Pick a uniformly random walkable tile that has at least one edge.
    ///
    /// A single-tile grid has no edges, so its only walkable tile qualifies.
    pub fn random_empty_tile(&self, rng: &mut fastrand::Rng) -> Option<NodeId> {
        let candidates: Vec<NodeId> = self
            .nodes
            .iter()
            .filter(|n| n.is_walkable() && (!n.edges.is_empty() || self.nodes.len() == 1))
            .map(|n| n.id)
            .collect();

        if candidates.is_empty() {
            return None;
        }
        Some(candidates[rng.usize(..candidates.len())])
    }
}
