//! Game map: the tile graph placed in world space
//!
//! Converts between continuous world positions and tiles, and is the single
//! entry point the characters use for pathfinding, flow fields and tile
//! changes. Anything the renderer needs to know about is pushed into the
//! event queue.

use glam::Vec3;

use crate::ai::{FlowField, PathResult, find_path};
use crate::core::{AgentId, EventQueue, GameEvent, MapConfig};

use super::graph::{NodeId, TileGraph, TileNode, TileType};
use super::maze::MazeGenerator;

/// The maze in world space.
#[derive(Debug, Clone)]
pub struct GameMap {
    origin: Vec3,
    tile_size: f32,
    graph: TileGraph,
    goals: Vec<NodeId>,
    flow_field: FlowField,
}

impl GameMap {
    /// Wrap an existing graph
    #[must_use]
    pub fn new(graph: TileGraph, origin: Vec3, tile_size: f32) -> Self {
        Self {
            origin,
            tile_size,
            graph,
            goals: Vec::new(),
            flow_field: FlowField::default(),
        }
    }

    /// Build the grid described by `config` and carve a maze into it.
    pub fn generate(config: &MapConfig, rng: &mut fastrand::Rng) -> Self {
        let mut graph = TileGraph::new(config.cols(), config.rows());
        MazeGenerator::new(&mut graph).generate(rng);
        log::info!(
            "Generated {}x{} maze ({} tiles of size {})",
            graph.cols(),
            graph.rows(),
            graph.len(),
            config.tile_size
        );
        Self::new(graph, config.origin, config.tile_size)
    }

    /// World position of the grid's minimum corner
    #[must_use]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Edge length of one tile
    #[must_use]
    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// The underlying graph
    #[must_use]
    pub fn graph(&self) -> &TileGraph {
        &self.graph
    }

    /// Shorthand for `graph().node(id)`
    #[must_use]
    pub fn node(&self, id: NodeId) -> &TileNode {
        self.graph.node(id)
    }

    /// Tile containing a world position, `None` outside the grid.
    #[must_use]
    pub fn quantize(&self, location: Vec3) -> Option<NodeId> {
        let x = ((location.x - self.origin.x) / self.tile_size).floor();
        let z = ((location.z - self.origin.z) / self.tile_size).floor();
        if !x.is_finite() || !z.is_finite() {
            return None;
        }
        self.graph.id_at(x as i32, z as i32)
    }

    /// World position of a tile's centre.
    ///
    /// `y` sits one tile size above the origin plane.
    #[must_use]
    pub fn localize(&self, id: NodeId) -> Vec3 {
        let node = self.graph.node(id);
        Vec3::new(
            self.origin.x + node.x() as f32 * self.tile_size + self.tile_size * 0.5,
            self.tile_size,
            self.origin.z + node.z() as f32 * self.tile_size + self.tile_size * 0.5,
        )
    }

    /// Shortest path between two tiles
    #[must_use]
    pub fn astar(&self, start: NodeId, end: NodeId) -> PathResult {
        find_path(&self.graph, start, end)
    }

    /// Random walkable, connected tile
    pub fn random_empty_tile(&self, rng: &mut fastrand::Rng) -> Option<NodeId> {
        self.graph.random_empty_tile(rng)
    }

    /// Change a tile's type and tell the renderer.
    ///
    /// Connectivity changes invalidate the flow field, so it is rebuilt
    /// toward the current goals.
    pub fn set_tile_type(&mut self, id: NodeId, tile_type: TileType, events: &mut EventQueue) {
        let previous = self.graph.node(id).tile_type();
        if !self.graph.set_tile_type(id, tile_type) {
            return;
        }
        if previous.is_walkable() != tile_type.is_walkable() && !self.goals.is_empty() {
            self.flow_field = FlowField::build(&self.graph, &self.goals);
        }
        events.push(GameEvent::TileTypeChanged {
            node: id,
            tile_type,
        });
    }

    /// Announce a new path so the renderer can draw its markers
    pub fn render_path(&self, agent: AgentId, nodes: &[NodeId], events: &mut EventQueue) {
        events.push(GameEvent::PathChanged {
            agent,
            nodes: nodes.to_vec(),
        });
    }

    /// Current flow-field goals
    #[must_use]
    pub fn goals(&self) -> &[NodeId] {
        &self.goals
    }

    /// The field toward the current goals
    #[must_use]
    pub fn flow_field(&self) -> &FlowField {
        &self.flow_field
    }

    /// Replace the goal set with one tile and rebuild the field
    pub fn setup_single_goal_flow_field(&mut self, goal: NodeId) {
        self.goals.clear();
        self.goals.push(goal);
        self.flow_field = FlowField::build(&self.graph, &self.goals);
    }

    /// Add a goal tile and rebuild the field. No-op if already a goal.
    pub fn add_goal(&mut self, goal: NodeId) {
        if self.goals.contains(&goal) {
            return;
        }
        self.goals.push(goal);
        self.flow_field = FlowField::build(&self.graph, &self.goals);
    }

    /// Drop all goals
    pub fn clear_goals(&mut self) {
        self.goals.clear();
        self.flow_field = FlowField::default();
    }
}
