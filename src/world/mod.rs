//! World module
//!
//! Tile graph, maze carving and the world-space map facade.

mod graph;
mod map;
mod maze;

pub use graph::{Edge, NodeId, TileGraph, TileNode, TileType};
pub use map::GameMap;
pub use maze::MazeGenerator;
