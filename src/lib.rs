//! Navigation and AI core for a tile-maze chase game
//!
//! This crate provides:
//! - Tile graphs, maze carving and world-space mapping
//! - A* pathfinding and flow fields
//! - Steering behaviors and finite state machines
//! - Player and NPC behavior with pickups and round logic

pub mod ai;
pub mod core;
pub mod game;
pub mod input;
pub mod world;

// Re-exports for convenience
pub use glam;
pub use hecs;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::ai::{FlowField, Path, PathResult, StateMachine, SteeringAgent, find_path};
    pub use crate::core::{AgentId, ConfigError, EventQueue, GameEvent, NavigationMode, SimConfig};
    pub use crate::game::{Npc, NpcState, Outcome, PickupKind, Player, PlayerState, Simulation};
    pub use crate::input::{Controller, KeyboardController, MoveAction, ScriptedController};
    pub use crate::world::{GameMap, NodeId, TileGraph, TileType};
    pub use glam::Vec3;
}
