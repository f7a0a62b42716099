//! Core module
//!
//! Configuration and the event queue shared by every system.

mod config;
mod events;

pub use config::{
    CharacterConfig, ConfigError, GameConfig, MapConfig, NavigationMode, NpcConfig, PlayerConfig,
    SimConfig, WanderConfig,
};
pub use events::{AgentId, EventQueue, GameEvent};
