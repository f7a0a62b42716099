//! Simulation configuration
//!
//! Every tunable constant of the game lives here. Configs can be built in
//! code with the `with_*` builders or loaded from RON / JSON files.

use std::fs;
use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// How NPCs route toward a pursued target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NavigationMode {
    /// Follow A* waypoints
    #[default]
    Path,
    /// Steer along a flow field toward the target's tile
    Flow,
}

/// World layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// World position of the grid's minimum corner
    pub origin: Vec3,
    /// World extent along x
    pub width: f32,
    /// World extent along z
    pub depth: f32,
    /// Edge length of one square tile
    pub tile_size: f32,
    /// Fixed seed for maze carving (random when `None`)
    pub seed: Option<u64>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            origin: Vec3::new(-50.0, 0.0, -35.0),
            width: 60.0,
            depth: 60.0,
            tile_size: 5.0,
            seed: None,
        }
    }
}

impl MapConfig {
    /// Number of tile columns
    #[must_use]
    pub fn cols(&self) -> usize {
        (self.width / self.tile_size).floor().max(0.0) as usize
    }

    /// Number of tile rows
    #[must_use]
    pub fn rows(&self) -> usize {
        (self.depth / self.tile_size).floor().max(0.0) as usize
    }
}

/// Kinematic limits shared by every character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterConfig {
    pub top_speed: f32,
    pub mass: f32,
    pub max_force: f32,
    /// Bounding extent used for wall containment
    pub size: f32,
    pub friction: f32,
}

impl Default for CharacterConfig {
    fn default() -> Self {
        Self {
            top_speed: 15.0,
            mass: 1.0,
            max_force: 15.0,
            size: 3.0,
            friction: 0.0,
        }
    }
}

/// Player tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub lives: u32,
    /// Magnitude of the force applied while input is held
    pub move_force: f32,
    pub friction: f32,
    pub size: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            lives: 3,
            move_force: 50.0,
            friction: 20.0,
            size: 3.5,
        }
    }
}

/// NPC behavior thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NpcConfig {
    pub count: usize,
    /// Wander switches to Pursue inside this distance
    pub pursuit_threshold: f32,
    /// Pursue recomputes its path once the target moved this far
    pub movement_threshold: f32,
    /// Pursue blends in direct pursuit inside this distance
    pub close_range: f32,
    /// Encounters resolve inside this distance
    pub contact_threshold: f32,
    /// Seconds before Flee times out back to Wander
    pub flee_duration: f32,
    /// Prediction horizon for direct pursuit
    pub pursue_lookahead: f32,
    pub navigation: NavigationMode,
}

impl Default for NpcConfig {
    fn default() -> Self {
        Self {
            count: 2,
            pursuit_threshold: 30.0,
            movement_threshold: 20.0,
            close_range: 5.0,
            contact_threshold: 3.0,
            flee_duration: 8.0,
            pursue_lookahead: 0.1,
            navigation: NavigationMode::Path,
        }
    }
}

/// Wander circle parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WanderConfig {
    /// Distance of the circle ahead of the agent
    pub distance: f32,
    pub radius: f32,
    /// Largest heading change per tick, radians
    pub max_turn: f32,
}

impl Default for WanderConfig {
    fn default() -> Self {
        Self {
            distance: 10.0,
            radius: 10.0,
            max_turn: 0.3,
        }
    }
}

/// Round rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Seconds until the round is lost on time
    pub time_limit: f32,
    pub score_target: u32,
    pub coin_interval: f32,
    pub max_coins: usize,
    pub power_up_interval: f32,
    /// Player collects pickups inside this distance
    pub pickup_radius: f32,
    pub pickup_friction: f32,
    /// Body size used for wall containment
    pub pickup_size: f32,
    pub power_up_lives: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            time_limit: 120.0,
            score_target: 5,
            coin_interval: 3.0,
            max_coins: 4,
            power_up_interval: 25.0,
            pickup_radius: 2.0,
            pickup_friction: 20.0,
            pickup_size: 0.75,
            power_up_lives: 1,
        }
    }
}

/// Complete simulation configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub map: MapConfig,
    pub character: CharacterConfig,
    pub player: PlayerConfig,
    pub npc: NpcConfig,
    pub wander: WanderConfig,
    pub game: GameConfig,
}

impl SimConfig {
    /// Set the maze seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.map.seed = Some(seed);
        self
    }

    /// Set the world extent and tile size
    pub fn with_map_size(mut self, width: f32, depth: f32, tile_size: f32) -> Self {
        self.map.width = width;
        self.map.depth = depth;
        self.map.tile_size = tile_size;
        self
    }

    /// Set the number of NPCs
    pub fn with_npc_count(mut self, count: usize) -> Self {
        self.npc.count = count;
        self
    }

    /// Set how NPCs navigate while pursuing
    pub fn with_navigation(mut self, mode: NavigationMode) -> Self {
        self.npc.navigation = mode;
        self
    }

    /// Set the round time limit in seconds
    pub fn with_time_limit(mut self, seconds: f32) -> Self {
        self.game.time_limit = seconds;
        self
    }

    /// Check the values that would break the simulation
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.map.tile_size <= 0.0 {
            return Err(ConfigError::Invalid("map.tile_size must be positive".into()));
        }
        if self.map.cols() == 0 || self.map.rows() == 0 {
            return Err(ConfigError::Invalid(
                "map must be at least one tile wide and deep".into(),
            ));
        }
        if self.character.mass <= 0.0 {
            return Err(ConfigError::Invalid("character.mass must be positive".into()));
        }
        if self.character.top_speed <= 0.0 || self.character.max_force <= 0.0 {
            return Err(ConfigError::Invalid(
                "character.top_speed and character.max_force must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Save the config to a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_ron(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let ron_string = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;
        fs::write(path, ron_string).map_err(|e| ConfigError::Io(e.to_string()))?;
        Ok(())
    }

    /// Load and validate a config from a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        let config: SimConfig =
            ron::from_str(&content).map_err(|e| ConfigError::Deserialize(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        let config: SimConfig = serde_json::from_str(&content)
            .map_err(|e| ConfigError::Deserialize(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config, picking the format from the file extension
    ///
    /// # Errors
    ///
    /// Same as [`SimConfig::load_ron`] / [`SimConfig::load_json`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::load_json(path),
            _ => Self::load_ron(path),
        }
    }
}

/// Errors that can occur while loading or saving a config
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// IO error
    Io(String),
    /// Serialization error
    Serialize(String),
    /// Deserialization error
    Deserialize(String),
    /// A value is out of range
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {e}"),
            Self::Serialize(e) => write!(f, "Serialization error: {e}"),
            Self::Deserialize(e) => write!(f, "Deserialization error: {e}"),
            Self::Invalid(e) => write!(f, "Invalid config: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}
