//! Event Queue System for Decoupled Communication
//!
//! The simulation core never talks to the renderer or the score/lives display
//! directly. It pushes [`GameEvent`]s into a double-buffered queue instead:
//! events written during tick N become readable after the `swap()` at the
//! start of tick N+1.
//!
//! # Example
//!
//! ```ignore
//! sim.tick(dt, &controller);
//!
//! // In the renderer / HUD
//! for event in sim.events().iter() {
//!     match event {
//!         GameEvent::PathChanged { nodes, .. } => draw_markers(nodes),
//!         GameEvent::LifeLost { lives } => hud.set_lives(*lives),
//!         _ => {}
//!     }
//! }
//! ```

use crate::game::{Outcome, PickupKind};
use crate::world::{NodeId, TileType};

/// Who an event is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentId {
    /// The player character
    Player,
    /// An NPC, by spawn index
    Npc(usize),
}

// ============================================================================
// Event Types
// ============================================================================

/// Events flowing from the simulation core to presentation layers.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum GameEvent {
    // -------------------------------------------------------------------------
    // Renderer
    // -------------------------------------------------------------------------
    /// An agent's path was replaced.
    PathChanged {
        /// Agent that requested the path
        agent: AgentId,
        /// Ordered tiles from start to goal
        nodes: Vec<NodeId>,
    },

    /// A tile must be rebuilt.
    TileTypeChanged {
        /// Changed tile
        node: NodeId,
        /// Its new type
        tile_type: TileType,
    },

    /// A pickup appeared on the map.
    PickupSpawned {
        /// Coin or power-up
        kind: PickupKind,
        /// Tile it spawned on
        node: NodeId,
    },

    // -------------------------------------------------------------------------
    // Score / Lives
    // -------------------------------------------------------------------------
    /// The player lost a life.
    LifeLost {
        /// Lives remaining
        lives: u32,
    },

    /// The player gained a life.
    LifeGained {
        /// Lives remaining
        lives: u32,
    },

    /// The player's score went up.
    ScoreIncremented {
        /// New score value
        score: u32,
    },

    /// The player picked something up.
    PickupCollected {
        /// Coin or power-up
        kind: PickupKind,
    },

    // -------------------------------------------------------------------------
    // Game State
    // -------------------------------------------------------------------------
    /// An agent switched behavior state.
    StateChanged {
        /// Agent that switched
        agent: AgentId,
        /// New state name
        state: &'static str,
    },

    /// A power-up turned the NPCs into prey.
    PowerUpActivated,

    /// The round ended.
    GameOver {
        /// How it ended
        outcome: Outcome,
    },
}

/// Events of the tick being played and of the tick before it.
///
/// Systems [`push`](Self::push) during a tick; observers read the previous
/// tick's events with [`iter`](Self::iter) after [`swap`](Self::swap).
#[derive(Debug, Default)]
pub struct EventQueue {
    written: Vec<GameEvent>,
    published: Vec<GameEvent>,
}

impl EventQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an event for this tick
    pub fn push(&mut self, event: GameEvent) {
        log::trace!("event: {event:?}");
        self.written.push(event);
    }

    /// Publish this tick's events and start an empty tick.
    ///
    /// Whatever was published before is dropped.
    pub fn swap(&mut self) {
        self.published.clear();
        std::mem::swap(&mut self.written, &mut self.published);
    }

    /// Events published by the last [`swap`](Self::swap)
    pub fn iter(&self) -> impl Iterator<Item = &GameEvent> {
        self.published.iter()
    }

    /// Events recorded since the last [`swap`](Self::swap)
    pub fn iter_pending(&self) -> impl Iterator<Item = &GameEvent> {
        self.written.iter()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.published.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.published.len()
    }

    /// Forget both ticks
    pub fn clear(&mut self) {
        self.written.clear();
        self.published.clear();
    }
}
