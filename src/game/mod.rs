//! Game module
//!
//! The characters, their behavior states, pickups and the round that ties
//! them together.

mod npc;
mod pickups;
mod player;
mod simulation;

pub use npc::{Npc, NpcState, NpcWorld, flow, interactive_flow};
pub use pickups::{PickupKind, Pickups};
pub use player::{Player, PlayerState};
pub use simulation::{Outcome, Simulation};
