//! Input handling module
//!
//! Controllers translate raw input into movement intent for the player.

mod controller;

pub use controller::{Controller, KeyboardController, MoveAction, ScriptedController};
