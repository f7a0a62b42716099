//! AI and navigation module
//!
//! Provides A* pathfinding, flow fields, waypoint paths, steering behaviors
//! and finite state machines.

mod flow_field;
mod fsm;
mod path;
mod pathfinding;
mod steering;

pub use flow_field::FlowField;
pub use fsm::{State, StateMachine, Transition};
pub use path::Path;
pub use pathfinding::{PathResult, find_path, path_cost};
pub use steering::{
    Arrive, Evade, Flee, Pursue, Seek, SteeringAgent, SteeringBehavior, Wander,
};
