//! Finite State Machine for AI Behavior
//!
//! A state set is a closed enum implementing [`State`]; the machine holds
//! exactly one value of it. Transitions are exclusive and synchronous: the
//! old state's `exit` runs, the new value replaces it and its `enter` runs
//! before anything else can call `update` on it.
//!
//! # Example
//!
//! ```ignore
//! #[derive(Debug)]
//! enum Light { Green, Red { timer: f32 } }
//!
//! impl State<Crossing> for Light {
//!     fn name(&self) -> &'static str { /* ... */ }
//!
//!     fn update(&mut self, ctx: &mut Crossing) -> Transition<Self> {
//!         match self {
//!             Light::Green if ctx.button_pressed => Transition::To(Light::Red { timer: 0.0 }),
//!             _ => Transition::None,
//!         }
//!     }
//! }
//!
//! let mut fsm = StateMachine::new(Light::Green);
//! fsm.update(&mut crossing);
//! ```

use std::fmt;

// ============================================================================
// State Trait
// ============================================================================

/// A set of states sharing one context type.
///
/// The lifecycle of each state value is:
///
/// 1. `enter()` - Called once when the value becomes the current state
/// 2. `update()` - Called each tick while it is current
/// 3. `exit()` - Called once when it is replaced
pub trait State<Ctx>: fmt::Debug + Sized {
    /// State name for debugging and logging.
    fn name(&self) -> &'static str;

    /// Called when entering this state.
    fn enter(&mut self, _ctx: &mut Ctx) {}

    /// Called each tick while in this state.
    ///
    /// Returns a `Transition` to indicate whether to stay or change states.
    fn update(&mut self, ctx: &mut Ctx) -> Transition<Self>;

    /// Called when exiting this state.
    fn exit(&mut self, _ctx: &mut Ctx) {}
}

// ============================================================================
// Transition
// ============================================================================

/// A state transition decision returned from `State::update()`.
#[derive(Debug)]
pub enum Transition<S> {
    /// Stay in the current state.
    None,
    /// Transition to a new state.
    To(S),
}

// ============================================================================
// State Machine
// ============================================================================

/// Holds the current state and drives its lifecycle.
#[derive(Debug)]
pub struct StateMachine<S> {
    /// Current active state
    current: S,
    /// Whether enter() has been called on current state
    entered: bool,
}

impl<S> StateMachine<S> {
    /// Create a new state machine with an initial state.
    ///
    /// The initial state's `enter()` will be called on the first `update()`.
    pub fn new(initial: S) -> Self {
        Self {
            current: initial,
            entered: false,
        }
    }

    /// Update the state machine.
    ///
    /// Calls `enter()` on first update, then `update()`. A returned
    /// transition is applied immediately.
    pub fn update<Ctx>(&mut self, ctx: &mut Ctx)
    where
        S: State<Ctx>,
    {
        if !self.entered {
            self.current.enter(ctx);
            self.entered = true;
        }

        if let Transition::To(new_state) = self.current.update(ctx) {
            self.switch_state(ctx, new_state);
        }
    }

    /// Replace the current state right away.
    ///
    /// Exits the current state (if it was entered) and enters the new one.
    pub fn switch_state<Ctx>(&mut self, ctx: &mut Ctx, new_state: S)
    where
        S: State<Ctx>,
    {
        if self.entered {
            self.current.exit(ctx);
        }

        log::debug!(
            "State transition: {} -> {}",
            self.current.name(),
            new_state.name()
        );

        self.current = new_state;
        self.current.enter(ctx);
        self.entered = true;
    }

    /// The current state
    #[must_use]
    pub fn current(&self) -> &S {
        &self.current
    }

    /// Whether the current state has been entered
    #[must_use]
    pub fn is_entered(&self) -> bool {
        self.entered
    }

    /// Get the name of the current state.
    #[must_use]
    pub fn current_state_name<Ctx>(&self) -> &'static str
    where
        S: State<Ctx>,
    {
        self.current.name()
    }
}

// ============================================================================
// Tests
// ============================================================================
