//! Movement controllers
//!
//! The player state machine polls a [`Controller`] once per tick. Where the
//! input comes from (keyboard, replay script, tests) is up to the
//! implementation.

use glam::Vec3;
use rustc_hash::FxHashSet;

/// Source of movement intent
pub trait Controller {
    /// Whether any movement input is active
    fn moving(&self) -> bool;

    /// Requested direction on the ground plane (not necessarily unit length)
    fn direction(&self) -> Vec3;
}

/// Logical movement actions, independent of the physical keys bound to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveAction {
    /// Toward -z
    Forward,
    /// Toward +z
    Backward,
    /// Toward -x
    Left,
    /// Toward +x
    Right,
}

impl MoveAction {
    /// Unit vector for this action
    #[must_use]
    pub fn vector(self) -> Vec3 {
        match self {
            MoveAction::Forward => Vec3::NEG_Z,
            MoveAction::Backward => Vec3::Z,
            MoveAction::Left => Vec3::NEG_X,
            MoveAction::Right => Vec3::X,
        }
    }
}

/// Held-action tracker fed by key events
#[derive(Debug, Default)]
pub struct KeyboardController {
    /// Currently held actions
    held: FxHashSet<MoveAction>,
}

impl KeyboardController {
    /// Create a controller with nothing held
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a press (`true`) or release (`false`) of an action
    pub fn process(&mut self, action: MoveAction, pressed: bool) {
        if pressed {
            self.held.insert(action);
        } else {
            self.held.remove(&action);
        }
    }

    /// Check if an action is currently held
    #[must_use]
    pub fn is_held(&self, action: MoveAction) -> bool {
        self.held.contains(&action)
    }

    /// Release everything
    pub fn clear(&mut self) {
        self.held.clear();
    }
}

impl Controller for KeyboardController {
    fn moving(&self) -> bool {
        self.direction() != Vec3::ZERO
    }

    fn direction(&self) -> Vec3 {
        self.held.iter().map(|a| a.vector()).sum()
    }
}

/// Replays a fixed list of `(seconds, direction)` steps.
///
/// A zero direction means "no input" for that step. After the last step
/// the controller stays idle.
#[derive(Debug, Clone, Default)]
pub struct ScriptedController {
    steps: Vec<(f32, Vec3)>,
    elapsed: f32,
}

impl ScriptedController {
    /// Create a controller from its steps
    #[must_use]
    pub fn new(steps: Vec<(f32, Vec3)>) -> Self {
        Self { steps, elapsed: 0.0 }
    }

    /// Hold one direction forever
    #[must_use]
    pub fn constant(direction: Vec3) -> Self {
        Self::new(vec![(f32::INFINITY, direction)])
    }

    /// Move the script forward in time
    pub fn advance(&mut self, dt: f32) {
        self.elapsed += dt;
    }

    fn current(&self) -> Vec3 {
        let mut start = 0.0;
        for &(duration, direction) in &self.steps {
            if self.elapsed < start + duration {
                return direction;
            }
            start += duration;
        }
        Vec3::ZERO
    }
}

impl Controller for ScriptedController {
    fn moving(&self) -> bool {
        self.current() != Vec3::ZERO
    }

    fn direction(&self) -> Vec3 {
        self.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyboard_combines_actions() {
        let mut keys = KeyboardController::new();
        assert!(!keys.moving());

        keys.process(MoveAction::Forward, true);
        keys.process(MoveAction::Right, true);
        assert!(keys.moving());
        assert_eq!(keys.direction(), Vec3::new(1.0, 0.0, -1.0));

        keys.process(MoveAction::Forward, false);
        assert!(!keys.is_held(MoveAction::Forward));
        assert_eq!(keys.direction(), Vec3::X);
    }

    #[test]
    fn test_opposite_actions_cancel() {
        let mut keys = KeyboardController::new();
        keys.process(MoveAction::Left, true);
        keys.process(MoveAction::Right, true);
        assert!(!keys.moving());

        keys.clear();
        assert!(!keys.is_held(MoveAction::Left));
    }

    #[test]
    fn test_script_steps() {
        let mut script =
            ScriptedController::new(vec![(1.0, Vec3::X), (0.5, Vec3::ZERO), (1.0, Vec3::Z)]);
        assert_eq!(script.direction(), Vec3::X);

        script.advance(1.2);
        assert!(!script.moving());

        script.advance(0.5);
        assert_eq!(script.direction(), Vec3::Z);

        script.advance(5.0);
        assert!(!script.moving());
    }
}
