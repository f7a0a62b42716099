//! The player character

use glam::Vec3;

use crate::ai::{State, StateMachine, SteeringAgent, Transition};
use crate::core::{AgentId, EventQueue, GameEvent, SimConfig};
use crate::input::Controller;
use crate::world::GameMap;

/// Player behavior states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    /// Standing still until input arrives
    Idle,
    /// Pushed along the input direction
    Moving,
}

/// Everything a player state may touch during one tick
pub struct PlayerContext<'a> {
    agent: &'a mut SteeringAgent,
    controller: &'a dyn Controller,
    move_force: f32,
    events: &'a mut EventQueue,
}

impl State<PlayerContext<'_>> for PlayerState {
    fn name(&self) -> &'static str {
        match self {
            PlayerState::Idle => "Idle",
            PlayerState::Moving => "Moving",
        }
    }

    fn enter(&mut self, ctx: &mut PlayerContext<'_>) {
        if *self == PlayerState::Idle {
            ctx.agent.halt();
        }
        ctx.events.push(GameEvent::StateChanged {
            agent: AgentId::Player,
            state: State::<PlayerContext<'_>>::name(self),
        });
    }

    fn update(&mut self, ctx: &mut PlayerContext<'_>) -> Transition<Self> {
        let moving = ctx.controller.moving();
        match self {
            PlayerState::Idle if moving => Transition::To(PlayerState::Moving),
            PlayerState::Idle => Transition::None,
            PlayerState::Moving if !moving => Transition::To(PlayerState::Idle),
            PlayerState::Moving => {
                let force = ctx.controller.direction().normalize_or_zero() * ctx.move_force;
                ctx.agent.apply_force(force);
                Transition::None
            }
        }
    }
}

/// The controllable character, with its lives and score.
#[derive(Debug)]
pub struct Player {
    /// Kinematic body
    pub agent: SteeringAgent,
    lives: u32,
    score: u32,
    move_force: f32,
    machine: StateMachine<PlayerState>,
}

impl Player {
    /// Create a player at `location`
    #[must_use]
    pub fn new(config: &SimConfig, location: Vec3) -> Self {
        let agent = SteeringAgent::new(&config.character)
            .with_friction(config.player.friction)
            .with_size(config.player.size)
            .at(location);
        Self {
            agent,
            lives: config.player.lives,
            score: 0,
            move_force: config.player.move_force,
            machine: StateMachine::new(PlayerState::Idle),
        }
    }

    /// Run the behavior state, then physics and integration
    pub fn update(
        &mut self,
        dt: f32,
        map: &GameMap,
        controller: &dyn Controller,
        events: &mut EventQueue,
    ) {
        let mut ctx = PlayerContext {
            agent: &mut self.agent,
            controller,
            move_force: self.move_force,
            events,
        };
        self.machine.update(&mut ctx);
        self.agent.update(dt, map);
    }

    /// Current behavior state
    #[must_use]
    pub fn state(&self) -> PlayerState {
        *self.machine.current()
    }

    /// World position
    #[must_use]
    pub fn location(&self) -> Vec3 {
        self.agent.location
    }

    /// Lives left
    #[must_use]
    pub fn lives(&self) -> u32 {
        self.lives
    }

    /// Points collected so far
    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Take one life away. Returns `true` when none are left.
    pub fn lose_life(&mut self, events: &mut EventQueue) -> bool {
        self.lives = self.lives.saturating_sub(1);
        log::info!("Player lost a life, {} left", self.lives);
        events.push(GameEvent::LifeLost { lives: self.lives });
        self.lives == 0
    }

    /// Grant one extra life
    pub fn add_life(&mut self, events: &mut EventQueue) {
        self.lives += 1;
        events.push(GameEvent::LifeGained { lives: self.lives });
    }

    /// Add one point
    pub fn add_score(&mut self, events: &mut EventQueue) {
        self.score += 1;
        events.push(GameEvent::ScoreIncremented { score: self.score });
    }

    /// Whether the player still has lives
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.lives > 0
    }

    /// Whether the score has reached `target`
    #[must_use]
    pub fn is_score_reached(&self, target: u32) -> bool {
        self.score >= target
    }

    /// Move to a random empty tile at rest. Stays put if the map has none.
    pub fn relocate(&mut self, map: &GameMap, rng: &mut fastrand::Rng) {
        if let Some(tile) = map.random_empty_tile(rng) {
            self.agent.teleport(map.localize(tile));
        }
    }
}
