//! One round of the game
//!
//! [`Simulation`] owns every piece of mutable game state and advances it in
//! a fixed order each tick: pickups and collisions, the player, the NPCs in
//! spawn order, pickup bodies, and finally the game-over check.

use glam::Vec3;

use crate::core::{ConfigError, EventQueue, GameEvent, SimConfig};
use crate::input::Controller;
use crate::world::GameMap;

use super::npc::{Npc, NpcState, NpcWorld};
use super::pickups::{PickupKind, Pickups};
use super::player::Player;

/// How a round ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The player ran out of lives
    Lost,
    /// The player reached the score target
    Won,
    /// The time limit passed first
    TimeUp,
}

/// A running round.
#[derive(Debug)]
pub struct Simulation {
    config: SimConfig,
    map: GameMap,
    player: Player,
    npcs: Vec<Npc>,
    pickups: Pickups,
    rng: fastrand::Rng,
    events: EventQueue,
    elapsed: f32,
    outcome: Option<Outcome>,
}

impl Simulation {
    /// Generate a maze and populate it
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = Self::rng(&config);
        let map = GameMap::generate(&config.map, &mut rng);
        Ok(Self::populate(config, map, rng))
    }

    /// Populate an existing map
    pub fn with_map(config: SimConfig, map: GameMap) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = Self::rng(&config);
        Ok(Self::populate(config, map, rng))
    }

    fn rng(config: &SimConfig) -> fastrand::Rng {
        match config.map.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        }
    }

    fn spawn_point(map: &GameMap, rng: &mut fastrand::Rng) -> Vec3 {
        match map.random_empty_tile(rng) {
            Some(tile) => map.localize(tile),
            None => {
                log::warn!("No empty tile to spawn on, using the map origin");
                map.origin()
            }
        }
    }

    fn populate(config: SimConfig, map: GameMap, mut rng: fastrand::Rng) -> Self {
        let player = Player::new(&config, Self::spawn_point(&map, &mut rng));
        let npcs = (0..config.npc.count)
            .map(|id| Npc::new(id, &config, Self::spawn_point(&map, &mut rng)))
            .collect();

        log::info!(
            "Starting round: {} NPCs, {}s limit, {} points to win",
            config.npc.count,
            config.game.time_limit,
            config.game.score_target
        );

        Self {
            config,
            map,
            player,
            npcs,
            pickups: Pickups::new(),
            rng,
            events: EventQueue::new(),
            elapsed: 0.0,
            outcome: None,
        }
    }

    /// Advance the round by `dt` seconds. Does nothing once it is over,
    /// apart from rotating the event queue.
    pub fn tick(&mut self, dt: f32, controller: &dyn Controller) {
        self.events.swap();
        if self.outcome.is_some() {
            return;
        }
        self.elapsed += dt;

        self.gameplay(dt);

        self.player.update(dt, &self.map, controller, &mut self.events);

        let mut world = NpcWorld {
            map: &mut self.map,
            target: &mut self.player,
            config: &self.config,
            rng: &mut self.rng,
            events: &mut self.events,
        };
        for npc in &mut self.npcs {
            npc.update(dt, &mut world);
        }

        self.pickups.update_bodies(dt, &self.map);

        self.check_game_over();
    }

    /// Spawns and pickup collisions
    fn gameplay(&mut self, dt: f32) {
        self.pickups
            .update_spawns(dt, &self.map, &mut self.rng, &self.config, &mut self.events);

        let taken = self
            .pickups
            .collect(self.player.location(), self.config.game.pickup_radius);
        for kind in taken {
            self.events.push(GameEvent::PickupCollected { kind });
            match kind {
                PickupKind::Coin => self.player.add_score(&mut self.events),
                PickupKind::PowerUp => self.activate_power_up(),
            }
        }
    }

    /// Extra lives for the player, every NPC runs
    fn activate_power_up(&mut self) {
        for _ in 0..self.config.game.power_up_lives {
            self.player.add_life(&mut self.events);
        }
        self.events.push(GameEvent::PowerUpActivated);
        log::info!("Power-up activated");

        let mut world = NpcWorld {
            map: &mut self.map,
            target: &mut self.player,
            config: &self.config,
            rng: &mut self.rng,
            events: &mut self.events,
        };
        for npc in &mut self.npcs {
            npc.switch_state(NpcState::flee(), &mut world);
        }
    }

    fn check_game_over(&mut self) {
        let outcome = if !self.player.is_alive() {
            Outcome::Lost
        } else if self.player.is_score_reached(self.config.game.score_target) {
            Outcome::Won
        } else if self.elapsed >= self.config.game.time_limit {
            Outcome::TimeUp
        } else {
            return;
        };

        log::info!(
            "Round over after {:.1}s: {:?} (score {}, lives {})",
            self.elapsed,
            outcome,
            self.player.score(),
            self.player.lives()
        );
        self.outcome = Some(outcome);
        self.events.push(GameEvent::GameOver { outcome });
    }

    /// Active configuration
    #[must_use]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// The maze
    #[must_use]
    pub fn map(&self) -> &GameMap {
        &self.map
    }

    /// The player
    #[must_use]
    pub fn player(&self) -> &Player {
        &self.player
    }

    /// NPCs in update order
    #[must_use]
    pub fn npcs(&self) -> &[Npc] {
        &self.npcs
    }

    /// Coins and power-ups on the map
    #[must_use]
    pub fn pickups(&self) -> &Pickups {
        &self.pickups
    }

    /// Event queue; `iter()` yields what the last tick produced
    #[must_use]
    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    /// Seconds played
    #[must_use]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Seconds until the time limit
    #[must_use]
    pub fn time_left(&self) -> f32 {
        (self.config.game.time_limit - self.elapsed).max(0.0)
    }

    /// How the round ended, if it has
    #[must_use]
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Whether the round has ended
    #[must_use]
    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::ScriptedController;
    use crate::world::TileGraph;

    const DT: f32 = 1.0 / 60.0;

    fn quiet_round(config: SimConfig) -> Simulation {
        let map = GameMap::new(TileGraph::fully_connected(8, 8), Vec3::ZERO, 5.0);
        Simulation::with_map(config.with_seed(1).with_npc_count(0), map).unwrap()
    }

    #[test]
    fn test_same_seed_same_round() {
        let config = SimConfig::default().with_seed(99);
        let a = Simulation::new(config.clone()).unwrap();
        let b = Simulation::new(config).unwrap();

        assert_eq!(a.npcs().len(), 2);
        assert_eq!(a.player().location(), b.player().location());
        assert_eq!(a.npcs()[1].location(), b.npcs()[1].location());
        assert_eq!(a.map().graph().edge_count(), a.map().graph().len() - 1);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = SimConfig::default();
        config.map.tile_size = 0.0;
        assert!(Simulation::new(config).is_err());
    }

    #[test]
    fn test_time_runs_out() {
        let mut sim = quiet_round(SimConfig::default().with_time_limit(1.0));
        let idle = ScriptedController::default();

        for _ in 0..4 {
            sim.tick(0.25, &idle);
        }
        assert_eq!(sim.outcome(), Some(Outcome::TimeUp));
        assert_eq!(sim.time_left(), 0.0);

        // Further ticks are no-ops
        sim.tick(0.25, &idle);
        assert_eq!(sim.elapsed(), 1.0);
    }

    #[test]
    fn test_out_of_lives_loses() {
        let mut sim = quiet_round(SimConfig::default());
        for _ in 0..3 {
            sim.player.lose_life(&mut sim.events);
        }

        sim.tick(DT, &ScriptedController::default());

        assert_eq!(sim.outcome(), Some(Outcome::Lost));
        assert!(sim.events.iter_pending().any(|e| *e == GameEvent::GameOver {
            outcome: Outcome::Lost
        }));
    }

    #[test]
    fn test_score_target_wins() {
        let mut sim = quiet_round(SimConfig::default());
        for _ in 0..5 {
            sim.player.add_score(&mut sim.events);
        }

        sim.tick(DT, &ScriptedController::default());

        assert_eq!(sim.outcome(), Some(Outcome::Won));
    }

    #[test]
    fn test_coin_pickup_scores() {
        let mut sim = quiet_round(SimConfig::default());
        let spot = sim.player.location() + Vec3::new(1.0, 0.0, 0.0);
        sim.pickups.spawn_at(PickupKind::Coin, spot, &sim.config);

        sim.tick(DT, &ScriptedController::default());

        assert_eq!(sim.player().score(), 1);
        assert_eq!(sim.pickups().count(PickupKind::Coin), 0);
        assert!(sim.events.iter_pending().any(|e| *e == GameEvent::PickupCollected {
            kind: PickupKind::Coin
        }));
    }

    #[test]
    fn test_power_up_makes_npcs_flee() {
        let map = GameMap::new(TileGraph::fully_connected(8, 8), Vec3::ZERO, 5.0);
        let mut sim = Simulation::with_map(SimConfig::default().with_seed(4), map).unwrap();
        let spot = sim.player.location();
        sim.pickups.spawn_at(PickupKind::PowerUp, spot, &sim.config);

        sim.tick(DT, &ScriptedController::default());

        assert_eq!(sim.player().lives(), 4);
        for npc in sim.npcs() {
            assert!(matches!(npc.state(), NpcState::Flee { .. }));
        }
        assert!(sim.events.iter_pending().any(|e| *e == GameEvent::PowerUpActivated));
    }

    #[test]
    fn test_default_round_runs_without_panicking() {
        let mut sim = Simulation::new(SimConfig::default().with_seed(7)).unwrap();
        let mut controller = ScriptedController::new(vec![
            (2.0, Vec3::X),
            (2.0, Vec3::Z),
            (2.0, Vec3::NEG_X),
            (2.0, Vec3::NEG_Z),
        ]);

        for _ in 0..(60 * 10) {
            sim.tick(DT, &controller);
            controller.advance(DT);
        }

        assert!(sim.elapsed() > 0.0);
        assert!(sim.player().lives() <= 3);
        for npc in sim.npcs() {
            assert!(npc.location().is_finite());
        }
    }
}
