//! Coins and power-ups
//!
//! Pickups live in a `hecs` world as `(PickupKind, SteeringAgent)` pairs.
//! They do not steer, but their bodies still get friction and wall
//! containment each tick like any other character.

use glam::Vec3;
use hecs::Entity;

use crate::ai::SteeringAgent;
use crate::core::{EventQueue, GameEvent, SimConfig};
use crate::world::GameMap;

/// What a pickup gives the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PickupKind {
    /// One point
    Coin,
    /// An extra life, and the NPCs start fleeing
    PowerUp,
}

/// All pickups on the map plus their spawn timers
pub struct Pickups {
    world: hecs::World,
    coin_timer: f32,
    power_up_timer: f32,
}

impl Pickups {
    /// Create an empty set
    pub fn new() -> Self {
        Self {
            world: hecs::World::new(),
            coin_timer: 0.0,
            power_up_timer: 0.0,
        }
    }

    /// Place a pickup at a world position
    pub fn spawn_at(&mut self, kind: PickupKind, location: Vec3, config: &SimConfig) -> Entity {
        let body = SteeringAgent::new(&config.character)
            .with_friction(config.game.pickup_friction)
            .with_size(config.game.pickup_size)
            .at(location);
        self.world.spawn((kind, body))
    }

    /// Place a pickup on a random empty tile and announce it
    pub fn spawn(
        &mut self,
        kind: PickupKind,
        map: &GameMap,
        rng: &mut fastrand::Rng,
        config: &SimConfig,
        events: &mut EventQueue,
    ) -> Option<Entity> {
        let node = map.random_empty_tile(rng)?;
        let entity = self.spawn_at(kind, map.localize(node), config);
        log::debug!("Spawned {:?} on tile {:?}", kind, node);
        events.push(GameEvent::PickupSpawned { kind, node });
        Some(entity)
    }

    /// Advance the spawn timers and spawn whatever is due.
    ///
    /// A coin every `coin_interval` seconds unless `max_coins` are already
    /// out; a power-up once `power_up_interval` seconds have passed since the
    /// last one and none is on the map.
    pub fn update_spawns(
        &mut self,
        dt: f32,
        map: &GameMap,
        rng: &mut fastrand::Rng,
        config: &SimConfig,
        events: &mut EventQueue,
    ) {
        let game = &config.game;

        self.coin_timer += dt;
        if self.coin_timer > game.coin_interval {
            self.coin_timer = 0.0;
            if self.count(PickupKind::Coin) < game.max_coins {
                self.spawn(PickupKind::Coin, map, rng, config, events);
            }
        }

        self.power_up_timer += dt;
        if self.power_up_timer >= game.power_up_interval && self.count(PickupKind::PowerUp) == 0 {
            self.power_up_timer = 0.0;
            self.spawn(PickupKind::PowerUp, map, rng, config, events);
        }
    }

    /// Friction and wall containment for every pickup body
    pub fn update_bodies(&mut self, dt: f32, map: &GameMap) {
        for (_, body) in self.world.query_mut::<&mut SteeringAgent>() {
            body.update(dt, map);
        }
    }

    /// Remove every pickup within `radius` of `location` and return what was
    /// taken.
    pub fn collect(&mut self, location: Vec3, radius: f32) -> Vec<PickupKind> {
        let taken: Vec<(Entity, PickupKind)> = self
            .world
            .query::<(&PickupKind, &SteeringAgent)>()
            .iter()
            .filter(|(_, (_, body))| body.location.distance(location) < radius)
            .map(|(entity, (kind, _))| (entity, *kind))
            .collect();

        for &(entity, _) in &taken {
            let _ = self.world.despawn(entity);
        }
        taken.into_iter().map(|(_, kind)| kind).collect()
    }

    /// Number of pickups of one kind
    pub fn count(&self, kind: PickupKind) -> usize {
        self.world
            .query::<&PickupKind>()
            .iter()
            .filter(|(_, k)| **k == kind)
            .count()
    }

    /// Locations of every pickup of one kind
    pub fn locations(&self, kind: PickupKind) -> Vec<Vec3> {
        self.world
            .query::<(&PickupKind, &SteeringAgent)>()
            .iter()
            .filter(|(_, (k, _))| **k == kind)
            .map(|(_, (_, body))| body.location)
            .collect()
    }

    /// Total number of pickups
    pub fn len(&self) -> usize {
        self.world.len() as usize
    }

    /// Check if no pickups are out
    pub fn is_empty(&self) -> bool {
        self.world.is_empty()
    }

    /// Remove all pickups and restart the timers
    pub fn clear(&mut self) {
        self.world.clear();
        self.coin_timer = 0.0;
        self.power_up_timer = 0.0;
    }
}

impl Default for Pickups {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Pickups {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pickups")
            .field("coins", &self.count(PickupKind::Coin))
            .field("power_ups", &self.count(PickupKind::PowerUp))
            .field("coin_timer", &self.coin_timer)
            .field("power_up_timer", &self.power_up_timer)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::TileGraph;

    fn setup() -> (GameMap, SimConfig, fastrand::Rng, EventQueue) {
        (
            GameMap::new(TileGraph::fully_connected(6, 6), Vec3::ZERO, 5.0),
            SimConfig::default(),
            fastrand::Rng::with_seed(5),
            EventQueue::new(),
        )
    }

    #[test]
    fn test_coin_spawn_interval_and_cap() {
        let (map, config, mut rng, mut events) = setup();
        let mut pickups = Pickups::new();

        // Nothing before the interval passes
        pickups.update_spawns(2.0, &map, &mut rng, &config, &mut events);
        assert_eq!(pickups.count(PickupKind::Coin), 0);

        pickups.update_spawns(1.5, &map, &mut rng, &config, &mut events);
        assert_eq!(pickups.count(PickupKind::Coin), 1);

        for _ in 0..10 {
            pickups.update_spawns(3.5, &map, &mut rng, &config, &mut events);
        }
        assert_eq!(pickups.count(PickupKind::Coin), config.game.max_coins);
    }

    #[test]
    fn test_power_up_waits_for_interval_and_absence() {
        let (map, config, mut rng, mut events) = setup();
        let mut pickups = Pickups::new();

        pickups.update_spawns(24.0, &map, &mut rng, &config, &mut events);
        assert_eq!(pickups.count(PickupKind::PowerUp), 0);

        pickups.update_spawns(1.0, &map, &mut rng, &config, &mut events);
        assert_eq!(pickups.count(PickupKind::PowerUp), 1);

        // Still on the map, so no second one
        pickups.update_spawns(30.0, &map, &mut rng, &config, &mut events);
        assert_eq!(pickups.count(PickupKind::PowerUp), 1);

        events.swap();
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::PickupSpawned { kind: PickupKind::PowerUp, .. }
        )));
    }

    #[test]
    fn test_collect_within_radius() {
        let (_, config, _, _) = setup();
        let mut pickups = Pickups::new();
        pickups.spawn_at(PickupKind::Coin, Vec3::new(10.0, 5.0, 10.0), &config);
        pickups.spawn_at(PickupKind::PowerUp, Vec3::new(11.5, 5.0, 10.0), &config);
        pickups.spawn_at(PickupKind::Coin, Vec3::new(20.0, 5.0, 10.0), &config);

        let mut taken = pickups.collect(Vec3::new(10.5, 5.0, 10.0), 2.0);
        taken.sort_by_key(|k| *k == PickupKind::PowerUp);

        assert_eq!(taken, vec![PickupKind::Coin, PickupKind::PowerUp]);
        assert_eq!(pickups.len(), 1);
        assert_eq!(pickups.locations(PickupKind::Coin), vec![Vec3::new(20.0, 5.0, 10.0)]);
    }

    #[test]
    fn test_small_body_sits_near_wall() {
        let (map, config, _, _) = setup();
        let mut pickups = Pickups::new();
        // Inside tile (0, 0), half a unit from its outer x = 0 wall
        let spot = Vec3::new(0.5, 5.0, 2.5);
        pickups.spawn_at(PickupKind::Coin, spot, &config);
        pickups.update_bodies(1.0 / 60.0, &map);
        assert_eq!(pickups.locations(PickupKind::Coin), vec![spot]);

        pickups.clear();
        pickups.spawn_at(PickupKind::Coin, Vec3::new(0.1, 5.0, 2.5), &config);
        pickups.update_bodies(1.0 / 60.0, &map);
        assert_eq!(pickups.locations(PickupKind::Coin), vec![Vec3::new(0.375, 5.0, 2.5)]);
    }

    #[test]
    fn test_bodies_stay_at_rest() {
        let (map, config, _, _) = setup();
        let mut pickups = Pickups::new();
        let spot = Vec3::new(12.5, 5.0, 12.5);
        pickups.spawn_at(PickupKind::Coin, spot, &config);

        pickups.update_bodies(1.0 / 60.0, &map);

        assert_eq!(pickups.locations(PickupKind::Coin), vec![spot]);
    }
}
