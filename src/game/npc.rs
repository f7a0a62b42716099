//! Non-player characters
//!
//! Each NPC owns a kinematic body, its current path and a [`StateMachine`]
//! over [`NpcState`]. The shared world (map, player, RNG, event queue) is
//! lent to it for the duration of one update through [`NpcWorld`].

use glam::Vec3;

use crate::ai::{Path, State, StateMachine, SteeringAgent, Transition, Wander};
use crate::core::{AgentId, EventQueue, GameEvent, NavigationMode, SimConfig};
use crate::world::{GameMap, TileType};

use super::player::Player;

/// NPC behavior states
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NpcState {
    /// Roam between random tiles
    Wander,
    /// Chase the player
    Pursue,
    /// Run from the player until the timer runs out
    Flee {
        /// Seconds spent fleeing
        elapsed: f32,
    },
}

impl NpcState {
    /// A fresh Flee state
    #[must_use]
    pub fn flee() -> Self {
        NpcState::Flee { elapsed: 0.0 }
    }
}

/// Shared state an NPC borrows for one update
pub struct NpcWorld<'w> {
    pub map: &'w mut GameMap,
    pub target: &'w mut Player,
    pub config: &'w SimConfig,
    pub rng: &'w mut fastrand::Rng,
    pub events: &'w mut EventQueue,
}

/// Everything an NPC state may touch during one tick
pub struct NpcContext<'a, 'w> {
    id: usize,
    dt: f32,
    agent: &'a mut SteeringAgent,
    path: &'a mut Path,
    last_target_position: &'a mut Option<Vec3>,
    wander: &'a mut Wander,
    world: &'a mut NpcWorld<'w>,
}

impl NpcContext<'_, '_> {
    fn threshold(&self) -> f32 {
        self.world.map.tile_size() / 2.0
    }

    /// Replace the path with one toward a random empty tile.
    ///
    /// Returns `false` and leaves the old path alone when no path exists.
    fn new_random_path(&mut self) -> bool {
        let map = &*self.world.map;
        let Some(start) = map.quantize(self.agent.location) else {
            return false;
        };
        let Some(end) = map.random_empty_tile(self.world.rng) else {
            return false;
        };
        let result = map.astar(start, end);
        if result.is_empty() {
            return false;
        }
        map.render_path(AgentId::Npc(self.id), &result.nodes, self.world.events);
        *self.path = Path::from_nodes(map, result.nodes);
        true
    }

    /// Path toward the target's tile. Only a non-empty result replaces the
    /// current path and records where the target was.
    fn recalculate_pursuit(&mut self) {
        let map = &*self.world.map;
        let target = self.world.target.location();
        let (Some(start), Some(end)) = (map.quantize(self.agent.location), map.quantize(target))
        else {
            return;
        };
        let result = map.astar(start, end);
        if result.is_empty() {
            return;
        }
        map.render_path(AgentId::Npc(self.id), &result.nodes, self.world.events);
        *self.path = Path::from_nodes(map, result.nodes);
        *self.last_target_position = Some(target);
    }

    fn should_recalculate(&self) -> bool {
        let target = self.world.target.location();
        let moved_far = self
            .last_target_position
            .is_none_or(|last| last.distance(target) > self.world.config.npc.movement_threshold);
        self.path.is_exhausted() || moved_far
    }

    fn follow_path(&mut self) {
        let threshold = self.threshold();
        let force = self.agent.simple_follow(self.path, threshold);
        self.agent.apply_force(force);
    }

    fn distance_to_target(&self) -> f32 {
        self.agent.location.distance(self.world.target.location())
    }
}

impl State<NpcContext<'_, '_>> for NpcState {
    fn name(&self) -> &'static str {
        match self {
            NpcState::Wander => "Wander",
            NpcState::Pursue => "Pursue",
            NpcState::Flee { .. } => "Flee",
        }
    }

    fn enter(&mut self, ctx: &mut NpcContext<'_, '_>) {
        ctx.world.events.push(GameEvent::StateChanged {
            agent: AgentId::Npc(ctx.id),
            state: State::<NpcContext<'_, '_>>::name(self),
        });

        match self {
            NpcState::Pursue => {
                if ctx.world.config.npc.navigation == NavigationMode::Path {
                    ctx.recalculate_pursuit();
                }
            }
            NpcState::Flee { elapsed } => *elapsed = 0.0,
            // Whatever route was held before leaving Wander no longer starts here
            NpcState::Wander => *ctx.path = Path::default(),
        }
    }

    fn update(&mut self, ctx: &mut NpcContext<'_, '_>) -> Transition<Self> {
        let npc = &ctx.world.config.npc;
        let (pursuit, close, contact, lookahead) = (
            npc.pursuit_threshold,
            npc.close_range,
            npc.contact_threshold,
            npc.pursue_lookahead,
        );

        match self {
            NpcState::Wander => {
                if !ctx.path.is_empty() || ctx.new_random_path() {
                    ctx.follow_path();
                    if ctx.path.is_exhausted() {
                        ctx.new_random_path();
                    }
                } else {
                    // Nowhere to go from here; drift instead of freezing
                    ctx.wander.update(ctx.world.rng);
                    ctx.agent.apply(&*ctx.wander);
                }

                if ctx.distance_to_target() <= pursuit {
                    Transition::To(NpcState::Pursue)
                } else {
                    Transition::None
                }
            }

            NpcState::Pursue => {
                match ctx.world.config.npc.navigation {
                    NavigationMode::Path => {
                        if ctx.should_recalculate() {
                            ctx.recalculate_pursuit();
                        }
                        if !ctx.path.is_empty() {
                            ctx.follow_path();
                        }
                    }
                    NavigationMode::Flow => {
                        let target = ctx.world.target.location();
                        let force = interactive_flow(ctx.agent, ctx.world.map, target);
                        ctx.agent.apply_force(force);
                    }
                }

                let distance = ctx.distance_to_target();
                if distance <= close {
                    let force = ctx.agent.pursue(&ctx.world.target.agent, lookahead);
                    ctx.agent.apply_force(force);
                }

                if distance < contact {
                    let world = &mut *ctx.world;
                    if let Some(tile) = world.map.quantize(world.target.location()) {
                        world.map.set_tile_type(tile, TileType::Marked, world.events);
                    }
                    world.target.lose_life(world.events);
                    world.target.relocate(world.map, world.rng);
                    log::debug!("NPC {} caught the player", ctx.id);
                    return Transition::To(NpcState::Wander);
                }
                Transition::None
            }

            NpcState::Flee { elapsed } => {
                *elapsed += ctx.dt;

                let force = ctx.agent.evade(&ctx.world.target.agent, lookahead);
                ctx.agent.apply_force(force);

                if ctx.distance_to_target() < contact {
                    let world = &mut *ctx.world;
                    if let Some(tile) = world.map.quantize(ctx.agent.location) {
                        world.map.set_tile_type(tile, TileType::Marked, world.events);
                    }
                    if let Some(tile) = world.map.random_empty_tile(world.rng) {
                        ctx.agent.teleport(world.map.localize(tile));
                        *ctx.path = Path::default();
                    }
                    world.target.add_score(world.events);
                    log::debug!("NPC {} was caught", ctx.id);
                }

                if *elapsed >= ctx.world.config.npc.flee_duration {
                    Transition::To(NpcState::Wander)
                } else {
                    Transition::None
                }
            }
        }
    }
}

/// Steering from the map's flow field.
///
/// On a goal tile the agent arrives at the tile centre. Elsewhere it steers
/// toward the field direction at top speed. Tiles without a field entry
/// contribute no force.
#[must_use]
pub fn flow(agent: &SteeringAgent, map: &GameMap) -> Vec3 {
    let Some(node) = map.quantize(agent.location) else {
        return Vec3::ZERO;
    };
    let field = map.flow_field();
    if field.is_goal(node) {
        return agent.arrive(map.localize(node), map.tile_size() / 2.0);
    }
    match field.get(node) {
        Some(direction) => {
            let desired = direction * agent.top_speed;
            (desired - agent.velocity).clamp_length_max(agent.max_force)
        }
        None => Vec3::ZERO,
    }
}

/// [`flow`] toward `target`, retargeting the field when `target` left the
/// current goal tiles.
pub fn interactive_flow(agent: &SteeringAgent, map: &mut GameMap, target: Vec3) -> Vec3 {
    if let Some(node) = map.quantize(target)
        && !map.flow_field().is_goal(node)
    {
        map.setup_single_goal_flow_field(node);
    }
    flow(agent, map)
}

/// A maze-roaming enemy.
#[derive(Debug)]
pub struct Npc {
    id: usize,
    /// Kinematic body
    pub agent: SteeringAgent,
    path: Path,
    last_target_position: Option<Vec3>,
    wander: Wander,
    machine: StateMachine<NpcState>,
}

impl Npc {
    /// Create an NPC in the Wander state
    #[must_use]
    pub fn new(id: usize, config: &SimConfig, location: Vec3) -> Self {
        Self {
            id,
            agent: SteeringAgent::new(&config.character).at(location),
            path: Path::default(),
            last_target_position: None,
            wander: Wander::new(&config.wander),
            machine: StateMachine::new(NpcState::Wander),
        }
    }

    /// Spawn index
    #[must_use]
    pub fn id(&self) -> usize {
        self.id
    }

    /// Current behavior state
    #[must_use]
    pub fn state(&self) -> &NpcState {
        self.machine.current()
    }

    /// Path currently followed
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// World position
    #[must_use]
    pub fn location(&self) -> Vec3 {
        self.agent.location
    }

    fn context<'a, 'w>(
        &'a mut self,
        dt: f32,
        world: &'a mut NpcWorld<'w>,
    ) -> (&'a mut StateMachine<NpcState>, NpcContext<'a, 'w>) {
        let Npc {
            id,
            agent,
            path,
            last_target_position,
            wander,
            machine,
        } = self;
        let ctx = NpcContext {
            id: *id,
            dt,
            agent,
            path,
            last_target_position,
            wander,
            world,
        };
        (machine, ctx)
    }

    /// Run the behavior state, then physics and integration
    pub fn update(&mut self, dt: f32, world: &mut NpcWorld<'_>) {
        let (machine, mut ctx) = self.context(dt, world);
        machine.update(&mut ctx);
        self.agent.update(dt, world.map);
    }

    /// Force a state change, e.g. Flee when a power-up is picked up
    pub fn switch_state(&mut self, state: NpcState, world: &mut NpcWorld<'_>) {
        let (machine, mut ctx) = self.context(0.0, world);
        machine.switch_state(&mut ctx, state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{NodeId, TileGraph};

    struct Fixture {
        map: GameMap,
        player: Player,
        config: SimConfig,
        rng: fastrand::Rng,
        events: EventQueue,
    }

    impl Fixture {
        fn open(cols: usize, rows: usize) -> Self {
            let config = SimConfig::default();
            Self {
                map: GameMap::new(TileGraph::fully_connected(cols, rows), Vec3::ZERO, 5.0),
                player: Player::new(&config, Vec3::ZERO),
                config,
                rng: fastrand::Rng::with_seed(11),
                events: EventQueue::new(),
            }
        }

        fn tile(&self, x: i32, z: i32) -> NodeId {
            self.map.graph().id_at(x, z).unwrap()
        }

        fn centre(&self, x: i32, z: i32) -> Vec3 {
            self.map.localize(self.tile(x, z))
        }

        fn world(&mut self) -> NpcWorld<'_> {
            NpcWorld {
                map: &mut self.map,
                target: &mut self.player,
                config: &self.config,
                rng: &mut self.rng,
                events: &mut self.events,
            }
        }
    }

    #[test]
    fn test_wander_switches_to_pursue_within_threshold() {
        let mut fx = Fixture::open(12, 12);
        fx.player.agent.teleport(fx.centre(7, 2));
        let mut npc = Npc::new(0, &fx.config, fx.centre(2, 2));
        assert_eq!(npc.location().distance(fx.player.location()), 25.0);

        npc.update(1.0 / 60.0, &mut fx.world());

        assert_eq!(npc.state(), &NpcState::Pursue);
        // Entry hook planned a route from the NPC's tile to the player's
        let nodes = npc.path().nodes();
        assert_eq!(nodes.len(), 6);
        assert_eq!(nodes.first(), Some(&fx.tile(2, 2)));
        assert_eq!(nodes.last(), Some(&fx.tile(7, 2)));
    }

    #[test]
    fn test_wander_keeps_roaming_when_target_far() {
        let mut fx = Fixture::open(12, 12);
        fx.player.agent.teleport(fx.centre(11, 11));
        let mut npc = Npc::new(0, &fx.config, fx.centre(0, 0));

        npc.update(1.0 / 60.0, &mut fx.world());

        assert_eq!(npc.state(), &NpcState::Wander);
        assert!(!npc.path().is_empty());
        fx.events.swap();
        assert!(fx.events.iter().any(|e| matches!(
            e,
            GameEvent::PathChanged { agent: AgentId::Npc(0), .. }
        )));
    }

    #[test]
    fn test_wander_falls_back_to_drifting_without_path() {
        let mut fx = Fixture::open(10, 10);
        fx.player.agent.teleport(fx.centre(9, 9));
        let tile = fx.tile(0, 0);
        fx.map.set_tile_type(tile, TileType::Obstacle, &mut fx.events);
        let mut npc = Npc::new(0, &fx.config, fx.centre(0, 0));

        npc.update(0.1, &mut fx.world());

        assert_eq!(npc.state(), &NpcState::Wander);
        assert!(npc.path().is_empty());
        assert!(npc.wander.angle().is_some());
        assert!(npc.agent.velocity.length() > 0.0);
    }

    #[test]
    fn test_pursue_contact_costs_a_life() {
        let mut fx = Fixture::open(8, 8);
        let start = fx.centre(2, 2);
        fx.player.agent.teleport(start + Vec3::new(2.0, 0.0, 0.0));
        let mut npc = Npc::new(0, &fx.config, start);
        npc.switch_state(NpcState::Pursue, &mut fx.world());
        fx.events.clear();

        npc.update(1.0 / 60.0, &mut fx.world());

        assert_eq!(fx.player.lives(), 2);
        assert_eq!(npc.state(), &NpcState::Wander);

        let location = fx.player.location();
        let tile = fx.map.quantize(location).unwrap();
        assert_eq!(fx.map.localize(tile), location);
        assert_eq!(fx.player.agent.velocity, Vec3::ZERO);

        assert_eq!(fx.map.node(fx.tile(2, 2)).tile_type(), TileType::Marked);

        fx.events.swap();
        assert!(fx.events.iter().any(|e| *e == GameEvent::LifeLost { lives: 2 }));
    }

    #[test]
    fn test_pursue_recalculates_after_target_moves() {
        let mut fx = Fixture::open(12, 12);
        fx.player.agent.teleport(fx.centre(6, 0));
        let mut npc = Npc::new(0, &fx.config, fx.centre(0, 0));
        npc.switch_state(NpcState::Pursue, &mut fx.world());
        assert_eq!(npc.path().nodes().last(), Some(&fx.tile(6, 0)));

        // Small move: path kept
        fx.player.agent.teleport(fx.centre(6, 1));
        npc.update(1.0 / 60.0, &mut fx.world());
        assert_eq!(npc.path().nodes().last(), Some(&fx.tile(6, 0)));

        // More than 20 units away from the recorded position
        fx.player.agent.teleport(fx.centre(6, 6));
        npc.update(1.0 / 60.0, &mut fx.world());
        assert_eq!(npc.path().nodes().last(), Some(&fx.tile(6, 6)));
    }

    #[test]
    fn test_pursue_with_flow_field() {
        let mut fx = Fixture::open(8, 8);
        fx.config = fx.config.clone().with_navigation(NavigationMode::Flow);
        fx.player.agent.teleport(fx.centre(5, 1));
        let mut npc = Npc::new(0, &fx.config, fx.centre(1, 1));
        npc.switch_state(NpcState::Pursue, &mut fx.world());

        npc.update(0.1, &mut fx.world());

        assert_eq!(fx.map.goals(), &[fx.tile(5, 1)]);
        assert!(npc.agent.velocity.x > 0.0);
        assert!(npc.path().is_empty());
    }

    #[test]
    fn test_flee_contact_awards_score() {
        let mut fx = Fixture::open(8, 8);
        let start = fx.centre(3, 3);
        fx.player.agent.teleport(start + Vec3::new(0.0, 0.0, 1.5));
        let mut npc = Npc::new(0, &fx.config, start);
        npc.switch_state(NpcState::flee(), &mut fx.world());

        npc.update(1.0 / 60.0, &mut fx.world());

        assert_eq!(fx.player.score(), 1);
        assert_eq!(fx.player.lives(), 3);
        assert!(matches!(npc.state(), NpcState::Flee { .. }));
        assert_eq!(fx.map.node(fx.tile(3, 3)).tile_type(), TileType::Marked);

        // Relocated to a tile centre, then moved for one tick at rest
        let tile = fx.map.quantize(npc.location()).unwrap();
        assert!(npc.location().distance(fx.map.localize(tile)) < 0.1);
    }

    #[test]
    fn test_flee_times_out() {
        let mut fx = Fixture::open(12, 12);
        fx.player.agent.teleport(fx.centre(11, 11));
        let mut npc = Npc::new(0, &fx.config, fx.centre(0, 0));
        npc.switch_state(NpcState::flee(), &mut fx.world());

        for _ in 0..7 {
            npc.update(1.0, &mut fx.world());
        }
        assert_eq!(npc.state(), &NpcState::Flee { elapsed: 7.0 });

        npc.update(1.0, &mut fx.world());
        assert_eq!(npc.state(), &NpcState::Wander);
    }

    #[test]
    fn test_wander_replans_from_current_tile_after_flee() {
        let mut fx = Fixture::open(12, 12);
        fx.config.npc.pursuit_threshold = 0.0;
        fx.player.agent.teleport(fx.centre(6, 11));
        let mut npc = Npc::new(0, &fx.config, fx.centre(0, 0));
        for _ in 0..30 {
            npc.update(1.0 / 60.0, &mut fx.world());
        }
        let before_flee = npc.path().clone();
        assert!(!before_flee.is_empty());

        // Caught while fleeing: relocated far from the old route
        npc.switch_state(NpcState::flee(), &mut fx.world());
        npc.agent.teleport(fx.centre(11, 0));
        npc.switch_state(NpcState::Wander, &mut fx.world());
        assert!(npc.path().is_empty());

        npc.update(1.0 / 60.0, &mut fx.world());

        assert_ne!(npc.path(), &before_flee);
        assert_eq!(npc.path().nodes().first(), Some(&fx.tile(11, 0)));
    }

    #[test]
    fn test_wander_keeps_moving_after_flee_timeout() {
        let mut fx = Fixture::open(12, 12);
        fx.config.npc.pursuit_threshold = 0.0;
        fx.player.agent.teleport(fx.centre(6, 11));
        let mut npc = Npc::new(0, &fx.config, fx.centre(0, 0));
        for _ in 0..30 {
            npc.update(1.0 / 60.0, &mut fx.world());
        }

        npc.switch_state(NpcState::flee(), &mut fx.world());
        npc.agent.teleport(fx.centre(11, 0));
        let flee_ticks = (fx.config.npc.flee_duration * 60.0).ceil() as usize + 1;
        for _ in 0..flee_ticks {
            npc.update(1.0 / 60.0, &mut fx.world());
        }
        assert_eq!(npc.state(), &NpcState::Wander);

        let mut visited = std::collections::HashSet::new();
        for _ in 0..(60 * 10) {
            npc.update(1.0 / 60.0, &mut fx.world());
            visited.extend(fx.map.quantize(npc.location()));
        }
        assert!(visited.len() > 3, "visited only {visited:?}");
    }

    #[test]
    fn test_flow_arrives_on_goal_and_ignores_unreachable() {
        let mut fx = Fixture::open(4, 4);
        let config = fx.config.clone();
        let goal = fx.tile(3, 3);
        fx.map.setup_single_goal_flow_field(goal);

        let on_goal = SteeringAgent::new(&config.character).at(fx.centre(3, 3));
        assert_eq!(flow(&on_goal, &fx.map), Vec3::ZERO);

        let away = SteeringAgent::new(&config.character).at(fx.centre(0, 3));
        let force = flow(&away, &fx.map);
        assert!(force.x > 0.0);
        assert!(force.length() <= config.character.max_force + 1e-4);

        let blocked = fx.tile(0, 0);
        fx.map.set_tile_type(blocked, TileType::Obstacle, &mut fx.events);
        let stuck = SteeringAgent::new(&config.character).at(fx.centre(0, 0));
        assert_eq!(flow(&stuck, &fx.map), Vec3::ZERO);
    }
}
