//! Steering behaviors for AI movement
//!
//! A [`SteeringAgent`] is a point mass with a speed and force limit. Each
//! behavior turns the agent's situation into a force; forces are summed into
//! the agent's acceleration with [`SteeringAgent::apply_force`] and the sum is
//! integrated once per tick, so the order in which behaviors are applied
//! within a tick does not matter.
//!
//! One tick always runs in this order:
//!
//! 1. behaviors accumulate forces
//! 2. wall containment and friction ([`SteeringAgent::physics`])
//! 3. `velocity += acceleration * dt`, clamped to `top_speed`
//! 4. `location += velocity * dt`
//! 5. heading follows velocity
//! 6. acceleration resets to zero

use std::f32::consts::TAU;

use glam::Vec3;

use crate::ai::Path;
use crate::core::{CharacterConfig, WanderConfig};
use crate::world::GameMap;

/// Trait for steering behaviors
pub trait SteeringBehavior {
    /// Force that moves `agent` toward this behavior's goal
    fn steer(&self, agent: &SteeringAgent) -> Vec3;
}

/// Kinematic state and limits of one character.
#[derive(Debug, Clone, PartialEq)]
pub struct SteeringAgent {
    /// World position
    pub location: Vec3,
    /// Current velocity
    pub velocity: Vec3,
    /// Forces accumulated this tick (divided by mass)
    acceleration: Vec3,
    /// Yaw facing, `atan2(vx, vz)` of the last non-zero velocity
    pub heading: f32,
    pub top_speed: f32,
    pub mass: f32,
    pub max_force: f32,
    pub friction_magnitude: f32,
    /// Bounding extent used for wall containment
    pub size: f32,
}

impl SteeringAgent {
    /// Create an agent at the origin
    #[must_use]
    pub fn new(config: &CharacterConfig) -> Self {
        Self {
            location: Vec3::ZERO,
            velocity: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            heading: 0.0,
            top_speed: config.top_speed,
            mass: config.mass,
            max_force: config.max_force,
            friction_magnitude: config.friction,
            size: config.size,
        }
    }

    /// Place the agent
    #[must_use]
    pub fn at(mut self, location: Vec3) -> Self {
        self.location = location;
        self
    }

    /// Override friction
    #[must_use]
    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction_magnitude = friction;
        self
    }

    /// Override size
    #[must_use]
    pub fn with_size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    /// Forces accumulated so far this tick
    #[must_use]
    pub fn acceleration(&self) -> Vec3 {
        self.acceleration
    }

    /// Accumulate a force for this tick
    pub fn apply_force(&mut self, force: Vec3) {
        self.acceleration += force / self.mass;
    }

    /// Evaluate a behavior and accumulate its force
    pub fn apply(&mut self, behavior: &impl SteeringBehavior) {
        let force = behavior.steer(self);
        self.apply_force(force);
    }

    /// Move somewhere else and come to a halt
    pub fn teleport(&mut self, location: Vec3) {
        self.location = location;
        self.velocity = Vec3::ZERO;
    }

    /// Zero the horizontal velocity
    pub fn halt(&mut self) {
        self.velocity.x = 0.0;
        self.velocity.z = 0.0;
    }

    // ------------------------------------------------------------------------
    // Behaviors
    // ------------------------------------------------------------------------

    /// Full-speed approach, force clamped to `max_force`
    #[must_use]
    pub fn seek(&self, target: Vec3) -> Vec3 {
        Seek::new(target).steer(self)
    }

    /// Approach that slows down inside `radius`
    #[must_use]
    pub fn arrive(&self, target: Vec3, radius: f32) -> Vec3 {
        Arrive::new(target, radius).steer(self)
    }

    /// Exact opposite of [`SteeringAgent::seek`]
    #[must_use]
    pub fn flee(&self, target: Vec3) -> Vec3 {
        Flee::new(target).steer(self)
    }

    /// Seek where `other` will be after `lookahead` seconds
    #[must_use]
    pub fn pursue(&self, other: &SteeringAgent, lookahead: f32) -> Vec3 {
        Pursue::of(other, lookahead).steer(self)
    }

    /// Exact opposite of [`SteeringAgent::pursue`]
    #[must_use]
    pub fn evade(&self, other: &SteeringAgent, lookahead: f32) -> Vec3 {
        Evade::of(other, lookahead).steer(self)
    }

    /// Seek the path's current waypoint, advancing within `threshold`.
    ///
    /// On the final waypoint the agent arrives instead of seeking so it
    /// comes to a smooth stop.
    pub fn simple_follow(&self, path: &mut Path, threshold: f32) -> Vec3 {
        let Some(point) = path.current() else {
            return Vec3::ZERO;
        };

        if self.location.distance(point) < threshold {
            if path.is_at_last() {
                self.arrive(point, threshold)
            } else {
                path.advance();
                Vec3::ZERO
            }
        } else {
            self.seek(point)
        }
    }

    // ------------------------------------------------------------------------
    // Physics
    // ------------------------------------------------------------------------

    /// Keep the agent inside its tile wherever no edge leads on.
    ///
    /// Each axis is checked separately: if the tile has no walkable edge
    /// toward a side, the agent's half extent is clamped to that side.
    pub fn check_edges(&mut self, map: &GameMap) {
        let Some(id) = map.quantize(self.location) else {
            return;
        };
        let node = map.node(id);
        let centre = map.localize(id);
        let half_tile = map.tile_size() / 2.0;
        let half_size = self.size / 2.0;
        let (x, z) = (node.x(), node.z());

        if !node.has_edge_to(x - 1, z) {
            let wall = centre.x - half_tile;
            if self.location.x - half_size < wall {
                self.location.x = wall + half_size;
            }
        }
        if !node.has_edge_to(x + 1, z) {
            let wall = centre.x + half_tile;
            if self.location.x + half_size > wall {
                self.location.x = wall - half_size;
            }
        }
        if !node.has_edge_to(x, z - 1) {
            let wall = centre.z - half_tile;
            if self.location.z - half_size < wall {
                self.location.z = wall + half_size;
            }
        }
        if !node.has_edge_to(x, z + 1) {
            let wall = centre.z + half_tile;
            if self.location.z + half_size > wall {
                self.location.z = wall - half_size;
            }
        }
    }

    /// Horizontal friction opposing the velocity.
    ///
    /// Capped so that one step of length `dt` can at most stop the agent,
    /// never reverse it.
    #[must_use]
    pub fn friction(&self, dt: f32) -> Vec3 {
        let mut planar = self.velocity;
        planar.y = 0.0;
        let speed = planar.length();
        if speed == 0.0 || self.friction_magnitude <= 0.0 {
            return Vec3::ZERO;
        }

        let mut magnitude = self.friction_magnitude;
        if dt > 0.0 {
            magnitude = magnitude.min(speed * self.mass / dt);
        }
        -planar / speed * magnitude
    }

    /// Wall containment followed by friction
    pub fn physics(&mut self, map: &GameMap, dt: f32) {
        self.check_edges(map);
        let friction = self.friction(dt);
        self.apply_force(friction);
    }

    /// Integrate the accumulated acceleration and clear it
    pub fn integrate(&mut self, dt: f32) {
        self.velocity += self.acceleration * dt;
        self.velocity = self.velocity.clamp_length_max(self.top_speed);

        self.location += self.velocity * dt;

        if self.velocity.length_squared() > 0.0 {
            self.heading = self.velocity.x.atan2(self.velocity.z);
        }

        self.acceleration = Vec3::ZERO;
    }

    /// Physics then integration; call after behaviors applied their forces
    pub fn update(&mut self, dt: f32, map: &GameMap) {
        self.physics(map, dt);
        self.integrate(dt);
    }
}

/// Seek behavior - move towards target
#[derive(Debug, Clone)]
pub struct Seek {
    /// Target position
    pub target: Vec3,
}

impl Seek {
    /// Create a new seek behavior
    #[must_use]
    pub fn new(target: Vec3) -> Self {
        Self { target }
    }
}

impl SteeringBehavior for Seek {
    fn steer(&self, agent: &SteeringAgent) -> Vec3 {
        let desired = (self.target - agent.location).normalize_or_zero() * agent.top_speed;
        (desired - agent.velocity).clamp_length_max(agent.max_force)
    }
}

/// Flee behavior - move away from target
#[derive(Debug, Clone)]
pub struct Flee {
    /// Target position to flee from
    pub target: Vec3,
}

impl Flee {
    /// Create a new flee behavior
    #[must_use]
    pub fn new(target: Vec3) -> Self {
        Self { target }
    }
}

impl SteeringBehavior for Flee {
    fn steer(&self, agent: &SteeringAgent) -> Vec3 {
        -Seek::new(self.target).steer(agent)
    }
}

/// Arrive behavior - move towards target and slow down
#[derive(Debug, Clone)]
pub struct Arrive {
    /// Target position
    pub target: Vec3,
    /// Slowing distance
    pub radius: f32,
}

impl Arrive {
    /// Create a new arrive behavior
    #[must_use]
    pub fn new(target: Vec3, radius: f32) -> Self {
        Self { target, radius }
    }

    /// Desired speed at `distance` from the target: linear ramp from zero
    /// at the target to `top_speed` at `radius` and beyond.
    #[must_use]
    pub fn desired_speed(&self, distance: f32, top_speed: f32) -> f32 {
        if self.radius > 0.0 && distance < self.radius {
            distance / self.radius * top_speed
        } else {
            top_speed
        }
    }
}

impl SteeringBehavior for Arrive {
    fn steer(&self, agent: &SteeringAgent) -> Vec3 {
        let to_target = self.target - agent.location;
        let speed = self.desired_speed(to_target.length(), agent.top_speed);
        let desired = to_target.normalize_or_zero() * speed;
        (desired - agent.velocity).clamp_length_max(agent.max_force)
    }
}

/// Pursue behavior - seek a moving target's predicted position
#[derive(Debug, Clone)]
pub struct Pursue {
    /// Target's current position
    pub location: Vec3,
    /// Target's current velocity
    pub velocity: Vec3,
    /// Prediction horizon in seconds
    pub lookahead: f32,
}

impl Pursue {
    /// Pursue another agent
    #[must_use]
    pub fn of(other: &SteeringAgent, lookahead: f32) -> Self {
        Self {
            location: other.location,
            velocity: other.velocity,
            lookahead,
        }
    }

    /// Where the target will be
    #[must_use]
    pub fn prediction(&self) -> Vec3 {
        self.location + self.velocity * self.lookahead
    }
}

impl SteeringBehavior for Pursue {
    fn steer(&self, agent: &SteeringAgent) -> Vec3 {
        Seek::new(self.prediction()).steer(agent)
    }
}

/// Evade behavior - flee a moving target's predicted position
#[derive(Debug, Clone)]
pub struct Evade(Pursue);

impl Evade {
    /// Evade another agent
    #[must_use]
    pub fn of(other: &SteeringAgent, lookahead: f32) -> Self {
        Self(Pursue::of(other, lookahead))
    }
}

impl SteeringBehavior for Evade {
    fn steer(&self, agent: &SteeringAgent) -> Vec3 {
        -self.0.steer(agent)
    }
}

/// Wander behavior - smooth random movement
///
/// A circle is projected ahead of the agent along its velocity and the agent
/// seeks the point on that circle at the wander angle. The angle drifts by a
/// bounded random amount each tick.
#[derive(Debug, Clone)]
pub struct Wander {
    /// Wander circle distance
    pub distance: f32,
    /// Wander circle radius
    pub radius: f32,
    /// Maximum angle change per update
    pub max_turn: f32,
    /// Current wander angle, chosen on first update
    angle: Option<f32>,
}

impl Wander {
    /// Create a new wander behavior
    #[must_use]
    pub fn new(config: &WanderConfig) -> Self {
        Self {
            distance: config.distance,
            radius: config.radius,
            max_turn: config.max_turn,
            angle: None,
        }
    }

    /// Current wander angle
    #[must_use]
    pub fn angle(&self) -> Option<f32> {
        self.angle
    }

    /// Perturb the wander angle: a random start, then bounded drift
    pub fn update(&mut self, rng: &mut fastrand::Rng) {
        self.angle = Some(match self.angle {
            None => rng.f32() * TAU,
            Some(angle) => angle + rng.f32() * (self.max_turn * 2.0) - self.max_turn,
        });
    }

    /// Point on the wander circle the agent currently seeks
    #[must_use]
    pub fn target(&self, agent: &SteeringAgent) -> Vec3 {
        let angle = self.angle.unwrap_or(0.0);
        let centre = agent.location + agent.velocity.normalize_or_zero() * self.distance;
        centre + Vec3::new(self.radius * angle.sin(), 0.0, self.radius * angle.cos())
    }
}

impl SteeringBehavior for Wander {
    fn steer(&self, agent: &SteeringAgent) -> Vec3 {
        Seek::new(self.target(agent)).steer(agent)
    }
}
