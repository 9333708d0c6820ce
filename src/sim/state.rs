//! Game state and core simulation types
//!
//! Entities own their own motion and boundary handling. Everything that
//! outlives a single entity (rosters, pools, score, RNG) hangs off
//! `GameState`.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::boundary::{EdgeAction, PlayArea, apply_ship_edge, asteroid_edge, projectile_edge};
use super::collision::{Bounds, Collidable};
use super::manager::CollisionManager;
use super::pool::{AsteroidSpawner, ProjectileManager};
use crate::config::{AsteroidConfig, CollisionMode, ProjectileConfig, ShipConfig, SimConfig};
use crate::{facing_angle, rotate_degrees};

/// Monotonic entity ID source shared by every entity kind
#[derive(Debug, Clone)]
pub struct IdGen {
    next: u32,
}

impl Default for IdGen {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdGen {
    pub fn next_id(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// Player controls for one tick
#[derive(Debug, Clone, Copy, Default)]
pub struct ShipControls {
    /// Turn axis: positive turns clockwise (right), negative counter-clockwise
    pub turn: f32,
    /// Thrust axis: positive accelerates, zero or negative coasts
    pub thrust: f32,
}

/// Result of applying a hit to the ship
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Invincible or already destroyed; nothing changed
    Ignored,
    /// Lost a point of health and became invincible
    Damaged { health: u32 },
    /// Health ran out; the ship is gone for the session
    Destroyed,
}

/// The player's ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ship {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Unit heading
    pub direction: Vec2,
    pub health: u32,
    /// Seconds of invulnerability left (<= 0 means vulnerable)
    pub invincibility_timer: f32,
    /// Seconds until the next shot is allowed
    pub fire_cooldown: f32,
    pub destroyed: bool,
    /// Overlapping an asteroid this tick
    pub colliding: bool,
    pub tuning: ShipConfig,
}

impl Ship {
    pub fn new(tuning: ShipConfig) -> Self {
        Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            direction: Vec2::X,
            health: tuning.max_health,
            invincibility_timer: 0.0,
            fire_cooldown: tuning.fire_delay,
            destroyed: false,
            colliding: false,
            tuning,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.destroyed
    }

    pub fn is_invincible(&self) -> bool {
        self.invincibility_timer > 0.0
    }

    /// Hit-flash state for the renderer
    pub fn is_flashing(&self) -> bool {
        !self.destroyed && self.is_invincible()
    }

    /// Sprite rotation in radians
    pub fn rotation(&self) -> f32 {
        facing_angle(self.direction)
    }

    /// Advance timers, steering and motion by `dt`, then wrap
    pub fn update(&mut self, dt: f32, controls: &ShipControls, area: &PlayArea) {
        if self.destroyed {
            return;
        }

        self.fire_cooldown -= dt;
        self.invincibility_timer -= dt;

        if controls.turn > 0.0 {
            self.direction = rotate_degrees(self.direction, -self.tuning.turn_speed * dt);
        } else if controls.turn < 0.0 {
            self.direction = rotate_degrees(self.direction, self.tuning.turn_speed * dt);
        }
        // Keep the heading unit length despite accumulated rounding
        self.direction = self.direction.normalize_or(Vec2::X);

        if controls.thrust > 0.0 {
            self.vel += self.direction * self.tuning.acceleration * dt;
        } else {
            self.vel *= (1.0 - self.tuning.deceleration * dt).max(0.0);
            if self.vel.length() < self.tuning.min_speed {
                self.vel = Vec2::ZERO;
            }
        }
        self.vel = self.vel.clamp_length_max(self.tuning.max_speed);

        self.pos += self.vel * dt;
        self.pos = apply_ship_edge(area, self.pos, self.tuning.wrap_margin);
    }

    /// Whether the fire trigger would produce a shot right now
    pub fn can_fire(&self) -> bool {
        !self.destroyed && self.fire_cooldown <= 0.0
    }

    pub fn reset_fire_cooldown(&mut self) {
        self.fire_cooldown = self.tuning.fire_delay;
    }

    /// Take one point of damage unless invincible
    pub fn damage(&mut self, area: &PlayArea) -> DamageOutcome {
        if self.destroyed || self.is_invincible() {
            return DamageOutcome::Ignored;
        }

        self.health = self.health.saturating_sub(1);
        self.invincibility_timer = self.tuning.invincibility_time;

        if self.health == 0 {
            self.destroyed = true;
            self.vel = Vec2::ZERO;
            self.colliding = false;
            self.pos = area.off_world();
            DamageOutcome::Destroyed
        } else {
            DamageOutcome::Damaged {
                health: self.health,
            }
        }
    }
}

impl Collidable for Ship {
    fn bounds(&self) -> Bounds {
        Bounds::new(self.pos, self.tuning.half_extents)
    }

    fn is_collidable(&self) -> bool {
        !self.destroyed
    }
}

/// Where an asteroid came from, fixed for its whole life
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AsteroidOrigin {
    /// Pre-built parent living in the spawner's pool at `index`
    Pooled { index: usize },
    /// Created by a split; never pooled
    Split,
}

/// An asteroid entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asteroid {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub direction: Vec2,
    pub speed: f32,
    pub half_extents: Vec2,
    /// In flight and eligible for collisions
    pub moving: bool,
    /// Visible in the scene (false while pooled)
    pub active: bool,
    pub colliding: bool,
    /// The overlap this tick was with the ship
    pub hit_ship: bool,
    /// Sprite variant picked at spawn
    pub variant: u8,
    origin: AsteroidOrigin,
}

impl Asteroid {
    /// Build an inactive parent for the spawner's pool
    pub fn new_pooled(id: u32, index: usize, config: &AsteroidConfig, parked_at: Vec2) -> Self {
        Self {
            id,
            pos: parked_at,
            vel: Vec2::ZERO,
            direction: Vec2::X,
            speed: config.speed,
            half_extents: config.half_extents,
            moving: false,
            active: false,
            colliding: false,
            hit_ship: false,
            variant: 0,
            origin: AsteroidOrigin::Pooled { index },
        }
    }

    /// Build a child already in flight
    pub fn new_child(id: u32, config: &AsteroidConfig, pos: Vec2, direction: Vec2, variant: u8) -> Self {
        let mut child = Self {
            id,
            pos,
            vel: Vec2::ZERO,
            direction,
            speed: config.speed,
            half_extents: config.child_half_extents,
            moving: false,
            active: false,
            colliding: false,
            hit_ship: false,
            variant,
            origin: AsteroidOrigin::Split,
        };
        child.launch(pos, direction);
        child
    }

    pub fn origin(&self) -> AsteroidOrigin {
        self.origin
    }

    pub fn is_child(&self) -> bool {
        self.origin == AsteroidOrigin::Split
    }

    /// Slot in the spawner's pool; `None` for children
    pub fn pool_index(&self) -> Option<usize> {
        match self.origin {
            AsteroidOrigin::Pooled { index } => Some(index),
            AsteroidOrigin::Split => None,
        }
    }

    pub fn rotation(&self) -> f32 {
        facing_angle(self.direction)
    }

    /// Put the asteroid in flight from `pos` heading along `direction`
    pub fn launch(&mut self, pos: Vec2, direction: Vec2) {
        self.pos = pos;
        self.direction = direction.normalize_or(Vec2::X);
        self.vel = self.direction * self.speed;
        self.moving = true;
        self.active = true;
        self.colliding = false;
        self.hit_ship = false;
    }

    /// Move by one step; reports whether the asteroid drifted out of play
    pub fn integrate(&mut self, dt: f32, area: &PlayArea, margin: f32) -> EdgeAction {
        if !self.moving {
            return EdgeAction::Stay;
        }
        self.pos += self.vel * dt;
        asteroid_edge(area, self.pos, margin)
    }

    /// Stop and park off-world
    pub fn deactivate(&mut self, parked_at: Vec2) {
        self.moving = false;
        self.active = false;
        self.colliding = false;
        self.hit_ship = false;
        self.vel = Vec2::ZERO;
        self.pos = parked_at;
    }
}

impl Collidable for Asteroid {
    fn bounds(&self) -> Bounds {
        Bounds::new(self.pos, self.half_extents)
    }

    fn is_collidable(&self) -> bool {
        self.moving
    }
}

/// A projectile entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub direction: Vec2,
    pub speed: f32,
    pub half_extents: Vec2,
    /// In flight and eligible for collisions
    pub fired: bool,
    /// Handed out by the pool (may be true briefly before firing)
    pub active: bool,
    pub colliding: bool,
}

impl Projectile {
    pub fn new(id: u32, config: &ProjectileConfig, parked_at: Vec2) -> Self {
        Self {
            id,
            pos: parked_at,
            vel: Vec2::ZERO,
            direction: Vec2::Y,
            speed: config.speed,
            half_extents: config.half_extents,
            fired: false,
            active: false,
            colliding: false,
        }
    }

    pub fn rotation(&self) -> f32 {
        facing_angle(self.direction)
    }

    /// Launch from `pos` along `direction`
    pub fn fire(&mut self, direction: Vec2, pos: Vec2) {
        self.pos = pos;
        self.direction = direction.normalize_or(Vec2::Y);
        self.vel = self.direction * self.speed;
        self.fired = true;
        self.active = true;
        self.colliding = false;
    }

    pub fn integrate(&mut self, dt: f32, area: &PlayArea) -> EdgeAction {
        if !self.fired {
            return EdgeAction::Stay;
        }
        self.pos += self.vel * dt;
        projectile_edge(area, self.pos)
    }

    pub fn deactivate(&mut self, parked_at: Vec2) {
        self.fired = false;
        self.active = false;
        self.colliding = false;
        self.vel = Vec2::ZERO;
        self.pos = parked_at;
    }
}

impl Collidable for Projectile {
    fn bounds(&self) -> Bounds {
        Bounds::new(self.pos, self.half_extents)
    }

    fn is_collidable(&self) -> bool {
        self.fired
    }
}

/// Why an asteroid left play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DespawnCause {
    /// Drifted past the play area
    LeftArea,
    /// Ran into the ship
    HitShip,
    /// Shot by a projectile
    HitProjectile,
}

impl DespawnCause {
    pub fn is_bullet_hit(&self) -> bool {
        *self == DespawnCause::HitProjectile
    }
}

/// Things that happened during a tick, for render/audio collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    AsteroidSpawned { id: u32, variant: u8 },
    AsteroidSplit { parent: u32, children: Vec<u32> },
    AsteroidDespawned { id: u32, child: bool, cause: DespawnCause },
    ProjectileFired { id: u32 },
    /// The pool was empty and a new projectile had to be built
    ProjectilePoolOverflow { id: u32 },
    ProjectileDespawned { id: u32 },
    ShipDamaged { health: u32 },
    ShipDestroyed,
    ScoreChanged { score: u64 },
    CollisionModeChanged { mode: CollisionMode },
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct GameState {
    pub config: SimConfig,
    /// Fixed for the session
    pub area: PlayArea,
    pub ship: Ship,
    /// Asteroid/projectile rosters, collision mode and score
    pub manager: CollisionManager,
    pub spawner: AsteroidSpawner,
    pub projectile_pool: ProjectileManager,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Events from the most recent tick
    pub events: Vec<GameEvent>,
    /// Shared random source for every draw in the simulation
    pub rng: Pcg32,
    pub ids: IdGen,
}

impl GameState {
    /// Build a session from config, using the configured camera for the play area
    pub fn new(config: SimConfig) -> Self {
        let area = PlayArea::from_camera(config.camera_size, config.camera_aspect);
        Self::with_area(config, area)
    }

    /// Build a session with an explicit play area
    pub fn with_area(config: SimConfig, area: PlayArea) -> Self {
        let mut ids = IdGen::default();
        let mut manager = CollisionManager::new(config.collision_mode);
        let spawner = AsteroidSpawner::new(config.asteroids.clone(), area, &mut manager, &mut ids);
        let projectile_pool =
            ProjectileManager::new(config.projectiles.clone(), area, &mut manager, &mut ids);

        log::info!(
            "Session started: seed={}, area={}x{}, mode={}",
            config.seed,
            area.half_width * 2.0,
            area.half_height * 2.0,
            config.collision_mode.as_str()
        );

        Self {
            ship: Ship::new(config.ship.clone()),
            rng: Pcg32::seed_from_u64(config.seed),
            config,
            area,
            manager,
            spawner,
            projectile_pool,
            time_ticks: 0,
            events: Vec::new(),
            ids,
        }
    }

    pub fn score(&self) -> u64 {
        self.manager.score()
    }

    /// Lives left on the ship
    pub fn health(&self) -> u32 {
        self.ship.health
    }

    pub fn collision_mode(&self) -> CollisionMode {
        self.manager.mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area() -> PlayArea {
        PlayArea::new(8.0, 4.5)
    }

    #[test]
    fn test_ship_thrust_is_clamped() {
        let mut ship = Ship::new(ShipConfig::default());
        let controls = ShipControls {
            turn: 0.0,
            thrust: 1.0,
        };
        for _ in 0..600 {
            ship.update(1.0 / 60.0, &controls, &area());
        }
        assert!(ship.vel.length() <= ship.tuning.max_speed + 1e-4);
        assert!(ship.vel.length() > 0.0);
    }

    #[test]
    fn test_ship_coasting_decays_to_zero() {
        let mut ship = Ship::new(ShipConfig::default());
        ship.vel = Vec2::new(1.0, 0.0);
        let before = ship.vel.length();
        ship.update(0.1, &ShipControls::default(), &area());
        let after = ship.vel.length();
        assert!((after - before * (1.0 - ship.tuning.deceleration * 0.1)).abs() < 1e-5);

        // Below the minimum speed the ship stops dead
        ship.vel = Vec2::new(ship.tuning.min_speed * 0.5, 0.0);
        ship.update(0.01, &ShipControls::default(), &area());
        assert_eq!(ship.vel, Vec2::ZERO);
    }

    #[test]
    fn test_ship_turns_clockwise_on_positive_axis() {
        let mut ship = Ship::new(ShipConfig::default());
        ship.direction = Vec2::Y;
        let controls = ShipControls {
            turn: 1.0,
            thrust: 0.0,
        };
        ship.update(0.1, &controls, &area());
        // Turning right from +Y swings toward +X
        assert!(ship.direction.x > 0.0);
        assert!((ship.direction.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_ship_wraps() {
        let mut ship = Ship::new(ShipConfig::default());
        ship.pos = Vec2::new(7.99, 0.0);
        ship.vel = Vec2::new(5.0, 0.0);
        let controls = ShipControls {
            turn: 0.0,
            thrust: 1.0,
        };
        ship.update(0.1, &controls, &area());
        assert!((ship.pos.x - (-8.0 + ship.tuning.wrap_margin)).abs() < 1e-5);
        // Velocity survives the wrap
        assert!((ship.vel.x - ship.tuning.max_speed).abs() < 1e-4);
    }

    #[test]
    fn test_ship_damage_and_invincibility() {
        let mut ship = Ship::new(ShipConfig::default());
        let start = ship.health;

        assert_eq!(
            ship.damage(&area()),
            DamageOutcome::Damaged { health: start - 1 }
        );
        // Second hit inside the invincibility window is swallowed
        assert_eq!(ship.damage(&area()), DamageOutcome::Ignored);
        assert_eq!(ship.health, start - 1);
        assert!(ship.is_flashing());

        // Let the timer run out
        ship.update(ship.tuning.invincibility_time + 0.01, &ShipControls::default(), &area());
        assert!(!ship.is_invincible());
        assert_eq!(
            ship.damage(&area()),
            DamageOutcome::Damaged { health: start - 2 }
        );
    }

    #[test]
    fn test_ship_destroyed_is_terminal() {
        let tuning = ShipConfig {
            max_health: 1,
            ..ShipConfig::default()
        };
        let mut ship = Ship::new(tuning);
        assert_eq!(ship.damage(&area()), DamageOutcome::Destroyed);
        assert!(ship.destroyed);
        assert!(!ship.is_collidable());
        assert!(area().is_outside(ship.pos, 0.0));

        // No more movement or firing
        let parked = ship.pos;
        ship.fire_cooldown = -1.0;
        let controls = ShipControls {
            turn: 1.0,
            thrust: 1.0,
        };
        ship.update(0.5, &controls, &area());
        assert_eq!(ship.pos, parked);
        assert!(!ship.can_fire());
        assert_eq!(ship.damage(&area()), DamageOutcome::Ignored);
    }

    #[test]
    fn test_child_origin_is_fixed() {
        let config = AsteroidConfig::default();
        let child = Asteroid::new_child(9, &config, Vec2::ZERO, Vec2::X, 0);
        assert!(child.is_child());
        assert_eq!(child.pool_index(), None);
        assert!(child.moving);
        assert_eq!(child.vel, Vec2::X * config.speed);

        let parent = Asteroid::new_pooled(1, 4, &config, area().off_world());
        assert!(!parent.is_child());
        assert_eq!(parent.pool_index(), Some(4));
        assert!(!parent.is_collidable());
    }

    #[test]
    fn test_asteroid_boundary_scenario() {
        let config = AsteroidConfig::default();
        let mut asteroid = Asteroid::new_pooled(1, 0, &config, area().off_world());
        asteroid.launch(Vec2::new(9.5, 0.0), Vec2::X);
        assert_eq!(asteroid.integrate(1.0 / 60.0, &area(), 1.0), EdgeAction::Despawn);
    }

    #[test]
    fn test_projectile_fire_and_exit() {
        let config = ProjectileConfig::default();
        let mut bullet = Projectile::new(1, &config, area().off_world());
        assert!(!bullet.is_collidable());

        bullet.fire(Vec2::X, Vec2::new(7.9, 0.0));
        assert!(bullet.fired);
        assert_eq!(bullet.vel, Vec2::X * config.speed);
        assert!((bullet.rotation() + std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert_eq!(bullet.integrate(0.1, &area()), EdgeAction::Despawn);
    }

    #[test]
    fn test_ids_are_unique() {
        let mut ids = IdGen::default();
        let a = ids.next_id();
        let b = ids.next_id();
        assert_ne!(a, b);
    }
}
