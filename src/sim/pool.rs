//! Object pools for asteroids and projectiles
//!
//! Both pools are FIFO queues of entity IDs; the entities themselves live in
//! the `CollisionManager` rosters. Recycle policies differ:
//! - parents go back to the asteroid pool, split children are destroyed
//! - projectiles always go back to their pool, which grows on demand

use std::collections::VecDeque;

use glam::Vec2;
use rand::Rng;

use super::boundary::PlayArea;
use super::manager::CollisionManager;
use super::state::{Asteroid, IdGen, Projectile};
use crate::config::{AsteroidConfig, ProjectileConfig};
use crate::{random_unit_vector, rotate_degrees};

/// Screen edge an asteroid enters from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnEdge {
    Top,
    Right,
    Bottom,
    Left,
}

impl SpawnEdge {
    pub const ALL: [SpawnEdge; 4] = [
        SpawnEdge::Top,
        SpawnEdge::Right,
        SpawnEdge::Bottom,
        SpawnEdge::Left,
    ];
}

/// What happened when an asteroid was despawned
#[derive(Debug, Clone, PartialEq)]
pub struct DespawnOutcome {
    pub id: u32,
    pub was_child: bool,
    pub bullet_hit: bool,
    pub score_awarded: u64,
    /// Children created by a split (empty unless a parent was shot)
    pub children: Vec<u32>,
}

/// Pool of parent asteroids plus the spawn timer
#[derive(Debug, Clone)]
pub struct AsteroidSpawner {
    pool: VecDeque<u32>,
    capacity: usize,
    spawn_timer: f32,
    live_count: usize,
    config: AsteroidConfig,
    area: PlayArea,
}

impl AsteroidSpawner {
    /// Build every parent up front, inactive, and register them with the roster
    pub fn new(
        config: AsteroidConfig,
        area: PlayArea,
        manager: &mut CollisionManager,
        ids: &mut IdGen,
    ) -> Self {
        let mut pool = VecDeque::with_capacity(config.pool_size);
        for index in 0..config.pool_size {
            let asteroid = Asteroid::new_pooled(ids.next_id(), index, &config, area.off_world());
            pool.push_back(asteroid.id);
            manager.add_asteroid(asteroid);
        }
        log::info!("Asteroid pool ready: {} parents", config.pool_size);

        Self {
            pool,
            capacity: config.pool_size,
            spawn_timer: config.spawn_interval,
            live_count: 0,
            config,
            area,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Parents currently waiting in the pool, front first
    pub fn pooled(&self) -> impl Iterator<Item = u32> + '_ {
        self.pool.iter().copied()
    }

    pub fn pooled_count(&self) -> usize {
        self.pool.len()
    }

    /// Parents currently in flight
    pub fn live_count(&self) -> usize {
        self.live_count
    }

    pub fn spawn_timer(&self) -> f32 {
        self.spawn_timer
    }

    /// Count down; when the timer has run out, launch the next pooled parent
    ///
    /// Returns the ID of the asteroid that was spawned, if any.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        manager: &mut CollisionManager,
        rng: &mut R,
    ) -> Option<u32> {
        if self.spawn_timer > 0.0 {
            self.spawn_timer -= dt;
            return None;
        }

        self.spawn_timer = self.config.spawn_interval;
        let id = self.pool.pop_front()?;
        match manager.asteroid_mut(id) {
            Some(asteroid) => {
                self.spawn_asteroid(asteroid, rng);
                Some(id)
            }
            None => {
                log::warn!("Pooled asteroid {} missing from roster", id);
                None
            }
        }
    }

    /// Activate an asteroid on a random screen edge with a random heading
    pub fn spawn_asteroid<R: Rng + ?Sized>(&mut self, asteroid: &mut Asteroid, rng: &mut R) {
        let edge = SpawnEdge::ALL[rng.random_range(0..SpawnEdge::ALL.len())];
        let pos = self.edge_position(edge, rng);
        asteroid.variant = if self.config.variants > 0 {
            rng.random_range(0..self.config.variants)
        } else {
            0
        };
        let direction = random_unit_vector(rng);
        asteroid.launch(pos, direction);
        self.live_count += 1;

        log::debug!(
            "Spawned asteroid {} on {:?} edge at ({:.2}, {:.2})",
            asteroid.id,
            edge,
            pos.x,
            pos.y
        );
    }

    /// Launch the next pooled parent from a chosen spot instead of a random edge
    pub fn launch_next_at(
        &mut self,
        manager: &mut CollisionManager,
        pos: Vec2,
        direction: Vec2,
    ) -> Option<u32> {
        let id = self.pool.pop_front()?;
        let asteroid = manager.asteroid_mut(id)?;
        asteroid.launch(pos, direction);
        self.live_count += 1;
        Some(id)
    }

    /// Random point just off (or just inside) the given edge
    fn edge_position<R: Rng + ?Sized>(&self, edge: SpawnEdge, rng: &mut R) -> Vec2 {
        let hw = self.area.half_width;
        let hh = self.area.half_height;
        let inset = self.config.edge_inset;
        let margin = self.config.edge_margin;

        match edge {
            SpawnEdge::Top => Vec2::new(edge_offset(rng, hw, margin), hh - inset),
            SpawnEdge::Right => Vec2::new(hw + inset, edge_offset(rng, hh, margin)),
            SpawnEdge::Bottom => Vec2::new(edge_offset(rng, hw, margin), -hh + inset),
            SpawnEdge::Left => Vec2::new(-hw - inset, edge_offset(rng, hh, margin)),
        }
    }

    /// Take an asteroid out of play
    ///
    /// Parents return to the back of the pool, children leave the roster
    /// for good. A projectile hit splits a parent and scores. Returns `None`
    /// if the asteroid is unknown or already idle.
    pub fn despawn_asteroid<R: Rng + ?Sized>(
        &mut self,
        manager: &mut CollisionManager,
        ids: &mut IdGen,
        rng: &mut R,
        id: u32,
        bullet_hit: bool,
    ) -> Option<DespawnOutcome> {
        let asteroid = manager.asteroid_mut(id)?;
        if !asteroid.moving {
            return None;
        }

        let was_child = asteroid.is_child();
        let last_pos = asteroid.pos;
        let last_dir = asteroid.direction;
        let variant = asteroid.variant;
        asteroid.deactivate(self.area.off_world());

        if was_child {
            manager.remove_asteroid(id);
        } else {
            self.pool.push_back(id);
            self.live_count = self.live_count.saturating_sub(1);
        }

        let mut children = Vec::new();
        let mut score_awarded = 0;
        if bullet_hit && !was_child {
            let spread = self.config.split_angle.abs();
            for _ in 0..self.config.split_count {
                let angle = if spread.is_finite() && spread > 0.0 {
                    rng.random_range(-spread..=spread)
                } else {
                    0.0
                };
                let child = Asteroid::new_child(
                    ids.next_id(),
                    &self.config,
                    last_pos,
                    rotate_degrees(last_dir, angle),
                    variant,
                );
                children.push(child.id);
                manager.add_asteroid(child);
            }
            score_awarded = self.config.parent_score;
            log::debug!("Asteroid {} split into {:?}", id, children);
        } else if bullet_hit {
            score_awarded = self.config.child_score;
        }
        manager.increase_score(score_awarded);

        Some(DespawnOutcome {
            id,
            was_child,
            bullet_hit,
            score_awarded,
            children,
        })
    }
}

/// Uniform offset along an edge, keeping `margin` clear of both corners
fn edge_offset<R: Rng + ?Sized>(rng: &mut R, half: f32, margin: f32) -> f32 {
    let span = half - margin;
    if span > 0.0 {
        rng.random_range(-span..span)
    } else {
        0.0
    }
}

/// Where a projectile handed out by the pool came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulletSource {
    Pooled,
    /// Pool was empty; a fresh projectile was built
    Allocated,
}

/// Soft-capped projectile pool
#[derive(Debug, Clone)]
pub struct ProjectileManager {
    pool: VecDeque<u32>,
    target_size: usize,
    overflow_count: usize,
    config: ProjectileConfig,
    area: PlayArea,
}

impl ProjectileManager {
    pub fn new(
        config: ProjectileConfig,
        area: PlayArea,
        manager: &mut CollisionManager,
        ids: &mut IdGen,
    ) -> Self {
        let mut pool = VecDeque::with_capacity(config.pool_size);
        for _ in 0..config.pool_size {
            let projectile = Projectile::new(ids.next_id(), &config, area.off_world());
            pool.push_back(projectile.id);
            manager.add_projectile(projectile);
        }

        Self {
            pool,
            target_size: config.pool_size,
            overflow_count: 0,
            config,
            area,
        }
    }

    /// Configured pool size (not a hard limit)
    pub fn target_size(&self) -> usize {
        self.target_size
    }

    pub fn pooled_count(&self) -> usize {
        self.pool.len()
    }

    /// Projectiles built beyond the initial pool
    pub fn overflow_count(&self) -> usize {
        self.overflow_count
    }

    /// Hand out an active projectile, building a new one if the pool is empty
    pub fn get_bullet(&mut self, manager: &mut CollisionManager, ids: &mut IdGen) -> (u32, BulletSource) {
        while let Some(id) = self.pool.pop_front() {
            if let Some(projectile) = manager.projectile_mut(id) {
                projectile.active = true;
                return (id, BulletSource::Pooled);
            }
            log::warn!("Pooled projectile {} missing from roster", id);
        }

        let mut projectile = Projectile::new(ids.next_id(), &self.config, self.area.off_world());
        projectile.active = true;
        let id = projectile.id;
        manager.add_projectile(projectile);
        self.overflow_count += 1;
        log::warn!(
            "Projectile pool empty, allocated projectile {} ({} beyond target {})",
            id,
            self.overflow_count,
            self.target_size
        );
        (id, BulletSource::Allocated)
    }

    /// Put a projectile back in the pool and deactivate it
    pub fn return_bullet(&mut self, manager: &mut CollisionManager, id: u32) {
        if let Some(projectile) = manager.projectile_mut(id) {
            projectile.deactivate(self.area.off_world());
        }
        if !self.pool.contains(&id) {
            self.pool.push_back(id);
        }
    }

    /// Take a handed-out projectile out of play; pooled ones are left alone
    pub fn despawn(&mut self, manager: &mut CollisionManager, id: u32) -> bool {
        match manager.projectile(id) {
            Some(projectile) if projectile.active || projectile.fired => {
                self.return_bullet(manager, id);
                true
            }
            _ => false,
        }
    }
}
