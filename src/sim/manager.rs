//! Collision roster and broad-phase detection
//!
//! Detection never mutates gameplay state beyond the per-entity
//! `colliding`/`hit_ship` flags. It returns a `CollisionReport` which the
//! tick applies in one pass afterwards, so resolution order doesn't depend on
//! roster order.

use serde::{Deserialize, Serialize};

use super::collision::test_pair;
use super::state::{Asteroid, Projectile, Ship};
use crate::config::CollisionMode;

/// What an asteroid was hit by this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitBy {
    Ship,
    Projectile,
}

/// One entity that needs its collision outcome applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    /// The ship overlapped at least one asteroid
    Ship,
    Asteroid { id: u32, hit_by: HitBy },
    Projectile { id: u32 },
}

/// Outcome buffer for a single tick
///
/// Contacts are ordered ship first, then asteroids, then projectiles, and
/// each entity appears at most once.
#[derive(Debug, Clone, Default)]
pub struct CollisionReport {
    pub contacts: Vec<Contact>,
}

impl CollisionReport {
    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    pub fn ship_hit(&self) -> bool {
        self.contacts.iter().any(|c| matches!(c, Contact::Ship))
    }
}

/// Owns the live asteroid and projectile rosters plus the score
#[derive(Debug, Clone)]
pub struct CollisionManager {
    pub mode: CollisionMode,
    asteroids: Vec<Asteroid>,
    projectiles: Vec<Projectile>,
    score: u64,
}

impl CollisionManager {
    pub fn new(mode: CollisionMode) -> Self {
        Self {
            mode,
            asteroids: Vec::new(),
            projectiles: Vec::new(),
            score: 0,
        }
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    /// Add to the score; never goes down
    pub fn increase_score(&mut self, amount: u64) {
        self.score = self.score.saturating_add(amount);
    }

    pub fn toggle_mode(&mut self) -> CollisionMode {
        self.mode = self.mode.toggled();
        log::debug!("Collision mode: {}", self.mode.as_str());
        self.mode
    }

    pub fn asteroids(&self) -> &[Asteroid] {
        &self.asteroids
    }

    pub fn asteroids_mut(&mut self) -> &mut [Asteroid] {
        &mut self.asteroids
    }

    pub fn asteroid(&self, id: u32) -> Option<&Asteroid> {
        self.asteroids.iter().find(|a| a.id == id)
    }

    pub fn asteroid_mut(&mut self, id: u32) -> Option<&mut Asteroid> {
        self.asteroids.iter_mut().find(|a| a.id == id)
    }

    pub fn add_asteroid(&mut self, asteroid: Asteroid) {
        self.asteroids.push(asteroid);
    }

    /// Drop an asteroid from the roster; unknown IDs are ignored
    pub fn remove_asteroid(&mut self, id: u32) -> Option<Asteroid> {
        let idx = self.asteroids.iter().position(|a| a.id == id)?;
        Some(self.asteroids.remove(idx))
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub fn projectiles_mut(&mut self) -> &mut [Projectile] {
        &mut self.projectiles
    }

    pub fn projectile(&self, id: u32) -> Option<&Projectile> {
        self.projectiles.iter().find(|p| p.id == id)
    }

    pub fn projectile_mut(&mut self, id: u32) -> Option<&mut Projectile> {
        self.projectiles.iter_mut().find(|p| p.id == id)
    }

    pub fn add_projectile(&mut self, projectile: Projectile) {
        self.projectiles.push(projectile);
    }

    /// Moving asteroids still in the roster
    pub fn live_asteroid_count(&self) -> usize {
        self.asteroids.iter().filter(|a| a.moving).count()
    }

    /// Run the broad phase for this tick
    ///
    /// Ship-vs-asteroid runs first; an asteroid touching the ship is reported
    /// as a ship hit even if a projectile overlaps it as well. A projectile's
    /// flag is the OR over every asteroid it overlaps.
    pub fn detect(&mut self, ship: &mut Ship) -> CollisionReport {
        let mode = self.mode;
        let mut ship_hit = false;

        for asteroid in &mut self.asteroids {
            let hit = asteroid.moving && test_pair(mode, &*ship, &*asteroid);
            asteroid.colliding = hit;
            asteroid.hit_ship = hit;
            ship_hit |= hit;
        }

        let mut asteroid_shot = vec![false; self.asteroids.len()];
        let mut projectile_hit = vec![false; self.projectiles.len()];

        for (i, asteroid) in self.asteroids.iter().enumerate() {
            if !asteroid.moving {
                continue;
            }
            for (j, projectile) in self.projectiles.iter().enumerate() {
                if test_pair(mode, asteroid, projectile) {
                    asteroid_shot[i] = true;
                    projectile_hit[j] = true;
                }
            }
        }

        let mut report = CollisionReport::default();
        ship.colliding = ship_hit;
        if ship_hit {
            report.contacts.push(Contact::Ship);
        }

        for (asteroid, shot) in self.asteroids.iter_mut().zip(asteroid_shot) {
            if !asteroid.colliding {
                asteroid.colliding = shot;
            }
            if asteroid.colliding {
                let hit_by = if asteroid.hit_ship {
                    HitBy::Ship
                } else {
                    HitBy::Projectile
                };
                report.contacts.push(Contact::Asteroid {
                    id: asteroid.id,
                    hit_by,
                });
            }
        }

        for (projectile, hit) in self.projectiles.iter_mut().zip(projectile_hit) {
            projectile.colliding = hit;
            if hit {
                report.contacts.push(Contact::Projectile { id: projectile.id });
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AsteroidConfig, ProjectileConfig, ShipConfig};
    use glam::Vec2;

    const PARK: Vec2 = Vec2::new(100.0, 100.0);

    fn asteroid_at(id: u32, pos: Vec2) -> Asteroid {
        let mut a = Asteroid::new_pooled(id, id as usize, &AsteroidConfig::default(), PARK);
        a.launch(pos, Vec2::X);
        a
    }

    fn bullet_at(id: u32, pos: Vec2) -> Projectile {
        let mut p = Projectile::new(id, &ProjectileConfig::default(), PARK);
        p.fire(Vec2::Y, pos);
        p
    }

    fn ship_at(pos: Vec2) -> Ship {
        let mut ship = Ship::new(ShipConfig::default());
        ship.pos = pos;
        ship
    }

    #[test]
    fn test_remove_unknown_asteroid_is_noop() {
        let mut manager = CollisionManager::new(CollisionMode::Aabb);
        manager.add_asteroid(asteroid_at(1, Vec2::ZERO));
        assert!(manager.remove_asteroid(42).is_none());
        assert_eq!(manager.asteroids().len(), 1);
        assert!(manager.remove_asteroid(1).is_some());
        assert!(manager.remove_asteroid(1).is_none());
    }

    #[test]
    fn test_ship_hit_takes_precedence() {
        for mode in [CollisionMode::Aabb, CollisionMode::Circle] {
            let mut manager = CollisionManager::new(mode);
            manager.add_asteroid(asteroid_at(1, Vec2::ZERO));
            manager.add_projectile(bullet_at(2, Vec2::new(0.1, 0.1)));
            let mut ship = ship_at(Vec2::new(-0.2, 0.0));

            let report = manager.detect(&mut ship);
            assert_eq!(
                report.contacts,
                vec![
                    Contact::Ship,
                    Contact::Asteroid {
                        id: 1,
                        hit_by: HitBy::Ship
                    },
                    Contact::Projectile { id: 2 },
                ]
            );
            assert!(ship.colliding);
        }
    }

    #[test]
    fn test_projectile_flag_is_or_over_asteroids() {
        let mut manager = CollisionManager::new(CollisionMode::Aabb);
        manager.add_asteroid(asteroid_at(1, Vec2::new(3.0, 0.0)));
        manager.add_asteroid(asteroid_at(2, Vec2::new(3.8, 0.0)));
        manager.add_asteroid(asteroid_at(3, Vec2::new(-3.0, 0.0)));
        manager.add_projectile(bullet_at(10, Vec2::new(3.4, 0.0)));
        let mut ship = ship_at(Vec2::new(0.0, 3.0));

        let report = manager.detect(&mut ship);
        assert!(!report.ship_hit());
        assert_eq!(
            report.contacts,
            vec![
                Contact::Asteroid {
                    id: 1,
                    hit_by: HitBy::Projectile
                },
                Contact::Asteroid {
                    id: 2,
                    hit_by: HitBy::Projectile
                },
                Contact::Projectile { id: 10 },
            ]
        );
        assert!(!manager.asteroid(3).map(|a| a.colliding).unwrap_or(true));
    }

    #[test]
    fn test_idle_entities_are_skipped() {
        let mut manager = CollisionManager::new(CollisionMode::Circle);
        let mut parked = asteroid_at(1, Vec2::ZERO);
        parked.deactivate(Vec2::ZERO); // parked right on top of everything
        manager.add_asteroid(parked);

        let mut idle_bullet = bullet_at(2, Vec2::ZERO);
        idle_bullet.deactivate(Vec2::ZERO);
        manager.add_projectile(idle_bullet);

        manager.add_asteroid(asteroid_at(3, Vec2::new(5.0, 0.0)));
        let mut unfired = bullet_at(4, Vec2::new(5.0, 0.0));
        unfired.fired = false;
        manager.add_projectile(unfired);

        let mut ship = ship_at(Vec2::ZERO);
        let report = manager.detect(&mut ship);
        assert!(report.is_empty());
        assert!(!ship.colliding);
    }

    #[test]
    fn test_destroyed_ship_never_collides() {
        let mut manager = CollisionManager::new(CollisionMode::Aabb);
        manager.add_asteroid(asteroid_at(1, Vec2::ZERO));
        let mut ship = ship_at(Vec2::ZERO);
        ship.destroyed = true;
        assert!(manager.detect(&mut ship).is_empty());
    }

    #[test]
    fn test_score_is_monotonic() {
        let mut manager = CollisionManager::new(CollisionMode::Aabb);
        manager.increase_score(20);
        manager.increase_score(0);
        manager.increase_score(u64::MAX);
        assert_eq!(manager.score(), u64::MAX);
    }
}
