//! Read-only view of a tick for renderers and debug output

use glam::Vec2;
use serde::Serialize;

use super::state::GameState;
use crate::config::CollisionMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EntityKind {
    Ship,
    Asteroid,
    ChildAsteroid,
    Projectile,
}

/// Everything needed to draw one entity
#[derive(Debug, Clone, Serialize)]
pub struct EntityView {
    pub id: u32,
    pub kind: EntityKind,
    pub position: Vec2,
    /// Sprite rotation in radians (0 = facing +Y)
    pub rotation: f32,
    pub half_extents: Vec2,
    pub active: bool,
    /// Drives the red/green debug tint
    pub colliding: bool,
    /// Sprite variant (asteroids only)
    pub variant: u8,
    /// Hit flash (ship only)
    pub flashing: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub score: u64,
    pub health: u32,
    pub ship_destroyed: bool,
    pub collision_mode: CollisionMode,
    /// Ship first, then asteroids and projectiles in roster order
    pub entities: Vec<EntityView>,
}

impl Snapshot {
    pub fn capture(state: &GameState) -> Self {
        let asteroids = state.manager.asteroids();
        let projectiles = state.manager.projectiles();
        let mut entities = Vec::with_capacity(1 + asteroids.len() + projectiles.len());

        let ship = &state.ship;
        entities.push(EntityView {
            id: 0,
            kind: EntityKind::Ship,
            position: ship.pos,
            rotation: ship.rotation(),
            half_extents: ship.tuning.half_extents,
            active: ship.is_active(),
            colliding: ship.colliding,
            variant: 0,
            flashing: ship.is_flashing(),
        });

        entities.extend(asteroids.iter().map(|a| EntityView {
            id: a.id,
            kind: if a.is_child() {
                EntityKind::ChildAsteroid
            } else {
                EntityKind::Asteroid
            },
            position: a.pos,
            rotation: a.rotation(),
            half_extents: a.half_extents,
            active: a.active,
            colliding: a.colliding,
            variant: a.variant,
            flashing: false,
        }));

        entities.extend(projectiles.iter().map(|p| EntityView {
            id: p.id,
            kind: EntityKind::Projectile,
            position: p.pos,
            rotation: p.rotation(),
            half_extents: p.half_extents,
            active: p.active,
            colliding: p.colliding,
            variant: 0,
            flashing: false,
        }));

        Self {
            tick: state.time_ticks,
            score: state.score(),
            health: state.health(),
            ship_destroyed: state.ship.destroyed,
            collision_mode: state.collision_mode(),
            entities,
        }
    }

    /// Entities currently visible
    pub fn visible(&self) -> impl Iterator<Item = &EntityView> {
        self.entities.iter().filter(|e| e.active)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;

    #[test]
    fn test_capture_fresh_state() {
        let state = GameState::new(SimConfig::default());
        let snap = Snapshot::capture(&state);

        let config = &state.config;
        assert_eq!(
            snap.entities.len(),
            1 + config.asteroids.pool_size + config.projectiles.pool_size
        );
        assert_eq!(snap.entities[0].kind, EntityKind::Ship);
        assert_eq!(snap.health, config.ship.max_health);
        assert_eq!(snap.score, 0);
        // Only the ship is visible before anything spawns
        assert_eq!(snap.visible().count(), 1);
    }

    #[test]
    fn test_capture_marks_children_and_flash() {
        let mut state = GameState::new(SimConfig::default());
        let id = state
            .spawner
            .launch_next_at(&mut state.manager, Vec2::new(0.0, 3.0), Vec2::X)
            .expect("pool not empty");
        let outcome = state
            .spawner
            .despawn_asteroid(&mut state.manager, &mut state.ids, &mut state.rng, id, true)
            .expect("was live");
        state.ship.damage(&state.area);

        let snap = Snapshot::capture(&state);
        assert!(snap.entities[0].flashing);
        let children: Vec<_> = snap
            .entities
            .iter()
            .filter(|e| e.kind == EntityKind::ChildAsteroid)
            .map(|e| e.id)
            .collect();
        assert_eq!(children, outcome.children);
        assert_eq!(snap.score, 20);
    }

    #[test]
    fn test_json_has_expected_fields() {
        let state = GameState::new(SimConfig::default());
        let json = Snapshot::capture(&state).to_json().expect("serializes");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(value["collision_mode"], "Aabb");
        assert_eq!(value["entities"][0]["kind"], "Ship");
        assert!(value["entities"][0]["position"].is_array());
    }
}
