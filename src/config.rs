//! Simulation tuning and session configuration
//!
//! Everything here is plain data with sensible defaults so a partial JSON
//! file only needs to list the values it changes.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Broad-phase test used by the collision manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CollisionMode {
    /// Axis-aligned bounding boxes
    #[default]
    Aabb,
    /// Bounding circles
    Circle,
}

impl CollisionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollisionMode::Aabb => "AABB",
            CollisionMode::Circle => "Circle",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "aabb" | "box" => Some(CollisionMode::Aabb),
            "circle" | "sphere" => Some(CollisionMode::Circle),
            _ => None,
        }
    }

    /// The other mode
    pub fn toggled(&self) -> Self {
        match self {
            CollisionMode::Aabb => CollisionMode::Circle,
            CollisionMode::Circle => CollisionMode::Aabb,
        }
    }
}

/// Ship handling
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipConfig {
    pub max_health: u32,
    /// Seconds of invulnerability after a hit
    pub invincibility_time: f32,
    /// Thrust acceleration (units/s²)
    pub acceleration: f32,
    /// Velocity decay rate when not thrusting (1/s)
    pub deceleration: f32,
    /// Turn rate (degrees/s)
    pub turn_speed: f32,
    pub max_speed: f32,
    /// Speeds below this snap to zero while coasting
    pub min_speed: f32,
    /// Seconds between shots
    pub fire_delay: f32,
    /// Inset applied when wrapping to the opposite edge
    pub wrap_margin: f32,
    pub half_extents: Vec2,
}

impl Default for ShipConfig {
    fn default() -> Self {
        Self {
            max_health: SHIP_MAX_HEALTH,
            invincibility_time: SHIP_INVINCIBILITY_TIME,
            acceleration: SHIP_ACCELERATION,
            deceleration: SHIP_DECELERATION,
            turn_speed: SHIP_TURN_SPEED,
            max_speed: SHIP_MAX_SPEED,
            min_speed: SHIP_MIN_SPEED,
            fire_delay: SHIP_FIRE_DELAY,
            wrap_margin: SHIP_WRAP_MARGIN,
            half_extents: Vec2::from(SHIP_HALF_EXTENTS),
        }
    }
}

/// Asteroid spawning, splitting and scoring
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AsteroidConfig {
    pub speed: f32,
    /// Number of parent asteroids created at startup
    pub pool_size: usize,
    /// Seconds between spawn attempts
    pub spawn_interval: f32,
    /// Distance past the play area before an asteroid despawns
    pub despawn_margin: f32,
    pub edge_inset: f32,
    pub edge_margin: f32,
    /// Maximum deflection (degrees) of a child from its parent's heading
    pub split_angle: f32,
    pub split_count: usize,
    pub variants: u8,
    pub parent_score: u64,
    pub child_score: u64,
    pub half_extents: Vec2,
    pub child_half_extents: Vec2,
}

impl Default for AsteroidConfig {
    fn default() -> Self {
        Self {
            speed: ASTEROID_SPEED,
            pool_size: ASTEROID_POOL_SIZE,
            spawn_interval: ASTEROID_SPAWN_INTERVAL,
            despawn_margin: ASTEROID_DESPAWN_MARGIN,
            edge_inset: ASTEROID_EDGE_INSET,
            edge_margin: ASTEROID_EDGE_MARGIN,
            split_angle: ASTEROID_SPLIT_ANGLE,
            split_count: ASTEROID_SPLIT_COUNT,
            variants: ASTEROID_VARIANTS,
            parent_score: PARENT_ASTEROID_SCORE,
            child_score: CHILD_ASTEROID_SCORE,
            half_extents: Vec2::from(ASTEROID_HALF_EXTENTS),
            child_half_extents: Vec2::from(CHILD_ASTEROID_HALF_EXTENTS),
        }
    }
}

/// Projectile pool and flight
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileConfig {
    pub speed: f32,
    /// Target pool size (soft cap)
    pub pool_size: usize,
    pub half_extents: Vec2,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            speed: PROJECTILE_SPEED,
            pool_size: PROJECTILE_POOL_SIZE,
            half_extents: Vec2::from(PROJECTILE_HALF_EXTENTS),
        }
    }
}

/// Complete session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Camera orthographic size (half the visible height)
    pub camera_size: f32,
    /// Camera width / height
    pub camera_aspect: f32,
    pub collision_mode: CollisionMode,
    pub ship: ShipConfig,
    pub asteroids: AsteroidConfig,
    pub projectiles: ProjectileConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 0x5eed,
            camera_size: CAMERA_ORTHOGRAPHIC_SIZE,
            camera_aspect: CAMERA_ASPECT,
            collision_mode: CollisionMode::Aabb,
            ship: ShipConfig::default(),
            asteroids: AsteroidConfig::default(),
            projectiles: ProjectileConfig::default(),
        }
    }
}

impl SimConfig {
    /// Default config with a specific seed
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load a config file, falling back to defaults if it can't be read or parsed
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(config) => {
                    log::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    log::warn!("Invalid config {}: {} - using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Can't read config {}: {} - using defaults", path.display(), e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collision_mode_from_str() {
        assert_eq!(CollisionMode::from_str("AABB"), Some(CollisionMode::Aabb));
        assert_eq!(CollisionMode::from_str("circle"), Some(CollisionMode::Circle));
        assert_eq!(CollisionMode::from_str("hexagon"), None);
        assert_eq!(CollisionMode::Aabb.toggled(), CollisionMode::Circle);
        assert_eq!(CollisionMode::Circle.toggled().as_str(), "AABB");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = SimConfig::from_json(r#"{ "seed": 7, "asteroids": { "pool_size": 3 } }"#)
            .expect("valid config");
        assert_eq!(config.seed, 7);
        assert_eq!(config.asteroids.pool_size, 3);
        assert_eq!(config.asteroids.child_score, CHILD_ASTEROID_SCORE);
        assert_eq!(config.ship.max_health, SHIP_MAX_HEALTH);
        assert_eq!(config.collision_mode, CollisionMode::Aabb);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(SimConfig::from_json("{ seed: }").is_err());
    }

    #[test]
    fn test_missing_file_falls_back() {
        let config = SimConfig::load_or_default("/definitely/not/here.json");
        assert_eq!(config.seed, SimConfig::default().seed);
    }
}
