//! Asteroid Split - simulation core for a top-down asteroid shooter
//!
//! Core modules:
//! - `sim`: Fixed-step simulation (motion, wrap/despawn, collisions, pools)
//! - `config`: Data-driven tuning loaded from JSON

pub mod config;
pub mod sim;

pub use config::{AsteroidConfig, CollisionMode, ProjectileConfig, ShipConfig, SimConfig};

use glam::Vec2;
use rand::Rng;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Default camera (orthographic size 4.5 at 16:9 gives a 16 x 9 play area)
    pub const CAMERA_ORTHOGRAPHIC_SIZE: f32 = 4.5;
    pub const CAMERA_ASPECT: f32 = 16.0 / 9.0;

    /// Ship defaults
    pub const SHIP_MAX_HEALTH: u32 = 3;
    pub const SHIP_INVINCIBILITY_TIME: f32 = 2.0;
    pub const SHIP_ACCELERATION: f32 = 6.0;
    pub const SHIP_DECELERATION: f32 = 0.8;
    pub const SHIP_TURN_SPEED: f32 = 180.0; // degrees per second
    pub const SHIP_MAX_SPEED: f32 = 5.0;
    pub const SHIP_MIN_SPEED: f32 = 0.01;
    pub const SHIP_FIRE_DELAY: f32 = 0.25;
    pub const SHIP_WRAP_MARGIN: f32 = 0.2;
    pub const SHIP_HALF_EXTENTS: (f32, f32) = (0.35, 0.45);

    /// Asteroid defaults
    pub const ASTEROID_SPEED: f32 = 2.0;
    pub const ASTEROID_POOL_SIZE: usize = 10;
    pub const ASTEROID_SPAWN_INTERVAL: f32 = 1.5;
    pub const ASTEROID_DESPAWN_MARGIN: f32 = 1.0;
    /// Distance from the chosen edge where a spawned asteroid appears
    pub const ASTEROID_EDGE_INSET: f32 = 0.2;
    /// Keep-out distance from the corners along the spawn edge
    pub const ASTEROID_EDGE_MARGIN: f32 = 1.0;
    pub const ASTEROID_SPLIT_ANGLE: f32 = 35.0; // degrees
    pub const ASTEROID_SPLIT_COUNT: usize = 2;
    pub const ASTEROID_VARIANTS: u8 = 3;
    pub const ASTEROID_HALF_EXTENTS: (f32, f32) = (0.5, 0.5);
    pub const CHILD_ASTEROID_HALF_EXTENTS: (f32, f32) = (0.3, 0.3);

    /// Score awards
    pub const PARENT_ASTEROID_SCORE: u64 = 20;
    pub const CHILD_ASTEROID_SCORE: u64 = 50;

    /// Projectile defaults
    pub const PROJECTILE_SPEED: f32 = 8.0;
    pub const PROJECTILE_POOL_SIZE: usize = 10;
    pub const PROJECTILE_HALF_EXTENTS: (f32, f32) = (0.05, 0.15);
}

/// Rotate a direction counter-clockwise by `degrees`
#[inline]
pub fn rotate_degrees(dir: Vec2, degrees: f32) -> Vec2 {
    Vec2::from_angle(degrees.to_radians()).rotate(dir)
}

/// Sprite rotation (radians) that points the sprite's up axis along `dir`
///
/// Zero-length directions keep the identity rotation.
#[inline]
pub fn facing_angle(dir: Vec2) -> f32 {
    if dir.length_squared() <= f32::EPSILON {
        return 0.0;
    }
    dir.y.atan2(dir.x) - std::f32::consts::FRAC_PI_2
}

/// Uniformly distributed unit vector
#[inline]
pub fn random_unit_vector<R: Rng + ?Sized>(rng: &mut R) -> Vec2 {
    let theta = rng.random_range(0.0..std::f32::consts::TAU);
    Vec2::from_angle(theta)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotate_degrees() {
        let up = rotate_degrees(Vec2::X, 90.0);
        assert!((up - Vec2::Y).length() < 1e-5);

        let down = rotate_degrees(Vec2::X, -90.0);
        assert!((down + Vec2::Y).length() < 1e-5);
    }

    #[test]
    fn test_facing_angle() {
        // Sprites face +Y at rest
        assert!(facing_angle(Vec2::Y).abs() < 1e-6);
        assert!((facing_angle(Vec2::X) + std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert_eq!(facing_angle(Vec2::ZERO), 0.0);
    }
}
