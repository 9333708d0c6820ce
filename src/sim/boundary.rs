//! Play-area boundary rules
//!
//! The ship wraps to the opposite edge; asteroids and projectiles leave the
//! play area and despawn. Asteroids get a margin so they can drift fully
//! off screen first, projectiles don't.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Rectangular play area centred on the origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayArea {
    pub half_width: f32,
    pub half_height: f32,
}

impl PlayArea {
    pub fn new(half_width: f32, half_height: f32) -> Self {
        Self {
            half_width,
            half_height,
        }
    }

    /// Derive the area from an orthographic camera (size = half the visible height)
    pub fn from_camera(orthographic_size: f32, aspect: f32) -> Self {
        let height = orthographic_size * 2.0;
        let width = height * aspect;
        Self::new(width / 2.0, height / 2.0)
    }

    /// Parking spot for inactive entities, well outside anything that moves
    pub fn off_world(&self) -> Vec2 {
        Vec2::new(self.half_width * 4.0, self.half_height * 4.0)
    }

    /// True if either coordinate is past the area grown by `margin`
    pub fn is_outside(&self, pos: Vec2, margin: f32) -> bool {
        pos.x < -self.half_width - margin
            || pos.x > self.half_width + margin
            || pos.y < -self.half_height - margin
            || pos.y > self.half_height + margin
    }

    /// Teleport a position that crossed an edge to just inside the opposite edge
    ///
    /// Axes are handled independently; an in-bounds coordinate is untouched.
    pub fn wrap(&self, mut pos: Vec2, margin: f32) -> Vec2 {
        if pos.x < -self.half_width {
            pos.x = self.half_width - margin;
        } else if pos.x > self.half_width {
            pos.x = -self.half_width + margin;
        }

        if pos.y < -self.half_height {
            pos.y = self.half_height - margin;
        } else if pos.y > self.half_height {
            pos.y = -self.half_height + margin;
        }
        pos
    }
}

/// What the boundary did to an entity this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeAction {
    /// Still inside (or wrapped back inside)
    Stay,
    /// Left the play area and must despawn
    Despawn,
}

/// Ship rule: always wraps
pub fn apply_ship_edge(area: &PlayArea, pos: Vec2, margin: f32) -> Vec2 {
    area.wrap(pos, margin)
}

/// Asteroid rule: despawn once past the area plus `margin`
pub fn asteroid_edge(area: &PlayArea, pos: Vec2, margin: f32) -> EdgeAction {
    if area.is_outside(pos, margin) {
        EdgeAction::Despawn
    } else {
        EdgeAction::Stay
    }
}

/// Projectile rule: despawn as soon as it leaves the area
pub fn projectile_edge(area: &PlayArea, pos: Vec2) -> EdgeAction {
    if area.is_outside(pos, 0.0) {
        EdgeAction::Despawn
    } else {
        EdgeAction::Stay
    }
}
