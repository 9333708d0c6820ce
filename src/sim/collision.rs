//! Broad-phase collision tests
//!
//! Every entity reduces to a `Bounds` (center + half extents) for the
//! frame. The two tests are interchangeable and selected by `CollisionMode`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::CollisionMode;

/// World-space bounds of an entity for one tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub center: Vec2,
    pub half_extents: Vec2,
}

impl Bounds {
    pub fn new(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            center,
            half_extents,
        }
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        self.center - self.half_extents
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.center + self.half_extents
    }

    /// Radius of the circle that encloses the box
    #[inline]
    pub fn radius(&self) -> f32 {
        self.half_extents.length()
    }

    /// Zero-size, negative or non-finite bounds can't collide with anything
    pub fn is_degenerate(&self) -> bool {
        !self.center.is_finite()
            || !self.half_extents.is_finite()
            || self.half_extents.x <= 0.0
            || self.half_extents.y <= 0.0
    }
}

/// Axis-aligned box overlap (touching edges count)
pub fn overlaps_aabb(a: &Bounds, b: &Bounds) -> bool {
    if a.is_degenerate() || b.is_degenerate() {
        return false;
    }
    let (a_min, a_max) = (a.min(), a.max());
    let (b_min, b_max) = (b.min(), b.max());
    a_min.x <= b_max.x && a_max.x >= b_min.x && a_min.y <= b_max.y && a_max.y >= b_min.y
}

/// Bounding circle overlap (touching circles don't count)
pub fn overlaps_circle(a: &Bounds, b: &Bounds) -> bool {
    if a.is_degenerate() || b.is_degenerate() {
        return false;
    }
    let reach = a.radius() + b.radius();
    // Squared comparison avoids the sqrt
    a.center.distance_squared(b.center) < reach * reach
}

/// Run the test selected by `mode`
#[inline]
pub fn overlaps(mode: CollisionMode, a: &Bounds, b: &Bounds) -> bool {
    match mode {
        CollisionMode::Aabb => overlaps_aabb(a, b),
        CollisionMode::Circle => overlaps_circle(a, b),
    }
}

/// Anything that can take part in a broad-phase test
pub trait Collidable {
    /// Current world-space bounds
    fn bounds(&self) -> Bounds;

    /// Whether the entity is currently eligible for collision tests
    fn is_collidable(&self) -> bool;
}

/// Test two entities, skipping any that aren't eligible this tick
pub fn test_pair<A: Collidable + ?Sized, B: Collidable + ?Sized>(
    mode: CollisionMode,
    a: &A,
    b: &B,
) -> bool {
    a.is_collidable() && b.is_collidable() && overlaps(mode, &a.bounds(), &b.bounds())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn unit(x: f32, y: f32) -> Bounds {
        Bounds::new(Vec2::new(x, y), Vec2::splat(0.5))
    }

    #[test]
    fn test_aabb_overlap_and_touch() {
        assert!(overlaps_aabb(&unit(0.0, 0.0), &unit(0.5, 0.5)));
        // Touching faces count as overlap
        assert!(overlaps_aabb(&unit(0.0, 0.0), &unit(1.0, 0.0)));
        assert!(!overlaps_aabb(&unit(0.0, 0.0), &unit(1.01, 0.0)));
        // Overlap on x alone is not enough
        assert!(!overlaps_aabb(&unit(0.0, 0.0), &unit(0.2, 3.0)));
    }

    #[test]
    fn test_circle_overlap() {
        let r = unit(0.0, 0.0).radius();
        assert!(overlaps_circle(&unit(0.0, 0.0), &unit(2.0 * r - 0.01, 0.0)));
        // Exactly touching circles are apart
        assert!(!overlaps_circle(&unit(0.0, 0.0), &unit(2.0 * r, 0.0)));
    }

    #[test]
    fn test_modes_disagree_on_small_gap() {
        // A small gap between the boxes is still inside the enclosing circles
        let a = unit(0.0, 0.0);
        let b = unit(1.2, 0.0);
        assert!(!overlaps(CollisionMode::Aabb, &a, &b));
        assert!(overlaps(CollisionMode::Circle, &a, &b));
    }

    #[test]
    fn test_degenerate_bounds_never_collide() {
        let point = Bounds::new(Vec2::ZERO, Vec2::ZERO);
        assert!(!overlaps_aabb(&point, &point));
        assert!(!overlaps_circle(&point, &point));

        let nan = Bounds::new(Vec2::new(f32::NAN, 0.0), Vec2::splat(1.0));
        assert!(!overlaps_aabb(&nan, &unit(0.0, 0.0)));
        assert!(!overlaps_circle(&unit(0.0, 0.0), &nan));

        let inverted = Bounds::new(Vec2::ZERO, Vec2::new(-1.0, 1.0));
        assert!(!overlaps_aabb(&inverted, &unit(0.0, 0.0)));
    }

    struct Dummy {
        bounds: Bounds,
        live: bool,
    }

    impl Collidable for Dummy {
        fn bounds(&self) -> Bounds {
            self.bounds
        }
        fn is_collidable(&self) -> bool {
            self.live
        }
    }

    fn arb_bounds() -> impl Strategy<Value = Bounds> {
        (-10.0f32..10.0, -10.0f32..10.0, 0.0f32..3.0, 0.0f32..3.0)
            .prop_map(|(x, y, hx, hy)| Bounds::new(Vec2::new(x, y), Vec2::new(hx, hy)))
    }

    proptest! {
        #[test]
        fn prop_overlap_is_symmetric(a in arb_bounds(), b in arb_bounds()) {
            prop_assert_eq!(overlaps_aabb(&a, &b), overlaps_aabb(&b, &a));
            prop_assert_eq!(overlaps_circle(&a, &b), overlaps_circle(&b, &a));
        }

        #[test]
        fn prop_inactive_never_collides(a in arb_bounds(), b in arb_bounds(), circle in any::<bool>()) {
            let mode = if circle { CollisionMode::Circle } else { CollisionMode::Aabb };
            let live = Dummy { bounds: a, live: true };
            let idle = Dummy { bounds: b, live: false };
            prop_assert!(!test_pair(mode, &live, &idle));
            prop_assert!(!test_pair(mode, &idle, &live));
        }

        #[test]
        fn prop_box_overlap_implies_circle_overlap(a in arb_bounds(), b in arb_bounds()) {
            // Enclosing circles cover their boxes, so a strict box overlap is
            // always a circle overlap as well.
            let eps = 1e-3;
            let strict = a.min().x + eps < b.max().x && a.max().x > b.min().x + eps
                && a.min().y + eps < b.max().y && a.max().y > b.min().y + eps;
            if strict && !a.is_degenerate() && !b.is_degenerate() {
                prop_assert!(overlaps_circle(&a, &b));
            }
        }
    }
}
