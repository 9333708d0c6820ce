//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (roster order, IDs never reused)
//! - No rendering or platform dependencies

pub mod boundary;
pub mod collision;
pub mod manager;
pub mod pool;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use boundary::{EdgeAction, PlayArea};
pub use collision::{Bounds, Collidable, overlaps, overlaps_aabb, overlaps_circle, test_pair};
pub use manager::{CollisionManager, CollisionReport, Contact, HitBy};
pub use pool::{AsteroidSpawner, BulletSource, DespawnOutcome, ProjectileManager, SpawnEdge};
pub use snapshot::{EntityKind, EntityView, Snapshot};
pub use state::{
    Asteroid, AsteroidOrigin, DamageOutcome, DespawnCause, GameEvent, GameState, IdGen,
    Projectile, Ship, ShipControls,
};
pub use tick::{Stepper, TickInput, tick};
