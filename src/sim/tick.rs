//! Fixed timestep simulation tick
//!
//! One tick runs, in order: mode toggle, spawn timer, ship, firing,
//! asteroid and projectile motion (with boundary despawns), then collision
//! detection and resolution.

use super::boundary::EdgeAction;
use super::manager::{CollisionReport, Contact, HitBy};
use super::pool::BulletSource;
use super::state::{DamageOutcome, DespawnCause, GameEvent, GameState, ShipControls};
use crate::consts::{MAX_SUBSTEPS, SIM_DT};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Turn axis: positive clockwise, negative counter-clockwise
    pub turn: f32,
    /// Thrust axis: positive accelerates
    pub thrust: f32,
    /// Fire trigger pressed (one-shot)
    pub fire: bool,
    /// Switch between box and circle collision tests (one-shot)
    pub toggle_collision_mode: bool,
}

impl TickInput {
    pub fn controls(&self) -> ShipControls {
        ShipControls {
            turn: self.turn,
            thrust: self.thrust,
        }
    }
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    state.events.clear();
    state.time_ticks += 1;
    let score_before = state.manager.score();

    if input.toggle_collision_mode {
        let mode = state.manager.toggle_mode();
        state.events.push(GameEvent::CollisionModeChanged { mode });
    }

    if let Some(id) = state
        .spawner
        .update(dt, &mut state.manager, &mut state.rng)
    {
        let variant = state.manager.asteroid(id).map_or(0, |a| a.variant);
        state.events.push(GameEvent::AsteroidSpawned { id, variant });
    }

    state.ship.update(dt, &input.controls(), &state.area);
    if input.fire && state.ship.can_fire() {
        fire_projectile(state);
    }

    // Move asteroids; anything that drifted out of play goes back
    let area = state.area;
    let margin = state.config.asteroids.despawn_margin;
    let left_area: Vec<u32> = state
        .manager
        .asteroids_mut()
        .iter_mut()
        .filter_map(|a| (a.integrate(dt, &area, margin) == EdgeAction::Despawn).then_some(a.id))
        .collect();
    for id in left_area {
        despawn_asteroid(state, id, DespawnCause::LeftArea);
    }

    let spent: Vec<u32> = state
        .manager
        .projectiles_mut()
        .iter_mut()
        .filter_map(|p| (p.integrate(dt, &area) == EdgeAction::Despawn).then_some(p.id))
        .collect();
    for id in spent {
        despawn_projectile(state, id);
    }

    let report = state.manager.detect(&mut state.ship);
    resolve_collisions(state, &report);

    let score = state.manager.score();
    if score != score_before {
        state.events.push(GameEvent::ScoreChanged { score });
    }
}

/// Apply a detection report; every contact is acted on exactly once
fn resolve_collisions(state: &mut GameState, report: &CollisionReport) {
    for contact in &report.contacts {
        match *contact {
            Contact::Ship => match state.ship.damage(&state.area) {
                DamageOutcome::Ignored => {}
                DamageOutcome::Damaged { health } => {
                    log::debug!("Ship hit, health {}", health);
                    state.events.push(GameEvent::ShipDamaged { health });
                }
                DamageOutcome::Destroyed => {
                    log::info!(
                        "Ship destroyed after {} ticks, score {}",
                        state.time_ticks,
                        state.manager.score()
                    );
                    state.events.push(GameEvent::ShipDestroyed);
                }
            },
            Contact::Asteroid { id, hit_by } => {
                let cause = match hit_by {
                    HitBy::Ship => DespawnCause::HitShip,
                    HitBy::Projectile => DespawnCause::HitProjectile,
                };
                despawn_asteroid(state, id, cause);
            }
            Contact::Projectile { id } => despawn_projectile(state, id),
        }
    }
}

fn fire_projectile(state: &mut GameState) {
    let (id, source) = state
        .projectile_pool
        .get_bullet(&mut state.manager, &mut state.ids);
    if source == BulletSource::Allocated {
        state.events.push(GameEvent::ProjectilePoolOverflow { id });
    }
    if let Some(projectile) = state.manager.projectile_mut(id) {
        projectile.fire(state.ship.direction, state.ship.pos);
    }
    state.ship.reset_fire_cooldown();
    state.events.push(GameEvent::ProjectileFired { id });
}

fn despawn_asteroid(state: &mut GameState, id: u32, cause: DespawnCause) {
    let Some(outcome) = state.spawner.despawn_asteroid(
        &mut state.manager,
        &mut state.ids,
        &mut state.rng,
        id,
        cause.is_bullet_hit(),
    ) else {
        return;
    };

    state.events.push(GameEvent::AsteroidDespawned {
        id,
        child: outcome.was_child,
        cause,
    });
    if !outcome.children.is_empty() {
        state.events.push(GameEvent::AsteroidSplit {
            parent: id,
            children: outcome.children,
        });
    }
}

fn despawn_projectile(state: &mut GameState, id: u32) {
    if state.projectile_pool.despawn(&mut state.manager, id) {
        state.events.push(GameEvent::ProjectileDespawned { id });
    }
}

/// Fixed-step accumulator for driving `tick` from variable frame times
#[derive(Debug, Clone, Default)]
pub struct Stepper {
    accumulator: f32,
    /// Events from every tick run since the last `take_events`
    events: Vec<GameEvent>,
}

impl Stepper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run as many whole ticks as `frame_dt` allows; returns the tick count
    ///
    /// Frame time is capped at 0.1s and at most `MAX_SUBSTEPS` ticks run.
    /// One-shot inputs are cleared after the first tick consumes them.
    pub fn advance(&mut self, state: &mut GameState, input: &mut TickInput, frame_dt: f32) -> u32 {
        let dt = frame_dt.clamp(0.0, 0.1);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            tick(state, input, SIM_DT);
            self.events.extend(state.events.iter().cloned());
            self.accumulator -= SIM_DT;
            substeps += 1;

            input.fire = false;
            input.toggle_collision_mode = false;
        }
        substeps
    }

    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
        self.events.clear();
    }
}
