//! Asteroid Split headless runner
//!
//! Runs a session under a simple autopilot and prints the final snapshot as
//! JSON. Usage: `asteroid-split [config.json] [ticks]`

use asteroid_split::SimConfig;
use asteroid_split::consts::SIM_DT;
use asteroid_split::sim::{GameEvent, GameState, Snapshot, Stepper, TickInput};

const DEFAULT_TICKS: u64 = 60 * 60;
/// Pretend the host renders at 30fps so the stepper runs two ticks per frame
const FRAME_DT: f32 = 1.0 / 30.0;
/// Fire once the target is within this many degrees of the nose
const AIM_TOLERANCE: f32 = 8.0;

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => SimConfig::load_or_default(path),
        None => SimConfig::default(),
    };
    let ticks = match args.next() {
        Some(arg) => arg.parse::<u64>().unwrap_or_else(|e| {
            log::warn!("Bad tick count {:?}: {} - using {}", arg, e, DEFAULT_TICKS);
            DEFAULT_TICKS
        }),
        None => DEFAULT_TICKS,
    };

    log::info!("Asteroid Split (headless) starting...");
    let mut state = GameState::new(config);
    let mut stepper = Stepper::new();
    let mut input = TickInput::default();

    let mut kills = 0u32;
    let mut shots = 0u32;
    while state.time_ticks < ticks && !state.ship.destroyed {
        autopilot(&state, &mut input);
        stepper.advance(&mut state, &mut input, FRAME_DT);

        for event in stepper.take_events() {
            match event {
                GameEvent::AsteroidDespawned { cause, .. } if cause.is_bullet_hit() => kills += 1,
                GameEvent::ProjectileFired { .. } => shots += 1,
                _ => {}
            }
        }
    }

    log::info!(
        "Finished after {} ticks ({:.1}s): score {}, health {}, {} kills from {} shots",
        state.time_ticks,
        state.time_ticks as f32 * SIM_DT,
        state.score(),
        state.health(),
        kills,
        shots
    );

    match Snapshot::capture(&state).to_json() {
        Ok(json) => println!("{}", json),
        Err(e) => {
            log::error!("Failed to serialize snapshot: {}", e);
            std::process::exit(1);
        }
    }
}

/// Turn toward the nearest asteroid and shoot when lined up
fn autopilot(state: &GameState, input: &mut TickInput) {
    let ship = &state.ship;
    let target = state
        .manager
        .asteroids()
        .iter()
        .filter(|a| a.moving)
        .min_by(|a, b| {
            a.pos
                .distance_squared(ship.pos)
                .partial_cmp(&b.pos.distance_squared(ship.pos))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

    input.thrust = 0.0;
    let Some(target) = target else {
        input.turn = 0.0;
        input.fire = false;
        return;
    };

    let to_target = (target.pos - ship.pos).normalize_or_zero();
    let off_by = ship.direction.angle_to(to_target).to_degrees();
    // Positive angle means the target is counter-clockwise of the nose
    input.turn = if off_by.abs() <= AIM_TOLERANCE / 2.0 {
        0.0
    } else if off_by > 0.0 {
        -1.0
    } else {
        1.0
    };
    input.fire = off_by.abs() <= AIM_TOLERANCE;

    // Back off from anything about to hit
    if target.pos.distance(ship.pos) < 1.5 {
        input.turn = 1.0;
        input.thrust = 1.0;
    }
}
