//! Utility helpers for tests.
//!
//! Scenario builders for the integration suites: small worlds, inert
//! targets, and loops that step a world or a game for a number of frames.

use lifesim::{
    Entity, EntityId, FrameReport, Game, InputState, SilentAudio, Team, Vector2, World,
    WorldConfig,
};

/// Frame length used by most scenarios, in milliseconds.
pub const FRAME_MS: f64 = 16.0;

/// Seed shared by scenario worlds so failures reproduce.
pub const SCENARIO_SEED: u64 = 7;

/// Builds an open world of the given size.
///
/// # Panics
/// Panics if the size is not finite and positive.
///
/// # Examples
/// ```
/// use test_utils::arena;
/// let world = arena(400.0, 300.0);
/// assert!(world.is_empty());
/// ```
pub fn arena(width: f64, height: f64) -> World {
    World::new(
        WorldConfig::open("Arena", Vector2::new(width, height)),
        SCENARIO_SEED,
    )
    .unwrap_or_else(|err| panic!("arena should be valid: {err}"))
}

/// Builds a world with a solid border.
///
/// # Panics
/// Panics if the size is not finite and positive.
pub fn walled_arena(width: f64, height: f64) -> World {
    World::new(
        WorldConfig::walled("Walled Arena", Vector2::new(width, height)),
        SCENARIO_SEED,
    )
    .unwrap_or_else(|err| panic!("walled arena should be valid: {err}"))
}

/// A stationary, damageable target.
///
/// # Examples
/// ```
/// use lifesim::Team;
/// use test_utils::dummy;
/// let target = dummy(Team::Enemy, 20.0);
/// assert!(!target.invincible);
/// ```
pub fn dummy(team: Team, health: f64) -> Entity {
    Entity::new("Dummy", Vector2::new(40.0, 40.0))
        .with_health(health)
        .with_team(team)
}

/// Steps `world` for `frames` frames of [`FRAME_MS`].
pub fn step(world: &mut World, frames: usize) {
    for _ in 0..frames {
        world.update(FRAME_MS);
    }
}

/// Steps `game` for `frames` frames with the same input, discarding sound.
///
/// # Panics
/// Panics if a step fails.
pub fn step_game(game: &mut Game, input: &InputState, frames: usize) -> Vec<FrameReport> {
    let mut audio = SilentAudio;
    (0..frames)
        .map(|frame| {
            game.step(input, FRAME_MS, &mut audio)
                .unwrap_or_else(|err| panic!("frame {frame} failed: {err}"))
        })
        .collect()
}

/// Health of `id`, or `None` once it has left the world.
pub fn health_of(world: &World, id: EntityId) -> Option<f64> {
    world.entity(id).map(|entity| entity.health)
}

/// Position of `id`, or `None` once it has left the world.
pub fn position_of(world: &World, id: EntityId) -> Option<Vector2> {
    world.entity(id).map(|entity| entity.position)
}
