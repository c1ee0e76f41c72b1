//! Narrow interface to the audio collaborator.
//!
//! The core never mixes or attenuates audio. It records [`SoundEvent`]s at
//! discrete moments (shots, hits, explosions) and hands them to an
//! [`AudioSink`] together with the listener position once per frame.
use serde::Serialize;

use crate::vector_math::Vector2;

/// Identifiers for the sounds the simulation can request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum SoundId {
    /// Standard gun or troop shot.
    Shoot,
    /// Shotgun blast.
    ShootShotgun,
    /// Arrow release.
    ShootArrow,
    /// Grenade or freeze-ray launch.
    ShootGrenade,
    /// Melee or generic impact.
    Hit,
    /// The player was struck by a projectile.
    PlayerHurt,
    /// Explosion.
    Boom,
    /// Frozen cloud burst.
    Freeze,
    /// Healing pickup consumed.
    Eat,
    /// Permanent stat increase.
    Buff,
    /// Ammunition or effect collected.
    Collect,
}

/// A fire-and-forget request to play a sound emitted at `source`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SoundEvent {
    /// Which sound to play.
    pub sound: SoundId,
    /// World position the sound originates from.
    pub source: Vector2,
}

/// Receives sound requests from the simulation.
///
/// Implementations decide attenuation from the distance between `source` and
/// `listener`.
pub trait AudioSink {
    /// Plays `sound` emitted at `source` as heard from `listener`.
    fn play_sound(&mut self, sound: SoundId, source: Vector2, listener: Vector2);
}

/// Sink that drops every request, for headless runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentAudio;

impl AudioSink for SilentAudio {
    fn play_sound(&mut self, _sound: SoundId, _source: Vector2, _listener: Vector2) {}
}
