//! Resources and components shared by the simulation systems.

use bevy::prelude::{Component, Entity, Resource};
use hashbrown::HashMap;

use crate::audio::{AudioSink, SoundId};
use crate::entity::EntityId;
use crate::game::Game;
use crate::input::InputState;
use crate::presentation::RenderItem;
use crate::vector_math::Vector2;
use crate::world::WorldId;

/// The game being simulated.
#[derive(Resource, Debug)]
pub struct Simulation(pub Game);

/// Input for the next simulation step.
///
/// The host writes this from whatever devices it polls. One-shot fields
/// (`interact`, `cycle_weapon`) are cleared after each step so a single key
/// press is consumed once.
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq)]
pub struct PlayerInput(pub InputState);

/// A sound request waiting for the host's audio system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QueuedSound {
    /// Which sound to play.
    pub sound: SoundId,
    /// Where it was emitted.
    pub source: Vector2,
    /// Where the player was when it was emitted.
    pub listener: Vector2,
}

/// Audio sink that buffers requests until the host drains them.
#[derive(Resource, Clone, Debug, Default, PartialEq)]
pub struct SoundQueue {
    pending: Vec<QueuedSound>,
}

impl SoundQueue {
    /// Takes every buffered request, oldest first.
    pub fn drain(&mut self) -> impl Iterator<Item = QueuedSound> + '_ {
        self.pending.drain(..)
    }

    /// Number of buffered requests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl AudioSink for SoundQueue {
    fn play_sound(&mut self, sound: SoundId, source: Vector2, listener: Vector2) {
        self.pending.push(QueuedSound {
            sound,
            source,
            listener,
        });
    }
}

/// Links an ECS entity to the simulation entity it mirrors.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SimEntity(pub EntityId);

/// The latest render description of a mirrored entity.
#[derive(Component, Clone, Debug, PartialEq)]
pub struct RenderState(pub RenderItem);

/// Which ECS entity mirrors which simulation entity.
///
/// Simulation handles are only unique within one world, so the index is
/// rebuilt whenever the player changes worlds.
#[derive(Resource, Debug, Default)]
pub struct MirrorIndex {
    pub(crate) world: Option<WorldId>,
    pub(crate) entities: HashMap<EntityId, Entity>,
}

impl MirrorIndex {
    /// The ECS entity mirroring `id`, if any.
    #[must_use]
    pub fn entity_for(&self, id: EntityId) -> Option<Entity> {
        self.entities.get(&id).copied()
    }

    /// Number of mirrored entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether nothing is mirrored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
