//! Buffered cross-entity effects awaiting application by the world.

use crate::audio::SoundEvent;
use crate::entity::EntityId;
use crate::vector_math::Vector2;
use crate::weapons::Weapon;

/// Something one entity does to another (or to the world) that cannot be
/// applied while the population is borrowed for planning.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Effect {
    /// Contact damage with an optional push.
    Strike {
        /// Entity being hit.
        target: EntityId,
        /// Damage dealt.
        damage: f64,
        /// Acceleration applied if the target takes knockback.
        knockback: Vector2,
    },
    /// A weapon discharge.
    Fire {
        /// Firing entity.
        shooter: EntityId,
        /// Weapon used.
        weapon: Weapon,
        /// Aim direction.
        direction: Vector2,
    },
    /// A sound request.
    Sound(SoundEvent),
}

/// FIFO queue of [`Effect`]s.
#[derive(Debug, Default)]
pub struct EffectInbox {
    effects: Vec<Effect>,
}

impl EffectInbox {
    /// Queues one effect.
    pub fn push(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    /// Queues several effects in order.
    pub fn extend<I>(&mut self, effects: I)
    where
        I: IntoIterator<Item = Effect>,
    {
        self.effects.extend(effects);
    }

    /// Removes every queued effect, oldest first.
    pub fn drain(&mut self) -> std::vec::Drain<'_, Effect> {
        self.effects.drain(..)
    }

    /// Whether nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}
