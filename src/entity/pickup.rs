//! Player-triggered entities: item pickups and portals.
use serde::{Deserialize, Serialize};

use crate::audio::SoundId;
use crate::entity::{emit, Body, Contact, Damageable, Entity, EntityId, EntityKind, PlayerEffect};
use crate::vector_math::Vector2;
use crate::weapons::Weapon;
use crate::world::WorldId;
use crate::{ITEM_BOB_AMPLITUDE, ITEM_BOB_FREQUENCY};

/// What a pickup does to the player.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum ItemEffect {
    /// Restores health.
    Heal(f64),
    /// Raises maximum and current health.
    RaiseMaxHealth(f64),
    /// Raises the player's damage multiplier.
    RaiseDamage(f64),
    /// Adds uses of a weapon.
    Ammo(Weapon, u32),
    /// Extends a timed effect by the given milliseconds.
    Buff(PlayerEffect, f64),
}

/// Gate checked before a pickup is consumed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupCondition {
    /// Always collectable.
    #[default]
    Always,
    /// Only while the player is below maximum health.
    PlayerHurt,
}

/// Pickup state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ItemState {
    /// Effect applied on collection.
    pub effect: ItemEffect,
    /// Collection gate.
    pub condition: PickupCondition,
}

impl ItemState {
    /// Sets the bobbing velocity used on the next frame.
    pub fn update(&mut self, body: &mut Body) {
        let bob = (body.lifetime * ITEM_BOB_FREQUENCY).sin() * ITEM_BOB_AMPLITUDE;
        body.velocity = Vector2::new(0.0, bob);
    }

    /// Whether `player` may collect this item right now.
    #[must_use]
    pub fn can_collect(&self, player: &Entity) -> bool {
        match self.condition {
            PickupCondition::Always => true,
            PickupCondition::PlayerHurt => player.health < player.max_health,
        }
    }

    /// Applies the effect to `player` and returns the sound to play.
    pub fn apply(&self, player: &mut Entity) -> Option<SoundId> {
        match self.effect {
            ItemEffect::Heal(amount) => {
                player.heal(amount);
                Some(SoundId::Eat)
            }
            ItemEffect::RaiseMaxHealth(amount) => {
                player.max_health += amount;
                player.heal(amount);
                Some(SoundId::Buff)
            }
            ItemEffect::RaiseDamage(amount) => {
                let state = player.player_state_mut()?;
                state.damage_multiplier += amount;
                Some(SoundId::Buff)
            }
            ItemEffect::Ammo(weapon, amount) => {
                player.player_state_mut()?.inventory.gain(weapon, amount);
                Some(SoundId::Collect)
            }
            ItemEffect::Buff(effect, duration) => {
                player.player_state_mut()?.effects.extend(effect, duration);
                None
            }
        }
    }
}

/// Consumes `item` if `other` is the player and the gate allows it.
///
/// Consumption marks the item dead without owing a death callback.
pub(super) fn collect(item: &mut Entity, other: &mut Entity, contact: &mut Contact<'_>) {
    if !other.is_player() || !item.alive {
        return;
    }
    let EntityKind::Item(state) = item.kind else {
        return;
    };
    if !state.can_collect(other) {
        return;
    }
    if let Some(sound) = state.apply(other) {
        emit(contact.sounds, sound, item.position);
    }
    item.alive = false;
}

/// Where a portal sends the player.
///
/// An entity destination wins over a world destination for choosing the
/// world; an explicit position wins over an entity for choosing the spot.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PortalState {
    /// Prompt shown while the player stands on the portal.
    pub hover_message: String,
    /// Destination world.
    pub to_world: Option<WorldId>,
    /// Destination position.
    pub to_position: Option<Vector2>,
    /// Destination entity and the world it lives in.
    pub to_entity: Option<(WorldId, EntityId)>,
    /// Whether the player overlapped the portal this frame.
    pub touching_player: bool,
}

impl PortalState {
    /// Portal with a prompt and no destination yet.
    #[must_use]
    pub fn new(hover_message: impl Into<String>) -> Self {
        Self {
            hover_message: hover_message.into(),
            ..Self::default()
        }
    }

    /// World the portal leads to, if any.
    #[must_use]
    pub fn destination_world(&self) -> Option<WorldId> {
        self.to_entity.map(|(world, _)| world).or(self.to_world)
    }

    /// Travel request issued when the player uses this portal.
    #[must_use]
    pub fn travel(&self, portal: EntityId) -> PortalTravel {
        PortalTravel {
            portal,
            to_world: self.destination_world(),
            to_position: self.to_position,
            to_entity: self.to_entity,
        }
    }
}

/// Pending move of the player through a portal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PortalTravel {
    /// Portal that was used.
    pub portal: EntityId,
    /// Destination world, if it changes.
    pub to_world: Option<WorldId>,
    /// Explicit destination position.
    pub to_position: Option<Vector2>,
    /// Entity whose position is the destination when no position is given.
    pub to_entity: Option<(WorldId, EntityId)>,
}
