//! Player character: control, regeneration, timed effects and inventory.
use serde::{Deserialize, Serialize};

use crate::entity::{Body, Environment};
use crate::input::InputState;
use crate::vector_math::Vector2;
use crate::weapons::Weapon;
use crate::{
    METALSUIT_HIT_DRAIN_MS, PLAYER_ACCEL, PLAYER_DAMPING, PLAYER_REGEN_PER_MS, PLAYER_SPEED,
};

/// Timed player buffs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerEffect {
    /// Faster movement.
    Speed,
    /// Invincible and immovable, but slower.
    Metalsuit,
    /// Ignored by AI.
    Invisible,
}

/// Remaining milliseconds of each timed effect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Effects {
    /// Speed shoes.
    pub speed: f64,
    /// Metal suit.
    pub metalsuit: f64,
    /// Invisibility.
    pub invisible: f64,
}

impl Effects {
    /// Remaining time of `effect`.
    #[must_use]
    pub const fn remaining(&self, effect: PlayerEffect) -> f64 {
        match effect {
            PlayerEffect::Speed => self.speed,
            PlayerEffect::Metalsuit => self.metalsuit,
            PlayerEffect::Invisible => self.invisible,
        }
    }

    /// Extends `effect` by `duration` milliseconds.
    pub fn extend(&mut self, effect: PlayerEffect, duration: f64) {
        let slot = match effect {
            PlayerEffect::Speed => &mut self.speed,
            PlayerEffect::Metalsuit => &mut self.metalsuit,
            PlayerEffect::Invisible => &mut self.invisible,
        };
        *slot += duration;
    }

    fn decay(&mut self, dt: f64) {
        self.speed = (self.speed - dt).max(0.0);
        self.metalsuit = (self.metalsuit - dt).max(0.0);
        self.invisible = (self.invisible - dt).max(0.0);
    }

    /// Speed multiplier implied by the active effects.
    #[must_use]
    pub fn speed_multiplier(&self) -> f64 {
        match (self.speed > 0.0, self.metalsuit > 0.0) {
            (true, true) => 1.3,
            (true, false) => 1.75,
            (false, true) => 0.8,
            (false, false) => 1.0,
        }
    }
}

/// One weapon the player can select.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeaponSlot {
    /// Weapon fired from this slot.
    pub weapon: Weapon,
    /// Remaining uses. `None` is unlimited.
    pub ammo: Option<u32>,
    /// Milliseconds until the slot may fire again.
    pub ready_in: f64,
}

impl WeaponSlot {
    /// Whether the slot can be selected.
    #[must_use]
    pub fn is_stocked(&self) -> bool {
        self.ammo.is_none_or(|ammo| ammo > 0)
    }
}

/// Player weapons with ammunition and cooldowns.
///
/// Slots keep a fixed order; only stocked slots are selectable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    slots: Vec<WeaponSlot>,
    selected: Weapon,
}

impl Default for Inventory {
    fn default() -> Self {
        let slots = Weapon::PLAYER_ARSENAL
            .iter()
            .map(|&weapon| WeaponSlot {
                weapon,
                ammo: (weapon != Weapon::StandardGun).then_some(0),
                ready_in: 0.0,
            })
            .collect();
        Self {
            slots,
            selected: Weapon::StandardGun,
        }
    }
}

impl Inventory {
    /// Currently selected weapon.
    #[must_use]
    pub const fn selected(&self) -> Weapon {
        self.selected
    }

    /// All slots, stocked or not.
    #[must_use]
    pub fn slots(&self) -> &[WeaponSlot] {
        &self.slots
    }

    /// Remaining ammunition for `weapon`. `None` when unlimited.
    #[must_use]
    pub fn ammo(&self, weapon: Weapon) -> Option<u32> {
        self.slot(weapon).and_then(|slot| slot.ammo)
    }

    /// Adds `amount` uses of `weapon`.
    pub fn gain(&mut self, weapon: Weapon, amount: u32) {
        if let Some(slot) = self.slot_mut(weapon) {
            slot.ammo = slot.ammo.map(|ammo| ammo.saturating_add(amount));
        }
    }

    /// Moves the selection `steps` stocked slots forward (negative for
    /// backward), wrapping at either end.
    pub fn cycle(&mut self, steps: i32) {
        let stocked: Vec<Weapon> = self
            .slots
            .iter()
            .filter(|slot| slot.is_stocked())
            .map(|slot| slot.weapon)
            .collect();
        if stocked.is_empty() {
            return;
        }
        let current = stocked
            .iter()
            .position(|&weapon| weapon == self.selected)
            .unwrap_or(0);
        let len = i64::try_from(stocked.len()).unwrap_or(i64::MAX);
        let next = (i64::try_from(current).unwrap_or(0) + i64::from(steps)).rem_euclid(len);
        if let Some(&weapon) = usize::try_from(next).ok().and_then(|index| stocked.get(index)) {
            self.selected = weapon;
        }
    }

    /// Consumes one use of the selected weapon if it is stocked and cooled
    /// down. Returns the weapon on success.
    pub fn try_fire(&mut self) -> Option<Weapon> {
        self.fall_back_if_empty();
        let selected = self.selected;
        let slot = self.slot_mut(selected)?;
        if slot.ready_in > 0.0 || !slot.is_stocked() {
            return None;
        }
        slot.ready_in = selected.cooldown_ms();
        if let Some(ammo) = slot.ammo.as_mut() {
            *ammo -= 1;
        }
        Some(selected)
    }

    fn cool_down(&mut self, dt: f64) {
        for slot in &mut self.slots {
            slot.ready_in = (slot.ready_in - dt).max(0.0);
        }
    }

    fn fall_back_if_empty(&mut self) {
        if !self.slot(self.selected).is_some_and(WeaponSlot::is_stocked) {
            self.selected = Weapon::StandardGun;
        }
    }

    fn slot(&self, weapon: Weapon) -> Option<&WeaponSlot> {
        self.slots.iter().find(|slot| slot.weapon == weapon)
    }

    fn slot_mut(&mut self, weapon: Weapon) -> Option<&mut WeaponSlot> {
        self.slots.iter_mut().find(|slot| slot.weapon == weapon)
    }
}

/// A shot requested by the player's control step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shot {
    /// Weapon to fire.
    pub weapon: Weapon,
    /// Aim direction from the player.
    pub direction: Vector2,
    /// Aim point in world coordinates.
    pub target: Vector2,
}

/// State unique to the player character.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerState {
    /// Scale applied to the damage of every projectile the player fires.
    pub damage_multiplier: f64,
    /// Remaining effect durations.
    pub effects: Effects,
    /// Weapons and ammunition.
    pub inventory: Inventory,
    /// Set for the frame on which the interact key was pressed.
    pub interact: bool,
    /// Speed before effect multipliers.
    pub base_speed: f64,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            damage_multiplier: 1.0,
            effects: Effects::default(),
            inventory: Inventory::default(),
            interact: false,
            base_speed: PLAYER_SPEED,
        }
    }
}

impl PlayerState {
    /// Applies one frame of input.
    ///
    /// Movement accelerates along the normalised direction; with no direction
    /// held the velocity is damped. Returns the shot to fire, if the primary
    /// action is held and the selected weapon is ready.
    pub fn control(&mut self, body: &mut Body, input: &InputState) -> Option<Shot> {
        if input.is_moving() {
            body.accelerate(input.move_direction.normalize() * PLAYER_ACCEL);
        } else {
            body.velocity *= PLAYER_DAMPING;
        }
        if input.cycle_weapon != 0 {
            self.inventory.cycle(input.cycle_weapon);
        }
        self.interact = input.interact;

        if !input.primary_action_held {
            return None;
        }
        let weapon = self.inventory.try_fire()?;
        Some(Shot {
            weapon,
            direction: input.cursor_world_position - body.position,
            target: input.cursor_world_position,
        })
    }

    /// Regenerates health, decays effects and derives speed, invincibility
    /// and knockback from what remains active.
    pub fn update(&mut self, body: &mut Body, env: &Environment) {
        body.health = (body.health + PLAYER_REGEN_PER_MS * env.dt).min(body.max_health);
        self.effects.decay(env.dt);
        self.inventory.cool_down(env.dt);

        body.speed = self.base_speed * self.effects.speed_multiplier();
        let armoured = self.effects.metalsuit > 0.0;
        body.invincible = armoured;
        body.take_knockback = !armoured;
    }

    pub(crate) fn on_hurt(&mut self) {
        self.effects.metalsuit = (self.effects.metalsuit - METALSUIT_HIT_DRAIN_MS).max(0.0);
    }
}
