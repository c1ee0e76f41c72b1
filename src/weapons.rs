//! Weapons, the projectile catalogue and projectile death effects.
//!
//! Firing builds projectiles from a [`ProjectileSpec`] and a [`Shooter`]
//! snapshot, then hands them to the world. Effects that outlive a projectile
//! (explosions, frozen clouds, puffs, blood) are plain death callbacks so the
//! roster can reuse them for creatures too.
use std::sync::Arc;

use log::trace;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::audio::SoundId;
use crate::components::Team;
use crate::entity::{Entity, EntityKind, HitCallback, ProjectileSpec, Shooter};
use crate::roster;
use crate::vector_math::Vector2;
use crate::world::World;
use crate::FREEZE_DURATION_MS;

/// Everything the player or an AI can fire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weapon {
    /// Single bullet, unlimited for the player.
    StandardGun,
    /// Three pairs of short-range bullets in a fan.
    Shotgun,
    /// Piercing long-range arrow.
    Arrows,
    /// Slow shell that explodes on expiry or impact.
    Grenade,
    /// Shot that leaves a freezing cloud behind.
    FreezeRay,
    /// Places an allied troop at the aim point.
    PlaceTroop,
}

/// Standard bullet.
pub const BULLET: ProjectileSpec = ProjectileSpec {
    name: "Bullet",
    hitbox: Vector2::new(16.0, 16.0),
    speed: 1.25,
    damage: 1.0,
    range: 500.0,
    blockable: true,
    max_lifetime: None,
};

/// Shotgun pellets are bullets with half the range.
pub const SHOTGUN_PELLET: ProjectileSpec = ProjectileSpec {
    range: 250.0,
    ..BULLET
};

/// Piercing arrow.
pub const ARROW: ProjectileSpec = ProjectileSpec {
    name: "Arrow",
    hitbox: Vector2::new(36.0, 36.0),
    speed: 1.8,
    damage: 2.0,
    range: 750.0,
    blockable: false,
    max_lifetime: None,
};

/// Grenade shell.
pub const GRENADE: ProjectileSpec = ProjectileSpec {
    name: "Grenade",
    hitbox: Vector2::new(24.0, 24.0),
    speed: 1.0,
    damage: 3.0,
    range: 400.0,
    blockable: true,
    max_lifetime: None,
};

/// Freeze-ray shot.
pub const FREEZE_SHOT: ProjectileSpec = ProjectileSpec {
    name: "Freeze Ray Shot",
    hitbox: Vector2::new(28.0, 28.0),
    speed: 1.0,
    damage: 2.0,
    range: 400.0,
    blockable: true,
    max_lifetime: None,
};

/// Short-lived area damage left by grenades and some deaths.
pub const EXPLOSION: ProjectileSpec = ProjectileSpec {
    name: "Explosion",
    hitbox: Vector2::new(110.0, 110.0),
    speed: 0.003,
    damage: 2.0,
    range: 1000.0,
    blockable: false,
    max_lifetime: Some(200.0),
};

/// Cloud that freezes whatever it touches.
pub const FROZEN_CLOUD: ProjectileSpec = ProjectileSpec {
    name: "Frozen Cloud",
    hitbox: Vector2::new(140.0, 140.0),
    speed: 0.3,
    damage: 1.0,
    range: 1000.0,
    blockable: false,
    max_lifetime: Some(400.0),
};

/// Harmless blood particle.
pub const BLOOD: ProjectileSpec = ProjectileSpec {
    name: "Blood",
    hitbox: Vector2::new(12.0, 12.0),
    speed: 0.65,
    damage: 0.0,
    range: 50.0,
    blockable: false,
    max_lifetime: None,
};

const SHOTGUN_SPREAD_DEGREES: f64 = 35.0;
const SHOTGUN_DIRECTIONS: u32 = 3;
const PELLETS_PER_DIRECTION: u32 = 2;
const BLOOD_DROPS: u32 = 4;
const POOF_LIFETIME_MS: f64 = 100.0;

impl Weapon {
    /// Slots in the player's inventory, in selection order.
    pub const PLAYER_ARSENAL: [Self; 6] = [
        Self::StandardGun,
        Self::Shotgun,
        Self::Arrows,
        Self::Grenade,
        Self::FreezeRay,
        Self::PlaceTroop,
    ];

    /// Minimum time between two player shots.
    #[must_use]
    pub const fn cooldown_ms(self) -> f64 {
        match self {
            Self::StandardGun => 250.0,
            Self::Arrows => 200.0,
            Self::Shotgun | Self::Grenade | Self::FreezeRay => 400.0,
            Self::PlaceTroop => 500.0,
        }
    }

    /// Sound played on firing.
    #[must_use]
    pub const fn sound(self) -> Option<SoundId> {
        match self {
            Self::StandardGun => Some(SoundId::Shoot),
            Self::Shotgun => Some(SoundId::ShootShotgun),
            Self::Arrows => Some(SoundId::ShootArrow),
            Self::Grenade | Self::FreezeRay => Some(SoundId::ShootGrenade),
            Self::PlaceTroop => None,
        }
    }

    /// Fires from `shooter` towards `direction` and returns how many entities
    /// were added to the world.
    ///
    /// Projectiles start at the shooter's position. A troop is placed at
    /// `shooter.position + direction`, the aim point.
    pub fn fire(self, world: &mut World, shooter: &Shooter, direction: Vector2) -> usize {
        if let Some(sound) = self.sound() {
            world.emit_sound(sound, shooter.position);
        }
        let launched: Vec<Entity> = match self {
            Self::StandardGun => vec![BULLET.launch(shooter, direction).on_death(spawn_poof)],
            Self::Shotgun => shotgun_directions(direction)
                .flat_map(|heading| {
                    (0..PELLETS_PER_DIRECTION)
                        .map(move |_| SHOTGUN_PELLET.launch(shooter, heading).on_death(spawn_poof))
                })
                .collect(),
            Self::Arrows => vec![ARROW.launch(shooter, direction).on_death(spawn_poof)],
            Self::Grenade => vec![GRENADE
                .launch(shooter, direction)
                .on_death(spawn_explosion)],
            Self::FreezeRay => vec![FREEZE_SHOT
                .launch(shooter, direction)
                .on_death(spawn_frozen_cloud)],
            Self::PlaceTroop => {
                world.add(
                    shooter.position + direction,
                    roster::troop(shooter.damage_multiplier),
                );
                return 1;
            }
        };
        let count = launched.len();
        for projectile in launched {
            world.add(shooter.position, projectile);
        }
        trace!("{self:?} fired {count} projectile(s)");
        count
    }
}

/// Fan of unit directions centred on `direction`.
fn shotgun_directions(direction: Vector2) -> impl Iterator<Item = Vector2> {
    let heading = direction.angle();
    let step = SHOTGUN_SPREAD_DEGREES / f64::from(SHOTGUN_DIRECTIONS - 1);
    (0..SHOTGUN_DIRECTIONS).map(move |index| {
        let offset = -SHOTGUN_SPREAD_DEGREES / 2.0 + step * f64::from(index);
        Vector2::polar(1.0, offset - heading)
    })
}

/// Freezes movable, damageable targets.
#[must_use]
pub fn freeze_on_hit() -> HitCallback {
    Arc::new(|_: &Entity, other: &mut Entity| {
        if other.speed > 0.0 && !other.invincible {
            other.frozen_timer = FREEZE_DURATION_MS;
        }
    })
}

/// Death effect: an explosion carrying the dying entity's momentum.
pub fn spawn_explosion(source: &Entity, world: &mut World, team: Team) {
    world.emit_sound(SoundId::Boom, source.position);
    let explosion = EXPLOSION.launch(&Shooter::detached(source.position, team), source.velocity);
    world.add(source.position, explosion);
}

/// Death effect: a freezing cloud.
pub fn spawn_frozen_cloud(source: &Entity, world: &mut World, team: Team) {
    world.emit_sound(SoundId::Freeze, source.position);
    let mut cloud = FROZEN_CLOUD.launch(&Shooter::detached(source.position, team), source.velocity);
    if let EntityKind::Projectile(state) = &mut cloud.kind {
        state.on_hit = Some(freeze_on_hit());
    }
    world.add(source.position, cloud);
}

/// Death effect: a brief puff of smoke.
pub fn spawn_poof(source: &Entity, world: &mut World, _team: Team) {
    let poof = Entity::new("Poof", Vector2::new(30.0, 30.0))
        .with_speed(0.01)
        .with_lifetime(POOF_LIFETIME_MS);
    world.add(source.position, poof);
}

/// Death effect: four blood drops thrown roughly outwards.
pub fn spawn_blood(source: &Entity, world: &mut World, _team: Team) {
    let shooter = Shooter {
        velocity: source.velocity,
        ..Shooter::detached(source.position, Team::Neutral)
    };
    for quadrant in 0..BLOOD_DROPS {
        let jitter: f64 = world.rng_mut().gen_range(30.0..=60.0);
        let direction = Vector2::polar(1.0, f64::from(quadrant) * 90.0 + jitter);
        world.add(source.position, BLOOD.launch(&shooter, direction));
    }
}
