//! Projectile state, launch and hit resolution.
use std::fmt;

use crate::audio::SoundId;
use crate::components::Team;
use crate::entity::{
    emit, Body, Contact, Damageable, Entity, EntityId, EntityKind, Environment, HitCallback,
};
use crate::vector_math::Vector2;
use crate::{
    PROJECTILE_ARMING_MS, PROJECTILE_KNOCKBACK, PROJECTILE_TOP_ALLOWANCE, SHAKE_DURATION_MS,
};

/// Snapshot of whoever fires a projectile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shooter {
    /// Handle of the firing entity, if it lives in the world.
    pub id: Option<EntityId>,
    /// Muzzle position.
    pub position: Vector2,
    /// Velocity inherited by the projectile.
    pub velocity: Vector2,
    /// Team the projectile fights for.
    pub team: Team,
    /// Damage scale applied to every projectile this shooter fires.
    pub damage_multiplier: f64,
}

impl Shooter {
    /// Captures `entity` as a shooter. Only the player carries a damage
    /// multiplier; everyone else fires at face value.
    #[must_use]
    pub fn of(id: EntityId, entity: &Entity) -> Self {
        Self {
            id: Some(id),
            position: entity.position,
            velocity: entity.velocity,
            team: entity.team,
            damage_multiplier: entity
                .player_state()
                .map_or(1.0, |state| state.damage_multiplier),
        }
    }

    /// A parentless source at `position`, used by explosions and clouds.
    #[must_use]
    pub const fn detached(position: Vector2, team: Team) -> Self {
        Self {
            id: None,
            position,
            velocity: Vector2::ZERO,
            team,
            damage_multiplier: 1.0,
        }
    }
}

/// Static tuning for one projectile type.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSpec {
    /// Display name.
    pub name: &'static str,
    /// Collision size.
    pub hitbox: Vector2,
    /// Launch speed relative to the shooter.
    pub speed: f64,
    /// Damage per hit before the shooter's multiplier.
    pub damage: f64,
    /// Distance travelled (relative to the shooter) before expiring.
    pub range: f64,
    /// Whether the projectile is destroyed by the first thing it hits.
    pub blockable: bool,
    /// Age at which the projectile expires regardless of range.
    pub max_lifetime: Option<f64>,
}

/// Per-projectile runtime state.
#[derive(Clone)]
pub struct ProjectileState {
    /// Damage per hit, multiplier already applied.
    pub damage: f64,
    /// Expiry distance.
    pub range: f64,
    /// Distance covered relative to the inherited velocity.
    pub distance_travelled: f64,
    /// Firing entity; never hit by its own projectile's unfreeze rule.
    pub parent: Option<EntityId>,
    /// Velocity inherited from the shooter at launch.
    pub initial_velocity: Vector2,
    /// Destroyed on first hit when set.
    pub blockable: bool,
    /// Extra effect applied to opposing targets.
    pub on_hit: Option<HitCallback>,
}

impl fmt::Debug for ProjectileState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectileState")
            .field("damage", &self.damage)
            .field("range", &self.range)
            .field("distance_travelled", &self.distance_travelled)
            .field("parent", &self.parent)
            .field("initial_velocity", &self.initial_velocity)
            .field("blockable", &self.blockable)
            .field("has_on_hit", &self.on_hit.is_some())
            .finish()
    }
}

impl ProjectileSpec {
    /// Builds a projectile entity fired by `shooter` towards `direction`.
    ///
    /// The launch velocity is `direction.normalize() * speed` plus the
    /// shooter's velocity. Damage is scaled by the shooter's multiplier.
    /// The caller places the entity with [`crate::World::add`].
    #[must_use]
    pub fn launch(&self, shooter: &Shooter, direction: Vector2) -> Entity {
        let state = ProjectileState {
            damage: self.damage * shooter.damage_multiplier,
            range: self.range,
            distance_travelled: 0.0,
            parent: shooter.id,
            initial_velocity: shooter.velocity,
            blockable: self.blockable,
            on_hit: None,
        };
        let mut entity = Entity::new(self.name, self.hitbox)
            .with_team(shooter.team)
            .with_speed(self.speed)
            .with_velocity(direction.normalize() * self.speed + shooter.velocity)
            .with_kind(EntityKind::Projectile(state));
        entity.body.max_lifetime = self.max_lifetime;
        entity
    }
}

impl ProjectileState {
    /// Tracks travelled distance and expires the projectile at its range or
    /// the solid world border. Expiry owes the death callback. Nothing
    /// expires before it has existed for [`PROJECTILE_ARMING_MS`].
    pub fn update(&mut self, body: &mut Body, env: &Environment) {
        let relative = body.velocity - self.initial_velocity;
        self.distance_travelled += (relative.magnitude() * env.dt).abs();

        let half = body.hitbox / 2.0;
        let Vector2 { x, y } = body.position;
        let hits_border = env.border_solid
            && (x <= half.x
                || x >= env.size.x - half.x
                || y <= half.y - PROJECTILE_TOP_ALLOWANCE
                || y >= env.size.y - half.y);

        if (self.distance_travelled > self.range || hits_border)
            && body.lifetime > PROJECTILE_ARMING_MS
        {
            body.expire();
        }
    }
}

/// Resolves a projectile hitting `other`. Runs once per contact episode.
pub(super) fn collide(projectile: &mut Entity, other: &mut Entity, contact: &mut Contact<'_>) {
    if projectile.last_collisions.contains(&contact.other_id) {
        return;
    }
    let EntityKind::Projectile(state) = &projectile.kind else {
        return;
    };
    let opposed = projectile.opposes(other);

    if !opposed && other.frozen_timer > 0.0 && state.parent != Some(contact.other_id) {
        other.frozen_timer = 0.0;
        other.shake_timer = SHAKE_DURATION_MS;
    }
    if !(opposed || other.solid) {
        return;
    }

    other.shake_timer = SHAKE_DURATION_MS;
    let damage = state.damage;
    let blockable = state.blockable;
    if opposed {
        if let Some(on_hit) = state.on_hit.clone() {
            on_hit(projectile, other);
        }
        if other.is_player() {
            emit(contact.sounds, SoundId::PlayerHurt, projectile.position);
            if other.invincible && !blockable {
                // Deflected. Only blockable shots leave their death effect.
                projectile.alive = false;
            }
        }
        other.hurt(damage);
    }
    if other.take_knockback {
        other.accelerate(projectile.velocity.normalize() * PROJECTILE_KNOCKBACK);
    }
    if blockable {
        projectile.expire();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SoundEvent;
    use crate::entity::{Collidable, PlayerState, PortalTravel, Updatable};
    use approx::assert_relative_eq;
    use rstest::{fixture, rstest};
    use slotmap::SlotMap;

    const BULLET: ProjectileSpec = ProjectileSpec {
        name: "Bullet",
        hitbox: Vector2::new(10.0, 10.0),
        speed: 1.0,
        damage: 1.0,
        range: 500.0,
        blockable: true,
        max_lifetime: None,
    };

    #[fixture]
    fn ids() -> (EntityId, EntityId) {
        let mut map: SlotMap<EntityId, ()> = SlotMap::with_key();
        (map.insert(()), map.insert(()))
    }

    fn env() -> Environment {
        Environment {
            size: Vector2::new(5000.0, 5000.0),
            border_solid: false,
            dt: 1.0,
        }
    }

    #[rstest]
    fn launch_inherits_shooter_velocity() {
        let mut shooter = Shooter::detached(Vector2::ZERO, Team::Ally);
        shooter.velocity = Vector2::new(0.0, 0.5);
        shooter.damage_multiplier = 2.0;
        let bullet = BULLET.launch(&shooter, Vector2::new(3.0, 0.0));
        assert_relative_eq!(bullet.velocity.x, 1.0);
        assert_relative_eq!(bullet.velocity.y, 0.5);
        let EntityKind::Projectile(state) = &bullet.kind else {
            panic!("expected projectile");
        };
        assert_relative_eq!(state.damage, 2.0);
    }

    #[rstest]
    fn range_expiry_owes_the_death_callback() {
        let shooter = Shooter::detached(Vector2::new(2500.0, 2500.0), Team::Ally);
        let mut bullet = BULLET.launch(&shooter, Vector2::new(1.0, 0.0));
        bullet.position = shooter.position;
        let mut frames = 0;
        while bullet.alive && frames < 1000 {
            bullet.update(&env());
            frames += 1;
        }
        assert!((500..=502).contains(&frames), "expired after {frames} frames");
        assert!(bullet.death_pending());
    }

    #[rstest]
    fn hits_are_edge_triggered(ids: (EntityId, EntityId)) {
        let (_, target_id) = ids;
        let shooter = Shooter::detached(Vector2::ZERO, Team::Ally);
        let mut arrow = ProjectileSpec {
            blockable: false,
            ..BULLET
        }
        .launch(&shooter, Vector2::new(1.0, 0.0));
        let mut target = Entity::new("Brawler", Vector2::new(20.0, 20.0))
            .with_health(6.0)
            .with_team(Team::Enemy);
        let mut sounds: Vec<SoundEvent> = Vec::new();
        let mut travel: Option<PortalTravel> = None;
        let mut contact = Contact {
            other_id: target_id,
            sounds: &mut sounds,
            travel: &mut travel,
        };
        arrow.collide(&mut target, &mut contact);
        arrow.last_collisions.insert(target_id);
        arrow.collide(&mut target, &mut contact);
        assert_relative_eq!(target.health, 5.0);
        assert!(target.velocity.x > 0.0);
        assert!(arrow.alive);
    }

    #[rstest]
    #[case::bullet(true, true)]
    #[case::arrow(false, false)]
    fn deflected_shots_keep_their_death_effect_when_blockable(
        ids: (EntityId, EntityId),
        #[case] blockable: bool,
        #[case] owes_callback: bool,
    ) {
        let (_, player_id) = ids;
        let shooter = Shooter::detached(Vector2::ZERO, Team::Enemy);
        let mut shot =
            ProjectileSpec { blockable, ..BULLET }.launch(&shooter, Vector2::new(1.0, 0.0));
        let mut player = Entity::new("Player", Vector2::new(20.0, 20.0))
            .with_health(20.0)
            .with_team(Team::Ally)
            .with_kind(EntityKind::Player(PlayerState::default()));
        player.invincible = true;
        let mut sounds = Vec::new();
        let mut travel = None;
        let mut contact = Contact {
            other_id: player_id,
            sounds: &mut sounds,
            travel: &mut travel,
        };
        shot.collide(&mut player, &mut contact);
        assert!(!shot.alive);
        assert_eq!(shot.death_pending(), owes_callback);
        assert_relative_eq!(player.health, 20.0);
    }

    #[rstest]
    fn friendly_fire_unfreezes(ids: (EntityId, EntityId)) {
        let (parent_id, friend_id) = ids;
        let mut shooter = Shooter::detached(Vector2::ZERO, Team::Ally);
        shooter.id = Some(parent_id);
        let mut bullet = BULLET.launch(&shooter, Vector2::new(1.0, 0.0));
        let mut friend = Entity::new("Troop", Vector2::new(20.0, 20.0))
            .with_health(8.0)
            .with_team(Team::Ally);
        friend.frozen_timer = 1000.0;
        let mut sounds = Vec::new();
        let mut travel = None;
        let mut contact = Contact {
            other_id: friend_id,
            sounds: &mut sounds,
            travel: &mut travel,
        };
        bullet.collide(&mut friend, &mut contact);
        assert_relative_eq!(friend.frozen_timer, 0.0);
        assert_relative_eq!(friend.health, 8.0);
        assert!(bullet.alive);
    }
}
