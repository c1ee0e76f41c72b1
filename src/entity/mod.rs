//! Simulation entities.
//!
//! Every entity is a shared [`Body`] (position, health, hitbox, timers,
//! collision bookkeeping) plus an [`EntityKind`] carrying the per-kind state.
//! Behaviour is split across three small traits:
//!
//! - [`Updatable`] advances an entity by one frame without looking at anyone
//!   else,
//! - [`Collidable`] exposes the hitbox and reacts to an overlapping partner,
//! - [`Damageable`] applies damage and healing with the death-once rule.
//!
//! AI steering needs to see the whole population, so it is planned by the
//! world (see [`crate::actor`]) before [`Updatable::update`] runs.

pub mod pickup;
pub mod player;
pub mod projectile;

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use hashbrown::HashSet;
use slotmap::new_key_type;

use crate::actor::AiBrain;
use crate::audio::{SoundEvent, SoundId};
use crate::components::{Rect, Team};
use crate::input::InputState;
use crate::physics;
use crate::vector_math::Vector2;
use crate::world::World;
use crate::{DEFAULT_HEALTH, SHAKE_DURATION_MS};

pub use pickup::{ItemEffect, ItemState, PickupCondition, PortalState, PortalTravel};
pub use player::{Effects, Inventory, PlayerEffect, PlayerState, Shot, WeaponSlot};
pub use projectile::{ProjectileSpec, ProjectileState, Shooter};

new_key_type! {
    /// Generational handle to an entity owned by a [`World`].
    ///
    /// Handles to removed entities stay invalid forever, so stale references
    /// (a dead shooter, a consumed pickup) resolve to "not found".
    pub struct EntityId;
}

/// Callback run once when an entity's health first reaches zero, or when a
/// projectile expires. Receives the detached entity, the world it lived in,
/// and its team.
pub type DeathCallback = Arc<dyn Fn(&Entity, &mut World, Team) + Send + Sync>;

/// Extra effect a projectile applies to an opposing entity it strikes.
pub type HitCallback = Arc<dyn Fn(&Entity, &mut Entity) + Send + Sync>;

/// Result of a [`Damageable::hurt`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HurtOutcome {
    /// The target is invincible; health is unchanged.
    Blocked,
    /// Health was reduced but the target survives (or was already dead).
    Damaged,
    /// This call took the target from alive to dead.
    Killed,
}

/// Per-frame context handed to [`Updatable::update`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Environment {
    /// World dimensions; positions live in `[0, size]`.
    pub size: Vector2,
    /// Whether projectiles expire on touching the world edge.
    pub border_solid: bool,
    /// Frame length in milliseconds.
    pub dt: f64,
}

/// Side channel available while resolving one collision.
pub struct Contact<'a> {
    /// Handle of the entity being collided with.
    pub other_id: EntityId,
    /// Sounds requested during the collision.
    pub sounds: &'a mut Vec<SoundEvent>,
    /// Portal travel requested by the player this frame.
    pub travel: &'a mut Option<PortalTravel>,
}

/// Advances an entity by one frame.
pub trait Updatable {
    /// Integrates motion, decays timers and applies kind-specific upkeep.
    fn update(&mut self, env: &Environment);
}

/// Entities that occupy space and react to overlaps.
pub trait Collidable {
    /// Axis-aligned collision rectangle centred on the entity.
    fn hitbox(&self) -> Rect;

    /// Reacts to `other` overlapping this entity.
    fn collide(&mut self, other: &mut Entity, contact: &mut Contact<'_>);
}

/// Entities with health.
pub trait Damageable {
    /// Removes `amount` health unless invincible.
    fn hurt(&mut self, amount: f64) -> HurtOutcome;

    /// Restores `amount` health, clamped to the maximum.
    fn heal(&mut self, amount: f64);

    /// Health as a fraction of the maximum, in `[0, 1]`.
    fn health_fraction(&self) -> f64;
}

/// State shared by every entity kind.
#[derive(Clone, Debug)]
pub struct Body {
    /// Display name, used in logs and render snapshots.
    pub name: String,
    /// Centre of the hitbox.
    pub position: Vector2,
    /// Pixels per millisecond.
    pub velocity: Vector2,
    /// Allegiance.
    pub team: Team,
    /// Current health, always within `[0, max_health]`.
    pub health: f64,
    /// Health ceiling.
    pub max_health: f64,
    /// Ignores damage when set.
    pub invincible: bool,
    /// Velocity magnitude cap. Zero pins the entity in place.
    pub speed: f64,
    /// Collision size, independent of any sprite.
    pub hitbox: Vector2,
    /// Solid entities keep non-solid bases out of their footprint.
    pub solid: bool,
    /// Whether hits push this entity.
    pub take_knockback: bool,
    /// Milliseconds alive.
    pub lifetime: f64,
    /// Age at which the entity expires, if bounded.
    pub max_lifetime: Option<f64>,
    /// Cleared exactly once when the entity is marked for removal.
    pub alive: bool,
    /// Remaining shake time in milliseconds.
    pub shake_timer: f64,
    /// Remaining frozen time in milliseconds.
    pub frozen_timer: f64,
    /// Partners overlapped on the previous frame.
    pub last_collisions: HashSet<EntityId>,
    pub(crate) death_pending: bool,
}

impl Body {
    fn new(name: String, hitbox: Vector2) -> Self {
        Self {
            name,
            position: Vector2::ZERO,
            velocity: Vector2::ZERO,
            team: Team::Neutral,
            health: DEFAULT_HEALTH,
            max_health: DEFAULT_HEALTH,
            invincible: true,
            speed: 0.0,
            hitbox,
            solid: false,
            take_knockback: true,
            lifetime: 0.0,
            max_lifetime: None,
            alive: true,
            shake_timer: 0.0,
            frozen_timer: 0.0,
            last_collisions: HashSet::new(),
            death_pending: false,
        }
    }

    /// Adds `acceleration` to the velocity.
    pub fn accelerate(&mut self, acceleration: Vector2) {
        self.velocity += acceleration;
    }

    /// Clamps the position into the world using the depth rule.
    pub fn keep_in_bounds(&mut self, size: Vector2) {
        self.position = physics::clamp_to_bounds(self.position, self.hitbox, size);
    }

    /// Marks the entity for removal and schedules its death callback.
    ///
    /// Has no effect on an entity that is already dead.
    pub fn expire(&mut self) {
        if self.alive {
            self.alive = false;
            self.death_pending = true;
        }
    }

    /// Whether the death callback is owed when the entity is swept.
    #[must_use]
    pub const fn death_pending(&self) -> bool {
        self.death_pending
    }

    fn take_damage(&mut self, amount: f64) -> HurtOutcome {
        if self.invincible {
            return HurtOutcome::Blocked;
        }
        self.health = (self.health - amount).clamp(0.0, self.max_health);
        self.shake_timer = SHAKE_DURATION_MS;
        if self.health <= 0.0 && self.alive {
            self.expire();
            return HurtOutcome::Killed;
        }
        HurtOutcome::Damaged
    }
}

/// Per-kind behaviour state.
#[derive(Clone, Debug)]
pub enum EntityKind {
    /// Static or decorative entity with no behaviour of its own.
    Prop,
    /// Steered creature, melee or ranged.
    Ai(AiBrain),
    /// Travelling damage source.
    Projectile(ProjectileState),
    /// Trigger that moves the player to another place.
    Portal(PortalState),
    /// Pickup consumed on player contact.
    Item(ItemState),
    /// The player character.
    Player(PlayerState),
}

/// A simulation entity: shared [`Body`] plus per-kind state.
///
/// `Entity` dereferences to its [`Body`], so `entity.position` and friends
/// read naturally.
#[derive(Clone)]
pub struct Entity {
    /// Shared state.
    pub body: Body,
    /// Per-kind state.
    pub kind: EntityKind,
    death_callback: Option<DeathCallback>,
}

impl Entity {
    /// Creates an invincible neutral prop with the given hitbox.
    ///
    /// Use the `with_*` builders to give it health, a team, speed and so on.
    ///
    /// # Examples
    /// ```
    /// use lifesim::{Entity, Team, Vector2};
    /// let rock = Entity::new("Rock", Vector2::new(85.0, 50.0)).with_solid(true);
    /// assert!(rock.invincible);
    /// assert_eq!(rock.team, Team::Neutral);
    /// ```
    #[must_use]
    pub fn new(name: impl Into<String>, hitbox: Vector2) -> Self {
        Self {
            body: Body::new(name.into(), hitbox),
            kind: EntityKind::Prop,
            death_callback: None,
        }
    }

    /// Gives the entity finite health, making it damageable.
    #[must_use]
    pub fn with_health(mut self, health: f64) -> Self {
        self.body.health = health;
        self.body.max_health = health;
        self.body.invincible = false;
        self
    }

    /// Sets the team.
    #[must_use]
    pub fn with_team(mut self, team: Team) -> Self {
        self.body.team = team;
        self
    }

    /// Sets the speed cap.
    #[must_use]
    pub fn with_speed(mut self, speed: f64) -> Self {
        self.body.speed = speed;
        self
    }

    /// Sets solidity.
    #[must_use]
    pub fn with_solid(mut self, solid: bool) -> Self {
        self.body.solid = solid;
        self
    }

    /// Sets whether hits push the entity.
    #[must_use]
    pub fn with_knockback(mut self, take_knockback: bool) -> Self {
        self.body.take_knockback = take_knockback;
        self
    }

    /// Bounds the entity's lifetime in milliseconds.
    #[must_use]
    pub fn with_lifetime(mut self, max_lifetime: f64) -> Self {
        self.body.max_lifetime = Some(max_lifetime);
        self
    }

    /// Sets the initial velocity.
    #[must_use]
    pub fn with_velocity(mut self, velocity: Vector2) -> Self {
        self.body.velocity = velocity;
        self
    }

    /// Replaces the kind-specific state.
    #[must_use]
    pub fn with_kind(mut self, kind: EntityKind) -> Self {
        self.kind = kind;
        self
    }

    /// Installs the death callback.
    #[must_use]
    pub fn on_death<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Self, &mut World, Team) + Send + Sync + 'static,
    {
        self.death_callback = Some(Arc::new(callback));
        self
    }

    /// Installs a shared death callback.
    #[must_use]
    pub fn with_death_callback(mut self, callback: DeathCallback) -> Self {
        self.death_callback = Some(callback);
        self
    }

    /// The death callback, if any.
    #[must_use]
    pub fn death_callback(&self) -> Option<&DeathCallback> {
        self.death_callback.as_ref()
    }

    /// Whether this is the player character.
    #[must_use]
    pub const fn is_player(&self) -> bool {
        matches!(self.kind, EntityKind::Player(_))
    }

    /// Whether this is a projectile.
    #[must_use]
    pub const fn is_projectile(&self) -> bool {
        matches!(self.kind, EntityKind::Projectile(_))
    }

    /// AI state, if this entity is steered.
    #[must_use]
    pub const fn brain(&self) -> Option<&AiBrain> {
        match &self.kind {
            EntityKind::Ai(brain) => Some(brain),
            _ => None,
        }
    }

    /// Player state, if this is the player.
    #[must_use]
    pub const fn player_state(&self) -> Option<&PlayerState> {
        match &self.kind {
            EntityKind::Player(state) => Some(state),
            _ => None,
        }
    }

    /// Mutable player state, if this is the player.
    pub fn player_state_mut(&mut self) -> Option<&mut PlayerState> {
        match &mut self.kind {
            EntityKind::Player(state) => Some(state),
            _ => None,
        }
    }

    /// Runs the player's control step. Returns `None` for any other kind.
    pub fn control(&mut self, input: &InputState) -> Option<Shot> {
        match &mut self.kind {
            EntityKind::Player(state) => state.control(&mut self.body, input),
            _ => None,
        }
    }

    /// Whether AI should ignore this entity because it is an invisible player.
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.player_state()
            .is_some_and(|state| state.effects.invisible > 0.0)
    }

    /// Team-and-invincibility opposition: `self` may target `other`.
    ///
    /// The team matrix comes from [`Team::opposes`]; additionally, invincible
    /// entities are never opposed unless they are the player.
    #[must_use]
    pub fn opposes(&self, other: &Self) -> bool {
        self.team.opposes(other.team) && (!other.invincible || other.is_player())
    }

    /// Pushes `other` out of this solid entity's base band.
    ///
    /// Only a solid entity pushes, and only non-solid, non-projectile
    /// partners move. The partner's base is kept [`crate::SOLID_THICKNESS`]
    /// above or below this entity's base, whichever side it is already on.
    pub fn resolve_solidity(&self, other: &mut Self) {
        if self.solid && !other.solid && !other.is_projectile() {
            other.body.position = physics::push_out_of_base(
                self.hitbox(),
                other.body.position,
                other.body.hitbox,
            );
        }
    }
}

impl Deref for Entity {
    type Target = Body;

    fn deref(&self) -> &Self::Target {
        &self.body
    }
}

impl DerefMut for Entity {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.body
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("body", &self.body)
            .field("kind", &self.kind)
            .field("has_death_callback", &self.death_callback.is_some())
            .finish()
    }
}

impl Updatable for Entity {
    fn update(&mut self, env: &Environment) {
        let keep_in_bounds = !self.is_projectile();
        physics::step_body(&mut self.body, env, keep_in_bounds);
        match &mut self.kind {
            EntityKind::Projectile(state) => state.update(&mut self.body, env),
            EntityKind::Player(state) => state.update(&mut self.body, env),
            EntityKind::Item(state) => state.update(&mut self.body),
            EntityKind::Portal(state) => state.touching_player = false,
            EntityKind::Prop | EntityKind::Ai(_) => {}
        }
    }
}

impl Collidable for Entity {
    fn hitbox(&self) -> Rect {
        Rect::centered(self.body.position, self.body.hitbox)
    }

    fn collide(&mut self, other: &mut Entity, contact: &mut Contact<'_>) {
        self.resolve_solidity(other);
        if self.is_projectile() {
            projectile::collide(self, other, contact);
            return;
        }
        if matches!(self.kind, EntityKind::Item(_)) {
            pickup::collect(self, other, contact);
            return;
        }
        match &mut self.kind {
            EntityKind::Portal(portal) => {
                if other.is_player() {
                    portal.touching_player = true;
                }
            }
            EntityKind::Player(state) => {
                if let EntityKind::Portal(portal) = &other.kind {
                    if state.interact {
                        *contact.travel = Some(portal.travel(contact.other_id));
                    }
                    state.interact = false;
                }
            }
            EntityKind::Prop
            | EntityKind::Ai(_)
            | EntityKind::Projectile(_)
            | EntityKind::Item(_) => {}
        }
    }
}

impl Damageable for Entity {
    fn hurt(&mut self, amount: f64) -> HurtOutcome {
        let outcome = self.body.take_damage(amount);
        if let EntityKind::Player(state) = &mut self.kind {
            self.body.shake_timer = SHAKE_DURATION_MS;
            state.on_hurt();
        }
        outcome
    }

    fn heal(&mut self, amount: f64) {
        self.body.health = (self.body.health + amount).clamp(0.0, self.body.max_health);
    }

    fn health_fraction(&self) -> f64 {
        if self.body.max_health <= 0.0 {
            return 0.0;
        }
        (self.body.health / self.body.max_health).clamp(0.0, 1.0)
    }
}

/// Records a sound at `source`.
pub(crate) fn emit(sounds: &mut Vec<SoundEvent>, sound: SoundId, source: Vector2) {
    sounds.push(SoundEvent { sound, source });
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn grunt() -> Entity {
        Entity::new("Grunt", Vector2::new(10.0, 10.0))
            .with_health(10.0)
            .with_team(Team::Enemy)
    }

    #[rstest]
    fn entities_without_health_are_invincible() {
        let mut rock = Entity::new("Rock", Vector2::new(10.0, 10.0));
        assert_eq!(rock.hurt(50.0), HurtOutcome::Blocked);
        assert_relative_eq!(rock.health, DEFAULT_HEALTH);
        assert!(rock.alive);
    }

    #[rstest]
    #[case(3.0, 7.0)]
    #[case(10.0, 0.0)]
    #[case(1e9, 0.0)]
    #[case(-5.0, 10.0)]
    fn hurt_clamps_health(mut grunt: Entity, #[case] amount: f64, #[case] expected: f64) {
        grunt.hurt(amount);
        assert_relative_eq!(grunt.health, expected);
        assert!(grunt.health >= 0.0 && grunt.health <= grunt.max_health);
    }

    #[rstest]
    fn killing_blow_is_reported_once(mut grunt: Entity) {
        assert_eq!(grunt.hurt(6.0), HurtOutcome::Damaged);
        assert_eq!(grunt.hurt(6.0), HurtOutcome::Killed);
        assert_eq!(grunt.hurt(6.0), HurtOutcome::Damaged);
        assert!(!grunt.alive);
        assert!(grunt.death_pending());
    }

    #[rstest]
    fn hurt_starts_shaking(mut grunt: Entity) {
        grunt.hurt(1.0);
        assert_relative_eq!(grunt.shake_timer, SHAKE_DURATION_MS);
    }

    #[rstest]
    fn heal_is_clamped(mut grunt: Entity) {
        grunt.hurt(4.0);
        grunt.heal(100.0);
        assert_relative_eq!(grunt.health, 10.0);
        assert_relative_eq!(grunt.health_fraction(), 1.0);
    }

    #[rstest]
    fn invincible_non_players_are_not_opposed() {
        let ally = Entity::new("Troop", Vector2::new(1.0, 1.0)).with_team(Team::Ally);
        let rock = Entity::new("Rock", Vector2::new(1.0, 1.0));
        let tree = Entity::new("Tree", Vector2::new(1.0, 1.0)).with_health(15.0);
        assert!(!ally.opposes(&rock));
        assert!(ally.opposes(&tree));
    }

    #[rstest]
    fn solid_entities_push_bases_out() {
        let wall = Entity::new("Wall", Vector2::new(100.0, 40.0))
            .with_solid(true)
            .with_kind(EntityKind::Prop);
        let mut walker = Entity::new("Walker", Vector2::new(10.0, 10.0)).with_health(5.0);
        walker.position = Vector2::new(0.0, 12.0);
        let wall_bottom = wall.hitbox().bottom();
        wall.resolve_solidity(&mut walker);
        let walker_bottom = walker.hitbox().bottom();
        assert_relative_eq!(walker_bottom, wall_bottom - crate::SOLID_THICKNESS);
    }
}
