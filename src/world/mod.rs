//! Worlds: entity arenas with collision and lifecycle authority.
//!
//! A [`World`] exclusively owns its entities in a generational arena plus an
//! insertion-order list used for every deterministic traversal. One call to
//! [`World::update`] runs, in order:
//!
//! 1. per entity (insertion order): AI planning, effect application, then
//!    [`Updatable::update`];
//! 2. the pairwise collision pass (see `collision.rs`);
//! 3. the dead sweep, which detaches dead entities and runs owed death
//!    callbacks;
//! 4. the spawners.

mod collision;
mod effects;

use hashbrown::HashSet;
use log::{debug, info, trace, warn};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use crate::actor;
use crate::audio::{SoundEvent, SoundId};
use crate::components::Team;
use crate::entity::{
    Damageable, Entity, EntityId, EntityKind, Environment, PortalTravel, Shooter, Updatable,
};
use crate::error::ConfigError;
use crate::presentation::{self, RenderItem};
use crate::spawner::Spawner;
use crate::vector_math::Vector2;
use crate::weapons::Weapon;

pub use effects::{Effect, EffectInbox};

/// Index of a world inside a [`crate::Game`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorldId(pub usize);

/// Static description of a world.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Display name.
    pub name: String,
    /// Width and height in pixels.
    pub size: Vector2,
    /// Whether projectiles expire at the world edge.
    pub solid_border: bool,
    /// Simulated time after which the world counts as completed.
    pub complete_after: Option<f64>,
}

impl WorldConfig {
    /// Open-bordered world.
    #[must_use]
    pub fn open(name: impl Into<String>, size: Vector2) -> Self {
        Self {
            name: name.into(),
            size,
            solid_border: false,
            complete_after: None,
        }
    }

    /// World whose edges stop projectiles.
    #[must_use]
    pub fn walled(name: impl Into<String>, size: Vector2) -> Self {
        Self {
            solid_border: true,
            ..Self::open(name, size)
        }
    }

    /// Marks the world completed once `millis` of simulated time pass.
    #[must_use]
    pub fn with_completion_time(mut self, millis: f64) -> Self {
        self.complete_after = Some(millis);
        self
    }

    /// Checks the world size and completion time.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidWorldSize`] unless both dimensions are
    /// finite and positive, and [`ConfigError::InvalidInterval`] for a
    /// negative or non-finite completion time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let Vector2 { x, y } = self.size;
        if !(x.is_finite() && y.is_finite() && x > 0.0 && y > 0.0) {
            return Err(ConfigError::InvalidWorldSize {
                width: x,
                height: y,
            });
        }
        match self.complete_after {
            Some(millis) if !millis.is_finite() || millis < 0.0 => {
                Err(ConfigError::InvalidInterval(millis))
            }
            _ => Ok(()),
        }
    }
}

/// Read-only view of a world's entities in insertion order.
#[derive(Clone, Copy)]
pub struct Population<'a> {
    entities: &'a SlotMap<EntityId, Entity>,
    order: &'a [EntityId],
}

impl<'a> Population<'a> {
    /// Looks up one entity.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&'a Entity> {
        self.entities.get(id)
    }

    /// Entities in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &'a Entity)> + 'a {
        let entities = self.entities;
        self.order
            .iter()
            .filter_map(move |&id| entities.get(id).map(|entity| (id, entity)))
    }

    /// Number of entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the world is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// One simulated area.
pub struct World {
    name: String,
    size: Vector2,
    solid_border: bool,
    entities: SlotMap<EntityId, Entity>,
    order: Vec<EntityId>,
    spawners: Vec<Spawner>,
    rng: ChaCha8Rng,
    inbox: EffectInbox,
    sounds: Vec<SoundEvent>,
    travel: Option<PortalTravel>,
    time_elapsed: f64,
    complete_after: Option<f64>,
    completed: bool,
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("name", &self.name)
            .field("size", &self.size)
            .field("solid_border", &self.solid_border)
            .field("entities", &self.order.len())
            .field("spawners", &self.spawners.len())
            .field("time_elapsed", &self.time_elapsed)
            .field("completed", &self.completed)
            .finish_non_exhaustive()
    }
}

impl World {
    /// Creates an empty world whose randomness is seeded with `seed`.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when the size is invalid.
    ///
    /// # Examples
    /// ```
    /// use lifesim::{Vector2, World, WorldConfig};
    /// let world = World::new(WorldConfig::open("Overworld", Vector2::new(2500.0, 2500.0)), 42)
    ///     .expect("valid size");
    /// assert!(world.is_empty());
    /// ```
    pub fn new(config: WorldConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            name: config.name,
            size: config.size,
            solid_border: config.solid_border,
            entities: SlotMap::with_key(),
            order: Vec::new(),
            spawners: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            inbox: EffectInbox::default(),
            sounds: Vec::new(),
            travel: None,
            time_elapsed: 0.0,
            complete_after: config.complete_after,
            completed: false,
        })
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Dimensions.
    #[must_use]
    pub const fn size(&self) -> Vector2 {
        self.size
    }

    /// Centre point.
    #[must_use]
    pub fn center(&self) -> Vector2 {
        self.size / 2.0
    }

    /// Whether projectiles expire at the edge.
    #[must_use]
    pub const fn solid_border(&self) -> bool {
        self.solid_border
    }

    /// Milliseconds simulated so far.
    #[must_use]
    pub const fn time_elapsed(&self) -> f64 {
        self.time_elapsed
    }

    /// Whether the completion time has been reached.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.completed
    }

    /// Flags the world completed the first time its completion time has
    /// passed. Returns `true` only on that transition.
    pub(crate) fn complete_if_due(&mut self) -> bool {
        let due = self
            .complete_after
            .is_some_and(|millis| self.time_elapsed > millis);
        if due && !self.completed {
            info!("{} completed", self.name);
            self.completed = true;
            return true;
        }
        false
    }

    /// Number of entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the world holds no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Whether `id` is present.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(id)
    }

    /// Looks up an entity.
    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    /// Looks up an entity mutably.
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id)
    }

    /// Handles in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.order.iter().copied()
    }

    /// Entities in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Entity)> + '_ {
        self.population().iter()
    }

    /// Read-only view for planning.
    #[must_use]
    pub fn population(&self) -> Population<'_> {
        Population {
            entities: &self.entities,
            order: &self.order,
        }
    }

    /// Installed spawners.
    #[must_use]
    pub fn spawners(&self) -> &[Spawner] {
        &self.spawners
    }

    /// Living entities on `team`.
    #[must_use]
    pub fn team_count(&self, team: Team) -> usize {
        self.iter()
            .filter(|(_, entity)| entity.alive && entity.team == team)
            .count()
    }

    /// The world's random source.
    pub fn rng_mut(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }

    /// Uniformly random point inside the world.
    pub fn random_position(&mut self) -> Vector2 {
        let half = self.size / 2.0;
        half + Vector2::new(
            self.rng.gen_range(-half.x..=half.x),
            self.rng.gen_range(-half.y..=half.y),
        )
    }

    /// Adds `entity` at `position` and returns its handle.
    pub fn add(&mut self, position: Vector2, entity: Entity) -> EntityId {
        insert(&mut self.entities, &mut self.order, position, entity)
    }

    /// Removes `id` without running its death callback. Returns whether it
    /// was present.
    pub fn remove(&mut self, id: EntityId) -> bool {
        self.take(id).is_some()
    }

    /// Detaches `id` and hands it back, e.g. to move it to another world.
    ///
    /// Spawners forget the handle and the entity's collision history is
    /// cleared. No death callback runs.
    pub fn take(&mut self, id: EntityId) -> Option<Entity> {
        let mut entity = self.entities.remove(id)?;
        self.order.retain(|&other| other != id);
        for spawner in &mut self.spawners {
            spawner.forget(id);
        }
        entity.last_collisions.clear();
        trace!("{} left {}", entity.name, self.name);
        Some(entity)
    }

    /// Installs `spawner`, adding its pre-spawned entities at once.
    ///
    /// Pre-spawned entities count against the live cap while it has room;
    /// any beyond that are untracked.
    pub fn add_spawner(&mut self, mut spawner: Spawner) {
        for _ in 0..spawner.config().pre_spawned {
            let position = spawner.spawn_position(self.size, &mut self.rng);
            let id = insert(
                &mut self.entities,
                &mut self.order,
                position,
                spawner.produce(),
            );
            if spawner.capacity() > 0 {
                spawner.track(id);
            }
        }
        self.spawners.push(spawner);
    }

    /// Records a sound at `source`.
    pub fn emit_sound(&mut self, sound: SoundId, source: Vector2) {
        self.sounds.push(SoundEvent { sound, source });
    }

    /// Takes the sounds recorded since the last drain.
    pub fn drain_sounds(&mut self) -> Vec<SoundEvent> {
        std::mem::take(&mut self.sounds)
    }

    /// Describes every live entity for drawing, back to front.
    ///
    /// Shake jitter draws from the world's random source.
    pub fn render_snapshot(&mut self) -> Vec<RenderItem> {
        let population = Population {
            entities: &self.entities,
            order: &self.order,
        };
        presentation::render_snapshot(population, &mut self.rng)
    }

    /// Takes the portal travel requested during the last update, if any.
    pub fn take_travel(&mut self) -> Option<PortalTravel> {
        self.travel.take()
    }

    /// Fires `weapon` from the entity `shooter` towards `direction`.
    ///
    /// Returns how many entities were added; zero when the shooter is gone.
    pub fn fire(&mut self, shooter: EntityId, weapon: Weapon, direction: Vector2) -> usize {
        let Some(entity) = self.entities.get(shooter) else {
            return 0;
        };
        let snapshot = Shooter::of(shooter, entity);
        weapon.fire(self, &snapshot, direction)
    }

    /// Advances the world by `dt` milliseconds.
    ///
    /// Non-finite or negative frame lengths are ignored.
    pub fn update(&mut self, dt: f64) {
        if !dt.is_finite() || dt < 0.0 {
            warn!("{}: ignoring invalid frame length {dt}", self.name);
            return;
        }
        self.time_elapsed += dt;
        let env = Environment {
            size: self.size,
            border_solid: self.solid_border,
            dt,
        };

        let order = self.order.clone();
        for id in order {
            self.steer(id, dt);
            if let Some(entity) = self.entities.get_mut(id) {
                entity.update(&env);
            }
        }

        self.resolve_collisions();
        self.sweep_dead();
        self.run_spawners(dt);
    }

    fn steer(&mut self, id: EntityId, dt: f64) {
        let population = Population {
            entities: &self.entities,
            order: &self.order,
        };
        let Some(plan) = actor::think(id, population, self.size, &mut self.rng, dt) else {
            return;
        };
        if let Some(entity) = self.entities.get_mut(id) {
            entity.velocity = plan.velocity;
            if let EntityKind::Ai(brain) = &mut entity.kind {
                *brain = plan.brain;
            }
        }
        self.inbox.extend(plan.effects);
        self.apply_effects();
    }

    fn apply_effects(&mut self) {
        let pending: Vec<Effect> = self.inbox.drain().collect();
        for effect in pending {
            match effect {
                Effect::Strike {
                    target,
                    damage,
                    knockback,
                } => {
                    let Some(victim) = self.entities.get_mut(target) else {
                        continue;
                    };
                    if !victim.alive {
                        continue;
                    }
                    victim.hurt(damage);
                    if victim.take_knockback {
                        victim.accelerate(knockback);
                    }
                }
                Effect::Fire {
                    shooter,
                    weapon,
                    direction,
                } => {
                    self.fire(shooter, weapon, direction);
                }
                Effect::Sound(event) => self.sounds.push(event),
            }
        }
    }

    fn sweep_dead(&mut self) {
        let dead: Vec<EntityId> = self
            .iter()
            .filter(|(_, entity)| !entity.alive)
            .map(|(id, _)| id)
            .collect();
        for id in dead {
            let Some(entity) = self.take(id) else {
                continue;
            };
            debug!("{} removed from {}", entity.name, self.name);
            if !entity.death_pending() {
                continue;
            }
            if let Some(callback) = entity.death_callback().cloned() {
                callback(&entity, self, entity.team);
            }
        }
    }

    fn run_spawners(&mut self, dt: f64) {
        for spawner in &mut self.spawners {
            let wave = spawner.tick(dt, &mut self.rng);
            for _ in 0..wave {
                let position = spawner.spawn_position(self.size, &mut self.rng);
                let id = insert(
                    &mut self.entities,
                    &mut self.order,
                    position,
                    spawner.produce(),
                );
                spawner.track(id);
            }
        }
    }

    pub(crate) fn live_ids(&self) -> HashSet<EntityId> {
        self.order.iter().copied().collect()
    }
}

fn insert(
    entities: &mut SlotMap<EntityId, Entity>,
    order: &mut Vec<EntityId>,
    position: Vector2,
    mut entity: Entity,
) -> EntityId {
    entity.position = position;
    entity.last_collisions.clear();
    trace!("adding {} at {position}", entity.name);
    let id = entities.insert(entity);
    order.push(id);
    id
}
