//! Read-only view of a world for renderers, plus host frame settings.
//!
//! The core knows nothing about sprites or pixels. Each frame a renderer asks
//! for a [`RenderItem`] per live entity: where its hitbox sits, how hurt it
//! is, which team it is on, and a small random offset while it shakes from a
//! hit. Items come back sorted by the bottom edge of their hitbox so drawing
//! them in order gives the pseudo-3D overlap the game relies on.

use bevy::prelude::Resource;
use ordered_float::OrderedFloat;
use rand::Rng;
use serde::Serialize;

use crate::components::Team;
use crate::entity::{Collidable, Entity, EntityId, EntityKind};
use crate::error::ConfigError;
use crate::vector_math::Vector2;
use crate::world::Population;
use crate::SHAKE_OFFSET_PX;

/// Coarse entity category, enough for a renderer to pick a layer or sprite set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum RenderKind {
    /// Scenery, particles and graves.
    Prop,
    /// Steered creature.
    Creature,
    /// Travelling damage source.
    Projectile,
    /// Doorway to another world.
    Portal,
    /// Pickup.
    Item,
    /// The player character.
    Player,
}

impl From<&EntityKind> for RenderKind {
    fn from(kind: &EntityKind) -> Self {
        match kind {
            EntityKind::Prop => Self::Prop,
            EntityKind::Ai(_) => Self::Creature,
            EntityKind::Projectile(_) => Self::Projectile,
            EntityKind::Portal(_) => Self::Portal,
            EntityKind::Item(_) => Self::Item,
            EntityKind::Player(_) => Self::Player,
        }
    }
}

/// Everything a renderer needs to draw one entity.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RenderItem {
    /// Entity handle, stable while the entity stays in this world.
    pub id: EntityId,
    /// Display name, used to choose a sprite.
    pub name: String,
    /// Entity category.
    pub kind: RenderKind,
    /// Hitbox centre.
    pub position: Vector2,
    /// Hitbox size.
    pub size: Vector2,
    /// Health over max health, in `[0, 1]`. `None` for invincible entities,
    /// which never show a health bar.
    pub health_fraction: Option<f64>,
    /// Allegiance, for tinting health bars.
    pub team: Team,
    /// Random jitter while the shake timer runs, zero otherwise.
    pub shake_offset: Vector2,
    /// Whether a freeze is slowing the entity.
    pub frozen: bool,
    /// Draw-order key: the bottom edge of the hitbox.
    pub depth: f64,
    /// Direction of travel in degrees, zero when standing still.
    pub heading: f64,
    /// Prompt to show while the player stands on a portal.
    pub hover_message: Option<String>,
}

impl RenderItem {
    fn describe<R: Rng + ?Sized>(id: EntityId, entity: &Entity, rng: &mut R) -> Self {
        let hitbox = entity.hitbox();
        let health_fraction = (!entity.invincible && entity.max_health > 0.0)
            .then(|| (entity.health / entity.max_health).clamp(0.0, 1.0));
        let shake_offset = if entity.shake_timer > 0.0 {
            Vector2::new(
                rng.gen_range(-SHAKE_OFFSET_PX..=SHAKE_OFFSET_PX),
                rng.gen_range(-SHAKE_OFFSET_PX..=SHAKE_OFFSET_PX),
            )
        } else {
            Vector2::ZERO
        };
        let heading = if entity.velocity == Vector2::ZERO {
            0.0
        } else {
            entity.velocity.angle()
        };
        let hover_message = match &entity.kind {
            EntityKind::Portal(state) if state.touching_player => {
                Some(state.hover_message.clone())
            }
            _ => None,
        };
        Self {
            id,
            name: entity.name.clone(),
            kind: RenderKind::from(&entity.kind),
            position: hitbox.center,
            size: hitbox.size,
            health_fraction,
            team: entity.team,
            shake_offset,
            frozen: entity.frozen_timer > 0.0,
            depth: hitbox.bottom(),
            heading,
            hover_message,
        }
    }
}

/// Describes every live entity, sorted back to front.
///
/// Entities with equal depth keep their insertion order.
pub fn render_snapshot<R: Rng + ?Sized>(
    population: Population<'_>,
    rng: &mut R,
) -> Vec<RenderItem> {
    let mut items: Vec<RenderItem> = population
        .iter()
        .filter(|(_, entity)| entity.alive)
        .map(|(id, entity)| RenderItem::describe(id, entity, rng))
        .collect();
    items.sort_by_key(|item| OrderedFloat(item.depth));
    items
}

/// Frame pacing for hosts that drive the simulation from a game loop.
///
/// # Examples
///
/// ```ignore
/// use bevy::prelude::*;
/// use lifesim::presentation::SimulationSettings;
///
/// let mut app = App::new();
/// app.insert_resource(SimulationSettings {
///     fixed_frame_ms: Some(16.0),
///     max_frame_ms: 50.0,
/// });
/// ```
#[derive(Resource, Clone, Debug, PartialEq)]
pub struct SimulationSettings {
    /// Step by this many milliseconds every frame instead of the measured
    /// delta. Useful for reproducible runs.
    pub fixed_frame_ms: Option<f64>,

    /// Upper bound on a measured delta.
    ///
    /// Clamps frame hitches so fast projectiles do not skip whole rooms.
    pub max_frame_ms: f64,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            fixed_frame_ms: None,
            max_frame_ms: 50.0,
        }
    }
}

impl SimulationSettings {
    /// Checks that every duration is finite and positive.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidFrameDuration`] naming the offending value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let durations = self.fixed_frame_ms.into_iter().chain([self.max_frame_ms]);
        for duration in durations {
            if !duration.is_finite() || duration <= 0.0 {
                return Err(ConfigError::InvalidFrameDuration(duration));
            }
        }
        Ok(())
    }

    /// Milliseconds to advance given the measured frame time.
    ///
    /// # Examples
    /// ```
    /// use lifesim::presentation::SimulationSettings;
    /// let settings = SimulationSettings::default();
    /// assert!((settings.frame_delta(500.0) - 50.0).abs() < f64::EPSILON);
    /// ```
    #[must_use]
    pub fn frame_delta(&self, measured_ms: f64) -> f64 {
        self.fixed_frame_ms
            .unwrap_or_else(|| measured_ms.clamp(0.0, self.max_frame_ms))
    }
}
