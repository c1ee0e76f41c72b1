#![cfg_attr(docsrs, feature(doc_cfg))]
//! Simulation core of a top-down realtime action game.
//!
//! Entities (the player, steered creatures, projectiles, pickups, portals and
//! scenery) live in bounded 2D [`World`]s. Each frame a world updates every
//! entity, resolves pairwise collisions, sweeps the dead and runs its
//! spawners. A [`Game`] strings worlds together and moves the player between
//! them; [`sync::SimulationPlugin`] hosts a game inside a Bevy app.
//!
//! ```
//! use lifesim::{Entity, Spawner, SpawnerConfig, Team, Vector2, World, WorldConfig};
//!
//! let mut world = World::new(WorldConfig::open("Meadow", Vector2::new(800.0, 600.0)), 1)
//!     .expect("valid world");
//! world.add_spawner(
//!     Spawner::new(SpawnerConfig::every(1000.0, 3), || {
//!         Entity::new("Brawler", Vector2::new(50.0, 50.0))
//!             .with_health(10.0)
//!             .with_team(Team::Enemy)
//!     })
//!     .expect("valid spawner"),
//! );
//! for _ in 0..200 {
//!     world.update(16.0);
//! }
//! assert_eq!(world.team_count(Team::Enemy), 3);
//! ```
pub mod actor;
pub mod audio;
pub mod components;
pub mod constants;
pub mod entity;
pub mod error;
pub mod game;
pub mod input;
pub mod logging;
pub mod numeric;
pub mod physics;
pub mod presentation;
pub mod roster;
pub mod spawn_world;
pub mod spawner;
pub mod sync;
pub mod vector_math;
pub mod weapons;
pub mod world;
pub use constants::*;

// Re-export commonly used items
pub use actor::{AiBrain, AttackStyle, TargetSelection};
pub use audio::{AudioSink, SilentAudio, SoundEvent, SoundId};
pub use components::{Rect, Team};
pub use entity::{Entity, EntityId, EntityKind};
pub use error::{ConfigError, GameError};
pub use game::{FrameReport, Game};
pub use input::InputState;
pub use logging::init as init_logging;
pub use presentation::{RenderItem, SimulationSettings};
pub use spawn_world::build_default_game;
pub use spawner::{Spawner, SpawnerConfig};
pub use sync::SimulationPlugin;
pub use vector_math::Vector2;
pub use weapons::Weapon;
pub use world::{World, WorldConfig, WorldId};

pub mod prelude {
    //! Prelude exports used in documentation examples.
    //!
    //! ```rust,no_run
    //! use lifesim::prelude::*;
    //! ```

    pub use crate::entity::{Collidable, Damageable, Updatable};
    pub use crate::Entity;
    pub use crate::Game;
    pub use crate::InputState;
    pub use crate::Team;
    pub use crate::Vector2;
    pub use crate::World;
    pub use crate::WorldConfig;
}
