//! Bevy host integration.
//!
//! [`SimulationPlugin`] owns a [`Game`](crate::Game) inside the ECS, steps it
//! once per `Update`, and mirrors the current world's render snapshot into
//! ECS entities so any renderer can draw them. The simulation stays the only
//! source of truth: mirrored entities are rewritten from the snapshot every
//! frame and despawned as soon as their simulation counterpart disappears.

mod plugin;
mod state;
mod systems;
#[cfg(test)]
mod test_support;

pub use plugin::{SimulationError, SimulationErrorContext, SimulationPlugin};
pub use state::{
    MirrorIndex, PlayerInput, QueuedSound, RenderState, SimEntity, Simulation, SoundQueue,
};
pub use systems::{mirror_entities_system, step_simulation_system, transform_for};
