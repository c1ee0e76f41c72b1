//! Bevy plugin wiring the simulation into the schedule.

use bevy::ecs::prelude::On;
use bevy::prelude::*;
use log::error;
use thiserror::Error;

use crate::presentation::SimulationSettings;
use crate::spawn_world::build_default_game;

use super::{
    mirror_entities_system, step_simulation_system, MirrorIndex, PlayerInput, Simulation,
    SoundQueue,
};

/// Context carried by [`SimulationError`] events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationErrorContext {
    /// Failure surfaced while installing the plugin.
    Init,
    /// Failure surfaced while advancing the game.
    Step,
}

/// Event raised when the simulation bridge hits an error path.
///
/// An observer logs these events so diagnostics stay visible even without
/// `bevy_log`.
#[derive(Event, Debug, Clone, Error)]
#[error("{context:?}: {detail}")]
pub struct SimulationError {
    /// Where the failure occurred.
    pub context: SimulationErrorContext,
    /// Description of the underlying error.
    pub detail: String,
}

impl SimulationError {
    /// Convenience constructor used by systems to emit error events.
    pub fn new(context: SimulationErrorContext, detail: impl Into<String>) -> Self {
        Self {
            context,
            detail: detail.into(),
        }
    }
}

#[expect(
    clippy::needless_pass_by_value,
    reason = "Observer systems must accept On<T> by value for Events V2."
)]
fn log_simulation_error(event: On<SimulationError>) {
    let SimulationError { context, detail } = event.event();
    error!("simulation error during {context:?}: {detail}");
}

/// Bevy plugin that steps a [`crate::Game`] every frame and mirrors it into
/// the ECS.
///
/// A [`Simulation`] resource inserted before the plugin is used as is;
/// otherwise the default campaign is built from `seed`. The same goes for
/// [`SimulationSettings`].
#[derive(Debug, Default)]
pub struct SimulationPlugin {
    /// Seed for the default campaign.
    pub seed: u64,
}

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.add_observer(log_simulation_error);

        let settings = app
            .world()
            .get_resource::<SimulationSettings>()
            .cloned()
            .unwrap_or_default();
        if let Err(e) = settings.validate() {
            app.world_mut().trigger(SimulationError::new(
                SimulationErrorContext::Init,
                e.to_string(),
            ));
            return;
        }
        app.insert_resource(settings);

        if !app.world().contains_resource::<Simulation>() {
            match build_default_game(self.seed) {
                Ok(game) => {
                    app.insert_resource(Simulation(game));
                }
                Err(e) => {
                    app.world_mut().trigger(SimulationError::new(
                        SimulationErrorContext::Init,
                        e.to_string(),
                    ));
                    return;
                }
            }
        }

        app.init_resource::<PlayerInput>();
        app.init_resource::<SoundQueue>();
        app.init_resource::<MirrorIndex>();
        app.add_systems(
            Update,
            (step_simulation_system, mirror_entities_system).chain(),
        );
    }
}
