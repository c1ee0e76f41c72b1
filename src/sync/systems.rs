//! Systems bridging the simulation with Bevy ECS.

use bevy::prelude::*;
use hashbrown::HashSet;
use log::{debug, trace};

use crate::numeric::{layer_depth, screen_point};
use crate::presentation::{RenderItem, SimulationSettings};

use super::{
    MirrorIndex, PlayerInput, RenderState, SimEntity, Simulation, SimulationError,
    SimulationErrorContext, SoundQueue,
};

/// Spacing between draw layers on the z axis.
const DEPTH_LAYER_STEP: f32 = 0.001;

/// Advances the game by one frame.
///
/// The step length comes from [`SimulationSettings::frame_delta`], fed with
/// the measured [`Time`] delta. Sounds land in the [`SoundQueue`]; failures
/// are raised as [`SimulationError`] events.
#[expect(
    clippy::needless_pass_by_value,
    reason = "Bevy systems require parameters by value, not by reference."
)]
pub fn step_simulation_system(
    mut commands: Commands,
    mut simulation: ResMut<Simulation>,
    mut input: ResMut<PlayerInput>,
    mut sounds: ResMut<SoundQueue>,
    settings: Res<SimulationSettings>,
    time: Res<Time>,
) {
    let dt = settings.frame_delta(time.delta_secs_f64() * 1000.0);
    match simulation.0.step(&input.0, dt, sounds.as_mut()) {
        Ok(report) => {
            trace!("stepped {dt} ms: {report:?}");
            if report.travelled {
                debug!("player moved to {:?}", simulation.0.current_world_id());
            }
        }
        Err(e) => commands.trigger(SimulationError::new(
            SimulationErrorContext::Step,
            e.to_string(),
        )),
    }
    input.0.interact = false;
    input.0.cycle_weapon = 0;
}

/// Rewrites mirrored ECS entities from the current world's render snapshot.
///
/// New simulation entities gain an ECS twin carrying [`SimEntity`],
/// [`Transform`] and [`RenderState`]; twins whose entity left the world are
/// despawned. Changing worlds despawns every twin first.
pub fn mirror_entities_system(
    mut commands: Commands,
    mut simulation: ResMut<Simulation>,
    mut index: ResMut<MirrorIndex>,
    mut mirrored: Query<(&mut Transform, &mut RenderState), With<SimEntity>>,
) {
    let world_id = simulation.0.current_world_id();
    let Ok(world) = simulation.0.current_world_mut() else {
        return;
    };
    let snapshot = world.render_snapshot();

    if index.world != Some(world_id) {
        for (_, entity) in index.entities.drain() {
            commands.entity(entity).despawn();
        }
        index.world = Some(world_id);
    }

    let mut seen = HashSet::with_capacity(snapshot.len());
    for (layer, item) in snapshot.into_iter().enumerate() {
        let transform = transform_for(&item, layer);
        seen.insert(item.id);
        let existing = index
            .entity_for(item.id)
            .and_then(|entity| mirrored.get_mut(entity).ok());
        if let Some((mut current, mut state)) = existing {
            *current = transform;
            state.0 = item;
        } else {
            let id = item.id;
            let name = Name::new(item.name.clone());
            let entity = commands
                .spawn((SimEntity(id), transform, RenderState(item), name))
                .id();
            index.entities.insert(id, entity);
        }
    }

    index.entities.retain(|id, entity| {
        let keep = seen.contains(id);
        if !keep {
            commands.entity(*entity).despawn();
        }
        keep
    });
}

/// Places a render item in Bevy space.
///
/// The simulation's `y` grows downwards while Bevy's grows upwards, so `y` is
/// negated. `layer` is the item's rank in the depth-sorted snapshot and
/// becomes the z coordinate, so later items draw on top.
#[must_use]
pub fn transform_for(item: &RenderItem, layer: usize) -> Transform {
    let (x, y) = screen_point(item.position + item.shake_offset);
    Transform::from_xyz(x, y, layer_depth(layer, DEPTH_LAYER_STEP))
}
