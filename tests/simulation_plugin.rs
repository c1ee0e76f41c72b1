//! Headless Bevy app driving the default campaign through `SimulationPlugin`.

use bevy::prelude::*;
use lifesim::presentation::RenderKind;
use lifesim::sync::{MirrorIndex, PlayerInput, RenderState, SimEntity, Simulation, SoundQueue};
use lifesim::{InputState, SimulationPlugin, SimulationSettings, SoundId, Vector2};
use rstest::{fixture, rstest};

#[fixture]
fn app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.insert_resource(SimulationSettings {
        fixed_frame_ms: Some(16.0),
        ..SimulationSettings::default()
    });
    app.add_plugins(SimulationPlugin { seed: 12 });
    app
}

fn player_twin(app: &mut App) -> Option<(Transform, RenderState)> {
    let mut query = app.world_mut().query::<(&Transform, &RenderState)>();
    query
        .iter(app.world())
        .find(|(_, state)| state.0.kind == RenderKind::Player)
        .map(|(transform, state)| (*transform, state.clone()))
}

#[rstest]
fn the_player_is_mirrored_with_flipped_y(mut app: App) {
    app.update();
    let Some((transform, state)) = player_twin(&mut app) else {
        panic!("player should be mirrored");
    };
    let shaken = state.0.position + state.0.shake_offset;
    assert!((f64::from(transform.translation.x) - shaken.x).abs() < 1e-3);
    assert!((f64::from(transform.translation.y) + shaken.y).abs() < 1e-3);
}

#[rstest]
fn every_live_entity_has_one_twin(mut app: App) {
    app.update();
    let live = app
        .world()
        .resource::<Simulation>()
        .0
        .current_world()
        .map_or(0, |world| world.iter().filter(|(_, entity)| entity.alive).count());
    let twins = app
        .world_mut()
        .query::<&SimEntity>()
        .iter(app.world())
        .count();
    assert_eq!(twins, live);
    assert_eq!(app.world().resource::<MirrorIndex>().len(), live);
}

#[rstest]
fn holding_fire_queues_a_shot_sound(mut app: App) {
    app.update();
    let Some((_, state)) = player_twin(&mut app) else {
        panic!("player should be mirrored");
    };
    app.world_mut().resource_mut::<PlayerInput>().0 = InputState {
        primary_action_held: true,
        cursor_world_position: state.0.position + Vector2::new(200.0, 0.0),
        ..InputState::default()
    };
    app.update();
    let sounds: Vec<SoundId> = app
        .world_mut()
        .resource_mut::<SoundQueue>()
        .drain()
        .map(|queued| queued.sound)
        .collect();
    assert!(sounds.contains(&SoundId::Shoot));
}
