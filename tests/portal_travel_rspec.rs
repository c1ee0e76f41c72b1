//! Behaviour-driven tests using rust-rspec.
//!
//! These tests walk the player onto a dungeon entrance in the default
//! campaign and check where the interact key takes them.

#[path = "support/rspec_runner.rs"]
mod rspec_runner;

use std::fmt;
use std::sync::{Arc, Mutex};

use lifesim::{build_default_game, EntityKind, Game, InputState, Vector2, WorldId};
use rspec_runner::run_serial;
use test_utils::step_game;

const OVERWORLD: WorldId = WorldId(0);

#[derive(Clone)]
struct Campaign {
    game: Arc<Mutex<Option<Game>>>,
    destination: Option<WorldId>,
}

impl fmt::Debug for Campaign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Campaign")
            .field("destination", &self.destination)
            .finish()
    }
}

impl Default for Campaign {
    fn default() -> Self {
        Self {
            game: Arc::new(Mutex::new(None)),
            destination: None,
        }
    }
}

impl Campaign {
    fn with_game<T>(&self, body: impl FnOnce(&mut Game) -> T) -> T {
        let mut guard = self
            .game
            .lock()
            .unwrap_or_else(|err| panic!("campaign lock poisoned: {err}"));
        let Some(game) = guard.as_mut() else {
            panic!("campaign not built");
        };
        body(game)
    }

    fn setup(&mut self) {
        let game = build_default_game(5).unwrap_or_else(|err| panic!("{err}"));
        *self
            .game
            .lock()
            .unwrap_or_else(|err| panic!("campaign lock poisoned: {err}")) = Some(game);
    }

    /// Moves the player onto the first overworld portal leading elsewhere.
    fn stand_on_entrance(&mut self) {
        let destination = self.with_game(|game| {
            let overworld = game.world(OVERWORLD).unwrap_or_else(|err| panic!("{err}"));
            let Some((position, destination)) = overworld.iter().find_map(|(_, entity)| {
                match &entity.kind {
                    EntityKind::Portal(state) => state
                        .destination_world()
                        .filter(|&world| world != OVERWORLD)
                        .map(|world| (entity.position, world)),
                    _ => None,
                }
            }) else {
                panic!("overworld should have an entrance");
            };
            let player = game.player_id().unwrap_or_else(|| panic!("player spawned"));
            if let Some(body) = game
                .world_mut(OVERWORLD)
                .ok()
                .and_then(|world| world.entity_mut(player))
            {
                body.position = position;
            }
            destination
        });
        self.destination = Some(destination);
    }

    fn step(&mut self, interact: bool) {
        let input = InputState {
            interact,
            ..InputState::default()
        };
        self.with_game(|game| {
            step_game(game, &input, 1);
        });
    }

    fn current_world(&self) -> WorldId {
        self.with_game(|game| game.current_world_id())
    }

    fn player_world_holds_player(&self) -> bool {
        self.with_game(|game| {
            let Some(player) = game.player_id() else {
                return false;
            };
            game.current_world()
                .is_ok_and(|world| world.contains(player))
        })
    }

    fn player_inside_current_world(&self) -> bool {
        self.with_game(|game| {
            let Ok(world) = game.current_world() else {
                return false;
            };
            let size = world.size();
            game.player().is_some_and(|player| {
                let Vector2 { x, y } = player.position;
                (0.0..=size.x).contains(&x) && y <= size.y
            })
        })
    }
}

#[test]
fn interacting_on_an_entrance_moves_the_player() {
    run_serial(&rspec::given(
        "the default campaign with the player in the overworld",
        Campaign::default(),
        |ctx| {
            ctx.before_each(|campaign| {
                campaign.setup();
                campaign.stand_on_entrance();
            });

            ctx.when("the player presses interact on an entrance", |ctx| {
                ctx.before_each(|campaign| campaign.step(true));

                ctx.then("the player arrives in the destination world", |campaign| {
                    assert_eq!(Some(campaign.current_world()), campaign.destination);
                    assert!(campaign.player_world_holds_player());
                });

                ctx.then("the player lands inside the new world", |campaign| {
                    assert!(campaign.player_inside_current_world());
                });
            });

            ctx.when("the player only stands on the entrance", |ctx| {
                ctx.before_each(|campaign| campaign.step(false));

                ctx.then("the player stays in the overworld", |campaign| {
                    assert_eq!(campaign.current_world(), OVERWORLD);
                    assert!(campaign.player_world_holds_player());
                });
            });
        },
    ));
}
