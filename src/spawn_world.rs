//! Assembles the default campaign: seven outdoor worlds, the cave, and the
//! houses, offices and igloos scattered across them.

use log::info;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::entity::{Entity, EntityId, EntityKind, PortalState};
use crate::error::GameError;
use crate::game::Game;
use crate::roster;
use crate::spawner::{Spawner, SpawnerConfig};
use crate::vector_math::Vector2;
use crate::world::{World, WorldConfig, WorldId};

const ENTER: &str = "Enter? (SPACE)";
const EXIT: &str = "Exit? (SPACE)";
const DUNGEONS_PER_WORLD: usize = 5;
/// The forest completes after a minute of survival.
const FOREST_COMPLETION_MS: f64 = 60_000.0;

type Factory = fn() -> Entity;

/// Kind of building that leads into a dungeon.
struct DungeonKind {
    name: &'static str,
    hitbox: Vector2,
    size_range: (u32, u32),
    enemy_sets: &'static [(usize, Factory)],
    furnish: Option<fn(&mut World)>,
}

const HOUSE: DungeonKind = DungeonKind {
    name: "House",
    hitbox: Vector2::new(160.0, 220.0),
    size_range: (800, 1000),
    enemy_sets: &[
        (4, roster::brawler),
        (3, roster::ranger),
        (1, roster::brawler_boss),
    ],
    furnish: None,
};

const OFFICE: DungeonKind = DungeonKind {
    name: "Office",
    hitbox: Vector2::new(150.0, 185.0),
    size_range: (700, 900),
    enemy_sets: &[
        (4, roster::brawler),
        (3, roster::ranger),
        (2, roster::boomer),
        (1, roster::brawler_boss),
        (1, roster::zoomer),
    ],
    furnish: None,
};

const IGLOO: DungeonKind = DungeonKind {
    name: "Igloo",
    hitbox: Vector2::new(185.0, 185.0),
    size_range: (600, 800),
    enemy_sets: &[
        (6, roster::cold_brawler),
        (4, roster::ranger),
        (3, roster::boomer),
        (2, roster::yeti),
        (2, roster::zoomer),
        (3, roster::cooler),
        (1, roster::freezer),
    ],
    furnish: Some(add_fireplace),
};

fn portal(name: &str, hitbox: Vector2, message: &str, solid: bool) -> Entity {
    Entity::new(name, hitbox)
        .with_solid(solid)
        .with_kind(EntityKind::Portal(PortalState::new(message)))
}

fn add_fireplace(world: &mut World) {
    let size = world.size();
    world.add(
        Vector2::new(size.x / 2.0, size.y + 100.0),
        Entity::new("Fireplace", Vector2::new(120.0, 120.0)),
    );
}

fn populate(
    game: &mut Game,
    world: WorldId,
    rules: Vec<(SpawnerConfig, Factory)>,
) -> Result<(), GameError> {
    let target = game.world_mut(world)?;
    for (config, factory) in rules {
        target.add_spawner(Spawner::new(config, factory)?);
    }
    Ok(())
}

fn rule(config: SpawnerConfig, factory: Factory) -> (SpawnerConfig, Factory) {
    (config, factory)
}

fn scatter(
    game: &mut Game,
    world: WorldId,
    count: usize,
    factory: Factory,
) -> Result<(), GameError> {
    let target = game.world_mut(world)?;
    for _ in 0..count {
        let position = target.random_position();
        target.add(position, factory());
    }
    Ok(())
}

/// Points `from` at `to` so each leads to the other.
fn link(
    game: &mut Game,
    from: (WorldId, EntityId),
    to: (WorldId, EntityId),
) -> Result<(), GameError> {
    for ((world, id), destination) in [(from, to), (to, from)] {
        if let Some(EntityKind::Portal(state)) = game
            .world_mut(world)?
            .entity_mut(id)
            .map(|entity| &mut entity.kind)
        {
            state.to_entity = Some(destination);
        }
    }
    Ok(())
}

/// Builds one dungeon world behind a building placed at a random spot in
/// `outside`, filled with a randomly chosen enemy set.
fn add_dungeon(
    game: &mut Game,
    rng: &mut ChaCha8Rng,
    outside: WorldId,
    kind: &DungeonKind,
    index: usize,
) -> Result<WorldId, GameError> {
    let (low, high) = kind.size_range;
    let size = Vector2::new(
        f64::from(rng.gen_range(low..=high)),
        f64::from(rng.gen_range(low..=high)),
    );
    let dungeon = game.add_world(WorldConfig::walled(format!("{} #{index}", kind.name), size))?;

    let outer = game.world_mut(outside)?;
    let position = outer.random_position();
    let entrance = outer.add(position, portal(kind.name, kind.hitbox, ENTER, true));

    let inner = game.world_mut(dungeon)?;
    let door = inner.add(
        Vector2::new(size.x / 2.0, -60.0),
        portal("Door", Vector2::new(100.0, 120.0), EXIT, false),
    );
    if let Some(furnish) = kind.furnish {
        furnish(inner);
    }
    if let Some(&(count, factory)) = kind.enemy_sets.choose(rng) {
        for _ in 0..count {
            let offset = Vector2::polar(
                f64::from(rng.gen_range(50_u32..=250)),
                f64::from(rng.gen_range(0_u32..=360)),
            );
            inner.add(Vector2::new(size.x * 0.5, size.y * 0.75) + offset, factory());
        }
    }

    link(game, (outside, entrance), (dungeon, door))?;
    Ok(dungeon)
}

fn add_dungeons(
    game: &mut Game,
    rng: &mut ChaCha8Rng,
    outside: WorldId,
    kind: &DungeonKind,
) -> Result<(), GameError> {
    for index in 0..DUNGEONS_PER_WORLD {
        add_dungeon(game, rng, outside, kind, index)?;
    }
    Ok(())
}

/// Builds the full default game and places the player in the overworld.
///
/// # Errors
/// Returns [`GameError`] if any built-in configuration is rejected, which
/// indicates a broken preset rather than a runtime condition.
pub fn build_default_game(seed: u64) -> Result<Game, GameError> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut game = Game::new(seed);

    let overworld = game.add_campaign_world(WorldConfig::open(
        "Overworld",
        Vector2::new(2500.0, 2500.0),
    ))?;
    let city = game.add_campaign_world(WorldConfig::open("City", Vector2::new(3000.0, 3000.0)))?;
    let frostland = game.add_campaign_world(WorldConfig::open(
        "Frostland",
        Vector2::new(3000.0, 3500.0),
    ))?;
    let forest = game.add_campaign_world(
        WorldConfig::open("Forest", Vector2::new(2500.0, 2500.0))
            .with_completion_time(FOREST_COMPLETION_MS),
    )?;
    let beach = game.add_campaign_world(WorldConfig::open("Beach", Vector2::new(3000.0, 1500.0)))?;
    let cave = game.add_campaign_world(WorldConfig::walled("Cave", Vector2::new(1500.0, 1600.0)))?;
    let space_station = game.add_campaign_world(WorldConfig::walled(
        "Space Station",
        Vector2::new(3000.0, 2000.0),
    ))?;

    let centre = game.world(overworld)?.center();
    game.spawn_player(overworld, centre)?;

    // Overworld
    let cave_entrance = game.world_mut(overworld)?.add(
        Vector2::new(2000.0, 2000.0),
        portal("Cave", Vector2::new(280.0, 145.0), ENTER, true),
    );
    scatter(&mut game, overworld, 8, roster::rock)?;
    populate(
        &mut game,
        overworld,
        vec![
            rule(
                SpawnerConfig::every(8000.0, 10)
                    .with_center_spread(1.25)
                    .with_pre_spawned(10),
                roster::tree,
            ),
            rule(SpawnerConfig::every(8000.0, 6).with_max_per_wave(2), roster::brawler),
            rule(SpawnerConfig::every(10_000.0, 3), roster::ranger),
            rule(SpawnerConfig::every(45_000.0, 1), roster::brawler_boss),
        ],
    )?;
    add_dungeons(&mut game, &mut rng, overworld, &HOUSE)?;

    // Cave
    let cave_exit = game.world_mut(cave)?.add(
        Vector2::new(750.0, -80.0),
        portal("Cave Exit", Vector2::new(200.0, 120.0), EXIT, false),
    );
    link(&mut game, (overworld, cave_entrance), (cave, cave_exit))?;
    populate(
        &mut game,
        cave,
        vec![rule(SpawnerConfig::every(2000.0, 4).with_pre_spawned(1), roster::brawler_boss)],
    )?;

    // City
    scatter(&mut game, city, 8, roster::street_light)?;
    add_dungeons(&mut game, &mut rng, city, &OFFICE)?;
    populate(
        &mut game,
        city,
        vec![
            rule(SpawnerConfig::every(0.0, 8).with_pre_spawned(12), roster::city_tree),
            rule(SpawnerConfig::every(6000.0, 3).with_pre_spawned(1), roster::car),
            rule(SpawnerConfig::every(10_000.0, 4).with_max_per_wave(2), roster::brawler),
            rule(SpawnerConfig::every(20_000.0, 1), roster::boomer),
            rule(SpawnerConfig::every(60_000.0, 2), roster::brawler_boss),
        ],
    )?;

    // Frostland
    populate(
        &mut game,
        frostland,
        vec![
            rule(
                SpawnerConfig::every(6000.0, 6)
                    .with_center_spread(2.0)
                    .with_pre_spawned(10),
                roster::winter_tree,
            ),
            rule(SpawnerConfig::every(6000.0, 4).with_max_per_wave(2), roster::cold_brawler),
            rule(SpawnerConfig::every(6000.0, 4), roster::cooler),
            rule(SpawnerConfig::every(20_000.0, 2), roster::freezer),
            rule(SpawnerConfig::every(45_000.0, 1), roster::yeti),
        ],
    )?;
    add_dungeons(&mut game, &mut rng, frostland, &IGLOO)?;

    // Forest
    scatter(&mut game, forest, 8, roster::rock)?;
    populate(
        &mut game,
        forest,
        vec![
            rule(
                SpawnerConfig::every(7000.0, 8)
                    .with_max_per_wave(2)
                    .with_pre_spawned(2),
                roster::ranger,
            ),
            rule(SpawnerConfig::every(10_000.0, 1), roster::ranger_boss),
            rule(SpawnerConfig::every(5000.0, 16).with_pre_spawned(18), roster::winter_tree),
        ],
    )?;

    // Beach
    populate(
        &mut game,
        beach,
        vec![
            rule(
                SpawnerConfig::every(8000.0, 6)
                    .with_max_per_wave(2)
                    .with_center_spread(100.0),
                roster::zoomer,
            ),
            rule(SpawnerConfig::every(10_000.0, 3), roster::cooler),
        ],
    )?;
    scatter(&mut game, beach, 5, roster::umbrella)?;
    populate(
        &mut game,
        beach,
        vec![rule(SpawnerConfig::every(5000.0, 8).with_pre_spawned(12), roster::palm_tree)],
    )?;
    scatter(&mut game, beach, 5, roster::rock)?;

    // Space station
    populate(
        &mut game,
        space_station,
        vec![
            rule(SpawnerConfig::every(0.0, 8).with_pre_spawned(8), roster::city_tree),
            rule(SpawnerConfig::every(6000.0, 4).with_max_per_wave(2), roster::boomer),
            rule(SpawnerConfig::every(10_000.0, 4).with_max_per_wave(2), roster::zoomer),
            rule(SpawnerConfig::every(10_000.0, 3), roster::brawler_boss),
            rule(SpawnerConfig::every(10_000.0, 3), roster::ranger_boss),
            rule(SpawnerConfig::every(30_000.0, 2), roster::yeti),
            rule(SpawnerConfig::every(30_000.0, 2), roster::zoomer_boss),
        ],
    )?;

    info!("built {} worlds", game.world_count());
    Ok(game)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn game() -> Game {
        build_default_game(2024).unwrap_or_else(|err| panic!("default game: {err}"))
    }

    #[rstest]
    fn every_world_is_registered(game: Game) {
        assert_eq!(game.campaign().len(), 7);
        assert_eq!(game.world_count(), 7 + 3 * DUNGEONS_PER_WORLD);
    }

    #[rstest]
    fn player_starts_in_the_middle_of_the_overworld(game: Game) {
        let position = game.player().map(|player| player.position);
        assert_eq!(position, Some(Vector2::new(1250.0, 1250.0)));
        assert_eq!(game.current_world_id(), WorldId(0));
    }

    #[rstest]
    fn dungeon_doors_lead_back_outside(game: Game) {
        let house = game
            .world(WorldId(7))
            .unwrap_or_else(|err| panic!("{err}"));
        assert!(house.solid_border());
        let door = house
            .iter()
            .find(|(_, entity)| entity.name == "Door")
            .map(|(_, entity)| entity.kind.clone());
        let Some(EntityKind::Portal(state)) = door else {
            panic!("house has no door");
        };
        assert_eq!(state.destination_world(), Some(WorldId(0)));
    }

    #[rstest]
    fn overworld_has_its_preset_spawners(game: Game) {
        let overworld = game.world(WorldId(0)).unwrap_or_else(|err| panic!("{err}"));
        assert_eq!(overworld.spawners().len(), 4);
        let trees = overworld
            .iter()
            .filter(|(_, entity)| entity.name == "Tree")
            .count();
        assert_eq!(trees, 10);
    }
}
