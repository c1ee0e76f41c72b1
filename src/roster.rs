//! Factories for every creature, prop and pickup in the game, plus the loot
//! tables run when they die.
//!
//! Each factory returns a fresh [`Entity`] at the origin; callers place it
//! with [`World::add`] or hand the factory to a [`crate::Spawner`].

use rand::seq::SliceRandom;
use rand::Rng;

use crate::actor::{AiBrain, AttackStyle, TargetSelection};
use crate::components::Team;
use crate::entity::{
    Entity, EntityKind, ItemEffect, ItemState, PickupCondition, PlayerEffect, PlayerState,
};
use crate::vector_math::Vector2;
use crate::weapons::{spawn_blood, spawn_explosion, spawn_frozen_cloud, Weapon};
use crate::world::World;
use crate::{LOOT_DROP_RADIUS, PLAYER_HEALTH, PLAYER_SPEED};

/// Extra troops granted by a troop pickup.
const TROOPS_PER_PICKUP: u32 = 2;
/// Zoomers released when a zoomer boss dies.
const ZOOMER_BOSS_BROOD: usize = 3;

fn creature(name: &str, hitbox: Vector2, team: Team, speed: f64, health: f64) -> Entity {
    Entity::new(name, hitbox)
        .with_health(health)
        .with_team(team)
        .with_speed(speed)
}

fn brain(
    attack: AttackStyle,
    damage: f64,
    sight: f64,
    follow: f64,
    interval: f64,
    retreat: f64,
) -> EntityKind {
    EntityKind::Ai(AiBrain::new(attack, damage, sight, follow, interval, retreat))
}

fn boss_brain(
    attack: AttackStyle,
    damage: f64,
    sight: f64,
    follow: f64,
    interval: f64,
    retreat: f64,
) -> EntityKind {
    EntityKind::Ai(
        AiBrain::new(attack, damage, sight, follow, interval, retreat)
            .with_targeting(TargetSelection::Nearest),
    )
}

/// The player character.
#[must_use]
pub fn player() -> Entity {
    creature("Player", Vector2::new(64.0, 64.0), Team::Ally, PLAYER_SPEED, PLAYER_HEALTH)
        .with_kind(EntityKind::Player(PlayerState::default()))
        .on_death(drop_grave)
}

/// Melee grunt.
#[must_use]
pub fn brawler() -> Entity {
    creature("Brawler", Vector2::new(64.0, 64.0), Team::Enemy, 0.5, 6.0)
        .with_kind(brain(AttackStyle::Melee, 1.0, 600.0, 0.1, 750.0, 175.0))
        .on_death(brawler_loot)
}

/// Frostland reskin of the brawler.
#[must_use]
pub fn cold_brawler() -> Entity {
    let mut entity = brawler();
    entity.name = "Cold Brawler".into();
    entity
}

/// Large melee boss that shrugs off knockback.
#[must_use]
pub fn brawler_boss() -> Entity {
    creature("Brawler Boss", Vector2::new(128.0, 128.0), Team::Enemy, 0.65, 25.0)
        .with_knockback(false)
        .with_kind(boss_brain(AttackStyle::Melee, 3.0, 1500.0, 0.035, 1000.0, 225.0))
        .on_death(brawler_boss_loot)
}

/// Archer.
#[must_use]
pub fn ranger() -> Entity {
    creature("Ranger", Vector2::new(64.0, 64.0), Team::Enemy, 0.4, 3.0)
        .with_kind(brain(
            AttackStyle::Ranged(Weapon::Arrows),
            1.0,
            700.0,
            0.08,
            2000.0,
            350.0,
        ))
        .on_death(ranger_loot)
}

/// Archer boss with a faster draw.
#[must_use]
pub fn ranger_boss() -> Entity {
    creature("Ranger Boss", Vector2::new(100.0, 100.0), Team::Enemy, 0.5, 20.0)
        .with_kind(boss_brain(
            AttackStyle::Ranged(Weapon::Arrows),
            1.0,
            800.0,
            0.05,
            1000.0,
            350.0,
        ))
        .on_death(ranger_boss_loot)
}

/// Slow grenadier that explodes on death.
#[must_use]
pub fn boomer() -> Entity {
    creature("Boomer", Vector2::new(70.0, 70.0), Team::Enemy, 0.25, 8.0)
        .with_kind(brain(
            AttackStyle::Ranged(Weapon::Grenade),
            1.0,
            400.0,
            0.05,
            3000.0,
            250.0,
        ))
        .on_death(boomer_loot)
}

/// Fast gunner.
#[must_use]
pub fn zoomer() -> Entity {
    creature("Zoomer", Vector2::new(70.0, 70.0), Team::Enemy, 0.55, 6.0)
        .with_kind(brain(
            AttackStyle::Ranged(Weapon::StandardGun),
            2.0,
            300.0,
            0.05,
            300.0,
            200.0,
        ))
        .on_death(zoomer_loot)
}

/// Gunner boss that releases zoomers when it dies.
#[must_use]
pub fn zoomer_boss() -> Entity {
    creature("Zoomer Boss", Vector2::new(128.0, 200.0), Team::Enemy, 0.75, 65.0)
        .with_kind(boss_brain(
            AttackStyle::Ranged(Weapon::StandardGun),
            2.0,
            600.0,
            0.05,
            200.0,
            200.0,
        ))
        .on_death(zoomer_boss_loot)
}

/// Ramming car.
#[must_use]
pub fn car() -> Entity {
    creature("Car", Vector2::new(110.0, 80.0), Team::Enemy, 0.5, 12.0)
        .with_kind(brain(AttackStyle::Melee, 2.0, 300.0, 0.1, 5000.0, 400.0))
        .on_death(car_loot)
}

/// Freeze-ray turret on legs.
#[must_use]
pub fn cooler() -> Entity {
    creature("Cooler", Vector2::new(80.0, 80.0), Team::Enemy, 0.45, 8.0)
        .with_kind(brain(
            AttackStyle::Ranged(Weapon::FreezeRay),
            1.0,
            600.0,
            0.05,
            4500.0,
            250.0,
        ))
        .on_death(cooler_loot)
}

/// Large, tough freeze-ray carrier.
#[must_use]
pub fn freezer() -> Entity {
    creature("Freezer", Vector2::new(140.0, 170.0), Team::Enemy, 0.5, 50.0)
        .with_kind(brain(
            AttackStyle::Ranged(Weapon::FreezeRay),
            1.0,
            600.0,
            0.03,
            4000.0,
            400.0,
        ))
        .on_death(freezer_loot)
}

/// Frostland melee boss.
#[must_use]
pub fn yeti() -> Entity {
    creature("Yeti", Vector2::new(128.0, 128.0), Team::Enemy, 0.65, 60.0)
        .with_knockback(false)
        .with_kind(boss_brain(AttackStyle::Melee, 3.0, 1500.0, 0.035, 350.0, 225.0))
        .on_death(yeti_loot)
}

/// Allied gunner placed by the player. Its contact damage is the player's
/// damage multiplier at placement time.
#[must_use]
pub fn troop(damage_multiplier: f64) -> Entity {
    creature("Troop", Vector2::new(64.0, 64.0), Team::Ally, 0.4, 8.0)
        .with_kind(brain(
            AttackStyle::Ranged(Weapon::StandardGun),
            damage_multiplier,
            600.0,
            0.05,
            1500.0,
            350.0,
        ))
        .on_death(spawn_blood)
}

fn tree_like(name: &str, hitbox: Vector2, health: f64) -> Entity {
    Entity::new(name, hitbox)
        .with_health(health)
        .with_solid(true)
        .on_death(tree_loot)
}

/// Overworld tree; drops an apple.
#[must_use]
pub fn tree() -> Entity {
    tree_like("Tree", Vector2::new(50.0, 165.0), 15.0)
}

/// City tree.
#[must_use]
pub fn city_tree() -> Entity {
    tree_like("City Tree", Vector2::new(55.0, 170.0), 20.0)
}

/// Snow-covered pine.
#[must_use]
pub fn winter_tree() -> Entity {
    tree_like("Winter Tree", Vector2::new(30.0, 320.0), 25.0)
}

/// Beach palm.
#[must_use]
pub fn palm_tree() -> Entity {
    tree_like("Palm Tree", Vector2::new(30.0, 150.0), 30.0)
}

/// Indestructible boulder.
#[must_use]
pub fn rock() -> Entity {
    Entity::new("Rock", Vector2::new(85.0, 50.0)).with_solid(true)
}

/// Indestructible street light.
#[must_use]
pub fn street_light() -> Entity {
    Entity::new("Street Light", Vector2::new(12.0, 130.0)).with_solid(true)
}

/// Indestructible beach umbrella.
#[must_use]
pub fn umbrella() -> Entity {
    Entity::new("Umbrella", Vector2::new(10.0, 135.0)).with_solid(true)
}

/// Grave left where something died; fights for `team` and explodes when
/// destroyed.
#[must_use]
pub fn grave(team: Team) -> Entity {
    Entity::new("Grave", Vector2::new(60.0, 70.0))
        .with_health(30.0)
        .with_team(team)
        .with_solid(true)
        .on_death(spawn_explosion)
}

fn item(name: &str, effect: ItemEffect, condition: PickupCondition) -> Entity {
    Entity::new(name, Vector2::new(40.0, 40.0))
        .with_speed(0.3)
        .with_kind(EntityKind::Item(ItemState { effect, condition }))
}

/// Heals 10, but only while the player is hurt.
#[must_use]
pub fn apple() -> Entity {
    item("Apple", ItemEffect::Heal(10.0), PickupCondition::PlayerHurt)
}

/// Raises the player's damage multiplier.
#[must_use]
pub fn damage_up() -> Entity {
    item("Dmg Up", ItemEffect::RaiseDamage(0.5), PickupCondition::Always)
}

/// Raises the player's maximum health.
#[must_use]
pub fn shield() -> Entity {
    item("Shield", ItemEffect::RaiseMaxHealth(10.0), PickupCondition::Always)
}

/// Ammunition for `weapon`.
#[must_use]
pub fn ammo(weapon: Weapon) -> Entity {
    let (name, amount) = match weapon {
        Weapon::Shotgun => ("Shotgun", 8),
        Weapon::Arrows => ("Arrows", 8),
        Weapon::Grenade => ("Grenade", 6),
        Weapon::FreezeRay => ("Freeze Ray", 8),
        Weapon::PlaceTroop => ("Troops", TROOPS_PER_PICKUP),
        Weapon::StandardGun => ("Gun", 0),
    };
    item(name, ItemEffect::Ammo(weapon, amount), PickupCondition::Always)
}

/// Timed player effect.
#[must_use]
pub fn buff(effect: PlayerEffect) -> Entity {
    let (name, duration) = match effect {
        PlayerEffect::Speed => ("Speed", 8000.0),
        PlayerEffect::Metalsuit => ("Metalsuit", 8000.0),
        PlayerEffect::Invisible => ("Invisible", 5000.0),
    };
    item(name, ItemEffect::Buff(effect, duration), PickupCondition::Always)
}

/// Places `entity` at a random point [`LOOT_DROP_RADIUS`] from `source`.
pub fn drop_item(world: &mut World, source: Vector2, entity: Entity) {
    let angle = world.rng_mut().gen_range(0.0..360.0);
    let id = world.add(source + Vector2::polar(LOOT_DROP_RADIUS, angle), entity);
    let size = world.size();
    if let Some(dropped) = world.entity_mut(id) {
        dropped.keep_in_bounds(size);
    }
}

fn chance(world: &mut World, probability: f64) -> bool {
    world.rng_mut().gen_bool(probability)
}

fn drop_if(world: &mut World, source: Vector2, probability: f64, factory: fn() -> Entity) {
    if chance(world, probability) {
        drop_item(world, source, factory());
    }
}

fn drop_one_of(world: &mut World, source: Vector2, factories: &[fn() -> Entity]) {
    if let Some(factory) = factories.choose(world.rng_mut()) {
        drop_item(world, source, factory());
    }
}

/// One roll for the whole table, then one pick from it.
fn maybe_drop_one_of(
    world: &mut World,
    source: Vector2,
    probability: f64,
    factories: &[fn() -> Entity],
) {
    if chance(world, probability) {
        drop_one_of(world, source, factories);
    }
}

fn troops() -> Entity {
    ammo(Weapon::PlaceTroop)
}

fn drop_grave(source: &Entity, world: &mut World, team: Team) {
    world.add(source.position, grave(team));
}

fn tree_loot(source: &Entity, world: &mut World, _team: Team) {
    drop_item(world, source.position, apple());
}

fn brawler_loot(source: &Entity, world: &mut World, team: Team) {
    spawn_blood(source, world, team);
    maybe_drop_one_of(
        world,
        source.position,
        0.25,
        &[|| ammo(Weapon::Shotgun), || buff(PlayerEffect::Speed)],
    );
    drop_if(world, source.position, 0.1, troops);
}

fn ranger_loot(source: &Entity, world: &mut World, team: Team) {
    spawn_blood(source, world, team);
    maybe_drop_one_of(
        world,
        source.position,
        0.25,
        &[|| ammo(Weapon::Arrows), || buff(PlayerEffect::Invisible), apple],
    );
    drop_if(world, source.position, 0.1, troops);
}

fn boomer_loot(source: &Entity, world: &mut World, team: Team) {
    spawn_blood(source, world, team);
    spawn_explosion(source, world, team);
    drop_if(world, source.position, 0.2, || ammo(Weapon::Grenade));
    drop_if(world, source.position, 0.2, troops);
}

fn zoomer_loot(source: &Entity, world: &mut World, team: Team) {
    spawn_explosion(source, world, team);
    maybe_drop_one_of(
        world,
        source.position,
        0.15,
        &[|| buff(PlayerEffect::Metalsuit), shield],
    );
    drop_item(world, source.position, buff(PlayerEffect::Speed));
    drop_if(world, source.position, 0.3, troops);
}

fn car_loot(source: &Entity, world: &mut World, team: Team) {
    spawn_explosion(source, world, team);
    drop_if(world, source.position, 0.3, || buff(PlayerEffect::Metalsuit));
    drop_if(world, source.position, 0.1, troops);
}

fn brawler_boss_loot(source: &Entity, world: &mut World, team: Team) {
    spawn_blood(source, world, team);
    drop_one_of(world, source.position, &[shield, damage_up]);
}

fn ranger_boss_loot(source: &Entity, world: &mut World, team: Team) {
    spawn_blood(source, world, team);
    drop_item(world, source.position, apple());
    drop_one_of(
        world,
        source.position,
        &[shield, damage_up, || buff(PlayerEffect::Invisible)],
    );
}

fn cooler_loot(source: &Entity, world: &mut World, team: Team) {
    spawn_frozen_cloud(source, world, team);
    drop_if(world, source.position, 0.5, || ammo(Weapon::FreezeRay));
    drop_if(world, source.position, 0.1, troops);
}

fn freezer_loot(source: &Entity, world: &mut World, team: Team) {
    spawn_explosion(source, world, team);
    drop_item(world, source.position, ammo(Weapon::FreezeRay));
    drop_item(world, source.position, buff(PlayerEffect::Metalsuit));
}

fn yeti_loot(source: &Entity, world: &mut World, team: Team) {
    spawn_blood(source, world, team);
    drop_one_of(world, source.position, &[shield, damage_up]);
    drop_item(world, source.position, ammo(Weapon::FreezeRay));
}

fn zoomer_boss_loot(source: &Entity, world: &mut World, team: Team) {
    spawn_explosion(source, world, team);
    drop_one_of(world, source.position, &[shield, damage_up]);
    drop_one_of(world, source.position, &[shield, damage_up]);
    drop_item(world, source.position, buff(PlayerEffect::Metalsuit));
    for _ in 0..ZOOMER_BOSS_BROOD {
        drop_item(world, source.position, zoomer());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Damageable;
    use crate::world::WorldConfig;
    use rstest::{fixture, rstest};

    #[fixture]
    fn world() -> World {
        World::new(WorldConfig::open("Loot", Vector2::new(1500.0, 1500.0)), 99)
            .unwrap_or_else(|err| panic!("valid world: {err}"))
    }

    fn kill(world: &mut World, entity: Entity) {
        let id = world.add(Vector2::new(750.0, 750.0), entity);
        if let Some(target) = world.entity_mut(id) {
            target.invincible = false;
            target.hurt(f64::MAX);
        }
        world.update(1.0);
    }

    fn count(world: &World, name: &str) -> usize {
        world.iter().filter(|(_, entity)| entity.name == name).count()
    }

    #[rstest]
    #[case(brawler(), Team::Enemy, 6.0)]
    #[case(brawler_boss(), Team::Enemy, 25.0)]
    #[case(yeti(), Team::Enemy, 60.0)]
    #[case(troop(1.0), Team::Ally, 8.0)]
    #[case(tree(), Team::Neutral, 15.0)]
    fn roster_stats(#[case] entity: Entity, #[case] team: Team, #[case] health: f64) {
        assert_eq!(entity.team, team);
        assert!((entity.max_health - health).abs() < f64::EPSILON);
        assert!(!entity.invincible);
    }

    #[rstest]
    fn bosses_target_the_nearest_opponent() {
        let boss = brawler_boss();
        let targeting = boss.brain().map(|brain| brain.targeting);
        assert_eq!(targeting, Some(TargetSelection::Nearest));
        assert!(!boss.take_knockback);
    }

    #[rstest]
    fn scenery_is_indestructible() {
        for entity in [rock(), street_light(), umbrella()] {
            assert!(entity.invincible);
            assert!(entity.solid);
        }
    }

    #[rstest]
    fn trees_drop_an_apple(mut world: World) {
        kill(&mut world, tree());
        assert_eq!(count(&world, "Apple"), 1);
        let apple_position = world
            .iter()
            .find(|(_, entity)| entity.name == "Apple")
            .map(|(_, entity)| entity.position)
            .unwrap_or_default();
        let offset = apple_position.distance(Vector2::new(750.0, 750.0));
        assert!((offset - LOOT_DROP_RADIUS).abs() < 1e-6, "offset {offset}");
    }

    #[rstest]
    fn zoomer_boss_releases_its_brood(mut world: World) {
        kill(&mut world, zoomer_boss());
        assert_eq!(count(&world, "Zoomer"), ZOOMER_BOSS_BROOD);
        assert_eq!(count(&world, "Explosion"), 1);
        assert_eq!(count(&world, "Metalsuit"), 1);
    }

    fn non_troop_items(world: &World) -> usize {
        world
            .iter()
            .filter(|(_, entity)| matches!(entity.kind, EntityKind::Item(_)))
            .filter(|(_, entity)| entity.name != "Troops")
            .count()
    }

    #[rstest]
    #[case::brawler(brawler, 0.25)]
    #[case::ranger(ranger, 0.25)]
    #[case::zoomer(zoomer, 1.15)]
    fn loot_tables_roll_once_per_death(#[case] factory: fn() -> Entity, #[case] rate: f64) {
        let deaths: u32 = 2000;
        let dropped: usize = (0..u64::from(deaths))
            .map(|seed| {
                let mut arena =
                    World::new(WorldConfig::open("Loot", Vector2::new(1500.0, 1500.0)), seed)
                        .unwrap_or_else(|err| panic!("valid world: {err}"));
                kill(&mut arena, factory());
                non_troop_items(&arena)
            })
            .sum();
        let observed = f64::from(u32::try_from(dropped).unwrap_or(u32::MAX)) / f64::from(deaths);
        assert!((observed - rate).abs() < 0.05, "{observed} items per death");
    }

    #[rstest]
    fn player_leaves_a_grave_of_their_team(mut world: World) {
        kill(&mut world, player());
        let grave_team = world
            .iter()
            .find(|(_, entity)| entity.name == "Grave")
            .map(|(_, entity)| entity.team);
        assert_eq!(grave_team, Some(Team::Ally));
    }

    #[rstest]
    fn drops_stay_inside_the_world(mut world: World) {
        drop_item(&mut world, Vector2::new(0.0, 0.0), apple());
        let (_, dropped) = world.iter().next().unwrap_or_else(|| panic!("dropped"));
        assert!(dropped.position.x >= 0.0 && dropped.position.y >= 0.0);
    }
}
