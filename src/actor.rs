//! Steering for AI-controlled entities.
//!
//! Each frame an AI either chases and attacks a target, backs off to its
//! retreat radius while the attack recharges, or wanders when nothing is in
//! sight. Independently it spreads away from nearby teammates so crowds do not
//! stack. Planning only reads the population; everything that touches another
//! entity is returned as an [`Effect`] for the world to apply.

use log::trace;
use rand::Rng;

use crate::audio::{SoundEvent, SoundId};
use crate::components::Team;
use crate::entity::{Collidable, Entity, EntityId};
use crate::vector_math::Vector2;
use crate::weapons::Weapon;
use crate::world::{Effect, Population};
use crate::{
    ATTACK_JITTER_MS, CENTRE_PULL, IDLE_DAMPING, MELEE_KNOCKBACK_SCALE, RETREAT_BASE_URGENCY,
    SPREAD_EPSILON, WANDER_ACCEL, WANDER_KICK, WANDER_TOGGLE_CHANCE,
};

/// How an AI delivers damage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttackStyle {
    /// Lunges at the target and hurts it on contact.
    Melee,
    /// Fires the given weapon at the target. Contact still hurts.
    Ranged(Weapon),
}

/// Rule for choosing among visible targets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TargetSelection {
    /// First eligible entity in world insertion order.
    #[default]
    FirstInOrder,
    /// Closest eligible entity; ties keep insertion order.
    Nearest,
}

/// Tuning and mutable state of one AI.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AiBrain {
    /// Damage per melee hit.
    pub damage: f64,
    /// Distance at which targets are noticed.
    pub sight_range: f64,
    /// Acceleration towards the target; low values lag behind.
    pub follow_weight: f64,
    /// Milliseconds between attacks.
    pub attack_interval: f64,
    /// Milliseconds since the last attack.
    pub attack_timer: f64,
    /// Distance kept from the target while recharging.
    pub retreat_range: f64,
    /// Whether the idle AI is drifting.
    pub wandering: bool,
    /// Heading of the last wander kick, in degrees.
    pub wander_angle: f64,
    /// Melee or ranged.
    pub attack: AttackStyle,
    /// Target choice rule.
    pub targeting: TargetSelection,
    /// Sound played whenever an attack starts.
    pub attack_sound: Option<SoundId>,
}

impl AiBrain {
    /// Creates a brain with a charged-from-zero attack timer.
    #[must_use]
    pub const fn new(
        attack: AttackStyle,
        damage: f64,
        sight_range: f64,
        follow_weight: f64,
        attack_interval: f64,
        retreat_range: f64,
    ) -> Self {
        Self {
            damage,
            sight_range,
            follow_weight,
            attack_interval,
            attack_timer: 0.0,
            retreat_range,
            wandering: false,
            wander_angle: 0.0,
            attack,
            targeting: TargetSelection::FirstInOrder,
            attack_sound: None,
        }
    }

    /// Replaces the target selection rule.
    #[must_use]
    pub const fn with_targeting(mut self, targeting: TargetSelection) -> Self {
        self.targeting = targeting;
        self
    }

    /// Plays `sound` whenever an attack starts.
    #[must_use]
    pub const fn with_attack_sound(mut self, sound: SoundId) -> Self {
        self.attack_sound = Some(sound);
        self
    }

    fn in_sight(&self, me: &Entity, other: &Entity) -> bool {
        me.position.distance(other.position) <= self.sight_range
    }

    /// Whether `me` would chase `other`.
    ///
    /// Requires opposition and sight. Allies never chase neutrals even though
    /// they may shoot them, and invisible players are ignored.
    #[must_use]
    pub fn can_follow(&self, me: &Entity, other: &Entity) -> bool {
        me.opposes(other)
            && self.in_sight(me, other)
            && !(me.team == Team::Ally && other.team == Team::Neutral)
            && !other.is_hidden()
    }

    /// Whether `me` is pushed away from `other`: living teammates in sight,
    /// and every neutral regardless of distance.
    #[must_use]
    pub fn can_spread(&self, me: &Entity, other: &Entity) -> bool {
        (me.team == other.team && other.health > 0.0 && self.in_sight(me, other))
            || other.team == Team::Neutral
    }
}

/// Outcome of one planning step.
#[derive(Clone, Debug, PartialEq)]
pub struct Plan {
    /// Velocity after steering, before physics.
    pub velocity: Vector2,
    /// Updated brain state.
    pub brain: AiBrain,
    /// Interactions with other entities.
    pub effects: Vec<Effect>,
}

/// Plans one frame for the AI `id`.
///
/// Returns `None` when `id` is missing, dead, or not AI-controlled.
pub fn think<R: Rng + ?Sized>(
    id: EntityId,
    population: Population<'_>,
    world_size: Vector2,
    rng: &mut R,
    dt: f64,
) -> Option<Plan> {
    let me = population.get(id).filter(|me| me.alive)?;
    let mut brain = *me.brain()?;
    let mut velocity = me.velocity;
    let mut effects = Vec::new();

    match select_target(id, me, &brain, population) {
        Some((target_id, target)) => {
            let direction = target.position - me.position;
            let jitter = rng.gen_range(-ATTACK_JITTER_MS..=ATTACK_JITTER_MS);
            if brain.attack_timer > brain.attack_interval + jitter {
                match brain.attack {
                    AttackStyle::Melee => velocity += direction.normalize() * brain.follow_weight,
                    AttackStyle::Ranged(weapon) => {
                        if me.frozen_timer <= 0.0 {
                            effects.push(Effect::Fire {
                                shooter: id,
                                weapon,
                                direction,
                            });
                            brain.attack_timer = 0.0;
                        }
                    }
                }
                brain.attack_timer += dt;
                if let Some(sound) = brain.attack_sound {
                    effects.push(Effect::Sound(SoundEvent {
                        sound,
                        source: me.position,
                    }));
                }
                if me.hitbox().overlaps(&target.hitbox()) {
                    trace!("{} strikes {}", me.name, target.name);
                    effects.push(Effect::Strike {
                        target: target_id,
                        damage: brain.damage,
                        knockback: (target.position - me.position) * MELEE_KNOCKBACK_SCALE,
                    });
                    effects.push(Effect::Sound(SoundEvent {
                        sound: SoundId::Hit,
                        source: me.position,
                    }));
                    brain.attack_timer = 0.0;
                }
            } else {
                velocity += retreat(me, velocity, &brain, target.position, direction);
                brain.attack_timer += dt;
            }
        }
        None => {
            brain.attack_timer = brain.attack_interval;
            velocity = wander(me.position, velocity, &mut brain, world_size, rng);
        }
    }

    velocity += spread(id, me, &brain, population);
    Some(Plan {
        velocity,
        brain,
        effects,
    })
}

fn select_target<'a>(
    id: EntityId,
    me: &Entity,
    brain: &AiBrain,
    population: Population<'a>,
) -> Option<(EntityId, &'a Entity)> {
    let mut candidates = population
        .iter()
        .filter(|&(other_id, other)| other_id != id && brain.can_follow(me, other));
    match brain.targeting {
        TargetSelection::FirstInOrder => candidates.next(),
        TargetSelection::Nearest => candidates.fold(None, |best, candidate| match best {
            Some((_, current)) if distance_to(me, current) <= distance_to(me, candidate.1) => best,
            _ => Some(candidate),
        }),
    }
}

fn distance_to(me: &Entity, other: &Entity) -> f64 {
    me.position.distance(other.position)
}

/// Acceleration towards the point `retreat_range` short of the target.
///
/// Fast-moving AIs push harder so they do not overshoot and oscillate.
fn retreat(
    me: &Entity,
    velocity: Vector2,
    brain: &AiBrain,
    target: Vector2,
    direction: Vector2,
) -> Vector2 {
    let radius_point = target - direction.normalize() * brain.retreat_range;
    let urgency = if me.speed > 0.0 {
        velocity.magnitude() / me.speed + RETREAT_BASE_URGENCY
    } else {
        RETREAT_BASE_URGENCY
    };
    (radius_point - me.position).normalize() * brain.follow_weight * urgency
}

/// Idle drift with a weak pull towards the world centre.
fn wander<R: Rng + ?Sized>(
    position: Vector2,
    mut velocity: Vector2,
    brain: &mut AiBrain,
    world_size: Vector2,
    rng: &mut R,
) -> Vector2 {
    if rng.gen_bool(WANDER_TOGGLE_CHANCE) {
        brain.wandering = !brain.wandering;
        brain.wander_angle = f64::from(rng.gen_range(0_u16..360));
        velocity = Vector2::polar(WANDER_KICK, brain.wander_angle);
    }
    if brain.wandering {
        velocity += velocity.normalize() * WANDER_ACCEL;
    } else {
        velocity *= IDLE_DAMPING;
    }
    let to_centre = world_size / 2.0 - position;
    velocity + to_centre.normalize() * (to_centre.magnitude() * CENTRE_PULL)
}

/// Sum of repulsions from everything `me` spreads away from.
fn spread(id: EntityId, me: &Entity, brain: &AiBrain, population: Population<'_>) -> Vector2 {
    population
        .iter()
        .filter(|&(other_id, other)| other_id != id && brain.can_spread(me, other))
        .fold(Vector2::ZERO, |total, (_, other)| {
            let away = me.position - other.position;
            total + away.normalize() * (1.0 / (away.magnitude() + SPREAD_EPSILON))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityKind;
    use crate::world::{World, WorldConfig};
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use rstest::{fixture, rstest};

    #[fixture]
    fn arena() -> World {
        World::new(WorldConfig::open("Arena", Vector2::new(2000.0, 2000.0)), 1)
            .unwrap_or_else(|err| panic!("valid world: {err}"))
    }

    fn brawler() -> Entity {
        Entity::new("Brawler", Vector2::new(40.0, 40.0))
            .with_health(6.0)
            .with_team(Team::Enemy)
            .with_speed(0.5)
            .with_kind(EntityKind::Ai(AiBrain::new(
                AttackStyle::Melee,
                1.0,
                600.0,
                0.1,
                750.0,
                175.0,
            )))
    }

    fn ally(name: &str) -> Entity {
        Entity::new(name, Vector2::new(40.0, 40.0))
            .with_health(8.0)
            .with_team(Team::Ally)
    }

    fn plan(world: &World, id: EntityId) -> Plan {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        think(id, world.population(), world.size(), &mut rng, 16.0)
            .unwrap_or_else(|| panic!("brawler should plan"))
    }

    #[rstest]
    fn first_in_order_ignores_distance(mut arena: World) {
        let me = arena.add(Vector2::new(1000.0, 1000.0), brawler());
        let far = arena.add(Vector2::new(1500.0, 1000.0), ally("Far"));
        let near = arena.add(Vector2::new(1100.0, 1000.0), ally("Near"));
        let population = arena.population();
        let me_entity = population.get(me).unwrap_or_else(|| panic!("present"));
        let brain = *me_entity.brain().unwrap_or_else(|| panic!("ai"));
        let first = select_target(me, me_entity, &brain, population).map(|(id, _)| id);
        assert_eq!(first, Some(far));
        let nearest = brain.with_targeting(TargetSelection::Nearest);
        let chosen = select_target(me, me_entity, &nearest, population).map(|(id, _)| id);
        assert_eq!(chosen, Some(near));
    }

    #[rstest]
    fn invisible_players_are_not_followed() {
        use crate::entity::{PlayerEffect, PlayerState};
        let me = brawler();
        let mut state = PlayerState::default();
        state.effects.extend(PlayerEffect::Invisible, 1000.0);
        let player = ally("Player").with_kind(EntityKind::Player(state));
        let brain = *me.brain().unwrap_or_else(|| panic!("ai"));
        assert!(!brain.can_follow(&me, &player));
    }

    #[rstest]
    fn charged_melee_strikes_overlapping_target(mut arena: World) {
        let mut attacker = brawler();
        if let EntityKind::Ai(brain) = &mut attacker.kind {
            brain.attack_timer = 10_000.0;
        }
        let me = arena.add(Vector2::new(1000.0, 1000.0), attacker);
        let victim = arena.add(Vector2::new(1020.0, 1000.0), ally("Troop"));
        let plan = plan(&arena, me);
        let strike = plan.effects.iter().find_map(|effect| match effect {
            Effect::Strike {
                target, knockback, ..
            } => Some((*target, *knockback)),
            _ => None,
        });
        let (target, knockback) = strike.unwrap_or_else(|| panic!("expected a strike"));
        assert_eq!(target, victim);
        assert!(knockback.dot(Vector2::new(20.0, 0.0)) > 0.0);
        assert_relative_eq!(plan.brain.attack_timer, 0.0);
    }

    #[rstest]
    fn idle_ai_resets_attack_timer(mut arena: World) {
        let me = arena.add(Vector2::new(1000.0, 1000.0), brawler());
        let plan = plan(&arena, me);
        assert_relative_eq!(plan.brain.attack_timer, 750.0);
        assert!(plan.effects.is_empty());
    }

    #[rstest]
    fn recharging_ai_moves_towards_retreat_radius(mut arena: World) {
        let me = arena.add(Vector2::new(1000.0, 1000.0), brawler());
        arena.add(Vector2::new(1100.0, 1000.0), ally("Troop"));
        let plan = plan(&arena, me);
        assert!(plan.velocity.x < 0.0, "should back away: {:?}", plan.velocity);
        assert_relative_eq!(plan.brain.attack_timer, 16.0);
    }

    #[rstest]
    fn teammates_push_apart(mut arena: World) {
        let me = arena.add(Vector2::new(1000.0, 1000.0), brawler());
        arena.add(Vector2::new(1010.0, 1000.0), brawler());
        let population = arena.population();
        let me_entity = population.get(me).unwrap_or_else(|| panic!("present"));
        let brain = *me_entity.brain().unwrap_or_else(|| panic!("ai"));
        let push = spread(me, me_entity, &brain, population);
        assert!(push.x < 0.0);
    }
}
