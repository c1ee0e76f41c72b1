//! Pairwise collision pass.
//!
//! Overlap is decided from hitboxes captured once, after every entity has
//! updated. Responses mutate live state: each overlapping pair runs
//! `a.collide(b)` every frame, and `b` is then remembered in
//! `a.last_collisions` so kinds with one-shot effects (projectiles) can tell
//! a new contact from a lingering one. Pairs where either member died
//! earlier in the pass are skipped.

use log::trace;

use super::World;
use crate::components::Rect;
use crate::entity::{Collidable, Contact, EntityId};

impl World {
    pub(super) fn resolve_collisions(&mut self) {
        self.prune_stale_contacts();
        let snapshot: Vec<(EntityId, Rect)> = self
            .iter()
            .map(|(id, entity)| (id, entity.hitbox()))
            .collect();

        for &(id, hitbox) in &snapshot {
            for &(other_id, other_hitbox) in &snapshot {
                if id == other_id {
                    continue;
                }
                if hitbox.overlaps(&other_hitbox) {
                    self.touch(id, other_id);
                } else if let Some(entity) = self.entities.get_mut(id) {
                    entity.last_collisions.remove(&other_id);
                }
            }
        }
    }

    fn touch(&mut self, id: EntityId, other_id: EntityId) {
        let Some([entity, other]) = self.entities.get_disjoint_mut([id, other_id]) else {
            return;
        };
        if !(entity.alive && other.alive) {
            return;
        }
        if !entity.last_collisions.contains(&other_id) {
            trace!("{} touches {}", entity.name, other.name);
        }
        let mut contact = Contact {
            other_id,
            sounds: &mut self.sounds,
            travel: &mut self.travel,
        };
        entity.collide(other, &mut contact);
        entity.last_collisions.insert(other_id);
    }

    /// Drops remembered partners that no longer exist.
    fn prune_stale_contacts(&mut self) {
        let live = self.live_ids();
        for entity in self.entities.values_mut() {
            entity.last_collisions.retain(|id| live.contains(id));
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::components::Team;
    use crate::entity::{Entity, EntityKind, ProjectileState, Shooter};
    use crate::vector_math::Vector2;
    use crate::weapons::BULLET;
    use crate::world::{World, WorldConfig};
    use approx::assert_relative_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn world() -> World {
        World::new(WorldConfig::open("Collisions", Vector2::new(1000.0, 1000.0)), 11)
            .unwrap_or_else(|err| panic!("valid world: {err}"))
    }

    fn lingering_bullet(damage: f64) -> Entity {
        Entity::new("Cloud", Vector2::new(60.0, 60.0))
            .with_team(Team::Ally)
            .with_speed(0.0)
            .with_lifetime(10_000.0)
            .with_kind(EntityKind::Projectile(ProjectileState {
                damage,
                range: 10_000.0,
                distance_travelled: 0.0,
                parent: None,
                initial_velocity: Vector2::ZERO,
                blockable: false,
                on_hit: None,
            }))
    }

    fn target() -> Entity {
        Entity::new("Target", Vector2::new(40.0, 40.0))
            .with_health(100.0)
            .with_team(Team::Enemy)
            .with_knockback(false)
    }

    #[rstest]
    fn overlap_damages_once_until_separation(mut world: World) {
        world.add(Vector2::new(500.0, 500.0), lingering_bullet(2.0));
        let victim = world.add(Vector2::new(510.0, 500.0), target());
        for _ in 0..3 {
            world.update(16.0);
        }
        let lingering = world.entity(victim).map_or(0.0, |entity| entity.health);
        assert_relative_eq!(lingering, 98.0);

        if let Some(entity) = world.entity_mut(victim) {
            entity.position = Vector2::new(900.0, 900.0);
        }
        world.update(16.0);
        if let Some(entity) = world.entity_mut(victim) {
            entity.position = Vector2::new(510.0, 500.0);
        }
        world.update(16.0);
        let returned = world.entity(victim).map_or(0.0, |entity| entity.health);
        assert_relative_eq!(returned, 96.0);
    }

    #[rstest]
    fn solid_bases_hold_walkers_back_every_frame(mut world: World) {
        world.add(
            Vector2::new(500.0, 500.0),
            Entity::new("Rock", Vector2::new(100.0, 40.0)).with_solid(true),
        );
        let walker = world.add(
            Vector2::new(500.0, 515.0),
            Entity::new("Walker", Vector2::new(20.0, 60.0))
                .with_speed(1.0)
                .with_velocity(Vector2::new(0.0, -0.1)),
        );
        for _ in 0..10 {
            world.update(16.0);
            let bottom = world
                .entity(walker)
                .map_or(f64::NAN, |entity| entity.position.y + entity.hitbox.y / 2.0);
            assert!(bottom >= 540.0 - 1e-9, "walker base reached {bottom}");
        }
    }

    #[rstest]
    fn corpses_do_not_absorb_later_hits(mut world: World) {
        let shot = |world: &mut World| {
            let shooter = Shooter::detached(Vector2::new(500.0, 500.0), Team::Ally);
            let bullet = BULLET.launch(&shooter, Vector2::new(1.0, 0.0));
            world.add(Vector2::new(500.0, 500.0), bullet)
        };
        let first = shot(&mut world);
        let second = shot(&mut world);
        let victim = world.add(
            Vector2::new(500.0, 500.0),
            Entity::new("Gnat", Vector2::new(40.0, 40.0))
                .with_health(1.0)
                .with_team(Team::Enemy),
        );
        world.update(16.0);
        assert!(!world.contains(victim));
        assert!(!world.contains(first));
        assert!(world.contains(second));
    }

    #[rstest]
    fn killed_targets_are_swept_after_the_pass(mut world: World) {
        world.add(Vector2::new(500.0, 500.0), lingering_bullet(200.0));
        world.add(Vector2::new(500.0, 500.0), lingering_bullet(200.0));
        let victim = world.add(Vector2::new(505.0, 500.0), target());
        world.update(16.0);
        assert!(!world.contains(victim));
    }
}
