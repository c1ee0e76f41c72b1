//! Top-level game state: every world, which one is active and where the
//! player is.
//!
//! Only the current world is simulated. Portal travel moves the player entity
//! between worlds, which hands it a fresh [`EntityId`] in the destination.

use log::{debug, info};
use serde::Serialize;

use crate::audio::AudioSink;
use crate::entity::{Entity, EntityId, EntityKind, PortalState, PortalTravel};
use crate::error::GameError;
use crate::input::InputState;
use crate::roster;
use crate::vector_math::Vector2;
use crate::world::{World, WorldConfig, WorldId};

const SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;
const SIGN_HITBOX: Vector2 = Vector2::new(125.0, 125.0);

/// Counters describing one call to [`Game::step`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FrameReport {
    /// Entities added by the player's shot this frame.
    pub fired: usize,
    /// Sounds forwarded to the audio sink.
    pub sounds: usize,
    /// Whether the player moved through a portal.
    pub travelled: bool,
}

/// All worlds plus the player's whereabouts.
#[derive(Debug)]
pub struct Game {
    worlds: Vec<World>,
    campaign: Vec<WorldId>,
    current: WorldId,
    player: Option<EntityId>,
    seed: u64,
}

impl Game {
    /// Creates a game with no worlds. World randomness derives from `seed`.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self {
            worlds: Vec::new(),
            campaign: Vec::new(),
            current: WorldId(0),
            player: None,
            seed,
        }
    }

    /// Adds an empty world and returns its id.
    ///
    /// # Errors
    /// Returns [`GameError::Config`] when the world size is invalid.
    pub fn add_world(&mut self, config: WorldConfig) -> Result<WorldId, GameError> {
        let id = WorldId(self.worlds.len());
        let index = u64::try_from(id.0).unwrap_or(u64::MAX);
        let world = World::new(config, self.seed ^ index.wrapping_mul(SEED_STRIDE))?;
        debug!("registered world {} as {id:?}", world.name());
        self.worlds.push(world);
        Ok(id)
    }

    /// Adds a world to the campaign sequence. Completing a campaign world
    /// opens signs to its neighbours in the sequence.
    ///
    /// # Errors
    /// Returns [`GameError::Config`] when the world size is invalid.
    pub fn add_campaign_world(&mut self, config: WorldConfig) -> Result<WorldId, GameError> {
        let id = self.add_world(config)?;
        self.campaign.push(id);
        Ok(id)
    }

    /// Campaign worlds in order.
    #[must_use]
    pub fn campaign(&self) -> &[WorldId] {
        &self.campaign
    }

    /// Number of worlds.
    #[must_use]
    pub fn world_count(&self) -> usize {
        self.worlds.len()
    }

    /// Looks up a world.
    ///
    /// # Errors
    /// Returns [`GameError::UnknownWorld`] for an id this game never issued.
    pub fn world(&self, id: WorldId) -> Result<&World, GameError> {
        self.worlds.get(id.0).ok_or(GameError::UnknownWorld(id))
    }

    /// Looks up a world mutably.
    ///
    /// # Errors
    /// Returns [`GameError::UnknownWorld`] for an id this game never issued.
    pub fn world_mut(&mut self, id: WorldId) -> Result<&mut World, GameError> {
        self.worlds.get_mut(id.0).ok_or(GameError::UnknownWorld(id))
    }

    /// Id of the simulated world.
    #[must_use]
    pub const fn current_world_id(&self) -> WorldId {
        self.current
    }

    /// The simulated world.
    ///
    /// # Errors
    /// Returns [`GameError::UnknownWorld`] before any world was added.
    pub fn current_world(&self) -> Result<&World, GameError> {
        self.world(self.current)
    }

    /// Mutable access to the world the player is in.
    ///
    /// # Errors
    /// Returns [`GameError::UnknownWorld`] before any world was added.
    pub fn current_world_mut(&mut self) -> Result<&mut World, GameError> {
        self.world_mut(self.current)
    }

    /// Places a new player in `world` and makes that world current.
    ///
    /// # Errors
    /// Returns [`GameError::UnknownWorld`] when `world` does not exist.
    pub fn spawn_player(
        &mut self,
        world: WorldId,
        position: Vector2,
    ) -> Result<EntityId, GameError> {
        let id = self.world_mut(world)?.add(position, roster::player());
        self.current = world;
        self.player = Some(id);
        info!("player spawned in {world:?} at {position}");
        Ok(id)
    }

    /// Handle of the player in the current world.
    #[must_use]
    pub const fn player_id(&self) -> Option<EntityId> {
        self.player
    }

    /// The player entity, if it is still alive in the current world.
    #[must_use]
    pub fn player(&self) -> Option<&Entity> {
        let id = self.player?;
        self.worlds.get(self.current.0)?.entity(id)
    }

    /// Advances the current world by `dt` milliseconds.
    ///
    /// Runs the player's control step, the world update, any portal travel
    /// the player triggered, and finally forwards the frame's sounds to
    /// `audio` with the player as listener.
    ///
    /// # Errors
    /// Returns [`GameError::UnknownWorld`] if the current world or a portal
    /// destination does not exist.
    pub fn step(
        &mut self,
        input: &InputState,
        dt: f64,
        audio: &mut dyn AudioSink,
    ) -> Result<FrameReport, GameError> {
        let player = self.player;
        let world = self.world_mut(self.current)?;
        let mut report = FrameReport::default();

        let shot = player
            .and_then(|id| world.entity_mut(id))
            .and_then(|entity| entity.control(input));
        if let (Some(id), Some(shot)) = (player, shot) {
            report.fired = world.fire(id, shot.weapon, shot.direction);
        }

        world.update(dt);
        let completed = world.complete_if_due();
        let player_lost = player.is_some_and(|id| !world.contains(id));
        let travel = world.take_travel();
        let sounds = world.drain_sounds();

        if player_lost {
            info!("player died in {:?}", self.current);
            self.player = None;
        }
        if completed {
            self.open_signs()?;
        }
        if let Some(request) = travel {
            self.travel(request)?;
            report.travelled = true;
        }

        let listener = self.listener()?;
        report.sounds = sounds.len();
        for event in sounds {
            audio.play_sound(event.sound, event.source, listener);
        }
        Ok(report)
    }

    fn listener(&self) -> Result<Vector2, GameError> {
        match self.player() {
            Some(player) => Ok(player.position),
            None => Ok(self.current_world()?.center()),
        }
    }

    /// Places signs leading to the next and previous campaign worlds.
    fn open_signs(&mut self) -> Result<(), GameError> {
        let Some(index) = self.campaign.iter().position(|&id| id == self.current) else {
            return Ok(());
        };
        let next = self.campaign.get(index + 1).copied();
        let previous = index
            .checked_sub(1)
            .and_then(|before| self.campaign.get(before))
            .copied();
        let world = self.world_mut(self.current)?;
        for (name, message, destination) in [
            ("Next Sign", "Next world?", next),
            ("Last Sign", "Last world?", previous),
        ] {
            let Some(to) = destination else {
                continue;
            };
            let sign = Entity::new(name, SIGN_HITBOX)
                .with_solid(true)
                .with_kind(EntityKind::Portal(PortalState {
                    to_world: Some(to),
                    ..PortalState::new(message)
                }));
            let position = world.random_position();
            world.add(position, sign);
        }
        Ok(())
    }

    /// Moves the player through a portal.
    ///
    /// The destination world is validated before the player leaves, so a bad
    /// portal never strands them.
    fn travel(&mut self, request: PortalTravel) -> Result<(), GameError> {
        let Some(player_id) = self.player else {
            return Ok(());
        };
        let from = self.current;
        let to = request.to_world.unwrap_or(from);
        let destination = self.destination_position(&request)?;

        if to == from {
            let world = self.world_mut(from)?;
            let size = world.size();
            if let (Some(position), Some(player)) = (destination, world.entity_mut(player_id)) {
                player.position = position;
                player.keep_in_bounds(size);
            }
            return Ok(());
        }

        self.world(to)?;
        let player = self
            .world_mut(from)?
            .take(player_id)
            .ok_or(GameError::PlayerMissing(from))?;
        let world = self.world_mut(to)?;
        let position = destination.unwrap_or_else(|| world.center());
        let id = world.add(position, player);
        let size = world.size();
        if let Some(entity) = world.entity_mut(id) {
            entity.keep_in_bounds(size);
        }
        info!("player travelled to {}", world.name());
        self.current = to;
        self.player = Some(id);
        Ok(())
    }

    /// Explicit position first, then just below the destination entity.
    fn destination_position(&self, request: &PortalTravel) -> Result<Option<Vector2>, GameError> {
        if request.to_position.is_some() {
            return Ok(request.to_position);
        }
        let Some((world, entity)) = request.to_entity else {
            return Ok(None);
        };
        Ok(self
            .world(world)?
            .entity(entity)
            .map(|target| target.position + Vector2::new(0.0, target.hitbox.y / 2.0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SilentAudio;
    use rstest::{fixture, rstest};

    #[fixture]
    fn game() -> Game {
        let mut game = Game::new(3);
        game.add_world(WorldConfig::open("Overworld", Vector2::new(2000.0, 2000.0)))
            .unwrap_or_else(|err| panic!("{err}"));
        game.add_world(WorldConfig::walled("House", Vector2::new(800.0, 800.0)))
            .unwrap_or_else(|err| panic!("{err}"));
        game
    }

    fn door(to: WorldId) -> Entity {
        Entity::new("Door", Vector2::new(100.0, 100.0)).with_kind(EntityKind::Portal(PortalState {
            to_world: Some(to),
            ..PortalState::new("Enter?")
        }))
    }

    #[rstest]
    fn unknown_worlds_are_reported(game: Game) {
        assert_eq!(
            game.world(WorldId(9)).err(),
            Some(GameError::UnknownWorld(WorldId(9)))
        );
    }

    #[rstest]
    fn interacting_on_a_portal_moves_the_player(mut game: Game) {
        let house = WorldId(1);
        let overworld = WorldId(0);
        game.world_mut(overworld)
            .unwrap_or_else(|err| panic!("{err}"))
            .add(Vector2::new(1000.0, 1000.0), door(house));
        game.spawn_player(overworld, Vector2::new(1000.0, 1000.0))
            .unwrap_or_else(|err| panic!("{err}"));

        let input = InputState {
            interact: true,
            ..InputState::default()
        };
        let report = game
            .step(&input, 16.0, &mut SilentAudio)
            .unwrap_or_else(|err| panic!("{err}"));

        assert!(report.travelled);
        assert_eq!(game.current_world_id(), house);
        let position = game.player().map(|player| player.position);
        assert_eq!(position, Some(Vector2::new(400.0, 400.0)));
        assert_eq!(game.world(overworld).map(World::len).ok(), Some(1));
    }

    #[rstest]
    fn portals_ignore_players_who_do_not_interact(mut game: Game) {
        let overworld = WorldId(0);
        game.world_mut(overworld)
            .unwrap_or_else(|err| panic!("{err}"))
            .add(Vector2::new(1000.0, 1000.0), door(WorldId(1)));
        game.spawn_player(overworld, Vector2::new(1000.0, 1000.0))
            .unwrap_or_else(|err| panic!("{err}"));
        let report = game
            .step(&InputState::default(), 16.0, &mut SilentAudio)
            .unwrap_or_else(|err| panic!("{err}"));
        assert!(!report.travelled);
        assert_eq!(game.current_world_id(), overworld);
    }

    #[rstest]
    fn interacting_after_standing_on_a_portal_still_travels(mut game: Game) {
        let overworld = WorldId(0);
        let portal = game
            .world_mut(overworld)
            .unwrap_or_else(|err| panic!("{err}"))
            .add(Vector2::new(1000.0, 1000.0), door(WorldId(1)));
        game.spawn_player(overworld, Vector2::new(1000.0, 1000.0))
            .unwrap_or_else(|err| panic!("{err}"));

        for _ in 0..2 {
            game.step(&InputState::default(), 16.0, &mut SilentAudio)
                .unwrap_or_else(|err| panic!("{err}"));
            let touching = game.world(overworld).ok().and_then(|world| {
                match &world.entity(portal)?.kind {
                    EntityKind::Portal(state) => Some(state.touching_player),
                    _ => None,
                }
            });
            assert_eq!(touching, Some(true));
        }

        let input = InputState {
            interact: true,
            ..InputState::default()
        };
        let report = game
            .step(&input, 16.0, &mut SilentAudio)
            .unwrap_or_else(|err| panic!("{err}"));
        assert!(report.travelled);
        assert_eq!(game.current_world_id(), WorldId(1));
    }

    #[rstest]
    fn completing_a_campaign_world_opens_signs() {
        let mut game = Game::new(8);
        let first = game
            .add_campaign_world(
                WorldConfig::open("Forest", Vector2::new(1000.0, 1000.0))
                    .with_completion_time(20.0),
            )
            .unwrap_or_else(|err| panic!("{err}"));
        game.add_campaign_world(WorldConfig::open("Beach", Vector2::new(1000.0, 500.0)))
            .unwrap_or_else(|err| panic!("{err}"));
        for _ in 0..3 {
            game.step(&InputState::default(), 16.0, &mut SilentAudio)
                .unwrap_or_else(|err| panic!("{err}"));
        }
        let world = game.world(first).unwrap_or_else(|err| panic!("{err}"));
        assert!(world.is_completed());
        let signs: Vec<&str> = world.iter().map(|(_, entity)| entity.name.as_str()).collect();
        assert_eq!(signs, vec!["Next Sign"]);
    }

    #[rstest]
    fn broken_portals_keep_the_player_home(mut game: Game) {
        let overworld = WorldId(0);
        game.world_mut(overworld)
            .unwrap_or_else(|err| panic!("{err}"))
            .add(Vector2::new(1000.0, 1000.0), door(WorldId(7)));
        let player = game
            .spawn_player(overworld, Vector2::new(1000.0, 1000.0))
            .unwrap_or_else(|err| panic!("{err}"));
        let input = InputState {
            interact: true,
            ..InputState::default()
        };
        assert!(game.step(&input, 16.0, &mut SilentAudio).is_err());
        assert!(game
            .world(overworld)
            .is_ok_and(|world| world.contains(player)));
    }
}
