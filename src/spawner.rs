//! Periodic, capped population control for a world.
//!
//! A spawner accumulates time and, once its interval has elapsed and it is
//! below its live cap, produces a wave of entities from its factory. The
//! world prunes a spawner's tracked handles whenever an entity is removed,
//! which is what keeps the live count honest.
use std::fmt;
use std::sync::Arc;

use log::debug;
use rand::Rng;

use crate::entity::{Entity, EntityId};
use crate::error::ConfigError;
use crate::vector_math::Vector2;

/// Produces a fresh entity for a spawner.
pub type SpawnFactory = Arc<dyn Fn() -> Entity + Send + Sync>;

/// Validated spawner tuning.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnerConfig {
    /// Milliseconds between waves.
    pub interval: f64,
    /// Maximum simultaneously alive tracked entities.
    pub max_live: usize,
    /// Upper bound of a single wave. Each wave spawns between one and this
    /// many entities, capped by the remaining capacity.
    pub max_per_wave: usize,
    /// Divisor on the random offset from the world centre; larger values
    /// cluster spawns closer to the middle.
    pub center_spread: f64,
    /// Entities added immediately when the spawner is installed.
    pub pre_spawned: usize,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            interval: 0.0,
            max_live: 5,
            max_per_wave: 1,
            center_spread: 1.0,
            pre_spawned: 0,
        }
    }
}

impl SpawnerConfig {
    /// Config with the given interval and live cap; everything else default.
    #[must_use]
    pub fn every(interval: f64, max_live: usize) -> Self {
        Self {
            interval,
            max_live,
            ..Self::default()
        }
    }

    /// Sets the wave size bound.
    #[must_use]
    pub const fn with_max_per_wave(mut self, max_per_wave: usize) -> Self {
        self.max_per_wave = max_per_wave;
        self
    }

    /// Sets the centre spread divisor.
    #[must_use]
    pub const fn with_center_spread(mut self, center_spread: f64) -> Self {
        self.center_spread = center_spread;
        self
    }

    /// Sets the pre-spawn count.
    #[must_use]
    pub const fn with_pre_spawned(mut self, pre_spawned: usize) -> Self {
        self.pre_spawned = pre_spawned;
        self
    }

    /// Checks every field.
    ///
    /// # Errors
    /// Returns the first offending field as a [`ConfigError`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.interval.is_finite() || self.interval < 0.0 {
            return Err(ConfigError::InvalidInterval(self.interval));
        }
        if self.max_live == 0 {
            return Err(ConfigError::ZeroLiveCap);
        }
        if self.max_per_wave == 0 {
            return Err(ConfigError::ZeroWaveSize);
        }
        if !self.center_spread.is_finite() || self.center_spread <= 0.0 {
            return Err(ConfigError::InvalidCenterSpread(self.center_spread));
        }
        Ok(())
    }
}

/// Where a spawner places its entities.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum SpawnPoint {
    /// Random offset from the world centre, scaled by the centre spread.
    #[default]
    Random,
    /// Always the same position.
    Fixed(Vector2),
}

/// A periodic factory bound to one world.
#[derive(Clone)]
pub struct Spawner {
    config: SpawnerConfig,
    timer: f64,
    factory: SpawnFactory,
    point: SpawnPoint,
    live: Vec<EntityId>,
}

impl fmt::Debug for Spawner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Spawner")
            .field("config", &self.config)
            .field("timer", &self.timer)
            .field("point", &self.point)
            .field("live", &self.live)
            .finish_non_exhaustive()
    }
}

impl Spawner {
    /// Creates a spawner after validating `config`.
    ///
    /// # Errors
    /// Returns [`ConfigError`] for an invalid configuration.
    ///
    /// # Examples
    /// ```
    /// use lifesim::{Entity, Spawner, SpawnerConfig, Vector2};
    /// let spawner = Spawner::new(SpawnerConfig::every(8000.0, 6), || {
    ///     Entity::new("Rock", Vector2::new(85.0, 50.0))
    /// })
    /// .expect("valid config");
    /// assert_eq!(spawner.live_count(), 0);
    /// assert!(Spawner::new(SpawnerConfig::every(-1.0, 6), || {
    ///     Entity::new("Rock", Vector2::new(85.0, 50.0))
    /// })
    /// .is_err());
    /// ```
    pub fn new<F>(config: SpawnerConfig, factory: F) -> Result<Self, ConfigError>
    where
        F: Fn() -> Entity + Send + Sync + 'static,
    {
        config.validate()?;
        Ok(Self {
            config,
            timer: 0.0,
            factory: Arc::new(factory),
            point: SpawnPoint::Random,
            live: Vec::new(),
        })
    }

    /// Places every spawn at `point`.
    #[must_use]
    pub const fn at(mut self, point: SpawnPoint) -> Self {
        self.point = point;
        self
    }

    /// Tuning in effect.
    #[must_use]
    pub const fn config(&self) -> &SpawnerConfig {
        &self.config
    }

    /// Number of tracked live entities.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Tracked live entities.
    #[must_use]
    pub fn tracked(&self) -> &[EntityId] {
        &self.live
    }

    /// Remaining room under the live cap.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.config.max_live.saturating_sub(self.live.len())
    }

    /// Advances the timer and returns how many entities to spawn now.
    ///
    /// Nothing spawns until the timer exceeds the interval while there is
    /// capacity; the timer then resets.
    pub(crate) fn tick<R: Rng + ?Sized>(&mut self, dt: f64, rng: &mut R) -> usize {
        self.timer += dt;
        let capacity = self.capacity();
        if self.timer <= self.config.interval || capacity == 0 {
            return 0;
        }
        self.timer = 0.0;
        let wave = rng.gen_range(1..=self.config.max_per_wave).min(capacity);
        debug!("spawner wave of {wave} ({} live)", self.live.len());
        wave
    }

    /// Position for the next spawn in a world of `size`.
    pub(crate) fn spawn_position<R: Rng + ?Sized>(&self, size: Vector2, rng: &mut R) -> Vector2 {
        match self.point {
            SpawnPoint::Fixed(position) => position,
            SpawnPoint::Random => {
                let half = size / 2.0;
                let offset = Vector2::new(
                    rng.gen_range(-half.x..=half.x),
                    rng.gen_range(-half.y..=half.y),
                );
                half + offset / self.config.center_spread
            }
        }
    }

    pub(crate) fn produce(&self) -> Entity {
        (self.factory)()
    }

    pub(crate) fn track(&mut self, id: EntityId) {
        self.live.push(id);
    }

    pub(crate) fn forget(&mut self, id: EntityId) {
        self.live.retain(|&tracked| tracked != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use rstest::rstest;

    fn rock() -> Entity {
        Entity::new("Rock", Vector2::new(85.0, 50.0))
    }

    #[rstest]
    #[case(SpawnerConfig::every(f64::NAN, 3), ConfigError::InvalidInterval(f64::NAN))]
    #[case(SpawnerConfig::every(10.0, 0), ConfigError::ZeroLiveCap)]
    #[case(SpawnerConfig::every(10.0, 3).with_max_per_wave(0), ConfigError::ZeroWaveSize)]
    #[case(
        SpawnerConfig::every(10.0, 3).with_center_spread(0.0),
        ConfigError::InvalidCenterSpread(0.0)
    )]
    fn invalid_configs_are_rejected(#[case] config: SpawnerConfig, #[case] expected: ConfigError) {
        let err = config.validate().err().unwrap_or_else(|| panic!("should fail"));
        assert_eq!(
            std::mem::discriminant(&err),
            std::mem::discriminant(&expected)
        );
    }

    #[rstest]
    fn waves_wait_for_the_interval() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut spawner = Spawner::new(SpawnerConfig::every(100.0, 3), rock)
            .unwrap_or_else(|err| panic!("{err}"));
        assert_eq!(spawner.tick(60.0, &mut rng), 0);
        assert_eq!(spawner.tick(60.0, &mut rng), 1);
        assert_eq!(spawner.tick(60.0, &mut rng), 0);
    }

    #[rstest]
    fn full_spawner_never_fires() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut spawner = Spawner::new(SpawnerConfig::every(0.0, 1).with_max_per_wave(4), rock)
            .unwrap_or_else(|err| panic!("{err}"));
        let mut ids: slotmap::SlotMap<EntityId, ()> = slotmap::SlotMap::with_key();
        assert_eq!(spawner.tick(1.0, &mut rng), 1);
        spawner.track(ids.insert(()));
        assert_eq!(spawner.tick(1000.0, &mut rng), 0);
        assert_eq!(spawner.capacity(), 0);
    }

    #[rstest]
    fn random_points_respect_centre_spread() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let spawner = Spawner::new(SpawnerConfig::every(0.0, 1).with_center_spread(4.0), rock)
            .unwrap_or_else(|err| panic!("{err}"));
        let size = Vector2::new(1000.0, 800.0);
        for _ in 0..100 {
            let point = spawner.spawn_position(size, &mut rng);
            assert!((375.0..=625.0).contains(&point.x));
            assert!((300.0..=500.0).contains(&point.y));
        }
    }
}
