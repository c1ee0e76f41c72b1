//! Error types for configuration and game-level lookups.
//!
//! Frame stepping itself never fails; these errors cover the places where a
//! caller hands the core bad tuning values or a stale world identifier.
use thiserror::Error;

use crate::world::WorldId;

/// A rejected configuration value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The spawn interval is negative or not finite.
    #[error("spawn interval must be a finite, non-negative number of milliseconds, got {0}")]
    InvalidInterval(f64),
    /// A spawner may never hold zero live entities.
    #[error("spawner live cap must be at least 1")]
    ZeroLiveCap,
    /// A spawner wave must spawn at least one entity.
    #[error("spawner wave size must be at least 1")]
    ZeroWaveSize,
    /// The centre spread divisor must be positive.
    #[error("centre spread must be a finite positive number, got {0}")]
    InvalidCenterSpread(f64),
    /// World dimensions must be finite and positive.
    #[error("world size must be finite and positive, got ({width}, {height})")]
    InvalidWorldSize {
        /// Requested width.
        width: f64,
        /// Requested height.
        height: f64,
    },
    /// Frame durations must be finite and positive.
    #[error("frame duration must be a finite positive number of milliseconds, got {0}")]
    InvalidFrameDuration(f64),
}

/// Failure raised by [`crate::Game`] operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GameError {
    /// The requested world does not exist.
    #[error("unknown world {0:?}")]
    UnknownWorld(WorldId),
    /// The player entity is not present in the current world.
    #[error("player is not present in world {0:?}")]
    PlayerMissing(WorldId),
    /// A configuration value was rejected while assembling the game.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
