//! Simulation tuning constants shared across systems.
//!
//! Times are in milliseconds and distances in world pixels. Per-frame
//! accelerations are applied once per update regardless of the frame length.

/// How long a hit entity shakes.
pub const SHAKE_DURATION_MS: f64 = 150.0;
/// How long a frozen cloud keeps its victim frozen.
pub const FREEZE_DURATION_MS: f64 = 3000.0;
/// Velocity multiplier applied every frame while frozen.
pub const FROZEN_SLOWDOWN: f64 = 0.25;

/// Thickness of the band a solid entity keeps other bases out of.
pub const SOLID_THICKNESS: f64 = 20.0;
/// How far above the world's top edge an entity's body may extend, measured
/// from the bottom of its hitbox.
pub const DEPTH_MARGIN: f64 = 20.0;
/// Extra allowance above the top edge before a projectile counts as hitting
/// the border.
pub const PROJECTILE_TOP_ALLOWANCE: f64 = 100.0;
/// Minimum age before a projectile may expire on range or border contact.
pub const PROJECTILE_ARMING_MS: f64 = 50.0;
/// Velocity impulse given to an entity hit by a projectile.
pub const PROJECTILE_KNOCKBACK: f64 = 1.0;
/// Scale of the melee knockback impulse relative to the separation vector.
pub const MELEE_KNOCKBACK_SCALE: f64 = 0.001;

/// Half-width of the random jitter added to an AI attack interval.
pub const ATTACK_JITTER_MS: f64 = 100.0;
/// Per-frame chance that an idle AI toggles wandering.
pub const WANDER_TOGGLE_CHANCE: f64 = 0.005;
/// Speed assigned when an AI picks a fresh wander heading.
pub const WANDER_KICK: f64 = 0.01;
/// Forward acceleration applied while wandering.
pub const WANDER_ACCEL: f64 = 0.01;
/// Velocity damping applied while idle but not wandering.
pub const IDLE_DAMPING: f64 = 0.95;
/// Proportional pull toward the world centre while idle.
pub const CENTRE_PULL: f64 = 0.000_01;
/// Added to distances in the spread term to avoid division by zero.
pub const SPREAD_EPSILON: f64 = 0.2;
/// Baseline retreat urgency added to the current speed ratio.
pub const RETREAT_BASE_URGENCY: f64 = 0.5;

/// Player acceleration per frame along the input direction.
pub const PLAYER_ACCEL: f64 = 0.12;
/// Player velocity damping when no direction is held.
pub const PLAYER_DAMPING: f64 = 0.88;
/// Player health regenerated per millisecond.
pub const PLAYER_REGEN_PER_MS: f64 = 0.000_125;
/// Metalsuit time drained whenever the player is hurt.
pub const METALSUIT_HIT_DRAIN_MS: f64 = 100.0;
/// Base player speed.
pub const PLAYER_SPEED: f64 = 0.7;
/// Starting player health.
pub const PLAYER_HEALTH: f64 = 20.0;

/// Health assigned to entities built without explicit health.
pub const DEFAULT_HEALTH: f64 = 100.0;

/// Pickup bobbing frequency in radians per millisecond.
pub const ITEM_BOB_FREQUENCY: f64 = 0.005;
/// Pickup bobbing velocity amplitude.
pub const ITEM_BOB_AMPLITUDE: f64 = 0.05;
/// Distance from the dead entity at which loot lands.
pub const LOOT_DROP_RADIUS: f64 = 35.0;

/// Maximum random pixel offset applied to a shaking sprite.
pub const SHAKE_OFFSET_PX: f64 = 2.0;
