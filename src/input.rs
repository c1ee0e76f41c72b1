//! Frame-local input consumed by the player control step.
use serde::{Deserialize, Serialize};

use crate::vector_math::Vector2;

/// Snapshot of the player's intent for one frame.
///
/// The host fills this from whatever devices it polls; the core never reads
/// raw device state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InputState {
    /// Desired movement direction. Only the direction matters; it is
    /// normalised before use.
    pub move_direction: Vector2,
    /// Whether the primary action (fire) is held.
    pub primary_action_held: bool,
    /// Cursor position in world coordinates, used as the aim point.
    pub cursor_world_position: Vector2,
    /// Whether the interact key was pressed this frame (portals).
    pub interact: bool,
    /// Weapon selection change: positive for next, negative for previous.
    pub cycle_weapon: i32,
}

impl InputState {
    /// Returns `true` when a movement direction is held.
    #[must_use]
    pub fn is_moving(&self) -> bool {
        self.move_direction != Vector2::ZERO
    }
}
