//! Physics helper functions.
//!
//! Frame integration, the depth-aware bounds clamp and the solidity push.
//! The helpers operate on plain values so they can be unit tested without
//! building a world.

use crate::components::Rect;
use crate::entity::{Body, Environment};
use crate::vector_math::Vector2;
use crate::{DEPTH_MARGIN, FROZEN_SLOWDOWN, SOLID_THICKNESS};

/// Caps `velocity` at `speed` magnitude, preserving direction.
///
/// # Examples
///
/// ```
/// use lifesim::{physics::clamp_speed, Vector2};
/// let capped = clamp_speed(Vector2::new(3.0, 4.0), 1.0);
/// assert!((capped.magnitude() - 1.0).abs() < 1e-9);
/// ```
#[must_use]
pub fn clamp_speed(velocity: Vector2, speed: f64) -> Vector2 {
    if velocity.magnitude() > speed {
        velocity.normalize() * speed.max(0.0)
    } else {
        velocity
    }
}

/// Clamps a position so the hitbox stays in the world.
///
/// `x` keeps the whole hitbox inside `[0, width]`. `y` lets the hitbox top
/// poke above the world by [`DEPTH_MARGIN`] but keeps its bottom (the
/// entity's feet) inside `[0, height]`. Oversized hitboxes collapse onto the
/// lower bound instead of panicking.
#[must_use]
pub fn clamp_to_bounds(position: Vector2, hitbox: Vector2, size: Vector2) -> Vector2 {
    let half = hitbox / 2.0;
    let x = position.x.min(size.x - half.x).max(half.x);
    let y = position.y.min(size.y - half.y).max(DEPTH_MARGIN - half.y);
    Vector2::new(x, y)
}

/// Moves a non-solid base out of a solid's base band.
///
/// Returns the partner's new centre. A partner whose base is above the solid's
/// base is kept at least [`SOLID_THICKNESS`] above it; otherwise at least
/// [`SOLID_THICKNESS`] below.
#[must_use]
pub fn push_out_of_base(solid: Rect, position: Vector2, hitbox: Vector2) -> Vector2 {
    let bottom = solid.bottom();
    let other_bottom = position.y + hitbox.y / 2.0;
    let feet = if other_bottom < bottom {
        (other_bottom + SOLID_THICKNESS).min(bottom) - SOLID_THICKNESS
    } else {
        (other_bottom - SOLID_THICKNESS).max(bottom) + SOLID_THICKNESS
    };
    Vector2::new(position.x, feet - hitbox.y / 2.0)
}

/// Advances one body by one frame.
///
/// Order: age, decay shake and freeze timers, cap speed, apply the freeze
/// slowdown, integrate position, clamp to bounds and finally expire bodies
/// past their lifetime. Lifetime expiry does not owe a death callback.
pub fn step_body(body: &mut Body, env: &Environment, keep_in_bounds: bool) {
    let dt = env.dt;
    body.lifetime += dt;
    body.shake_timer = (body.shake_timer - dt).max(0.0);
    body.frozen_timer = (body.frozen_timer - dt).max(0.0);

    body.velocity = clamp_speed(body.velocity, body.speed);
    if body.frozen_timer > 0.0 {
        body.velocity *= FROZEN_SLOWDOWN;
    }
    body.position += body.velocity * dt;

    if keep_in_bounds && body.speed != 0.0 {
        body.keep_in_bounds(env.size);
    }

    if body
        .max_lifetime
        .is_some_and(|max_lifetime| body.lifetime > max_lifetime)
    {
        body.alive = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    const WORLD: Vector2 = Vector2::new(1000.0, 800.0);

    #[rstest]
    #[case(Vector2::new(-1e9, -1e9))]
    #[case(Vector2::new(1e9, 1e9))]
    #[case(Vector2::new(f64::NAN, 400.0))]
    fn bounds_hold_for_extreme_positions(#[case] position: Vector2) {
        let hitbox = Vector2::new(40.0, 60.0);
        let clamped = clamp_to_bounds(position, hitbox, WORLD);
        assert!(clamped.x - 20.0 >= 0.0 && clamped.x + 20.0 <= WORLD.x);
        let feet = clamped.y + 30.0;
        assert!((0.0..=WORLD.y).contains(&feet));
    }

    #[rstest]
    fn oversized_hitbox_does_not_panic() {
        let clamped = clamp_to_bounds(Vector2::new(5.0, 5.0), Vector2::new(5000.0, 10.0), WORLD);
        assert_relative_eq!(clamped.x, 2500.0);
    }

    #[rstest]
    fn speed_cap_preserves_direction() {
        let capped = clamp_speed(Vector2::new(0.0, -10.0), 2.0);
        assert_relative_eq!(capped.y, -2.0);
        assert_relative_eq!(capped.x, 0.0);
    }

    #[rstest]
    #[case(-5.0, -20.0)]
    #[case(15.0, 20.0)]
    #[case(35.0, 35.0)]
    fn push_keeps_bases_apart(#[case] start_y: f64, #[case] expected_y: f64) {
        let solid = Rect::centered(Vector2::new(0.0, 0.0), Vector2::new(100.0, 20.0));
        let moved = push_out_of_base(solid, Vector2::new(0.0, start_y), Vector2::new(10.0, 20.0));
        assert_relative_eq!(moved.y, expected_y);
    }
}
