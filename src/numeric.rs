//! Conversions from simulation space (`f64`, `y` pointing down) into Bevy's
//! `f32` render space (`y` pointing up).

use crate::vector_math::Vector2;

/// Narrows a world coordinate to `f32`.
///
/// Worlds are a few thousand units across, far inside `f32` range, so the
/// bounds are only checked in debug builds.
///
/// # Examples
/// ```
/// use lifesim::numeric::expect_f32;
/// assert!((expect_f32(1250.5) - 1250.5).abs() < f32::EPSILON);
/// ```
#[expect(
    clippy::cast_possible_truncation,
    reason = "World coordinates fit within f32 bounds."
)]
#[must_use]
pub fn expect_f32(value: f64) -> f32 {
    debug_assert!(value.is_finite(), "world coordinate {value} is not finite");
    debug_assert!(
        (f64::from(f32::MIN)..=f64::from(f32::MAX)).contains(&value),
        "world coordinate {value} does not fit in f32"
    );
    value as f32
}

/// Maps a simulation position onto the render plane, flipping `y`.
#[must_use]
pub fn screen_point(position: Vector2) -> (f32, f32) {
    (expect_f32(position.x), -expect_f32(position.y))
}

/// Depth for the `layer`-th item of a depth-sorted snapshot.
///
/// Layers beyond `u16::MAX` share the topmost depth.
#[must_use]
pub fn layer_depth(layer: usize, step: f32) -> f32 {
    u16::try_from(layer).map_or(f32::from(u16::MAX), f32::from) * step
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, 0.0)]
    #[case(-640.25, -640.25)]
    #[case(2500.0, 2500.0)]
    fn converts_world_coordinates(#[case] value: f64, #[case] expected: f32) {
        assert_relative_eq!(expect_f32(value), expected);
    }

    #[rstest]
    fn screen_points_flip_the_vertical_axis() {
        let (x, y) = screen_point(Vector2::new(120.0, 300.0));
        assert_relative_eq!(x, 120.0);
        assert_relative_eq!(y, -300.0);
    }

    #[rstest]
    #[case(0, 0.0)]
    #[case(10, 0.01)]
    #[case(usize::MAX, 65.535)]
    fn layers_saturate(#[case] layer: usize, #[case] expected: f32) {
        assert_relative_eq!(layer_depth(layer, 0.001), expected, epsilon = 1e-4);
    }
}
