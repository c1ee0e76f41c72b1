//! Small value types shared by entities and the world.
//! Includes team allegiance, the opposition rule and axis-aligned hitboxes.
use serde::{Deserialize, Serialize};

use crate::vector_math::Vector2;

/// Allegiance of an entity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    /// The player and their troops.
    Ally,
    /// Hostile creatures.
    Enemy,
    /// Scenery, resources and effects.
    #[default]
    Neutral,
}

impl Team {
    /// Team-level opposition matrix.
    ///
    /// Allies and enemies oppose each other, and allies additionally oppose
    /// neutrals (trees and other resources). Enemies ignore neutrals.
    ///
    /// # Examples
    /// ```
    /// use lifesim::Team;
    /// assert!(Team::Ally.opposes(Team::Neutral));
    /// assert!(!Team::Enemy.opposes(Team::Neutral));
    /// ```
    #[must_use]
    pub const fn opposes(self, other: Self) -> bool {
        matches!(
            (self, other),
            (Self::Ally, Self::Enemy) | (Self::Enemy, Self::Ally) | (Self::Ally, Self::Neutral)
        )
    }
}

/// Axis-aligned rectangle described by its centre and size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Centre point.
    pub center: Vector2,
    /// Full width and height.
    pub size: Vector2,
}

impl Rect {
    /// Creates a rectangle centred on `center`.
    #[must_use]
    pub const fn centered(center: Vector2, size: Vector2) -> Self {
        Self { center, size }
    }

    /// Left edge.
    #[must_use]
    pub fn left(&self) -> f64 {
        self.center.x - self.size.x / 2.0
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f64 {
        self.center.x + self.size.x / 2.0
    }

    /// Top edge (smaller `y`).
    #[must_use]
    pub fn top(&self) -> f64 {
        self.center.y - self.size.y / 2.0
    }

    /// Bottom edge (larger `y`).
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.center.y + self.size.y / 2.0
    }

    /// Returns `true` when the interiors intersect. Touching edges do not
    /// count as an overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Team::Ally, Team::Enemy, true)]
    #[case(Team::Enemy, Team::Ally, true)]
    #[case(Team::Ally, Team::Neutral, true)]
    #[case(Team::Enemy, Team::Neutral, false)]
    #[case(Team::Neutral, Team::Ally, false)]
    #[case(Team::Neutral, Team::Enemy, false)]
    #[case(Team::Ally, Team::Ally, false)]
    #[case(Team::Enemy, Team::Enemy, false)]
    #[case(Team::Neutral, Team::Neutral, false)]
    fn opposition_matrix(#[case] a: Team, #[case] b: Team, #[case] expected: bool) {
        assert_eq!(a.opposes(b), expected);
    }

    fn square(x: f64, y: f64) -> Rect {
        Rect::centered(Vector2::new(x, y), Vector2::new(10.0, 10.0))
    }

    #[rstest]
    #[case(square(5.0, 5.0), true)]
    #[case(square(10.0, 0.0), false)]
    #[case(square(0.0, 9.9), true)]
    #[case(square(30.0, 30.0), false)]
    fn overlap_is_strict(#[case] other: Rect, #[case] expected: bool) {
        let origin = square(0.0, 0.0);
        assert_eq!(origin.overlaps(&other), expected);
        assert_eq!(other.overlaps(&origin), expected);
    }

    #[rstest]
    fn edges_follow_centre_and_size() {
        let rect = Rect::centered(Vector2::new(10.0, 20.0), Vector2::new(4.0, 8.0));
        assert!((rect.left() - 8.0).abs() < f64::EPSILON);
        assert!((rect.right() - 12.0).abs() < f64::EPSILON);
        assert!((rect.top() - 16.0).abs() < f64::EPSILON);
        assert!((rect.bottom() - 24.0).abs() < f64::EPSILON);
    }
}
