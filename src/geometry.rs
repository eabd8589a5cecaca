use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in game-canvas coordinates (Y grows downwards).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Builds a rectangle whose top-left corner sits at `position`.
    pub fn from_position(position: Vec2, size: Vec2) -> Self {
        Self::new(position.x, position.y, size.x, size.y)
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Strict overlap test: rectangles that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    pub(crate) fn has_valid_geometry(&self) -> bool {
        [self.x, self.y, self.width, self.height]
            .iter()
            .all(|value| value.is_finite())
            && self.width > 0.0
            && self.height > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_follow_y_down_convention() {
        let rect = Rect::new(10.0, 20.0, 30.0, 5.0);
        assert_eq!(rect.left(), 10.0);
        assert_eq!(rect.right(), 40.0);
        assert_eq!(rect.top(), 20.0);
        assert_eq!(rect.bottom(), 25.0);
    }

    #[test]
    fn touching_edges_do_not_overlap() {
        let ground = Rect::new(0.0, 380.0, 400.0, 20.0);
        let resting = Rect::new(50.0, 350.0, 30.0, 30.0);
        assert!(!resting.overlaps(&ground));

        let beside = Rect::new(400.0, 380.0, 10.0, 10.0);
        assert!(!beside.overlaps(&ground));
    }

    #[test]
    fn penetration_counts_as_overlap() {
        let ground = Rect::new(0.0, 380.0, 400.0, 20.0);
        let sunk = Rect::new(50.0, 350.5, 30.0, 30.0);
        assert!(sunk.overlaps(&ground));
        assert!(ground.overlaps(&sunk));
    }

    #[test]
    fn degenerate_geometry_is_flagged() {
        assert!(Rect::new(0.0, 0.0, 1.0, 1.0).has_valid_geometry());
        assert!(!Rect::new(0.0, 0.0, 0.0, 1.0).has_valid_geometry());
        assert!(!Rect::new(0.0, 0.0, 1.0, -2.0).has_valid_geometry());
        assert!(!Rect::new(f32::NAN, 0.0, 1.0, 1.0).has_valid_geometry());
    }
}
