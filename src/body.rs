use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::geometry::Rect;

/// Kinematic state of the player.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerBody {
    pub position: Vec2,
    pub velocity: Vec2,
    pub airborne: bool,
}

impl PlayerBody {
    /// A motionless, airborne body at `spawn`.
    pub fn spawned_at(spawn: Vec2) -> Self {
        Self {
            position: spawn,
            velocity: Vec2::ZERO,
            airborne: true,
        }
    }

    pub fn bounds(&self, size: Vec2) -> Rect {
        Rect::from_position(self.position, size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawned_body_is_at_rest_and_airborne() {
        let body = PlayerBody::spawned_at(Vec2::new(50.0, 300.0));
        assert_eq!(body.velocity, Vec2::ZERO);
        assert!(body.airborne);
        assert_eq!(
            body.bounds(Vec2::new(30.0, 30.0)),
            Rect::new(50.0, 300.0, 30.0, 30.0)
        );
    }
}
