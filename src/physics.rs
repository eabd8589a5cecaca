//! Fixed-step update of the player body.
//!
//! One call to [`step`] advances the simulation by exactly one tick:
//! horizontal intent, jump, semi-implicit Euler integration, a single
//! resolution pass over every platform, then the arena bounds.

use glam::Vec2;
use log::debug;

use crate::body::PlayerBody;
use crate::geometry::Rect;
use crate::input::InputState;
use crate::world::World;

/// Notable transitions that happened during one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepEvents {
    pub jumped: bool,
    pub landed: bool,
    pub bumped_head: bool,
    pub hit_wall: bool,
    pub clamped: bool,
    pub respawned: bool,
}

/// Advances `body` by one tick. Never fails for a validated [`World`].
pub fn step(body: &mut PlayerBody, world: &World, input: InputState) -> StepEvents {
    let mut events = StepEvents::default();

    if input.move_left {
        body.velocity.x = -world.move_speed();
    } else if input.move_right {
        body.velocity.x = world.move_speed();
    } else {
        body.velocity.x *= world.friction();
    }

    if input.jump_held && !body.airborne {
        body.velocity.y = -world.jump_impulse();
        body.airborne = true;
        events.jumped = true;
    }

    // Pre-integration position, i.e. `position - velocity` once integrated.
    let previous = body.position;
    body.velocity.y += world.gravity();
    body.position += body.velocity;

    let size = world.player_size();
    let mut grounded = false;
    for platform in world.platforms() {
        match resolve(body, previous, size, platform) {
            Some(Contact::Top) => {
                grounded = true;
                events.landed = true;
            }
            Some(Contact::Bottom) => events.bumped_head = true,
            Some(Contact::Side) => events.hit_wall = true,
            None => {}
        }
    }
    body.airborne = !grounded;

    let max_x = world.arena_width() - size.x;
    if body.position.x < 0.0 || body.position.x > max_x {
        body.position.x = body.position.x.clamp(0.0, max_x);
        body.velocity.x = 0.0;
        events.clamped = true;
    }

    if body.position.y > world.arena_height() {
        debug!(
            "player fell out at ({:.1}, {:.1}); respawning",
            body.position.x, body.position.y
        );
        *body = world.spawn_body();
        events.respawned = true;
    }

    events
}

enum Contact {
    Top,
    Bottom,
    Side,
}

fn resolve(
    body: &mut PlayerBody,
    previous: Vec2,
    size: Vec2,
    platform: &Rect,
) -> Option<Contact> {
    if !body.bounds(size).overlaps(platform) {
        return None;
    }
    let before = Rect::from_position(previous, size);

    if body.velocity.y > 0.0 && before.bottom() <= platform.top() {
        body.position.y = platform.top() - size.y;
        body.velocity.y = 0.0;
        body.airborne = false;
        Some(Contact::Top)
    } else if body.velocity.y < 0.0 && before.top() >= platform.bottom() {
        body.position.y = platform.bottom();
        body.velocity.y = 0.0;
        Some(Contact::Bottom)
    } else if body.velocity.x > 0.0 && before.right() <= platform.left() {
        body.position.x = platform.left() - size.x;
        body.velocity.x = 0.0;
        Some(Contact::Side)
    } else if body.velocity.x < 0.0 && before.left() >= platform.right() {
        body.position.x = platform.right();
        body.velocity.x = 0.0;
        Some(Contact::Side)
    } else {
        None
    }
}
