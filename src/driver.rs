use std::sync::Arc;

use log::debug;

use crate::body::PlayerBody;
use crate::geometry::Rect;
use crate::input::SharedInput;
use crate::physics::{self, StepEvents};
use crate::world::World;

/// Drawable state handed to the surface after every tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame<'a> {
    pub tick: u64,
    pub player: Rect,
    pub platforms: &'a [Rect],
}

/// Receives the drawable state of each tick, in game-canvas coordinates.
pub trait DrawSurface {
    fn present(&mut self, frame: &Frame<'_>);

    /// Called after every present so texture-backed surfaces can re-upload.
    fn invalidate(&mut self) {}
}

/// Surface that only remembers the last frame it was shown.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeadlessSurface {
    pub last_player: Option<Rect>,
    pub platform_count: usize,
    pub presented: u64,
    pub invalidated: u64,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DrawSurface for HeadlessSurface {
    fn present(&mut self, frame: &Frame<'_>) {
        self.last_player = Some(frame.player);
        self.platform_count = frame.platforms.len();
        self.presented += 1;
    }

    fn invalidate(&mut self) {
        self.invalidated += 1;
    }
}

/// Owns the simulation context and runs one physics step per frame.
#[derive(Debug)]
pub struct FrameDriver {
    world: Arc<World>,
    body: PlayerBody,
    input: SharedInput,
    ticks: u64,
}

impl FrameDriver {
    pub fn new(world: Arc<World>, input: SharedInput) -> Self {
        let body = world.spawn_body();
        Self {
            world,
            body,
            input,
            ticks: 0,
        }
    }

    /// Snapshots the input, steps once, then presents the result.
    pub fn tick(&mut self, surface: &mut dyn DrawSurface) -> StepEvents {
        let input = self.input.snapshot();
        let was_airborne = self.body.airborne;
        let events = physics::step(&mut self.body, &self.world, input);
        self.ticks += 1;
        if was_airborne && !self.body.airborne {
            debug!("tick {}: landed at y={:.1}", self.ticks, self.body.position.y);
        }

        surface.present(&self.frame());
        surface.invalidate();
        events
    }

    pub fn frame(&self) -> Frame<'_> {
        Frame {
            tick: self.ticks,
            player: self.body.bounds(self.world.player_size()),
            platforms: self.world.platforms(),
        }
    }

    pub fn body(&self) -> &PlayerBody {
        &self.body
    }

    pub fn world(&self) -> &Arc<World> {
        &self.world
    }

    pub fn input(&self) -> &SharedInput {
        &self.input
    }

    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    /// Puts the player back at the spawn point and releases all input.
    pub fn reset(&mut self) {
        self.body = self.world.spawn_body();
        self.input.release_all();
        self.ticks = 0;
    }
}
