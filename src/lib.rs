//! Physics core of the textured platformer.
//!
//! The crate simulates a single player body against static axis-aligned
//! platforms at a fixed step. Drawing, window management and the 3D scene
//! that displays the game are left to the host, which only sees the
//! [`Frame`] produced by [`FrameDriver::tick`].

pub mod body;
pub mod driver;
pub mod geometry;
pub mod input;
pub mod physics;
#[cfg(target_arch = "wasm32")]
pub mod web;
pub mod world;

pub use body::PlayerBody;
pub use driver::{DrawSurface, Frame, FrameDriver, HeadlessSurface};
pub use geometry::Rect;
pub use input::{Action, InputState, KeyBindings, KeyCode, NamedKey, SharedInput};
pub use physics::{step, StepEvents};
pub use world::{World, WorldConfig, WorldError};
