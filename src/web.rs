#![cfg(target_arch = "wasm32")]

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{window, CanvasRenderingContext2d, Document, HtmlCanvasElement, KeyboardEvent};

use crate::driver::{DrawSurface, Frame, FrameDriver};
use crate::input::{KeyBindings, KeyCode, SharedInput};
use crate::world::{World, WorldConfig};

#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Browser entry point: runs the platformer on a `<canvas>` element.
#[wasm_bindgen]
pub struct WasmGame {
    inner: Rc<RefCell<GameState>>,
}

#[wasm_bindgen]
impl WasmGame {
    /// Binds the game to the canvas with id `canvas_id`. `level_xml` replaces
    /// the built-in level when provided.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: String, level_xml: Option<String>) -> Result<WasmGame, JsValue> {
        build(&canvas_id, level_xml.as_deref())
            .map(|inner| Self { inner })
            .map_err(|err| JsValue::from_str(&format!("{err:#}")))
    }

    pub fn start(&self) -> Result<(), JsValue> {
        start_animation_loop(&self.inner).map_err(|err| JsValue::from_str(&err.to_string()))
    }

    /// Cancels the frame loop started by [`WasmGame::start`].
    pub fn stop(&self) {
        self.inner.borrow_mut().animation.take();
    }

    /// Advances exactly one tick; for hosts that drive their own frame loop.
    pub fn tick(&self) {
        self.inner.borrow_mut().tick();
    }

    pub fn reset(&self) {
        self.inner.borrow_mut().driver.reset();
    }

    /// Whether the canvas changed since the last call; hosts that map the
    /// canvas onto a texture use this to decide when to re-upload it.
    pub fn take_dirty(&self) -> bool {
        std::mem::take(&mut self.inner.borrow_mut().surface.dirty)
    }
}

fn build(canvas_id: &str, level_xml: Option<&str>) -> Result<Rc<RefCell<GameState>>> {
    let config = match level_xml {
        Some(xml) => WorldConfig::from_xml(xml).context("failed to parse level XML")?,
        None => WorldConfig::default(),
    };
    let world = Arc::new(World::from_config(config).context("invalid level")?);

    let document = window()
        .and_then(|win| win.document())
        .ok_or_else(|| anyhow!("document not available"))?;
    let canvas = document
        .get_element_by_id(canvas_id)
        .ok_or_else(|| anyhow!("canvas element `{canvas_id}` not found"))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| anyhow!("element `{canvas_id}` is not a canvas"))?;

    let surface = CanvasSurface::new(canvas, world.arena_width(), world.arena_height())?;
    let input = SharedInput::new();
    let listeners = KeyListeners::attach(&document, input.clone(), KeyBindings::default())?;

    Ok(Rc::new(RefCell::new(GameState {
        driver: FrameDriver::new(world, input),
        surface,
        _listeners: listeners,
        animation: None,
    })))
}

struct GameState {
    driver: FrameDriver,
    surface: CanvasSurface,
    _listeners: KeyListeners,
    animation: Option<AnimationLoop>,
}

impl GameState {
    fn tick(&mut self) {
        self.driver.tick(&mut self.surface);
    }
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// Running `requestAnimationFrame` loop. The callback only holds weak
/// references, so dropping this (or the game) ends the loop.
struct AnimationLoop {
    callback: FrameCallback,
    pending: Rc<Cell<Option<i32>>>,
}

impl Drop for AnimationLoop {
    fn drop(&mut self) {
        if let (Some(handle), Some(window)) = (self.pending.take(), window()) {
            let _ = window.cancel_animation_frame(handle);
        }
        self.callback.borrow_mut().take();
    }
}

fn start_animation_loop(game: &Rc<RefCell<GameState>>) -> Result<()> {
    if game.borrow().animation.is_some() {
        return Ok(());
    }

    let callback: FrameCallback = Rc::new(RefCell::new(None));
    let pending = Rc::new(Cell::new(None));
    let next = Rc::downgrade(&callback);
    let weak_game = Rc::downgrade(game);
    let next_pending = Rc::clone(&pending);
    *callback.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        next_pending.set(None);
        let Some(game) = weak_game.upgrade() else {
            return;
        };
        game.borrow_mut().tick();
        let Some(callback) = next.upgrade() else {
            return;
        };
        if let Some(closure) = callback.borrow().as_ref() {
            match request_frame(closure) {
                Ok(handle) => next_pending.set(Some(handle)),
                Err(err) => web_sys::console::error_1(&JsValue::from_str(&err.to_string())),
            }
        }
    }) as Box<dyn FnMut()>));

    if let Some(closure) = callback.borrow().as_ref() {
        pending.set(Some(request_frame(closure)?));
    }
    game.borrow_mut().animation = Some(AnimationLoop { callback, pending });
    Ok(())
}

fn request_frame(closure: &Closure<dyn FnMut()>) -> Result<i32> {
    window()
        .ok_or_else(|| anyhow!("window not available"))?
        .request_animation_frame(closure.as_ref().unchecked_ref())
        .map_err(|err| anyhow!("requestAnimationFrame failed: {err:?}"))
}

/// Paints frames onto a 2D canvas, scaled from arena to canvas pixels.
struct CanvasSurface {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
    arena: (f64, f64),
    dirty: bool,
}

impl CanvasSurface {
    fn new(canvas: HtmlCanvasElement, arena_width: f32, arena_height: f32) -> Result<Self> {
        let context = canvas
            .get_context("2d")
            .map_err(|err| anyhow!("failed to query canvas context: {err:?}"))?
            .ok_or_else(|| anyhow!("canvas does not support 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| anyhow!("failed to cast canvas context"))?;
        Ok(Self {
            canvas,
            context,
            arena: (f64::from(arena_width), f64::from(arena_height)),
            dirty: false,
        })
    }
}

impl DrawSurface for CanvasSurface {
    fn present(&mut self, frame: &Frame<'_>) {
        let sx = f64::from(self.canvas.width()) / self.arena.0;
        let sy = f64::from(self.canvas.height()) / self.arena.1;

        self.context.set_fill_style(&"#87ceeb".into());
        self.context.fill_rect(
            0.0,
            0.0,
            f64::from(self.canvas.width()),
            f64::from(self.canvas.height()),
        );

        self.context.set_fill_style(&"#3a7d44".into());
        for platform in frame.platforms {
            self.context.fill_rect(
                f64::from(platform.x) * sx,
                f64::from(platform.y) * sy,
                f64::from(platform.width) * sx,
                f64::from(platform.height) * sy,
            );
        }

        self.context.set_fill_style(&"#d7263d".into());
        self.context.fill_rect(
            f64::from(frame.player.x) * sx,
            f64::from(frame.player.y) * sy,
            f64::from(frame.player.width) * sx,
            f64::from(frame.player.height) * sy,
        );
    }

    fn invalidate(&mut self) {
        self.dirty = true;
    }
}

/// Document-level keydown/keyup listeners feeding [`SharedInput`].
struct KeyListeners {
    document: Document,
    handlers: Vec<(&'static str, Closure<dyn FnMut(KeyboardEvent)>)>,
}

impl KeyListeners {
    fn attach(document: &Document, input: SharedInput, bindings: KeyBindings) -> Result<Self> {
        let bindings = Rc::new(bindings);
        let mut handlers = Vec::new();

        for (kind, pressed) in [("keydown", true), ("keyup", false)] {
            let input = input.clone();
            let bindings = Rc::clone(&bindings);
            let handler = Closure::wrap(Box::new(move |event: KeyboardEvent| {
                let Some(code) = KeyCode::from_name(&event.key()) else {
                    return;
                };
                if input.apply_key(&bindings, code, pressed) {
                    event.prevent_default();
                }
            }) as Box<dyn FnMut(KeyboardEvent)>);
            document
                .add_event_listener_with_callback(kind, handler.as_ref().unchecked_ref())
                .map_err(|err| anyhow!("failed to attach {kind} listener: {err:?}"))?;
            handlers.push((kind, handler));
        }

        Ok(Self {
            document: document.clone(),
            handlers,
        })
    }
}

impl Drop for KeyListeners {
    fn drop(&mut self) {
        for (kind, handler) in self.handlers.drain(..) {
            let _ = self
                .document
                .remove_event_listener_with_callback(kind, handler.as_ref().unchecked_ref());
        }
    }
}
