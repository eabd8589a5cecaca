use std::env;
use std::fs;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use log::info;

use platformer_core::{Action, DrawSurface, Frame, FrameDriver, SharedInput, World, WorldConfig};

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}

fn run() -> Result<()> {
    let options = CliOptions::parse(env::args().skip(1))?;
    let config = match &options.level {
        Some(path) => {
            let xml = fs::read_to_string(path)
                .with_context(|| format!("failed to read level {path}"))?;
            WorldConfig::from_xml(&xml)
                .with_context(|| format!("failed to parse level {path}"))?
        }
        None => WorldConfig::default(),
    };
    let world = Arc::new(World::from_config(config).context("invalid level")?);

    println!(
        "Loaded level with {} platforms (arena {}x{})",
        world.platforms().len(),
        world.arena_width(),
        world.arena_height()
    );
    for platform in world.platforms() {
        println!(
            " - platform x={} y={} w={} h={}",
            platform.x, platform.y, platform.width, platform.height
        );
    }

    let input = SharedInput::new();
    for action in &options.held {
        input.set_action(*action, true);
    }

    let mut driver = FrameDriver::new(Arc::clone(&world), input);
    let mut surface = ConsoleSurface {
        trace: options.trace,
    };
    let mut respawns = 0;
    for _ in 0..options.ticks {
        if driver.tick(&mut surface).respawned {
            respawns += 1;
        }
    }
    info!("simulated {} ticks ({respawns} respawns)", driver.tick_count());

    let body = driver.body();
    println!("Simulated {} tick(s)", driver.tick_count());
    println!(
        "Final player state: pos=({:.2}, {:.2}) vel=({:.2}, {:.2}) airborne={}",
        body.position.x, body.position.y, body.velocity.x, body.velocity.y, body.airborne
    );
    Ok(())
}

struct ConsoleSurface {
    trace: bool,
}

impl DrawSurface for ConsoleSurface {
    fn present(&mut self, frame: &Frame<'_>) {
        if self.trace {
            println!(
                "tick {:>4}: player=({:.2}, {:.2})",
                frame.tick, frame.player.x, frame.player.y
            );
        }
    }
}

#[derive(Debug, PartialEq)]
struct CliOptions {
    level: Option<String>,
    ticks: u64,
    held: Vec<Action>,
    trace: bool,
}

const USAGE: &str =
    "Usage: platformer-core [level.xml] [--ticks N] [--hold left,right,jump] [--trace]";

impl CliOptions {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut args = args.into_iter();
        let mut options = Self {
            level: None,
            ticks: 60,
            held: Vec::new(),
            trace: false,
        };
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--ticks" => {
                    let value = args
                        .next()
                        .ok_or_else(|| anyhow!("--ticks expects a value. {USAGE}"))?;
                    options.ticks = value
                        .parse()
                        .with_context(|| format!("invalid tick count `{value}`"))?;
                }
                "--hold" => {
                    let value = args
                        .next()
                        .ok_or_else(|| anyhow!("--hold expects a value. {USAGE}"))?;
                    for name in value.split(',').filter(|name| !name.trim().is_empty()) {
                        let action = Action::from_name(name)
                            .ok_or_else(|| anyhow!("unknown action `{name}`"))?;
                        options.held.push(action);
                    }
                }
                "--trace" => options.trace = true,
                other if other.starts_with("--") => {
                    return Err(anyhow!("Unknown argument: {other}. {USAGE}"));
                }
                path if options.level.is_none() => options.level = Some(path.to_string()),
                extra => return Err(anyhow!("Unexpected argument: {extra}. {USAGE}")),
            }
        }
        Ok(options)
    }
}
