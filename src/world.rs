use anyhow::{anyhow, Context, Result};
use glam::Vec2;
use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::body::PlayerBody;
use crate::geometry::Rect;

/// Reasons a [`WorldConfig`] is rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WorldError {
    #[error("{name} must be a finite number (got {value})")]
    NonFinite { name: &'static str, value: f32 },
    #[error("friction must lie in [0, 1] (got {0})")]
    FrictionOutOfRange(f32),
    #[error("{name} must be positive (got {value})")]
    NonPositive { name: &'static str, value: f32 },
    #[error("arena width {arena} cannot fit a player {player} wide")]
    ArenaTooNarrow { arena: f32, player: f32 },
    #[error("spawn point ({x}, {y}) lies outside the arena")]
    SpawnOutsideArena { x: f32, y: f32 },
    #[error("platform #{index} has invalid geometry: {rect:?}")]
    InvalidPlatform { index: usize, rect: Rect },
}

/// Static description of a level, as written in configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub gravity: f32,
    pub friction: f32,
    pub move_speed: f32,
    pub jump_impulse: f32,
    pub arena_width: f32,
    pub arena_height: f32,
    pub player_size: Vec2,
    pub spawn: Vec2,
    pub platforms: Vec<Rect>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: 0.4,
            friction: 0.8,
            move_speed: 5.0,
            jump_impulse: 10.0,
            arena_width: 400.0,
            arena_height: 400.0,
            player_size: Vec2::new(30.0, 30.0),
            spawn: Vec2::new(50.0, 300.0),
            platforms: default_platforms(),
        }
    }
}

fn default_platforms() -> Vec<Rect> {
    vec![
        Rect::new(0.0, 380.0, 400.0, 20.0),
        Rect::new(130.0, 300.0, 100.0, 15.0),
        Rect::new(260.0, 220.0, 100.0, 15.0),
        Rect::new(60.0, 150.0, 90.0, 15.0),
    ]
}

impl WorldConfig {
    /// Parses a `<level>` document. Missing elements and attributes keep
    /// their default values; any `<platform>` replaces the default layout.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let document = Document::parse(xml).context("invalid level XML")?;
        let root = document.root_element();
        if !root.has_tag_name("level") {
            return Err(anyhow!(
                "expected <level> root element, found <{}>",
                root.tag_name().name()
            ));
        }

        let mut config = Self::default();

        if let Some(physics) = child(&root, "physics") {
            config.gravity = parse_attr(&physics, "gravity", config.gravity)?;
            config.friction = parse_attr(&physics, "friction", config.friction)?;
            config.move_speed = parse_attr(&physics, "move-speed", config.move_speed)?;
            config.jump_impulse = parse_attr(&physics, "jump-impulse", config.jump_impulse)?;
        }
        if let Some(arena) = child(&root, "arena") {
            config.arena_width = parse_attr(&arena, "width", config.arena_width)?;
            config.arena_height = parse_attr(&arena, "height", config.arena_height)?;
        }
        if let Some(player) = child(&root, "player") {
            config.player_size.x = parse_attr(&player, "width", config.player_size.x)?;
            config.player_size.y = parse_attr(&player, "height", config.player_size.y)?;
            config.spawn.x = parse_attr(&player, "spawn-x", config.spawn.x)?;
            config.spawn.y = parse_attr(&player, "spawn-y", config.spawn.y)?;
        }

        let platforms = root
            .children()
            .filter(|node| node.has_tag_name("platform"))
            .enumerate()
            .map(|(index, node)| {
                parse_platform(&node).with_context(|| format!("platform #{index}"))
            })
            .collect::<Result<Vec<_>>>()?;
        if !platforms.is_empty() {
            config.platforms = platforms;
        }

        Ok(config)
    }
}

fn child<'a, 'input>(node: &Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|child| child.has_tag_name(tag))
}

fn parse_platform(node: &Node<'_, '_>) -> Result<Rect> {
    Ok(Rect::new(
        required_attr(node, "x")?,
        required_attr(node, "y")?,
        required_attr(node, "width")?,
        required_attr(node, "height")?,
    ))
}

fn required_attr(node: &Node<'_, '_>, name: &str) -> Result<f32> {
    let value = node
        .attribute(name)
        .ok_or_else(|| anyhow!("`{name}` attribute is missing"))?;
    parse_number(name, value)
}

fn parse_attr(node: &Node<'_, '_>, name: &str, default: f32) -> Result<f32> {
    match node.attribute(name) {
        Some(value) => parse_number(name, value),
        None => Ok(default),
    }
}

fn parse_number(name: &str, value: &str) -> Result<f32> {
    value
        .trim()
        .parse::<f32>()
        .map_err(|err| anyhow!("failed to parse `{name}`: {err}"))
}

/// Validated, immutable simulation world.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct World {
    config: WorldConfig,
}

impl World {
    pub fn from_config(config: WorldConfig) -> Result<Self, WorldError> {
        for (name, value) in [
            ("gravity", config.gravity),
            ("friction", config.friction),
            ("move speed", config.move_speed),
            ("jump impulse", config.jump_impulse),
            ("spawn x", config.spawn.x),
            ("spawn y", config.spawn.y),
        ] {
            if !value.is_finite() {
                return Err(WorldError::NonFinite { name, value });
            }
        }
        if !(0.0..=1.0).contains(&config.friction) {
            return Err(WorldError::FrictionOutOfRange(config.friction));
        }
        for (name, value) in [
            ("arena width", config.arena_width),
            ("arena height", config.arena_height),
            ("player width", config.player_size.x),
            ("player height", config.player_size.y),
        ] {
            if !value.is_finite() {
                return Err(WorldError::NonFinite { name, value });
            }
            if value <= 0.0 {
                return Err(WorldError::NonPositive { name, value });
            }
        }
        if config.arena_width < config.player_size.x {
            return Err(WorldError::ArenaTooNarrow {
                arena: config.arena_width,
                player: config.player_size.x,
            });
        }
        let max_x = config.arena_width - config.player_size.x;
        if !(0.0..=max_x).contains(&config.spawn.x) || config.spawn.y > config.arena_height {
            return Err(WorldError::SpawnOutsideArena {
                x: config.spawn.x,
                y: config.spawn.y,
            });
        }
        if let Some((index, rect)) = config
            .platforms
            .iter()
            .enumerate()
            .find(|(_, rect)| !rect.has_valid_geometry())
        {
            return Err(WorldError::InvalidPlatform {
                index,
                rect: *rect,
            });
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn platforms(&self) -> &[Rect] {
        &self.config.platforms
    }

    pub fn gravity(&self) -> f32 {
        self.config.gravity
    }

    pub fn friction(&self) -> f32 {
        self.config.friction
    }

    pub fn move_speed(&self) -> f32 {
        self.config.move_speed
    }

    pub fn jump_impulse(&self) -> f32 {
        self.config.jump_impulse
    }

    pub fn arena_width(&self) -> f32 {
        self.config.arena_width
    }

    pub fn arena_height(&self) -> f32 {
        self.config.arena_height
    }

    pub fn player_size(&self) -> Vec2 {
        self.config.player_size
    }

    pub fn spawn_body(&self) -> PlayerBody {
        PlayerBody::spawned_at(self.config.spawn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
    <level>
        <physics gravity="0.5" jump-impulse="12"/>
        <arena width="640" height="480"/>
        <player width="20" spawn-y="100"/>
        <platform x="0" y="460" width="640" height="20"/>
        <platform x="100" y="400" width="50" height="10"/>
    </level>
    "#;

    #[test]
    fn default_config_is_valid() {
        let world = World::from_config(WorldConfig::default()).unwrap();
        assert_eq!(world, World::default());
        assert_eq!(world.platforms()[0], Rect::new(0.0, 380.0, 400.0, 20.0));
        let spawn = world.spawn_body();
        assert_eq!(spawn.position, Vec2::new(50.0, 300.0));
        assert!(spawn.airborne);
    }

    #[test]
    fn parse_level_overrides_defaults() {
        let config = WorldConfig::from_xml(SAMPLE).unwrap();
        assert_eq!(config.gravity, 0.5);
        assert_eq!(config.friction, 0.8);
        assert_eq!(config.jump_impulse, 12.0);
        assert_eq!(config.arena_width, 640.0);
        assert_eq!(config.player_size, Vec2::new(20.0, 30.0));
        assert_eq!(config.spawn, Vec2::new(50.0, 100.0));
        assert_eq!(config.platforms.len(), 2);
        assert_eq!(config.platforms[1], Rect::new(100.0, 400.0, 50.0, 10.0));
        assert!(World::from_config(config).is_ok());
    }

    #[test]
    fn level_without_platforms_keeps_default_layout() {
        let config = WorldConfig::from_xml("<level/>").unwrap();
        assert_eq!(config, WorldConfig::default());
    }

    #[test]
    fn malformed_levels_are_errors() {
        assert!(WorldConfig::from_xml("<scene/>").is_err());
        let missing_height = r#"<level><platform x="0" y="0" width="5"/></level>"#;
        assert!(WorldConfig::from_xml(missing_height).is_err());
        let bad_number = r#"<level><physics gravity="heavy"/></level>"#;
        assert!(WorldConfig::from_xml(bad_number).is_err());
    }

    #[test]
    fn rejects_spawn_outside_arena() {
        let config = WorldConfig {
            spawn: Vec2::new(50.0, 500.0),
            ..WorldConfig::default()
        };
        assert_eq!(
            World::from_config(config),
            Err(WorldError::SpawnOutsideArena { x: 50.0, y: 500.0 })
        );

        let config = WorldConfig {
            spawn: Vec2::new(380.0, 300.0),
            ..WorldConfig::default()
        };
        assert!(matches!(
            World::from_config(config),
            Err(WorldError::SpawnOutsideArena { .. })
        ));

        // Spawning above the visible arena is allowed; the body falls in.
        let config = WorldConfig {
            spawn: Vec2::new(370.0, -40.0),
            ..WorldConfig::default()
        };
        assert!(World::from_config(config).is_ok());
    }

    #[test]
    fn rejects_degenerate_platforms() {
        let mut config = WorldConfig::default();
        config.platforms.push(Rect::new(10.0, 10.0, 0.0, 5.0));
        assert_eq!(
            World::from_config(config),
            Err(WorldError::InvalidPlatform {
                index: 4,
                rect: Rect::new(10.0, 10.0, 0.0, 5.0),
            })
        );
    }

    #[test]
    fn rejects_bad_constants() {
        let config = WorldConfig {
            friction: 1.5,
            ..WorldConfig::default()
        };
        assert_eq!(
            World::from_config(config),
            Err(WorldError::FrictionOutOfRange(1.5))
        );

        let config = WorldConfig {
            gravity: f32::INFINITY,
            ..WorldConfig::default()
        };
        assert!(matches!(
            World::from_config(config),
            Err(WorldError::NonFinite { name: "gravity", .. })
        ));

        let config = WorldConfig {
            arena_width: 10.0,
            ..WorldConfig::default()
        };
        assert!(matches!(
            World::from_config(config),
            Err(WorldError::ArenaTooNarrow { .. })
        ));

        let config = WorldConfig {
            player_size: Vec2::new(30.0, -1.0),
            ..WorldConfig::default()
        };
        assert!(matches!(
            World::from_config(config),
            Err(WorldError::NonPositive {
                name: "player height",
                ..
            })
        ));
    }
}
