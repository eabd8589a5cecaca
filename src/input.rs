use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Identifier for a physical keyboard key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    Named(NamedKey),
    Character(char),
}

impl KeyCode {
    /// Parses key names as reported by the DOM (`KeyboardEvent.key`) or
    /// written in configuration files.
    pub fn from_name(name: &str) -> Option<Self> {
        if let Some(key) = parse_named_key(name) {
            return Some(key);
        }
        let mut chars = name.chars();
        let (Some(ch), None) = (chars.next(), chars.next()) else {
            return None;
        };
        if ch.is_ascii_alphanumeric() {
            return Some(Self::Character(ch.to_ascii_uppercase()));
        }
        None
    }
}

fn parse_named_key(name: &str) -> Option<KeyCode> {
    use NamedKey::*;
    let key = match name {
        " " | "Space" | "Spacebar" => Space,
        "Enter" | "Return" => Enter,
        "Left" | "ArrowLeft" => Left,
        "Right" | "ArrowRight" => Right,
        "Up" | "ArrowUp" => Up,
        "Down" | "ArrowDown" => Down,
        "Escape" | "Esc" => Escape,
        _ => return None,
    };
    Some(KeyCode::Named(key))
}

/// Friendly names for the non-character keys the game cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NamedKey {
    Space,
    Enter,
    Left,
    Right,
    Up,
    Down,
    Escape,
}

/// Logical actions understood by the physics step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    MoveLeft,
    MoveRight,
    Jump,
}

impl Action {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "left" | "move-left" => Some(Self::MoveLeft),
            "right" | "move-right" => Some(Self::MoveRight),
            "jump" | "up" => Some(Self::Jump),
            _ => None,
        }
    }
}

/// Mapping table from raw key codes to actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBindings {
    table: HashMap<KeyCode, Action>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let mut bindings = Self::empty();
        bindings.bind(KeyCode::Named(NamedKey::Left), Action::MoveLeft);
        bindings.bind(KeyCode::Character('A'), Action::MoveLeft);
        bindings.bind(KeyCode::Named(NamedKey::Right), Action::MoveRight);
        bindings.bind(KeyCode::Character('D'), Action::MoveRight);
        bindings.bind(KeyCode::Named(NamedKey::Up), Action::Jump);
        bindings.bind(KeyCode::Character('W'), Action::Jump);
        bindings.bind(KeyCode::Named(NamedKey::Space), Action::Jump);
        bindings
    }
}

impl KeyBindings {
    pub fn empty() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    /// Binds `key` to `action`, replacing any previous binding for that key.
    pub fn bind(&mut self, key: KeyCode, action: Action) {
        self.table.insert(key, action);
    }

    pub fn unbind(&mut self, key: KeyCode) -> Option<Action> {
        self.table.remove(&key)
    }

    pub fn action_for(&self, key: KeyCode) -> Option<Action> {
        self.table.get(&key).copied()
    }

    pub fn action_for_name(&self, name: &str) -> Option<Action> {
        KeyCode::from_name(name).and_then(|key| self.action_for(key))
    }
}

/// Latched "held" status of every action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputState {
    pub move_left: bool,
    pub move_right: bool,
    pub jump_held: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_action(&mut self, action: Action, pressed: bool) {
        match action {
            Action::MoveLeft => self.move_left = pressed,
            Action::MoveRight => self.move_right = pressed,
            Action::Jump => self.jump_held = pressed,
        }
    }

    pub fn is_held(&self, action: Action) -> bool {
        match action {
            Action::MoveLeft => self.move_left,
            Action::MoveRight => self.move_right,
            Action::Jump => self.jump_held,
        }
    }

    /// Applies a raw key transition. Keys without a binding are ignored and
    /// `false` is returned.
    pub fn apply_key(&mut self, bindings: &KeyBindings, key: KeyCode, pressed: bool) -> bool {
        match bindings.action_for(key) {
            Some(action) => {
                self.set_action(action, pressed);
                true
            }
            None => false,
        }
    }
}

/// Input handle shared between event callbacks and the frame driver.
#[derive(Debug, Clone, Default)]
pub struct SharedInput {
    state: Arc<RwLock<InputState>>,
}

impl SharedInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_action(&self, action: Action, pressed: bool) {
        self.state.write().set_action(action, pressed);
    }

    pub fn apply_key(&self, bindings: &KeyBindings, key: KeyCode, pressed: bool) -> bool {
        self.state.write().apply_key(bindings, key, pressed)
    }

    /// Returns a consistent copy of the current input.
    pub fn snapshot(&self) -> InputState {
        *self.state.read()
    }

    pub fn release_all(&self) {
        *self.state.write() = InputState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dom_and_config_key_names() {
        assert_eq!(
            KeyCode::from_name("ArrowLeft"),
            Some(KeyCode::Named(NamedKey::Left))
        );
        assert_eq!(
            KeyCode::from_name(" "),
            Some(KeyCode::Named(NamedKey::Space))
        );
        assert_eq!(KeyCode::from_name("d"), Some(KeyCode::Character('D')));
        assert_eq!(KeyCode::from_name("Shift"), None);
        assert_eq!(KeyCode::from_name(""), None);
    }

    #[test]
    fn set_action_touches_one_field() {
        let mut input = InputState::new();
        input.set_action(Action::Jump, true);
        assert_eq!(
            input,
            InputState {
                move_left: false,
                move_right: false,
                jump_held: true,
            }
        );
        input.set_action(Action::Jump, false);
        assert_eq!(input, InputState::default());
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let bindings = KeyBindings::default();
        let mut input = InputState::new();
        assert!(!input.apply_key(&bindings, KeyCode::Character('Q'), true));
        assert_eq!(input, InputState::default());

        assert!(input.apply_key(&bindings, KeyCode::Named(NamedKey::Right), true));
        assert!(input.is_held(Action::MoveRight));
    }

    #[test]
    fn bindings_can_be_remapped() {
        let mut bindings = KeyBindings::default();
        assert_eq!(bindings.action_for_name("w"), Some(Action::Jump));
        bindings.unbind(KeyCode::Character('W'));
        bindings.bind(KeyCode::Character('K'), Action::Jump);
        assert_eq!(bindings.action_for_name("w"), None);
        assert_eq!(bindings.action_for_name("k"), Some(Action::Jump));
    }

    #[test]
    fn shared_input_snapshots_are_detached() {
        let shared = SharedInput::new();
        let writer = shared.clone();
        writer.set_action(Action::MoveLeft, true);
        let snapshot = shared.snapshot();
        writer.set_action(Action::MoveLeft, false);
        assert!(snapshot.move_left);
        assert!(!shared.snapshot().move_left);
    }

    #[test]
    fn action_names() {
        assert_eq!(Action::from_name("Left"), Some(Action::MoveLeft));
        assert_eq!(Action::from_name(" jump "), Some(Action::Jump));
        assert_eq!(Action::from_name("crouch"), None);
    }
}
