//! Input abstraction
//!
//! Polled once per frame. Two sources are OR'd together: physical keys held
//! down (matched against [`KeyBindings`]) and virtual actions toggled by the
//! host's touch buttons.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Closed set of game actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Jump,
    Shoot,
    Left,
    Right,
    Down,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::Jump,
        Action::Shoot,
        Action::Left,
        Action::Right,
        Action::Down,
    ];

    fn index(self) -> usize {
        match self {
            Action::Jump => 0,
            Action::Shoot => 1,
            Action::Left => 2,
            Action::Right => 3,
            Action::Down => 4,
        }
    }

    pub fn from_label(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "JUMP" => Some(Action::Jump),
            "SHOOT" => Some(Action::Shoot),
            "LEFT" => Some(Action::Left),
            "RIGHT" => Some(Action::Right),
            "DOWN" => Some(Action::Down),
            _ => None,
        }
    }
}

/// Action to key-code mapping. Each action accepts several alternate keys.
///
/// Key identifiers are layout-independent `KeyboardEvent.code` values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub jump: Vec<String>,
    pub shoot: Vec<String>,
    pub left: Vec<String>,
    pub right: Vec<String>,
    pub down: Vec<String>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        fn keys(codes: &[&str]) -> Vec<String> {
            codes.iter().map(|c| c.to_string()).collect()
        }
        Self {
            jump: keys(&["ArrowUp", "KeyW", "KeyZ"]),
            shoot: keys(&["Space", "KeyF"]),
            // KeyQ covers AZERTY layouts
            left: keys(&["ArrowLeft", "KeyA", "KeyQ"]),
            right: keys(&["ArrowRight", "KeyD"]),
            down: keys(&["ArrowDown", "KeyS"]),
        }
    }
}

impl KeyBindings {
    pub fn keys(&self, action: Action) -> &[String] {
        match action {
            Action::Jump => &self.jump,
            Action::Shoot => &self.shoot,
            Action::Left => &self.left,
            Action::Right => &self.right,
            Action::Down => &self.down,
        }
    }

    fn keys_mut(&mut self, action: Action) -> &mut Vec<String> {
        match action {
            Action::Jump => &mut self.jump,
            Action::Shoot => &mut self.shoot,
            Action::Left => &mut self.left,
            Action::Right => &mut self.right,
            Action::Down => &mut self.down,
        }
    }

    /// Whether a key code is bound to any action
    pub fn is_game_key(&self, code: &str) -> bool {
        Action::ALL
            .iter()
            .any(|&action| self.keys(action).iter().any(|k| k == code))
    }
}

/// Live input state, written by event listeners and read by the frame loop
#[derive(Debug, Clone, Default)]
pub struct InputState {
    bindings: KeyBindings,
    held: HashSet<String>,
    virtual_actions: [bool; 5],
}

impl InputState {
    pub fn new(bindings: KeyBindings) -> Self {
        Self {
            bindings,
            held: HashSet::new(),
            virtual_actions: [false; 5],
        }
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    pub fn is_action_active(&self, action: Action) -> bool {
        self.virtual_actions[action.index()]
            || self
                .bindings
                .keys(action)
                .iter()
                .any(|key| self.held.contains(key))
    }

    /// Record a key press. Returns true when the browser default should be
    /// suppressed (the key is bound to an action).
    pub fn key_down(&mut self, code: &str) -> bool {
        self.held.insert(code.to_string());
        self.bindings.is_game_key(code)
    }

    pub fn key_up(&mut self, code: &str) {
        self.held.remove(code);
    }

    /// Toggle an action from an on-screen control
    pub fn set_virtual_action(&mut self, action: Action, active: bool) {
        self.virtual_actions[action.index()] = active;
    }

    /// Replace an action's bindings with a single key
    ///
    /// Blank keys are ignored.
    pub fn remap(&mut self, action: Action, key: &str) {
        let key = key.trim();
        if key.is_empty() {
            log::debug!("Ignoring blank remap for {:?}", action);
            return;
        }
        *self.bindings.keys_mut(action) = vec![key.to_string()];
    }

    /// Release everything (focus loss, run start)
    pub fn clear(&mut self) {
        self.held.clear();
        self.virtual_actions = [false; 5];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bindings() {
        let mut input = InputState::default();
        assert!(!input.is_action_active(Action::Jump));
        assert!(input.key_down("KeyW"));
        assert!(input.is_action_active(Action::Jump));
        input.key_up("KeyW");
        assert!(!input.is_action_active(Action::Jump));
    }

    #[test]
    fn test_unbound_key_keeps_default() {
        let mut input = InputState::default();
        assert!(!input.key_down("KeyP"));
        for action in Action::ALL {
            assert!(!input.is_action_active(action));
        }
    }

    #[test]
    fn test_virtual_or_physical() {
        let mut input = InputState::default();
        input.set_virtual_action(Action::Right, true);
        assert!(input.is_action_active(Action::Right));

        input.key_down("ArrowRight");
        input.set_virtual_action(Action::Right, false);
        assert!(input.is_action_active(Action::Right));
        input.key_up("ArrowRight");
        assert!(!input.is_action_active(Action::Right));
    }

    #[test]
    fn test_remap_replaces_list() {
        let mut input = InputState::default();
        input.remap(Action::Jump, "KeyJ");
        assert_eq!(input.bindings().jump, vec!["KeyJ".to_string()]);

        input.key_down("ArrowUp");
        assert!(!input.is_action_active(Action::Jump));
        input.key_down("KeyJ");
        assert!(input.is_action_active(Action::Jump));
    }

    #[test]
    fn test_blank_remap_ignored() {
        let mut input = InputState::default();
        input.remap(Action::Shoot, "   ");
        assert_eq!(input.bindings().shoot, KeyBindings::default().shoot);
    }

    #[test]
    fn test_clear() {
        let mut input = InputState::default();
        input.key_down("Space");
        input.set_virtual_action(Action::Down, true);
        input.clear();
        assert!(!input.is_action_active(Action::Shoot));
        assert!(!input.is_action_active(Action::Down));
    }

    #[test]
    fn test_partial_bindings_fill_defaults() {
        let bindings: KeyBindings = serde_json::from_str(r#"{"jump":["KeyK"]}"#).unwrap();
        assert_eq!(bindings.jump, vec!["KeyK".to_string()]);
        assert_eq!(bindings.left, KeyBindings::default().left);
        assert_eq!(Action::from_label("shoot"), Some(Action::Shoot));
    }
}
