//! Keyboard bindings and held-key tracking
//!
//! Movement keys are tracked while held and sampled once per frame into an
//! [`InputState`]. Interact, submit, cancel and the task panel toggle are
//! discrete [`Command`]s handled the moment the key goes down.

use std::collections::HashSet;

use crate::game::Command;
use crate::sim::InputState;

const LEFT_KEYS: [&str; 3] = ["a", "arrowleft", "ф"];
const RIGHT_KEYS: [&str; 3] = ["d", "arrowright", "в"];
const JUMP_KEY: &str = " ";
const INTERACT_KEYS: [&str; 2] = ["e", "у"];

/// Keys currently held down, stored lowercase
#[derive(Debug, Clone, Default)]
pub struct KeyTracker {
    held: HashSet<String>,
}

impl KeyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a key press, returning a command if the key maps to one
    ///
    /// While the terminal is open only Tab, Escape and Enter do anything, and
    /// nothing is recorded as held.
    pub fn key_down(&mut self, key: &str, terminal_open: bool) -> Option<Command> {
        if key == "Tab" {
            return Some(Command::TogglePanel);
        }

        if terminal_open {
            return match key {
                "Escape" => Some(Command::Cancel),
                "Enter" => Some(Command::Submit),
                _ => None,
            };
        }

        let key = key.to_lowercase();
        if INTERACT_KEYS.contains(&key.as_str()) {
            return Some(Command::Interact);
        }
        self.held.insert(key);
        None
    }

    pub fn key_up(&mut self, key: &str) {
        self.held.remove(&key.to_lowercase());
    }

    /// Forget everything held, e.g. when the window loses focus
    pub fn clear(&mut self) {
        self.held.clear();
    }

    pub fn is_held(&self, key: &str) -> bool {
        self.held.contains(&key.to_lowercase())
    }

    /// Movement snapshot for the next tick
    pub fn input_state(&self) -> InputState {
        let any = |keys: &[&str]| keys.iter().any(|k| self.is_held(k));
        InputState {
            left: any(&LEFT_KEYS),
            right: any(&RIGHT_KEYS),
            jump: self.is_held(JUMP_KEY),
        }
    }
}
