//! Customizable keybindings for the editor.
//!
//! Maps key presses to editor actions. Bindings are part of the editor
//! configuration and can be overridden there.

use serde::{Deserialize, Serialize};

use crate::input::{Key, KeyEvent};

/// An action triggered from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyAction {
    /// Translate the selection by a document-space delta.
    Nudge { dx: f32, dy: f32 },
    /// Delete all selected elements.
    DeleteSelected,
    /// Abort the active gesture, or clear the selection when idle.
    Cancel,
}

/// Keybinding configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyBindings {
    #[serde(default = "default_nudge_left")]
    pub nudge_left: Key,
    #[serde(default = "default_nudge_right")]
    pub nudge_right: Key,
    #[serde(default = "default_nudge_up")]
    pub nudge_up: Key,
    #[serde(default = "default_nudge_down")]
    pub nudge_down: Key,
    /// Keys that delete the selection
    #[serde(default = "default_delete")]
    pub delete: Vec<Key>,
    #[serde(default = "default_cancel")]
    pub cancel: Key,
}

fn default_nudge_left() -> Key {
    Key::Left
}

fn default_nudge_right() -> Key {
    Key::Right
}

fn default_nudge_up() -> Key {
    Key::Up
}

fn default_nudge_down() -> Key {
    Key::Down
}

fn default_delete() -> Vec<Key> {
    vec![Key::Delete, Key::Backspace]
}

fn default_cancel() -> Key {
    Key::Escape
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            nudge_left: default_nudge_left(),
            nudge_right: default_nudge_right(),
            nudge_up: default_nudge_up(),
            nudge_down: default_nudge_down(),
            delete: default_delete(),
            cancel: default_cancel(),
        }
    }
}

impl KeyBindings {
    /// Create new keybindings with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the action for a key press, if any.
    ///
    /// `step` and `large_step` are the nudge distances without and with Shift.
    pub fn action_for(&self, event: &KeyEvent, step: f32, large_step: f32) -> Option<KeyAction> {
        let step = if event.modifiers.shift { large_step } else { step };
        let key = event.key;

        if key == self.nudge_left {
            Some(KeyAction::Nudge { dx: -step, dy: 0.0 })
        } else if key == self.nudge_right {
            Some(KeyAction::Nudge { dx: step, dy: 0.0 })
        } else if key == self.nudge_up {
            Some(KeyAction::Nudge { dx: 0.0, dy: -step })
        } else if key == self.nudge_down {
            Some(KeyAction::Nudge { dx: 0.0, dy: step })
        } else if self.delete.contains(&key) {
            Some(KeyAction::DeleteSelected)
        } else if key == self.cancel {
            Some(KeyAction::Cancel)
        } else {
            None
        }
    }
}
