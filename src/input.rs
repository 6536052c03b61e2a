//! Raw input events the editor responds to.

use serde::{Deserialize, Serialize};

/// Phase of a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    /// Pointer left the surface, window lost focus, or the platform cancelled
    /// the gesture. Any active edit is discarded.
    Leave,
}

/// Device that produced a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PointerDevice {
    #[default]
    Mouse,
    Pen,
    /// Finger touch; never starts a draw or resize.
    Touch,
}

/// A pointer event in device coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub device: PointerDevice,
    /// Number of simultaneous contacts on the surface.
    #[serde(default = "default_contacts")]
    pub contacts: u8,
}

fn default_contacts() -> u8 {
    1
}

impl PointerEvent {
    pub fn new(phase: PointerPhase, x: f32, y: f32) -> Self {
        Self {
            phase,
            x,
            y,
            device: PointerDevice::Mouse,
            contacts: 1,
        }
    }

    pub fn down(x: f32, y: f32) -> Self {
        Self::new(PointerPhase::Down, x, y)
    }

    pub fn moved(x: f32, y: f32) -> Self {
        Self::new(PointerPhase::Move, x, y)
    }

    pub fn up(x: f32, y: f32) -> Self {
        Self::new(PointerPhase::Up, x, y)
    }

    pub fn leave() -> Self {
        Self::new(PointerPhase::Leave, 0.0, 0.0)
    }

    pub fn with_device(mut self, device: PointerDevice) -> Self {
        self.device = device;
        self
    }

    pub fn with_contacts(mut self, contacts: u8) -> Self {
        self.contacts = contacts;
        self
    }

    /// Whether this event may start or continue an annotation gesture.
    ///
    /// Multi-contact gestures (pinch, pan) and finger touches are reserved
    /// for navigation.
    pub fn is_annotation_contact(&self) -> bool {
        self.contacts <= 1 && self.device != PointerDevice::Touch
    }
}

/// Keyboard keys the editor knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Char(char),
    Escape,
    Backspace,
    Delete,
    Up,
    Down,
    Left,
    Right,
}

/// Keyboard modifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub meta: bool,
}

/// A key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key: Key,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::default(),
        }
    }

    pub fn with_shift(mut self) -> Self {
        self.modifiers.shift = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotation_contact_filter() {
        assert!(PointerEvent::down(0.0, 0.0).is_annotation_contact());
        assert!(PointerEvent::down(0.0, 0.0).with_device(PointerDevice::Pen).is_annotation_contact());
        assert!(!PointerEvent::down(0.0, 0.0).with_device(PointerDevice::Touch).is_annotation_contact());
        assert!(!PointerEvent::down(0.0, 0.0).with_contacts(2).is_annotation_contact());
        assert!(
            !PointerEvent::down(0.0, 0.0)
                .with_device(PointerDevice::Pen)
                .with_contacts(2)
                .is_annotation_contact()
        );
    }

    #[test]
    fn test_pointer_event_json_defaults() {
        let event: PointerEvent = serde_json::from_str(r#"{"phase": "Down", "x": 3.0, "y": 4.0}"#).unwrap();
        assert_eq!(event, PointerEvent::down(3.0, 4.0));
    }
}
