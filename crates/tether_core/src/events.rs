//! Input events routed to open overlays
//!
//! The host translates its native pointer/keyboard/scroll/resize events into
//! [`InputEvent`]s and hands them to every overlay host that is open. Each host
//! only reacts to kinds it has a live listener for.

use serde::{Deserialize, Serialize};

use crate::element::ElementId;
use crate::geometry::Viewport;

/// Keys the overlay system cares about
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Escape,
    Enter,
    Tab,
    ArrowUp,
    ArrowDown,
    Backspace,
    Character(char),
}

impl Key {
    /// Parse a key name as written in scenario files ("escape", "enter", "a")
    pub fn from_name(name: &str) -> Option<Key> {
        let key = match name.to_ascii_lowercase().as_str() {
            "escape" | "esc" => Key::Escape,
            "enter" | "return" => Key::Enter,
            "tab" => Key::Tab,
            "arrowup" | "up" => Key::ArrowUp,
            "arrowdown" | "down" => Key::ArrowDown,
            "backspace" => Key::Backspace,
            _ => {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Character(c),
                    _ => return None,
                }
            }
        };
        Some(key)
    }
}

/// Event categories a listener can subscribe to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    PointerDown,
    KeyDown,
    Scroll,
    Resize,
}

/// Propagation phase a listener is registered for
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Runs before the event reaches its target (sees scrolls of any element)
    Capture,
    #[default]
    Bubble,
}

/// A host input event
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    /// Pointer pressed; `target` is the hit element, if the host resolved one
    PointerDown {
        target: Option<ElementId>,
        x: f32,
        y: f32,
    },
    /// Key pressed
    KeyDown { key: Key },
    /// Some element scrolled; `None` means the document itself
    Scroll { target: Option<ElementId> },
    /// Window resized
    Resize { viewport: Viewport },
}

impl InputEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            InputEvent::PointerDown { .. } => EventKind::PointerDown,
            InputEvent::KeyDown { .. } => EventKind::KeyDown,
            InputEvent::Scroll { .. } => EventKind::Scroll,
            InputEvent::Resize { .. } => EventKind::Resize,
        }
    }

    /// Pointer press on an element
    pub fn pointer_down(target: ElementId) -> Self {
        InputEvent::PointerDown {
            target: Some(target),
            x: 0.0,
            y: 0.0,
        }
    }

    pub fn key(key: Key) -> Self {
        InputEvent::KeyDown { key }
    }

    pub fn scroll(target: Option<ElementId>) -> Self {
        InputEvent::Scroll { target }
    }
}
