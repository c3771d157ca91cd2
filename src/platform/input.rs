//! Held-key tracking
//!
//! Key events arrive asynchronously from the page; the simulation reads a
//! snapshot once per frame. Keys other than the four arrow names are ignored.

use crate::sim::InputSnapshot;

/// Paddle direction keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value. Older browsers report "Left"/"Right".
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ArrowLeft" | "Left" => Some(Key::Left),
            "ArrowRight" | "Right" => Some(Key::Right),
            _ => None,
        }
    }
}

/// Current held state of the direction keys
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyTracker {
    left: bool,
    right: bool,
}

impl KeyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key press. Returns true if the key is one we track.
    pub fn key_down(&mut self, name: &str) -> bool {
        self.set(name, true)
    }

    /// Record a key release. Returns true if the key is one we track.
    pub fn key_up(&mut self, name: &str) -> bool {
        self.set(name, false)
    }

    fn set(&mut self, name: &str, held: bool) -> bool {
        match Key::from_name(name) {
            Some(Key::Left) => self.left = held,
            Some(Key::Right) => self.right = held,
            None => return false,
        }
        true
    }

    pub fn is_held(&self, key: Key) -> bool {
        match key {
            Key::Left => self.left,
            Key::Right => self.right,
        }
    }

    pub fn snapshot(&self) -> InputSnapshot {
        InputSnapshot {
            left: self.left,
            right: self.right,
        }
    }

    /// Release everything
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
