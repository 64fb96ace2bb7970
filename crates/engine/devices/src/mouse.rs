//! Mouse and cursor input types
//!
//! [`MouseState`] is the live per-frame mouse record kept by an input system.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Mouse button state flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MouseButtons {
    /// Left mouse button pressed
    pub left: bool,
    /// Right mouse button pressed
    pub right: bool,
    /// Middle mouse button (scroll wheel click) pressed
    pub middle: bool,
}

impl MouseButtons {
    /// Create a new MouseButtons with all buttons released
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if any button is pressed
    pub fn any_pressed(&self) -> bool {
        self.left || self.right || self.middle
    }

    /// Check a single button
    pub fn is_down(&self, button: MouseButtonType) -> bool {
        match button {
            MouseButtonType::Left => self.left,
            MouseButtonType::Right => self.right,
            MouseButtonType::Middle => self.middle,
        }
    }

    /// Set a single button
    pub fn set(&mut self, button: MouseButtonType, down: bool) {
        match button {
            MouseButtonType::Left => self.left = down,
            MouseButtonType::Right => self.right = down,
            MouseButtonType::Middle => self.middle = down,
        }
    }

    /// Reset all buttons to released state
    pub fn reset(&mut self) {
        self.left = false;
        self.right = false;
        self.middle = false;
    }
}

/// Mouse button identifiers, numbered the way scripts pass them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButtonType {
    /// Left mouse button (0)
    Left,
    /// Right mouse button (1)
    Right,
    /// Middle mouse button (2)
    Middle,
}

impl MouseButtonType {
    /// Map a script button id to a button
    pub fn from_index(index: i32) -> Option<Self> {
        match index {
            0 => Some(Self::Left),
            1 => Some(Self::Right),
            2 => Some(Self::Middle),
            _ => None,
        }
    }
}

/// Cursor mode for the application window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CursorMode {
    /// Visible, free movement (default)
    #[default]
    Normal,
    /// Hidden but not grabbed
    Hidden,
    /// Hidden and confined to the window
    Grabbed,
}

/// Live mouse state for the current frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MouseState {
    /// Cursor position in window pixels
    pub position: Vec2,
    /// Movement since the previous frame
    pub relative: Vec2,
    /// Size of the window the cursor lives in
    pub window_size: Vec2,
    /// Wheel movement this frame
    pub wheel_delta: f32,
    /// Whether the cursor moved this frame
    pub moved: bool,
    /// Button flags
    pub buttons: MouseButtons,
}

impl MouseState {
    /// Record an absolute cursor move
    pub fn move_to(&mut self, position: Vec2) {
        self.relative += position - self.position;
        self.position = position;
        self.moved = true;
    }

    /// Clear per-frame deltas
    pub fn end_frame(&mut self) {
        self.relative = Vec2::ZERO;
        self.wheel_delta = 0.0;
        self.moved = false;
    }
}
