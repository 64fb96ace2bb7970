//! Input system trait for platform-specific implementations
//!
//! A windowing backend owns the live device state and exposes it through
//! [`InputSystem`]. [`VirtualInput`] is an event-driven implementation for
//! hosts that feed input themselves (headless runners, tests).

use glam::Vec2;

use crate::joystick::JoystickState;
use crate::keyboard::{Key, KeyboardState};
use crate::mouse::{CursorMode, MouseButtonType, MouseState};

/// Live input devices of a window system
pub trait InputSystem {
    /// Current mouse state
    fn mouse(&self) -> &MouseState;

    /// Current keyboard state
    fn keyboard(&self) -> &KeyboardState;

    /// Forget the state of a single key
    fn clear_key(&mut self, key: Key);

    /// Number of joysticks attached
    fn joystick_count(&self) -> usize;

    /// State of the joystick at `index`
    fn joystick(&self, index: usize) -> Option<&JoystickState>;

    /// Change how the cursor behaves in the main window
    fn set_cursor_mode(&mut self, mode: CursorMode);

    fn cursor_mode(&self) -> CursorMode;

    /// Clear per-frame deltas. Called once at the end of every engine frame.
    fn end_frame(&mut self);

    /// Check a mouse button
    fn is_mouse_button_down(&self, button: MouseButtonType) -> bool {
        self.mouse().buttons.is_down(button)
    }
}

/// Input system driven by injected events
#[derive(Debug, Clone, Default)]
pub struct VirtualInput {
    mouse: MouseState,
    keyboard: KeyboardState,
    joysticks: Vec<JoystickState>,
    cursor_mode: CursorMode,
}

impl VirtualInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an input system for a window of the given size
    pub fn with_window_size(width: f32, height: f32) -> Self {
        let mut input = Self::default();
        input.mouse.window_size = Vec2::new(width, height);
        input
    }

    pub fn mouse_mut(&mut self) -> &mut MouseState {
        &mut self.mouse
    }

    pub fn keyboard_mut(&mut self) -> &mut KeyboardState {
        &mut self.keyboard
    }

    /// Attach a joystick and return its index
    pub fn add_joystick(&mut self, joystick: JoystickState) -> usize {
        self.joysticks.push(joystick);
        self.joysticks.len() - 1
    }

    pub fn joystick_mut(&mut self, index: usize) -> Option<&mut JoystickState> {
        self.joysticks.get_mut(index)
    }

    pub fn press_key(&mut self, key: Key) {
        self.keyboard.press(key);
    }

    pub fn release_key(&mut self, key: Key) {
        self.keyboard.release(key);
    }

    pub fn move_mouse(&mut self, x: f32, y: f32) {
        self.mouse.move_to(Vec2::new(x, y));
    }

    pub fn set_mouse_button(&mut self, button: MouseButtonType, down: bool) {
        self.mouse.buttons.set(button, down);
    }

    pub fn scroll(&mut self, delta: f32) {
        self.mouse.wheel_delta += delta;
    }
}

impl InputSystem for VirtualInput {
    fn mouse(&self) -> &MouseState {
        &self.mouse
    }

    fn keyboard(&self) -> &KeyboardState {
        &self.keyboard
    }

    fn clear_key(&mut self, key: Key) {
        self.keyboard.clear_key(key);
    }

    fn joystick_count(&self) -> usize {
        self.joysticks.len()
    }

    fn joystick(&self, index: usize) -> Option<&JoystickState> {
        self.joysticks.get(index)
    }

    fn set_cursor_mode(&mut self, mode: CursorMode) {
        self.cursor_mode = mode;
    }

    fn cursor_mode(&self) -> CursorMode {
        self.cursor_mode
    }

    fn end_frame(&mut self) {
        self.mouse.end_frame();
        self.keyboard.update();
        self.joysticks.iter_mut().for_each(JoystickState::end_frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_virtual_input() {
        let input = VirtualInput::new();

        assert_eq!(input.joystick_count(), 0);
        assert!(input.joystick(0).is_none());
        assert!(!input.keyboard().any_pressed());
        assert!(!input.is_mouse_button_down(MouseButtonType::Left));
        assert_eq!(input.cursor_mode(), CursorMode::Normal);
    }

    #[test]
    fn test_end_frame_clears_deltas() {
        let mut input = VirtualInput::with_window_size(800.0, 600.0);
        input.move_mouse(20.0, 30.0);
        input.scroll(1.5);
        input.press_key(Key::A);
        let index = input.add_joystick(JoystickState::new(2, 2));
        if let Some(joystick) = input.joystick_mut(index) {
            joystick.set_button(0, true);
        }

        input.end_frame();

        assert_eq!(input.mouse().relative, Vec2::ZERO);
        assert_eq!(input.mouse().wheel_delta, 0.0);
        assert_eq!(input.mouse().window_size, Vec2::new(800.0, 600.0));
        assert!(input.keyboard().is_pressed(Key::A));
        assert!(!input.keyboard().is_just_pressed(Key::A));
        let joystick = input.joystick(index).unwrap();
        assert!(joystick.is_button_down(0));
        assert!(!joystick.was_button_pressed(0));
    }

    #[test]
    fn test_clear_key_through_trait() {
        let mut input = VirtualInput::new();
        input.press_key(Key::Escape);
        InputSystem::clear_key(&mut input, Key::Escape);
        assert!(!input.keyboard().is_pressed(Key::Escape));
    }
}
