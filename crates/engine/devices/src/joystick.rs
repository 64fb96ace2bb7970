//! Joystick state
//!
//! Axes are integer readings in the platform's native range. Relative axes hold
//! the change since the previous frame.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// State of one joystick for the current frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoystickState {
    axes: Vec<i32>,
    rel_axes: Vec<i32>,
    buttons: Vec<bool>,
    pressed: Vec<bool>,
    /// Accelerometer reading, zero when the device has none
    pub accel: Vec3,
}

impl Default for JoystickState {
    fn default() -> Self {
        Self::new(1, 3)
    }
}

impl JoystickState {
    /// Create a joystick with the given button and axis counts, all at rest
    pub fn new(buttons: usize, axes: usize) -> Self {
        Self {
            axes: vec![0; axes],
            rel_axes: vec![0; axes],
            buttons: vec![false; buttons],
            pressed: vec![false; buttons],
            accel: Vec3::ZERO,
        }
    }

    pub fn axis_count(&self) -> usize {
        self.axes.len()
    }

    pub fn button_count(&self) -> usize {
        self.buttons.len()
    }

    /// Number of buttons currently held
    pub fn pressed_button_count(&self) -> usize {
        self.buttons.iter().filter(|down| **down).count()
    }

    /// Axis value, 0 when out of range
    pub fn axis(&self, index: usize) -> i32 {
        self.axes.get(index).copied().unwrap_or(0)
    }

    /// Relative axis value, 0 when out of range
    pub fn rel_axis(&self, index: usize) -> i32 {
        self.rel_axes.get(index).copied().unwrap_or(0)
    }

    pub fn is_button_down(&self, index: usize) -> bool {
        self.buttons.get(index).copied().unwrap_or(false)
    }

    /// Whether the button went down during this frame
    pub fn was_button_pressed(&self, index: usize) -> bool {
        self.pressed.get(index).copied().unwrap_or(false)
    }

    /// Update an axis; out of range indices are ignored
    pub fn set_axis(&mut self, index: usize, value: i32) {
        if let (Some(axis), Some(rel)) = (self.axes.get_mut(index), self.rel_axes.get_mut(index)) {
            *rel += value - *axis;
            *axis = value;
        }
    }

    /// Update a button; out of range indices are ignored
    pub fn set_button(&mut self, index: usize, down: bool) {
        if let (Some(button), Some(pressed)) =
            (self.buttons.get_mut(index), self.pressed.get_mut(index))
        {
            if down && !*button {
                *pressed = true;
            }
            *button = down;
        }
    }

    /// Clear per-frame state (relative axes and pressed flags)
    pub fn end_frame(&mut self) {
        self.rel_axes.iter_mut().for_each(|rel| *rel = 0);
        self.pressed.iter_mut().for_each(|pressed| *pressed = false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_has_one_button_three_axes() {
        let state = JoystickState::default();
        assert_eq!(state.button_count(), 1);
        assert_eq!(state.axis_count(), 3);
        assert_eq!(state.axis(0), 0);
        assert!(!state.is_button_down(0));
        assert_eq!(state.accel, Vec3::ZERO);
    }

    #[test]
    fn test_axis_tracks_relative_motion() {
        let mut state = JoystickState::new(2, 2);
        state.set_axis(1, 100);
        state.set_axis(1, 250);
        assert_eq!(state.axis(1), 250);
        assert_eq!(state.rel_axis(1), 250);

        state.end_frame();
        assert_eq!(state.rel_axis(1), 0);
        assert_eq!(state.axis(1), 250);

        state.set_axis(7, 10);
        assert_eq!(state.axis(7), 0);
    }

    #[test]
    fn test_button_pressed_only_on_transition() {
        let mut state = JoystickState::new(4, 0);
        state.set_button(2, true);
        assert!(state.was_button_pressed(2));
        assert_eq!(state.pressed_button_count(), 1);

        state.end_frame();
        state.set_button(2, true);
        assert!(state.is_button_down(2));
        assert!(!state.was_button_pressed(2));

        state.set_button(2, false);
        assert_eq!(state.pressed_button_count(), 0);
    }
}
