//! Script-facing device handles
//!
//! Snapshots (`Mouse::state`, `Joystick` state) are copied from the engine's
//! input system on `capture()`. Button and key queries read the live state.

use devices::{JoystickState, Key, MouseButtonType};
use glam::Vec3;
use lumen_world::EngineRef;

use crate::{Error, Result};

/// Mouse values copied in one go
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MouseSnapshot {
    pub x: f32,
    pub y: f32,
    pub rel_x: f32,
    pub rel_y: f32,
    pub win_width: f32,
    pub win_height: f32,
    pub wheel: f32,
    pub moved: bool,
}

pub struct Mouse {
    engine: EngineRef,
    pub state: MouseSnapshot,
}

impl Mouse {
    pub fn new(engine: EngineRef) -> Self {
        Self {
            engine,
            state: MouseSnapshot::default(),
        }
    }

    /// Refresh the snapshot. Leaves it untouched when there is no input system.
    pub fn capture(&mut self) {
        let engine = self.engine.borrow();
        let Some(input) = engine.input() else {
            return;
        };
        let mouse = input.mouse();
        self.state = MouseSnapshot {
            x: mouse.position.x,
            y: mouse.position.y,
            rel_x: mouse.relative.x,
            rel_y: mouse.relative.y,
            win_width: mouse.window_size.x,
            win_height: mouse.window_size.y,
            wheel: mouse.wheel_delta,
            moved: mouse.moved,
        };
    }

    /// Live button state; 0 left, 1 right, 2 middle
    pub fn is_button_down(&self, button: i32) -> bool {
        let Some(button) = MouseButtonType::from_index(button) else {
            return false;
        };
        self.engine
            .borrow()
            .input()
            .is_some_and(|input| input.is_mouse_button_down(button))
    }
}

pub struct Keyboard {
    engine: EngineRef,
}

impl Keyboard {
    pub fn new(engine: EngineRef) -> Self {
        Self { engine }
    }

    pub fn is_key_down(&self, scan_code: i32) -> bool {
        self.query(scan_code, |kb, key| kb.is_pressed(key))
    }

    /// Whether the key was released during this frame
    pub fn is_key_up(&self, scan_code: i32) -> bool {
        self.query(scan_code, |kb, key| kb.is_just_released(key))
    }

    pub fn clear_key(&self, scan_code: i32) {
        let Some(key) = Key::from_code(scan_code) else {
            return;
        };
        if let Some(input) = self.engine.borrow_mut().input_mut() {
            input.clear_key(key);
        }
    }

    fn query(&self, scan_code: i32, f: impl Fn(&devices::KeyboardState, Key) -> bool) -> bool {
        let Some(key) = Key::from_code(scan_code) else {
            return false;
        };
        self.engine
            .borrow()
            .input()
            .is_some_and(|input| f(input.keyboard(), key))
    }
}

/// Number of joysticks the engine's input system reports
pub fn joystick_count(engine: &EngineRef) -> usize {
    engine
        .borrow()
        .input()
        .map(|input| input.joystick_count())
        .unwrap_or(0)
}

pub struct Joystick {
    engine: EngineRef,
    index: usize,
    state: JoystickState,
}

impl Joystick {
    /// Bind to joystick `index`; fails when no such joystick is attached
    pub fn new(engine: EngineRef, index: i32) -> Result<Self> {
        let count = joystick_count(&engine);
        let valid = usize::try_from(index).ok().filter(|i| *i < count);
        let Some(index) = valid else {
            return Err(Error::JoystickIndex { index, count });
        };
        Ok(Self {
            engine,
            index,
            state: JoystickState::default(),
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Refresh the snapshot if the joystick is still attached
    pub fn capture(&mut self) {
        let engine = self.engine.borrow();
        if let Some(state) = engine.input().and_then(|input| input.joystick(self.index)) {
            self.state = state.clone();
        }
    }

    pub fn num_axes(&self) -> usize {
        self.state.axis_count()
    }

    pub fn axis(&self, index: usize) -> i32 {
        self.state.axis(index)
    }

    pub fn rel_axis(&self, index: usize) -> i32 {
        self.state.rel_axis(index)
    }

    pub fn num_buttons(&self) -> usize {
        self.state.button_count()
    }

    /// Number of buttons held in the snapshot
    pub fn button_count(&self) -> usize {
        self.state.pressed_button_count()
    }

    pub fn is_button_down(&self, index: usize) -> bool {
        self.state.is_button_down(index)
    }

    pub fn was_button_pressed(&self, index: usize) -> bool {
        self.state.was_button_pressed(index)
    }

    pub fn accel(&self) -> Vec3 {
        self.state.accel
    }

    pub fn win_width(&self) -> f32 {
        self.engine.borrow().window_size().x
    }

    pub fn win_height(&self) -> f32 {
        self.engine.borrow().window_size().y
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devices::{JoystickState, VirtualInput};
    use lumen_world::Engine;

    fn engine_with_input(input: VirtualInput) -> EngineRef {
        let engine = Engine::new_ref();
        engine.borrow_mut().set_input(Box::new(input));
        engine
    }

    #[test]
    fn test_mouse_capture_copies_everything() {
        let mut input = VirtualInput::with_window_size(640.0, 480.0);
        input.move_mouse(10.0, 20.0);
        input.scroll(1.5);
        input.set_mouse_button(MouseButtonType::Right, true);
        let engine = engine_with_input(input);

        let mut mouse = Mouse::new(engine);
        assert_eq!(mouse.state, MouseSnapshot::default());
        mouse.capture();
        assert_eq!(mouse.state.x, 10.0);
        assert_eq!(mouse.state.rel_y, 20.0);
        assert_eq!(mouse.state.win_width, 640.0);
        assert_eq!(mouse.state.wheel, 1.5);
        assert!(mouse.state.moved);
        assert!(mouse.is_button_down(1));
        assert!(!mouse.is_button_down(0));
        assert!(!mouse.is_button_down(7));
    }

    #[test]
    fn test_no_input_system_is_quiet() {
        let engine = Engine::new_ref();
        let mut mouse = Mouse::new(engine.clone());
        mouse.capture();
        assert_eq!(mouse.state, MouseSnapshot::default());

        let keyboard = Keyboard::new(engine.clone());
        assert!(!keyboard.is_key_down(Key::A.code()));
        keyboard.clear_key(Key::A.code());
        assert_eq!(joystick_count(&engine), 0);
    }

    #[test]
    fn test_keyboard_live_queries() {
        let mut input = VirtualInput::new();
        input.press_key(Key::Space);
        input.press_key(Key::W);
        input.release_key(Key::W);
        let engine = engine_with_input(input);

        let keyboard = Keyboard::new(engine);
        assert!(keyboard.is_key_down(Key::Space.code()));
        assert!(keyboard.is_key_up(Key::W.code()));
        assert!(!keyboard.is_key_down(-4));

        keyboard.clear_key(Key::Space.code());
        assert!(!keyboard.is_key_down(Key::Space.code()));
    }

    #[test]
    fn test_joystick_index_checked() {
        let mut input = VirtualInput::new();
        input.add_joystick(JoystickState::new(4, 2));
        let engine = engine_with_input(input);

        assert!(Joystick::new(engine.clone(), 0).is_ok());
        assert!(matches!(
            Joystick::new(engine.clone(), 1),
            Err(Error::JoystickIndex { index: 1, count: 1 })
        ));
        assert!(Joystick::new(engine, -1).is_err());
    }

    #[test]
    fn test_joystick_snapshot_defaults_and_capture() {
        let mut input = VirtualInput::new();
        let index = input.add_joystick(JoystickState::new(4, 2));
        {
            let js = input.joystick_mut(index).unwrap();
            js.set_axis(1, 300);
            js.set_button(2, true);
            js.accel = Vec3::new(0.0, 0.0, 1.0);
        }
        let engine = engine_with_input(input);

        let mut joystick = Joystick::new(engine, 0).unwrap();
        assert_eq!(joystick.num_buttons(), 1);
        assert_eq!(joystick.num_axes(), 3);
        assert_eq!(joystick.button_count(), 0);

        joystick.capture();
        assert_eq!(joystick.num_buttons(), 4);
        assert_eq!(joystick.axis(1), 300);
        assert_eq!(joystick.rel_axis(1), 300);
        assert!(joystick.is_button_down(2));
        assert!(joystick.was_button_pressed(2));
        assert_eq!(joystick.button_count(), 1);
        assert_eq!(joystick.accel(), Vec3::Z);
        assert_eq!(joystick.win_width(), 0.0);
    }
}
