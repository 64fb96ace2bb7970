//! Input device state for Lumen
//!
//! This crate holds the *live* state of the window/input subsystem. Script
//! facing snapshots are built on top of it by the scripting crate.
//!
//! # Modules
//!
//! - [`mouse`]: Mouse position, buttons and cursor mode
//! - [`keyboard`]: Keyboard scan codes and key state
//! - [`joystick`]: Joystick axes, buttons and accelerometer
//! - [`backend`]: The [`InputSystem`] trait and the event-driven [`VirtualInput`]

pub mod backend;
pub mod joystick;
pub mod keyboard;
pub mod mouse;

pub use backend::{InputSystem, VirtualInput};
pub use joystick::JoystickState;
pub use keyboard::{Key, KeyboardState};
pub use mouse::{CursorMode, MouseButtonType, MouseButtons, MouseState};
