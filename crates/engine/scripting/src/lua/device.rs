//! `Mouse()`, `Keyboard()` and `Joystick(i)` userdata

use devices::Key;
use lumen_world::EngineRef;
use mlua::prelude::*;
use mlua::{UserData, UserDataFields, UserDataMethods};

use super::runtime_error;
use crate::input::{joystick_count, Joystick, Keyboard, Mouse};
use crate::lua_engine::vec3_table;

struct LuaMouse(Mouse);

impl UserData for LuaMouse {
    fn add_fields<F: UserDataFields<Self>>(fields: &mut F) {
        fields.add_field_method_get("xpos", |_, this| Ok(this.0.state.x));
        fields.add_field_method_get("ypos", |_, this| Ok(this.0.state.y));
        fields.add_field_method_get("xrel", |_, this| Ok(this.0.state.rel_x));
        fields.add_field_method_get("yrel", |_, this| Ok(this.0.state.rel_y));
        fields.add_field_method_get("winx", |_, this| Ok(this.0.state.win_width));
        fields.add_field_method_get("winy", |_, this| Ok(this.0.state.win_height));
        fields.add_field_method_get("wheel", |_, this| Ok(this.0.state.wheel));
        fields.add_field_method_get("moved", |_, this| Ok(this.0.state.moved));
    }

    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        methods.add_method_mut("capture", |_, this, ()| {
            this.0.capture();
            Ok(())
        });
        methods.add_method("isButtonDown", |_, this, button: i32| {
            Ok(this.0.is_button_down(button))
        });
    }
}

struct LuaKeyboard(Keyboard);

impl UserData for LuaKeyboard {
    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        methods.add_method("isKeyDown", |_, this, code: i32| Ok(this.0.is_key_down(code)));
        methods.add_method("isKeyUp", |_, this, code: i32| Ok(this.0.is_key_up(code)));
        methods.add_method("clearKey", |_, this, code: i32| {
            this.0.clear_key(code);
            Ok(())
        });
    }
}

struct LuaJoystick(Joystick);

impl UserData for LuaJoystick {
    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        methods.add_method_mut("capture", |_, this, ()| {
            this.0.capture();
            Ok(())
        });
        methods.add_method("getIndex", |_, this, ()| Ok(this.0.index()));
        methods.add_method("getNumAxes", |_, this, ()| Ok(this.0.num_axes()));
        methods.add_method("getAxis", |_, this, i: usize| Ok(this.0.axis(i)));
        methods.add_method("getRelAxis", |_, this, i: usize| Ok(this.0.rel_axis(i)));
        methods.add_method("getNumButtons", |_, this, ()| Ok(this.0.num_buttons()));
        methods.add_method("getButtonCount", |_, this, ()| Ok(this.0.button_count()));
        methods.add_method("isButtonDown", |_, this, i: usize| Ok(this.0.is_button_down(i)));
        methods.add_method("wasButtonPressed", |_, this, i: usize| {
            Ok(this.0.was_button_pressed(i))
        });
        methods.add_method("getAccel", |lua, this, ()| vec3_table(lua, this.0.accel()));
        methods.add_method("getWinWidth", |_, this, ()| Ok(this.0.win_width()));
        methods.add_method("getWinHeight", |_, this, ()| Ok(this.0.win_height()));
    }
}

/// `ShiftLeft` -> `KC_SHIFT_LEFT`
fn key_constant(key: Key) -> String {
    let mut name = String::from("KC_");
    for (i, c) in format!("{:?}", key).chars().enumerate() {
        if c.is_ascii_uppercase() && i > 0 {
            name.push('_');
        }
        name.push(c.to_ascii_uppercase());
    }
    name
}

pub(super) fn register(lua: &Lua, engine: &EngineRef) -> LuaResult<()> {
    let globals = lua.globals();
    for key in Key::ALL {
        globals.set(key_constant(key), key.code())?;
    }

    let e = engine.clone();
    globals.set(
        "Mouse",
        lua.create_function(move |_, ()| {
            let mut mouse = Mouse::new(e.clone());
            mouse.capture();
            Ok(LuaMouse(mouse))
        })?,
    )?;

    let e = engine.clone();
    globals.set(
        "Keyboard",
        lua.create_function(move |_, ()| Ok(LuaKeyboard(Keyboard::new(e.clone()))))?,
    )?;

    let e = engine.clone();
    globals.set(
        "Joystick",
        lua.create_function(move |_, index: i32| {
            Joystick::new(e.clone(), index)
                .map(LuaJoystick)
                .map_err(runtime_error)
        })?,
    )?;

    let e = engine.clone();
    globals.set(
        "getJoystickCount",
        lua.create_function(move |_, ()| Ok(joystick_count(&e)))?,
    )?;
    Ok(())
}
