//! Lua scripting engine
//!
//! Provides a Lua VM wrapper with:
//! - Built-in math helpers (`vec3`, `quat_euler`, `quat_identity`)
//! - The engine API, installed with [`LuaEngine::install_api`]
//! - Script execution from strings, files and the engine's script registry

use std::path::Path;

use glam::{Quat, Vec3};
use lumen_world::transform::quat_from_euler_degrees;
use lumen_world::EngineRef;
use mlua::prelude::*;
use tracing::debug;

use crate::{Error, Result, Value};

/// Lua scripting engine
pub struct LuaEngine {
    lua: Lua,
    engine: Option<EngineRef>,
}

impl LuaEngine {
    /// Create a new Lua engine with the math helpers registered
    pub fn new() -> Result<Self> {
        let lua = Lua::new();

        // Register vec3 constructor
        let vec3_fn = lua.create_function(|_, (x, y, z): (LuaValue, LuaValue, LuaValue)| {
            let x = lua_value_to_f64(&x)?;
            let y = lua_value_to_f64(&y)?;
            let z = lua_value_to_f64(&z)?;
            Ok(vec![x, y, z])
        })?;
        lua.globals().set("vec3", vec3_fn)?;

        // Register quat_euler constructor (from euler angles in degrees)
        let quat_euler_fn =
            lua.create_function(|_, (x, y, z): (LuaValue, LuaValue, LuaValue)| {
                let x = lua_value_to_f64(&x)? as f32;
                let y = lua_value_to_f64(&y)? as f32;
                let z = lua_value_to_f64(&z)? as f32;
                let q = quat_from_euler_degrees(Vec3::new(x, y, z));
                Ok(vec![q.x as f64, q.y as f64, q.z as f64, q.w as f64])
            })?;
        lua.globals().set("quat_euler", quat_euler_fn)?;

        // Register quat_identity
        let quat_identity_fn = lua.create_function(|_, ()| Ok(vec![0.0f64, 0.0, 0.0, 1.0]))?;
        lua.globals().set("quat_identity", quat_identity_fn)?;

        Ok(Self { lua, engine: None })
    }

    /// Register the engine API (constructors, free functions, constants)
    pub fn install_api(&mut self, engine: EngineRef) -> Result<()> {
        crate::lua::register(&self.lua, engine.clone())?;
        self.engine = Some(engine);
        Ok(())
    }

    /// Get the underlying Lua state
    pub fn lua(&self) -> &Lua {
        &self.lua
    }

    /// Load and execute a Lua file
    pub fn exec_file(&self, path: &Path) -> Result<()> {
        let content = std::fs::read_to_string(path)
            .map_err(|_| Error::ScriptNotFound(path.display().to_string()))?;
        self.lua.load(content.as_str()).set_name(path.display().to_string()).exec()?;
        Ok(())
    }

    /// Execute a Lua string
    pub fn exec_string(&self, code: &str) -> Result<()> {
        self.lua.load(code).exec()?;
        Ok(())
    }

    /// Execute a script from the engine's script registry
    pub fn exec_named(&self, name: &str) -> Result<()> {
        let source = self
            .engine
            .as_ref()
            .and_then(|engine| engine.borrow().scripts.get(name).cloned())
            .ok_or_else(|| Error::ScriptNotFound(name.to_string()))?;
        debug!("Running script {}", name);
        self.lua.load(source.as_str()).set_name(name).exec()?;
        Ok(())
    }

    /// Call a Lua function by name
    pub fn call_function<A, R>(&self, name: &str, args: A) -> Result<R>
    where
        A: IntoLuaMulti,
        R: FromLuaMulti,
    {
        let func: LuaFunction = self.lua.globals().get(name)?;
        let result = func.call(args)?;
        Ok(result)
    }

    /// Get a global value from Lua
    pub fn get_global<T: FromLua>(&self, name: &str) -> Result<T> {
        let value = self.lua.globals().get(name)?;
        Ok(value)
    }

    /// Set a global value in Lua
    pub fn set_global<T: IntoLua>(&self, name: &str, value: T) -> Result<()> {
        self.lua.globals().set(name, value)?;
        Ok(())
    }
}

// Helper functions for Lua value conversion

/// Convert a Lua value to f64
pub(crate) fn lua_value_to_f64(val: &LuaValue) -> LuaResult<f64> {
    match val {
        LuaValue::Number(n) => Ok(*n),
        LuaValue::Integer(i) => Ok(*i as f64),
        _ => Err(LuaError::FromLuaConversionError {
            from: val.type_name(),
            to: "f64".to_string(),
            message: Some("expected number or integer".to_string()),
        }),
    }
}

/// Convert a Lua value to our Value type
pub(crate) fn lua_value_to_value(val: &LuaValue) -> LuaResult<Value> {
    match val {
        LuaValue::Nil => Ok(Value::Null),
        LuaValue::Boolean(b) => Ok(Value::Bool(*b)),
        LuaValue::Integer(i) => Ok(Value::Int(*i)),
        LuaValue::Number(n) => Ok(Value::Float(*n)),
        LuaValue::String(s) => Ok(Value::String(s.to_str()?.to_string())),
        LuaValue::Table(t) => {
            // Sequences only; keyed tables have no Value counterpart
            let len = t.raw_len();
            let mut arr = Vec::with_capacity(len);
            for i in 1..=len {
                let v: LuaValue = t.raw_get(i)?;
                arr.push(lua_value_to_value(&v)?);
            }
            Ok(Value::Array(arr))
        }
        _ => Err(LuaError::FromLuaConversionError {
            from: val.type_name(),
            to: "Value".to_string(),
            message: Some("unsupported Lua type".to_string()),
        }),
    }
}

/// Convert our Value type to a Lua value
pub(crate) fn value_to_lua_value(lua: &Lua, val: &Value) -> LuaResult<LuaValue> {
    match val {
        Value::Null => Ok(LuaValue::Nil),
        Value::Bool(b) => Ok(LuaValue::Boolean(*b)),
        Value::Int(i) => Ok(LuaValue::Integer(*i)),
        Value::Float(f) => Ok(LuaValue::Number(*f)),
        Value::String(s) => Ok(LuaValue::String(lua.create_string(s)?)),
        Value::Vec3(v) => Ok(LuaValue::Table(vec3_table(lua, *v)?)),
        Value::Array(items) => {
            let table = lua.create_table_with_capacity(items.len(), 0)?;
            for item in items {
                table.raw_push(value_to_lua_value(lua, item)?)?;
            }
            Ok(LuaValue::Table(table))
        }
    }
}

/// Extract f32 from a Lua table at given index (1-indexed)
pub fn extract_f32(table: &LuaTable, index: i32) -> LuaResult<f32> {
    let val: LuaValue = table.get(index)?;
    match val {
        LuaValue::Number(n) => Ok(n as f32),
        LuaValue::Integer(i) => Ok(i as f32),
        _ => Err(LuaError::FromLuaConversionError {
            from: val.type_name(),
            to: "f32".to_string(),
            message: Some(format!("expected number at index {}", index)),
        }),
    }
}

/// Parse a Lua table as Vec3 (expects 3 elements)
pub fn parse_vec3(table: &LuaTable) -> LuaResult<Vec3> {
    let x = extract_f32(table, 1)?;
    let y = extract_f32(table, 2)?;
    let z = extract_f32(table, 3)?;
    Ok(Vec3::new(x, y, z))
}

/// Parse a Lua table as Quat (expects 4 elements)
pub fn parse_quat(table: &LuaTable) -> LuaResult<Quat> {
    let x = extract_f32(table, 1)?;
    let y = extract_f32(table, 2)?;
    let z = extract_f32(table, 3)?;
    let w = extract_f32(table, 4)?;
    Ok(Quat::from_xyzw(x, y, z, w))
}

/// Build a `{x, y, z}` sequence
pub fn vec3_table(lua: &Lua, v: Vec3) -> LuaResult<LuaTable> {
    lua.create_sequence_from([v.x, v.y, v.z])
}

/// Build a `{x, y, z, w}` sequence
pub fn quat_table(lua: &Lua, q: Quat) -> LuaResult<LuaTable> {
    lua.create_sequence_from([q.x, q.y, q.z, q.w])
}
