//! Lua bindings for the script API
//!
//! Proxies are userdata and keep the usual camelCase method names. Vectors
//! cross the boundary as `{x, y, z}` sequences, orientations as
//! `{x, y, z, w}`. Narrowing methods (`asEntity`, `asCamera`, ...) return
//! `nil` when the object is of another kind.
//!
//! `Engine()` returns a facade attached to the host's engine, so calling
//! `initialize()` from a script has no effect.

mod device;
mod facade;
mod object;
mod property;
mod resources;
mod scene;

use std::fmt::Display;

use glam::Vec3;
use lumen_world::{EngineRef, TransformSpace};
use mlua::prelude::*;

use crate::lua_engine::parse_vec3;
use crate::proxy::ProxyKind;

/// Install every constructor, free function and constant
pub(crate) fn register(lua: &Lua, engine: EngineRef) -> LuaResult<()> {
    lua.set_app_data(engine.clone());
    register_constants(lua)?;
    facade::register(lua, &engine)?;
    device::register(lua, &engine)?;
    property::register(lua)?;
    resources::register(lua)?;
    Ok(())
}

const KINDS: [(&str, ProxyKind); 8] = [
    ("OB_SCENE", ProxyKind::Scene),
    ("OB_EMPTY", ProxyKind::Empty),
    ("OB_ENTITY", ProxyKind::Entity),
    ("OB_CAMERA", ProxyKind::Camera),
    ("OB_LIGHT", ProxyKind::Light),
    ("OB_CURVE", ProxyKind::Curve),
    ("OB_SKELETON", ProxyKind::Skeleton),
    ("OB_PARTICLES", ProxyKind::Particles),
];

fn register_constants(lua: &Lua) -> LuaResult<()> {
    let globals = lua.globals();
    globals.set("EVT_TICK", 0)?;
    globals.set("TS_LOCAL", 0)?;
    globals.set("TS_PARENT", 1)?;
    globals.set("TS_WORLD", 2)?;
    globals.set("ST_VERTEX", 0)?;
    globals.set("ST_FRAGMENT", 1)?;
    globals.set("OB_NULL", 0)?;
    for (name, kind) in KINDS {
        globals.set(name, kind_tag(Some(kind)))?;
    }
    Ok(())
}

/// Script-visible kind number; 0 for a dead target
pub(crate) fn kind_tag(kind: Option<ProxyKind>) -> i32 {
    kind.and_then(|kind| KINDS.iter().position(|(_, k)| *k == kind))
        .map_or(0, |index| index as i32 + 1)
}

/// The engine the API was installed for
pub(crate) fn engine_of(lua: &Lua) -> LuaResult<EngineRef> {
    lua.app_data_ref::<EngineRef>()
        .map(|engine| engine.clone())
        .ok_or_else(|| runtime_error("engine API not installed"))
}

pub(crate) fn vec3_arg(table: &LuaTable) -> LuaResult<Vec3> {
    parse_vec3(table)
}

/// Transform space from an optional script id, parent space by default
pub(crate) fn space_arg(space: Option<i32>) -> TransformSpace {
    space.and_then(TransformSpace::from_index).unwrap_or_default()
}

pub(crate) fn runtime_error(e: impl Display) -> LuaError {
    LuaError::RuntimeError(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tags_are_distinct() {
        assert_eq!(kind_tag(None), 0);
        assert_eq!(kind_tag(Some(ProxyKind::Scene)), 1);
        assert_eq!(kind_tag(Some(ProxyKind::Particles)), 8);
    }

    #[test]
    fn test_space_defaults_to_parent() {
        assert_eq!(space_arg(None), TransformSpace::Parent);
        assert_eq!(space_arg(Some(2)), TransformSpace::World);
        assert_eq!(space_arg(Some(7)), TransformSpace::Parent);
    }
}
