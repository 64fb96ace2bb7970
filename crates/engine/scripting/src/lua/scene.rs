//! Scene userdata

use mlua::prelude::*;
use mlua::{MetaMethod, UserData, UserDataMethods};

use super::object::{object_arg, LuaObject};
use super::resources::{LuaDebugger, LuaDynamicsWorld};
use super::kind_tag;
use crate::lua_engine::vec3_table;
use crate::proxy::SceneProxy;

pub(crate) struct LuaScene(pub(crate) SceneProxy);

impl UserData for LuaScene {
    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        methods.add_meta_method(MetaMethod::ToString, |_, this, ()| Ok(this.0.name()));

        methods.add_method("isNull", |_, this, ()| Ok(this.0.is_null()));
        methods.add_method("getName", |_, this, ()| Ok(this.0.name()));
        methods.add_method("getType", |_, this, ()| Ok(kind_tag(this.0.as_object().kind())));
        methods.add_method("isInstanced", |_, this, ()| Ok(this.0.is_instanced()));
        methods.add_method("createInstance", |_, this, ()| {
            this.0.create_instance();
            Ok(())
        });
        methods.add_method("destroyInstance", |_, this, ()| {
            this.0.destroy_instance();
            Ok(())
        });
        methods.add_method("reinstance", |_, this, ()| {
            this.0.reinstance();
            Ok(())
        });
        methods.add_method("getLayer", |_, this, ()| Ok(this.0.layer()));
        methods.add_method("setLayer", |_, this, layer: u32| {
            this.0.set_layer(layer);
            Ok(())
        });

        methods.add_method("hasObject", |_, this, name: String| Ok(this.0.has_object(&name)));
        methods.add_method("getObject", |_, this, name: String| {
            Ok(this.0.object(&name).map(LuaObject))
        });
        methods.add_method("createEmpty", |_, this, name: String| {
            Ok(this.0.create_empty(&name).map(LuaObject))
        });
        methods.add_method("createEntity", |_, this, name: String| {
            Ok(this.0.create_entity(&name).map(LuaObject))
        });
        methods.add_method(
            "cloneObject",
            |_, this, (source, life_span, instantiate): (LuaValue, Option<u32>, Option<bool>)| {
                let source = object_arg(&source)?;
                Ok(this
                    .0
                    .clone_object(&source, life_span.unwrap_or(0), instantiate.unwrap_or(true))
                    .map(LuaObject))
            },
        );
        methods.add_method("getObjectList", |lua, this, ()| {
            lua.create_sequence_from(this.0.object_list().into_iter().map(LuaObject))
        });
        methods.add_method("getMainCamera", |_, this, ()| {
            Ok(this.0.main_camera().map(LuaObject))
        });
        methods.add_method("pickRay", |lua, this, (x, y): (f32, f32)| {
            let Some(ray) = this.0.pick_ray(x, y) else {
                return Ok(None);
            };
            let table = lua.create_table()?;
            table.set("origin", vec3_table(lua, ray.origin)?)?;
            table.set("direction", vec3_table(lua, ray.direction)?)?;
            Ok(Some(table))
        });
        methods.add_method("getDynamicsWorld", |_, this, ()| {
            Ok(LuaDynamicsWorld(this.0.dynamics_world()))
        });
        methods.add_method("getDebugger", |_, this, ()| Ok(LuaDebugger(this.0.debugger())));
        methods.add_method("getUpdateFlags", |_, this, ()| Ok(this.0.update_flags()));
        methods.add_method("setUpdateFlags", |_, this, flags: u32| {
            this.0.set_update_flags(flags);
            Ok(())
        });
    }
}
