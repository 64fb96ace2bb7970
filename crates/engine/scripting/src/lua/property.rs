//! `Property` userdata and the config table

use std::cell::RefCell;
use std::rc::Rc;

use mlua::prelude::*;
use mlua::{MetaMethod, UserData, UserDataMethods};

use super::{engine_of, runtime_error};
use crate::facade::EngineFacade;
use crate::lua_engine::{lua_value_to_value, value_to_lua_value};
use crate::property::{Property, PropertyKind};
use crate::Value;

pub(crate) struct LuaProperty(pub(crate) Property);

fn kind_tag(kind: PropertyKind) -> i32 {
    match kind {
        PropertyKind::Null => 0,
        PropertyKind::Bool => 1,
        PropertyKind::Number => 2,
        PropertyKind::String => 3,
    }
}

/// Script value for a property argument: either a `Property` or a plain value
fn property_value(value: &LuaValue) -> LuaResult<Value> {
    match value {
        LuaValue::UserData(ud) => Ok(ud.borrow::<LuaProperty>()?.0.value()),
        other => lua_value_to_value(other),
    }
}

impl UserData for LuaProperty {
    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        methods.add_meta_method(MetaMethod::ToString, |_, this, ()| Ok(this.0.to_string()));

        methods.add_method("isNull", |_, this, ()| Ok(this.0.is_null()));
        methods.add_method("getName", |_, this, ()| Ok(this.0.name()));
        methods.add_method("getType", |_, this, ()| Ok(kind_tag(this.0.kind())));
        methods.add_method("toBool", |_, this, ()| Ok(this.0.to_bool()));
        methods.add_method("toNumber", |_, this, ()| Ok(this.0.to_number()));
        methods.add_method("toString", |_, this, ()| Ok(this.0.to_string()));
        methods.add_method("getValue", |lua, this, ()| value_to_lua_value(lua, &this.0.value()));
        methods.add_method("fromBool", |_, this, v: bool| {
            this.0.from_bool(v);
            Ok(())
        });
        methods.add_method("fromNumber", |_, this, v: f32| {
            this.0.from_number(v);
            Ok(())
        });
        methods.add_method("fromString", |_, this, v: String| {
            this.0.from_string(&v);
            Ok(())
        });
        methods.add_method("set", |_, this, v: LuaValue| {
            this.0.from_value(&property_value(&v)?);
            Ok(())
        });
        methods.add_method("isDebug", |_, this, ()| Ok(this.0.is_debug()));
        methods.add_method("makeDebug", |lua, this, enable: Option<bool>| {
            this.0.make_debug(&engine_of(lua)?, enable.unwrap_or(true));
            Ok(())
        });
    }
}

/// The facade's config table, indexed by setting name
pub(crate) struct LuaUserDefs(pub(crate) Rc<RefCell<EngineFacade>>);

impl UserData for LuaUserDefs {
    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        methods.add_method("has", |_, this, name: String| {
            Ok(this.0.borrow_mut().user_defs().has(&name))
        });
        methods.add_method("addProperty", |_, this, property: LuaValue| {
            let LuaValue::UserData(ud) = &property else {
                return Err(runtime_error("addProperty expects a Property"));
            };
            let property = ud.borrow::<LuaProperty>()?;
            Ok(this.0.borrow_mut().user_defs().add(property.0.clone()))
        });
        methods.add_method("getNames", |_, this, ()| Ok(this.0.borrow_mut().user_defs().names()));

        methods.add_meta_method(MetaMethod::Index, |_, this, name: String| {
            let mut facade = this.0.borrow_mut();
            let defs = facade.user_defs();
            Ok(defs.has(&name).then(|| LuaProperty(defs.get(&name))))
        });
        methods.add_meta_method(MetaMethod::NewIndex, |_, this, (name, value): (String, LuaValue)| {
            let value = property_value(&value)?;
            this.0.borrow_mut().user_defs().set(&name, &value);
            Ok(())
        });
        methods.add_meta_method(MetaMethod::Len, |_, this, ()| {
            Ok(this.0.borrow_mut().user_defs().len())
        });
    }
}

pub(super) fn register(lua: &Lua) -> LuaResult<()> {
    let globals = lua.globals();
    globals.set("PROP_NULL", kind_tag(PropertyKind::Null))?;
    globals.set("PROP_BOOL", kind_tag(PropertyKind::Bool))?;
    globals.set("PROP_NUMBER", kind_tag(PropertyKind::Number))?;
    globals.set("PROP_STRING", kind_tag(PropertyKind::String))?;

    let constructor = lua.create_function(|_, (name, value): (Option<String>, LuaValue)| {
        let Some(name) = name else {
            return Ok(LuaProperty(Property::null()));
        };
        let value = lua_value_to_value(&value)?
            .to_var_value()
            .ok_or_else(|| runtime_error("Property values are booleans, numbers or strings"))?;
        Ok(LuaProperty(Property::new(name, value)))
    })?;
    globals.set("Property", constructor)?;
    Ok(())
}
