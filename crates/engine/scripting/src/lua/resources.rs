//! Userdata for meshes, HUDs, group instances and scene helpers

use glam::{Vec2, Vec3};
use lumen_world::mesh::Vertex;
use mlua::prelude::*;
use mlua::{UserData, UserDataMethods};

use super::object::{object_arg, LuaObject};
use super::{engine_of, runtime_error, vec3_arg};
use crate::api;
use crate::lua_engine::{extract_f32, vec3_table};
use crate::proxy::{
    DebuggerProxy, DynamicsWorldProxy, GroupInstanceProxy, HudElementProxy, HudProxy, MeshProxy,
    SubMeshProxy,
};

pub(crate) struct LuaMesh(pub(crate) MeshProxy);

impl UserData for LuaMesh {
    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        methods.add_method("getName", |_, this, ()| Ok(this.0.name()));
        methods.add_method("getSubMeshCount", |_, this, ()| Ok(this.0.sub_mesh_count()));
        methods.add_method("getSubMesh", |_, this, index: usize| {
            Ok(this.0.sub_mesh(index).map(LuaSubMesh))
        });
        methods.add_method("addSubMesh", |_, this, sub: LuaValue| {
            let LuaValue::UserData(ud) = &sub else {
                return Err(runtime_error("addSubMesh expects a SubMesh"));
            };
            Ok(this.0.add_sub_mesh(&ud.borrow::<LuaSubMesh>()?.0))
        });
    }
}

pub(crate) struct LuaSubMesh(pub(crate) SubMeshProxy);

impl UserData for LuaSubMesh {
    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        methods.add_method(
            "addTriangle",
            |lua,
             this,
             (p0, i0, p1, i1, p2, i2): (LuaTable, u32, LuaTable, u32, LuaTable, u32)| {
                let added = this.0.add_triangle(
                    Vertex::at(vec3_arg(&p0)?),
                    i0,
                    Vertex::at(vec3_arg(&p1)?),
                    i1,
                    Vertex::at(vec3_arg(&p2)?),
                    i2,
                );
                if !added {
                    api::debug_print(
                        &engine_of(lua)?,
                        &format!("Couldn't add triangle ({}, {}, {})", i0, i1, i2),
                    );
                }
                Ok(added)
            },
        );
        methods.add_method("setMaterialName", |_, this, name: String| {
            this.0.set_material_name(&name);
            Ok(())
        });
        methods.add_method("getMaterialName", |_, this, ()| Ok(this.0.material_name()));
        methods.add_method("getVertexCount", |_, this, ()| Ok(this.0.vertex_count()));
        methods.add_method("getTriangleCount", |_, this, ()| Ok(this.0.triangle_count()));
        methods.add_method("isAdopted", |_, this, ()| Ok(this.0.is_adopted()));
    }
}

pub(crate) struct LuaHud(pub(crate) HudProxy);

impl UserData for LuaHud {
    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        methods.add_method("getName", |_, this, ()| Ok(this.0.name().to_string()));
        methods.add_method("show", |_, this, visible: Option<bool>| {
            this.0.show(visible.unwrap_or(true));
            Ok(())
        });
        methods.add_method("hide", |_, this, ()| {
            this.0.show(false);
            Ok(())
        });
        methods.add_method("isVisible", |_, this, ()| Ok(this.0.is_visible()));
        methods.add_method("getChildCount", |_, this, ()| Ok(this.0.child_count()));
        methods.add_method("getChild", |_, this, name: String| {
            Ok(this.0.child(&name).map(LuaHudElement))
        });
        methods.add_method("addChild", |_, this, name: String| {
            Ok(this.0.add_child(&name).map(LuaHudElement))
        });
    }
}

pub(crate) struct LuaHudElement(pub(crate) HudElementProxy);

impl UserData for LuaHudElement {
    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        methods.add_method("getName", |_, this, ()| Ok(this.0.name().to_string()));
        methods.add_method("show", |_, this, visible: Option<bool>| {
            this.0.show(visible.unwrap_or(true));
            Ok(())
        });
        methods.add_method("hide", |_, this, ()| {
            this.0.show(false);
            Ok(())
        });
        methods.add_method("isVisible", |_, this, ()| Ok(this.0.is_visible()));
        methods.add_method("getValue", |_, this, ()| Ok(this.0.value()));
        methods.add_method("setValue", |_, this, value: LuaValue| {
            // Numbers are shown as text
            let text = match &value {
                LuaValue::String(s) => s.to_str()?.to_string(),
                LuaValue::Integer(i) => i.to_string(),
                LuaValue::Number(n) => n.to_string(),
                LuaValue::Boolean(b) => b.to_string(),
                other => return Err(runtime_error(format!("cannot show a {}", other.type_name()))),
            };
            this.0.set_value(&text);
            Ok(())
        });
        methods.add_method("getUvCoords", |lua, this, ()| lua.create_sequence_from(this.0.uv()));
        methods.add_method("setUvCoords", |_, this, uv: LuaTable| {
            let mut coords = [0.0; 4];
            for (i, c) in coords.iter_mut().enumerate() {
                *c = extract_f32(&uv, i as i32 + 1)?;
            }
            this.0.set_uv(coords);
            Ok(())
        });
        methods.add_method("getMaterialName", |_, this, ()| Ok(this.0.material_name()));
        methods.add_method("setMaterialName", |_, this, name: String| {
            this.0.set_material_name(&name);
            Ok(())
        });
        methods.add_method("getMaterialAlpha", |_, this, ()| Ok(this.0.material_alpha()));
        methods.add_method("setMaterialAlpha", |_, this, alpha: f32| {
            this.0.set_material_alpha(alpha);
            Ok(())
        });
        methods.add_method("getMaterialAlphaRejectValue", |_, this, ()| {
            Ok(this.0.material_alpha_reject())
        });
        methods.add_method(
            "setMaterialAlphaRejectValue",
            |_, this, (value, greater): (i32, Option<bool>)| {
                this.0.set_material_alpha_reject(value, greater.unwrap_or(true));
                Ok(())
            },
        );
        methods.add_method("getParameter", |_, this, name: String| Ok(this.0.parameter(&name)));
        methods.add_method("setParameter", |_, this, (name, value): (String, String)| {
            this.0.set_parameter(&name, &value);
            Ok(())
        });
        methods.add_method("getPosition", |lua, this, ()| {
            let p = this.0.position();
            lua.create_sequence_from([p.x, p.y])
        });
        methods.add_method("setPosition", |_, this, p: LuaTable| {
            this.0
                .set_position(Vec2::new(extract_f32(&p, 1)?, extract_f32(&p, 2)?));
            Ok(())
        });
    }
}

pub(crate) struct LuaGroupInstance(pub(crate) GroupInstanceProxy);

impl UserData for LuaGroupInstance {
    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        methods.add_method("isNull", |_, this, ()| Ok(this.0.is_null()));
        methods.add_method("getName", |_, this, ()| Ok(this.0.name()));
        methods.add_method("getGroupName", |_, this, ()| Ok(this.0.group_name()));
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
        methods.add_method("getRoot", |_, this, ()| Ok(this.0.root().map(LuaObject)));
        methods.add_method("getElementCount", |_, this, ()| Ok(this.0.element_count()));
        methods.add_method("getElementAt", |_, this, index: usize| {
            Ok(this.0.element_at(index).map(LuaObject))
        });
        methods.add_method("getElement", |_, this, name: String| {
            Ok(this.0.element(&name).map(LuaObject))
        });
    }
}

pub(crate) struct LuaDynamicsWorld(pub(crate) DynamicsWorldProxy);

impl UserData for LuaDynamicsWorld {
    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        methods.add_method("getGravity", |lua, this, ()| vec3_table(lua, this.0.gravity()));
        methods.add_method("setGravity", |_, this, g: LuaTable| {
            this.0.set_gravity(vec3_arg(&g)?);
            Ok(())
        });
    }
}

pub(crate) struct LuaDebugger(pub(crate) DebuggerProxy);

const WHITE: Vec3 = Vec3::ONE;

impl UserData for LuaDebugger {
    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        methods.add_method(
            "drawLine",
            |_, this, (from, to, color): (LuaTable, LuaTable, Option<LuaTable>)| {
                let color = color.map_or(Ok(WHITE), |c| vec3_arg(&c))?;
                this.0.draw_line(vec3_arg(&from)?, vec3_arg(&to)?, color);
                Ok(())
            },
        );
        methods.add_method("drawObjectAxis", |_, this, (object, size): (LuaValue, Option<f32>)| {
            this.0.draw_object_axis(&object_arg(&object)?, size.unwrap_or(1.0));
            Ok(())
        });
        methods.add_method("drawCurve", |_, this, (curve, color): (LuaValue, Option<LuaTable>)| {
            let color = color.map_or(Ok(WHITE), |c| vec3_arg(&c))?;
            if let Some(curve) = object_arg(&curve)?.as_curve() {
                this.0.draw_curve(&curve, color);
            }
            Ok(())
        });
        methods.add_method("getLineCount", |_, this, ()| Ok(this.0.line_count()));
        methods.add_method("clear", |_, this, ()| {
            this.0.clear();
            Ok(())
        });
    }
}

pub(super) fn register(lua: &Lua) -> LuaResult<()> {
    lua.globals().set(
        "SubMesh",
        lua.create_function(|_, ()| Ok(LuaSubMesh(SubMeshProxy::new())))?,
    )
}
