//! `Engine()` userdata, tick callbacks and the free API functions

use std::cell::RefCell;
use std::rc::Rc;

use lumen_world::material::{ShaderStage, ShaderValue};
use lumen_world::EngineRef;
use mlua::prelude::*;
use mlua::{UserData, UserDataMethods};
use tracing::{debug, error};

use super::property::LuaUserDefs;
use super::resources::{LuaGroupInstance, LuaHud};
use super::scene::LuaScene;
use super::{runtime_error, vec3_arg};
use crate::api;
use crate::facade::{run_loop, EngineFacade, Event, TickCallback};
use crate::lua_engine::lua_value_to_f64;
use crate::proxy::SceneProxy;

/// Tick callback calling into Lua, optionally as a method on `receiver`
struct LuaTick {
    func: LuaFunction,
    receiver: Option<LuaValue>,
}

impl TickCallback for LuaTick {
    fn call(&mut self, delta: f32) -> bool {
        let result = match &self.receiver {
            Some(receiver) => self.func.call::<LuaValue>((receiver.clone(), delta)),
            None => self.func.call::<LuaValue>(delta),
        };
        match result {
            Ok(LuaValue::Boolean(false)) => false,
            Ok(_) => true,
            Err(e) => {
                error!("Tick callback failed, disconnecting: {}", e);
                false
            }
        }
    }
}

struct LuaFacade(Rc<RefCell<EngineFacade>>);

impl LuaFacade {
    fn engine(&self) -> EngineRef {
        self.0.borrow().engine()
    }

    /// A scene given as userdata or by name
    fn scene_arg(&self, value: &LuaValue) -> LuaResult<Option<SceneProxy>> {
        match value {
            LuaValue::String(name) => Ok(self.0.borrow().scene(&name.to_str()?)),
            LuaValue::UserData(ud) => Ok(Some(ud.borrow::<LuaScene>()?.0.clone())),
            LuaValue::Nil => Ok(None),
            other => Err(runtime_error(format!(
                "expected a scene or scene name, got {}",
                other.type_name()
            ))),
        }
    }
}

impl UserData for LuaFacade {
    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        // Attached facade: always a no-op, the host initializes the engine
        methods.add_method("initialize", |_, this, ()| {
            this.0.borrow().initialize();
            Ok(())
        });
        methods.add_method("isInitialized", |_, this, ()| Ok(this.0.borrow().is_initialized()));
        methods.add_method("isRunning", |_, this, ()| Ok(this.engine().borrow().is_running()));
        // The facade is not borrowed while the loop runs, so callbacks may use it
        methods.add_method("run", |_, this, ()| {
            let engine = this.engine();
            if !engine.borrow().is_running() {
                run_loop(&engine);
            }
            Ok(())
        });
        methods.add_method("step", |_, this, delta: f32| {
            lumen_world::step(&this.engine(), delta);
            Ok(())
        });
        methods.add_method("requestExit", |_, this, ()| {
            this.0.borrow().request_exit();
            Ok(())
        });
        methods.add_method(
            "connect",
            |_, this, (event, target, method): (i32, LuaValue, Option<LuaFunction>)| {
                let event = Event::from_index(event)
                    .ok_or_else(|| runtime_error(format!("unknown event {}", event)))?;
                let callback = match (target, method) {
                    (receiver, Some(func)) => LuaTick {
                        func,
                        receiver: Some(receiver),
                    },
                    (LuaValue::Function(func), None) => LuaTick {
                        func,
                        receiver: None,
                    },
                    (other, None) => {
                        return Err(runtime_error(format!(
                            "connect expects a function, got {}",
                            other.type_name()
                        )))
                    }
                };
                this.0.borrow().connect(event, callback);
                Ok(())
            },
        );
        methods.add_method("getUserDefs", |_, this, ()| Ok(LuaUserDefs(this.0.clone())));

        methods.add_method("loadBlendFile", |_, this, path: String| {
            Ok(this.0.borrow().load_blend_file(&path).map(LuaScene))
        });
        methods.add_method("unloadBlendFile", |_, this, name: String| {
            this.0.borrow().unload_blend_file(&name);
            Ok(())
        });
        methods.add_method("unloadAllBlendFiles", |_, this, ()| {
            this.0.borrow().unload_all_blend_files();
            Ok(())
        });
        methods.add_method("getActiveScene", |_, this, ()| {
            Ok(this.0.borrow().active_scene().map(LuaScene))
        });
        methods.add_method("getScene", |_, this, name: String| {
            Ok(this.0.borrow().scene(&name).map(LuaScene))
        });
        methods.add_method("addOverlayScene", |_, this, scene: LuaValue| {
            let Some(scene) = this.scene_arg(&scene)? else {
                return Ok(None);
            };
            Ok(this.0.borrow().add_overlay_scene(&scene).map(LuaScene))
        });
        methods.add_method("addBackgroundScene", |_, this, scene: LuaValue| {
            let Some(scene) = this.scene_arg(&scene)? else {
                return Ok(None);
            };
            Ok(this.0.borrow().add_background_scene(&scene).map(LuaScene))
        });
        methods.add_method("removeScene", |_, this, scene: LuaValue| {
            if let Some(scene) = this.scene_arg(&scene)? {
                this.0.borrow().remove_scene(&scene);
            }
            Ok(())
        });
    }
}

fn shader_value(value: &LuaValue) -> LuaResult<ShaderValue> {
    if let LuaValue::Table(t) = value {
        let numbers = (1..=t.raw_len())
            .map(|i| t.raw_get::<LuaValue>(i).and_then(|v| lua_value_to_f64(&v)))
            .map(|n| n.map(|n| n as f32))
            .collect::<LuaResult<Vec<f32>>>()?;
        return match numbers.as_slice() {
            [x] => Ok(ShaderValue::Float(*x)),
            [x, y] => Ok(ShaderValue::Vec2([*x, *y])),
            [x, y, z] => Ok(ShaderValue::Vec3([*x, *y, *z])),
            [x, y, z, w] => Ok(ShaderValue::Vec4([*x, *y, *z, *w])),
            _ => Err(runtime_error("shader values have 1 to 4 components")),
        };
    }
    Ok(ShaderValue::Float(lua_value_to_f64(value)? as f32))
}

/// Install `Engine()` and the free functions
///
/// `Engine()` hands scripts a facade attached to the host's engine. It never
/// owns it: `initialize()` from a script does nothing and the host stays in
/// charge of initialization and shutdown.
pub(super) fn register(lua: &Lua, engine: &EngineRef) -> LuaResult<()> {
    let globals = lua.globals();
    let facade = Rc::new(RefCell::new(EngineFacade::attach(engine.clone())));

    globals.set(
        "Engine",
        lua.create_function(move |_, ()| Ok(LuaFacade(facade.clone())))?,
    )?;

    let e = engine.clone();
    globals.set(
        "getActiveScene",
        lua.create_function(move |_, ()| Ok(api::active_scene(&e).map(LuaScene)))?,
    )?;

    let e = engine.clone();
    globals.set(
        "getScene",
        lua.create_function(move |_, name: String| Ok(api::scene(&e, &name).map(LuaScene)))?,
    )?;

    let e = engine.clone();
    globals.set(
        "addScene",
        lua.create_function(move |_, (scene, z_order): (LuaValue, i32)| {
            let LuaValue::UserData(ud) = &scene else {
                return Ok(None);
            };
            let scene = ud.borrow::<LuaScene>()?;
            Ok(api::add_scene(&e, &scene.0, z_order).map(LuaScene))
        })?,
    )?;

    let e = engine.clone();
    globals.set(
        "getHUD",
        lua.create_function(move |_, name: String| Ok(LuaHud(api::hud(&e, &name))))?,
    )?;

    let e = engine.clone();
    globals.set(
        "createGroupInstance",
        lua.create_function(
            move |_,
                  (group, location, rotation, scale, scene): (
                String,
                LuaTable,
                Option<LuaTable>,
                Option<LuaTable>,
                Option<LuaValue>,
            )| {
                let scene = match &scene {
                    Some(LuaValue::UserData(ud)) => Some(ud.borrow::<LuaScene>()?.0.clone()),
                    _ => None,
                };
                let rotation = rotation.map_or(Ok(glam::Vec3::ZERO), |r| vec3_arg(&r))?;
                let scale = scale.map_or(Ok(glam::Vec3::ONE), |s| vec3_arg(&s))?;
                Ok(api::create_group_instance(
                    &e,
                    &group,
                    vec3_arg(&location)?,
                    rotation,
                    scale,
                    scene.as_ref(),
                )
                .map(LuaGroupInstance))
            },
        )?,
    )?;

    let e = engine.clone();
    globals.set(
        "setMaterialParam",
        lua.create_function(
            move |_, (material, stage, param, value): (String, i32, String, LuaValue)| {
                let stage = ShaderStage::from_index(stage)
                    .ok_or_else(|| runtime_error(format!("unknown shader stage {}", stage)))?;
                api::set_material_param(&e, &material, stage, &param, shader_value(&value)?);
                Ok(())
            },
        )?,
    )?;

    let e = engine.clone();
    globals.set(
        "isMaterialInitialized",
        lua.create_function(move |_, material: String| {
            Ok(api::is_material_initialized(&e, &material))
        })?,
    )?;

    let e = engine.clone();
    globals.set(
        "initMaterial",
        lua.create_function(move |_, material: String| {
            api::init_material(&e, &material);
            Ok(())
        })?,
    )?;

    let e = engine.clone();
    globals.set(
        "debugPrint",
        lua.create_function(move |_, message: String| {
            api::debug_print(&e, &message);
            Ok(())
        })?,
    )?;

    let e = engine.clone();
    globals.set(
        "sendMessage",
        lua.create_function(
            move |_, (from, to, subject, body): (String, String, String, String)| {
                api::send_message(&e, &from, &to, &subject, &body);
                Ok(())
            },
        )?,
    )?;

    let e = engine.clone();
    globals.set(
        "import",
        lua.create_function(move |lua, name: String| {
            let source = e.borrow().scripts.get(&name).cloned();
            match source {
                Some(source) => lua.load(source.as_str()).set_name(name).exec(),
                None => {
                    debug!("import: no script named {}", name);
                    Ok(())
                }
            }
        })?,
    )?;

    globals.set("getPlatform", lua.create_function(|_, ()| Ok(api::platform()))?)?;
    globals.set(
        "isSoundAvailable",
        lua.create_function(|_, ()| Ok(api::is_sound_available()))?,
    )?;
    Ok(())
}
