//! Game object userdata and its kind-specific variants

use glam::Vec3;
use mlua::prelude::*;
use mlua::{MetaMethod, UserData, UserDataMethods};

use super::property::LuaProperty;
use super::resources::{LuaGroupInstance, LuaMesh};
use super::scene::LuaScene;
use super::{kind_tag, runtime_error, space_arg, vec3_arg};
use crate::lua_engine::{lua_value_to_value, parse_quat, quat_table, vec3_table};
use crate::proxy::{
    CameraProxy, CharacterProxy, CurveProxy, EntityProxy, GameObjectProxy, LightProxy,
    ParticlesProxy, SkeletonProxy,
};

/// Userdata around a game object proxy or one of its narrowed kinds
pub(crate) struct LuaObject<P>(pub(crate) P);

impl<P: AsRef<GameObjectProxy>> LuaObject<P> {
    fn object(&self) -> &GameObjectProxy {
        self.0.as_ref()
    }
}

/// Accept any game object userdata as an argument
pub(crate) fn object_arg(value: &LuaValue) -> LuaResult<GameObjectProxy> {
    let LuaValue::UserData(ud) = value else {
        return Err(runtime_error(format!(
            "expected a game object, got {}",
            value.type_name()
        )));
    };
    macro_rules! try_kinds {
        ($($proxy:ty),*) => {
            $(
                if let Ok(object) = ud.borrow::<LuaObject<$proxy>>() {
                    return Ok(object.object().clone());
                }
            )*
        };
    }
    try_kinds!(
        GameObjectProxy,
        EntityProxy,
        CameraProxy,
        LightProxy,
        CurveProxy,
        SkeletonProxy,
        ParticlesProxy
    );
    Err(runtime_error("expected a game object"))
}

fn add_object_methods<P, M>(methods: &mut M)
where
    P: AsRef<GameObjectProxy> + 'static,
    M: UserDataMethods<LuaObject<P>>,
{
    methods.add_meta_method(MetaMethod::ToString, |_, this, ()| Ok(this.object().name()));

    methods.add_method("isNull", |_, this, ()| Ok(this.object().is_null()));
    methods.add_method("getName", |_, this, ()| Ok(this.object().name()));
    methods.add_method("getType", |_, this, ()| {
        Ok(kind_tag(this.object().as_object().kind()))
    });
    methods.add_method("isInstanced", |_, this, ()| Ok(this.object().is_instanced()));
    methods.add_method("createInstance", |_, this, ()| {
        this.object().create_instance();
        Ok(())
    });
    methods.add_method("destroyInstance", |_, this, ()| {
        this.object().destroy_instance();
        Ok(())
    });
    methods.add_method("reinstance", |_, this, ()| {
        this.object().reinstance();
        Ok(())
    });

    // Transform
    methods.add_method("getPosition", |lua, this, ()| vec3_table(lua, this.object().position()));
    methods.add_method("getWorldPosition", |lua, this, ()| {
        vec3_table(lua, this.object().world_position())
    });
    methods.add_method("getRotation", |lua, this, ()| vec3_table(lua, this.object().rotation()));
    methods.add_method("getWorldRotation", |lua, this, ()| {
        vec3_table(lua, this.object().world_rotation())
    });
    methods.add_method("getOrientation", |lua, this, ()| {
        quat_table(lua, this.object().orientation())
    });
    methods.add_method("getWorldOrientation", |lua, this, ()| {
        quat_table(lua, this.object().world_orientation())
    });
    methods.add_method("getScale", |lua, this, ()| vec3_table(lua, this.object().scale()));
    methods.add_method("getWorldScale", |lua, this, ()| {
        vec3_table(lua, this.object().world_scale())
    });
    methods.add_method("setPosition", |_, this, v: LuaTable| {
        this.object().set_position(vec3_arg(&v)?);
        Ok(())
    });
    methods.add_method("setRotation", |_, this, v: LuaTable| {
        this.object().set_rotation(vec3_arg(&v)?);
        Ok(())
    });
    methods.add_method("setOrientation", |_, this, q: LuaTable| {
        this.object().set_orientation(parse_quat(&q)?.normalize());
        Ok(())
    });
    methods.add_method("setScale", |_, this, v: LuaTable| {
        this.object().set_scale(vec3_arg(&v)?);
        Ok(())
    });
    methods.add_method("getLinearVelocity", |lua, this, ()| {
        vec3_table(lua, this.object().linear_velocity())
    });
    methods.add_method("getAngularVelocity", |lua, this, ()| {
        vec3_table(lua, this.object().angular_velocity())
    });
    methods.add_method("setLinearVelocity", |_, this, (v, space): (LuaTable, Option<i32>)| {
        this.object().set_linear_velocity(vec3_arg(&v)?, space_arg(space));
        Ok(())
    });
    methods.add_method("setAngularVelocity", |_, this, (v, space): (LuaTable, Option<i32>)| {
        this.object().set_angular_velocity(vec3_arg(&v)?, space_arg(space));
        Ok(())
    });

    // Relative movement. A four element table rotates by a quaternion.
    methods.add_method("rotate", |_, this, (r, space): (LuaTable, Option<i32>)| {
        if r.raw_len() == 4 {
            this.object().rotate_quat(parse_quat(&r)?.normalize(), space_arg(space));
        } else {
            this.object().rotate(vec3_arg(&r)?, space_arg(space));
        }
        Ok(())
    });
    methods.add_method("translate", |_, this, (v, space): (LuaTable, Option<i32>)| {
        this.object().translate(vec3_arg(&v)?, space_arg(space));
        Ok(())
    });
    methods.add_method("scale", |_, this, v: LuaTable| {
        this.object().scale_by(vec3_arg(&v)?);
        Ok(())
    });
    methods.add_method("yaw", |_, this, (deg, space): (f32, Option<i32>)| {
        this.object().yaw(deg, space_arg(space));
        Ok(())
    });
    methods.add_method("pitch", |_, this, (deg, space): (f32, Option<i32>)| {
        this.object().pitch(deg, space_arg(space));
        Ok(())
    });
    methods.add_method("roll", |_, this, (deg, space): (f32, Option<i32>)| {
        this.object().roll(deg, space_arg(space));
        Ok(())
    });
    methods.add_method("lookAt", |_, this, target: LuaValue| {
        match &target {
            LuaValue::Table(t) => this.object().look_at(vec3_arg(t)?),
            other => this.object().look_at_object(&object_arg(other)?),
        }
        Ok(())
    });

    // Variables and state
    methods.add_method("getVariable", |_, this, name: String| {
        Ok(LuaProperty(this.object().variable(&name)))
    });
    methods.add_method("hasVariable", |_, this, name: String| {
        Ok(this.object().has_variable(&name))
    });
    methods.add_method("setVariable", |_, this, (name, value): (String, LuaValue)| {
        Ok(this.object().set_variable(&name, &lua_value_to_value(&value)?))
    });
    methods.add_method("createVariable", |_, this, (name, value): (String, LuaValue)| {
        let value = lua_value_to_value(&value)?
            .to_var_value()
            .ok_or_else(|| runtime_error("variables hold booleans, numbers or strings"))?;
        Ok(LuaProperty(this.object().attach_variable(&name, value)))
    });
    methods.add_method("getVariableNames", |_, this, ()| Ok(this.object().variable_names()));
    methods.add_method("getScene", |_, this, ()| Ok(LuaScene(this.object().scene())));
    methods.add_method("getState", |_, this, ()| Ok(this.object().state()));
    methods.add_method("changeState", |_, this, state: i32| {
        this.object().change_state(state);
        Ok(())
    });

    // Parent graph
    methods.add_method("hasParent", |_, this, ()| Ok(this.object().has_parent()));
    methods.add_method("getParent", |_, this, ()| {
        let object = this.object();
        Ok(object.has_parent().then(|| LuaObject(object.parent())))
    });
    methods.add_method("setParent", |_, this, parent: LuaValue| {
        Ok(this.object().set_parent(&object_arg(&parent)?))
    });
    methods.add_method("setParentInPlace", |_, this, parent: LuaValue| {
        Ok(this.object().set_parent_in_place(&object_arg(&parent)?))
    });
    methods.add_method("clearParent", |_, this, ()| {
        this.object().clear_parent();
        Ok(())
    });
    methods.add_method("clearParentInPlace", |_, this, ()| {
        this.object().clear_parent_in_place();
        Ok(())
    });
    methods.add_method("addChild", |_, this, child: LuaValue| {
        Ok(this.object().add_child(&object_arg(&child)?))
    });
    methods.add_method("removeChild", |_, this, child: LuaValue| {
        Ok(this.object().remove_child(&object_arg(&child)?))
    });
    methods.add_method("getChildCount", |_, this, ()| Ok(this.object().child_count()));
    methods.add_method("getChildAt", |_, this, index: usize| {
        Ok(this.object().child_at(index).map(LuaObject))
    });
    methods.add_method("getChildByName", |_, this, name: String| {
        Ok(this.object().child_by_name(&name).map(LuaObject))
    });

    // Physics and animation
    methods.add_method("enableContacts", |_, this, enable: bool| {
        this.object().enable_contacts(enable);
        Ok(())
    });
    methods.add_method("hasContacts", |_, this, ()| Ok(this.object().has_contacts()));
    methods.add_method("hasContact", |_, this, name: String| {
        Ok(this.object().has_contact(&name))
    });
    methods.add_method(
        "playAnimation",
        |_, this, (name, blend, restart): (String, Option<f32>, Option<bool>)| {
            Ok(this
                .object()
                .play_animation(&name, blend.unwrap_or(0.0), restart.unwrap_or(false)))
        },
    );
    methods.add_method("getAnimationTime", |_, this, name: String| {
        Ok(this.object().animation_time(&name))
    });

    // Groups and narrowing
    methods.add_method("isGroupInstance", |_, this, ()| Ok(this.object().is_group_instance()));
    methods.add_method("getGroupInstance", |_, this, ()| {
        Ok(this.object().group_instance().map(LuaGroupInstance))
    });
    methods.add_method("asEntity", |_, this, ()| Ok(this.object().as_entity().map(LuaObject)));
    methods.add_method("asCamera", |_, this, ()| Ok(this.object().as_camera().map(LuaObject)));
    methods.add_method("asLight", |_, this, ()| Ok(this.object().as_light().map(LuaObject)));
    methods.add_method("asCurve", |_, this, ()| Ok(this.object().as_curve().map(LuaObject)));
    methods.add_method("asSkeleton", |_, this, ()| {
        Ok(this.object().as_skeleton().map(LuaObject))
    });
    methods.add_method("asParticles", |_, this, ()| {
        Ok(this.object().as_particles().map(LuaObject))
    });
}

impl UserData for LuaObject<GameObjectProxy> {
    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        add_object_methods(methods);
    }
}

impl UserData for LuaObject<EntityProxy> {
    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        add_object_methods(methods);
        methods.add_method("getMesh", |_, this, ()| Ok(this.0.mesh().map(LuaMesh)));
        methods.add_method("getMaterialName", |_, this, ()| Ok(this.0.material_name()));
        methods.add_method("setMaterialName", |_, this, name: String| {
            this.0.set_material_name(&name);
            Ok(())
        });
        methods.add_method("hasCharacter", |_, this, ()| Ok(this.0.has_character()));
        methods.add_method("getCharacter", |_, this, ()| {
            Ok(this.0.character().map(LuaCharacter))
        });
    }
}

impl UserData for LuaObject<CameraProxy> {
    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        add_object_methods(methods);
        methods.add_method("setClipping", |_, this, (start, end): (f32, f32)| {
            this.0.set_clipping(start, end);
            Ok(())
        });
        methods.add_method("getClipStart", |_, this, ()| Ok(this.0.clip_start()));
        methods.add_method("getClipEnd", |_, this, ()| Ok(this.0.clip_end()));
        methods.add_method("setFov", |_, this, fov: f32| {
            this.0.set_fov(fov);
            Ok(())
        });
        methods.add_method("getFov", |_, this, ()| Ok(this.0.fov()));
        methods.add_method("makeCurrent", |_, this, ()| Ok(this.0.make_current()));
        methods.add_method("isCurrent", |_, this, ()| Ok(this.0.is_current()));
    }
}

impl UserData for LuaObject<LightProxy> {
    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        add_object_methods(methods);
        methods.add_method("getDiffuse", |lua, this, ()| vec3_table(lua, this.0.diffuse()));
        methods.add_method("setDiffuse", |_, this, color: LuaTable| {
            this.0.set_diffuse(vec3_arg(&color)?);
            Ok(())
        });
        methods.add_method("getPower", |_, this, ()| Ok(this.0.power()));
        methods.add_method("setPower", |_, this, power: f32| {
            this.0.set_power(power);
            Ok(())
        });
    }
}

impl UserData for LuaObject<CurveProxy> {
    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        add_object_methods(methods);
        methods.add_method("getPointCount", |_, this, ()| Ok(this.0.point_count()));
        methods.add_method("isCyclic", |_, this, ()| Ok(this.0.is_cyclic()));
        methods.add_method("getPoint", |lua, this, index: usize| {
            vec3_table(lua, this.0.point(index))
        });
        methods.add_method("getWorldPoints", |lua, this, ()| {
            let points = this
                .0
                .world_points()
                .into_iter()
                .map(|p| vec3_table(lua, p))
                .collect::<LuaResult<Vec<_>>>()?;
            lua.create_sequence_from(points)
        });
    }
}

impl UserData for LuaObject<SkeletonProxy> {
    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        add_object_methods(methods);
        methods.add_method("getBoneNames", |_, this, ()| Ok(this.0.bone_names()));
        methods.add_method(
            "attachObjectToBone",
            |_,
             this,
             (bone, object, position, rotation, scale): (
                String,
                LuaValue,
                Option<LuaTable>,
                Option<LuaTable>,
                Option<LuaTable>,
            )| {
                let vec_or = |t: Option<LuaTable>, default: Vec3| {
                    t.map_or(Ok(default), |t| vec3_arg(&t))
                };
                Ok(this.0.attach_object_to_bone(
                    &bone,
                    &object_arg(&object)?,
                    vec_or(position, Vec3::ZERO)?,
                    vec_or(rotation, Vec3::ZERO)?,
                    vec_or(scale, Vec3::ONE)?,
                ))
            },
        );
        methods.add_method(
            "attachObjectToBoneInPlace",
            |_, this, (bone, object): (String, LuaValue)| {
                Ok(this
                    .0
                    .attach_object_to_bone_in_place(&bone, &object_arg(&object)?))
            },
        );
        methods.add_method("setBoneManual", |_, this, (bone, manual): (String, bool)| {
            this.0.set_bone_manual(&bone, manual);
            Ok(())
        });
        methods.add_method("isBoneManual", |_, this, bone: String| {
            Ok(this.0.is_bone_manual(&bone))
        });
        methods.add_method(
            "applyBoneChannelTransform",
            |_,
             this,
             (bone, position, rotation, scale, weight): (
                String,
                LuaTable,
                LuaTable,
                LuaTable,
                Option<f32>,
            )| {
                Ok(this.0.apply_bone_channel_transform(
                    &bone,
                    vec3_arg(&position)?,
                    vec3_arg(&rotation)?,
                    vec3_arg(&scale)?,
                    weight.unwrap_or(1.0),
                ))
            },
        );
        methods.add_method("getBonePose", |lua, this, bone: String| {
            let Some(pose) = this.0.bone_pose(&bone) else {
                return Ok(None);
            };
            let table = lua.create_table()?;
            table.set("position", vec3_table(lua, pose.position)?)?;
            table.set("orientation", quat_table(lua, pose.orientation)?)?;
            table.set("scale", vec3_table(lua, pose.scale)?)?;
            Ok(Some(table))
        });
    }
}

impl UserData for LuaObject<ParticlesProxy> {
    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        add_object_methods(methods);
        methods.add_method("isEmitting", |_, this, ()| Ok(this.0.is_emitting()));
        methods.add_method("setEmitting", |_, this, emitting: bool| {
            this.0.set_emitting(emitting);
            Ok(())
        });
    }
}

pub(crate) struct LuaCharacter(pub(crate) CharacterProxy);

impl UserData for LuaCharacter {
    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        methods.add_method("getWalkDirection", |lua, this, ()| {
            vec3_table(lua, this.0.walk_direction())
        });
        methods.add_method("setWalkDirection", |_, this, v: LuaTable| {
            this.0.set_walk_direction(vec3_arg(&v)?);
            Ok(())
        });
        methods.add_method("getJumpSpeed", |_, this, ()| Ok(this.0.jump_speed()));
        methods.add_method("setJumpSpeed", |_, this, speed: f32| {
            this.0.set_jump_speed(speed);
            Ok(())
        });
    }
}
