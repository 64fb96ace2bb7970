//! Free functions exposed to scripts next to the proxy types

use glam::Vec3;
use lumen_world::material::{Material, ShaderStage, ShaderValue};
use lumen_world::message::Message;
use lumen_world::transform::quat_from_euler_degrees;
use lumen_world::{EngineRef, Transform};
use tracing::debug;

use crate::proxy::{GroupInstanceProxy, HudProxy, SceneProxy};

/// The active scene of an initialized engine
pub fn active_scene(engine: &EngineRef) -> Option<SceneProxy> {
    let e = engine.borrow();
    if !e.is_initialized() {
        return None;
    }
    let id = e.active_scene()?;
    Some(SceneProxy::new(engine.clone(), Some(id)))
}

pub fn scene(engine: &EngineRef, name: &str) -> Option<SceneProxy> {
    let id = engine.borrow().find_scene(name)?;
    Some(SceneProxy::new(engine.clone(), Some(id)))
}

/// Instance a scene at viewport depth `z_order`. A scene that is already
/// instanced keeps its place.
pub fn add_scene(engine: &EngineRef, scene: &SceneProxy, z_order: i32) -> Option<SceneProxy> {
    let id = scene.id()?;
    let mut e = engine.borrow_mut();
    if !e.scene(id)?.instanced {
        e.instance_scene(id, z_order);
    }
    Some(SceneProxy::new(engine.clone(), Some(id)))
}

/// The HUD named `name`, created when missing
pub fn hud(engine: &EngineRef, name: &str) -> HudProxy {
    HudProxy::get_or_create(engine.clone(), name)
}

/// Spawn a group in `scene`, or the active scene when `None`
///
/// `rotation` is Euler degrees. Returns `None` for unknown groups or an
/// uninitialized engine.
pub fn create_group_instance(
    engine: &EngineRef,
    group: &str,
    location: Vec3,
    rotation: Vec3,
    scale: Vec3,
    scene: Option<&SceneProxy>,
) -> Option<GroupInstanceProxy> {
    let mut e = engine.borrow_mut();
    if !e.is_initialized() || !e.groups.contains_key(group) {
        return None;
    }
    let scene_id = match scene {
        Some(scene) => scene.id()?,
        None => e.active_scene()?,
    };
    let transform = Transform::new(location, quat_from_euler_degrees(rotation), scale);
    let id = e.create_group_instance(scene_id, group, transform)?;
    drop(e);
    Some(GroupInstanceProxy::new(engine.clone(), Some(id)))
}

/// Set a shader constant on a registered material
///
/// Vertex constants always apply. Fragment constants apply only when the
/// material declares them.
pub fn set_material_param(
    engine: &EngineRef,
    material: &str,
    stage: ShaderStage,
    param: &str,
    value: ShaderValue,
) {
    let mut e = engine.borrow_mut();
    match e.materials.get_mut(material) {
        Some(mat) => {
            if !mat.set_param(stage, param, value) {
                debug!("Material {} does not declare {}", material, param);
            }
        }
        None => e.debug_print(&format!("Couldn't find material with name: {}", material)),
    }
}

pub fn is_material_initialized(engine: &EngineRef, material: &str) -> bool {
    engine
        .borrow()
        .materials
        .get(material)
        .is_some_and(|m| m.initialized)
}

/// Initialize a material used by some loaded submesh
pub fn init_material(engine: &EngineRef, material: &str) {
    let mut e = engine.borrow_mut();
    if e.materials.get(material).is_some_and(|m| m.initialized) {
        return;
    }
    let used = e
        .meshes
        .iter()
        .flat_map(|(_, mesh)| mesh.sub_meshes.iter())
        .any(|sub| sub.material_name == material);
    if !used {
        debug!("No submesh uses material {}", material);
        return;
    }
    e.materials
        .entry(material.to_string())
        .or_insert_with(|| Material::new(material))
        .initialized = true;
}

/// Print a line on the on-screen debug channel
pub fn debug_print(engine: &EngineRef, message: &str) {
    engine.borrow_mut().debug_print(message);
}

pub fn send_message(engine: &EngineRef, from: &str, to: &str, subject: &str, body: &str) {
    engine.borrow_mut().messages.send(Message {
        from: from.to_string(),
        to: to.to_string(),
        subject: subject.to_string(),
        body: body.to_string(),
    });
}

/// Name of the platform the engine was built for
pub fn platform() -> &'static str {
    if cfg!(target_os = "windows") {
        "WIN32"
    } else if cfg!(target_os = "ios") {
        "APPLE_IOS"
    } else if cfg!(target_os = "macos") {
        "APPLE"
    } else if cfg!(target_os = "android") {
        "ANDROID"
    } else if cfg!(target_os = "linux") {
        "LINUX"
    } else {
        "UNKNOWN"
    }
}

pub fn is_sound_available() -> bool {
    cfg!(feature = "sound")
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_world::group::Group;
    use lumen_world::mesh::{Mesh, SubMesh};
    use lumen_world::package::ObjectDesc;
    use lumen_world::{Engine, ObjectType};

    fn engine() -> EngineRef {
        let engine = Engine::new_ref();
        engine.borrow_mut().initialize();
        engine
    }

    #[test]
    fn test_active_scene_needs_initialized_engine() {
        let engine = Engine::new_ref();
        let id = engine.borrow_mut().create_scene("Main").unwrap();
        engine.borrow_mut().set_active_scene(Some(id));
        assert!(active_scene(&engine).is_none());

        engine.borrow_mut().initialize();
        assert_eq!(active_scene(&engine).unwrap().name(), "Main");
        assert!(scene(&engine, "Main").is_some());
        assert!(scene(&engine, "Nope").is_none());
    }

    #[test]
    fn test_add_scene_keeps_existing_instance() {
        let engine = engine();
        let id = engine.borrow_mut().create_scene("Overlay").unwrap();
        let overlay = SceneProxy::new(engine.clone(), Some(id));

        add_scene(&engine, &overlay, 5).unwrap();
        add_scene(&engine, &overlay, 9).unwrap();
        assert_eq!(engine.borrow().scene(id).unwrap().display_z, 5);
    }

    #[test]
    fn test_create_group_instance_in_active_scene() {
        let engine = engine();
        {
            let mut e = engine.borrow_mut();
            let id = e.create_scene("Main").unwrap();
            e.set_active_scene(Some(id));
            e.groups.insert(
                "Crate".to_string(),
                Group {
                    name: "Crate".to_string(),
                    objects: vec![ObjectDesc::new("Box", ObjectType::Empty)],
                },
            );
        }

        let instance = create_group_instance(
            &engine,
            "Crate",
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::ZERO,
            Vec3::ONE,
            None,
        )
        .unwrap();
        assert_eq!(instance.group_name(), "Crate");
        assert_eq!(instance.root().unwrap().position(), Vec3::new(1.0, 2.0, 3.0));
        assert!(instance.element("Box").is_some());

        assert!(create_group_instance(&engine, "Missing", Vec3::ZERO, Vec3::ZERO, Vec3::ONE, None).is_none());
    }

    #[test]
    fn test_material_params() {
        let engine = engine();
        let mut glow = Material::new("Glow");
        glow.declared_fragment.insert("tint".to_string());
        engine.borrow_mut().materials.insert("Glow".to_string(), glow);

        set_material_param(&engine, "Glow", ShaderStage::Vertex, "wave", ShaderValue::Float(2.0));
        set_material_param(&engine, "Glow", ShaderStage::Fragment, "other", ShaderValue::Float(1.0));
        set_material_param(&engine, "Missing", ShaderStage::Vertex, "wave", ShaderValue::Float(1.0));

        let e = engine.borrow();
        let glow = &e.materials["Glow"];
        assert_eq!(glow.param(ShaderStage::Vertex, "wave"), Some(ShaderValue::Float(2.0)));
        assert_eq!(glow.param(ShaderStage::Fragment, "other"), None);
        assert!(e.debug_screen.lines().iter().any(|l| l.contains("Missing")));
    }

    #[test]
    fn test_init_material_from_submesh() {
        let engine = engine();
        let mut mesh = Mesh::new("Rock");
        let mut sub = SubMesh::new();
        sub.material_name = "Stone".to_string();
        mesh.add_sub_mesh(sub);
        engine.borrow_mut().register_mesh(mesh);

        assert!(!is_material_initialized(&engine, "Stone"));
        init_material(&engine, "Stone");
        assert!(is_material_initialized(&engine, "Stone"));

        init_material(&engine, "Unused");
        assert!(!is_material_initialized(&engine, "Unused"));
    }

    #[test]
    fn test_send_message_queues() {
        let engine = engine();
        send_message(&engine, "a", "b", "hello", "world");
        let pending = engine.borrow().messages.pending().to_vec();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].subject, "hello");
    }

    #[test]
    fn test_platform_is_named() {
        assert!(!platform().is_empty());
        assert_eq!(is_sound_available(), cfg!(feature = "sound"));
    }
}
