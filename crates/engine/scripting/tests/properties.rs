//! End-to-end checks of the binding layer contracts through the public API

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use glam::{Quat, Vec3};
use scripting::lumen_world::devices::{JoystickState, VirtualInput};
use scripting::lumen_world::mesh::{Mesh, Vertex};
use scripting::lumen_world::{Engine, EngineRef};
use scripting::proxy::{MeshProxy, SubMeshProxy};
use scripting::{EngineFacade, Event, Joystick, Mouse, MouseSnapshot, Property, PropertyKind, Value};

const LEVEL: &str = r#"
scene "Level" main=#true {
    object "Player" type="empty" {
        position 1 2 3
    }
    object "Lamp" type="light" {
        light 1 1 1 power=2.5
    }
}
"#;

const EXTRA: &str = r#"
scene "Props" {
    object "Crate" type="empty"
    object "Barrel" type="empty"
}
"#;

fn write_package(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn engine_with_input(input: VirtualInput) -> EngineRef {
    let engine = Engine::new_ref();
    engine.borrow_mut().set_input(Box::new(input));
    engine
}

#[test]
fn test_user_defs_add_is_first_write_wins() {
    let mut facade = EngineFacade::new();
    let defs = facade.user_defs();
    let before = defs.len();

    assert!(defs.add(Property::new("difficulty", 2.0f32)));
    assert!(!defs.add(Property::new("difficulty", 9.0f32)));
    assert!(!defs.add(Property::new("winTitle", "shadowed")));

    assert_eq!(defs.len(), before + 1);
    assert_eq!(defs.get("difficulty").to_number(), 2.0);
    assert_ne!(defs.get("winTitle").to_string(), "shadowed");
}

#[test]
fn test_unknown_settings_are_inert() {
    let mut facade = EngineFacade::new();
    let engine = facade.engine();
    let config_before = engine.borrow().user_defs.clone();

    let defs = facade.user_defs();
    let names_before = defs.names();
    let missing = defs.get("noSuchSetting");
    assert!(missing.is_null());
    assert_eq!(missing.kind(), PropertyKind::Null);
    assert!(!missing.to_bool());
    assert_eq!(missing.to_number(), -1.0);
    assert_eq!(missing.to_string(), "");

    defs.set("noSuchSetting", &Value::from(5));
    assert_eq!(defs.names(), names_before);
    assert_eq!(engine.borrow().user_defs, config_before);
}

#[test]
fn test_known_setting_reaches_engine() {
    let mut facade = EngineFacade::new();
    facade.user_defs().set("winTitle", &Value::from("Arena"));
    facade.user_defs().set("fullScreen", &Value::from(true));

    let engine = facade.engine();
    let engine = engine.borrow();
    assert_eq!(engine.user_defs.win_title, "Arena");
    assert!(engine.user_defs.fullscreen);
}

#[test]
fn test_mouse_capture_without_input_keeps_snapshot() {
    let mut mouse = Mouse::new(Engine::new_ref());
    let prior = MouseSnapshot {
        x: 4.0,
        y: 8.0,
        rel_x: 1.0,
        rel_y: -1.0,
        win_width: 800.0,
        win_height: 600.0,
        wheel: 0.5,
        moved: true,
    };
    mouse.state = prior;
    mouse.capture();
    assert_eq!(mouse.state, prior);
}

#[test]
fn test_joystick_index_and_stale_capture() {
    let mut input = VirtualInput::new();
    let index = input.add_joystick(JoystickState::new(2, 2));
    input.joystick_mut(index).unwrap().set_axis(0, 120);
    let engine = engine_with_input(input);

    assert!(Joystick::new(engine.clone(), 1).is_err());

    let mut joystick = Joystick::new(engine.clone(), 0).unwrap();
    joystick.capture();
    assert_eq!(joystick.axis(0), 120);

    // Unplug every joystick; the snapshot stays as captured
    engine.borrow_mut().set_input(Box::new(VirtualInput::new()));
    joystick.capture();
    assert_eq!(joystick.axis(0), 120);
    assert_eq!(joystick.num_axes(), 2);
}

#[test]
fn test_tick_removal_mid_dispatch() {
    let facade = EngineFacade::new();
    facade.initialize();
    let calls = Rc::new(RefCell::new(Vec::new()));

    for (name, keep) in [("A", true), ("B", false), ("C", true)] {
        let calls = calls.clone();
        facade.connect(Event::Tick, move |_delta: f32| {
            calls.borrow_mut().push(name);
            keep
        });
    }

    facade.step(1.0 / 60.0);
    assert_eq!(*calls.borrow(), ["A", "B", "C"]);
    assert_eq!(facade.tick_count(), 2);

    facade.step(1.0 / 60.0);
    assert_eq!(*calls.borrow(), ["A", "B", "C", "A", "C"]);
}

#[test]
fn test_added_sub_mesh_outlives_its_proxy() {
    let engine = Engine::new_ref();
    let id = engine.borrow_mut().register_mesh(Mesh::new("Ground"));
    let mesh = MeshProxy::new(engine.clone(), Some(id));

    let sub_mesh = SubMeshProxy::new();
    sub_mesh.add_triangle(
        Vertex::at(Vec3::ZERO),
        0,
        Vertex::at(Vec3::X),
        1,
        Vertex::at(Vec3::Y),
        2,
    );
    assert!(mesh.add_sub_mesh(&sub_mesh));
    assert!(sub_mesh.is_adopted());
    assert!(!mesh.add_sub_mesh(&sub_mesh));
    drop(sub_mesh);

    assert_eq!(mesh.sub_mesh_count(), 1);
    let adopted = mesh.sub_mesh(0).unwrap();
    assert_eq!(adopted.triangle_count(), 1);
    assert_eq!(adopted.vertex_count(), 3);
}

#[test]
fn test_blend_file_install_then_merge() {
    let dir = tempfile::tempdir().unwrap();
    let level = write_package(&dir, "level.kdl", LEVEL);
    let extra = write_package(&dir, "props.kdl", EXTRA);

    let facade = EngineFacade::new();
    assert!(facade.load_blend_file(&level).is_none());
    facade.initialize();

    let active = facade.load_blend_file(&level).unwrap();
    assert_eq!(active.name(), "Level");
    assert!(active.is_instanced());
    assert_eq!(facade.active_scene().and_then(|s| s.id()), active.id());

    let merged = facade.load_blend_file(&extra).unwrap();
    assert_eq!(merged.id(), active.id());
    for name in ["Player", "Lamp", "Crate", "Barrel"] {
        assert!(active.has_object(name), "missing {}", name);
    }
    assert_eq!(active.object("Player").unwrap().position(), Vec3::new(1.0, 2.0, 3.0));

    assert!(facade.load_blend_file(dir.path().join("missing.kdl")).is_none());
}

#[test]
fn test_look_at_own_position_keeps_orientation() {
    let facade = EngineFacade::new();
    facade.initialize();
    let engine = facade.engine();
    let scene_id = engine.borrow_mut().create_scene("Look").unwrap();
    let scene = facade.scene("Look").unwrap();
    assert_eq!(scene.id(), Some(scene_id));

    let object = scene.create_empty("Eye").unwrap();
    object.set_position(Vec3::new(3.0, -2.0, 1.0));
    let turned = Quat::from_rotation_z(0.5);
    object.set_orientation(turned);

    object.look_at(object.world_position());
    assert!(object.world_orientation().abs_diff_eq(turned, 1e-5));

    object.look_at_object(&object);
    assert!(object.world_orientation().abs_diff_eq(turned, 1e-5));

    // A real target does rotate the object
    object.look_at(Vec3::new(3.0, 5.0, 1.0));
    assert!(!object.world_orientation().abs_diff_eq(turned, 1e-3));
}

#[test]
fn test_dead_proxies_read_defaults() {
    let facade = EngineFacade::new();
    facade.initialize();
    let engine = facade.engine();
    engine.borrow_mut().create_scene("Temp").unwrap();
    let scene = facade.scene("Temp").unwrap();
    let object = scene.create_empty("Ghost").unwrap();
    object.set_position(Vec3::ONE);

    facade.remove_scene(&scene);

    assert!(scene.is_null());
    assert_eq!(scene.name(), "");
    assert!(object.is_null());
    assert_eq!(object.position(), Vec3::ZERO);
    assert_eq!(object.name(), "");
    assert!(object.variable("hp").is_null());
    object.set_position(Vec3::X);
    assert_eq!(object.position(), Vec3::ZERO);
}
