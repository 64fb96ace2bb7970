//! Script-visible configuration table
//!
//! Every configurable engine field is listed once in [`FIELDS`] with its
//! script name, value kind, and the accessors that read and write the backing
//! [`UserDefs`] field. The table snapshots those fields into properties; a
//! write goes to the table entry first and is then pushed to the backing field.

use indexmap::IndexMap;
use lumen_world::{EngineRef, RenderSystem, UserDefs, VarValue, Variable};
use tracing::debug;

use crate::property::Property;
use crate::value::Value;

/// Value kind of a configuration field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Bool,
    Int,
    Real,
    String,
}

impl FieldKind {
    /// Coerce a variable's value to this kind
    fn coerce(self, variable: &Variable) -> VarValue {
        match self {
            FieldKind::Bool => VarValue::Bool(variable.as_bool()),
            FieldKind::Int => VarValue::Int(variable.as_int()),
            FieldKind::Real => VarValue::Real(variable.as_real()),
            FieldKind::String => VarValue::String(variable.as_string()),
        }
    }
}

/// One configurable field
pub struct ConfigField {
    pub name: &'static str,
    pub kind: FieldKind,
    get: fn(&UserDefs) -> VarValue,
    set: fn(&mut UserDefs, &Variable),
}

impl ConfigField {
    pub fn read(&self, defs: &UserDefs) -> VarValue {
        (self.get)(defs)
    }

    pub fn write(&self, defs: &mut UserDefs, variable: &Variable) {
        (self.set)(defs, variable)
    }
}

fn set_render_system(d: &mut UserDefs, v: &Variable) {
    match RenderSystem::from_i32(v.as_int()) {
        Some(rs) => d.render_system = rs,
        None => debug!("Ignoring unknown render system {}", v.as_int()),
    }
}

/// All configuration fields, in table order
pub const FIELDS: &[ConfigField] = &[
    ConfigField {
        name: "renderSystem",
        kind: FieldKind::Int,
        get: |d| VarValue::Int(d.render_system.as_i32()),
        set: set_render_system,
    },
    ConfigField {
        name: "sceneManager",
        kind: FieldKind::Int,
        get: |d| VarValue::Int(d.scene_manager),
        set: |d, v| d.scene_manager = v.as_int(),
    },
    ConfigField {
        name: "verbose",
        kind: FieldKind::Bool,
        get: |d| VarValue::Bool(d.verbose),
        set: |d, v| d.verbose = v.as_bool(),
    },
    ConfigField {
        name: "winx",
        kind: FieldKind::Int,
        get: |d| VarValue::Int(d.win_size.x as i32),
        set: |d, v| d.win_size.x = v.as_int() as f32,
    },
    ConfigField {
        name: "winy",
        kind: FieldKind::Int,
        get: |d| VarValue::Int(d.win_size.y as i32),
        set: |d, v| d.win_size.y = v.as_int() as f32,
    },
    ConfigField {
        name: "winTitle",
        kind: FieldKind::String,
        get: |d| VarValue::String(d.win_title.clone()),
        set: |d, v| d.win_title = v.as_string(),
    },
    ConfigField {
        name: "fullScreen",
        kind: FieldKind::Bool,
        get: |d| VarValue::Bool(d.fullscreen),
        set: |d, v| d.fullscreen = v.as_bool(),
    },
    ConfigField {
        name: "blenderMat",
        kind: FieldKind::Bool,
        get: |d| VarValue::Bool(d.blender_mat),
        set: |d, v| d.blender_mat = v.as_bool(),
    },
    ConfigField {
        name: "matblending",
        kind: FieldKind::Bool,
        get: |d| VarValue::Bool(d.mat_blending),
        set: |d, v| d.mat_blending = v.as_bool(),
    },
    ConfigField {
        name: "grabInput",
        kind: FieldKind::Bool,
        get: |d| VarValue::Bool(d.grab_input),
        set: |d, v| d.grab_input = v.as_bool(),
    },
    ConfigField {
        name: "debugFps",
        kind: FieldKind::Bool,
        get: |d| VarValue::Bool(d.debug_fps),
        set: |d, v| d.debug_fps = v.as_bool(),
    },
    ConfigField {
        name: "debugPhysics",
        kind: FieldKind::Bool,
        get: |d| VarValue::Bool(d.debug_physics),
        set: |d, v| d.debug_physics = v.as_bool(),
    },
    ConfigField {
        name: "debugPhysicsAABB",
        kind: FieldKind::Bool,
        get: |d| VarValue::Bool(d.debug_physics_aabb),
        set: |d, v| d.debug_physics_aabb = v.as_bool(),
    },
    ConfigField {
        name: "usebulletDBVT",
        kind: FieldKind::Bool,
        get: |d| VarValue::Bool(d.use_bullet_dbvt),
        set: |d, v| d.use_bullet_dbvt = v.as_bool(),
    },
    ConfigField {
        name: "showDebugProps",
        kind: FieldKind::Bool,
        get: |d| VarValue::Bool(d.show_debug_props),
        set: |d, v| d.show_debug_props = v.as_bool(),
    },
    ConfigField {
        name: "debugSounds",
        kind: FieldKind::Bool,
        get: |d| VarValue::Bool(d.debug_sounds),
        set: |d, v| d.debug_sounds = v.as_bool(),
    },
    ConfigField {
        name: "enableShadows",
        kind: FieldKind::Bool,
        get: |d| VarValue::Bool(d.enable_shadows),
        set: |d, v| d.enable_shadows = v.as_bool(),
    },
    ConfigField {
        name: "shadowTechnique",
        kind: FieldKind::String,
        get: |d| VarValue::String(d.shadow_technique.clone()),
        set: |d, v| d.shadow_technique = v.as_string(),
    },
    ConfigField {
        name: "colourShadowR",
        kind: FieldKind::Real,
        get: |d| VarValue::Real(d.colour_shadow.x),
        set: |d, v| d.colour_shadow.x = v.as_real(),
    },
    ConfigField {
        name: "colourShadowG",
        kind: FieldKind::Real,
        get: |d| VarValue::Real(d.colour_shadow.y),
        set: |d, v| d.colour_shadow.y = v.as_real(),
    },
    ConfigField {
        name: "colourShadowB",
        kind: FieldKind::Real,
        get: |d| VarValue::Real(d.colour_shadow.z),
        set: |d, v| d.colour_shadow.z = v.as_real(),
    },
    ConfigField {
        name: "farDistanceShadow",
        kind: FieldKind::Real,
        get: |d| VarValue::Real(d.far_distance_shadow),
        set: |d, v| d.far_distance_shadow = v.as_real(),
    },
];

/// Look up a configuration field by script name
pub fn field(name: &str) -> Option<&'static ConfigField> {
    FIELDS.iter().find(|f| f.name == name)
}

/// Insertion-ordered table of configuration properties
pub struct UserDefsTable {
    engine: EngineRef,
    entries: IndexMap<String, Property>,
}

impl UserDefsTable {
    /// Snapshot the engine's configuration
    pub fn new(engine: EngineRef) -> Self {
        let entries = {
            let e = engine.borrow();
            FIELDS
                .iter()
                .map(|f| (f.name.to_string(), Property::new(f.name, f.read(&e.user_defs))))
                .collect()
        };
        Self { engine, entries }
    }

    pub fn has(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Snapshot of an entry, or a null property for unknown names
    pub fn get(&self, name: &str) -> Property {
        self.entries.get(name).cloned().unwrap_or_default()
    }

    /// Write an entry and push it to the engine. Unknown names are ignored.
    pub fn set(&mut self, name: &str, value: &Value) {
        let Some(entry) = self.entries.get(name) else {
            debug!("Ignoring unknown setting {}", name);
            return;
        };
        entry.from_value(value);
        self.on_value_changed(name);
    }

    /// Add a custom entry. Empty names and existing names are rejected.
    pub fn add(&mut self, property: Property) -> bool {
        let name = property.name();
        if name.is_empty() || self.entries.contains_key(&name) {
            return false;
        }
        self.entries.insert(name, property.clone());
        true
    }

    /// Entry names in insertion order
    pub fn names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn on_value_changed(&mut self, name: &str) {
        let Some(field) = field(name) else {
            return;
        };
        let Some(variable) = self.entries.get(name).and_then(Property::variable) else {
            return;
        };
        let mut engine = self.engine.borrow_mut();
        let coerced = Variable::new(name, field.kind.coerce(&variable.borrow()));
        field.write(&mut engine.user_defs, &coerced);
        variable.borrow_mut().set_value(field.read(&engine.user_defs));
        engine.apply_user_defs();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devices::{CursorMode, VirtualInput};
    use lumen_world::Engine;

    const NAMES: [&str; 22] = [
        "renderSystem",
        "sceneManager",
        "verbose",
        "winx",
        "winy",
        "winTitle",
        "fullScreen",
        "blenderMat",
        "matblending",
        "grabInput",
        "debugFps",
        "debugPhysics",
        "debugPhysicsAABB",
        "usebulletDBVT",
        "showDebugProps",
        "debugSounds",
        "enableShadows",
        "shadowTechnique",
        "colourShadowR",
        "colourShadowG",
        "colourShadowB",
        "farDistanceShadow",
    ];

    #[test]
    fn test_names_in_order() {
        let table = UserDefsTable::new(Engine::new_ref());
        assert_eq!(table.names(), NAMES.map(String::from).to_vec());
    }

    #[test]
    fn test_get_snapshot_and_unknown() {
        let table = UserDefsTable::new(Engine::new_ref());
        assert_eq!(table.get("winx").to_number(), 800.0);
        assert_eq!(table.get("winTitle").to_string(), "Lumen");
        assert!(table.get("noSuchThing").is_null());

        // Writing the snapshot does not touch the table
        table.get("winx").from_number(1.0);
        assert_eq!(table.get("winx").to_number(), 800.0);
    }

    #[test]
    fn test_set_writes_backing_field() {
        let engine = Engine::new_ref();
        engine.borrow_mut().initialize();
        let mut table = UserDefsTable::new(engine.clone());

        table.set("winx", &Value::from(1024));
        table.set("winTitle", &Value::from("Demo"));
        table.set("matblending", &Value::from(true));
        table.set("colourShadowG", &Value::from(0.25));
        table.set("bogus", &Value::from(1));

        let e = engine.borrow();
        assert_eq!(e.user_defs.win_size.x, 1024.0);
        assert_eq!(e.user_defs.win_title, "Demo");
        assert!(e.user_defs.mat_blending);
        assert_eq!(e.user_defs.colour_shadow.y, 0.25);
        assert_eq!(e.window().unwrap().width, 1024);
        assert_eq!(e.window().unwrap().title, "Demo");
        assert!(!table.has("bogus"));
    }

    #[test]
    fn test_render_system_roundtrip_and_invalid() {
        let engine = Engine::new_ref();
        let mut table = UserDefsTable::new(engine.clone());

        table.set("renderSystem", &Value::from(3));
        assert_eq!(engine.borrow().user_defs.render_system, RenderSystem::Direct3D11);
        assert_eq!(table.get("renderSystem").to_number(), 3.0);

        table.set("renderSystem", &Value::from(42));
        assert_eq!(engine.borrow().user_defs.render_system, RenderSystem::Direct3D11);
        assert_eq!(table.get("renderSystem").to_number(), 3.0);
    }

    #[test]
    fn test_grab_input_applies_cursor_mode() {
        let engine = Engine::new_ref();
        engine.borrow_mut().set_input(Box::new(VirtualInput::new()));
        let mut table = UserDefsTable::new(engine.clone());

        table.set("grabInput", &Value::from(true));
        let mode = engine.borrow().input().map(|i| i.cursor_mode());
        assert_eq!(mode, Some(CursorMode::Grabbed));
    }

    #[test]
    fn test_add_first_write_wins() {
        let mut table = UserDefsTable::new(Engine::new_ref());
        assert!(table.add(Property::new("custom", 1)));
        assert!(!table.add(Property::new("custom", 2)));
        assert!(!table.add(Property::new("", 2)));
        assert!(!table.add(Property::null()));
        assert_eq!(table.get("custom").to_number(), 1.0);
        assert_eq!(table.names().last().map(String::as_str), Some("custom"));
    }
}
