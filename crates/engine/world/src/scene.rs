//! Scenes: named collections of game objects

use glam::Vec3;
use indexmap::IndexMap;

use crate::debug::DebugLine;
use crate::handle::Handle;
use crate::object::ObjectId;

pub type SceneId = Handle<Scene>;

/// Physics world settings of a scene
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DynamicsWorld {
    pub gravity: Vec3,
}

impl Default for DynamicsWorld {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, 0.0, -9.81),
        }
    }
}

/// Update flag bits for [`Scene::update_flags`]
pub mod update_flags {
    pub const PHYSICS: u32 = 1 << 0;
    pub const LOGIC_BRICKS: u32 = 1 << 1;
    pub const NODE_TREES: u32 = 1 << 2;
    pub const ANIMATIONS: u32 = 1 << 3;
    pub const SOUNDS: u32 = 1 << 4;
    pub const DEBUG: u32 = 1 << 5;
    pub const ALL: u32 = PHYSICS | LOGIC_BRICKS | NODE_TREES | ANIMATIONS | SOUNDS | DEBUG;
}

#[derive(Debug)]
pub struct Scene {
    pub name: String,
    pub layer: u32,
    /// Objects by unique name, in creation order
    pub objects: IndexMap<String, ObjectId>,
    pub instanced: bool,
    /// Viewport z order while instanced
    pub display_z: i32,
    pub main_camera: Option<ObjectId>,
    pub dynamics: DynamicsWorld,
    pub update_flags: u32,
    pub debug_lines: Vec<DebugLine>,
    /// Package the scene was installed from
    pub package: Option<String>,
}

impl Scene {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            layer: 1,
            objects: IndexMap::new(),
            instanced: false,
            display_z: 0,
            main_camera: None,
            dynamics: DynamicsWorld::default(),
            update_flags: update_flags::ALL,
            debug_lines: Vec::new(),
            package: None,
        }
    }

    pub fn has_object(&self, name: &str) -> bool {
        self.objects.contains_key(name)
    }

    pub fn object(&self, name: &str) -> Option<ObjectId> {
        self.objects.get(name).copied()
    }

    /// A name derived from `base` not used by any object of this scene
    pub fn unique_name(&self, base: &str) -> String {
        (1..)
            .map(|n| format!("{}.{:03}", base, n))
            .find(|name| !self.objects.contains_key(name))
            .unwrap_or_else(|| base.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::Handle;

    #[test]
    fn test_unique_name_skips_taken() {
        let mut scene = Scene::new("Main");
        scene.objects.insert("Cube.001".into(), Handle::from_parts(0, 0));
        assert_eq!(scene.unique_name("Cube"), "Cube.002");
        assert_eq!(scene.unique_name("Lamp"), "Lamp.001");
    }
}
