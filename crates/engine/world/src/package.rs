//! In-memory description of a resource package
//!
//! A loader turns a file into a [`PackageDesc`]; [`crate::Engine::install_package`]
//! turns the description into live engine resources.

use glam::Vec3;
use indexmap::IndexMap;

use crate::animation::AnimationClip;
use crate::group::Group;
use crate::hud::Hud;
use crate::material::Material;
use crate::mesh::Mesh;
use crate::object::{CameraData, CurveData, LightData, ObjectType};
use crate::scene::SceneId;
use crate::transform::Transform;
use crate::variable::VarValue;

/// Template for a game object
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectDesc {
    pub name: String,
    pub object_type: ObjectType,
    pub transform: Transform,
    pub mesh: Option<String>,
    pub material: Option<String>,
    pub parent: Option<String>,
    pub state: i32,
    pub variables: Vec<(String, VarValue)>,
    pub character: bool,
    pub contacts: bool,
    pub camera: Option<CameraData>,
    pub light: Option<LightData>,
    pub curve: Option<CurveData>,
    /// Bone names with their bind pose
    pub bones: Vec<(String, Transform)>,
    pub emitting: Option<bool>,
}

impl ObjectDesc {
    pub fn new(name: impl Into<String>, object_type: ObjectType) -> Self {
        Self {
            name: name.into(),
            object_type,
            transform: Transform::IDENTITY,
            mesh: None,
            material: None,
            parent: None,
            state: 0,
            variables: Vec::new(),
            character: false,
            contacts: false,
            camera: None,
            light: None,
            curve: None,
            bones: Vec::new(),
            emitting: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneDesc {
    pub name: String,
    pub layer: u32,
    pub main: bool,
    pub gravity: Option<Vec3>,
    /// Name of the camera object that becomes the main camera
    pub camera: Option<String>,
    pub objects: Vec<ObjectDesc>,
}

impl SceneDesc {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            layer: 1,
            main: false,
            gravity: None,
            camera: None,
            objects: Vec::new(),
        }
    }
}

/// Everything a package file contains
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PackageDesc {
    pub name: String,
    pub scenes: Vec<SceneDesc>,
    pub meshes: Vec<Mesh>,
    pub groups: Vec<Group>,
    pub animations: Vec<AnimationClip>,
    pub materials: Vec<Material>,
    pub huds: Vec<Hud>,
    /// Script sources by name
    pub scripts: IndexMap<String, String>,
}

impl PackageDesc {
    /// The scene a package installs: the one flagged main, else the first
    pub fn main_scene(&self) -> Option<&SceneDesc> {
        self.scenes
            .iter()
            .find(|scene| scene.main)
            .or_else(|| self.scenes.first())
    }
}

/// Resources an installed package added to the engine
#[derive(Debug, Clone)]
pub struct InstalledPackage {
    pub name: String,
    pub scene: SceneId,
    pub meshes: Vec<String>,
    pub groups: Vec<String>,
    pub animations: Vec<String>,
    pub materials: Vec<String>,
    pub huds: Vec<String>,
    pub scripts: Vec<String>,
}
