//! Game objects and their kind-specific data

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;
use indexmap::IndexMap;

use crate::animation::AnimationPlayer;
use crate::group::GroupInstanceId;
use crate::handle::Handle;
use crate::mesh::Mesh;
use crate::scene::SceneId;
use crate::transform::Transform;
use crate::variable::Variable;

pub type ObjectId = Handle<GameObject>;
pub type MeshId = Handle<Mesh>;

/// Runtime type tag of a game object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Empty,
    Entity,
    Camera,
    Light,
    Curve,
    Skeleton,
    Particles,
}

impl ObjectType {
    pub fn name(self) -> &'static str {
        match self {
            ObjectType::Empty => "empty",
            ObjectType::Entity => "entity",
            ObjectType::Camera => "camera",
            ObjectType::Light => "light",
            ObjectType::Curve => "curve",
            ObjectType::Skeleton => "skeleton",
            ObjectType::Particles => "particles",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "empty" => Some(ObjectType::Empty),
            "entity" => Some(ObjectType::Entity),
            "camera" => Some(ObjectType::Camera),
            "light" => Some(ObjectType::Light),
            "curve" => Some(ObjectType::Curve),
            "skeleton" => Some(ObjectType::Skeleton),
            "particles" => Some(ObjectType::Particles),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityData {
    pub mesh: Option<MeshId>,
    pub material_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraData {
    pub clip_start: f32,
    pub clip_end: f32,
    /// Vertical field of view in degrees
    pub fov: f32,
}

/// Smallest near clip distance a camera accepts
pub const MIN_CLIP_START: f32 = 0.0001;

impl Default for CameraData {
    fn default() -> Self {
        Self {
            clip_start: 0.1,
            clip_end: 1000.0,
            fov: 49.1,
        }
    }
}

impl CameraData {
    pub fn set_clipping(&mut self, start: f32, end: f32) {
        self.clip_start = start.max(MIN_CLIP_START);
        self.clip_end = end;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightData {
    pub diffuse: Vec3,
    pub power: f32,
}

impl Default for LightData {
    fn default() -> Self {
        Self {
            diffuse: Vec3::ONE,
            power: 1.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurveData {
    pub points: Vec<Vec3>,
    pub cyclic: bool,
}

/// A skeleton bone. The effective bone transform is `bind * pose`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bone {
    pub bind: Transform,
    pub pose: Transform,
    /// Manually driven bones are skipped by animation playback
    pub manual: bool,
}

impl Bone {
    pub fn new(bind: Transform) -> Self {
        Self {
            bind,
            pose: Transform::IDENTITY,
            manual: false,
        }
    }

    /// Bone transform in skeleton space
    pub fn transform(&self) -> Transform {
        self.bind.mul_transform(&self.pose)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkeletonData {
    pub bones: IndexMap<String, Bone>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleData {
    pub emitting: bool,
}

impl Default for ParticleData {
    fn default() -> Self {
        Self { emitting: true }
    }
}

/// Kind-specific data of a game object
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectKind {
    Empty,
    Entity(EntityData),
    Camera(CameraData),
    Light(LightData),
    Curve(CurveData),
    Skeleton(SkeletonData),
    Particles(ParticleData),
}

impl ObjectKind {
    /// Default data for a type tag
    pub fn new(object_type: ObjectType) -> Self {
        match object_type {
            ObjectType::Empty => ObjectKind::Empty,
            ObjectType::Entity => ObjectKind::Entity(EntityData::default()),
            ObjectType::Camera => ObjectKind::Camera(CameraData::default()),
            ObjectType::Light => ObjectKind::Light(LightData::default()),
            ObjectType::Curve => ObjectKind::Curve(CurveData::default()),
            ObjectType::Skeleton => ObjectKind::Skeleton(SkeletonData::default()),
            ObjectType::Particles => ObjectKind::Particles(ParticleData::default()),
        }
    }

    pub fn object_type(&self) -> ObjectType {
        match self {
            ObjectKind::Empty => ObjectType::Empty,
            ObjectKind::Entity(_) => ObjectType::Entity,
            ObjectKind::Camera(_) => ObjectType::Camera,
            ObjectKind::Light(_) => ObjectType::Light,
            ObjectKind::Curve(_) => ObjectType::Curve,
            ObjectKind::Skeleton(_) => ObjectType::Skeleton,
            ObjectKind::Particles(_) => ObjectType::Particles,
        }
    }
}

/// Character controller settings
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Character {
    pub walk_direction: Vec3,
    pub jump_speed: f32,
}

/// Physics-facing state of an object
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhysicsController {
    pub contacts_enabled: bool,
    /// Names of objects touched during the last physics step
    pub contacts: Vec<String>,
    pub character: Option<Character>,
}

impl PhysicsController {
    pub fn has_contact(&self, name: &str) -> bool {
        self.contacts.iter().any(|c| c == name)
    }
}

/// A scene object
#[derive(Debug)]
pub struct GameObject {
    pub name: String,
    pub kind: ObjectKind,
    pub scene: Option<SceneId>,
    /// Transform relative to the parent (or to `parent_bone` when set)
    pub transform: Transform,
    pub parent: Option<ObjectId>,
    pub parent_bone: Option<String>,
    pub children: Vec<ObjectId>,
    pub variables: IndexMap<String, Rc<RefCell<Variable>>>,
    pub state: i32,
    pub instanced: bool,
    /// World-space velocities
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
    pub physics: PhysicsController,
    pub animations: IndexMap<String, AnimationPlayer>,
    pub active_animation: Option<String>,
    pub group_instance: Option<GroupInstanceId>,
    /// Remaining frames before the object is destroyed
    pub life_span: Option<u32>,
}

impl GameObject {
    pub fn new(name: impl Into<String>, kind: ObjectKind) -> Self {
        Self {
            name: name.into(),
            kind,
            scene: None,
            transform: Transform::IDENTITY,
            parent: None,
            parent_bone: None,
            children: Vec::new(),
            variables: IndexMap::new(),
            state: 0,
            instanced: false,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            physics: PhysicsController::default(),
            animations: IndexMap::new(),
            active_animation: None,
            group_instance: None,
            life_span: None,
        }
    }

    pub fn object_type(&self) -> ObjectType {
        self.kind.object_type()
    }

    /// Copy this object under a new name
    ///
    /// Variables are deep-copied. Graph links, instancing and playback state
    /// are not carried over.
    pub fn duplicate(&self, name: impl Into<String>) -> Self {
        let mut copy = Self::new(name, self.kind.clone());
        copy.scene = self.scene;
        copy.transform = self.transform;
        copy.state = self.state;
        copy.physics = self.physics.clone();
        copy.physics.contacts.clear();
        copy.variables = self
            .variables
            .iter()
            .map(|(name, var)| (name.clone(), Rc::new(RefCell::new(var.borrow().clone()))))
            .collect();
        copy
    }

    pub fn variable(&self, name: &str) -> Option<&Rc<RefCell<Variable>>> {
        self.variables.get(name)
    }

    /// Create a variable if absent, returns the (possibly existing) variable
    pub fn attach_variable(&mut self, variable: Variable) -> Rc<RefCell<Variable>> {
        self.variables
            .entry(variable.name().to_string())
            .or_insert_with(|| Rc::new(RefCell::new(variable)))
            .clone()
    }

    pub fn camera(&self) -> Option<&CameraData> {
        match &self.kind {
            ObjectKind::Camera(camera) => Some(camera),
            _ => None,
        }
    }

    pub fn camera_mut(&mut self) -> Option<&mut CameraData> {
        match &mut self.kind {
            ObjectKind::Camera(camera) => Some(camera),
            _ => None,
        }
    }

    pub fn entity(&self) -> Option<&EntityData> {
        match &self.kind {
            ObjectKind::Entity(entity) => Some(entity),
            _ => None,
        }
    }

    pub fn entity_mut(&mut self) -> Option<&mut EntityData> {
        match &mut self.kind {
            ObjectKind::Entity(entity) => Some(entity),
            _ => None,
        }
    }

    pub fn light(&self) -> Option<&LightData> {
        match &self.kind {
            ObjectKind::Light(light) => Some(light),
            _ => None,
        }
    }

    pub fn light_mut(&mut self) -> Option<&mut LightData> {
        match &mut self.kind {
            ObjectKind::Light(light) => Some(light),
            _ => None,
        }
    }

    pub fn curve(&self) -> Option<&CurveData> {
        match &self.kind {
            ObjectKind::Curve(curve) => Some(curve),
            _ => None,
        }
    }

    pub fn skeleton(&self) -> Option<&SkeletonData> {
        match &self.kind {
            ObjectKind::Skeleton(skeleton) => Some(skeleton),
            _ => None,
        }
    }

    pub fn skeleton_mut(&mut self) -> Option<&mut SkeletonData> {
        match &mut self.kind {
            ObjectKind::Skeleton(skeleton) => Some(skeleton),
            _ => None,
        }
    }

    pub fn particles_mut(&mut self) -> Option<&mut ParticleData> {
        match &mut self.kind {
            ObjectKind::Particles(particles) => Some(particles),
            _ => None,
        }
    }

    pub fn particles(&self) -> Option<&ParticleData> {
        match &self.kind {
            ObjectKind::Particles(particles) => Some(particles),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_deep_copies_variables() {
        let mut original = GameObject::new("Cube", ObjectKind::new(ObjectType::Entity));
        original.attach_variable(Variable::new("hp", 10));
        original.instanced = true;

        let copy = original.duplicate("Cube.001");
        copy.variable("hp").unwrap().borrow_mut().set_value(3);

        assert_eq!(original.variable("hp").unwrap().borrow().as_int(), 10);
        assert!(!copy.instanced);
        assert_eq!(copy.object_type(), ObjectType::Entity);
    }

    #[test]
    fn test_attach_variable_keeps_existing() {
        let mut obj = GameObject::new("Empty", ObjectKind::Empty);
        obj.attach_variable(Variable::new("speed", 2.0f32));
        let var = obj.attach_variable(Variable::new("speed", 9.0f32));
        assert_eq!(var.borrow().as_real(), 2.0);
        assert_eq!(obj.variables.len(), 1);
    }

    #[test]
    fn test_camera_clip_floor() {
        let mut camera = CameraData::default();
        camera.set_clipping(0.0, 50.0);
        assert_eq!(camera.clip_start, MIN_CLIP_START);
        assert_eq!(camera.clip_end, 50.0);
    }

    #[test]
    fn test_type_names_roundtrip() {
        for ty in [
            ObjectType::Empty,
            ObjectType::Entity,
            ObjectType::Camera,
            ObjectType::Light,
            ObjectType::Curve,
            ObjectType::Skeleton,
            ObjectType::Particles,
        ] {
            assert_eq!(ObjectType::from_name(ty.name()), Some(ty));
        }
    }
}
