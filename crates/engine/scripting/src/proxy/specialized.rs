//! Kind-specific proxies
//!
//! Each wraps a [`GameObjectProxy`] whose kind was checked at narrowing time
//! and derefs to it. The kind is re-checked on every access, so the
//! defaults apply if the object is destroyed afterwards.

use std::ops::Deref;

use glam::Vec3;
use lumen_world::object::{CameraData, Character, LightData, SkeletonData};
use lumen_world::transform::quat_from_euler_degrees;
use lumen_world::{Engine, EngineRef, GameObject, ObjectId, Transform};

use super::{GameObjectProxy, MeshProxy};

macro_rules! game_object_wrapper {
    ($($name:ident),* $(,)?) => {
        $(
            #[derive(Clone)]
            pub struct $name(pub(crate) GameObjectProxy);

            impl Deref for $name {
                type Target = GameObjectProxy;

                fn deref(&self) -> &GameObjectProxy {
                    &self.0
                }
            }

            impl AsRef<GameObjectProxy> for $name {
                fn as_ref(&self) -> &GameObjectProxy {
                    &self.0
                }
            }
        )*
    };
}

game_object_wrapper!(
    EntityProxy,
    CameraProxy,
    LightProxy,
    CurveProxy,
    SkeletonProxy,
    ParticlesProxy,
);

impl EntityProxy {
    /// The entity's mesh, if it has one
    pub fn mesh(&self) -> Option<MeshProxy> {
        let mesh = self.read(None, |e, o| {
            o.entity()
                .and_then(|entity| entity.mesh)
                .filter(|m| e.meshes.contains(*m))
        })?;
        Some(MeshProxy::new(self.engine.clone(), Some(mesh)))
    }

    pub fn material_name(&self) -> String {
        self.read(String::new(), |_, o| {
            o.entity()
                .and_then(|entity| entity.material_name.clone())
                .unwrap_or_default()
        })
    }

    pub fn set_material_name(&self, name: &str) {
        self.edit(|e, id| {
            if let Some(entity) = e.object_mut(id).and_then(GameObject::entity_mut) {
                entity.material_name = Some(name.to_string());
            }
        });
    }

    pub fn has_character(&self) -> bool {
        self.read(false, |_, o| o.physics.character.is_some())
    }

    pub fn character(&self) -> Option<CharacterProxy> {
        if !self.has_character() {
            return None;
        }
        Some(CharacterProxy {
            engine: self.engine.clone(),
            id: self.id,
        })
    }
}

impl CameraProxy {
    fn camera(&self) -> CameraData {
        self.read(CameraData::default(), |_, o| o.camera().copied().unwrap_or_default())
    }

    fn edit_camera(&self, f: impl FnOnce(&mut CameraData)) {
        self.edit(|e, id| {
            if let Some(camera) = e.object_mut(id).and_then(GameObject::camera_mut) {
                f(camera);
            }
        });
    }

    /// Set near and far clip distances; the near distance has a small floor
    pub fn set_clipping(&self, start: f32, end: f32) {
        self.edit_camera(|c| c.set_clipping(start, end));
    }

    pub fn clip_start(&self) -> f32 {
        self.camera().clip_start
    }

    pub fn clip_end(&self) -> f32 {
        self.camera().clip_end
    }

    /// Field of view in degrees
    pub fn set_fov(&self, fov: f32) {
        self.edit_camera(|c| c.fov = fov);
    }

    pub fn fov(&self) -> f32 {
        self.camera().fov
    }

    /// Make this the main camera of its scene
    pub fn make_current(&self) -> bool {
        self.edit(|e, id| match e.object(id).and_then(|o| o.scene) {
            Some(scene) => e.set_main_camera(scene, id),
            None => false,
        })
    }

    pub fn is_current(&self) -> bool {
        self.read(false, |e, o| {
            o.scene
                .and_then(|s| e.scene(s))
                .is_some_and(|s| s.main_camera == self.id)
        })
    }
}

impl LightProxy {
    fn light(&self) -> LightData {
        self.read(LightData::default(), |_, o| o.light().copied().unwrap_or_default())
    }

    fn edit_light(&self, f: impl FnOnce(&mut LightData)) {
        self.edit(|e, id| {
            if let Some(light) = e.object_mut(id).and_then(GameObject::light_mut) {
                f(light);
            }
        });
    }

    pub fn diffuse(&self) -> Vec3 {
        self.light().diffuse
    }

    pub fn set_diffuse(&self, color: Vec3) {
        self.edit_light(|l| l.diffuse = color);
    }

    pub fn power(&self) -> f32 {
        self.light().power
    }

    pub fn set_power(&self, power: f32) {
        self.edit_light(|l| l.power = power);
    }
}

impl CurveProxy {
    /// Number of points, -1 when the curve is gone
    pub fn point_count(&self) -> i32 {
        self.read(-1, |_, o| o.curve().map(|c| c.points.len() as i32).unwrap_or(-1))
    }

    pub fn is_cyclic(&self) -> bool {
        self.read(false, |_, o| o.curve().is_some_and(|c| c.cyclic))
    }

    /// Point in curve space, zero when out of range
    pub fn point(&self, index: usize) -> Vec3 {
        self.read(Vec3::ZERO, |_, o| {
            o.curve()
                .and_then(|c| c.points.get(index).copied())
                .unwrap_or(Vec3::ZERO)
        })
    }

    /// All points in world space
    pub fn world_points(&self) -> Vec<Vec3> {
        self.read(Vec::new(), |e, o| {
            let Some(world) = self.id.and_then(|id| e.world_transform(id)) else {
                return Vec::new();
            };
            o.curve()
                .map(|c| c.points.iter().map(|p| world.transform_point(*p)).collect())
                .unwrap_or_default()
        })
    }
}

impl SkeletonProxy {
    fn has_bone(&self, bone: &str) -> bool {
        self.read(false, |_, o| o.skeleton().is_some_and(|s| s.bones.contains_key(bone)))
    }

    fn missing_bone(&self, engine: &mut Engine, bone: &str) {
        let message = format!("Bone {} not found on {}", bone, self.name_in(engine));
        engine.debug_print(&message);
    }

    fn name_in(&self, engine: &Engine) -> String {
        self.id
            .and_then(|id| engine.object(id))
            .map(|o| o.name.clone())
            .unwrap_or_default()
    }

    pub fn bone_names(&self) -> Vec<String> {
        self.read(Vec::new(), |_, o| {
            o.skeleton()
                .map(|s: &SkeletonData| s.bones.keys().cloned().collect())
                .unwrap_or_default()
        })
    }

    /// Attach `object` to `bone` at the given offset (rotation in degrees)
    pub fn attach_object_to_bone(
        &self,
        bone: &str,
        object: &GameObjectProxy,
        position: Vec3,
        rotation: Vec3,
        scale: Vec3,
    ) -> bool {
        let local = Transform::new(position, quat_from_euler_degrees(rotation), scale);
        self.attach(bone, object, local, false)
    }

    /// Attach `object` to `bone` without moving it
    pub fn attach_object_to_bone_in_place(&self, bone: &str, object: &GameObjectProxy) -> bool {
        self.attach(bone, object, Transform::IDENTITY, true)
    }

    fn attach(&self, bone: &str, object: &GameObjectProxy, local: Transform, keep_world: bool) -> bool {
        let Some(child) = object.id else {
            return false;
        };
        self.edit(|e, id| {
            let attached = e.attach_to_bone(id, bone, child, local, keep_world);
            if !attached && !self.has_bone_in(e, id, bone) {
                self.missing_bone(e, bone);
            }
            attached
        })
    }

    fn has_bone_in(&self, engine: &Engine, id: ObjectId, bone: &str) -> bool {
        engine
            .object(id)
            .and_then(GameObject::skeleton)
            .is_some_and(|s| s.bones.contains_key(bone))
    }

    pub fn set_bone_manual(&self, bone: &str, manual: bool) {
        self.edit(|e, id| {
            match e
                .object_mut(id)
                .and_then(GameObject::skeleton_mut)
                .and_then(|s| s.bones.get_mut(bone))
            {
                Some(b) => b.manual = manual,
                None => self.missing_bone(e, bone),
            }
        });
    }

    pub fn is_bone_manual(&self, bone: &str) -> bool {
        self.read(false, |_, o| {
            o.skeleton()
                .and_then(|s| s.bones.get(bone))
                .is_some_and(|b| b.manual)
        })
    }

    /// Pose `bone` relative to its bind pose
    ///
    /// With `weight` below 1 the new pose is blended with the current one.
    pub fn apply_bone_channel_transform(
        &self,
        bone: &str,
        position: Vec3,
        rotation: Vec3,
        scale: Vec3,
        weight: f32,
    ) -> bool {
        let pose = Transform::new(position, quat_from_euler_degrees(rotation), scale);
        self.edit(|e, id| {
            let applied = e.apply_bone_channel(id, bone, pose, weight);
            if !applied {
                self.missing_bone(e, bone);
            }
            applied
        })
    }

    /// Current pose of `bone` relative to its bind pose
    pub fn bone_pose(&self, bone: &str) -> Option<Transform> {
        if !self.has_bone(bone) {
            return None;
        }
        self.read(None, |_, o| o.skeleton().and_then(|s| s.bones.get(bone)).map(|b| b.pose))
    }
}

impl ParticlesProxy {
    pub fn is_emitting(&self) -> bool {
        self.read(false, |_, o| o.particles().is_some_and(|p| p.emitting))
    }

    pub fn set_emitting(&self, emitting: bool) {
        self.edit(|e, id| {
            if let Some(particles) = e.object_mut(id).and_then(GameObject::particles_mut) {
                particles.emitting = emitting;
            }
        });
    }
}

/// Character controller of an entity
#[derive(Clone)]
pub struct CharacterProxy {
    engine: EngineRef,
    id: Option<ObjectId>,
}

impl CharacterProxy {
    fn character(&self) -> Character {
        let engine = self.engine.borrow();
        self.id
            .and_then(|id| engine.object(id))
            .and_then(|o| o.physics.character)
            .unwrap_or_default()
    }

    fn edit_character(&self, f: impl FnOnce(&mut Character)) {
        let mut engine = self.engine.borrow_mut();
        if let Some(character) = self
            .id
            .and_then(|id| engine.object_mut(id))
            .and_then(|o| o.physics.character.as_mut())
        {
            f(character);
        }
    }

    pub fn walk_direction(&self) -> Vec3 {
        self.character().walk_direction
    }

    pub fn set_walk_direction(&self, direction: Vec3) {
        self.edit_character(|c| c.walk_direction = direction);
    }

    pub fn jump_speed(&self) -> f32 {
        self.character().jump_speed
    }

    pub fn set_jump_speed(&self, speed: f32) {
        self.edit_character(|c| c.jump_speed = speed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;
    use lumen_world::object::{Bone, MIN_CLIP_START};
    use lumen_world::{Engine, ObjectKind, ObjectType, SceneId};

    fn setup() -> (EngineRef, SceneId) {
        let engine = Engine::new_ref();
        let scene = {
            let mut e = engine.borrow_mut();
            e.initialize();
            e.create_scene("Main").unwrap()
        };
        (engine, scene)
    }

    fn spawn(engine: &EngineRef, scene: SceneId, name: &str, kind: ObjectKind) -> GameObjectProxy {
        let id = engine.borrow_mut().create_object(scene, name, kind).unwrap();
        GameObjectProxy::new(engine.clone(), Some(id))
    }

    #[test]
    fn test_camera_clipping_floor_and_current() {
        let (engine, scene) = setup();
        let camera = spawn(&engine, scene, "Cam", ObjectKind::new(ObjectType::Camera))
            .as_camera()
            .unwrap();

        camera.set_clipping(0.0, 500.0);
        assert_eq!(camera.clip_start(), MIN_CLIP_START);
        assert_eq!(camera.clip_end(), 500.0);
        camera.set_fov(60.0);
        assert_eq!(camera.fov(), 60.0);

        assert!(!camera.is_current());
        assert!(camera.make_current());
        assert!(camera.is_current());
    }

    #[test]
    fn test_curve_defaults() {
        let (engine, scene) = setup();
        let mut kind = ObjectKind::new(ObjectType::Curve);
        if let ObjectKind::Curve(curve) = &mut kind {
            curve.points = vec![Vec3::ZERO, Vec3::X];
            curve.cyclic = true;
        }
        let curve = spawn(&engine, scene, "Path", kind).as_curve().unwrap();
        curve.set_position(Vec3::new(0.0, 0.0, 2.0));

        assert_eq!(curve.point_count(), 2);
        assert!(curve.is_cyclic());
        assert_eq!(curve.point(1), Vec3::X);
        assert_eq!(curve.point(9), Vec3::ZERO);
        assert_eq!(curve.world_points()[1], Vec3::new(1.0, 0.0, 2.0));

        engine.borrow_mut().destroy_object(curve.id().unwrap());
        assert_eq!(curve.point_count(), -1);
    }

    #[test]
    fn test_entity_character_and_material() {
        let (engine, scene) = setup();
        let id = engine.borrow_mut().create_entity(scene, "Player").unwrap();
        let entity = GameObjectProxy::new(engine.clone(), Some(id)).as_entity().unwrap();

        assert_eq!(entity.mesh().map(|m| m.name()), Some("mesh_Player".to_string()));
        entity.set_material_name("Skin");
        assert_eq!(entity.material_name(), "Skin");
        assert!(entity.character().is_none());

        engine.borrow_mut().object_mut(id).unwrap().physics.character = Some(Character::default());
        let character = entity.character().unwrap();
        character.set_jump_speed(4.0);
        character.set_walk_direction(Vec3::Y);
        assert_eq!(character.jump_speed(), 4.0);
        assert_eq!(character.walk_direction(), Vec3::Y);
    }

    #[test]
    fn test_light_and_particles() {
        let (engine, scene) = setup();
        let light = spawn(&engine, scene, "Lamp", ObjectKind::new(ObjectType::Light))
            .as_light()
            .unwrap();
        light.set_diffuse(Vec3::new(1.0, 0.5, 0.0));
        light.set_power(3.0);
        assert_eq!(light.diffuse(), Vec3::new(1.0, 0.5, 0.0));
        assert_eq!(light.power(), 3.0);

        let particles = spawn(&engine, scene, "Smoke", ObjectKind::new(ObjectType::Particles))
            .as_particles()
            .unwrap();
        assert!(particles.is_emitting());
        particles.set_emitting(false);
        assert!(!particles.is_emitting());
    }

    #[test]
    fn test_skeleton_bones() {
        let (engine, scene) = setup();
        let mut kind = ObjectKind::new(ObjectType::Skeleton);
        if let ObjectKind::Skeleton(skeleton) = &mut kind {
            skeleton.bones.insert(
                "hand".into(),
                Bone::new(Transform::from_position(Vec3::new(0.0, 1.0, 0.0))),
            );
        }
        let skeleton = spawn(&engine, scene, "Rig", kind).as_skeleton().unwrap();
        let sword = spawn(&engine, scene, "Sword", ObjectKind::Empty);
        sword.set_position(Vec3::new(3.0, 0.0, 0.0));

        assert!(skeleton.attach_object_to_bone_in_place("hand", &sword));
        assert!((sword.world_position() - Vec3::new(3.0, 0.0, 0.0)).length() < 1e-4);
        assert_eq!(sword.parent().id(), skeleton.id());

        assert!(skeleton.attach_object_to_bone("hand", &sword, Vec3::X, Vec3::ZERO, Vec3::ONE));
        assert!((sword.world_position() - Vec3::new(1.0, 1.0, 0.0)).length() < 1e-4);

        assert!(!skeleton.attach_object_to_bone("foot", &sword, Vec3::X, Vec3::ZERO, Vec3::ONE));
        assert_eq!(engine.borrow().debug_screen.lines().len(), 1);

        skeleton.set_bone_manual("hand", true);
        assert!(skeleton.is_bone_manual("hand"));

        assert!(skeleton.apply_bone_channel_transform("hand", Vec3::Z, Vec3::ZERO, Vec3::ONE, 1.0));
        assert!(skeleton.apply_bone_channel_transform("hand", Vec3::ZERO, Vec3::ZERO, Vec3::ONE, 0.5));
        let pose = skeleton.bone_pose("hand").unwrap();
        assert!((pose.position - Vec3::new(0.0, 0.0, 0.5)).length() < 1e-4);
        assert!(pose.orientation.abs_diff_eq(Quat::IDENTITY, 1e-5));
        assert_eq!(skeleton.bone_names(), vec!["hand".to_string()]);
    }
}
