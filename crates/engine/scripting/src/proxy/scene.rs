use glam::Vec3;
use lumen_world::{Engine, EngineRef, ObjectKind, Ray, Scene, SceneId};
use tracing::debug;

use super::{CameraProxy, DebuggerProxy, EntityProxy, GameObjectProxy, InstanceTarget, ObjectProxy};

/// Proxy for a scene
#[derive(Clone)]
pub struct SceneProxy {
    engine: EngineRef,
    id: Option<SceneId>,
}

impl SceneProxy {
    pub fn new(engine: EngineRef, id: Option<SceneId>) -> Self {
        Self { engine, id }
    }

    pub fn id(&self) -> Option<SceneId> {
        self.id
    }

    pub fn is_null(&self) -> bool {
        self.read(true, |_, _| false)
    }

    fn read<R>(&self, default: R, f: impl FnOnce(&Engine, &Scene) -> R) -> R {
        let engine = self.engine.borrow();
        match self.id.and_then(|id| engine.scene(id)) {
            Some(scene) => f(&engine, scene),
            None => default,
        }
    }

    fn edit(&self, f: impl FnOnce(&mut Scene)) {
        let mut engine = self.engine.borrow_mut();
        if let Some(scene) = self.id.and_then(|id| engine.scene_mut(id)) {
            f(scene);
        }
    }

    fn object_proxy(&self, id: Option<lumen_world::ObjectId>) -> Option<GameObjectProxy> {
        id.map(|id| GameObjectProxy::new(self.engine.clone(), Some(id)))
    }

    pub fn as_object(&self) -> ObjectProxy {
        ObjectProxy::new(self.engine.clone(), self.id.map(InstanceTarget::Scene))
    }

    pub fn name(&self) -> String {
        self.read(String::new(), |_, s| s.name.clone())
    }

    pub fn is_instanced(&self) -> bool {
        self.read(false, |_, s| s.instanced)
    }

    pub fn create_instance(&self) {
        self.as_object().create_instance();
    }

    pub fn destroy_instance(&self) {
        self.as_object().destroy_instance();
    }

    pub fn reinstance(&self) {
        self.as_object().reinstance();
    }

    pub fn layer(&self) -> u32 {
        self.read(0, |_, s| s.layer)
    }

    pub fn set_layer(&self, layer: u32) {
        self.edit(|s| s.layer = layer);
    }

    pub fn has_object(&self, name: &str) -> bool {
        self.read(false, |_, s| s.has_object(name))
    }

    pub fn object(&self, name: &str) -> Option<GameObjectProxy> {
        let id = self.read(None, |_, s| s.object(name));
        self.object_proxy(id)
    }

    /// Create an empty object. Fails on a taken name.
    pub fn create_empty(&self, name: &str) -> Option<GameObjectProxy> {
        let id = self.id?;
        let created = self.engine.borrow_mut().create_object(id, name, ObjectKind::Empty);
        match created {
            Ok(object) => self.object_proxy(Some(object)),
            Err(e) => {
                debug!("create_empty({}) failed: {}", name, e);
                None
            }
        }
    }

    /// Create an entity with its own one-submesh mesh. Fails on a taken name.
    pub fn create_entity(&self, name: &str) -> Option<EntityProxy> {
        let id = self.id?;
        let created = self.engine.borrow_mut().create_entity(id, name);
        match created {
            Ok(object) => self.object_proxy(Some(object))?.as_entity(),
            Err(e) => {
                debug!("create_entity({}) failed: {}", name, e);
                None
            }
        }
    }

    /// Clone `source` into this scene
    ///
    /// `life_span` counts frames, 0 keeps the clone forever.
    pub fn clone_object(&self, source: &GameObjectProxy, life_span: u32, instantiate: bool) -> Option<GameObjectProxy> {
        let (scene, source) = (self.id?, source.id()?);
        let clone = self
            .engine
            .borrow_mut()
            .clone_object(scene, source, life_span, instantiate);
        self.object_proxy(clone)
    }

    pub fn dynamics_world(&self) -> DynamicsWorldProxy {
        DynamicsWorldProxy {
            scene: self.clone(),
        }
    }

    pub fn main_camera(&self) -> Option<CameraProxy> {
        let id = self.read(None, |e, s| s.main_camera.filter(|c| e.object(*c).is_some()));
        self.object_proxy(id)?.as_camera()
    }

    /// Ray from the main camera through window pixel (x, y); -1 uses the mouse
    pub fn pick_ray(&self, x: f32, y: f32) -> Option<Ray> {
        let id = self.id?;
        self.engine.borrow().pick_ray(id, x, y)
    }

    /// Instanced objects, rebuilt on every call
    pub fn object_list(&self) -> Vec<GameObjectProxy> {
        let Some(id) = self.id else {
            return Vec::new();
        };
        let ids = self.engine.borrow().instanced_objects(id);
        ids.into_iter()
            .filter_map(|id| self.object_proxy(Some(id)))
            .collect()
    }

    pub fn update_flags(&self) -> u32 {
        self.read(0, |_, s| s.update_flags)
    }

    pub fn set_update_flags(&self, flags: u32) {
        self.edit(|s| s.update_flags = flags);
    }

    pub fn debugger(&self) -> DebuggerProxy {
        DebuggerProxy::new(self.engine.clone(), self.id)
    }
}

/// Physics settings of a scene
#[derive(Clone)]
pub struct DynamicsWorldProxy {
    scene: SceneProxy,
}

impl DynamicsWorldProxy {
    pub fn gravity(&self) -> Vec3 {
        self.scene.read(Vec3::ZERO, |_, s| s.dynamics.gravity)
    }

    pub fn set_gravity(&self, gravity: Vec3) {
        self.scene.edit(|s| s.dynamics.gravity = gravity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_world::{step, ObjectType, PICK_RAY_LENGTH};

    fn setup() -> (EngineRef, SceneProxy) {
        let engine = Engine::new_ref();
        let id = {
            let mut e = engine.borrow_mut();
            e.initialize();
            e.create_scene("Main").unwrap()
        };
        (engine.clone(), SceneProxy::new(engine, Some(id)))
    }

    #[test]
    fn test_create_refuses_duplicates() {
        let (_engine, scene) = setup();
        assert!(scene.create_empty("A").is_some());
        assert!(scene.create_empty("A").is_none());
        assert!(scene.create_entity("A").is_none());

        let entity = scene.create_entity("Box").unwrap();
        let mesh = entity.mesh().unwrap();
        assert_eq!(mesh.name(), "mesh_Box");
        assert_eq!(mesh.sub_mesh_count(), 1);
        assert!(scene.has_object("Box"));
    }

    #[test]
    fn test_clone_life_span() {
        let (engine, scene) = setup();
        let bullet = scene.create_empty("Bullet").unwrap();
        bullet.attach_variable("damage", 3);

        let clone = scene.clone_object(&bullet, 2, true).unwrap();
        assert_eq!(clone.name(), "Bullet.001");
        assert!(clone.is_instanced());
        assert_eq!(clone.variable("damage").to_number(), 3.0);

        let forever = scene.clone_object(&bullet, 0, false).unwrap();
        step(&engine, 0.016);
        step(&engine, 0.016);
        assert!(clone.is_null());
        assert!(!forever.is_null());
    }

    #[test]
    fn test_object_list_is_fresh() {
        let (_engine, scene) = setup();
        let a = scene.create_empty("A").unwrap();
        scene.create_empty("B").unwrap();
        assert!(scene.object_list().is_empty());

        a.create_instance();
        let list = scene.object_list();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].name(), "A");

        scene.create_instance();
        assert_eq!(scene.object_list().len(), 2);
    }

    #[test]
    fn test_pick_ray_through_centre() {
        let (engine, scene) = setup();
        assert!(scene.pick_ray(10.0, 10.0).is_none());

        let cam = scene.create_empty("NotACamera").unwrap();
        assert!(cam.as_camera().is_none());
        let id = engine
            .borrow_mut()
            .create_object(scene.id().unwrap(), "Cam", ObjectKind::new(ObjectType::Camera))
            .unwrap();
        let camera = GameObjectProxy::new(engine.clone(), Some(id)).as_camera().unwrap();
        camera.set_position(Vec3::new(0.0, 0.0, 5.0));
        camera.make_current();
        assert!(scene.main_camera().is_some());

        let ray = scene.pick_ray(400.0, 300.0).unwrap();
        assert_eq!(ray.origin, Vec3::new(0.0, 0.0, 5.0));
        assert!((ray.direction - Vec3::new(0.0, 0.0, -PICK_RAY_LENGTH)).length() < 1e-2);
    }

    #[test]
    fn test_gravity_layer_flags() {
        let (_engine, scene) = setup();
        let world = scene.dynamics_world();
        assert_eq!(world.gravity(), Vec3::new(0.0, 0.0, -9.81));
        world.set_gravity(Vec3::ZERO);
        assert_eq!(world.gravity(), Vec3::ZERO);

        scene.set_layer(4);
        scene.set_update_flags(0);
        assert_eq!(scene.layer(), 4);
        assert_eq!(scene.update_flags(), 0);
    }

    #[test]
    fn test_dead_scene_defaults() {
        let (engine, scene) = setup();
        engine.borrow_mut().remove_scene(scene.id().unwrap());
        assert!(scene.is_null());
        assert_eq!(scene.name(), "");
        assert!(scene.create_empty("X").is_none());
        assert!(scene.object_list().is_empty());
    }
}
