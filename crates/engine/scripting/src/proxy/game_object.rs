use glam::{Quat, Vec3};
use lumen_world::transform::{euler_degrees, quat_from_euler_degrees};
use lumen_world::{Engine, EngineRef, GameObject, ObjectId, ObjectType, Transform, TransformSpace, VarValue, Variable};

use super::{
    CameraProxy, CurveProxy, EntityProxy, GroupInstanceProxy, InstanceTarget, LightProxy,
    ObjectProxy, ParticlesProxy, SceneProxy, SkeletonProxy,
};
use crate::property::Property;
use crate::value::Value;

/// Proxy for a game object of any kind
#[derive(Clone)]
pub struct GameObjectProxy {
    pub(crate) engine: EngineRef,
    pub(crate) id: Option<ObjectId>,
}

impl GameObjectProxy {
    pub fn new(engine: EngineRef, id: Option<ObjectId>) -> Self {
        Self { engine, id }
    }

    pub fn id(&self) -> Option<ObjectId> {
        self.id
    }

    pub fn engine(&self) -> &EngineRef {
        &self.engine
    }

    pub fn is_null(&self) -> bool {
        self.read(true, |_, _| false)
    }

    /// Read from the live object, or return `default`
    pub(crate) fn read<R>(&self, default: R, f: impl FnOnce(&Engine, &GameObject) -> R) -> R {
        let engine = self.engine.borrow();
        match self.id.and_then(|id| engine.object(id)) {
            Some(object) => f(&engine, object),
            None => default,
        }
    }

    /// Run an engine edit if the object is alive
    pub(crate) fn edit<R: Default>(&self, f: impl FnOnce(&mut Engine, ObjectId) -> R) -> R {
        let mut engine = self.engine.borrow_mut();
        match self.id.filter(|id| engine.objects.contains(*id)) {
            Some(id) => f(&mut engine, id),
            None => R::default(),
        }
    }

    fn edit_object(&self, f: impl FnOnce(&mut GameObject)) {
        self.edit(|engine, id| {
            if let Some(object) = engine.object_mut(id) {
                f(object);
            }
        })
    }

    fn world(&self) -> Transform {
        let engine = self.engine.borrow();
        self.id
            .and_then(|id| engine.world_transform(id))
            .unwrap_or(Transform::IDENTITY)
    }

    pub fn as_object(&self) -> ObjectProxy {
        ObjectProxy::new(self.engine.clone(), self.id.map(InstanceTarget::Object))
    }

    pub fn name(&self) -> String {
        self.read(String::new(), |_, o| o.name.clone())
    }

    pub fn object_type(&self) -> Option<ObjectType> {
        self.read(None, |_, o| Some(o.object_type()))
    }

    pub fn is_instanced(&self) -> bool {
        self.read(false, |_, o| o.instanced)
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

    // Transform

    pub fn position(&self) -> Vec3 {
        self.read(Vec3::ZERO, |_, o| o.transform.position)
    }

    pub fn world_position(&self) -> Vec3 {
        self.world().position
    }

    /// Local rotation as euler angles in degrees
    pub fn rotation(&self) -> Vec3 {
        euler_degrees(self.orientation())
    }

    pub fn world_rotation(&self) -> Vec3 {
        euler_degrees(self.world_orientation())
    }

    pub fn orientation(&self) -> Quat {
        self.read(Quat::IDENTITY, |_, o| o.transform.orientation)
    }

    pub fn world_orientation(&self) -> Quat {
        self.world().orientation
    }

    pub fn scale(&self) -> Vec3 {
        self.read(Vec3::ONE, |_, o| o.transform.scale)
    }

    pub fn world_scale(&self) -> Vec3 {
        self.world().scale
    }

    pub fn set_position(&self, position: Vec3) {
        self.edit_object(|o| o.transform.position = position);
    }

    pub fn set_rotation(&self, euler: Vec3) {
        self.set_orientation(quat_from_euler_degrees(euler));
    }

    pub fn set_orientation(&self, orientation: Quat) {
        self.edit_object(|o| o.transform.orientation = orientation.normalize());
    }

    pub fn set_scale(&self, scale: Vec3) {
        self.edit_object(|o| o.transform.scale = scale);
    }

    pub fn linear_velocity(&self) -> Vec3 {
        self.read(Vec3::ZERO, |_, o| o.linear_velocity)
    }

    pub fn angular_velocity(&self) -> Vec3 {
        self.read(Vec3::ZERO, |_, o| o.angular_velocity)
    }

    pub fn set_linear_velocity(&self, velocity: Vec3, space: TransformSpace) {
        self.edit(|e, id| e.set_linear_velocity(id, velocity, space));
    }

    pub fn set_angular_velocity(&self, velocity: Vec3, space: TransformSpace) {
        self.edit(|e, id| e.set_angular_velocity(id, velocity, space));
    }

    /// Rotate by euler angles in degrees
    pub fn rotate(&self, euler: Vec3, space: TransformSpace) {
        self.rotate_quat(quat_from_euler_degrees(euler), space);
    }

    pub fn rotate_quat(&self, rotation: Quat, space: TransformSpace) {
        self.edit(|e, id| e.rotate(id, rotation, space));
    }

    pub fn translate(&self, delta: Vec3, space: TransformSpace) {
        self.edit(|e, id| e.translate(id, delta, space));
    }

    /// Multiply the local scale component-wise
    pub fn scale_by(&self, factor: Vec3) {
        self.edit_object(|o| o.transform.scale *= factor);
    }

    /// Rotate about Z by `degrees`
    pub fn yaw(&self, degrees: f32, space: TransformSpace) {
        self.edit(|e, id| e.rotate_axis(id, Vec3::Z, degrees, space));
    }

    /// Rotate about X by `degrees`
    pub fn pitch(&self, degrees: f32, space: TransformSpace) {
        self.edit(|e, id| e.rotate_axis(id, Vec3::X, degrees, space));
    }

    /// Rotate about Y by `degrees`
    pub fn roll(&self, degrees: f32, space: TransformSpace) {
        self.edit(|e, id| e.rotate_axis(id, Vec3::Y, degrees, space));
    }

    pub fn look_at(&self, target: Vec3) {
        self.edit(|e, id| e.look_at(id, target));
    }

    pub fn look_at_object(&self, target: &GameObjectProxy) {
        if target.is_null() {
            return;
        }
        self.look_at(target.world_position());
    }

    // Variables

    /// Reference to a variable of this object, null if there is none
    pub fn variable(&self, name: &str) -> Property {
        self.read(Property::null(), |_, o| {
            o.variable(name).map(Property::reference).unwrap_or_default()
        })
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.read(false, |_, o| o.variable(name).is_some())
    }

    /// Overwrite an existing variable. Returns false if there is none.
    pub fn set_variable(&self, name: &str, value: &Value) -> bool {
        let property = self.variable(name);
        match value.to_var_value() {
            Some(value) if !property.is_null() => {
                property.assign(value);
                true
            }
            _ => false,
        }
    }

    /// Get or create a variable and return a reference to it
    pub fn attach_variable(&self, name: &str, value: impl Into<VarValue>) -> Property {
        let mut engine = self.engine.borrow_mut();
        match self.id.and_then(|id| engine.object_mut(id)) {
            Some(object) if !name.is_empty() => {
                Property::reference(&object.attach_variable(Variable::new(name, value)))
            }
            _ => Property::null(),
        }
    }

    /// Names of this object's variables in creation order
    pub fn variable_names(&self) -> Vec<String> {
        self.read(Vec::new(), |_, o| o.variables.keys().cloned().collect())
    }

    // Scene and state

    pub fn scene(&self) -> SceneProxy {
        let scene = self.read(None, |_, o| o.scene);
        SceneProxy::new(self.engine.clone(), scene)
    }

    pub fn state(&self) -> i32 {
        self.read(0, |_, o| o.state)
    }

    pub fn change_state(&self, state: i32) {
        self.edit_object(|o| o.state = state);
    }

    // Parent graph

    pub fn has_parent(&self) -> bool {
        self.read(false, |e, o| o.parent.is_some_and(|p| e.object(p).is_some()))
    }

    /// Parent proxy, null when unparented
    pub fn parent(&self) -> GameObjectProxy {
        let parent = self.read(None, |_, o| o.parent);
        GameObjectProxy::new(self.engine.clone(), parent)
    }

    /// Parent under `parent`, keeping the local transform
    pub fn set_parent(&self, parent: &GameObjectProxy) -> bool {
        self.reparent(parent, false)
    }

    /// Parent under `parent`, keeping the world transform
    pub fn set_parent_in_place(&self, parent: &GameObjectProxy) -> bool {
        self.reparent(parent, true)
    }

    fn reparent(&self, parent: &GameObjectProxy, keep_world: bool) -> bool {
        match parent.id {
            Some(parent) => self.edit(|e, id| e.set_parent(id, parent, keep_world)),
            None => false,
        }
    }

    pub fn clear_parent(&self) {
        self.edit(|e, id| e.clear_parent(id, false));
    }

    pub fn clear_parent_in_place(&self) {
        self.edit(|e, id| e.clear_parent(id, true));
    }

    pub fn add_child(&self, child: &GameObjectProxy) -> bool {
        child.set_parent(self)
    }

    /// Detach `child` if it is one of ours
    pub fn remove_child(&self, child: &GameObjectProxy) -> bool {
        let Some(child_id) = child.id else {
            return false;
        };
        self.edit(|e, id| {
            let is_child = e.object(child_id).is_some_and(|c| c.parent == Some(id));
            if is_child {
                e.clear_parent(child_id, false);
            }
            is_child
        })
    }

    pub fn child_count(&self) -> usize {
        self.read(0, |_, o| o.children.len())
    }

    pub fn child_at(&self, index: usize) -> Option<GameObjectProxy> {
        let child = self.read(None, |_, o| o.children.get(index).copied())?;
        Some(GameObjectProxy::new(self.engine.clone(), Some(child)))
    }

    pub fn child_by_name(&self, name: &str) -> Option<GameObjectProxy> {
        let child = self.read(None, |e, o| {
            o.children
                .iter()
                .copied()
                .find(|c| e.object(*c).is_some_and(|c| c.name == name))
        })?;
        Some(GameObjectProxy::new(self.engine.clone(), Some(child)))
    }

    // Contacts

    pub fn enable_contacts(&self, enable: bool) {
        self.edit_object(|o| {
            o.physics.contacts_enabled = enable;
            if !enable {
                o.physics.contacts.clear();
            }
        });
    }

    pub fn has_contacts(&self) -> bool {
        self.read(false, |_, o| !o.physics.contacts.is_empty())
    }

    pub fn has_contact(&self, name: &str) -> bool {
        self.read(false, |_, o| o.physics.has_contact(name))
    }

    // Animation

    pub fn play_animation(&self, name: &str, blend: f32, restart: bool) -> bool {
        self.edit(|e, id| e.play_animation(id, name, blend, restart))
    }

    pub fn animation_time(&self, name: &str) -> f32 {
        self.read(0.0, |_, o| o.animations.get(name).map(|p| p.time).unwrap_or(0.0))
    }

    // Groups

    pub fn is_group_instance(&self) -> bool {
        self.read(false, |e, o| {
            o.group_instance
                .is_some_and(|gi| e.group_instances.contains(gi))
        })
    }

    pub fn group_instance(&self) -> Option<GroupInstanceProxy> {
        let id = self.read(None, |e, o| {
            o.group_instance.filter(|gi| e.group_instances.contains(*gi))
        })?;
        Some(GroupInstanceProxy::new(self.engine.clone(), Some(id)))
    }

    // Narrowing

    fn narrow<T>(&self, expected: ObjectType, wrap: impl FnOnce(GameObjectProxy) -> T) -> Option<T> {
        (self.object_type()? == expected).then(|| wrap(self.clone()))
    }

    pub fn as_entity(&self) -> Option<EntityProxy> {
        self.narrow(ObjectType::Entity, EntityProxy)
    }

    pub fn as_camera(&self) -> Option<CameraProxy> {
        self.narrow(ObjectType::Camera, CameraProxy)
    }

    pub fn as_light(&self) -> Option<LightProxy> {
        self.narrow(ObjectType::Light, LightProxy)
    }

    pub fn as_curve(&self) -> Option<CurveProxy> {
        self.narrow(ObjectType::Curve, CurveProxy)
    }

    pub fn as_skeleton(&self) -> Option<SkeletonProxy> {
        self.narrow(ObjectType::Skeleton, SkeletonProxy)
    }

    pub fn as_particles(&self) -> Option<ParticlesProxy> {
        self.narrow(ObjectType::Particles, ParticlesProxy)
    }
}

impl AsRef<GameObjectProxy> for GameObjectProxy {
    fn as_ref(&self) -> &GameObjectProxy {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_world::animation::AnimationClip;
    use lumen_world::{Engine, ObjectKind, SceneId};

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-3
    }

    fn setup() -> (EngineRef, SceneId) {
        let engine = Engine::new_ref();
        let scene = {
            let mut e = engine.borrow_mut();
            e.initialize();
            e.create_scene("Main").unwrap()
        };
        (engine, scene)
    }

    fn spawn(engine: &EngineRef, scene: SceneId, name: &str, object_type: ObjectType) -> GameObjectProxy {
        let id = engine
            .borrow_mut()
            .create_object(scene, name, ObjectKind::new(object_type))
            .unwrap();
        GameObjectProxy::new(engine.clone(), Some(id))
    }

    #[test]
    fn test_transform_accessors() {
        let (engine, scene) = setup();
        let obj = spawn(&engine, scene, "Cube", ObjectType::Empty);

        obj.set_position(Vec3::new(1.0, 2.0, 3.0));
        obj.set_rotation(Vec3::new(0.0, 0.0, 90.0));
        obj.scale_by(Vec3::splat(2.0));
        assert_eq!(obj.position(), Vec3::new(1.0, 2.0, 3.0));
        assert!(approx(obj.rotation(), Vec3::new(0.0, 0.0, 90.0)));
        assert_eq!(obj.scale(), Vec3::splat(2.0));

        obj.translate(Vec3::X, TransformSpace::Local);
        assert!(approx(obj.position(), Vec3::new(1.0, 3.0, 3.0)));
    }

    #[test]
    fn test_yaw_pitch_roll_axes() {
        let (engine, scene) = setup();
        let obj = spawn(&engine, scene, "Spinner", ObjectType::Empty);

        obj.yaw(90.0, TransformSpace::Parent);
        assert!(approx(obj.orientation() * Vec3::X, Vec3::Y));

        obj.set_orientation(Quat::IDENTITY);
        obj.pitch(90.0, TransformSpace::Parent);
        assert!(approx(obj.orientation() * Vec3::Y, Vec3::Z));

        obj.set_orientation(Quat::IDENTITY);
        obj.roll(90.0, TransformSpace::Parent);
        assert!(approx(obj.orientation() * Vec3::Z, Vec3::X));
    }

    #[test]
    fn test_look_at_points_minus_z() {
        let (engine, scene) = setup();
        let obj = spawn(&engine, scene, "Eye", ObjectType::Empty);
        let target = spawn(&engine, scene, "Target", ObjectType::Empty);
        target.set_position(Vec3::new(0.0, 10.0, 0.0));

        obj.look_at_object(&target);
        assert!(approx(obj.world_orientation() * -Vec3::Z, Vec3::Y));

        let before = obj.orientation();
        obj.look_at(Vec3::new(0.0, 0.0, 5.0));
        assert_eq!(obj.orientation(), before);
    }

    #[test]
    fn test_variables() {
        let (engine, scene) = setup();
        let obj = spawn(&engine, scene, "Hero", ObjectType::Empty);

        assert!(obj.variable("hp").is_null());
        assert!(!obj.set_variable("hp", &Value::from(5)));

        let hp = obj.attach_variable("hp", 10);
        assert_eq!(hp.to_number(), 10.0);
        // Attaching again keeps the existing value
        assert_eq!(obj.attach_variable("hp", 99).to_number(), 10.0);

        assert!(obj.set_variable("hp", &Value::from(4)));
        assert_eq!(hp.to_number(), 4.0);
        assert_eq!(obj.variable_names(), vec!["hp".to_string()]);

        engine.borrow_mut().destroy_object(obj.id().unwrap());
        assert!(hp.is_null());
    }

    #[test]
    fn test_parent_graph() {
        let (engine, scene) = setup();
        let a = spawn(&engine, scene, "A", ObjectType::Empty);
        let b = spawn(&engine, scene, "B", ObjectType::Empty);
        let c = spawn(&engine, scene, "C", ObjectType::Empty);

        assert!(!a.set_parent(&a));
        assert!(a.add_child(&b));
        assert!(a.add_child(&b));
        assert_eq!(a.child_count(), 1);
        assert!(b.add_child(&c));
        assert!(!c.add_child(&a));

        assert!(c.set_parent(&a));
        assert_eq!(b.child_count(), 0);
        assert_eq!(a.child_count(), 2);
        assert_eq!(a.child_by_name("C").and_then(|c| c.id()), c.id());
        assert_eq!(a.child_at(0).and_then(|c| c.id()), b.id());
        assert!(a.child_at(5).is_none());

        assert!(!b.remove_child(&c));
        assert!(a.remove_child(&c));
        assert!(!c.has_parent());
        assert!(c.parent().is_null());
    }

    #[test]
    fn test_set_parent_in_place_keeps_world() {
        let (engine, scene) = setup();
        let parent = spawn(&engine, scene, "Parent", ObjectType::Empty);
        let child = spawn(&engine, scene, "Child", ObjectType::Empty);
        parent.set_position(Vec3::new(5.0, 0.0, 0.0));
        child.set_position(Vec3::new(1.0, 0.0, 0.0));

        child.set_parent_in_place(&parent);
        assert!(approx(child.world_position(), Vec3::new(1.0, 0.0, 0.0)));
        child.clear_parent();
        assert!(approx(child.world_position(), Vec3::new(-4.0, 0.0, 0.0)));
    }

    #[test]
    fn test_play_animation_instanced_only() {
        let (engine, scene) = setup();
        let obj = spawn(&engine, scene, "Walker", ObjectType::Empty);
        engine.borrow_mut().add_animation(AnimationClip::new("Walk", 1.0));

        assert!(!obj.play_animation("Walk", 0.0, true));
        obj.create_instance();
        assert!(obj.play_animation("Walk", 0.0, true));
        assert!(!obj.play_animation("Missing", 0.0, true));
        assert!(!engine.borrow().debug_screen.lines().is_empty());
    }

    #[test]
    fn test_narrowing_checks_kind() {
        let (engine, scene) = setup();
        let light = spawn(&engine, scene, "Lamp", ObjectType::Light);
        assert!(light.as_light().is_some());
        assert!(light.as_camera().is_none());
        assert!(light.as_entity().is_none());

        let null = GameObjectProxy::new(engine, None);
        assert!(null.as_light().is_none());
        assert_eq!(null.position(), Vec3::ZERO);
        assert_eq!(null.name(), "");
    }
}
