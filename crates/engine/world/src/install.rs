//! Spawning objects from templates: package installation, cloning, copying
//! between scenes and group instances.

use tracing::{debug, info, warn};

use crate::engine::{Engine, InstanceAction};
use crate::error::{Error, Result};
use crate::group::{GroupInstance, GroupInstanceId};
use crate::object::{Character, GameObject, ObjectId, ObjectKind, ObjectType};
use crate::package::{InstalledPackage, ObjectDesc, PackageDesc};
use crate::scene::SceneId;
use crate::transform::Transform;
use crate::variable::Variable;

impl Engine {
    /// Build a game object from a template (parent links are not resolved)
    pub fn spawn(&mut self, scene: SceneId, desc: &ObjectDesc) -> Result<ObjectId> {
        let mut kind = ObjectKind::new(desc.object_type);
        match &mut kind {
            ObjectKind::Entity(entity) => {
                entity.mesh = desc.mesh.as_deref().and_then(|m| self.mesh_by_name(m));
                entity.material_name = desc.material.clone();
            }
            ObjectKind::Camera(camera) => {
                if let Some(data) = desc.camera {
                    *camera = data;
                    camera.set_clipping(data.clip_start, data.clip_end);
                }
            }
            ObjectKind::Light(light) => {
                if let Some(data) = desc.light {
                    *light = data;
                }
            }
            ObjectKind::Curve(curve) => {
                if let Some(data) = &desc.curve {
                    *curve = data.clone();
                }
            }
            ObjectKind::Skeleton(skeleton) => {
                for (name, bind) in &desc.bones {
                    skeleton.bones.insert(name.clone(), crate::object::Bone::new(*bind));
                }
            }
            ObjectKind::Particles(particles) => {
                if let Some(emitting) = desc.emitting {
                    particles.emitting = emitting;
                }
            }
            ObjectKind::Empty => {}
        }

        let id = self.create_object(scene, &desc.name, kind)?;
        if let Some(object) = self.objects.get_mut(id) {
            object.transform = desc.transform;
            object.state = desc.state;
            object.physics.contacts_enabled = desc.contacts;
            if desc.character {
                object.physics.character = Some(Character::default());
            }
            for (name, value) in &desc.variables {
                object.attach_variable(Variable::new(name.clone(), value.clone()));
            }
        }
        Ok(id)
    }

    /// Spawn a list of templates and link parents by name
    fn spawn_all(&mut self, scene: SceneId, descs: &[ObjectDesc]) -> Vec<(String, ObjectId)> {
        let mut spawned = Vec::new();
        for desc in descs {
            match self.spawn(scene, desc) {
                Ok(id) => spawned.push((desc.name.clone(), id)),
                Err(e) => warn!("Skipping object {}: {}", desc.name, e),
            }
        }
        for desc in descs {
            let Some(parent_name) = &desc.parent else {
                continue;
            };
            let child = spawned.iter().find(|(n, _)| *n == desc.name).map(|(_, id)| *id);
            let parent = spawned.iter().find(|(n, _)| n == parent_name).map(|(_, id)| *id);
            match (child, parent) {
                (Some(child), Some(parent)) => {
                    self.set_parent(child, parent, false);
                }
                _ => debug!("Parent {} of {} not found", parent_name, desc.name),
            }
        }
        spawned
    }

    /// Install a package's resources and its main scene
    ///
    /// Installing a package that is already installed returns its scene.
    pub fn install_package(&mut self, desc: &PackageDesc) -> Result<SceneId> {
        if let Some(installed) = self.packages.get(&desc.name) {
            if self.scenes.contains(installed.scene) {
                debug!("Package {} already installed", desc.name);
                return Ok(installed.scene);
            }
        }
        let scene_desc = desc
            .main_scene()
            .ok_or_else(|| Error::EmptyPackage(desc.name.clone()))?;

        let mut record = InstalledPackage {
            name: desc.name.clone(),
            scene: self.create_scene(&scene_desc.name)?,
            meshes: Vec::new(),
            groups: Vec::new(),
            animations: Vec::new(),
            materials: Vec::new(),
            huds: Vec::new(),
            scripts: Vec::new(),
        };

        for mesh in &desc.meshes {
            if self.mesh_by_name(&mesh.name).is_none() {
                record.meshes.push(mesh.name.clone());
                self.register_mesh(mesh.clone());
            }
        }
        for group in &desc.groups {
            if !self.groups.contains_key(&group.name) {
                record.groups.push(group.name.clone());
                self.groups.insert(group.name.clone(), group.clone());
            }
        }
        for clip in &desc.animations {
            if !self.animations.contains_key(&clip.name) {
                record.animations.push(clip.name.clone());
                self.add_animation(clip.clone());
            }
        }
        for material in &desc.materials {
            if !self.materials.contains_key(&material.name) {
                record.materials.push(material.name.clone());
                self.materials.insert(material.name.clone(), material.clone());
            }
        }
        for hud in &desc.huds {
            if !self.huds.contains_key(&hud.name) {
                record.huds.push(hud.name.clone());
                self.huds.insert(hud.name.clone(), hud.clone());
            }
        }
        for (name, source) in &desc.scripts {
            if !self.scripts.contains_key(name) {
                record.scripts.push(name.clone());
                self.scripts.insert(name.clone(), source.clone());
            }
        }

        let scene_id = record.scene;
        let spawned = self.spawn_all(scene_id, &scene_desc.objects);
        if let Some(scene) = self.scenes.get_mut(scene_id) {
            scene.layer = scene_desc.layer;
            scene.package = Some(desc.name.clone());
            if let Some(gravity) = scene_desc.gravity {
                scene.dynamics.gravity = gravity;
            }
            scene.main_camera = scene_desc
                .camera
                .as_ref()
                .and_then(|name| scene.objects.get(name).copied());
        }
        if self.scene(scene_id).is_some_and(|s| s.main_camera.is_none()) {
            let camera = spawned
                .iter()
                .map(|(_, id)| *id)
                .find(|id| self.object(*id).is_some_and(|o| o.object_type() == ObjectType::Camera));
            if let Some(scene) = self.scenes.get_mut(scene_id) {
                scene.main_camera = camera;
            }
        }

        info!(
            "Installed package {} (scene {}, {} objects)",
            desc.name,
            scene_desc.name,
            spawned.len()
        );
        self.packages.insert(desc.name.clone(), record);
        Ok(scene_id)
    }

    pub fn installed_package(&self, name: &str) -> Option<&InstalledPackage> {
        self.packages.get(name)
    }

    pub fn installed_package_names(&self) -> Vec<String> {
        self.packages.keys().cloned().collect()
    }

    /// Remove a package's scene and the resources it added
    pub fn unload_package(&mut self, name: &str) -> bool {
        let Some(record) = self.packages.shift_remove(name) else {
            return false;
        };
        self.remove_scene(record.scene);
        for mesh in &record.meshes {
            self.remove_mesh(mesh);
        }
        for group in &record.groups {
            self.groups.shift_remove(group);
        }
        for clip in &record.animations {
            self.animations.shift_remove(clip);
        }
        for material in &record.materials {
            self.materials.shift_remove(material);
        }
        for hud in &record.huds {
            self.huds.shift_remove(hud);
        }
        for script in &record.scripts {
            self.scripts.shift_remove(script);
        }
        info!("Unloaded package {}", name);
        true
    }

    pub fn unload_all_packages(&mut self) {
        for name in self.installed_package_names() {
            self.unload_package(&name);
        }
    }

    /// Copy every object of `from` into `to`, keeping names and parent links
    ///
    /// Objects whose name already exists in `to` are skipped. Copies are
    /// instanced when `to` is. Returns the number of objects copied.
    pub fn copy_objects(&mut self, from: SceneId, to: SceneId) -> usize {
        let Some(source) = self.scenes.get(from) else {
            return 0;
        };
        let Some(target) = self.scenes.get(to) else {
            return 0;
        };
        let instanced = target.instanced;
        let sources: Vec<ObjectId> = source
            .objects
            .values()
            .copied()
            .filter(|id| {
                self.objects
                    .get(*id)
                    .is_some_and(|o| !target.has_object(&o.name))
            })
            .collect();

        let mut copies = Vec::new();
        for id in sources {
            let Some(copy) = self.objects.get(id).map(|o| {
                let mut copy = o.duplicate(o.name.clone());
                copy.scene = Some(to);
                copy
            }) else {
                continue;
            };
            copies.push((id, self.insert_object(to, copy)));
        }

        for (original, copy) in &copies {
            let Some(parent) = self.objects.get(*original).and_then(|o| o.parent) else {
                continue;
            };
            if let Some((_, parent_copy)) = copies.iter().find(|(o, _)| *o == parent) {
                self.set_parent(*copy, *parent_copy, false);
            }
        }
        if instanced {
            for (_, copy) in &copies {
                self.apply_instance(*copy, InstanceAction::Create);
            }
        }
        copies.len()
    }

    fn insert_object(&mut self, scene: SceneId, object: GameObject) -> ObjectId {
        let name = object.name.clone();
        let id = self.objects.insert(object);
        if let Some(scene) = self.scenes.get_mut(scene) {
            scene.objects.insert(name, id);
        }
        id
    }

    /// Clone an object into a scene under a unique name
    ///
    /// `life_span` is in frames, 0 keeps the clone forever.
    pub fn clone_object(
        &mut self,
        scene: SceneId,
        source: ObjectId,
        life_span: u32,
        instantiate: bool,
    ) -> Option<ObjectId> {
        let name = self.scenes.get(scene)?.unique_name(&self.objects.get(source)?.name);
        let world = self.world_transform(source)?;
        let mut copy = self.objects.get(source)?.duplicate(name);
        copy.scene = Some(scene);
        copy.transform = world;
        copy.life_span = (life_span > 0).then_some(life_span);

        let id = self.insert_object(scene, copy);
        if instantiate {
            self.request_instance(id, InstanceAction::Create);
        }
        Some(id)
    }

    // ------------------------------------------------------------------
    // Group instances
    // ------------------------------------------------------------------

    /// Spawn a registered group under a new root placed at `transform`
    pub fn create_group_instance(
        &mut self,
        scene: SceneId,
        group: &str,
        transform: Transform,
    ) -> Option<GroupInstanceId> {
        let templates = self.groups.get(group)?.objects.clone();
        let root_name = self.scenes.get(scene)?.unique_name(&format!("gi{}", group));
        let root = self.create_object(scene, &root_name, ObjectKind::Empty).ok()?;
        if let Some(object) = self.objects.get_mut(root) {
            object.transform = transform;
        }

        // Element names are made unique per scene; the instance keeps the
        // template names as keys.
        let scene_ref = self.scenes.get(scene)?;
        let renamed: Vec<ObjectDesc> = templates
            .iter()
            .map(|t| {
                let mut desc = t.clone();
                if scene_ref.has_object(&t.name) {
                    desc.name = format!("{}_{}", root_name, t.name);
                }
                desc.parent = t.parent.as_ref().map(|p| {
                    if scene_ref.has_object(p) {
                        format!("{}_{}", root_name, p)
                    } else {
                        p.clone()
                    }
                });
                desc
            })
            .collect();
        let spawned = self.spawn_all(scene, &renamed);

        let mut instance = GroupInstance {
            name: root_name,
            group: group.to_string(),
            scene,
            root,
            elements: Default::default(),
            instanced: false,
        };
        // Templates that failed to spawn are missing from `spawned`
        for (name, id) in &spawned {
            let Some(template) = renamed
                .iter()
                .position(|d| d.name == *name)
                .and_then(|i| templates.get(i))
            else {
                continue;
            };
            if self.object(*id).is_some_and(|o| o.parent.is_none()) {
                self.set_parent(*id, root, false);
            }
            instance.elements.insert(template.name.clone(), *id);
        }
        let id = self.group_instances.insert(instance);
        for object in std::iter::once(root).chain(spawned.iter().map(|(_, o)| *o)) {
            if let Some(object) = self.objects.get_mut(object) {
                object.group_instance = Some(id);
            }
        }
        self.group_instance_action(id, InstanceAction::Create);
        Some(id)
    }

    /// Create, destroy or reinstance every object of a group instance
    pub fn group_instance_action(&mut self, id: GroupInstanceId, action: InstanceAction) {
        let Some(instance) = self.group_instances.get_mut(id) else {
            return;
        };
        instance.instanced = match action {
            InstanceAction::Destroy => false,
            InstanceAction::Create | InstanceAction::Reinstance => true,
        };
        let objects: Vec<ObjectId> = std::iter::once(instance.root)
            .chain(instance.elements.values().copied())
            .collect();
        for object in objects {
            self.request_instance(object, action);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::AnimationClip;
    use crate::group::Group;
    use crate::mesh::Mesh;
    use crate::package::SceneDesc;
    use glam::Vec3;

    fn package() -> PackageDesc {
        let mut scene = SceneDesc::new("Level");
        scene.main = true;
        let mut root = ObjectDesc::new("Root", ObjectType::Empty);
        root.transform.position = Vec3::new(0.0, 0.0, 1.0);
        let mut cube = ObjectDesc::new("Cube", ObjectType::Entity);
        cube.mesh = Some("CubeMesh".into());
        cube.parent = Some("Root".into());
        cube.variables.push(("hp".into(), 10.into()));
        scene.objects = vec![root, cube, ObjectDesc::new("Camera", ObjectType::Camera)];

        PackageDesc {
            name: "level.kdl".into(),
            scenes: vec![SceneDesc::new("Menu"), scene],
            meshes: vec![Mesh::new("CubeMesh")],
            groups: vec![Group {
                name: "Tree".into(),
                objects: vec![ObjectDesc::new("Trunk", ObjectType::Entity)],
            }],
            animations: vec![AnimationClip::new("Spin", 2.0)],
            ..Default::default()
        }
    }

    #[test]
    fn test_install_main_scene_only() {
        let mut engine = Engine::new();
        let scene = engine.install_package(&package()).unwrap();

        assert_eq!(engine.scene(scene).unwrap().name, "Level");
        assert!(engine.find_scene("Menu").is_none());

        let cube = engine.scene(scene).unwrap().object("Cube").unwrap();
        let root = engine.scene(scene).unwrap().object("Root").unwrap();
        assert_eq!(engine.object(cube).unwrap().parent, Some(root));
        assert!(engine.object(cube).unwrap().entity().unwrap().mesh.is_some());
        assert!(engine.scene(scene).unwrap().main_camera.is_some());
        assert!(engine.animations.contains_key("Spin"));
    }

    #[test]
    fn test_reinstall_reuses_scene() {
        let mut engine = Engine::new();
        let first = engine.install_package(&package()).unwrap();
        let second = engine.install_package(&package()).unwrap();
        assert_eq!(first, second);
        assert_eq!(engine.scenes.len(), 1);
    }

    #[test]
    fn test_package_without_scenes() {
        let mut engine = Engine::new();
        let empty = PackageDesc {
            name: "empty".into(),
            ..Default::default()
        };
        assert!(matches!(engine.install_package(&empty), Err(Error::EmptyPackage(_))));
    }

    #[test]
    fn test_unload_package_removes_resources() {
        let mut engine = Engine::new();
        let scene = engine.install_package(&package()).unwrap();
        assert!(engine.unload_package("level.kdl"));

        assert!(engine.scene(scene).is_none());
        assert!(engine.mesh_by_name("CubeMesh").is_none());
        assert!(!engine.groups.contains_key("Tree"));
        assert!(!engine.unload_package("level.kdl"));
    }

    #[test]
    fn test_copy_objects_skips_existing_names() {
        let mut engine = Engine::new();
        let loaded = engine.install_package(&package()).unwrap();
        let active = engine.create_scene("Active").unwrap();
        engine.create_object(active, "Camera", ObjectKind::Empty).unwrap();
        engine.instance_scene(active, 0);

        assert_eq!(engine.copy_objects(loaded, active), 2);
        let scene = engine.scene(active).unwrap();
        let cube = scene.object("Cube").unwrap();
        let root = scene.object("Root").unwrap();
        assert_eq!(engine.object(cube).unwrap().parent, Some(root));
        assert!(engine.object(cube).unwrap().instanced);
    }

    #[test]
    fn test_clone_object_unique_name_and_life_span() {
        let mut engine = Engine::new();
        let scene = engine.install_package(&package()).unwrap();
        let cube = engine.scene(scene).unwrap().object("Cube").unwrap();

        let clone = engine.clone_object(scene, cube, 30, true).unwrap();
        let object = engine.object(clone).unwrap();
        assert_eq!(object.name, "Cube.001");
        assert_eq!(object.life_span, Some(30));
        assert!(object.instanced);
        assert_eq!(object.parent, None);
        assert_eq!(engine.world_transform(clone).unwrap().position, Vec3::new(0.0, 0.0, 1.0));

        let forever = engine.clone_object(scene, cube, 0, false).unwrap();
        assert_eq!(engine.object(forever).unwrap().life_span, None);
        assert!(!engine.object(forever).unwrap().instanced);
    }

    #[test]
    fn test_group_instance_spawns_under_root() {
        let mut engine = Engine::new();
        let scene = engine.install_package(&package()).unwrap();
        let at = Transform::from_position(Vec3::new(3.0, 0.0, 0.0));

        let first = engine.create_group_instance(scene, "Tree", at).unwrap();
        let second = engine.create_group_instance(scene, "Tree", at).unwrap();
        assert!(engine.create_group_instance(scene, "Rock", at).is_none());

        let gi = engine.group_instances.get(first).unwrap();
        assert_eq!(gi.name, "giTree.001");
        let trunk = gi.elements["Trunk"];
        assert_eq!(engine.object(trunk).unwrap().parent, Some(gi.root));
        assert!(engine.object(trunk).unwrap().instanced);
        assert_eq!(engine.world_transform(trunk).unwrap().position, Vec3::new(3.0, 0.0, 0.0));

        let other = engine.group_instances.get(second).unwrap();
        assert_ne!(other.elements["Trunk"], trunk);

        engine.group_instance_action(first, InstanceAction::Destroy);
        assert!(!engine.object(trunk).unwrap().instanced);
    }

    #[test]
    fn test_group_instance_keys_survive_failed_spawn() {
        let mut engine = Engine::new();
        let scene = engine.install_package(&package()).unwrap();
        engine.groups.insert(
            "Pile".into(),
            Group {
                name: "Pile".into(),
                objects: vec![
                    ObjectDesc::new("Dup", ObjectType::Empty),
                    ObjectDesc::new("Dup", ObjectType::Entity),
                    ObjectDesc::new("Other", ObjectType::Empty),
                ],
            },
        );

        let id = engine
            .create_group_instance(scene, "Pile", Transform::IDENTITY)
            .unwrap();
        let gi = engine.group_instances.get(id).unwrap();
        assert_eq!(gi.elements.len(), 2);
        assert_eq!(engine.object(gi.elements["Dup"]).unwrap().name, "Dup");
        assert_eq!(engine.object(gi.elements["Other"]).unwrap().name, "Other");
        assert_eq!(engine.object(gi.elements["Other"]).unwrap().parent, Some(gi.root));
    }
}
