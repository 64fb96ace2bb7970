//! The engine context
//!
//! [`Engine`] owns every registry. It is shared as an [`EngineRef`]; nothing
//! in the engine is reachable through globals.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use devices::{CursorMode, InputSystem};
use glam::Vec2;
use indexmap::IndexMap;
use tracing::{debug, info};

use crate::animation::AnimationClip;
use crate::debug::{DebugRegistry, DebugScreen};
use crate::error::{Error, Result};
use crate::group::{Group, GroupInstance};
use crate::handle::Arena;
use crate::hud::Hud;
use crate::material::Material;
use crate::mesh::{Mesh, SubMesh};
use crate::message::MessageBus;
use crate::object::{GameObject, MeshId, ObjectId, ObjectKind, ObjectType};
use crate::package::InstalledPackage;
use crate::scene::{Scene, SceneId};
use crate::user_defs::UserDefs;
use crate::window::{Viewport, Window};

/// Shared handle to the engine context
pub type EngineRef = Rc<RefCell<Engine>>;

/// Receives per-frame notifications from [`step`]
///
/// Listeners are called after the engine borrow is released, so they may
/// borrow the engine themselves.
pub trait EngineListener {
    fn tick(&self, delta: f32);
}

/// Instancing request applied to a game object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceAction {
    Create,
    Destroy,
    Reinstance,
}

pub struct Engine {
    pub user_defs: UserDefs,
    pub scenes: Arena<Scene>,
    pub objects: Arena<GameObject>,
    pub meshes: Arena<Mesh>,
    pub group_instances: Arena<GroupInstance>,
    pub(crate) mesh_names: IndexMap<String, MeshId>,
    pub groups: IndexMap<String, Group>,
    pub animations: IndexMap<String, AnimationClip>,
    pub materials: IndexMap<String, Material>,
    pub huds: IndexMap<String, Hud>,
    /// Script sources by name
    pub scripts: IndexMap<String, String>,
    pub debug_vars: DebugRegistry,
    pub debug_screen: DebugScreen,
    pub messages: MessageBus,
    pub(crate) packages: IndexMap<String, InstalledPackage>,
    active_scene: Option<SceneId>,
    input: Option<Box<dyn InputSystem>>,
    window: Option<Window>,
    listeners: Vec<Weak<dyn EngineListener>>,
    pending: Vec<(ObjectId, InstanceAction)>,
    initialized: bool,
    running: bool,
    exit_requested: bool,
    frame: u64,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self {
            user_defs: UserDefs::default(),
            scenes: Arena::new(),
            objects: Arena::new(),
            meshes: Arena::new(),
            group_instances: Arena::new(),
            mesh_names: IndexMap::new(),
            groups: IndexMap::new(),
            animations: IndexMap::new(),
            materials: IndexMap::new(),
            huds: IndexMap::new(),
            scripts: IndexMap::new(),
            debug_vars: DebugRegistry::default(),
            debug_screen: DebugScreen::default(),
            messages: MessageBus::default(),
            packages: IndexMap::new(),
            active_scene: None,
            input: None,
            window: None,
            listeners: Vec::new(),
            pending: Vec::new(),
            initialized: false,
            running: false,
            exit_requested: false,
            frame: 0,
        }
    }

    /// Create a shared engine context
    pub fn new_ref() -> EngineRef {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Open the main window and mark the engine ready. Idempotent.
    pub fn initialize(&mut self) {
        if self.initialized {
            return;
        }
        let size = self.user_defs.win_size;
        self.window = Some(Window::new(
            self.user_defs.win_title.clone(),
            size.x.max(0.0) as u32,
            size.y.max(0.0) as u32,
        ));
        self.initialized = true;
        self.apply_user_defs();
        info!("Engine initialized ({}x{})", size.x, size.y);
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    pub fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    pub fn clear_exit_request(&mut self) {
        self.exit_requested = false;
    }

    /// Number of frames stepped so far
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Push derived state (window, input grab) from the configuration
    pub fn apply_user_defs(&mut self) {
        let defs = &self.user_defs;
        if let Some(window) = self.window.as_mut() {
            window.title = defs.win_title.clone();
            window.width = defs.win_size.x.max(0.0) as u32;
            window.height = defs.win_size.y.max(0.0) as u32;
            window.fullscreen = defs.fullscreen;
        }
        let mode = if defs.grab_input {
            CursorMode::Grabbed
        } else {
            CursorMode::Normal
        };
        if let Some(input) = self.input.as_mut() {
            input.set_cursor_mode(mode);
        }
    }

    // ------------------------------------------------------------------
    // Input and window
    // ------------------------------------------------------------------

    pub fn set_input(&mut self, input: Box<dyn InputSystem>) {
        self.input = Some(input);
        self.apply_user_defs();
    }

    pub fn input(&self) -> Option<&dyn InputSystem> {
        self.input.as_deref()
    }

    pub fn input_mut(&mut self) -> Option<&mut (dyn InputSystem + 'static)> {
        self.input.as_deref_mut()
    }

    pub fn window(&self) -> Option<&Window> {
        self.window.as_ref()
    }

    /// Main window size in pixels, zero without a window
    pub fn window_size(&self) -> Vec2 {
        self.window
            .as_ref()
            .map(|w| Vec2::new(w.width as f32, w.height as f32))
            .unwrap_or(Vec2::ZERO)
    }

    // ------------------------------------------------------------------
    // Listeners
    // ------------------------------------------------------------------

    pub fn add_listener(&mut self, listener: Weak<dyn EngineListener>) {
        self.listeners.retain(|l| l.strong_count() > 0);
        if !self.listeners.iter().any(|l| l.ptr_eq(&listener)) {
            self.listeners.push(listener);
        }
    }

    pub fn remove_listener(&mut self, listener: &Weak<dyn EngineListener>) {
        self.listeners
            .retain(|l| !l.ptr_eq(listener) && l.strong_count() > 0);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.iter().filter(|l| l.strong_count() > 0).count()
    }

    // ------------------------------------------------------------------
    // Debug output
    // ------------------------------------------------------------------

    /// Print to the on-screen debug channel
    pub fn debug_print(&mut self, message: &str) {
        self.debug_screen.print(message);
    }

    // ------------------------------------------------------------------
    // Scenes
    // ------------------------------------------------------------------

    pub fn create_scene(&mut self, name: &str) -> Result<SceneId> {
        if self.find_scene(name).is_some() {
            return Err(Error::DuplicateName(name.to_string()));
        }
        debug!("Creating scene {}", name);
        Ok(self.scenes.insert(Scene::new(name)))
    }

    pub fn find_scene(&self, name: &str) -> Option<SceneId> {
        self.scenes
            .iter()
            .find(|(_, scene)| scene.name == name)
            .map(|(id, _)| id)
    }

    pub fn scene(&self, id: SceneId) -> Option<&Scene> {
        self.scenes.get(id)
    }

    pub fn scene_mut(&mut self, id: SceneId) -> Option<&mut Scene> {
        self.scenes.get_mut(id)
    }

    /// The active scene, if it still exists
    pub fn active_scene(&self) -> Option<SceneId> {
        self.active_scene.filter(|id| self.scenes.contains(*id))
    }

    pub fn set_active_scene(&mut self, id: Option<SceneId>) {
        self.active_scene = id;
    }

    /// Instance a scene at viewport depth `z`. Returns false if the scene is
    /// missing or already instanced.
    pub fn instance_scene(&mut self, id: SceneId, z_order: i32) -> bool {
        let Some(scene) = self.scenes.get_mut(id) else {
            return false;
        };
        if scene.instanced {
            return false;
        }
        scene.instanced = true;
        scene.display_z = z_order;
        let camera = scene.main_camera;
        let objects: Vec<ObjectId> = scene.objects.values().copied().collect();
        info!("Instancing scene {} at z {}", scene.name, z_order);

        for object in objects {
            self.set_instanced(object, true);
        }
        if let Some(window) = self.window.as_mut() {
            window.viewports.push(Viewport { camera, z_order });
        }
        true
    }

    /// Take a scene out of its viewport. Its objects stay but are no longer
    /// instanced.
    pub fn uninstance_scene(&mut self, id: SceneId) -> bool {
        let Some(scene) = self.scenes.get_mut(id) else {
            return false;
        };
        if !scene.instanced {
            return false;
        }
        scene.instanced = false;
        let (camera, z_order) = (scene.main_camera, scene.display_z);
        let objects: Vec<ObjectId> = scene.objects.values().copied().collect();
        for object in objects {
            self.set_instanced(object, false);
        }
        self.remove_viewport(camera, z_order);
        true
    }

    /// Make a camera of the scene its main camera, retargeting the scene's
    /// viewport when instanced
    pub fn set_main_camera(&mut self, scene_id: SceneId, camera: ObjectId) -> bool {
        let is_camera = self
            .objects
            .get(camera)
            .is_some_and(|o| o.scene == Some(scene_id) && o.camera().is_some());
        let Some(scene) = self.scenes.get_mut(scene_id).filter(|_| is_camera) else {
            return false;
        };
        let previous = scene.main_camera.replace(camera);
        let (instanced, z_order) = (scene.instanced, scene.display_z);
        if let (true, Some(window)) = (instanced, self.window.as_mut()) {
            if let Some(viewport) = window
                .viewports
                .iter_mut()
                .find(|v| v.camera == previous && v.z_order == z_order)
            {
                viewport.camera = Some(camera);
            }
        }
        true
    }

    fn remove_viewport(&mut self, camera: Option<ObjectId>, z_order: i32) {
        if let Some(window) = self.window.as_mut() {
            if let Some(pos) = window
                .viewports
                .iter()
                .position(|v| v.camera == camera && v.z_order == z_order)
            {
                window.viewports.remove(pos);
            }
        }
    }

    /// Highest z order among instanced scenes
    pub fn topmost_z(&self) -> Option<i32> {
        self.scenes
            .iter()
            .filter(|(_, s)| s.instanced)
            .map(|(_, s)| s.display_z)
            .max()
    }

    /// Lowest z order among instanced scenes
    pub fn bottommost_z(&self) -> Option<i32> {
        self.scenes
            .iter()
            .filter(|(_, s)| s.instanced)
            .map(|(_, s)| s.display_z)
            .min()
    }

    /// Destroy a scene and every object in it
    pub fn remove_scene(&mut self, id: SceneId) -> bool {
        let Some(scene) = self.scenes.get(id) else {
            return false;
        };
        let objects: Vec<ObjectId> = scene.objects.values().copied().collect();
        let (camera, instanced, z_order) = (scene.main_camera, scene.instanced, scene.display_z);
        for object in objects {
            self.destroy_object(object);
        }
        let stale: Vec<_> = self
            .group_instances
            .iter()
            .filter(|(_, gi)| gi.scene == id)
            .map(|(gid, _)| gid)
            .collect();
        for gid in stale {
            self.group_instances.remove(gid);
        }
        if instanced {
            self.remove_viewport(camera, z_order);
        }
        if self.active_scene == Some(id) {
            self.active_scene = None;
        }
        if let Some(scene) = self.scenes.remove(id) {
            debug!("Removed scene {}", scene.name);
        }
        true
    }

    // ------------------------------------------------------------------
    // Objects
    // ------------------------------------------------------------------

    /// Create an object in a scene. Names are unique per scene.
    pub fn create_object(&mut self, scene_id: SceneId, name: &str, kind: ObjectKind) -> Result<ObjectId> {
        let scene = self.scenes.get(scene_id).ok_or_else(|| Error::Unknown {
            kind: "scene",
            name: format!("{:?}", scene_id),
        })?;
        if scene.has_object(name) {
            return Err(Error::DuplicateName(name.to_string()));
        }
        let mut object = GameObject::new(name, kind);
        object.scene = Some(scene_id);
        let id = self.objects.insert(object);
        if let Some(scene) = self.scenes.get_mut(scene_id) {
            scene.objects.insert(name.to_string(), id);
        }
        Ok(id)
    }

    /// Create an entity with a fresh `mesh_<name>` mesh holding one empty submesh
    pub fn create_entity(&mut self, scene_id: SceneId, name: &str) -> Result<ObjectId> {
        let id = self.create_object(scene_id, name, ObjectKind::new(ObjectType::Entity))?;
        let mut mesh = Mesh::new(format!("mesh_{}", name));
        mesh.add_sub_mesh(SubMesh::new());
        let mesh_id = self.register_mesh(mesh);
        if let Some(entity) = self.objects.get_mut(id).and_then(GameObject::entity_mut) {
            entity.mesh = Some(mesh_id);
        }
        Ok(id)
    }

    pub fn object(&self, id: ObjectId) -> Option<&GameObject> {
        self.objects.get(id)
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut GameObject> {
        self.objects.get_mut(id)
    }

    /// Remove an object. Children are detached in place.
    pub fn destroy_object(&mut self, id: ObjectId) -> bool {
        let Some(object) = self.objects.get(id) else {
            return false;
        };
        let children = object.children.clone();
        let scene_id = object.scene;
        let name = object.name.clone();

        for child in children {
            self.clear_parent(child, true);
        }
        self.clear_parent(id, false);

        if let Some(scene) = scene_id.and_then(|s| self.scenes.get_mut(s)) {
            if scene.objects.get(&name) == Some(&id) {
                scene.objects.shift_remove(&name);
            }
            if scene.main_camera == Some(id) {
                scene.main_camera = None;
            }
        }
        self.pending.retain(|(pending, _)| *pending != id);
        self.objects.remove(id);
        true
    }

    /// Instanced objects of a scene, in creation order
    pub fn instanced_objects(&self, scene_id: SceneId) -> Vec<ObjectId> {
        self.scenes
            .get(scene_id)
            .map(|scene| {
                scene
                    .objects
                    .values()
                    .copied()
                    .filter(|id| self.objects.get(*id).is_some_and(|o| o.instanced))
                    .collect()
            })
            .unwrap_or_default()
    }

    // ------------------------------------------------------------------
    // Instancing
    // ------------------------------------------------------------------

    /// Apply now, or at the start of the next frame while running
    pub fn request_instance(&mut self, id: ObjectId, action: InstanceAction) {
        if self.running {
            self.pending.push((id, action));
        } else {
            self.apply_instance(id, action);
        }
    }

    pub fn apply_instance(&mut self, id: ObjectId, action: InstanceAction) {
        match action {
            InstanceAction::Create => self.set_instanced(id, true),
            InstanceAction::Destroy => self.set_instanced(id, false),
            InstanceAction::Reinstance => {
                self.set_instanced(id, false);
                self.set_instanced(id, true);
            }
        }
    }

    pub fn pending_instance_count(&self) -> usize {
        self.pending.len()
    }

    fn set_instanced(&mut self, id: ObjectId, instanced: bool) {
        if let Some(object) = self.objects.get_mut(id) {
            if object.instanced != instanced {
                object.instanced = instanced;
                if !instanced {
                    object.animations.values_mut().for_each(|p| p.stop());
                    object.active_animation = None;
                    object.physics.contacts.clear();
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Registries
    // ------------------------------------------------------------------

    /// Register a mesh by name. An existing mesh with that name is kept.
    pub fn register_mesh(&mut self, mesh: Mesh) -> MeshId {
        if let Some(id) = self.mesh_by_name(&mesh.name) {
            return id;
        }
        let name = mesh.name.clone();
        let id = self.meshes.insert(mesh);
        self.mesh_names.insert(name, id);
        id
    }

    pub fn mesh_by_name(&self, name: &str) -> Option<MeshId> {
        self.mesh_names
            .get(name)
            .copied()
            .filter(|id| self.meshes.contains(*id))
    }

    pub(crate) fn remove_mesh(&mut self, name: &str) {
        if let Some(id) = self.mesh_names.shift_remove(name) {
            self.meshes.remove(id);
        }
    }

    /// HUD by name, created hidden if missing
    pub fn hud_mut(&mut self, name: &str) -> &mut Hud {
        self.huds
            .entry(name.to_string())
            .or_insert_with(|| Hud::new(name))
    }

    /// Add a clip to the registry, replacing one with the same name
    pub fn add_animation(&mut self, clip: AnimationClip) {
        self.animations.insert(clip.name.clone(), clip);
    }

    // ------------------------------------------------------------------
    // Animation
    // ------------------------------------------------------------------

    /// Play a clip on an instanced object. Returns false if nothing plays.
    pub fn play_animation(&mut self, id: ObjectId, clip: &str, blend: f32, restart: bool) -> bool {
        let known = self.animations.get(clip).cloned();
        let Some(object) = self.objects.get_mut(id) else {
            return false;
        };
        if !object.instanced {
            return false;
        }
        if !object.animations.contains_key(clip) {
            let Some(clip_def) = known else {
                let message = format!("Animation {} not found on {}", clip, object.name);
                self.debug_print(&message);
                return false;
            };
            object
                .animations
                .insert(clip.to_string(), crate::animation::AnimationPlayer::new(&clip_def));
        }
        if let Some(previous) = object.active_animation.take() {
            if previous != clip {
                if let Some(player) = object.animations.get_mut(&previous) {
                    player.stop();
                }
            }
        }
        if let Some(player) = object.animations.get_mut(clip) {
            player.play(blend, restart);
        }
        object.active_animation = Some(clip.to_string());
        true
    }

    // ------------------------------------------------------------------
    // Frame stepping
    // ------------------------------------------------------------------

    fn begin_frame(&mut self, delta: f32) -> Vec<Rc<dyn EngineListener>> {
        self.frame += 1;

        for (id, action) in std::mem::take(&mut self.pending) {
            self.apply_instance(id, action);
        }

        let mut expired = Vec::new();
        for id in self.objects.handles() {
            let Some(object) = self.objects.get_mut(id) else {
                continue;
            };
            if object.instanced {
                object.animations.values_mut().for_each(|p| p.advance(delta));
            }
            if let Some(remaining) = object.life_span.as_mut() {
                *remaining = remaining.saturating_sub(1);
                if *remaining == 0 {
                    expired.push(id);
                }
            }
        }
        for id in expired {
            debug!("Life span over, destroying {:?}", id);
            self.destroy_object(id);
        }

        self.listeners.retain(|l| l.strong_count() > 0);
        self.listeners.iter().filter_map(Weak::upgrade).collect()
    }

    fn end_frame(&mut self) {
        self.debug_vars.prune();
        if let Some(input) = self.input.as_mut() {
            input.end_frame();
        }
    }

    /// Drop every resource. The engine returns to its uninitialized state.
    pub fn shutdown(&mut self) {
        info!("Engine shutting down");
        self.objects.clear();
        self.scenes.clear();
        self.meshes.clear();
        self.group_instances.clear();
        self.mesh_names.clear();
        self.groups.clear();
        self.animations.clear();
        self.materials.clear();
        self.huds.clear();
        self.scripts.clear();
        self.packages.clear();
        self.debug_vars.clear();
        self.debug_screen.clear();
        self.messages.clear();
        self.pending.clear();
        self.active_scene = None;
        self.window = None;
        self.initialized = false;
        self.running = false;
    }
}

/// Advance the engine by one frame of `delta` seconds
///
/// Applies queued instancing, advances playback and life spans, then notifies
/// listeners with the engine borrow released.
pub fn step(engine: &EngineRef, delta: f32) {
    let listeners = engine.borrow_mut().begin_frame(delta);
    for listener in listeners {
        listener.tick(delta);
    }
    engine.borrow_mut().end_frame();
}
