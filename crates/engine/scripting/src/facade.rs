//! The engine facade scripts drive: lifecycle, tick callbacks and scene
//! loading

use std::cell::{Cell, RefCell};
use std::path::Path;
use std::rc::{Rc, Weak};
use std::time::{Duration, Instant};

use lumen_world::{Engine, EngineListener, EngineRef};
use tracing::{debug, info, warn};

use crate::package::{KdlPackageLoader, PackageLoader};
use crate::proxy::SceneProxy;
use crate::user_defs::UserDefsTable;

/// Fixed step used by [`EngineFacade::run`]
pub const TICK_RATE: f32 = 60.0;

/// Events a script can connect to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Tick,
}

impl Event {
    pub fn from_index(index: i32) -> Option<Self> {
        match index {
            0 => Some(Self::Tick),
            _ => None,
        }
    }
}

/// Per-tick callback. Returning `false` unregisters it.
pub trait TickCallback {
    fn call(&mut self, delta: f32) -> bool;
}

impl<F> TickCallback for F
where
    F: FnMut(f32) -> bool,
{
    fn call(&mut self, delta: f32) -> bool {
        self(delta)
    }
}

#[derive(Default)]
struct FacadeInner {
    ticks: RefCell<Vec<Box<dyn TickCallback>>>,
}

impl EngineListener for FacadeInner {
    fn tick(&self, delta: f32) {
        // Callbacks connected while dispatching land in the emptied list and
        // run from the next tick on.
        let mut current = std::mem::take(&mut *self.ticks.borrow_mut());
        current.retain_mut(|callback| callback.call(delta));

        let mut ticks = self.ticks.borrow_mut();
        let added = std::mem::replace(&mut *ticks, current);
        ticks.extend(added);
    }
}

/// Script-facing engine object
///
/// A facade either owns its engine ([`EngineFacade::new`]) or attaches to one
/// that already exists. Only the owner may initialize the engine, and dropping
/// the owner shuts it down.
pub struct EngineFacade {
    engine: EngineRef,
    inner: Rc<FacadeInner>,
    listener: Weak<dyn EngineListener>,
    owner: bool,
    running: Cell<bool>,
    user_defs: Option<UserDefsTable>,
}

impl EngineFacade {
    /// Create a facade owning a fresh engine
    pub fn new() -> Self {
        Self::with_engine(Engine::new_ref(), true)
    }

    /// Attach to an existing engine without owning it
    pub fn attach(engine: EngineRef) -> Self {
        Self::with_engine(engine, false)
    }

    fn with_engine(engine: EngineRef, owner: bool) -> Self {
        let inner = Rc::new(FacadeInner::default());
        let as_listener: Rc<dyn EngineListener> = inner.clone();
        let listener = Rc::downgrade(&as_listener);
        let running = engine.borrow().is_running();
        engine.borrow_mut().add_listener(listener.clone());
        Self {
            engine,
            inner,
            listener,
            owner,
            running: Cell::new(running),
            user_defs: None,
        }
    }

    pub fn engine(&self) -> EngineRef {
        self.engine.clone()
    }

    pub fn is_owner(&self) -> bool {
        self.owner
    }

    pub fn is_initialized(&self) -> bool {
        self.engine.borrow().is_initialized()
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    /// Initialize the engine. Does nothing for attached facades.
    pub fn initialize(&self) {
        if !self.owner {
            debug!("Attached facade cannot initialize the engine");
            return;
        }
        self.engine.borrow_mut().initialize();
    }

    /// Run the main loop at [`TICK_RATE`] until exit is requested
    pub fn run(&self) {
        if self.running.replace(true) {
            return;
        }
        run_loop(&self.engine);
        self.running.set(false);
    }

    /// Advance one frame, for hosts driving their own loop
    pub fn step(&self, delta: f32) {
        lumen_world::step(&self.engine, delta);
    }

    pub fn request_exit(&self) {
        self.engine.borrow_mut().request_exit();
    }

    /// Register a callback for an event
    pub fn connect(&self, event: Event, callback: impl TickCallback + 'static) {
        match event {
            Event::Tick => self.inner.ticks.borrow_mut().push(Box::new(callback)),
        }
    }

    /// Number of registered tick callbacks
    pub fn tick_count(&self) -> usize {
        self.inner.ticks.borrow().len()
    }

    /// The configuration table, built on first use
    pub fn user_defs(&mut self) -> &mut UserDefsTable {
        let engine = &self.engine;
        self.user_defs
            .get_or_insert_with(|| UserDefsTable::new(engine.clone()))
    }

    /// Load a package file with the KDL loader
    pub fn load_blend_file(&self, path: impl AsRef<Path>) -> Option<SceneProxy> {
        self.load_blend_file_with(path.as_ref(), &KdlPackageLoader)
    }

    /// Load a package and merge it into the running game
    ///
    /// With an active scene, the loaded scene's objects are copied into it and
    /// the active scene is returned. Otherwise the loaded scene becomes active
    /// and is instanced.
    pub fn load_blend_file_with(&self, path: &Path, loader: &dyn PackageLoader) -> Option<SceneProxy> {
        if !self.is_initialized() {
            warn!("Cannot load {}: uninitialized engine", path.display());
            return None;
        }
        let package = match loader.load(path) {
            Ok(package) => package,
            Err(e) => {
                warn!("Failed to load {}: {}", path.display(), e);
                return None;
            }
        };

        let mut engine = self.engine.borrow_mut();
        let loaded = match engine.install_package(&package) {
            Ok(scene) => scene,
            Err(e) => {
                warn!("Failed to install {}: {}", path.display(), e);
                return None;
            }
        };

        let scene = match engine.active_scene().filter(|s| engine.scene(*s).is_some()) {
            Some(active) if active != loaded => {
                let copied = engine.copy_objects(loaded, active);
                debug!("Merged {} objects from {} into the active scene", copied, path.display());
                active
            }
            Some(active) => active,
            None => {
                engine.set_active_scene(Some(loaded));
                engine.instance_scene(loaded, 0);
                loaded
            }
        };
        info!("Loaded {}", path.display());
        drop(engine);
        Some(SceneProxy::new(self.engine.clone(), Some(scene)))
    }

    pub fn unload_blend_file(&self, name: &str) {
        let mut engine = self.engine.borrow_mut();
        if !engine.is_initialized() {
            debug!("Unloading {} from an uninitialized engine", name);
        }
        if !engine.unload_package(name) {
            debug!("Package {} not loaded", name);
        }
    }

    pub fn unload_all_blend_files(&self) {
        let mut engine = self.engine.borrow_mut();
        if !engine.is_initialized() {
            debug!("Unloading packages from an uninitialized engine");
        }
        engine.unload_all_packages();
    }

    pub fn active_scene(&self) -> Option<SceneProxy> {
        let active = self.engine.borrow().active_scene()?;
        Some(SceneProxy::new(self.engine.clone(), Some(active)))
    }

    pub fn scene(&self, name: &str) -> Option<SceneProxy> {
        let id = self.engine.borrow().find_scene(name)?;
        Some(SceneProxy::new(self.engine.clone(), Some(id)))
    }

    /// Show a scene above every instanced scene
    pub fn add_overlay_scene(&self, scene: &SceneProxy) -> Option<SceneProxy> {
        self.stack_scene(scene, |engine| engine.topmost_z().map(|z| z + 1))
    }

    pub fn add_overlay_scene_named(&self, name: &str) -> Option<SceneProxy> {
        self.scene(name).and_then(|scene| self.add_overlay_scene(&scene))
    }

    /// Show a scene below every instanced scene
    pub fn add_background_scene(&self, scene: &SceneProxy) -> Option<SceneProxy> {
        self.stack_scene(scene, |engine| engine.bottommost_z().map(|z| z - 1))
    }

    pub fn add_background_scene_named(&self, name: &str) -> Option<SceneProxy> {
        self.scene(name).and_then(|scene| self.add_background_scene(&scene))
    }

    fn stack_scene(&self, scene: &SceneProxy, z_order: impl FnOnce(&Engine) -> Option<i32>) -> Option<SceneProxy> {
        let id = scene.id()?;
        let mut engine = self.engine.borrow_mut();
        if engine.active_scene().is_none() || engine.scene(id)?.instanced {
            return None;
        }
        let z = z_order(&engine).unwrap_or(0);
        engine.instance_scene(id, z);
        drop(engine);
        Some(SceneProxy::new(self.engine.clone(), Some(id)))
    }

    pub fn remove_scene(&self, scene: &SceneProxy) {
        if let Some(id) = scene.id() {
            self.engine.borrow_mut().remove_scene(id);
        }
    }

    pub fn remove_scene_named(&self, name: &str) {
        let id = self.engine.borrow().find_scene(name);
        if let Some(id) = id {
            self.engine.borrow_mut().remove_scene(id);
        }
    }
}

impl Default for EngineFacade {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for EngineFacade {
    fn drop(&mut self) {
        // The engine may be mid-step when a script drops its facade
        let Ok(mut engine) = self.engine.try_borrow_mut() else {
            warn!(
                "Engine busy while dropping its {} facade; listener left registered{}",
                if self.owner { "owning" } else { "attached" },
                if self.owner { " and shutdown skipped" } else { "" }
            );
            return;
        };
        engine.remove_listener(&self.listener);
        if self.owner {
            engine.shutdown();
        }
    }
}

/// Step `engine` at a fixed rate until an exit is requested
pub(crate) fn run_loop(engine: &EngineRef) {
    let frame = Duration::from_secs_f32(1.0 / TICK_RATE);
    engine.borrow_mut().set_running(true);
    info!("Entering main loop");

    while !engine.borrow().exit_requested() {
        let started = Instant::now();
        lumen_world::step(engine, 1.0 / TICK_RATE);
        if let Some(rest) = frame.checked_sub(started.elapsed()) {
            std::thread::sleep(rest);
        }
    }

    let mut engine = engine.borrow_mut();
    engine.clear_exit_request();
    engine.set_running(false);
    info!("Main loop finished after {} frames", engine.frame());
}
