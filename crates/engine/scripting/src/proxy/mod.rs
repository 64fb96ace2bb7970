//! Script proxies over engine objects
//!
//! A proxy is an [`EngineRef`] plus a generational handle. Every accessor
//! resolves the handle on use, so a proxy whose target was destroyed simply
//! reads defaults and ignores writes.

mod debugger;
mod game_object;
mod group;
mod hud;
mod mesh;
mod scene;
mod specialized;

pub use debugger::DebuggerProxy;
pub use game_object::GameObjectProxy;
pub use group::GroupInstanceProxy;
pub use hud::{HudElementProxy, HudProxy};
pub use mesh::{MeshProxy, SubMeshProxy};
pub use scene::{DynamicsWorldProxy, SceneProxy};
pub use specialized::{
    CameraProxy, CharacterProxy, CurveProxy, EntityProxy, LightProxy, ParticlesProxy,
    SkeletonProxy,
};

use lumen_world::{EngineRef, InstanceAction, ObjectId, ObjectType, SceneId};

/// What an [`ObjectProxy`] points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceTarget {
    Scene(SceneId),
    Object(ObjectId),
}

/// Runtime kind tag of a proxy target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProxyKind {
    Scene,
    Empty,
    Entity,
    Camera,
    Light,
    Curve,
    Skeleton,
    Particles,
}

impl From<ObjectType> for ProxyKind {
    fn from(object_type: ObjectType) -> Self {
        match object_type {
            ObjectType::Empty => ProxyKind::Empty,
            ObjectType::Entity => ProxyKind::Entity,
            ObjectType::Camera => ProxyKind::Camera,
            ObjectType::Light => ProxyKind::Light,
            ObjectType::Curve => ProxyKind::Curve,
            ObjectType::Skeleton => ProxyKind::Skeleton,
            ObjectType::Particles => ProxyKind::Particles,
        }
    }
}

/// Base proxy for anything that can be instanced
#[derive(Clone)]
pub struct ObjectProxy {
    engine: EngineRef,
    target: Option<InstanceTarget>,
}

impl ObjectProxy {
    pub fn new(engine: EngineRef, target: Option<InstanceTarget>) -> Self {
        Self { engine, target }
    }

    pub fn target(&self) -> Option<InstanceTarget> {
        self.target
    }

    /// Whether the target no longer exists (or never did)
    pub fn is_null(&self) -> bool {
        self.kind().is_none()
    }

    pub fn name(&self) -> String {
        let engine = self.engine.borrow();
        match self.target {
            Some(InstanceTarget::Scene(id)) => engine.scene(id).map(|s| s.name.clone()),
            Some(InstanceTarget::Object(id)) => engine.object(id).map(|o| o.name.clone()),
            None => None,
        }
        .unwrap_or_default()
    }

    /// Live kind tag, `None` for a dead target
    pub fn kind(&self) -> Option<ProxyKind> {
        let engine = self.engine.borrow();
        match self.target? {
            InstanceTarget::Scene(id) => engine.scene(id).map(|_| ProxyKind::Scene),
            InstanceTarget::Object(id) => engine.object(id).map(|o| o.object_type().into()),
        }
    }

    pub fn is_instanced(&self) -> bool {
        let engine = self.engine.borrow();
        match self.target {
            Some(InstanceTarget::Scene(id)) => engine.scene(id).is_some_and(|s| s.instanced),
            Some(InstanceTarget::Object(id)) => engine.object(id).is_some_and(|o| o.instanced),
            None => false,
        }
    }

    pub fn create_instance(&self) {
        self.instance_action(InstanceAction::Create);
    }

    pub fn destroy_instance(&self) {
        self.instance_action(InstanceAction::Destroy);
    }

    pub fn reinstance(&self) {
        self.instance_action(InstanceAction::Reinstance);
    }

    fn instance_action(&self, action: InstanceAction) {
        let mut engine = self.engine.borrow_mut();
        match self.target {
            Some(InstanceTarget::Object(id)) => engine.request_instance(id, action),
            Some(InstanceTarget::Scene(id)) => {
                let z_order = engine.scene(id).map(|s| s.display_z).unwrap_or(0);
                match action {
                    InstanceAction::Create => {
                        engine.instance_scene(id, z_order);
                    }
                    InstanceAction::Destroy => {
                        engine.uninstance_scene(id);
                    }
                    InstanceAction::Reinstance => {
                        engine.uninstance_scene(id);
                        engine.instance_scene(id, z_order);
                    }
                }
            }
            None => {}
        }
    }

    pub fn as_scene(&self) -> Option<SceneProxy> {
        match (self.target?, self.kind()?) {
            (InstanceTarget::Scene(id), ProxyKind::Scene) => {
                Some(SceneProxy::new(self.engine.clone(), Some(id)))
            }
            _ => None,
        }
    }

    pub fn as_game_object(&self) -> Option<GameObjectProxy> {
        match self.target? {
            InstanceTarget::Object(id) if self.kind().is_some() => {
                Some(GameObjectProxy::new(self.engine.clone(), Some(id)))
            }
            _ => None,
        }
    }
}
