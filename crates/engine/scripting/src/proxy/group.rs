use lumen_world::group::{GroupInstance, GroupInstanceId};
use lumen_world::{EngineRef, InstanceAction};

use super::GameObjectProxy;

/// A spawned group: a root object plus one object per group template
#[derive(Clone)]
pub struct GroupInstanceProxy {
    engine: EngineRef,
    id: Option<GroupInstanceId>,
}

impl GroupInstanceProxy {
    pub fn new(engine: EngineRef, id: Option<GroupInstanceId>) -> Self {
        Self { engine, id }
    }

    pub fn id(&self) -> Option<GroupInstanceId> {
        self.id
    }

    fn read<R>(&self, default: R, f: impl FnOnce(&GroupInstance) -> R) -> R {
        let engine = self.engine.borrow();
        self.id
            .and_then(|id| engine.group_instances.get(id))
            .map(f)
            .unwrap_or(default)
    }

    fn object(&self, id: Option<lumen_world::ObjectId>) -> Option<GameObjectProxy> {
        id.map(|id| GameObjectProxy::new(self.engine.clone(), Some(id)))
    }

    pub fn is_null(&self) -> bool {
        self.read(true, |_| false)
    }

    pub fn name(&self) -> String {
        self.read(String::new(), |gi| gi.name.clone())
    }

    /// Name of the group this was spawned from
    pub fn group_name(&self) -> String {
        self.read(String::new(), |gi| gi.group.clone())
    }

    pub fn is_instanced(&self) -> bool {
        self.read(false, |gi| gi.instanced)
    }

    fn action(&self, action: InstanceAction) {
        if let Some(id) = self.id {
            self.engine.borrow_mut().group_instance_action(id, action);
        }
    }

    pub fn create_instance(&self) {
        self.action(InstanceAction::Create);
    }

    pub fn destroy_instance(&self) {
        self.action(InstanceAction::Destroy);
    }

    pub fn reinstance(&self) {
        self.action(InstanceAction::Reinstance);
    }

    pub fn root(&self) -> Option<GameObjectProxy> {
        self.object(self.read(None, |gi| Some(gi.root)))
    }

    pub fn element_count(&self) -> usize {
        self.read(0, |gi| gi.elements.len())
    }

    pub fn element_at(&self, index: usize) -> Option<GameObjectProxy> {
        self.object(self.read(None, |gi| gi.elements.get_index(index).map(|(_, id)| *id)))
    }

    /// Element spawned from the template called `name`
    pub fn element(&self, name: &str) -> Option<GameObjectProxy> {
        self.object(self.read(None, |gi| gi.elements.get(name).copied()))
    }
}
