//! Object groups and their spawned instances

use indexmap::IndexMap;

use crate::handle::Handle;
use crate::object::ObjectId;
use crate::package::ObjectDesc;
use crate::scene::SceneId;

pub type GroupInstanceId = Handle<GroupInstance>;

/// A reusable set of object templates
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Group {
    pub name: String,
    pub objects: Vec<ObjectDesc>,
}

/// Objects spawned from a [`Group`] under a shared root
#[derive(Debug)]
pub struct GroupInstance {
    pub name: String,
    pub group: String,
    pub scene: SceneId,
    pub root: ObjectId,
    /// Spawned objects keyed by template name
    pub elements: IndexMap<String, ObjectId>,
    pub instanced: bool,
}
