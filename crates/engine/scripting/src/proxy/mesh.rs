//! Mesh and submesh proxies
//!
//! A [`SubMeshProxy`] starts out owning a standalone submesh. Adding it to a
//! mesh moves the submesh into the engine; from then on the proxy edits the
//! adopted copy. Adoption happens at most once.

use std::cell::RefCell;
use std::rc::Rc;

use lumen_world::mesh::{SubMesh, Vertex, TRI_COLLIDER};
use lumen_world::{EngineRef, MeshId};

#[derive(Clone)]
pub struct MeshProxy {
    engine: EngineRef,
    id: Option<MeshId>,
}

impl MeshProxy {
    pub fn new(engine: EngineRef, id: Option<MeshId>) -> Self {
        Self { engine, id }
    }

    pub fn id(&self) -> Option<MeshId> {
        self.id
    }

    pub fn name(&self) -> String {
        let engine = self.engine.borrow();
        self.id
            .and_then(|id| engine.meshes.get(id))
            .map(|m| m.name.clone())
            .unwrap_or_default()
    }

    pub fn sub_mesh_count(&self) -> usize {
        let engine = self.engine.borrow();
        self.id
            .and_then(|id| engine.meshes.get(id))
            .map(|m| m.sub_meshes.len())
            .unwrap_or(0)
    }

    pub fn sub_mesh(&self, index: usize) -> Option<SubMeshProxy> {
        let mesh = self.id?;
        if index >= self.sub_mesh_count() {
            return None;
        }
        Some(SubMeshProxy::adopted(self.engine.clone(), mesh, index))
    }

    /// Move a standalone submesh into this mesh
    ///
    /// Returns false if the submesh was already added somewhere or the mesh
    /// is gone.
    pub fn add_sub_mesh(&self, sub_mesh: &SubMeshProxy) -> bool {
        let Some(id) = self.id else {
            return false;
        };
        let mut binding = sub_mesh.binding.borrow_mut();
        let SubMeshBinding::Owned(owned) = &mut *binding else {
            return false;
        };
        let index = {
            let mut engine = self.engine.borrow_mut();
            let Some(mesh) = engine.meshes.get_mut(id) else {
                return false;
            };
            mesh.add_sub_mesh(std::mem::take(owned))
        };
        *binding = SubMeshBinding::Adopted {
            engine: self.engine.clone(),
            mesh: id,
            index,
        };
        true
    }
}

enum SubMeshBinding {
    Owned(SubMesh),
    Adopted {
        engine: EngineRef,
        mesh: MeshId,
        index: usize,
    },
}

/// A submesh, standalone or adopted by a mesh
#[derive(Clone)]
pub struct SubMeshProxy {
    binding: Rc<RefCell<SubMeshBinding>>,
}

impl Default for SubMeshProxy {
    fn default() -> Self {
        Self::new()
    }
}

impl SubMeshProxy {
    /// A fresh standalone submesh
    pub fn new() -> Self {
        Self {
            binding: Rc::new(RefCell::new(SubMeshBinding::Owned(SubMesh::new()))),
        }
    }

    fn adopted(engine: EngineRef, mesh: MeshId, index: usize) -> Self {
        Self {
            binding: Rc::new(RefCell::new(SubMeshBinding::Adopted { engine, mesh, index })),
        }
    }

    pub fn is_adopted(&self) -> bool {
        matches!(*self.binding.borrow(), SubMeshBinding::Adopted { .. })
    }

    fn with<R: Default>(&self, f: impl FnOnce(&mut SubMesh) -> R) -> R {
        match &mut *self.binding.borrow_mut() {
            SubMeshBinding::Owned(sub_mesh) => f(sub_mesh),
            SubMeshBinding::Adopted { engine, mesh, index } => {
                let mut engine = engine.borrow_mut();
                engine
                    .meshes
                    .get_mut(*mesh)
                    .and_then(|m| m.sub_meshes.get_mut(*index))
                    .map(f)
                    .unwrap_or_default()
            }
        }
    }

    /// Append a collider triangle; each vertex is stored at its index
    ///
    /// Returns false when an index is out of range or the adopting mesh is
    /// gone.
    pub fn add_triangle(&self, v0: Vertex, i0: u32, v1: Vertex, i1: u32, v2: Vertex, i2: u32) -> bool {
        self.with(|s| {
            s.add_triangle([(v0, i0), (v1, i1), (v2, i2)], TRI_COLLIDER)
                .is_some()
        })
    }

    pub fn set_material_name(&self, name: &str) {
        self.with(|s| s.material_name = name.to_string());
    }

    pub fn material_name(&self) -> String {
        self.with(|s| s.material_name.clone())
    }

    pub fn vertex_count(&self) -> usize {
        self.with(|s| s.vertices.len())
    }

    pub fn triangle_count(&self) -> usize {
        self.with(|s| s.triangles.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use lumen_world::Engine;

    fn triangle(sub: &SubMeshProxy, base: u32) {
        sub.add_triangle(
            Vertex::at(Vec3::ZERO),
            base,
            Vertex::at(Vec3::X),
            base + 1,
            Vertex::at(Vec3::Y),
            base + 2,
        );
    }

    #[test]
    fn test_adoption_is_one_way() {
        let engine = Engine::new_ref();
        let id = {
            let mut e = engine.borrow_mut();
            let scene = e.create_scene("Main").unwrap();
            let obj = e.create_entity(scene, "Ground").unwrap();
            e.object(obj).unwrap().entity().unwrap().mesh.unwrap()
        };
        let mesh = MeshProxy::new(engine.clone(), Some(id));

        let sub = SubMeshProxy::new();
        triangle(&sub, 0);
        sub.set_material_name("Grass");
        assert!(!sub.is_adopted());

        assert!(mesh.add_sub_mesh(&sub));
        assert!(sub.is_adopted());
        assert!(!mesh.add_sub_mesh(&sub));
        assert_eq!(mesh.sub_mesh_count(), 2);

        // Edits now land in the mesh
        triangle(&sub, 3);
        let adopted = mesh.sub_mesh(1).unwrap();
        assert_eq!(adopted.triangle_count(), 2);
        assert_eq!(adopted.vertex_count(), 6);
        assert_eq!(adopted.material_name(), "Grass");

        let e = engine.borrow();
        let stored = &e.meshes.get(id).unwrap().sub_meshes[1];
        assert!(stored.triangles.iter().all(|t| t.is_collider()));
    }

    #[test]
    fn test_out_of_range_triangle_is_skipped() {
        let sub = SubMeshProxy::new();
        assert!(!sub.add_triangle(
            Vertex::at(Vec3::ZERO),
            0,
            Vertex::at(Vec3::X),
            u32::MAX,
            Vertex::at(Vec3::Y),
            2,
        ));
        assert_eq!(sub.triangle_count(), 0);
        assert_eq!(sub.vertex_count(), 0);
    }

    #[test]
    fn test_dead_mesh() {
        let engine = Engine::new_ref();
        let mesh = MeshProxy::new(engine, None);
        assert_eq!(mesh.sub_mesh_count(), 0);
        assert!(mesh.sub_mesh(0).is_none());
        assert!(!mesh.add_sub_mesh(&SubMeshProxy::new()));
    }
}
