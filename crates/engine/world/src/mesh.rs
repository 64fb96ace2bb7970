//! Triangle meshes built from submeshes

use glam::{Vec2, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub color: [f32; 4],
    pub uv: Vec2,
}

impl Vertex {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            color: [1.0; 4],
            ..Self::default()
        }
    }
}

/// Triangle flag: the triangle takes part in collision shapes
pub const TRI_COLLIDER: u32 = 1 << 0;

/// Vertex indices must stay below this
pub const MAX_SUBMESH_VERTICES: u32 = 1 << 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triangle {
    pub indices: [u32; 3],
    pub flags: u32,
}

impl Triangle {
    pub fn is_collider(&self) -> bool {
        self.flags & TRI_COLLIDER != 0
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubMesh {
    pub material_name: String,
    pub vertices: Vec<Vertex>,
    pub triangles: Vec<Triangle>,
}

impl SubMesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a triangle, writing each vertex at its index
    ///
    /// The vertex buffer grows as needed; slots not named by any triangle keep
    /// default vertices. Returns `None` and leaves the submesh untouched when
    /// an index reaches [`MAX_SUBMESH_VERTICES`].
    pub fn add_triangle(
        &mut self,
        corners: [(Vertex, u32); 3],
        flags: u32,
    ) -> Option<Triangle> {
        if corners.iter().any(|(_, index)| *index >= MAX_SUBMESH_VERTICES) {
            return None;
        }
        let mut indices = [0u32; 3];
        for (slot, (vertex, index)) in corners.into_iter().enumerate() {
            let at = index as usize;
            if self.vertices.len() <= at {
                self.vertices.resize(at + 1, Vertex::default());
            }
            self.vertices[at] = vertex;
            indices[slot] = index;
        }
        let triangle = Triangle { indices, flags };
        self.triangles.push(triangle);
        Some(triangle)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub name: String,
    pub sub_meshes: Vec<SubMesh>,
}

impl Mesh {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sub_meshes: Vec::new(),
        }
    }

    /// Take ownership of a submesh, returns its index
    pub fn add_sub_mesh(&mut self, sub_mesh: SubMesh) -> usize {
        self.sub_meshes.push(sub_mesh);
        self.sub_meshes.len() - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_triangle_places_vertices() {
        let mut sub = SubMesh::new();
        let tri = sub.add_triangle(
            [
                (Vertex::at(Vec3::ZERO), 0),
                (Vertex::at(Vec3::X), 1),
                (Vertex::at(Vec3::Y), 3),
            ],
            TRI_COLLIDER,
        )
        .unwrap();

        assert_eq!(tri.indices, [0, 1, 3]);
        assert!(tri.is_collider());
        assert_eq!(sub.vertices.len(), 4);
        assert_eq!(sub.vertices[3].position, Vec3::Y);
        assert_eq!(sub.triangles.len(), 1);
    }

    #[test]
    fn test_add_triangle_rejects_huge_index() {
        let mut sub = SubMesh::new();
        let corners = [
            (Vertex::at(Vec3::ZERO), 0),
            (Vertex::at(Vec3::X), 4_000_000_000),
            (Vertex::at(Vec3::Y), 2),
        ];
        assert!(sub.add_triangle(corners, TRI_COLLIDER).is_none());
        assert!(sub.vertices.is_empty());
        assert!(sub.triangles.is_empty());

        let last = MAX_SUBMESH_VERTICES - 1;
        let corners = [
            (Vertex::at(Vec3::ZERO), 0),
            (Vertex::at(Vec3::X), 1),
            (Vertex::at(Vec3::Y), last),
        ];
        assert!(sub.add_triangle(corners, 0).is_some());
        assert_eq!(sub.vertices.len(), MAX_SUBMESH_VERTICES as usize);
    }
}
