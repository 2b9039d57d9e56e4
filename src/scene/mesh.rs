//! Read-only mesh data for picking and preview geometry.
//!
//! The renderer keeps its own vertex/index buffers; this is the CPU-side
//! view the editor needs: positions, triangle indices, and a precomputed
//! local bounding box. Meshes are shared between objects via `Arc`.

use std::sync::Arc;

use cgmath::Vector3;

use crate::geometry::intersect::{Aabb, Triangle};

pub struct MeshData {
    positions: Vec<Vector3<f32>>,
    indices: Vec<u32>,
    local_bounds: Aabb,
}

impl MeshData {
    /// Create mesh data from positions and a triangle index list.
    ///
    /// An empty index list means a non-indexed mesh: triangles are read
    /// from the vertex order directly.
    pub fn new(positions: Vec<Vector3<f32>>, indices: Vec<u32>) -> Self {
        let local_bounds = Aabb::from_points(&positions);
        Self {
            positions,
            indices,
            local_bounds,
        }
    }

    /// The shared unit cube every sketched box references: half-extent 0.5
    /// on all axes, 12 triangles.
    pub fn unit_cube() -> Arc<Self> {
        let positions = vec![
            Vector3::new(-0.5, -0.5, -0.5),
            Vector3::new(0.5, -0.5, -0.5),
            Vector3::new(0.5, 0.5, -0.5),
            Vector3::new(-0.5, 0.5, -0.5),
            Vector3::new(-0.5, -0.5, 0.5),
            Vector3::new(0.5, -0.5, 0.5),
            Vector3::new(0.5, 0.5, 0.5),
            Vector3::new(-0.5, 0.5, 0.5),
        ];
        #[rustfmt::skip]
        let indices = vec![
            // back face
            0, 2, 1,  0, 3, 2,
            // front face
            4, 5, 6,  4, 6, 7,
            // left face
            0, 4, 7,  0, 7, 3,
            // right face
            1, 6, 5,  1, 2, 6,
            // top face
            3, 7, 6,  3, 6, 2,
            // bottom face
            0, 1, 5,  0, 5, 4,
        ];
        Arc::new(Self::new(positions, indices))
    }

    pub fn positions(&self) -> &[Vector3<f32>] {
        &self.positions
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn local_bounds(&self) -> Aabb {
        self.local_bounds
    }

    pub fn triangle_count(&self) -> usize {
        if self.indices.is_empty() {
            self.positions.len() / 3
        } else {
            self.indices.len() / 3
        }
    }

    /// Iterate the mesh triangles in local space.
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        let indexed = !self.indices.is_empty();
        let count = self.triangle_count();
        (0..count).map(move |t| {
            let pick = |k: usize| {
                if indexed {
                    self.positions[self.indices[t * 3 + k] as usize]
                } else {
                    self.positions[t * 3 + k]
                }
            };
            Triangle {
                v0: pick(0),
                v1: pick(1),
                v2: pick(2),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_cube_shape() {
        let cube = MeshData::unit_cube();
        assert_eq!(cube.triangle_count(), 12);
        assert_eq!(cube.local_bounds().min, Vector3::new(-0.5, -0.5, -0.5));
        assert_eq!(cube.local_bounds().max, Vector3::new(0.5, 0.5, 0.5));
    }

    #[test]
    fn non_indexed_mesh_reads_vertex_order() {
        let mesh = MeshData::new(
            vec![
                Vector3::new(0.0, 0.0, 0.0),
                Vector3::new(1.0, 0.0, 0.0),
                Vector3::new(0.0, 1.0, 0.0),
            ],
            Vec::new(),
        );
        assert_eq!(mesh.triangle_count(), 1);
        let tri = mesh.triangles().next().unwrap();
        assert_eq!(tri.v1, Vector3::new(1.0, 0.0, 0.0));
    }
}
