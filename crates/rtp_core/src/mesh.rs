//! Indexed triangle mesh geometry.
//!
//! A mesh owns the vertex arrays; triangles built from it store only three
//! vertex indices and a shared handle to the mesh, so vertices are never
//! duplicated per triangle.

use rtp_math::{Aabb, Mat4, Vec2, Vec3};
use thiserror::Error;

/// Errors raised while assembling a mesh.
#[derive(Error, Debug, PartialEq)]
pub enum MeshError {
    #[error("index count {0} is not a multiple of 3")]
    RaggedIndices(usize),

    #[error("triangle {triangle} references vertex {index}, mesh has {vertex_count}")]
    IndexOutOfRange {
        triangle: usize,
        index: u32,
        vertex_count: usize,
    },

    #[error("{uvs} texture coordinates for {positions} positions")]
    UvCountMismatch { positions: usize, uvs: usize },
}

/// A mesh consisting of vertex positions, texture coordinates, and triangle indices.
#[derive(Clone, Debug)]
pub struct Mesh {
    /// Vertex positions (one Vec3 per vertex)
    pub positions: Vec<Vec3>,

    /// Texture coordinates, one per vertex. Zero-filled when the source had none.
    pub uvs: Vec<Vec2>,

    /// Triangle indices (every 3 indices form a triangle)
    pub indices: Vec<u32>,

    /// Axis-aligned bounding box of all positions
    pub bounds: Aabb,
}

impl Mesh {
    /// Create a mesh, validating the index buffer against the vertex arrays.
    pub fn new(
        positions: Vec<Vec3>,
        indices: Vec<u32>,
        uvs: Option<Vec<Vec2>>,
    ) -> Result<Self, MeshError> {
        if indices.len() % 3 != 0 {
            return Err(MeshError::RaggedIndices(indices.len()));
        }

        let uvs = match uvs {
            Some(uvs) if uvs.len() != positions.len() => {
                return Err(MeshError::UvCountMismatch {
                    positions: positions.len(),
                    uvs: uvs.len(),
                });
            }
            Some(uvs) => uvs,
            None => vec![Vec2::ZERO; positions.len()],
        };

        if let Some((i, &index)) = indices
            .iter()
            .enumerate()
            .find(|(_, &index)| index as usize >= positions.len())
        {
            return Err(MeshError::IndexOutOfRange {
                triangle: i / 3,
                index,
                vertex_count: positions.len(),
            });
        }

        let bounds = Self::compute_bounds(&positions);
        Ok(Self {
            positions,
            uvs,
            indices,
            bounds,
        })
    }

    /// Compute axis-aligned bounding box from positions.
    fn compute_bounds(positions: &[Vec3]) -> Aabb {
        if positions.is_empty() {
            return Aabb::EMPTY;
        }

        let (min, max) = positions.iter().fold(
            (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
            |(min, max), p| (min.min(*p), max.max(*p)),
        );

        Aabb::new(min, max)
    }

    /// Apply an affine transform to every position, in place.
    ///
    /// Used to place a model in the world before its triangles are handed to
    /// the BVH; the tracer itself has no per-object transforms.
    pub fn transform(&mut self, matrix: &Mat4) {
        for p in &mut self.positions {
            *p = matrix.transform_point3(*p);
        }
        self.bounds = Self::compute_bounds(&self.positions);
    }

    /// Vertex indices of triangle `i`.
    pub fn triangle(&self, i: usize) -> [u32; 3] {
        let base = i * 3;
        [
            self.indices[base],
            self.indices[base + 1],
            self.indices[base + 2],
        ]
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_triangle() -> Vec<Vec3> {
        vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn test_mesh_creation() {
        let mesh = Mesh::new(unit_triangle(), vec![0, 1, 2], None).unwrap();

        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.triangle(0), [0, 1, 2]);
        assert!(mesh.uvs.iter().all(|uv| *uv == Vec2::ZERO));
    }

    #[test]
    fn test_rejects_bad_indices() {
        let err = Mesh::new(unit_triangle(), vec![0, 1, 3], None).unwrap_err();
        assert_eq!(
            err,
            MeshError::IndexOutOfRange {
                triangle: 0,
                index: 3,
                vertex_count: 3
            }
        );

        let err = Mesh::new(unit_triangle(), vec![0, 1], None).unwrap_err();
        assert_eq!(err, MeshError::RaggedIndices(2));
    }

    #[test]
    fn test_rejects_uv_mismatch() {
        let err = Mesh::new(unit_triangle(), vec![0, 1, 2], Some(vec![Vec2::ZERO])).unwrap_err();
        assert_eq!(err, MeshError::UvCountMismatch { positions: 3, uvs: 1 });
    }

    #[test]
    fn test_bounds_computation() {
        let positions = vec![
            Vec3::new(-1.0, -2.0, -3.0),
            Vec3::new(4.0, 5.0, 6.0),
            Vec3::new(0.0, 0.0, 0.0),
        ];
        let mesh = Mesh::new(positions, vec![0, 1, 2], None).unwrap();

        assert_eq!(mesh.bounds.min, Vec3::new(-1.0, -2.0, -3.0));
        assert_eq!(mesh.bounds.max, Vec3::new(4.0, 5.0, 6.0));
    }

    #[test]
    fn test_transform_moves_positions_and_bounds() {
        let mut mesh = Mesh::new(unit_triangle(), vec![0, 1, 2], None).unwrap();
        mesh.transform(&Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0)));

        assert_eq!(mesh.positions[1], Vec3::new(1.0, 0.0, -5.0));
        assert!((mesh.bounds.min.z + 5.0).abs() < 1e-3);
        assert!((mesh.bounds.max.z + 5.0).abs() < 1e-3);
    }
}
