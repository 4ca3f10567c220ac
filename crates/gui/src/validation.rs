//! Mesh validation utilities.
//!
//! `MeshValidator` checks loaded geometry before it becomes an asset:
//! buffer strides, in-range indices, finite coordinates and bounds.

use crate::viewport::mesh::MeshData;
use crate::viewport::picking::Aabb;

/// Validator for `MeshData` integrity checks.
pub struct MeshValidator<'a> {
    mesh: &'a MeshData,
}

impl<'a> MeshValidator<'a> {
    /// Create a new validator for the given mesh.
    pub fn new(mesh: &'a MeshData) -> Self {
        Self { mesh }
    }

    pub fn vertex_count(&self) -> usize {
        self.mesh.vertex_count()
    }

    pub fn triangle_count(&self) -> usize {
        self.mesh.triangle_count()
    }

    /// Check that the vertex buffer length is a multiple of 3.
    pub fn is_stride_valid(&self) -> bool {
        self.mesh.vertices.len() % 3 == 0
    }

    /// Check that the index buffer length is a multiple of 3.
    pub fn is_index_stride_valid(&self) -> bool {
        self.mesh.indices.len() % 3 == 0
    }

    /// Check that all indices are within the valid vertex range.
    pub fn are_indices_in_range(&self) -> bool {
        let max_idx = self.vertex_count() as u32;
        self.mesh.indices.iter().all(|&i| i < max_idx)
    }

    pub fn are_vertices_finite(&self) -> bool {
        self.mesh.vertices.iter().all(|v| v.is_finite())
    }

    /// Check that `bounds` is exactly the box spanned by the vertices.
    pub fn bounds_match(&self, bounds: &Aabb) -> bool {
        self.mesh.bounds().is_some_and(|b| b == *bounds)
    }

    /// Run all validation checks and return a list of error messages.
    /// An empty list means the mesh is valid.
    pub fn validate_all(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.triangle_count() == 0 {
            errors.push("Mesh has no triangles".to_string());
        }

        if !self.is_stride_valid() {
            errors.push(format!(
                "Vertex buffer length {} is not a multiple of 3",
                self.mesh.vertices.len()
            ));
        }

        if !self.is_index_stride_valid() {
            errors.push(format!(
                "Index buffer length {} is not a multiple of 3",
                self.mesh.indices.len()
            ));
        }

        if !self.are_indices_in_range() {
            let max_idx = self.vertex_count() as u32;
            let out_of_range: Vec<_> = self
                .mesh
                .indices
                .iter()
                .filter(|&&i| i >= max_idx)
                .take(5)
                .collect();
            errors.push(format!(
                "Indices out of range (vertex_count={}): {:?}",
                max_idx, out_of_range
            ));
        }

        if !self.are_vertices_finite() {
            errors.push("Some vertex coordinates are not finite".to_string());
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn simple_triangle() -> MeshData {
        MeshData {
            vertices: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0],
            indices: vec![0, 1, 2],
        }
    }

    #[test]
    fn test_valid_triangle() {
        let mesh = simple_triangle();
        let v = MeshValidator::new(&mesh);
        assert_eq!(v.vertex_count(), 3);
        assert_eq!(v.triangle_count(), 1);
        assert!(v.validate_all().is_empty());
    }

    #[test]
    fn test_indices_out_of_range() {
        let mut mesh = simple_triangle();
        mesh.indices[2] = 7;
        let errors = MeshValidator::new(&mesh).validate_all();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("out of range"));
    }

    #[test]
    fn test_stride_invalid() {
        let mut mesh = simple_triangle();
        mesh.vertices.push(1.0);
        assert!(!MeshValidator::new(&mesh).is_stride_valid());
    }

    #[test]
    fn test_non_finite_vertex() {
        let mut mesh = simple_triangle();
        mesh.vertices[4] = f32::NAN;
        assert!(!MeshValidator::new(&mesh).are_vertices_finite());
    }

    #[test]
    fn test_empty_mesh_rejected() {
        let mesh = MeshData::default();
        assert!(!MeshValidator::new(&mesh).validate_all().is_empty());
    }

    #[test]
    fn test_bounds_match() {
        let mesh = simple_triangle();
        let v = MeshValidator::new(&mesh);
        assert!(v.bounds_match(&Aabb {
            min: Vec3::ZERO,
            max: Vec3::new(1.0, 0.0, 1.0),
        }));
        assert!(!v.bounds_match(&Aabb {
            min: Vec3::ZERO,
            max: Vec3::ONE,
        }));
    }
}
