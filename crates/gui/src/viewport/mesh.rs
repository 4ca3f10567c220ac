use glam::Vec3;

use super::picking::Aabb;

/// CPU-side triangle soup: 3 floats per vertex, 3 indices per triangle
#[derive(Clone, Debug, Default)]
pub struct MeshData {
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn vertex(&self, i: usize) -> Vec3 {
        let base = i * 3;
        Vec3::new(
            self.vertices[base],
            self.vertices[base + 1],
            self.vertices[base + 2],
        )
    }

    /// Corner positions of triangle `tri`
    pub fn triangle(&self, tri: usize) -> [Vec3; 3] {
        let base = tri * 3;
        [
            self.vertex(self.indices[base] as usize),
            self.vertex(self.indices[base + 1] as usize),
            self.vertex(self.indices[base + 2] as usize),
        ]
    }

    /// Unit face normal per triangle (zero for degenerate triangles)
    pub fn face_normals(&self) -> Vec<Vec3> {
        (0..self.triangle_count())
            .map(|t| {
                let [a, b, c] = self.triangle(t);
                (b - a).cross(c - a).normalize_or_zero()
            })
            .collect()
    }

    /// Bounds of all vertices, or `None` for an empty buffer
    pub fn bounds(&self) -> Option<Aabb> {
        if self.vertex_count() == 0 {
            return None;
        }
        let mut min = Vec3::splat(f32::MAX);
        let mut max = Vec3::splat(f32::MIN);
        for i in 0..self.vertex_count() {
            let v = self.vertex(i);
            min = min.min(v);
            max = max.max(v);
        }
        Some(Aabb { min, max })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> MeshData {
        MeshData {
            vertices: vec![0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 0.0],
            indices: vec![0, 1, 2],
        }
    }

    #[test]
    fn bounds_cover_all_vertices() {
        let b = ramp().bounds().unwrap();
        assert_eq!(b.min, Vec3::ZERO);
        assert_eq!(b.max, Vec3::ONE);
    }

    #[test]
    fn empty_mesh_has_no_bounds() {
        assert!(MeshData::default().bounds().is_none());
    }

    #[test]
    fn face_normal_is_unit_length() {
        let n = ramp().face_normals()[0];
        assert!((n.length() - 1.0).abs() < 1e-5);
    }
}
