//! Input geometry: the mesh a session builds navigation data from.
//!
//! An asset only exists once its buffers parsed and validated, so bounds
//! and buffers can never disagree.

mod geomset;
mod obj;
mod ply;

pub use obj::parse_obj;
pub use ply::parse_ply;

/// File extensions the level chooser and file dialog offer
pub const GEOMETRY_EXTENSIONS: &[&str] = &["obj", "ply", "gset"];

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use glam::Vec3;
use shared::BuildSettings;

use crate::validation::MeshValidator;
use crate::viewport::debug_draw::{rgba, DebugDraw};
use crate::viewport::mesh::MeshData;
use crate::viewport::picking::{segment_aabb, segment_triangle, Aabb};

/// Identity of one loaded asset. Pipelines hold this instead of a reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GeomHandle(u64);

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

impl GeomHandle {
    fn next() -> Self {
        Self(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GeomError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("invalid mesh: {0}")]
    Invalid(String),
    #[error("unsupported geometry format '{0}'")]
    UnsupportedFormat(String),
    #[error("failed to parse geometry set {path}: {source}")]
    GeomSet {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// A loaded, validated triangle mesh
#[derive(Debug)]
pub struct GeometryAsset {
    handle: GeomHandle,
    path: PathBuf,
    name: String,
    /// Mesh file the buffers came from (differs from `path` for geometry sets)
    mesh_file: PathBuf,
    mesh: MeshData,
    normals: Vec<Vec3>,
    bounds: Aabb,
    settings: Option<BuildSettings>,
}

impl GeometryAsset {
    /// Load an `.obj` or `.ply` mesh, or a `.gset` geometry set
    pub fn load(path: &Path) -> Result<Self, GeomError> {
        if extension(path) == "gset" {
            return geomset::load(path);
        }
        Self::from_mesh(path, path, read_mesh(path)?)
    }

    /// Parse OBJ text that did not come from disk
    pub fn from_obj_str(name: &str, text: &str) -> Result<Self, GeomError> {
        let path = PathBuf::from(name);
        Self::from_mesh(&path, &path, parse_obj(text)?)
    }

    fn from_mesh(path: &Path, mesh_file: &Path, mesh: MeshData) -> Result<Self, GeomError> {
        let errors = MeshValidator::new(&mesh).validate_all();
        if !errors.is_empty() {
            return Err(GeomError::Invalid(errors.join("; ")));
        }
        let bounds = mesh
            .bounds()
            .ok_or_else(|| GeomError::Invalid("mesh has no vertices".into()))?;
        let normals = mesh.face_normals();
        Ok(Self {
            handle: GeomHandle::next(),
            path: path.to_path_buf(),
            name: file_name(path),
            mesh_file: mesh_file.to_path_buf(),
            mesh,
            normals,
            bounds,
            settings: None,
        })
    }

    pub fn handle(&self) -> GeomHandle {
        self.handle
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name shown in the UI and used to tag log dumps
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mesh(&self) -> &MeshData {
        &self.mesh
    }

    /// Unit normal per triangle
    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// Settings stored alongside the mesh in a geometry set
    pub fn stored_settings(&self) -> Option<&BuildSettings> {
        self.settings.as_ref()
    }

    /// Region navigation data should cover: stored set bounds if valid,
    /// otherwise the mesh bounds
    pub fn nav_mesh_bounds(&self) -> Aabb {
        if let Some(settings) = &self.settings {
            let min = Vec3::from(settings.nav_mesh_bmin);
            let max = Vec3::from(settings.nav_mesh_bmax);
            if max.cmpgt(min).all() {
                return Aabb { min, max };
            }
        }
        self.bounds
    }

    /// Parameter along `start..end` of the nearest surface hit
    pub fn raycast(&self, start: Vec3, end: Vec3) -> Option<f32> {
        segment_aabb(start, end, &self.bounds)?;
        (0..self.mesh.triangle_count())
            .filter_map(|tri| {
                let [a, b, c] = self.mesh.triangle(tri);
                segment_triangle(start, end, a, b, c)
            })
            .min_by(|a, b| a.total_cmp(b))
    }

    /// Write `<stem>.gset` next to the mesh with `settings`
    pub fn save_geom_set(&self, settings: &BuildSettings) -> Result<PathBuf, GeomError> {
        geomset::save(self, settings)
    }

    /// Draw the input mesh, shading walkable slopes grey and steep ones orange
    pub fn draw(&self, dd: &mut DebugDraw, walkable_slope_deg: f32) {
        let walkable_y = walkable_slope_deg.to_radians().cos();
        for (tri, normal) in self.normals.iter().enumerate() {
            let color = if normal.y >= walkable_y {
                let shade = (220.0 * (2.0 + normal.x + normal.y) / 4.0).clamp(0.0, 255.0) as u8;
                rgba(shade, shade, shade, 255)
            } else {
                rgba(192, 128, 0, 255)
            };
            dd.triangle(self.mesh.triangle(tri), color);
        }
    }
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default()
}

/// Read a plain mesh file, picking the parser by extension
fn read_mesh(path: &Path) -> Result<MeshData, GeomError> {
    match extension(path).as_str() {
        "obj" => parse_obj(&read_to_string(path)?),
        "ply" => parse_ply(&read_to_string(path)?),
        other => Err(GeomError::UnsupportedFormat(other.to_string())),
    }
}

fn read_to_string(path: &Path) -> Result<String, GeomError> {
    std::fs::read_to_string(path).map_err(|source| GeomError::Read {
        path: path.display().to_string(),
        source,
    })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLANE: &str = "v -5 0 -5\nv -5 0 5\nv 5 0 5\nv 5 0 -5\nf 1 2 3 4\n";

    #[test]
    fn from_obj_str_derives_bounds() {
        let geom = GeometryAsset::from_obj_str("plane.obj", PLANE).unwrap();
        assert_eq!(geom.name(), "plane.obj");
        assert_eq!(geom.bounds().min, Vec3::new(-5.0, 0.0, -5.0));
        assert_eq!(geom.bounds().max, Vec3::new(5.0, 0.0, 5.0));
        assert!(MeshValidator::new(geom.mesh()).bounds_match(&geom.bounds()));
        assert_eq!(geom.normals().len(), 2);
        assert!(geom.normals()[0].y > 0.99);
    }

    #[test]
    fn handles_are_unique() {
        let a = GeometryAsset::from_obj_str("a.obj", PLANE).unwrap();
        let b = GeometryAsset::from_obj_str("a.obj", PLANE).unwrap();
        assert_ne!(a.handle(), b.handle());
    }

    #[test]
    fn raycast_hits_plane() {
        let geom = GeometryAsset::from_obj_str("plane.obj", PLANE).unwrap();
        let t = geom
            .raycast(Vec3::new(1.0, 10.0, 1.0), Vec3::new(1.0, -10.0, 1.0))
            .unwrap();
        assert!((t - 0.5).abs() < 1e-5);
    }

    #[test]
    fn raycast_misses_outside_bounds() {
        let geom = GeometryAsset::from_obj_str("plane.obj", PLANE).unwrap();
        assert!(geom
            .raycast(Vec3::new(20.0, 10.0, 0.0), Vec3::new(20.0, -10.0, 0.0))
            .is_none());
    }

    #[test]
    fn empty_obj_is_invalid() {
        let err = GeometryAsset::from_obj_str("empty.obj", "# nothing\n").unwrap_err();
        assert!(matches!(err, GeomError::Invalid(_)));
    }

    #[test]
    fn unsupported_extension() {
        let err = GeometryAsset::load(Path::new("level.bsp")).unwrap_err();
        assert!(matches!(err, GeomError::UnsupportedFormat(ref e) if e == "bsp"));
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = GeometryAsset::load(Path::new("/definitely/not/here.obj")).unwrap_err();
        assert!(matches!(err, GeomError::Read { .. }));
    }

    #[test]
    fn draw_emits_one_triangle_per_face() {
        let geom = GeometryAsset::from_obj_str("plane.obj", PLANE).unwrap();
        let mut dd = DebugDraw::default();
        geom.draw(&mut dd, 45.0);
        assert_eq!(dd.triangles.len(), 2);
    }
}
