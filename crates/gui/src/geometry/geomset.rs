//! `.gset` files: a mesh reference plus the build settings to reuse with it.

use std::path::{Path, PathBuf};

use shared::{BuildSettings, GeomSet};

use super::{read_mesh, read_to_string, GeomError, GeometryAsset};

pub(super) fn load(path: &Path) -> Result<GeometryAsset, GeomError> {
    let text = read_to_string(path)?;
    let set: GeomSet = serde_json::from_str(&text).map_err(|source| GeomError::GeomSet {
        path: path.display().to_string(),
        source,
    })?;

    let mesh_file = path
        .parent()
        .map(|dir| dir.join(&set.geometry))
        .unwrap_or_else(|| PathBuf::from(&set.geometry));
    let mesh = read_mesh(&mesh_file)?;

    let mut asset = GeometryAsset::from_mesh(path, &mesh_file, mesh)?;
    asset.settings = Some(set.settings);
    Ok(asset)
}

pub(super) fn save(asset: &GeometryAsset, settings: &BuildSettings) -> Result<PathBuf, GeomError> {
    let dir = asset.mesh_file.parent().unwrap_or_else(|| Path::new(""));
    let stem = asset
        .mesh_file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "geometry".to_string());
    let target = dir.join(format!("{stem}.gset"));

    let geometry = asset
        .mesh_file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let set = GeomSet {
        geometry,
        settings: settings.clone(),
    };
    let write_err = |source| GeomError::Write {
        path: target.display().to_string(),
        source,
    };
    let json = serde_json::to_string_pretty(&set)
        .map_err(|e| write_err(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;
    std::fs::write(&target, json).map_err(write_err)?;

    tracing::info!("Saved geometry set {}", target.display());
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("navdemo-gset-{name}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn save_then_load_keeps_settings() {
        let dir = scratch_dir("roundtrip");
        let obj = dir.join("plane.obj");
        std::fs::write(&obj, "v 0 0 0\nv 0 0 4\nv 4 0 4\nv 4 0 0\nf 1 2 3 4\n").unwrap();

        let asset = GeometryAsset::load(&obj).unwrap();
        let settings = BuildSettings {
            agent_radius: 1.5,
            nav_mesh_bmin: [0.0, -1.0, 0.0],
            nav_mesh_bmax: [2.0, 1.0, 2.0],
            ..BuildSettings::default()
        };
        let written = asset.save_geom_set(&settings).unwrap();
        assert_eq!(written, dir.join("plane.gset"));

        let reloaded = GeometryAsset::load(&written).unwrap();
        assert_eq!(reloaded.stored_settings(), Some(&settings));
        assert_eq!(reloaded.mesh().triangle_count(), 2);
        assert_eq!(reloaded.nav_mesh_bounds().max, glam::Vec3::new(2.0, 1.0, 2.0));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn malformed_set_is_reported() {
        let dir = scratch_dir("malformed");
        let path = dir.join("broken.gset");
        std::fs::write(&path, "{ not json").unwrap();
        let err = GeometryAsset::load(&path).unwrap_err();
        assert!(matches!(err, GeomError::GeomSet { .. }));
        std::fs::remove_dir_all(&dir).ok();
    }
}
