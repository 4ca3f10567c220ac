//! Application settings

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use shared::{BuildSettings, SampleKind};

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("no configuration directory available")]
    NoConfigDir,
    #[error("settings I/O at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("settings JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Folders scanned by the choosers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    /// Input meshes (`.obj`, `.gset`)
    pub meshes: PathBuf,
    /// Test-case scripts (`.json`)
    pub test_cases: PathBuf,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            meshes: PathBuf::from("Meshes"),
            test_cases: PathBuf::from("TestCases"),
        }
    }
}

/// Camera settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    /// World units per second while a movement key is held
    pub move_speed: f32,
    /// Vertical field of view in degrees
    pub fov: f32,
    /// Degrees of rotation per pixel of orbit drag
    pub orbit_sensitivity: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            move_speed: 22.0,
            fov: 50.0,
            orbit_sensitivity: 0.25,
        }
    }
}

/// UI settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// Font size in points
    pub font_size: f32,
    /// Show the menu panels on startup
    pub show_menu: bool,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            font_size: 14.0,
            show_menu: true,
        }
    }
}

/// All application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub paths: PathSettings,
    /// Sample created at startup
    pub default_sample: SampleKind,
    pub camera: CameraSettings,
    pub ui: UiSettings,
    /// Seed settings for newly created samples
    pub build: BuildSettings,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            paths: PathSettings::default(),
            default_sample: SampleKind::TileMesh,
            camera: CameraSettings::default(),
            ui: UiSettings::default(),
            build: BuildSettings::default(),
        }
    }
}

impl AppSettings {
    fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "navdemo", "navdemo")
            .map(|dirs| dirs.config_dir().join("settings.json"))
    }

    /// Load settings from the config dir, or defaults if missing or unreadable
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(SettingsError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Ignoring settings: {e}");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Save settings to the config dir
    pub fn save(&self) -> Result<(), SettingsError> {
        let path = Self::config_path().ok_or(SettingsError::NoConfigDir)?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        let io_err = |source| SettingsError::Io {
            path: path.display().to_string(),
            source,
        };
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(io_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_demo_folders() {
        let settings = AppSettings::default();
        assert_eq!(settings.paths.meshes, PathBuf::from("Meshes"));
        assert_eq!(settings.paths.test_cases, PathBuf::from("TestCases"));
        assert_eq!(settings.default_sample, SampleKind::TileMesh);
        assert_eq!(settings.camera.fov, 50.0);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let settings: AppSettings =
            serde_json::from_str(r#"{"camera": {"move_speed": 100.0}, "default_sample": "Solo Mesh"}"#)
                .unwrap();
        assert_eq!(settings.camera.move_speed, 100.0);
        assert_eq!(settings.camera.orbit_sensitivity, 0.25);
        assert_eq!(settings.default_sample, SampleKind::SoloMesh);
        assert_eq!(settings.ui.font_size, 14.0);
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = std::env::temp_dir().join(format!("navdemo-settings-{}", std::process::id()));
        let path = dir.join("settings.json");
        let mut settings = AppSettings::default();
        settings.ui.font_size = 18.0;
        settings.save_to(&path).unwrap();
        let loaded = AppSettings::load_from(&path).unwrap();
        assert_eq!(loaded.ui.font_size, 18.0);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn malformed_file_is_json_error() {
        let dir = std::env::temp_dir().join(format!("navdemo-settings-bad-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings.json");
        std::fs::write(&path, "[1, 2").unwrap();
        assert!(matches!(AppSettings::load_from(&path), Err(SettingsError::Json(_))));
        std::fs::remove_dir_all(&dir).ok();
    }
}
