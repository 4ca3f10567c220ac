//! Headless test harness driving a [`Session`] without a window.
//!
//! Each harness owns a scratch directory with `Meshes/` (fixture meshes
//! already written) and `TestCases/`, removed again on drop.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use glam::{Vec2, Vec3};
use shared::{SampleKind, TestScript};

use crate::fixtures;
use crate::replay::ReplayReport;
use crate::session::{InputEvent, Modifiers, MouseButton, PickOutcome, Session};
use crate::state::AppSettings;
use crate::validation::MeshValidator;
use crate::viewport::camera::MoveKeys;
use crate::viewport::picking::project;

static NEXT_DIR: AtomicU64 = AtomicU64::new(0);

/// Frame time used by [`TestHarness::frame`]
pub const FRAME_DT: f32 = 1.0 / 60.0;

/// Headless test harness: a session plus its scratch folders
pub struct TestHarness {
    pub session: Session,
    root: PathBuf,
}

impl TestHarness {
    /// Create a session with the default sample and fixture meshes on disk
    pub fn new() -> Self {
        let root = std::env::temp_dir().join(format!(
            "navdemo-harness-{}-{}",
            std::process::id(),
            NEXT_DIR.fetch_add(1, Ordering::Relaxed)
        ));
        let mut settings = AppSettings::default();
        settings.paths.meshes = root.join("Meshes");
        settings.paths.test_cases = root.join("TestCases");

        if let Err(e) = fixtures::write_meshes(&settings.paths.meshes)
            .and_then(|_| std::fs::create_dir_all(&settings.paths.test_cases))
        {
            tracing::warn!("Could not prepare harness folders in {}: {e}", root.display());
        }

        Self {
            session: Session::new(&settings),
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn mesh_path(&self, name: &str) -> PathBuf {
        self.session.meshes_dir().join(name)
    }

    // ── Session shortcuts ─────────────────────────────────────

    /// Load a mesh from the fixture folder
    pub fn load(&mut self, name: &str) -> bool {
        let path = self.mesh_path(name);
        self.session.load_geometry(&path)
    }

    pub fn select(&mut self, kind: SampleKind) {
        self.session.select_sample(kind);
    }

    pub fn build(&mut self) -> bool {
        self.session.build()
    }

    /// Write `script` into the test-case folder and return its path
    pub fn write_test_case(&self, name: &str, script: &TestScript) -> PathBuf {
        let path = self.session.test_cases_dir().join(name);
        match serde_json::to_string_pretty(script) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&path, json) {
                    tracing::warn!("Could not write {}: {e}", path.display());
                }
            }
            Err(e) => tracing::warn!("Could not serialize test case: {e}"),
        }
        path
    }

    /// Write, load and run `script` in one go
    pub fn run_script(&mut self, name: &str, script: &TestScript) -> Option<ReplayReport> {
        let path = self.write_test_case(name, script);
        if !self.session.load_test_case(&path) {
            return None;
        }
        self.session.run_test_case()
    }

    // ── Input ─────────────────────────────────────────────────

    /// Run one frame with no keys held
    pub fn frame(&mut self) {
        self.session.frame(FRAME_DT, &MoveKeys::default(), Modifiers::NONE);
    }

    /// Point the camera straight down at `target` from `height` above it
    pub fn look_down_at(&mut self, target: Vec3, height: f32) {
        let camera = self.session.camera_mut();
        camera.position = target + Vec3::Y * height;
        camera.yaw = 90.0;
        camera.pitch = 0.0;
        camera.radius = camera.radius.max(height);
    }

    /// Window position of a world point under the current camera
    pub fn screen_of(&self, world: Vec3) -> Option<Vec2> {
        let camera = self.session.camera();
        let view = camera.view_matrix();
        let proj = camera.projection_matrix(self.session.viewport());
        project(world, &view, &proj, self.session.viewport()).map(|w| Vec2::new(w.x, w.y))
    }

    /// Pick directly at the window position of `world`
    pub fn pick_at(&mut self, world: Vec3, modifiers: Modifiers) -> PickOutcome {
        match self.screen_of(world) {
            Some(cursor) => self.session.handle_pick(cursor, modifiers),
            None => PickOutcome::Ignored,
        }
    }

    /// Press and release `button` at `pos`, dragging through `path` in between,
    /// then run a frame so any pending pick resolves
    pub fn click(&mut self, button: MouseButton, pos: Vec2, path: &[Vec2], modifiers: Modifiers) {
        self.session.handle_event(InputEvent::MouseDown {
            button,
            pos,
            modifiers,
        });
        let mut last = pos;
        for &p in path {
            self.session.handle_event(InputEvent::MouseMove(p));
            last = p;
        }
        self.session.handle_event(InputEvent::MouseUp {
            button,
            pos: last,
            modifiers,
        });
        self.frame();
    }

    // ── Inspection ────────────────────────────────────────────

    /// Validator over the loaded geometry, if any
    pub fn validate_geometry(&self) -> Option<MeshValidator<'_>> {
        self.session.geometry().map(|g| MeshValidator::new(g.mesh()))
    }

    /// True when the asset is absent, or present with bounds matching its buffers
    pub fn geometry_consistent(&self) -> bool {
        match self.session.geometry() {
            Some(geom) => {
                let v = MeshValidator::new(geom.mesh());
                v.validate_all().is_empty() && v.bounds_match(&geom.bounds())
            }
            None => true,
        }
    }

    pub fn log_lines(&self) -> Vec<String> {
        self.session.log().lines()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TestHarness {
    fn drop(&mut self) {
        std::fs::remove_dir_all(&self.root).ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_harness_has_default_sample() {
        let h = TestHarness::new();
        assert!(h.session.geometry().is_none());
        assert_eq!(h.session.sample().map(|s| s.kind()), Some(SampleKind::TileMesh));
        assert!(h.mesh_path("arena.obj").exists());
    }

    #[test]
    fn test_load_and_build_arena() {
        let mut h = TestHarness::new();
        assert!(h.load("arena.obj"));
        assert!(h.geometry_consistent());
        assert!(h.build());
        assert!(h.log_lines().iter().any(|l| l.starts_with("Build took")));
    }

    #[test]
    fn test_harness_dirs_are_distinct() {
        let a = TestHarness::new();
        let b = TestHarness::new();
        assert_ne!(a.root(), b.root());
    }

    #[test]
    fn test_scratch_dir_removed_on_drop() {
        let root = {
            let h = TestHarness::new();
            h.root().to_path_buf()
        };
        assert!(!root.exists());
    }
}
