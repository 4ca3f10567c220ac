//! The interactive session: one geometry asset, one sample pipeline, the
//! camera, the build log and test-case replay, driven by input events and
//! the frame clock.
//!
//! Everything the window layer needs goes through [`Session`]; nothing here
//! touches a windowing or rendering API.

pub mod input;
pub mod timing;

pub use input::{InputEvent, Key, Modifiers, MouseButton};
pub use timing::FixedStep;

use std::path::{Path, PathBuf};

use glam::{Vec2, Vec3};
use shared::{BuildSettings, SampleKind};

use crate::build::{build_log_header, load_log_header, BuildLog};
use crate::geometry::{GeometryAsset, GEOMETRY_EXTENSIONS};
use crate::replay::{self, ReplayReport, ReplayState, TestCase};
use crate::sample::{create_sample, SamplePipeline};
use crate::state::{AppSettings, Chooser, PanelVisibility};
use crate::viewport::camera::{FlyCamera, MoveKeys};
use crate::viewport::debug_draw::{rgba, DebugDraw, Overlay};
use crate::viewport::picking::{project, PickRay, Viewport};

/// Screen radius of the marker circle in pixels
pub const MARKER_RADIUS: f32 = 25.0;

/// What a pick resolved to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PickOutcome {
    /// No geometry, no pipeline, or the cursor could not be unprojected
    Ignored,
    MarkerSet(Vec3),
    MarkerCleared,
    /// Forwarded to the pipeline's click handler
    Clicked { origin: Vec3, point: Vec3, extend: bool },
    Missed,
}

/// Sorted names of the files in `dir` with one of `extensions`; empty if unreadable
fn list_files(dir: &Path, extensions: &[&str]) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        tracing::debug!("Cannot list {}", dir.display());
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
        })
        .filter_map(|p| p.file_name().and_then(|n| n.to_str()).map(str::to_string))
        .collect();
    names.sort();
    names
}

pub struct Session {
    geometry: Option<GeometryAsset>,
    sample: Option<Box<dyn SamplePipeline>>,
    camera: FlyCamera,
    log: BuildLog,
    marker: Option<Vec3>,
    replay: ReplayState,
    step: FixedStep,
    panels: PanelVisibility,
    viewport: Viewport,
    mouse: Vec2,
    pointer_over_overlay: bool,
    pending_pick: Option<(Vec2, Modifiers)>,
    quit_requested: bool,
    scroll_log: bool,
    meshes_dir: PathBuf,
    test_cases_dir: PathBuf,
    default_build: BuildSettings,
}

impl Session {
    /// Fresh session holding the configured default sample and no geometry
    pub fn new(settings: &AppSettings) -> Self {
        let mut camera = FlyCamera::new();
        camera.move_speed = settings.camera.move_speed;
        camera.fov = settings.camera.fov;
        camera.orbit_sensitivity = settings.camera.orbit_sensitivity;

        let panels = PanelVisibility {
            menu: settings.ui.show_menu,
            ..PanelVisibility::default()
        };

        Self {
            geometry: None,
            sample: Some(create_sample(settings.default_sample, &settings.build)),
            camera,
            log: BuildLog::new(),
            marker: None,
            replay: ReplayState::Idle,
            step: FixedStep::default(),
            panels,
            viewport: Viewport::new(1280.0, 800.0),
            mouse: Vec2::ZERO,
            pointer_over_overlay: false,
            pending_pick: None,
            quit_requested: false,
            scroll_log: false,
            meshes_dir: settings.paths.meshes.clone(),
            test_cases_dir: settings.paths.test_cases.clone(),
            default_build: settings.build.clone(),
        }
    }

    // ---- accessors ----

    pub fn geometry(&self) -> Option<&GeometryAsset> {
        self.geometry.as_ref()
    }

    pub fn sample(&self) -> Option<&dyn SamplePipeline> {
        self.sample.as_deref()
    }

    pub fn sample_mut(&mut self) -> Option<&mut (dyn SamplePipeline + 'static)> {
        self.sample.as_deref_mut()
    }

    pub fn camera(&self) -> &FlyCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut FlyCamera {
        &mut self.camera
    }

    pub fn log(&self) -> &BuildLog {
        &self.log
    }

    pub fn marker(&self) -> Option<Vec3> {
        self.marker
    }

    pub fn replay(&self) -> &ReplayState {
        &self.replay
    }

    pub fn panels(&self) -> &PanelVisibility {
        &self.panels
    }

    pub fn panels_mut(&mut self) -> &mut PanelVisibility {
        &mut self.panels
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = Viewport::new(width, height);
    }

    pub fn mouse(&self) -> Vec2 {
        self.mouse
    }

    /// Overlay widgets under the pointer block picks, orbit start and wheel zoom
    pub fn set_pointer_over_overlay(&mut self, over: bool) {
        self.pointer_over_overlay = over;
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// True once after a failure surfaced the log
    pub fn take_scroll_log(&mut self) -> bool {
        std::mem::take(&mut self.scroll_log)
    }

    pub fn meshes_dir(&self) -> &Path {
        &self.meshes_dir
    }

    pub fn test_cases_dir(&self) -> &Path {
        &self.test_cases_dir
    }

    /// Mesh and geometry-set files available to the level chooser
    pub fn list_meshes(&self) -> Vec<String> {
        list_files(&self.meshes_dir, GEOMETRY_EXTENSIONS)
    }

    /// Scripts available to the test-case chooser
    pub fn list_test_cases(&self) -> Vec<String> {
        list_files(&self.test_cases_dir, &["json"])
    }

    fn surface_log(&mut self) {
        self.panels.show_log();
        self.scroll_log = true;
    }

    // ---- lifecycle ----

    /// Replace the pipeline with a new one of `kind`, attached to the current geometry
    pub fn select_sample(&mut self, kind: SampleKind) {
        let mut sample = create_sample(kind, &self.default_build);
        if let Some(geom) = &self.geometry {
            sample.handle_mesh_changed(Some(geom));
        }
        sample.handle_settings_changed();
        tracing::info!("Selected sample {} {}", kind, sample.id());
        self.sample = Some(sample);

        if self.replay.is_loaded() {
            self.replay = ReplayState::Idle;
        }
        if let Some(geom) = &self.geometry {
            self.camera.frame_on(Some(geom.nav_mesh_bounds()));
        }
    }

    /// Load the asset at `path`, replacing the current one.
    ///
    /// On failure the geometry is absent and the pipeline stays alive but
    /// detached.
    pub fn load_geometry(&mut self, path: &Path) -> bool {
        self.log.reset();
        match GeometryAsset::load(path) {
            Ok(geom) => {
                if let Some(sample) = self.sample.as_mut() {
                    sample.handle_mesh_changed(Some(&geom));
                }
                self.camera.frame_on(Some(geom.nav_mesh_bounds()));
                self.log.progress(format!(
                    "Loaded {}: {} vertices, {} triangles",
                    geom.name(),
                    geom.mesh().vertex_count(),
                    geom.mesh().triangle_count()
                ));
                tracing::info!("Loaded geometry {}", path.display());
                self.geometry = Some(geom);
                self.marker = None;
                true
            }
            Err(e) => {
                if let Some(sample) = self.sample.as_mut() {
                    sample.handle_mesh_changed(None);
                }
                self.geometry = None;
                self.marker = None;
                self.log
                    .error(format!("Could not load '{}': {e}", path.display()));
                self.log.dump(&load_log_header(&path.display().to_string()));
                self.surface_log();
                false
            }
        }
    }

    /// Build the current geometry with the current pipeline.
    ///
    /// Without both present nothing happens and false is returned.
    pub fn build(&mut self) -> bool {
        let built = self.build_current();
        if built && !matches!(self.replay, ReplayState::Idle) {
            tracing::debug!("Discarding test case after interactive build");
            self.replay = ReplayState::Idle;
        }
        built
    }

    fn build_current(&mut self) -> bool {
        let (Some(geom), Some(sample)) = (self.geometry.as_ref(), self.sample.as_mut()) else {
            tracing::warn!("Build skipped: geometry and sample are both required");
            return false;
        };
        self.log.reset();
        let built = sample.build(geom, &mut self.log);
        if !built {
            self.log.error(format!("Build of {} failed", geom.name()));
        }
        let header = build_log_header(geom.name());
        self.log.progress(header.clone());
        self.log.dump(&header);
        if !built {
            self.surface_log();
        }
        built
    }

    /// Advance the fixed-step clock and run due pipeline updates
    pub fn tick(&mut self, dt: f32) {
        let steps = self.step.advance(dt);
        if let Some(sample) = self.sample.as_mut() {
            for _ in 0..steps {
                sample.update(timing::STEP_DT);
            }
        }
    }

    /// Write the current bounds and pipeline settings as a geometry set
    pub fn save_geometry_settings(&mut self) -> Option<PathBuf> {
        let (Some(geom), Some(sample)) = (self.geometry.as_ref(), self.sample.as_ref()) else {
            return None;
        };
        let mut settings = BuildSettings::default();
        sample.collect_build_settings(&mut settings);
        let bounds = geom.nav_mesh_bounds();
        settings.nav_mesh_bmin = bounds.min.to_array();
        settings.nav_mesh_bmax = bounds.max.to_array();
        match geom.save_geom_set(&settings) {
            Ok(path) => Some(path),
            Err(e) => {
                self.log.error(e.to_string());
                self.surface_log();
                None
            }
        }
    }

    // ---- picking ----

    /// Resolve a pick at `cursor` (GL window coordinates)
    pub fn handle_pick(&mut self, cursor: Vec2, modifiers: Modifiers) -> PickOutcome {
        let (Some(geom), Some(sample)) = (self.geometry.as_ref(), self.sample.as_mut()) else {
            return PickOutcome::Ignored;
        };
        let view = self.camera.view_matrix();
        let proj = self.camera.projection_matrix(&self.viewport);
        let Some(ray) = PickRay::from_screen(cursor, &view, &proj, &self.viewport) else {
            return PickOutcome::Ignored;
        };

        match geom.raycast(ray.start, ray.end) {
            Some(t) => {
                let point = ray.point_at(t);
                if modifiers.ctrl {
                    self.marker = Some(point);
                    PickOutcome::MarkerSet(point)
                } else {
                    sample.handle_click(ray.start, point, modifiers.shift);
                    PickOutcome::Clicked {
                        origin: ray.start,
                        point,
                        extend: modifiers.shift,
                    }
                }
            }
            None if modifiers.ctrl => {
                self.marker = None;
                PickOutcome::MarkerCleared
            }
            None => PickOutcome::Missed,
        }
    }

    // ---- input ----

    pub fn handle_event(&mut self, event: InputEvent) {
        match event {
            InputEvent::Quit | InputEvent::KeyDown(Key::Escape) => self.quit_requested = true,
            InputEvent::KeyDown(Key::Tab) => self.panels.menu = !self.panels.menu,
            InputEvent::KeyDown(Key::T) => self.panels.toggle_chooser(Chooser::TestCase),
            InputEvent::KeyDown(Key::Space) => {
                if let Some(sample) = self.sample.as_mut() {
                    sample.handle_toggle();
                }
            }
            InputEvent::KeyDown(Key::Num1) => {
                if let Some(sample) = self.sample.as_mut() {
                    sample.handle_step();
                }
            }
            InputEvent::KeyDown(Key::Num9) => {
                self.save_geometry_settings();
            }
            InputEvent::MouseMove(pos) => {
                self.mouse = pos;
                if self.camera.is_orbiting() {
                    self.camera.drag_orbit(pos);
                }
            }
            InputEvent::MouseDown { button, pos, modifiers } => {
                self.mouse = pos;
                if self.pointer_over_overlay {
                    return;
                }
                match button {
                    MouseButton::Secondary => self.camera.begin_orbit(pos),
                    MouseButton::Primary => self.pending_pick = Some((pos, modifiers)),
                }
            }
            InputEvent::MouseUp { button, pos, modifiers } => {
                self.mouse = pos;
                if button == MouseButton::Secondary && self.camera.is_orbiting() {
                    self.camera.drag_orbit(pos);
                    if self.camera.end_orbit() && !self.pointer_over_overlay {
                        let modifiers = Modifiers {
                            shift: true,
                            ..modifiers
                        };
                        self.pending_pick = Some((pos, modifiers));
                    }
                }
            }
            InputEvent::Wheel(steps) => {
                if !self.pointer_over_overlay && steps != 0.0 {
                    self.camera.scroll(steps.signum());
                }
            }
        }
    }

    /// One frame's update phase: pending pick, fixed-step updates, camera movement
    pub fn frame(&mut self, dt: f32, keys: &MoveKeys, modifiers: Modifiers) {
        if let Some((cursor, pick_mods)) = self.pending_pick.take() {
            self.handle_pick(cursor, pick_mods);
        }
        self.tick(dt);
        self.camera.update_movement(keys, modifiers.shift, dt);
    }

    // ---- rendering ----

    /// Collect world-space primitives for this frame
    pub fn render(&self, dd: &mut DebugDraw) {
        if let Some(geom) = &self.geometry {
            let slope = self
                .sample
                .as_ref()
                .map(|s| s.settings().agent_max_slope)
                .unwrap_or(self.default_build.agent_max_slope);
            geom.draw(dd, slope);
        }
        if let Some(sample) = &self.sample {
            sample.render(dd);
        }
        if let Some(report) = self.replay.report() {
            replay::draw_results(report, dd);
        }
    }

    /// Collect screen-space overlay items; true when an overlay wants the pointer
    pub fn render_overlay(&self, overlay: &mut Overlay) -> bool {
        let view = self.camera.view_matrix();
        let proj = self.camera.projection_matrix(&self.viewport);
        let mut captured = self
            .sample
            .as_ref()
            .is_some_and(|s| s.render_overlay(&proj, &view, &self.viewport, overlay));
        if let Some(report) = self.replay.report() {
            captured |= replay::draw_result_labels(report, &proj, &view, &self.viewport, self.mouse, overlay);
        }

        if let Some(marker) = self.marker {
            if let Some(win) = project(marker, &view, &proj, &self.viewport) {
                if win.z < 1.0 {
                    overlay.circle(Vec2::new(win.x, win.y), MARKER_RADIUS, rgba(240, 220, 0, 196));
                }
            }
        }
        captured
    }

    // ---- test cases ----

    /// Parse `path` and hold it as the loaded test case
    pub fn load_test_case(&mut self, path: &Path) -> bool {
        match TestCase::load(path) {
            Ok(case) => {
                self.start_test_case(case);
                true
            }
            Err(e) => {
                tracing::warn!("{e}");
                self.log.error(e.to_string());
                self.surface_log();
                false
            }
        }
    }

    /// Hold an already parsed test case, replacing any previous one
    pub fn start_test_case(&mut self, case: TestCase) {
        tracing::info!("Loaded test case {}", case.name());
        self.replay = ReplayState::Loaded(case);
    }

    /// Replay the loaded test case. Returns None when nothing is loaded.
    pub fn run_test_case(&mut self) -> Option<ReplayReport> {
        let case = match std::mem::take(&mut self.replay) {
            ReplayState::Loaded(case) => case,
            other => {
                self.replay = other;
                return None;
            }
        };
        self.replay = ReplayState::Running(case.clone());
        tracing::info!("Running test case {}", case.name());

        let kind = case.sample_kind();
        self.sample = kind.map(|kind| create_sample(kind, &self.default_build));

        let geom_path = self.meshes_dir.join(&case.script.geometry);
        if !self.load_geometry(&geom_path) {
            let report = ReplayReport::aborted(format!("could not load {}", geom_path.display()));
            tracing::warn!("Test case {}: {}", case.name(), report.summary());
            self.replay = ReplayState::Done {
                case,
                report: report.clone(),
            };
            return Some(report);
        }
        if kind.is_none() {
            tracing::warn!("Unknown sample '{}'", case.script.sample);
            self.log.warn(format!("Unknown sample '{}'", case.script.sample));
        }

        if let Some(sample) = self.sample.as_mut() {
            if let Some(overrides) = &case.script.settings {
                *sample.settings_mut() = overrides.clone();
            }
            sample.handle_settings_changed();
        }

        self.build_current();
        if let Some(geom) = &self.geometry {
            self.camera.frame_on(Some(geom.nav_mesh_bounds()));
        }

        let report = ReplayReport {
            results: replay::evaluate(&case.script.tests, self.sample.as_deref()),
            aborted: None,
        };
        tracing::info!("Test case {}: {}", case.name(), report.summary());
        self.replay = ReplayState::Done {
            case,
            report: report.clone(),
        };
        Some(report)
    }
}
