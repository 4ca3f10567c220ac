//! Sample pipelines: the swappable build/edit back-ends a session drives.
//!
//! The session owns exactly one `Box<dyn SamplePipeline>` at a time and
//! lends it the geometry asset for the duration of each call. A pipeline
//! only remembers the asset's [`GeomHandle`].

pub mod nav_surface;
mod solo_mesh;
mod temp_obstacles;
mod tile_mesh;

pub use nav_surface::{NavPoly, NavSurface};
pub use solo_mesh::SoloMeshSample;
pub use temp_obstacles::{Obstacle, TempObstaclesSample};
pub use tile_mesh::TileMeshSample;

use std::sync::atomic::{AtomicU64, Ordering};

use glam::{Mat4, Vec3};
use shared::{BuildSettings, Query, SampleKind};

use crate::build::BuildLog;
use crate::geometry::{GeomHandle, GeometryAsset};
use crate::viewport::debug_draw::{DebugDraw, Overlay};
use crate::viewport::picking::{Aabb, Viewport};

/// Identity of one pipeline instance
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PipelineId(u64);

static NEXT_PIPELINE: AtomicU64 = AtomicU64::new(1);

impl PipelineId {
    fn next() -> Self {
        Self(NEXT_PIPELINE.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for PipelineId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What the pipeline draws over the input mesh
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DrawMode {
    /// Input mesh only
    InputMesh,
    /// Walkable polygons in one colour
    #[default]
    Walkable,
    /// Polygons tinted by region
    Regions,
    /// Only polygons the tool has disabled
    Disabled,
}

impl DrawMode {
    pub fn name(&self) -> &'static str {
        match self {
            DrawMode::InputMesh => "Input Mesh",
            DrawMode::Walkable => "Walkable",
            DrawMode::Regions => "Regions",
            DrawMode::Disabled => "Disabled Polys",
        }
    }

    pub fn all() -> &'static [DrawMode] {
        &[
            DrawMode::InputMesh,
            DrawMode::Walkable,
            DrawMode::Regions,
            DrawMode::Disabled,
        ]
    }

    /// Whether the mode has anything to show before a build
    pub fn needs_surface(&self) -> bool {
        !matches!(self, DrawMode::InputMesh)
    }
}

/// State every bundled sample carries
#[derive(Debug)]
pub struct PipelineCore {
    id: PipelineId,
    kind: SampleKind,
    geom: Option<GeomHandle>,
    nav_bounds: Option<Aabb>,
    pub settings: BuildSettings,
    pub surface: Option<NavSurface>,
    pub draw_mode: DrawMode,
}

impl PipelineCore {
    pub fn new(kind: SampleKind, settings: BuildSettings) -> Self {
        Self {
            id: PipelineId::next(),
            kind,
            geom: None,
            nav_bounds: None,
            settings,
            surface: None,
            draw_mode: DrawMode::default(),
        }
    }

    fn attach(&mut self, geom: Option<&GeometryAsset>) {
        self.surface = None;
        match geom {
            Some(geom) => {
                self.geom = Some(geom.handle());
                self.nav_bounds = Some(geom.nav_mesh_bounds());
                if let Some(stored) = geom.stored_settings() {
                    self.settings = stored.clone();
                }
            }
            None => {
                self.geom = None;
                self.nav_bounds = None;
            }
        }
    }

    pub fn nav_bounds(&self) -> Option<Aabb> {
        self.nav_bounds
    }
}

/// Capability set of a sample pipeline.
///
/// Implementors supply [`Self::core`]/[`Self::core_mut`] and override the
/// hooks they care about; the provided methods cover attach, build and
/// queries over the shared walkable surface.
pub trait SamplePipeline {
    fn core(&self) -> &PipelineCore;
    fn core_mut(&mut self) -> &mut PipelineCore;

    /// Called after the core changed attachment; drop per-geometry edits here
    fn reset_edits(&mut self) {}

    /// Whether a built polygon currently participates in queries
    fn is_poly_enabled(&self, _poly: usize) -> bool {
        true
    }

    fn handle_click(&mut self, origin: Vec3, point: Vec3, extend: bool);

    fn tool_hint(&self) -> &'static str;

    /// Draw pipeline-specific extras on top of the surface
    fn render_extras(&self, _dd: &mut DebugDraw) {}

    fn kind(&self) -> SampleKind {
        self.core().kind
    }

    fn id(&self) -> PipelineId {
        self.core().id
    }

    fn attached_geometry(&self) -> Option<GeomHandle> {
        self.core().geom
    }

    /// Attach `geom`, or detach when `None`. Built data is discarded either way.
    fn handle_mesh_changed(&mut self, geom: Option<&GeometryAsset>) {
        self.core_mut().attach(geom);
        self.reset_edits();
    }

    fn handle_settings_changed(&mut self) {
        let core = self.core();
        tracing::debug!(
            "{} {} settings changed (cell size {}, agent radius {})",
            core.kind,
            core.id,
            core.settings.cell_size,
            core.settings.agent_radius
        );
    }

    fn settings(&self) -> &BuildSettings {
        &self.core().settings
    }

    fn settings_mut(&mut self) -> &mut BuildSettings {
        &mut self.core_mut().settings
    }

    /// Copy the settings a rebuild would use into `out`
    fn collect_build_settings(&self, out: &mut BuildSettings) {
        let core = self.core();
        *out = core.settings.clone();
        if let Some(bounds) = core.nav_bounds {
            out.nav_mesh_bmin = bounds.min.to_array();
            out.nav_mesh_bmax = bounds.max.to_array();
        }
    }

    fn build(&mut self, geom: &GeometryAsset, log: &mut BuildLog) -> bool {
        if self.attached_geometry() != Some(geom.handle()) {
            log.error(format!("{} is not attached to this pipeline.", geom.name()));
            return false;
        }
        let surface = NavSurface::build(geom, &self.core().settings, log);
        let built = surface.is_some();
        self.core_mut().surface = surface;
        self.reset_edits();
        log.progress(format!("Build took {:.1}ms", log.elapsed_ms()));
        built
    }

    fn draw_mode(&self) -> DrawMode {
        self.core().draw_mode
    }

    fn set_draw_mode(&mut self, mode: DrawMode) {
        let core = self.core_mut();
        if core.draw_mode != mode {
            tracing::debug!("{} draw mode {}", core.id, mode.name());
            core.draw_mode = mode;
        }
    }

    fn update(&mut self, _dt: f32) {}

    fn handle_toggle(&mut self) {}

    fn handle_step(&mut self) {}

    fn render(&self, dd: &mut DebugDraw) {
        if let Some(surface) = &self.core().surface {
            surface.draw(dd, self.draw_mode(), |poly| self.is_poly_enabled(poly));
        }
        self.render_extras(dd);
    }

    /// Screen-space labels; returns true when the overlay wants the pointer
    fn render_overlay(&self, _proj: &Mat4, _view: &Mat4, _viewport: &Viewport, _overlay: &mut Overlay) -> bool {
        false
    }

    /// Evaluate a scripted query against the built surface
    fn query(&self, query: &Query) -> bool {
        let Some(surface) = &self.core().surface else {
            return false;
        };
        let enabled = |poly: usize| self.is_poly_enabled(poly);
        match query {
            Query::NearestPoly { pos, extents } => surface
                .nearest_poly(Vec3::from(*pos), Vec3::from(*extents), enabled)
                .is_some(),
            Query::FindPath { start, end, extents } => {
                let extents = Vec3::from(*extents);
                let from = surface.nearest_poly(Vec3::from(*start), extents, enabled);
                let to = surface.nearest_poly(Vec3::from(*end), extents, enabled);
                match (from, to) {
                    (Some((a, _)), Some((b, _))) => surface.find_path(a, b, enabled).is_some(),
                    _ => false,
                }
            }
            Query::Raycast { start, end } => surface
                .raycast(Vec3::from(*start), Vec3::from(*end), enabled)
                .is_some(),
        }
    }

    /// One-line summary for the properties panel
    fn status(&self) -> String {
        match &self.core().surface {
            Some(surface) => format!(
                "{} polys in {} regions",
                surface.polys().len(),
                surface.region_count()
            ),
            None => "Not built".to_string(),
        }
    }
}

/// Construct a fresh pipeline of `kind` seeded with `defaults`
pub fn create_sample(kind: SampleKind, defaults: &BuildSettings) -> Box<dyn SamplePipeline> {
    let settings = defaults.clone();
    match kind {
        SampleKind::SoloMesh => Box::new(SoloMeshSample::new(settings)),
        SampleKind::TileMesh => Box::new(TileMeshSample::new(settings)),
        SampleKind::TempObstacles => Box::new(TempObstaclesSample::new(settings)),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::geometry::GeometryAsset;

    /// 20x20 floor made of four quads around the origin
    pub const FLOOR: &str = "\
v -10 0 -10\nv -10 0 0\nv -10 0 10\n\
v 0 0 -10\nv 0 0 0\nv 0 0 10\n\
v 10 0 -10\nv 10 0 0\nv 10 0 10\n\
f 1 2 5 4\nf 2 3 6 5\nf 4 5 8 7\nf 5 6 9 8\n";

    pub fn floor() -> GeometryAsset {
        GeometryAsset::from_obj_str("floor.obj", FLOOR).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::floor;
    use super::*;

    #[test]
    fn factory_yields_requested_kind_with_unique_ids() {
        let defaults = BuildSettings::default();
        let a = create_sample(SampleKind::TileMesh, &defaults);
        let b = create_sample(SampleKind::TileMesh, &defaults);
        assert_eq!(a.kind(), SampleKind::TileMesh);
        assert_ne!(a.id(), b.id());
        for kind in SampleKind::all() {
            assert_eq!(create_sample(*kind, &defaults).kind(), *kind);
        }
    }

    #[test]
    fn build_requires_attached_geometry() {
        let geom = floor();
        let mut sample = create_sample(SampleKind::SoloMesh, &BuildSettings::default());
        let mut log = BuildLog::new();
        assert!(!sample.build(&geom, &mut log));
        assert!(log.has_errors());

        sample.handle_mesh_changed(Some(&geom));
        log.reset();
        assert!(sample.build(&geom, &mut log));
        assert!(!log.has_errors());
    }

    #[test]
    fn detaching_drops_built_surface() {
        let geom = floor();
        let mut sample = create_sample(SampleKind::SoloMesh, &BuildSettings::default());
        sample.handle_mesh_changed(Some(&geom));
        assert!(sample.build(&geom, &mut BuildLog::new()));
        assert!(sample.core().surface.is_some());
        sample.handle_mesh_changed(None);
        assert_eq!(sample.attached_geometry(), None);
        assert!(sample.core().surface.is_none());
        assert!(!sample.query(&Query::NearestPoly {
            pos: [0.0; 3],
            extents: [2.0, 4.0, 2.0]
        }));
    }

    #[test]
    fn draw_mode_survives_rebuild() {
        let geom = floor();
        let mut sample = create_sample(SampleKind::SoloMesh, &BuildSettings::default());
        sample.handle_mesh_changed(Some(&geom));
        assert!(sample.build(&geom, &mut BuildLog::new()));

        let mut dd = DebugDraw::default();
        sample.render(&mut dd);
        assert_eq!(dd.triangles.len(), 8);

        sample.set_draw_mode(DrawMode::InputMesh);
        assert!(sample.build(&geom, &mut BuildLog::new()));
        assert_eq!(sample.draw_mode(), DrawMode::InputMesh);
        dd.clear();
        sample.render(&mut dd);
        assert!(dd.triangles.is_empty());
    }

    #[test]
    fn collect_includes_nav_bounds() {
        let geom = floor();
        let mut sample = create_sample(SampleKind::SoloMesh, &BuildSettings::default());
        sample.handle_mesh_changed(Some(&geom));
        let mut out = BuildSettings::default();
        sample.collect_build_settings(&mut out);
        assert_eq!(out.nav_mesh_bmin, [-10.0, 0.0, -10.0]);
        assert_eq!(out.nav_mesh_bmax, [10.0, 0.0, 10.0]);
    }

    #[test]
    fn queries_after_build() {
        let geom = floor();
        let mut sample = create_sample(SampleKind::SoloMesh, &BuildSettings::default());
        sample.handle_mesh_changed(Some(&geom));
        assert!(sample.build(&geom, &mut BuildLog::new()));
        assert!(sample.query(&Query::FindPath {
            start: [-8.0, 0.0, -8.0],
            end: [8.0, 0.0, 8.0],
            extents: [2.0, 4.0, 2.0],
        }));
        assert!(sample.query(&Query::Raycast {
            start: [1.0, 5.0, 3.0],
            end: [1.0, -5.0, 3.0],
        }));
        assert!(!sample.query(&Query::NearestPoly {
            pos: [50.0, 0.0, 0.0],
            extents: [2.0, 4.0, 2.0],
        }));
    }
}
