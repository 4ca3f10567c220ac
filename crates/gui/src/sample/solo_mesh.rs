use glam::Vec3;
use shared::{BuildSettings, SampleKind};

use super::{PipelineCore, SamplePipeline};
use crate::viewport::debug_draw::{rgba, DebugDraw};

/// Single surface over the whole input mesh with a path test tool.
///
/// Click sets the path end, shift-click the path start.
pub struct SoloMeshSample {
    core: PipelineCore,
    start: Option<Vec3>,
    end: Option<Vec3>,
    path: Vec<usize>,
}

impl SoloMeshSample {
    pub fn new(settings: BuildSettings) -> Self {
        Self {
            core: PipelineCore::new(SampleKind::SoloMesh, settings),
            start: None,
            end: None,
            path: Vec::new(),
        }
    }

    pub fn path(&self) -> &[usize] {
        &self.path
    }

    fn recompute_path(&mut self) {
        self.path.clear();
        let (Some(surface), Some(start), Some(end)) = (&self.core.surface, self.start, self.end) else {
            return;
        };
        let extents = Vec3::new(2.0, 4.0, 2.0);
        let from = surface.nearest_poly(start, extents, |_| true);
        let to = surface.nearest_poly(end, extents, |_| true);
        if let (Some((a, _)), Some((b, _))) = (from, to) {
            if let Some(path) = surface.find_path(a, b, |_| true) {
                self.path = path;
            }
        }
    }
}

impl SamplePipeline for SoloMeshSample {
    fn core(&self) -> &PipelineCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut PipelineCore {
        &mut self.core
    }

    fn reset_edits(&mut self) {
        self.start = None;
        self.end = None;
        self.path.clear();
    }

    fn handle_click(&mut self, _origin: Vec3, point: Vec3, extend: bool) {
        if extend {
            self.start = Some(point);
        } else {
            self.end = Some(point);
        }
        self.recompute_path();
    }

    fn tool_hint(&self) -> &'static str {
        "LMB: set path end  Shift+LMB: set path start"
    }

    fn render_extras(&self, dd: &mut DebugDraw) {
        if let Some(start) = self.start {
            dd.cylinder(start, self.core.settings.agent_radius, self.core.settings.agent_height, rgba(128, 25, 0, 192));
        }
        if let Some(end) = self.end {
            dd.cylinder(end, self.core.settings.agent_radius, self.core.settings.agent_height, rgba(51, 102, 0, 129));
        }
        if let Some(surface) = &self.core.surface {
            let lift = Vec3::Y * 0.1;
            for pair in self.path.windows(2) {
                let a = surface.polys()[pair[0]].center + lift;
                let b = surface.polys()[pair[1]].center + lift;
                dd.line(a, b, rgba(0, 0, 0, 220));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::BuildLog;
    use crate::sample::test_support::floor;

    #[test]
    fn start_and_end_produce_a_path() {
        let geom = floor();
        let mut sample = SoloMeshSample::new(BuildSettings::default());
        sample.handle_mesh_changed(Some(&geom));
        assert!(sample.build(&geom, &mut BuildLog::new()));

        sample.handle_click(Vec3::ZERO, Vec3::new(-8.0, 0.0, -6.0), true);
        assert!(sample.path().is_empty());
        sample.handle_click(Vec3::ZERO, Vec3::new(8.0, 0.0, 6.0), false);
        assert!(sample.path().len() >= 2);

        let mut dd = DebugDraw::default();
        sample.render(&mut dd);
        assert!(!dd.lines.is_empty());
    }

    #[test]
    fn toggle_and_step_are_inert() {
        let mut sample = SoloMeshSample::new(BuildSettings::default());
        sample.handle_toggle();
        sample.handle_step();
        sample.update(0.05);
        assert_eq!(sample.status(), "Not built");
    }
}
