use std::collections::BTreeSet;

use glam::{Mat4, Vec2, Vec3};
use shared::{BuildSettings, SampleKind};

use super::{PipelineCore, SamplePipeline};
use crate::viewport::debug_draw::{rgba, DebugDraw, Overlay};
use crate::viewport::picking::{project, Viewport};

pub type TileCoord = (i32, i32);

/// Surface split into square tiles that can be removed and rebuilt by clicking.
pub struct TileMeshSample {
    core: PipelineCore,
    removed: BTreeSet<TileCoord>,
    last_tile: Option<TileCoord>,
}

impl TileMeshSample {
    pub fn new(settings: BuildSettings) -> Self {
        Self {
            core: PipelineCore::new(SampleKind::TileMesh, settings),
            removed: BTreeSet::new(),
            last_tile: None,
        }
    }

    /// World edge length of one tile
    pub fn tile_world_size(&self) -> f32 {
        (self.core.settings.tile_size * self.core.settings.cell_size).max(f32::EPSILON)
    }

    fn origin(&self) -> Vec3 {
        self.core.nav_bounds().map(|b| b.min).unwrap_or(Vec3::ZERO)
    }

    /// Tile containing `point` (xz plane)
    pub fn tile_at(&self, point: Vec3) -> TileCoord {
        let rel = (point - self.origin()) / self.tile_world_size();
        (rel.x.floor() as i32, rel.z.floor() as i32)
    }

    fn tile_center(&self, tile: TileCoord) -> Vec3 {
        let size = self.tile_world_size();
        let y = self.core.nav_bounds().map(|b| b.max.y).unwrap_or(0.0);
        let origin = self.origin();
        Vec3::new(
            origin.x + (tile.0 as f32 + 0.5) * size,
            y,
            origin.z + (tile.1 as f32 + 0.5) * size,
        )
    }

    /// Tiles spanned by the navigation bounds
    pub fn grid_size(&self) -> (i32, i32) {
        match self.core.nav_bounds() {
            Some(bounds) => {
                let size = bounds.size() / self.tile_world_size();
                (size.x.ceil().max(1.0) as i32, size.z.ceil().max(1.0) as i32)
            }
            None => (0, 0),
        }
    }

    pub fn is_tile_removed(&self, tile: TileCoord) -> bool {
        self.removed.contains(&tile)
    }

    pub fn removed_tiles(&self) -> usize {
        self.removed.len()
    }
}

impl SamplePipeline for TileMeshSample {
    fn core(&self) -> &PipelineCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut PipelineCore {
        &mut self.core
    }

    fn reset_edits(&mut self) {
        self.removed.clear();
        self.last_tile = None;
    }

    fn is_poly_enabled(&self, poly: usize) -> bool {
        match &self.core.surface {
            Some(surface) => surface
                .polys()
                .get(poly)
                .is_some_and(|p| !self.removed.contains(&self.tile_at(p.center))),
            None => false,
        }
    }

    fn handle_click(&mut self, _origin: Vec3, point: Vec3, extend: bool) {
        if self.core.surface.is_none() {
            return;
        }
        let tile = self.tile_at(point);
        if extend {
            self.removed.insert(tile);
            tracing::debug!("Removed tile {:?}", tile);
        } else {
            self.removed.remove(&tile);
            tracing::debug!("Rebuilt tile {:?}", tile);
        }
        self.last_tile = Some(tile);
    }

    fn handle_settings_changed(&mut self) {
        let (w, h) = self.grid_size();
        tracing::debug!(
            "{} tile grid {}x{} ({} world units per tile)",
            self.core.id,
            w,
            h,
            self.tile_world_size()
        );
    }

    fn tool_hint(&self) -> &'static str {
        "LMB: rebuild hit tile  Shift+LMB: clear hit tile"
    }

    fn render_extras(&self, dd: &mut DebugDraw) {
        let size = self.tile_world_size();
        let (w, h) = self.grid_size();
        let origin = self.origin();
        let y = self.core.nav_bounds().map(|b| b.max.y).unwrap_or(0.0) + 0.05;
        for x in 0..w {
            for z in 0..h {
                let color = if self.removed.contains(&(x, z)) {
                    rgba(255, 64, 64, 128)
                } else {
                    rgba(0, 0, 0, 48)
                };
                let a = Vec3::new(origin.x + x as f32 * size, y, origin.z + z as f32 * size);
                let corners = [a, a + Vec3::X * size, a + Vec3::new(size, 0.0, size), a + Vec3::Z * size];
                for k in 0..4 {
                    dd.line(corners[k], corners[(k + 1) % 4], color);
                }
            }
        }
    }

    fn render_overlay(&self, proj: &Mat4, view: &Mat4, viewport: &Viewport, overlay: &mut Overlay) -> bool {
        if let Some(tile) = self.last_tile {
            if let Some(win) = project(self.tile_center(tile), view, proj, viewport) {
                if win.z < 1.0 {
                    overlay.label(
                        Vec2::new(win.x, win.y),
                        format!("({},{})", tile.0, tile.1),
                        rgba(0, 0, 0, 220),
                    );
                }
            }
        }
        false
    }

    fn status(&self) -> String {
        let (w, h) = self.grid_size();
        match &self.core.surface {
            Some(surface) => format!(
                "{} polys, {}x{} tiles, {} removed",
                surface.polys().len(),
                w,
                h,
                self.removed.len()
            ),
            None => "Not built".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::BuildLog;
    use crate::sample::test_support::floor;
    use shared::Query;

    fn built() -> TileMeshSample {
        let geom = floor();
        // 10 world units per tile: floor splits into 2x2 tiles
        let mut sample = TileMeshSample::new(BuildSettings {
            tile_size: 10.0,
            cell_size: 1.0,
            ..BuildSettings::default()
        });
        sample.handle_mesh_changed(Some(&geom));
        assert!(sample.build(&geom, &mut BuildLog::new()));
        sample
    }

    #[test]
    fn grid_covers_bounds() {
        let sample = built();
        assert_eq!(sample.grid_size(), (2, 2));
        assert_eq!(sample.tile_at(Vec3::new(-9.0, 0.0, -9.0)), (0, 0));
        assert_eq!(sample.tile_at(Vec3::new(9.0, 0.0, 1.0)), (1, 1));
    }

    #[test]
    fn shift_click_removes_tile_and_click_restores_it() {
        let mut sample = built();
        let probe = Query::NearestPoly {
            pos: [-5.0, 0.0, -5.0],
            extents: [2.0, 4.0, 2.0],
        };
        assert!(sample.query(&probe));

        sample.handle_click(Vec3::new(0.0, 50.0, 0.0), Vec3::new(-5.0, 0.0, -5.0), true);
        assert!(sample.is_tile_removed((0, 0)));
        assert!(!sample.query(&probe));

        sample.handle_click(Vec3::new(0.0, 50.0, 0.0), Vec3::new(-5.0, 0.0, -5.0), false);
        assert_eq!(sample.removed_tiles(), 0);
        assert!(sample.query(&probe));
    }

    #[test]
    fn clicks_before_build_are_ignored() {
        let mut sample = TileMeshSample::new(BuildSettings::default());
        sample.handle_click(Vec3::ZERO, Vec3::ZERO, true);
        assert_eq!(sample.removed_tiles(), 0);
    }

    #[test]
    fn overlay_labels_last_tile() {
        let mut sample = built();
        sample.handle_click(Vec3::ZERO, Vec3::new(5.0, 0.0, 5.0), false);
        let view = Mat4::look_at_rh(Vec3::new(0.0, 40.0, 0.1), Vec3::ZERO, Vec3::Y);
        let proj = Mat4::perspective_rh_gl(50f32.to_radians(), 1.0, 1.0, 100.0);
        let mut overlay = Overlay::default();
        let captured = sample.render_overlay(&proj, &view, &Viewport::new(400.0, 400.0), &mut overlay);
        assert!(!captured);
        assert_eq!(overlay.labels.len(), 1);
        assert_eq!(overlay.labels[0].text, "(1,1)");
    }
}
