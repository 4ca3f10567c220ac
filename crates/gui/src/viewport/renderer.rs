//! Software rendering for the viewport
//!
//! Used when no GL context is available. Primitives are projected on the
//! CPU and painted back to front with egui's painter.

use egui::{Color32, Pos2, Rect, Stroke, Ui};
use glam::{Mat4, Vec3};

use super::camera::{FlyCamera, FogRange};
use super::debug_draw::{DebugDraw, Rgba};
use super::picking::{project, Viewport};

/// One projected primitive waiting to be painted
enum Painted {
    Triangle([Pos2; 3], Color32),
    Line([Pos2; 2], Color32),
    Point(Pos2, f32, Color32),
}

/// Paint the debug draw list into `rect`
pub fn paint_viewport(ui: &Ui, rect: Rect, camera: &FlyCamera, dd: &DebugDraw, bg: [u8; 3]) {
    let painter = ui.painter_at(rect);
    let bg_color = Color32::from_rgb(bg[0], bg[1], bg[2]);
    painter.rect_filled(rect, 0.0, bg_color);

    let viewport = Viewport::new(rect.width(), rect.height());
    let view = camera.view_matrix();
    let proj = camera.projection_matrix(&viewport);
    let projector = Projector {
        rect,
        view,
        proj,
        viewport,
        eye: camera.position,
        fog: camera.fog,
        bg,
    };

    let mut items: Vec<(f32, Painted)> = Vec::with_capacity(dd.triangles.len() + dd.lines.len());

    for tri in &dd.triangles {
        let [a, b, c] = tri.verts;
        if let (Some(pa), Some(pb), Some(pc)) =
            (projector.to_screen(a), projector.to_screen(b), projector.to_screen(c))
        {
            let center = (a + b + c) / 3.0;
            let depth = (pa.1 + pb.1 + pc.1) / 3.0;
            items.push((
                depth,
                Painted::Triangle([pa.0, pb.0, pc.0], projector.shade(center, tri.color)),
            ));
        }
    }

    for line in &dd.lines {
        if let (Some(pa), Some(pb)) = (projector.to_screen(line.a), projector.to_screen(line.b)) {
            let color = projector.shade((line.a + line.b) * 0.5, line.color);
            // Bias lines in front of the faces they outline
            items.push(((pa.1 + pb.1) * 0.5 - 1e-5, Painted::Line([pa.0, pb.0], color)));
        }
    }

    for point in &dd.points {
        if let Some((pos, depth)) = projector.to_screen(point.pos) {
            let color = projector.shade(point.pos, point.color);
            items.push((depth - 2e-5, Painted::Point(pos, point.size * 0.5, color)));
        }
    }

    // Far to near
    items.sort_by(|a, b| b.0.total_cmp(&a.0));

    for (_, item) in items {
        match item {
            Painted::Triangle(pts, color) => {
                painter.add(egui::Shape::convex_polygon(pts.to_vec(), color, Stroke::NONE));
            }
            Painted::Line(pts, color) => {
                painter.line_segment(pts, Stroke::new(1.0, color));
            }
            Painted::Point(pos, radius, color) => {
                painter.circle_filled(pos, radius.max(1.0), color);
            }
        }
    }
}

struct Projector {
    rect: Rect,
    view: Mat4,
    proj: Mat4,
    viewport: Viewport,
    eye: Vec3,
    fog: FogRange,
    bg: [u8; 3],
}

impl Projector {
    /// Screen position and depth, or None outside the depth range
    fn to_screen(&self, world: Vec3) -> Option<(Pos2, f32)> {
        let win = project(world, &self.view, &self.proj, &self.viewport)?;
        if !(0.0..=1.0).contains(&win.z) {
            return None;
        }
        Some((gl_to_screen(self.rect, win.x, win.y), win.z))
    }

    /// Blend `color` towards the background by linear fog
    fn shade(&self, world: Vec3, color: Rgba) -> Color32 {
        let dist = (world - self.eye).length();
        let span = (self.fog.end - self.fog.start).max(1e-4);
        let f = ((dist - self.fog.start) / span).clamp(0.0, 1.0);
        let mix = |c: u8, b: u8| (c as f32 + (b as f32 - c as f32) * f).round() as u8;
        Color32::from_rgba_unmultiplied(
            mix(color[0], self.bg[0]),
            mix(color[1], self.bg[1]),
            mix(color[2], self.bg[2]),
            color[3],
        )
    }
}

/// GL window coordinates (origin bottom-left) to egui screen space
pub fn gl_to_screen(rect: Rect, x: f32, y: f32) -> Pos2 {
    egui::pos2(rect.left() + x, rect.bottom() - y)
}

/// egui screen space to GL window coordinates
pub fn screen_to_gl(rect: Rect, pos: Pos2) -> glam::Vec2 {
    glam::Vec2::new(pos.x - rect.left(), rect.bottom() - pos.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screen_and_gl_round_trip() {
        let rect = Rect::from_min_size(egui::pos2(200.0, 30.0), egui::vec2(800.0, 600.0));
        let gl = screen_to_gl(rect, egui::pos2(210.0, 620.0));
        assert_eq!(gl, glam::Vec2::new(10.0, 10.0));
        assert_eq!(gl_to_screen(rect, gl.x, gl.y), egui::pos2(210.0, 620.0));
    }
}
