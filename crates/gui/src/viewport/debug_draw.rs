//! World-space draw lists filled by the session and pipelines each frame.
//!
//! Nothing here talks to a graphics API; the binary projects and paints
//! the collected primitives.

use glam::{Vec2, Vec3};

/// RGBA, 8 bits per channel
pub type Rgba = [u8; 4];

/// Floats per packed vertex: position (3), color (4), point size (1)
pub const VERTEX_FLOATS: usize = 8;

pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Rgba {
    [r, g, b, a]
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DebugLine {
    pub a: Vec3,
    pub b: Vec3,
    pub color: Rgba,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DebugTriangle {
    pub verts: [Vec3; 3],
    pub color: Rgba,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DebugPoint {
    pub pos: Vec3,
    pub size: f32,
    pub color: Rgba,
}

#[derive(Clone, Debug, Default)]
pub struct DebugDraw {
    pub lines: Vec<DebugLine>,
    pub triangles: Vec<DebugTriangle>,
    pub points: Vec<DebugPoint>,
}

impl DebugDraw {
    pub fn clear(&mut self) {
        self.lines.clear();
        self.triangles.clear();
        self.points.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.triangles.is_empty() && self.points.is_empty()
    }

    pub fn line(&mut self, a: Vec3, b: Vec3, color: Rgba) {
        self.lines.push(DebugLine { a, b, color });
    }

    pub fn triangle(&mut self, verts: [Vec3; 3], color: Rgba) {
        self.triangles.push(DebugTriangle { verts, color });
    }

    pub fn point(&mut self, pos: Vec3, size: f32, color: Rgba) {
        self.points.push(DebugPoint { pos, size, color });
    }

    /// Triangle vertices packed for upload, [`VERTEX_FLOATS`] each
    pub fn pack_triangles(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.triangles.len() * 3 * VERTEX_FLOATS);
        for tri in &self.triangles {
            for v in tri.verts {
                push_vertex(&mut out, v, tri.color, 1.0);
            }
        }
        out
    }

    pub fn pack_lines(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.lines.len() * 2 * VERTEX_FLOATS);
        for line in &self.lines {
            push_vertex(&mut out, line.a, line.color, 1.0);
            push_vertex(&mut out, line.b, line.color, 1.0);
        }
        out
    }

    pub fn pack_points(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.points.len() * VERTEX_FLOATS);
        for p in &self.points {
            push_vertex(&mut out, p.pos, p.color, p.size);
        }
        out
    }

    /// Horizontal circle outline
    pub fn circle(&mut self, center: Vec3, radius: f32, color: Rgba) {
        const SEGMENTS: usize = 16;
        let at = |i: usize| {
            let a = i as f32 / SEGMENTS as f32 * std::f32::consts::TAU;
            center + Vec3::new(a.cos() * radius, 0.0, a.sin() * radius)
        };
        for i in 0..SEGMENTS {
            self.line(at(i), at(i + 1), color);
        }
    }

    /// Vertical cylinder outline standing on `base`
    pub fn cylinder(&mut self, base: Vec3, radius: f32, height: f32, color: Rgba) {
        let top = base + Vec3::Y * height;
        self.circle(base, radius, color);
        self.circle(top, radius, color);
        for dir in [Vec3::X, Vec3::NEG_X, Vec3::Z, Vec3::NEG_Z] {
            self.line(base + dir * radius, top + dir * radius, color);
        }
    }
}

fn push_vertex(out: &mut Vec<f32>, pos: Vec3, color: Rgba, size: f32) {
    out.extend_from_slice(&pos.to_array());
    out.extend(color.iter().map(|&c| c as f32 / 255.0));
    out.push(size);
}

/// Screen-space text emitted by overlay rendering
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayLabel {
    /// GL window coordinates (y up)
    pub pos: Vec2,
    pub text: String,
    pub color: Rgba,
}

/// Screen-space circle outline, GL window coordinates
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlayCircle {
    pub pos: Vec2,
    pub radius: f32,
    pub color: Rgba,
}

#[derive(Clone, Debug, Default)]
pub struct Overlay {
    pub labels: Vec<OverlayLabel>,
    pub circles: Vec<OverlayCircle>,
}

impl Overlay {
    pub fn label(&mut self, pos: Vec2, text: impl Into<String>, color: Rgba) {
        self.labels.push(OverlayLabel {
            pos,
            text: text.into(),
            color,
        });
    }

    pub fn circle(&mut self, pos: Vec2, radius: f32, color: Rgba) {
        self.circles.push(OverlayCircle { pos, radius, color });
    }

    pub fn clear(&mut self) {
        self.labels.clear();
        self.circles.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circle_is_closed_loop() {
        let mut dd = DebugDraw::default();
        dd.circle(Vec3::ZERO, 1.0, rgba(255, 255, 255, 255));
        assert_eq!(dd.lines.len(), 16);
        let first = dd.lines.first().unwrap().a;
        let last = dd.lines.last().unwrap().b;
        assert!((first - last).length() < 1e-5);
    }

    #[test]
    fn packed_vertices_carry_normalized_color() {
        let mut dd = DebugDraw::default();
        dd.line(Vec3::ZERO, Vec3::X, rgba(255, 0, 51, 255));
        dd.point(Vec3::Y, 6.0, rgba(0, 0, 0, 0));
        let lines = dd.pack_lines();
        assert_eq!(lines.len(), 2 * VERTEX_FLOATS);
        assert_eq!(&lines[3..7], &[1.0, 0.0, 0.2, 1.0]);
        assert_eq!(&lines[8..11], &[1.0, 0.0, 0.0]);
        let points = dd.pack_points();
        assert_eq!(points[VERTEX_FLOATS - 1], 6.0);
        assert!(dd.pack_triangles().is_empty());
    }

    #[test]
    fn clear_empties_all_lists() {
        let mut dd = DebugDraw::default();
        dd.point(Vec3::ZERO, 4.0, rgba(0, 0, 0, 255));
        dd.triangle([Vec3::ZERO, Vec3::X, Vec3::Z], rgba(0, 0, 0, 255));
        assert!(!dd.is_empty());
        dd.clear();
        assert!(dd.is_empty());
    }
}
