use glam::{Mat4, Vec2, Vec3, Vec4};

/// Axis-aligned bounding box
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Center of the bounding box
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Half the length of the box diagonal
    pub fn half_diagonal(&self) -> f32 {
        self.size().length() * 0.5
    }
}

/// Window rectangle in GL convention: origin bottom-left, y up
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width,
            height,
        }
    }

    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }
}

/// Map a world point to window coordinates; z is depth in 0..1.
pub fn project(point: Vec3, view: &Mat4, proj: &Mat4, viewport: &Viewport) -> Option<Vec3> {
    let clip = *proj * *view * point.extend(1.0);
    if clip.w == 0.0 {
        return None;
    }
    let ndc = clip.truncate() / clip.w;
    Some(Vec3::new(
        viewport.x + viewport.width * (ndc.x + 1.0) * 0.5,
        viewport.y + viewport.height * (ndc.y + 1.0) * 0.5,
        (ndc.z + 1.0) * 0.5,
    ))
}

/// Inverse of [`project`]: window coordinates + depth back to world space.
pub fn unproject(window: Vec3, view: &Mat4, proj: &Mat4, viewport: &Viewport) -> Option<Vec3> {
    if viewport.width <= 0.0 || viewport.height <= 0.0 {
        return None;
    }
    let view_proj = *proj * *view;
    if view_proj.determinant().abs() < f32::EPSILON {
        return None;
    }
    let ndc = Vec4::new(
        (window.x - viewport.x) / viewport.width * 2.0 - 1.0,
        (window.y - viewport.y) / viewport.height * 2.0 - 1.0,
        window.z * 2.0 - 1.0,
        1.0,
    );
    let world = view_proj.inverse() * ndc;
    if world.w == 0.0 {
        return None;
    }
    Some(world.truncate() / world.w)
}

/// Pick segment from the near plane to the far plane under the cursor
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PickRay {
    pub start: Vec3,
    pub end: Vec3,
}

impl PickRay {
    /// Unproject `cursor` (GL window coordinates) at depth 0 and depth 1
    pub fn from_screen(cursor: Vec2, view: &Mat4, proj: &Mat4, viewport: &Viewport) -> Option<Self> {
        let start = unproject(cursor.extend(0.0), view, proj, viewport)?;
        let end = unproject(cursor.extend(1.0), view, proj, viewport)?;
        Some(Self { start, end })
    }

    /// Point at parameter `t`, 0 = start, 1 = end
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.start + (self.end - self.start) * t
    }
}

/// Segment-AABB overlap using the slab method.
/// Returns the entry/exit parameters clipped to 0..1, or None.
pub fn segment_aabb(start: Vec3, end: Vec3, aabb: &Aabb) -> Option<(f32, f32)> {
    const EPSILON: f32 = 1e-8;

    let dir = end - start;
    let mut tmin = 0.0_f32;
    let mut tmax = 1.0_f32;

    for axis in 0..3 {
        let (s, d, lo, hi) = (start[axis], dir[axis], aabb.min[axis], aabb.max[axis]);
        if d.abs() < EPSILON {
            if s < lo || s > hi {
                return None;
            }
            continue;
        }
        let inv = 1.0 / d;
        let mut t1 = (lo - s) * inv;
        let mut t2 = (hi - s) * inv;
        if t1 > t2 {
            std::mem::swap(&mut t1, &mut t2);
        }
        tmin = tmin.max(t1);
        tmax = tmax.min(t2);
        if tmin > tmax {
            return None;
        }
    }

    Some((tmin, tmax))
}

/// Möller-Trumbore segment-triangle intersection, two-sided.
/// Returns the parameter along `start..end` if hit.
pub fn segment_triangle(start: Vec3, end: Vec3, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<f32> {
    const EPSILON: f32 = 1e-7;

    let dir = end - start;
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let h = dir.cross(edge2);
    let a = edge1.dot(h);

    // Segment is parallel to triangle
    if a.abs() < EPSILON {
        return None;
    }

    let f = 1.0 / a;
    let s = start - v0;
    let u = f * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * dir.dot(q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);
    if (0.0..=1.0).contains(&t) {
        Some(t)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> (Mat4, Mat4, Viewport) {
        let view = Mat4::look_at_rh(Vec3::new(0.0, 10.0, 0.01), Vec3::ZERO, Vec3::Y);
        let proj = Mat4::perspective_rh_gl(50f32.to_radians(), 1.0, 1.0, 100.0);
        (view, proj, Viewport::new(200.0, 200.0))
    }

    #[test]
    fn project_unproject_round_trip() {
        let (view, proj, vp) = camera();
        let p = Vec3::new(1.0, 0.5, -2.0);
        let win = project(p, &view, &proj, &vp).unwrap();
        let back = unproject(win, &view, &proj, &vp).unwrap();
        assert!((back - p).length() < 1e-3, "{back:?}");
    }

    #[test]
    fn center_ray_points_down() {
        let (view, proj, vp) = camera();
        let ray = PickRay::from_screen(Vec2::new(100.0, 100.0), &view, &proj, &vp).unwrap();
        assert!(ray.start.y > ray.end.y);
        assert!(ray.start.y < 10.0);
    }

    #[test]
    fn unproject_rejects_empty_viewport() {
        let (view, proj, _) = camera();
        assert!(unproject(Vec3::ZERO, &view, &proj, &Viewport::new(0.0, 0.0)).is_none());
    }

    #[test]
    fn segment_hits_triangle_at_midpoint() {
        let t = segment_triangle(
            Vec3::new(0.2, 1.0, 0.2),
            Vec3::new(0.2, -1.0, 0.2),
            Vec3::ZERO,
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 0.0),
        )
        .unwrap();
        assert!((t - 0.5).abs() < 1e-6);
    }

    #[test]
    fn segment_too_short_misses_triangle() {
        let t = segment_triangle(
            Vec3::new(0.2, 1.0, 0.2),
            Vec3::new(0.2, 0.5, 0.2),
            Vec3::ZERO,
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 0.0),
        );
        assert!(t.is_none());
    }

    #[test]
    fn segment_aabb_slab() {
        let aabb = Aabb {
            min: Vec3::splat(-1.0),
            max: Vec3::splat(1.0),
        };
        let (t0, t1) = segment_aabb(Vec3::new(-3.0, 0.0, 0.0), Vec3::new(3.0, 0.0, 0.0), &aabb).unwrap();
        assert!((t0 - 1.0 / 3.0).abs() < 1e-6);
        assert!((t1 - 2.0 / 3.0).abs() < 1e-6);
        assert!(segment_aabb(Vec3::new(-3.0, 2.0, 0.0), Vec3::new(3.0, 2.0, 0.0), &aabb).is_none());
    }

    #[test]
    fn half_diagonal_of_flat_box() {
        let aabb = Aabb {
            min: Vec3::ZERO,
            max: Vec3::new(10.0, 0.0, 10.0),
        };
        assert!((aabb.half_diagonal() - 5.0 * 2f32.sqrt()).abs() < 1e-5);
    }
}
