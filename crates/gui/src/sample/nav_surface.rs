//! Walkable-surface builder used by the bundled samples.
//!
//! Triangles whose slope is within the agent limit become polygons,
//! polygons sharing an edge become neighbours, and connected groups form
//! regions. Regions smaller than the configured minimum are discarded.

use std::collections::{HashMap, VecDeque};

use glam::Vec3;
use shared::BuildSettings;

use crate::build::BuildLog;
use crate::geometry::GeometryAsset;
use crate::sample::DrawMode;
use crate::viewport::debug_draw::{rgba, DebugDraw, Rgba};
use crate::viewport::picking::{segment_triangle, Aabb};

/// Offset applied when drawing polygons so they sit above the input mesh
const DRAW_OFFSET: f32 = 0.02;

#[derive(Clone, Debug)]
pub struct NavPoly {
    pub verts: [Vec3; 3],
    pub center: Vec3,
    pub area: f32,
    pub region: usize,
}

#[derive(Clone, Debug, Default)]
pub struct NavSurface {
    polys: Vec<NavPoly>,
    neighbours: Vec<Vec<usize>>,
    region_count: usize,
    bounds: Option<Aabb>,
}

impl NavSurface {
    /// Build from `geom`; returns None (with an error logged) when nothing is walkable.
    pub fn build(geom: &GeometryAsset, settings: &BuildSettings, log: &mut BuildLog) -> Option<Self> {
        let mesh = geom.mesh();
        let walkable_y = settings.agent_max_slope.to_radians().cos();
        let limits = geom.nav_mesh_bounds();

        // Candidate triangles, keyed by original index for edge lookup
        let mut candidates = Vec::new();
        for (tri, normal) in geom.normals().iter().enumerate() {
            if normal.y < walkable_y {
                continue;
            }
            let verts = mesh.triangle(tri);
            let center = (verts[0] + verts[1] + verts[2]) / 3.0;
            if !contains_xz(&limits, center) {
                continue;
            }
            candidates.push(tri);
        }
        log.progress(format!(
            "Walkable triangles: {} / {}",
            candidates.len(),
            mesh.triangle_count()
        ));

        let adjacency = edge_adjacency(&mesh.indices, &candidates);
        let (regions, region_count) = flood_regions(&adjacency);

        let min_area = settings.region_min_size * settings.region_min_size
            * settings.cell_size
            * settings.cell_size;
        let mut region_area = vec![0.0_f32; region_count];
        let areas: Vec<f32> = candidates
            .iter()
            .map(|&tri| {
                let [a, b, c] = mesh.triangle(tri);
                (b - a).cross(c - a).length() * 0.5
            })
            .collect();
        for (i, &region) in regions.iter().enumerate() {
            region_area[region] += areas[i];
        }

        // Keep only regions large enough; remap to dense ids
        let mut region_map = vec![None; region_count];
        let mut kept_regions = 0;
        for (region, &area) in region_area.iter().enumerate() {
            if area >= min_area {
                region_map[region] = Some(kept_regions);
                kept_regions += 1;
            }
        }
        let dropped = region_count - kept_regions;
        if dropped > 0 {
            log.warn(format!("Dropped {dropped} regions smaller than {min_area:.2} m2"));
        }

        let mut poly_of_candidate = vec![None; candidates.len()];
        let mut polys = Vec::new();
        for (i, &tri) in candidates.iter().enumerate() {
            let Some(region) = region_map[regions[i]] else {
                continue;
            };
            let verts = mesh.triangle(tri);
            poly_of_candidate[i] = Some(polys.len());
            polys.push(NavPoly {
                verts,
                center: (verts[0] + verts[1] + verts[2]) / 3.0,
                area: areas[i],
                region,
            });
        }

        if polys.is_empty() {
            log.error("Could not build navigation surface: no walkable area.");
            return None;
        }

        let neighbours = adjacency
            .iter()
            .enumerate()
            .filter(|(i, _)| poly_of_candidate[*i].is_some())
            .map(|(_, adj)| adj.iter().filter_map(|&j| poly_of_candidate[j]).collect())
            .collect();

        let bounds = polys.iter().flat_map(|p| p.verts).fold(None, |acc: Option<Aabb>, v| {
            Some(match acc {
                Some(b) => Aabb {
                    min: b.min.min(v),
                    max: b.max.max(v),
                },
                None => Aabb { min: v, max: v },
            })
        });

        log.progress(format!("Polygons: {}, regions: {}", polys.len(), kept_regions));
        Some(Self {
            polys,
            neighbours,
            region_count: kept_regions,
            bounds,
        })
    }

    pub fn polys(&self) -> &[NavPoly] {
        &self.polys
    }

    pub fn neighbours(&self, poly: usize) -> &[usize] {
        self.neighbours.get(poly).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn region_count(&self) -> usize {
        self.region_count
    }

    pub fn bounds(&self) -> Option<Aabb> {
        self.bounds
    }

    /// Closest enabled polygon whose nearest point lies within `extents` of `pos`
    pub fn nearest_poly(
        &self,
        pos: Vec3,
        extents: Vec3,
        enabled: impl Fn(usize) -> bool,
    ) -> Option<(usize, Vec3)> {
        self.polys
            .iter()
            .enumerate()
            .filter(|(i, _)| enabled(*i))
            .filter_map(|(i, poly)| {
                let [a, b, c] = poly.verts;
                let closest = closest_point_on_triangle(pos, a, b, c);
                let d = (closest - pos).abs();
                (d.cmple(extents).all()).then(|| (i, closest, (closest - pos).length_squared()))
            })
            .min_by(|a, b| a.2.total_cmp(&b.2))
            .map(|(i, p, _)| (i, p))
    }

    /// Breadth-first corridor between two polygons over enabled neighbours
    pub fn find_path(&self, start: usize, end: usize, enabled: impl Fn(usize) -> bool) -> Option<Vec<usize>> {
        if start >= self.polys.len() || end >= self.polys.len() || !enabled(start) || !enabled(end) {
            return None;
        }
        let mut parent: HashMap<usize, usize> = HashMap::new();
        let mut queue = VecDeque::from([start]);
        parent.insert(start, start);
        while let Some(poly) = queue.pop_front() {
            if poly == end {
                let mut path = vec![end];
                let mut cur = end;
                while cur != start {
                    cur = parent[&cur];
                    path.push(cur);
                }
                path.reverse();
                return Some(path);
            }
            for &next in self.neighbours(poly) {
                if enabled(next) && !parent.contains_key(&next) {
                    parent.insert(next, poly);
                    queue.push_back(next);
                }
            }
        }
        None
    }

    /// Parameter along `start..end` of the first enabled polygon hit
    pub fn raycast(&self, start: Vec3, end: Vec3, enabled: impl Fn(usize) -> bool) -> Option<f32> {
        self.polys
            .iter()
            .enumerate()
            .filter(|(i, _)| enabled(*i))
            .filter_map(|(_, p)| segment_triangle(start, end, p.verts[0], p.verts[1], p.verts[2]))
            .min_by(|a, b| a.total_cmp(b))
    }

    /// Draw polygons for `mode`; disabled polygons are drawn dark
    pub fn draw(&self, dd: &mut DebugDraw, mode: DrawMode, enabled: impl Fn(usize) -> bool) {
        let lift = Vec3::Y * DRAW_OFFSET;
        for (i, poly) in self.polys.iter().enumerate() {
            let color = match (mode, enabled(i)) {
                (DrawMode::InputMesh, _) => return,
                (DrawMode::Walkable, true) => rgba(0, 192, 255, 128),
                (DrawMode::Regions, true) => region_color(poly.region),
                (DrawMode::Disabled, true) => continue,
                (_, false) => rgba(32, 32, 32, 96),
            };
            let verts = poly.verts.map(|v| v + lift);
            dd.triangle(verts, color);
            for k in 0..3 {
                dd.line(verts[k], verts[(k + 1) % 3], rgba(0, 48, 64, 64));
            }
        }
    }
}

fn contains_xz(bounds: &Aabb, p: Vec3) -> bool {
    const EPS: f32 = 1e-4;
    p.x >= bounds.min.x - EPS
        && p.x <= bounds.max.x + EPS
        && p.z >= bounds.min.z - EPS
        && p.z <= bounds.max.z + EPS
}

/// Neighbour lists over `tris`, indexed like `tris`
fn edge_adjacency(indices: &[u32], tris: &[usize]) -> Vec<Vec<usize>> {
    let mut edges: HashMap<(u32, u32), Vec<usize>> = HashMap::new();
    for (slot, &tri) in tris.iter().enumerate() {
        let idx = &indices[tri * 3..tri * 3 + 3];
        for k in 0..3 {
            let (a, b) = (idx[k], idx[(k + 1) % 3]);
            edges.entry((a.min(b), a.max(b))).or_default().push(slot);
        }
    }
    let mut adjacency = vec![Vec::new(); tris.len()];
    for shared in edges.values() {
        for &a in shared {
            for &b in shared {
                if a != b && !adjacency[a].contains(&b) {
                    adjacency[a].push(b);
                }
            }
        }
    }
    adjacency
}

/// Connected components; returns (region per node, region count)
fn flood_regions(adjacency: &[Vec<usize>]) -> (Vec<usize>, usize) {
    let mut region = vec![usize::MAX; adjacency.len()];
    let mut count = 0;
    for seed in 0..adjacency.len() {
        if region[seed] != usize::MAX {
            continue;
        }
        let mut stack = vec![seed];
        region[seed] = count;
        while let Some(node) = stack.pop() {
            for &next in &adjacency[node] {
                if region[next] == usize::MAX {
                    region[next] = count;
                    stack.push(next);
                }
            }
        }
        count += 1;
    }
    (region, count)
}

/// Closest point to `p` on triangle `abc` (Ericson, Real-Time Collision Detection 5.1.5)
pub fn closest_point_on_triangle(p: Vec3, a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;
    let d1 = ab.dot(ap);
    let d2 = ac.dot(ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return a;
    }

    let bp = p - b;
    let d3 = ab.dot(bp);
    let d4 = ac.dot(bp);
    if d3 >= 0.0 && d4 <= d3 {
        return b;
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return a + ab * v;
    }

    let cp = p - c;
    let d5 = ab.dot(cp);
    let d6 = ac.dot(cp);
    if d6 >= 0.0 && d5 <= d6 {
        return c;
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return a + ac * w;
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return b + (c - b) * w;
    }

    let denom = 1.0 / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;
    a + ab * v + ac * w
}

fn region_color(region: usize) -> Rgba {
    // Cheap integer hash so neighbouring ids get distinct hues
    let h = (region as u32).wrapping_mul(2_654_435_761);
    rgba(
        64 + (h & 0x7f) as u8,
        96 + ((h >> 8) & 0x7f) as u8,
        128 + ((h >> 16) & 0x7f) as u8,
        160,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    // Two disconnected 10x10 floors plus a vertical wall
    const ISLANDS: &str = "\
v 0 0 0\nv 0 0 10\nv 10 0 10\nv 10 0 0\n\
v 20 0 0\nv 20 0 10\nv 30 0 10\nv 30 0 0\n\
v 40 0 0\nv 40 5 0\nv 50 5 0\nv 50 0 0\n\
f 1 2 3 4\nf 5 6 7 8\nf 9 10 11 12\n";

    fn build(text: &str, settings: &BuildSettings) -> (Option<NavSurface>, BuildLog) {
        let geom = GeometryAsset::from_obj_str("islands.obj", text).unwrap();
        let mut log = BuildLog::new();
        let surface = NavSurface::build(&geom, settings, &mut log);
        (surface, log)
    }

    #[test]
    fn steep_faces_are_not_walkable() {
        let (surface, log) = build(ISLANDS, &BuildSettings::default());
        let surface = surface.unwrap();
        assert_eq!(surface.polys().len(), 4);
        assert_eq!(surface.region_count(), 2);
        assert!(!log.has_errors());
    }

    #[test]
    fn path_stays_within_region() {
        let (surface, _) = build(ISLANDS, &BuildSettings::default());
        let surface = surface.unwrap();
        let all = |_: usize| true;
        let (a, _) = surface.nearest_poly(Vec3::new(1.0, 0.5, 1.0), Vec3::splat(2.0), all).unwrap();
        let (b, _) = surface.nearest_poly(Vec3::new(9.0, 0.5, 9.0), Vec3::splat(2.0), all).unwrap();
        let (c, _) = surface.nearest_poly(Vec3::new(25.0, 0.5, 5.0), Vec3::splat(2.0), all).unwrap();
        assert!(surface.find_path(a, b, all).is_some());
        assert!(surface.find_path(a, c, all).is_none());
    }

    #[test]
    fn nearest_poly_respects_extents() {
        let (surface, _) = build(ISLANDS, &BuildSettings::default());
        let surface = surface.unwrap();
        assert!(surface
            .nearest_poly(Vec3::new(15.0, 0.0, 5.0), Vec3::new(2.0, 4.0, 2.0), |_| true)
            .is_none());
        assert!(surface
            .nearest_poly(Vec3::new(5.0, 3.0, 5.0), Vec3::new(2.0, 4.0, 2.0), |_| true)
            .is_some());
    }

    #[test]
    fn small_regions_are_dropped() {
        let settings = BuildSettings {
            region_min_size: 40.0, // 40^2 * 0.09 = 144 m2
            ..BuildSettings::default()
        };
        let (surface, log) = build(ISLANDS, &settings);
        assert!(surface.is_none());
        assert!(log.has_errors());
    }

    #[test]
    fn draw_modes_select_polys() {
        let (surface, _) = build(ISLANDS, &BuildSettings::default());
        let surface = surface.unwrap();
        let first_only = |i: usize| i != 0;
        let count = |mode| {
            let mut dd = DebugDraw::default();
            surface.draw(&mut dd, mode, first_only);
            dd.triangles.len()
        };
        assert_eq!(count(DrawMode::Walkable), 4);
        assert_eq!(count(DrawMode::Regions), 4);
        assert_eq!(count(DrawMode::Disabled), 1);
        assert_eq!(count(DrawMode::InputMesh), 0);
    }

    #[test]
    fn raycast_ignores_disabled_polys() {
        let (surface, _) = build(ISLANDS, &BuildSettings::default());
        let surface = surface.unwrap();
        let down = (Vec3::new(5.0, 5.0, 5.0), Vec3::new(5.0, -5.0, 5.0));
        assert!(surface.raycast(down.0, down.1, |_| true).is_some());
        assert!(surface.raycast(down.0, down.1, |_| false).is_none());
    }

    #[test]
    fn closest_point_regions() {
        let (a, b, c) = (Vec3::ZERO, Vec3::X, Vec3::Z);
        assert_eq!(closest_point_on_triangle(Vec3::new(-1.0, 0.0, -1.0), a, b, c), a);
        let inside = closest_point_on_triangle(Vec3::new(0.25, 3.0, 0.25), a, b, c);
        assert!((inside - Vec3::new(0.25, 0.0, 0.25)).length() < 1e-6);
        let edge = closest_point_on_triangle(Vec3::new(0.5, 0.0, -1.0), a, b, c);
        assert!((edge - Vec3::new(0.5, 0.0, 0.0)).length() < 1e-6);
    }
}
