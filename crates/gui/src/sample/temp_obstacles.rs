use std::collections::VecDeque;

use glam::Vec3;
use shared::{BuildSettings, SampleKind};

use super::{PipelineCore, SamplePipeline};
use crate::viewport::debug_draw::{rgba, DebugDraw};

/// Pending obstacle requests processed per fixed update
const REQUESTS_PER_UPDATE: usize = 4;

/// Vertical cylinder blocking the surface beneath it
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Obstacle {
    pub id: u32,
    pub pos: Vec3,
    pub radius: f32,
    pub height: f32,
}

impl Obstacle {
    fn covers(&self, p: Vec3) -> bool {
        let d = (p - self.pos) * Vec3::new(1.0, 0.0, 1.0);
        d.length_squared() < self.radius * self.radius
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Request {
    Add(Obstacle),
    Remove(u32),
}

/// Surface with runtime obstacles.
///
/// Clicks queue add/remove requests which `update` applies a few at a time.
/// Space pauses processing, `1` applies a single request.
pub struct TempObstaclesSample {
    core: PipelineCore,
    obstacles: Vec<Obstacle>,
    pending: VecDeque<Request>,
    next_id: u32,
    paused: bool,
}

impl TempObstaclesSample {
    pub fn new(settings: BuildSettings) -> Self {
        Self {
            core: PipelineCore::new(SampleKind::TempObstacles, settings),
            obstacles: Vec::new(),
            pending: VecDeque::new(),
            next_id: 1,
            paused: false,
        }
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn pending_requests(&self) -> usize {
        self.pending.len()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Obstacle closest to the segment `origin..point` in the xz plane, if it touches it
    fn hit_obstacle(&self, origin: Vec3, point: Vec3) -> Option<u32> {
        self.obstacles
            .iter()
            .filter_map(|ob| {
                let d = distance_to_segment_xz(ob.pos, origin, point);
                (d <= ob.radius).then_some((ob.id, d))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    fn process_one(&mut self) -> bool {
        let Some(request) = self.pending.pop_front() else {
            return false;
        };
        match request {
            Request::Add(ob) => self.obstacles.push(ob),
            Request::Remove(id) => self.obstacles.retain(|ob| ob.id != id),
        }
        true
    }
}

impl SamplePipeline for TempObstaclesSample {
    fn core(&self) -> &PipelineCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut PipelineCore {
        &mut self.core
    }

    fn reset_edits(&mut self) {
        self.obstacles.clear();
        self.pending.clear();
    }

    fn is_poly_enabled(&self, poly: usize) -> bool {
        let Some(surface) = &self.core.surface else {
            return false;
        };
        surface
            .polys()
            .get(poly)
            .is_some_and(|p| !self.obstacles.iter().any(|ob| ob.covers(p.center)))
    }

    fn handle_click(&mut self, origin: Vec3, point: Vec3, extend: bool) {
        if self.core.surface.is_none() {
            return;
        }
        if extend {
            if let Some(id) = self.hit_obstacle(origin, point) {
                self.pending.push_back(Request::Remove(id));
            }
        } else {
            let ob = Obstacle {
                id: self.next_id,
                pos: point,
                radius: self.core.settings.agent_radius.max(0.1) * 2.0,
                height: self.core.settings.agent_height,
            };
            self.next_id += 1;
            self.pending.push_back(Request::Add(ob));
        }
    }

    fn update(&mut self, _dt: f32) {
        if self.paused {
            return;
        }
        for _ in 0..REQUESTS_PER_UPDATE {
            if !self.process_one() {
                break;
            }
        }
    }

    fn handle_toggle(&mut self) {
        self.paused = !self.paused;
        tracing::debug!("Obstacle processing {}", if self.paused { "paused" } else { "resumed" });
    }

    fn handle_step(&mut self) {
        self.process_one();
    }

    fn tool_hint(&self) -> &'static str {
        "LMB: create obstacle  Shift+LMB: remove obstacle"
    }

    fn render_extras(&self, dd: &mut DebugDraw) {
        for ob in &self.obstacles {
            dd.cylinder(ob.pos, ob.radius, ob.height, rgba(220, 0, 0, 128));
        }
        for request in &self.pending {
            if let Request::Add(ob) = request {
                dd.cylinder(ob.pos, ob.radius, ob.height, rgba(255, 196, 0, 128));
            }
        }
    }

    fn status(&self) -> String {
        match &self.core.surface {
            Some(surface) => format!(
                "{} polys, {} obstacles, {} pending{}",
                surface.polys().len(),
                self.obstacles.len(),
                self.pending.len(),
                if self.paused { " (paused)" } else { "" }
            ),
            None => "Not built".to_string(),
        }
    }
}

fn distance_to_segment_xz(p: Vec3, a: Vec3, b: Vec3) -> f32 {
    let flat = |v: Vec3| glam::Vec2::new(v.x, v.z);
    let (p, a, b) = (flat(p), flat(a), flat(b));
    let ab = b - a;
    let len_sq = ab.length_squared();
    let t = if len_sq > 0.0 {
        ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    (a + ab * t).distance(p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::BuildLog;
    use crate::sample::test_support::floor;
    use shared::Query;

    fn built() -> TempObstaclesSample {
        let geom = floor();
        let mut sample = TempObstaclesSample::new(BuildSettings::default());
        sample.handle_mesh_changed(Some(&geom));
        assert!(sample.build(&geom, &mut BuildLog::new()));
        sample
    }

    #[test]
    fn requests_apply_on_update() {
        let mut sample = built();
        sample.handle_click(Vec3::new(3.0, 30.0, 3.0), Vec3::new(3.0, 0.0, 3.0), false);
        assert_eq!(sample.pending_requests(), 1);
        assert!(sample.obstacles().is_empty());
        sample.update(0.05);
        assert_eq!(sample.obstacles().len(), 1);
        assert_eq!(sample.pending_requests(), 0);
    }

    #[test]
    fn pause_and_step() {
        let mut sample = built();
        sample.handle_toggle();
        assert!(sample.is_paused());
        sample.handle_click(Vec3::new(3.0, 30.0, 3.0), Vec3::new(3.0, 0.0, 3.0), false);
        sample.handle_click(Vec3::new(-3.0, 30.0, 3.0), Vec3::new(-3.0, 0.0, 3.0), false);
        sample.update(0.05);
        assert!(sample.obstacles().is_empty());
        sample.handle_step();
        assert_eq!(sample.obstacles().len(), 1);
        assert_eq!(sample.pending_requests(), 1);
    }

    #[test]
    fn shift_click_removes_hit_obstacle() {
        let mut sample = built();
        sample.handle_click(Vec3::new(3.0, 30.0, 3.0), Vec3::new(3.0, 0.0, 3.0), false);
        sample.update(0.05);
        sample.handle_click(Vec3::new(3.2, 30.0, 3.0), Vec3::new(3.2, 0.0, 3.0), true);
        sample.update(0.05);
        assert!(sample.obstacles().is_empty());
    }

    #[test]
    fn obstacle_blocks_covered_polys() {
        let mut sample = built();
        let probe = Query::Raycast {
            start: [2.0, 5.0, 6.0],
            end: [2.0, -5.0, 6.0],
        };
        assert!(sample.query(&probe));
        // centre of the (0..10, 0..10) quad's upper triangle
        sample.handle_click(Vec3::ZERO, Vec3::new(10.0 / 3.0, 0.0, 20.0 / 3.0), false);
        sample.update(0.05);
        assert!(!sample.query(&probe));
    }
}
