use glam::{Mat4, Vec2, Vec3};

use super::picking::{Aabb, Viewport};

/// Angles applied by [`FlyCamera::frame_on`]
pub const FRAMED_YAW: f32 = 45.0;
pub const FRAMED_PITCH: f32 = -125.0;

/// Squared cursor travel (pixels) after which an orbit drag is no longer a click
pub const ORBIT_CLICK_THRESHOLD_SQ: f32 = 9.0;

/// Per-second ramp rate of the held-key movement axes
const MOVE_RAMP_RATE: f32 = 4.0;

/// Directional keys held during the current frame
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MoveKeys {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

/// Movement axes ramped towards 1 while held and back to 0 when released
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MoveAxes {
    pub forward: f32,
    pub back: f32,
    pub left: f32,
    pub right: f32,
    pub up: f32,
    pub down: f32,
}

impl MoveAxes {
    fn ramp(axis: &mut f32, held: bool, dt: f32) {
        let dir = if held { 1.0 } else { -1.0 };
        *axis = (*axis + dt * MOVE_RAMP_RATE * dir).clamp(0.0, 1.0);
    }

    pub fn update(&mut self, keys: &MoveKeys, dt: f32) {
        Self::ramp(&mut self.forward, keys.forward, dt);
        Self::ramp(&mut self.back, keys.back, dt);
        Self::ramp(&mut self.left, keys.left, dt);
        Self::ramp(&mut self.right, keys.right, dt);
        Self::ramp(&mut self.up, keys.up, dt);
        Self::ramp(&mut self.down, keys.down, dt);
    }
}

/// Linear fog range derived from the framing radius
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FogRange {
    pub start: f32,
    pub end: f32,
}

impl FogRange {
    pub fn from_radius(radius: f32) -> Self {
        Self {
            start: radius * 0.1,
            end: radius * 1.25,
        }
    }
}

/// Orbit drag bookkeeping, relative to where the drag started
#[derive(Clone, Copy, Debug)]
struct OrbitDrag {
    origin: Vec2,
    yaw: f32,
    pitch: f32,
    moved: bool,
}

/// Free-fly camera with right-drag orbiting.
///
/// Angles are in degrees. `yaw` is applied about the X axis and `pitch`
/// about the Y axis, in that order, before translating by `-position`.
#[derive(Clone, Debug)]
pub struct FlyCamera {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    /// Framing distance, also drives fog and the far plane. Always > 0.
    pub radius: f32,
    pub fog: FogRange,
    /// Vertical field of view in degrees
    pub fov: f32,
    /// World units per second at full axis deflection
    pub move_speed: f32,
    /// Degrees per pixel while orbiting
    pub orbit_sensitivity: f32,
    axes: MoveAxes,
    scroll_zoom: f32,
    orbit: Option<OrbitDrag>,
}

impl Default for FlyCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl FlyCamera {
    pub fn new() -> Self {
        let radius = 1000.0;
        Self {
            position: Vec3::ZERO,
            yaw: 45.0,
            pitch: 45.0,
            radius,
            fog: FogRange::from_radius(radius),
            fov: 50.0,
            move_speed: 22.0,
            orbit_sensitivity: 0.25,
            axes: MoveAxes::default(),
            scroll_zoom: 0.0,
            orbit: None,
        }
    }

    /// Reset position, angles and fog to show `bounds`.
    ///
    /// Without bounds only the angles and fog are reset.
    pub fn frame_on(&mut self, bounds: Option<Aabb>) {
        if let Some(bounds) = bounds {
            let radius = bounds.half_diagonal();
            if radius > 0.0 {
                self.radius = radius;
            }
            self.position = bounds.center() + Vec3::splat(radius);
        }
        self.yaw = FRAMED_YAW;
        self.pitch = FRAMED_PITCH;
        self.fog = FogRange::from_radius(self.radius);
    }

    /// World -> camera transform
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_x(self.yaw.to_radians())
            * Mat4::from_rotation_y(self.pitch.to_radians())
            * Mat4::from_translation(-self.position)
    }

    /// Camera -> clip transform
    pub fn projection_matrix(&self, viewport: &Viewport) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov.to_radians(), viewport.aspect(), 1.0, self.far_clip())
    }

    pub fn far_clip(&self) -> f32 {
        self.radius * 3.0
    }

    pub fn is_orbiting(&self) -> bool {
        self.orbit.is_some()
    }

    /// Start an orbit drag at `cursor`
    pub fn begin_orbit(&mut self, cursor: Vec2) {
        self.orbit = Some(OrbitDrag {
            origin: cursor,
            yaw: self.yaw,
            pitch: self.pitch,
            moved: false,
        });
    }

    /// Re-derive the angles from the total drag since [`Self::begin_orbit`]
    pub fn drag_orbit(&mut self, cursor: Vec2) {
        let Some(orbit) = self.orbit.as_mut() else {
            return;
        };
        let delta = cursor - orbit.origin;
        self.yaw = orbit.yaw - delta.y * self.orbit_sensitivity;
        self.pitch = orbit.pitch + delta.x * self.orbit_sensitivity;
        if delta.length_squared() >= ORBIT_CLICK_THRESHOLD_SQ {
            orbit.moved = true;
        }
    }

    /// Finish the drag; returns true if it never left the click threshold.
    pub fn end_orbit(&mut self) -> bool {
        self.orbit.take().is_some_and(|orbit| !orbit.moved)
    }

    /// Wheel notch: negative steps zoom in, positive zoom out
    pub fn scroll(&mut self, steps: f32) {
        self.scroll_zoom += steps;
    }

    pub fn axes(&self) -> &MoveAxes {
        &self.axes
    }

    /// Apply held-key movement and pending wheel zoom for one frame.
    pub fn update_movement(&mut self, keys: &MoveKeys, fast: bool, dt: f32) {
        self.axes.update(keys, dt);

        let mut speed = self.move_speed;
        if fast {
            speed *= 2.0;
        }

        let axes = self.axes;
        let move_x = (axes.right - axes.left) * speed * dt;
        let move_z = (axes.back - axes.forward) * speed * dt + self.scroll_zoom * 2.0;
        self.scroll_zoom = 0.0;

        // Rows of the view rotation are the camera axes in world space
        let view = self.view_matrix();
        let right = view.row(0).truncate();
        let back = view.row(2).truncate();

        self.position += right * move_x + back * move_z;
        self.position.y += (axes.up - axes.down) * speed * dt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQRT_2: f32 = std::f32::consts::SQRT_2;

    #[test]
    fn frame_on_flat_box() {
        let mut camera = FlyCamera::new();
        camera.frame_on(Some(Aabb {
            min: Vec3::ZERO,
            max: Vec3::new(10.0, 0.0, 10.0),
        }));
        let r = 5.0 * SQRT_2;
        assert!((camera.radius - r).abs() < 1e-4);
        assert!((camera.position - Vec3::new(5.0 + r, r, 5.0 + r)).length() < 1e-4);
        assert_eq!(camera.yaw, 45.0);
        assert_eq!(camera.pitch, -125.0);
        assert!((camera.fog.start - r * 0.1).abs() < 1e-4);
        assert!((camera.fog.end - r * 1.25).abs() < 1e-4);
    }

    #[test]
    fn frame_on_without_bounds_keeps_position() {
        let mut camera = FlyCamera::new();
        camera.position = Vec3::new(1.0, 2.0, 3.0);
        camera.frame_on(None);
        assert_eq!(camera.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(camera.yaw, FRAMED_YAW);
        assert_eq!(camera.radius, 1000.0);
    }

    #[test]
    fn frame_on_point_keeps_positive_radius() {
        let mut camera = FlyCamera::new();
        camera.frame_on(Some(Aabb {
            min: Vec3::ONE,
            max: Vec3::ONE,
        }));
        assert!(camera.radius > 0.0);
    }

    #[test]
    fn small_drag_is_a_click() {
        let mut camera = FlyCamera::new();
        camera.begin_orbit(Vec2::new(100.0, 100.0));
        camera.drag_orbit(Vec2::new(102.0, 102.0)); // 8 px²
        assert!(camera.end_orbit());
    }

    #[test]
    fn drag_at_threshold_is_not_a_click() {
        let mut camera = FlyCamera::new();
        camera.begin_orbit(Vec2::new(100.0, 100.0));
        camera.drag_orbit(Vec2::new(103.0, 100.0)); // 9 px²
        camera.drag_orbit(Vec2::new(100.0, 100.0));
        assert!(!camera.end_orbit());
    }

    #[test]
    fn orbit_angles_are_relative_to_drag_start() {
        let mut camera = FlyCamera::new();
        camera.begin_orbit(Vec2::new(0.0, 0.0));
        camera.drag_orbit(Vec2::new(40.0, 8.0));
        camera.drag_orbit(Vec2::new(40.0, 8.0));
        assert_eq!(camera.yaw, 45.0 - 8.0 * 0.25);
        assert_eq!(camera.pitch, 45.0 + 40.0 * 0.25);
    }

    #[test]
    fn end_orbit_without_begin_is_not_a_click() {
        let mut camera = FlyCamera::new();
        assert!(!camera.end_orbit());
    }

    #[test]
    fn axes_ramp_and_clamp() {
        let mut camera = FlyCamera::new();
        let keys = MoveKeys {
            forward: true,
            ..Default::default()
        };
        camera.update_movement(&keys, false, 0.1);
        assert!((camera.axes().forward - 0.4).abs() < 1e-6);
        camera.update_movement(&keys, false, 1.0);
        assert_eq!(camera.axes().forward, 1.0);
        camera.update_movement(&MoveKeys::default(), false, 1.0);
        assert_eq!(camera.axes().forward, 0.0);
    }

    #[test]
    fn vertical_movement_uses_world_up() {
        let mut camera = FlyCamera::new();
        let keys = MoveKeys {
            up: true,
            ..Default::default()
        };
        camera.update_movement(&keys, false, 0.25); // axis reaches 1.0
        assert!((camera.position.y - 22.0 * 0.25).abs() < 1e-4);
        assert!(camera.position.x.abs() < 1e-6);
        assert!(camera.position.z.abs() < 1e-6);
    }

    #[test]
    fn shift_doubles_speed() {
        let keys = MoveKeys {
            up: true,
            ..Default::default()
        };
        let mut slow = FlyCamera::new();
        let mut fast = FlyCamera::new();
        slow.update_movement(&keys, false, 0.25);
        fast.update_movement(&keys, true, 0.25);
        assert!((fast.position.y - 2.0 * slow.position.y).abs() < 1e-4);
    }

    #[test]
    fn scroll_moves_along_view_axis_once() {
        let mut camera = FlyCamera::new();
        camera.scroll(1.0);
        camera.update_movement(&MoveKeys::default(), false, 0.0);
        assert!((camera.position.length() - 2.0).abs() < 1e-4);
        let after = camera.position;
        camera.update_movement(&MoveKeys::default(), false, 0.0);
        assert_eq!(camera.position, after);
    }
}
