//! Integration tests for the headless test harness itself.

use glam::Vec3;
use navdemo_gui_lib::harness::{TestHarness, FRAME_DT};
use navdemo_gui_lib::session::Modifiers;

#[test]
fn test_fixture_meshes_validate() {
    let mut h = TestHarness::new();
    for name in ["arena.obj", "ramp.obj", "walls.obj"] {
        assert!(h.load(name), "{name} failed to load");
        let validator = h.validate_geometry().expect("geometry loaded");
        assert!(validator.validate_all().is_empty(), "{name}");
    }
    assert!(!h.load("broken.obj"));
    assert!(h.validate_geometry().is_none());
}

#[test]
fn test_look_down_centres_target() {
    let mut h = TestHarness::new();
    let target = Vec3::new(3.0, 0.0, -2.0);
    h.look_down_at(target, 15.0);
    let screen = h.screen_of(target).expect("target visible");
    assert!((screen.x - 640.0).abs() < 1e-2);
    assert!((screen.y - 400.0).abs() < 1e-2);
}

#[test]
fn test_pick_at_round_trips() {
    let mut h = TestHarness::new();
    h.load("arena.obj");
    h.look_down_at(Vec3::ZERO, 20.0);
    let target = Vec3::new(4.0, 0.0, 7.0);
    h.pick_at(target, Modifiers::CTRL);
    let marker = h.session.marker().expect("marker set");
    assert!((marker - target).length() < 1e-2);
}

#[test]
fn test_frames_leave_idle_camera_in_place() {
    let mut h = TestHarness::new();
    h.load("arena.obj");
    let before = h.session.camera().position;
    for _ in 0..10 {
        h.frame();
    }
    assert_eq!(h.session.camera().position, before);
    assert!(FRAME_DT < 0.05);
}
