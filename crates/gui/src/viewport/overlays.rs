//! Screen-space overlays drawn on top of the 3D view

use egui::{Color32, Painter, Stroke};

use super::camera::FlyCamera;
use super::debug_draw::{Overlay, Rgba};
use super::renderer::gl_to_screen;

fn color(c: Rgba) -> Color32 {
    Color32::from_rgba_unmultiplied(c[0], c[1], c[2], c[3])
}

/// Labels and circles collected from the session
pub fn draw_overlay(painter: &Painter, rect: egui::Rect, overlay: &Overlay) {
    for circle in &overlay.circles {
        painter.circle_stroke(
            gl_to_screen(rect, circle.pos.x, circle.pos.y),
            circle.radius,
            Stroke::new(2.0, color(circle.color)),
        );
    }
    for label in &overlay.labels {
        painter.text(
            gl_to_screen(rect, label.pos.x, label.pos.y),
            egui::Align2::CENTER_CENTER,
            &label.text,
            egui::FontId::proportional(12.0),
            color(label.color),
        );
    }
}

/// Camera position and angles in the top-right corner
pub fn draw_camera_info(painter: &Painter, rect: egui::Rect, camera: &FlyCamera) {
    let overlay_rect = egui::Rect::from_min_size(
        egui::pos2(rect.right() - 180.0, rect.top() + 4.0),
        egui::vec2(176.0, 44.0),
    );
    painter.rect_filled(
        overlay_rect,
        4.0,
        Color32::from_rgba_premultiplied(0, 0, 0, 140),
    );
    let p = camera.position;
    painter.text(
        overlay_rect.min + egui::vec2(6.0, 4.0),
        egui::Align2::LEFT_TOP,
        format!("pos {:.1} {:.1} {:.1}", p.x, p.y, p.z),
        egui::FontId::monospace(11.0),
        Color32::from_rgb(180, 180, 190),
    );
    painter.text(
        overlay_rect.min + egui::vec2(6.0, 22.0),
        egui::Align2::LEFT_TOP,
        format!("rot {:.0} {:.0}", camera.yaw, camera.pitch),
        egui::FontId::monospace(11.0),
        Color32::from_rgb(180, 180, 190),
    );
}

/// Navigation hint shown while nothing is loaded
pub fn draw_nav_hint(painter: &Painter, rect: egui::Rect) {
    painter.text(
        egui::pos2(rect.center().x, rect.bottom() - 20.0),
        egui::Align2::CENTER_BOTTOM,
        "Load a mesh to start. RMB drag: orbit  WASD/QE: move  Shift: fast  Ctrl+click: marker",
        egui::FontId::proportional(11.0),
        Color32::from_rgb(100, 100, 110),
    );
}
