//! 3D viewport panel: feeds pointer input to the session and paints its draw lists

mod gl_renderer;
mod overlays;
mod renderer;
pub use navdemo_gui_lib::viewport::{camera, debug_draw, picking};

use std::sync::{Arc, Mutex};

use egui::Ui;

use crate::session::{InputEvent, Modifiers, MouseButton, Session};
use camera::MoveKeys;
use debug_draw::{DebugDraw, Overlay};
use gl_renderer::{FrameGeometry, GlRenderer, RenderParams};
use renderer::screen_to_gl;

/// Fog and clear color
const BACKGROUND: [u8; 3] = [48, 52, 58];

/// 3D viewport panel with OpenGL rendering
pub struct ViewportPanel {
    gl_renderer: Option<Arc<Mutex<GlRenderer>>>,
    draw: DebugDraw,
    overlay: Overlay,
    /// Pipeline overlay asked for the pointer last frame
    overlay_captured: bool,
}

impl ViewportPanel {
    pub fn new() -> Self {
        Self {
            gl_renderer: None,
            draw: DebugDraw::default(),
            overlay: Overlay::default(),
            overlay_captured: false,
        }
    }

    /// Initialize GL renderer (must be called with a GL context)
    pub fn init_gl(&mut self, gl: &glow::Context) {
        match GlRenderer::new(gl) {
            Ok(renderer) => self.gl_renderer = Some(Arc::new(Mutex::new(renderer))),
            Err(e) => tracing::error!("GL renderer unavailable, using software fallback: {e}"),
        }
    }

    /// Free the GL program and buffers
    pub fn destroy_gl(&mut self, gl: &glow::Context) {
        let Some(renderer) = self.gl_renderer.take() else {
            return;
        };
        match renderer.lock() {
            Ok(renderer) => renderer.destroy(gl),
            Err(e) => tracing::warn!("GL renderer lock poisoned, skipping cleanup: {e}"),
        };
    }

    pub fn show(
        &mut self,
        ui: &mut Ui,
        session: &mut Session,
        keys: &MoveKeys,
        modifiers: Modifiers,
        dt: f32,
    ) {
        let (rect, response) =
            ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());

        session.set_viewport(rect.width(), rect.height());
        session.set_pointer_over_overlay(!response.hovered() || self.overlay_captured);

        // ── Input ────────────────────────────────────────────
        self.feed_pointer(ui, rect, session);

        // ── Update ───────────────────────────────────────────
        session.frame(dt, keys, modifiers);

        // ── Collect draw lists ───────────────────────────────
        self.draw.clear();
        self.overlay.clear();
        session.render(&mut self.draw);
        self.overlay_captured = session.render_overlay(&mut self.overlay);

        if !ui.is_rect_visible(rect) {
            return;
        }

        self.render_scene(ui, rect, session);

        let painter = ui.painter_at(rect);
        overlays::draw_overlay(&painter, rect, &self.overlay);
        overlays::draw_camera_info(&painter, rect, session.camera());
        if session.geometry().is_none() {
            overlays::draw_nav_hint(&painter, rect);
        }
    }

    /// Translate this frame's pointer events into session input
    fn feed_pointer(&self, ui: &Ui, rect: egui::Rect, session: &mut Session) {
        let (events, scroll) = ui.input(|i| (i.events.clone(), i.raw_scroll_delta.y));

        for event in events {
            match event {
                egui::Event::PointerMoved(pos) => {
                    session.handle_event(InputEvent::MouseMove(screen_to_gl(rect, pos)));
                }
                egui::Event::PointerButton {
                    pos,
                    button,
                    pressed,
                    modifiers,
                } => {
                    let button = match button {
                        egui::PointerButton::Primary => MouseButton::Primary,
                        egui::PointerButton::Secondary => MouseButton::Secondary,
                        _ => continue,
                    };
                    let modifiers = Modifiers {
                        shift: modifiers.shift,
                        ctrl: modifiers.command || modifiers.ctrl,
                    };
                    let pos = screen_to_gl(rect, pos);
                    session.handle_event(if pressed {
                        InputEvent::MouseDown {
                            button,
                            pos,
                            modifiers,
                        }
                    } else {
                        InputEvent::MouseUp {
                            button,
                            pos,
                            modifiers,
                        }
                    });
                }
                _ => {}
            }
        }

        // egui scrolls up with positive y; one notch up zooms in
        if scroll != 0.0 {
            session.handle_event(InputEvent::Wheel(-scroll.signum()));
        }
    }

    fn render_scene(&self, ui: &mut Ui, rect: egui::Rect, session: &Session) {
        let Some(gl_renderer) = &self.gl_renderer else {
            // Fallback: software rendering
            renderer::paint_viewport(ui, rect, session.camera(), &self.draw, BACKGROUND);
            return;
        };

        let renderer_clone = gl_renderer.clone();
        let camera = session.camera().clone();
        let frame = FrameGeometry::from_draw(&self.draw);

        let callback = egui::PaintCallback {
            rect,
            callback: Arc::new(eframe::egui_glow::CallbackFn::new(move |info, painter| {
                let gl = painter.gl();
                let clip = info.clip_rect_in_pixels();
                let viewport = [
                    clip.left_px as f32,
                    clip.from_bottom_px as f32,
                    clip.width_px as f32,
                    clip.height_px as f32,
                ];
                if let Ok(mut r) = renderer_clone.lock() {
                    r.upload(gl, &frame);
                    r.paint(gl, &RenderParams::new(&camera, viewport, BACKGROUND));
                }
            })),
        };

        ui.painter().add(callback);
    }
}
