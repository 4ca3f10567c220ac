//! Main application module

mod keyboard;
mod menus;
mod styles;

use std::path::PathBuf;

use eframe::egui;

use crate::session::Session;
use crate::state::AppSettings;
use crate::ui::{choosers, log_panel, properties, status_bar, tools};
use crate::viewport::ViewportPanel;

/// Main application
pub struct NavDemoApp {
    session: Session,
    settings: AppSettings,
    viewport: ViewportPanel,
    /// Last applied font size (to detect changes)
    last_font_size: f32,
    show_settings: bool,
}

impl NavDemoApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        settings: AppSettings,
        initial_geometry: Option<PathBuf>,
    ) -> Self {
        let mut session = Session::new(&settings);
        if let Some(path) = initial_geometry {
            session.load_geometry(&path);
        }

        styles::configure_styles(&cc.egui_ctx, settings.ui.font_size);

        let mut viewport = ViewportPanel::new();
        if let Some(gl) = cc.gl.as_ref() {
            viewport.init_gl(gl);
        }

        let last_font_size = settings.ui.font_size;
        Self {
            session,
            settings,
            viewport,
            last_font_size,
            show_settings: false,
        }
    }
}

impl eframe::App for NavDemoApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.settings.ui.font_size != self.last_font_size {
            styles::apply_font_size(ctx, self.settings.ui.font_size);
            self.last_font_size = self.settings.ui.font_size;
        }

        let (keys, modifiers) = keyboard::handle_keyboard(ctx, &mut self.session);

        if self.session.quit_requested() {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }

        let panels = self.session.panels().clone();

        if panels.menu {
            // ── Menu bar ──────────────────────────────────────
            egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
                egui::menu::bar(ui, |ui| {
                    menus::file_menu(ui, &mut self.session);
                    menus::sample_menu(ui, &mut self.session);
                    menus::view_menu(ui, &mut self.session, &mut self.show_settings);
                });
            });

            menus::settings_window(ctx, &mut self.show_settings, &mut self.settings, &mut self.session);
            choosers::show(ctx, &mut self.session);
        }

        // ── Status bar ───────────────────────────────────────
        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(22.0)
            .frame(
                egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::symmetric(8, 2)),
            )
            .show(ctx, |ui| {
                status_bar::show(ui, &self.session);
            });

        if panels.menu {
            // ── Log ──────────────────────────────────────────
            if panels.log {
                egui::TopBottomPanel::bottom("log_panel")
                    .default_height(180.0)
                    .height_range(80.0..=500.0)
                    .resizable(true)
                    .show(ctx, |ui| {
                        log_panel::show(ui, &mut self.session);
                    });
            }

            // ── Left panel: Tools ────────────────────────────
            if panels.tools {
                egui::SidePanel::left("tools_panel")
                    .default_width(250.0)
                    .width_range(180.0..=400.0)
                    .resizable(true)
                    .frame(
                        egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::same(6)),
                    )
                    .show(ctx, |ui| {
                        tools::show(ui, &mut self.session);
                    });
            }

            // ── Right panel: Properties ──────────────────────
            egui::SidePanel::right("properties_panel")
                .default_width(290.0)
                .width_range(200.0..=500.0)
                .resizable(true)
                .frame(
                    egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::same(6)),
                )
                .show(ctx, |ui| {
                    egui::ScrollArea::vertical()
                        .id_salt("props_scroll")
                        .show(ui, |ui| {
                            properties::show(ui, &mut self.session);
                        });
                });
        }

        // ── Central panel: 3D viewport ───────────────────────
        let dt = ctx.input(|i| i.stable_dt);
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                self.viewport.show(ui, &mut self.session, &keys, modifiers, dt);
            });

        // Pipelines simulate continuously
        ctx.request_repaint();
    }

    fn on_exit(&mut self, gl: Option<&eframe::glow::Context>) {
        if let Some(gl) = gl {
            self.viewport.destroy_gl(gl);
        }
        if let Err(e) = self.settings.save() {
            tracing::warn!("Failed to save settings: {e}");
        }
    }
}
