use egui::{Color32, Ui};

use crate::build::Severity;
use crate::session::Session;

pub fn show(ui: &mut Ui, session: &mut Session) {
    let scroll_to_end = session.take_scroll_log();

    ui.horizontal(|ui| {
        ui.strong("Log");
        ui.weak(format!("{} entries", session.log().len()));
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.small_button("✕").clicked() {
                session.panels_mut().log = false;
            }
        });
    });
    ui.separator();

    egui::ScrollArea::vertical()
        .id_salt("log_scroll")
        .auto_shrink([false, false])
        .stick_to_bottom(true)
        .show(ui, |ui| {
            for entry in session.log().entries() {
                let color = match entry.severity {
                    Severity::Progress => ui.visuals().text_color(),
                    Severity::Warning => Color32::from_rgb(255, 200, 100),
                    Severity::Error => Color32::from_rgb(255, 110, 100),
                };
                ui.colored_label(color, egui::RichText::new(entry.to_string()).monospace());
            }
            if scroll_to_end {
                ui.scroll_to_cursor(Some(egui::Align::BOTTOM));
            }
        });
}
