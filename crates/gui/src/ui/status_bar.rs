use egui::Ui;

use crate::session::Session;

pub fn show(ui: &mut Ui, session: &Session) {
    ui.horizontal(|ui| {
        match session.geometry() {
            Some(geom) => ui.label(geom.name()),
            None => ui.weak("No mesh"),
        };

        ui.separator();

        match session.sample() {
            Some(sample) => ui.label(format!("{} {}", sample.kind(), sample.id())),
            None => ui.weak("No sample"),
        };

        ui.separator();
        ui.weak(format!("Test: {}", session.replay().name()));

        if session.log().has_errors() {
            ui.separator();
            ui.colored_label(egui::Color32::from_rgb(255, 110, 100), "Build log has errors");
        }

        // Right-aligned version
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.weak("navdemo v0.1");
        });
    });
}
