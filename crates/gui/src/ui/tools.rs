//! Tools panel: active tool hint, pipeline status and test-case results

use egui::{Color32, Ui};

use crate::replay::ReplayState;
use crate::session::{InputEvent, Key, Session};

pub fn show(ui: &mut Ui, session: &mut Session) {
    ui.heading("Tools");
    ui.separator();

    match session.sample() {
        Some(sample) => {
            ui.label(egui::RichText::new(sample.kind().name()).strong());
            ui.weak(sample.tool_hint());
            ui.add_space(4.0);
            ui.label(sample.status());
        }
        None => {
            ui.weak("No sample");
        }
    }

    ui.add_space(4.0);
    ui.horizontal(|ui| {
        if ui.button("Toggle (Space)").clicked() {
            session.handle_event(InputEvent::KeyDown(Key::Space));
        }
        if ui.button("Step (1)").clicked() {
            session.handle_event(InputEvent::KeyDown(Key::Num1));
        }
    });

    if let Some(marker) = session.marker() {
        ui.add_space(4.0);
        ui.weak(format!(
            "Marker {:.2} {:.2} {:.2}",
            marker.x, marker.y, marker.z
        ));
    }

    ui.add_space(8.0);
    test_results(ui, session.replay());
}

fn test_results(ui: &mut Ui, replay: &ReplayState) {
    let Some(case) = replay.case() else {
        return;
    };

    egui::CollapsingHeader::new("Test Results")
        .id_salt("test_results")
        .default_open(true)
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.strong(case.name());
                ui.weak(replay.name());
            });

            let Some(report) = replay.report() else {
                return;
            };
            let summary_color = if report.all_passed() {
                Color32::from_rgb(100, 220, 120)
            } else {
                Color32::from_rgb(255, 110, 100)
            };
            ui.colored_label(summary_color, report.summary());

            egui::ScrollArea::vertical()
                .id_salt("test_results_scroll")
                .max_height(240.0)
                .show(ui, |ui| {
                    for result in &report.results {
                        let (mark, color) = if result.passed() {
                            ("✔", Color32::from_rgb(100, 220, 120))
                        } else {
                            ("✖", Color32::from_rgb(255, 110, 100))
                        };
                        ui.horizontal(|ui| {
                            ui.colored_label(color, mark);
                            ui.label(&result.label);
                        });
                    }
                });
        });
}
