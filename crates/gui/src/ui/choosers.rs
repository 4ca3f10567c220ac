//! Sample, level and test-case choosers

use shared::SampleKind;

use crate::session::Session;
use crate::state::Chooser;

/// Show the open chooser, if any, as a floating window
pub fn show(ctx: &egui::Context, session: &mut Session) {
    let chooser = session.panels().chooser;
    let title = match chooser {
        Chooser::None => return,
        Chooser::Sample => "Choose Sample",
        Chooser::Level => "Choose Level",
        Chooser::TestCase => "Choose Test To Run",
    };

    let mut open = true;
    egui::Window::new(title)
        .id(egui::Id::new("chooser"))
        .open(&mut open)
        .collapsible(false)
        .default_width(240.0)
        .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-300.0, 30.0))
        .show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .id_salt("chooser_scroll")
                .max_height(420.0)
                .show(ui, |ui| match chooser {
                    Chooser::Sample => sample_list(ui, session),
                    Chooser::Level => level_list(ui, session),
                    Chooser::TestCase => test_list(ui, session),
                    Chooser::None => {}
                });
        });

    if !open {
        session.panels_mut().chooser = Chooser::None;
    }
}

fn sample_list(ui: &mut egui::Ui, session: &mut Session) {
    let current = session.sample().map(|s| s.kind());
    for &kind in SampleKind::all() {
        if ui.selectable_label(current == Some(kind), kind.name()).clicked() {
            session.select_sample(kind);
            session.panels_mut().chooser = Chooser::None;
        }
    }
}

fn level_list(ui: &mut egui::Ui, session: &mut Session) {
    let files = session.list_meshes();
    if files.is_empty() {
        ui.weak(format!("No meshes in {}", session.meshes_dir().display()));
        return;
    }
    let current = session.geometry().map(|g| g.name().to_string());
    for name in files {
        if ui
            .selectable_label(current.as_deref() == Some(name.as_str()), &name)
            .clicked()
        {
            let path = session.meshes_dir().join(&name);
            session.load_geometry(&path);
            session.panels_mut().chooser = Chooser::None;
        }
    }
}

fn test_list(ui: &mut egui::Ui, session: &mut Session) {
    let files = session.list_test_cases();
    if files.is_empty() {
        ui.weak(format!("No test cases in {}", session.test_cases_dir().display()));
        return;
    }
    for name in files {
        if ui.selectable_label(false, &name).clicked() {
            let path = session.test_cases_dir().join(&name);
            if session.load_test_case(&path) {
                session.run_test_case();
            }
            session.panels_mut().chooser = Chooser::None;
        }
    }
}
