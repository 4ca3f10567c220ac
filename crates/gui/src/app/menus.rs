//! Application menu bar and settings window

use eframe::egui;
use shared::SampleKind;

use crate::geometry::GEOMETRY_EXTENSIONS;
use crate::session::{InputEvent, Key, Session};
use crate::state::{AppSettings, Chooser};

/// Show the file menu
pub fn file_menu(ui: &mut egui::Ui, session: &mut Session) {
    ui.menu_button("File", |ui| {
        if ui.button("Open mesh…").clicked() {
            ui.close_menu();
            if let Some(path) = rfd::FileDialog::new()
                .set_title("Open mesh or geometry set")
                .set_directory(session.meshes_dir())
                .add_filter("Geometry", GEOMETRY_EXTENSIONS)
                .pick_file()
            {
                session.load_geometry(&path);
            }
        }
        if ui.button("Open test case…").clicked() {
            ui.close_menu();
            if let Some(path) = rfd::FileDialog::new()
                .set_title("Open test case")
                .set_directory(session.test_cases_dir())
                .add_filter("Test case", &["json"])
                .pick_file()
            {
                if session.load_test_case(&path) {
                    session.run_test_case();
                }
            }
        }
        ui.separator();
        let can_save = session.geometry().is_some() && session.sample().is_some();
        if ui
            .add_enabled(can_save, egui::Button::new("Save geometry set (9)"))
            .clicked()
        {
            ui.close_menu();
            session.handle_event(InputEvent::KeyDown(Key::Num9));
        }
        ui.separator();
        if ui.button("Quit (Esc)").clicked() {
            ui.close_menu();
            session.handle_event(InputEvent::Quit);
        }
    });
}

/// Show the sample menu
pub fn sample_menu(ui: &mut egui::Ui, session: &mut Session) {
    ui.menu_button("Sample", |ui| {
        let current = session.sample().map(|s| s.kind());
        for &kind in SampleKind::all() {
            if ui
                .selectable_label(current == Some(kind), kind.name())
                .clicked()
            {
                session.select_sample(kind);
                ui.close_menu();
            }
        }
    });
}

/// Show the view menu
pub fn view_menu(ui: &mut egui::Ui, session: &mut Session, show_settings: &mut bool) {
    ui.menu_button("View", |ui| {
        let panels = session.panels_mut();
        ui.checkbox(&mut panels.menu, "Panels (Tab)");
        ui.checkbox(&mut panels.log, "Log");
        ui.checkbox(&mut panels.tools, "Tools");
        if ui.button("Test cases (T)").clicked() {
            panels.toggle_chooser(Chooser::TestCase);
            ui.close_menu();
        }
        ui.separator();
        if ui.button("Frame geometry").clicked() {
            let bounds = session.geometry().map(|g| g.nav_mesh_bounds());
            session.camera_mut().frame_on(bounds);
            ui.close_menu();
        }
        if ui.button("Settings…").clicked() {
            *show_settings = true;
            ui.close_menu();
        }
    });
}

/// Application settings window
pub fn settings_window(
    ctx: &egui::Context,
    open: &mut bool,
    settings: &mut AppSettings,
    session: &mut Session,
) {
    let mut still_open = *open;
    egui::Window::new("Settings")
        .open(&mut still_open)
        .resizable(false)
        .collapsible(false)
        .show(ctx, |ui| {
            egui::Grid::new("settings_grid")
                .num_columns(2)
                .spacing([8.0, 4.0])
                .show(ui, |ui| {
                    ui.label("Font size:");
                    ui.add(egui::Slider::new(&mut settings.ui.font_size, 10.0..=22.0));
                    ui.end_row();

                    ui.label("Move speed:");
                    if ui
                        .add(egui::Slider::new(&mut settings.camera.move_speed, 1.0..=200.0))
                        .changed()
                    {
                        session.camera_mut().move_speed = settings.camera.move_speed;
                    }
                    ui.end_row();

                    ui.label("Field of view:");
                    if ui
                        .add(egui::Slider::new(&mut settings.camera.fov, 20.0..=100.0).suffix("°"))
                        .changed()
                    {
                        session.camera_mut().fov = settings.camera.fov;
                    }
                    ui.end_row();

                    ui.label("Default sample:");
                    egui::ComboBox::from_id_salt("default_sample")
                        .selected_text(settings.default_sample.name())
                        .show_ui(ui, |ui| {
                            for &kind in SampleKind::all() {
                                ui.selectable_value(&mut settings.default_sample, kind, kind.name());
                            }
                        });
                    ui.end_row();
                });

            ui.separator();
            if ui.button("Save").clicked() {
                match settings.save() {
                    Ok(()) => tracing::info!("Settings saved"),
                    Err(e) => tracing::error!("Failed to save settings: {e}"),
                }
            }
        });
    *open = still_open;
}
