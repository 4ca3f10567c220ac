//! Properties panel: active sample, input mesh and build settings

use egui::Ui;
use shared::{BuildSettings, PartitionType};

use crate::sample::DrawMode;
use crate::session::Session;
use crate::state::Chooser;

pub fn show(ui: &mut Ui, session: &mut Session) {
    ui.heading("Properties");
    ui.separator();

    // ── Sample ─────────────────────────────────────────────
    ui.horizontal(|ui| {
        ui.label("Sample:");
        let name = session
            .sample()
            .map(|s| s.kind().name())
            .unwrap_or("none");
        if ui.button(name).clicked() {
            session.panels_mut().toggle_chooser(Chooser::Sample);
        }
    });

    // ── Input mesh ─────────────────────────────────────────
    ui.horizontal(|ui| {
        ui.label("Input Mesh:");
        let name = session
            .geometry()
            .map(|g| g.name().to_string())
            .unwrap_or_else(|| "Choose Mesh…".to_string());
        if ui.button(name).clicked() {
            session.panels_mut().toggle_chooser(Chooser::Level);
        }
    });

    if let Some(geom) = session.geometry() {
        egui::Grid::new("mesh_info")
            .num_columns(2)
            .spacing([8.0, 4.0])
            .show(ui, |ui| {
                ui.label("Verts:");
                ui.label(format!("{:.1}k", geom.mesh().vertex_count() as f32 / 1000.0));
                ui.end_row();

                ui.label("Tris:");
                ui.label(format!("{:.1}k", geom.mesh().triangle_count() as f32 / 1000.0));
                ui.end_row();
            });
    }

    let has_geometry = session.geometry().is_some();
    let Some(sample) = session.sample_mut() else {
        return;
    };

    ui.add_space(4.0);
    let changed = settings_ui(ui, sample.settings_mut());
    if changed {
        sample.handle_settings_changed();
    }

    ui.add_space(8.0);
    ui.separator();
    if ui
        .add_enabled(has_geometry, egui::Button::new("Build").min_size(egui::vec2(120.0, 24.0)))
        .clicked()
    {
        session.build();
    }

    // ── Draw ───────────────────────────────────────────────
    let Some(sample) = session.sample_mut() else {
        return;
    };
    ui.add_space(4.0);
    ui.label("Draw");
    let built = sample.core().surface.is_some();
    let current = sample.draw_mode();
    for &mode in DrawMode::all() {
        let enabled = built || !mode.needs_surface();
        if ui
            .add_enabled(enabled, egui::RadioButton::new(current == mode, mode.name()))
            .clicked()
        {
            sample.set_draw_mode(mode);
        }
    }
}

/// Build settings sliders; true when any value changed
fn settings_ui(ui: &mut Ui, s: &mut BuildSettings) -> bool {
    let mut changed = false;

    egui::CollapsingHeader::new("Rasterization")
        .id_salt("settings_raster")
        .default_open(true)
        .show(ui, |ui| {
            changed |= slider(ui, &mut s.cell_size, 0.1..=1.0, "Cell Size");
            changed |= slider(ui, &mut s.cell_height, 0.1..=1.0, "Cell Height");
        });

    egui::CollapsingHeader::new("Agent")
        .id_salt("settings_agent")
        .default_open(true)
        .show(ui, |ui| {
            changed |= slider(ui, &mut s.agent_height, 0.1..=5.0, "Height");
            changed |= slider(ui, &mut s.agent_radius, 0.0..=5.0, "Radius");
            changed |= slider(ui, &mut s.agent_max_climb, 0.1..=5.0, "Max Climb");
            changed |= slider(ui, &mut s.agent_max_slope, 0.0..=90.0, "Max Slope");
        });

    egui::CollapsingHeader::new("Region")
        .id_salt("settings_region")
        .default_open(false)
        .show(ui, |ui| {
            changed |= slider(ui, &mut s.region_min_size, 0.0..=150.0, "Min Region Size");
            changed |= slider(ui, &mut s.region_merge_size, 0.0..=150.0, "Merged Region Size");
        });

    egui::CollapsingHeader::new("Partitioning")
        .id_salt("settings_partition")
        .default_open(false)
        .show(ui, |ui| {
            for (partition, label) in [
                (PartitionType::Watershed, "Watershed"),
                (PartitionType::Monotone, "Monotone"),
                (PartitionType::Layers, "Layers"),
            ] {
                changed |= ui
                    .radio_value(&mut s.partition_type, partition, label)
                    .changed();
            }
        });

    egui::CollapsingHeader::new("Polygonization")
        .id_salt("settings_poly")
        .default_open(false)
        .show(ui, |ui| {
            changed |= slider(ui, &mut s.edge_max_len, 0.0..=50.0, "Max Edge Length");
            changed |= slider(ui, &mut s.edge_max_error, 0.1..=3.0, "Max Edge Error");
            changed |= slider(ui, &mut s.verts_per_poly, 3.0..=12.0, "Verts Per Poly");
            changed |= slider(ui, &mut s.detail_sample_dist, 0.0..=16.0, "Sample Distance");
            changed |= slider(ui, &mut s.detail_sample_max_error, 0.0..=16.0, "Max Sample Error");
        });

    egui::CollapsingHeader::new("Tiling")
        .id_salt("settings_tiling")
        .default_open(false)
        .show(ui, |ui| {
            changed |= slider(ui, &mut s.tile_size, 16.0..=1024.0, "Tile Size");
        });

    changed
}

fn slider(ui: &mut Ui, value: &mut f32, range: std::ops::RangeInclusive<f32>, label: &str) -> bool {
    ui.add(egui::Slider::new(value, range).text(label)).changed()
}
