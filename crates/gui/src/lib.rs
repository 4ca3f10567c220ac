// Library crate: the headless session core, testable without a window.
// Window glue (app, ui, viewport painting) stays in the binary crate.

pub mod build;
pub mod command;
pub mod fixtures;
pub mod geometry;
pub mod harness;
pub mod replay;
pub mod sample;
pub mod session;
pub mod state;
pub mod validation;

/// Camera, picking and draw-list types shared by the session and the painter.
/// Painting itself stays in the binary crate.
pub mod viewport {
    pub mod camera;
    pub mod debug_draw;
    pub mod mesh;
    pub mod picking;
}
