pub mod choosers;
pub mod log_panel;
pub mod properties;
pub mod status_bar;
pub mod tools;
