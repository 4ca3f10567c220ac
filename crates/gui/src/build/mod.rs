//! Build log plumbing shared by the session and the sample pipelines.

mod log;

pub use log::{BuildLog, LogEntry, Severity};

/// Header written before a dumped build log
pub fn build_log_header(geometry_name: &str) -> String {
    format!("Build log {geometry_name}:")
}

/// Header written before a dumped load log
pub fn load_log_header(path: &str) -> String {
    format!("Geom load log {path}:")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_name_the_geometry() {
        assert_eq!(build_log_header("arena.obj"), "Build log arena.obj:");
        assert_eq!(load_log_header("meshes/x.obj"), "Geom load log meshes/x.obj:");
    }
}
