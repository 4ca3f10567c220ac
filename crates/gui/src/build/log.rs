use std::time::Instant;

/// Severity of a build log line
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Progress,
    Warning,
    Error,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Progress => "",
            Severity::Warning => "WARNING: ",
            Severity::Error => "ERROR: ",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LogEntry {
    pub severity: Severity,
    pub message: String,
}

impl std::fmt::Display for LogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.severity.label(), self.message)
    }
}

/// Accumulated output of the most recent build or load.
///
/// Pipelines append while building; the session resets it before each
/// build and dumps it to the process log afterwards.
#[derive(Clone, Debug, Default)]
pub struct BuildLog {
    entries: Vec<LogEntry>,
    started: Option<Instant>,
}

impl BuildLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all entries and restart the build timer
    pub fn reset(&mut self) {
        self.entries.clear();
        self.started = Some(Instant::now());
    }

    pub fn log(&mut self, severity: Severity, message: impl Into<String>) {
        self.entries.push(LogEntry {
            severity,
            message: message.into(),
        });
    }

    pub fn progress(&mut self, message: impl Into<String>) {
        self.log(Severity::Progress, message);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.log(Severity::Warning, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.log(Severity::Error, message);
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|e| e.severity == Severity::Error)
    }

    /// Milliseconds since the last [`Self::reset`]
    pub fn elapsed_ms(&self) -> f32 {
        self.started
            .map(|t| t.elapsed().as_secs_f32() * 1000.0)
            .unwrap_or(0.0)
    }

    /// Mirror the accumulated entries to the process log under `header`
    pub fn dump(&self, header: &str) {
        tracing::info!("{header}");
        for entry in &self.entries {
            match entry.severity {
                Severity::Progress => tracing::info!("  {}", entry.message),
                Severity::Warning => tracing::warn!("  {}", entry.message),
                Severity::Error => tracing::error!("  {}", entry.message),
            }
        }
    }

    /// All entries as display lines, oldest first
    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(ToString::to_string).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_clears_entries() {
        let mut log = BuildLog::new();
        log.progress("rasterize");
        log.error("no walkable area");
        assert_eq!(log.len(), 2);
        assert!(log.has_errors());
        log.reset();
        assert!(log.is_empty());
        assert!(!log.has_errors());
    }

    #[test]
    fn lines_carry_severity_prefix() {
        let mut log = BuildLog::new();
        log.progress("Build took 3.0ms");
        log.warn("small region dropped");
        log.error("Could not build navigation surface.");
        assert_eq!(
            log.lines(),
            vec![
                "Build took 3.0ms".to_string(),
                "WARNING: small region dropped".to_string(),
                "ERROR: Could not build navigation surface.".to_string(),
            ]
        );
    }

    #[test]
    fn elapsed_is_zero_before_reset() {
        assert_eq!(BuildLog::new().elapsed_ms(), 0.0);
    }
}
