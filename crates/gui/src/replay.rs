//! Scripted test cases: a sample kind, a mesh and a list of query assertions.
//!
//! The session drives the replay; this module holds the script, the state
//! machine and assertion evaluation.

use std::path::{Path, PathBuf};

use glam::{Mat4, Vec2, Vec3};
use shared::{Assertion, Query, SampleKind, TestScript};

use crate::sample::SamplePipeline;
use crate::viewport::debug_draw::{rgba, DebugDraw, Overlay, Rgba};
use crate::viewport::picking::{project, Viewport};

/// Pixel distance from a result label's anchor that counts as hovering it
pub const LABEL_HOVER_RADIUS: f32 = 12.0;

#[derive(Debug, thiserror::Error)]
pub enum TestCaseError {
    #[error("failed to read test case {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse test case {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A parsed script and where it came from
#[derive(Debug, Clone, PartialEq)]
pub struct TestCase {
    pub path: PathBuf,
    pub script: TestScript,
}

impl TestCase {
    pub fn load(path: &Path) -> Result<Self, TestCaseError> {
        let text = std::fs::read_to_string(path).map_err(|source| TestCaseError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(path, &text)
    }

    pub fn parse(path: &Path, text: &str) -> Result<Self, TestCaseError> {
        let script = serde_json::from_str(text).map_err(|source| TestCaseError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            script,
        })
    }

    /// Sample kind named by the script, if recognised
    pub fn sample_kind(&self) -> Option<SampleKind> {
        SampleKind::from_name(&self.script.sample)
    }

    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssertionResult {
    pub label: String,
    pub query: Query,
    pub expected: bool,
    pub actual: bool,
}

impl AssertionResult {
    pub fn passed(&self) -> bool {
        self.expected == self.actual
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReplayReport {
    pub results: Vec<AssertionResult>,
    /// Set when the replay stopped before evaluating assertions
    pub aborted: Option<String>,
}

impl ReplayReport {
    pub fn aborted(reason: impl Into<String>) -> Self {
        Self {
            results: Vec::new(),
            aborted: Some(reason.into()),
        }
    }

    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.passed()
    }

    /// True only when nothing aborted and every assertion passed
    pub fn all_passed(&self) -> bool {
        self.aborted.is_none() && self.failed() == 0
    }

    pub fn summary(&self) -> String {
        match &self.aborted {
            Some(reason) => format!("Aborted: {reason}"),
            None => format!("{} / {} passed", self.passed(), self.results.len()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum ReplayState {
    #[default]
    Idle,
    Loaded(TestCase),
    Running(TestCase),
    Done { case: TestCase, report: ReplayReport },
}

impl ReplayState {
    pub fn name(&self) -> &'static str {
        match self {
            ReplayState::Idle => "Idle",
            ReplayState::Loaded(_) => "Loaded",
            ReplayState::Running(_) => "Running",
            ReplayState::Done { .. } => "Done",
        }
    }

    pub fn case(&self) -> Option<&TestCase> {
        match self {
            ReplayState::Idle => None,
            ReplayState::Loaded(case) | ReplayState::Running(case) => Some(case),
            ReplayState::Done { case, .. } => Some(case),
        }
    }

    pub fn report(&self) -> Option<&ReplayReport> {
        match self {
            ReplayState::Done { report, .. } => Some(report),
            _ => None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, ReplayState::Loaded(_))
    }
}

/// Evaluate every assertion in order; without a pipeline each one fails
pub fn evaluate(tests: &[Assertion], pipeline: Option<&dyn SamplePipeline>) -> Vec<AssertionResult> {
    tests
        .iter()
        .enumerate()
        .map(|(i, assertion)| {
            let actual = pipeline.is_some_and(|p| p.query(&assertion.query));
            let label = assertion
                .name
                .clone()
                .unwrap_or_else(|| format!("#{} {}", i + 1, assertion.query.describe()));
            let result = AssertionResult {
                label,
                query: assertion.query.clone(),
                expected: assertion.expect_success,
                actual,
            };
            if pipeline.is_some() {
                tracing::debug!("{}: {}", result.label, if result.passed() { "pass" } else { "FAIL" });
            }
            result
        })
        .collect()
}

/// Markers at each query position, green on pass and red on failure
pub fn draw_results(report: &ReplayReport, dd: &mut DebugDraw) {
    for result in &report.results {
        let color = result_color(result);
        match &result.query {
            Query::NearestPoly { pos, .. } => dd.point(Vec3::from(*pos), 8.0, color),
            Query::FindPath { start, end, .. } | Query::Raycast { start, end } => {
                dd.point(Vec3::from(*start), 6.0, color);
                dd.point(Vec3::from(*end), 6.0, color);
                dd.line(Vec3::from(*start), Vec3::from(*end), color);
            }
        }
    }
}

fn result_color(result: &AssertionResult) -> Rgba {
    if result.passed() {
        rgba(0, 192, 64, 255)
    } else {
        rgba(220, 32, 32, 255)
    }
}

/// World position a result is labelled at
fn anchor(query: &Query) -> Vec3 {
    match query {
        Query::NearestPoly { pos, .. } => Vec3::from(*pos),
        Query::FindPath { start, .. } | Query::Raycast { start, .. } => Vec3::from(*start),
    }
}

/// Pass/fail text at each result's projected anchor.
///
/// Returns true when `cursor` hovers one of the labels, so the click is
/// not treated as a pick.
pub fn draw_result_labels(
    report: &ReplayReport,
    proj: &Mat4,
    view: &Mat4,
    viewport: &Viewport,
    cursor: Vec2,
    overlay: &mut Overlay,
) -> bool {
    let mut hovered = false;
    for result in &report.results {
        let Some(win) = project(anchor(&result.query), view, proj, viewport) else {
            continue;
        };
        // Behind the camera or past the far plane
        if !(0.0..1.0).contains(&win.z) {
            continue;
        }
        let pos = Vec2::new(win.x, win.y);
        let verdict = if result.passed() { "OK" } else { "FAIL" };
        overlay.label(pos, format!("{} {verdict}", result.label), result_color(result));
        if pos.distance(cursor) <= LABEL_HOVER_RADIUS {
            hovered = true;
        }
    }
    hovered
}
