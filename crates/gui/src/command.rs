//! JSON command protocol for scripting a session.
//!
//! Commands mirror the interactive operations so a session can be driven
//! from a file or a test without synthesising input events.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use shared::SampleKind;

use crate::session::{Modifiers, PickOutcome, Session};

/// A command that can be executed against a session.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum SessionCommand {
    /// Load a mesh or geometry set; relative paths resolve against the meshes folder
    LoadGeometry { path: PathBuf },
    /// Replace the pipeline with a new one of this kind
    SelectSample { sample: SampleKind },
    /// Build the current geometry with the current pipeline
    Build,
    /// Pick at a window position (GL coordinates, y up)
    Pick {
        x: f32,
        y: f32,
        #[serde(default)]
        shift: bool,
        #[serde(default)]
        ctrl: bool,
    },
    /// Parse a test-case script; relative paths resolve against the test-case folder
    LoadTestCase { path: PathBuf },
    /// Replay the loaded test case
    RunTestCase,
    /// Write the current settings as a geometry set
    SaveGeometrySettings,
    /// Describe geometry, pipeline, camera and replay state
    Inspect,
    /// Return the build log
    Log,
}

/// Response from executing a command.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl CommandResponse {
    fn ok() -> Self {
        Self {
            success: true,
            error: None,
            data: None,
        }
    }

    fn ok_with_data(data: serde_json::Value) -> Self {
        Self {
            success: true,
            error: None,
            data: Some(data),
        }
    }

    fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(msg.into()),
            data: None,
        }
    }
}

fn resolve(dir: &Path, path: &Path) -> PathBuf {
    if path.is_relative() && !path.exists() {
        dir.join(path)
    } else {
        path.to_path_buf()
    }
}

fn vec3_json(v: glam::Vec3) -> serde_json::Value {
    serde_json::json!([v.x, v.y, v.z])
}

/// Execute a single command on the session.
pub fn execute_command(session: &mut Session, cmd: SessionCommand) -> CommandResponse {
    match cmd {
        SessionCommand::LoadGeometry { path } => {
            let path = resolve(session.meshes_dir(), &path);
            if session.load_geometry(&path) {
                CommandResponse::ok()
            } else {
                CommandResponse::err(format!("Could not load {}", path.display()))
            }
        }

        SessionCommand::SelectSample { sample } => {
            session.select_sample(sample);
            let id = session.sample().map(|s| s.id().to_string());
            CommandResponse::ok_with_data(serde_json::json!({ "sample": sample, "id": id }))
        }

        SessionCommand::Build => {
            if session.build() {
                CommandResponse::ok()
            } else {
                CommandResponse::err("Build failed")
            }
        }

        SessionCommand::Pick { x, y, shift, ctrl } => {
            let outcome = session.handle_pick(glam::Vec2::new(x, y), Modifiers { shift, ctrl });
            let data = match outcome {
                PickOutcome::Ignored => serde_json::json!({ "outcome": "ignored" }),
                PickOutcome::Missed => serde_json::json!({ "outcome": "missed" }),
                PickOutcome::MarkerCleared => serde_json::json!({ "outcome": "marker_cleared" }),
                PickOutcome::MarkerSet(p) => {
                    serde_json::json!({ "outcome": "marker_set", "point": vec3_json(p) })
                }
                PickOutcome::Clicked { origin, point, extend } => serde_json::json!({
                    "outcome": "clicked",
                    "origin": vec3_json(origin),
                    "point": vec3_json(point),
                    "extend": extend,
                }),
            };
            CommandResponse::ok_with_data(data)
        }

        SessionCommand::LoadTestCase { path } => {
            let path = resolve(session.test_cases_dir(), &path);
            if session.load_test_case(&path) {
                CommandResponse::ok()
            } else {
                CommandResponse::err(format!("Could not load test case {}", path.display()))
            }
        }

        SessionCommand::RunTestCase => match session.run_test_case() {
            Some(report) => {
                let results: Vec<serde_json::Value> = report
                    .results
                    .iter()
                    .map(|r| {
                        serde_json::json!({
                            "label": r.label,
                            "expected": r.expected,
                            "actual": r.actual,
                            "passed": r.passed(),
                        })
                    })
                    .collect();
                CommandResponse::ok_with_data(serde_json::json!({
                    "aborted": report.aborted,
                    "passed": report.passed(),
                    "failed": report.failed(),
                    "results": results,
                }))
            }
            None => CommandResponse::err("No test case loaded"),
        },

        SessionCommand::SaveGeometrySettings => match session.save_geometry_settings() {
            Some(path) => CommandResponse::ok_with_data(serde_json::json!({ "path": path })),
            None => CommandResponse::err("Geometry and sample are required"),
        },

        SessionCommand::Inspect => {
            let geometry = session.geometry().map(|g| {
                serde_json::json!({
                    "name": g.name(),
                    "vertices": g.mesh().vertex_count(),
                    "triangles": g.mesh().triangle_count(),
                    "bmin": vec3_json(g.bounds().min),
                    "bmax": vec3_json(g.bounds().max),
                })
            });
            let sample = session.sample().map(|s| {
                serde_json::json!({
                    "kind": s.kind(),
                    "id": s.id().to_string(),
                    "attached": s.attached_geometry().is_some(),
                    "status": s.status(),
                })
            });
            let camera = session.camera();
            CommandResponse::ok_with_data(serde_json::json!({
                "geometry": geometry,
                "sample": sample,
                "camera": {
                    "position": vec3_json(camera.position),
                    "yaw": camera.yaw,
                    "pitch": camera.pitch,
                    "radius": camera.radius,
                },
                "marker": session.marker().map(vec3_json),
                "replay": session.replay().name(),
            }))
        }

        SessionCommand::Log => {
            CommandResponse::ok_with_data(serde_json::json!({ "lines": session.log().lines() }))
        }
    }
}

/// Parse and execute a single JSON command string.
pub fn execute_json(session: &mut Session, json: &str) -> Result<CommandResponse, String> {
    let cmd: SessionCommand =
        serde_json::from_str(json).map_err(|e| format!("Invalid command JSON: {e}"))?;
    Ok(execute_command(session, cmd))
}

/// Parse and execute multiple JSON commands (array).
pub fn execute_json_batch(session: &mut Session, json: &str) -> Result<Vec<CommandResponse>, String> {
    let cmds: Vec<SessionCommand> =
        serde_json::from_str(json).map_err(|e| format!("Invalid commands JSON: {e}"))?;
    Ok(cmds
        .into_iter()
        .map(|cmd| execute_command(session, cmd))
        .collect())
}

/// Read a JSON array of commands from `path` and execute them in order
pub fn execute_file(session: &mut Session, path: &Path) -> Result<Vec<CommandResponse>, String> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    tracing::info!("Running commands from {}", path.display());
    execute_json_batch(session, &json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::TestHarness;

    #[test]
    fn test_command_serde_build() {
        let cmd: SessionCommand = serde_json::from_str(r#"{"command": "build"}"#).unwrap();
        assert!(matches!(cmd, SessionCommand::Build));
    }

    #[test]
    fn test_command_serde_select_sample() {
        let json = r#"{"command": "select_sample", "sample": "Temp Obstacles"}"#;
        match serde_json::from_str(json).unwrap() {
            SessionCommand::SelectSample { sample } => assert_eq!(sample, SampleKind::TempObstacles),
            other => panic!("Expected SelectSample, got {other:?}"),
        }
    }

    #[test]
    fn test_command_serde_pick_defaults() {
        let json = r#"{"command": "pick", "x": 10, "y": 20}"#;
        match serde_json::from_str(json).unwrap() {
            SessionCommand::Pick { x, y, shift, ctrl } => {
                assert_eq!((x, y), (10.0, 20.0));
                assert!(!shift && !ctrl);
            }
            other => panic!("Expected Pick, got {other:?}"),
        }
    }

    #[test]
    fn test_execute_load_relative_to_meshes() {
        let mut h = TestHarness::new();
        let resp = execute_json(&mut h.session, r#"{"command": "load_geometry", "path": "arena.obj"}"#)
            .unwrap();
        assert!(resp.success, "{:?}", resp.error);
        assert!(h.session.geometry().is_some());
    }

    #[test]
    fn test_execute_build_without_geometry_fails() {
        let mut h = TestHarness::new();
        let resp = execute_json(&mut h.session, r#"{"command": "build"}"#).unwrap();
        assert!(!resp.success);
    }

    #[test]
    fn test_execute_inspect() {
        let mut h = TestHarness::new();
        h.load("arena.obj");
        let resp = execute_json(&mut h.session, r#"{"command": "inspect"}"#).unwrap();
        let data = resp.data.unwrap();
        assert_eq!(data["geometry"]["name"], "arena.obj");
        assert_eq!(data["sample"]["kind"], "Tile Mesh");
        assert_eq!(data["sample"]["attached"], true);
        assert_eq!(data["replay"], "Idle");
    }

    #[test]
    fn test_execute_run_without_test_case() {
        let mut h = TestHarness::new();
        let resp = execute_json(&mut h.session, r#"{"command": "run_test_case"}"#).unwrap();
        assert!(!resp.success);
    }

    #[test]
    fn test_execute_file() {
        let mut h = TestHarness::new();
        let path = h.root().join("commands.json");
        std::fs::write(
            &path,
            r#"[{"command": "load_geometry", "path": "arena.obj"}, {"command": "build"}]"#,
        )
        .unwrap();
        let responses = execute_file(&mut h.session, &path).unwrap();
        assert_eq!(responses.len(), 2);
        assert!(responses.iter().all(|r| r.success));

        let missing = h.root().join("missing.json");
        assert!(execute_file(&mut h.session, &missing).unwrap_err().contains("missing.json"));
    }

    #[test]
    fn test_execute_invalid_json() {
        let mut h = TestHarness::new();
        assert!(execute_json(&mut h.session, "not valid json").is_err());
    }
}
