use serde::{Deserialize, Serialize};

/// Enumerated set of sample pipelines the demo can build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SampleKind {
    #[serde(rename = "Solo Mesh")]
    SoloMesh,
    #[serde(rename = "Tile Mesh")]
    TileMesh,
    #[serde(rename = "Temp Obstacles")]
    TempObstacles,
}

impl SampleKind {
    /// Display name, also used by test-case scripts
    pub fn name(&self) -> &'static str {
        match self {
            SampleKind::SoloMesh => "Solo Mesh",
            SampleKind::TileMesh => "Tile Mesh",
            SampleKind::TempObstacles => "Temp Obstacles",
        }
    }

    /// Look up a kind by display name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|k| k.name() == name.trim())
    }

    /// All selectable kinds, in menu order
    pub fn all() -> &'static [SampleKind] {
        &[
            SampleKind::SoloMesh,
            SampleKind::TileMesh,
            SampleKind::TempObstacles,
        ]
    }
}

impl std::fmt::Display for SampleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Region partitioning strategy requested from a pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartitionType {
    #[default]
    Watershed,
    Monotone,
    Layers,
}

/// Build parameters collected from the active pipeline.
///
/// Also the payload of geometry-set files, so every field has a serde default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSettings {
    pub cell_size: f32,
    pub cell_height: f32,
    pub agent_height: f32,
    pub agent_radius: f32,
    pub agent_max_climb: f32,
    /// Degrees
    pub agent_max_slope: f32,
    pub region_min_size: f32,
    pub region_merge_size: f32,
    pub edge_max_len: f32,
    pub edge_max_error: f32,
    pub verts_per_poly: f32,
    pub detail_sample_dist: f32,
    pub detail_sample_max_error: f32,
    pub partition_type: PartitionType,
    /// Tile edge length in cells
    pub tile_size: f32,
    pub nav_mesh_bmin: [f32; 3],
    pub nav_mesh_bmax: [f32; 3],
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            cell_size: 0.3,
            cell_height: 0.2,
            agent_height: 2.0,
            agent_radius: 0.6,
            agent_max_climb: 0.9,
            agent_max_slope: 45.0,
            region_min_size: 8.0,
            region_merge_size: 20.0,
            edge_max_len: 12.0,
            edge_max_error: 1.3,
            verts_per_poly: 6.0,
            detail_sample_dist: 6.0,
            detail_sample_max_error: 1.0,
            partition_type: PartitionType::Watershed,
            tile_size: 32.0,
            nav_mesh_bmin: [0.0; 3],
            nav_mesh_bmax: [0.0; 3],
        }
    }
}

/// Geometry set: a mesh reference plus the settings it was last built with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeomSet {
    /// Mesh file, relative to the set file's directory
    pub geometry: String,
    #[serde(default)]
    pub settings: BuildSettings,
}

fn default_extents() -> [f32; 3] {
    [2.0, 4.0, 2.0]
}

fn default_true() -> bool {
    true
}

/// A query evaluated against a built navigation surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "query", rename_all = "snake_case")]
pub enum Query {
    /// A walkable polygon exists within `extents` of `pos`
    NearestPoly {
        pos: [f32; 3],
        #[serde(default = "default_extents")]
        extents: [f32; 3],
    },
    /// `start` and `end` land on polygons connected by walkable adjacency
    FindPath {
        start: [f32; 3],
        end: [f32; 3],
        #[serde(default = "default_extents")]
        extents: [f32; 3],
    },
    /// The segment `start`..`end` touches the walkable surface
    Raycast { start: [f32; 3], end: [f32; 3] },
}

impl Query {
    /// Short human-readable description for logs and overlays
    pub fn describe(&self) -> String {
        match self {
            Query::NearestPoly { pos, .. } => {
                format!("nearest poly at ({}, {}, {})", pos[0], pos[1], pos[2])
            }
            Query::FindPath { start, end, .. } => format!(
                "path ({}, {}, {}) -> ({}, {}, {})",
                start[0], start[1], start[2], end[0], end[1], end[2]
            ),
            Query::Raycast { start, end } => format!(
                "raycast ({}, {}, {}) -> ({}, {}, {})",
                start[0], start[1], start[2], end[0], end[1], end[2]
            ),
        }
    }
}

/// One scripted expectation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assertion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub query: Query,
    #[serde(default = "default_true")]
    pub expect_success: bool,
}

/// Test-case script as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestScript {
    /// Sample display name, e.g. "Tile Mesh"
    pub sample: String,
    /// Mesh file name inside the meshes folder
    pub geometry: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<BuildSettings>,
    #[serde(default)]
    pub tests: Vec<Assertion>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_kind_names_round_trip() {
        for kind in SampleKind::all() {
            assert_eq!(SampleKind::from_name(kind.name()), Some(*kind));
        }
        assert_eq!(SampleKind::from_name("Debug"), None);
    }

    #[test]
    fn sample_kind_serializes_as_display_name() {
        let json = serde_json::to_string(&SampleKind::TempObstacles).unwrap();
        assert_eq!(json, "\"Temp Obstacles\"");
    }

    #[test]
    fn script_parses_with_defaults() {
        let json = r#"{
            "sample": "Tile Mesh",
            "geometry": "arena.obj",
            "tests": [
                {"query": "nearest_poly", "pos": [0, 0, 0]},
                {"name": "blocked", "query": "raycast", "start": [0, 5, 0], "end": [0, 4, 0], "expect_success": false}
            ]
        }"#;
        let script: TestScript = serde_json::from_str(json).unwrap();
        assert_eq!(script.sample, "Tile Mesh");
        assert!(script.settings.is_none());
        assert_eq!(script.tests.len(), 2);
        assert!(script.tests[0].expect_success);
        assert_eq!(
            script.tests[0].query,
            Query::NearestPoly {
                pos: [0.0; 3],
                extents: [2.0, 4.0, 2.0]
            }
        );
        assert!(!script.tests[1].expect_success);
        assert_eq!(script.tests[1].name.as_deref(), Some("blocked"));
    }

    #[test]
    fn partial_build_settings_fill_defaults() {
        let settings: BuildSettings =
            serde_json::from_str(r#"{"agent_max_slope": 30.0}"#).unwrap();
        assert_eq!(settings.agent_max_slope, 30.0);
        assert_eq!(settings.cell_size, 0.3);
        assert_eq!(settings.tile_size, 32.0);
    }
}
