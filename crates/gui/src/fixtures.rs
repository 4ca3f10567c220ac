//! Fixture meshes and test-case builders for tests and the command protocol.

use std::path::Path;

use shared::{Assertion, BuildSettings, Query, TestScript};

/// 20x20 floor centred on the origin with one wall along +x
pub const ARENA_OBJ: &str = "\
# arena: 2x2 floor quads and a wall
v -10 0 -10
v -10 0 0
v -10 0 10
v 0 0 -10
v 0 0 0
v 0 0 10
v 10 0 -10
v 10 0 0
v 10 0 10
v 10 3 -10
v 10 3 10
f 1 2 5 4
f 2 3 6 5
f 4 5 8 7
f 5 6 9 8
f 7 9 11 10
";

/// 10x10 floor with a 30 degree ramp rising from its far edge
pub const RAMP_OBJ: &str = "\
v 0 0 0
v 0 0 10
v 10 0 10
v 10 0 0
v 0 5.7735 20
v 10 5.7735 20
f 1 2 3 4
f 2 5 6 3
";

/// Vertical faces only; nothing is walkable
pub const WALLS_OBJ: &str = "\
v 0 0 0
v 0 5 0
v 10 5 0
v 10 0 0
v 0 0 10
v 0 5 10
f 1 2 3 4
f 1 5 6 2
";

/// Face referencing a vertex that does not exist
pub const BROKEN_OBJ: &str = "\
v 0 0 0
v 1 0 0
f 1 2 3
";

/// All fixture meshes by file name
pub const MESHES: &[(&str, &str)] = &[
    ("arena.obj", ARENA_OBJ),
    ("ramp.obj", RAMP_OBJ),
    ("walls.obj", WALLS_OBJ),
    ("broken.obj", BROKEN_OBJ),
];

/// Write every fixture mesh into `dir`
pub fn write_meshes(dir: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)?;
    for (name, text) in MESHES {
        std::fs::write(dir.join(name), text)?;
    }
    Ok(())
}

// ── Assertions ─────────────────────────────────────────────────

pub fn nearest_poly(pos: [f32; 3]) -> Assertion {
    Assertion {
        name: None,
        query: Query::NearestPoly {
            pos,
            extents: [2.0, 4.0, 2.0],
        },
        expect_success: true,
    }
}

pub fn find_path(start: [f32; 3], end: [f32; 3]) -> Assertion {
    Assertion {
        name: None,
        query: Query::FindPath {
            start,
            end,
            extents: [2.0, 4.0, 2.0],
        },
        expect_success: true,
    }
}

pub fn raycast(start: [f32; 3], end: [f32; 3]) -> Assertion {
    Assertion {
        name: None,
        query: Query::Raycast { start, end },
        expect_success: true,
    }
}

/// Flip an assertion to expect failure
pub fn expect_failure(mut assertion: Assertion) -> Assertion {
    assertion.expect_success = false;
    assertion
}

// ── Scripts ────────────────────────────────────────────────────

pub fn script(sample: &str, geometry: &str, tests: Vec<Assertion>) -> TestScript {
    TestScript {
        sample: sample.to_string(),
        geometry: geometry.to_string(),
        settings: None,
        tests,
    }
}

pub fn script_with_settings(
    sample: &str,
    geometry: &str,
    settings: BuildSettings,
    tests: Vec<Assertion>,
) -> TestScript {
    TestScript {
        settings: Some(settings),
        ..script(sample, geometry, tests)
    }
}

/// Tile Mesh on the arena with a single nearest-poly query at the origin
pub fn arena_origin_script() -> TestScript {
    script("Tile Mesh", "arena.obj", vec![nearest_poly([0.0, 0.0, 0.0])])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::GeometryAsset;

    #[test]
    fn fixture_meshes_parse_as_expected() {
        assert!(GeometryAsset::from_obj_str("arena.obj", ARENA_OBJ).is_ok());
        assert!(GeometryAsset::from_obj_str("ramp.obj", RAMP_OBJ).is_ok());
        assert!(GeometryAsset::from_obj_str("walls.obj", WALLS_OBJ).is_ok());
        assert!(GeometryAsset::from_obj_str("broken.obj", BROKEN_OBJ).is_err());
    }

    #[test]
    fn arena_script_serializes() {
        let json = serde_json::to_string(&arena_origin_script()).unwrap();
        assert!(json.contains("\"sample\":\"Tile Mesh\""));
        assert!(json.contains("\"query\":\"nearest_poly\""));
    }
}
