//! Wavefront OBJ reader (positions and faces only).

use super::GeomError;
use crate::viewport::mesh::MeshData;

/// Parse OBJ text into a triangle soup. Polygons are fan-triangulated.
pub fn parse_obj(text: &str) -> Result<MeshData, GeomError> {
    let mut mesh = MeshData::default();

    for (line_idx, raw) in text.lines().enumerate() {
        let line_no = line_idx + 1;
        let line = raw.split('#').next().unwrap_or("").trim();
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("v") => {
                let coords: Vec<&str> = parts.take(3).collect();
                if coords.len() < 3 {
                    return Err(GeomError::Parse {
                        line: line_no,
                        message: "vertex needs three coordinates".into(),
                    });
                }
                for c in coords {
                    let value = c.parse::<f32>().map_err(|e| GeomError::Parse {
                        line: line_no,
                        message: format!("bad coordinate '{c}': {e}"),
                    })?;
                    mesh.vertices.push(value);
                }
            }
            Some("f") => {
                let vertex_count = mesh.vertex_count() as i64;
                let corners = parts
                    .map(|tok| resolve_index(tok, vertex_count, line_no))
                    .collect::<Result<Vec<u32>, GeomError>>()?;
                if corners.len() < 3 {
                    return Err(GeomError::Parse {
                        line: line_no,
                        message: "face needs at least three corners".into(),
                    });
                }
                for k in 1..corners.len() - 1 {
                    mesh.indices
                        .extend_from_slice(&[corners[0], corners[k], corners[k + 1]]);
                }
            }
            _ => {}
        }
    }

    Ok(mesh)
}

/// Turn an OBJ face token (`7`, `7/1`, `7//3`, `-1`) into a zero-based index
fn resolve_index(token: &str, vertex_count: i64, line: usize) -> Result<u32, GeomError> {
    let first = token.split('/').next().unwrap_or(token);
    let raw: i64 = first.parse().map_err(|e| GeomError::Parse {
        line,
        message: format!("bad face index '{token}': {e}"),
    })?;
    let index = if raw < 0 { vertex_count + raw } else { raw - 1 };
    if index < 0 || index >= vertex_count {
        return Err(GeomError::Parse {
            line,
            message: format!("face index {raw} out of range ({vertex_count} vertices)"),
        });
    }
    Ok(index as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_is_fan_triangulated() {
        let mesh = parse_obj(
            "# quad\nv 0 0 0\nv 0 0 1\nv 1 0 1\nv 1 0 0\nf 1 2 3 4\n",
        )
        .unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn slash_and_negative_indices() {
        let mesh = parse_obj("v 0 0 0\nv 1 0 0\nv 0 0 1\nvn 0 1 0\nf -3//1 -2//1 -1//1\n").unwrap();
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        let mesh = parse_obj("v 0 0 0\nv 1 0 0\nv 0 0 1\nf 1/1/1 2/2/1 3/3/1\n").unwrap();
        assert_eq!(mesh.indices, vec![0, 1, 2]);
    }

    #[test]
    fn bad_coordinate_reports_line() {
        let err = parse_obj("v 0 0 0\nv 1 x 0\n").unwrap_err();
        match err {
            GeomError::Parse { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn face_index_out_of_range() {
        assert!(parse_obj("v 0 0 0\nv 1 0 0\nf 1 2 3\n").is_err());
    }
}
