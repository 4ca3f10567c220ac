//! ASCII PLY reader: `vertex` positions and `face` index lists.
//!
//! Other elements and extra vertex properties are skipped. Binary PLY is
//! rejected.

use super::GeomError;
use crate::viewport::mesh::MeshData;

struct Element {
    name: String,
    count: usize,
    /// Property names; a list property is stored as its name
    properties: Vec<String>,
}

fn parse_err(line: usize, message: impl Into<String>) -> GeomError {
    GeomError::Parse {
        line,
        message: message.into(),
    }
}

/// Parse ASCII PLY text into a triangle soup. Polygons are fan-triangulated.
pub fn parse_ply(text: &str) -> Result<MeshData, GeomError> {
    let mut lines = text.lines().enumerate().map(|(i, l)| (i + 1, l.trim()));

    match lines.next() {
        Some((_, "ply")) => {}
        _ => return Err(parse_err(1, "missing 'ply' magic")),
    }

    let mut elements: Vec<Element> = Vec::new();
    loop {
        let Some((line_no, line)) = lines.next() else {
            return Err(parse_err(0, "header has no end_header"));
        };
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("format") => {
                if parts.next() != Some("ascii") {
                    return Err(parse_err(line_no, "only ascii PLY is supported"));
                }
            }
            Some("element") => {
                let name = parts.next().unwrap_or("").to_string();
                let count = parts
                    .next()
                    .and_then(|c| c.parse().ok())
                    .ok_or_else(|| parse_err(line_no, format!("bad element count for '{name}'")))?;
                elements.push(Element {
                    name,
                    count,
                    properties: Vec::new(),
                });
            }
            Some("property") => {
                let Some(element) = elements.last_mut() else {
                    return Err(parse_err(line_no, "property before any element"));
                };
                // `property <type> <name>` or `property list <count> <index> <name>`
                let name = parts.last().unwrap_or("").to_string();
                element.properties.push(name);
            }
            Some("end_header") => break,
            _ => {}
        }
    }

    let mut mesh = MeshData::default();
    for element in &elements {
        for _ in 0..element.count {
            let Some((line_no, line)) = lines.next() else {
                return Err(parse_err(0, format!("truncated '{}' data", element.name)));
            };
            let values: Vec<&str> = line.split_whitespace().collect();
            match element.name.as_str() {
                "vertex" => read_vertex(element, &values, line_no, &mut mesh)?,
                "face" => read_face(&values, line_no, &mut mesh)?,
                _ => {}
            }
        }
    }

    Ok(mesh)
}

fn read_vertex(element: &Element, values: &[&str], line: usize, mesh: &mut MeshData) -> Result<(), GeomError> {
    for axis in ["x", "y", "z"] {
        let slot = element
            .properties
            .iter()
            .position(|p| p == axis)
            .ok_or_else(|| parse_err(line, format!("vertex has no '{axis}' property")))?;
        let raw = values
            .get(slot)
            .ok_or_else(|| parse_err(line, "vertex row too short"))?;
        let value = raw
            .parse::<f32>()
            .map_err(|e| parse_err(line, format!("bad coordinate '{raw}': {e}")))?;
        mesh.vertices.push(value);
    }
    Ok(())
}

fn read_face(values: &[&str], line: usize, mesh: &mut MeshData) -> Result<(), GeomError> {
    let vertex_count = mesh.vertex_count();
    let (count, rest) = values
        .split_first()
        .ok_or_else(|| parse_err(line, "empty face row"))?;
    let count: usize = count
        .parse()
        .map_err(|e| parse_err(line, format!("bad face size '{count}': {e}")))?;
    if count < 3 || rest.len() < count {
        return Err(parse_err(line, "face needs at least three corners"));
    }
    let corners = rest[..count]
        .iter()
        .map(|tok| {
            let index: u32 = tok
                .parse()
                .map_err(|e| parse_err(line, format!("bad face index '{tok}': {e}")))?;
            if index as usize >= vertex_count {
                return Err(parse_err(
                    line,
                    format!("face index {index} out of range ({vertex_count} vertices)"),
                ));
            }
            Ok(index)
        })
        .collect::<Result<Vec<u32>, GeomError>>()?;
    for k in 1..corners.len() - 1 {
        mesh.indices
            .extend_from_slice(&[corners[0], corners[k], corners[k + 1]]);
    }
    Ok(())
}
