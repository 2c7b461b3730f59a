//! PLY file loading functions

use crate::error::{DataError, Result};
use crate::types::{ColoredPoint, PointCloud, Rgb};
use glam::DVec3;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, info, warn};

/// Vertex read back from a PLY file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlyVertex {
    pub position: DVec3,
    /// `None` when the file carries no color properties.
    pub color: Option<Rgb>,
}

impl PlyVertex {
    pub fn to_point(self) -> ColoredPoint {
        ColoredPoint::new(self.position, self.color.unwrap_or(Rgb::GRAY))
    }
}

// PLY file structure
#[derive(Deserialize, Debug)]
struct PlyFile {
    #[serde(rename = "vertex")]
    vertex: Vec<HashMap<String, JsonValue>>,
}

/// Load the vertex element of a PLY file.
///
/// Accepts `red/green/blue` or `r/g/b` color property names.
#[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_vertices_from_ply(path: impl AsRef<Path>) -> Result<Vec<PlyVertex>> {
    let path = path.as_ref();
    debug!("Loading PLY vertices from: {}", path.display());
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let ply_data: PlyFile = serde_ply::from_reader(reader).map_err(|e| {
        warn!("Failed to parse PLY file: {}", e);
        DataError::Ply(e.to_string())
    })?;

    info!("PLY file parsed: {} vertices", ply_data.vertex.len());

    fn get_f64(prop: Option<&JsonValue>) -> Option<f64> {
        prop.and_then(|v| match v {
            JsonValue::Number(n) => n.as_f64(),
            _ => None,
        })
    }

    fn get_u8(prop: Option<&JsonValue>) -> Option<u8> {
        prop.and_then(|v| match v {
            JsonValue::Number(n) => n
                .as_u64()
                .and_then(|u| u8::try_from(u).ok())
                .or_else(|| n.as_i64().and_then(|i| u8::try_from(i).ok())),
            _ => None,
        })
    }

    fn get_rgb(vertex: &HashMap<String, JsonValue>, names: [&str; 3]) -> Option<Rgb> {
        Some(Rgb::new(
            get_u8(vertex.get(names[0]))?,
            get_u8(vertex.get(names[1]))?,
            get_u8(vertex.get(names[2]))?,
        ))
    }

    let mut vertices = Vec::with_capacity(ply_data.vertex.len());

    for (i, vertex) in ply_data.vertex.iter().enumerate() {
        let x = get_f64(vertex.get("x"))
            .ok_or_else(|| DataError::Ply(format!("Missing 'x' at vertex {}", i)))?;
        let y = get_f64(vertex.get("y"))
            .ok_or_else(|| DataError::Ply(format!("Missing 'y' at vertex {}", i)))?;
        let z = get_f64(vertex.get("z"))
            .ok_or_else(|| DataError::Ply(format!("Missing 'z' at vertex {}", i)))?;

        let color = get_rgb(vertex, ["red", "green", "blue"])
            .or_else(|| get_rgb(vertex, ["r", "g", "b"]));

        vertices.push(PlyVertex {
            position: DVec3::new(x, y, z),
            color,
        });
    }

    debug!("Loaded {} vertices from PLY file", vertices.len());
    Ok(vertices)
}

/// Load a PLY file as a colored point cloud.
///
/// Vertices without color become gray.
pub fn load_point_cloud(path: impl AsRef<Path>) -> Result<PointCloud> {
    let vertices = load_vertices_from_ply(path)?;
    Ok(PointCloud::new(
        vertices.into_iter().map(PlyVertex::to_point).collect(),
    ))
}
