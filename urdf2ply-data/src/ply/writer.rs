//! PLY file writing

use crate::error::Result;
use crate::ply::PlyPointRecord;
use crate::types::PointCloud;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Body encoding of a written PLY file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlyEncoding {
    Ascii,
    #[default]
    BinaryLittleEndian,
}

impl PlyEncoding {
    fn header_name(self) -> &'static str {
        match self {
            PlyEncoding::Ascii => "ascii",
            PlyEncoding::BinaryLittleEndian => "binary_little_endian",
        }
    }
}

/// Write a colored point cloud as a PLY vertex list.
///
/// Positions are stored as `float`, colors as `uchar` triples.
#[tracing::instrument(skip_all, fields(path = %path.as_ref().display(), points = cloud.len()))]
pub fn write_point_cloud(
    path: impl AsRef<Path>,
    cloud: &PointCloud,
    encoding: PlyEncoding,
) -> Result<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    write_to(&mut writer, cloud, encoding)?;
    writer.flush()?;
    debug!("Wrote {} points", cloud.len());
    Ok(())
}

fn write_to<W: Write>(writer: &mut W, cloud: &PointCloud, encoding: PlyEncoding) -> Result<()> {
    writeln!(writer, "ply")?;
    writeln!(writer, "format {} 1.0", encoding.header_name())?;
    writeln!(writer, "comment generated by urdf2ply")?;
    writeln!(writer, "element vertex {}", cloud.len())?;
    writeln!(writer, "property float x")?;
    writeln!(writer, "property float y")?;
    writeln!(writer, "property float z")?;
    writeln!(writer, "property uchar red")?;
    writeln!(writer, "property uchar green")?;
    writeln!(writer, "property uchar blue")?;
    writeln!(writer, "end_header")?;

    match encoding {
        PlyEncoding::Ascii => {
            for point in &cloud.points {
                let [r, g, b] = point.color.0;
                writeln!(
                    writer,
                    "{} {} {} {} {} {}",
                    point.position.x as f32,
                    point.position.y as f32,
                    point.position.z as f32,
                    r,
                    g,
                    b
                )?;
            }
        }
        PlyEncoding::BinaryLittleEndian => {
            let records: Vec<PlyPointRecord> =
                cloud.points.iter().map(PlyPointRecord::from).collect();
            writer.write_all(bytemuck::cast_slice(&records))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Rgb;
    use glam::DVec3;

    fn cloud() -> PointCloud {
        PointCloud::from_positions(
            &[DVec3::new(0.5, -1.25, 3.0), DVec3::new(0.0, 0.0, 0.0)],
            Rgb::new(255, 100, 100),
        )
    }

    #[test]
    fn test_ascii_body() {
        let mut out = Vec::new();
        write_to(&mut out, &cloud(), PlyEncoding::Ascii).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("ply\nformat ascii 1.0\n"));
        assert!(text.contains("element vertex 2\n"));
        let body: Vec<&str> = text.split("end_header\n").nth(1).unwrap().lines().collect();
        assert_eq!(body, vec!["0.5 -1.25 3 255 100 100", "0 0 0 255 100 100"]);
    }

    #[test]
    fn test_binary_body_size() {
        let mut out = Vec::new();
        write_to(&mut out, &cloud(), PlyEncoding::BinaryLittleEndian).unwrap();
        let header_end = out
            .windows(b"end_header\n".len())
            .position(|w| w == b"end_header\n")
            .unwrap()
            + b"end_header\n".len();
        assert_eq!(out.len() - header_end, 2 * PlyPointRecord::SIZE);
    }

    #[test]
    fn test_empty_cloud_has_header_only() {
        let mut out = Vec::new();
        write_to(&mut out, &PointCloud::default(), PlyEncoding::Ascii).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("element vertex 0\n"));
        assert!(text.ends_with("end_header\n"));
    }
}
