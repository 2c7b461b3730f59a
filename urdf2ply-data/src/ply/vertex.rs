//! Binary PLY vertex records

use crate::types::ColoredPoint;
use bytemuck::{Pod, Zeroable};

/// One `binary_little_endian` vertex: `float x, y, z` then `uchar red, green, blue`.
///
/// Floats are stored as little-endian byte arrays so the record has no
/// padding and its layout does not depend on the host.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct PlyPointRecord {
    pub x: [u8; 4],
    pub y: [u8; 4],
    pub z: [u8; 4],
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl PlyPointRecord {
    pub const SIZE: usize = std::mem::size_of::<Self>();
}

impl From<&ColoredPoint> for PlyPointRecord {
    fn from(point: &ColoredPoint) -> Self {
        let [red, green, blue] = point.color.0;
        Self {
            x: (point.position.x as f32).to_le_bytes(),
            y: (point.position.y as f32).to_le_bytes(),
            z: (point.position.z as f32).to_le_bytes(),
            red,
            green,
            blue,
        }
    }
}
