//! Core data types for colored point clouds.
//!
//! These are the CPU-side representations the sampler produces and the PLY
//! writer consumes.

use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    /// Neutral gray used for links missing from a color table.
    pub const GRAY: Rgb = Rgb([150, 150, 150]);

    /// Silver returned when no color policy applies.
    pub const SILVER: Rgb = Rgb([192, 192, 192]);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b])
    }

    /// Build a color from normalized channels, scaling by 255 and rounding.
    ///
    /// Values outside `0.0..=1.0` are clamped; NaN maps to 0.
    pub fn from_unit(r: f64, g: f64, b: f64) -> Self {
        fn channel(v: f64) -> u8 {
            if v.is_nan() {
                0
            } else {
                (v * 255.0).round().clamp(0.0, 255.0) as u8
            }
        }
        Self([channel(r), channel(g), channel(b)])
    }

    pub fn r(&self) -> u8 {
        self.0[0]
    }

    pub fn g(&self) -> u8 {
        self.0[1]
    }

    pub fn b(&self) -> u8 {
        self.0[2]
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RGB({}, {}, {})", self.0[0], self.0[1], self.0[2])
    }
}

impl From<[u8; 3]> for Rgb {
    fn from(value: [u8; 3]) -> Self {
        Self(value)
    }
}

/// A single colored point in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColoredPoint {
    pub position: DVec3,
    pub color: Rgb,
}

impl ColoredPoint {
    pub fn new(position: DVec3, color: Rgb) -> Self {
        Self { position, color }
    }
}

/// An ordered collection of colored points.
///
/// Points keep their insertion order and are never deduplicated, so clouds
/// from several links can be concatenated as-is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCloud {
    pub points: Vec<ColoredPoint>,
}

impl PointCloud {
    pub fn new(points: Vec<ColoredPoint>) -> Self {
        Self { points }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
        }
    }

    /// Tag every position with the same flat color.
    pub fn from_positions(positions: &[DVec3], color: Rgb) -> Self {
        Self {
            points: positions
                .iter()
                .map(|&p| ColoredPoint::new(p, color))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Append all points of `other`, preserving order.
    pub fn extend_from(&mut self, other: &PointCloud) {
        self.points.extend_from_slice(&other.points);
    }

    pub fn positions(&self) -> impl Iterator<Item = DVec3> + '_ {
        self.points.iter().map(|p| p.position)
    }

    /// Axis-aligned bounds of the cloud, `None` when empty.
    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(self.positions())
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: DVec3,
    pub max: DVec3,
}

impl Aabb {
    pub fn from_points(points: impl IntoIterator<Item = DVec3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(Self { min, max })
    }

    pub fn extent(&self) -> DVec3 {
        self.max - self.min
    }

    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }
}
