//! Triangle meshes loaded from disk.
//!
//! A loaded [`TriMesh`] is treated as immutable source data. Placing it in
//! the world goes through [`TriMesh::transformed`], which returns a new owned
//! mesh and leaves the source untouched.

use crate::error::{DataError, Result};
use glam::{DMat4, DVec3};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, info};

/// Indexed triangle mesh with double precision vertices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriMesh {
    pub vertices: Vec<DVec3>,
    pub faces: Vec<[u32; 3]>,
}

impl TriMesh {
    /// Build a mesh, checking that every face index is in range.
    pub fn new(vertices: Vec<DVec3>, faces: Vec<[u32; 3]>) -> Result<Self> {
        let vertex_count = vertices.len();
        for (face, tri) in faces.iter().enumerate() {
            if let Some(&index) = tri.iter().find(|&&i| i as usize >= vertex_count) {
                return Err(DataError::FaceIndexOutOfRange {
                    face,
                    index,
                    vertex_count,
                });
            }
        }
        Ok(Self { vertices, faces })
    }

    /// Load a mesh from disk, dispatching on the file extension.
    ///
    /// Only STL (ASCII or binary) is supported.
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match extension.as_deref() {
            Some("stl") => Self::load_stl(path),
            Some(other) => Err(DataError::UnsupportedFormat(other.to_string())),
            None => Err(DataError::UnsupportedFormat(format!(
                "no extension on '{}'",
                path.display()
            ))),
        }
    }

    /// Load an STL file.
    pub fn load_stl(path: &Path) -> Result<Self> {
        debug!("Loading STL mesh from: {}", path.display());
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);

        let stl = stl_io::read_stl(&mut reader).map_err(|source| DataError::Stl {
            path: path.to_path_buf(),
            source,
        })?;

        let vertices: Vec<DVec3> = stl
            .vertices
            .iter()
            .map(|v| DVec3::new(v[0] as f64, v[1] as f64, v[2] as f64))
            .collect();

        let faces: Vec<[u32; 3]> = stl
            .faces
            .iter()
            .map(|face| {
                [
                    face.vertices[0] as u32,
                    face.vertices[1] as u32,
                    face.vertices[2] as u32,
                ]
            })
            .collect();

        info!(
            "STL parsed: {} vertices, {} faces",
            vertices.len(),
            faces.len()
        );

        Self::new(vertices, faces)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Corner positions of face `index`.
    pub fn triangle(&self, index: usize) -> [DVec3; 3] {
        let [a, b, c] = self.faces[index];
        [
            self.vertices[a as usize],
            self.vertices[b as usize],
            self.vertices[c as usize],
        ]
    }

    /// Area of every face, in face order.
    pub fn face_areas(&self) -> Vec<f64> {
        (0..self.faces.len())
            .map(|i| {
                let [a, b, c] = self.triangle(i);
                (b - a).cross(c - a).length() * 0.5
            })
            .collect()
    }

    pub fn surface_area(&self) -> f64 {
        self.face_areas().iter().sum()
    }

    /// Area-weighted centroid of the surface.
    ///
    /// Falls back to the vertex mean when the surface has no area.
    pub fn centroid(&self) -> DVec3 {
        let areas = self.face_areas();
        let total: f64 = areas.iter().sum();
        if total > 0.0 {
            let weighted = areas
                .iter()
                .enumerate()
                .fold(DVec3::ZERO, |acc, (i, &area)| {
                    let [a, b, c] = self.triangle(i);
                    acc + (a + b + c) / 3.0 * area
                });
            weighted / total
        } else if self.vertices.is_empty() {
            DVec3::ZERO
        } else {
            self.vertices.iter().copied().sum::<DVec3>() / self.vertices.len() as f64
        }
    }

    /// Check that the mesh has faces and a positive, finite surface area.
    pub fn ensure_sampleable(&self) -> Result<()> {
        if self.faces.is_empty() {
            return Err(DataError::DegenerateMesh("mesh has no faces".into()));
        }
        let area = self.surface_area();
        if !area.is_finite() || area <= 0.0 {
            return Err(DataError::DegenerateMesh(format!(
                "surface area is {area}"
            )));
        }
        Ok(())
    }

    /// Return a copy of this mesh with `transform` applied to every vertex.
    pub fn transformed(&self, transform: &DMat4) -> TriMesh {
        TriMesh {
            vertices: self
                .vertices
                .iter()
                .map(|&v| transform.transform_point3(v))
                .collect(),
            faces: self.faces.clone(),
        }
    }
}
