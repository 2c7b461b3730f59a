//! urdf2ply Data Crate
//!
//! Data types and file formats for colored point clouds: triangle meshes
//! loaded from STL, area-weighted surface sampling, and PLY writing/reading.
//! Nothing here knows about robots or kinematics.

pub mod error;
pub mod mesh;
pub mod ply;
pub mod sampling;
pub mod types;

pub use error::DataError;
pub use mesh::TriMesh;
pub use ply::{PlyEncoding, PlyVertex, load_point_cloud, load_vertices_from_ply, write_point_cloud};
pub use sampling::sample_surface;
pub use types::{Aabb, ColoredPoint, PointCloud, Rgb};
