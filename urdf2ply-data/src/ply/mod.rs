//! PLY point cloud writing and reading

mod loader;
mod vertex;
mod writer;

pub use loader::{PlyVertex, load_point_cloud, load_vertices_from_ply};
pub use vertex::PlyPointRecord;
pub use writer::{PlyEncoding, write_point_cloud};
