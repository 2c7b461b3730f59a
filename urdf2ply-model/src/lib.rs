//! urdf2ply Model Crate
//!
//! Loads URDF robot descriptions, checks that they form a single kinematic
//! tree and poses every link for a joint configuration. Also holds the
//! transform math for visual origins and mesh scale, and the rules for
//! turning mesh filenames into paths.

pub mod error;
pub mod resolver;
pub mod robot;
pub mod transform;

pub use error::ModelError;
pub use resolver::{PackagePaths, normalize_path, resolve_mesh_path};
pub use robot::{LinkPoses, RobotModel};
pub use transform::{compose_visual_transform, origin_matrix, pose_to_matrix, scale_matrix};
