//! urdf2ply
//!
//! Converts a URDF robot description into colored PLY point clouds: one
//! file per visual plus `robot_complete.ply` with every point.
//!
//! ## Modules
//!
//! - [`config`]: run configuration and color modes
//! - [`color`]: per-link color tables and the name-seeded random colors
//! - [`pipeline`]: the conversion run itself
//! - [`logging`]: `tracing` subscriber setup for the binary

pub mod color;
pub mod config;
pub mod errors;
pub mod logging;
pub mod pipeline;

pub use color::ColorAssigner;
pub use config::{COMBINED_FILE_NAME, ColorMode, ConvertConfig};
pub use errors::{ConvertError, VisualError};
pub use pipeline::{ConversionReport, convert_model, run};
