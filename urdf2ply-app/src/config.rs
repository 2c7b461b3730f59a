//! Run configuration.

use crate::errors::ConvertError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use urdf2ply_data::{PlyEncoding, Rgb};
use urdf2ply_model::PackagePaths;

/// Points sampled from every mesh unless configured otherwise.
pub const DEFAULT_SAMPLE_COUNT: usize = 50_000;

/// File name of the merged whole-robot cloud.
pub const COMBINED_FILE_NAME: &str = "robot_complete.ply";

/// How link colors are chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    /// Built-in (or JSON supplied) table keyed by link name.
    #[default]
    Custom,
    /// Table read from a CSV file.
    Csv,
    /// Pseudo-random color derived from the link name.
    Random,
    /// A single silver color for everything.
    Fallback,
}

/// Color table for the PAROL6 arm, the robot this tool was first written for.
pub fn default_custom_colors() -> BTreeMap<String, Rgb> {
    [
        ("base_link", Rgb::new(100, 100, 100)),
        ("L1", Rgb::new(255, 100, 100)),
        ("L2", Rgb::new(100, 255, 100)),
        ("L3", Rgb::new(100, 100, 255)),
        ("L4", Rgb::new(255, 255, 100)),
        ("L5", Rgb::new(255, 100, 255)),
        ("L6", Rgb::new(100, 255, 255)),
    ]
    .into_iter()
    .map(|(name, color)| (name.to_string(), color))
    .collect()
}

/// Everything a conversion run needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    pub urdf_path: PathBuf,
    pub output_dir: PathBuf,
    /// Points sampled per visual.
    pub sample_count: usize,
    /// Sample `<collision>` geometry instead of `<visual>` geometry.
    pub use_collision: bool,
    pub color_mode: ColorMode,
    pub csv_path: Option<PathBuf>,
    pub custom_colors: BTreeMap<String, Rgb>,
    /// JSON object `{"link": [r, g, b]}` replacing `custom_colors` when it loads.
    pub custom_colors_path: Option<PathBuf>,
    /// One value per actuated joint; empty means all zeros.
    pub joint_positions: Vec<f64>,
    pub package_paths: PackagePaths,
    /// Seed for surface sampling; `None` draws from the OS.
    pub seed: Option<u64>,
    pub encoding: PlyEncoding,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            urdf_path: PathBuf::new(),
            output_dir: PathBuf::from("output"),
            sample_count: DEFAULT_SAMPLE_COUNT,
            use_collision: false,
            color_mode: ColorMode::default(),
            csv_path: None,
            custom_colors: default_custom_colors(),
            custom_colors_path: None,
            joint_positions: Vec::new(),
            package_paths: PackagePaths::new(),
            seed: None,
            encoding: PlyEncoding::default(),
        }
    }
}

impl ConvertConfig {
    pub fn new(urdf_path: impl Into<PathBuf>) -> Self {
        Self {
            urdf_path: urdf_path.into(),
            ..Default::default()
        }
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_sample_count(mut self, count: usize) -> Self {
        self.sample_count = count;
        self
    }

    pub fn with_collision(mut self, use_collision: bool) -> Self {
        self.use_collision = use_collision;
        self
    }

    pub fn with_color_mode(mut self, mode: ColorMode) -> Self {
        self.color_mode = mode;
        self
    }

    pub fn with_csv_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.csv_path = Some(path.into());
        self
    }

    pub fn with_joint_positions(mut self, positions: Vec<f64>) -> Self {
        self.joint_positions = positions;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_encoding(mut self, encoding: PlyEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Reject settings that cannot produce a run.
    pub fn validate(&self) -> Result<(), ConvertError> {
        if self.sample_count == 0 {
            return Err(ConvertError::Config(
                "sample count must be greater than zero".into(),
            ));
        }
        if self.joint_positions.iter().any(|v| !v.is_finite()) {
            return Err(ConvertError::Config(format!(
                "joint positions must be finite: {:?}",
                self.joint_positions
            )));
        }
        Ok(())
    }
}
