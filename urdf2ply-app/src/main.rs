//! urdf2ply command line tool
//!
//! Samples every mesh of a URDF robot into colored PLY point clouds.

use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};
use urdf2ply::config::{ColorMode, ConvertConfig, DEFAULT_SAMPLE_COUNT};
use urdf2ply::logging::{LoggingConfig, init_logging};
use urdf2ply_data::PlyEncoding;

/// urdf2ply - URDF robot to colored point clouds
#[derive(Parser, Debug)]
#[command(name = "urdf2ply")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the URDF file, conventionally <robot>/urdf/<robot>.urdf
    urdf: PathBuf,

    /// Directory for the PLY files (created if missing)
    #[arg(short, long, default_value = "output")]
    output: PathBuf,

    /// Points sampled from each mesh
    #[arg(short = 'n', long, default_value_t = DEFAULT_SAMPLE_COUNT)]
    samples: usize,

    /// Sample collision geometry instead of visual geometry
    #[arg(long)]
    collision: bool,

    /// How links are colored
    #[arg(short = 'c', long, value_enum, default_value_t = ColorMode::Custom)]
    color_mode: ColorMode,

    /// CSV color table (columns: Link Name, Color Red, Color Green, Color Blue)
    #[arg(long)]
    csv: Option<PathBuf>,

    /// JSON object mapping link names to [r, g, b], replaces the built-in table
    #[arg(long)]
    custom_colors: Option<PathBuf>,

    /// Comma separated actuated joint values, e.g. 0,0.5,-0.5,0,0,0
    #[arg(short, long, value_delimiter = ',', allow_negative_numbers = true)]
    joints: Vec<f64>,

    /// ROS package root for package:// URIs, as NAME=DIR (repeatable)
    #[arg(short, long = "package", value_parser = parse_package)]
    packages: Vec<(String, PathBuf)>,

    /// Seed for surface sampling (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Write ASCII PLY instead of binary little endian
    #[arg(long)]
    ascii: bool,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn parse_package(value: &str) -> Result<(String, PathBuf), String> {
    match value.split_once('=') {
        Some((name, dir)) if !name.is_empty() && !dir.is_empty() => {
            Ok((name.to_string(), PathBuf::from(dir)))
        }
        _ => Err(format!("expected NAME=DIR, got '{value}'")),
    }
}

impl Args {
    fn into_config(self) -> ConvertConfig {
        let mut config = ConvertConfig::new(self.urdf)
            .with_output_dir(self.output)
            .with_sample_count(self.samples)
            .with_collision(self.collision)
            .with_color_mode(self.color_mode)
            .with_joint_positions(self.joints)
            .with_encoding(if self.ascii {
                PlyEncoding::Ascii
            } else {
                PlyEncoding::BinaryLittleEndian
            });
        config.csv_path = self.csv;
        config.custom_colors_path = self.custom_colors;
        config.seed = self.seed;
        config.package_paths = self.packages.into_iter().collect();
        config
    }
}

fn main() {
    let args = Args::parse();
    init_logging(&LoggingConfig {
        level: args.log_level.clone(),
    });

    let config = args.into_config();
    match urdf2ply::run(&config) {
        Ok(report) => {
            info!(
                "{}: {} files written, {} skipped, {} points total",
                report.robot,
                report.written.len(),
                report.skipped.len(),
                report.total_points
            );
        }
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}
