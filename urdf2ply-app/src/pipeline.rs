//! The URDF to point cloud conversion run.
//!
//! Links are processed in document order. Every visual goes through
//! resolve, load, transform, color, sample, write, accumulate. A visual that
//! fails at any step is logged and skipped; only model loading, output
//! directory creation and the combined write can abort the run.

use crate::color::ColorAssigner;
use crate::config::{COMBINED_FILE_NAME, ConvertConfig};
use crate::errors::{ConvertError, VisualError};
use glam::DVec3;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use urdf2ply_data::{Aabb, PointCloud, TriMesh, sample_surface, write_point_cloud};
use urdf2ply_model::{LinkPoses, RobotModel, compose_visual_transform, origin_matrix, resolve_mesh_path};

/// A per-visual point cloud that was written.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualOutput {
    pub link: String,
    pub index: usize,
    pub path: PathBuf,
    pub points: usize,
}

/// A visual that produced no points, and why.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedVisual {
    pub link: String,
    pub index: usize,
    pub reason: String,
}

/// Outcome of a conversion run.
#[derive(Debug, Clone, Default)]
pub struct ConversionReport {
    pub robot: String,
    pub written: Vec<VisualOutput>,
    pub skipped: Vec<SkippedVisual>,
    /// Path of the merged cloud, `None` when nothing was sampled.
    pub combined: Option<PathBuf>,
    pub total_points: usize,
    pub bounds: Option<Aabb>,
}

/// Geometry slot of a link: either a `<visual>` or a `<collision>` entry.
#[derive(Debug, Clone, Copy)]
struct GeometryEntry<'a> {
    geometry: &'a urdf_rs::Geometry,
    origin: &'a urdf_rs::Pose,
}

fn link_entries(link: &urdf_rs::Link, use_collision: bool) -> Vec<GeometryEntry<'_>> {
    if use_collision {
        link.collision
            .iter()
            .map(|c| GeometryEntry {
                geometry: &c.geometry,
                origin: &c.origin,
            })
            .collect()
    } else {
        link.visual
            .iter()
            .map(|v| GeometryEntry {
                geometry: &v.geometry,
                origin: &v.origin,
            })
            .collect()
    }
}

/// Load the model named by `config.urdf_path` and convert it.
pub fn run(config: &ConvertConfig) -> Result<ConversionReport, ConvertError> {
    config.validate()?;
    let model = RobotModel::load(&config.urdf_path)?;
    convert_model(&model, config)
}

/// Convert an already loaded model.
pub fn convert_model(
    model: &RobotModel,
    config: &ConvertConfig,
) -> Result<ConversionReport, ConvertError> {
    config.validate()?;
    info!("Color mode: {:?}", config.color_mode);
    debug!(
        "Configuration: {}",
        serde_json::to_string(config).unwrap_or_default()
    );

    fs::create_dir_all(&config.output_dir).map_err(|source| ConvertError::OutputDir {
        path: config.output_dir.clone(),
        source,
    })?;

    let colors = ColorAssigner::from_config(config);

    if !model.actuated_joint_names().is_empty() {
        info!(
            "Joint configuration: {:?} for {:?}",
            config.joint_positions,
            model.actuated_joint_names()
        );
    }
    let poses = model.compute_link_poses(&config.joint_positions)?;

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut report = ConversionReport {
        robot: model.name().to_string(),
        ..Default::default()
    };
    let mut combined = PointCloud::default();

    for link in model.links() {
        info!("Processing link: {}", link.name);
        let entries = link_entries(link, config.use_collision);
        if entries.is_empty() {
            info!("  No {} geometry", if config.use_collision { "collision" } else { "visual" });
            continue;
        }

        for (index, entry) in entries.iter().enumerate() {
            let file_name = output_file_name(&link.name, index, entries.len());
            let path = config.output_dir.join(&file_name);

            let result = sample_visual(&link.name, entry, model, &poses, &colors, config, &mut rng)
                .and_then(|cloud| {
                    write_point_cloud(&path, &cloud, config.encoding)?;
                    Ok(cloud)
                });

            match result {
                Ok(cloud) => {
                    info!("  Saved: {}", path.display());
                    report.written.push(VisualOutput {
                        link: link.name.clone(),
                        index,
                        path: path.clone(),
                        points: cloud.len(),
                    });
                    combined.extend_from(&cloud);
                }
                Err(e) => {
                    match &e {
                        VisualError::NoMesh => info!("  No mesh geometry"),
                        e if e.is_expected() => warn!("  Skipping {}[{}]: {}", link.name, index, e),
                        e => error!("  Failed {}[{}]: {}", link.name, index, e),
                    }
                    report.skipped.push(SkippedVisual {
                        link: link.name.clone(),
                        index,
                        reason: e.to_string(),
                    });
                }
            }
        }
    }

    if combined.is_empty() {
        warn!("No points generated, skipping {}", COMBINED_FILE_NAME);
    } else {
        info!("Creating combined robot...");
        let bounds = combined.bounds();
        if let Some(b) = &bounds {
            info!("  Bounds:");
            info!("    X: [{:.3}, {:.3}]", b.min.x, b.max.x);
            info!("    Y: [{:.3}, {:.3}]", b.min.y, b.max.y);
            info!("    Z: [{:.3}, {:.3}]", b.min.z, b.max.z);
        }

        let combined_path = config.output_dir.join(COMBINED_FILE_NAME);
        write_point_cloud(&combined_path, &combined, config.encoding)
            .map_err(ConvertError::Combined)?;
        info!("Saved: {}", combined_path.display());
        info!("  Total points: {}", combined.len());

        report.combined = Some(combined_path);
        report.total_points = combined.len();
        report.bounds = bounds;
    }

    info!("Done. Files in: {}", config.output_dir.display());
    Ok(report)
}

/// Resolve, load, place, color and sample one visual.
fn sample_visual(
    link: &str,
    entry: &GeometryEntry<'_>,
    model: &RobotModel,
    poses: &LinkPoses,
    colors: &ColorAssigner,
    config: &ConvertConfig,
    rng: &mut StdRng,
) -> Result<PointCloud, VisualError> {
    let urdf_rs::Geometry::Mesh { filename, scale } = entry.geometry else {
        return Err(VisualError::NoMesh);
    };

    let mesh_path = resolve_mesh_path(filename, model.base_dir(), &config.package_paths);
    info!("  Loading mesh: {}", display_name(&mesh_path));
    if !mesh_path.is_file() {
        return Err(VisualError::MissingFile(mesh_path));
    }

    let mesh = TriMesh::load(&mesh_path)?;
    mesh.ensure_sampleable()?;
    info!("  Loaded: {} vertices", mesh.vertex_count());

    let link_pose = poses
        .get(link)
        .ok_or_else(|| VisualError::MissingPose(link.to_string()))?;
    let origin = origin_matrix(entry.origin);
    let scale = scale.as_ref().map(|s| DVec3::from_array(s.0));
    let transform = compose_visual_transform(link_pose, Some(&origin), scale);

    let placed = mesh.transformed(&transform);
    let center = placed.centroid();
    info!("  Center: [{:.4}, {:.4}, {:.4}]", center.x, center.y, center.z);

    let color = colors.color_for(link);
    info!("  Color: {}", color);

    info!("  Sampling {} points...", config.sample_count);
    let positions = sample_surface(&placed, config.sample_count, rng)?;
    Ok(PointCloud::from_positions(&positions, color))
}

/// `<link>.ply`, or `<link>_<index>.ply` when the link has several entries.
///
/// Path separators in link names are replaced so files stay in the output
/// directory.
pub fn output_file_name(link: &str, index: usize, entry_count: usize) -> String {
    let stem: String = link
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    if entry_count > 1 {
        format!("{stem}_{index}.ply")
    } else {
        format!("{stem}.ply")
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
