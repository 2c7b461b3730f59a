//! Uniform random sampling of mesh surfaces.
//!
//! Faces are picked with probability proportional to their area, then a
//! point is drawn uniformly inside the picked triangle.

use crate::error::Result;
use crate::mesh::TriMesh;
use glam::DVec3;
use rand::Rng;
use tracing::debug;

/// Draw exactly `count` points uniformly distributed over the mesh surface.
///
/// Fails when the mesh has no faces or no area to sample from.
pub fn sample_surface<R: Rng>(mesh: &TriMesh, count: usize, rng: &mut R) -> Result<Vec<DVec3>> {
    mesh.ensure_sampleable()?;

    let cumulative = cumulative_areas(mesh);
    // ensure_sampleable guarantees a positive total
    let total = cumulative.last().copied().unwrap_or_default();

    let mut points = Vec::with_capacity(count);
    for _ in 0..count {
        let target = rng.gen_range(0.0..total);
        let face = pick_face(&cumulative, target);
        let [a, b, c] = mesh.triangle(face);
        points.push(point_in_triangle(a, b, c, rng.r#gen(), rng.r#gen()));
    }

    debug!(
        "Sampled {} points from {} faces (area {:.6})",
        points.len(),
        mesh.face_count(),
        total
    );
    Ok(points)
}

/// Running sum of face areas, one entry per face.
fn cumulative_areas(mesh: &TriMesh) -> Vec<f64> {
    mesh.face_areas()
        .into_iter()
        .scan(0.0, |acc, area| {
            *acc += area;
            Some(*acc)
        })
        .collect()
}

/// Index of the first face whose cumulative area exceeds `target`.
fn pick_face(cumulative: &[f64], target: f64) -> usize {
    let index = cumulative.partition_point(|&c| c <= target);
    index.min(cumulative.len().saturating_sub(1))
}

/// Map two uniform numbers in `[0, 1)` to a uniform point in triangle `abc`.
fn point_in_triangle(a: DVec3, b: DVec3, c: DVec3, u: f64, v: f64) -> DVec3 {
    // fold the unit square onto the triangle
    let (u, v) = if u + v > 1.0 { (1.0 - u, 1.0 - v) } else { (u, v) };
    a + (b - a) * u + (c - a) * v
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DataError;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn two_triangles(small_scale: f64) -> TriMesh {
        // one unit triangle at z=0, one scaled triangle at z=1
        TriMesh::new(
            vec![
                DVec3::new(0.0, 0.0, 0.0),
                DVec3::new(1.0, 0.0, 0.0),
                DVec3::new(0.0, 1.0, 0.0),
                DVec3::new(0.0, 0.0, 1.0),
                DVec3::new(small_scale, 0.0, 1.0),
                DVec3::new(0.0, small_scale, 1.0),
            ],
            vec![[0, 1, 2], [3, 4, 5]],
        )
        .unwrap()
    }

    #[test]
    fn test_exact_count_and_on_surface() {
        let mesh = two_triangles(1.0);
        let mut rng = StdRng::seed_from_u64(7);
        let points = sample_surface(&mesh, 1234, &mut rng).unwrap();
        assert_eq!(points.len(), 1234);
        for p in &points {
            assert!(p.z == 0.0 || p.z == 1.0);
            assert!(p.x >= -1e-12 && p.y >= -1e-12);
            assert!(p.x + p.y <= 1.0 + 1e-12);
        }
    }

    #[test]
    fn test_faces_weighted_by_area() {
        // the second triangle has a quarter of the first one's area
        let mesh = two_triangles(0.5);
        let mut rng = StdRng::seed_from_u64(42);
        let points = sample_surface(&mesh, 20_000, &mut rng).unwrap();
        let upper = points.iter().filter(|p| p.z > 0.5).count() as f64;
        let fraction = upper / points.len() as f64;
        assert!((fraction - 0.2).abs() < 0.02, "fraction = {fraction}");
    }

    #[test]
    fn test_zero_faces_rejected() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            sample_surface(&TriMesh::default(), 10, &mut rng),
            Err(DataError::DegenerateMesh(_))
        ));
    }

    #[test]
    fn test_same_seed_same_points() {
        let mesh = two_triangles(1.0);
        let a = sample_surface(&mesh, 50, &mut StdRng::seed_from_u64(3)).unwrap();
        let b = sample_surface(&mesh, 50, &mut StdRng::seed_from_u64(3)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_pick_face_boundaries() {
        let cumulative = [1.0, 1.0, 3.0];
        assert_eq!(pick_face(&cumulative, 0.0), 0);
        assert_eq!(pick_face(&cumulative, 1.0), 2);
        assert_eq!(pick_face(&cumulative, 2.999), 2);
    }

    #[test]
    fn test_point_in_triangle_folds() {
        let p = point_in_triangle(DVec3::ZERO, DVec3::X, DVec3::Y, 0.9, 0.8);
        assert!(p.x + p.y <= 1.0);
    }
}
