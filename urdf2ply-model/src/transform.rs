//! Homogeneous transform helpers for URDF origins, joints and mesh scale.
//!
//! All matrices are column-major `DMat4` acting on column vectors, so
//! `a * b` applies `b` first.

use glam::{DMat3, DMat4, DVec3};

/// Rigid transform of a URDF `<origin xyz=".." rpy=".."/>`.
///
/// Rotation is fixed-axis roll about X, then pitch about Y, then yaw about
/// Z, i.e. `Rz(yaw) * Ry(pitch) * Rx(roll)`.
pub fn pose_to_matrix(xyz: [f64; 3], rpy: [f64; 3]) -> DMat4 {
    let [roll, pitch, yaw] = rpy;
    let rotation =
        DMat3::from_rotation_z(yaw) * DMat3::from_rotation_y(pitch) * DMat3::from_rotation_x(roll);
    DMat4::from_mat3_translation(rotation, DVec3::from_array(xyz))
}

/// Transform of a parsed `urdf_rs::Pose`.
pub fn origin_matrix(pose: &urdf_rs::Pose) -> DMat4 {
    pose_to_matrix(pose.xyz.0, pose.rpy.0)
}

/// Diagonal scale matrix, identity when no scale is given.
pub fn scale_matrix(scale: Option<DVec3>) -> DMat4 {
    scale.map_or(DMat4::IDENTITY, DMat4::from_scale)
}

/// World transform for a visual: `link * origin * scale`.
///
/// Scale is applied first to the mesh vertices (in the visual's own frame),
/// then the visual origin, then the link pose. A missing origin or scale is
/// the identity.
pub fn compose_visual_transform(
    link: &DMat4,
    origin: Option<&DMat4>,
    scale: Option<DVec3>,
) -> DMat4 {
    let origin = origin.copied().unwrap_or(DMat4::IDENTITY);
    *link * origin * scale_matrix(scale)
}

/// Unit joint axis, +Z when the given axis has no length.
pub fn joint_axis(xyz: [f64; 3]) -> DVec3 {
    let axis = DVec3::from_array(xyz);
    if axis.length_squared() > 1e-20 {
        axis.normalize()
    } else {
        DVec3::Z
    }
}

/// Motion of a revolute joint by `angle` radians about `axis`.
pub fn revolute_motion(axis: DVec3, angle: f64) -> DMat4 {
    DMat4::from_axis_angle(axis, angle)
}

/// Motion of a prismatic joint by `offset` along `axis`.
pub fn prismatic_motion(axis: DVec3, offset: f64) -> DMat4 {
    DMat4::from_translation(axis * offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn assert_mat_eq(a: &DMat4, b: &DMat4) {
        assert!(a.abs_diff_eq(*b, 1e-12), "\n{a:?}\n!=\n{b:?}");
    }

    #[test]
    fn test_rpy_is_fixed_axis_xyz() {
        let m = pose_to_matrix([0.0, 0.0, 0.0], [FRAC_PI_2, 0.0, FRAC_PI_2]);
        // roll maps +Y to +Z, then yaw maps +X to +Y
        assert!((m.transform_vector3(DVec3::Y) - DVec3::Z).length() < 1e-12);
        assert!((m.transform_vector3(DVec3::X) - DVec3::Y).length() < 1e-12);
        assert!((m.transform_vector3(DVec3::Z) - DVec3::X).length() < 1e-12);
    }

    #[test]
    fn test_compose_matches_hand_computed_matrix() {
        let link = pose_to_matrix([1.0, 2.0, 3.0], [0.0, 0.0, FRAC_PI_2]);
        let origin = pose_to_matrix([0.0, 0.0, 0.5], [FRAC_PI_2, 0.0, 0.0]);
        let scale = DVec3::new(2.0, 3.0, 4.0);

        let composed = compose_visual_transform(&link, Some(&origin), Some(scale));

        // Rz(90) * Rx(90) = [[0,0,1],[1,0,0],[0,1,0]], columns scaled by (2,3,4),
        // translation = Rz(90) * (0,0,0.5) + (1,2,3)
        let expected = DMat4::from_cols_array(&[
            0.0, 2.0, 0.0, 0.0, //
            0.0, 0.0, 3.0, 0.0, //
            4.0, 0.0, 0.0, 0.0, //
            1.0, 2.0, 3.5, 1.0,
        ]);
        assert_mat_eq(&composed, &expected);

        let p = composed.transform_point3(DVec3::ONE);
        assert!((p - DVec3::new(5.0, 4.0, 6.5)).length() < 1e-12);
    }

    #[test]
    fn test_scale_is_applied_in_visual_frame() {
        let link = DMat4::IDENTITY;
        let origin = pose_to_matrix([0.0; 3], [0.0, 0.0, FRAC_PI_2]);
        let scale = DVec3::new(2.0, 1.0, 1.0);

        let composed = compose_visual_transform(&link, Some(&origin), Some(scale));
        // the mesh is stretched along its own X, which the origin turns onto world Y
        let p = composed.transform_point3(DVec3::X);
        assert!((p - DVec3::new(0.0, 2.0, 0.0)).length() < 1e-12);

        let wrong_order = link * scale_matrix(Some(scale)) * origin;
        assert!(!wrong_order.abs_diff_eq(composed, 1e-6));
    }

    #[test]
    fn test_missing_origin_and_scale_are_identity() {
        let link = pose_to_matrix([0.3, -0.2, 0.1], [0.1, 0.2, 0.3]);
        assert_mat_eq(&compose_visual_transform(&link, None, None), &link);
    }

    #[test]
    fn test_joint_motions() {
        let axis = joint_axis([0.0, 0.0, 2.0]);
        assert_eq!(axis, DVec3::Z);
        assert_eq!(joint_axis([0.0; 3]), DVec3::Z);

        let r = revolute_motion(axis, FRAC_PI_2);
        assert!((r.transform_point3(DVec3::X) - DVec3::Y).length() < 1e-12);

        let t = prismatic_motion(DVec3::X, 0.25);
        assert_eq!(t.transform_point3(DVec3::ZERO), DVec3::new(0.25, 0.0, 0.0));
    }
}
