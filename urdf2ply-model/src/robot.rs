//! Robot model loading, validation and forward kinematics.

use crate::error::{ModelError, Result};
use crate::transform::{joint_axis, origin_matrix, prismatic_motion, revolute_motion};
use glam::DMat4;
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// World transform of every link for one joint configuration.
#[derive(Debug, Clone, Default)]
pub struct LinkPoses {
    poses: HashMap<String, DMat4>,
}

impl LinkPoses {
    pub fn get(&self, link: &str) -> Option<&DMat4> {
        self.poses.get(link)
    }

    pub fn len(&self) -> usize {
        self.poses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }
}

/// A parsed and validated URDF kinematic tree.
#[derive(Debug, Clone)]
pub struct RobotModel {
    robot: urdf_rs::Robot,
    base_dir: PathBuf,
    root: String,
    /// Joint indices keyed by parent link name.
    child_joints: HashMap<String, Vec<usize>>,
    actuated: Vec<String>,
}

impl RobotModel {
    /// Load a URDF file. Relative mesh paths resolve against its directory.
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading URDF: {}", path.display());
        let robot = urdf_rs::read_file(path).map_err(|e| ModelError::parse(path, e))?;
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::from_robot(robot, base_dir)
    }

    /// Parse a URDF document held in memory.
    pub fn from_urdf_str(xml: &str, base_dir: impl Into<PathBuf>) -> Result<Self> {
        let robot =
            urdf_rs::read_from_string(xml).map_err(|e| ModelError::parse("<string>", e))?;
        Self::from_robot(robot, base_dir.into())
    }

    /// Validate an already parsed robot.
    pub fn from_robot(robot: urdf_rs::Robot, base_dir: PathBuf) -> Result<Self> {
        let (root, child_joints) = validate_tree(&robot)?;

        let actuated: Vec<String> = robot
            .joints
            .iter()
            .filter(|j| is_actuated(j))
            .map(|j| j.name.clone())
            .collect();

        info!(
            "Robot '{}' loaded: {} links, {} joints ({} actuated), root '{}'",
            robot.name,
            robot.links.len(),
            robot.joints.len(),
            actuated.len(),
            root
        );

        Ok(Self {
            robot,
            base_dir,
            root,
            child_joints,
            actuated,
        })
    }

    pub fn name(&self) -> &str {
        &self.robot.name
    }

    /// Directory that relative mesh filenames are resolved against.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn root_link(&self) -> &str {
        &self.root
    }

    /// Links in document order.
    pub fn links(&self) -> &[urdf_rs::Link] {
        &self.robot.links
    }

    pub fn joints(&self) -> &[urdf_rs::Joint] {
        &self.robot.joints
    }

    /// Names of the joints driven by the configuration vector, in document order.
    pub fn actuated_joint_names(&self) -> &[String] {
        &self.actuated
    }

    /// World transform of every link for `configuration`.
    ///
    /// `configuration` holds one value per actuated joint. An empty slice
    /// stands for all zeros.
    pub fn compute_link_poses(&self, configuration: &[f64]) -> Result<LinkPoses> {
        let values = self.joint_values(configuration)?;

        let mut poses = HashMap::with_capacity(self.robot.links.len());
        poses.insert(self.root.clone(), DMat4::IDENTITY);

        let mut queue = VecDeque::from([self.root.clone()]);
        while let Some(parent) = queue.pop_front() {
            let parent_pose = poses[&parent];
            let Some(children) = self.child_joints.get(&parent) else {
                continue;
            };
            for &index in children {
                let joint = &self.robot.joints[index];
                let q = values.get(joint.name.as_str()).copied().unwrap_or(0.0);
                let pose = parent_pose * joint_transform(joint, q);
                poses.insert(joint.child.link.clone(), pose);
                queue.push_back(joint.child.link.clone());
            }
        }

        debug!("Computed poses for {} links", poses.len());
        Ok(LinkPoses { poses })
    }

    /// Scalar value of every non-fixed joint, mimic joints included.
    fn joint_values(&self, configuration: &[f64]) -> Result<HashMap<&str, f64>> {
        if !configuration.is_empty() && configuration.len() != self.actuated.len() {
            return Err(ModelError::ConfigurationLength {
                expected: self.actuated.len(),
                got: configuration.len(),
            });
        }

        let mut values: HashMap<&str, f64> = self
            .actuated
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), configuration.get(i).copied().unwrap_or(0.0)))
            .collect();

        let mut pending: Vec<&urdf_rs::Joint> = self
            .robot
            .joints
            .iter()
            .filter(|j| j.mimic.is_some() && j.joint_type != urdf_rs::JointType::Fixed)
            .collect();

        // mimic joints may follow other mimic joints
        while !pending.is_empty() {
            let before = pending.len();
            pending.retain(|&joint| {
                let Some(mimic) = &joint.mimic else {
                    return false;
                };
                match values.get(mimic.joint.as_str()) {
                    Some(&leader) => {
                        let value =
                            mimic.multiplier.unwrap_or(1.0) * leader + mimic.offset.unwrap_or(0.0);
                        values.insert(joint.name.as_str(), value);
                        false
                    }
                    None => true,
                }
            });
            if pending.len() == before {
                let joint = pending[0];
                let leader = joint
                    .mimic
                    .as_ref()
                    .map(|m| m.joint.clone())
                    .unwrap_or_default();
                return Err(ModelError::UnresolvedMimic {
                    joint: joint.name.clone(),
                    leader,
                });
            }
        }

        Ok(values)
    }
}

fn is_actuated(joint: &urdf_rs::Joint) -> bool {
    joint.mimic.is_none() && joint.joint_type != urdf_rs::JointType::Fixed
}

/// Parent-to-child transform of `joint` at value `q`.
fn joint_transform(joint: &urdf_rs::Joint, q: f64) -> DMat4 {
    let origin = origin_matrix(&joint.origin);
    let axis = joint_axis(joint.axis.xyz.0);
    match joint.joint_type {
        urdf_rs::JointType::Revolute | urdf_rs::JointType::Continuous => {
            origin * revolute_motion(axis, q)
        }
        urdf_rs::JointType::Prismatic => origin * prismatic_motion(axis, q),
        urdf_rs::JointType::Fixed => origin,
        ref other => {
            debug!(
                "Joint '{}' of type {:?} is held at its origin",
                joint.name, other
            );
            origin
        }
    }
}

/// Check the link/joint graph is a single rooted tree.
///
/// Returns the root link and the outgoing joints of every link.
fn validate_tree(robot: &urdf_rs::Robot) -> Result<(String, HashMap<String, Vec<usize>>)> {
    if robot.links.is_empty() {
        return Err(ModelError::Empty);
    }

    let mut link_names = HashSet::new();
    for link in &robot.links {
        if !link_names.insert(link.name.as_str()) {
            return Err(ModelError::DuplicateLink(link.name.clone()));
        }
    }

    let mut joint_names = HashSet::new();
    for joint in &robot.joints {
        if !joint_names.insert(joint.name.as_str()) {
            return Err(ModelError::DuplicateJoint(joint.name.clone()));
        }
    }

    let mut has_parent = HashSet::new();
    let mut child_joints: HashMap<String, Vec<usize>> = HashMap::new();
    for (index, joint) in robot.joints.iter().enumerate() {
        for link in [&joint.parent.link, &joint.child.link] {
            if !link_names.contains(link.as_str()) {
                return Err(ModelError::undefined_link(link, &joint.name));
            }
        }
        if !has_parent.insert(joint.child.link.as_str()) {
            return Err(ModelError::KinematicLoop(format!(
                "link '{}' has multiple parent joints",
                joint.child.link
            )));
        }
        child_joints
            .entry(joint.parent.link.clone())
            .or_default()
            .push(index);
    }

    let roots: Vec<String> = robot
        .links
        .iter()
        .filter(|l| !has_parent.contains(l.name.as_str()))
        .map(|l| l.name.clone())
        .collect();

    let root = match roots.as_slice() {
        [] => return Err(ModelError::NoRootLink),
        [root] => root.clone(),
        _ => return Err(ModelError::MultipleRootLinks(roots)),
    };

    // with one root and one parent per link, unreachable links sit on a cycle
    let mut reached = HashSet::from([root.as_str()]);
    let mut stack = vec![root.as_str()];
    while let Some(link) = stack.pop() {
        for &index in child_joints.get(link).into_iter().flatten() {
            let child = robot.joints[index].child.link.as_str();
            if reached.insert(child) {
                stack.push(child);
            }
        }
    }
    if let Some(orphan) = robot
        .links
        .iter()
        .find(|l| !reached.contains(l.name.as_str()))
    {
        return Err(ModelError::KinematicLoop(format!(
            "link '{}' is not reachable from root '{}'",
            orphan.name, root
        )));
    }

    Ok((root, child_joints))
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;
    use std::f64::consts::FRAC_PI_2;

    const ARM: &str = r#"
        <robot name="arm">
          <link name="base_link"/>
          <link name="L1"/>
          <link name="L2"/>
          <link name="tool"/>
          <joint name="J1" type="revolute">
            <parent link="base_link"/>
            <child link="L1"/>
            <origin xyz="0 0 1" rpy="0 0 0"/>
            <axis xyz="0 0 1"/>
            <limit lower="-3" upper="3" effort="1" velocity="1"/>
          </joint>
          <joint name="J2" type="prismatic">
            <parent link="L1"/>
            <child link="L2"/>
            <origin xyz="1 0 0" rpy="0 0 0"/>
            <axis xyz="1 0 0"/>
            <limit lower="0" upper="1" effort="1" velocity="1"/>
          </joint>
          <joint name="J3" type="fixed">
            <parent link="L2"/>
            <child link="tool"/>
            <origin xyz="0 0 0.5" rpy="0 0 0"/>
          </joint>
        </robot>
    "#;

    fn position(poses: &LinkPoses, link: &str) -> DVec3 {
        poses.get(link).unwrap().transform_point3(DVec3::ZERO)
    }

    #[test]
    fn test_actuated_joints_in_document_order() {
        let model = RobotModel::from_urdf_str(ARM, ".").unwrap();
        assert_eq!(model.name(), "arm");
        assert_eq!(model.root_link(), "base_link");
        assert_eq!(model.actuated_joint_names(), ["J1", "J2"]);
    }

    #[test]
    fn test_zero_configuration() {
        let model = RobotModel::from_urdf_str(ARM, ".").unwrap();
        let poses = model.compute_link_poses(&[]).unwrap();
        assert_eq!(poses.len(), 4);
        assert_eq!(position(&poses, "base_link"), DVec3::ZERO);
        assert!((position(&poses, "tool") - DVec3::new(1.0, 0.0, 1.5)).length() < 1e-12);
    }

    #[test]
    fn test_forward_kinematics() {
        let model = RobotModel::from_urdf_str(ARM, ".").unwrap();
        let poses = model.compute_link_poses(&[FRAC_PI_2, 0.25]).unwrap();
        // J1 turns the arm onto +Y, J2 slides 0.25 further along it
        assert!((position(&poses, "L1") - DVec3::new(0.0, 0.0, 1.0)).length() < 1e-12);
        assert!((position(&poses, "L2") - DVec3::new(0.0, 1.25, 1.0)).length() < 1e-12);
        assert!((position(&poses, "tool") - DVec3::new(0.0, 1.25, 1.5)).length() < 1e-12);
    }

    #[test]
    fn test_configuration_length_mismatch() {
        let model = RobotModel::from_urdf_str(ARM, ".").unwrap();
        let err = model.compute_link_poses(&[0.0, 0.5, -0.5]).unwrap_err();
        assert!(matches!(
            err,
            ModelError::ConfigurationLength {
                expected: 2,
                got: 3
            }
        ));
    }

    #[test]
    fn test_mimic_joint_follows_leader() {
        let xml = r#"
            <robot name="gripper">
              <link name="palm"/>
              <link name="left"/>
              <link name="right"/>
              <joint name="left_joint" type="prismatic">
                <parent link="palm"/>
                <child link="left"/>
                <axis xyz="0 1 0"/>
                <limit lower="0" upper="1" effort="1" velocity="1"/>
              </joint>
              <joint name="right_joint" type="prismatic">
                <parent link="palm"/>
                <child link="right"/>
                <axis xyz="0 1 0"/>
                <limit lower="-1" upper="0" effort="1" velocity="1"/>
                <mimic joint="left_joint" multiplier="-1" offset="0.1"/>
              </joint>
            </robot>
        "#;
        let model = RobotModel::from_urdf_str(xml, ".").unwrap();
        assert_eq!(model.actuated_joint_names(), ["left_joint"]);

        let poses = model.compute_link_poses(&[0.3]).unwrap();
        assert!((position(&poses, "left") - DVec3::new(0.0, 0.3, 0.0)).length() < 1e-12);
        assert!((position(&poses, "right") - DVec3::new(0.0, -0.2, 0.0)).length() < 1e-12);
    }

    #[test]
    fn test_undefined_link() {
        let xml = r#"
            <robot name="broken">
              <link name="a"/>
              <joint name="j" type="fixed">
                <parent link="a"/>
                <child link="ghost"/>
              </joint>
            </robot>
        "#;
        let err = RobotModel::from_urdf_str(xml, ".").unwrap_err();
        assert!(matches!(err, ModelError::UndefinedLink { ref link, .. } if link == "ghost"));
    }

    #[test]
    fn test_multiple_roots() {
        let xml = r#"
            <robot name="two">
              <link name="a"/>
              <link name="b"/>
            </robot>
        "#;
        let err = RobotModel::from_urdf_str(xml, ".").unwrap_err();
        assert!(matches!(err, ModelError::MultipleRootLinks(ref roots) if roots.len() == 2));
    }

    #[test]
    fn test_loop_detected() {
        let xml = r#"
            <robot name="loop">
              <link name="root"/>
              <link name="a"/>
              <link name="b"/>
              <joint name="ja" type="fixed">
                <parent link="b"/>
                <child link="a"/>
              </joint>
              <joint name="jb" type="fixed">
                <parent link="a"/>
                <child link="b"/>
              </joint>
            </robot>
        "#;
        let err = RobotModel::from_urdf_str(xml, ".").unwrap_err();
        assert!(matches!(err, ModelError::KinematicLoop(_)));
    }

    #[test]
    fn test_duplicate_link() {
        let xml = r#"
            <robot name="dup">
              <link name="a"/>
              <link name="a"/>
            </robot>
        "#;
        let err = RobotModel::from_urdf_str(xml, ".").unwrap_err();
        assert!(matches!(err, ModelError::DuplicateLink(ref name) if name == "a"));
    }

    #[test]
    fn test_load_missing_file_is_parse_error() {
        let err = RobotModel::load("/definitely/not/here.urdf").unwrap_err();
        assert!(matches!(err, ModelError::Parse { .. }));
    }

    #[test]
    fn test_load_sets_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("arm.urdf");
        std::fs::write(&path, ARM).unwrap();

        let model = RobotModel::load(&path).unwrap();
        assert_eq!(model.base_dir(), dir.path());
        assert_eq!(model.links().len(), 4);
    }
}
