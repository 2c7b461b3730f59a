//! Mesh filename resolution.
//!
//! URDF mesh references come in three shapes: `package://<pkg>/<path>`,
//! `file://<path>` and plain paths relative to the URDF file's directory.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Maps ROS package names to their root directories.
pub type PackagePaths = HashMap<String, PathBuf>;

/// Turn a URDF mesh filename into a filesystem path.
///
/// - `file://` URIs use the path after the scheme.
/// - `package://pkg/rest` uses the configured root of `pkg`; without one it
///   falls back to the parent of `base_dir`, matching the usual
///   `<pkg>/urdf/<robot>.urdf` layout.
/// - Relative paths are joined onto `base_dir`.
///
/// The result is lexically normalized; the file is not required to exist.
pub fn resolve_mesh_path(filename: &str, base_dir: &Path, packages: &PackagePaths) -> PathBuf {
    let resolved = if let Some(rest) = filename.strip_prefix("file://") {
        PathBuf::from(rest)
    } else if let Some(rest) = filename.strip_prefix("package://") {
        let (package, relative) = rest.split_once('/').unwrap_or((rest, ""));
        match packages.get(package) {
            Some(root) => root.join(relative),
            None => {
                debug!(
                    "No path configured for package '{}', assuming it contains {}",
                    package,
                    base_dir.display()
                );
                base_dir.join("..").join(relative)
            }
        }
    } else {
        base_dir.join(filename)
    };

    normalize_path(&resolved)
}

/// Collapse `.` and `..` components without touching the filesystem.
///
/// Leading `..` components of a relative path are kept.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out: Vec<Component> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }

    if out.is_empty() {
        PathBuf::from(".")
    } else {
        out.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_with_parent_segment() {
        let base = Path::new("/robots/parol6/urdf");
        let path = resolve_mesh_path("../meshes/L1.STL", base, &PackagePaths::new());
        assert_eq!(path, PathBuf::from("/robots/parol6/meshes/L1.STL"));
    }

    #[test]
    fn test_relative_without_parent_segment() {
        let base = Path::new("/robots/parol6/urdf");
        let path = resolve_mesh_path("meshes/./L1.STL", base, &PackagePaths::new());
        assert_eq!(path, PathBuf::from("/robots/parol6/urdf/meshes/L1.STL"));
    }

    #[test]
    fn test_package_uri_with_mapping() {
        let mut packages = PackagePaths::new();
        packages.insert("parol6".into(), PathBuf::from("/opt/ros/share/parol6"));
        let path = resolve_mesh_path(
            "package://parol6/meshes/base_link.STL",
            Path::new("/somewhere/else"),
            &packages,
        );
        assert_eq!(path, PathBuf::from("/opt/ros/share/parol6/meshes/base_link.STL"));
    }

    #[test]
    fn test_package_uri_without_mapping() {
        let path = resolve_mesh_path(
            "package://parol6/meshes/base_link.STL",
            Path::new("/robots/parol6/urdf"),
            &PackagePaths::new(),
        );
        assert_eq!(path, PathBuf::from("/robots/parol6/meshes/base_link.STL"));
    }

    #[test]
    fn test_file_uri_and_absolute() {
        let base = Path::new("/robots/parol6/urdf");
        assert_eq!(
            resolve_mesh_path("file:///data/mesh.stl", base, &PackagePaths::new()),
            PathBuf::from("/data/mesh.stl")
        );
        assert_eq!(
            resolve_mesh_path("/data/mesh.stl", base, &PackagePaths::new()),
            PathBuf::from("/data/mesh.stl")
        );
    }

    #[test]
    fn test_normalize_keeps_leading_parent() {
        assert_eq!(normalize_path(Path::new("../a/./b/../c")), PathBuf::from("../a/c"));
        assert_eq!(normalize_path(Path::new("/../a")), PathBuf::from("/a"));
        assert_eq!(normalize_path(Path::new("a/..")), PathBuf::from("."));
    }
}
