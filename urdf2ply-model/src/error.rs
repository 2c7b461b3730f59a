//! Error types for robot model loading and kinematics.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading a robot model or posing it.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Failed to parse URDF '{path}': {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Reference to undefined link '{link}' in joint '{joint}'")]
    UndefinedLink { link: String, joint: String },

    #[error("Duplicate link name: {0}")]
    DuplicateLink(String),

    #[error("Duplicate joint name: {0}")]
    DuplicateJoint(String),

    #[error("Kinematic loop detected: {0}")]
    KinematicLoop(String),

    #[error("No root link found (every link is the child of a joint)")]
    NoRootLink,

    #[error("Multiple root links found: {0:?}")]
    MultipleRootLinks(Vec<String>),

    #[error("Model has no links")]
    Empty,

    #[error("Joint configuration has {got} values but the model has {expected} actuated joints")]
    ConfigurationLength { expected: usize, got: usize },

    #[error("Mimic joint '{joint}' follows '{leader}', which has no value")]
    UnresolvedMimic { joint: String, leader: String },
}

impl ModelError {
    pub fn parse(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn undefined_link(link: impl Into<String>, joint: impl Into<String>) -> Self {
        Self::UndefinedLink {
            link: link.into(),
            joint: joint.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ModelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ModelError::undefined_link("L7", "J7");
        assert!(err.to_string().contains("L7"));
        assert!(err.to_string().contains("J7"));

        let err = ModelError::ConfigurationLength {
            expected: 6,
            got: 2,
        };
        assert!(err.to_string().contains("6 actuated"));
    }
}
