//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
#[derive(Error, Debug, PartialEq)]
pub enum ConvergingError {
    /// No link with the given name exists in the body.
    #[error("Link not found: {0}")]
    LinkNotFound(String),

    /// The number of joint configurations differs from the number of controlled joints.
    #[error("Joint count mismatch: {expected} controlled joints, {found} joint configurations")]
    JointCountMismatch {
        /// Number of controlled joints discovered in the body.
        expected: usize,
        /// Number of joint configurations.
        found: usize,
    },

    /// The neutral pose has a wrong number of angles.
    #[error("Neutral pose mismatch: {expected} controlled joints, {found} neutral angles")]
    NeutralPoseMismatch {
        /// Number of controlled joints.
        expected: usize,
        /// Number of neutral angles.
        found: usize,
    },

    /// The action has a wrong number of elements.
    #[error("Action length mismatch: expected {expected}, found {found}")]
    ActionLengthMismatch {
        /// Dimension of the action space.
        expected: usize,
        /// Length of the given action.
        found: usize,
    },

    /// Too few target angles were given for the controlled joints.
    #[error("Target length mismatch: expected at least {expected}, found {found}")]
    TargetLengthMismatch {
        /// Number of controlled joints.
        expected: usize,
        /// Number of target angles.
        found: usize,
    },

    /// The control type string is not recognized.
    #[error("Unknown control type: {0}")]
    UnknownControlType(String),

    /// The body handle does not refer to a loaded body.
    #[error("Unknown body: {0}")]
    UnknownBody(usize),

    /// The joint index is out of range.
    #[error("Unknown joint: {0}")]
    UnknownJoint(usize),

    /// Inverse kinematics failed in the simulator.
    #[error("Inverse kinematics failed: {0}")]
    InverseKinematics(String),
}
