//! Configuration of [`Converging`](crate::Converging).
//!
//! If environment variable `CONVERGING_DATA_DIR` exists, it is used as the directory
//! from which the body description `converging.urdf` is loaded.
use converging_core::{error::ConvergingError, Configurable};
use serde::{Deserialize, Serialize};
use std::{default::Default, env, path::PathBuf, str::FromStr};

/// How actions are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlType {
    /// Actions are per-joint angular deltas.
    Joints,

    /// Actions are end-effector displacements, converted by inverse kinematics.
    Ee,
}

impl FromStr for ControlType {
    type Err = ConvergingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "joints" => Ok(Self::Joints),
            "ee" => Ok(Self::Ee),
            _ => Err(ConvergingError::UnknownControlType(s.to_string())),
        }
    }
}

/// Size class of a joint, selecting its maximum torque from
/// [`ConvergingConfig::joint_torque_by_size`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JointSize {
    /// Size 0.
    Size0,
    /// Size 1.
    Size1,
    /// Size 2.
    Size2,
    /// Size 3.
    Size3,
    /// Size 4.
    Size4,
}

impl JointSize {
    /// Index into the torque table.
    pub fn index(&self) -> usize {
        match self {
            Self::Size0 => 0,
            Self::Size1 => 1,
            Self::Size2 => 2,
            Self::Size3 => 3,
            Self::Size4 => 4,
        }
    }
}

/// Configuration of a controlled joint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointConfig {
    /// Size class of the joint.
    pub size: JointSize,
}

impl From<JointSize> for JointConfig {
    fn from(size: JointSize) -> Self {
        Self { size }
    }
}

/// Configurations of [`Converging`](crate::Converging).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvergingConfig {
    pub(crate) body_name: String,
    pub(crate) urdf_path: PathBuf,
    pub(crate) base_position: [f64; 3],
    pub(crate) base_orientation: [f64; 4],
    pub(crate) ee_link_name: String,
    pub(crate) control_type: ControlType,

    /// One entry per revolute joint, in the order the simulator enumerates them.
    pub(crate) joints: Vec<JointConfig>,

    /// Maximum torque in Nm for each joint size class.
    ///
    /// Values for UR e-series arms, see
    /// <https://www.universal-robots.com/articles/ur/robot-care-maintenance/max-joint-torques-cb3-and-e-series/>.
    pub(crate) joint_torque_by_size: [f64; 5],

    pub(crate) neutral_angles: Vec<f64>,
    pub(crate) reset_noise: f64,
    pub(crate) ee_displacement_scale: f64,
    pub(crate) joint_ctrl_scale: f64,
    pub(crate) ik_orientation: [f64; 4],
    pub(crate) ik_arm_dofs: usize,
}

impl Default for ConvergingConfig {
    #[allow(clippy::approx_constant)]
    fn default() -> Self {
        let data_dir = if let Ok(var) = env::var("CONVERGING_DATA_DIR") {
            PathBuf::from(var)
        } else {
            PathBuf::from("assets")
        };

        Self {
            body_name: "my_robot".to_string(),
            urdf_path: data_dir.join("converging.urdf"),
            base_position: [-0.6, -0.2, 0.0],
            base_orientation: [0.0, 0.0, 0.0, 1.0],
            ee_link_name: "mirka_tool0".to_string(),
            control_type: ControlType::Joints,
            joints: [
                JointSize::Size4,
                JointSize::Size4,
                JointSize::Size3,
                JointSize::Size2,
                JointSize::Size2,
                JointSize::Size2,
            ]
            .iter()
            .map(|&size| size.into())
            .collect(),
            joint_torque_by_size: [12.0, 28.0, 56.0, 150.0, 330.0],
            neutral_angles: vec![
                -3.141592, -1.745329, 2.0943957, -2.4434604, 1.570796, -1.570796,
            ],
            reset_noise: 0.1,
            ee_displacement_scale: 0.01,
            joint_ctrl_scale: 0.05,
            ik_orientation: [1.0, 0.0, 0.0, 0.0],
            ik_arm_dofs: 7,
        }
    }
}

impl Configurable for ConvergingConfig {}

impl ConvergingConfig {
    /// Sets the control type.
    pub fn control_type(mut self, control_type: ControlType) -> Self {
        self.control_type = control_type;
        self
    }

    /// Sets the name under which the body is loaded.
    pub fn body_name(mut self, body_name: impl Into<String>) -> Self {
        self.body_name = body_name.into();
        self
    }

    /// Sets the path of the body description.
    pub fn urdf_path(mut self, urdf_path: impl Into<PathBuf>) -> Self {
        self.urdf_path = urdf_path.into();
        self
    }

    /// Sets the position of the base.
    pub fn base_position(mut self, base_position: [f64; 3]) -> Self {
        self.base_position = base_position;
        self
    }

    /// Sets the orientation of the base as a quaternion `[x, y, z, w]`.
    pub fn base_orientation(mut self, base_orientation: [f64; 4]) -> Self {
        self.base_orientation = base_orientation;
        self
    }

    /// Sets the name of the end-effector link.
    pub fn ee_link_name(mut self, ee_link_name: impl Into<String>) -> Self {
        self.ee_link_name = ee_link_name.into();
        self
    }

    /// Sets the configuration of the controlled joints.
    pub fn joints(mut self, joints: Vec<JointConfig>) -> Self {
        self.joints = joints;
        self
    }

    /// Sets the torque table.
    pub fn joint_torque_by_size(mut self, v: [f64; 5]) -> Self {
        self.joint_torque_by_size = v;
        self
    }

    /// Sets the neutral pose used at reset.
    pub fn neutral_angles(mut self, neutral_angles: Vec<f64>) -> Self {
        self.neutral_angles = neutral_angles;
        self
    }

    /// Sets the width of the uniform noise added to the neutral pose at reset.
    pub fn reset_noise(mut self, v: f64) -> Self {
        self.reset_noise = v;
        self
    }

    /// Sets the number of solved joint values kept from inverse kinematics.
    pub fn ik_arm_dofs(mut self, v: usize) -> Self {
        self.ik_arm_dofs = v;
        self
    }

    /// Maximum torque of a joint.
    pub fn joint_force(&self, joint: &JointConfig) -> f64 {
        self.joint_torque_by_size[joint.size.index()]
    }
}
