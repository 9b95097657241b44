//! Physics simulator.
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Handle of a body loaded into a [`Simulator`].
///
/// The body itself is owned by the simulator; the handle only refers to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BodyId(pub usize);

/// Type of a joint, in the order physics engines usually enumerate them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JointType {
    /// One rotational degree of freedom.
    Revolute,

    /// One translational degree of freedom.
    Prismatic,

    /// Three rotational degrees of freedom.
    Spherical,

    /// Two translational and one rotational degrees of freedom.
    Planar,

    /// No degree of freedom.
    Fixed,
}

impl JointType {
    /// Returns `true` if the joint can be commanded by position control
    /// and is part of an inverse kinematics solution.
    pub fn is_movable(&self) -> bool {
        !matches!(self, Self::Fixed)
    }
}

/// Static information of a joint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointInfo {
    /// Index of the joint in the body.
    ///
    /// The child link of the joint has the same index.
    pub index: usize,

    /// Name of the joint.
    pub name: String,

    /// Type of the joint.
    pub joint_type: JointType,

    /// Name of the child link of the joint.
    pub link_name: String,
}

/// Capabilities of a physics simulator that a robot adapter relies on.
///
/// Positions are `[x, y, z]` in the world frame and orientations are quaternions.
/// Every method is a blocking call into the in-process simulation state.
pub trait Simulator {
    /// Loads a body description and places its base at the given pose.
    fn load_body(
        &mut self,
        name: &str,
        path: &Path,
        base_position: [f64; 3],
        base_orientation: [f64; 4],
    ) -> Result<BodyId>;

    /// Returns the number of joints of the body.
    fn num_joints(&self, body: BodyId) -> Result<usize>;

    /// Returns the information of a joint.
    fn joint_info(&self, body: BodyId, joint: usize) -> Result<JointInfo>;

    /// Returns the information of all joints of the body, in the simulator's order.
    fn joint_infos(&self, body: BodyId) -> Result<Vec<JointInfo>> {
        (0..self.num_joints(body)?)
            .map(|joint| self.joint_info(body, joint))
            .collect()
    }

    /// Returns the world position of a link.
    fn link_position(&self, body: BodyId, link: usize) -> Result<[f64; 3]>;

    /// Returns the world linear velocity of a link.
    fn link_velocity(&self, body: BodyId, link: usize) -> Result<[f64; 3]>;

    /// Returns the angle of a joint in radians.
    fn joint_angle(&self, body: BodyId, joint: usize) -> Result<f64>;

    /// Returns the angular velocity of a joint in radians per second.
    fn joint_velocity(&self, body: BodyId, joint: usize) -> Result<f64>;

    /// Computes joint angles that bring `link` to the target pose.
    ///
    /// The solution has one value per movable joint of the body.
    fn inverse_kinematics(
        &mut self,
        body: BodyId,
        link: usize,
        position: [f64; 3],
        orientation: [f64; 4],
    ) -> Result<Vec<f64>>;

    /// Commands joints to the target angles with position control.
    ///
    /// `forces[i]` is the maximum force applied to `joints[i]`.
    fn control_joints(
        &mut self,
        body: BodyId,
        joints: &[usize],
        target_angles: &[f64],
        forces: &[f64],
    ) -> Result<()>;

    /// Overwrites the angles of joints without running the dynamics.
    fn set_joint_angles(&mut self, body: BodyId, joints: &[usize], angles: &[f64]) -> Result<()>;

    /// Advances the simulation by one step.
    fn step(&mut self) -> Result<()>;
}
