//! In-process simulator for tests and demos.
//!
//! [`MockSimulator`] implements [`Simulator`] without a physics engine. Joints follow
//! position commands with a simple PD law, link states are set explicitly and the
//! inverse kinematics solution is configurable. Every inverse kinematics request is
//! recorded so that callers can check the targets passed to the solver.
use crate::{error::ConvergingError, BodyId, JointInfo, JointType, Simulator};
use anyhow::Result;
use log::trace;
use std::path::{Path, PathBuf};

/// Joint of a body created by [`MockSimulator`].
#[derive(Debug, Clone)]
pub struct MockJointSpec {
    name: String,
    joint_type: JointType,
    link_name: String,
}

/// Description of the bodies created by [`MockSimulator::load_body`].
#[derive(Debug, Clone, Default)]
pub struct MockBodySpec {
    joints: Vec<MockJointSpec>,
}

impl MockBodySpec {
    /// Adds a joint and its child link.
    pub fn joint(
        mut self,
        name: impl Into<String>,
        joint_type: JointType,
        link_name: impl Into<String>,
    ) -> Self {
        self.joints.push(MockJointSpec {
            name: name.into(),
            joint_type,
            link_name: link_name.into(),
        });
        self
    }

    /// Adds `n` revolute joints named `joint_{i}`, with child links `link_{i}`.
    pub fn revolute_chain(mut self, n: usize) -> Self {
        let offset = self.joints.len();
        for i in offset..offset + n {
            self = self.joint(format!("joint_{}", i), JointType::Revolute, format!("link_{}", i));
        }
        self
    }

    /// A six-axis arm with a fixed base joint and a fixed tool flange named `mirka_tool0`.
    pub fn converging() -> Self {
        Self::default()
            .joint("base_link-base_fixed_joint", JointType::Fixed, "base")
            .joint("shoulder_pan_joint", JointType::Revolute, "shoulder_link")
            .joint("shoulder_lift_joint", JointType::Revolute, "upper_arm_link")
            .joint("elbow_joint", JointType::Revolute, "forearm_link")
            .joint("wrist_1_joint", JointType::Revolute, "wrist_1_link")
            .joint("wrist_2_joint", JointType::Revolute, "wrist_2_link")
            .joint("wrist_3_joint", JointType::Revolute, "wrist_3_link")
            .joint("wrist_3-flange", JointType::Fixed, "flange")
            .joint("flange-mirka_tool0", JointType::Fixed, "mirka_tool0")
    }
}

/// Gains and time step of [`MockSimulator`].
#[derive(Debug, Clone)]
pub struct MockSimConfig {
    /// Time step in seconds.
    pub dt: f64,

    /// Proportional gain of position control.
    pub kp: f64,

    /// Derivative gain of position control.
    pub kd: f64,
}

impl Default for MockSimConfig {
    fn default() -> Self {
        Self {
            dt: 1.0 / 240.0,
            kp: 400.0,
            kd: 40.0,
        }
    }
}

/// Inverse kinematics request received by [`MockSimulator`].
#[derive(Debug, Clone, PartialEq)]
pub struct IkRequest {
    /// Body.
    pub body: BodyId,

    /// Link to be placed.
    pub link: usize,

    /// Target position.
    pub position: [f64; 3],

    /// Target orientation.
    pub orientation: [f64; 4],
}

/// Position command received by [`MockSimulator`].
#[derive(Debug, Clone, PartialEq)]
pub struct ControlCommand {
    /// Body.
    pub body: BodyId,

    /// Commanded joints.
    pub joints: Vec<usize>,

    /// Target angles.
    pub target_angles: Vec<f64>,

    /// Maximum forces.
    pub forces: Vec<f64>,
}

#[derive(Debug, Clone)]
struct MockJoint {
    info: JointInfo,
    angle: f64,
    velocity: f64,
    target: Option<(f64, f64)>,
}

#[derive(Debug, Clone, Copy, Default)]
struct LinkState {
    position: [f64; 3],
    velocity: [f64; 3],
}

#[derive(Debug, Clone)]
struct MockBody {
    name: String,
    path: PathBuf,
    base_position: [f64; 3],
    base_orientation: [f64; 4],
    joints: Vec<MockJoint>,
    links: Vec<LinkState>,
}

/// A simulator without physics engine.
#[derive(Debug)]
pub struct MockSimulator {
    spec: MockBodySpec,
    config: MockSimConfig,
    bodies: Vec<MockBody>,
    ik_solution: Option<Vec<f64>>,
    ik_failure: Option<String>,
    ik_requests: Vec<IkRequest>,
    commands: Vec<ControlCommand>,
    n_steps: usize,
}

impl MockSimulator {
    /// Creates a simulator whose bodies follow the given description.
    pub fn new(spec: MockBodySpec) -> Self {
        Self::with_config(spec, MockSimConfig::default())
    }

    /// Creates a simulator with custom gains.
    pub fn with_config(spec: MockBodySpec, config: MockSimConfig) -> Self {
        Self {
            spec,
            config,
            bodies: vec![],
            ik_solution: None,
            ik_failure: None,
            ik_requests: vec![],
            commands: vec![],
            n_steps: 0,
        }
    }

    /// Sets the solution returned by inverse kinematics.
    ///
    /// If not set, the current angles of the movable joints are returned.
    pub fn set_ik_solution(&mut self, solution: Vec<f64>) {
        self.ik_solution = Some(solution);
    }

    /// Makes every subsequent inverse kinematics request fail with the given message.
    pub fn fail_ik(&mut self, msg: impl Into<String>) {
        self.ik_failure = Some(msg.into());
    }

    /// Overwrites the state of a link.
    pub fn set_link_state(
        &mut self,
        body: BodyId,
        link: usize,
        position: [f64; 3],
        velocity: [f64; 3],
    ) -> Result<()> {
        let state = self
            .body_mut(body)?
            .links
            .get_mut(link)
            .ok_or(ConvergingError::UnknownJoint(link))?;
        state.position = position;
        state.velocity = velocity;
        Ok(())
    }

    /// Inverse kinematics requests received so far.
    pub fn ik_requests(&self) -> &[IkRequest] {
        &self.ik_requests
    }

    /// Position commands received so far.
    pub fn commands(&self) -> &[ControlCommand] {
        &self.commands
    }

    /// Number of simulation steps performed.
    pub fn n_steps(&self) -> usize {
        self.n_steps
    }

    /// Name, path and base pose given when the body was loaded.
    pub fn body_origin(&self, body: BodyId) -> Result<(&str, &Path, [f64; 3], [f64; 4])> {
        let b = self.body(body)?;
        Ok((b.name.as_str(), b.path.as_path(), b.base_position, b.base_orientation))
    }

    fn body(&self, body: BodyId) -> Result<&MockBody> {
        Ok(self
            .bodies
            .get(body.0)
            .ok_or(ConvergingError::UnknownBody(body.0))?)
    }

    fn body_mut(&mut self, body: BodyId) -> Result<&mut MockBody> {
        Ok(self
            .bodies
            .get_mut(body.0)
            .ok_or(ConvergingError::UnknownBody(body.0))?)
    }

    fn joint(&self, body: BodyId, joint: usize) -> Result<&MockJoint> {
        Ok(self
            .body(body)?
            .joints
            .get(joint)
            .ok_or(ConvergingError::UnknownJoint(joint))?)
    }

    fn link(&self, body: BodyId, link: usize) -> Result<&LinkState> {
        Ok(self
            .body(body)?
            .links
            .get(link)
            .ok_or(ConvergingError::UnknownJoint(link))?)
    }
}

impl Simulator for MockSimulator {
    fn load_body(
        &mut self,
        name: &str,
        path: &Path,
        base_position: [f64; 3],
        base_orientation: [f64; 4],
    ) -> Result<BodyId> {
        let joints = self
            .spec
            .joints
            .iter()
            .enumerate()
            .map(|(index, spec)| MockJoint {
                info: JointInfo {
                    index,
                    name: spec.name.clone(),
                    joint_type: spec.joint_type,
                    link_name: spec.link_name.clone(),
                },
                angle: 0.0,
                velocity: 0.0,
                target: None,
            })
            .collect::<Vec<_>>();
        let links = vec![LinkState::default(); joints.len()];

        self.bodies.push(MockBody {
            name: name.to_string(),
            path: path.to_path_buf(),
            base_position,
            base_orientation,
            joints,
            links,
        });

        Ok(BodyId(self.bodies.len() - 1))
    }

    fn num_joints(&self, body: BodyId) -> Result<usize> {
        Ok(self.body(body)?.joints.len())
    }

    fn joint_info(&self, body: BodyId, joint: usize) -> Result<JointInfo> {
        Ok(self.joint(body, joint)?.info.clone())
    }

    fn link_position(&self, body: BodyId, link: usize) -> Result<[f64; 3]> {
        Ok(self.link(body, link)?.position)
    }

    fn link_velocity(&self, body: BodyId, link: usize) -> Result<[f64; 3]> {
        Ok(self.link(body, link)?.velocity)
    }

    fn joint_angle(&self, body: BodyId, joint: usize) -> Result<f64> {
        Ok(self.joint(body, joint)?.angle)
    }

    fn joint_velocity(&self, body: BodyId, joint: usize) -> Result<f64> {
        Ok(self.joint(body, joint)?.velocity)
    }

    fn inverse_kinematics(
        &mut self,
        body: BodyId,
        link: usize,
        position: [f64; 3],
        orientation: [f64; 4],
    ) -> Result<Vec<f64>> {
        self.link(body, link)?;
        self.ik_requests.push(IkRequest {
            body,
            link,
            position,
            orientation,
        });

        if let Some(msg) = &self.ik_failure {
            return Err(ConvergingError::InverseKinematics(msg.clone()).into());
        }

        match &self.ik_solution {
            Some(solution) => Ok(solution.clone()),
            None => Ok(self
                .body(body)?
                .joints
                .iter()
                .filter(|j| j.info.joint_type.is_movable())
                .map(|j| j.angle)
                .collect()),
        }
    }

    fn control_joints(
        &mut self,
        body: BodyId,
        joints: &[usize],
        target_angles: &[f64],
        forces: &[f64],
    ) -> Result<()> {
        if target_angles.len() != joints.len() || forces.len() != joints.len() {
            return Err(ConvergingError::TargetLengthMismatch {
                expected: joints.len(),
                found: target_angles.len().min(forces.len()),
            }
            .into());
        }

        let b = self.body_mut(body)?;
        for ((&ix, &target), &force) in joints.iter().zip(target_angles).zip(forces) {
            let joint = b
                .joints
                .get_mut(ix)
                .ok_or(ConvergingError::UnknownJoint(ix))?;
            joint.target = Some((target, force));
        }
        trace!("Position command to joints {:?}: {:?}", joints, target_angles);

        self.commands.push(ControlCommand {
            body,
            joints: joints.to_vec(),
            target_angles: target_angles.to_vec(),
            forces: forces.to_vec(),
        });
        Ok(())
    }

    fn set_joint_angles(&mut self, body: BodyId, joints: &[usize], angles: &[f64]) -> Result<()> {
        if angles.len() != joints.len() {
            return Err(ConvergingError::TargetLengthMismatch {
                expected: joints.len(),
                found: angles.len(),
            }
            .into());
        }

        let b = self.body_mut(body)?;
        for (&ix, &angle) in joints.iter().zip(angles) {
            let joint = b
                .joints
                .get_mut(ix)
                .ok_or(ConvergingError::UnknownJoint(ix))?;
            joint.angle = angle;
            joint.velocity = 0.0;
            joint.target = None;
        }
        Ok(())
    }

    fn step(&mut self) -> Result<()> {
        let MockSimConfig { dt, kp, kd } = self.config;

        for joint in self.bodies.iter_mut().flat_map(|b| b.joints.iter_mut()) {
            if let Some((target, force)) = joint.target {
                // Unit inertia, so the force limit bounds the acceleration.
                let force = force.abs();
                let accel =
                    (kp * (target - joint.angle) - kd * joint.velocity).clamp(-force, force);
                joint.velocity += accel * dt;
                joint.angle += joint.velocity * dt;
            }
        }
        self.n_steps += 1;

        Ok(())
    }
}
