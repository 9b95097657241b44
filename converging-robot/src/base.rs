//! Converging arm in a physics simulator.
use crate::{ControlType, ConvergingAct, ConvergingConfig, ConvergingObs};
use anyhow::Result;
use converging_core::{error::ConvergingError, BodyId, BoxSpace, JointType, Simulator};
use log::{debug, info, trace};
use rand::Rng;

/// Converging arm loaded into a simulator.
///
/// The adapter owns the simulator handle it was built with. The surrounding loop
/// advances the simulation through [`Converging::sim_mut`] between calls of
/// [`Converging::set_action`] and [`Converging::get_obs`].
#[derive(Debug)]
pub struct Converging<S: Simulator> {
    sim: S,

    body: BodyId,

    // Revolute joints, in the order the simulator enumerates them.
    joint_indices: Vec<usize>,

    // Maximum torques, aligned with `joint_indices`.
    joint_forces: Vec<f64>,

    ee_link: usize,

    action_space: BoxSpace,

    config: ConvergingConfig,
}

impl<S: Simulator> Converging<S> {
    /// Loads the arm into the simulator and resets it to the neutral pose.
    ///
    /// Fails if the end-effector link does not exist, or if the number of joint
    /// configurations or neutral angles differs from the number of revolute joints.
    pub fn build<R: Rng + ?Sized>(
        mut sim: S,
        config: &ConvergingConfig,
        rng: &mut R,
    ) -> Result<Self> {
        let body = sim.load_body(
            &config.body_name,
            &config.urdf_path,
            config.base_position,
            config.base_orientation,
        )?;
        let infos = sim.joint_infos(body)?;

        let joint_indices = infos
            .iter()
            .filter(|info| info.joint_type == JointType::Revolute)
            .map(|info| info.index)
            .collect::<Vec<_>>();
        let n_joints = joint_indices.len();

        if config.joints.len() != n_joints {
            return Err(ConvergingError::JointCountMismatch {
                expected: n_joints,
                found: config.joints.len(),
            }
            .into());
        }
        let joint_forces = config
            .joints
            .iter()
            .map(|joint| config.joint_force(joint))
            .collect::<Vec<_>>();

        let ee_link = infos
            .iter()
            .find(|info| info.link_name == config.ee_link_name)
            .map(|info| info.index)
            .ok_or_else(|| ConvergingError::LinkNotFound(config.ee_link_name.clone()))?;

        if config.neutral_angles.len() != n_joints {
            return Err(ConvergingError::NeutralPoseMismatch {
                expected: n_joints,
                found: config.neutral_angles.len(),
            }
            .into());
        }

        info!(
            "Loaded {:?} as {:?}, joints = {:?}, end-effector link = {}",
            config.urdf_path, body, joint_indices, ee_link
        );

        let mut robot = Self {
            sim,
            body,
            joint_indices,
            joint_forces,
            ee_link,
            action_space: BoxSpace::new(-1.0, 1.0, n_joints),
            config: config.clone(),
        };
        robot.reset(rng)?;

        Ok(robot)
    }

    /// Applies an action.
    ///
    /// The action is clipped to the action space before use; the argument itself is
    /// left untouched. All controlled joints receive a position command.
    pub fn set_action(&mut self, action: &[f32]) -> Result<()> {
        if action.len() != self.action_space.dim() {
            return Err(ConvergingError::ActionLengthMismatch {
                expected: self.action_space.dim(),
                found: action.len(),
            }
            .into());
        }
        let action = self
            .action_space
            .clip(action)
            .into_iter()
            .map(|a| a as f64)
            .collect::<Vec<_>>();

        let target_arm_angles = match self.config.control_type {
            ControlType::Ee => self.ee_displacement_to_target_arm_angles(&action)?,
            ControlType::Joints => self.arm_joint_ctrl_to_target_arm_angles(&action)?,
        };

        self.control_joints(&target_arm_angles)
    }

    /// Applies a typed action, see [`Converging::set_action`].
    pub fn apply(&mut self, act: &ConvergingAct) -> Result<()> {
        self.set_action(&act.act.to_vec())
    }

    /// Returns the target position of the end-effector for a displacement `(dx, dy, dz)`.
    ///
    /// The displacement is scaled to limit the change per step. The height of the
    /// target is kept non-negative.
    pub fn ee_target_position(&self, ee_displacement: &[f64]) -> Result<[f64; 3]> {
        if ee_displacement.len() < 3 {
            return Err(ConvergingError::ActionLengthMismatch {
                expected: 3,
                found: ee_displacement.len(),
            }
            .into());
        }

        let mut target = self.get_ee_position()?;
        for (t, d) in target.iter_mut().zip(ee_displacement) {
            *t += d * self.config.ee_displacement_scale;
        }
        // Targets below the floor hurt learning.
        target[2] = target[2].max(0.0);

        Ok(target)
    }

    /// Computes the target arm angles from the end-effector displacement `(dx, dy, dz)`.
    ///
    /// Only the first `ik_arm_dofs` values of the inverse kinematics solution are
    /// returned, the rest belong to the fingers.
    pub fn ee_displacement_to_target_arm_angles(
        &mut self,
        ee_displacement: &[f64],
    ) -> Result<Vec<f64>> {
        let target = self.ee_target_position(ee_displacement)?;
        let mut target_arm_angles = self.sim.inverse_kinematics(
            self.body,
            self.ee_link,
            target,
            self.config.ik_orientation,
        )?;
        target_arm_angles.truncate(self.config.ik_arm_dofs);

        Ok(target_arm_angles)
    }

    /// Computes the target arm angles from per-joint angle deltas.
    pub fn arm_joint_ctrl_to_target_arm_angles(&self, arm_joint_ctrl: &[f64]) -> Result<Vec<f64>> {
        if arm_joint_ctrl.len() != self.joint_indices.len() {
            return Err(ConvergingError::ActionLengthMismatch {
                expected: self.joint_indices.len(),
                found: arm_joint_ctrl.len(),
            }
            .into());
        }

        Ok(self
            .get_joint_angles()?
            .iter()
            .zip(arm_joint_ctrl)
            .map(|(angle, ctrl)| angle + ctrl * self.config.joint_ctrl_scale)
            .collect())
    }

    /// Commands the controlled joints to the target angles.
    ///
    /// `target_angles[i]` is used for the i-th controlled joint. Surplus values are dropped.
    pub fn control_joints(&mut self, target_angles: &[f64]) -> Result<()> {
        let n = self.joint_indices.len();
        if target_angles.len() < n {
            return Err(ConvergingError::TargetLengthMismatch {
                expected: n,
                found: target_angles.len(),
            }
            .into());
        }
        if target_angles.len() > n {
            debug!(
                "Dropped {} target angles for uncontrolled joints",
                target_angles.len() - n
            );
        }
        trace!("Target angles: {:?}", &target_angles[..n]);

        self.sim.control_joints(
            self.body,
            &self.joint_indices,
            &target_angles[..n],
            &self.joint_forces,
        )
    }

    /// Returns the position of the end-effector as `(x, y, z)`.
    pub fn get_ee_position(&self) -> Result<[f64; 3]> {
        self.sim.link_position(self.body, self.ee_link)
    }

    /// Returns the velocity of the end-effector as `(vx, vy, vz)`.
    pub fn get_ee_velocity(&self) -> Result<[f64; 3]> {
        self.sim.link_velocity(self.body, self.ee_link)
    }

    /// Returns the joint angles as `(q1, q2, ..., qn)`.
    pub fn get_joint_angles(&self) -> Result<Vec<f64>> {
        self.joint_indices
            .iter()
            .map(|&joint| self.sim.joint_angle(self.body, joint))
            .collect()
    }

    /// Returns the joint angles, the end-effector position and the end-effector velocity.
    pub fn get_obs(&self) -> Result<Vec<f64>> {
        let mut obs = self.get_joint_angles()?;
        obs.extend_from_slice(&self.get_ee_position()?);
        obs.extend_from_slice(&self.get_ee_velocity()?);
        Ok(obs)
    }

    /// Returns a typed observation, see [`Converging::get_obs`].
    pub fn observe(&self) -> Result<ConvergingObs> {
        Ok(self.get_obs()?.into())
    }

    /// Puts the arm at the neutral pose with uniform noise in `[0, reset_noise)` on each joint.
    ///
    /// The joint state is written directly, without running the dynamics.
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<()> {
        let angles = self
            .config
            .neutral_angles
            .iter()
            .map(|angle| angle + rng.gen::<f64>() * self.config.reset_noise)
            .collect::<Vec<_>>();
        debug!("Reset joint angles: {:?}", angles);

        self.sim
            .set_joint_angles(self.body, &self.joint_indices, &angles)
    }

    /// Action space.
    pub fn action_space(&self) -> &BoxSpace {
        &self.action_space
    }

    /// Indices of the controlled joints.
    pub fn joint_indices(&self) -> &[usize] {
        &self.joint_indices
    }

    /// Maximum torques of the controlled joints.
    pub fn joint_forces(&self) -> &[f64] {
        &self.joint_forces
    }

    /// Index of the end-effector link.
    pub fn ee_link(&self) -> usize {
        self.ee_link
    }

    /// Control type.
    pub fn control_type(&self) -> ControlType {
        self.config.control_type
    }

    /// Handle of the body in the simulator.
    pub fn body(&self) -> BodyId {
        self.body
    }

    /// The simulator.
    pub fn sim(&self) -> &S {
        &self.sim
    }

    /// The simulator, for stepping it.
    pub fn sim_mut(&mut self) -> &mut S {
        &mut self.sim
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{JointConfig, JointSize};
    use converging_core::mock::{MockBodySpec, MockSimulator};
    use rand::{rngs::StdRng, SeedableRng};

    #[allow(clippy::approx_constant)]
    const NEUTRAL: [f64; 6] = [
        -3.141592, -1.745329, 2.0943957, -2.4434604, 1.570796, -1.570796,
    ];

    fn robot(control_type: ControlType) -> Converging<MockSimulator> {
        let sim = MockSimulator::new(MockBodySpec::converging());
        let config = ConvergingConfig::default().control_type(control_type);
        let mut rng = StdRng::seed_from_u64(42);
        Converging::build(sim, &config, &mut rng).unwrap()
    }

    fn error(err: anyhow::Error) -> ConvergingError {
        err.downcast::<ConvergingError>().unwrap()
    }

    #[test]
    fn test_build() {
        let robot = robot(ControlType::Joints);
        assert_eq!(robot.joint_indices(), &[1, 2, 3, 4, 5, 6]);
        assert_eq!(robot.joint_forces(), &[330.0, 330.0, 150.0, 56.0, 56.0, 56.0]);
        assert_eq!(robot.ee_link(), 8);
        assert_eq!(robot.action_space().dim(), 6);
        assert_eq!(robot.control_type(), ControlType::Joints);

        let (name, _, position, orientation) = robot.sim().body_origin(robot.body()).unwrap();
        assert_eq!(name, "my_robot");
        assert_eq!(position, [-0.6, -0.2, 0.0]);
        assert_eq!(orientation, [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_missing_ee_link() {
        let sim = MockSimulator::new(MockBodySpec::default().revolute_chain(6));
        let mut rng = StdRng::seed_from_u64(42);
        let err = Converging::build(sim, &ConvergingConfig::default(), &mut rng).unwrap_err();
        assert_eq!(
            error(err),
            ConvergingError::LinkNotFound("mirka_tool0".to_string())
        );
    }

    #[test]
    fn test_joint_count_mismatch() {
        let spec = MockBodySpec::default()
            .revolute_chain(7)
            .joint("tool", JointType::Fixed, "mirka_tool0");
        let mut rng = StdRng::seed_from_u64(42);
        let err = Converging::build(
            MockSimulator::new(spec),
            &ConvergingConfig::default(),
            &mut rng,
        )
        .unwrap_err();
        assert_eq!(
            error(err),
            ConvergingError::JointCountMismatch {
                expected: 7,
                found: 6
            }
        );
    }

    #[test]
    fn test_neutral_pose_mismatch() {
        let config = ConvergingConfig::default().neutral_angles(vec![0.0; 5]);
        let mut rng = StdRng::seed_from_u64(42);
        let err = Converging::build(
            MockSimulator::new(MockBodySpec::converging()),
            &config,
            &mut rng,
        )
        .unwrap_err();
        assert_eq!(
            error(err),
            ConvergingError::NeutralPoseMismatch {
                expected: 6,
                found: 5
            }
        );
    }

    #[test]
    fn test_reset() {
        let mut robot = robot(ControlType::Joints);
        let mut rng = StdRng::seed_from_u64(0);

        robot.reset(&mut rng).unwrap();
        let angles1 = robot.get_joint_angles().unwrap();
        robot.reset(&mut rng).unwrap();
        let angles2 = robot.get_joint_angles().unwrap();

        assert_ne!(angles1, angles2);
        for angles in [angles1, angles2].iter() {
            for (angle, neutral) in angles.iter().zip(NEUTRAL.iter()) {
                assert!(*angle >= *neutral && *angle < neutral + 0.1);
            }
        }
    }

    #[test]
    fn test_reset_is_reproducible() {
        let mut robot = robot(ControlType::Joints);

        robot.reset(&mut StdRng::seed_from_u64(7)).unwrap();
        let angles1 = robot.get_joint_angles().unwrap();
        robot.reset(&mut StdRng::seed_from_u64(7)).unwrap();
        let angles2 = robot.get_joint_angles().unwrap();

        assert_eq!(angles1, angles2);
    }

    #[test]
    fn test_arm_joint_ctrl() {
        let robot = robot(ControlType::Joints);
        let ctrl = [0.3, -0.7, 1.0, -1.0, 0.0, 0.25];
        let current = robot.get_joint_angles().unwrap();

        let targets = robot.arm_joint_ctrl_to_target_arm_angles(&ctrl).unwrap();
        for i in 0..6 {
            assert_eq!(targets[i], current[i] + ctrl[i] * 0.05);
        }
    }

    #[test]
    fn test_set_action_joints() {
        let mut robot = robot(ControlType::Joints);
        let current = robot.get_joint_angles().unwrap();
        let action = vec![2.0f32, -3.0, 0.5, 0.0, -0.5, 1.0];
        let action_copy = action.clone();

        robot.set_action(&action).unwrap();
        assert_eq!(action, action_copy);

        let command = robot.sim().commands().last().unwrap().clone();
        assert_eq!(command.joints, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(command.forces, robot.joint_forces());
        let clipped = [1.0f32, -1.0, 0.5, 0.0, -0.5, 1.0];
        for i in 0..6 {
            assert_eq!(command.target_angles[i], current[i] + clipped[i] as f64 * 0.05);
        }
    }

    #[test]
    fn test_set_action_wrong_length() {
        let mut robot = robot(ControlType::Joints);
        let err = robot.set_action(&[0.0; 5]).unwrap_err();
        assert_eq!(
            error(err),
            ConvergingError::ActionLengthMismatch {
                expected: 6,
                found: 5
            }
        );
        assert!(robot.sim().commands().is_empty());
    }

    #[test]
    fn test_ee_zero_displacement() {
        let mut robot = robot(ControlType::Ee);
        let (body, link) = (robot.body(), robot.ee_link());
        robot
            .sim_mut()
            .set_link_state(body, link, [0.1, 0.2, 0.3], [0.0; 3])
            .unwrap();

        robot
            .ee_displacement_to_target_arm_angles(&[0.0, 0.0, 0.0])
            .unwrap();
        let request = robot.sim().ik_requests().last().unwrap().clone();
        assert_eq!(request.link, 8);
        assert_eq!(request.position, [0.1, 0.2, 0.3]);
        assert_eq!(request.orientation, [1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_ee_target_height_is_clipped() {
        let mut robot = robot(ControlType::Ee);
        let (body, link) = (robot.body(), robot.ee_link());
        robot
            .sim_mut()
            .set_link_state(body, link, [0.1, 0.2, 0.3], [0.0; 3])
            .unwrap();

        let target = robot.ee_target_position(&[0.0, 0.0, -100.0]).unwrap();
        assert_eq!(target[2], 0.0);

        robot
            .ee_displacement_to_target_arm_angles(&[0.0, 0.0, -100.0])
            .unwrap();
        assert_eq!(robot.sim().ik_requests().last().unwrap().position[2], 0.0);
    }

    #[test]
    fn test_ee_extra_components_are_ignored() {
        let robot = robot(ControlType::Ee);
        let t1 = robot.ee_target_position(&[1.0, -1.0, 0.5]).unwrap();
        let t2 = robot
            .ee_target_position(&[1.0, -1.0, 0.5, 0.9, 0.9, 0.9])
            .unwrap();
        assert_eq!(t1, t2);
    }

    #[test]
    fn test_ik_solution_is_truncated() {
        let mut robot = robot(ControlType::Ee);
        robot
            .sim_mut()
            .set_ik_solution(vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9]);

        let targets = robot
            .ee_displacement_to_target_arm_angles(&[0.5, 0.5, 0.5])
            .unwrap();
        assert_eq!(targets, vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7]);

        robot.set_action(&[0.5; 6]).unwrap();
        let command = robot.sim().commands().last().unwrap();
        assert_eq!(command.target_angles, vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6]);
    }

    #[test]
    fn test_ik_failure_propagates() {
        let mut robot = robot(ControlType::Ee);
        robot.sim_mut().fail_ik("singular");
        let err = robot.set_action(&[0.0; 6]).unwrap_err();
        assert_eq!(
            error(err),
            ConvergingError::InverseKinematics("singular".to_string())
        );
    }

    #[test]
    fn test_short_targets() {
        let mut robot = robot(ControlType::Ee);
        robot.sim_mut().set_ik_solution(vec![0.0; 4]);
        let err = robot.set_action(&[0.0; 6]).unwrap_err();
        assert_eq!(
            error(err),
            ConvergingError::TargetLengthMismatch {
                expected: 6,
                found: 4
            }
        );
    }

    #[test]
    fn test_get_obs() {
        let mut robot = robot(ControlType::Joints);
        let (body, link) = (robot.body(), robot.ee_link());
        robot
            .sim_mut()
            .set_link_state(body, link, [0.4, 0.5, 0.6], [0.01, 0.02, 0.03])
            .unwrap();

        let obs = robot.get_obs().unwrap();
        assert_eq!(obs.len(), 12);
        assert_eq!(&obs[..6], &robot.get_joint_angles().unwrap()[..]);
        assert_eq!(&obs[6..], &[0.4, 0.5, 0.6, 0.01, 0.02, 0.03]);

        let obs = robot.observe().unwrap();
        assert_eq!(obs.joint_angles().len(), 6);
        assert_eq!(obs.ee_position().to_vec(), vec![0.4f32, 0.5, 0.6]);
        assert_eq!(obs.ee_velocity().to_vec(), vec![0.01f32, 0.02, 0.03]);
    }

    #[test]
    fn test_get_obs_three_joints() {
        let spec = MockBodySpec::default()
            .revolute_chain(3)
            .joint("tool", JointType::Fixed, "mirka_tool0");
        let config = ConvergingConfig::default()
            .joints(vec![JointConfig::from(JointSize::Size1); 3])
            .neutral_angles(vec![0.0; 3]);
        let mut rng = StdRng::seed_from_u64(42);
        let robot = Converging::build(MockSimulator::new(spec), &config, &mut rng).unwrap();

        assert_eq!(robot.joint_forces(), &[28.0, 28.0, 28.0]);
        assert_eq!(robot.action_space().dim(), 3);
        assert_eq!(robot.get_obs().unwrap().len(), 3 + 6);
    }
}
