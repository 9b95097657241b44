//! The Converging arm for simulated reinforcement learning environments.
//!
//! [`Converging`] binds to an articulated body loaded into a [`Simulator`] and
//! translates action vectors into position commands on its revolute joints.
//!
//! ## Action
//!
//! Actions lie in the box `[-1, 1]^n`, where `n` is the number of revolute joints of
//! the body. How they are interpreted depends on [`ControlType`]:
//!
//! * [`ControlType::Joints`] - each element is an angular delta of a joint,
//!   scaled by `0.05` rad.
//! * [`ControlType::Ee`] - the first three elements are a displacement of the
//!   end-effector, scaled by `0.01` m and converted to joint angles with the inverse
//!   kinematics solver of the simulator.
//!
//! ## Observation
//!
//! The joint angles, followed by the position and the velocity of the end-effector.
//! Its length is `n + 6`.
//!
//! Here is an example with the in-process [`MockSimulator`].
//!
//! ```
//! use converging_core::mock::{MockBodySpec, MockSimulator};
//! use converging_core::Simulator as _;
//! use converging_robot::{ControlType, Converging, ConvergingConfig};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! # fn main() -> anyhow::Result<()> {
//! let sim = MockSimulator::new(MockBodySpec::converging());
//! let config = ConvergingConfig::default().control_type(ControlType::Joints);
//! let mut rng = StdRng::seed_from_u64(42);
//! let mut robot = Converging::build(sim, &config, &mut rng)?;
//!
//! robot.set_action(&[1.0; 6])?;
//! robot.sim_mut().step()?;
//! assert_eq!(robot.get_obs()?.len(), 12);
//! # Ok(())
//! # }
//! ```
//!
//! [`Simulator`]: converging_core::Simulator
//! [`MockSimulator`]: converging_core::mock::MockSimulator
mod act;
mod base;
mod config;
mod obs;
pub use act::ConvergingAct;
pub use base::Converging;
pub use config::{ControlType, ConvergingConfig, JointConfig, JointSize};
pub use obs::ConvergingObs;
