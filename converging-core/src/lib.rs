#![warn(missing_docs)]
//! Core interfaces for the Converging robot adapter.
//!
//! The physics engine is an external collaborator. This crate models it as the
//! narrow [`Simulator`] capability trait, so that a robot adapter depends only on
//! loading a body, reading and commanding joints, resolving links and solving
//! inverse kinematics. [`mock::MockSimulator`] implements the trait in-process
//! and is used for tests and demos where no physics engine is available.
pub mod error;
pub mod mock;

mod base;
pub use base::{Act, BodyId, JointInfo, JointType, Obs, Simulator};

mod config;
pub use config::Configurable;

mod space;
pub use space::BoxSpace;
