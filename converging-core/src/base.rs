//! Core functionalities.
mod sim;
pub use sim::{BodyId, JointInfo, JointType, Simulator};
use std::fmt::Debug;

/// An observation emitted by a robot.
pub trait Obs: Clone + Debug {
    /// Returns the number of scalar elements in the observation.
    fn len(&self) -> usize;

    /// Returns `true` if the observation has no element.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An action applied to a robot.
pub trait Act: Clone + Debug {
    /// Returns the number of scalar elements in the action.
    fn len(&self) -> usize;

    /// Returns `true` if the action has no element.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
