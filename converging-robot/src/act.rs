use converging_core::Act;
use ndarray::Array1;

/// Action of [`Converging`](crate::Converging).
///
/// Joint deltas or an end-effector displacement, depending on
/// [`ControlType`](crate::ControlType).
#[derive(Clone, Debug, PartialEq)]
pub struct ConvergingAct {
    /// Stores an action.
    pub act: Array1<f32>,
}

impl ConvergingAct {
    /// Constructs an action.
    pub fn new(act: Array1<f32>) -> Self {
        Self { act }
    }
}

impl From<Vec<f32>> for ConvergingAct {
    fn from(v: Vec<f32>) -> Self {
        Self::new(Array1::from(v))
    }
}

impl Act for ConvergingAct {
    fn len(&self) -> usize {
        self.act.len()
    }
}
