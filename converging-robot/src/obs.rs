use converging_core::Obs;
use ndarray::{s, Array1, ArrayView1};

/// Observation of [`Converging`](crate::Converging).
///
/// Joint angles, followed by the position and the velocity of the end-effector.
#[derive(Clone, Debug, PartialEq)]
pub struct ConvergingObs(pub Array1<f32>);

impl ConvergingObs {
    /// Joint angles.
    pub fn joint_angles(&self) -> ArrayView1<f32> {
        let n = self.0.len() - 6;
        self.0.slice(s![..n])
    }

    /// End-effector position.
    pub fn ee_position(&self) -> ArrayView1<f32> {
        let n = self.0.len() - 6;
        self.0.slice(s![n..n + 3])
    }

    /// End-effector velocity.
    pub fn ee_velocity(&self) -> ArrayView1<f32> {
        let n = self.0.len() - 3;
        self.0.slice(s![n..])
    }
}

impl From<Vec<f64>> for ConvergingObs {
    fn from(v: Vec<f64>) -> Self {
        Self(v.into_iter().map(|x| x as f32).collect())
    }
}

impl Obs for ConvergingObs {
    fn len(&self) -> usize {
        self.0.len()
    }
}
