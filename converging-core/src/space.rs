//! Box space of continuous values.
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A box `[low, high]^dim` of continuous values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxSpace {
    low: Vec<f32>,
    high: Vec<f32>,
}

impl BoxSpace {
    /// Creates a box with the same bounds on every dimension.
    pub fn new(low: f32, high: f32, dim: usize) -> Self {
        Self {
            low: vec![low; dim],
            high: vec![high; dim],
        }
    }

    /// Returns the number of dimensions.
    pub fn dim(&self) -> usize {
        self.low.len()
    }

    /// Lower bounds.
    pub fn low(&self) -> &[f32] {
        &self.low
    }

    /// Upper bounds.
    pub fn high(&self) -> &[f32] {
        &self.high
    }

    /// Returns `true` if `value` has the right length and lies within the bounds.
    pub fn contains(&self, value: &[f32]) -> bool {
        value.len() == self.dim()
            && value
                .iter()
                .zip(self.low.iter().zip(self.high.iter()))
                .all(|(v, (l, h))| *v >= *l && *v <= *h)
    }

    /// Returns a copy of `value` clamped element-wise to the bounds.
    ///
    /// Elements beyond the dimension of the box are dropped.
    pub fn clip(&self, value: &[f32]) -> Vec<f32> {
        value
            .iter()
            .zip(self.low.iter().zip(self.high.iter()))
            .map(|(v, (l, h))| v.clamp(*l, *h))
            .collect()
    }

    /// Samples a point uniformly from the box.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<f32> {
        self.low
            .iter()
            .zip(self.high.iter())
            .map(|(l, h)| if l < h { rng.gen_range(*l..*h) } else { *l })
            .collect()
    }
}
