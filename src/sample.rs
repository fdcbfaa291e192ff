//! One acquired device sample.

use std::ops::Deref;

/// Values for one acquisition instant: analog channels first, then digital
/// channels, each in selection order.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    values: Vec<f64>,
}

impl Sample {
    /// Wrap driver output.
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// The values as a vector, the shape the LSL outlet expects.
    pub fn as_vec(&self) -> &Vec<f64> {
        &self.values
    }

    /// Take the values.
    pub fn into_values(self) -> Vec<f64> {
        self.values
    }
}

impl Deref for Sample {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.values
    }
}

impl From<Vec<f64>> for Sample {
    fn from(values: Vec<f64>) -> Self {
        Self::new(values)
    }
}
