use serde::{Deserialize, Serialize};

use super::{check_width, InferenceError};

/// Linear model over raw inputs. Has no probability output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegressor {
    pub weights: Vec<f64>,
    pub intercept: f64,
}

impl LinearRegressor {
    pub fn predict(&self, inputs: &[f64]) -> Result<f64, InferenceError> {
        check_width(self.weights.len(), inputs)?;
        Ok(self
            .weights
            .iter()
            .zip(inputs)
            .fold(self.intercept, |acc, (weight, value)| acc + weight * value))
    }
}
