use serde::{Deserialize, Serialize};

use super::{check_width, InferenceError};

/// Gradient descent settings for [`LogisticClassifier::fit`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogisticFitConfig {
    pub learning_rate: f64,
    pub epochs: usize,
    pub l2_penalty: f64,
}

impl Default for LogisticFitConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            epochs: 800,
            l2_penalty: 0.001,
        }
    }
}

/// Binary logistic regression over standardized inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticClassifier {
    pub means: Vec<f64>,
    /// Per-column standard deviation; constant columns are stored as `1.0`.
    pub scales: Vec<f64>,
    pub weights: Vec<f64>,
    pub intercept: f64,
}

impl LogisticClassifier {
    /// Full-batch gradient descent from zero weights, so identical inputs give identical models.
    ///
    /// `rows` must be non-empty and rectangular; `labels` holds one 0/1 label per row.
    pub fn fit(rows: &[Vec<f64>], labels: &[f64], config: LogisticFitConfig) -> Self {
        let width = rows.first().map(Vec::len).unwrap_or(0);
        let n = rows.len().max(1) as f64;

        let means: Vec<f64> = (0..width)
            .map(|col| rows.iter().map(|row| row[col]).sum::<f64>() / n)
            .collect();
        let scales: Vec<f64> = (0..width)
            .map(|col| {
                let variance = rows
                    .iter()
                    .map(|row| (row[col] - means[col]).powi(2))
                    .sum::<f64>()
                    / n;
                let std = variance.sqrt();
                if std > f64::EPSILON {
                    std
                } else {
                    1.0
                }
            })
            .collect();

        let standardized: Vec<Vec<f64>> = rows
            .iter()
            .map(|row| standardize(row, &means, &scales))
            .collect();

        let mut weights = vec![0.0; width];
        let mut intercept = 0.0;
        for _ in 0..config.epochs {
            let mut grad_w = vec![0.0; width];
            let mut grad_b = 0.0;
            for (row, label) in standardized.iter().zip(labels) {
                let error = sigmoid(linear(&weights, intercept, row)) - label;
                for (grad, value) in grad_w.iter_mut().zip(row) {
                    *grad += error * value;
                }
                grad_b += error;
            }
            for (weight, grad) in weights.iter_mut().zip(&grad_w) {
                *weight -= config.learning_rate * (grad / n + config.l2_penalty * *weight);
            }
            intercept -= config.learning_rate * grad_b / n;
        }

        Self {
            means,
            scales,
            weights,
            intercept,
        }
    }

    pub fn predict_proba(&self, inputs: &[f64]) -> Result<f64, InferenceError> {
        check_width(self.weights.len(), inputs)?;
        let row = standardize(inputs, &self.means, &self.scales);
        Ok(sigmoid(linear(&self.weights, self.intercept, &row)))
    }
}

fn standardize(row: &[f64], means: &[f64], scales: &[f64]) -> Vec<f64> {
    row.iter()
        .zip(means.iter().zip(scales))
        .map(|(value, (mean, scale))| (value - mean) / scale)
        .collect()
}

fn linear(weights: &[f64], intercept: f64, row: &[f64]) -> f64 {
    weights
        .iter()
        .zip(row)
        .fold(intercept, |acc, (weight, value)| acc + weight * value)
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}
