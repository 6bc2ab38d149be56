use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// ResultsTable – per-model scores, column-oriented
// ---------------------------------------------------------------------------

/// Regression scores of several models, one entry per model in each column.
///
/// Deserialises from the column-oriented mapping the notebooks build:
///
/// ```json
/// { "model": ["RF", "SVR"], "r2": [0.91, 0.88], "mae": [0.94, 1.12],
///   "rmse": [1.3, 1.5], "potential": ["high", "medium"] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultsTable {
    pub model: Vec<String>,
    /// Coefficient of determination as a fraction (1.0 = perfect).
    pub r2: Vec<f64>,
    pub mae: Vec<f64>,
    pub rmse: Vec<f64>,
    /// Free-text judgement of the model's potential.
    pub potential: Vec<String>,
}

impl ResultsTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the column-oriented JSON form.
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Number of models, taken from the `model` column.
    pub fn len(&self) -> usize {
        self.model.len()
    }

    pub fn is_empty(&self) -> bool {
        self.model.is_empty()
    }

    /// Check that every column has one entry per model.
    pub fn validate(&self) -> Result<()> {
        let n = self.model.len();
        let columns = [
            ("r2", self.r2.len()),
            ("mae", self.mae.len()),
            ("rmse", self.rmse.len()),
            ("potential", self.potential.len()),
        ];
        for (name, len) in columns {
            if len != n {
                return Err(Error::shape(format!("results column '{name}'"), n, len));
            }
        }
        Ok(())
    }

    /// Append one model's scores.
    pub fn push(&mut self, model: &str, r2: f64, mae: f64, rmse: f64, potential: &str) {
        self.model.push(model.to_string());
        self.r2.push(r2);
        self.mae.push(mae);
        self.rmse.push(rmse);
        self.potential.push(potential.to_string());
    }

    /// Score `pred` against `truth` and append the result.
    pub fn push_evaluation(
        &mut self,
        model: &str,
        truth: &[f64],
        pred: &[f64],
        potential: &str,
    ) -> Result<()> {
        let r2 = r2_score(truth, pred)?;
        let mae = mean_absolute_error(truth, pred)?;
        let rmse = root_mean_squared_error(truth, pred)?;
        self.push(model, r2, mae, rmse, potential);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

fn check_pair(truth: &[f64], pred: &[f64]) -> Result<()> {
    if truth.len() != pred.len() {
        return Err(Error::shape("truth vs prediction", truth.len(), pred.len()));
    }
    if truth.is_empty() {
        return Err(Error::EmptyInput("metric over zero samples"));
    }
    Ok(())
}

/// Mean absolute error.
pub fn mean_absolute_error(truth: &[f64], pred: &[f64]) -> Result<f64> {
    check_pair(truth, pred)?;
    let sum: f64 = truth.iter().zip(pred).map(|(t, p)| (t - p).abs()).sum();
    Ok(sum / truth.len() as f64)
}

/// Root of the mean squared error, in target units.
pub fn root_mean_squared_error(truth: &[f64], pred: &[f64]) -> Result<f64> {
    check_pair(truth, pred)?;
    let sum: f64 = truth.iter().zip(pred).map(|(t, p)| (t - p).powi(2)).sum();
    Ok((sum / truth.len() as f64).sqrt())
}

/// Coefficient of determination `1 - SS_res / SS_tot`.
///
/// A constant `truth` gives 1.0 for a perfect fit and 0.0 otherwise.
pub fn r2_score(truth: &[f64], pred: &[f64]) -> Result<f64> {
    check_pair(truth, pred)?;
    let mean = truth.iter().sum::<f64>() / truth.len() as f64;
    let ss_res: f64 = truth.iter().zip(pred).map(|(t, p)| (t - p).powi(2)).sum();
    let ss_tot: f64 = truth.iter().map(|t| (t - mean).powi(2)).sum();
    if ss_tot == 0.0 {
        return Ok(if ss_res == 0.0 { 1.0 } else { 0.0 });
    }
    Ok(1.0 - ss_res / ss_tot)
}
