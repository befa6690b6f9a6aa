use std::path::Path;

use linfa::traits::Fit;
use linfa::Dataset;
use linfa_linear::LinearRegression;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::config::ModelKind;
use crate::error::ModelError;
use crate::models::regressor_trait::RegressorModel;
use crate::models::utils::{ensure_finite, read_artifact, validate_training_set, write_artifact};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearCoefficients {
    pub slope: f64,
    pub intercept: f64,
}

/// Ordinary least squares trend over years.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinearModel {
    coefficients: Option<LinearCoefficients>,
}

impl LinearModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_coefficients(slope: f64, intercept: f64) -> Self {
        Self {
            coefficients: Some(LinearCoefficients { slope, intercept }),
        }
    }

    pub fn coefficients(&self) -> Option<LinearCoefficients> {
        self.coefficients
    }

    pub fn load(path: &Path) -> Result<Self, ModelError> {
        read_artifact(path)
    }
}

impl RegressorModel for LinearModel {
    fn fit(&mut self, years: &[i32], values: &[f64]) -> Result<(), ModelError> {
        validate_training_set(ModelKind::Linear, years, values)?;

        let records = Array2::from_shape_vec(
            (years.len(), 1),
            years.iter().map(|&y| y as f64).collect(),
        )
        .map_err(|e| ModelError::Fit {
            kind: ModelKind::Linear,
            message: e.to_string(),
        })?;
        let targets = Array1::from_vec(values.to_vec());
        let dataset = Dataset::new(records, targets);

        let fitted = LinearRegression::new()
            .fit(&dataset)
            .map_err(|e| ModelError::Fit {
                kind: ModelKind::Linear,
                message: e.to_string(),
            })?;

        let coefficients = LinearCoefficients {
            slope: fitted.params()[0],
            intercept: fitted.intercept(),
        };
        log::debug!(
            "Linear trend: {:.4} mm/year, intercept {:.4}",
            coefficients.slope,
            coefficients.intercept
        );
        self.coefficients = Some(coefficients);
        Ok(())
    }

    fn predict(&self, years: &[i32]) -> Result<Vec<f64>, ModelError> {
        let coefficients = self
            .coefficients
            .ok_or(ModelError::NotFitted(ModelKind::Linear))?;
        let predictions: Vec<f64> = years
            .iter()
            .map(|&y| coefficients.slope * y as f64 + coefficients.intercept)
            .collect();
        ensure_finite(ModelKind::Linear, years, &predictions)?;
        Ok(predictions)
    }

    fn save(&self, path: &Path) -> Result<(), ModelError> {
        write_artifact(self, path)
    }

    fn kind(&self) -> ModelKind {
        ModelKind::Linear
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovers_exact_trend() {
        let years: Vec<i32> = (1993..=2021).collect();
        let values: Vec<f64> = (0..years.len()).map(|i| i as f64 * 3.4).collect();

        let mut model = LinearModel::new();
        model.fit(&years, &values).unwrap();

        let coefficients = model.coefficients().unwrap();
        assert!((coefficients.slope - 3.4).abs() < 1e-6, "{:?}", coefficients);

        let predictions = model.predict(&[1993, 2030]).unwrap();
        assert!(predictions[0].abs() < 1e-4);
        assert!((predictions[1] - 37.0 * 3.4).abs() < 1e-4);
    }

    #[test]
    fn unfitted_model_refuses_to_predict() {
        let model = LinearModel::new();
        assert!(matches!(
            model.predict(&[2025]),
            Err(ModelError::NotFitted(ModelKind::Linear))
        ));
    }

    #[test]
    fn predicts_from_stored_coefficients() {
        let model = LinearModel::from_coefficients(2.0, -4000.0);
        assert_eq!(model.predict(&[2000, 2001]).unwrap(), vec![0.0, 2.0]);
    }
}
