use std::path::Path;

use crate::config::ModelKind;
use crate::error::ModelError;

/// A scalar regressor over calendar years.
///
/// Every member of the ensemble takes a single feature (the year) and
/// returns one value per year: relative sea-level rise in millimeters from
/// the reference year. Models are fitted once and then only read, so
/// implementations must be shareable across request threads.
pub trait RegressorModel: Send + Sync {
    /// Fit against `values[i]` observed at `years[i]`.
    fn fit(&mut self, years: &[i32], values: &[f64]) -> Result<(), ModelError>;

    /// Predict one value per year, in the order given.
    fn predict(&self, years: &[i32]) -> Result<Vec<f64>, ModelError>;

    /// Write the fitted model as a JSON artifact.
    fn save(&self, path: &Path) -> Result<(), ModelError>;

    fn kind(&self) -> ModelKind;
}
