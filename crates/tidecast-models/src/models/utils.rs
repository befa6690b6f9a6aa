use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ModelKind;
use crate::error::ModelError;

/// Reject training sets the regressors cannot work with.
pub fn validate_training_set(
    kind: ModelKind,
    years: &[i32],
    values: &[f64],
) -> Result<(), ModelError> {
    if years.len() != values.len() {
        return Err(ModelError::LengthMismatch {
            features: years.len(),
            targets: values.len(),
        });
    }
    if years.is_empty() {
        return Err(ModelError::EmptyTrainingSet(kind));
    }
    Ok(())
}

/// Fail on the first NaN or infinite prediction.
pub fn ensure_finite(kind: ModelKind, years: &[i32], predictions: &[f64]) -> Result<(), ModelError> {
    match predictions.iter().position(|p| !p.is_finite()) {
        Some(i) => Err(ModelError::NonFinite {
            kind,
            year: years.get(i).copied().unwrap_or_default(),
        }),
        None => Ok(()),
    }
}

pub fn write_artifact<T: Serialize>(value: &T, path: &Path) -> Result<(), ModelError> {
    let file = File::create(path).map_err(|source| ModelError::ArtifactIo {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::to_writer(BufWriter::new(file), value).map_err(|source| {
        ModelError::ArtifactFormat {
            path: path.to_path_buf(),
            source,
        }
    })
}

pub fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T, ModelError> {
    let file = File::open(path).map_err(|source| ModelError::ArtifactIo {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| ModelError::ArtifactFormat {
        path: path.to_path_buf(),
        source,
    })
}
