use std::path::PathBuf;

use thiserror::Error;

use crate::config::ModelKind;

/// Failures while reading the historical sea-level table.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to open sea-level table {}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("malformed sea-level table: {0}")]
    Csv(#[from] csv::Error),
    #[error("column '{0}' not found in sea-level table header")]
    MissingColumn(String),
    #[error("sea-level table contains no usable rows")]
    Empty,
    #[error("reference year {0} not present in sea-level table")]
    MissingReferenceYear(i32),
}

/// Failures while fitting, querying or persisting a regressor.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("{0} model has not been fitted")]
    NotFitted(ModelKind),
    #[error("cannot fit {0} model on an empty training set")]
    EmptyTrainingSet(ModelKind),
    #[error("feature and target lengths differ ({features} vs {targets})")]
    LengthMismatch { features: usize, targets: usize },
    #[error("{kind} model produced a non-finite prediction for year {year}")]
    NonFinite { kind: ModelKind, year: i32 },
    #[error("failed to fit {kind} model: {message}")]
    Fit { kind: ModelKind, message: String },
    #[error("{kind} model panicked during inference: {message}")]
    Panicked { kind: ModelKind, message: String },
    #[error("failed to access model artifact {}", .path.display())]
    ArtifactIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("model artifact {} is not valid", .path.display())]
    ArtifactFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("ensemble is missing a {0} model")]
    MissingMember(ModelKind),
    #[error("ensemble contains more than one {0} model")]
    DuplicateMember(ModelKind),
}

/// Failures of a prediction request that are not scoped to a single model.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error("target year {target_year} is before the first window year {window_start}")]
    InvalidRange { target_year: i32, window_start: i32 },
    #[error("target year {target_year} is past the last supported year {max_target_year}")]
    BeyondHorizon { target_year: i32, max_target_year: i32 },
}
