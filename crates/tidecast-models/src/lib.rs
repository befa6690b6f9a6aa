//! tidecast-models: regression ensemble and projection pipeline for
//! regional sea-level rise.
//!
//! The crate loads (or synthesizes) a yearly global-mean sea-level series,
//! fits four scalar regressors against it, and turns their raw predictions
//! into per-sea projections by applying a fixed table of regional
//! adjustments.
//!
//! Regressor internals come from `gbdt` and `linfa-linear`; everything here
//! is the glue around them: data handling, artifacts, and the post-adjustment
//! pipeline shared by every serving mode.
pub mod config;
pub mod data_handling;
pub mod ensemble;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod regions;

pub use config::{EnsembleConfig, LoaderConfig, ModelKind, PipelineConfig};
pub use data_handling::HistoricalPoint;
pub use ensemble::Ensemble;
pub use pipeline::{PredictionPipeline, PredictionResult};
pub use regions::{parameters_for, RegionParameters};
