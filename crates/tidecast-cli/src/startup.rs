//! Building the ensemble and pipeline before anything is served.
use std::sync::Arc;

use anyhow::{Context, Result};

use tidecast_models::data_handling::load_or_synthesize;
use tidecast_models::{Ensemble, PredictionPipeline, PredictionResult};

use crate::config::{ResponseShape, ServeMode, ServerConfig};

/// Load or train the ensemble according to `config.mode`.
pub fn build_ensemble(config: &ServerConfig) -> Result<Ensemble> {
    match config.mode {
        ServeMode::Train => {
            let series = load_or_synthesize(&config.data_path, &config.loader);
            Ensemble::train(&series, &config.ensemble).context("Failed to train ensemble")
        }
        ServeMode::Pretrained => Ensemble::load(&config.models_dir).with_context(|| {
            format!(
                "Failed to load models from {}",
                config.models_dir.display()
            )
        }),
    }
}

pub fn build_pipeline(config: &ServerConfig) -> Result<PredictionPipeline> {
    let ensemble = build_ensemble(config)?;
    Ok(PredictionPipeline::new(Arc::new(ensemble), config.pipeline))
}

/// Fit the ensemble from the historical table and write its artifacts to
/// `config.models_dir`.
pub fn run_training(config: &ServerConfig) -> Result<()> {
    let series = load_or_synthesize(&config.data_path, &config.loader);
    let ensemble = Ensemble::train(&series, &config.ensemble).context("Failed to train ensemble")?;
    ensemble.save(&config.models_dir).with_context(|| {
        format!(
            "Failed to write models to {}",
            config.models_dir.display()
        )
    })?;
    Ok(())
}

/// Serialize a prediction in the given shape, keeping ensemble key order.
pub fn render(result: &PredictionResult, shape: ResponseShape) -> serde_json::Result<String> {
    match shape {
        ResponseShape::Series => serde_json::to_string(result),
        ResponseShape::Point => serde_json::to_string(&result.to_point()),
    }
}
