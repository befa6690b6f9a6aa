use std::path::Path;

use crate::config::{EnsembleConfig, ModelKind};
use crate::error::ModelError;
use crate::models::gbdt::{DecisionTreeModel, GradientBoostedModel};
use crate::models::linear::LinearModel;
use crate::models::random_forest::RandomForestModel;
use crate::models::regressor_trait::RegressorModel;

/// Build an unfitted regressor of the given kind from the ensemble config.
pub fn build_model(kind: ModelKind, config: &EnsembleConfig) -> Box<dyn RegressorModel> {
    match kind {
        ModelKind::Linear => Box::new(LinearModel::new()),
        ModelKind::DecisionTree => Box::new(DecisionTreeModel::new(config.decision_tree.clone())),
        ModelKind::RandomForest => {
            Box::new(RandomForestModel::new(config.random_forest.clone()))
        }
        ModelKind::GradientBoosted => {
            Box::new(GradientBoostedModel::new(config.gradient_boosted.clone()))
        }
    }
}

/// Read a fitted regressor of the given kind from its JSON artifact.
pub fn load_model(kind: ModelKind, path: &Path) -> Result<Box<dyn RegressorModel>, ModelError> {
    let model: Box<dyn RegressorModel> = match kind {
        ModelKind::Linear => Box::new(LinearModel::load(path)?),
        ModelKind::DecisionTree => Box::new(DecisionTreeModel::load(path)?),
        ModelKind::RandomForest => Box::new(RandomForestModel::load(path)?),
        ModelKind::GradientBoosted => Box::new(GradientBoostedModel::load(path)?),
    };
    Ok(model)
}
