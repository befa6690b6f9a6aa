use std::path::Path;

use gbdt::config::Config;
use gbdt::decision_tree::{Data, DataVec};
use gbdt::gradient_boost::GBDT;
use serde::{Deserialize, Serialize};

use crate::config::{BoostingParams, ModelKind, TreeParams};
use crate::error::ModelError;
use crate::models::regressor_trait::RegressorModel;
use crate::models::utils::{ensure_finite, read_artifact, validate_training_set, write_artifact};

const SQUARED_ERROR: &str = "SquaredError";

/// Build a one-feature squared-error `gbdt` configuration.
pub(crate) fn regression_config(
    max_depth: u32,
    min_leaf_size: usize,
    iterations: usize,
    shrinkage: f32,
) -> Config {
    let mut config = Config::new();
    config.set_feature_size(1);
    config.set_max_depth(max_depth);
    config.set_min_leaf_size(min_leaf_size);
    config.set_iterations(iterations);
    config.set_shrinkage(shrinkage);
    config.set_loss(SQUARED_ERROR);
    config.set_debug(false);
    config
}

pub(crate) fn training_data(years: &[i32], values: &[f64]) -> DataVec {
    years
        .iter()
        .zip(values)
        .map(|(&year, &value)| Data::new_training_data(vec![year as f32], 1.0, value as f32, None))
        .collect()
}

pub(crate) fn test_data(years: &[i32]) -> DataVec {
    years
        .iter()
        .map(|&year| Data::new_test_data(vec![year as f32], None))
        .collect()
}

/// Fit a single regression tree: one boosting round at full shrinkage.
pub(crate) fn fit_single_tree(
    max_depth: u32,
    min_leaf_size: usize,
    train_x: &mut DataVec,
) -> GBDT {
    let config = regression_config(max_depth, min_leaf_size, 1, 1.0);
    let mut tree = GBDT::new(&config);
    tree.fit(train_x);
    tree
}

pub(crate) fn predict_years(model: &GBDT, years: &[i32]) -> Vec<f64> {
    model
        .predict(&test_data(years))
        .into_iter()
        .map(f64::from)
        .collect()
}

/// Single greedy regression tree.
#[derive(Serialize, Deserialize)]
pub struct DecisionTreeModel {
    params: TreeParams,
    model: Option<GBDT>,
}

impl DecisionTreeModel {
    pub fn new(params: TreeParams) -> Self {
        DecisionTreeModel {
            params,
            model: None,
        }
    }

    pub fn load(path: &Path) -> Result<Self, ModelError> {
        read_artifact(path)
    }
}

impl RegressorModel for DecisionTreeModel {
    fn fit(&mut self, years: &[i32], values: &[f64]) -> Result<(), ModelError> {
        validate_training_set(ModelKind::DecisionTree, years, values)?;
        let mut train_x = training_data(years, values);
        self.model = Some(fit_single_tree(
            self.params.max_depth,
            self.params.min_leaf_size,
            &mut train_x,
        ));
        Ok(())
    }

    fn predict(&self, years: &[i32]) -> Result<Vec<f64>, ModelError> {
        let model = self
            .model
            .as_ref()
            .ok_or(ModelError::NotFitted(ModelKind::DecisionTree))?;
        let predictions = predict_years(model, years);
        ensure_finite(ModelKind::DecisionTree, years, &predictions)?;
        Ok(predictions)
    }

    fn save(&self, path: &Path) -> Result<(), ModelError> {
        write_artifact(self, path)
    }

    fn kind(&self) -> ModelKind {
        ModelKind::DecisionTree
    }
}

/// Gradient-boosted regression trees (exposed as `xgboost` on the wire).
#[derive(Serialize, Deserialize)]
pub struct GradientBoostedModel {
    params: BoostingParams,
    model: Option<GBDT>,
}

impl GradientBoostedModel {
    pub fn new(params: BoostingParams) -> Self {
        GradientBoostedModel {
            params,
            model: None,
        }
    }

    pub fn load(path: &Path) -> Result<Self, ModelError> {
        read_artifact(path)
    }
}

impl RegressorModel for GradientBoostedModel {
    fn fit(&mut self, years: &[i32], values: &[f64]) -> Result<(), ModelError> {
        validate_training_set(ModelKind::GradientBoosted, years, values)?;

        let config = regression_config(
            self.params.max_depth,
            self.params.min_leaf_size,
            self.params.num_boost_round as usize,
            self.params.learning_rate,
        );
        let mut gbdt = GBDT::new(&config);
        let mut train_x = training_data(years, values);
        gbdt.fit(&mut train_x);

        log::debug!(
            "Fitted gradient-boosted model: {} rounds, depth {}, learning rate {}",
            self.params.num_boost_round,
            self.params.max_depth,
            self.params.learning_rate
        );
        self.model = Some(gbdt);
        Ok(())
    }

    fn predict(&self, years: &[i32]) -> Result<Vec<f64>, ModelError> {
        let model = self
            .model
            .as_ref()
            .ok_or(ModelError::NotFitted(ModelKind::GradientBoosted))?;
        let predictions = predict_years(model, years);
        ensure_finite(ModelKind::GradientBoosted, years, &predictions)?;
        Ok(predictions)
    }

    fn save(&self, path: &Path) -> Result<(), ModelError> {
        write_artifact(self, path)
    }

    fn kind(&self) -> ModelKind {
        ModelKind::GradientBoosted
    }
}
