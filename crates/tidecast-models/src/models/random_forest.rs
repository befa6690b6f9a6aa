use std::path::Path;

use gbdt::decision_tree::DataVec;
use gbdt::gradient_boost::GBDT;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::config::{ForestParams, ModelKind};
use crate::error::ModelError;
use crate::models::gbdt::{fit_single_tree, predict_years, training_data};
use crate::models::regressor_trait::RegressorModel;
use crate::models::utils::{ensure_finite, read_artifact, validate_training_set, write_artifact};

/// Bagged regression trees; the prediction is the mean over trees.
#[derive(Serialize, Deserialize)]
pub struct RandomForestModel {
    params: ForestParams,
    trees: Vec<GBDT>,
}

impl RandomForestModel {
    pub fn new(params: ForestParams) -> Self {
        RandomForestModel {
            params,
            trees: Vec::new(),
        }
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn load(path: &Path) -> Result<Self, ModelError> {
        read_artifact(path)
    }
}

impl RegressorModel for RandomForestModel {
    fn fit(&mut self, years: &[i32], values: &[f64]) -> Result<(), ModelError> {
        validate_training_set(ModelKind::RandomForest, years, values)?;
        if self.params.n_trees == 0 {
            return Err(ModelError::Fit {
                kind: ModelKind::RandomForest,
                message: "n_trees must be at least 1".to_string(),
            });
        }

        let all = training_data(years, values);
        let n = all.len();
        let mut rng = StdRng::seed_from_u64(self.params.seed);

        let mut trees = Vec::with_capacity(self.params.n_trees);
        for _ in 0..self.params.n_trees {
            // Bootstrap resample with replacement.
            let mut sample: DataVec = (0..n).map(|_| all[rng.gen_range(0..n)].clone()).collect();
            trees.push(fit_single_tree(
                self.params.max_depth,
                self.params.min_leaf_size,
                &mut sample,
            ));
        }

        log::debug!(
            "Fitted random forest: {} trees, depth {}, seed {}",
            trees.len(),
            self.params.max_depth,
            self.params.seed
        );
        self.trees = trees;
        Ok(())
    }

    fn predict(&self, years: &[i32]) -> Result<Vec<f64>, ModelError> {
        if self.trees.is_empty() {
            return Err(ModelError::NotFitted(ModelKind::RandomForest));
        }

        let mut sums = vec![0.0f64; years.len()];
        for tree in &self.trees {
            for (sum, p) in sums.iter_mut().zip(predict_years(tree, years)) {
                *sum += p;
            }
        }
        let n_trees = self.trees.len() as f64;
        let predictions: Vec<f64> = sums.into_iter().map(|s| s / n_trees).collect();

        ensure_finite(ModelKind::RandomForest, years, &predictions)?;
        Ok(predictions)
    }

    fn save(&self, path: &Path) -> Result<(), ModelError> {
        write_artifact(self, path)
    }

    fn kind(&self) -> ModelKind {
        ModelKind::RandomForest
    }
}
