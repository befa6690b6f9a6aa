use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of regressors that make up the ensemble.
///
/// Declaration order is the ensemble order and therefore the order in which
/// models appear in every response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ModelKind {
    #[serde(rename = "linear")]
    Linear,
    #[serde(rename = "decision_tree")]
    DecisionTree,
    #[serde(rename = "random_forest")]
    RandomForest,
    #[serde(rename = "xgboost")]
    GradientBoosted,
}

impl ModelKind {
    pub const ALL: [ModelKind; 4] = [
        ModelKind::Linear,
        ModelKind::DecisionTree,
        ModelKind::RandomForest,
        ModelKind::GradientBoosted,
    ];

    /// Name used as the JSON key for this model's output. The gradient-boosted
    /// member keeps the `xgboost` key that existing web clients read.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Linear => "linear",
            ModelKind::DecisionTree => "decision_tree",
            ModelKind::RandomForest => "random_forest",
            ModelKind::GradientBoosted => "xgboost",
        }
    }

    /// File name of the serialized model inside a models directory.
    pub fn artifact_file_name(&self) -> String {
        format!("{}_model.json", self.as_str())
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "linear" => Ok(ModelKind::Linear),
            "decision_tree" | "decisiontree" => Ok(ModelKind::DecisionTree),
            "random_forest" | "randomforest" => Ok(ModelKind::RandomForest),
            "xgboost" | "gradient_boosted" | "gradientboosted" | "gbdt" => {
                Ok(ModelKind::GradientBoosted)
            }
            _ => Err(format!(
                "Unknown model type: {}. Expected one of linear, decision_tree, random_forest, xgboost",
                s
            )),
        }
    }
}

/// Hyper-parameters for the single decision tree.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TreeParams {
    pub max_depth: u32,
    pub min_leaf_size: usize,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: 5,
            min_leaf_size: 1,
        }
    }
}

/// Hyper-parameters for the bagged random forest.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ForestParams {
    pub n_trees: usize,
    pub max_depth: u32,
    pub min_leaf_size: usize,
    /// Seed for bootstrap resampling, so retraining is reproducible.
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 6,
            min_leaf_size: 1,
            seed: 42,
        }
    }
}

/// Hyper-parameters for gradient boosting.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct BoostingParams {
    pub learning_rate: f32,
    pub max_depth: u32,
    pub num_boost_round: u32,
    pub min_leaf_size: usize,
}

impl Default for BoostingParams {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            max_depth: 3,
            num_boost_round: 100,
            min_leaf_size: 1,
        }
    }
}

/// Training configuration for every member of the ensemble.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct EnsembleConfig {
    pub decision_tree: TreeParams,
    pub random_forest: ForestParams,
    pub gradient_boosted: BoostingParams,
}

/// Where to find the sea-level measurements in the historical table.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LoaderConfig {
    pub year_column: String,
    /// GIA-adjusted global mean sea level, in millimeters.
    pub value_column: String,
    pub reference_year: i32,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            year_column: "Year".to_string(),
            value_column: "GMSL_GIA".to_string(),
            reference_year: crate::data_handling::REFERENCE_YEAR,
        }
    }
}

/// Parameters of the prediction window.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct PipelineConfig {
    /// The year treated as "now". Acceleration only applies after it.
    pub present_year: i32,
    /// How many years before `present_year` the window starts.
    pub window_lookback: i32,
    /// How many years after `present_year` a target may lie.
    pub max_horizon: i32,
}

impl PipelineConfig {
    pub fn new(present_year: i32) -> Self {
        Self {
            present_year,
            ..Self::default()
        }
    }

    pub fn window_start(&self) -> i32 {
        self.present_year - self.window_lookback
    }

    pub fn max_target_year(&self) -> i32 {
        self.present_year.saturating_add(self.max_horizon)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            present_year: 2025,
            window_lookback: 10,
            max_horizon: 500,
        }
    }
}
