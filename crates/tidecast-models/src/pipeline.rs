//! From (sea, target year) to per-model projections.
//!
//! Every member of the ensemble is queried over the prediction window, then
//! each raw value is scaled by the sea's multiplier, steepened after the
//! present year by its acceleration factor, and given a model-specific
//! synthetic wiggle. A failing member only blanks out its own entry.
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::config::{ModelKind, PipelineConfig};
use crate::ensemble::Ensemble;
use crate::error::{ModelError, PipelineError};
use crate::models::regressor_trait::RegressorModel;
use crate::regions::{is_known_sea, parameters_for, RegionParameters};

/// Response key holding the window years. Never a model name.
pub const YEARS_KEY: &str = "years";

/// Synthetic variability for window index `i` and amplitude `a`.
pub type VariabilityFn = fn(usize, f64) -> f64;

fn smooth_variability(i: usize, a: f64) -> f64 {
    a * (0.5 * i as f64).sin()
}

fn stepped_variability(i: usize, a: f64) -> f64 {
    a * ((i % 4) as f64 - 1.5) / 1.5
}

fn phased_variability(i: usize, a: f64) -> f64 {
    0.8 * a * ((0.3 * i as f64 + 0.7).sin() - 0.7f64.sin())
}

fn beating_variability(i: usize, a: f64) -> f64 {
    a * (0.4 * i as f64).sin() * (0.25 * i as f64).cos()
}

/// Variability curve per model family.
pub const VARIABILITY: [(ModelKind, VariabilityFn); 4] = [
    (ModelKind::Linear, smooth_variability as VariabilityFn),
    (ModelKind::DecisionTree, stepped_variability as VariabilityFn),
    (ModelKind::RandomForest, phased_variability as VariabilityFn),
    (ModelKind::GradientBoosted, beating_variability as VariabilityFn),
];

pub fn variability_for(kind: ModelKind) -> VariabilityFn {
    VARIABILITY
        .iter()
        .find(|(k, _)| *k == kind)
        .map(|(_, f)| *f)
        .unwrap_or(smooth_variability)
}

/// Fractional steepening applied to `year`; exactly zero up to and including
/// `present_year`.
pub fn acceleration_effect(year: i32, present_year: i32, acceleration_factor: f64) -> f64 {
    let years_from_present = year - present_year;
    if years_from_present > 0 {
        (years_from_present as f64 / 10.0) * (acceleration_factor - 1.0)
    } else {
        0.0
    }
}

/// Apply the regional transform to one raw prediction.
pub fn adjust(
    raw: f64,
    year: i32,
    index: usize,
    kind: ModelKind,
    params: &RegionParameters,
    present_year: i32,
) -> f64 {
    let mut scaled = raw * params.multiplier;
    if year > present_year {
        scaled *= 1.0 + acceleration_effect(year, present_year, params.acceleration_factor);
    }
    scaled + variability_for(kind)(index, params.variability_amplitude)
}

/// Outcome of querying one model over the whole window.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelOutcome {
    Values(Vec<f64>),
    /// Placeholder text, always starting with `Error: `.
    Failed(String),
}

/// Per-model projections over the window, in ensemble order.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    pub outcomes: Vec<(ModelKind, ModelOutcome)>,
    pub years: Vec<i32>,
}

impl PredictionResult {
    pub fn get(&self, kind: ModelKind) -> Option<&ModelOutcome> {
        self.outcomes
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, outcome)| outcome)
    }

    /// Values for `kind`, or `None` if it failed or is absent.
    pub fn values(&self, kind: ModelKind) -> Option<&[f64]> {
        match self.get(kind) {
            Some(ModelOutcome::Values(values)) => Some(values),
            _ => None,
        }
    }

    /// Keep only the target-year (last) value of every model.
    pub fn to_point(&self) -> PointPrediction {
        let outcomes = self
            .outcomes
            .iter()
            .map(|(kind, outcome)| {
                let point = match outcome {
                    ModelOutcome::Values(values) => match values.last() {
                        Some(&v) => PointOutcome::Value(v),
                        None => PointOutcome::Failed("Error: empty prediction window".to_string()),
                    },
                    ModelOutcome::Failed(message) => PointOutcome::Failed(message.clone()),
                };
                (*kind, point)
            })
            .collect();
        PointPrediction {
            year: self.years.last().copied(),
            outcomes,
        }
    }
}

impl Serialize for PredictionResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.outcomes.len() + 1))?;
        for (kind, outcome) in &self.outcomes {
            match outcome {
                ModelOutcome::Values(values) => map.serialize_entry(kind.as_str(), values)?,
                ModelOutcome::Failed(message) => map.serialize_entry(kind.as_str(), &[message])?,
            }
        }
        map.serialize_entry(YEARS_KEY, &self.years)?;
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PointOutcome {
    Value(f64),
    Failed(String),
}

/// Single-year form of a [`PredictionResult`]: `{ "<model>": value | "Error: ..." }`.
#[derive(Debug, Clone, PartialEq)]
pub struct PointPrediction {
    pub year: Option<i32>,
    pub outcomes: Vec<(ModelKind, PointOutcome)>,
}

impl Serialize for PointPrediction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.outcomes.len()))?;
        for (kind, outcome) in &self.outcomes {
            match outcome {
                PointOutcome::Value(v) => map.serialize_entry(kind.as_str(), v)?,
                PointOutcome::Failed(message) => map.serialize_entry(kind.as_str(), message)?,
            }
        }
        map.end()
    }
}

/// Stateless prediction entry point shared by every serving mode.
#[derive(Debug, Clone)]
pub struct PredictionPipeline {
    ensemble: Arc<Ensemble>,
    config: PipelineConfig,
}

impl PredictionPipeline {
    pub fn new(ensemble: Arc<Ensemble>, config: PipelineConfig) -> Self {
        Self { ensemble, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn ensemble(&self) -> &Ensemble {
        &self.ensemble
    }

    /// Years from `present_year - window_lookback` through `target_year`.
    ///
    /// Targets past `present_year + max_horizon` are rejected before any
    /// allocation.
    pub fn window(&self, target_year: i32) -> Result<Vec<i32>, PipelineError> {
        let window_start = self.config.window_start();
        if target_year < window_start {
            return Err(PipelineError::InvalidRange {
                target_year,
                window_start,
            });
        }
        let max_target_year = self.config.max_target_year();
        if target_year > max_target_year {
            return Err(PipelineError::BeyondHorizon {
                target_year,
                max_target_year,
            });
        }
        Ok((window_start..=target_year).collect())
    }

    /// Project `sea_name` through `target_year` with every model.
    pub fn predict(&self, sea_name: &str, target_year: i32) -> Result<PredictionResult, PipelineError> {
        if !is_known_sea(sea_name) {
            log::debug!("Unknown sea '{}', using default region parameters", sea_name);
        }
        self.run(sea_name, parameters_for(sea_name), target_year)
    }

    /// Like [`predict`](Self::predict) with explicit region parameters.
    pub fn predict_with_parameters(
        &self,
        params: RegionParameters,
        target_year: i32,
    ) -> Result<PredictionResult, PipelineError> {
        self.run("<custom>", params, target_year)
    }

    /// Target-year value of every model.
    pub fn predict_point(&self, sea_name: &str, target_year: i32) -> Result<PointPrediction, PipelineError> {
        Ok(self.predict(sea_name, target_year)?.to_point())
    }

    fn run(
        &self,
        sea_name: &str,
        params: RegionParameters,
        target_year: i32,
    ) -> Result<PredictionResult, PipelineError> {
        let years = self.window(target_year)?;
        let present_year = self.config.present_year;

        let outcomes = self
            .ensemble
            .members()
            .iter()
            .map(|model| {
                let kind = model.kind();
                let outcome = match infer(&**model, &years) {
                    Ok(raw) => ModelOutcome::Values(
                        years
                            .iter()
                            .zip(raw)
                            .enumerate()
                            .map(|(i, (&year, raw))| adjust(raw, year, i, kind, &params, present_year))
                            .collect(),
                    ),
                    Err(e) => {
                        log::error!(
                            "Prediction error for {} model (sea: {}, year: {}): {}",
                            kind,
                            sea_name,
                            target_year,
                            e
                        );
                        ModelOutcome::Failed(format!("Error: {}", e))
                    }
                };
                (kind, outcome)
            })
            .collect();

        Ok(PredictionResult { outcomes, years })
    }
}

/// Query one model, turning panics and short outputs into errors.
fn infer(model: &dyn RegressorModel, years: &[i32]) -> Result<Vec<f64>, ModelError> {
    let kind = model.kind();
    let predictions = panic::catch_unwind(AssertUnwindSafe(|| model.predict(years)))
        .map_err(|payload| ModelError::Panicked {
            kind,
            message: panic_message(payload.as_ref()),
        })??;
    if predictions.len() != years.len() {
        return Err(ModelError::LengthMismatch {
            features: years.len(),
            targets: predictions.len(),
        });
    }
    Ok(predictions)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    struct ConstantRegressor {
        kind: ModelKind,
        value: f64,
    }

    impl RegressorModel for ConstantRegressor {
        fn fit(&mut self, _years: &[i32], _values: &[f64]) -> Result<(), ModelError> {
            Ok(())
        }
        fn predict(&self, years: &[i32]) -> Result<Vec<f64>, ModelError> {
            Ok(vec![self.value; years.len()])
        }
        fn save(&self, _path: &Path) -> Result<(), ModelError> {
            Ok(())
        }
        fn kind(&self) -> ModelKind {
            self.kind
        }
    }

    struct BrokenRegressor {
        kind: ModelKind,
        panics: bool,
    }

    impl RegressorModel for BrokenRegressor {
        fn fit(&mut self, _years: &[i32], _values: &[f64]) -> Result<(), ModelError> {
            Ok(())
        }
        fn predict(&self, _years: &[i32]) -> Result<Vec<f64>, ModelError> {
            if self.panics {
                panic!("tree index out of bounds");
            }
            Err(ModelError::NotFitted(self.kind))
        }
        fn save(&self, _path: &Path) -> Result<(), ModelError> {
            Ok(())
        }
        fn kind(&self) -> ModelKind {
            self.kind
        }
    }

    fn constant_pipeline(value: f64) -> PredictionPipeline {
        let models: Vec<Box<dyn RegressorModel>> = ModelKind::ALL
            .iter()
            .map(|&kind| Box::new(ConstantRegressor { kind, value }) as Box<dyn RegressorModel>)
            .collect();
        let ensemble = Ensemble::from_models(models).unwrap();
        PredictionPipeline::new(Arc::new(ensemble), PipelineConfig::default())
    }

    #[test]
    fn window_runs_from_lookback_to_target() {
        let pipeline = constant_pipeline(1.0);
        let window = pipeline.window(2030).unwrap();
        assert_eq!(window.first(), Some(&2015));
        assert_eq!(window.last(), Some(&2030));
        assert_eq!(window.len(), 16);
    }

    #[test]
    fn window_at_lookback_has_one_year() {
        let pipeline = constant_pipeline(1.0);
        assert_eq!(pipeline.window(2015).unwrap(), vec![2015]);
    }

    #[test]
    fn target_before_window_is_invalid() {
        let pipeline = constant_pipeline(1.0);
        assert_eq!(
            pipeline.predict("Arabian Sea", 2014),
            Err(PipelineError::InvalidRange {
                target_year: 2014,
                window_start: 2015
            })
        );
    }

    #[test]
    fn window_stops_at_horizon() {
        let pipeline = constant_pipeline(1.0);
        let window = pipeline.window(2525).unwrap();
        assert_eq!(window.len(), 511);
        assert_eq!(window.last(), Some(&2525));

        assert_eq!(
            pipeline.window(2526),
            Err(PipelineError::BeyondHorizon {
                target_year: 2526,
                max_target_year: 2525
            })
        );
    }

    #[test]
    fn largest_year_is_rejected_without_allocating() {
        let pipeline = constant_pipeline(1.0);
        assert_eq!(
            pipeline.predict("Arabian Sea", i32::MAX),
            Err(PipelineError::BeyondHorizon {
                target_year: i32::MAX,
                max_target_year: 2525
            })
        );
    }

    #[test]
    fn horizon_saturates_instead_of_overflowing() {
        let config = PipelineConfig {
            max_horizon: i32::MAX,
            ..PipelineConfig::default()
        };
        assert_eq!(config.max_target_year(), i32::MAX);
    }

    #[test]
    fn acceleration_is_zero_up_to_present() {
        for year in 2015..=2025 {
            assert_eq!(acceleration_effect(year, 2025, 1.05), 0.0);
        }
        let mut previous = 0.0;
        for year in 2026..=2040 {
            let effect = acceleration_effect(year, 2025, 1.05);
            assert!(effect > previous);
            previous = effect;
        }
        // Deceleration runs the other way.
        assert!(acceleration_effect(2030, 2025, 0.9) < acceleration_effect(2026, 2025, 0.9));
    }

    #[test]
    fn zero_amplitude_removes_variability() {
        let pipeline = constant_pipeline(10.0);
        let params = RegionParameters::new(1.2, 0.45, 1.08).without_variability();
        let result = pipeline.predict_with_parameters(params, 2040).unwrap();

        for (kind, _) in &result.outcomes {
            let values = result.values(*kind).unwrap();
            for (&year, &value) in result.years.iter().zip(values) {
                let expected = 10.0 * 1.2 * (1.0 + acceleration_effect(year, 2025, 1.08));
                assert_eq!(value, expected, "{kind} {year}");
            }
        }
    }

    #[test]
    fn variability_is_bounded_and_moves() {
        for (kind, f) in VARIABILITY {
            for i in 0..50 {
                assert_eq!(f(i, 0.0), 0.0, "{kind}");
                assert!(f(i, 0.5).abs() <= 2.0 * 0.5, "{kind}");
                assert_ne!(f(i, 0.5), f(i + 1, 0.5), "{kind} at {i}");
            }
        }
    }

    #[test]
    fn every_model_kind_has_a_curve() {
        for kind in ModelKind::ALL {
            assert!(VARIABILITY.iter().any(|(k, _)| *k == kind));
        }
        assert_eq!(variability_for(ModelKind::Linear)(11, 0.3), 0.3 * 5.5f64.sin());
    }

    #[test]
    fn years_match_value_lengths() {
        let result = constant_pipeline(3.0).predict("Coral Sea", 2050).unwrap();
        for kind in ModelKind::ALL {
            assert_eq!(result.values(kind).unwrap().len(), result.years.len());
        }
    }

    #[test]
    fn failing_models_are_isolated() {
        let models: Vec<Box<dyn RegressorModel>> = vec![
            Box::new(ConstantRegressor {
                kind: ModelKind::Linear,
                value: 1.0,
            }),
            Box::new(BrokenRegressor {
                kind: ModelKind::DecisionTree,
                panics: false,
            }),
            Box::new(BrokenRegressor {
                kind: ModelKind::RandomForest,
                panics: true,
            }),
            Box::new(ConstantRegressor {
                kind: ModelKind::GradientBoosted,
                value: 1.0,
            }),
        ];
        let pipeline = PredictionPipeline::new(
            Arc::new(Ensemble::from_models(models).unwrap()),
            PipelineConfig::default(),
        );

        let result = pipeline.predict("Black Sea", 2030).unwrap();
        assert!(result.values(ModelKind::Linear).is_some());
        assert!(result.values(ModelKind::GradientBoosted).is_some());

        match result.get(ModelKind::DecisionTree) {
            Some(ModelOutcome::Failed(message)) => assert!(message.starts_with("Error: ")),
            other => panic!("expected failure, got {:?}", other),
        }
        match result.get(ModelKind::RandomForest) {
            Some(ModelOutcome::Failed(message)) => {
                assert!(message.contains("tree index out of bounds"), "{message}")
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn serializes_in_ensemble_order_with_years_last() {
        let result = constant_pipeline(0.0).predict("Arabian Sea", 2016).unwrap();
        let json = serde_json::to_string(&result).unwrap();

        let keys = [
            "\"linear\"",
            "\"decision_tree\"",
            "\"random_forest\"",
            "\"xgboost\"",
            "\"years\"",
        ];
        let positions: Vec<usize> = keys
            .iter()
            .map(|key| json.find(key).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{json}");
        assert!(json.ends_with("\"years\":[2015,2016]}"), "{json}");
    }

    #[test]
    fn failed_entry_serializes_as_single_string_list() {
        let result = PredictionResult {
            outcomes: vec![(ModelKind::Linear, ModelOutcome::Failed("Error: boom".to_string()))],
            years: vec![2015],
        };
        assert_eq!(
            serde_json::to_string(&result).unwrap(),
            r#"{"linear":["Error: boom"],"years":[2015]}"#
        );
    }

    #[test]
    fn point_form_keeps_target_year_value() {
        let pipeline = constant_pipeline(10.0);
        let series = pipeline.predict("Arabian Sea", 2030).unwrap();
        let point = pipeline.predict_point("Arabian Sea", 2030).unwrap();

        assert_eq!(point.year, Some(2030));
        for (kind, outcome) in &point.outcomes {
            let last = *series.values(*kind).unwrap().last().unwrap();
            assert_eq!(outcome, &PointOutcome::Value(last));
        }

        let json = serde_json::to_value(&point).unwrap();
        assert!(json.get("years").is_none());
        assert!(json["xgboost"].is_f64());
    }
}
