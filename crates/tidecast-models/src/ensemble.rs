//! The fixed set of four regressors queried for every projection.
use std::fs;
use std::path::Path;

use crate::config::{EnsembleConfig, ModelKind};
use crate::data_handling::{split_series, HistoricalPoint};
use crate::error::ModelError;
use crate::models::factory::{build_model, load_model};
use crate::models::regressor_trait::RegressorModel;

/// One fitted model per [`ModelKind`], kept in ensemble order.
///
/// An ensemble is built once at startup and then only read; share it behind
/// an `Arc`.
pub struct Ensemble {
    members: Vec<Box<dyn RegressorModel>>,
}

impl Ensemble {
    /// Assemble an ensemble from already-fitted models.
    ///
    /// Exactly one model of each kind is required.
    pub fn from_models(mut models: Vec<Box<dyn RegressorModel>>) -> Result<Self, ModelError> {
        models.sort_by_key(|m| m.kind());
        for pair in models.windows(2) {
            if pair[0].kind() == pair[1].kind() {
                return Err(ModelError::DuplicateMember(pair[0].kind()));
            }
        }
        for kind in ModelKind::ALL {
            if !models.iter().any(|m| m.kind() == kind) {
                return Err(ModelError::MissingMember(kind));
            }
        }
        Ok(Self { members: models })
    }

    /// Fit every member against the full historical series.
    pub fn train(series: &[HistoricalPoint], config: &EnsembleConfig) -> Result<Self, ModelError> {
        let (years, values) = split_series(series);
        log::info!("Training ensemble on {} yearly points", years.len());

        let mut members = Vec::with_capacity(ModelKind::ALL.len());
        for kind in ModelKind::ALL {
            let mut model = build_model(kind, config);
            model.fit(&years, &values)?;
            log::info!("Trained {} model", kind);
            members.push(model);
        }
        Self::from_models(members)
    }

    /// Load the four JSON artifacts written by [`Ensemble::save`].
    pub fn load<P: AsRef<Path>>(models_dir: P) -> Result<Self, ModelError> {
        let models_dir = models_dir.as_ref();
        log::info!("Loading models from {}", models_dir.display());

        let mut members = Vec::with_capacity(ModelKind::ALL.len());
        for kind in ModelKind::ALL {
            let path = models_dir.join(kind.artifact_file_name());
            members.push(load_model(kind, &path)?);
            log::debug!("Loaded {} model from {}", kind, path.display());
        }
        Self::from_models(members)
    }

    /// Write one JSON artifact per member into `models_dir`, creating it if needed.
    pub fn save<P: AsRef<Path>>(&self, models_dir: P) -> Result<(), ModelError> {
        let models_dir = models_dir.as_ref();
        fs::create_dir_all(models_dir).map_err(|source| ModelError::ArtifactIo {
            path: models_dir.to_path_buf(),
            source,
        })?;
        for model in &self.members {
            let path = models_dir.join(model.kind().artifact_file_name());
            model.save(&path)?;
            log::info!("Saved {} model to {}", model.kind(), path.display());
        }
        Ok(())
    }

    /// Members in ensemble order.
    pub fn members(&self) -> &[Box<dyn RegressorModel>] {
        &self.members
    }

    pub fn get(&self, kind: ModelKind) -> Option<&dyn RegressorModel> {
        self.members
            .iter()
            .find(|m| m.kind() == kind)
            .map(|m| &**m)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl std::fmt::Debug for Ensemble {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.members.iter().map(|m| m.kind()))
            .finish()
    }
}
