use tidecast_models::config::{EnsembleConfig, ForestParams, ModelKind};
use tidecast_models::data_handling::{split_series, synthetic_series};
use tidecast_models::models::factory;

fn small_config() -> EnsembleConfig {
    EnsembleConfig {
        random_forest: ForestParams {
            n_trees: 8,
            ..ForestParams::default()
        },
        ..EnsembleConfig::default()
    }
}

#[test]
fn test_factory_builds_fits_and_predicts_every_kind() {
    let (years, values) = split_series(&synthetic_series());
    let query: Vec<i32> = (2015..=2030).collect();

    for kind in ModelKind::ALL {
        let mut model = factory::build_model(kind, &small_config());
        assert_eq!(model.kind(), kind);

        model.fit(&years, &values).expect("fit failed");
        let predictions = model.predict(&query).expect("predict failed");
        assert_eq!(predictions.len(), query.len(), "{kind}");
        assert!(predictions.iter().all(|p| p.is_finite()), "{kind}");
    }
}

#[test]
fn test_factory_models_start_unfitted() {
    for kind in ModelKind::ALL {
        let model = factory::build_model(kind, &EnsembleConfig::default());
        assert!(model.predict(&[2025]).is_err(), "{kind}");
    }
}

#[test]
fn test_load_model_reads_saved_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let (years, values) = split_series(&synthetic_series());

    let mut model = factory::build_model(ModelKind::DecisionTree, &small_config());
    model.fit(&years, &values).unwrap();
    let path = dir.path().join(ModelKind::DecisionTree.artifact_file_name());
    model.save(&path).unwrap();

    let loaded = factory::load_model(ModelKind::DecisionTree, &path).unwrap();
    assert_eq!(loaded.kind(), ModelKind::DecisionTree);
    assert_eq!(
        loaded.predict(&[2000, 2020, 2040]).unwrap(),
        model.predict(&[2000, 2020, 2040]).unwrap()
    );
}
