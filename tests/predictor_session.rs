mod support;

use std::io::Cursor;

use iris_classifier::dataset::load_csv;
use iris_classifier::ml::{FittedModel, TrainDataset, TrainedModelArtifact, TreeBackend};
use iris_classifier::pipeline::{PrepareOptions, TrainOptions, run_preparation, run_training};
use iris_classifier::predictor::{
    EXAMPLES, LoadedPredictor, Session, SessionState, load_predictor,
};
use iris_classifier::species::SpeciesMap;
use support::workspace::{Workspace, shipped_dataset};

fn full_dataset_predictor() -> LoadedPredictor {
    let species = SpeciesMap::iris();
    let data = load_csv(&shipped_dataset())
        .expect("load iris.csv")
        .encode_species(&species)
        .expect("encode");
    let model = FittedModel::fit(
        TreeBackend::Cart,
        &TrainDataset {
            x: &data.x,
            y: &data.y,
        },
        42,
    )
    .expect("fit");
    LoadedPredictor::new(model, species)
}

fn transcript(predictor: &LoadedPredictor, input: &str) -> String {
    let mut out = Vec::new();
    Session::new(predictor, Cursor::new(input.to_string()), &mut out)
        .run()
        .expect("session");
    String::from_utf8(out).expect("utf8")
}

#[test]
fn advertised_examples_classify_as_documented() {
    let predictor = full_dataset_predictor();
    for (name, measurements) in EXAMPLES {
        let label = predictor.model.predict_one(&measurements);
        assert_eq!(predictor.species.display_name(label), name, "{measurements:?}");
    }
}

#[test]
fn pipeline_trained_models_classify_the_examples() {
    for backend in [TreeBackend::Cart, TreeBackend::Linfa] {
        let ws = Workspace::new();
        run_preparation(
            &PrepareOptions {
                dataset: ws.config.paths.dataset.clone(),
                output: ws.config.paths.prepared.clone(),
                split: ws.config.split.clone(),
            },
            &mut std::io::sink(),
        )
        .expect("prepare");
        run_training(
            &TrainOptions {
                prepared: ws.config.paths.prepared.clone(),
                model_out: ws.config.paths.model.clone(),
                backend,
                seed: ws.config.training.seed,
            },
            &mut std::io::sink(),
        )
        .expect("train");

        let predictor =
            load_predictor(&ws.config.paths.model, &ws.config.paths.prepared).expect("load");
        for (name, measurements) in EXAMPLES {
            let label = predictor.model.predict_one(&measurements);
            assert_eq!(
                predictor.species.display_name(label),
                name,
                "{backend} on {measurements:?}"
            );
        }
    }
}

#[test]
fn examples_through_the_console() {
    let predictor = full_dataset_predictor();
    let text = transcript(
        &predictor,
        "5.1\n3.5\n1.4\n0.2\ny\n6.0\n2.7\n5.1\n1.6\nyes\n7.2\n3.0\n5.8\n1.6\nn\n",
    );
    let predicted: Vec<&str> = text
        .lines()
        .filter_map(|line| line.strip_prefix("Predicted species: "))
        .collect();
    assert_eq!(predicted, ["Setosa", "Versicolor", "Virginica"]);
    assert!(text.contains("Probabilities (confidence):"));
    assert!(text.trim_end().ends_with("Exiting..."));
}

#[test]
fn non_numeric_entry_is_rejected_without_classifying() {
    let predictor = full_dataset_predictor();
    let mut session = Session::new(&predictor, Cursor::new("abc\n"), Vec::new());
    session.step().expect("step");
    assert_eq!(session.state(), &SessionState::AwaitingMeasurement);

    let text = transcript(&predictor, "5.1\nabc\n");
    assert!(text.contains("Invalid value"));
    assert!(!text.contains("Predicted species"));
}

#[test]
fn end_of_input_terminates_at_every_prompt() {
    let predictor = full_dataset_predictor();
    let inputs = ["", "5.1\n", "5.1\n3.5\n", "5.1\n3.5\n1.4\n", "5.1\n3.5\n1.4\n0.2\n"];
    for input in inputs {
        let mut session = Session::new(&predictor, Cursor::new(input), std::io::sink());
        let mut steps = 0;
        while session.state() != &SessionState::Terminated {
            session.step().expect("step");
            steps += 1;
            assert!(steps < 10, "session did not terminate on {input:?}");
        }
    }
}

#[test]
fn predictor_loads_from_pipeline_artifacts() {
    let ws = Workspace::new();
    run_preparation(
        &PrepareOptions {
            dataset: ws.config.paths.dataset.clone(),
            output: ws.config.paths.prepared.clone(),
            split: ws.config.split.clone(),
        },
        &mut std::io::sink(),
    )
    .expect("prepare");
    let predictor = full_dataset_predictor();
    TrainedModelArtifact::new(predictor.model, 42, Vec::new())
        .save(&ws.config.paths.model)
        .expect("save");

    let loaded = load_predictor(&ws.config.paths.model, &ws.config.paths.prepared).expect("load");
    assert_eq!(loaded.species, SpeciesMap::iris());
    let text = transcript(&loaded, "5.1\n3.5\n1.4\n0.2\nn\n");
    assert!(text.contains("Predicted species: Setosa"));
    assert!(text.contains("Setosa    : 100.00%"));
}

#[test]
fn missing_model_fails_to_load() {
    let ws = Workspace::new();
    let err = load_predictor(&ws.config.paths.model, &ws.config.paths.prepared).unwrap_err();
    assert!(err.to_string().contains("trained_model.json"));
}
