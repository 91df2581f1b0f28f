mod support;

use std::path::Path;
use std::process::{Command, Output, Stdio};

use iris_classifier::app_dirs::HOME_ENV;
use support::workspace::shipped_dataset;

fn run_driver(dir: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_iris-classifier"))
        .arg("--no-interactive")
        .current_dir(dir)
        .env(HOME_ENV, dir)
        .stdin(Stdio::null())
        .output()
        .expect("spawn iris-classifier")
}

#[test]
fn missing_dataset_exits_with_status_one() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = run_driver(dir.path());
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("CRITICAL ERROR"), "{stdout}");
    assert!(stdout.contains("iris.csv"));
    assert!(!dir.path().join("prepared_data.json").exists());
}

#[test]
fn full_run_exits_cleanly_and_lists_artifacts() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::copy(shipped_dataset(), dir.path().join("iris.csv")).expect("copy dataset");
    std::fs::write(dir.path().join("iris-classifier.toml"), "[render]\ndpi = 50\n")
        .expect("write config");

    let output = run_driver(dir.path());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(output.status.code(), Some(0), "{stdout}");
    assert!(stdout.contains("FINAL RUN SUMMARY"));
    assert!(stdout.contains("PIPELINE COMPLETED SUCCESSFULLY"));
    assert!(!stdout.contains("NOT FOUND"));
    let artifact_lines = stdout.lines().filter(|line| line.ends_with(" KB)")).count();
    assert_eq!(artifact_lines, 3, "{stdout}");
    for name in ["prepared_data.json", "trained_model.json", "confusion_matrix.png"] {
        assert!(dir.path().join(name).is_file(), "{name} missing");
    }
}
