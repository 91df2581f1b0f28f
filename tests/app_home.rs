mod support;

use iris_classifier::{app_dirs, logging};
use support::iris_env::IrisHomeGuard;

#[test]
fn home_override_hosts_the_log_file() {
    let home = tempfile::tempdir().expect("tempdir");
    let _guard = IrisHomeGuard::set(home.path().to_path_buf());

    let root = app_dirs::app_root_dir().expect("app root");
    assert_eq!(root, home.path().join(app_dirs::APP_DIR_NAME));

    logging::init().expect("logging init");
    logging::init().expect("second init is a no-op");
    let logs: Vec<_> = std::fs::read_dir(root.join("logs"))
        .expect("logs dir")
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "log"))
        .collect();
    assert_eq!(logs.len(), 1);
    let name = logs[0].file_name().to_string_lossy().into_owned();
    assert!(name.starts_with("iris-classifier"), "{name}");
}
