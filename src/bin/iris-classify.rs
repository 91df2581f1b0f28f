//! Interactive Iris classifier on the terminal.

use std::path::PathBuf;

use iris_classifier::config::PipelineConfig;
use iris_classifier::logging;
use iris_classifier::predictor::{Session, load_predictor};

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

#[derive(Debug, Clone, Default)]
struct CliOptions {
    config: Option<PathBuf>,
    prepared: Option<PathBuf>,
    model: Option<PathBuf>,
}

fn run() -> Result<(), String> {
    let options = parse_args(std::env::args().skip(1).collect())?;
    if let Err(err) = logging::init() {
        eprintln!("Logging disabled: {err}");
    }
    let config =
        PipelineConfig::load_or_default(options.config.as_deref()).map_err(|err| err.to_string())?;
    let model = options.model.unwrap_or(config.paths.model);
    let prepared = options.prepared.unwrap_or(config.paths.prepared);

    println!("Loading the Iris classifier...");
    let predictor = load_predictor(&model, &prepared)
        .map_err(|err| format!("{err}\nExiting: the classifier could not be loaded."))?;
    println!("Classifier loaded.");

    let stdin = std::io::stdin().lock();
    let stdout = std::io::stdout().lock();
    let summary = Session::new(&predictor, stdin, stdout)
        .run()
        .map_err(|err| format!("Console I/O failed: {err}"))?;
    tracing::info!(
        "Session ended: {} classified, {} rejected entries",
        summary.classified,
        summary.rejected
    );
    Ok(())
}

fn parse_args(args: Vec<String>) -> Result<CliOptions, String> {
    let mut options = CliOptions::default();
    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "-h" | "--help" => return Err(help_text()),
            "--config" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--config requires a value".to_string())?;
                options.config = Some(PathBuf::from(value));
            }
            "--prepared" => {
                idx += 1;
                let value =
                    args.get(idx).ok_or_else(|| "--prepared requires a value".to_string())?;
                options.prepared = Some(PathBuf::from(value));
            }
            "--model" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--model requires a value".to_string())?;
                options.model = Some(PathBuf::from(value));
            }
            unknown => return Err(format!("Unknown argument: {unknown}\n\n{}", help_text())),
        }
        idx += 1;
    }
    Ok(options)
}

fn help_text() -> String {
    [
        "iris-classify",
        "",
        "Usage:",
        "  iris-classify [options]",
        "",
        "Options:",
        "  --config <file>          TOML config (default: ./iris-classifier.toml if present).",
        "  --prepared <file.json>   Prepared dataset holding the species map (default: prepared_data.json).",
        "  --model <file.json>      Model artifact (default: trained_model.json).",
    ]
    .join("\n")
}
