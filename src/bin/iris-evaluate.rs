//! Evaluate the saved model on the test partition and render the confusion matrix.

use std::path::PathBuf;

use iris_classifier::config::PipelineConfig;
use iris_classifier::logging;
use iris_classifier::pipeline::{EvaluateOptions, run_evaluation};

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
    out: Option<PathBuf>,
    dpi: Option<u32>,
}

fn run() -> Result<(), String> {
    let options = parse_args(std::env::args().skip(1).collect())?;
    if let Err(err) = logging::init() {
        eprintln!("Logging disabled: {err}");
    }
    let mut config =
        PipelineConfig::load_or_default(options.config.as_deref()).map_err(|err| err.to_string())?;
    if let Some(dpi) = options.dpi {
        config.render.dpi = dpi;
    }
    config.validate().map_err(|err| err.to_string())?;

    let evaluate = EvaluateOptions {
        prepared: options.prepared.unwrap_or(config.paths.prepared),
        model: options.model.unwrap_or(config.paths.model),
        heatmap: options.out.unwrap_or(config.paths.confusion_matrix),
        dpi: config.render.dpi,
    };
    let mut stdout = std::io::stdout().lock();
    run_evaluation(&evaluate, &mut stdout).map_err(|err| format!("{}: {err}", err.kind()))?;
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
            "--out" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--out requires a value".to_string())?;
                options.out = Some(PathBuf::from(value));
            }
            "--dpi" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--dpi requires a value".to_string())?;
                options.dpi = Some(
                    value
                        .parse::<u32>()
                        .map_err(|_| format!("Invalid --dpi value: {value}"))?,
                );
            }
            unknown => return Err(format!("Unknown argument: {unknown}\n\n{}", help_text())),
        }
        idx += 1;
    }
    Ok(options)
}

fn help_text() -> String {
    [
        "iris-evaluate",
        "",
        "Usage:",
        "  iris-evaluate [options]",
        "",
        "Options:",
        "  --config <file>          TOML config (default: ./iris-classifier.toml if present).",
        "  --prepared <file.json>   Prepared dataset (default: prepared_data.json).",
        "  --model <file.json>      Model artifact (default: trained_model.json).",
        "  --out <file.png>         Heat-map output (default: confusion_matrix.png).",
        "  --dpi <n>                Heat-map resolution, 1-600 (default: 300).",
    ]
    .join("\n")
}
