//! Train the decision tree on the prepared dataset and save the model artifact.

use std::path::PathBuf;

use iris_classifier::config::PipelineConfig;
use iris_classifier::logging;
use iris_classifier::ml::TreeBackend;
use iris_classifier::pipeline::{TrainOptions, run_training};

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
    out: Option<PathBuf>,
    backend: Option<TreeBackend>,
    seed: Option<u64>,
}

fn run() -> Result<(), String> {
    let options = parse_args(std::env::args().skip(1).collect())?;
    if let Err(err) = logging::init() {
        eprintln!("Logging disabled: {err}");
    }
    let config =
        PipelineConfig::load_or_default(options.config.as_deref()).map_err(|err| err.to_string())?;
    let train = TrainOptions {
        prepared: options.prepared.unwrap_or(config.paths.prepared),
        model_out: options.out.unwrap_or(config.paths.model),
        backend: options.backend.unwrap_or(config.training.backend),
        seed: options.seed.unwrap_or(config.training.seed),
    };
    let mut stdout = std::io::stdout().lock();
    let report =
        run_training(&train, &mut stdout).map_err(|err| format!("{}: {err}", err.kind()))?;
    println!("\ntest accuracy: {:.4}", report.accuracy);
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
            "--out" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--out requires a value".to_string())?;
                options.out = Some(PathBuf::from(value));
            }
            "--backend" => {
                idx += 1;
                let value =
                    args.get(idx).ok_or_else(|| "--backend requires a value".to_string())?;
                options.backend = Some(value.parse::<TreeBackend>()?);
            }
            "--seed" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--seed requires a value".to_string())?;
                options.seed = Some(
                    value
                        .parse::<u64>()
                        .map_err(|_| format!("Invalid --seed value: {value}"))?,
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
        "iris-train",
        "",
        "Usage:",
        "  iris-train [options]",
        "",
        "Options:",
        "  --config <file>          TOML config (default: ./iris-classifier.toml if present).",
        "  --prepared <file.json>   Prepared dataset (default: prepared_data.json).",
        "  --out <file.json>        Model artifact output (default: trained_model.json).",
        "  --backend <cart|linfa>   Tree implementation (default: cart).",
        "  --seed <n>               Tie-breaking seed (default: 42).",
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_backend() {
        let options = parse_args(vec!["--backend".into(), "linfa".into()]).unwrap();
        assert_eq!(options.backend, Some(TreeBackend::Linfa));
        assert!(parse_args(vec!["--backend".into(), "forest".into()]).is_err());
    }
}
