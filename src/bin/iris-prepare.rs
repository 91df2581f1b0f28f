//! Prepare the Iris dataset: load, encode, describe, split and save.

use std::path::PathBuf;

use iris_classifier::config::PipelineConfig;
use iris_classifier::logging;
use iris_classifier::pipeline::{PrepareOptions, run_preparation};

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

#[derive(Debug, Clone, Default)]
struct CliOptions {
    config: Option<PathBuf>,
    dataset: Option<PathBuf>,
    out: Option<PathBuf>,
    test_fraction: Option<f64>,
    seed: Option<u64>,
}

fn run() -> Result<(), String> {
    let options = parse_args(std::env::args().skip(1).collect())?;
    if let Err(err) = logging::init() {
        eprintln!("Logging disabled: {err}");
    }
    let mut config =
        PipelineConfig::load_or_default(options.config.as_deref()).map_err(|err| err.to_string())?;
    if let Some(dataset) = options.dataset {
        config.paths.dataset = dataset;
    }
    if let Some(out) = options.out {
        config.paths.prepared = out;
    }
    if let Some(fraction) = options.test_fraction {
        config.split.test_fraction = fraction;
    }
    if let Some(seed) = options.seed {
        config.split.seed = seed;
    }
    config.validate().map_err(|err| err.to_string())?;

    let prepare = PrepareOptions {
        dataset: config.paths.dataset,
        output: config.paths.prepared,
        split: config.split,
    };
    let mut stdout = std::io::stdout().lock();
    run_preparation(&prepare, &mut stdout).map_err(|err| format!("{}: {err}", err.kind()))?;
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
            "--dataset" => {
                idx += 1;
                let value =
                    args.get(idx).ok_or_else(|| "--dataset requires a value".to_string())?;
                options.dataset = Some(PathBuf::from(value));
            }
            "--out" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--out requires a value".to_string())?;
                options.out = Some(PathBuf::from(value));
            }
            "--test-fraction" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| "--test-fraction requires a value".to_string())?;
                options.test_fraction = Some(
                    value
                        .parse::<f64>()
                        .map_err(|_| format!("Invalid --test-fraction value: {value}"))?,
                );
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
        "iris-prepare",
        "",
        "Usage:",
        "  iris-prepare [options]",
        "",
        "Options:",
        "  --config <file>          TOML config (default: ./iris-classifier.toml if present).",
        "  --dataset <iris.csv>     Raw CSV input (default: iris.csv).",
        "  --out <file.json>        Prepared dataset output (default: prepared_data.json).",
        "  --test-fraction <f>      Share of each class held out for testing (default: 0.2).",
        "  --seed <n>               Split seed (default: 42).",
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn parses_overrides() {
        let options = parse_args(args(&["--dataset", "data/iris.csv", "--seed", "7"])).unwrap();
        assert_eq!(options.dataset, Some(PathBuf::from("data/iris.csv")));
        assert_eq!(options.seed, Some(7));
        assert!(options.out.is_none());
    }

    #[test]
    fn rejects_bad_numbers_and_unknown_flags() {
        assert!(parse_args(args(&["--test-fraction", "half"])).is_err());
        assert!(parse_args(args(&["--bogus"])).is_err());
        assert!(parse_args(args(&["--seed"])).is_err());
    }
}
