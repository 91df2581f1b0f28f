//! Driver for the full Iris pipeline: prepare, train, evaluate, then optionally
//! hand over to the interactive classifier.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use time::{OffsetDateTime, format_description::FormatItem, macros::format_description};

use iris_classifier::config::{ConfigError, PipelineConfig};
use iris_classifier::logging;
use iris_classifier::pipeline::{
    EvaluateOptions, PipelineError, PrepareOptions, TrainOptions, rule, run_evaluation,
    run_preparation, run_training,
};
use iris_classifier::predictor::{Session, load_predictor};

const PHASES: [&str; 3] = [
    "DATA LOADING AND PREPARATION",
    "MODEL TRAINING",
    "MODEL EVALUATION",
];

fn main() {
    if let Err(err) = ctrlc::set_handler(|| {
        println!("\n\n{}", rule('!'));
        println!("EXECUTION INTERRUPTED BY USER (Ctrl+C)");
        println!("{}\n", rule('!'));
        std::process::exit(0);
    }) {
        eprintln!("Ctrl+C handler unavailable: {err}");
    }

    match run() {
        Ok(()) => {}
        Err(DriverError::Usage(text)) => {
            eprintln!("{text}");
            std::process::exit(1);
        }
        Err(DriverError::DatasetMissing(_)) => std::process::exit(1),
        Err(err) => {
            tracing::error!("Pipeline failed: {err}");
            println!("\n\n{}", rule('!'));
            println!("FATAL ERROR WHILE RUNNING THE PIPELINE");
            println!("{}", rule('!'));
            println!("\nError details: {err}");
            println!("Error kind: {}", err.kind());
            println!("\nSee the messages above and the log file for more information.");
            println!("\n{}\n", rule('!'));
            std::process::exit(1);
        }
    }
}

#[derive(Debug, Error)]
enum DriverError {
    #[error("{0}")]
    Usage(String),
    #[error("Dataset file {0} not found")]
    DatasetMissing(PathBuf),
    #[error("Phase {phase} ({name}) failed: {source}")]
    Phase {
        phase: usize,
        name: &'static str,
        source: PipelineError,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Console I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

impl DriverError {
    fn kind(&self) -> &'static str {
        match self {
            Self::Usage(_) => "UsageError",
            Self::DatasetMissing(_) => "MissingFile",
            Self::Phase { source, .. } => source.kind(),
            Self::Config(_) => "ConfigError",
            Self::Io(_) => "IoError",
        }
    }
}

#[derive(Debug, Clone, Default)]
struct CliOptions {
    config: Option<PathBuf>,
    dataset: Option<PathBuf>,
    interactive: Option<bool>,
}

fn run() -> Result<(), DriverError> {
    let options = parse_args(std::env::args().skip(1).collect()).map_err(DriverError::Usage)?;
    if let Err(err) = logging::init() {
        eprintln!("Logging disabled: {err}");
    }
    let mut config = PipelineConfig::load_or_default(options.config.as_deref())?;
    if let Some(dataset) = options.dataset {
        config.paths.dataset = dataset;
    }

    let mut out = std::io::stdout();
    print_banner(&mut out)?;
    if !config.paths.dataset.is_file() {
        print_missing_dataset(&mut out, &config.paths.dataset)?;
        return Err(DriverError::DatasetMissing(config.paths.dataset));
    }

    phase(&mut out, 1, |out| {
        run_preparation(
            &PrepareOptions {
                dataset: config.paths.dataset.clone(),
                output: config.paths.prepared.clone(),
                split: config.split.clone(),
            },
            out,
        )
    })?;
    phase(&mut out, 2, |out| {
        run_training(
            &TrainOptions {
                prepared: config.paths.prepared.clone(),
                model_out: config.paths.model.clone(),
                backend: config.training.backend,
                seed: config.training.seed,
            },
            out,
        )
    })?;
    let evaluation = phase(&mut out, 3, |out| {
        run_evaluation(
            &EvaluateOptions {
                prepared: config.paths.prepared.clone(),
                model: config.paths.model.clone(),
                heatmap: config.paths.confusion_matrix.clone(),
                dpi: config.render.dpi,
            },
            out,
        )
    })?;

    let mut stdin = std::io::stdin().lock();
    let interactive = match options.interactive {
        Some(choice) => choice,
        None => ask_interactive(&mut stdin, &mut out)?,
    };
    if interactive {
        writeln!(out, "\n{}", rule('='))?;
        writeln!(out, "STARTING INTERACTIVE CLASSIFIER")?;
        writeln!(out, "{}\n", rule('='))?;
        match load_predictor(&config.paths.model, &config.paths.prepared) {
            Ok(predictor) => {
                let summary = Session::new(&predictor, &mut stdin, &mut out).run()?;
                tracing::info!(
                    "Interactive session: {} classified, {} rejected entries",
                    summary.classified,
                    summary.rejected
                );
            }
            Err(err) => {
                writeln!(out, "{err}")?;
                writeln!(out, "Exiting the classifier: it could not be loaded.")?;
            }
        }
        writeln!(out, "\n{}", rule('='))?;
        writeln!(out, "INTERACTIVE CLASSIFIER CLOSED")?;
        writeln!(out, "{}", rule('='))?;
    } else {
        writeln!(out, "\nThe interactive classifier will not be started.")?;
    }

    print_summary(&mut out, &config, evaluation.accuracy)?;
    Ok(())
}

/// Run one numbered phase between `#` banners, tagging a failure with the phase.
fn phase<W: Write, T>(
    out: &mut W,
    number: usize,
    body: impl FnOnce(&mut W) -> Result<T, PipelineError>,
) -> Result<T, DriverError> {
    let name = PHASES[number - 1];
    writeln!(out, "\n{}", rule('#'))?;
    writeln!(out, "PHASE {number}: {name}")?;
    writeln!(out, "{}\n", rule('#'))?;
    match body(out) {
        Ok(value) => {
            writeln!(out, "\n{}", rule('#'))?;
            writeln!(out, "PHASE {number} COMPLETED")?;
            writeln!(out, "{}\n", rule('#'))?;
            Ok(value)
        }
        Err(source) => {
            writeln!(out, "\nERROR in phase {number} ({name}): {source}")?;
            Err(DriverError::Phase {
                phase: number,
                name,
                source,
            })
        }
    }
}

/// Ask until the answer is yes or no; end of input counts as no.
fn ask_interactive<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> std::io::Result<bool> {
    writeln!(out, "\n{}", rule('='))?;
    writeln!(out, "INTERACTIVE CLASSIFIER")?;
    writeln!(out, "{}", rule('='))?;
    writeln!(out, "\nStart the interactive classifier?")?;
    writeln!(
        out,
        "You can enter flower measurements and see predictions as you go."
    )?;
    loop {
        write!(out, "\nUse the interactive classifier? (y/n): ")?;
        out.flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(false);
        }
        match line.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => writeln!(out, "Invalid answer. Type 'y' for yes or 'n' for no.")?,
        }
    }
}

fn print_banner<W: Write>(out: &mut W) -> std::io::Result<()> {
    writeln!(out, "\n{}", rule('='))?;
    writeln!(out, "{:^70}", "IRIS CLASSIFIER - DECISION TREE")?;
    writeln!(out, "{}", rule('='))?;
    writeln!(out, "\nModel: Decision Tree Classifier")?;
    writeln!(out, "Dataset: Iris (150 samples, 3 classes)")?;
    writeln!(out, "Goal: classify Iris flower species")?;
    writeln!(out, "\nRun started: {}", timestamp())?;
    writeln!(out, "{}\n", rule('='))
}

fn print_missing_dataset<W: Write>(out: &mut W, path: &Path) -> std::io::Result<()> {
    let cwd = std::env::current_dir()
        .map(|dir| dir.display().to_string())
        .unwrap_or_else(|_| "<unknown>".to_string());
    writeln!(out, "\n{}", rule('!'))?;
    writeln!(out, "CRITICAL ERROR: dataset file '{}' not found!", path.display())?;
    writeln!(out, "{}", rule('!'))?;
    writeln!(out, "\nThe dataset is required to run the pipeline.")?;
    writeln!(
        out,
        "Place it at the configured path or pass --dataset <file>."
    )?;
    writeln!(out, "\nWorking directory: {cwd}")?;
    writeln!(out, "\nExiting...")?;
    writeln!(out, "{}\n", rule('!'))
}

fn print_summary<W: Write>(
    out: &mut W,
    config: &PipelineConfig,
    accuracy: f64,
) -> std::io::Result<()> {
    writeln!(out, "\n{}", rule('='))?;
    writeln!(out, "{:^70}", "FINAL RUN SUMMARY")?;
    writeln!(out, "{}", rule('='))?;
    writeln!(out, "\n--- Model metrics ---")?;
    writeln!(out, "Final accuracy: {:.2}%", accuracy * 100.0)?;

    writeln!(out, "\n--- Generated files ---")?;
    let artifacts = [
        (&config.paths.prepared, "Prepared data (train and test)"),
        (&config.paths.model, "Trained decision tree model"),
        (&config.paths.confusion_matrix, "Confusion matrix heat-map"),
    ];
    for (path, description) in artifacts {
        let size = match std::fs::metadata(path) {
            Ok(meta) => format!("{:.2} KB", meta.len() as f64 / 1024.0),
            Err(_) => "NOT FOUND".to_string(),
        };
        writeln!(
            out,
            "  {:<25} - {description} ({size})",
            path.display().to_string()
        )?;
    }

    writeln!(out, "\n--- Pipeline statistics ---")?;
    writeln!(out, "  Phases executed: {}", PHASES.len())?;
    writeln!(out, "  Status: SUCCESS")?;
    writeln!(out, "  Finished: {}", timestamp())?;
    writeln!(out, "\n{}", rule('='))?;
    writeln!(out, "{:^70}", "PIPELINE COMPLETED SUCCESSFULLY")?;
    writeln!(out, "{}\n", rule('='))
}

fn timestamp() -> String {
    const DISPLAY_FORMAT: &[FormatItem<'static>] =
        format_description!("[day]/[month]/[year] [hour]:[minute]:[second]");
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    now.format(DISPLAY_FORMAT)
        .unwrap_or_else(|_| now.to_string())
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
            "--interactive" => options.interactive = Some(true),
            "--no-interactive" => options.interactive = Some(false),
            unknown => return Err(format!("Unknown argument: {unknown}\n\n{}", help_text())),
        }
        idx += 1;
    }
    Ok(options)
}

fn help_text() -> String {
    [
        "iris-classifier",
        "",
        "Usage:",
        "  iris-classifier [options]",
        "",
        "Runs data preparation, training and evaluation, then offers the interactive classifier.",
        "",
        "Options:",
        "  --config <file>      TOML config (default: ./iris-classifier.toml if present).",
        "  --dataset <file>     Raw CSV input (default: iris.csv).",
        "  --interactive        Start the interactive classifier without asking.",
        "  --no-interactive     Skip the interactive classifier without asking.",
    ]
    .join("\n")
}
