//! Interactive command-line predictor.
//!
//! A [`Session`] drives a small state machine over any `BufRead`/`Write` pair:
//!
//! ```text
//! AwaitingMeasurement --4 valid numbers--> Classifying --> AwaitingContinue
//!        ^   |                                                   |
//!        |   +--invalid entry--> AwaitingMeasurement             |
//!        +------------------------ y / yes -----------------------+
//! ```
//!
//! Any other continue answer, or end of input at any prompt, terminates.

pub mod input;

use std::io::{BufRead, Write};
use std::path::Path;

use crate::artifact::ArtifactError;
use crate::dataset::{FEATURE_COUNT, PreparedDataset};
use crate::ml::{Capability, FittedModel, TrainedModelArtifact};
use crate::species::SpeciesMap;

pub use crate::dataset::Measurements;
pub use input::{FieldInput, InvalidMeasurement, parse_measurement, read_field};

/// Field prompts in feature order.
pub const FIELD_PROMPTS: [&str; FEATURE_COUNT] = [
    "  Sepal length: ",
    "  Sepal width:  ",
    "  Petal length: ",
    "  Petal width:  ",
];

/// Sample inputs shown before the first prompt.
pub const EXAMPLES: [(&str, Measurements); 3] = [
    ("Setosa", [5.1, 3.5, 1.4, 0.2]),
    ("Versicolor", [6.0, 2.7, 5.1, 1.6]),
    ("Virginica", [7.2, 3.0, 5.8, 1.6]),
];

/// Model and label map ready for interactive use.
#[derive(Debug)]
pub struct LoadedPredictor {
    pub model: FittedModel,
    pub species: SpeciesMap,
    /// Resolved once at load time.
    pub capability: Capability,
}

impl LoadedPredictor {
    pub fn new(model: FittedModel, species: SpeciesMap) -> Self {
        let capability = model.capability();
        Self {
            model,
            species,
            capability,
        }
    }
}

/// Load the fitted model and the species map saved with the prepared dataset.
pub fn load_predictor(model: &Path, prepared: &Path) -> Result<LoadedPredictor, ArtifactError> {
    let artifact = TrainedModelArtifact::load(model)?;
    let prepared = PreparedDataset::load(prepared)?;
    tracing::info!(
        "Predictor ready: {} backend, {:?}",
        artifact.model.backend(),
        artifact.model.capability()
    );
    Ok(LoadedPredictor::new(artifact.model, prepared.species_map))
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    AwaitingMeasurement,
    Classifying(Measurements),
    AwaitingContinue,
    Terminated,
}

/// Counts reported when a session ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub classified: usize,
    pub rejected: usize,
}

pub struct Session<'a, R, W> {
    predictor: &'a LoadedPredictor,
    input: R,
    out: W,
    state: SessionState,
    summary: SessionSummary,
}

impl<'a, R: BufRead, W: Write> Session<'a, R, W> {
    pub fn new(predictor: &'a LoadedPredictor, input: R, out: W) -> Self {
        Self {
            predictor,
            input,
            out,
            state: SessionState::AwaitingMeasurement,
            summary: SessionSummary::default(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Print the example block, then step until the session terminates.
    pub fn run(mut self) -> std::io::Result<SessionSummary> {
        self.print_examples()?;
        while self.state != SessionState::Terminated {
            self.step()?;
        }
        writeln!(self.out, "\nThanks for using the Iris classifier. Exiting...")?;
        self.out.flush()?;
        Ok(self.summary)
    }

    /// Perform exactly one state transition.
    pub fn step(&mut self) -> std::io::Result<()> {
        self.state = match std::mem::replace(&mut self.state, SessionState::Terminated) {
            SessionState::AwaitingMeasurement => self.read_measurements()?,
            SessionState::Classifying(measurements) => {
                self.classify(&measurements)?;
                SessionState::AwaitingContinue
            }
            SessionState::AwaitingContinue => self.ask_continue()?,
            SessionState::Terminated => SessionState::Terminated,
        };
        Ok(())
    }

    fn print_examples(&mut self) -> std::io::Result<()> {
        let rule = "-".repeat(52);
        writeln!(self.out, "{rule}")?;
        writeln!(
            self.out,
            "Test examples (sepal length, sepal width, petal length, petal width):"
        )?;
        for (idx, (name, values)) in EXAMPLES.iter().enumerate() {
            let joined = values
                .iter()
                .map(|v| format!("{v:.1}"))
                .collect::<Vec<_>>()
                .join(", ");
            writeln!(self.out, "  {}. {:<11} {joined}", idx + 1, format!("{name}:"))?;
        }
        writeln!(self.out, "{rule}")
    }

    fn read_measurements(&mut self) -> std::io::Result<SessionState> {
        writeln!(self.out, "\nEnter the flower measurements (cm):")?;
        let mut measurements: Measurements = [0.0; FEATURE_COUNT];
        for (slot, prompt) in measurements.iter_mut().zip(FIELD_PROMPTS) {
            match read_field(&mut self.input, &mut self.out, prompt)? {
                FieldInput::Value(value) => *slot = value,
                FieldInput::Invalid(reason) => {
                    self.summary.rejected += 1;
                    writeln!(
                        self.out,
                        "\nInvalid value: {reason}. Enter numbers only (e.g. 5.1 or 3.5)."
                    )?;
                    return Ok(SessionState::AwaitingMeasurement);
                }
                FieldInput::EndOfInput => return Ok(SessionState::Terminated),
            }
        }
        Ok(SessionState::Classifying(measurements))
    }

    fn classify(&mut self, measurements: &Measurements) -> std::io::Result<()> {
        let predictor = self.predictor;
        let label = predictor.model.predict_one(measurements);
        self.summary.classified += 1;
        tracing::debug!("Classified {measurements:?} as label {label}");

        writeln!(self.out, "\n--- Classification result ---")?;
        writeln!(
            self.out,
            "Predicted species: {}",
            predictor.species.display_name(label)
        )?;
        writeln!(self.out, "{}", "-".repeat(29))?;

        if predictor.capability != Capability::Probabilities {
            return Ok(());
        }
        let Some(probabilities) = predictor.model.predict_proba(measurements) else {
            return Ok(());
        };
        writeln!(self.out, "Probabilities (confidence):")?;
        let labels = predictor.species.labels();
        if predictor.model.classes() == labels.as_slice() && probabilities.len() == labels.len() {
            for (name, p) in predictor.species.display_names().iter().zip(probabilities) {
                writeln!(self.out, "  {name:<10}: {:.2}%", p * 100.0)?;
            }
        } else {
            writeln!(self.out, "  (Could not map probabilities to class names.)")?;
        }
        writeln!(self.out, "{}", "-".repeat(29))
    }

    fn ask_continue(&mut self) -> std::io::Result<SessionState> {
        let answer = input::read_line(
            &mut self.input,
            &mut self.out,
            "\nClassify another flower? (y/n): ",
        )?;
        Ok(match answer {
            Some(answer) if is_affirmative(&answer) => SessionState::AwaitingMeasurement,
            _ => SessionState::Terminated,
        })
    }
}

/// `y` or `yes`, case-insensitive.
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
