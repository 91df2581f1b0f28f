//! Data preparation stage: CSV to prepared-dataset artifact.

use std::io::Write;
use std::path::PathBuf;

use super::{PipelineError, section};
use crate::dataset::stats::{self, class_distribution, format_distribution};
use crate::dataset::{
    LabelledDataset, PreparedDataset, RawDataset, SplitDataset, SplitOptions, load_csv,
    stratified_split,
};
use crate::species::SpeciesMap;

/// Inputs of [`run_preparation`].
#[derive(Debug, Clone)]
pub struct PrepareOptions {
    pub dataset: PathBuf,
    pub output: PathBuf,
    pub split: SplitOptions,
}

/// What preparation produced.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparationReport {
    pub rows: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    pub output: PathBuf,
}

/// Load, encode, describe and split the raw dataset, then persist the split.
pub fn run_preparation<W: Write>(
    options: &PrepareOptions,
    out: &mut W,
) -> Result<PreparationReport, PipelineError> {
    let species = SpeciesMap::iris();

    section(out, "STEP 1: LOADING DATA FROM CSV")?;
    let raw = load_csv(&options.dataset)?;
    report_loaded(out, options, &raw)?;

    section(out, "STEP 2: ENCODING SPECIES AS INTEGERS")?;
    let labelled = raw.encode_species(&species)?;
    report_encoding(out, &raw, &labelled, &species)?;

    section(out, "STEP 3: EXPLORING THE DATA")?;
    report_exploration(out, &labelled, &species)?;

    section(out, "SPLITTING INTO TRAIN AND TEST")?;
    let split = stratified_split(&labelled, &options.split)?;
    report_split(out, options, &labelled, &split)?;

    section(out, "SAVING PREPARED DATA")?;
    let prepared = PreparedDataset::new(&labelled, split, species);
    prepared.save(&options.output)?;
    writeln!(out, "\nPrepared data saved to '{}'", options.output.display())?;
    writeln!(out, "\nFile contents:")?;
    writeln!(out, "  - x_train: ({}, {})", prepared.x_train.len(), prepared.feature_names.len())?;
    writeln!(out, "  - x_test: ({}, {})", prepared.x_test.len(), prepared.feature_names.len())?;
    writeln!(out, "  - y_train: ({},)", prepared.y_train.len())?;
    writeln!(out, "  - y_test: ({},)", prepared.y_test.len())?;
    writeln!(out, "  - feature_names: {:?}", prepared.feature_names)?;
    writeln!(out, "  - species_map: {}", prepared.species_map)?;

    Ok(PreparationReport {
        rows: prepared.total_rows(),
        train_rows: prepared.y_train.len(),
        test_rows: prepared.y_test.len(),
        output: options.output.clone(),
    })
}

fn report_loaded<W: Write>(
    out: &mut W,
    options: &PrepareOptions,
    raw: &RawDataset,
) -> std::io::Result<()> {
    writeln!(out, "\nFile '{}' loaded", options.dataset.display())?;
    writeln!(
        out,
        "\nDataset shape: {} rows x {} columns",
        raw.rows.len(),
        raw.feature_names.len() + 1
    )?;
    writeln!(out, "\n--- First 5 rows ---")?;
    write_head(out, raw, 5)
}

fn write_head<W: Write>(out: &mut W, raw: &RawDataset, limit: usize) -> std::io::Result<()> {
    write!(out, "{:>4}", "")?;
    for name in &raw.feature_names {
        write!(out, " {name:>14}")?;
    }
    writeln!(out, " {:>16}", "species")?;
    for (idx, row) in raw.rows.iter().take(limit).enumerate() {
        write!(out, "{idx:>4}")?;
        for value in row.features {
            write!(out, " {value:>14.1}")?;
        }
        writeln!(out, " {:>16}", row.species)?;
    }
    Ok(())
}

fn report_encoding<W: Write>(
    out: &mut W,
    raw: &RawDataset,
    labelled: &LabelledDataset,
    species: &SpeciesMap,
) -> std::io::Result<()> {
    writeln!(out, "\n--- Values before encoding ---")?;
    for (value, count) in raw.species_counts() {
        writeln!(out, "  {value:<18} {count}")?;
    }
    writeln!(out, "\n--- Values after encoding ---")?;
    for share in class_distribution(&labelled.y) {
        writeln!(out, "  {:<18} {}", share.label, share.count)?;
    }
    writeln!(out, "\nMapping applied:")?;
    for (label, name) in species.iter() {
        writeln!(out, "  {name:<16} -> {label}")?;
    }
    Ok(())
}

fn report_exploration<W: Write>(
    out: &mut W,
    labelled: &LabelledDataset,
    species: &SpeciesMap,
) -> std::io::Result<()> {
    let summary = stats::describe(labelled);
    writeln!(out, "\n--- Descriptive statistics ---")?;
    write!(out, "{summary}")?;
    writeln!(out, "\n--- Class distribution ---")?;
    writeln!(out, "{}", format_distribution(&summary.classes, species))?;
    writeln!(out, "\nTotal samples: {}", summary.rows)
}

fn report_split<W: Write>(
    out: &mut W,
    options: &PrepareOptions,
    labelled: &LabelledDataset,
    split: &SplitDataset,
) -> std::io::Result<()> {
    let total = labelled.len() as f64;
    writeln!(out, "\nFeatures (x): {} columns", labelled.feature_names.len())?;
    writeln!(out, "Columns: {:?}", labelled.feature_names)?;
    let classes: Vec<_> = class_distribution(&labelled.y)
        .iter()
        .map(|share| share.label)
        .collect();
    writeln!(out, "Classes: {classes:?}")?;
    writeln!(
        out,
        "\nTest fraction {} with seed {}",
        options.split.test_fraction, options.split.seed
    )?;
    writeln!(
        out,
        "Train set: {} samples ({:.1}%)",
        split.y_train.len(),
        split.y_train.len() as f64 * 100.0 / total
    )?;
    writeln!(
        out,
        "Test set:  {} samples ({:.1}%)",
        split.y_test.len(),
        split.y_test.len() as f64 * 100.0 / total
    )?;
    for (name, labels) in [("TRAIN", &split.y_train), ("TEST", &split.y_test)] {
        writeln!(out, "\n--- Class distribution in {name} ---")?;
        for share in class_distribution(labels) {
            writeln!(
                out,
                "  Class {}: {} samples ({:.1}%)",
                share.label, share.count, share.percent
            )?;
        }
    }
    Ok(())
}
