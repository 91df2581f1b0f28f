//! CSV loader for the raw Iris table.

use std::path::Path;

use super::{DatasetError, FEATURE_COUNT, Measurements, RawDataset, RawRow, SPECIES_COLUMN};

/// Column layout resolved from the header row.
#[derive(Debug, Clone, PartialEq)]
struct Columns {
    species: usize,
    features: [usize; FEATURE_COUNT],
    feature_names: Vec<String>,
}

/// Load a CSV file with a header row, four measurement columns and a `species` column.
///
/// Header names are matched case-insensitively; an `id` column is ignored.
/// Blank lines are skipped. Measurements must be finite numbers.
pub fn load_csv(path: &Path) -> Result<RawDataset, DatasetError> {
    if !path.is_file() {
        return Err(DatasetError::Missing(path.to_path_buf()));
    }
    let csv_err = |source: csv::Error| DatasetError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(csv_err)?;
    let header: Vec<String> = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(str::to_string)
        .collect();
    let columns = resolve_columns(&header)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_err)?;
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        let line = record.position().map(|pos| pos.line()).unwrap_or(0);
        let mut features: Measurements = [0.0; FEATURE_COUNT];
        for (slot, &col) in features.iter_mut().zip(columns.features.iter()) {
            let raw = record.get(col).unwrap_or("");
            *slot = raw
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .ok_or_else(|| DatasetError::InvalidNumber {
                    line,
                    column: header[col].clone(),
                    value: raw.to_string(),
                })?;
        }
        let species = record.get(columns.species).unwrap_or("").to_string();
        rows.push(RawRow {
            line,
            features,
            species,
        });
    }

    if rows.is_empty() {
        return Err(DatasetError::Empty);
    }
    tracing::info!("Loaded {} rows from {}", rows.len(), path.display());
    Ok(RawDataset {
        feature_names: columns.feature_names,
        rows,
    })
}

fn resolve_columns(header: &[String]) -> Result<Columns, DatasetError> {
    let columns_error = || DatasetError::Columns {
        found: header.to_vec(),
    };
    let species = header
        .iter()
        .position(|name| name.eq_ignore_ascii_case(SPECIES_COLUMN))
        .ok_or_else(columns_error)?;
    let feature_cols: Vec<usize> = header
        .iter()
        .enumerate()
        .filter(|(idx, name)| *idx != species && !name.eq_ignore_ascii_case("id"))
        .map(|(idx, _)| idx)
        .collect();
    let features: [usize; FEATURE_COUNT] =
        feature_cols.clone().try_into().map_err(|_| columns_error())?;
    Ok(Columns {
        species,
        features,
        feature_names: feature_cols.iter().map(|&idx| header[idx].clone()).collect(),
    })
}
