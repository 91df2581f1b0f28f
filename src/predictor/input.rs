//! Typed parsing of interactive measurement input.

use std::io::{BufRead, Write};

use thiserror::Error;

/// Why a measurement entry was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidMeasurement {
    #[error("no value entered")]
    Empty,
    #[error("'{0}' is not a number")]
    NotANumber(String),
    #[error("'{0}' is not a finite number")]
    NotFinite(String),
}

/// Outcome of reading one prompted field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldInput {
    Value(f64),
    Invalid(InvalidMeasurement),
    EndOfInput,
}

/// Parse one measurement in centimetres. Surrounding whitespace is ignored.
pub fn parse_measurement(text: &str) -> Result<f64, InvalidMeasurement> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(InvalidMeasurement::Empty);
    }
    let value: f64 = trimmed
        .parse()
        .map_err(|_| InvalidMeasurement::NotANumber(trimmed.to_string()))?;
    if !value.is_finite() {
        return Err(InvalidMeasurement::NotFinite(trimmed.to_string()));
    }
    Ok(value)
}

/// Read one line after printing `prompt`; `None` at end of input.
pub fn read_line<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    prompt: &str,
) -> std::io::Result<Option<String>> {
    write!(out, "{prompt}")?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}

/// Prompt for and parse one measurement field.
pub fn read_field<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    prompt: &str,
) -> std::io::Result<FieldInput> {
    Ok(match read_line(input, out, prompt)? {
        None => FieldInput::EndOfInput,
        Some(line) => match parse_measurement(&line) {
            Ok(value) => FieldInput::Value(value),
            Err(err) => FieldInput::Invalid(err),
        },
    })
}
