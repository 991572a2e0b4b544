//! Parsing of the bracketed triples stored in the `/Parameters` group,
//! e.g. `"[128, 128, 768]"`.

use crate::LoadError;
use morph_core::GridShape;

/// Parses a three-element list or tuple literal into a [`GridShape`].
///
/// Accepts `[a, b, c]` or `(a, b, c)` with arbitrary whitespace. Elements may
/// be written as integer-valued floats (`64.0`); anything fractional,
/// negative or non-numeric is rejected.
pub fn parse_triple_literal(text: &str) -> Result<GridShape, LoadError> {
    let trimmed = text.trim().trim_end_matches('\0').trim();
    let inner = trimmed
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .or_else(|| {
            trimmed
                .strip_prefix('(')
                .and_then(|s| s.strip_suffix(')'))
        })
        .ok_or_else(|| {
            LoadError::ParseError(format!("Expected a bracketed list, found '{trimmed}'"))
        })?;

    let values = inner
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| parse_count(part, trimmed))
        .collect::<Result<Vec<_>, _>>()?;

    match values.as_slice() {
        &[nx, ny, nz] => Ok(GridShape::new(nx, ny, nz)),
        other => Err(LoadError::ParseError(format!(
            "Expected 3 values in '{trimmed}', found {}",
            other.len()
        ))),
    }
}

fn parse_count(part: &str, whole: &str) -> Result<usize, LoadError> {
    if let Ok(value) = part.parse::<usize>() {
        return Ok(value);
    }
    match part.parse::<f64>() {
        Ok(value) if value >= 0.0 && value.fract() == 0.0 && value <= u32::MAX as f64 => {
            Ok(value as usize)
        }
        _ => Err(LoadError::ParseError(format!(
            "Invalid count '{part}' in '{whole}'"
        ))),
    }
}
