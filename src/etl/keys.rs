//! Normalization of geographic codes and other padded identifiers.

use crate::errors::{Error, Result};

/// Territory rows of the case reports carry state code "00"; the state level
/// data files them under Puerto Rico.
const UNASSIGNED_STATE_FIPS: &str = "00";
const TERRITORY_STATE_FIPS: &str = "72";

/// Parses `raw` as an integer, accepting integral floats (`"1001.0"`) which is
/// how numeric codes come out of a float-typed column.
pub fn cast_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if let Ok(value) = trimmed.parse::<i64>() {
        return Some(value);
    }
    let value = trimmed.parse::<f64>().ok()?;
    if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Some(value as i64)
    } else {
        None
    }
}

/// Left-pads with zeros up to `width` characters. Longer strings are returned
/// unchanged.
pub fn zero_pad(value: &str, width: usize) -> String {
    format!("{value:0>width$}")
}

/// Casts a fips code through an integer and pads it to `width` digits. Codes
/// are digits only, so a negative value is malformed.
pub fn normalize_fips(raw: &str, width: usize) -> Result<String> {
    let code = cast_integer(raw)
        .ok_or_else(|| Error::malformed_key(format!("fips code {raw:?} is not an integer")))?;
    if code < 0 {
        return Err(Error::malformed_key(format!("fips code {raw:?} is negative")));
    }
    Ok(zero_pad(&code.to_string(), width))
}

/// Splits a 5-digit county fips into (state_fips, county_fips).
pub fn split_county_fips(fips: &str) -> (String, String) {
    let chars: Vec<char> = fips.chars().collect();
    let state: String = chars.iter().take(2).collect();
    let county: String = chars[chars.len().saturating_sub(3)..].iter().collect();
    (state, county)
}

pub fn remap_territory_state(state_fips: String) -> String {
    if state_fips == UNASSIGNED_STATE_FIPS {
        TERRITORY_STATE_FIPS.to_string()
    } else {
        state_fips
    }
}
