//! Field validation shared by the entity services.

use crate::{Error, Result};

pub(crate) const MAX_NAME_LEN: usize = 64;
pub(crate) const MAX_COMMENT_LEN: usize = 1024;
pub(crate) const MAX_EXTERNAL_ID_LEN: usize = 256;

pub(crate) fn require_name(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::Validation(format!("{field} must not be empty")));
    }
    max_len(field, Some(value), MAX_NAME_LEN)
}

pub(crate) fn max_len(field: &str, value: Option<&str>, limit: usize) -> Result<()> {
    match value {
        Some(v) if v.chars().count() > limit => Err(Error::Validation(format!(
            "{field} must be at most {limit} characters"
        ))),
        _ => Ok(()),
    }
}

pub(crate) fn positive(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(Error::Validation(format!("{field} must be greater than 0")));
    }
    Ok(())
}

pub(crate) fn non_negative(field: &str, value: Option<f64>) -> Result<()> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => {
            Err(Error::Validation(format!("{field} must not be negative")))
        }
        _ => Ok(()),
    }
}

pub(crate) fn non_negative_int(field: &str, value: Option<i32>) -> Result<()> {
    match value {
        Some(v) if v < 0 => Err(Error::Validation(format!("{field} must not be negative"))),
        _ => Ok(()),
    }
}

/// Strip a leading `#` and require 6 (RGB) or 8 (RGBA) hex digits.
pub(crate) fn normalize_color_hex(value: Option<String>) -> Result<Option<String>> {
    let Some(raw) = value else {
        return Ok(None);
    };
    let hex = raw.trim().trim_start_matches('#');
    if !matches!(hex.len(), 6 | 8) || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(Error::Validation(format!(
            "color_hex must be 6 or 8 hex digits, got '{raw}'"
        )));
    }
    Ok(Some(hex.to_ascii_uppercase()))
}
