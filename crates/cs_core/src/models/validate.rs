//! Range checks shared by model setters.

use super::error::{ModelError, ModelResult};

/// Accept finite values only.
pub fn finite(what: &'static str, value: f64) -> ModelResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ModelError::out_of_range(what, value))
    }
}

/// Accept finite values `>= 0`.
pub fn non_negative(what: &'static str, value: f64) -> ModelResult<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ModelError::out_of_range(what, value))
    }
}

/// Accept integers `>= min`.
pub fn at_least(what: &'static str, value: i64, min: i64) -> ModelResult<i64> {
    if value >= min {
        Ok(value)
    } else {
        Err(ModelError::out_of_range(what, value))
    }
}

/// Parse an `on`/`off` status attribute.
pub fn parse_on_off(what: &'static str, value: &str) -> ModelResult<bool> {
    match value {
        "on" => Ok(true),
        "off" => Ok(false),
        other => Err(ModelError::InvalidOption {
            what,
            value: other.to_string(),
            allowed: vec!["on", "off"],
        }),
    }
}

/// XML spelling of a status flag.
pub fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}
