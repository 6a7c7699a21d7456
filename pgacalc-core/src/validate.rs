//! Range checks for command-line inputs.

use std::ops::RangeInclusive;

pub const LATITUDE_RANGE: RangeInclusive<f64> = -90.0..=90.0;
/// Exclusive on both ends.
pub const LONGITUDE_LIMIT: f64 = 360.0;
pub const MAGNITUDE_RANGE: RangeInclusive<f64> = -2.0..=9.7;
pub const DEPTH_RANGE: RangeInclusive<f64> = -5.0..=700.0;
pub const VS30_RANGE: RangeInclusive<f64> = 150.0..=2000.0;
pub const VS30_DEFAULT: f64 = 760.0;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InputError {
    #[error("Invalid number of arguments: {0}")]
    Arguments(usize),

    #[error("Illegal {what} value ({text})")]
    IllegalNumber { what: &'static str, text: String },

    #[error("{what} {value} is outside the range [{min}..{max}]")]
    OutOfRange { what: &'static str, value: f64, min: f64, max: f64 },

    #[error("Longitude {0} is outside the range (-360..360)")]
    Longitude(f64),

    #[error("Region is not supported: {0}")]
    UnsupportedRegion(crate::region::Region),
}

/// Parse `text` as a finite number.
pub fn parse_number(what: &'static str, text: &str) -> Result<f64, InputError> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| InputError::IllegalNumber { what, text: text.to_string() })
}

fn check_range(
    what: &'static str,
    value: f64,
    range: RangeInclusive<f64>,
) -> Result<f64, InputError> {
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(InputError::OutOfRange { what, value, min: *range.start(), max: *range.end() })
    }
}

pub fn check_latitude(latitude: f64) -> Result<f64, InputError> {
    check_range("Latitude", latitude, LATITUDE_RANGE)
}

pub fn check_longitude(longitude: f64) -> Result<f64, InputError> {
    if longitude > -LONGITUDE_LIMIT && longitude < LONGITUDE_LIMIT {
        Ok(longitude)
    } else {
        Err(InputError::Longitude(longitude))
    }
}

pub fn check_magnitude(magnitude: f64) -> Result<f64, InputError> {
    check_range("Magnitude", magnitude, MAGNITUDE_RANGE)
}

pub fn check_depth(depth: f64) -> Result<f64, InputError> {
    check_range("Depth", depth, DEPTH_RANGE)
}

pub fn check_vs30(vs30: f64) -> Result<f64, InputError> {
    check_range("Vs30", vs30, VS30_RANGE)
}

pub fn latitude(text: &str) -> Result<f64, InputError> {
    check_latitude(parse_number("latitude", text)?)
}

pub fn longitude(text: &str) -> Result<f64, InputError> {
    check_longitude(parse_number("longitude", text)?)
}

pub fn magnitude(text: &str) -> Result<f64, InputError> {
    check_magnitude(parse_number("magnitude", text)?)
}

pub fn depth(text: &str) -> Result<f64, InputError> {
    check_depth(parse_number("depth", text)?)
}

pub fn vs30(text: &str) -> Result<f64, InputError> {
    check_vs30(parse_number("vs30", text)?)
}
