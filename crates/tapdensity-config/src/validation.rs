//! Caller-side validation of parameter-layer values.
//!
//! The core treats out-of-range input as a contract violation and only checks
//! it with `debug_assert!`. Everything that comes from a file, a command line
//! or a host goes through these checks first.
//!
//! # Example
//!
//! ```rust
//! use tapdensity_config::{parse_pattern, validate_tap_set};
//! use tapdensity_core::{MAX_TAPS, TapPattern};
//!
//! let pattern = parse_pattern("sqrt").expect("known pattern");
//! assert_eq!(pattern, TapPattern::SquareRoot);
//!
//! let set = validate_tap_set(0.5, 32, pattern.index(), MAX_TAPS).expect("valid tap set");
//! assert_eq!(set.tap_count(), 32);
//! assert!(validate_tap_set(0.5, 0, 0, MAX_TAPS).is_err());
//! ```

use tapdensity_core::{CompensationTuning, MAX_TAPS, PATTERN_COUNT, TapPattern, TapSet};
use thiserror::Error;

/// Lowest accepted sample rate in Hz.
pub const MIN_SAMPLE_RATE: f32 = 1000.0;
/// Highest accepted sample rate in Hz.
pub const MAX_SAMPLE_RATE: f32 = 768_000.0;
/// Longest accepted comb size in milliseconds.
pub const MAX_COMB_SIZE_MS: f32 = 10_000.0;
/// Largest accepted pitch CV magnitude in octaves.
pub const MAX_PITCH_CV: f32 = 8.0;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Parameter value out of range.
    #[error("parameter '{param}' value {value} out of range [{min}, {max}]")]
    OutOfRange {
        /// Name of the parameter.
        param: String,
        /// The value that was out of range.
        value: f32,
        /// Minimum allowed value.
        min: f32,
        /// Maximum allowed value.
        max: f32,
    },

    /// NaN or infinite value.
    #[error("parameter '{param}' must be finite, got {value}")]
    NotFinite {
        /// Name of the parameter.
        param: String,
        /// The offending value.
        value: f32,
    },

    /// Tap count outside `1..=max`.
    #[error("tap count {value} out of range [1, {max}]")]
    TapCount {
        /// Requested tap count.
        value: usize,
        /// Engine tap limit.
        max: usize,
    },

    /// Unknown pattern name or id.
    #[error("unknown tap pattern: {0}")]
    UnknownPattern(String),

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

fn check_range(param: &str, value: f32, min: f32, max: f32) -> ValidationResult<()> {
    if value.is_nan() {
        return Err(ValidationError::NotFinite {
            param: param.to_string(),
            value,
        });
    }
    if value >= min && value <= max {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            param: param.to_string(),
            value,
            min,
            max,
        })
    }
}

fn check_finite(param: &str, value: f32) -> ValidationResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::NotFinite {
            param: param.to_string(),
            value,
        })
    }
}

/// Fold a list of errors into one result.
pub(crate) fn collect(mut errors: Vec<ValidationError>) -> ValidationResult<()> {
    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}

/// Validate a sample rate in Hz.
pub fn validate_sample_rate(sample_rate: f32) -> ValidationResult<()> {
    check_range("sample_rate", sample_rate, MIN_SAMPLE_RATE, MAX_SAMPLE_RATE)
}

/// Validate an engine tap limit (`1..=MAX_TAPS`).
pub fn validate_max_taps(max_taps: usize) -> ValidationResult<()> {
    if (1..=MAX_TAPS).contains(&max_taps) {
        Ok(())
    } else {
        Err(ValidationError::TapCount {
            value: max_taps,
            max: MAX_TAPS,
        })
    }
}

/// Validate a tap count against an engine tap limit.
pub fn validate_tap_count(tap_count: usize, max_taps: usize) -> ValidationResult<()> {
    if (1..=max_taps.min(MAX_TAPS)).contains(&tap_count) {
        Ok(())
    } else {
        Err(ValidationError::TapCount {
            value: tap_count,
            max: max_taps.min(MAX_TAPS),
        })
    }
}

/// Validate a pattern id and map it to a [`TapPattern`].
pub fn validate_pattern(pattern: u8) -> ValidationResult<TapPattern> {
    if pattern < PATTERN_COUNT {
        Ok(TapPattern::from_index(pattern))
    } else {
        Err(ValidationError::UnknownPattern(pattern.to_string()))
    }
}

/// Validate a comb size in milliseconds (`0..=MAX_COMB_SIZE_MS`).
pub fn validate_comb_size_ms(comb_size_ms: f32) -> ValidationResult<()> {
    check_range("comb_size_ms", comb_size_ms, 0.0, MAX_COMB_SIZE_MS)
}

/// Validate a pitch CV in octaves.
pub fn validate_pitch_cv(pitch_cv: f32) -> ValidationResult<()> {
    check_range("pitch_cv", pitch_cv, -MAX_PITCH_CV, MAX_PITCH_CV)
}

/// Validate compensation tuning constants.
///
/// Collects every problem instead of stopping at the first.
pub fn validate_tuning(tuning: &CompensationTuning) -> ValidationResult<()> {
    let mut errors = Vec::new();

    if let Err(e) = check_finite("fraction_sensitivity", tuning.fraction_sensitivity)
        .and_then(|()| check_range("fraction_sensitivity", tuning.fraction_sensitivity, 0.0, 1000.0))
    {
        errors.push(e);
    }
    if let Err(e) = check_finite("correlation_scale", tuning.correlation_scale)
        .and_then(|()| check_range("correlation_scale", tuning.correlation_scale, 0.0, 100.0))
    {
        errors.push(e);
    }
    // An infinite threshold disables the spread shortcut
    if let Err(e) = check_range(
        "spread_threshold",
        tuning.spread_threshold,
        f32::MIN_POSITIVE,
        f32::INFINITY,
    ) {
        errors.push(e);
    }
    if let Err(e) = check_range(
        "max_attenuation_ratio",
        tuning.max_attenuation_ratio,
        f32::MIN_POSITIVE,
        1.0,
    ) {
        errors.push(e);
    }

    collect(errors)
}

/// Validate raw parameter-layer values and build a [`TapSet`].
pub fn validate_tap_set(
    comb_size_ms: f32,
    tap_count: usize,
    pattern: u8,
    max_taps: usize,
) -> ValidationResult<TapSet> {
    let mut errors = Vec::new();
    if let Err(e) = validate_comb_size_ms(comb_size_ms) {
        errors.push(e);
    }
    if let Err(e) = validate_tap_count(tap_count, max_taps) {
        errors.push(e);
    }
    let pattern = validate_pattern(pattern).map_err(|e| errors.push(e)).ok();

    collect(errors)?;
    let pattern = pattern.unwrap_or_default();
    Ok(TapSet::from_millis(comb_size_ms, tap_count, pattern))
}

/// Parse a pattern from an id (`"0"`..`"15"`) or a name.
///
/// Names are case-insensitive: `linear`, `log`/`logarithmic`,
/// `exp`/`exponential`, `quadratic`, `sqrt`/`squareroot`, and `powerN` for
/// power steps 0-10 (`power10` is pattern 15).
pub fn parse_pattern(value: &str) -> ValidationResult<TapPattern> {
    let trimmed = value.trim();
    if let Ok(id) = trimmed.parse::<u8>() {
        return validate_pattern(id);
    }

    let lower = trimmed.to_lowercase().replace(['_', '-', ' '], "");
    let pattern = match lower.as_str() {
        "linear" | "lin" => Some(TapPattern::Linear),
        "logarithmic" | "log" => Some(TapPattern::Logarithmic),
        "exponential" | "exp" => Some(TapPattern::Exponential),
        "quadratic" | "quad" => Some(TapPattern::Quadratic),
        "sqrt" | "squareroot" => Some(TapPattern::SquareRoot),
        other => other
            .strip_prefix("power")
            .and_then(|step| step.parse::<u8>().ok())
            .filter(|&step| step <= 10)
            .map(TapPattern::Power),
    };
    pattern.ok_or_else(|| ValidationError::UnknownPattern(value.to_string()))
}

/// Display label for a pattern, the inverse of [`parse_pattern`].
pub fn pattern_label(pattern: TapPattern) -> String {
    match pattern.normalized() {
        TapPattern::Power(step) => format!("power{step}"),
        other => other.name().to_string(),
    }
}
