//! Engine configuration file format.

use serde::{Deserialize, Serialize};
use std::path::Path;

use tapdensity_core::{CompensationTuning, DensityCompensator, MAX_TAPS};

use crate::error::{ConfigError, write_with_parent};
use crate::validation::{
    ValidationError, ValidationResult, collect, validate_max_taps, validate_sample_rate,
    validate_tuning,
};

/// Compensation engine configuration.
///
/// Sample rate, tap limit and tuning constants are fixed when the engine is
/// built; this is the serialized form of those choices.
///
/// # TOML Format
///
/// ```toml
/// sample_rate = 48000
/// max_taps = 64
///
/// [tuning]
/// fraction_sensitivity = 10.0
/// correlation_scale = 2.0
/// spread_threshold = 2.0
/// max_attenuation_ratio = 0.1
/// ```
///
/// Every field is optional and falls back to the defaults shown above.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    /// Sample rate in Hz.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Maximum tap count; larger tap sets are truncated.
    #[serde(default = "default_max_taps")]
    pub max_taps: usize,

    /// Calibration constants.
    #[serde(default)]
    pub tuning: TuningConfig,
}

/// Serialized [`CompensationTuning`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TuningConfig {
    /// Sharpness of the intra-group fractional correlation kernel.
    pub fraction_sensitivity: f32,
    /// Scale of adjacent correlation into the correlation factor.
    pub correlation_scale: f32,
    /// Span in samples per tap above which analysis is skipped.
    pub spread_threshold: f32,
    /// Lowest allowed gain as a fraction of `1/N`.
    pub max_attenuation_ratio: f32,
}

fn default_sample_rate() -> u32 {
    48000
}

fn default_max_taps() -> usize {
    MAX_TAPS
}

impl Default for TuningConfig {
    fn default() -> Self {
        CompensationTuning::default().into()
    }
}

impl From<CompensationTuning> for TuningConfig {
    fn from(tuning: CompensationTuning) -> Self {
        Self {
            fraction_sensitivity: tuning.fraction_sensitivity,
            correlation_scale: tuning.correlation_scale,
            spread_threshold: tuning.spread_threshold,
            max_attenuation_ratio: tuning.max_attenuation_ratio,
        }
    }
}

impl From<TuningConfig> for CompensationTuning {
    fn from(config: TuningConfig) -> Self {
        Self {
            fraction_sensitivity: config.fraction_sensitivity,
            correlation_scale: config.correlation_scale,
            spread_threshold: config.spread_threshold,
            max_attenuation_ratio: config.max_attenuation_ratio,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            max_taps: default_max_taps(),
            tuning: TuningConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Default configuration at `sample_rate`.
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            ..Self::default()
        }
    }

    /// Set the tap limit.
    pub fn with_max_taps(mut self, max_taps: usize) -> Self {
        self.max_taps = max_taps;
        self
    }

    /// Set the tuning constants.
    pub fn with_tuning(mut self, tuning: CompensationTuning) -> Self {
        self.tuning = tuning.into();
        self
    }

    /// Load a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Load a configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the configuration to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        write_with_parent(path.as_ref(), &self.to_toml()?)
    }

    /// Convert the configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Tuning constants in engine form.
    pub fn tuning(&self) -> CompensationTuning {
        self.tuning.into()
    }

    /// Check sample rate, tap limit and tuning.
    pub fn validate(&self) -> ValidationResult<()> {
        let mut errors: Vec<ValidationError> = Vec::new();
        if let Err(e) = validate_sample_rate(self.sample_rate as f32) {
            errors.push(e);
        }
        if let Err(e) = validate_max_taps(self.max_taps) {
            errors.push(e);
        }
        match validate_tuning(&self.tuning()) {
            Ok(()) => {}
            Err(ValidationError::Multiple(nested)) => errors.extend(nested),
            Err(e) => errors.push(e),
        }
        collect(errors)
    }

    /// Validate and build a compensation engine.
    pub fn build(&self) -> Result<DensityCompensator, ConfigError> {
        self.validate()?;
        Ok(DensityCompensator::new(self.sample_rate as f32)
            .with_max_taps(self.max_taps)
            .with_tuning(self.tuning()))
    }
}
