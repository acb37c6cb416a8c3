//! Shared CLI arguments and helpers used across multiple commands.

use clap::Args;
use std::path::PathBuf;
use tapdensity_config::{
    EngineConfig, parse_pattern, validate_comb_size_ms, validate_pitch_cv, validate_tap_count,
};
use tapdensity_core::{DensityCompensator, TapPattern, TapSet};

/// Engine configuration options shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct EngineArgs {
    /// Engine configuration file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Sample rate in Hz (overrides the config file)
    #[arg(long)]
    pub sample_rate: Option<u32>,

    /// Maximum tap count (overrides the config file)
    #[arg(long)]
    pub max_taps: Option<usize>,
}

impl EngineArgs {
    /// Effective engine configuration: file (or defaults) plus overrides.
    pub fn engine_config(&self) -> anyhow::Result<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => {
                tracing::info!(path = %path.display(), "loading engine config");
                EngineConfig::load(path)?
            }
            None => EngineConfig::default(),
        };
        if let Some(sample_rate) = self.sample_rate {
            config.sample_rate = sample_rate;
        }
        if let Some(max_taps) = self.max_taps {
            config.max_taps = max_taps;
        }
        Ok(config)
    }

    /// Validate the effective configuration and build the engine.
    pub fn build(&self) -> anyhow::Result<DensityCompensator> {
        let engine = self.engine_config()?.build()?;
        tracing::debug!(
            sample_rate = engine.sample_rate(),
            max_taps = engine.max_taps(),
            "engine ready"
        );
        Ok(engine)
    }
}

/// One tap configuration from the command line.
#[derive(Args, Debug, Clone)]
pub struct TapArgs {
    /// Comb size in milliseconds
    #[arg(short, long, default_value = "1.0")]
    pub size: f32,

    /// Number of taps (1-64)
    #[arg(short, long, default_value = "64")]
    pub taps: usize,

    /// Tap pattern: id 0-15 or name (linear, log, exp, quadratic, sqrt, power0-power10)
    #[arg(short, long, default_value = "linear", value_parser = parse_pattern_arg)]
    pub pattern: TapPattern,

    /// Pitch CV in octaves (each octave up halves the comb span)
    #[arg(long, default_value = "0.0", allow_negative_numbers = true)]
    pub pitch_cv: f32,
}

impl TapArgs {
    /// Validate against the engine tap limit and build the tap set.
    pub fn tap_set(&self, engine: &DensityCompensator) -> anyhow::Result<TapSet> {
        validate_comb_size_ms(self.size)?;
        validate_tap_count(self.taps, engine.max_taps())?;
        validate_pitch_cv(self.pitch_cv)?;
        Ok(TapSet::from_millis(self.size, self.taps, self.pattern).with_pitch_cv(self.pitch_cv))
    }
}

/// Parse a pattern for clap's `value_parser`.
pub fn parse_pattern_arg(s: &str) -> Result<TapPattern, String> {
    parse_pattern(s).map_err(|e| e.to_string())
}

/// Print a value as pretty JSON on stdout.
pub fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Format a path label for display.
pub fn path_label(spread: bool) -> &'static str {
    if spread { "spread" } else { "clustered" }
}
