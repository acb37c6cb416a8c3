//! Comb size sweeps and spread-threshold continuity.

use serde::Serialize;
use tapdensity_core::{CompensationPath, DensityCompensator, TapPattern, TapSet};

/// Analysis of one comb size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SweepRow {
    /// Comb size in milliseconds.
    pub comb_size_ms: f32,
    /// Tap count after the engine limit.
    pub taps: usize,
    /// Pattern id.
    pub pattern: u8,
    /// Comb span in samples.
    pub span_samples: f32,
    /// Distinct integer positions.
    pub unique_positions: usize,
    /// Most taps sharing one position.
    pub largest_group: usize,
    /// Mean adjacent correlation.
    pub adjacent_correlation: f32,
    /// `effective_gain / N`.
    pub gain_multiplication: f32,
    /// `Σ k² / N`.
    pub coherent_gain_multiplication: f32,
    /// Unclamped adaptive factor.
    pub adaptive_factor: f32,
    /// Compensated gain.
    pub gain: f32,
    /// Gain relative to `1/N`, in dB.
    pub attenuation_db: f32,
    /// True when the engine skipped the analysis.
    pub spread: bool,
}

/// Analyze one tap set with `engine`.
pub fn analyze_row(engine: &DensityCompensator, tap_set: &TapSet) -> SweepRow {
    let limited = engine.limit(tap_set);
    let metrics = engine.analyze(&limited);
    let c = engine.compensate(&limited);
    SweepRow {
        comb_size_ms: limited.comb_size() * 1000.0,
        taps: limited.tap_count(),
        pattern: limited.pattern().index(),
        span_samples: limited.span_samples(engine.sample_rate()),
        unique_positions: metrics.unique_positions,
        largest_group: metrics.largest_group,
        adjacent_correlation: metrics.adjacent_correlation,
        gain_multiplication: metrics.gain_multiplication,
        coherent_gain_multiplication: metrics.coherent_gain_multiplication,
        adaptive_factor: c.adaptive_factor,
        gain: c.gain,
        attenuation_db: c.attenuation_db(),
        spread: c.path == CompensationPath::Spread,
    }
}

/// `steps` comb sizes from `min_ms` to `max_ms`, logarithmically spaced.
///
/// Returns `[min_ms]` for one step and nothing for zero steps. Both ends must
/// be positive.
pub fn log_spaced(min_ms: f32, max_ms: f32, steps: usize) -> Vec<f32> {
    match steps {
        0 => Vec::new(),
        1 => vec![min_ms],
        _ => {
            let ratio = (max_ms / min_ms).ln();
            (0..steps)
                .map(|i| min_ms * (ratio * i as f32 / (steps - 1) as f32).exp())
                .collect()
        }
    }
}

/// Analyze `taps` taps of `pattern` at each comb size in `sizes_ms`.
///
/// # Example
///
/// ```rust
/// use tapdensity_analysis::{log_spaced, sweep_comb_sizes};
/// use tapdensity_core::{DensityCompensator, TapPattern};
///
/// let engine = DensityCompensator::new(44100.0);
/// let rows = sweep_comb_sizes(&engine, 64, TapPattern::Linear, log_spaced(0.1, 10.0, 5));
///
/// assert_eq!(rows.len(), 5);
/// assert!(!rows[0].spread);
/// assert!(rows[4].spread);
/// ```
pub fn sweep_comb_sizes(
    engine: &DensityCompensator,
    taps: usize,
    pattern: TapPattern,
    sizes_ms: impl IntoIterator<Item = f32>,
) -> Vec<SweepRow> {
    sizes_ms
        .into_iter()
        .map(|ms| analyze_row(engine, &TapSet::from_millis(ms, taps, pattern)))
        .collect()
}

/// Level step where a tap set crosses the spread threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundaryStep {
    /// Comb size at the threshold in milliseconds.
    pub threshold_ms: f32,
    /// Gain relative to `1/N` just below the threshold, in dB.
    pub below_db: f32,
    /// Gain relative to `1/N` just above the threshold, in dB.
    pub above_db: f32,
}

impl BoundaryStep {
    /// Level jump when the comb grows across the threshold, in dB.
    pub fn step_db(&self) -> f32 {
        self.above_db - self.below_db
    }
}

/// Measure the level step at the spread threshold for `taps` taps of `pattern`.
///
/// Compares comb sizes `(1 ± relative_offset)` times the threshold size.
pub fn boundary_step(
    engine: &DensityCompensator,
    taps: usize,
    pattern: TapPattern,
    relative_offset: f32,
) -> BoundaryStep {
    let taps = taps.clamp(1, engine.max_taps());
    let threshold_span = engine.tuning().spread_threshold * taps as f32;
    let threshold_ms = threshold_span / engine.sample_rate() * 1000.0;

    let level = |ms: f32| {
        engine
            .compensate(&TapSet::from_millis(ms, taps, pattern))
            .attenuation_db()
    };

    BoundaryStep {
        threshold_ms,
        below_db: level(threshold_ms * (1.0 - relative_offset)),
        above_db: level(threshold_ms * (1.0 + relative_offset)),
    }
}

/// Largest boundary step over tap counts `1..=max_taps` for `pattern`.
///
/// Returns `(taps, step)` for the worst tap count.
pub fn worst_boundary_step(
    engine: &DensityCompensator,
    pattern: TapPattern,
    relative_offset: f32,
) -> (usize, BoundaryStep) {
    (1..=engine.max_taps())
        .map(|taps| (taps, boundary_step(engine, taps, pattern, relative_offset)))
        .max_by(|a, b| a.1.step_db().abs().total_cmp(&b.1.step_db().abs()))
        .unwrap_or_else(|| (1, boundary_step(engine, 1, pattern, relative_offset)))
}
