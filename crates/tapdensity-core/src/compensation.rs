//! Adaptive density compensation.
//!
//! Replaces plain `1/N` tap normalization with a gain that also accounts for
//! tap clustering:
//!
//! ```text
//! base      = 1 / N
//! position  = N / unique_positions
//! corr      = 1 + adjacent_correlation · correlation_scale
//! factor    = sqrt(position · corr)
//! gain      = clamp(base / factor, base · max_attenuation_ratio, base)
//! ```
//!
//! The geometric mean combines discrete position collisions and continuous
//! proximity correlation without counting either twice. The clamp keeps the
//! correction a pure attenuation of at most 10× (20 dB) with default tuning.
//!
//! ## Spread shortcut
//!
//! When the comb span exceeds `spread_threshold` samples per tap (2.0 by
//! default), average tap spacing is above two samples and adjacent correlation
//! is below `e^-2`. The analysis is skipped and `1/N` is returned with factor
//! 1.0. Skewed patterns can still cluster their first taps above that
//! threshold; the shortcut deliberately ignores them.
//!
//! ## Threading
//!
//! [`compensate`] is pure. Run it at parameter-change rate on a control thread
//! and hand the gain to the audio thread through a [`GainSlot`](crate::GainSlot);
//! the consumer smooths it.

use libm::sqrtf;

use crate::cluster::{
    ClusterAnalyzer, ClusteringMetrics, DEFAULT_FRACTION_SENSITIVITY, adjacent_correlation,
    unique_positions,
};
use crate::math::linear_to_db;
use crate::tap::{MAX_TAPS, TapLayout, TapSet};

/// Calibration constants for compensation and clustering analysis.
///
/// All defaults are empirical; expose them for calibration rather than
/// treating them as invariants.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CompensationTuning {
    /// Sharpness of the intra-group fractional correlation kernel (default 10).
    pub fraction_sensitivity: f32,
    /// Scale of adjacent correlation into the correlation factor (default 2).
    pub correlation_scale: f32,
    /// Span in samples per tap above which analysis is skipped (default 2).
    pub spread_threshold: f32,
    /// Lowest allowed gain as a fraction of `1/N` (default 0.1).
    pub max_attenuation_ratio: f32,
}

impl CompensationTuning {
    /// Default correlation scale.
    pub const DEFAULT_CORRELATION_SCALE: f32 = 2.0;
    /// Default spread threshold in samples per tap.
    pub const DEFAULT_SPREAD_THRESHOLD: f32 = 2.0;
    /// Default attenuation floor relative to `1/N`.
    pub const DEFAULT_MAX_ATTENUATION_RATIO: f32 = 0.1;

    /// Clustering analyzer configured with this tuning.
    pub fn analyzer(&self) -> ClusterAnalyzer {
        ClusterAnalyzer::new(self.fraction_sensitivity)
    }
}

impl Default for CompensationTuning {
    fn default() -> Self {
        Self {
            fraction_sensitivity: DEFAULT_FRACTION_SENSITIVITY,
            correlation_scale: Self::DEFAULT_CORRELATION_SCALE,
            spread_threshold: Self::DEFAULT_SPREAD_THRESHOLD,
            max_attenuation_ratio: Self::DEFAULT_MAX_ATTENUATION_RATIO,
        }
    }
}

/// Which branch produced a [`Compensation`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompensationPath {
    /// Span above the spread threshold; plain `1/N`, analysis skipped.
    Spread,
    /// Clustering analysis ran.
    Clustered,
}

/// Result of a compensation calculation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Compensation {
    /// Output gain to apply to the summed taps, in
    /// `[base_gain · max_attenuation_ratio, base_gain]`.
    pub gain: f32,
    /// Plain `1/N`.
    pub base_gain: f32,
    /// Unclamped clustering factor (1.0 on the spread path).
    pub adaptive_factor: f32,
    /// Branch taken.
    pub path: CompensationPath,
}

impl Compensation {
    /// Extra attenuation relative to `1/N`, in dB (zero or negative).
    pub fn attenuation_db(&self) -> f32 {
        linear_to_db(self.gain / self.base_gain)
    }

    /// True when the attenuation floor limited the gain.
    pub fn is_clamped(&self) -> bool {
        self.gain > self.base_gain / self.adaptive_factor
    }
}

/// Compute the compensated output gain for `tap_set`.
///
/// Deterministic: identical inputs give bit-identical output.
///
/// # Example
///
/// ```rust
/// use tapdensity_core::{CompensationPath, CompensationTuning, TapPattern, TapSet, compensate};
///
/// let tuning = CompensationTuning::default();
/// let c = compensate(&TapSet::from_millis(0.1, 64, TapPattern::Linear), 44100.0, &tuning);
///
/// assert_eq!(c.path, CompensationPath::Clustered);
/// assert!(c.attenuation_db() < -10.0);
/// assert!(c.gain >= c.base_gain * 0.1);
/// ```
pub fn compensate(tap_set: &TapSet, sample_rate: f32, tuning: &CompensationTuning) -> Compensation {
    let tap_count = tap_set.tap_count().clamp(1, MAX_TAPS);
    let n = tap_count as f32;
    let base_gain = 1.0 / n;

    if tap_set.span_samples(sample_rate) > n * tuning.spread_threshold {
        return Compensation {
            gain: base_gain,
            base_gain,
            adaptive_factor: 1.0,
            path: CompensationPath::Spread,
        };
    }

    let layout = TapLayout::compute(&tap_set.with_tap_count(tap_count), sample_rate);
    let delays = layout.delays();
    let unique = unique_positions(delays).max(1);

    let position_factor = n / unique as f32;
    let correlation_factor = 1.0 + adjacent_correlation(delays) * tuning.correlation_scale;
    let adaptive_factor = sqrtf(position_factor * correlation_factor);

    let floor = base_gain * tuning.max_attenuation_ratio;
    let gain = (base_gain / adaptive_factor).max(floor).min(base_gain);

    Compensation {
        gain,
        base_gain,
        adaptive_factor,
        path: CompensationPath::Clustered,
    }
}

/// Compensation engine with construction-time configuration and a result cache.
///
/// Sample rate, tap limit and tuning are fixed per engine so the same code runs
/// at any rate. [`update`](Self::update) caches the last result keyed by
/// [`TapSet`] equality; call it on every parameter change and it only
/// recomputes when something actually changed.
///
/// # Example
///
/// ```rust
/// use tapdensity_core::{DensityCompensator, TapPattern, TapSet};
///
/// let mut engine = DensityCompensator::new(48000.0).with_max_taps(32);
/// let set = TapSet::from_millis(0.5, 64, TapPattern::Quadratic);
///
/// let first = engine.update(&set);
/// assert!(engine.is_cached(&set));
/// assert_eq!(engine.update(&set), first);
/// assert_eq!(first.base_gain, 1.0 / 32.0);
/// ```
#[derive(Debug, Clone)]
pub struct DensityCompensator {
    sample_rate: f32,
    max_taps: usize,
    tuning: CompensationTuning,
    cached: Option<(TapSet, Compensation)>,
}

impl DensityCompensator {
    /// Create an engine for `sample_rate` with default tuning and
    /// [`MAX_TAPS`] as tap limit.
    pub fn new(sample_rate: f32) -> Self {
        debug_assert!(sample_rate > 0.0, "sample rate must be positive");
        Self {
            sample_rate,
            max_taps: MAX_TAPS,
            tuning: CompensationTuning::default(),
            cached: None,
        }
    }

    /// Limit the tap count; larger tap sets are truncated. Clamped to `1..=MAX_TAPS`.
    pub fn with_max_taps(mut self, max_taps: usize) -> Self {
        self.max_taps = max_taps.clamp(1, MAX_TAPS);
        self.cached = None;
        self
    }

    /// Replace the tuning constants.
    pub fn with_tuning(mut self, tuning: CompensationTuning) -> Self {
        self.set_tuning(tuning);
        self
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Tap limit.
    pub fn max_taps(&self) -> usize {
        self.max_taps
    }

    /// Tuning constants.
    pub fn tuning(&self) -> &CompensationTuning {
        &self.tuning
    }

    /// Change the sample rate. Drops the cache when the rate changes.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        debug_assert!(sample_rate > 0.0, "sample rate must be positive");
        if sample_rate != self.sample_rate {
            self.sample_rate = sample_rate;
            self.cached = None;
        }
    }

    /// Change the tuning constants. Drops the cache when they change.
    pub fn set_tuning(&mut self, tuning: CompensationTuning) {
        if tuning != self.tuning {
            self.tuning = tuning;
            self.cached = None;
        }
    }

    /// `tap_set` with its tap count limited to this engine's maximum.
    pub fn limit(&self, tap_set: &TapSet) -> TapSet {
        if tap_set.tap_count() > self.max_taps {
            tap_set.with_tap_count(self.max_taps)
        } else {
            *tap_set
        }
    }

    /// Compute compensation without touching the cache.
    pub fn compensate(&self, tap_set: &TapSet) -> Compensation {
        compensate(&self.limit(tap_set), self.sample_rate, &self.tuning)
    }

    /// Compute compensation, reusing the cached result when `tap_set` is
    /// unchanged since the last call.
    pub fn update(&mut self, tap_set: &TapSet) -> Compensation {
        if let Some((cached_set, result)) = self.cached
            && cached_set == *tap_set
        {
            return result;
        }

        let result = self.compensate(tap_set);
        self.cached = Some((*tap_set, result));

        #[cfg(feature = "tracing")]
        tracing::debug!(
            taps = tap_set.tap_count(),
            pattern = tap_set.pattern().index(),
            comb_size = tap_set.comb_size(),
            gain = result.gain,
            factor = result.adaptive_factor,
            path = ?result.path,
            "density compensation recomputed"
        );

        result
    }

    /// True when `tap_set` matches the cached result.
    pub fn is_cached(&self, tap_set: &TapSet) -> bool {
        matches!(self.cached, Some((cached_set, _)) if cached_set == *tap_set)
    }

    /// Drop the cached result.
    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    /// Tap delays for the buffer reader, from the same formulas as the gain.
    pub fn layout(&self, tap_set: &TapSet) -> TapLayout {
        TapLayout::compute(&self.limit(tap_set), self.sample_rate)
    }

    /// Full clustering metrics for `tap_set`, regardless of the spread shortcut.
    pub fn analyze(&self, tap_set: &TapSet) -> ClusteringMetrics {
        self.tuning.analyzer().analyze_layout(&self.layout(tap_set))
    }
}
