//! Tap count recommendations for short combs.
//!
//! Two independent limits:
//!
//! - **Spacing limit**: keep at least `min_spacing_samples` between taps on
//!   average, `floor(span / min_spacing)`.
//! - **Clustering limit**: the largest tap count whose coherent gain
//!   multiplication (`Σ k² / N` over position groups) stays at or below a
//!   threshold, found by scanning `1..=max_taps`.
//!
//! Both limits are capped at the engine tap limit, so a recommendation never
//! exceeds what the engine will run.
//!
//! The clustering scan is not monotone in N: adding a tap can spread existing
//! taps into new positions. The scan stops at the first tap count over the
//! threshold.

use serde::Serialize;
use tapdensity_core::{
    ClusterAnalyzer, DensityCompensator, MAX_TAPS, TapLayout, TapPattern, TapSet,
};

/// Default minimum average tap spacing in samples.
pub const DEFAULT_MIN_SPACING: f32 = 1.0;

/// Conservative minimum average tap spacing in samples.
pub const CONSERVATIVE_MIN_SPACING: f32 = 2.0;

/// Default coherent gain multiplication tolerated before limiting taps.
pub const DEFAULT_MAX_COHERENT_GAIN: f32 = 3.0;

/// Thresholds for [`recommend_max_taps`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecommendOptions {
    /// Minimum average spacing between taps in samples.
    pub min_spacing_samples: f32,
    /// Largest tolerated `Σ k² / N`.
    pub max_coherent_gain: f32,
    /// Pattern used for the clustering scan.
    pub pattern: TapPattern,
    /// Engine tap limit, clamped to `1..=MAX_TAPS`.
    pub max_taps: usize,
}

impl RecommendOptions {
    /// Options capped at the tap limit of `engine`.
    pub fn for_engine(engine: &DensityCompensator) -> Self {
        Self {
            max_taps: engine.max_taps(),
            ..Self::default()
        }
    }
}

impl Default for RecommendOptions {
    fn default() -> Self {
        Self {
            min_spacing_samples: DEFAULT_MIN_SPACING,
            max_coherent_gain: DEFAULT_MAX_COHERENT_GAIN,
            pattern: TapPattern::Linear,
            max_taps: MAX_TAPS,
        }
    }
}

/// Recommended tap limits for one comb size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TapRecommendation {
    /// Comb size in milliseconds.
    pub comb_size_ms: f32,
    /// Comb span in samples.
    pub span_samples: f32,
    /// Tap limit from average spacing.
    pub spacing_limit: usize,
    /// Tap limit from the clustering scan.
    pub clustering_limit: usize,
}

impl TapRecommendation {
    /// The stricter of both limits.
    pub fn recommended(&self) -> usize {
        self.spacing_limit.min(self.clustering_limit)
    }
}

/// Largest tap count keeping `min_spacing_samples` average spacing, in
/// `1..=max_taps`.
pub fn spacing_tap_limit(
    comb_size_ms: f32,
    sample_rate: f32,
    min_spacing_samples: f32,
    max_taps: usize,
) -> usize {
    let max_taps = max_taps.clamp(1, MAX_TAPS);
    let span = TapSet::from_millis(comb_size_ms, 1, TapPattern::Linear).span_samples(sample_rate);
    if min_spacing_samples <= 0.0 {
        return max_taps;
    }
    let limit = (span / min_spacing_samples).floor();
    if limit.is_nan() {
        1
    } else {
        (limit.min(max_taps as f32) as usize).max(1)
    }
}

/// Largest tap count before the coherent gain multiplication first exceeds
/// `max_coherent_gain`, in `1..=max_taps`.
pub fn clustering_tap_limit(
    comb_size_ms: f32,
    sample_rate: f32,
    pattern: TapPattern,
    max_coherent_gain: f32,
    max_taps: usize,
) -> usize {
    let max_taps = max_taps.clamp(1, MAX_TAPS);
    let analyzer = ClusterAnalyzer::default();
    for taps in 1..=max_taps {
        let set = TapSet::from_millis(comb_size_ms, taps, pattern);
        let metrics = analyzer.analyze_layout(&TapLayout::compute(&set, sample_rate));
        if metrics.coherent_gain_multiplication > max_coherent_gain {
            return (taps - 1).max(1);
        }
    }
    max_taps
}

/// Both tap limits for one comb size.
///
/// # Example
///
/// ```rust
/// use tapdensity_analysis::{RecommendOptions, recommend_max_taps};
///
/// let tight = recommend_max_taps(0.1, 44100.0, &RecommendOptions::default());
/// assert_eq!(tight.spacing_limit, 4);
/// assert!(tight.recommended() < 64);
///
/// let wide = recommend_max_taps(10.0, 44100.0, &RecommendOptions::default());
/// assert_eq!(wide.recommended(), 64);
/// ```
pub fn recommend_max_taps(
    comb_size_ms: f32,
    sample_rate: f32,
    options: &RecommendOptions,
) -> TapRecommendation {
    TapRecommendation {
        comb_size_ms,
        span_samples: TapSet::from_millis(comb_size_ms, 1, options.pattern)
            .span_samples(sample_rate),
        spacing_limit: spacing_tap_limit(
            comb_size_ms,
            sample_rate,
            options.min_spacing_samples,
            options.max_taps,
        ),
        clustering_limit: clustering_tap_limit(
            comb_size_ms,
            sample_rate,
            options.pattern,
            options.max_coherent_gain,
            options.max_taps,
        ),
    }
}
