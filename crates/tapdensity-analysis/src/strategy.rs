//! Side-by-side comparison of normalization strategies.
//!
//! | Strategy | Gain |
//! |----------|------|
//! | plain | `1/N` |
//! | correlation-aware | `(1/N) / sqrt(gain_multiplication)` |
//! | clustering-aware | `(1/N) / (N / unique_positions)` |
//! | hybrid | `sqrt(correlation-aware · clustering-aware)` |
//! | adaptive | [`compensate`](tapdensity_core::compensate), the engine's choice |
//!
//! Only the adaptive gain is bounded. The others are reported as-is so their
//! failure modes stay visible: correlation-aware never attenuates because
//! `gain_multiplication ≤ 1`, and clustering-aware over-attenuates dense combs.

use serde::Serialize;
use tapdensity_core::{
    ClusteringMetrics, Compensation, CompensationPath, CompensationTuning, TapLayout, TapSet,
    compensate, linear_to_db,
};

/// Gains of every strategy for one tap set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StrategyComparison {
    /// Plain `1/N`.
    pub base: f32,
    /// `base / sqrt(gain_multiplication)`.
    pub correlation_aware: f32,
    /// `base / (N / unique_positions)`.
    pub clustering_aware: f32,
    /// Geometric mean of correlation-aware and clustering-aware.
    pub hybrid: f32,
    /// Bounded engine gain.
    pub adaptive: f32,
    /// Whether the engine skipped the analysis.
    pub spread: bool,
}

impl StrategyComparison {
    /// Level of `gain` relative to plain `1/N`, in dB.
    pub fn relative_db(&self, gain: f32) -> f32 {
        linear_to_db(gain / self.base)
    }

    /// `(name, gain)` pairs in table order.
    pub fn entries(&self) -> [(&'static str, f32); 5] {
        [
            ("plain", self.base),
            ("correlation", self.correlation_aware),
            ("clustering", self.clustering_aware),
            ("hybrid", self.hybrid),
            ("adaptive", self.adaptive),
        ]
    }
}

/// Strategy gains from precomputed metrics and the engine result.
pub fn strategy_gains(metrics: &ClusteringMetrics, adaptive: &Compensation) -> StrategyComparison {
    let base = adaptive.base_gain;
    let correlation_aware = if metrics.gain_multiplication > 0.0 {
        base / metrics.gain_multiplication.sqrt()
    } else {
        base
    };
    let clustering_factor = if metrics.unique_positions > 0 {
        metrics.tap_count as f32 / metrics.unique_positions as f32
    } else {
        1.0
    };
    let clustering_aware = base / clustering_factor;

    StrategyComparison {
        base,
        correlation_aware,
        clustering_aware,
        hybrid: (correlation_aware * clustering_aware).sqrt(),
        adaptive: adaptive.gain,
        spread: adaptive.path == CompensationPath::Spread,
    }
}

/// Compare all strategies for `tap_set`.
///
/// # Example
///
/// ```rust
/// use tapdensity_analysis::compare_strategies;
/// use tapdensity_core::{CompensationTuning, TapPattern, TapSet};
///
/// let set = TapSet::from_millis(0.1, 64, TapPattern::Linear);
/// let cmp = compare_strategies(&set, 44100.0, &CompensationTuning::default());
///
/// assert!(cmp.adaptive < cmp.base);
/// assert!(cmp.clustering_aware < cmp.adaptive);
/// ```
pub fn compare_strategies(
    tap_set: &TapSet,
    sample_rate: f32,
    tuning: &CompensationTuning,
) -> StrategyComparison {
    let metrics = tuning
        .analyzer()
        .analyze_layout(&TapLayout::compute(tap_set, sample_rate));
    strategy_gains(&metrics, &compensate(tap_set, sample_rate, tuning))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tapdensity_core::TapPattern;

    #[test]
    fn unclustered_strategies_agree_on_base() {
        let set = TapSet::from_millis(10.0, 16, TapPattern::Linear);
        let cmp = compare_strategies(&set, 48000.0, &CompensationTuning::default());
        assert!(cmp.spread);
        for (name, gain) in cmp.entries() {
            assert!((gain - cmp.base).abs() < 1e-7, "{name}: {gain}");
        }
    }

    #[test]
    fn correlation_aware_never_attenuates() {
        let set = TapSet::from_millis(0.1, 64, TapPattern::Linear);
        let cmp = compare_strategies(&set, 44100.0, &CompensationTuning::default());
        assert!(cmp.correlation_aware >= cmp.base);
        assert!(cmp.relative_db(cmp.correlation_aware) >= 0.0);
    }

    #[test]
    fn clustering_aware_is_strictest_on_dense_combs() {
        let set = TapSet::from_millis(0.1, 64, TapPattern::Linear);
        let cmp = compare_strategies(&set, 44100.0, &CompensationTuning::default());
        // 64 taps in 5 positions
        assert!((cmp.clustering_aware - cmp.base * 5.0 / 64.0).abs() < 1e-7);
        assert!(cmp.clustering_aware < cmp.hybrid);
        assert!(cmp.adaptive >= cmp.base * 0.1);
        assert!(cmp.relative_db(cmp.adaptive) < -10.0);
    }
}
