//! Tap clustering analysis.
//!
//! Two signals describe how far a tap set is from the "independent taps"
//! assumption behind `1/N` normalization:
//!
//! - **Position collisions**: taps whose delays floor to the same integer
//!   sample read (almost) the same data. [`PositionGroups`] partitions the taps
//!   by integer position.
//! - **Proximity correlation**: neighbouring taps a fraction of a sample apart
//!   are strongly correlated even when their integer positions differ.
//!   [`adjacent_correlation`] averages `exp(-|Δdelay|)` over adjacent taps.
//!
//! Inside one position group the fractional offsets still decorrelate the
//! taps through interpolation. [`fractional_coherence`] measures that with a
//! sharper kernel, `exp(-sensitivity · |Δfraction|)`, because fractional
//! differences matter far more than whole-sample spacing.
//!
//! ## Effective gain
//!
//! Each group of `k` taps contributes `k · coherence` effective taps (a lone
//! tap contributes exactly 1.0). The sum over groups divided by `N` is the gain
//! multiplication, which lies in `[unique_positions / N, 1]`.

use libm::expf;

use crate::tap::{MAX_TAPS, TapDelay, TapLayout};

/// Default sharpness of the intra-group fractional correlation kernel.
///
/// Empirical calibration constant, not derived from a perceptual model.
pub const DEFAULT_FRACTION_SENSITIVITY: f32 = 10.0;

/// Partition of taps by integer delay position.
///
/// Group `g` holds the taps whose delay floors to the `g`-th smallest occupied
/// position. Taps inside a group keep tap order. Storage is fixed-capacity
/// (compressed rows over [`MAX_TAPS`] entries), so building the partition does
/// not allocate.
///
/// # Example
///
/// ```rust
/// use tapdensity_core::{PositionGroups, TapLayout};
///
/// let layout = TapLayout::from_delay_samples(&[0.2, 0.7, 1.1, 3.0, 3.5]);
/// let groups = PositionGroups::from_delays(layout.delays());
///
/// assert_eq!(groups.len(), 3);
/// assert_eq!(groups.position(2), 3);
/// assert_eq!(groups.taps(0), &[0, 1]);
/// assert_eq!(groups.largest(), 2);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct PositionGroups {
    /// Occupied positions, ascending.
    positions: [usize; MAX_TAPS],
    /// Row starts into `members`; group `g` is `starts[g]..starts[g + 1]`.
    starts: [u8; MAX_TAPS + 1],
    /// Tap indices grouped by position.
    members: [u8; MAX_TAPS],
    len: usize,
}

impl PositionGroups {
    /// Group the taps of `delays` by integer position.
    ///
    /// At most [`MAX_TAPS`] delays are considered.
    pub fn from_delays(delays: &[TapDelay]) -> Self {
        debug_assert!(delays.len() <= MAX_TAPS);
        let delays = &delays[..delays.len().min(MAX_TAPS)];

        // Sorted set of occupied positions
        let mut positions = [0usize; MAX_TAPS];
        let mut len = 0;
        for delay in delays {
            if let Err(slot) = positions[..len].binary_search(&delay.position) {
                positions.copy_within(slot..len, slot + 1);
                positions[slot] = delay.position;
                len += 1;
            }
        }

        let mut group_of = [0u8; MAX_TAPS];
        let mut counts = [0u8; MAX_TAPS];
        for (tap, delay) in delays.iter().enumerate() {
            let (Ok(group) | Err(group)) = positions[..len].binary_search(&delay.position);
            group_of[tap] = group as u8;
            counts[group] += 1;
        }

        let mut starts = [0u8; MAX_TAPS + 1];
        for group in 0..len {
            starts[group + 1] = starts[group] + counts[group];
        }

        // Counting sort keeps tap order inside each group
        let mut cursor = starts;
        let mut members = [0u8; MAX_TAPS];
        for tap in 0..delays.len() {
            let group = group_of[tap] as usize;
            members[cursor[group] as usize] = tap as u8;
            cursor[group] += 1;
        }

        Self {
            positions,
            starts,
            members,
            len,
        }
    }

    /// Number of groups, i.e. distinct integer positions.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when no taps were grouped.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Integer position shared by group `group`.
    #[inline]
    pub fn position(&self, group: usize) -> usize {
        self.positions[..self.len][group]
    }

    /// Tap indices in group `group`, in tap order.
    #[inline]
    pub fn taps(&self, group: usize) -> &[u8] {
        let start = self.starts[group] as usize;
        let end = self.starts[group + 1] as usize;
        &self.members[start..end]
    }

    /// Size of the largest group (0 when empty).
    pub fn largest(&self) -> usize {
        (0..self.len)
            .map(|g| self.taps(g).len())
            .max()
            .unwrap_or(0)
    }

    /// Iterate `(position, taps)` per group, ascending by position.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[u8])> {
        (0..self.len).map(move |g| (self.positions[g], self.taps(g)))
    }
}

/// Number of distinct integer positions among `delays`.
#[inline]
pub fn unique_positions(delays: &[TapDelay]) -> usize {
    PositionGroups::from_delays(delays).len()
}

/// Mean `exp(-|delay_i - delay_{i-1}|)` over adjacent taps.
///
/// Returns 0 for fewer than two taps. The result lies in `[0, 1]`.
pub fn adjacent_correlation(delays: &[TapDelay]) -> f32 {
    if delays.len() < 2 {
        return 0.0;
    }

    let total: f32 = delays
        .windows(2)
        .map(|pair| expf(-(pair[1].samples - pair[0].samples).abs()))
        .sum();
    total / (delays.len() - 1) as f32
}

/// Mean fractional correlation over all ordered pairs of `taps`, self pairs
/// included: `mean(exp(-sensitivity · |fraction_a - fraction_b|))`.
///
/// Lies in `[1/k, 1]` for `k` taps; 1.0 for a single tap, 0.0 for none.
pub fn fractional_coherence(delays: &[TapDelay], taps: &[u8], sensitivity: f32) -> f32 {
    let k = taps.len();
    if k == 0 {
        return 0.0;
    }
    pair_sum(delays, taps, sensitivity) / (k * k) as f32
}

fn pair_sum(delays: &[TapDelay], taps: &[u8], sensitivity: f32) -> f32 {
    let mut sum = 0.0f32;
    for &a in taps {
        let fa = delays[a as usize].fraction;
        for &b in taps {
            let fb = delays[b as usize].fraction;
            sum += expf(-sensitivity * (fa - fb).abs());
        }
    }
    sum
}

/// Clustering summary of one tap layout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClusteringMetrics {
    /// Number of taps analyzed.
    pub tap_count: usize,
    /// Distinct integer positions, in `[1, tap_count]` for a non-empty layout.
    pub unique_positions: usize,
    /// Size of the most crowded position.
    pub largest_group: usize,
    /// Mean adjacent-tap correlation, see [`adjacent_correlation`].
    pub adjacent_correlation: f32,
    /// Sum of per-group effective tap contributions.
    pub effective_gain: f32,
    /// `effective_gain / tap_count`, in `[unique_positions / tap_count, 1]`.
    pub gain_multiplication: f32,
    /// `Σ k² / tap_count`: gain build-up if every group summed fully coherently.
    pub coherent_gain_multiplication: f32,
    contributions: [f32; MAX_TAPS],
}

impl ClusteringMetrics {
    /// Effective tap contribution of each position group, ascending by position.
    pub fn group_contributions(&self) -> &[f32] {
        &self.contributions[..self.unique_positions]
    }

    /// True when no two taps share an integer position.
    pub fn is_unclustered(&self) -> bool {
        self.unique_positions == self.tap_count
    }
}

/// Computes [`ClusteringMetrics`] for tap layouts.
///
/// # Example
///
/// ```rust
/// use tapdensity_core::{ClusterAnalyzer, TapLayout, TapPattern, TapSet};
///
/// let layout = TapLayout::compute(&TapSet::from_millis(0.1, 64, TapPattern::Linear), 44100.0);
/// let metrics = ClusterAnalyzer::default().analyze(layout.delays());
///
/// assert_eq!(metrics.unique_positions, 5);
/// assert!(metrics.coherent_gain_multiplication > 2.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClusterAnalyzer {
    fraction_sensitivity: f32,
}

impl Default for ClusterAnalyzer {
    fn default() -> Self {
        Self::new(DEFAULT_FRACTION_SENSITIVITY)
    }
}

impl ClusterAnalyzer {
    /// Create an analyzer with the given fractional correlation sensitivity.
    pub fn new(fraction_sensitivity: f32) -> Self {
        Self {
            fraction_sensitivity,
        }
    }

    /// Fractional correlation sensitivity.
    pub fn fraction_sensitivity(&self) -> f32 {
        self.fraction_sensitivity
    }

    /// Analyze a tap layout.
    pub fn analyze_layout(&self, layout: &TapLayout) -> ClusteringMetrics {
        self.analyze(layout.delays())
    }

    /// Analyze per-tap delays.
    ///
    /// O(N²) in the worst case (one group holding every tap); N ≤ 64.
    pub fn analyze(&self, delays: &[TapDelay]) -> ClusteringMetrics {
        let delays = &delays[..delays.len().min(MAX_TAPS)];
        let groups = PositionGroups::from_delays(delays);

        let mut contributions = [0.0f32; MAX_TAPS];
        let mut effective_gain = 0.0f32;
        let mut coherent = 0.0f32;
        for (group, (_, taps)) in groups.iter().enumerate() {
            let k = taps.len() as f32;
            // k · (pair_sum / k²), written so a lone tap gives exactly 1.0
            let contribution = pair_sum(delays, taps, self.fraction_sensitivity) / k;
            contributions[group] = contribution;
            effective_gain += contribution;
            coherent += k * k;
        }

        let n = delays.len();
        let (gain_multiplication, coherent_gain_multiplication) = if n == 0 {
            (0.0, 0.0)
        } else {
            (effective_gain / n as f32, coherent / n as f32)
        };

        ClusteringMetrics {
            tap_count: n,
            unique_positions: groups.len(),
            largest_group: groups.largest(),
            adjacent_correlation: adjacent_correlation(delays),
            effective_gain,
            gain_multiplication,
            coherent_gain_multiplication,
            contributions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{TapPattern, TapSet};

    fn layout(samples: &[f32]) -> TapLayout {
        TapLayout::from_delay_samples(samples)
    }

    #[test]
    fn groups_partition_all_taps() {
        let l = layout(&[3.2, 0.1, 3.9, 1.0, 0.4, 7.5]);
        let groups = PositionGroups::from_delays(l.delays());

        let mut seen = [false; 6];
        for (_, taps) in groups.iter() {
            for &tap in taps {
                assert!(!seen[tap as usize], "tap {tap} in two groups");
                seen[tap as usize] = true;
            }
        }
        assert!(seen.iter().all(|&s| s));

        let positions: Vec<usize> = groups.iter().map(|(p, _)| p).collect();
        assert_eq!(positions, [0, 1, 3, 7]);
        assert_eq!(groups.taps(0), &[1, 4]);
        assert_eq!(groups.taps(2), &[0, 2]);
    }

    #[test]
    fn all_distinct_positions_have_no_clustering() {
        let l = layout(&[0.5, 2.5, 4.5, 6.5]);
        let metrics = ClusterAnalyzer::default().analyze(l.delays());
        assert!(metrics.is_unclustered());
        assert_eq!(metrics.effective_gain, 4.0);
        assert_eq!(metrics.gain_multiplication, 1.0);
        assert_eq!(metrics.coherent_gain_multiplication, 1.0);
        assert!(metrics.group_contributions().iter().all(|&c| c == 1.0));
    }

    #[test]
    fn single_tap_needs_no_special_case() {
        let l = layout(&[0.3]);
        let metrics = ClusterAnalyzer::default().analyze(l.delays());
        assert_eq!(metrics.unique_positions, 1);
        assert_eq!(metrics.effective_gain, 1.0);
        assert_eq!(metrics.gain_multiplication, 1.0);
        assert_eq!(metrics.adjacent_correlation, 0.0);
    }

    #[test]
    fn identical_fractions_are_fully_coherent() {
        let l = layout(&[2.25, 2.25, 2.25]);
        let metrics = ClusterAnalyzer::default().analyze(l.delays());
        assert_eq!(metrics.unique_positions, 1);
        assert_eq!(metrics.largest_group, 3);
        assert!((metrics.effective_gain - 3.0).abs() < 1e-6);
        assert!((metrics.gain_multiplication - 1.0).abs() < 1e-6);
        assert!((metrics.coherent_gain_multiplication - 3.0).abs() < 1e-6);
        assert!((metrics.adjacent_correlation - 1.0).abs() < 1e-6);
    }

    #[test]
    fn spread_fractions_partially_decorrelate() {
        // Two taps in one sample, half a sample apart
        let l = layout(&[5.0, 5.5]);
        let metrics = ClusterAnalyzer::default().analyze(l.delays());
        // mean of {1, 1, e^-5, e^-5} times 2
        let expected = 2.0 * (2.0 + 2.0 * libm::expf(-5.0)) / 4.0;
        assert!((metrics.effective_gain - expected).abs() < 1e-5);
        assert!(metrics.effective_gain > 1.0 && metrics.effective_gain < 2.0);
    }

    #[test]
    fn sensitivity_controls_fraction_kernel() {
        let l = layout(&[5.0, 5.5]);
        let sharp = ClusterAnalyzer::new(40.0).analyze(l.delays());
        let soft = ClusterAnalyzer::new(1.0).analyze(l.delays());
        assert!(sharp.effective_gain < soft.effective_gain);
    }

    #[test]
    fn adjacent_correlation_decays_with_spacing() {
        let tight = adjacent_correlation(layout(&[0.0, 0.1, 0.2]).delays());
        let loose = adjacent_correlation(layout(&[0.0, 3.0, 6.0]).delays());
        assert!((tight - libm::expf(-0.1)).abs() < 1e-5);
        assert!((loose - libm::expf(-3.0)).abs() < 1e-5);
        assert_eq!(adjacent_correlation(&[]), 0.0);
    }

    #[test]
    fn fractional_coherence_bounds() {
        let l = layout(&[1.0, 1.3, 1.9]);
        let c = fractional_coherence(l.delays(), &[0, 1, 2], DEFAULT_FRACTION_SENSITIVITY);
        assert!(c >= 1.0 / 3.0 && c <= 1.0);
        assert_eq!(fractional_coherence(l.delays(), &[1], 10.0), 1.0);
        assert_eq!(fractional_coherence(l.delays(), &[], 10.0), 0.0);
    }

    #[test]
    fn tight_linear_comb_clusters_into_five_positions() {
        let set = TapSet::from_millis(0.1, 64, TapPattern::Linear);
        let l = TapLayout::compute(&set, 44100.0);
        let metrics = ClusterAnalyzer::default().analyze_layout(&l);

        assert_eq!(metrics.unique_positions, 5);
        assert_eq!(metrics.largest_group, 15);
        assert!((metrics.coherent_gain_multiplication - 13.72).abs() < 0.01);
        assert!(metrics.gain_multiplication >= 5.0 / 64.0);
        assert!(metrics.adjacent_correlation > 0.9);
    }
}
