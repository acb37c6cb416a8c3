//! Tap sets and their per-tap delays.
//!
//! [`TapSet`] is the configuration supplied by the parameter layer. [`TapLayout`]
//! turns it into one [`TapDelay`] per tap: the delay in samples split into the
//! integer buffer position and the fractional remainder used for interpolation.
//!
//! The same layout feeds the clustering analysis and the delay-buffer reader,
//! so gain and tap placement can never disagree.
//!
//! # Memory
//!
//! [`TapLayout`] is a fixed-capacity array of [`MAX_TAPS`] entries. Computing a
//! layout never allocates.

use libm::{exp2f, floorf};

use crate::pattern::{TapPattern, morphed_tap_ratio};

/// Hard ceiling on the number of taps in one set.
pub const MAX_TAPS: usize = 64;

/// Absolute delay in samples for a tap ratio.
///
/// `ratio * comb_size_seconds * sample_rate`. Every delay in the crate goes
/// through this function.
#[inline]
pub fn delay_samples(ratio: f32, comb_size_seconds: f32, sample_rate: f32) -> f32 {
    ratio * comb_size_seconds * sample_rate
}

/// One tap's delay, split for an interpolated buffer read.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TapDelay {
    /// Delay in samples.
    pub samples: f32,
    /// `floor(samples)`: integer read position.
    pub position: usize,
    /// `samples - position`, in `[0, 1)`.
    pub fraction: f32,
}

impl TapDelay {
    /// Split a non-negative delay in samples.
    #[inline]
    pub fn from_samples(samples: f32) -> Self {
        debug_assert!(samples >= 0.0, "negative tap delay {samples}");
        let samples = samples.max(0.0);
        let whole = floorf(samples);
        Self {
            samples,
            position: whole as usize,
            fraction: samples - whole,
        }
    }
}

/// Active tap configuration.
///
/// Any change to a field invalidates cached compensation; equality is the
/// cache key (see [`DensityCompensator::update`](crate::DensityCompensator::update)).
///
/// # Example
///
/// ```rust
/// use tapdensity_core::{TapPattern, TapSet};
///
/// let set = TapSet::from_millis(2.0, 16, TapPattern::SquareRoot);
/// assert_eq!(set.tap_count(), 16);
/// assert!((set.comb_size() - 0.002).abs() < 1e-9);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TapSet {
    comb_size: f32,
    tap_count: usize,
    pattern: TapPattern,
    pitch_cv: f32,
}

impl TapSet {
    /// Create a tap set from a comb size in seconds.
    ///
    /// Requires `comb_size_seconds >= 0` and `1 <= tap_count <= MAX_TAPS`;
    /// values from the parameter layer are validated before they get here.
    pub fn new(comb_size_seconds: f32, tap_count: usize, pattern: TapPattern) -> Self {
        debug_assert!(comb_size_seconds >= 0.0, "negative comb size");
        debug_assert!(
            (1..=MAX_TAPS).contains(&tap_count),
            "tap count {tap_count} out of range"
        );
        Self {
            comb_size: comb_size_seconds,
            tap_count,
            pattern: pattern.normalized(),
            pitch_cv: 0.0,
        }
    }

    /// Create a tap set from a comb size in milliseconds.
    pub fn from_millis(comb_size_ms: f32, tap_count: usize, pattern: TapPattern) -> Self {
        Self::new(comb_size_ms / 1000.0, tap_count, pattern)
    }

    /// Set the pitch CV in octaves. Each octave up halves the comb span.
    pub fn with_pitch_cv(mut self, pitch_cv: f32) -> Self {
        self.pitch_cv = pitch_cv;
        self
    }

    /// Replace the tap count.
    pub fn with_tap_count(mut self, tap_count: usize) -> Self {
        debug_assert!((1..=MAX_TAPS).contains(&tap_count));
        self.tap_count = tap_count;
        self
    }

    /// Comb size in seconds, before pitch CV scaling.
    #[inline]
    pub fn comb_size(&self) -> f32 {
        self.comb_size
    }

    /// Number of taps.
    #[inline]
    pub fn tap_count(&self) -> usize {
        self.tap_count
    }

    /// Tap distribution pattern.
    #[inline]
    pub fn pattern(&self) -> TapPattern {
        self.pattern
    }

    /// Pitch CV in octaves.
    #[inline]
    pub fn pitch_cv(&self) -> f32 {
        self.pitch_cv
    }

    /// Comb size in seconds after pitch CV scaling (`size * 2^-cv`).
    #[inline]
    pub fn effective_size(&self) -> f32 {
        if self.pitch_cv == 0.0 {
            self.comb_size
        } else {
            self.comb_size * exp2f(-self.pitch_cv)
        }
    }

    /// Full comb span in samples (delay of a tap at ratio 1.0).
    #[inline]
    pub fn span_samples(&self, sample_rate: f32) -> f32 {
        delay_samples(1.0, self.effective_size(), sample_rate)
    }
}

/// Per-tap delays of a [`TapSet`].
///
/// # Example
///
/// ```rust
/// use tapdensity_core::{TapLayout, TapPattern, TapSet};
///
/// let layout = TapLayout::compute(&TapSet::from_millis(1.0, 4, TapPattern::Linear), 48000.0);
/// let positions: Vec<usize> = layout.iter().map(|d| d.position).collect();
/// assert_eq!(positions, [12, 24, 36, 48]);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct TapLayout {
    delays: [TapDelay; MAX_TAPS],
    len: usize,
}

impl TapLayout {
    /// Compute the delay of every tap in `tap_set`.
    pub fn compute(tap_set: &TapSet, sample_rate: f32) -> Self {
        let count = tap_set.tap_count().min(MAX_TAPS);
        let size = tap_set.effective_size();
        let pattern = tap_set.pattern();
        Self::from_fn(count, |tap| {
            delay_samples(pattern.ratio(tap, count), size, sample_rate)
        })
    }

    /// Compute delays for a continuous (smoothed) pattern value.
    ///
    /// Uses [`morphed_tap_ratio`]; the pattern stored in `tap_set` is ignored.
    pub fn compute_morphed(tap_set: &TapSet, pattern_value: f32, sample_rate: f32) -> Self {
        let count = tap_set.tap_count().min(MAX_TAPS);
        let size = tap_set.effective_size();
        Self::from_fn(count, |tap| {
            delay_samples(morphed_tap_ratio(tap, count, pattern_value), size, sample_rate)
        })
    }

    /// Build a layout from raw delays in samples (at most [`MAX_TAPS`] are kept).
    pub fn from_delay_samples(samples: &[f32]) -> Self {
        let count = samples.len().min(MAX_TAPS);
        Self::from_fn(count, |tap| samples[tap])
    }

    fn from_fn(count: usize, mut delay_of: impl FnMut(usize) -> f32) -> Self {
        let mut delays = [TapDelay::default(); MAX_TAPS];
        for (tap, slot) in delays.iter_mut().take(count).enumerate() {
            *slot = TapDelay::from_samples(delay_of(tap));
        }
        Self { delays, len: count }
    }

    /// The tap delays, in tap order.
    #[inline]
    pub fn delays(&self) -> &[TapDelay] {
        &self.delays[..self.len]
    }

    /// Number of taps.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when the layout holds no taps.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterate the tap delays.
    pub fn iter(&self) -> impl Iterator<Item = &TapDelay> {
        self.delays().iter()
    }

    /// Delay of one tap.
    #[inline]
    pub fn get(&self, tap: usize) -> Option<&TapDelay> {
        self.delays().get(tap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_split_keeps_fraction_in_unit_interval() {
        for &s in &[0.0f32, 0.25, 1.0, 4.41, 127.999, 441.0] {
            let d = TapDelay::from_samples(s);
            assert!((0.0..1.0).contains(&d.fraction), "{s}: {d:?}");
            assert!((d.position as f32 + d.fraction - s).abs() < 1e-4);
        }
    }

    #[test]
    fn layout_matches_delay_formula() {
        let set = TapSet::from_millis(0.1, 64, TapPattern::Linear);
        let layout = TapLayout::compute(&set, 44100.0);
        assert_eq!(layout.len(), 64);

        let last = layout.get(63).map(|d| d.samples).unwrap_or_default();
        assert!((last - 4.41).abs() < 1e-3, "last tap at {last}");
        assert_eq!(layout.get(63).map(|d| d.position), Some(4));
    }

    #[test]
    fn pitch_cv_halves_span_per_octave() {
        let set = TapSet::from_millis(10.0, 8, TapPattern::Linear);
        let up = set.with_pitch_cv(1.0);
        assert!((up.span_samples(48000.0) - set.span_samples(48000.0) * 0.5).abs() < 1e-3);

        let layout = TapLayout::compute(&up, 48000.0);
        assert!((layout.delays()[7].samples - 240.0).abs() < 1e-2);
    }

    #[test]
    fn zero_comb_size_collapses_all_taps() {
        let layout = TapLayout::compute(&TapSet::new(0.0, 16, TapPattern::Quadratic), 48000.0);
        assert!(layout.iter().all(|d| d.position == 0 && d.fraction == 0.0));
    }

    #[test]
    fn from_delay_samples_truncates_to_capacity() {
        let raw = [1.5f32; 80];
        let layout = TapLayout::from_delay_samples(&raw);
        assert_eq!(layout.len(), MAX_TAPS);
        assert!(layout.iter().all(|d| d.position == 1 && d.fraction == 0.5));
    }

    #[test]
    fn morphed_layout_matches_discrete_at_integral_values() {
        let set = TapSet::from_millis(3.0, 24, TapPattern::Exponential);
        let discrete = TapLayout::compute(&set, 48000.0);
        let morphed = TapLayout::compute_morphed(&set, 2.0, 48000.0);
        assert_eq!(discrete.delays(), morphed.delays());
    }
}
