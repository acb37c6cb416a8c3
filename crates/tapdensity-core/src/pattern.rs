//! Tap placement curves.
//!
//! A pattern maps a tap index to a normalized position ratio in `[0, 1]` along
//! the comb. The ratio is later scaled by the comb span to get a delay in
//! samples (see [`crate::tap`]).
//!
//! With `x = (tap_index + 1) / tap_count`:
//!
//! | id | Pattern | Ratio |
//! |----|---------|-------|
//! | 0 | [`Linear`](TapPattern::Linear) | `x` |
//! | 1 | [`Logarithmic`](TapPattern::Logarithmic) | `ln(tap_index + 1) / ln(tap_count)` |
//! | 2 | [`Exponential`](TapPattern::Exponential) | `(e^x - 1) / (e - 1)` |
//! | 3 | [`Quadratic`](TapPattern::Quadratic) | `x²` |
//! | 4 | [`SquareRoot`](TapPattern::SquareRoot) | `√x` |
//! | 5-15 | [`Power`](TapPattern::Power) | `x^(1 + (id - 5) / 10)` |
//!
//! The logarithmic curve puts its first tap at ratio 0 (`ln 1 = 0`), so that
//! tap reads the newest sample in the buffer.

use libm::{expf, floorf, logf, powf, sqrtf};

/// Number of selectable patterns (ids `0..PATTERN_COUNT`).
pub const PATTERN_COUNT: u8 = 16;

/// First pattern id of the power family.
const FIRST_POWER_ID: u8 = 5;

/// Largest power step (pattern id 15, exponent 2.0).
const MAX_POWER_STEP: u8 = PATTERN_COUNT - 1 - FIRST_POWER_ID;

/// Tap distribution curve.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TapPattern {
    /// Evenly spaced taps.
    #[default]
    Linear,
    /// Dense toward the end of the comb, first tap at zero delay.
    Logarithmic,
    /// Normalized exponential, slightly denser toward the start.
    Exponential,
    /// Dense toward the start of the comb.
    Quadratic,
    /// Dense toward the end of the comb.
    SquareRoot,
    /// `x^(1 + step/10)` with `step` in `0..=10` (pattern ids 5 through 15).
    ///
    /// Step 0 coincides with [`Linear`](Self::Linear), step 10 with
    /// [`Quadratic`](Self::Quadratic). Steps above 10 behave like step 10;
    /// [`normalized`](Self::normalized) folds them so equal curves compare equal.
    Power(u8),
}

impl TapPattern {
    /// Map a pattern id (`0..16`) to a pattern.
    ///
    /// Ids above 15 are a caller error; release builds clamp them to 15.
    pub fn from_index(index: u8) -> Self {
        debug_assert!(index < PATTERN_COUNT, "pattern id {index} out of range");
        match index {
            0 => Self::Linear,
            1 => Self::Logarithmic,
            2 => Self::Exponential,
            3 => Self::Quadratic,
            4 => Self::SquareRoot,
            n => Self::Power(n.min(PATTERN_COUNT - 1) - FIRST_POWER_ID),
        }
    }

    /// The pattern id (`0..16`).
    pub fn index(self) -> u8 {
        match self {
            Self::Linear => 0,
            Self::Logarithmic => 1,
            Self::Exponential => 2,
            Self::Quadratic => 3,
            Self::SquareRoot => 4,
            Self::Power(step) => FIRST_POWER_ID + step.min(MAX_POWER_STEP),
        }
    }

    /// Canonical form: `Power` steps above 10 become `Power(10)`.
    ///
    /// [`TapSet`](crate::TapSet) stores normalized patterns, so two tap sets
    /// with the same curve are equal.
    #[inline]
    pub fn normalized(self) -> Self {
        match self {
            Self::Power(step) => Self::Power(step.min(MAX_POWER_STEP)),
            other => other,
        }
    }

    /// Short display name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Logarithmic => "logarithmic",
            Self::Exponential => "exponential",
            Self::Quadratic => "quadratic",
            Self::SquareRoot => "sqrt",
            Self::Power(_) => "power",
        }
    }

    /// Exponent of the power family, `None` for the fixed curves.
    pub fn power_exponent(self) -> Option<f32> {
        match self {
            Self::Power(step) => Some(1.0 + f32::from(step.min(MAX_POWER_STEP)) / 10.0),
            _ => None,
        }
    }

    /// Iterate all sixteen patterns in id order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..PATTERN_COUNT).map(Self::from_index)
    }

    /// Position ratio of one tap, see [`tap_ratio`].
    #[inline]
    pub fn ratio(self, tap_index: usize, tap_count: usize) -> f32 {
        tap_ratio(tap_index, tap_count, self)
    }
}

/// Normalized position of tap `tap_index` out of `tap_count` taps.
///
/// Returns a ratio in `[0, 1]`; the last tap of every pattern lands on 1.0
/// (the full comb span), except where rounding leaves it a hair below.
///
/// Requires `tap_index < tap_count`. A single logarithmic tap (`ln 1 / ln 1`)
/// is placed at 0, like the first tap of any logarithmic set.
///
/// # Example
///
/// ```rust
/// use tapdensity_core::{TapPattern, tap_ratio};
///
/// assert_eq!(tap_ratio(3, 4, TapPattern::Linear), 1.0);
/// assert_eq!(tap_ratio(1, 4, TapPattern::Quadratic), 0.25);
/// assert_eq!(tap_ratio(0, 8, TapPattern::Logarithmic), 0.0);
/// ```
#[inline]
pub fn tap_ratio(tap_index: usize, tap_count: usize, pattern: TapPattern) -> f32 {
    debug_assert!(tap_count > 0 && tap_index < tap_count);

    let x = (tap_index + 1) as f32 / tap_count as f32;
    let ratio = match pattern {
        TapPattern::Linear => x,
        TapPattern::Logarithmic => {
            if tap_count > 1 {
                logf((tap_index + 1) as f32) / logf(tap_count as f32)
            } else {
                0.0
            }
        }
        TapPattern::Exponential => (expf(x) - 1.0) / (core::f32::consts::E - 1.0),
        TapPattern::Quadratic => x * x,
        TapPattern::SquareRoot => sqrtf(x),
        TapPattern::Power(_) => {
            let exponent = pattern.power_exponent().unwrap_or(1.0);
            powf(x, exponent)
        }
    };

    ratio.clamp(0.0, 1.0)
}

/// Tap ratio for a continuous pattern value.
///
/// A smoothed pattern parameter glides through fractional ids. The ratio is
/// linearly interpolated between patterns `floor(value)` and `floor(value) + 1`,
/// so tap positions move continuously while the pattern changes. Integral
/// values give exactly [`tap_ratio`]. The value is clamped to `[0, 15]`; a
/// non-finite value selects pattern 0.
pub fn morphed_tap_ratio(tap_index: usize, tap_count: usize, pattern_value: f32) -> f32 {
    let value = if pattern_value.is_finite() {
        pattern_value.clamp(0.0, f32::from(PATTERN_COUNT - 1))
    } else {
        0.0
    };
    let low_id = floorf(value);
    let frac = value - low_id;

    let low = TapPattern::from_index(low_id as u8);
    let low_ratio = tap_ratio(tap_index, tap_count, low);
    if frac <= 0.0 || low.index() == PATTERN_COUNT - 1 {
        return low_ratio;
    }

    let high = TapPattern::from_index(low.index() + 1);
    let high_ratio = tap_ratio(tap_index, tap_count, high);
    (low_ratio + (high_ratio - low_ratio) * frac).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_roundtrip_covers_all_ids() {
        for id in 0..PATTERN_COUNT {
            assert_eq!(TapPattern::from_index(id).index(), id);
        }
        assert_eq!(TapPattern::all().count(), PATTERN_COUNT as usize);
    }

    #[test]
    fn power_ids_map_to_steps() {
        assert_eq!(TapPattern::from_index(5), TapPattern::Power(0));
        assert_eq!(TapPattern::from_index(15), TapPattern::Power(10));
        assert_eq!(TapPattern::Power(0).power_exponent(), Some(1.0));
        assert_eq!(TapPattern::Power(10).power_exponent(), Some(2.0));
        assert_eq!(TapPattern::Quadratic.power_exponent(), None);
    }

    #[test]
    fn linear_is_even() {
        for i in 0..8 {
            let r = tap_ratio(i, 8, TapPattern::Linear);
            assert!((r - (i + 1) as f32 / 8.0).abs() < 1e-7);
        }
    }

    #[test]
    fn logarithmic_first_tap_is_zero() {
        for n in [2, 5, 16, 64] {
            assert_eq!(tap_ratio(0, n, TapPattern::Logarithmic), 0.0);
        }
    }

    #[test]
    fn single_tap_patterns_stay_in_range() {
        for pattern in TapPattern::all() {
            let r = tap_ratio(0, 1, pattern);
            assert!(r.is_finite() && (0.0..=1.0).contains(&r), "{pattern:?} gave {r}");
        }
        assert_eq!(tap_ratio(0, 1, TapPattern::Logarithmic), 0.0);
        assert_eq!(tap_ratio(0, 1, TapPattern::Linear), 1.0);
    }

    #[test]
    fn last_tap_reaches_full_span() {
        for pattern in TapPattern::all() {
            let r = tap_ratio(63, 64, pattern);
            assert!(r <= 1.0 && r > 0.999, "{pattern:?} last tap at {r}");
        }
    }

    #[test]
    fn power_zero_matches_linear_and_power_ten_matches_quadratic() {
        for i in 0..32 {
            let lin = tap_ratio(i, 32, TapPattern::Linear);
            let quad = tap_ratio(i, 32, TapPattern::Quadratic);
            assert!((tap_ratio(i, 32, TapPattern::Power(0)) - lin).abs() < 1e-6);
            assert!((tap_ratio(i, 32, TapPattern::Power(10)) - quad).abs() < 1e-6);
        }
    }

    #[test]
    fn morph_integral_values_match_discrete_patterns() {
        for pattern in TapPattern::all() {
            let value = f32::from(pattern.index());
            assert_eq!(
                morphed_tap_ratio(10, 32, value),
                tap_ratio(10, 32, pattern),
                "{pattern:?}"
            );
        }
    }

    #[test]
    fn morph_midpoint_lies_between_neighbors() {
        let a = tap_ratio(10, 32, TapPattern::Linear);
        let b = tap_ratio(10, 32, TapPattern::Logarithmic);
        let mid = morphed_tap_ratio(10, 32, 0.5);
        assert!((mid - (a + b) * 0.5).abs() < 1e-6);
    }

    #[test]
    fn morph_clamps_out_of_range_values() {
        assert_eq!(
            morphed_tap_ratio(3, 8, 40.0),
            tap_ratio(3, 8, TapPattern::Power(10))
        );
        assert_eq!(
            morphed_tap_ratio(3, 8, -2.0),
            tap_ratio(3, 8, TapPattern::Linear)
        );
    }

    #[test]
    fn oversized_power_steps_normalize_to_the_last_step() {
        assert_eq!(TapPattern::Power(11).normalized(), TapPattern::Power(10));
        assert_eq!(TapPattern::Power(255).normalized(), TapPattern::Power(10));
        assert_eq!(TapPattern::Power(4).normalized(), TapPattern::Power(4));
        assert_eq!(TapPattern::Quadratic.normalized(), TapPattern::Quadratic);
        for tap in 0..8 {
            assert_eq!(
                tap_ratio(tap, 8, TapPattern::Power(40)),
                tap_ratio(tap, 8, TapPattern::Power(10))
            );
        }
    }

    #[test]
    fn non_finite_morph_value_selects_first_pattern() {
        for value in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            for tap in 0..16 {
                let r = morphed_tap_ratio(tap, 16, value);
                assert!(r.is_finite(), "{value} gave {r}");
                assert_eq!(r, tap_ratio(tap, 16, TapPattern::Linear));
            }
        }
    }
}
