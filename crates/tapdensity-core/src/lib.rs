//! Tapdensity Core - adaptive density compensation for multi-tap combs
//!
//! A multi-tap comb reads up to [`MAX_TAPS`] taps from one delay buffer and
//! normalizes the summed output by `1/N`. That normalization assumes the taps
//! are independent. At short comb sizes many taps land on the same or adjacent
//! integer sample, their outputs become near-identical, and `1/N` no longer
//! holds the level down. This crate measures that clustering and derives a
//! corrected output gain.
//!
//! # Pipeline
//!
//! ```text
//! TapSet ─→ [pattern] ─→ ratios ─→ [tap] ─→ TapLayout ─→ [cluster] ─→ metrics
//!                                                                      │
//!                 GainSlot ←── Compensation ←── [compensation] ←───────┘
//! ```
//!
//! - [`TapPattern`] / [`tap_ratio`] - Tap placement curves (16 patterns)
//! - [`TapSet`] / [`TapLayout`] / [`TapDelay`] - Per-tap delays in samples,
//!   shared by the gain calculation and the buffer reader
//! - [`PositionGroups`] / [`ClusterAnalyzer`] - Position collisions and
//!   fractional-delay correlation
//! - [`DensityCompensator`] / [`compensate`] - Bounded gain correction
//! - [`GainSlot`] - Lock-free hand-off from the control thread to the audio thread
//!
//! # Example
//!
//! ```rust
//! use tapdensity_core::{DensityCompensator, TapPattern, TapSet};
//!
//! let compensator = DensityCompensator::new(44100.0);
//!
//! // 0.1 ms comb with 64 linear taps: heavy clustering
//! let tight = compensator.compensate(&TapSet::from_millis(0.1, 64, TapPattern::Linear));
//! assert!(tight.gain < tight.base_gain);
//!
//! // 10 ms comb: taps are spread out, plain 1/N
//! let wide = compensator.compensate(&TapSet::from_millis(10.0, 64, TapPattern::Linear));
//! assert_eq!(wide.gain, 1.0 / 64.0);
//! ```
//!
//! # no_std Support
//!
//! The crate performs no allocation and no I/O. Disable the default `std`
//! feature for embedded targets:
//!
//! ```toml
//! [dependencies]
//! tapdensity-core = { version = "0.1", default-features = false }
//! ```
//!
//! Enable the `tracing` feature to log recomputations at debug level.

#![cfg_attr(not(feature = "std"), no_std)]

pub mod cluster;
pub mod compensation;
pub mod math;
pub mod pattern;
pub mod slot;
pub mod tap;

pub use cluster::{
    ClusterAnalyzer, ClusteringMetrics, DEFAULT_FRACTION_SENSITIVITY, PositionGroups,
    adjacent_correlation, fractional_coherence, unique_positions,
};
pub use compensation::{
    Compensation, CompensationPath, CompensationTuning, DensityCompensator, compensate,
};
pub use math::{db_to_linear, linear_to_db};
pub use pattern::{PATTERN_COUNT, TapPattern, morphed_tap_ratio, tap_ratio};
pub use slot::GainSlot;
pub use tap::{MAX_TAPS, TapDelay, TapLayout, TapSet, delay_samples};
