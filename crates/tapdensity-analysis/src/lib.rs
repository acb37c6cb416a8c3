//! Tapdensity Analysis - offline tooling for tap clustering
//!
//! The compensation engine runs at control rate and only computes what the
//! gain needs. This crate answers the questions asked while tuning a comb:
//!
//! - [`recommend`] - Tap count limits for a comb size (spacing and clustering)
//! - [`matrix`] - Full `N × N` tap correlation matrix
//! - [`strategy`] - Plain, correlation-aware, clustering-aware, hybrid and
//!   adaptive normalization side by side
//! - [`sweep`] - Comb size sweeps and the level step at the spread threshold
//! - [`export`] - CSV output for all of the above
//!
//! ## Example Workflow
//!
//! ```rust
//! use tapdensity_analysis::{RecommendOptions, log_spaced, recommend_max_taps, sweep_comb_sizes};
//! use tapdensity_core::{DensityCompensator, TapPattern};
//!
//! let engine = DensityCompensator::new(44100.0);
//!
//! // 1. Where does clustering start to matter?
//! let rows = sweep_comb_sizes(&engine, 64, TapPattern::Linear, log_spaced(0.05, 20.0, 16));
//! let first_spread = rows.iter().position(|r| r.spread);
//! assert!(first_spread.is_some());
//!
//! // 2. How many taps fit a 0.1 ms comb?
//! let rec = recommend_max_taps(0.1, 44100.0, &RecommendOptions::default());
//! assert!(rec.recommended() <= rec.clustering_limit);
//! ```

pub mod export;
pub mod matrix;
pub mod recommend;
pub mod strategy;
pub mod sweep;

pub use matrix::CorrelationMatrix;
pub use recommend::{
    CONSERVATIVE_MIN_SPACING, DEFAULT_MAX_COHERENT_GAIN, DEFAULT_MIN_SPACING, RecommendOptions,
    TapRecommendation, clustering_tap_limit, recommend_max_taps, spacing_tap_limit,
};
pub use strategy::{StrategyComparison, compare_strategies, strategy_gains};
pub use sweep::{
    BoundaryStep, SweepRow, analyze_row, boundary_step, log_spaced, sweep_comb_sizes,
    worst_boundary_step,
};
