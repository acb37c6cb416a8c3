//! Configuration and scenario management for tapdensity.
//!
//! Everything that reaches the compensation engine from outside goes through
//! this crate: engine configuration files, caller-side validation of tap
//! parameters, and scenario files for batch analysis.
//!
//! # Features
//!
//! - **Engine Config**: Sample rate, tap limit and tuning constants from TOML
//! - **Validation**: Range checks for every parameter-layer value
//! - **Scenarios**: Named tap configurations, loaded and saved as TOML
//! - **Factory Scenarios**: The critical clustering cases, always available
//!
//! # Example
//!
//! ```rust
//! use tapdensity_config::{EngineConfig, get_factory_scenario};
//!
//! let engine = EngineConfig::from_toml("sample_rate = 44100")
//!     .and_then(|config| config.build())
//!     .expect("valid configuration");
//!
//! let scenario = get_factory_scenario("tight_linear").expect("bundled scenario");
//! let tap_set = scenario.to_tap_set(engine.max_taps()).expect("valid scenario");
//!
//! let result = engine.compensate(&tap_set);
//! assert!(result.gain < result.base_gain);
//! ```

mod engine;
mod error;
mod scenario;

/// Caller-side validation of tap parameters.
pub mod validation;

/// Factory scenarios bundled with the library.
pub mod factory_scenarios;

pub use engine::{EngineConfig, TuningConfig};
pub use error::ConfigError;
pub use factory_scenarios::{
    FACTORY_SCENARIO_NAMES, factory_scenarios, get_factory_scenario, is_factory_scenario,
};
pub use scenario::{PatternRef, Scenario, ScenarioSet};
pub use validation::{
    ValidationError, ValidationResult, parse_pattern, pattern_label, validate_comb_size_ms,
    validate_max_taps, validate_pattern, validate_pitch_cv, validate_sample_rate,
    validate_tap_count, validate_tap_set, validate_tuning,
};
