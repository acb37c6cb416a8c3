//! Factory scenarios bundled with the library.
//!
//! The critical tap configurations for density compensation: the worst
//! clustering cases for linear and quadratic taps, the region around the
//! spread threshold, and wide combs where plain `1/N` holds.

use crate::ScenarioSet;
use crate::scenario::Scenario;

/// Array of factory scenario names for external access.
pub static FACTORY_SCENARIO_NAMES: &[&str] = &[
    "tight_linear",
    "tight_quadratic",
    "moderate_log",
    "borderline_linear",
    "large_delay",
    "very_large_delay",
];

/// TOML content for the factory scenario set.
///
/// Embedded at compile time and always available.
const FACTORY_SCENARIOS_TOML: &str = r#"
[[scenarios]]
name = "tight_linear"
description = "Worst case for linear taps: 64 taps inside five samples"
comb_size_ms = 0.1
taps = 64
pattern = "linear"

[[scenarios]]
name = "tight_quadratic"
description = "Worst case for quadratic taps: early taps pile up at position zero"
comb_size_ms = 0.1
taps = 32
pattern = "quadratic"

[[scenarios]]
name = "moderate_log"
description = "Moderate clustering with logarithmic spacing"
comb_size_ms = 0.5
taps = 64
pattern = "logarithmic"

[[scenarios]]
name = "borderline_linear"
description = "Close to the spread threshold"
comb_size_ms = 1.0
taps = 64
pattern = "linear"

[[scenarios]]
name = "large_delay"
description = "Taps spread over a few samples each"
comb_size_ms = 2.0
taps = 64
pattern = "linear"

[[scenarios]]
name = "very_large_delay"
description = "Wide comb, plain 1/N normalization"
comb_size_ms = 10.0
taps = 64
pattern = "linear"
"#;

/// Get all factory scenarios.
///
/// # Example
///
/// ```rust
/// use tapdensity_config::factory_scenarios;
///
/// let set = factory_scenarios();
/// assert_eq!(set.len(), 6);
/// ```
pub fn factory_scenarios() -> ScenarioSet {
    ScenarioSet::from_toml(FACTORY_SCENARIOS_TOML).unwrap_or_default()
}

/// Get a factory scenario by name (case-insensitive).
///
/// # Example
///
/// ```rust
/// use tapdensity_config::get_factory_scenario;
///
/// let tight = get_factory_scenario("Tight_Linear").expect("bundled scenario");
/// assert_eq!(tight.taps, 64);
/// assert!(get_factory_scenario("nonexistent").is_none());
/// ```
pub fn get_factory_scenario(name: &str) -> Option<Scenario> {
    factory_scenarios().find(name).ok().cloned()
}

/// Check if a name is a factory scenario (case-insensitive).
pub fn is_factory_scenario(name: &str) -> bool {
    let name_lower = name.to_lowercase();
    FACTORY_SCENARIO_NAMES
        .iter()
        .any(|n| n.to_lowercase() == name_lower)
}
