//! Tap scenario files.
//!
//! A scenario names one tap configuration (comb size, tap count, pattern and
//! optional pitch CV). Scenario files hold a list of them for batch analysis.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use tapdensity_core::{TapPattern, TapSet};

use crate::error::{ConfigError, write_with_parent};
use crate::validation::{
    ValidationResult, collect, parse_pattern, pattern_label, validate_comb_size_ms,
    validate_pattern, validate_pitch_cv, validate_tap_count,
};

/// A pattern given either as an id or as a name.
///
/// TOML accepts both `pattern = 3` and `pattern = "quadratic"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PatternRef {
    /// Pattern id `0..16`.
    Id(u8),
    /// Pattern name, see [`parse_pattern`].
    Name(String),
}

impl PatternRef {
    /// Resolve to a [`TapPattern`].
    pub fn resolve(&self) -> ValidationResult<TapPattern> {
        match self {
            PatternRef::Id(id) => validate_pattern(*id),
            PatternRef::Name(name) => parse_pattern(name),
        }
    }
}

impl From<TapPattern> for PatternRef {
    fn from(pattern: TapPattern) -> Self {
        PatternRef::Name(pattern_label(pattern))
    }
}

impl Default for PatternRef {
    fn default() -> Self {
        PatternRef::Id(0)
    }
}

impl fmt::Display for PatternRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternRef::Id(id) => write!(f, "{id}"),
            PatternRef::Name(name) => f.write_str(name),
        }
    }
}

/// One named tap configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,

    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Comb size in milliseconds.
    pub comb_size_ms: f32,

    /// Tap count.
    pub taps: usize,

    /// Tap pattern (defaults to linear).
    #[serde(default)]
    pub pattern: PatternRef,

    /// Pitch CV in octaves.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub pitch_cv: f32,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_zero(value: &f32) -> bool {
    *value == 0.0
}

impl Scenario {
    /// Create a scenario.
    pub fn new(
        name: impl Into<String>,
        comb_size_ms: f32,
        taps: usize,
        pattern: TapPattern,
    ) -> Self {
        Self {
            name: name.into(),
            description: None,
            comb_size_ms,
            taps,
            pattern: pattern.into(),
            pitch_cv: 0.0,
        }
    }

    /// Add a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the pitch CV.
    pub fn with_pitch_cv(mut self, pitch_cv: f32) -> Self {
        self.pitch_cv = pitch_cv;
        self
    }

    /// Validate against a tap limit and build the [`TapSet`].
    pub fn to_tap_set(&self, max_taps: usize) -> ValidationResult<TapSet> {
        let mut errors = Vec::new();
        if let Err(e) = validate_comb_size_ms(self.comb_size_ms) {
            errors.push(e);
        }
        if let Err(e) = validate_tap_count(self.taps, max_taps) {
            errors.push(e);
        }
        if let Err(e) = validate_pitch_cv(self.pitch_cv) {
            errors.push(e);
        }
        let pattern = self.pattern.resolve().map_err(|e| errors.push(e)).ok();

        collect(errors)?;
        Ok(
            TapSet::from_millis(self.comb_size_ms, self.taps, pattern.unwrap_or_default())
                .with_pitch_cv(self.pitch_cv),
        )
    }
}

/// A list of scenarios.
///
/// # TOML Format
///
/// ```toml
/// [[scenarios]]
/// name = "tight_linear"
/// description = "Worst case for linear taps"
/// comb_size_ms = 0.1
/// taps = 64
/// pattern = "linear"
///
/// [[scenarios]]
/// name = "tight_quadratic"
/// comb_size_ms = 0.1
/// taps = 32
/// pattern = 3
/// pitch_cv = 0.5
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ScenarioSet {
    /// The scenarios, in file order.
    #[serde(default)]
    pub scenarios: Vec<Scenario>,
}

impl ScenarioSet {
    /// Create a set from scenarios.
    pub fn new(scenarios: impl IntoIterator<Item = Scenario>) -> Self {
        Self {
            scenarios: scenarios.into_iter().collect(),
        }
    }

    /// Load a scenario file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Parse a scenario file from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        write_with_parent(path.as_ref(), &self.to_toml()?)
    }

    /// Convert to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Number of scenarios.
    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    /// True when the set holds no scenarios.
    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    /// Iterate the scenarios.
    pub fn iter(&self) -> impl Iterator<Item = &Scenario> {
        self.scenarios.iter()
    }

    /// Find a scenario by name (case-insensitive).
    pub fn find(&self, name: &str) -> Result<&Scenario, ConfigError> {
        let name_lower = name.to_lowercase();
        self.scenarios
            .iter()
            .find(|s| s.name.to_lowercase() == name_lower)
            .ok_or_else(|| ConfigError::ScenarioNotFound(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ValidationError;

    #[test]
    fn pattern_accepts_id_or_name() {
        let set = ScenarioSet::from_toml(
            r#"
            [[scenarios]]
            name = "by_id"
            comb_size_ms = 0.1
            taps = 32
            pattern = 3

            [[scenarios]]
            name = "by_name"
            comb_size_ms = 0.1
            taps = 32
            pattern = "quadratic"

            [[scenarios]]
            name = "default"
            comb_size_ms = 1.0
            taps = 8
            "#,
        )
        .unwrap();

        assert_eq!(set.len(), 3);
        let by_id = set.scenarios[0].to_tap_set(64).unwrap();
        let by_name = set.scenarios[1].to_tap_set(64).unwrap();
        assert_eq!(by_id, by_name);
        assert_eq!(set.scenarios[2].pattern, PatternRef::Id(0));
        assert_eq!(
            set.scenarios[2].to_tap_set(64).unwrap().pattern(),
            TapPattern::Linear
        );
    }

    #[test]
    fn pitch_cv_reaches_tap_set() {
        let scenario = Scenario::new("cv", 2.0, 16, TapPattern::Linear).with_pitch_cv(1.0);
        let set = scenario.to_tap_set(64).unwrap();
        assert_eq!(set.pitch_cv(), 1.0);
        assert!((set.effective_size() - 0.001).abs() < 1e-7);
    }

    #[test]
    fn invalid_scenario_lists_problems() {
        let scenario = Scenario {
            pattern: PatternRef::Name("zigzag".to_string()),
            ..Scenario::new("bad", -1.0, 0, TapPattern::Linear)
        };
        match scenario.to_tap_set(64) {
            Err(ValidationError::Multiple(errors)) => assert_eq!(errors.len(), 3),
            other => panic!("expected three errors, got {other:?}"),
        }
    }

    #[test]
    fn tap_limit_applies() {
        let scenario = Scenario::new("wide", 1.0, 64, TapPattern::Linear);
        assert!(scenario.to_tap_set(64).is_ok());
        assert_eq!(
            scenario.to_tap_set(32),
            Err(ValidationError::TapCount { value: 64, max: 32 })
        );
    }

    #[test]
    fn find_is_case_insensitive() {
        let set = ScenarioSet::new([Scenario::new("Tight", 0.1, 64, TapPattern::Linear)]);
        assert!(set.find("tight").is_ok());
        assert!(matches!(
            set.find("loose"),
            Err(ConfigError::ScenarioNotFound(_))
        ));
    }

    #[test]
    fn serialized_form_omits_defaults() {
        let set = ScenarioSet::new([Scenario::new("a", 0.5, 4, TapPattern::Power(2))]);
        let toml = set.to_toml().unwrap();
        assert!(toml.contains("pattern = \"power2\""), "got: {toml}");
        assert!(!toml.contains("pitch_cv"), "got: {toml}");
        assert!(!toml.contains("description"), "got: {toml}");
        assert_eq!(ScenarioSet::from_toml(&toml).unwrap(), set);
    }
}
