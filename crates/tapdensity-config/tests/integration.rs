//! Integration tests for tapdensity-config.
//!
//! These tests verify file round trips and the path from configuration files
//! to compensation results.

use tapdensity_config::{
    ConfigError, EngineConfig, Scenario, ScenarioSet, factory_scenarios, get_factory_scenario,
};
use tapdensity_core::{CompensationPath, CompensationTuning, TapPattern};
use tempfile::TempDir;

#[test]
fn engine_config_file_roundtrip() {
    let temp = TempDir::new().expect("temp dir");
    let path = temp.path().join("nested").join("engine.toml");

    let config = EngineConfig::new(44100)
        .with_max_taps(48)
        .with_tuning(CompensationTuning {
            correlation_scale: 1.5,
            ..CompensationTuning::default()
        });
    config.save(&path).expect("save creates parent directory");

    let loaded = EngineConfig::load(&path).expect("load");
    assert_eq!(loaded, config);
}

#[test]
fn missing_file_reports_path() {
    let temp = TempDir::new().expect("temp dir");
    let path = temp.path().join("absent.toml");

    let err = EngineConfig::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::ReadFile { .. }));
    assert!(err.to_string().contains("absent.toml"));
}

#[test]
fn scenario_file_roundtrip_preserves_order() {
    let temp = TempDir::new().expect("temp dir");
    let path = temp.path().join("scenarios.toml");

    let set = ScenarioSet::new([
        Scenario::new("tight", 0.1, 64, TapPattern::Linear).with_description("five samples"),
        Scenario::new("skewed", 0.4, 24, TapPattern::Power(7)).with_pitch_cv(-0.5),
        Scenario::new("wide", 10.0, 64, TapPattern::SquareRoot),
    ]);
    set.save(&path).expect("save");

    let loaded = ScenarioSet::load(&path).expect("load");
    assert_eq!(loaded, set);
    let names: Vec<&str> = loaded.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["tight", "skewed", "wide"]);
}

#[test]
fn factory_scenarios_through_configured_engine() {
    let engine = EngineConfig::new(44100).build().expect("default config");

    let results: Vec<_> = factory_scenarios()
        .iter()
        .map(|s| {
            let set = s.to_tap_set(engine.max_taps()).expect("valid scenario");
            (s.name.clone(), engine.compensate(&set))
        })
        .collect();

    for (name, c) in &results {
        assert!(c.gain <= c.base_gain, "{name} boosted");
        assert!(c.gain >= c.base_gain * 0.1, "{name} over-attenuated");
    }

    let tight = &results[0].1;
    assert!(tight.attenuation_db() < -10.0);
    let wide = &results[results.len() - 1].1;
    assert_eq!(wide.path, CompensationPath::Spread);
    assert_eq!(wide.gain, 1.0 / 64.0);
}

#[test]
fn tap_limit_from_config_rejects_large_scenarios() {
    let engine = EngineConfig::new(48000)
        .with_max_taps(32)
        .build()
        .expect("valid config");
    let tight = get_factory_scenario("tight_linear").expect("factory scenario");
    assert!(tight.to_tap_set(engine.max_taps()).is_err());

    let quadratic = get_factory_scenario("tight_quadratic").expect("factory scenario");
    assert!(quadratic.to_tap_set(engine.max_taps()).is_ok());
}
