//! Run named tap scenarios through the engine.

use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use tapdensity_config::{Scenario, ScenarioSet, factory_scenarios, pattern_label};
use tapdensity_core::{CompensationPath, DensityCompensator};

use super::common::{EngineArgs, path_label, print_json};

/// Analyze the factory scenarios or a scenario file.
#[derive(Args)]
pub struct ScenariosArgs {
    /// Scenario file (TOML); the factory scenarios are used when omitted
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Only run the scenario with this name
    #[arg(short, long)]
    pub name: Option<String>,

    #[command(flatten)]
    pub engine: EngineArgs,

    /// Save the scenario set to a TOML file
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Run the scenarios command.
pub fn run(args: ScenariosArgs) -> anyhow::Result<()> {
    let set = match &args.file {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading scenarios");
            ScenarioSet::load(path)?
        }
        None => factory_scenarios(),
    };

    if let Some(path) = &args.export {
        set.save(path)?;
        tracing::info!(path = %path.display(), scenarios = set.len(), "saved scenarios");
    }

    let selected: Vec<&Scenario> = match &args.name {
        Some(name) => vec![set.find(name)?],
        None => set.iter().collect(),
    };

    let mut engine = args.engine.build()?;
    let mut results = Vec::with_capacity(selected.len());
    for scenario in selected {
        results.push(run_scenario(&mut engine, scenario)?);
    }

    if args.json {
        return print_json(&results);
    }

    println!(
        "  {:20} {:>9} {:>5} {:12} {:>10} {:>10} {:>8}  path",
        "scenario", "size (ms)", "taps", "pattern", "gain", "1/N", "dB"
    );
    for r in &results {
        println!(
            "  {:20} {:>9.3} {:>5} {:12} {:>10.6} {:>10.6} {:>+8.2}  {}",
            r.name, r.comb_size_ms, r.taps, r.pattern, r.gain, r.base_gain, r.attenuation_db, r.path
        );
    }

    Ok(())
}

/// Engine result for one scenario.
#[derive(Serialize)]
struct ScenarioReport {
    name: String,
    comb_size_ms: f32,
    taps: usize,
    pattern: String,
    pitch_cv: f32,
    unique_positions: usize,
    coherent_gain_multiplication: f32,
    base_gain: f32,
    gain: f32,
    attenuation_db: f32,
    path: &'static str,
}

fn run_scenario(
    engine: &mut DensityCompensator,
    scenario: &Scenario,
) -> anyhow::Result<ScenarioReport> {
    let tap_set = scenario
        .to_tap_set(engine.max_taps())
        .map_err(|e| anyhow::anyhow!("scenario '{}': {e}", scenario.name))?;
    let result = engine.update(&tap_set);
    let metrics = engine.analyze(&tap_set);
    tracing::debug!(
        scenario = %scenario.name,
        gain = result.gain,
        unique_positions = metrics.unique_positions,
        "scenario analyzed"
    );

    Ok(ScenarioReport {
        name: scenario.name.clone(),
        comb_size_ms: scenario.comb_size_ms,
        taps: tap_set.tap_count(),
        pattern: pattern_label(tap_set.pattern()),
        pitch_cv: tap_set.pitch_cv(),
        unique_positions: metrics.unique_positions,
        coherent_gain_multiplication: metrics.coherent_gain_multiplication,
        base_gain: result.base_gain,
        gain: result.gain,
        attenuation_db: result.attenuation_db(),
        path: path_label(result.path == CompensationPath::Spread),
    })
}
