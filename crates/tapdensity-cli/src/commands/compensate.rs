//! Compute the compensated output gain for one tap configuration.

use clap::Args;
use tapdensity_analysis::compare_strategies;
use tapdensity_config::pattern_label;
use tapdensity_core::CompensationPath;

use super::common::{EngineArgs, TapArgs, path_label, print_json};

/// Compute density compensation for a tap set.
#[derive(Args)]
pub struct CompensateArgs {
    #[command(flatten)]
    pub taps: TapArgs,

    #[command(flatten)]
    pub engine: EngineArgs,

    /// Also show the alternative normalization strategies
    #[arg(long)]
    pub strategies: bool,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Run the compensate command.
pub fn run(args: CompensateArgs) -> anyhow::Result<()> {
    let mut engine = args.engine.build()?;
    let tap_set = args.taps.tap_set(&engine)?;
    let result = engine.update(&tap_set);
    let spread = result.path == CompensationPath::Spread;
    let strategies = args
        .strategies
        .then(|| compare_strategies(&tap_set, engine.sample_rate(), engine.tuning()));

    if args.json {
        let report = serde_json::json!({
            "comb_size_ms": args.taps.size,
            "taps": tap_set.tap_count(),
            "pattern": tap_set.pattern().index(),
            "pitch_cv": tap_set.pitch_cv(),
            "sample_rate": engine.sample_rate(),
            "span_samples": tap_set.span_samples(engine.sample_rate()),
            "base_gain": result.base_gain,
            "gain": result.gain,
            "adaptive_factor": result.adaptive_factor,
            "attenuation_db": result.attenuation_db(),
            "clamped": result.is_clamped(),
            "path": path_label(spread),
            "strategies": strategies,
        });
        return print_json(&report);
    }

    println!(
        "Tap set:      {} taps, {} pattern, {:.4} ms",
        tap_set.tap_count(),
        pattern_label(tap_set.pattern()),
        args.taps.size
    );
    if tap_set.pitch_cv() != 0.0 {
        println!("Pitch CV:     {:+.2} oct", tap_set.pitch_cv());
    }
    println!(
        "Span:         {:.3} samples at {} Hz",
        tap_set.span_samples(engine.sample_rate()),
        engine.sample_rate()
    );
    println!("Path:         {}", path_label(spread));
    println!("Base gain:    {:.6} (1/N)", result.base_gain);
    println!("Factor:       {:.4}", result.adaptive_factor);
    println!(
        "Gain:         {:.6} ({:+.2} dB vs 1/N){}",
        result.gain,
        result.attenuation_db(),
        if result.is_clamped() { ", clamped" } else { "" }
    );

    if let Some(cmp) = strategies {
        println!();
        println!("Strategies:");
        println!("  {:12} {:>10} {:>9}", "strategy", "gain", "dB");
        for (name, gain) in cmp.entries() {
            println!("  {:12} {:>10.6} {:>+9.2}", name, gain, cmp.relative_db(gain));
        }
    }

    Ok(())
}
