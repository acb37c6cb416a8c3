//! Sweep comb sizes and report clustering and compensation per size.

use clap::Args;
use std::path::PathBuf;
use tapdensity_analysis::{
    BoundaryStep, export::export_sweep_csv, log_spaced, sweep_comb_sizes, worst_boundary_step,
};
use tapdensity_config::{pattern_label, validate_comb_size_ms, validate_tap_count};
use tapdensity_core::{DensityCompensator, TapPattern};

use super::common::{EngineArgs, parse_pattern_arg, path_label, print_json};

/// Relative distance from the spread threshold used for `--boundary`.
const BOUNDARY_OFFSET: f32 = 1e-3;

/// Sweep comb sizes on a logarithmic grid.
#[derive(Args)]
pub struct SweepArgs {
    /// Number of taps (1-64)
    #[arg(short, long, default_value = "64")]
    pub taps: usize,

    /// Tap pattern: id 0-15 or name
    #[arg(short, long, default_value = "linear", value_parser = parse_pattern_arg)]
    pub pattern: TapPattern,

    /// Smallest comb size in milliseconds
    #[arg(long, default_value = "0.05")]
    pub min: f32,

    /// Largest comb size in milliseconds
    #[arg(long, default_value = "20.0")]
    pub max: f32,

    /// Number of comb sizes
    #[arg(long, default_value = "24")]
    pub steps: usize,

    #[command(flatten)]
    pub engine: EngineArgs,

    /// Write the sweep to a CSV file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Also report the worst level step at the spread threshold, for this
    /// pattern and across all patterns
    #[arg(long)]
    pub boundary: bool,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Run the sweep command.
pub fn run(args: SweepArgs) -> anyhow::Result<()> {
    validate_comb_size_ms(args.min)?;
    validate_comb_size_ms(args.max)?;
    if args.min <= 0.0 {
        anyhow::bail!("--min must be positive for a logarithmic sweep, got {}", args.min);
    }
    if args.min > args.max {
        anyhow::bail!("--min ({}) must not exceed --max ({})", args.min, args.max);
    }
    if args.steps == 0 {
        anyhow::bail!("--steps must be at least 1");
    }

    let engine = args.engine.build()?;
    validate_tap_count(args.taps, engine.max_taps())?;

    let sizes = log_spaced(args.min, args.max, args.steps);
    let rows = sweep_comb_sizes(&engine, args.taps, args.pattern, sizes);
    tracing::debug!(rows = rows.len(), "sweep complete");

    if let Some(path) = &args.output {
        export_sweep_csv(&rows, path)?;
        tracing::info!(path = %path.display(), rows = rows.len(), "wrote sweep");
    }

    let boundary = args
        .boundary
        .then(|| worst_boundary_step(&engine, args.pattern, BOUNDARY_OFFSET));
    let boundary_all = args.boundary.then(|| worst_boundary_any_pattern(&engine));

    if args.json {
        let report = serde_json::json!({
            "sample_rate": engine.sample_rate(),
            "pattern": args.pattern.index(),
            "rows": rows,
            "boundary": boundary.map(|(taps, step)| serde_json::json!({
                "taps": taps,
                "threshold_ms": step.threshold_ms,
                "below_db": step.below_db,
                "above_db": step.above_db,
                "step_db": step.step_db(),
            })),
            "boundary_all_patterns": boundary_all.map(|(pattern, taps, step)| serde_json::json!({
                "pattern": pattern.index(),
                "taps": taps,
                "step_db": step.step_db(),
            })),
        });
        return print_json(&report);
    }

    println!(
        "{} taps, {} pattern at {} Hz",
        args.taps,
        pattern_label(args.pattern),
        engine.sample_rate()
    );
    println!();
    println!(
        "  {:>9} {:>9} {:>6} {:>7} {:>8} {:>10} {:>9}  path",
        "size (ms)", "span", "unique", "largest", "coherent", "gain", "dB"
    );
    for row in &rows {
        println!(
            "  {:>9.3} {:>9.2} {:>6} {:>7} {:>8.3} {:>10.6} {:>+9.2}  {}",
            row.comb_size_ms,
            row.span_samples,
            row.unique_positions,
            row.largest_group,
            row.coherent_gain_multiplication,
            row.gain,
            row.attenuation_db,
            path_label(row.spread)
        );
    }

    if let Some((taps, step)) = boundary {
        println!();
        println!(
            "Worst threshold step: {:+.2} dB at {} taps ({:.4} ms, {:+.2} -> {:+.2} dB)",
            step.step_db(),
            taps,
            step.threshold_ms,
            step.below_db,
            step.above_db
        );
    }
    if let Some((pattern, taps, step)) = boundary_all {
        println!(
            "Worst over all patterns: {:+.2} dB ({} pattern, {} taps)",
            step.step_db(),
            pattern_label(pattern),
            taps
        );
    }

    Ok(())
}

/// Largest threshold step over every pattern and tap count.
///
/// Skewed patterns are still clustered at two samples per tap and step more
/// than even spacing; logarithmic taps step the most.
fn worst_boundary_any_pattern(engine: &DensityCompensator) -> (TapPattern, usize, BoundaryStep) {
    TapPattern::all()
        .map(|pattern| {
            let (taps, step) = worst_boundary_step(engine, pattern, BOUNDARY_OFFSET);
            (pattern, taps, step)
        })
        .max_by(|a, b| a.2.step_db().abs().total_cmp(&b.2.step_db().abs()))
        .unwrap_or_else(|| {
            let (taps, step) = worst_boundary_step(engine, TapPattern::Linear, BOUNDARY_OFFSET);
            (TapPattern::Linear, taps, step)
        })
}
