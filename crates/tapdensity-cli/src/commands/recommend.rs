//! Recommend tap counts for short combs.

use clap::Args;
use std::path::PathBuf;
use tapdensity_analysis::{
    DEFAULT_MAX_COHERENT_GAIN, DEFAULT_MIN_SPACING, RecommendOptions, TapRecommendation,
    export::write_recommendations_csv, recommend_max_taps,
};
use tapdensity_config::{pattern_label, validate_comb_size_ms};
use tapdensity_core::TapPattern;

use super::common::{EngineArgs, parse_pattern_arg, print_json};

/// Recommend maximum tap counts per comb size.
#[derive(Args)]
pub struct RecommendArgs {
    /// Comb sizes in milliseconds, comma separated
    #[arg(
        long,
        value_delimiter = ',',
        default_value = "0.05,0.1,0.2,0.5,1,2,5,10"
    )]
    pub sizes: Vec<f32>,

    /// Minimum average spacing between taps in samples
    #[arg(long, default_value_t = DEFAULT_MIN_SPACING)]
    pub min_spacing: f32,

    /// Largest tolerated coherent gain multiplication
    #[arg(long, default_value_t = DEFAULT_MAX_COHERENT_GAIN)]
    pub max_coherent: f32,

    /// Tap pattern used for the clustering scan
    #[arg(short, long, default_value = "linear", value_parser = parse_pattern_arg)]
    pub pattern: TapPattern,

    #[command(flatten)]
    pub engine: EngineArgs,

    /// Write the table to a CSV file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Run the recommend command.
pub fn run(args: RecommendArgs) -> anyhow::Result<()> {
    if !(args.min_spacing.is_finite() && args.min_spacing > 0.0) {
        anyhow::bail!("--min-spacing must be positive, got {}", args.min_spacing);
    }
    if !(args.max_coherent.is_finite() && args.max_coherent >= 1.0) {
        anyhow::bail!("--max-coherent must be at least 1, got {}", args.max_coherent);
    }
    for &ms in &args.sizes {
        validate_comb_size_ms(ms)?;
    }

    let engine = args.engine.build()?;
    let options = RecommendOptions {
        min_spacing_samples: args.min_spacing,
        max_coherent_gain: args.max_coherent,
        pattern: args.pattern,
        ..RecommendOptions::for_engine(&engine)
    };
    let recommendations: Vec<TapRecommendation> = args
        .sizes
        .iter()
        .map(|&ms| recommend_max_taps(ms, engine.sample_rate(), &options))
        .collect();

    if let Some(path) = &args.output {
        let file = std::fs::File::create(path)?;
        let mut out = std::io::BufWriter::new(file);
        write_recommendations_csv(&recommendations, &mut out)?;
        std::io::Write::flush(&mut out)?;
        tracing::info!(path = %path.display(), rows = recommendations.len(), "wrote recommendations");
    }

    if args.json {
        let rows: Vec<_> = recommendations
            .iter()
            .map(|r| {
                serde_json::json!({
                    "comb_size_ms": r.comb_size_ms,
                    "span_samples": r.span_samples,
                    "spacing_limit": r.spacing_limit,
                    "clustering_limit": r.clustering_limit,
                    "recommended": r.recommended(),
                })
            })
            .collect();
        return print_json(&rows);
    }

    println!(
        "Tap limits at {} Hz ({} pattern, spacing >= {} samples, coherent gain <= {}, at most {} taps)",
        engine.sample_rate(),
        pattern_label(args.pattern),
        args.min_spacing,
        args.max_coherent,
        options.max_taps
    );
    println!();
    println!(
        "  {:>10} {:>10} {:>8} {:>10} {:>11}",
        "size (ms)", "span", "spacing", "clustering", "recommended"
    );
    for r in &recommendations {
        println!(
            "  {:>10.3} {:>10.2} {:>8} {:>10} {:>11}",
            r.comb_size_ms,
            r.span_samples,
            r.spacing_limit,
            r.clustering_limit,
            r.recommended()
        );
    }

    Ok(())
}
