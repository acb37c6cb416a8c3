//! Show how taps cluster onto integer sample positions.

use clap::Args;
use std::path::PathBuf;
use tapdensity_analysis::{CorrelationMatrix, export::export_matrix_csv};
use tapdensity_core::PositionGroups;

use super::common::{EngineArgs, TapArgs, print_json};

/// Show position groups and clustering metrics for a tap set.
#[derive(Args)]
pub struct GroupsArgs {
    #[command(flatten)]
    pub taps: TapArgs,

    #[command(flatten)]
    pub engine: EngineArgs,

    /// Write the full tap correlation matrix to a CSV file
    #[arg(long)]
    pub matrix: Option<PathBuf>,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Run the groups command.
pub fn run(args: GroupsArgs) -> anyhow::Result<()> {
    let engine = args.engine.build()?;
    let tap_set = args.taps.tap_set(&engine)?;
    let layout = engine.layout(&tap_set);
    let groups = PositionGroups::from_delays(layout.delays());
    let metrics = engine.tuning().analyzer().analyze_layout(&layout);
    let contributions = metrics.group_contributions();

    if let Some(path) = &args.matrix {
        export_matrix_csv(&CorrelationMatrix::from_layout(&layout), path)?;
        tracing::info!(path = %path.display(), taps = layout.len(), "wrote correlation matrix");
    }

    if args.json {
        let group_list: Vec<_> = groups
            .iter()
            .zip(contributions)
            .map(|((position, taps), contribution)| {
                serde_json::json!({
                    "position": position,
                    "taps": taps,
                    "fractions": taps
                        .iter()
                        .map(|&t| layout.delays()[t as usize].fraction)
                        .collect::<Vec<_>>(),
                    "contribution": contribution,
                })
            })
            .collect();
        let report = serde_json::json!({
            "taps": metrics.tap_count,
            "unique_positions": metrics.unique_positions,
            "largest_group": metrics.largest_group,
            "adjacent_correlation": metrics.adjacent_correlation,
            "effective_gain": metrics.effective_gain,
            "gain_multiplication": metrics.gain_multiplication,
            "coherent_gain_multiplication": metrics.coherent_gain_multiplication,
            "groups": group_list,
        });
        return print_json(&report);
    }

    println!("Position Groups");
    println!("===============");
    println!("  {:>8} {:>5} {:>12}  taps", "position", "count", "contribution");
    for ((position, taps), contribution) in groups.iter().zip(contributions) {
        let tap_list: Vec<String> = taps
            .iter()
            .map(|&t| format!("{t}(+{:.2})", layout.delays()[t as usize].fraction))
            .collect();
        println!(
            "  {:>8} {:>5} {:>12.3}  {}",
            position,
            taps.len(),
            contribution,
            tap_list.join(" ")
        );
    }

    println!();
    println!(
        "Unique positions:       {} of {} taps",
        metrics.unique_positions, metrics.tap_count
    );
    println!("Largest group:          {}", metrics.largest_group);
    println!("Adjacent correlation:   {:.4}", metrics.adjacent_correlation);
    println!(
        "Gain multiplication:    {:.4} (effective {:.3} taps)",
        metrics.gain_multiplication, metrics.effective_gain
    );
    println!(
        "Coherent worst case:    {:.3}x",
        metrics.coherent_gain_multiplication
    );

    Ok(())
}
