//! Tapdensity CLI - Command-line interface for the tap density compensation engine.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tapdensity")]
#[command(author, version, about = "Tap density compensation for multi-tap combs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the compensated gain for one tap set
    Compensate(commands::compensate::CompensateArgs),

    /// Show how taps group onto integer sample positions
    Groups(commands::groups::GroupsArgs),

    /// Recommend maximum tap counts for short combs
    Recommend(commands::recommend::RecommendArgs),

    /// Sweep comb sizes and report compensation per size
    Sweep(commands::sweep::SweepArgs),

    /// Run the factory scenarios or a scenario file
    Scenarios(commands::scenarios::ScenariosArgs),

    /// Show or write the effective engine configuration
    Config(commands::config::ConfigArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Compensate(args) => commands::compensate::run(args),
        Commands::Groups(args) => commands::groups::run(args),
        Commands::Recommend(args) => commands::recommend::run(args),
        Commands::Sweep(args) => commands::sweep::run(args),
        Commands::Scenarios(args) => commands::scenarios::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}
