//! Show or write the effective engine configuration.

use clap::Args;
use std::path::PathBuf;

use super::common::EngineArgs;

/// Print the effective engine configuration as TOML.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(flatten)]
    pub engine: EngineArgs,

    /// Write the configuration to a file instead of stdout
    #[arg(short, long)]
    pub write: Option<PathBuf>,
}

/// Run the config command.
pub fn run(args: ConfigArgs) -> anyhow::Result<()> {
    let config = args.engine.engine_config()?;
    config.validate()?;

    match &args.write {
        Some(path) => {
            config.save(path)?;
            println!("Wrote {}", path.display());
        }
        None => print!("{}", config.to_toml()?),
    }

    Ok(())
}
