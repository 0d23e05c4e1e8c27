use std::path::PathBuf;

use clap::Parser;
use retcal::{init_logging, run, BUILD_DATE, VERSION};
use tracing::info;

#[derive(Parser)]
#[command(name = "retcal", version)]
#[command(about = "Retraction calibration G-code generator", long_about = None)]
struct Cli {
    /// Calibration config file (.toml or .json)
    config: PathBuf,

    /// G-code file to write
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging()?;

    info!(version = VERSION, built = BUILD_DATE, "RetCal starting");
    let program = run(&cli.config, &cli.output)?;
    info!(
        lines = program.len(),
        layers = program.layer_count(),
        "Done"
    );

    Ok(())
}
