use anyhow::{Context, Result};
use clap::Parser;
use harasim_config::Config;
use harasim_core::{ListMode, MatrixExpander};
use harasim_sheet::{HaraSheet, ScenarioSheet};
use std::path::{Path, PathBuf};
use tracing::info;

/// harasim - derive vehicle test scenarios from a HARA
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output list: Scenario_List, FTTI_List or Acceptance_List
    mode: String,

    /// Configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Output file (defaults to the path configured for the mode)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt().with_env_filter(log_level).init();

    let mode: ListMode = cli.mode.parse()?;

    let config = harasim_config::from_path(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;

    let output = match cli.output {
        Some(path) => path,
        None => harasim_sheet::output_path(&config, mode)
            .context("No output path configured for this mode")?,
    };

    let rows = generate(&config, mode, &output)?;

    println!("✅ {} complete!", mode);
    println!("📄 {} test run(s) written to {}", rows, output.display());

    Ok(())
}

fn generate(config: &Config, mode: ListMode, output: &Path) -> Result<u64> {
    let hara = HaraSheet::open(config).context("Failed to read the HARA sheet")?;
    let sheet = ScenarioSheet::open(config, mode).context("Failed to open the scenario template")?;

    info!("Generating {} from {}", mode, hara.path().display());

    let mut expander = MatrixExpander::new(config, mode, sheet);
    for record in hara.records() {
        expander
            .process(&record)
            .with_context(|| format!("Failed to expand hazardous event {}", record.identifier))?;
    }

    info!(
        "{} test run(s) enumerated, {} written",
        expander.test_runs(),
        expander.rows_written()
    );

    let rows = expander.rows_written();
    expander
        .into_sink()
        .save(output)
        .with_context(|| format!("Failed to save {}", output.display()))?;

    Ok(rows)
}
