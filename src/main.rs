//! CLI Entry Point for biopac_lsl
//!
//! Streams a BIOPAC MP unit to Lab Streaming Layer until Q is pressed.
//!
//! # Usage
//!
//! ```bash
//! biopac_lsl --cfg config.toml
//! biopac_lsl --cfg config.toml --simulate --log-level debug
//! ```

use anyhow::{Context, Result};
use biopac_lsl::app::{self, DriverChoice};
use biopac_lsl::config::{BridgeConfig, DEFAULT_CONFIG_FILE};
use biopac_lsl::logging::{self, OutputFormat, TracingConfig};
use biopac_lsl::BridgeError;
use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "biopac_lsl")]
#[command(about = "Stream BIOPAC MP samples to Lab Streaming Layer", long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(long, visible_alias = "config", default_value = DEFAULT_CONFIG_FILE)]
    cfg: PathBuf,

    /// Use the built-in simulated device instead of the vendor driver
    #[arg(long)]
    simulate: bool,

    /// Override the configured log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Log output format (pretty, compact, json)
    #[arg(long, default_value = "compact")]
    log_format: OutputFormat,

    /// Also log span open/close events
    #[arg(long)]
    log_spans: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if !cli.cfg.is_file() {
        return Err(BridgeError::Configuration(format!(
            "configuration file '{}' not found",
            cli.cfg.display()
        ))
        .into());
    }

    let mut config = BridgeConfig::load_from(&cli.cfg)
        .map_err(BridgeError::from)
        .with_context(|| format!("loading {}", cli.cfg.display()))?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    config.validate().map_err(BridgeError::Configuration)?;

    let tracing_config = TracingConfig::from_bridge_config(&config)
        .map_err(BridgeError::Configuration)?
        .with_format(cli.log_format)
        .with_span_events(cli.log_spans)
        .with_ansi(std::io::stderr().is_terminal());
    logging::init(tracing_config).map_err(anyhow::Error::msg)?;

    info!(config = %cli.cfg.display(), "biopac_lsl starting");

    let driver = if cli.simulate {
        DriverChoice::Simulated
    } else {
        DriverChoice::Hardware
    };
    let stats = app::run(&config, driver).map_err(|err| {
        let stage = err.stage();
        anyhow::Error::new(err).context(format!("{stage} failed"))
    })?;

    println!(
        "Acquisition stopped after {} samples ({:.1} Hz)",
        stats.samples,
        stats.rate_hz()
    );
    Ok(())
}
